use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::constants;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub metadata: MetadataConfig,

    pub sources: SourcesConfig,

    pub catalog: CatalogConfig,

    pub watch: WatchConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub database_path: String,

    pub log_level: String,

    /// "pretty" or "json"
    pub log_format: String,

    /// Number of tokio worker threads (default: 2)
    /// Set to 0 to use the number of CPU cores
    pub worker_threads: usize,

    /// Maximum database connections (default: 5)
    pub max_db_connections: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            database_path: "sqlite:data/episodic.db".to_string(),
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            worker_threads: 2,
            max_db_connections: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataConfig {
    pub base_url: String,

    /// TMDB v3 API key. `TMDB_API_KEY` in the environment takes precedence.
    pub api_key: String,

    pub language: String,

    /// How long a fetched series stays in the local metadata cache.
    pub cache_ttl_seconds: u64,

    pub request_timeout_seconds: u64,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.themoviedb.org/3".to_string(),
            api_key: String::new(),
            language: "fr-FR".to_string(),
            cache_ttl_seconds: 3600,
            request_timeout_seconds: 15,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    /// Remote existence check for the dubbed source.
    pub check_url: String,

    /// Player URL of the dubbed source. Placeholders: `{id}`, `{season}`, `{episode}`.
    pub primary_template: String,

    /// Player URL of the original-language source, same placeholders.
    pub alternate_template: String,

    /// Upper bound on the remote check; a slow endpoint counts as unavailable.
    pub request_timeout_seconds: u64,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            check_url: "https://api.frembed.xyz/tv/check".to_string(),
            primary_template: "https://frembed.xyz/api/serie.php?id={id}&sa={season}&epi={episode}"
                .to_string(),
            alternate_template: "https://vidsrc.wtf/api/3/tv/?id={id}&s={season}&e={episode}"
                .to_string(),
            request_timeout_seconds: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Synthetic episode count generated for every declared season.
    pub episodes_per_season: u32,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            episodes_per_season: constants::catalog::EPISODES_PER_SEASON,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    pub continue_watching_capacity: usize,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            continue_watching_capacity: constants::watch::CONTINUE_WATCHING_CAPACITY,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let paths = Self::config_paths();

        for path in &paths {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                let mut config = Self::load_from_path(path)?;
                config.apply_env();
                return Ok(config);
            }
        }

        info!("No config file found, using defaults");
        let mut config = Self::default();
        config.apply_env();
        Ok(config)
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Config saved to: {}", path.display());
        Ok(())
    }

    fn apply_env(&mut self) {
        if let Ok(key) = std::env::var("TMDB_API_KEY")
            && !key.trim().is_empty()
        {
            self.metadata.api_key = key;
        }
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![];

        paths.push(PathBuf::from("config.toml"));

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("episodic").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".episodic").join("config.toml"));
        }

        paths
    }

    fn default_config_path() -> PathBuf {
        PathBuf::from("config.toml")
    }

    pub fn create_default_if_missing() -> Result<bool> {
        let path = Self::default_config_path();
        if path.exists() {
            Ok(false)
        } else {
            let config = Self::default();
            config.save_to_path(&path)?;
            info!("Created default config file: {}", path.display());
            Ok(true)
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.metadata.base_url.is_empty() {
            anyhow::bail!("Metadata base URL cannot be empty");
        }

        if self.sources.check_url.is_empty() {
            anyhow::bail!("Availability check URL cannot be empty");
        }

        for (name, template) in [
            ("primary_template", &self.sources.primary_template),
            ("alternate_template", &self.sources.alternate_template),
        ] {
            for placeholder in ["{id}", "{season}", "{episode}"] {
                if !template.contains(placeholder) {
                    anyhow::bail!("sources.{name} is missing the {placeholder} placeholder");
                }
            }
        }

        if self.watch.continue_watching_capacity == 0 {
            anyhow::bail!("Continue-watching capacity must be > 0");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.catalog.episodes_per_season, 20);
        assert_eq!(config.watch.continue_watching_capacity, 20);
        assert_eq!(config.metadata.cache_ttl_seconds, 3600);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[sources]"));
        assert!(toml_str.contains("[watch]"));
    }

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
            [general]
            log_level = "debug"

            [catalog]
            episodes_per_season = 12
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.catalog.episodes_per_season, 12);

        assert_eq!(config.metadata.language, "fr-FR");
    }

    #[test]
    fn test_validate_rejects_template_without_placeholder() {
        let mut config = Config::default();
        config.sources.alternate_template = "https://example.org/tv?id={id}".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("{season}"));
    }
}
