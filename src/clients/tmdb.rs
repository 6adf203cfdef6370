use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::config::MetadataConfig;
use crate::constants::limits::MAX_RECOMMENDATIONS;
use crate::domain::SeriesId;
use crate::models::series::{Recommendation, SeriesDetails};
use crate::services::metadata::MetadataProvider;

#[derive(Debug, Deserialize)]
struct PagedResponse<T> {
    results: Vec<T>,
}

#[derive(Clone)]
pub struct TmdbClient {
    client: Client,
    base_url: String,
    api_key: String,
    language: String,
}

impl TmdbClient {
    #[must_use]
    pub fn new(config: &MetadataConfig) -> Self {
        Self {
            client: Client::builder()
                .user_agent("Episodic/0.1")
                .timeout(Duration::from_secs(config.request_timeout_seconds))
                .build()
                .unwrap_or_else(|_| Client::new()),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            language: config.language.clone(),
        }
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        let mut url = Url::parse(&format!("{}{}", self.base_url, path))?;
        url.query_pairs_mut()
            .append_pair("api_key", &self.api_key)
            .append_pair("language", &self.language);
        Ok(url)
    }

    pub async fn get_series(&self, id: SeriesId) -> Result<Option<SeriesDetails>> {
        let mut url = self.endpoint(&format!("/tv/{id}"))?;
        url.query_pairs_mut()
            .append_pair("append_to_response", "credits,videos");

        debug!(series = %id, "Fetching series details");
        let response = self.client.get(url).send().await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("TMDB API error: {} - {}", status, body));
        }

        Ok(Some(response.json().await?))
    }

    pub async fn get_recommendations(&self, id: SeriesId) -> Result<Vec<Recommendation>> {
        let url = self.endpoint(&format!("/tv/{id}/recommendations"))?;

        debug!(series = %id, "Fetching recommendations");
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("TMDB API error: {} - {}", status, body));
        }

        let page: PagedResponse<Recommendation> = response.json().await?;
        Ok(page.results.into_iter().take(MAX_RECOMMENDATIONS).collect())
    }
}

#[async_trait]
impl MetadataProvider for TmdbClient {
    async fn series(&self, id: SeriesId) -> Result<Option<SeriesDetails>> {
        self.get_series(id).await
    }

    async fn recommendations(&self, id: SeriesId) -> Result<Vec<Recommendation>> {
        self.get_recommendations(id).await
    }
}
