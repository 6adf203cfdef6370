use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::config::SourcesConfig;
use crate::domain::PlaybackKey;
use crate::services::availability::AvailabilityCheck;

#[derive(Debug, Deserialize)]
struct CheckResponse {
    status: u16,
    #[serde(default)]
    result: Option<CheckResult>,
}

#[derive(Debug, Deserialize)]
struct CheckResult {
    /// Sent as a string by the endpoint; numbers are accepted too.
    #[serde(rename = "totalItems")]
    total_items: serde_json::Value,
}

impl CheckResponse {
    /// Available only for a successful response with exactly one match.
    fn is_single_match(&self) -> bool {
        if self.status != 200 {
            return false;
        }

        match self.result.as_ref().map(|r| &r.total_items) {
            Some(serde_json::Value::String(s)) => s.trim() == "1",
            Some(serde_json::Value::Number(n)) => n.as_u64() == Some(1),
            _ => false,
        }
    }
}

/// Client for the remote existence check of the dubbed source.
#[derive(Clone)]
pub struct AvailabilityClient {
    client: Client,
    check_url: String,
}

impl AvailabilityClient {
    #[must_use]
    pub fn new(config: &SourcesConfig) -> Self {
        Self {
            client: Client::builder()
                .user_agent("Episodic/0.1")
                .timeout(Duration::from_secs(config.request_timeout_seconds))
                .build()
                .unwrap_or_else(|_| Client::new()),
            check_url: config.check_url.clone(),
        }
    }

    pub async fn check(&self, key: PlaybackKey) -> Result<bool> {
        let mut url = Url::parse(&self.check_url)?;
        url.query_pairs_mut()
            .append_pair("id", &key.series.to_string())
            .append_pair("sa", &key.episode.season().to_string())
            .append_pair("epi", &key.episode.episode().to_string());

        debug!(%key, "Checking primary source availability");
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(anyhow::anyhow!("Availability check error: {}", status));
        }

        let body: CheckResponse = response.json().await?;
        Ok(body.is_single_match())
    }
}

#[async_trait]
impl AvailabilityCheck for AvailabilityClient {
    async fn primary_available(&self, key: PlaybackKey) -> Result<bool> {
        self.check(key).await
    }
}
