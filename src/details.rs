//! Altmetric public API client for single research outputs.
//!
//! Unauthenticated, keyed by the Altmetric ID found in badge URLs:
//! `GET https://api.altmetric.com/v1/id/{id}`.

use crate::config::DEFAULT_PAGE_DELAY;
use crate::error::{AltmetricError, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info};

/// Public API base URL
const PUBLIC_API_BASE: &str = "https://api.altmetric.com";

/// Article details returned by the public API (subset)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArticleDetails {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub doi: Option<String>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub details_url: Option<String>,
    /// Remaining fields as returned
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

/// Client for the public details endpoint
pub struct DetailsClient {
    client: Client,
    base_url: String,
    delay: Duration,
}

impl DetailsClient {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(15))
            .user_agent(concat!("rustaltmetric/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AltmetricError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: PUBLIC_API_BASE.to_string(),
            delay: DEFAULT_PAGE_DELAY,
        })
    }

    /// Point the client at another host (mock servers, mirrors)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Look up an output by Altmetric ID.
    ///
    /// Returns `Ok(None)` for any non-200 status; transport errors propagate.
    pub async fn article_details(&self, altmetric_id: &str) -> Result<Option<ArticleDetails>> {
        tokio::time::sleep(self.delay).await;

        let url = format!("{}/v1/id/{}", self.base_url, altmetric_id);
        debug!(url = %url, "Fetching article details");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if status != reqwest::StatusCode::OK {
            info!(id = altmetric_id, status = status.as_u16(), "No article details");
            return Ok(None);
        }

        let body = response.text().await?;
        let details = serde_json::from_str(&body).map_err(|e| {
            AltmetricError::Parse(format!("Failed to parse article details: {}", e))
        })?;
        Ok(Some(details))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_article_details_keeps_unknown_fields() -> std::result::Result<(), serde_json::Error> {
        let details: ArticleDetails = serde_json::from_value(json!({
            "title": "Rethinking Covid-19 Test Sensitivity",
            "doi": "10.1056/nejmp2025631",
            "score": 2863.5,
            "cited_by_tweeters_count": 3000
        }))?;
        assert_eq!(details.title, "Rethinking Covid-19 Test Sensitivity");
        assert_eq!(details.score, Some(2863.5));
        assert!(details.extra.contains_key("cited_by_tweeters_count"));
        Ok(())
    }
}
