use reqwest::header::ACCEPT;
use reqwest::Client;
use tracing::info;

use super::check_status;
use crate::{MetricPoint, Result};

const SERVICE: &str = "Mackerel API";
const API_KEY_HEADER: &str = "X-Api-Key";

// ---

/// Write-only client for Mackerel host metrics.
#[derive(Debug, Clone)]
pub struct MackerelClient {
    // ---
    http: Client,
    base_url: String,
    api_key: String,
}

impl MackerelClient {
    pub fn new(http: Client, base_url: &str, api_key: &str) -> Self {
        // ---
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    /// `POST /tsdb` with the whole batch in a single request.
    pub async fn post_metrics(&self, points: &[MetricPoint]) -> Result<()> {
        // ---
        let url = format!("{}/tsdb", self.base_url);
        info!("Posting {} metric points to {}", points.len(), url);

        let response = self
            .http
            .post(&url)
            .header(ACCEPT, "application/json")
            .header(API_KEY_HEADER, &self.api_key)
            .json(points)
            .send()
            .await?;

        check_status(SERVICE, response).await?;
        Ok(())
    }
}
