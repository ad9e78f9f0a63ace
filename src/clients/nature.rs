use reqwest::header::ACCEPT;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::check_status;
use crate::{Appliance, Device, Result};

const SERVICE: &str = "Nature Remo Cloud API";

// ---

/// Read-only client for the Nature Remo Cloud API.
#[derive(Debug, Clone)]
pub struct NatureClient {
    // ---
    http: Client,
    base_url: String,
    token: String,
}

impl NatureClient {
    pub fn new(http: Client, base_url: &str, token: &str) -> Self {
        // ---
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        }
    }

    /// `GET /devices`
    pub async fn devices(&self) -> Result<Vec<Device>> {
        self.get("devices").await
    }

    /// `GET /appliances`
    pub async fn appliances(&self) -> Result<Vec<Appliance>> {
        self.get("appliances").await
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        // ---
        let url = format!("{}/{}", self.base_url, path);
        debug!("Fetching {}", url);

        let response = self
            .http
            .get(&url)
            .header(ACCEPT, "application/json")
            .bearer_auth(&self.token)
            .send()
            .await?;

        let body = check_status(SERVICE, response).await?.json().await?;
        Ok(body)
    }
}
