//! Configuration loader for the `remo-mackerel` bridge.
//!
//! This module centralizes all runtime configuration values and their defaults,
//! loading from environment variables (with optional `.env` file support
//! provided by the caller). The resulting [`Config`] is built once at startup
//! and handed to the pipeline by reference.
use std::env;

use crate::{Error, Result};

/// Default base URL of the Nature Remo Cloud API.
pub const DEFAULT_NATURE_API_URL: &str = "https://api.nature.global/1";

/// Default base URL of the Mackerel API.
pub const DEFAULT_MACKEREL_API_URL: &str = "https://api.mackerelio.com/api/v0";

/// Parse a required string variable; blank values count as missing.
macro_rules! require_var {
    ($lookup:expr, $var_name:expr) => {
        match $lookup($var_name) {
            Some(v) if !v.trim().is_empty() => v.trim().to_string(),
            _ => {
                return Err(Error::Configuration(format!(
                    "{} must be set in .env or environment",
                    $var_name
                )))
            }
        }
    };
}

/// Parse an optional boolean variable with a default value.
macro_rules! parse_var_bool {
    ($lookup:expr, $var_name:expr, $default:expr) => {
        match $lookup($var_name).as_deref().map(str::trim) {
            None | Some("") => $default,
            Some("1") | Some("true") | Some("yes") => true,
            Some("0") | Some("false") | Some("no") => false,
            Some(other) => {
                return Err(Error::Configuration(format!(
                    "Invalid {}: '{}' is not a boolean",
                    $var_name, other
                )))
            }
        }
    };
}

/// Strongly typed application configuration.
///
/// All fields are immutable after loading, ensuring a consistent configuration
/// snapshot for the lifetime of the run.
#[derive(Debug, Clone)]
pub struct Config {
    // ---
    /// Bearer token for the Nature Remo Cloud API.
    pub nature_token: String,

    /// Mackerel API key (needs write permission).
    pub mackerel_token: String,

    /// Mackerel host that receives every metric point.
    pub mackerel_host_id: String,

    /// Id of the Nature Remo whose sensors are reported.
    pub target_device_id: String,

    /// Nature Remo Cloud API base URL, without trailing slash.
    pub nature_api_url: String,

    /// Mackerel API base URL, without trailing slash.
    pub mackerel_api_url: String,

    /// Build and log the batch but skip the push.
    pub dry_run: bool,
}

/// Load configuration from environment variables with defaults.
///
/// Required:
/// - `NATURE_TOKEN` – Nature Remo Cloud API access token
/// - `MACKEREL_TOKEN` – Mackerel API key
/// - `MACKEREL_HOST_ID` – Mackerel host id that owns the metrics
/// - `TARGET_NATURE_REMO_ID` – Nature Remo device id to read sensors from
///
/// Optional:
/// - `NATURE_API_URL` – API base URL (default: [`DEFAULT_NATURE_API_URL`])
/// - `MACKEREL_API_URL` – API base URL (default: [`DEFAULT_MACKEREL_API_URL`])
/// - `DRY_RUN` – skip the push (default: false)
///
/// Returns an error if any required variable is missing or invalid.
pub fn load_from_env() -> Result<Config> {
    // ---
    load_with(|name| env::var(name).ok())
}

/// Load configuration through an arbitrary variable lookup.
pub fn load_with<F>(lookup: F) -> Result<Config>
where
    F: Fn(&str) -> Option<String>,
{
    // ---
    let nature_token = require_var!(lookup, "NATURE_TOKEN");
    let mackerel_token = require_var!(lookup, "MACKEREL_TOKEN");
    let mackerel_host_id = require_var!(lookup, "MACKEREL_HOST_ID");
    let target_device_id = require_var!(lookup, "TARGET_NATURE_REMO_ID");
    let nature_api_url = base_url(lookup("NATURE_API_URL"), DEFAULT_NATURE_API_URL);
    let mackerel_api_url = base_url(lookup("MACKEREL_API_URL"), DEFAULT_MACKEREL_API_URL);
    let dry_run = parse_var_bool!(lookup, "DRY_RUN", false);

    Ok(Config {
        nature_token,
        mackerel_token,
        mackerel_host_id,
        target_device_id,
        nature_api_url,
        mackerel_api_url,
        dry_run,
    })
}

fn base_url(value: Option<String>, default: &str) -> String {
    // ---
    let url = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string());
    url.trim_end_matches('/').to_string()
}

/// Keep the first four characters of a secret, mask the rest.
fn mask(secret: &str) -> String {
    // ---
    let visible: String = secret.chars().take(4).collect();
    format!("{visible}****")
}

impl Config {
    /// Log the loaded configuration for debugging purposes.
    ///
    /// Masks both API tokens while showing all other values that were loaded.
    pub fn log_config(&self) {
        // ---
        tracing::info!("Configuration loaded:");
        tracing::info!("  NATURE_TOKEN          : {}", mask(&self.nature_token));
        tracing::info!("  MACKEREL_TOKEN        : {}", mask(&self.mackerel_token));
        tracing::info!("  MACKEREL_HOST_ID      : {}", self.mackerel_host_id);
        tracing::info!("  TARGET_NATURE_REMO_ID : {}", self.target_device_id);
        tracing::info!("  NATURE_API_URL        : {}", self.nature_api_url);
        tracing::info!("  MACKEREL_API_URL      : {}", self.mackerel_api_url);
        tracing::info!("  DRY_RUN               : {}", self.dry_run);
    }
}
