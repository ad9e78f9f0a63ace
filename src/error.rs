//! Error taxonomy for a single pull-transform-push run.
//!
//! Every variant aborts the run. Nothing is retried and no partial batch is
//! ever submitted, so callers only need to surface the error.

/// Errors produced by the library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    // ---
    /// A required setting is missing or an optional one is malformed.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The target device is not in the device list.
    #[error("Target device not found: {device_id}")]
    NotFound { device_id: String },

    /// A required smart meter property, appliance, or timestamp is missing.
    #[error("Incomplete data: {0}")]
    IncompleteData(String),

    /// The cumulative energy unit code is not in the ECHONET Lite table.
    #[error("Invalid cumulative energy unit code: {0}")]
    InvalidUnitCode(String),

    /// A reported value cannot be read as a finite number.
    #[error("Non-numeric value for metric '{metric}': {value}")]
    NonNumericValue { metric: String, value: String },

    /// Two points in the same batch share a metric name.
    #[error("Duplicate metric name in batch: {0}")]
    DuplicateMetric(String),

    /// An external API answered with a non-success status.
    #[error("{service} responded with {status}: {body}")]
    Upstream {
        service: &'static str,
        status: reqwest::StatusCode,
        body: String,
    },

    /// Transport or payload decoding failure from the HTTP client.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
