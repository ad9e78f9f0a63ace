//! HTTP clients for the two external APIs.
//!
//! Both share one `reqwest::Client` and map non-success responses to
//! [`Error::Upstream`](crate::Error::Upstream).

use reqwest::Response;

use crate::{Error, Result};

mod mackerel;
mod nature;

pub use mackerel::MackerelClient;
pub use nature::NatureClient;

// ---

/// Pass successful responses through, turn anything else into an error.
async fn check_status(service: &'static str, response: Response) -> Result<Response> {
    // ---
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    tracing::error!("{} responded with {}: {}", service, status, body);
    Err(Error::Upstream {
        service,
        status,
        body,
    })
}
