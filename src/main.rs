//! Application entry point for the `remo-mackerel` bridge.
//!
//! Each invocation performs exactly one cycle and exits:
//! - Loading configuration from environment variables or `.env`
//! - Initializing structured logging/tracing
//! - Fetching devices and appliances from the Nature Remo Cloud API
//! - Converting sensor and smart meter values into Mackerel metric points
//! - Posting the whole batch to Mackerel in one request
//!
//! Scheduling is left to the host (cron, systemd timer, ...). Any error makes
//! the process exit non-zero; the next invocation starts from scratch.
//!
//! # Environment Variables
//! - `NATURE_TOKEN`, `MACKEREL_TOKEN`, `MACKEREL_HOST_ID`,
//!   `TARGET_NATURE_REMO_ID` (**required**)
//! - `NATURE_API_URL`, `MACKEREL_API_URL`, `DRY_RUN` (optional)
//! - `REMO_LOG_LEVEL` (optional) – log verbosity (default: `info`)
//! - `REMO_SPAN_EVENTS` (optional) – span event mode for tracing
use std::env;

use anyhow::Result;
use dotenvy::dotenv;
use is_terminal::IsTerminal;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;

use remo_mackerel::{config, pipeline};

// ---

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // ---
    dotenv().ok();
    init_tracing();

    let cfg = config::load_from_env()?;
    cfg.log_config();

    let summary = pipeline::run(&cfg).await.inspect_err(|e| {
        tracing::error!("Run aborted: {}", e);
    })?;

    tracing::info!(
        "Run complete: {} points from '{}' and '{}' (submitted: {})",
        summary.point_count,
        summary.device_name,
        summary.smart_meter_name,
        summary.submitted
    );

    Ok(())
}

// ---

/// Initialize the global tracing subscriber for structured logging.
///
/// This function configures the [`tracing_subscriber`] with:
/// - Log target, file, and line number output enabled
/// - Color output controlled by TTY detection and `FORCE_COLOR` env var:
///   - `FORCE_COLOR=1|true|yes`: force colors on
///   - `FORCE_COLOR=0|false|no`: force colors off
///   - unset or other values: auto-detect TTY
/// - Span event emission mode controlled by the `REMO_SPAN_EVENTS` env var:
///   - `"full"`       : emit ENTER, EXIT, and CLOSE events with timing
///   - `"enter_exit"` : emit ENTER and EXIT only
///   - unset or other values: emit CLOSE events only (default)
/// - Log level controlled by `RUST_LOG`, falling back to `REMO_LOG_LEVEL`
///
/// Called once at startup before any logging macros are invoked.
fn init_tracing() {
    // ---
    let span_events = match env::var("REMO_SPAN_EVENTS").as_deref() {
        Ok("full") => FmtSpan::FULL,
        Ok("enter_exit") => FmtSpan::ENTER | FmtSpan::EXIT,
        _ => FmtSpan::CLOSE,
    };

    let use_color = match env::var("FORCE_COLOR").as_deref() {
        Ok("1") | Ok("true") | Ok("yes") => true,
        Ok("0") | Ok("false") | Ok("no") => false,
        _ => std::io::stdout().is_terminal(),
    };

    // Use RUST_LOG if available, otherwise fall back to REMO_LOG_LEVEL
    let env_filter = if env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        let level = match env::var("REMO_LOG_LEVEL").ok().as_deref() {
            Some("trace") => "trace",
            Some("debug") => "debug",
            Some("info") => "info",
            Some("warn") => "warn",
            Some("error") => "error",
            _ => "info",
        };
        EnvFilter::new(format!("{level},hyper=warn,reqwest=warn"))
    };

    tracing_subscriber::fmt()
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_span_events(span_events)
        .with_env_filter(env_filter)
        .with_ansi(use_color)
        .compact()
        .init();
}
