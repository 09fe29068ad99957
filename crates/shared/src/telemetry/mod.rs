//! Tracing setup for the service.
//!
//! Events go to the console through the `fmt` layer and, best-effort, to a
//! Seq server through [`SeqLayer`].

mod seq;

pub use seq::{ClefRecord, QUEUE_CAPACITY, SeqLayer, ingest_url, seq_level};

use thiserror::Error;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::AppConfig;

/// Value of the `app` property attached to every shipped event.
pub const APP_NAME: &str = "upload-api";

/// Telemetry setup errors.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// A global subscriber was already installed.
    #[error("failed to install tracing subscriber: {0}")]
    Init(#[from] tracing_subscriber::util::TryInitError),

    /// The HTTP client shipping events to Seq could not be built.
    #[error("failed to build log sink client: {0}")]
    SinkClient(#[from] reqwest::Error),
}

/// Filter used when `RUST_LOG` is not set.
#[must_use]
pub const fn default_filter(debug: bool) -> &'static str {
    if debug {
        "upgate=debug,tower_http=debug"
    } else {
        "upgate=info,tower_http=info"
    }
}

/// Installs the global subscriber.
///
/// Must be called from within a tokio runtime; the Seq layer spawns its
/// shipping task on it.
pub fn init_telemetry(config: &AppConfig) -> Result<(), TelemetryError> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter(config.debug).into()),
        )
        .with(fmt::layer())
        .with(SeqLayer::spawn(&config.seq.url, APP_NAME)?)
        .try_init()?;

    Ok(())
}
