//! Tracing subscriber setup.
//!
//! `RUST_LOG` drives the filter (default `info`); [`LogFormat`] picks
//! human-readable or JSON lines.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::config::LogFormat;
use crate::error::Error;

const DEFAULT_FILTER: &str = "info";

/// Installs the global subscriber. Call once, from `main`.
pub fn init(format: LogFormat) -> Result<(), Error> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(DEFAULT_FILTER))
        .map_err(|e| Error::Telemetry(e.to_string()))?;

    let layer = match format {
        LogFormat::Json => tracing_subscriber::fmt::layer().json().with_filter(filter).boxed(),
        LogFormat::Text => tracing_subscriber::fmt::layer().with_filter(filter).boxed(),
    };

    tracing_subscriber::registry()
        .with(layer)
        .try_init()
        .map_err(|e| Error::Telemetry(e.to_string()))
}
