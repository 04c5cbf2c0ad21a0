//! Logging bootstrap for the register decoder tools
//!
//! Installs a console subscriber writing to stderr, so stdout stays free for
//! decoded output. `RUST_LOG` takes precedence over the configured level.

use serde::{Deserialize, Serialize};
use tracing_subscriber::{
    fmt::{format::Writer, FmtContext, FormatEvent, FormatFields},
    registry::LookupSpan,
    EnvFilter,
};

use crate::{Error, Result};

/// Plain-text event format: `timestamp [LEVEL] message`, no colors
///
/// Example output: `2025-12-02T00:50:44.809Z [INFO] Decoded 120 samples`
pub struct BracketedLevelFormat;

impl<S, N> FormatEvent<S, N> for BracketedLevelFormat
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        write!(
            writer,
            "{} [{}] ",
            chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ"),
            event.metadata().level()
        )?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Logger configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Level or full filter spec (e.g. "info" or "warn,regcodec=debug")
    pub level: String,
    /// Emit JSON lines instead of the bracketed text format
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            json: false,
        }
    }
}

/// Build the event filter, preferring `RUST_LOG` when it is set
pub fn build_filter(level: &str) -> Result<EnvFilter> {
    if let Ok(env_str) = std::env::var(EnvFilter::DEFAULT_ENV) {
        if !env_str.is_empty() {
            return EnvFilter::try_new(&env_str)
                .map_err(|e| Error::Logging(format!("Invalid RUST_LOG '{}': {}", env_str, e)));
        }
    }
    EnvFilter::try_new(level)
        .map_err(|e| Error::Logging(format!("Invalid log level '{}': {}", level, e)))
}

/// Install the global subscriber
///
/// Fails if a global subscriber is already installed.
pub fn init(config: &LogConfig) -> Result<()> {
    let filter = build_filter(&config.level)?;

    let result = if config.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init()
    } else {
        tracing_subscriber::fmt()
            .with_ansi(false)
            .event_format(BracketedLevelFormat)
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init()
    };

    result.map_err(|e| Error::Logging(e.to_string()))
}
