//! Process-wide log output for an application.
//!
//! The first successful [`initialise`] owns the global `tracing` slot for
//! the life of the process. Events go to stderr with RFC 3339 UTC times,
//! coloured only when stderr is a terminal.

use std::io::{self, IsTerminal};

use hearth_config::{LogFormat, LoggerConfig};
use once_cell::sync::OnceCell;
use tracing::{Subscriber, subscriber::SetGlobalDefaultError};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;

static INSTALLED: OnceCell<()> = OnceCell::new();

type BoxedSubscriber = Box<dyn Subscriber + Send + Sync>;

/// Proof that application logging is in place.
#[derive(Debug, Default, Clone, Copy)]
pub struct TelemetryHandle;

/// Reasons the application logger could not be installed.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// `logger.level` is not a valid filter directive.
    #[error("invalid log filter '{filter}': {message}")]
    Filter {
        /// Rejected expression.
        filter: String,
        /// Parser diagnostic.
        message: String,
    },
    /// Some other code set the global subscriber first.
    #[error("failed to install telemetry subscriber: {0}")]
    Subscriber(SetGlobalDefaultError),
}

/// Routes application events through a subscriber built from `logger`.
///
/// Only the first successful call installs anything; the logger settings of
/// later calls are ignored.
///
/// # Errors
///
/// Returns [`TelemetryError::Filter`] for an unparsable filter and
/// [`TelemetryError::Subscriber`] when the global slot is already taken.
///
/// # Examples
///
/// ```rust
/// use hearth::telemetry;
/// use hearth_config::LoggerConfig;
///
/// # fn main() -> Result<(), hearth::telemetry::TelemetryError> {
/// let logger = LoggerConfig::default();
/// telemetry::initialise(&logger)?;
/// telemetry::initialise(&logger)?;
/// # Ok(())
/// # }
/// ```
pub fn initialise(logger: &LoggerConfig) -> Result<TelemetryHandle, TelemetryError> {
    INSTALLED
        .get_or_try_init(|| {
            let subscriber = build_subscriber(logger)?;
            tracing::subscriber::set_global_default(subscriber).map_err(TelemetryError::Subscriber)
        })
        .map(|_| TelemetryHandle)
}

fn parse_filter(logger: &LoggerConfig) -> Result<EnvFilter, TelemetryError> {
    EnvFilter::try_new(logger.filter()).map_err(|error| TelemetryError::Filter {
        filter: logger.filter().to_owned(),
        message: error.to_string(),
    })
}

fn build_subscriber(logger: &LoggerConfig) -> Result<BoxedSubscriber, TelemetryError> {
    let base = fmt::Subscriber::builder()
        .with_env_filter(parse_filter(logger)?)
        .with_target(true)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_timer(fmt::time::UtcTime::rfc_3339());

    Ok(match logger.format() {
        LogFormat::Json => Box::new(base.json().flatten_event(true).finish()),
        LogFormat::Compact => Box::new(base.compact().finish()),
    })
}
