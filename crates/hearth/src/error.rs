//! Errors surfaced by the application lifecycle.
//!
//! Failures from user code (providers, hooks, start callbacks, importers)
//! are carried in transparent variants, so their message and source chain
//! reach the caller unchanged.

use std::error::Error as StdError;

use hearth_config::ConfigError;
use hearth_manifest::{AppEnvironment, ManifestError};
use hearth_providers::{ImportError, ProviderError};
use thiserror::Error;

use crate::state::ApplicationState;
use crate::telemetry::TelemetryError;

/// Errors returned by [`Application`](crate::Application) transitions.
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// The environment was changed after providers began resolving.
    #[error(
        "E_CANNOT_SWITCH_ENVIRONMENT: cannot switch environment to '{requested}' \
         once the application has started booting (state: {state})"
    )]
    CannotSwitchEnvironment {
        /// Environment that was requested.
        requested: AppEnvironment,
        /// State at the time of the request.
        state: ApplicationState,
    },

    /// The rc file was unreadable or malformed.
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// The config directory or package metadata could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Provider resolution or a provider hook failed.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// A preload module failed to import.
    #[error(transparent)]
    Import(#[from] ImportError),

    /// A lifecycle hook or the start callback failed.
    #[error(transparent)]
    Hook(anyhow::Error),

    /// The tracing subscriber could not be installed.
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
}

impl ApplicationError {
    /// Stable error code, when the failure did not originate in user code.
    #[must_use]
    pub const fn code(&self) -> Option<&'static str> {
        match self {
            Self::CannotSwitchEnvironment { .. } => Some("E_CANNOT_SWITCH_ENVIRONMENT"),
            Self::Manifest(error) => Some(error.code()),
            Self::Provider(error) => error.code(),
            Self::Import(error) => error.code(),
            Self::Config(_) | Self::Hook(_) | Self::Telemetry(_) => None,
        }
    }
}

/// Errors returned by [`Container::make`](crate::Container::make).
#[derive(Debug, Error)]
pub enum ContainerError {
    /// Nothing is bound under the key.
    #[error("nothing is bound to '{key}' in the container")]
    NotBound {
        /// Requested key.
        key: String,
    },

    /// The binding resolved to a different type.
    #[error("binding '{key}' does not resolve to {expected}")]
    TypeMismatch {
        /// Requested key.
        key: String,
        /// Requested type name.
        expected: &'static str,
    },

    /// The binding's factory failed.
    #[error("failed to resolve '{key}': {source}")]
    Factory {
        /// Requested key.
        key: String,
        /// Factory error.
        #[source]
        source: Box<dyn StdError + Send + Sync + 'static>,
    },
}
