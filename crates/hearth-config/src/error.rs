//! Errors raised while loading configuration inputs from disk.

use std::sync::Arc;

use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors arising while reading the config directory or package metadata.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A config file or directory could not be read.
    #[error("failed to read '{path}': {source}")]
    Read {
        /// Path that was being read.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: Arc<std::io::Error>,
    },

    /// A config file contained malformed TOML or JSON.
    #[error("failed to parse '{path}': {message}")]
    Syntax {
        /// Offending file.
        path: Utf8PathBuf,
        /// Parser diagnostic.
        message: String,
    },

    /// A config file parsed but did not produce a table at its root.
    #[error("config file '{path}' must contain a table at its root")]
    NotATable {
        /// Offending file.
        path: Utf8PathBuf,
    },

    /// A config file name is not valid UTF-8.
    #[error("config directory '{directory}' contains a non UTF-8 file name")]
    NonUtf8Path {
        /// Directory being scanned.
        directory: Utf8PathBuf,
    },

    /// The package version in `Cargo.toml` is not valid semver.
    #[error("invalid package version '{version}' in '{path}': {source}")]
    InvalidVersion {
        /// Manifest path.
        path: Utf8PathBuf,
        /// Raw version string.
        version: String,
        /// Semver parse failure.
        #[source]
        source: semver::Error,
    },
}

impl ConfigError {
    pub(crate) fn read(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source: Arc::new(source),
        }
    }
}
