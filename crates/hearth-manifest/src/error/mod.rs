//! Validation errors raised while parsing the rc manifest.
//!
//! Every entry-level variant carries the offending entry rendered as compact
//! JSON so users can locate it in their rc file, and exposes the name of the
//! missing or invalid field through [`ManifestError::field`]. Codes returned
//! by [`ManifestError::code`] are stable and safe to match on.

use std::sync::Arc;

use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors arising from manifest validation and rc-file loading.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// A preload entry in object form has no `file` property.
    #[error("E_MISSING_PRELOAD_FILE: invalid preload entry {entry}: missing \"file\" property")]
    MissingPreloadFile {
        /// Offending entry.
        entry: String,
    },

    /// A preload entry's `file` property is not a module specifier.
    #[error(
        "E_INVALID_PRELOAD_FILE: invalid preload entry {entry}: the \"file\" property must be a module specifier string"
    )]
    InvalidPreloadFile {
        /// Offending entry.
        entry: String,
    },

    /// A provider entry in object form has no `file` property.
    #[error("E_MISSING_PROVIDER_FILE: invalid provider entry {entry}: missing \"file\" property")]
    MissingProviderFile {
        /// Offending entry.
        entry: String,
    },

    /// A provider entry's `file` property is not a module specifier.
    #[error(
        "E_INVALID_PROVIDER_FILE: invalid provider entry {entry}: the \"file\" property must be a module specifier string"
    )]
    InvalidProviderFile {
        /// Offending entry.
        entry: String,
    },

    /// A meta-file entry in object form has no `pattern` property.
    #[error(
        "E_MISSING_METAFILE_PATTERN: invalid metafile entry {entry}: missing \"pattern\" property"
    )]
    MissingMetaFilePattern {
        /// Offending entry.
        entry: String,
    },

    /// A test suite has no `name` property.
    #[error("E_MISSING_SUITE_NAME: invalid suite entry {entry}: missing \"name\" property")]
    MissingSuiteName {
        /// Offending entry.
        entry: String,
    },

    /// A test suite has no `files` property.
    #[error(
        "E_MISSING_SUITE_FILES: invalid suite entry \"{name}\" {entry}: missing \"files\" property"
    )]
    MissingSuiteFiles {
        /// Suite name.
        name: String,
        /// Offending entry.
        entry: String,
    },

    /// The assets bundler has no `name` property.
    #[error("E_MISSING_BUNDLER_NAME: invalid assetsBundler entry {entry}: missing \"name\" property")]
    MissingBundlerName {
        /// Offending entry.
        entry: String,
    },

    /// The assets bundler has no `devServer` property.
    #[error(
        "E_MISSING_BUNDLER_DEV_SERVER: invalid assetsBundler entry {entry}: missing \"devServer\" property"
    )]
    MissingBundlerDevServer {
        /// Offending entry.
        entry: String,
    },

    /// The assets bundler has no `build` property.
    #[error(
        "E_MISSING_BUNDLER_BUILD: invalid assetsBundler entry {entry}: missing \"build\" property"
    )]
    MissingBundlerBuild {
        /// Offending entry.
        entry: String,
    },

    /// A field is present but has the wrong shape.
    #[error("E_INVALID_MANIFEST_FIELD: invalid \"{field}\" in {entry}: expected {expected}")]
    InvalidField {
        /// Dotted path of the field.
        field: String,
        /// Description of the accepted shape.
        expected: &'static str,
        /// Offending entry (or the field's value for top-level fields).
        entry: String,
    },

    /// The rc file exists but could not be read.
    #[error("E_RC_FILE_READ: failed to read '{path}': {source}")]
    Read {
        /// Rc file path.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: Arc<std::io::Error>,
    },

    /// The rc file is not valid TOML or JSON.
    #[error("E_RC_FILE_SYNTAX: failed to parse '{path}': {message}")]
    Syntax {
        /// Rc file path.
        path: Utf8PathBuf,
        /// Parser diagnostic.
        message: String,
    },
}

impl ManifestError {
    /// Stable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::MissingPreloadFile { .. } => "E_MISSING_PRELOAD_FILE",
            Self::InvalidPreloadFile { .. } => "E_INVALID_PRELOAD_FILE",
            Self::MissingProviderFile { .. } => "E_MISSING_PROVIDER_FILE",
            Self::InvalidProviderFile { .. } => "E_INVALID_PROVIDER_FILE",
            Self::MissingMetaFilePattern { .. } => "E_MISSING_METAFILE_PATTERN",
            Self::MissingSuiteName { .. } => "E_MISSING_SUITE_NAME",
            Self::MissingSuiteFiles { .. } => "E_MISSING_SUITE_FILES",
            Self::MissingBundlerName { .. } => "E_MISSING_BUNDLER_NAME",
            Self::MissingBundlerDevServer { .. } => "E_MISSING_BUNDLER_DEV_SERVER",
            Self::MissingBundlerBuild { .. } => "E_MISSING_BUNDLER_BUILD",
            Self::InvalidField { .. } => "E_INVALID_MANIFEST_FIELD",
            Self::Read { .. } => "E_RC_FILE_READ",
            Self::Syntax { .. } => "E_RC_FILE_SYNTAX",
        }
    }

    /// Name of the missing or invalid field, when the error concerns one.
    #[must_use]
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::MissingPreloadFile { .. }
            | Self::InvalidPreloadFile { .. }
            | Self::MissingProviderFile { .. }
            | Self::InvalidProviderFile { .. } => Some("file"),
            Self::MissingMetaFilePattern { .. } => Some("pattern"),
            Self::MissingSuiteName { .. } | Self::MissingBundlerName { .. } => Some("name"),
            Self::MissingSuiteFiles { .. } => Some("files"),
            Self::MissingBundlerDevServer { .. } => Some("devServer"),
            Self::MissingBundlerBuild { .. } => Some("build"),
            Self::InvalidField { field, .. } => Some(field.as_str()),
            Self::Read { .. } | Self::Syntax { .. } => None,
        }
    }

    /// Offending entry rendered as compact JSON.
    #[must_use]
    pub fn entry(&self) -> Option<&str> {
        match self {
            Self::MissingPreloadFile { entry }
            | Self::InvalidPreloadFile { entry }
            | Self::MissingProviderFile { entry }
            | Self::InvalidProviderFile { entry }
            | Self::MissingMetaFilePattern { entry }
            | Self::MissingSuiteName { entry }
            | Self::MissingSuiteFiles { entry, .. }
            | Self::MissingBundlerName { entry }
            | Self::MissingBundlerDevServer { entry }
            | Self::MissingBundlerBuild { entry }
            | Self::InvalidField { entry, .. } => Some(entry.as_str()),
            Self::Read { .. } | Self::Syntax { .. } => None,
        }
    }
}
