//! Errors raised while importing modules and driving provider hooks.
//!
//! Failures originating in user code (importers, provider hooks) travel
//! inside transparent variants so callers can `downcast_ref` the original
//! error and see its message unchanged.

use hearth_manifest::ModuleSpecifier;
use thiserror::Error;

/// Errors produced by an [`Importer`](crate::Importer).
#[derive(Debug, Error)]
pub enum ImportError {
    /// No module is registered under the specifier.
    #[error("E_MODULE_NOT_FOUND: cannot find module '{specifier}'")]
    ModuleNotFound {
        /// Specifier that was looked up.
        specifier: ModuleSpecifier,
    },

    /// The module exists but evaluating it failed.
    #[error(transparent)]
    Failed(anyhow::Error),
}

impl ImportError {
    /// Builds a not-found error for `specifier`.
    #[must_use]
    pub fn not_found(specifier: &ModuleSpecifier) -> Self {
        Self::ModuleNotFound {
            specifier: specifier.clone(),
        }
    }

    /// Returns `true` for the not-found class of failure.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::ModuleNotFound { .. })
    }

    /// Stable code, when the failure is not user-defined.
    #[must_use]
    pub const fn code(&self) -> Option<&'static str> {
        match self {
            Self::ModuleNotFound { .. } => Some("E_MODULE_NOT_FOUND"),
            Self::Failed(_) => None,
        }
    }
}

/// Errors arising from provider resolution and lifecycle hooks.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The provider module has exports but none named `default`.
    #[error(
        "E_MISSING_DEFAULT_EXPORT: missing default export in provider module '{specifier}'"
    )]
    MissingDefaultExport {
        /// Module that was imported.
        specifier: ModuleSpecifier,
    },

    /// The default export is a plain value rather than a provider class.
    #[error(
        "E_NOT_A_CLASS: default export from module '{specifier}' is not a class: {export}"
    )]
    NotAClass {
        /// Module that was imported.
        specifier: ModuleSpecifier,
        /// Rendered default export.
        export: String,
    },

    /// Importing the provider module failed.
    #[error(transparent)]
    Import(#[from] ImportError),

    /// A provider hook returned an error.
    #[error(transparent)]
    Hook(anyhow::Error),
}

impl ProviderError {
    /// Stable code for resolution failures.
    #[must_use]
    pub const fn code(&self) -> Option<&'static str> {
        match self {
            Self::MissingDefaultExport { .. } => Some("E_MISSING_DEFAULT_EXPORT"),
            Self::NotAClass { .. } => Some("E_NOT_A_CLASS"),
            Self::Import(error) => error.code(),
            Self::Hook(_) => None,
        }
    }
}
