//! Resolving provider entries into constructible classes.

use std::sync::Arc;

use futures::future::try_join_all;
use hearth_manifest::{AppEnvironment, ProviderEntry};
use tracing::debug;

use crate::error::ProviderError;
use crate::importer::{Export, Importer, ProviderClass};

const LOG_TARGET: &str = "hearth::providers";

/// Imports provider modules and validates their default export.
///
/// Imports for different entries run concurrently; the resulting classes
/// keep manifest order so instantiation is deterministic.
pub struct ProviderResolver<C> {
    importer: Arc<dyn Importer<C>>,
}

impl<C> Clone for ProviderResolver<C> {
    fn clone(&self) -> Self {
        Self {
            importer: Arc::clone(&self.importer),
        }
    }
}

impl<C> std::fmt::Debug for ProviderResolver<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderResolver").finish_non_exhaustive()
    }
}

impl<C> ProviderResolver<C> {
    /// Creates a resolver delegating to `importer`.
    #[must_use]
    pub fn new(importer: Arc<dyn Importer<C>>) -> Self {
        Self { importer }
    }

    /// Resolves every entry active in `target`.
    ///
    /// An [`AppEnvironment::Unknown`] target resolves nothing. Modules
    /// without any export are no-op providers and are skipped.
    ///
    /// # Errors
    ///
    /// Returns the first import failure, or a [`ProviderError`] when a
    /// module lacks a `default` export or exports something other than a
    /// provider class.
    pub async fn resolve(
        &self,
        entries: &[ProviderEntry],
        target: AppEnvironment,
    ) -> Result<Vec<ProviderClass<C>>, ProviderError> {
        let active: Vec<&ProviderEntry> = entries
            .iter()
            .filter(|entry| entry.is_active_in(target))
            .collect();
        debug!(
            target: LOG_TARGET,
            environment = %target,
            declared = entries.len(),
            active = active.len(),
            "resolving providers"
        );

        let resolved =
            try_join_all(active.into_iter().map(|entry| self.resolve_entry(entry))).await?;
        Ok(resolved.into_iter().flatten().collect())
    }

    async fn resolve_entry(
        &self,
        entry: &ProviderEntry,
    ) -> Result<Option<ProviderClass<C>>, ProviderError> {
        let specifier = entry.file();
        let module = self.importer.import(specifier).await?;
        if module.is_empty() {
            debug!(target: LOG_TARGET, module = %specifier, "module has no exports, skipping");
            return Ok(None);
        }
        match module.default_export() {
            None => Err(ProviderError::MissingDefaultExport {
                specifier: specifier.clone(),
            }),
            Some(Export::Class(class)) => Ok(Some(class.clone())),
            Some(export @ Export::Value(_)) => Err(ProviderError::NotAClass {
                specifier: specifier.clone(),
                export: export.render(),
            }),
        }
    }
}
