//! Importing preload modules.
//!
//! Preloads are independent side-effect modules such as route tables, so
//! unlike providers they are imported concurrently. Optional entries whose
//! module cannot be found are skipped; every other failure aborts the call.

use std::fmt;
use std::sync::Arc;

use futures::future::try_join_all;
use hearth_manifest::{AppEnvironment, PreloadEntry};
use tracing::debug;

use crate::error::ImportError;
use crate::importer::Importer;

const LOG_TARGET: &str = "hearth::preloads";

/// One-shot importer for the preload entries of a boot cycle.
pub struct PreloadRunner<C> {
    importer: Arc<dyn Importer<C>>,
    entries: Vec<PreloadEntry>,
}

impl<C> fmt::Debug for PreloadRunner<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreloadRunner")
            .field("entries", &self.entries)
            .finish_non_exhaustive()
    }
}

impl<C> PreloadRunner<C> {
    /// Creates a runner importing through `importer`.
    #[must_use]
    pub fn new(importer: Arc<dyn Importer<C>>) -> Self {
        Self {
            importer,
            entries: Vec::new(),
        }
    }

    /// Sets the entries for the next [`import`](Self::import) call,
    /// replacing any still queued.
    pub fn use_preloads(&mut self, entries: impl IntoIterator<Item = PreloadEntry>) -> &mut Self {
        self.entries = entries.into_iter().collect();
        self
    }

    /// Number of queued entries.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.entries.len()
    }

    /// Imports every queued entry active in `target`, then clears the queue.
    ///
    /// An [`AppEnvironment::Unknown`] target imports nothing.
    ///
    /// # Errors
    ///
    /// Returns the first import failure, except
    /// [`ImportError::ModuleNotFound`] for entries marked optional.
    pub async fn import(&mut self, target: AppEnvironment) -> Result<(), ImportError> {
        let active: Vec<&PreloadEntry> = self
            .entries
            .iter()
            .filter(|entry| entry.is_active_in(target))
            .collect();
        debug!(
            target: LOG_TARGET,
            environment = %target,
            declared = self.entries.len(),
            active = active.len(),
            "importing preloads"
        );

        try_join_all(active.into_iter().map(|entry| self.import_entry(entry))).await?;
        self.entries.clear();
        Ok(())
    }

    async fn import_entry(&self, entry: &PreloadEntry) -> Result<(), ImportError> {
        match self.importer.import(entry.file()).await {
            Ok(_) => Ok(()),
            Err(error) if error.is_not_found() && entry.is_optional() => {
                debug!(
                    target: LOG_TARGET,
                    module = %entry.file(),
                    "optional preload not found, skipping"
                );
                Ok(())
            }
            Err(error) => Err(error),
        }
    }
}
