//! Driving provider instances through their lifecycle hooks.
//!
//! The [`ProviderLifecycleRunner`] owns every provider instance for one
//! application boot. Hooks of a phase run strictly one after another in
//! registration order, because later providers may rely on container
//! bindings made by earlier ones. The first failing hook aborts the phase;
//! nothing is rolled back. Providers are constructed by the first
//! [`register`](ProviderLifecycleRunner::register) that resolves them and
//! never again.

use std::fmt;
use std::sync::Arc;

use hearth_manifest::{AppEnvironment, ProviderEntry};
use tracing::debug;

use crate::error::ProviderError;
use crate::importer::Importer;
use crate::provider::{LifecycleHook, Provider};
use crate::resolver::ProviderResolver;

const LOG_TARGET: &str = "hearth::providers";

/// A constructed provider together with its class name.
#[derive(Clone)]
pub struct ProviderInstance {
    name: String,
    provider: Arc<dyn Provider>,
}

impl ProviderInstance {
    /// Wraps a constructed provider.
    #[must_use]
    pub fn new(name: impl Into<String>, provider: Arc<dyn Provider>) -> Self {
        Self {
            name: name.into(),
            provider,
        }
    }

    /// Class name of the provider.
    #[must_use]
    pub const fn name(&self) -> &str {
        self.name.as_str()
    }

    /// The provider itself.
    #[must_use]
    pub const fn provider(&self) -> &Arc<dyn Provider> {
        &self.provider
    }

    async fn run(&self, hook: LifecycleHook) -> Result<(), ProviderError> {
        if !self.provider.implements(hook) {
            return Ok(());
        }
        debug!(target: LOG_TARGET, provider = %self.name, %hook, "running provider hook");
        let outcome = match hook {
            LifecycleHook::Register => self.provider.register(),
            LifecycleHook::Boot => self.provider.boot().await,
            LifecycleHook::Start => self.provider.start().await,
            LifecycleHook::Ready => self.provider.ready().await,
            LifecycleHook::Shutdown => self.provider.shutdown().await,
        };
        outcome.map_err(ProviderError::Hook)
    }
}

impl fmt::Debug for ProviderInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderInstance")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Sequences provider hooks across the application lifecycle.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
///
/// use hearth_manifest::AppEnvironment;
/// use hearth_providers::{ProviderLifecycleRunner, StaticImporter};
///
/// # futures::executor::block_on(async {
/// let mut runner = ProviderLifecycleRunner::new(Arc::new(StaticImporter::<()>::new()));
/// runner.use_providers(Vec::new());
/// runner.register(&(), AppEnvironment::Web).await.expect("register");
/// runner.boot().await.expect("boot");
/// assert_eq!(runner.instance_count(), 0);
/// # });
/// ```
pub struct ProviderLifecycleRunner<C> {
    resolver: ProviderResolver<C>,
    pending: Vec<ProviderEntry>,
    instances: Vec<ProviderInstance>,
    shutdown_capable: Vec<ProviderInstance>,
    registered: bool,
}

impl<C> fmt::Debug for ProviderLifecycleRunner<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderLifecycleRunner")
            .field("pending", &self.pending.len())
            .field("instances", &self.instances)
            .field("shutdown_capable", &self.shutdown_capable)
            .field("registered", &self.registered)
            .finish_non_exhaustive()
    }
}

impl<C> ProviderLifecycleRunner<C> {
    /// Creates a runner importing provider modules through `importer`.
    #[must_use]
    pub fn new(importer: Arc<dyn Importer<C>>) -> Self {
        Self {
            resolver: ProviderResolver::new(importer),
            pending: Vec::new(),
            instances: Vec::new(),
            shutdown_capable: Vec::new(),
            registered: false,
        }
    }

    /// Sets the entries for the next [`register`](Self::register) call,
    /// replacing any still queued.
    pub fn use_providers(&mut self, entries: impl IntoIterator<Item = ProviderEntry>) -> &mut Self {
        self.pending = entries.into_iter().collect();
        self
    }

    /// Resolves queued entries, constructs one instance per class with
    /// `context`, and runs each `register` hook in declaration order.
    ///
    /// Once the entries have resolved, later calls do nothing, even when a
    /// `register` hook failed part way through.
    ///
    /// # Errors
    ///
    /// Returns the first resolution failure or failing `register` hook.
    pub async fn register(
        &mut self,
        context: &C,
        target: AppEnvironment,
    ) -> Result<(), ProviderError> {
        if self.registered {
            debug!(target: LOG_TARGET, "providers already registered, ignoring");
            return Ok(());
        }
        let classes = self.resolver.resolve(&self.pending, target).await?;
        self.registered = true;
        self.pending.clear();
        for class in classes {
            let instance = ProviderInstance::new(class.name(), class.instantiate(context));
            instance.run(LifecycleHook::Register).await?;
            if instance.provider.implements(LifecycleHook::Shutdown) {
                self.shutdown_capable.push(instance.clone());
            }
            self.instances.push(instance);
        }
        debug!(
            target: LOG_TARGET,
            registered = self.instances.len(),
            shutdown_capable = self.shutdown_capable.len(),
            "providers registered"
        );
        Ok(())
    }

    /// Runs `boot` hooks.
    ///
    /// # Errors
    ///
    /// Returns the first failing hook's error; later providers are skipped.
    pub async fn boot(&self) -> Result<(), ProviderError> {
        self.run_phase(LifecycleHook::Boot).await
    }

    /// Runs `start` hooks.
    ///
    /// # Errors
    ///
    /// Returns the first failing hook's error; later providers are skipped.
    pub async fn start(&self) -> Result<(), ProviderError> {
        self.run_phase(LifecycleHook::Start).await
    }

    /// Runs `ready` hooks, then releases every instance not needed for
    /// shutdown.
    ///
    /// # Errors
    ///
    /// Returns the first failing hook's error; later providers are skipped.
    pub async fn ready(&mut self) -> Result<(), ProviderError> {
        self.run_phase(LifecycleHook::Ready).await?;
        self.instances.clear();
        Ok(())
    }

    /// Runs `shutdown` hooks of shutdown-capable providers, releasing each
    /// one once its hook succeeds.
    ///
    /// # Errors
    ///
    /// Returns the first failing hook's error. The failing provider and
    /// those after it stay retained for a later call.
    pub async fn shutdown(&mut self) -> Result<(), ProviderError> {
        while let Some(instance) = self.shutdown_capable.first() {
            instance.run(LifecycleHook::Shutdown).await?;
            self.shutdown_capable.remove(0);
        }
        Ok(())
    }

    /// Number of live instances.
    #[must_use]
    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    /// Number of instances retained for shutdown.
    #[must_use]
    pub fn shutdown_count(&self) -> usize {
        self.shutdown_capable.len()
    }

    /// Number of entries queued for registration.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    async fn run_phase(&self, hook: LifecycleHook) -> Result<(), ProviderError> {
        debug!(
            target: LOG_TARGET,
            %hook,
            providers = self.instances.len(),
            "running provider phase"
        );
        for instance in &self.instances {
            instance.run(hook).await?;
        }
        Ok(())
    }
}
