//! The provider capability interface.

use async_trait::async_trait;
use strum::{AsRefStr, Display, EnumString, IntoStaticStr};

/// Hook points a provider may implement.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr, IntoStaticStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum LifecycleHook {
    /// Synchronous container bindings, run right after construction.
    Register,
    /// Runs once every provider has registered.
    Boot,
    /// Runs before preloads are imported.
    Start,
    /// Runs once the application is about to become ready.
    Ready,
    /// Runs during termination.
    Shutdown,
}

impl LifecycleHook {
    /// Returns the hook name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

/// A plugin participating in the application lifecycle.
///
/// Every hook is optional. The runner calls a hook only when
/// [`Provider::implements`] reports it, so a provider overriding `boot` must
/// also return `true` for [`LifecycleHook::Boot`]. `register` is
/// synchronous: it may only bind values into the container.
///
/// # Example
///
/// ```
/// use async_trait::async_trait;
/// use hearth_providers::{LifecycleHook, Provider};
///
/// struct DatabaseProvider;
///
/// #[async_trait]
/// impl Provider for DatabaseProvider {
///     fn implements(&self, hook: LifecycleHook) -> bool {
///         matches!(hook, LifecycleHook::Boot | LifecycleHook::Shutdown)
///     }
///
///     async fn boot(&self) -> anyhow::Result<()> {
///         Ok(())
///     }
///
///     async fn shutdown(&self) -> anyhow::Result<()> {
///         Ok(())
///     }
/// }
///
/// assert!(DatabaseProvider.implements(LifecycleHook::Shutdown));
/// assert!(!DatabaseProvider.implements(LifecycleHook::Register));
/// ```
#[async_trait]
pub trait Provider: Send + Sync {
    /// Whether the provider implements `hook`.
    fn implements(&self, hook: LifecycleHook) -> bool;

    /// Binds values into the container.
    ///
    /// # Errors
    ///
    /// Any error aborts registration of the remaining providers.
    fn register(&self) -> anyhow::Result<()> {
        Ok(())
    }

    /// Boot hook.
    ///
    /// # Errors
    ///
    /// Any error aborts the boot phase.
    async fn boot(&self) -> anyhow::Result<()> {
        Ok(())
    }

    /// Start hook.
    ///
    /// # Errors
    ///
    /// Any error aborts the start phase.
    async fn start(&self) -> anyhow::Result<()> {
        Ok(())
    }

    /// Ready hook.
    ///
    /// # Errors
    ///
    /// Any error aborts the ready phase.
    async fn ready(&self) -> anyhow::Result<()> {
        Ok(())
    }

    /// Shutdown hook.
    ///
    /// # Errors
    ///
    /// Any error aborts the remaining shutdown hooks.
    async fn shutdown(&self) -> anyhow::Result<()> {
        Ok(())
    }
}
