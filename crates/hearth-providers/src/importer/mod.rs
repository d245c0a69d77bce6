//! Module resolution behind an injected importer.
//!
//! The lifecycle never resolves module specifiers itself. Embedders supply
//! an [`Importer`] mapping specifiers to [`Module`] values; the bundled
//! [`StaticImporter`] serves an in-process table, which is what tests and
//! statically linked applications use.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use hearth_manifest::ModuleSpecifier;
use serde_json::Value;

use crate::error::ImportError;
use crate::provider::Provider;

/// Name of the export a provider module must define.
pub const DEFAULT_EXPORT: &str = "default";

type Factory<C> = Arc<dyn Fn(&C) -> Arc<dyn Provider> + Send + Sync>;
type Loader<C> = Arc<dyn Fn() -> anyhow::Result<Module<C>> + Send + Sync>;

/// A constructible provider: a name plus a factory taking the context.
pub struct ProviderClass<C> {
    name: String,
    factory: Factory<C>,
}

impl<C> ProviderClass<C> {
    /// Creates a class from its factory.
    #[must_use]
    pub fn new<F>(name: impl Into<String>, factory: F) -> Self
    where
        F: Fn(&C) -> Arc<dyn Provider> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            factory: Arc::new(factory),
        }
    }

    /// Class name, used in diagnostics.
    #[must_use]
    pub const fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Constructs an instance bound to `context`.
    #[must_use]
    pub fn instantiate(&self, context: &C) -> Arc<dyn Provider> {
        (self.factory)(context)
    }
}

impl<C> Clone for ProviderClass<C> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            factory: Arc::clone(&self.factory),
        }
    }
}

impl<C> fmt::Debug for ProviderClass<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderClass")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// A single named export.
pub enum Export<C> {
    /// A provider class.
    Class(ProviderClass<C>),
    /// Any other value.
    Value(Value),
}

impl<C> Export<C> {
    /// Compact rendering for diagnostics.
    #[must_use]
    pub fn render(&self) -> String {
        match self {
            Self::Class(class) => format!("[class {}]", class.name()),
            Self::Value(value) => value.to_string(),
        }
    }
}

impl<C> Clone for Export<C> {
    fn clone(&self) -> Self {
        match self {
            Self::Class(class) => Self::Class(class.clone()),
            Self::Value(value) => Self::Value(value.clone()),
        }
    }
}

impl<C> fmt::Debug for Export<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Class(class) => f.debug_tuple("Class").field(class).finish(),
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
        }
    }
}

/// The result of importing a module: its named exports.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
///
/// use hearth_providers::{LifecycleHook, Module, Provider};
///
/// struct Noop;
///
/// #[async_trait::async_trait]
/// impl Provider for Noop {
///     fn implements(&self, _hook: LifecycleHook) -> bool {
///         false
///     }
/// }
///
/// let module: Module<()> = Module::new().with_default_class("Noop", |_: &()| Arc::new(Noop));
/// assert!(module.default_export().is_some());
/// assert!(Module::<()>::new().is_empty());
/// ```
pub struct Module<C> {
    exports: BTreeMap<String, Export<C>>,
}

impl<C> Default for Module<C> {
    fn default() -> Self {
        Self {
            exports: BTreeMap::new(),
        }
    }
}

impl<C> Clone for Module<C> {
    fn clone(&self) -> Self {
        Self {
            exports: self.exports.clone(),
        }
    }
}

impl<C> fmt::Debug for Module<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.exports.iter()).finish()
    }
}

impl<C> Module<C> {
    /// A module with no exports.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a named export.
    #[must_use]
    pub fn with_export(mut self, name: impl Into<String>, export: Export<C>) -> Self {
        self.exports.insert(name.into(), export);
        self
    }

    /// Adds a provider class as the default export.
    #[must_use]
    pub fn with_default_class<F>(self, name: impl Into<String>, factory: F) -> Self
    where
        F: Fn(&C) -> Arc<dyn Provider> + Send + Sync + 'static,
    {
        self.with_export(
            DEFAULT_EXPORT,
            Export::Class(ProviderClass::new(name, factory)),
        )
    }

    /// Looks up a named export.
    #[must_use]
    pub fn export(&self, name: &str) -> Option<&Export<C>> {
        self.exports.get(name)
    }

    /// The `default` export, if any.
    #[must_use]
    pub fn default_export(&self) -> Option<&Export<C>> {
        self.export(DEFAULT_EXPORT)
    }

    /// Returns `true` when the module exports nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.exports.is_empty()
    }
}

/// Capability resolving module specifiers.
///
/// Importing may run user code with side effects, which is the whole
/// contract for preload modules.
#[async_trait]
pub trait Importer<C>: Send + Sync {
    /// Imports the module named by `specifier`.
    ///
    /// # Errors
    ///
    /// Returns [`ImportError::ModuleNotFound`] when nothing answers to the
    /// specifier and [`ImportError::Failed`] when loading the module fails.
    async fn import(&self, specifier: &ModuleSpecifier) -> Result<Module<C>, ImportError>;
}

/// In-process module table.
pub struct StaticImporter<C> {
    modules: BTreeMap<ModuleSpecifier, Loader<C>>,
}

impl<C> Default for StaticImporter<C> {
    fn default() -> Self {
        Self {
            modules: BTreeMap::new(),
        }
    }
}

impl<C> fmt::Debug for StaticImporter<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticImporter")
            .field("modules", &self.modules.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl<C: 'static> StaticImporter<C> {
    /// An empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a module whose exports are fixed.
    #[must_use]
    pub fn with_module(self, specifier: impl Into<ModuleSpecifier>, module: Module<C>) -> Self {
        self.with_loader(specifier, move || Ok(module.clone()))
    }

    /// Registers a module evaluated on every import.
    ///
    /// The loader's side effects stand in for module-level code.
    #[must_use]
    pub fn with_loader<F>(mut self, specifier: impl Into<ModuleSpecifier>, loader: F) -> Self
    where
        F: Fn() -> anyhow::Result<Module<C>> + Send + Sync + 'static,
    {
        self.modules.insert(specifier.into(), Arc::new(loader));
        self
    }

    /// Whether `specifier` is registered.
    #[must_use]
    pub fn contains(&self, specifier: &ModuleSpecifier) -> bool {
        self.modules.contains_key(specifier)
    }
}

#[async_trait]
impl<C: 'static> Importer<C> for StaticImporter<C> {
    async fn import(&self, specifier: &ModuleSpecifier) -> Result<Module<C>, ImportError> {
        let loader = self
            .modules
            .get(specifier)
            .ok_or_else(|| ImportError::not_found(specifier))?;
        loader().map_err(ImportError::Failed)
    }
}

#[cfg(test)]
mod tests;
