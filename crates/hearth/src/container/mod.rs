//! A minimal key to factory registry shared by providers.
//!
//! Providers bind values during `register` and resolve them during `boot`
//! and later phases. The lifecycle runs those phases sequentially, so the
//! lock only guards the map itself; factories run outside it and may
//! resolve other bindings.

use std::any::{Any, type_name};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use parking_lot::RwLock;

use crate::error::ContainerError;

/// Key under which `init` binds the environment snapshot.
pub const ENV_BINDING: &str = "hearth.env";
/// Key under which `init` binds the loaded configuration tree.
pub const CONFIG_BINDING: &str = "hearth.config";

type Instance = Arc<dyn Any + Send + Sync>;
type Factory = Arc<dyn Fn(&Container) -> anyhow::Result<Instance> + Send + Sync>;

enum Binding {
    Factory(Factory),
    Singleton {
        factory: Factory,
        instance: OnceCell<Instance>,
    },
    Value(Instance),
}

impl Binding {
    fn resolve(&self, container: &Container) -> anyhow::Result<Instance> {
        match self {
            Self::Factory(factory) => factory(container),
            Self::Singleton { factory, instance } => instance
                .get_or_try_init(|| factory(container))
                .map(Arc::clone),
            Self::Value(value) => Ok(Arc::clone(value)),
        }
    }

    const fn kind(&self) -> &'static str {
        match self {
            Self::Factory(_) => "factory",
            Self::Singleton { .. } => "singleton",
            Self::Value(_) => "value",
        }
    }
}

/// Shared dependency registry. Clones refer to the same bindings.
///
/// # Example
///
/// ```
/// use hearth::Container;
///
/// let container = Container::new();
/// container.bind_value("app.name", String::from("inventory"));
/// container.singleton("app.greeting", |c: &Container| {
///     let name = c.make::<String>("app.name")?;
///     Ok(format!("hello from {name}"))
/// });
///
/// let greeting = container.make::<String>("app.greeting").expect("bound");
/// assert_eq!(greeting.as_str(), "hello from inventory");
/// ```
#[derive(Clone, Default)]
pub struct Container {
    bindings: Arc<RwLock<HashMap<String, Arc<Binding>>>>,
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bindings = self.bindings.read();
        let mut keys: Vec<(&str, &str)> = bindings
            .iter()
            .map(|(key, binding)| (key.as_str(), binding.kind()))
            .collect();
        keys.sort_unstable();
        f.debug_struct("Container")
            .field("bindings", &keys)
            .finish()
    }
}

impl Container {
    /// Creates an empty container.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds a factory that builds a fresh value on every
    /// [`make`](Self::make).
    pub fn bind<T, F>(&self, key: impl Into<String>, factory: F)
    where
        T: Any + Send + Sync,
        F: Fn(&Self) -> anyhow::Result<T> + Send + Sync + 'static,
    {
        self.insert(key.into(), Binding::Factory(erase(factory)));
    }

    /// Binds a factory whose first successful result is cached.
    pub fn singleton<T, F>(&self, key: impl Into<String>, factory: F)
    where
        T: Any + Send + Sync,
        F: Fn(&Self) -> anyhow::Result<T> + Send + Sync + 'static,
    {
        self.insert(
            key.into(),
            Binding::Singleton {
                factory: erase(factory),
                instance: OnceCell::new(),
            },
        );
    }

    /// Binds an already constructed value.
    pub fn bind_value<T>(&self, key: impl Into<String>, value: T)
    where
        T: Any + Send + Sync,
    {
        self.insert(key.into(), Binding::Value(Arc::new(value)));
    }

    /// Resolves `key` as a `T`.
    ///
    /// # Errors
    ///
    /// Returns [`ContainerError::NotBound`] for unknown keys,
    /// [`ContainerError::Factory`] when the factory fails and
    /// [`ContainerError::TypeMismatch`] when the binding holds another type.
    pub fn make<T>(&self, key: &str) -> Result<Arc<T>, ContainerError>
    where
        T: Any + Send + Sync,
    {
        let binding = self
            .bindings
            .read()
            .get(key)
            .cloned()
            .ok_or_else(|| ContainerError::NotBound {
                key: key.to_owned(),
            })?;
        let instance = binding
            .resolve(self)
            .map_err(|error| ContainerError::Factory {
                key: key.to_owned(),
                source: error.into(),
            })?;
        instance
            .downcast::<T>()
            .map_err(|_| ContainerError::TypeMismatch {
                key: key.to_owned(),
                expected: type_name::<T>(),
            })
    }

    /// Returns `true` when something is bound under `key`.
    #[must_use]
    pub fn has(&self, key: &str) -> bool {
        self.bindings.read().contains_key(key)
    }

    fn insert(&self, key: String, binding: Binding) {
        self.bindings.write().insert(key, Arc::new(binding));
    }
}

fn erase<T, F>(factory: F) -> Factory
where
    T: Any + Send + Sync,
    F: Fn(&Container) -> anyhow::Result<T> + Send + Sync + 'static,
{
    Arc::new(move |container: &Container| {
        factory(container).map(|value| Arc::new(value) as Instance)
    })
}
