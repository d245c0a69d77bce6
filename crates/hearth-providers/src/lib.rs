//! Provider and preload orchestration for hearth applications.
//!
//! Providers are plugins declared in the rc manifest. Each one is imported
//! through an injected [`Importer`], validated to export a provider class
//! as its `default`, constructed once per boot with the application
//! context, and then driven through the `register`, `boot`, `start`,
//! `ready` and `shutdown` hooks it implements. Preloads are plain
//! side-effect modules imported concurrently once providers have started.
//!
//! The crate is generic over the context type `C` handed to provider
//! factories, so it has no knowledge of the application container.

pub mod error;
pub mod importer;
mod preload;
mod provider;
mod resolver;
pub mod runner;

#[cfg(test)]
mod tests;

pub use self::error::{ImportError, ProviderError};
pub use self::importer::{DEFAULT_EXPORT, Export, Importer, Module, ProviderClass, StaticImporter};
pub use self::preload::PreloadRunner;
pub use self::provider::{LifecycleHook, Provider};
pub use self::resolver::ProviderResolver;
pub use self::runner::{ProviderInstance, ProviderLifecycleRunner};
