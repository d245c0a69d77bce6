//! Shared configuration primitives for the hearth application runtime.
//!
//! The crate collects the pieces of ambient state an application needs
//! before its providers run: the built-in directory conventions, the logger
//! settings, the configuration tree assembled from the application's config
//! directory, the package metadata declared in `Cargo.toml`, and an owned
//! snapshot of the environment variables visible at boot.
//!
//! Everything here is read once during the `init` transition and then
//! shared immutably. Consumers receive references to these values instead
//! of consulting ambient global state such as the process environment.

mod defaults;
mod env;
mod error;
mod loader;
mod logging;
mod package;
mod tree;

pub use defaults::{DEFAULT_LOG_FILTER, Directories, LOG_LEVEL_ENV_VAR, default_directories};
pub use env::{EnvLoader, EnvironmentSnapshot, ProcessEnvLoader, StaticEnvLoader};
pub use error::ConfigError;
pub use loader::{ConfigLoader, DirectoryConfigLoader, StaticConfigLoader};
pub use logging::{LogFormat, LogFormatParseError, LoggerConfig};
pub use package::PackageMetadata;
pub use tree::ConfigTree;
