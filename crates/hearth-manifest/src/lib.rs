//! Manifest parsing and environment classification for hearth applications.
//!
//! Every application ships an rc file (`hearthrc.toml` or `hearthrc.json`)
//! describing its directory layout, the providers to register, the preload
//! modules to import once providers have started, command loaders, test
//! suites and asset bundler settings. The file is user-authored and may be
//! malformed in arbitrary ways, so [`Manifest::parse`] validates each entry
//! defensively and normalises every variant form into a single canonical
//! shape before anything downstream looks at it.
//!
//! The crate also owns the two environment vocabularies used during boot:
//!
//! * [`AppEnvironment`]: the execution context (`web`, `console`, `test`,
//!   `repl` or `unknown`) that gates which providers and preloads activate.
//! * [`RuntimeEnvironment`]: the canonical label derived from the raw
//!   `APP_ENV` value (`development`, `production`, `test`, ...).
//!
//! # Example
//!
//! ```
//! use hearth_manifest::{AppEnvironment, Manifest};
//! use serde_json::json;
//!
//! let manifest = Manifest::parse(&json!({
//!     "providers": [
//!         "providers/app",
//!         { "file": "providers/repl", "environment": ["repl"] }
//!     ]
//! }))
//! .expect("valid manifest");
//!
//! assert_eq!(manifest.providers().len(), 2);
//! assert!(manifest.providers()[0].environment().allows(AppEnvironment::Web));
//! assert!(!manifest.providers()[1].environment().allows(AppEnvironment::Web));
//! ```

mod environment;
pub mod error;
mod glob;
pub mod manifest;
mod source;

#[cfg(test)]
mod tests;

pub use self::environment::{
    AppEnvironment, AppEnvironmentParseError, EnvironmentSet, RUNTIME_ENV_VAR, RuntimeEnvironment,
};
pub use self::error::ManifestError;
pub use self::glob::glob_parent;
pub use self::manifest::{
    AssetsBundler, AssetsBundlerConfig, BundlerCommand, Manifest, MetaFileEntry, ModuleSpecifier,
    PreloadEntry, ProviderEntry, TestConfig, TestSuite,
};
pub use self::source::RcFileSource;
