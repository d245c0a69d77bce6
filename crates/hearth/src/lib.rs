//! Application bootstrap and lifecycle for hearth.
//!
//! An [`Application`] reads everything an app needs before it can serve a
//! request: the environment snapshot, package metadata, the rc manifest
//! and the config directory. It then drives the providers declared in the
//! manifest through their lifecycle hooks:
//!
//! 1. `init` loads inputs and runs `initiating` hooks.
//! 2. `boot` constructs providers, runs their `register` and `boot` hooks,
//!    then the `booted` hooks.
//! 3. `start` runs provider `start` hooks, imports preloads, invokes the
//!    caller's start callback, runs provider `ready` hooks and finally the
//!    `ready` hooks, and tells a supervising process it is ready.
//! 4. `terminate` runs `terminating` hooks and provider `shutdown` hooks.
//!
//! Providers and hooks receive an [`AppContext`], a cheap handle exposing
//! the container, the loaded inputs, the path helpers and the state
//! introspection API.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use hearth::{AppContext, Application, ApplicationOptions};
//! use hearth_manifest::AppEnvironment;
//! use hearth_providers::StaticImporter;
//!
//! # async fn run() -> Result<(), hearth::ApplicationError> {
//! let importer = Arc::new(StaticImporter::<AppContext>::new());
//! let options = ApplicationOptions::new("/srv/app", importer)
//!     .with_environment(AppEnvironment::Web);
//! let mut app = Application::new(options);
//!
//! app.init().await?;
//! app.boot().await?;
//! app.start(|_context| async { Ok(()) }).await?;
//! app.terminate().await?;
//! # Ok(())
//! # }
//! ```

mod application;
mod container;
mod context;
mod error;
mod hooks;
mod options;
mod paths;
pub mod process;
mod reporter;
mod state;
pub mod telemetry;

#[cfg(test)]
mod tests;

pub use self::application::Application;
pub use self::container::{CONFIG_BINDING, Container, ENV_BINDING};
pub use self::context::AppContext;
pub use self::error::{ApplicationError, ContainerError};
pub use self::hooks::HookPoint;
pub use self::options::ApplicationOptions;
pub use self::paths::AppPaths;
pub use self::reporter::{LifecycleReporter, StructuredLifecycleReporter};
pub use self::state::ApplicationState;
pub use self::telemetry::{TelemetryError, TelemetryHandle};
