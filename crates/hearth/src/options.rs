//! Collaborators injected into an [`Application`](crate::Application).

use std::fmt;
use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use hearth_config::{ConfigLoader, DirectoryConfigLoader, EnvLoader, ProcessEnvLoader};
use hearth_manifest::AppEnvironment;
use hearth_providers::Importer;

use crate::context::AppContext;
use crate::process::Notifier;
use crate::reporter::{LifecycleReporter, StructuredLifecycleReporter};

/// Builder describing how an application loads its inputs.
///
/// Only the root and the importer are required. Everything else defaults
/// to the production implementation: config files from the config
/// directory, the real process environment, `tracing` reporting and the
/// socket named by `HEARTH_NOTIFY_SOCKET`.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
///
/// use hearth::{AppContext, ApplicationOptions};
/// use hearth_manifest::AppEnvironment;
/// use hearth_providers::StaticImporter;
///
/// let options = ApplicationOptions::new("/srv/app", Arc::new(StaticImporter::<AppContext>::new()))
///     .with_environment(AppEnvironment::Web);
/// assert_eq!(options.environment(), AppEnvironment::Web);
/// ```
pub struct ApplicationOptions {
    pub(crate) app_root: Utf8PathBuf,
    pub(crate) importer: Arc<dyn Importer<AppContext>>,
    pub(crate) config_loader: Arc<dyn ConfigLoader>,
    pub(crate) env_loader: Arc<dyn EnvLoader>,
    pub(crate) reporter: Arc<dyn LifecycleReporter>,
    pub(crate) notifier: Option<Arc<dyn Notifier>>,
    pub(crate) environment: AppEnvironment,
    pub(crate) install_telemetry: bool,
}

impl fmt::Debug for ApplicationOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApplicationOptions")
            .field("app_root", &self.app_root)
            .field("environment", &self.environment)
            .field("install_telemetry", &self.install_telemetry)
            .finish_non_exhaustive()
    }
}

impl ApplicationOptions {
    /// Options for the application rooted at `app_root`.
    #[must_use]
    pub fn new(app_root: impl Into<Utf8PathBuf>, importer: Arc<dyn Importer<AppContext>>) -> Self {
        Self {
            app_root: app_root.into(),
            importer,
            config_loader: Arc::new(DirectoryConfigLoader),
            env_loader: Arc::new(ProcessEnvLoader),
            reporter: Arc::new(StructuredLifecycleReporter::new()),
            notifier: None,
            environment: AppEnvironment::Unknown,
            install_telemetry: false,
        }
    }

    /// Replaces the config loader.
    #[must_use]
    pub fn with_config_loader(mut self, loader: Arc<dyn ConfigLoader>) -> Self {
        self.config_loader = loader;
        self
    }

    /// Replaces the environment loader.
    #[must_use]
    pub fn with_env_loader(mut self, loader: Arc<dyn EnvLoader>) -> Self {
        self.env_loader = loader;
        self
    }

    /// Replaces the lifecycle reporter.
    #[must_use]
    pub fn with_reporter(mut self, reporter: Arc<dyn LifecycleReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Uses `notifier` instead of the socket named in the environment.
    #[must_use]
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Sets the initial execution environment (default `unknown`).
    #[must_use]
    pub const fn with_environment(mut self, environment: AppEnvironment) -> Self {
        self.environment = environment;
        self
    }

    /// Installs the global tracing subscriber during `init` when set.
    #[must_use]
    pub const fn with_telemetry(mut self, install: bool) -> Self {
        self.install_telemetry = install;
        self
    }

    /// Application root.
    #[must_use]
    pub fn app_root(&self) -> &Utf8Path {
        &self.app_root
    }

    /// Initial execution environment.
    #[must_use]
    pub const fn environment(&self) -> AppEnvironment {
        self.environment
    }
}
