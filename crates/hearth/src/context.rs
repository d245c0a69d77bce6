//! The application handle shared with providers and hooks.
//!
//! [`AppContext`] is what a provider factory receives as its constructor
//! argument and what every lifecycle hook is called with. Clones are cheap
//! and observe the same state. Only the owning
//! [`Application`](crate::Application) mutates it.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use camino::Utf8PathBuf;
use futures::FutureExt;
use hearth_config::{ConfigTree, Directories, EnvironmentSnapshot, PackageMetadata};
use hearth_manifest::{AppEnvironment, Manifest, RuntimeEnvironment};
use parking_lot::{Mutex, RwLock};
use semver::Version;

use crate::container::Container;
use crate::error::ApplicationError;
use crate::hooks::{Hook, HookPoint, HookRegistries};
use crate::paths::AppPaths;
use crate::state::ApplicationState;

struct Shared {
    container: Container,
    state: RwLock<ApplicationState>,
    terminating: AtomicBool,
    environment: RwLock<AppEnvironment>,
    runtime_environment: RwLock<RuntimeEnvironment>,
    env: RwLock<Arc<EnvironmentSnapshot>>,
    package: RwLock<Arc<PackageMetadata>>,
    manifest: RwLock<Arc<Manifest>>,
    config: RwLock<Arc<ConfigTree>>,
    paths: RwLock<Arc<AppPaths>>,
    hooks: Mutex<HookRegistries>,
}

/// Cheaply clonable view of one application.
#[derive(Clone)]
pub struct AppContext {
    shared: Arc<Shared>,
}

impl fmt::Debug for AppContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppContext")
            .field("root", &self.paths().root())
            .field("state", &self.state())
            .field("environment", &self.environment())
            .field("runtime_environment", &self.runtime_environment())
            .finish_non_exhaustive()
    }
}

impl AppContext {
    pub(crate) fn new(root: Utf8PathBuf, environment: AppEnvironment) -> Self {
        Self {
            shared: Arc::new(Shared {
                container: Container::new(),
                state: RwLock::new(ApplicationState::Created),
                terminating: AtomicBool::new(false),
                environment: RwLock::new(environment),
                runtime_environment: RwLock::new(RuntimeEnvironment::Unknown),
                env: RwLock::new(Arc::default()),
                package: RwLock::new(Arc::default()),
                manifest: RwLock::new(Arc::default()),
                config: RwLock::new(Arc::default()),
                paths: RwLock::new(Arc::new(AppPaths::new(root, Directories::default()))),
                hooks: Mutex::new(HookRegistries::default()),
            }),
        }
    }

    // -- state -----------------------------------------------------------

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> ApplicationState {
        *self.shared.state.read()
    }

    /// `true` once providers have booted, including after termination.
    #[must_use]
    pub fn is_booted(&self) -> bool {
        self.hook_fired(HookPoint::Booted)
    }

    /// `true` while the application is in the ready state.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.state() == ApplicationState::Ready
    }

    /// `true` from the moment `terminate` starts.
    #[must_use]
    pub fn is_terminating(&self) -> bool {
        self.shared.terminating.load(Ordering::Acquire)
    }

    /// `true` once shutdown hooks have completed.
    #[must_use]
    pub fn is_terminated(&self) -> bool {
        self.state() == ApplicationState::Terminated
    }

    /// Returns `true` when the hooks registered for `point` have been run.
    #[must_use]
    pub fn hook_fired(&self, point: HookPoint) -> bool {
        self.shared.hooks.lock().get(point).has_fired()
    }

    // -- environment -----------------------------------------------------

    /// Execution environment gating providers and preloads.
    #[must_use]
    pub fn environment(&self) -> AppEnvironment {
        *self.shared.environment.read()
    }

    /// Runtime label classified from `APP_ENV`.
    #[must_use]
    pub fn runtime_environment(&self) -> RuntimeEnvironment {
        self.shared.runtime_environment.read().clone()
    }

    /// `true` when `APP_ENV` names production.
    #[must_use]
    pub fn in_production(&self) -> bool {
        self.runtime_environment() == RuntimeEnvironment::Production
    }

    /// `true` when `APP_ENV` names development.
    #[must_use]
    pub fn in_dev(&self) -> bool {
        self.runtime_environment() == RuntimeEnvironment::Development
    }

    /// `true` when `APP_ENV` names the test environment.
    #[must_use]
    pub fn in_test(&self) -> bool {
        self.runtime_environment() == RuntimeEnvironment::Test
    }

    /// Environment variables captured during `init`.
    #[must_use]
    pub fn env(&self) -> Arc<EnvironmentSnapshot> {
        Arc::clone(&*self.shared.env.read())
    }

    // -- loaded inputs ---------------------------------------------------

    /// Package name from `Cargo.toml`.
    #[must_use]
    pub fn app_name(&self) -> Option<String> {
        self.shared.package.read().name().map(str::to_owned)
    }

    /// Package version from `Cargo.toml`.
    #[must_use]
    pub fn version(&self) -> Option<Version> {
        self.shared.package.read().version().cloned()
    }

    /// Normalised rc manifest. Empty until `init` parses it.
    #[must_use]
    pub fn manifest(&self) -> Arc<Manifest> {
        Arc::clone(&*self.shared.manifest.read())
    }

    /// Configuration tree. Empty until `init` loads it.
    #[must_use]
    pub fn config(&self) -> Arc<ConfigTree> {
        Arc::clone(&*self.shared.config.read())
    }

    /// Whether the manifest enables TypeScript sources.
    #[must_use]
    pub fn uses_typescript(&self) -> bool {
        self.shared.manifest.read().typescript()
    }

    /// Path resolver for the application root.
    #[must_use]
    pub fn paths(&self) -> Arc<AppPaths> {
        Arc::clone(&*self.shared.paths.read())
    }

    /// Shared dependency container.
    #[must_use]
    pub fn container(&self) -> &Container {
        &self.shared.container
    }

    // -- hooks -----------------------------------------------------------

    /// Queues `hook` to run during `init`, before the manifest is parsed.
    ///
    /// Ignored once `init` has run its hooks.
    pub fn on_initiating<F, Fut>(&self, hook: F)
    where
        F: FnOnce(Self) -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.register(HookPoint::Initiating, boxed(hook));
    }

    /// Queues `hook` to run at the start of `terminate`.
    ///
    /// Ignored once termination has run its hooks.
    pub fn on_terminating<F, Fut>(&self, hook: F)
    where
        F: FnOnce(Self) -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.register(HookPoint::Terminating, boxed(hook));
    }

    /// Queues `hook` to run once providers have booted, or runs it now if
    /// they already have.
    ///
    /// # Errors
    ///
    /// Returns the hook's error when it runs immediately.
    pub async fn on_booted<F, Fut>(&self, hook: F) -> Result<(), ApplicationError>
    where
        F: FnOnce(Self) -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.register_retrospective(HookPoint::Booted, boxed(hook))
            .await
    }

    /// Queues `hook` to run once the application is ready, or runs it now
    /// if it already is.
    ///
    /// # Errors
    ///
    /// Returns the hook's error when it runs immediately.
    pub async fn on_ready<F, Fut>(&self, hook: F) -> Result<(), ApplicationError>
    where
        F: FnOnce(Self) -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.register_retrospective(HookPoint::Ready, boxed(hook))
            .await
    }

    fn register(&self, point: HookPoint, hook: Hook) -> Option<Hook> {
        self.shared.hooks.lock().get_mut(point).register(hook)
    }

    async fn register_retrospective(
        &self,
        point: HookPoint,
        hook: Hook,
    ) -> Result<(), ApplicationError> {
        match self.register(point, hook) {
            Some(late) => late(self.clone()).await.map_err(ApplicationError::Hook),
            None => Ok(()),
        }
    }

    // -- mutation, owned by `Application` --------------------------------

    pub(crate) fn set_state(&self, state: ApplicationState) {
        *self.shared.state.write() = state;
    }

    pub(crate) fn set_environment(&self, environment: AppEnvironment) {
        *self.shared.environment.write() = environment;
    }

    pub(crate) fn begin_terminating(&self) {
        self.shared.terminating.store(true, Ordering::Release);
    }

    pub(crate) fn install_process(&self, env: EnvironmentSnapshot, package: PackageMetadata) {
        let runtime = RuntimeEnvironment::classify(env.get(hearth_manifest::RUNTIME_ENV_VAR));
        *self.shared.runtime_environment.write() = runtime;
        *self.shared.env.write() = Arc::new(env);
        *self.shared.package.write() = Arc::new(package);
    }

    pub(crate) fn install_manifest(&self, manifest: Manifest) {
        let root = self.paths().root().to_path_buf();
        let paths = AppPaths::new(root, manifest.directories().clone());
        *self.shared.paths.write() = Arc::new(paths);
        *self.shared.manifest.write() = Arc::new(manifest);
    }

    pub(crate) fn install_config(&self, config: ConfigTree) {
        *self.shared.config.write() = Arc::new(config);
    }

    /// Marks `point` fired and returns the hooks queued so far.
    pub(crate) fn fire(&self, point: HookPoint) -> Vec<Hook> {
        self.shared.hooks.lock().get_mut(point).fire()
    }
}

fn boxed<F, Fut>(hook: F) -> Hook
where
    F: FnOnce(AppContext) -> Fut + Send + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    Box::new(move |context| hook(context).boxed())
}
