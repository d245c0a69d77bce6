//! The application lifecycle state machine.
//!
//! An [`Application`] moves through `created → initiated → booted → ready`
//! and can be terminated from any state past `created`. Each transition
//! method only acts from its source state. Called from anywhere else it
//! logs at `debug` and returns `Ok(())`, so launchers may retry
//! transitions without tracking what already ran.
//!
//! Errors from providers, preloads, hooks and the start callback propagate
//! out of the transition unchanged. Nothing is rolled back: a provider that
//! registered before a later provider failed to boot stays registered.
//! `boot` and `start` each run at most once, so after either fails the
//! application can only be terminated.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use hearth_config::{LoggerConfig, PackageMetadata};
use hearth_manifest::{AppEnvironment, Manifest, RcFileSource};
use hearth_providers::{PreloadRunner, ProviderLifecycleRunner};
use serde_json::json;
use tracing::{debug, warn};

use crate::container::{CONFIG_BINDING, ENV_BINDING};
use crate::context::AppContext;
use crate::error::ApplicationError;
use crate::hooks::{HookPoint, run_hooks};
use crate::options::ApplicationOptions;
use crate::process::{Notifier, NotifyError, SocketNotifier};
use crate::state::ApplicationState;
use crate::telemetry;

const LIFECYCLE_TARGET: &str = "hearth::lifecycle";

/// Owner of one application's lifecycle.
pub struct Application {
    context: AppContext,
    options: ApplicationOptions,
    providers: ProviderLifecycleRunner<AppContext>,
    preloads: PreloadRunner<AppContext>,
    notifier: Arc<dyn Notifier>,
    boot_started: bool,
    start_attempted: bool,
    started_at: Option<Instant>,
}

impl fmt::Debug for Application {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Application")
            .field("context", &self.context)
            .field("providers", &self.providers)
            .field("preloads", &self.preloads)
            .finish_non_exhaustive()
    }
}

impl Application {
    /// Creates an application in the `created` state.
    #[must_use]
    pub fn new(options: ApplicationOptions) -> Self {
        let context = AppContext::new(options.app_root.clone(), options.environment);
        let providers = ProviderLifecycleRunner::new(Arc::clone(&options.importer));
        let preloads = PreloadRunner::new(Arc::clone(&options.importer));
        let notifier = options
            .notifier
            .clone()
            .unwrap_or_else(|| Arc::new(SocketNotifier::disconnected()));
        Self {
            context,
            options,
            providers,
            preloads,
            notifier,
            boot_started: false,
            start_attempted: false,
            started_at: None,
        }
    }

    /// Handle shared with providers and hooks.
    #[must_use]
    pub const fn context(&self) -> &AppContext {
        &self.context
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> ApplicationState {
        self.context.state()
    }

    /// Execution environment gating providers and preloads.
    #[must_use]
    pub fn environment(&self) -> AppEnvironment {
        self.context.environment()
    }

    /// Changes the execution environment.
    ///
    /// # Errors
    ///
    /// Returns [`ApplicationError::CannotSwitchEnvironment`] once `boot`
    /// has begun, since providers and preloads are filtered by it.
    pub fn set_environment(&mut self, environment: AppEnvironment) -> Result<(), ApplicationError> {
        let state = self.state();
        if self.boot_started || state > ApplicationState::Initiated {
            return Err(ApplicationError::CannotSwitchEnvironment {
                requested: environment,
                state,
            });
        }
        self.context.set_environment(environment);
        Ok(())
    }

    /// Loads the environment snapshot, package metadata, manifest and
    /// config, running `initiating` hooks along the way.
    ///
    /// # Errors
    ///
    /// Returns the first failure among loading and the `initiating` hooks.
    pub async fn init(&mut self) -> Result<(), ApplicationError> {
        if !self.expect_state("init", ApplicationState::Created) {
            return Ok(());
        }
        self.started_at = Some(Instant::now());
        let began = self.begin(ApplicationState::Initiated);
        let outcome = self.run_init().await;
        self.finish(ApplicationState::Initiated, began, outcome)
    }

    /// Registers and boots the providers declared for the current
    /// environment, then runs `booted` hooks.
    ///
    /// # Errors
    ///
    /// Returns the first provider or hook failure.
    pub async fn boot(&mut self) -> Result<(), ApplicationError> {
        if !self.expect_state("boot", ApplicationState::Initiated) {
            return Ok(());
        }
        if self.boot_started {
            debug!(
                target: LIFECYCLE_TARGET,
                method = "boot",
                "boot already attempted, ignoring"
            );
            return Ok(());
        }
        self.boot_started = true;
        let began = self.begin(ApplicationState::Booted);
        let outcome = self.run_boot().await;
        self.finish(ApplicationState::Booted, began, outcome)
    }

    /// Starts providers, imports preloads, runs `callback`, readies
    /// providers, runs `ready` hooks and notifies the parent process.
    ///
    /// # Errors
    ///
    /// Returns the first provider, preload, callback or hook failure.
    pub async fn start<F, Fut>(&mut self, callback: F) -> Result<(), ApplicationError>
    where
        F: FnOnce(AppContext) -> Fut + Send,
        Fut: Future<Output = anyhow::Result<()>> + Send,
    {
        if !self.expect_state("start", ApplicationState::Booted) {
            return Ok(());
        }
        if self.start_attempted {
            debug!(
                target: LIFECYCLE_TARGET,
                method = "start",
                "start already attempted, ignoring"
            );
            return Ok(());
        }
        self.start_attempted = true;
        let began = self.begin(ApplicationState::Ready);
        let outcome = self.run_start(callback).await;
        self.finish(ApplicationState::Ready, began, outcome)
    }

    /// Runs `terminating` hooks and provider shutdown hooks.
    ///
    /// Valid from `initiated`, `booted` and `ready`; a no-op before `init`
    /// and after a completed termination.
    ///
    /// # Errors
    ///
    /// Returns the first hook failure; remaining shutdown hooks are skipped.
    /// Calling `terminate` again resumes with the provider that failed.
    pub async fn terminate(&mut self) -> Result<(), ApplicationError> {
        let state = self.state();
        if matches!(state, ApplicationState::Created | ApplicationState::Terminated) {
            debug!(
                target: LIFECYCLE_TARGET,
                method = "terminate",
                state = %state,
                "ignoring terminate in this state"
            );
            return Ok(());
        }
        let began = self.begin(ApplicationState::Terminated);
        let outcome = self.run_terminate().await;
        self.finish(ApplicationState::Terminated, began, outcome)
    }

    /// Sends `message` to the parent process, if one is listening.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError`] when delivery fails.
    pub fn notify(&self, message: &serde_json::Value) -> Result<(), NotifyError> {
        self.notifier.notify(message)
    }

    // ---------------------------------------------------------------------
    // Transitions
    // ---------------------------------------------------------------------

    async fn run_init(&mut self) -> Result<(), ApplicationError> {
        let root = self.options.app_root.clone();
        let env = self.options.env_loader.load();
        let package = PackageMetadata::read(&root)?;
        if self.options.notifier.is_none() {
            self.notifier = Arc::new(SocketNotifier::from_env(&env));
        }
        self.context.container().bind_value(ENV_BINDING, env.clone());
        self.context.install_process(env, package);

        self.fire(HookPoint::Initiating).await?;

        let raw = RcFileSource::new(root).read()?;
        self.context.install_manifest(Manifest::parse(&raw)?);

        let config_dir = self.context.paths().config_path(&[]);
        let config = self.options.config_loader.load(&config_dir)?;
        if self.options.install_telemetry {
            telemetry::initialise(&LoggerConfig::resolve(&config, &self.context.env()))?;
        }
        self.context.container().bind_value(CONFIG_BINDING, config.clone());
        self.context.install_config(config);

        self.context.set_state(ApplicationState::Initiated);
        Ok(())
    }

    async fn run_boot(&mut self) -> Result<(), ApplicationError> {
        let environment = self.environment();
        let manifest = self.context.manifest();
        self.providers
            .use_providers(manifest.providers().iter().cloned());
        self.providers.register(&self.context, environment).await?;
        self.options
            .reporter
            .providers_registered(self.providers.instance_count());
        self.providers.boot().await?;

        self.context.set_state(ApplicationState::Booted);
        self.fire(HookPoint::Booted).await
    }

    async fn run_start<F, Fut>(&mut self, callback: F) -> Result<(), ApplicationError>
    where
        F: FnOnce(AppContext) -> Fut + Send,
        Fut: Future<Output = anyhow::Result<()>> + Send,
    {
        let environment = self.environment();
        let manifest = self.context.manifest();
        self.providers.start().await?;

        let active = manifest
            .preloads()
            .iter()
            .filter(|entry| entry.is_active_in(environment))
            .count();
        self.options.reporter.preloads_importing(active);
        self.preloads
            .use_preloads(manifest.preloads().iter().cloned());
        self.preloads.import(environment).await?;

        callback(self.context.clone())
            .await
            .map_err(ApplicationError::Hook)?;
        self.providers.ready().await?;

        self.context.set_state(ApplicationState::Ready);
        self.fire(HookPoint::Ready).await?;
        self.notify_ready(environment);
        Ok(())
    }

    async fn run_terminate(&mut self) -> Result<(), ApplicationError> {
        self.context.begin_terminating();
        self.fire(HookPoint::Terminating).await?;
        self.providers.shutdown().await?;
        self.context.set_state(ApplicationState::Terminated);
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Helpers
    // ---------------------------------------------------------------------

    fn expect_state(&self, method: &'static str, expected: ApplicationState) -> bool {
        let state = self.state();
        if state == expected {
            return true;
        }
        debug!(
            target: LIFECYCLE_TARGET,
            method,
            state = %state,
            expected = %expected,
            "ignoring transition from this state"
        );
        false
    }

    fn begin(&self, target: ApplicationState) -> Instant {
        self.options.reporter.transition_starting(target);
        Instant::now()
    }

    fn finish(
        &self,
        target: ApplicationState,
        began: Instant,
        outcome: Result<(), ApplicationError>,
    ) -> Result<(), ApplicationError> {
        match outcome {
            Ok(()) => {
                self.options
                    .reporter
                    .transition_completed(target, began.elapsed());
                Ok(())
            }
            Err(error) => {
                self.options.reporter.transition_failed(target, &error);
                Err(error)
            }
        }
    }

    async fn fire(&self, point: HookPoint) -> Result<(), ApplicationError> {
        let hooks = self.context.fire(point);
        run_hooks(point, hooks, &self.context)
            .await
            .map_err(ApplicationError::Hook)
    }

    fn notify_ready(&self, environment: AppEnvironment) {
        let duration = self
            .started_at
            .as_ref()
            .map_or(Duration::ZERO, Instant::elapsed);
        let message = json!({
            "isHearth": true,
            "environment": environment.as_str(),
            "duration": u64::try_from(duration.as_millis()).unwrap_or(u64::MAX),
        });
        if let Err(error) = self.notifier.notify(&message) {
            warn!(
                target: LIFECYCLE_TARGET,
                error = %error,
                "failed to notify parent process of readiness"
            );
        }
    }
}

#[cfg(test)]
mod tests;
