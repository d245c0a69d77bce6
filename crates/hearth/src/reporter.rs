//! Structured reporting for lifecycle transitions.

use std::sync::Arc;
use std::time::Duration;

use crate::error::ApplicationError;
use crate::state::ApplicationState;

const LIFECYCLE_TARGET: &str = "hearth::lifecycle";

/// Observer notified as the application moves between states.
pub trait LifecycleReporter: Send + Sync {
    /// Invoked before a transition towards `target` begins.
    fn transition_starting(&self, target: ApplicationState);

    /// Invoked once `target` has been reached.
    fn transition_completed(&self, target: ApplicationState, elapsed: Duration);

    /// Invoked when a transition towards `target` fails.
    fn transition_failed(&self, target: ApplicationState, error: &ApplicationError);

    /// Invoked after providers have been constructed and registered.
    fn providers_registered(&self, count: usize);

    /// Invoked before the preloads active in the environment are imported.
    fn preloads_importing(&self, count: usize);
}

impl<T> LifecycleReporter for Arc<T>
where
    T: LifecycleReporter,
{
    fn transition_starting(&self, target: ApplicationState) {
        (**self).transition_starting(target);
    }

    fn transition_completed(&self, target: ApplicationState, elapsed: Duration) {
        (**self).transition_completed(target, elapsed);
    }

    fn transition_failed(&self, target: ApplicationState, error: &ApplicationError) {
        (**self).transition_failed(target, error);
    }

    fn providers_registered(&self, count: usize) {
        (**self).providers_registered(count);
    }

    fn preloads_importing(&self, count: usize) {
        (**self).preloads_importing(count);
    }
}

/// Default reporter that records lifecycle events using `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredLifecycleReporter;

impl StructuredLifecycleReporter {
    /// Builds a new reporter.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl LifecycleReporter for StructuredLifecycleReporter {
    fn transition_starting(&self, target: ApplicationState) {
        tracing::debug!(
            target: LIFECYCLE_TARGET,
            event = "transition_starting",
            state = %target,
            "entering state"
        );
    }

    fn transition_completed(&self, target: ApplicationState, elapsed: Duration) {
        tracing::info!(
            target: LIFECYCLE_TARGET,
            event = "transition_completed",
            state = %target,
            elapsed_ms = elapsed.as_millis(),
            "application state changed"
        );
    }

    fn transition_failed(&self, target: ApplicationState, error: &ApplicationError) {
        tracing::error!(
            target: LIFECYCLE_TARGET,
            event = "transition_failed",
            state = %target,
            code = error.code().unwrap_or("E_RUNTIME"),
            error = %error,
            "application transition failed"
        );
    }

    fn providers_registered(&self, count: usize) {
        tracing::info!(
            target: LIFECYCLE_TARGET,
            event = "providers_registered",
            providers = count,
            "providers registered"
        );
    }

    fn preloads_importing(&self, count: usize) {
        tracing::debug!(
            target: LIFECYCLE_TARGET,
            event = "preloads_importing",
            preloads = count,
            "importing preloads"
        );
    }
}
