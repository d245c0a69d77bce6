//! One-shot hook queues keyed to lifecycle points.
//!
//! Each registry starts pending and queues hooks until its point fires.
//! Firing drains the queue and flips the registry to fired for the rest of
//! the process. Registering afterwards depends on the point: `booted` and
//! `ready` run the hook straight away, while `initiating` and `terminating`
//! hooks registered too late are dropped.

use std::fmt;
use std::mem;

use futures::future::BoxFuture;
use strum::{AsRefStr, Display};
use tracing::debug;

use crate::context::AppContext;

const LOG_TARGET: &str = "hearth::lifecycle";

pub(crate) type Hook = Box<dyn FnOnce(AppContext) -> BoxFuture<'static, anyhow::Result<()>> + Send>;

/// Lifecycle points accepting hooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum HookPoint {
    /// Runs during `init`, before the manifest is parsed.
    Initiating,
    /// Runs once providers have booted.
    Booted,
    /// Runs once the application is ready.
    Ready,
    /// Runs at the start of `terminate`.
    Terminating,
}

impl HookPoint {
    /// Returns `true` for points that invoke late registrations immediately.
    #[must_use]
    pub const fn is_retrospective(self) -> bool {
        matches!(self, Self::Booted | Self::Ready)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HookStatus {
    Pending,
    Fired,
}

pub(crate) struct HookRegistry {
    point: HookPoint,
    status: HookStatus,
    queue: Vec<Hook>,
}

impl fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookRegistry")
            .field("point", &self.point)
            .field("status", &self.status)
            .field("queued", &self.queue.len())
            .finish()
    }
}

impl HookRegistry {
    pub(crate) const fn new(point: HookPoint) -> Self {
        Self {
            point,
            status: HookStatus::Pending,
            queue: Vec::new(),
        }
    }

    /// Queues `hook`, or hands it back when it must run immediately.
    pub(crate) fn register(&mut self, hook: Hook) -> Option<Hook> {
        match self.status {
            HookStatus::Pending => {
                self.queue.push(hook);
                None
            }
            HookStatus::Fired if self.point.is_retrospective() => Some(hook),
            HookStatus::Fired => {
                debug!(
                    target: LOG_TARGET,
                    point = %self.point,
                    "hook registered after its point fired, ignoring"
                );
                None
            }
        }
    }

    /// Marks the point fired and hands back the queued hooks.
    pub(crate) fn fire(&mut self) -> Vec<Hook> {
        self.status = HookStatus::Fired;
        mem::take(&mut self.queue)
    }

    pub(crate) const fn has_fired(&self) -> bool {
        matches!(self.status, HookStatus::Fired)
    }
}

/// The four registries owned by one application.
#[derive(Debug)]
pub(crate) struct HookRegistries {
    initiating: HookRegistry,
    booted: HookRegistry,
    ready: HookRegistry,
    terminating: HookRegistry,
}

impl Default for HookRegistries {
    fn default() -> Self {
        Self {
            initiating: HookRegistry::new(HookPoint::Initiating),
            booted: HookRegistry::new(HookPoint::Booted),
            ready: HookRegistry::new(HookPoint::Ready),
            terminating: HookRegistry::new(HookPoint::Terminating),
        }
    }
}

impl HookRegistries {
    pub(crate) const fn get_mut(&mut self, point: HookPoint) -> &mut HookRegistry {
        match point {
            HookPoint::Initiating => &mut self.initiating,
            HookPoint::Booted => &mut self.booted,
            HookPoint::Ready => &mut self.ready,
            HookPoint::Terminating => &mut self.terminating,
        }
    }

    pub(crate) const fn get(&self, point: HookPoint) -> &HookRegistry {
        match point {
            HookPoint::Initiating => &self.initiating,
            HookPoint::Booted => &self.booted,
            HookPoint::Ready => &self.ready,
            HookPoint::Terminating => &self.terminating,
        }
    }
}

/// Runs `hooks` one after another, stopping at the first failure.
pub(crate) async fn run_hooks(
    point: HookPoint,
    hooks: Vec<Hook>,
    context: &AppContext,
) -> anyhow::Result<()> {
    debug!(target: LOG_TARGET, point = %point, hooks = hooks.len(), "running hooks");
    for hook in hooks {
        hook(context.clone()).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests;
