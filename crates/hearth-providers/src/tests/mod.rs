//! Crate-level test doubles and BDD tests.

use std::sync::Arc;

use async_trait::async_trait;
use hearth_manifest::ModuleSpecifier;
use mockall::mock;
use parking_lot::Mutex;

use crate::error::ImportError;
use crate::importer::{Importer, Module};
use crate::provider::{LifecycleHook, Provider};


pub(crate) type Log = Arc<Mutex<Vec<String>>>;

mock! {
    pub(crate) Importer {}
    #[async_trait]
    impl Importer<Context> for Importer {
        async fn import(&self, specifier: &ModuleSpecifier) -> Result<Module<Context>, ImportError>;
    }
}

/// Stand-in for the application context: a shared hook log.
#[derive(Debug, Clone, Default)]
pub(crate) struct Context {
    log: Log,
}

impl Context {
    pub(crate) fn log(&self) -> Log {
        Arc::clone(&self.log)
    }

    pub(crate) fn entries(&self) -> Vec<String> {
        self.log.lock().clone()
    }
}

/// Provider appending `<tag>.<hook>` to the log for every hook it runs.
pub(crate) struct TraceProvider {
    tag: String,
    log: Log,
    skipped: Vec<LifecycleHook>,
    failing: Option<LifecycleHook>,
}

impl TraceProvider {
    pub(crate) fn new(tag: &str, log: Log) -> Self {
        Self {
            tag: tag.to_owned(),
            log,
            skipped: Vec::new(),
            failing: None,
        }
    }

    /// Reports `hook` as not implemented.
    pub(crate) fn without(mut self, hook: LifecycleHook) -> Self {
        self.skipped.push(hook);
        self
    }

    /// Fails `hook` with `"<tag>.<hook> failed"` instead of logging it.
    pub(crate) const fn failing_on(mut self, hook: LifecycleHook) -> Self {
        self.failing = Some(hook);
        self
    }

    fn record(&self, hook: LifecycleHook) -> anyhow::Result<()> {
        if self.failing == Some(hook) {
            anyhow::bail!("{}.{hook} failed", self.tag);
        }
        self.log.lock().push(format!("{}.{hook}", self.tag));
        Ok(())
    }
}

#[async_trait]
impl Provider for TraceProvider {
    fn implements(&self, hook: LifecycleHook) -> bool {
        !self.skipped.contains(&hook)
    }

    fn register(&self) -> anyhow::Result<()> {
        self.record(LifecycleHook::Register)
    }

    async fn boot(&self) -> anyhow::Result<()> {
        self.record(LifecycleHook::Boot)
    }

    async fn start(&self) -> anyhow::Result<()> {
        self.record(LifecycleHook::Start)
    }

    async fn ready(&self) -> anyhow::Result<()> {
        self.record(LifecycleHook::Ready)
    }

    async fn shutdown(&self) -> anyhow::Result<()> {
        self.record(LifecycleHook::Shutdown)
    }
}

/// Module whose default export is a [`TraceProvider`] tagged `tag`.
pub(crate) fn trace_module(class: &str, tag: &str) -> Module<Context> {
    let owned_tag = tag.to_owned();
    Module::new().with_default_class(class, move |context: &Context| {
        Arc::new(TraceProvider::new(&owned_tag, context.log()))
    })
}

/// Like [`trace_module`], with `hook` failing.
pub(crate) fn failing_module(class: &str, tag: &str, hook: LifecycleHook) -> Module<Context> {
    let owned_tag = tag.to_owned();
    Module::new().with_default_class(class, move |context: &Context| {
        Arc::new(TraceProvider::new(&owned_tag, context.log()).failing_on(hook))
    })
}
