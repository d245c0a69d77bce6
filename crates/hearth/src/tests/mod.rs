//! Crate-level test doubles and BDD tests.

use std::fs;
use std::future::{Ready, ready};
use std::sync::Arc;

use async_trait::async_trait;
use camino::{Utf8Path, Utf8PathBuf};
use hearth_config::{ConfigTree, EnvironmentSnapshot, StaticConfigLoader, StaticEnvLoader};
use hearth_manifest::AppEnvironment;
use hearth_providers::{LifecycleHook, Module, Provider, StaticImporter};
use parking_lot::Mutex;
use serde_json::{Value, json};
use tempfile::TempDir;

use crate::context::AppContext;
use crate::options::ApplicationOptions;
use crate::process::{Notifier, NotifyError};


pub(crate) type Log = Arc<Mutex<Vec<String>>>;

pub(crate) fn entries(log: &Log) -> Vec<String> {
    log.lock().clone()
}

/// Hook appending `entry` to `log`.
pub(crate) fn log_hook(
    log: &Log,
    entry: &str,
) -> impl FnOnce(AppContext) -> Ready<anyhow::Result<()>> + Send + 'static {
    let shared = Arc::clone(log);
    let owned = entry.to_owned();
    move |_context| {
        shared.lock().push(owned);
        ready(Ok(()))
    }
}

/// Hook failing with `message`.
pub(crate) fn failing_hook(
    message: &str,
) -> impl FnOnce(AppContext) -> Ready<anyhow::Result<()>> + Send + 'static {
    let owned = message.to_owned();
    move |_context| ready(Err(anyhow::anyhow!(owned)))
}

/// Provider appending `<tag>.<hook>` to the log for every hook it runs.
pub(crate) struct RecordingProvider {
    tag: String,
    log: Log,
    failing: Option<LifecycleHook>,
}

impl RecordingProvider {
    fn record(&self, hook: LifecycleHook) -> anyhow::Result<()> {
        if self.failing == Some(hook) {
            anyhow::bail!("{}.{hook} failed", self.tag);
        }
        self.log.lock().push(format!("{}.{hook}", self.tag));
        Ok(())
    }
}

#[async_trait]
impl Provider for RecordingProvider {
    fn implements(&self, _hook: LifecycleHook) -> bool {
        true
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

/// Provider that queues a `ready` hook from its boot hook.
pub(crate) struct HookingProvider {
    context: AppContext,
    log: Log,
}

#[async_trait]
impl Provider for HookingProvider {
    fn implements(&self, hook: LifecycleHook) -> bool {
        hook == LifecycleHook::Boot
    }

    async fn boot(&self) -> anyhow::Result<()> {
        self.context
            .on_ready(log_hook(&self.log, "hooking.on_ready"))
            .await?;
        Ok(())
    }
}

/// Module whose default export is a [`RecordingProvider`].
pub(crate) fn recording_module(
    tag: &str,
    log: &Log,
    failing: Option<LifecycleHook>,
) -> Module<AppContext> {
    let owned_tag = tag.to_owned();
    let shared = Arc::clone(log);
    Module::new().with_default_class(format!("{tag}Provider"), move |_context: &AppContext| {
        Arc::new(RecordingProvider {
            tag: owned_tag.clone(),
            log: Arc::clone(&shared),
            failing,
        })
    })
}

/// Module whose default export is a [`HookingProvider`].
pub(crate) fn hooking_module(log: &Log) -> Module<AppContext> {
    let shared = Arc::clone(log);
    Module::new().with_default_class("HookingProvider", move |context: &AppContext| {
        Arc::new(HookingProvider {
            context: context.clone(),
            log: Arc::clone(&shared),
        })
    })
}

/// Specifier under which provider `tag` is registered.
pub(crate) fn provider_specifier(tag: &str) -> String {
    format!("providers/{tag}")
}

/// Importer serving a [`RecordingProvider`] for each tag, with `failing`
/// applied to the matching tag.
pub(crate) fn recording_importer(
    tags: &[&str],
    log: &Log,
    failing: Option<(&str, LifecycleHook)>,
) -> StaticImporter<AppContext> {
    tags.iter().fold(StaticImporter::new(), |importer, tag| {
        let hook = failing
            .filter(|(failing_tag, _)| failing_tag == tag)
            .map(|(_, hook)| hook);
        importer.with_module(provider_specifier(tag), recording_module(tag, log, hook))
    })
}

/// Notifier remembering every message it was asked to send.
#[derive(Debug, Default)]
pub(crate) struct RecordingNotifier {
    messages: Mutex<Vec<Value>>,
}

impl RecordingNotifier {
    pub(crate) fn messages(&self) -> Vec<Value> {
        self.messages.lock().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, message: &Value) -> Result<(), NotifyError> {
        self.messages.lock().push(message.clone());
        Ok(())
    }
}

/// Temporary application root.
pub(crate) struct AppRoot {
    _dir: TempDir,
    path: Utf8PathBuf,
}

impl AppRoot {
    pub(crate) fn new() -> Self {
        let dir = TempDir::new().expect("temp dir");
        let path = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 temp path");
        Self { _dir: dir, path }
    }

    pub(crate) fn path(&self) -> &Utf8Path {
        &self.path
    }

    pub(crate) fn write_manifest(&self, manifest: &Value) {
        fs::write(self.path.join("hearthrc.json"), manifest.to_string()).expect("write manifest");
    }

    /// Declares one provider per tag, active in every environment.
    pub(crate) fn declare_providers(&self, tags: &[&str]) {
        let providers: Vec<String> = tags.iter().map(|tag| provider_specifier(tag)).collect();
        self.write_manifest(&json!({ "providers": providers }));
    }
}

/// Options for an application under `root` running in `web`, with fixed
/// config and environment.
pub(crate) fn test_options(
    root: &AppRoot,
    importer: StaticImporter<AppContext>,
    notifier: Arc<RecordingNotifier>,
) -> ApplicationOptions {
    let env: EnvironmentSnapshot = [("APP_ENV", "test")].into_iter().collect();
    let config = ConfigTree::new(json!({ "app": { "name": "fixture" } }));
    ApplicationOptions::new(root.path(), Arc::new(importer))
        .with_env_loader(Arc::new(StaticEnvLoader::new(env)))
        .with_config_loader(Arc::new(StaticConfigLoader::new(config)))
        .with_notifier(notifier)
        .with_environment(AppEnvironment::Web)
}
