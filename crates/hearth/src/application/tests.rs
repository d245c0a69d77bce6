//! Unit tests for the application state machine.

use std::fs;
use std::sync::Arc;
use std::time::Duration;

use hearth_config::EnvironmentSnapshot;
use hearth_manifest::AppEnvironment;
use hearth_providers::{LifecycleHook, Module, StaticImporter};
use mockall::mock;
use mockall::predicate::{always, eq};
use parking_lot::Mutex;
use rstest::{fixture, rstest};
use serde_json::json;

use super::*;
use crate::reporter::LifecycleReporter;
use crate::tests::{
    AppRoot, Log, RecordingNotifier, entries, failing_hook, log_hook, recording_importer,
    recording_module, test_options,
};

mock! {
    pub(crate) Reporter {}
    impl LifecycleReporter for Reporter {
        fn transition_starting(&self, target: ApplicationState);
        fn transition_completed(&self, target: ApplicationState, elapsed: Duration);
        fn transition_failed(&self, target: ApplicationState, error: &ApplicationError);
        fn providers_registered(&self, count: usize);
        fn preloads_importing(&self, count: usize);
    }
}

#[fixture]
fn root() -> AppRoot {
    AppRoot::new()
}

#[fixture]
fn log() -> Log {
    Arc::new(Mutex::new(Vec::new()))
}

fn application(root: &AppRoot, importer: StaticImporter<AppContext>) -> Application {
    Application::new(test_options(
        root,
        importer,
        Arc::new(RecordingNotifier::default()),
    ))
}

async fn run_to_ready(app: &mut Application, log: &Log) -> Result<(), ApplicationError> {
    app.init().await?;
    app.boot().await?;
    app.start(log_hook(log, "callback")).await
}

#[rstest]
#[tokio::test]
async fn init_installs_loaded_inputs(root: AppRoot) {
    fs::write(
        root.path().join("Cargo.toml"),
        "[package]\nname = \"shop\"\nversion = \"1.2.3\"\n",
    )
    .expect("write Cargo.toml");
    root.write_manifest(&json!({ "typescript": false, "directories": { "config": "settings" } }));
    let mut app = application(&root, StaticImporter::new());

    app.init().await.expect("init");

    let context = app.context();
    assert_eq!(app.state(), ApplicationState::Initiated);
    assert_eq!(context.app_name().as_deref(), Some("shop"));
    assert_eq!(context.version().map(|version| version.to_string()), Some("1.2.3".to_owned()));
    assert!(context.in_test());
    assert!(!context.uses_typescript());
    assert_eq!(context.config().get("app.name"), Some(&json!("fixture")));
    assert_eq!(
        context.paths().config_path(&["app.toml"]),
        root.path().join("settings/app.toml")
    );
}

#[rstest]
#[tokio::test]
async fn init_binds_env_and_config_in_the_container(root: AppRoot) {
    let mut app = application(&root, StaticImporter::new());

    app.init().await.expect("init");

    let container = app.context().container();
    let env = container
        .make::<EnvironmentSnapshot>(ENV_BINDING)
        .expect("env bound");
    let config = container
        .make::<hearth_config::ConfigTree>(CONFIG_BINDING)
        .expect("config bound");
    assert_eq!(env.get("APP_ENV"), Some("test"));
    assert_eq!(*config, *app.context().config());
}

#[rstest]
#[tokio::test]
async fn transitions_from_the_wrong_state_are_ignored(root: AppRoot, log: Log) {
    root.declare_providers(&["A"]);
    let mut app = application(&root, recording_importer(&["A"], &log, None));

    app.boot().await.expect("ignored boot");
    app.start(log_hook(&log, "callback")).await.expect("ignored start");
    app.terminate().await.expect("ignored terminate");

    assert_eq!(app.state(), ApplicationState::Created);
    assert!(entries(&log).is_empty());

    app.init().await.expect("init");
    app.init().await.expect("ignored init");
    assert_eq!(app.state(), ApplicationState::Initiated);
}

#[rstest]
#[tokio::test]
async fn providers_and_hooks_run_in_lifecycle_order(root: AppRoot, log: Log) {
    root.declare_providers(&["A"]);
    let mut app = application(&root, recording_importer(&["A"], &log, None));
    let context = app.context().clone();
    context.on_initiating(log_hook(&log, "initiating"));
    context.on_terminating(log_hook(&log, "terminating"));
    context
        .on_booted(log_hook(&log, "booted"))
        .await
        .expect("queued");
    context
        .on_ready(log_hook(&log, "ready"))
        .await
        .expect("queued");

    run_to_ready(&mut app, &log).await.expect("ready");
    app.terminate().await.expect("terminate");

    assert_eq!(
        entries(&log),
        [
            "initiating",
            "A.register",
            "A.boot",
            "booted",
            "A.start",
            "callback",
            "A.ready",
            "ready",
            "terminating",
            "A.shutdown",
        ]
    );
    assert!(context.is_terminating());
    assert!(context.is_terminated());
}

#[rstest]
#[tokio::test]
async fn introspection_follows_the_hooks_that_fired(root: AppRoot, log: Log) {
    let mut app = application(&root, StaticImporter::new());
    let context = app.context().clone();

    app.init().await.expect("init");
    assert!(context.hook_fired(HookPoint::Initiating));
    assert!(!context.is_booted());

    app.boot().await.expect("boot");
    assert!(context.is_booted());
    assert!(!context.is_ready());

    app.start(log_hook(&log, "callback")).await.expect("start");
    assert!(context.is_ready());
    assert!(!context.is_terminating());
}

#[rstest]
#[tokio::test]
async fn late_retrospective_hooks_run_immediately(root: AppRoot, log: Log) {
    let mut app = application(&root, StaticImporter::new());
    run_to_ready(&mut app, &log).await.expect("ready");
    let context = app.context().clone();

    context
        .on_booted(log_hook(&log, "late booted"))
        .await
        .expect("runs now");
    context
        .on_ready(log_hook(&log, "late ready"))
        .await
        .expect("runs now");
    let error = context
        .on_ready(failing_hook("late failure"))
        .await
        .expect_err("error surfaces");

    assert_eq!(entries(&log), ["callback", "late booted", "late ready"]);
    assert_eq!(error.to_string(), "late failure");
}

#[rstest]
#[tokio::test]
async fn a_failing_initiating_hook_aborts_init(root: AppRoot) {
    let mut app = application(&root, StaticImporter::new());
    app.context().on_initiating(failing_hook("no database"));

    let error = app.init().await.expect_err("init fails");

    assert!(matches!(error, ApplicationError::Hook(_)));
    assert_eq!(error.to_string(), "no database");
    assert_eq!(app.state(), ApplicationState::Created);
}

#[rstest]
#[tokio::test]
async fn a_failing_start_callback_leaves_the_application_booted(root: AppRoot, log: Log) {
    root.declare_providers(&["A"]);
    let mut app = application(&root, recording_importer(&["A"], &log, None));
    app.context()
        .on_ready(log_hook(&log, "ready"))
        .await
        .expect("queued");
    app.init().await.expect("init");
    app.boot().await.expect("boot");

    let error = app
        .start(failing_hook("port in use"))
        .await
        .expect_err("start fails");

    assert_eq!(error.to_string(), "port in use");
    assert_eq!(app.state(), ApplicationState::Booted);
    assert_eq!(entries(&log), ["A.register", "A.boot", "A.start"]);
}

#[rstest]
#[tokio::test]
async fn the_environment_is_locked_once_boot_begins(root: AppRoot) {
    let mut app = application(&root, StaticImporter::new());

    app.set_environment(AppEnvironment::Console)
        .expect("switch before init");
    app.init().await.expect("init");
    app.set_environment(AppEnvironment::Repl)
        .expect("switch after init");
    app.boot().await.expect("boot");
    let error = app
        .set_environment(AppEnvironment::Web)
        .expect_err("switch after boot");

    assert_eq!(error.code(), Some("E_CANNOT_SWITCH_ENVIRONMENT"));
    assert_eq!(app.environment(), AppEnvironment::Repl);
    assert_eq!(app.context().environment(), AppEnvironment::Repl);
}

#[rstest]
#[tokio::test]
async fn a_failed_boot_still_locks_the_environment(root: AppRoot, log: Log) {
    root.declare_providers(&["A"]);
    let importer = recording_importer(&["A"], &log, Some(("A", LifecycleHook::Boot)));
    let mut app = application(&root, importer);
    app.init().await.expect("init");

    app.boot().await.expect_err("boot fails");

    assert_eq!(app.state(), ApplicationState::Initiated);
    assert!(app.set_environment(AppEnvironment::Console).is_err());
}

#[rstest]
#[tokio::test]
async fn providers_are_filtered_by_environment(root: AppRoot, log: Log) {
    root.write_manifest(&json!({
        "providers": [
            "providers/A",
            { "file": "providers/B", "environment": ["console"] }
        ]
    }));
    let mut app = application(&root, recording_importer(&["A", "B"], &log, None));

    app.init().await.expect("init");
    app.boot().await.expect("boot");

    assert_eq!(entries(&log), ["A.register", "A.boot"]);
}

#[rstest]
#[tokio::test]
async fn preloads_import_between_provider_start_and_the_callback(root: AppRoot, log: Log) {
    root.write_manifest(&json!({
        "providers": ["providers/A"],
        "preloads": [
            "start/routes",
            { "file": "start/missing", "optional": true },
            { "file": "start/repl", "environment": ["repl"] }
        ]
    }));
    let preload_log = Arc::clone(&log);
    let importer = StaticImporter::new()
        .with_module("providers/A", recording_module("A", &log, None))
        .with_loader("start/routes", move || {
            preload_log.lock().push("routes".to_owned());
            Ok(Module::new())
        });
    let mut app = application(&root, importer);

    run_to_ready(&mut app, &log).await.expect("ready");

    assert_eq!(
        entries(&log),
        ["A.register", "A.boot", "A.start", "routes", "callback", "A.ready"]
    );
}

#[rstest]
#[tokio::test]
async fn missing_required_preloads_fail_start(root: AppRoot, log: Log) {
    root.write_manifest(&json!({ "preloads": ["start/kernel"] }));
    let mut app = application(&root, StaticImporter::new());

    let error = run_to_ready(&mut app, &log)
        .await
        .expect_err("start fails");

    assert_eq!(error.code(), Some("E_MODULE_NOT_FOUND"));
    assert_eq!(app.state(), ApplicationState::Booted);
    assert!(entries(&log).is_empty());
}

#[rstest]
#[tokio::test]
async fn readiness_is_reported_to_the_parent_process(root: AppRoot, log: Log) {
    let notifier = Arc::new(RecordingNotifier::default());
    let mut app = Application::new(test_options(
        &root,
        StaticImporter::new(),
        Arc::clone(&notifier),
    ));

    run_to_ready(&mut app, &log).await.expect("ready");

    let messages = notifier.messages();
    let message = messages.first().expect("ready message");
    assert_eq!(messages.len(), 1);
    assert_eq!(message.get("isHearth"), Some(&json!(true)));
    assert_eq!(message.get("environment"), Some(&json!("web")));
    assert!(message.get("duration").is_some_and(serde_json::Value::is_u64));

    app.notify(&json!({ "custom": 1 })).expect("delivered");
    assert_eq!(notifier.messages().len(), 2);
}

#[rstest]
#[tokio::test]
async fn terminate_runs_once(root: AppRoot, log: Log) {
    root.declare_providers(&["A"]);
    let mut app = application(&root, recording_importer(&["A"], &log, None));
    app.init().await.expect("init");

    app.terminate().await.expect("terminate");
    app.terminate().await.expect("ignored terminate");

    assert_eq!(app.state(), ApplicationState::Terminated);
    assert!(entries(&log).is_empty());
}

#[rstest]
#[tokio::test]
async fn a_failed_boot_is_not_attempted_again(root: AppRoot, log: Log) {
    root.declare_providers(&["A"]);
    let importer = recording_importer(&["A"], &log, Some(("A", LifecycleHook::Boot)));
    let mut app = application(&root, importer);
    app.init().await.expect("init");

    app.boot().await.expect_err("boot fails");
    app.boot().await.expect("ignored boot");

    assert_eq!(entries(&log), ["A.register"]);
    assert_eq!(app.state(), ApplicationState::Initiated);
}

#[rstest]
#[tokio::test]
async fn a_failed_start_is_not_attempted_again(root: AppRoot, log: Log) {
    root.declare_providers(&["A"]);
    let mut app = application(&root, recording_importer(&["A"], &log, None));
    app.init().await.expect("init");
    app.boot().await.expect("boot");

    app.start(failing_hook("port in use"))
        .await
        .expect_err("start fails");
    app.start(log_hook(&log, "callback"))
        .await
        .expect("ignored start");

    assert_eq!(entries(&log), ["A.register", "A.boot", "A.start"]);
    assert_eq!(app.state(), ApplicationState::Booted);
}

#[rstest]
#[tokio::test]
async fn terminating_hooks_fire_before_boot(root: AppRoot, log: Log) {
    let mut app = application(&root, StaticImporter::new());
    app.init().await.expect("init");
    app.context().on_terminating(log_hook(&log, "terminating"));

    app.terminate().await.expect("terminate");

    assert_eq!(entries(&log), ["terminating"]);
    assert_eq!(app.state(), ApplicationState::Terminated);
    assert!(app.context().is_terminated());
}

#[rstest]
#[tokio::test]
async fn terminate_after_a_failed_boot_shuts_down_registered_providers(root: AppRoot, log: Log) {
    root.declare_providers(&["A", "B"]);
    let importer = recording_importer(&["A", "B"], &log, Some(("B", LifecycleHook::Register)));
    let mut app = application(&root, importer);
    app.context().on_terminating(log_hook(&log, "terminating"));
    app.init().await.expect("init");
    app.boot().await.expect_err("boot fails");

    app.terminate().await.expect("terminate");

    assert_eq!(entries(&log), ["A.register", "terminating", "A.shutdown"]);
    assert_eq!(app.state(), ApplicationState::Terminated);
}

#[rstest]
#[tokio::test]
async fn a_retried_terminate_resumes_at_the_failed_shutdown(root: AppRoot, log: Log) {
    root.declare_providers(&["A", "B"]);
    let importer = recording_importer(&["A", "B"], &log, Some(("B", LifecycleHook::Shutdown)));
    let mut app = application(&root, importer);
    app.context().on_terminating(log_hook(&log, "terminating"));
    run_to_ready(&mut app, &log).await.expect("ready");

    let error = app.terminate().await.expect_err("shutdown fails");
    app.terminate().await.expect_err("shutdown fails again");

    let shutdown_log: Vec<String> = entries(&log)
        .into_iter()
        .filter(|entry| entry == "terminating" || entry.ends_with(".shutdown"))
        .collect();
    assert_eq!(error.to_string(), "B.shutdown failed");
    assert_eq!(shutdown_log, ["terminating", "A.shutdown"]);
    assert_eq!(app.state(), ApplicationState::Ready);
}

#[rstest]
#[tokio::test]
async fn reporter_sees_each_transition(root: AppRoot, log: Log) {
    root.declare_providers(&["A", "B"]);
    let importer = recording_importer(&["A", "B"], &log, Some(("B", LifecycleHook::Boot)));
    let mut reporter = MockReporter::new();
    reporter
        .expect_transition_starting()
        .with(eq(ApplicationState::Initiated))
        .times(1)
        .return_const(());
    reporter
        .expect_transition_completed()
        .with(eq(ApplicationState::Initiated), always())
        .times(1)
        .return_const(());
    reporter
        .expect_transition_starting()
        .with(eq(ApplicationState::Booted))
        .times(1)
        .return_const(());
    reporter
        .expect_providers_registered()
        .with(eq(2))
        .times(1)
        .return_const(());
    reporter
        .expect_transition_failed()
        .withf(|target, error| {
            *target == ApplicationState::Booted && error.to_string() == "B.boot failed"
        })
        .times(1)
        .return_const(());
    let options = test_options(&root, importer, Arc::new(RecordingNotifier::default()))
        .with_reporter(Arc::new(reporter));
    let mut app = Application::new(options);

    app.init().await.expect("init");
    app.boot().await.expect_err("boot fails");

    assert_eq!(entries(&log), ["A.register", "B.register", "A.boot"]);
}
