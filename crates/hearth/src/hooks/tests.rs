//! Unit tests for hook registries.

use std::sync::Arc;

use camino::Utf8PathBuf;
use futures::FutureExt;
use hearth_manifest::AppEnvironment;
use parking_lot::Mutex;
use rstest::{fixture, rstest};

use super::*;

type Log = Arc<Mutex<Vec<String>>>;

#[fixture]
fn context() -> AppContext {
    AppContext::new(Utf8PathBuf::from("/srv/app"), AppEnvironment::Console)
}

fn recording(log: &Log, tag: &str) -> Hook {
    let sink = Arc::clone(log);
    let owned = tag.to_owned();
    Box::new(move |_| {
        async move {
            sink.lock().push(owned);
            Ok(())
        }
        .boxed()
    })
}

fn failing(message: &'static str) -> Hook {
    Box::new(move |_| async move { Err(anyhow::anyhow!(message)) }.boxed())
}

#[rstest]
#[case::initiating(HookPoint::Initiating, false)]
#[case::booted(HookPoint::Booted, true)]
#[case::ready(HookPoint::Ready, true)]
#[case::terminating(HookPoint::Terminating, false)]
fn only_booted_and_ready_are_retrospective(#[case] point: HookPoint, #[case] expected: bool) {
    assert_eq!(point.is_retrospective(), expected);
}

#[rstest]
#[tokio::test]
async fn fired_hooks_run_in_registration_order(context: AppContext) {
    let log = Log::default();
    let mut registry = HookRegistry::new(HookPoint::Ready);
    assert!(registry.register(recording(&log, "first")).is_none());
    assert!(registry.register(recording(&log, "second")).is_none());

    let queued = registry.fire();
    run_hooks(HookPoint::Ready, queued, &context)
        .await
        .expect("hooks succeed");

    assert_eq!(*log.lock(), ["first", "second"]);
    assert!(registry.has_fired());
    assert!(registry.fire().is_empty());
}

#[rstest]
#[tokio::test]
async fn first_failure_stops_the_drain(context: AppContext) {
    let log = Log::default();
    let mut registry = HookRegistry::new(HookPoint::Terminating);
    registry.register(failing("flush failed"));
    registry.register(recording(&log, "after"));

    let error = run_hooks(HookPoint::Terminating, registry.fire(), &context)
        .await
        .expect_err("first hook fails");

    assert_eq!(error.to_string(), "flush failed");
    assert!(log.lock().is_empty());
}

#[rstest]
#[case::booted(HookPoint::Booted, true)]
#[case::initiating(HookPoint::Initiating, false)]
fn late_registration_depends_on_the_point(#[case] point: HookPoint, #[case] handed_back: bool) {
    let log = Log::default();
    let mut registry = HookRegistry::new(point);
    drop(registry.fire());

    let late = registry.register(recording(&log, "late"));

    assert_eq!(late.is_some(), handed_back);
    assert!(registry.fire().is_empty());
}

#[rstest]
fn registries_are_independent() {
    let mut registries = HookRegistries::default();

    drop(registries.get_mut(HookPoint::Booted).fire());

    assert!(registries.get(HookPoint::Booted).has_fired());
    assert!(!registries.get(HookPoint::Ready).has_fired());
}
