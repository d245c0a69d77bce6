//! Unit tests for module exports and the static importer.

use std::sync::atomic::{AtomicUsize, Ordering};

use serde_json::json;

use super::*;
use crate::tests::{Context, TraceProvider};

fn trace_module() -> Module<Context> {
    Module::new().with_default_class("TraceProvider", |context: &Context| {
        Arc::new(TraceProvider::new("trace", context.log()))
    })
}

#[tokio::test]
async fn registered_module_is_returned() {
    let importer = StaticImporter::new().with_module("providers/trace", trace_module());

    let module = importer
        .import(&ModuleSpecifier::new("providers/trace"))
        .await
        .expect("module should import");

    assert!(matches!(module.default_export(), Some(Export::Class(_))));
}

#[tokio::test]
async fn unknown_specifier_is_not_found() {
    let importer = StaticImporter::<Context>::new();

    let error = importer
        .import(&ModuleSpecifier::new("providers/missing"))
        .await
        .expect_err("missing module must fail");

    assert!(error.is_not_found());
    assert!(error.to_string().contains("providers/missing"));
}

#[tokio::test]
async fn loader_runs_on_every_import() {
    let evaluations = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&evaluations);
    let importer = StaticImporter::<Context>::new().with_loader("start/routes", move || {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(Module::new())
    });
    let specifier = ModuleSpecifier::new("start/routes");

    importer.import(&specifier).await.expect("first import");
    importer.import(&specifier).await.expect("second import");

    assert_eq!(evaluations.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn loader_failure_is_reported_unchanged() {
    let importer = StaticImporter::<Context>::new()
        .with_loader("start/broken", || Err(anyhow::anyhow!("unexpected token")));

    let error = importer
        .import(&ModuleSpecifier::new("start/broken"))
        .await
        .expect_err("loader failure must propagate");

    assert!(!error.is_not_found());
    assert_eq!(error.to_string(), "unexpected token");
}

#[test]
fn exports_render_for_diagnostics() {
    let value = Export::<Context>::Value(json!({ "port": 3333 }));
    assert_eq!(value.render(), r#"{"port":3333}"#);

    let module = trace_module();
    let class = module.default_export().expect("default export");
    assert_eq!(class.render(), "[class TraceProvider]");
}

#[test]
fn class_instantiates_with_context() {
    let context = Context::default();
    let module = trace_module();
    let Some(Export::Class(class)) = module.default_export() else {
        panic!("expected class export");
    };

    let provider = class.instantiate(&context);

    assert!(provider.implements(crate::LifecycleHook::Boot));
    assert_eq!(class.name(), "TraceProvider");
}
