//! Lazy Default Tests
//!
//! Tests for lazy-attribute invariants:
//! - A lazy default resolves on first read, not during construction
//! - Resolution happens at most once per instance, even for null results
//! - Side effects in defaults are bounded to one per instance-attribute
//!   pair

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use attrx::attr::AttrOptions;
use attrx::schema::{Schema, SchemaBuilder};
use serde_json::{json, Value};

// =============================================================================
// Helper Functions
// =============================================================================

fn counting_schema(calls: Arc<AtomicUsize>, result: Value) -> Schema {
    let mut builder = SchemaBuilder::new();
    builder
        .declare(
            "slot",
            AttrOptions::new()
                .optional(true)
                .lazy(true)
                .default_fn(move |_| {
                    calls.fetch_add(1, Ordering::SeqCst);
                    result.clone()
                }),
        )
        .unwrap();
    builder.freeze()
}

// =============================================================================
// Deferral Tests
// =============================================================================

/// Construction leaves a lazy attribute pending; eager defaults would
/// have been applied at this point.
#[test]
fn test_not_resolved_during_construction() {
    let calls = Arc::new(AtomicUsize::new(0));
    let schema = counting_schema(Arc::clone(&calls), json!("value"));

    let instance = schema.construct(json!({})).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert!(!instance.is_set("slot"));
}

/// First read resolves and memoizes; later reads return the same value
/// without re-resolving.
#[test]
fn test_resolved_once_across_reads() {
    let calls = Arc::new(AtomicUsize::new(0));
    let schema = counting_schema(Arc::clone(&calls), json!({ "nested": [1, 2] }));

    let instance = schema.construct(json!({})).unwrap();
    let first = instance.get("slot").unwrap();
    let second = instance.get("slot").unwrap();

    assert_eq!(first, second);
    assert_eq!(first, json!({ "nested": [1, 2] }));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(instance.is_set("slot"));
}

/// A lazy default computing null is still memoized; null is a computed
/// value, not "not yet computed".
#[test]
fn test_null_result_memoized() {
    let calls = Arc::new(AtomicUsize::new(0));
    let schema = counting_schema(Arc::clone(&calls), Value::Null);

    let instance = schema.construct(json!({})).unwrap();
    assert_eq!(instance.get("slot").unwrap(), Value::Null);
    assert_eq!(instance.get("slot").unwrap(), Value::Null);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

/// Each instance resolves independently.
#[test]
fn test_once_per_instance() {
    let calls = Arc::new(AtomicUsize::new(0));
    let schema = counting_schema(Arc::clone(&calls), json!(1));

    let a = schema.construct(json!({})).unwrap();
    let b = schema.construct(json!({})).unwrap();
    a.get("slot").unwrap();
    a.get("slot").unwrap();
    b.get("slot").unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

/// An input value preempts the lazy default entirely.
#[test]
fn test_input_preempts_lazy_default() {
    let calls = Arc::new(AtomicUsize::new(0));
    let schema = counting_schema(Arc::clone(&calls), json!("default"));

    let instance = schema.construct(json!({ "slot": "given" })).unwrap();
    assert_eq!(instance.get("slot").unwrap(), json!("given"));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

// =============================================================================
// Side Effect Tests
// =============================================================================

/// A default with a filesystem side effect runs it at most once per
/// instance.
#[test]
fn test_side_effect_bounded_to_one() {
    let dir = tempfile::TempDir::new().unwrap();
    let marker = dir.path().join("opened");
    let marker_for_default = marker.clone();

    let mut builder = SchemaBuilder::new();
    builder
        .declare(
            "resource",
            AttrOptions::new()
                .optional(true)
                .lazy(true)
                .default_fn(move |_| {
                    let mut content = std::fs::read_to_string(&marker_for_default)
                        .unwrap_or_default();
                    content.push('x');
                    std::fs::write(&marker_for_default, &content).unwrap();
                    json!(content.len())
                }),
        )
        .unwrap();
    let schema = builder.freeze();

    let instance = schema.construct(json!({})).unwrap();
    assert!(!marker.exists());

    assert_eq!(instance.get("resource").unwrap(), json!(1));
    assert_eq!(instance.get("resource").unwrap(), json!(1));
    assert_eq!(std::fs::read_to_string(&marker).unwrap(), "x");
}

/// Lazy defaults may read sibling attributes assigned during
/// construction.
#[test]
fn test_lazy_default_reads_siblings() {
    let mut builder = SchemaBuilder::new();
    builder
        .declare("prefix", AttrOptions::new().optional(true).default_value("item"))
        .unwrap()
        .declare(
            "label",
            AttrOptions::new()
                .optional(true)
                .lazy(true)
                .default_fn(|src| {
                    let prefix = src
                        .attr("prefix")
                        .and_then(|v| v.as_str().map(str::to_owned))
                        .unwrap_or_default();
                    Value::from(format!("{}-1", prefix))
                }),
        )
        .unwrap();
    let schema = builder.freeze();

    let instance = schema.construct(json!({})).unwrap();
    assert_eq!(instance.get("label").unwrap(), json!("item-1"));

    let overridden = schema.construct(json!({ "prefix": "task" })).unwrap();
    assert_eq!(overridden.get("label").unwrap(), json!("task-1"));
}
