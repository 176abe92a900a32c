//! Coercion Chain Tests
//!
//! Tests for coercion invariants:
//! - Chains apply the first matching rule only, never a pipeline
//! - Validation always runs on the coerced value
//! - Single-function, capability-keyed and kind-keyed coercers behave as
//!   single-entry chains

use attrx::attr::{AttrErrorCode, AttrOptions, Capability, CoerceRule, ValueKind};
use attrx::schema::{Schema, SchemaBuilder};
use serde_json::{json, Value};

// =============================================================================
// Helper Functions
// =============================================================================

fn int_schema_with(options: AttrOptions) -> Schema {
    let mut builder = SchemaBuilder::new();
    builder
        .declare("x", options.kind_of(ValueKind::Int))
        .unwrap();
    builder.freeze()
}

// =============================================================================
// Chain Ordering Tests
// =============================================================================

/// With an int rule before a string rule, "10" converts to the integer
/// 10; the string transform is never tried.
#[test]
fn test_first_match_wins() {
    let schema = int_schema_with(AttrOptions::new().coerce_chain(vec![
        CoerceRule::capability(Capability::ToInt),
        CoerceRule::capability(Capability::ToString),
    ]));

    let instance = schema.construct(json!({ "x": "10" })).unwrap();
    assert_eq!(instance.get("x").unwrap(), json!(10));
}

/// A value the first rule cannot handle falls through to later rules.
#[test]
fn test_later_rule_applies_when_earlier_does_not_match() {
    let mut builder = SchemaBuilder::new();
    builder
        .declare(
            "x",
            AttrOptions::new()
                .kind_of(ValueKind::String)
                .coerce_chain(vec![
                    CoerceRule::kind(ValueKind::Int, |v| {
                        Value::from(format!("int:{}", v))
                    }),
                    CoerceRule::capability(Capability::ToString),
                ]),
        )
        .unwrap();
    let schema = builder.freeze();

    let from_int = schema.construct(json!({ "x": 7 })).unwrap();
    assert_eq!(from_int.get("x").unwrap(), json!("int:7"));

    let from_bool = schema.construct(json!({ "x": true })).unwrap();
    assert_eq!(from_bool.get("x").unwrap(), json!("true"));
}

/// A value no rule matches passes through unchanged, and validation then
/// judges the original value.
#[test]
fn test_unmatched_value_reaches_validation_unchanged() {
    let schema = int_schema_with(
        AttrOptions::new().coerce_chain(vec![CoerceRule::capability(Capability::ToInt)]),
    );

    let err = schema.construct(json!({ "x": {} })).unwrap_err();
    assert_eq!(err.code(), AttrErrorCode::AttrxInvalidAttrArgument);
    assert_eq!(err.attribute(), Some("x"));
}

// =============================================================================
// Coercer Form Tests
// =============================================================================

/// A single transform function coerces directly.
#[test]
fn test_function_coercer() {
    let schema = int_schema_with(AttrOptions::new().coerce_fn(|v| {
        match v.as_str().and_then(|s| s.parse::<i64>().ok()) {
            Some(i) if i > 0 => Value::from(i),
            _ => v.clone(),
        }
    }));

    let instance = schema.construct(json!({ "x": "10" })).unwrap();
    assert_eq!(instance.get("x").unwrap(), json!(10));

    let err = schema.construct(json!({ "x": "zero" })).unwrap_err();
    assert_eq!(err.code(), AttrErrorCode::AttrxInvalidAttrArgument);
}

/// A capability-keyed coercer behaves as a single-entry chain.
#[test]
fn test_capability_keyed_coercer() {
    let schema = int_schema_with(AttrOptions::new().coerce_capability(Capability::ToInt));

    let instance = schema.construct(json!({ "x": "10" })).unwrap();
    assert_eq!(instance.get("x").unwrap(), json!(10));

    let err = schema.construct(json!({ "x": [] })).unwrap_err();
    assert_eq!(err.code(), AttrErrorCode::AttrxInvalidAttrArgument);
}

/// A kind-keyed coercer applies its transform to values of that kind
/// only.
#[test]
fn test_kind_keyed_coercer() {
    let schema = int_schema_with(AttrOptions::new().coerce_kind(ValueKind::String, |v| {
        v.as_str()
            .and_then(|s| s.trim().parse::<i64>().ok())
            .map(Value::from)
            .unwrap_or_else(|| v.clone())
    }));

    let instance = schema.construct(json!({ "x": " 10 " })).unwrap();
    assert_eq!(instance.get("x").unwrap(), json!(10));

    // Ints bypass the string rule untouched.
    let instance = schema.construct(json!({ "x": 5 })).unwrap();
    assert_eq!(instance.get("x").unwrap(), json!(5));
}

// =============================================================================
// Validation After Coercion Tests
// =============================================================================

/// An int-kinded attribute with a to_int coercer accepts "10" and stores
/// the integer; a value without the capability fails validation.
#[test]
fn test_validation_judges_coerced_value() {
    let schema = int_schema_with(AttrOptions::new().coerce_capability(Capability::ToInt));

    let instance = schema.construct(json!({ "x": "10" })).unwrap();
    assert_eq!(instance.get("x").unwrap(), json!(10));
    assert_eq!(ValueKind::of(&instance.get("x").unwrap()), ValueKind::Int);

    let err = schema.construct(json!({ "x": "ten" })).unwrap_err();
    assert_eq!(err.code(), AttrErrorCode::AttrxInvalidAttrArgument);
}

/// Defaults route through coercion too.
#[test]
fn test_defaults_are_coerced() {
    let mut builder = SchemaBuilder::new();
    builder
        .declare(
            "x",
            AttrOptions::new()
                .optional(true)
                .kind_of(ValueKind::Int)
                .coerce_capability(Capability::ToInt)
                .default_value("99"),
        )
        .unwrap();
    let schema = builder.freeze();

    let instance = schema.construct(json!({})).unwrap();
    assert_eq!(instance.get("x").unwrap(), json!(99));
}
