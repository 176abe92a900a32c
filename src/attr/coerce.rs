//! Coercion chains for attribute values
//!
//! Per ATTRIBUTES.md, coercion normalizes an incoming value before
//! validation. A coercer is either a single transform or an ordered list
//! of predicate/transform rules. Rules are tried in declaration order and
//! the first matching rule's transform is applied; the chain then stops
//! (invariant A3: at most one transform per assignment, never a pipeline).
//! A value no rule matches passes through unchanged.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use super::validate::{Capability, PredicateFn, ValueKind};

/// Transform over a dynamic value
pub type TransformFn = Arc<dyn Fn(&Value) -> Value + Send + Sync>;

/// Guard deciding whether a chain rule applies to a value
#[derive(Clone)]
pub enum CoercePredicate {
    /// Arbitrary predicate function
    Predicate(PredicateFn),
    /// The value supports a capability (`respond_to`-keyed rule)
    RespondTo(Capability),
    /// The value is of a nominal kind (kind-keyed rule)
    KindOf(ValueKind),
}

impl CoercePredicate {
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            CoercePredicate::Predicate(f) => f(value),
            CoercePredicate::RespondTo(cap) => cap.supports(value),
            CoercePredicate::KindOf(kind) => kind.matches(value),
        }
    }
}

impl fmt::Debug for CoercePredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoercePredicate::Predicate(_) => write!(f, "Predicate(<fn>)"),
            CoercePredicate::RespondTo(cap) => write!(f, "RespondTo({})", cap),
            CoercePredicate::KindOf(kind) => write!(f, "KindOf({})", kind),
        }
    }
}

/// Transform applied when a rule's predicate matches
#[derive(Clone)]
pub enum Transform {
    /// Transform function
    Func(TransformFn),
    /// Apply a capability conversion. The predicate gates applicability;
    /// a value the conversion is undefined for passes through unchanged.
    Capability(Capability),
}

impl Transform {
    pub fn apply(&self, value: &Value) -> Value {
        match self {
            Transform::Func(f) => f(value),
            Transform::Capability(cap) => cap.apply(value).unwrap_or_else(|| value.clone()),
        }
    }
}

impl fmt::Debug for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transform::Func(_) => write!(f, "Func(<fn>)"),
            Transform::Capability(cap) => write!(f, "Capability({})", cap),
        }
    }
}

/// One predicate/transform pair in a coercion chain
#[derive(Debug, Clone)]
pub struct CoerceRule {
    predicate: CoercePredicate,
    transform: Transform,
}

impl CoerceRule {
    pub fn new(predicate: CoercePredicate, transform: Transform) -> Self {
        Self { predicate, transform }
    }

    /// Rule from a predicate function and a transform function
    pub fn when_fn(
        predicate: impl Fn(&Value) -> bool + Send + Sync + 'static,
        transform: impl Fn(&Value) -> Value + Send + Sync + 'static,
    ) -> Self {
        Self {
            predicate: CoercePredicate::Predicate(Arc::new(predicate)),
            transform: Transform::Func(Arc::new(transform)),
        }
    }

    /// Capability-keyed rule: applies the capability's conversion to any
    /// value that supports it.
    pub fn capability(cap: Capability) -> Self {
        Self {
            predicate: CoercePredicate::RespondTo(cap),
            transform: Transform::Capability(cap),
        }
    }

    /// Kind-keyed rule: applies the transform to values of the given kind.
    pub fn kind(kind: ValueKind, transform: impl Fn(&Value) -> Value + Send + Sync + 'static) -> Self {
        Self {
            predicate: CoercePredicate::KindOf(kind),
            transform: Transform::Func(Arc::new(transform)),
        }
    }

    pub fn matches(&self, value: &Value) -> bool {
        self.predicate.matches(value)
    }
}

/// Coercion configuration for one attribute
#[derive(Clone)]
pub enum Coercer {
    /// Single transform, applied unconditionally
    Func(TransformFn),
    /// Ordered predicate/transform rules, first match wins
    Chain(Vec<CoerceRule>),
}

impl fmt::Debug for Coercer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Coercer::Func(_) => write!(f, "Func(<fn>)"),
            Coercer::Chain(rules) => f.debug_tuple("Chain").field(rules).finish(),
        }
    }
}

impl Coercer {
    pub fn func(f: impl Fn(&Value) -> Value + Send + Sync + 'static) -> Self {
        Coercer::Func(Arc::new(f))
    }

    pub fn chain(rules: Vec<CoerceRule>) -> Self {
        Coercer::Chain(rules)
    }

    /// Single-entry chain keyed by capability
    pub fn capability(cap: Capability) -> Self {
        Coercer::Chain(vec![CoerceRule::capability(cap)])
    }

    /// Single-entry chain keyed by nominal kind
    pub fn kind(kind: ValueKind, transform: impl Fn(&Value) -> Value + Send + Sync + 'static) -> Self {
        Coercer::Chain(vec![CoerceRule::kind(kind, transform)])
    }

    /// Normalizes a value. For a chain, only the first matching rule's
    /// transform runs; remaining rules are not tried.
    pub fn apply(&self, value: &Value) -> Value {
        match self {
            Coercer::Func(f) => f(value),
            Coercer::Chain(rules) => {
                for rule in rules {
                    if rule.matches(value) {
                        return rule.transform.apply(value);
                    }
                }
                value.clone()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_func_coercer() {
        let coercer = Coercer::func(|v| {
            v.as_str()
                .and_then(|s| s.parse::<i64>().ok())
                .map(Value::from)
                .unwrap_or_else(|| v.clone())
        });
        assert_eq!(coercer.apply(&json!("10")), json!(10));
        assert_eq!(coercer.apply(&json!("ten")), json!("ten"));
    }

    #[test]
    fn test_chain_first_match_wins() {
        // Both rules match "10"; only the first transform must run.
        let coercer = Coercer::chain(vec![
            CoerceRule::capability(Capability::ToInt),
            CoerceRule::capability(Capability::ToString),
        ]);
        assert_eq!(coercer.apply(&json!("10")), json!(10));
    }

    #[test]
    fn test_chain_falls_through_to_later_rule() {
        let coercer = Coercer::chain(vec![
            CoerceRule::capability(Capability::ToInt),
            CoerceRule::capability(Capability::ToString),
        ]);
        // "ten" does not support to_int, so the second rule applies.
        assert_eq!(coercer.apply(&json!("ten")), json!("ten"));
        assert_eq!(coercer.apply(&json!(true)), json!("true"));
    }

    #[test]
    fn test_chain_no_match_passes_through() {
        let coercer = Coercer::chain(vec![CoerceRule::capability(Capability::ToInt)]);
        assert_eq!(coercer.apply(&json!({"a": 1})), json!({"a": 1}));
    }

    #[test]
    fn test_single_transform_not_a_pipeline() {
        // A matching rule's output is returned as-is, never re-fed into
        // later rules.
        let coercer = Coercer::chain(vec![
            CoerceRule::kind(ValueKind::String, |_| json!("first")),
            CoerceRule::kind(ValueKind::String, |_| json!("second")),
        ]);
        assert_eq!(coercer.apply(&json!("x")), json!("first"));
    }

    #[test]
    fn test_kind_keyed_rule() {
        let coercer = Coercer::kind(ValueKind::String, |v| {
            Value::from(v.as_str().map(str::len).unwrap_or(0))
        });
        assert_eq!(coercer.apply(&json!("abc")), json!(3));
        assert_eq!(coercer.apply(&json!(7)), json!(7));
    }

    #[test]
    fn test_when_fn_rule() {
        let coercer = Coercer::chain(vec![CoerceRule::when_fn(
            |v| v.as_i64().is_some_and(|i| i < 0),
            |v| Value::from(-v.as_i64().unwrap_or(0)),
        )]);
        assert_eq!(coercer.apply(&json!(-4)), json!(4));
        assert_eq!(coercer.apply(&json!(4)), json!(4));
    }
}
