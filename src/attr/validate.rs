//! Validator dispatch for attribute values
//!
//! Per ATTRIBUTES.md, an assignment runs at most one check, resolved in a
//! fixed order:
//!
//! 1. Explicit rule (predicate function, pattern, or literal equality)
//! 2. Nominal value-kind check (`kind_of`)
//! 3. Capability check (`respond_to`)
//! 4. No check (always valid)
//!
//! Exactly one branch fires per call. Resolution lives on the descriptor;
//! this module defines the closed set of check kinds.

use std::fmt;
use std::sync::Arc;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Nominal kinds of the dynamic value model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    /// Null
    Null,
    /// Boolean
    Bool,
    /// 64-bit signed integer
    Int,
    /// 64-bit floating point (accepts integer values)
    Float,
    /// UTF-8 string
    String,
    /// Array of values
    Array,
    /// Key/value map
    Object,
}

impl ValueKind {
    /// Returns the kind of a value
    pub fn of(value: &Value) -> ValueKind {
        match value {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Bool,
            Value::Number(n) => {
                if n.is_i64() || n.is_u64() {
                    ValueKind::Int
                } else {
                    ValueKind::Float
                }
            }
            Value::String(_) => ValueKind::String,
            Value::Array(_) => ValueKind::Array,
            Value::Object(_) => ValueKind::Object,
        }
    }

    /// Returns the kind name for error messages
    pub fn name(&self) -> &'static str {
        match self {
            ValueKind::Null => "null",
            ValueKind::Bool => "bool",
            ValueKind::Int => "int",
            ValueKind::Float => "float",
            ValueKind::String => "string",
            ValueKind::Array => "array",
            ValueKind::Object => "object",
        }
    }

    /// Nominal membership check. Float accepts integer values; Int does not
    /// accept floats.
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            ValueKind::Float => value.is_number(),
            ValueKind::Int => value.is_i64() || value.is_u64(),
            kind => ValueKind::of(value) == *kind,
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Conversions a dynamic value may support (`respond_to` analog).
///
/// A value "responds to" a capability when the conversion is defined for
/// it; [`Capability::apply`] performs the conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Integer view: integers, integral floats, parseable strings
    ToInt,
    /// Float view: numbers, parseable strings
    ToFloat,
    /// Boolean view: booleans, "true"/"false" strings
    ToBool,
    /// String view: any scalar except null
    ToString,
}

impl Capability {
    /// Returns the capability name for error messages
    pub fn name(&self) -> &'static str {
        match self {
            Capability::ToInt => "to_int",
            Capability::ToFloat => "to_float",
            Capability::ToBool => "to_bool",
            Capability::ToString => "to_string",
        }
    }

    /// Whether the value supports this conversion
    pub fn supports(&self, value: &Value) -> bool {
        self.apply(value).is_some()
    }

    /// Performs the conversion, or returns None when the value does not
    /// support it.
    pub fn apply(&self, value: &Value) -> Option<Value> {
        match self {
            Capability::ToInt => {
                if let Some(i) = value.as_i64() {
                    return Some(Value::from(i));
                }
                if let Some(u) = value.as_u64() {
                    return Some(Value::from(u));
                }
                if let Some(f) = value.as_f64() {
                    if f.is_finite() && f.fract() == 0.0 {
                        return Some(Value::from(f as i64));
                    }
                    return None;
                }
                value
                    .as_str()
                    .and_then(|s| s.trim().parse::<i64>().ok())
                    .map(Value::from)
            }
            Capability::ToFloat => {
                if let Some(f) = value.as_f64() {
                    return Some(Value::from(f));
                }
                value
                    .as_str()
                    .and_then(|s| s.trim().parse::<f64>().ok())
                    .filter(|f| f.is_finite())
                    .map(Value::from)
            }
            Capability::ToBool => match value {
                Value::Bool(b) => Some(Value::Bool(*b)),
                Value::String(s) => match s.as_str() {
                    "true" => Some(Value::Bool(true)),
                    "false" => Some(Value::Bool(false)),
                    _ => None,
                },
                _ => None,
            },
            Capability::ToString => match value {
                Value::String(s) => Some(Value::String(s.clone())),
                Value::Bool(b) => Some(Value::String(b.to_string())),
                Value::Number(n) => Some(Value::String(n.to_string())),
                _ => None,
            },
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Predicate over a dynamic value
pub type PredicateFn = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// Explicit validation rule. Takes precedence over kind and capability
/// checks when present on a descriptor.
#[derive(Clone)]
pub enum ValidateRule {
    /// Arbitrary predicate function
    Predicate(PredicateFn),
    /// Pattern match over string values; non-strings never match
    Pattern(Regex),
    /// Literal equality
    Equals(Value),
}

impl ValidateRule {
    /// Builds a predicate rule
    pub fn predicate(f: impl Fn(&Value) -> bool + Send + Sync + 'static) -> Self {
        ValidateRule::Predicate(Arc::new(f))
    }

    /// Whether the value passes this rule
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            ValidateRule::Predicate(f) => f(value),
            ValidateRule::Pattern(re) => value.as_str().is_some_and(|s| re.is_match(s)),
            ValidateRule::Equals(expected) => value == expected,
        }
    }

    /// Expected-condition text for error messages
    pub(crate) fn expectation(&self) -> String {
        match self {
            ValidateRule::Predicate(_) => "pass validation".into(),
            ValidateRule::Pattern(re) => format!("match pattern /{}/", re.as_str()),
            ValidateRule::Equals(expected) => format!("equal {}", expected),
        }
    }
}

impl fmt::Debug for ValidateRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidateRule::Predicate(_) => write!(f, "Predicate(<fn>)"),
            ValidateRule::Pattern(re) => write!(f, "Pattern(/{}/)", re.as_str()),
            ValidateRule::Equals(v) => write!(f, "Equals({})", v),
        }
    }
}
