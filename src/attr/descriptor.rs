//! Attribute descriptor and declaration options
//!
//! Per ATTRIBUTES.md, a descriptor carries one attribute's full behavioral
//! contract as data: validation, coercion, default resolution, laziness,
//! writability. Descriptors are created once at declaration time and only
//! referenced afterwards; there is no per-attribute code generation, a
//! single generic dispatch path consults the descriptor table.
//!
//! Declaration invariants (checked before registration, D1-D3):
//!
//! - lazy requires a default
//! - a required attribute must not have a default
//! - an optional attribute must stay writable in the cell entry point
//!
//! `coerce` and `validate` never error themselves; the assignment path
//! that calls them rejects the value when validation fails.

use std::fmt;
use std::sync::Arc;

use regex::Regex;
use serde_json::Value;

use super::coerce::{CoerceRule, Coercer};
use super::errors::{AttrError, AttrResult};
use super::validate::{Capability, ValidateRule, ValueKind};

/// Read access to sibling attributes for default-value functions.
///
/// Implemented by [`crate::construct::Instance`]; a default function may
/// compute its value from attributes assigned earlier. Unknown names and
/// failed resolutions read as `None`.
pub trait AttrSource {
    fn attr(&self, name: &str) -> Option<Value>;
}

/// An [`AttrSource`] with no attributes, for contexts without an owning
/// instance (the standalone cell).
pub struct NoSource;

impl AttrSource for NoSource {
    fn attr(&self, _name: &str) -> Option<Value> {
        None
    }
}

/// Default-value function, invoked with the owning instance
pub type DefaultFn = Arc<dyn Fn(&dyn AttrSource) -> Value + Send + Sync>;

/// Default-value policy for one attribute
#[derive(Clone)]
pub enum DefaultSpec {
    /// Literal default
    Value(Value),
    /// Computed default; runs through the same assignment path as input
    /// values, so coercion and validation apply to its result too
    Func(DefaultFn),
}

impl DefaultSpec {
    pub fn resolve(&self, source: &dyn AttrSource) -> Value {
        match self {
            DefaultSpec::Value(v) => v.clone(),
            DefaultSpec::Func(f) => f(source),
        }
    }
}

impl fmt::Debug for DefaultSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefaultSpec::Value(v) => write!(f, "Value({})", v),
            DefaultSpec::Func(_) => write!(f, "Func(<fn>)"),
        }
    }
}

/// Which declaration entry point is registering the attribute.
///
/// The two entry points keep distinguishable semantics: the schema
/// `declare` path permits an optional attribute to be explicitly declared
/// non-writable, the standalone cell path rejects it (D3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DeclarationEntry {
    Declare,
    Cell,
}

/// One attribute's full behavioral contract
#[derive(Clone)]
pub struct AttrDescriptor {
    name: String,
    optional: bool,
    writable: bool,
    lazy: bool,
    default: Option<DefaultSpec>,
    validate: Option<ValidateRule>,
    kind: Option<ValueKind>,
    capability: Option<Capability>,
    coercer: Option<Coercer>,
    description: Option<String>,
}

impl AttrDescriptor {
    /// Attribute name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether construction succeeds without a value for this attribute
    pub fn is_optional(&self) -> bool {
        self.optional
    }

    /// Whether the attribute accepts public reassignment after construction
    pub fn is_writable(&self) -> bool {
        self.writable
    }

    /// Whether the default is deferred to first read and memoized
    pub fn is_lazy(&self) -> bool {
        self.lazy
    }

    /// Whether a default is configured
    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }

    /// Documentation string, no runtime effect
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Runs the validation dispatch. Resolution order: explicit rule,
    /// then kind check, then capability check, else no check. Exactly one
    /// branch fires.
    pub fn validate(&self, value: &Value) -> bool {
        if let Some(rule) = &self.validate {
            return rule.accepts(value);
        }
        if let Some(kind) = self.kind {
            return kind.matches(value);
        }
        if let Some(cap) = self.capability {
            return cap.supports(value);
        }
        true
    }

    /// Normalizes a value; identity when no coercer is configured
    pub fn coerce(&self, value: &Value) -> Value {
        match &self.coercer {
            Some(coercer) => coercer.apply(value),
            None => value.clone(),
        }
    }

    /// Resolves the default against the owning instance, or None when no
    /// default is configured
    pub fn resolve_default(&self, source: &dyn AttrSource) -> Option<Value> {
        self.default.as_ref().map(|spec| spec.resolve(source))
    }

    /// Expected-condition text for rejection messages
    pub(crate) fn expectation(&self) -> String {
        if let Some(rule) = &self.validate {
            return rule.expectation();
        }
        if let Some(kind) = self.kind {
            return format!("be kind_of {}", kind);
        }
        if let Some(cap) = self.capability {
            return format!("respond_to {}", cap);
        }
        "be any value".into()
    }
}

impl fmt::Debug for AttrDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttrDescriptor")
            .field("name", &self.name)
            .field("optional", &self.optional)
            .field("writable", &self.writable)
            .field("lazy", &self.lazy)
            .field("default", &self.default)
            .field("validate", &self.validate)
            .field("kind", &self.kind)
            .field("capability", &self.capability)
            .field("coercer", &self.coercer)
            .finish()
    }
}

/// Declaration options for one attribute.
///
/// A builder consumed by [`crate::schema::SchemaBuilder::declare`] or
/// [`crate::attr::AttrCellSpec::new`]. Unset `optional` is inferred:
/// `true` when a default is present, else the attribute is required.
/// Unset `writable` defaults to `true` for optional attributes and
/// `false` for required ones (required attributes are fixed at
/// construction unless declared writable).
#[derive(Clone, Default)]
pub struct AttrOptions {
    optional: Option<bool>,
    writable: Option<bool>,
    lazy: bool,
    default: Option<DefaultSpec>,
    validate: Option<ValidateRule>,
    kind: Option<ValueKind>,
    capability: Option<Capability>,
    coercer: Option<Coercer>,
    description: Option<String>,
}

impl AttrOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the attribute optional (or, with `false`, required)
    pub fn optional(mut self, optional: bool) -> Self {
        self.optional = Some(optional);
        self
    }

    /// Declares writability explicitly
    pub fn writable(mut self, writable: bool) -> Self {
        self.writable = Some(writable);
        self
    }

    /// Defers the default to first read, memoized (requires a default)
    pub fn lazy(mut self, lazy: bool) -> Self {
        self.lazy = lazy;
        self
    }

    /// Literal default value
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(DefaultSpec::Value(value.into()));
        self
    }

    /// Computed default, invoked with the owning instance
    pub fn default_fn(mut self, f: impl Fn(&dyn AttrSource) -> Value + Send + Sync + 'static) -> Self {
        self.default = Some(DefaultSpec::Func(Arc::new(f)));
        self
    }

    /// Explicit predicate validation rule
    pub fn validate_fn(mut self, f: impl Fn(&Value) -> bool + Send + Sync + 'static) -> Self {
        self.validate = Some(ValidateRule::predicate(f));
        self
    }

    /// Explicit pattern validation rule (string values only)
    pub fn validate_pattern(mut self, pattern: Regex) -> Self {
        self.validate = Some(ValidateRule::Pattern(pattern));
        self
    }

    /// Explicit literal-equality validation rule
    pub fn validate_eq(mut self, expected: impl Into<Value>) -> Self {
        self.validate = Some(ValidateRule::Equals(expected.into()));
        self
    }

    /// Nominal value-kind check shortcut
    pub fn kind_of(mut self, kind: ValueKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Alias for [`AttrOptions::kind_of`]
    pub fn isa(self, kind: ValueKind) -> Self {
        self.kind_of(kind)
    }

    /// Capability check shortcut
    pub fn respond_to(mut self, cap: Capability) -> Self {
        self.capability = Some(cap);
        self
    }

    /// Single coercion transform
    pub fn coerce_fn(mut self, f: impl Fn(&Value) -> Value + Send + Sync + 'static) -> Self {
        self.coercer = Some(Coercer::func(f));
        self
    }

    /// Ordered coercion chain, first match wins
    pub fn coerce_chain(mut self, rules: Vec<CoerceRule>) -> Self {
        self.coercer = Some(Coercer::chain(rules));
        self
    }

    /// Capability-keyed single-entry chain
    pub fn coerce_capability(mut self, cap: Capability) -> Self {
        self.coercer = Some(Coercer::capability(cap));
        self
    }

    /// Kind-keyed single-entry chain
    pub fn coerce_kind(
        mut self,
        kind: ValueKind,
        transform: impl Fn(&Value) -> Value + Send + Sync + 'static,
    ) -> Self {
        self.coercer = Some(Coercer::kind(kind, transform));
        self
    }

    /// Documentation string, no runtime effect
    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    /// Checks the declaration invariants and produces the descriptor.
    /// On violation nothing is registered.
    pub(crate) fn build(self, name: &str, entry: DeclarationEntry) -> AttrResult<AttrDescriptor> {
        let has_default = self.default.is_some();

        if self.lazy && !has_default {
            return Err(AttrError::lazy_without_default(name));
        }

        // Unset optional is inferred from the presence of a default.
        let optional = self.optional.unwrap_or(has_default);
        if has_default && !optional {
            return Err(AttrError::required_with_default(name));
        }

        let writable = match self.writable {
            Some(writable) => {
                if optional && !writable && entry == DeclarationEntry::Cell {
                    return Err(AttrError::optional_not_writable(name));
                }
                writable
            }
            None => optional,
        };

        Ok(AttrDescriptor {
            name: name.to_string(),
            optional,
            writable,
            lazy: self.lazy,
            default: self.default,
            validate: self.validate,
            kind: self.kind,
            capability: self.capability,
            coercer: self.coercer,
            description: self.description,
        })
    }
}

impl fmt::Debug for AttrOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttrOptions")
            .field("optional", &self.optional)
            .field("writable", &self.writable)
            .field("lazy", &self.lazy)
            .field("default", &self.default)
            .finish()
    }
}
