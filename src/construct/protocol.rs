//! Object construction protocol
//!
//! Per CONSTRUCT.md, construction is a single pass, terminal on the first
//! unrecoverable error (strict order):
//!
//! 1. Pre-hook with the raw input, side-effect only
//! 2. Shape check: input must be a key/value map (C1)
//! 3. Key normalization: string and symbol-style keys are interchangeable
//! 4. Required check against the registry's required names (C2)
//! 5. Assignment pass: coerce then validate each matching input value (C3);
//!    undeclared keys are silently ignored
//! 6. Default application for eager attributes left unset, through the
//!    same assignment path; lazy attributes stay pending until first read
//! 7. Post-hook with the fully-initialized instance
//!
//! Errors abort construction entirely; no partially-constructed instance
//! is ever returned.

use indexmap::IndexMap;
use serde_json::Value;

use super::instance::Instance;
use crate::attr::{AttrError, AttrResult};
use crate::schema::Schema;

/// Extension hooks for layering behavior on the protocol without
/// modifying it. Both default to no-ops.
pub trait InitHooks {
    /// Runs before any constraint is imposed on the raw input
    fn before_init(&mut self, _raw: &Value) {}

    /// Runs once every eager attribute holds its value
    fn after_init(&mut self, _instance: &mut Instance) {}
}

/// Hook implementation that does nothing
pub struct NoHooks;

impl InitHooks for NoHooks {}

/// Canonical key form: a leading `:` (symbol-style key) is stripped
fn normalize_key(key: &str) -> &str {
    key.strip_prefix(':').unwrap_or(key)
}

impl Schema {
    /// Constructs an instance from a key/value map
    pub fn construct(&self, input: Value) -> AttrResult<Instance> {
        self.construct_with_hooks(input, &mut NoHooks)
    }

    /// Constructs an instance, invoking the given extension hooks
    pub fn construct_with_hooks(
        &self,
        input: Value,
        hooks: &mut dyn InitHooks,
    ) -> AttrResult<Instance> {
        hooks.before_init(&input);

        let map = match &input {
            Value::Object(map) => map,
            _ => return Err(AttrError::input_not_a_map(&input)),
        };

        let mut normalized: IndexMap<String, Value> = IndexMap::new();
        for (key, value) in map {
            normalized.insert(normalize_key(key).to_string(), value.clone());
        }

        for name in self.required_names() {
            if !normalized.contains_key(name.as_str()) {
                return Err(AttrError::attr_required(name.as_str(), &input));
            }
        }

        let mut instance = Instance::new(self.clone());

        for (name, desc) in self.descriptors() {
            if let Some(value) = normalized.get(name.as_str()) {
                instance.assign(desc, value.clone())?;
            }
        }

        // Defaults route through the same assignment path, so coercion
        // and validation apply to resolved defaults too.
        for (name, desc) in self.descriptors() {
            if desc.is_lazy() || instance.is_set(name) {
                continue;
            }
            if let Some(resolved) = desc.resolve_default(&instance) {
                instance.assign(desc, resolved)?;
            }
        }

        hooks.after_init(&mut instance);
        Ok(instance)
    }
}
