//! Constructed instances
//!
//! Per CONSTRUCT.md, an instance maps attribute names to values for the
//! attributes that have been assigned, and resolves lazy defaults on
//! first read. Memoization distinguishes "not yet computed" (absent from
//! the map) from "computed as null" (null stored), so a lazy default runs
//! at most once per instance-attribute pair (invariant L1) even when its
//! result is null.
//!
//! The memoization cell uses interior mutability; instances are not
//! `Sync` and must not be shared across threads without external
//! synchronization. The frozen schema they reference is.

use std::cell::RefCell;
use std::fmt;

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::attr::{AttrDescriptor, AttrError, AttrResult, AttrSource};
use crate::schema::Schema;

/// A fully-constructed value governed by a schema
pub struct Instance {
    schema: Schema,
    values: RefCell<IndexMap<String, Value>>,
}

impl Instance {
    pub(crate) fn new(schema: Schema) -> Self {
        Self {
            schema,
            values: RefCell::new(IndexMap::new()),
        }
    }

    /// The governing schema
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// All declared attribute names, in declaration order
    pub fn attribute_names(&self) -> Vec<&str> {
        self.schema.attribute_names()
    }

    /// Returns the attribute's value.
    ///
    /// A lazy attribute not yet computed resolves its default here: the
    /// result routes through the same coerce/validate path as input
    /// values, is memoized, and is never resolved again for this
    /// instance. A declared attribute that holds no value reads as null.
    ///
    /// A lazy default must not read its own attribute; that recurses.
    pub fn get(&self, name: &str) -> AttrResult<Value> {
        let desc = self
            .schema
            .descriptor(name)
            .ok_or_else(|| AttrError::unknown_attr(name))?;

        if let Some(value) = self.values.borrow().get(name) {
            return Ok(value.clone());
        }

        if desc.is_lazy() {
            // Lazy guarantees a default (D1); resolve it exactly once.
            let resolved = desc.resolve_default(self).unwrap_or(Value::Null);
            self.assign(desc, resolved)?;
            let values = self.values.borrow();
            let value = values.get(name).cloned().unwrap_or(Value::Null);
            return Ok(value);
        }

        Ok(Value::Null)
    }

    /// Public reassignment after construction. Rejected for non-writable
    /// attributes; otherwise the value routes through coerce/validate.
    pub fn set(&mut self, name: &str, value: Value) -> AttrResult<()> {
        let desc = self
            .schema
            .descriptor(name)
            .ok_or_else(|| AttrError::unknown_attr(name))?;
        if !desc.is_writable() {
            return Err(AttrError::not_writable(name));
        }
        self.assign(desc, value)
    }

    /// Whether the attribute holds a value (assigned or memoized)
    pub fn is_set(&self, name: &str) -> bool {
        self.values.borrow().contains_key(name)
    }

    /// Snapshot of the currently-held values as a key/value map. Lazy
    /// attributes appear only once computed.
    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        for (name, value) in self.values.borrow().iter() {
            map.insert(name.clone(), value.clone());
        }
        Value::Object(map)
    }

    /// Shared assignment path: coerce, validate, store. Used by the
    /// construction protocol, by defaults, and by public reassignment.
    pub(crate) fn assign(&self, desc: &AttrDescriptor, value: Value) -> AttrResult<()> {
        let coerced = desc.coerce(&value);
        if !desc.validate(&coerced) {
            return Err(AttrError::invalid_argument(
                desc.name(),
                &coerced,
                desc.expectation(),
            ));
        }
        self.values
            .borrow_mut()
            .insert(desc.name().to_string(), coerced);
        Ok(())
    }
}

impl AttrSource for Instance {
    fn attr(&self, name: &str) -> Option<Value> {
        self.get(name).ok()
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("values", &self.to_value())
            .finish()
    }
}
