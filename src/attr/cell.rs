//! Standalone attribute cell
//!
//! The single-attribute counterpart of the full construction protocol: a
//! spec validated once at creation, instantiated into cells that hold one
//! value each. The cell entry point enforces the stricter declaration
//! invariant set — an optional attribute must stay writable here (D3),
//! where the schema `declare` path permits forcing it non-writable.
//!
//! A cell's first read resolves the default, routes it through the shared
//! coerce/validate path, and memoizes the result (invariant L1). A cell
//! with no default reads as null and memoizes nothing.

use std::cell::RefCell;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use super::descriptor::{AttrDescriptor, AttrOptions, DeclarationEntry, NoSource};
use super::errors::{AttrError, AttrResult};

/// Validated single-attribute configuration
#[derive(Debug, Clone)]
pub struct AttrCellSpec {
    descriptor: Arc<AttrDescriptor>,
}

impl AttrCellSpec {
    /// Checks the cell invariants and produces a spec. Rejects, in
    /// addition to the shared declaration invariants, an optional
    /// attribute explicitly declared non-writable.
    pub fn new(name: &str, options: AttrOptions) -> AttrResult<Self> {
        let descriptor = options.build(name, DeclarationEntry::Cell)?;
        Ok(Self {
            descriptor: Arc::new(descriptor),
        })
    }

    pub fn descriptor(&self) -> &AttrDescriptor {
        &self.descriptor
    }

    /// Creates an empty cell governed by this spec
    pub fn instantiate(&self) -> AttrCell {
        AttrCell {
            descriptor: Arc::clone(&self.descriptor),
            data: RefCell::new(None),
        }
    }
}

/// One attribute's value container
pub struct AttrCell {
    descriptor: Arc<AttrDescriptor>,
    data: RefCell<Option<Value>>,
}

impl AttrCell {
    /// Returns the stored value; on first read of an unset cell, resolves
    /// the default through the coerce/validate path and memoizes it.
    pub fn get(&self) -> AttrResult<Value> {
        if let Some(value) = self.data.borrow().as_ref() {
            return Ok(value.clone());
        }

        let resolved = match self.descriptor.resolve_default(&NoSource) {
            Some(value) => value,
            // No default configured: reads as null, nothing memoized.
            None => return Ok(Value::Null),
        };

        let coerced = self.descriptor.coerce(&resolved);
        if !self.descriptor.validate(&coerced) {
            return Err(AttrError::invalid_argument(
                self.descriptor.name(),
                &coerced,
                self.descriptor.expectation(),
            ));
        }
        *self.data.borrow_mut() = Some(coerced.clone());
        Ok(coerced)
    }

    /// Coerces, validates, and stores a value
    pub fn set(&mut self, value: Value) -> AttrResult<()> {
        let coerced = self.descriptor.coerce(&value);
        if !self.descriptor.validate(&coerced) {
            return Err(AttrError::invalid_argument(
                self.descriptor.name(),
                &coerced,
                self.descriptor.expectation(),
            ));
        }
        *self.data.borrow_mut() = Some(coerced);
        Ok(())
    }

    /// Whether a value is held (assigned or memoized)
    pub fn is_set(&self) -> bool {
        self.data.borrow().is_some()
    }

    /// The governing descriptor
    pub fn descriptor(&self) -> &AttrDescriptor {
        &self.descriptor
    }

    /// Documentation string from the declaration
    pub fn describe(&self) -> Option<&str> {
        self.descriptor.description()
    }
}

impl fmt::Debug for AttrCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<AttrCell {}", self.descriptor.name())?;
        if let Some(value) = self.data.borrow().as_ref() {
            write!(f, " data={}", value)?;
        }
        write!(f, ">")
    }
}
