//! Schema registry: declare-then-freeze attribute collections
//!
//! Per ATTRIBUTES.md, a registry is built incrementally by a
//! [`SchemaBuilder`] and frozen into an immutable [`Schema`]. Enumeration
//! preserves declaration order; the required-name set is derived at
//! freeze time. No removal or mutation API exists after freeze, so the
//! frozen value is safe for concurrent reads.
//!
//! Derived schemas are explicit: [`Schema::extend`] starts a builder from
//! the base descriptors (order preserved) that may override inherited
//! names once or append new ones. The base schema is unaffected.

use std::fmt;
use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};

use crate::attr::{AttrDescriptor, AttrError, AttrOptions, AttrResult};
use crate::attr::DeclarationEntry;

/// Incremental attribute declaration
pub struct SchemaBuilder {
    attrs: IndexMap<String, AttrDescriptor>,
    /// Names carried over from a base schema, each overridable once
    inherited: IndexSet<String>,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self {
            attrs: IndexMap::new(),
            inherited: IndexSet::new(),
        }
    }

    /// Validates the configuration's internal consistency and registers
    /// the descriptor. On violation nothing is registered and the error
    /// is returned (D1-D4). Re-declaring a name is rejected unless the
    /// name was inherited from a base schema, in which case the
    /// declaration overrides it in place.
    pub fn declare(&mut self, name: &str, options: AttrOptions) -> AttrResult<&mut Self> {
        let overriding = self.inherited.shift_remove(name);
        if self.attrs.contains_key(name) && !overriding {
            return Err(AttrError::duplicate_attr(name));
        }
        let descriptor = options.build(name, DeclarationEntry::Declare)?;
        // IndexMap keeps the original position on override.
        self.attrs.insert(name.to_string(), descriptor);
        Ok(self)
    }

    /// Names declared so far, in declaration order
    pub fn attribute_names(&self) -> Vec<&str> {
        self.attrs.keys().map(String::as_str).collect()
    }

    /// Freezes the registry into an immutable schema
    pub fn freeze(self) -> Schema {
        let required = self
            .attrs
            .iter()
            .filter(|(_, desc)| !desc.is_optional())
            .map(|(name, _)| name.clone())
            .collect();
        Schema {
            inner: Arc::new(SchemaInner {
                attrs: self.attrs,
                required,
            }),
        }
    }
}

impl Default for SchemaBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SchemaBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaBuilder")
            .field("attributes", &self.attribute_names())
            .finish()
    }
}

struct SchemaInner {
    attrs: IndexMap<String, AttrDescriptor>,
    required: IndexSet<String>,
}

/// Frozen, immutable attribute registry. Cheap to clone and share.
#[derive(Clone)]
pub struct Schema {
    inner: Arc<SchemaInner>,
}

impl Schema {
    /// All declared attribute names in declaration order, required and
    /// optional alike, independent of writability
    pub fn attribute_names(&self) -> Vec<&str> {
        self.inner.attrs.keys().map(String::as_str).collect()
    }

    /// Names declared required, in declaration order
    pub fn required_names(&self) -> &IndexSet<String> {
        &self.inner.required
    }

    /// Looks up one attribute's descriptor
    pub fn descriptor(&self, name: &str) -> Option<&AttrDescriptor> {
        self.inner.attrs.get(name)
    }

    /// Number of declared attributes
    pub fn len(&self) -> usize {
        self.inner.attrs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.attrs.is_empty()
    }

    /// Starts a derived-schema builder seeded with this schema's
    /// descriptors. Inherited names may be overridden by re-declaration.
    pub fn extend(&self) -> SchemaBuilder {
        SchemaBuilder {
            attrs: self.inner.attrs.clone(),
            inherited: self.inner.attrs.keys().cloned().collect(),
        }
    }

    pub(crate) fn descriptors(&self) -> impl Iterator<Item = (&String, &AttrDescriptor)> {
        self.inner.attrs.iter()
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("attributes", &self.attribute_names())
            .field("required", &self.inner.required)
            .finish()
    }
}
