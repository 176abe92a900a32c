//! Schema registry subsystem for attrx
//!
//! Per ATTRIBUTES.md, a schema is a per-class, append-only collection of
//! attribute descriptors plus the derived required-name set.
//!
//! # Design Principles
//!
//! - Declare-then-freeze lifecycle, no mutation after freeze
//! - Declaration order preserved for enumeration
//! - Misconfiguration aborts the declaration, never registers partially (D1-D4)
//! - Derived schemas are explicit (`extend`), never inferred
//! - Deterministic introspection

mod registry;

pub use registry::{Schema, SchemaBuilder};
