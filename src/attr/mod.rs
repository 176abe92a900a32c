//! Attribute descriptor subsystem for attrx
//!
//! Per ATTRIBUTES.md, every declared attribute is described by a
//! descriptor holding its full behavioral contract as data.
//!
//! # Design Principles
//!
//! - Consistency checks before registration (D1-D4)
//! - Coercion before validation, on every assignment path
//! - First-match-only coercion chains (A3)
//! - A closed set of validator kinds, dispatched in a fixed order
//! - Deterministic evaluation, no retries

mod cell;
mod coerce;
mod descriptor;
mod errors;
mod validate;

pub use cell::{AttrCell, AttrCellSpec};
pub use coerce::{CoercePredicate, CoerceRule, Coercer, Transform, TransformFn};
pub use descriptor::{AttrDescriptor, AttrOptions, AttrSource, DefaultFn, DefaultSpec, NoSource};
pub use errors::{AttrError, AttrErrorCode, AttrResult, Severity, ValueDetails};
pub use validate::{Capability, PredicateFn, ValidateRule, ValueKind};

pub(crate) use descriptor::DeclarationEntry;
