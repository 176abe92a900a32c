//! attrx - A strict, deterministic attribute schema engine
//!
//! Declare attributes with validation, coercion, default and writability
//! policy; construct instances from key/value maps under those rules.

pub mod attr;
pub mod bundle;
pub mod construct;
pub mod schema;
