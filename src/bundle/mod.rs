//! Attribute bundles for attrx
//!
//! Bundles are consumers of the declaration and construction APIs: ready
//! made attribute sets a schema merges into its own builder. They add no
//! engine mechanism.

mod logger;
mod sink;

pub use logger::{declare_logger_attrs, LoggerRole};
pub use sink::{LineLogger, LogLevel, RotatePolicy, SinkError, SinkResult};
