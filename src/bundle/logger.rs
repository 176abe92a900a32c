//! Logger attribute bundle
//!
//! A pre-built set of attribute declarations a consumer schema merges
//! into its own builder:
//!
//! - `log_level`: level name, defaults to "info"
//! - `logfile`: output path, defaults to the stderr sink
//! - `log_rotate`: period name or positive byte size, coerced from
//!   numeric strings
//! - `logger`: lazy; resolves the sink configuration from its sibling
//!   attributes on first read
//!
//! The bundle is a consumer of the declaration and construction APIs, not
//! engine mechanism. [`LoggerRole`] wraps a constructed instance and
//! opens the actual sink at most once, on the first logging call.

use std::cell::RefCell;
use std::fmt;

use serde_json::{json, Value};

use super::sink::{LineLogger, LogLevel, RotatePolicy, SinkResult};
use crate::attr::{AttrOptions, AttrResult, AttrSource, Capability, CoerceRule, ValueKind};
use crate::construct::Instance;
use crate::schema::SchemaBuilder;

/// Declares the bundle's attributes on a consumer's builder
pub fn declare_logger_attrs(builder: &mut SchemaBuilder) -> AttrResult<()> {
    builder.declare(
        "log_level",
        AttrOptions::new()
            .optional(true)
            .default_value("info")
            .kind_of(ValueKind::String)
            .validate_fn(|v| v.as_str().is_some_and(LogLevel::is_known))
            .description("log level (debug|info|warn|error|fatal) (default info)"),
    )?;

    builder.declare(
        "logfile",
        AttrOptions::new()
            .optional(true)
            .default_value(Value::Null)
            .validate_fn(|v| v.is_null() || v.is_string())
            .description("output logfile (default stderr)"),
    )?;

    builder.declare(
        "log_rotate",
        AttrOptions::new()
            .optional(true)
            .validate_fn(|v| RotatePolicy::from_value(v).is_some())
            .coerce_chain(vec![
                CoerceRule::kind(ValueKind::Int, |v| v.clone()),
                CoerceRule::when_fn(
                    |v| RotatePolicy::from_value(v).is_some(),
                    |v| v.clone(),
                ),
                CoerceRule::capability(Capability::ToInt),
            ])
            .description("size or (daily|weekly|monthly) (default none)"),
    )?;

    builder.declare(
        "logger",
        AttrOptions::new()
            .optional(true)
            .lazy(true)
            .default_fn(resolve_sink_config)
            .description("sink configuration resolved from log_level, logfile and log_rotate"),
    )?;

    Ok(())
}

/// Resolves the sink configuration from sibling attributes
fn resolve_sink_config(src: &dyn AttrSource) -> Value {
    let level = src
        .attr("log_level")
        .and_then(|v| v.as_str().map(str::to_owned))
        .unwrap_or_else(|| "info".into());
    let sink = src
        .attr("logfile")
        .and_then(|v| v.as_str().map(str::to_owned))
        .unwrap_or_else(|| "stderr".into());
    let rotate = src.attr("log_rotate").unwrap_or(Value::Null);

    json!({ "sink": sink, "level": level, "rotate": rotate })
}

/// A constructed instance with logging shortcuts.
///
/// The sink opens on the first logging call and is reused afterwards;
/// opening the logfile happens at most once per role.
pub struct LoggerRole {
    instance: Instance,
    handle: RefCell<Option<LineLogger>>,
}

impl LoggerRole {
    pub fn new(instance: Instance) -> Self {
        Self {
            instance,
            handle: RefCell::new(None),
        }
    }

    /// The wrapped instance
    pub fn instance(&self) -> &Instance {
        &self.instance
    }

    pub fn into_instance(self) -> Instance {
        self.instance
    }

    fn with_logger(&self, f: impl FnOnce(&LineLogger)) -> SinkResult<()> {
        {
            let mut slot = self.handle.borrow_mut();
            if slot.is_none() {
                let config = self.instance.get("logger")?;
                *slot = Some(LineLogger::from_config(&config)?);
            }
        }
        let borrow = self.handle.borrow();
        let logger = borrow.as_ref().unwrap(); // populated above
        f(logger);
        Ok(())
    }

    /// Shortcut for a DEBUG event
    pub fn debug(&self, event: &str, fields: &[(&str, &str)]) -> SinkResult<()> {
        self.with_logger(|logger| logger.debug(event, fields))
    }

    /// Shortcut for an INFO event
    pub fn info(&self, event: &str, fields: &[(&str, &str)]) -> SinkResult<()> {
        self.with_logger(|logger| logger.info(event, fields))
    }

    /// Shortcut for a WARN event
    pub fn warn(&self, event: &str, fields: &[(&str, &str)]) -> SinkResult<()> {
        self.with_logger(|logger| logger.warn(event, fields))
    }

    /// Shortcut for an ERROR event
    pub fn error(&self, event: &str, fields: &[(&str, &str)]) -> SinkResult<()> {
        self.with_logger(|logger| logger.error(event, fields))
    }

    /// Shortcut for a FATAL event
    pub fn fatal(&self, event: &str, fields: &[(&str, &str)]) -> SinkResult<()> {
        self.with_logger(|logger| logger.fatal(event, fields))
    }
}

impl fmt::Debug for LoggerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggerRole")
            .field("instance", &self.instance)
            .field("open", &self.handle.borrow().is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attr::AttrErrorCode;
    use serde_json::json;

    fn bundle_schema() -> crate::schema::Schema {
        let mut builder = SchemaBuilder::new();
        declare_logger_attrs(&mut builder).unwrap();
        builder.freeze()
    }

    #[test]
    fn test_defaults_resolve_stderr_config() {
        let instance = bundle_schema().construct(json!({})).unwrap();
        assert_eq!(instance.get("log_level").unwrap(), json!("info"));
        assert_eq!(instance.get("logfile").unwrap(), Value::Null);

        let config = instance.get("logger").unwrap();
        assert_eq!(config["sink"], "stderr");
        assert_eq!(config["level"], "info");
        assert_eq!(config["rotate"], Value::Null);
    }

    #[test]
    fn test_log_level_validated() {
        let err = bundle_schema()
            .construct(json!({ "log_level": "verbose" }))
            .unwrap_err();
        assert_eq!(err.code(), AttrErrorCode::AttrxInvalidAttrArgument);
        assert_eq!(err.attribute(), Some("log_level"));
    }

    #[test]
    fn test_log_rotate_coerced_from_numeric_string() {
        let instance = bundle_schema()
            .construct(json!({ "log_rotate": "65536" }))
            .unwrap();
        assert_eq!(instance.get("log_rotate").unwrap(), json!(65536));
    }

    #[test]
    fn test_log_rotate_period_passes_through() {
        let instance = bundle_schema()
            .construct(json!({ "log_rotate": "weekly" }))
            .unwrap();
        assert_eq!(instance.get("log_rotate").unwrap(), json!("weekly"));
    }

    #[test]
    fn test_log_rotate_rejects_garbage() {
        let err = bundle_schema()
            .construct(json!({ "log_rotate": "sometimes" }))
            .unwrap_err();
        assert_eq!(err.code(), AttrErrorCode::AttrxInvalidAttrArgument);
        assert_eq!(err.attribute(), Some("log_rotate"));
    }

    #[test]
    fn test_logger_config_reflects_siblings() {
        let instance = bundle_schema()
            .construct(json!({
                "log_level": "warn",
                "logfile": "/tmp/app.log",
                "log_rotate": "daily"
            }))
            .unwrap();

        let config = instance.get("logger").unwrap();
        assert_eq!(config["sink"], "/tmp/app.log");
        assert_eq!(config["level"], "warn");
        assert_eq!(config["rotate"], "daily");
    }

    #[test]
    fn test_bundle_composes_with_consumer_attrs() {
        let mut builder = SchemaBuilder::new();
        builder
            .declare("name", AttrOptions::new().kind_of(ValueKind::String))
            .unwrap();
        declare_logger_attrs(&mut builder).unwrap();
        let schema = builder.freeze();

        assert_eq!(
            schema.attribute_names(),
            vec!["name", "log_level", "logfile", "log_rotate", "logger"]
        );
        let required: Vec<&str> =
            schema.required_names().iter().map(String::as_str).collect();
        assert_eq!(required, vec!["name"]);
    }

    #[test]
    fn test_role_opens_file_once() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("role.log");
        let path_str = path.display().to_string();

        let instance = bundle_schema()
            .construct(json!({ "logfile": path_str, "log_level": "debug" }))
            .unwrap();
        let role = LoggerRole::new(instance);

        role.info("FIRST", &[]).unwrap();
        role.debug("SECOND", &[("n", "2")]).unwrap();
        role.info("THIRD", &[]).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        // One LOG_OPEN stamp, then the three events.
        assert_eq!(lines.len(), 4);
        let open: Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(open["event"], "LOG_OPEN");
        let second: Value = serde_json::from_str(lines[2]).unwrap();
        assert_eq!(second["event"], "SECOND");
        assert_eq!(second["n"], "2");
    }

    #[test]
    fn test_role_level_filtering() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("filtered.log");
        let path_str = path.display().to_string();

        let instance = bundle_schema()
            .construct(json!({ "logfile": path_str, "log_level": "error" }))
            .unwrap();
        let role = LoggerRole::new(instance);

        role.debug("DROPPED", &[]).unwrap();
        role.info("DROPPED_TOO", &[]).unwrap();
        role.error("KEPT", &[]).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        let kept: Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(kept["event"], "KEPT");
        assert_eq!(kept["severity"], "ERROR");
    }
}
