//! Structured JSON line sink for the logger bundle
//!
//! One log line = one JSON event: event name first, then severity, then
//! fields in deterministic (alphabetical) order. Writes are synchronous
//! with no buffering. Opening a file sink stamps a LOG_OPEN line carrying
//! the rotation policy and open timestamp.

use std::cell::RefCell;
use std::fmt;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::attr::AttrError;

/// Sink and bundle errors
#[derive(Debug, Error)]
pub enum SinkError {
    /// Logfile could not be opened
    #[error("failed to open logfile '{path}': {source}")]
    Open {
        path: String,
        source: io::Error,
    },

    /// Level name outside the known set
    #[error("unknown log level '{0}'")]
    UnknownLevel(String),

    /// Underlying attribute access failed
    #[error(transparent)]
    Attr(#[from] AttrError),
}

/// Result type for sink operations
pub type SinkResult<T> = Result<T, SinkError>;

/// Log severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Debug-level detail
    Debug = 0,
    /// Normal operations
    Info = 1,
    /// Recoverable issues
    Warn = 2,
    /// Operation failures
    Error = 3,
    /// Unrecoverable failures
    Fatal = 4,
}

impl LogLevel {
    /// Returns the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
            LogLevel::Fatal => "FATAL",
        }
    }

    /// Parses a level name, case-insensitively
    pub fn from_name(name: &str) -> Option<LogLevel> {
        match name.to_ascii_lowercase().as_str() {
            "debug" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warn" => Some(LogLevel::Warn),
            "error" => Some(LogLevel::Error),
            "fatal" => Some(LogLevel::Fatal),
            _ => None,
        }
    }

    /// Whether the name denotes a known level
    pub fn is_known(name: &str) -> bool {
        LogLevel::from_name(name).is_some()
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Log rotation policy, carried as sink metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RotatePolicy {
    Daily,
    Weekly,
    Monthly,
    /// Rotate above a byte size
    Size(u64),
}

impl RotatePolicy {
    /// Parses a policy from a rotate value: one of the period names, or a
    /// positive integer byte size.
    pub fn from_value(value: &Value) -> Option<RotatePolicy> {
        if let Some(name) = value.as_str() {
            return match name {
                "daily" => Some(RotatePolicy::Daily),
                "weekly" => Some(RotatePolicy::Weekly),
                "monthly" => Some(RotatePolicy::Monthly),
                _ => None,
            };
        }
        if let Some(size) = value.as_i64() {
            if size > 0 {
                return Some(RotatePolicy::Size(size as u64));
            }
        }
        None
    }

    /// Label for stamping and messages
    pub fn label(&self) -> String {
        match self {
            RotatePolicy::Daily => "daily".into(),
            RotatePolicy::Weekly => "weekly".into(),
            RotatePolicy::Monthly => "monthly".into(),
            RotatePolicy::Size(bytes) => bytes.to_string(),
        }
    }
}

/// Renders one log line. Event first, then severity, then fields sorted
/// alphabetically; JSON built by hand for deterministic ordering.
fn render_line(level: LogLevel, event: &str, fields: &[(&str, &str)]) -> String {
    let mut output = String::with_capacity(256);

    output.push('{');
    output.push_str("\"event\":\"");
    escape_json_string(&mut output, event);
    output.push('"');

    output.push_str(",\"severity\":\"");
    output.push_str(level.as_str());
    output.push('"');

    let mut sorted_fields: Vec<_> = fields.iter().collect();
    sorted_fields.sort_by_key(|(k, _)| *k);

    for (key, value) in sorted_fields {
        output.push_str(",\"");
        escape_json_string(&mut output, key);
        output.push_str("\":\"");
        escape_json_string(&mut output, value);
        output.push('"');
    }

    output.push('}');
    output.push('\n');
    output
}

/// Escape special characters for JSON strings
fn escape_json_string(output: &mut String, s: &str) {
    for c in s.chars() {
        match c {
            '"' => output.push_str("\\\""),
            '\\' => output.push_str("\\\\"),
            '\n' => output.push_str("\\n"),
            '\r' => output.push_str("\\r"),
            '\t' => output.push_str("\\t"),
            c if c.is_control() => {
                output.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => output.push(c),
        }
    }
}

/// A structured JSON line logger
pub struct LineLogger {
    level: LogLevel,
    rotate: Option<RotatePolicy>,
    path: Option<PathBuf>,
    writer: RefCell<Box<dyn Write>>,
}

impl LineLogger {
    /// Logger writing to standard error
    pub fn stderr(level: LogLevel) -> Self {
        Self {
            level,
            rotate: None,
            path: None,
            writer: RefCell::new(Box::new(io::stderr())),
        }
    }

    /// Opens (append, create) a file sink and stamps a LOG_OPEN line with
    /// the rotation policy and open timestamp.
    pub fn open(path: &Path, level: LogLevel, rotate: Option<RotatePolicy>) -> SinkResult<Self> {
        let file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(path)
            .map_err(|source| SinkError::Open {
                path: path.display().to_string(),
                source,
            })?;

        let logger = Self {
            level,
            rotate,
            path: Some(path.to_path_buf()),
            writer: RefCell::new(Box::new(file)),
        };

        let logfile = path.display().to_string();
        let rotate_label = logger
            .rotate
            .map(|policy| policy.label())
            .unwrap_or_else(|| "none".into());
        let opened_at = Utc::now().to_rfc3339();
        logger.write_line(render_line(
            LogLevel::Info,
            "LOG_OPEN",
            &[
                ("logfile", logfile.as_str()),
                ("opened_at", opened_at.as_str()),
                ("rotate", rotate_label.as_str()),
            ],
        ));

        Ok(logger)
    }

    /// Builds a logger from a resolved sink configuration
    /// (`{"sink": ..., "level": ..., "rotate": ...}`).
    pub fn from_config(config: &Value) -> SinkResult<Self> {
        let level_name = config.get("level").and_then(Value::as_str).unwrap_or("info");
        let level = LogLevel::from_name(level_name)
            .ok_or_else(|| SinkError::UnknownLevel(level_name.to_string()))?;
        let rotate = config.get("rotate").and_then(RotatePolicy::from_value);

        match config.get("sink").and_then(Value::as_str) {
            None | Some("stderr") => Ok(LineLogger::stderr(level)),
            Some(path) => LineLogger::open(Path::new(path), level, rotate),
        }
    }

    /// Threshold level; events below it are dropped
    pub fn level(&self) -> LogLevel {
        self.level
    }

    /// File path, or None for the stderr sink
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Rotation policy metadata
    pub fn rotate(&self) -> Option<RotatePolicy> {
        self.rotate
    }

    /// Log an event with the given severity and fields
    pub fn log(&self, level: LogLevel, event: &str, fields: &[(&str, &str)]) {
        if level < self.level {
            return;
        }
        self.write_line(render_line(level, event, fields));
    }

    fn write_line(&self, line: String) {
        // One write, then flush; the sink is unbuffered by contract.
        let mut writer = self.writer.borrow_mut();
        let _ = writer.write_all(line.as_bytes());
        let _ = writer.flush();
    }

    /// Log at DEBUG level
    pub fn debug(&self, event: &str, fields: &[(&str, &str)]) {
        self.log(LogLevel::Debug, event, fields);
    }

    /// Log at INFO level
    pub fn info(&self, event: &str, fields: &[(&str, &str)]) {
        self.log(LogLevel::Info, event, fields);
    }

    /// Log at WARN level
    pub fn warn(&self, event: &str, fields: &[(&str, &str)]) {
        self.log(LogLevel::Warn, event, fields);
    }

    /// Log at ERROR level
    pub fn error(&self, event: &str, fields: &[(&str, &str)]) {
        self.log(LogLevel::Error, event, fields);
    }

    /// Log at FATAL level
    pub fn fatal(&self, event: &str, fields: &[(&str, &str)]) {
        self.log(LogLevel::Fatal, event, fields);
    }
}

impl fmt::Debug for LineLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LineLogger")
            .field("level", &self.level)
            .field("rotate", &self.rotate)
            .field("path", &self.path)
            .finish()
    }
}
