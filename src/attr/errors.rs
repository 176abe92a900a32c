//! Attribute engine error types following ERRORS.md
//!
//! Error codes:
//! - ATTRX_ATTR_REQUIRED (REJECT)
//! - ATTRX_INVALID_ATTR_ARGUMENT (REJECT)
//! - ATTRX_INPUT_NOT_A_MAP (REJECT)
//! - ATTRX_ATTR_NOT_WRITABLE (REJECT)
//! - ATTRX_UNKNOWN_ATTR (REJECT)
//! - ATTRX_LAZY_WITHOUT_DEFAULT (FATAL)
//! - ATTRX_REQUIRED_WITH_DEFAULT (FATAL)
//! - ATTRX_OPTIONAL_NOT_WRITABLE (FATAL)
//! - ATTRX_DUPLICATE_ATTR (FATAL)
//!
//! FATAL errors are declaration-time: the schema under construction is
//! unusable. REJECT errors abort a single construction or access attempt;
//! the registry and other instances are unaffected.

use std::fmt;

use serde_json::Value;

/// Severity levels for attribute errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// One construction or access attempt rejected
    Reject,
    /// Declaration failed; the schema being built is unusable
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Reject => write!(f, "REJECT"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Attribute-engine error codes as defined in ERRORS.md
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrErrorCode {
    /// Required attribute missing from construction input
    AttrxAttrRequired,
    /// Value failed its attribute's validation rule after coercion
    AttrxInvalidAttrArgument,
    /// Construction input was not a key/value map
    AttrxInputNotAMap,
    /// Public reassignment of a non-writable attribute
    AttrxAttrNotWritable,
    /// Get/set addressed a name the schema never declared
    AttrxUnknownAttr,
    /// Lazy declared with no default (declaration time)
    AttrxLazyWithoutDefault,
    /// Required attribute declared with a default (declaration time)
    AttrxRequiredWithDefault,
    /// Optional attribute declared non-writable where that is disallowed
    AttrxOptionalNotWritable,
    /// Name re-declared within one builder
    AttrxDuplicateAttr,
}

impl AttrErrorCode {
    /// Returns the string code as defined in ERRORS.md
    pub fn code(&self) -> &'static str {
        match self {
            AttrErrorCode::AttrxAttrRequired => "ATTRX_ATTR_REQUIRED",
            AttrErrorCode::AttrxInvalidAttrArgument => "ATTRX_INVALID_ATTR_ARGUMENT",
            AttrErrorCode::AttrxInputNotAMap => "ATTRX_INPUT_NOT_A_MAP",
            AttrErrorCode::AttrxAttrNotWritable => "ATTRX_ATTR_NOT_WRITABLE",
            AttrErrorCode::AttrxUnknownAttr => "ATTRX_UNKNOWN_ATTR",
            AttrErrorCode::AttrxLazyWithoutDefault => "ATTRX_LAZY_WITHOUT_DEFAULT",
            AttrErrorCode::AttrxRequiredWithDefault => "ATTRX_REQUIRED_WITH_DEFAULT",
            AttrErrorCode::AttrxOptionalNotWritable => "ATTRX_OPTIONAL_NOT_WRITABLE",
            AttrErrorCode::AttrxDuplicateAttr => "ATTRX_DUPLICATE_ATTR",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        match self {
            AttrErrorCode::AttrxLazyWithoutDefault
            | AttrErrorCode::AttrxRequiredWithDefault
            | AttrErrorCode::AttrxOptionalNotWritable
            | AttrErrorCode::AttrxDuplicateAttr => Severity::Fatal,
            _ => Severity::Reject,
        }
    }

    /// Returns the invariant violated by this error
    pub fn invariant(&self) -> &'static str {
        match self {
            AttrErrorCode::AttrxLazyWithoutDefault => "D1",
            AttrErrorCode::AttrxRequiredWithDefault => "D2",
            AttrErrorCode::AttrxOptionalNotWritable => "D3",
            AttrErrorCode::AttrxDuplicateAttr => "D4",
            AttrErrorCode::AttrxInputNotAMap => "C1",
            AttrErrorCode::AttrxAttrRequired => "C2",
            AttrErrorCode::AttrxInvalidAttrArgument => "C3",
            AttrErrorCode::AttrxAttrNotWritable => "A1",
            AttrErrorCode::AttrxUnknownAttr => "A2",
        }
    }
}

impl fmt::Display for AttrErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Rejected-value details
#[derive(Debug, Clone)]
pub struct ValueDetails {
    /// Attribute name
    pub attribute: String,
    /// Expected type or condition
    pub expected: String,
    /// Actual value or shape found
    pub actual: String,
}

impl ValueDetails {
    pub fn new(
        attribute: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self {
            attribute: attribute.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    pub fn missing(attribute: impl Into<String>, input: &Value) -> Self {
        Self {
            attribute: attribute.into(),
            expected: "attribute to be present".into(),
            actual: format!("missing from {}", input),
        }
    }

    pub fn rejected(attribute: impl Into<String>, expected: impl Into<String>, value: &Value) -> Self {
        Self {
            attribute: attribute.into(),
            expected: expected.into(),
            actual: value.to_string(),
        }
    }
}

impl fmt::Display for ValueDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "attribute '{}': expected {}, got {}",
            self.attribute, self.expected, self.actual
        )
    }
}

/// Attribute error type with full context
#[derive(Debug)]
pub struct AttrError {
    /// Error code
    code: AttrErrorCode,
    /// Human-readable message
    message: String,
    /// Attribute name if applicable
    attribute: Option<String>,
    /// Rejected-value details if applicable
    details: Option<ValueDetails>,
}

impl AttrError {
    /// Create a required-attribute error, echoing the full input for diagnostics
    pub fn attr_required(attribute: impl Into<String>, input: &Value) -> Self {
        let name = attribute.into();
        Self {
            code: AttrErrorCode::AttrxAttrRequired,
            message: format!("Attribute '{}' is required, input was {}", name, input),
            details: Some(ValueDetails::missing(name.clone(), input)),
            attribute: Some(name),
        }
    }

    /// Create an invalid-argument error naming the attribute and the offending value
    pub fn invalid_argument(
        attribute: impl Into<String>,
        value: &Value,
        expected: impl Into<String>,
    ) -> Self {
        let name = attribute.into();
        let expected = expected.into();
        Self {
            code: AttrErrorCode::AttrxInvalidAttrArgument,
            message: format!(
                "Attribute '{}' rejected value {}: should {}",
                name, value, expected
            ),
            details: Some(ValueDetails::rejected(name.clone(), expected, value)),
            attribute: Some(name),
        }
    }

    /// Create an argument-shape error
    pub fn input_not_a_map(input: &Value) -> Self {
        Self {
            code: AttrErrorCode::AttrxInputNotAMap,
            message: format!("Construction input must be a key/value map, got {}", input),
            attribute: None,
            details: None,
        }
    }

    /// Create a non-writable reassignment error
    pub fn not_writable(attribute: impl Into<String>) -> Self {
        let name = attribute.into();
        Self {
            code: AttrErrorCode::AttrxAttrNotWritable,
            message: format!("Attribute '{}' is not writable", name),
            attribute: Some(name),
            details: None,
        }
    }

    /// Create an unknown-attribute error
    pub fn unknown_attr(attribute: impl Into<String>) -> Self {
        let name = attribute.into();
        Self {
            code: AttrErrorCode::AttrxUnknownAttr,
            message: format!("Attribute '{}' is not declared", name),
            attribute: Some(name),
            details: None,
        }
    }

    /// Create a lazy-without-default declaration error
    pub fn lazy_without_default(attribute: impl Into<String>) -> Self {
        let name = attribute.into();
        Self {
            code: AttrErrorCode::AttrxLazyWithoutDefault,
            message: format!("Attribute '{}': lazy option needs a default", name),
            attribute: Some(name),
            details: None,
        }
    }

    /// Create a required-with-default declaration error
    pub fn required_with_default(attribute: impl Into<String>) -> Self {
        let name = attribute.into();
        Self {
            code: AttrErrorCode::AttrxRequiredWithDefault,
            message: format!(
                "Attribute '{}': required attribute must not have a default",
                name
            ),
            attribute: Some(name),
            details: None,
        }
    }

    /// Create an optional-not-writable declaration error
    pub fn optional_not_writable(attribute: impl Into<String>) -> Self {
        let name = attribute.into();
        Self {
            code: AttrErrorCode::AttrxOptionalNotWritable,
            message: format!(
                "Attribute '{}': optional attribute must stay writable",
                name
            ),
            attribute: Some(name),
            details: None,
        }
    }

    /// Create a duplicate-declaration error
    pub fn duplicate_attr(attribute: impl Into<String>) -> Self {
        let name = attribute.into();
        Self {
            code: AttrErrorCode::AttrxDuplicateAttr,
            message: format!("Attribute '{}' is already declared", name),
            attribute: Some(name),
            details: None,
        }
    }

    /// Returns the error code
    pub fn code(&self) -> AttrErrorCode {
        self.code
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    /// Returns the invariant violated
    pub fn invariant(&self) -> &'static str {
        self.code.invariant()
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the attribute name if applicable
    pub fn attribute(&self) -> Option<&str> {
        self.attribute.as_deref()
    }

    /// Returns rejected-value details if applicable
    pub fn details(&self) -> Option<&ValueDetails> {
        self.details.as_ref()
    }

    /// Returns whether this is a declaration-time (fatal) error
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

impl fmt::Display for AttrError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.code.severity(),
            self.code.code(),
            self.message
        )?;
        write!(f, " [violates {}]", self.code.invariant())?;
        Ok(())
    }
}

impl std::error::Error for AttrError {}

/// Result type for attribute operations
pub type AttrResult<T> = Result<T, AttrError>;
