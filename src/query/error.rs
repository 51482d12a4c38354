//! Error types for filter validation
//!
//! Every variant is a rejection of the candidate specification as a whole;
//! nothing is partially applied.

use thiserror::Error;

/// Reasons a candidate filter specification is rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    /// Field name outside the filterable set (includes ownership fields)
    #[error("field `{0}` cannot be used in a filter")]
    InvalidField(String),

    /// Operator outside the allowed set
    #[error("operator `{0}` is not allowed")]
    InvalidOperator(String),

    /// Allowed operator used on a field type it does not apply to
    #[error("operator `{operator}` cannot be applied to field `{field}`")]
    UnsupportedOperator { field: String, operator: String },

    /// Literal does not match the field's declared type
    #[error("invalid value for `{field}`: {reason}")]
    InvalidValueType { field: String, reason: String },

    /// Tree depth, node count or set size exceeds the configured bounds
    #[error("filter is too complex: {0}")]
    TooComplex(String),

    /// Top-level structure is not a filter specification
    #[error("malformed filter specification: {0}")]
    Malformed(String),
}

impl FilterError {
    pub(crate) fn value(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValueType {
            field: field.into(),
            reason: reason.into(),
        }
    }
}
