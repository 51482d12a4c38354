//! Error types for group operations
//!
//! This module defines all errors that can occur while resolving, creating,
//! updating or listing smart groups.

use crate::db::DbError;
use crate::query::FilterError;
use crate::translate::TranslateError;
use thiserror::Error;

/// Errors that can occur during group operations
#[derive(Debug, Error)]
pub enum GroupError {
    /// No preset with this key and no group with this id for the owner
    #[error("Group '{0}' not found")]
    NotFound(String),

    /// Invalid display fields (name, icon, color)
    #[error("Invalid group {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },

    /// The filter specification was rejected
    #[error("Invalid filter: {0}")]
    Filter(#[from] FilterError),

    /// Natural-language translation failed
    #[error(transparent)]
    Translate(#[from] TranslateError),

    /// The document or group store failed; retryable
    #[error("Execution failed: {0}")]
    Execution(#[from] DbError),
}

impl GroupError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field,
            reason: reason.into(),
        }
    }
}
