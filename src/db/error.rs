//! Database-specific error types
//!
//! This module defines all error types that can occur during database operations.
//! Errors are properly categorized and include context for debugging.
//!
//! # Error Types
//!
//! - **`SledError`**: Errors from the underlying sled embedded database
//! - **`EncodeError`** / **`DecodeError`**: JSON encoding failures for stored records
//! - **`InvalidKey`**: Identifiers that cannot be used to build a storage key
//! - **`InvalidRecord`**: Records rejected before they are written
//! - **`OwnerMismatch`**: A record found under another owner's key prefix
//!
//! Every variant here is an infrastructure failure. Callers in the group layer
//! surface them as retryable execution errors, never as validation problems.

use thiserror::Error;

/// Database-specific errors
#[derive(Debug, Error)]
pub enum DbError {
    /// Represents a sled database error
    #[error("Database error: {0}")]
    SledError(#[from] sled::Error),

    /// A stored record could not be decoded
    #[error("Error while decoding record: {0}")]
    DecodeError(String),

    /// A record could not be encoded for storage
    #[error("Error while encoding record: {0}")]
    EncodeError(String),

    /// Identifier cannot be turned into a storage key
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// A record violates the rules for stored data
    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    /// A stored record carries an owner that does not match its key prefix
    #[error("Record {0} is stored under a foreign owner")]
    OwnerMismatch(String),
}

impl DbError {
    pub(crate) fn decode(err: &serde_json::Error) -> Self {
        Self::DecodeError(err.to_string())
    }

    pub(crate) fn encode(err: &serde_json::Error) -> Self {
        Self::EncodeError(err.to_string())
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod error_tests;
