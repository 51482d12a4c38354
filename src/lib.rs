//! Litgroups - smart groups over a personal literature library
//!
//! This library lets a user define groups of papers by filter rather than by
//! membership. A group is a validated filter specification evaluated against
//! the owner's documents whenever the group is opened, so membership never
//! goes stale. Specifications come from built-in presets, from explicit JSON,
//! or from a natural-language request translated by a text generation model.

use thiserror::Error;

pub mod cli;
pub mod commands;
pub mod config;
pub mod db;
pub mod document;
pub mod executor;
pub mod groups;
pub mod output;
pub mod query;
pub mod translate;

#[cfg(test)]
pub mod testing;

/// Error enum, contains all failure states of the program
#[derive(Debug, Error)]
pub enum LitError {
    /// Database error
    #[error("Database error: {0}")]
    DbError(#[from] db::DbError),
    /// Group operation error
    #[error(transparent)]
    GroupError(#[from] groups::GroupError),
    /// Filter specification error
    #[error("Invalid filter: {0}")]
    FilterError(#[from] query::FilterError),
    /// Translation error
    #[error(transparent)]
    TranslateError(#[from] translate::TranslateError),
    /// Represents a configuration error
    #[error("Configuration error: {0}")]
    ConfigError(#[from] ::config::ConfigError),
    /// Represents an I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    /// Malformed JSON input
    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),
    /// Invalid input error
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
