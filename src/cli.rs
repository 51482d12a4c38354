//! Command-line interface definitions and parsing
//!
//! This module defines the CLI structure for litgroups using the `clap` crate.
//!
//! # Commands
//!
//! - **presets**: built-in groups with live counts
//! - **groups**: list, show, create, ask, update and delete custom groups
//! - **open**: page through the members of a group
//! - **preview**: translate a request without saving it
//! - **docs**: import and list documents
//! - **config**: write or show the configuration
//!
//! Global flags (`--owner`, `--db`, `--quiet`, `--verbose`) may appear
//! anywhere on the command line.

use crate::LitError;
use crate::query::{FilterSpec, Limits};
use clap::{Parser, Subcommand};
use serde_json::{Map, Value};
use std::path::PathBuf;

/// Main CLI structure for parsing command-line arguments
#[derive(Parser, Debug)]
#[command(name = "litgroups")]
#[command(about = "Smart groups for a personal literature library", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Act as this user (overrides the configured owner)
    #[arg(long, global = true, value_name = "ID")]
    pub owner: Option<String>,

    /// Database directory (overrides the configured path)
    #[arg(long = "db", global = true, value_name = "PATH")]
    pub db: Option<PathBuf>,

    /// Suppress informational output (only print results)
    #[arg(short = 'q', long = "quiet", global = true)]
    pub quiet: bool,

    /// Log debug details to stderr
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// List built-in groups with their document counts
    #[command(visible_alias = "p")]
    Presets,

    /// Manage custom groups
    #[command(visible_alias = "g")]
    Groups {
        #[command(subcommand)]
        command: GroupsCommands,
    },

    /// Show the documents in a group
    #[command(visible_alias = "o")]
    Open {
        /// Preset key or custom group id
        #[arg(value_name = "GROUP")]
        reference: String,

        /// Page number, starting at 1
        #[arg(long, default_value_t = 1)]
        page: usize,

        /// Documents per page (defaults to `query.default_page_size`)
        #[arg(short = 'n', long)]
        limit: Option<usize>,

        /// Print the page as JSON
        #[arg(long)]
        json: bool,
    },

    /// Translate a request and count its matches without saving a group
    Preview {
        /// Natural-language description of the documents
        #[arg(value_name = "TEXT")]
        text: String,
    },

    /// Manage documents
    Docs {
        #[command(subcommand)]
        command: DocsCommands,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

/// Custom group subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum GroupsCommands {
    /// List custom groups, newest first
    #[command(visible_alias = "ls")]
    List,

    /// Show a group's definition and current count
    Show {
        /// Preset key or custom group id
        #[arg(value_name = "GROUP")]
        reference: String,
    },

    /// Create a group from an explicit filter
    Create {
        /// Display name
        name: String,

        /// Filter as JSON, e.g. '{"year": {"$gte": 2020}}'
        #[arg(short = 'f', long, value_name = "JSON")]
        filter: String,

        /// Sort as JSON, e.g. '{"year": -1}'
        #[arg(short = 's', long, value_name = "JSON")]
        sort: Option<String>,

        #[arg(long)]
        icon: Option<String>,

        /// `#rrggbb` color
        #[arg(long)]
        color: Option<String>,

        #[arg(short = 'd', long)]
        description: Option<String>,
    },

    /// Create a group from a natural-language request
    Ask {
        /// Natural-language description of the documents
        #[arg(value_name = "TEXT")]
        text: String,

        /// Use this name instead of the suggested one
        #[arg(long)]
        name: Option<String>,
    },

    /// Change a custom group
    Update {
        /// Custom group id
        id: String,

        #[arg(long)]
        name: Option<String>,

        /// Replacement filter as JSON
        #[arg(short = 'f', long, value_name = "JSON")]
        filter: Option<String>,

        /// Replacement sort as JSON
        #[arg(short = 's', long, value_name = "JSON", requires = "filter")]
        sort: Option<String>,

        #[arg(long)]
        icon: Option<String>,

        #[arg(long)]
        color: Option<String>,

        #[arg(short = 'd', long)]
        description: Option<String>,

        /// Mark the group active or inactive
        #[arg(long, value_name = "BOOL")]
        active: Option<bool>,
    },

    /// Delete a custom group (documents are not touched)
    #[command(visible_alias = "rm")]
    Delete {
        /// Custom group id
        id: String,

        /// Skip the confirmation prompt
        #[arg(short = 'f', long)]
        force: bool,
    },
}

/// Document subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum DocsCommands {
    /// Import documents from a JSON array file
    Import {
        /// Path to the JSON file
        file: PathBuf,
    },

    /// List documents, newest first
    #[command(visible_alias = "ls")]
    List {
        /// Maximum number of documents to print
        #[arg(short = 'n', long, default_value_t = 50)]
        limit: usize,
    },
}

/// Configuration subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommands {
    /// Write the default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the effective configuration (API key redacted)
    Show,
}

impl Cli {
    /// Parse command line arguments
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

/// Build a filter specification from `--filter` / `--sort` arguments
///
/// # Errors
///
/// Returns `LitError::JsonError` if either argument is not JSON, or
/// `LitError::FilterError` if the result is not an acceptable filter.
pub fn parse_filter_args(filter: &str, sort: Option<&str>, limits: &Limits) -> Result<FilterSpec, LitError> {
    let mut candidate = Map::new();
    candidate.insert("filter".into(), serde_json::from_str::<Value>(filter)?);
    if let Some(sort) = sort {
        candidate.insert("sort".into(), serde_json::from_str::<Value>(sort)?);
    }
    Ok(FilterSpec::from_json(&Value::Object(candidate), limits)?)
}
