//! Command implementations
//!
//! Each command is a module with an execute function that takes parsed CLI args
//! and executes the operation for the requesting owner.

pub mod config;
pub mod docs;
pub mod groups;
pub mod open;
pub mod presets;
pub mod preview;

// Re-export execute functions for convenience
pub use config::execute as config;
pub use docs::execute as docs;
pub use groups::execute as groups;
pub use open::execute as open;
pub use presets::execute as presets;
pub use preview::execute as preview;

use crate::LitError;
use crate::config::AppConfig;
use crate::translate::{ChatClient, Translator};

/// Translator backed by the configured chat completions endpoint
///
/// # Errors
///
/// Returns `LitError::TranslateError` if the HTTP client cannot be built.
pub fn translator(config: &AppConfig) -> Result<Translator<ChatClient>, LitError> {
    let client = ChatClient::new(&config.ai).map_err(crate::translate::TranslateError::from)?;
    Ok(Translator::new(
        client,
        config.query.limits(),
        config.query.max_input_chars,
    ))
}
