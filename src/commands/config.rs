//! Config command - write or show the configuration

use crate::cli::ConfigCommands;
use crate::config::AppConfig;
use crate::LitError;
use std::path::Path;

type Result<T> = std::result::Result<T, LitError>;

/// Execute a configuration command
///
/// # Errors
/// Returns an error if the config path cannot be determined or written
pub fn execute(config: &AppConfig, command: &ConfigCommands, quiet: bool) -> Result<()> {
    match command {
        ConfigCommands::Init { force } => {
            let path = AppConfig::config_path()?;
            init(&path, *force)?;
            if !quiet {
                println!("Wrote default configuration to {}", path.display());
            }
            Ok(())
        }
        ConfigCommands::Show => {
            let shown = toml::to_string_pretty(&config.redacted())
                .map_err(|e| LitError::InvalidInput(format!("Failed to render config: {e}")))?;
            print!("{shown}");
            Ok(())
        }
    }
}

/// Write the default configuration to `path` unless a file already exists
///
/// # Errors
/// Returns `LitError::InvalidInput` if the file exists and `force` is false.
pub fn init(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(LitError::InvalidInput(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )));
    }
    AppConfig::default().save_to(path)?;
    Ok(())
}
