//! Presets command - built-in groups with live counts

use crate::{LitError, db::OwnerId, groups::GroupManager, output};

type Result<T> = std::result::Result<T, LitError>;

/// Execute the presets command
///
/// # Errors
/// Returns an error if counting any preset fails
pub fn execute(manager: &GroupManager<'_>, owner: &OwnerId, quiet: bool) -> Result<()> {
    let presets = manager.list_presets(owner)?;
    if !quiet {
        println!("Built-in groups:");
    }
    for preset in &presets {
        println!("{}", output::preset_line(preset, quiet));
    }
    Ok(())
}
