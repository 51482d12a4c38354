//! Preview command - dry-run a natural-language request

use crate::{LitError, db::OwnerId, groups::GroupManager, translate::TextGenerator, translate::Translator};

type Result<T> = std::result::Result<T, LitError>;

/// Execute the preview command
///
/// # Errors
/// Returns an error if translation or counting fails
pub fn execute<G: TextGenerator>(
    manager: &GroupManager<'_>,
    translator: &Translator<G>,
    owner: &OwnerId,
    text: &str,
    quiet: bool,
) -> Result<()> {
    let preview = manager.preview(owner, translator, text)?;
    let hints = &preview.translation.hints;

    if quiet {
        println!("{}", preview.match_count);
        return Ok(());
    }
    println!("Suggested name: {}", hints.name);
    if let Some(description) = &hints.description {
        println!("Description:    {description}");
    }
    println!("Filter:         {}", preview.translation.spec);
    println!("Matches:        {}", preview.match_count);
    Ok(())
}
