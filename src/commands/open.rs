//! Open command - page through the members of a group

use crate::{LitError, db::OwnerId, executor::Page, groups::GroupManager, output};

type Result<T> = std::result::Result<T, LitError>;

/// Execute the open command
///
/// # Errors
/// Returns an error if the group does not resolve or the query fails
pub fn execute(
    manager: &GroupManager<'_>,
    owner: &OwnerId,
    reference: &str,
    page: Page,
    json: bool,
    quiet: bool,
) -> Result<()> {
    let (group, result) = manager.documents(owner, reference, page)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    if !quiet {
        println!("{} ({})", group.name(), group.spec());
        println!();
    }
    for doc in &result.items {
        println!("{}", output::document_line(doc, quiet));
    }
    if !quiet {
        println!();
        println!("{}", output::page_footer(&result));
    }
    Ok(())
}
