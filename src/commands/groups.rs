//! Groups command - custom group management

use crate::cli::{GroupsCommands, parse_filter_args};
use crate::db::{GroupId, OwnerId};
use crate::groups::{GroupDraft, GroupError, GroupManager, GroupUpdate, ResolvedGroup};
use crate::translate::{TextGenerator, Translator};
use crate::{LitError, output};
use colored::Colorize;
use dialoguer::Confirm;
use std::str::FromStr;

type Result<T> = std::result::Result<T, LitError>;

/// Execute a group management command
///
/// `translator` is only consulted by `groups ask`.
///
/// # Errors
/// Returns an error if the group operation fails or user interaction fails
pub fn execute<G: TextGenerator>(
    manager: &GroupManager<'_>,
    translator: impl FnOnce() -> Result<Translator<G>>,
    owner: &OwnerId,
    command: &GroupsCommands,
    quiet: bool,
) -> Result<()> {
    match command {
        GroupsCommands::List => list_groups(manager, owner, quiet),
        GroupsCommands::Show { reference } => show_group(manager, owner, reference),
        GroupsCommands::Create {
            name,
            filter,
            sort,
            icon,
            color,
            description,
        } => {
            let spec = parse_filter_args(filter, sort.as_deref(), manager.limits())?;
            let draft = GroupDraft {
                name: name.clone(),
                icon: icon.clone(),
                color: color.clone(),
                description: description.clone(),
                spec,
            };
            let group = manager.create(owner, draft)?;
            report_saved("Created", &group.name, &group.id, group.document_count, quiet);
            Ok(())
        }
        GroupsCommands::Ask { text, name } => {
            let translator = translator()?;
            let group = manager.create_from_text(owner, &translator, text, name.as_deref())?;
            if !quiet {
                println!("Interpreted as: {}", group.spec);
            }
            report_saved("Created", &group.name, &group.id, group.document_count, quiet);
            Ok(())
        }
        GroupsCommands::Update {
            id,
            name,
            filter,
            sort,
            icon,
            color,
            description,
            active,
        } => {
            let spec = filter
                .as_deref()
                .map(|filter| parse_filter_args(filter, sort.as_deref(), manager.limits()))
                .transpose()?;
            let update = GroupUpdate {
                name: name.clone(),
                icon: icon.clone(),
                color: color.clone(),
                description: description.clone(),
                spec,
                active: *active,
            };
            if update.is_empty() {
                return Err(LitError::InvalidInput("Nothing to update".into()));
            }
            let group = manager.update(owner, parse_id(id)?, update)?;
            report_saved("Updated", &group.name, &group.id, group.document_count, quiet);
            Ok(())
        }
        GroupsCommands::Delete { id, force } => delete_group(manager, owner, id, *force, quiet),
    }
}

/// Parse a group id, reporting a malformed id as not found
fn parse_id(id: &str) -> Result<GroupId> {
    GroupId::from_str(id.trim()).map_err(|_| GroupError::NotFound(id.to_string()).into())
}

fn report_saved(verb: &str, name: &str, id: &GroupId, count: usize, quiet: bool) {
    if quiet {
        println!("{id}");
    } else {
        println!("{} group '{}' ({count} documents)", verb.green(), name.bold());
        println!("  id: {id}");
    }
}

fn list_groups(manager: &GroupManager<'_>, owner: &OwnerId, quiet: bool) -> Result<()> {
    let groups = manager.list(owner)?;
    if groups.is_empty() {
        if !quiet {
            println!("No custom groups.");
            println!("Create one with: litgroups groups create <name> --filter <json>");
        }
        return Ok(());
    }
    if !quiet {
        println!("Custom groups:");
    }
    for group in &groups {
        println!("{}", output::group_line(group, quiet));
    }
    Ok(())
}

fn show_group(manager: &GroupManager<'_>, owner: &OwnerId, reference: &str) -> Result<()> {
    match manager.resolve(owner, reference)? {
        ResolvedGroup::Preset { preset, spec } => {
            let count = manager.count(owner, &spec)?;
            println!("{} {} (preset)", output::swatch(preset.color), preset.name.bold());
            println!("  key:         {}", preset.key);
            println!("  icon:        {}", preset.icon);
            println!("  filter:      {spec}");
            println!("  documents:   {count}");
        }
        ResolvedGroup::Custom(mut group) => {
            group.document_count = manager.count(owner, &group.spec)?;
            println!("{}", output::group_details(&group));
        }
    }
    Ok(())
}

fn delete_group(manager: &GroupManager<'_>, owner: &OwnerId, id: &str, force: bool, quiet: bool) -> Result<()> {
    let id = parse_id(id)?;
    let group = manager.get(owner, id)?;

    if !confirm(&format!("Delete group '{}'?", group.name), force || quiet)? {
        if !quiet {
            println!("Cancelled.");
        }
        return Ok(());
    }

    manager.delete(owner, id)?;
    if !quiet {
        println!("{} group '{}'", "Deleted".red(), group.name);
    }
    Ok(())
}

fn confirm(prompt: &str, skip: bool) -> Result<bool> {
    if skip {
        return Ok(true);
    }

    Confirm::new()
        .with_prompt(prompt)
        .interact()
        .map_err(|e| LitError::InvalidInput(format!("Confirmation failed: {e}")))
}
