//! Output formatting for CLI display
//!
//! In quiet mode every formatter returns the bare identifier so output can be
//! piped into other commands.

use crate::document::{Document, ReadStatus};
use crate::executor::QueryPage;
use crate::groups::{CustomGroup, GroupCategory, PresetSummary};
use colored::Colorize;

/// Render a `#rrggbb` color as a colored dot, or a plain dot if it does not parse
#[must_use]
pub fn swatch(color: &str) -> String {
    let channel = |range: std::ops::Range<usize>| {
        color.get(range).and_then(|hex| u8::from_str_radix(hex, 16).ok())
    };
    match (channel(1..3), channel(3..5), channel(5..7)) {
        (Some(r), Some(g), Some(b)) => "●".truecolor(r, g, b).to_string(),
        _ => "●".to_string(),
    }
}

fn count_label(count: usize) -> String {
    if count == 1 {
        "1 document".to_string()
    } else {
        format!("{count} documents")
    }
}

/// Format a preset with its live count
#[must_use]
pub fn preset_line(preset: &PresetSummary, quiet: bool) -> String {
    if quiet {
        return preset.key.to_string();
    }
    format!(
        "  {} {:<20} {:<22} {}",
        swatch(preset.color),
        preset.key.cyan(),
        preset.name,
        count_label(preset.document_count).dimmed()
    )
}

/// Format a custom group for list output
#[must_use]
pub fn group_line(group: &CustomGroup, quiet: bool) -> String {
    if quiet {
        return group.id.to_string();
    }
    let category = match group.category {
        GroupCategory::Custom => String::new(),
        GroupCategory::AiGenerated => format!(" [{}]", group.category).magenta().to_string(),
    };
    let inactive = if group.active { String::new() } else { " (inactive)".yellow().to_string() };
    format!(
        "  {} {} {}{}{}\n      {}",
        swatch(&group.color),
        group.name.bold(),
        count_label(group.document_count).dimmed(),
        category,
        inactive,
        group.id.to_string().dimmed()
    )
}

/// Format every field of a custom group for `groups show`
#[must_use]
pub fn group_details(group: &CustomGroup) -> String {
    let mut lines = vec![
        format!("{} {}", swatch(&group.color), group.name.bold()),
        format!("  id:          {}", group.id),
        format!("  category:    {}", group.category),
        format!("  icon:        {}", group.icon),
        format!("  color:       {}", group.color),
    ];
    if let Some(description) = &group.description {
        lines.push(format!("  description: {description}"));
    }
    lines.push(format!("  filter:      {}", group.spec));
    if let Some(source) = &group.spec.source_text {
        lines.push(format!("  request:     {source}"));
    }
    lines.push(format!("  documents:   {}", group.document_count));
    lines.push(format!("  active:      {}", group.active));
    lines.push(format!("  created:     {}", group.created_at.format("%Y-%m-%d %H:%M")));
    lines.push(format!("  updated:     {}", group.updated_at.format("%Y-%m-%d %H:%M")));
    lines.join("\n")
}

fn status_label(status: ReadStatus) -> String {
    match status {
        ReadStatus::Unread => status.as_str().normal().to_string(),
        ReadStatus::Read => status.as_str().green().to_string(),
        ReadStatus::Important => status.as_str().red().bold().to_string(),
    }
}

/// Format a document as a one or two line entry
#[must_use]
pub fn document_line(doc: &Document, quiet: bool) -> String {
    if quiet {
        return doc.id.to_string();
    }
    let favorite = if doc.is_favorite { " ★".yellow().to_string() } else { String::new() };
    let mut meta = Vec::new();
    if !doc.authors.is_empty() {
        meta.push(doc.authors.join(", "));
    }
    if let Some(journal) = &doc.journal {
        meta.push(journal.clone());
    }
    if let Some(year) = doc.year {
        meta.push(year.to_string());
    }
    let meta = if meta.is_empty() { String::new() } else { format!("\n      {}", meta.join(" · ").dimmed()) };
    format!(
        "  {}{} [{}, {}/5]{}",
        doc.title.bold(),
        favorite,
        status_label(doc.status),
        doc.rating,
        meta
    )
}

/// Footer describing where a page sits in the result set
#[must_use]
pub fn page_footer(page: &QueryPage) -> String {
    if page.total == 0 {
        return "No matching documents.".to_string();
    }
    format!(
        "Page {} of {} ({} total)",
        page.page,
        page.pages.max(1),
        page.total
    )
}
