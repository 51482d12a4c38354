//! Group data structures
//!
//! This module defines the persisted and transient shapes of smart groups:
//! - `CustomGroup`: a user-defined group stored in the `groups` tree
//! - `GroupCategory`: whether a group was defined by hand or translated from text
//! - `GroupDraft` / `GroupUpdate`: inputs to create and update
//! - `PresetSummary`: a built-in group annotated with its live count
//! - `ResolvedGroup`: what a group reference points at

use super::error::GroupError;
use super::presets::Preset;
use crate::db::{GroupId, OwnerId, Record};
use crate::query::FilterSpec;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_ICON: &str = "folder";
pub const DEFAULT_COLOR: &str = "#00d4ff";
pub const MAX_NAME_LEN: usize = 100;
pub const MAX_DESCRIPTION_LEN: usize = 500;

/// Icons the front end knows how to draw
pub const ICONS: &[&str] = &["fire", "book", "calendar", "heart", "star", "eye", "folder", "search"];

/// How a custom group came to exist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GroupCategory {
    #[default]
    Custom,
    AiGenerated,
}

impl GroupCategory {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Custom => "custom",
            Self::AiGenerated => "ai-generated",
        }
    }
}

impl fmt::Display for GroupCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const fn default_active() -> bool {
    true
}

/// A persisted, user-defined smart group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomGroup {
    pub id: GroupId,
    pub owner: OwnerId,
    pub name: String,
    #[serde(default)]
    pub category: GroupCategory,
    pub icon: String,
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub spec: FilterSpec,
    /// Last computed member count; an estimate between recomputations
    #[serde(default)]
    pub document_count: usize,
    #[serde(default)]
    pub last_recomputed: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default = "default_active")]
    pub active: bool,
}

impl Record for CustomGroup {
    fn owner(&self) -> &OwnerId {
        &self.owner
    }

    fn record_id(&self) -> String {
        self.id.to_string()
    }
}

/// Input for creating a custom group
#[derive(Debug, Clone, PartialEq)]
pub struct GroupDraft {
    pub name: String,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub description: Option<String>,
    pub spec: FilterSpec,
}

impl GroupDraft {
    #[must_use]
    pub fn new(name: impl Into<String>, spec: FilterSpec) -> Self {
        Self {
            name: name.into(),
            icon: None,
            color: None,
            description: None,
            spec,
        }
    }

    #[must_use]
    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    #[must_use]
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Changes to apply to a custom group; `None` leaves a field untouched
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupUpdate {
    pub name: Option<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub description: Option<String>,
    pub spec: Option<FilterSpec>,
    pub active: Option<bool>,
}

impl GroupUpdate {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.icon.is_none()
            && self.color.is_none()
            && self.description.is_none()
            && self.spec.is_none()
            && self.active.is_none()
    }
}

/// A preset annotated with its live member count
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PresetSummary {
    pub key: &'static str,
    pub name: &'static str,
    pub icon: &'static str,
    pub color: &'static str,
    pub spec: FilterSpec,
    pub document_count: usize,
}

/// What a group reference resolved to
#[derive(Debug, Clone)]
pub enum ResolvedGroup {
    /// A built-in group, with its specification computed at resolution time
    Preset { preset: &'static Preset, spec: FilterSpec },
    Custom(CustomGroup),
}

impl ResolvedGroup {
    #[must_use]
    pub fn spec(&self) -> &FilterSpec {
        match self {
            Self::Preset { spec, .. } => spec,
            Self::Custom(group) => &group.spec,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Preset { preset, .. } => preset.name,
            Self::Custom(group) => &group.name,
        }
    }

    #[must_use]
    pub fn into_spec(self) -> FilterSpec {
        match self {
            Self::Preset { spec, .. } => spec,
            Self::Custom(group) => group.spec,
        }
    }
}

/// Validate a group display name
///
/// # Errors
///
/// Returns `GroupError::InvalidInput` if the name is empty, too long, or
/// contains control characters.
pub fn validate_group_name(name: &str) -> Result<(), GroupError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(GroupError::invalid("name", "name cannot be empty"));
    }
    if trimmed.chars().count() > MAX_NAME_LEN {
        return Err(GroupError::invalid(
            "name",
            format!("name cannot exceed {MAX_NAME_LEN} characters"),
        ));
    }
    if trimmed.chars().any(char::is_control) {
        return Err(GroupError::invalid("name", "name cannot contain control characters"));
    }
    Ok(())
}

/// Validate an icon identifier
///
/// # Errors
///
/// Returns `GroupError::InvalidInput` if the icon is not one of [`ICONS`].
pub fn validate_icon(icon: &str) -> Result<(), GroupError> {
    if ICONS.contains(&icon) {
        Ok(())
    } else {
        Err(GroupError::invalid(
            "icon",
            format!("unknown icon '{icon}' (expected one of {})", ICONS.join(", ")),
        ))
    }
}

/// Validate a `#rrggbb` color
///
/// # Errors
///
/// Returns `GroupError::InvalidInput` if the color is not a six-digit hex code.
pub fn validate_color(color: &str) -> Result<(), GroupError> {
    let valid = color.len() == 7
        && color.starts_with('#')
        && color[1..].chars().all(|c| c.is_ascii_hexdigit());
    if valid {
        Ok(())
    } else {
        Err(GroupError::invalid(
            "color",
            format!("'{color}' is not a #rrggbb color"),
        ))
    }
}

/// Validate an optional free-text description
///
/// # Errors
///
/// Returns `GroupError::InvalidInput` if the description is too long.
pub fn validate_description(description: &str) -> Result<(), GroupError> {
    if description.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(GroupError::invalid(
            "description",
            format!("description cannot exceed {MAX_DESCRIPTION_LEN} characters"),
        ));
    }
    Ok(())
}
