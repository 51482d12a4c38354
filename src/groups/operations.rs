//! Group lifecycle and resolution
//!
//! This module provides a `GroupManager` that resolves group references,
//! manages custom groups, and annotates groups with live member counts.

use super::error::GroupError;
use super::presets::{self, PRESETS};
use super::types::{
    CustomGroup, DEFAULT_COLOR, DEFAULT_ICON, GroupCategory, GroupDraft, GroupUpdate,
    PresetSummary, ResolvedGroup, validate_color, validate_description, validate_group_name,
    validate_icon,
};
use crate::config::QueryConfig;
use crate::db::{Database, GroupId, OwnerId};
use crate::executor::{Executor, Page, QueryPage};
use crate::query::{FilterError, FilterSpec, Limits};
use crate::translate::{TextGenerator, Translation, Translator};
use chrono::Utc;
use std::str::FromStr;

/// Result of a dry-run translation
#[derive(Debug, Clone, PartialEq)]
pub struct Preview {
    pub translation: Translation,
    pub match_count: usize,
}

/// Manager for group operations
///
/// Every method takes the requesting owner explicitly; nothing is cached
/// between calls.
///
/// # Examples
///
/// ```no_run
/// use litgroups::db::{Database, OwnerId};
/// use litgroups::executor::Page;
/// use litgroups::groups::GroupManager;
/// use litgroups::query::Limits;
///
/// let db = Database::open("my_db").unwrap();
/// let manager = GroupManager::new(&db, Limits::default(), 100);
/// let owner = OwnerId::new("alice").unwrap();
///
/// let (group, page) = manager.documents(&owner, "favorites", Page::default()).unwrap();
/// println!("{}: {} documents", group.name(), page.total);
/// ```
pub struct GroupManager<'a> {
    db: &'a Database,
    limits: Limits,
    max_page_size: usize,
}

impl<'a> GroupManager<'a> {
    #[must_use]
    pub const fn new(db: &'a Database, limits: Limits, max_page_size: usize) -> Self {
        Self {
            db,
            limits,
            max_page_size,
        }
    }

    #[must_use]
    pub const fn from_config(db: &'a Database, config: &QueryConfig) -> Self {
        Self::new(db, config.limits(), config.max_page_size)
    }

    #[must_use]
    pub const fn limits(&self) -> &Limits {
        &self.limits
    }

    fn executor(&self) -> Executor<'a, Database> {
        Executor::new(self.db, self.max_page_size)
    }

    /// Run a specification through the validator again so specifications
    /// built in code obey the same bounds as parsed ones
    fn check_spec(&self, spec: &FilterSpec) -> Result<(), FilterError> {
        FilterSpec::from_json(&spec.to_json(), &self.limits).map(|_| ())
    }

    /// All presets with their live member counts, in catalog order
    ///
    /// # Errors
    ///
    /// Returns `GroupError::Execution` if counting fails.
    pub fn list_presets(&self, owner: &OwnerId) -> Result<Vec<PresetSummary>, GroupError> {
        use rayon::prelude::*;

        let exec = self.executor();
        PRESETS
            .as_slice()
            .par_iter()
            .map(|preset| {
                let spec = preset.spec();
                let document_count = exec.count(&spec, owner)?;
                Ok::<_, GroupError>(PresetSummary {
                    key: preset.key,
                    name: preset.name,
                    icon: preset.icon,
                    color: preset.color,
                    spec,
                    document_count,
                })
            })
            .collect()
    }

    /// Map a preset key or custom group id to what it names
    ///
    /// Preset keys are checked first and never touch storage. A malformed id,
    /// an unknown id and another owner's id all yield `NotFound`.
    ///
    /// # Errors
    ///
    /// Returns `GroupError::NotFound` or `GroupError::Execution`.
    pub fn resolve(&self, owner: &OwnerId, reference: &str) -> Result<ResolvedGroup, GroupError> {
        let reference = reference.trim();
        if let Some(preset) = presets::find(reference) {
            return Ok(ResolvedGroup::Preset {
                preset,
                spec: preset.spec(),
            });
        }
        let id = GroupId::from_str(reference).map_err(|_| GroupError::NotFound(reference.to_string()))?;
        self.get(owner, id).map(ResolvedGroup::Custom)
    }

    /// Get one of `owner`'s custom groups
    ///
    /// # Errors
    ///
    /// Returns `GroupError::NotFound` if the group does not exist for this owner.
    pub fn get(&self, owner: &OwnerId, id: GroupId) -> Result<CustomGroup, GroupError> {
        self.db
            .get_group(owner, id)?
            .ok_or_else(|| GroupError::NotFound(id.to_string()))
    }

    /// Resolve `reference` and fetch one page of its members
    ///
    /// For custom groups the cached count is refreshed as a side effect when
    /// it has drifted; failure to write it back is logged and ignored.
    ///
    /// # Errors
    ///
    /// Returns `GroupError::NotFound` or `GroupError::Execution`.
    pub fn documents(
        &self,
        owner: &OwnerId,
        reference: &str,
        page: Page,
    ) -> Result<(ResolvedGroup, QueryPage), GroupError> {
        let group = self.resolve(owner, reference)?;
        let result = self.executor().execute(group.spec(), owner, page)?;
        if let ResolvedGroup::Custom(custom) = &group
            && custom.document_count != result.total
        {
            self.store_count(owner, custom.id, result.total);
        }
        Ok((group, result))
    }

    /// Count `owner`'s documents matching an ad hoc specification
    ///
    /// # Errors
    ///
    /// Returns `GroupError::Filter` if the filter exceeds the configured bounds,
    /// or `GroupError::Execution` if counting fails.
    pub fn count(&self, owner: &OwnerId, spec: &FilterSpec) -> Result<usize, GroupError> {
        self.check_spec(spec)?;
        Ok(self.executor().count(spec, owner)?)
    }

    /// Create a custom group from an explicit payload
    ///
    /// # Errors
    ///
    /// Returns `GroupError::InvalidInput` for bad display fields,
    /// `GroupError::Filter` for a rejected specification, or
    /// `GroupError::Execution` if storage fails. Nothing is stored on error.
    pub fn create(&self, owner: &OwnerId, draft: GroupDraft) -> Result<CustomGroup, GroupError> {
        self.insert_new(owner, draft, GroupCategory::Custom)
    }

    /// Translate `text` and store the result as an `ai-generated` group
    ///
    /// `name` overrides the suggested name. Exactly one generation call is
    /// made; on any failure nothing is stored.
    ///
    /// # Errors
    ///
    /// Returns `GroupError::Translate` if translation fails, otherwise as
    /// [`GroupManager::create`].
    pub fn create_from_text<G: TextGenerator>(
        &self,
        owner: &OwnerId,
        translator: &Translator<G>,
        text: &str,
        name: Option<&str>,
    ) -> Result<CustomGroup, GroupError> {
        let Translation { spec, hints } = translator.translate(text)?;
        let draft = GroupDraft {
            name: name.map_or(hints.name, str::to_string),
            icon: Some(hints.icon),
            color: Some(hints.color),
            description: hints.description,
            spec,
        };
        self.insert_new(owner, draft, GroupCategory::AiGenerated)
    }

    /// Translate `text` and count its matches without storing anything
    ///
    /// # Errors
    ///
    /// Returns `GroupError::Translate` or `GroupError::Execution`.
    pub fn preview<G: TextGenerator>(
        &self,
        owner: &OwnerId,
        translator: &Translator<G>,
        text: &str,
    ) -> Result<Preview, GroupError> {
        let translation = translator.translate(text)?;
        let match_count = self.executor().count(&translation.spec, owner)?;
        Ok(Preview {
            translation,
            match_count,
        })
    }

    fn insert_new(
        &self,
        owner: &OwnerId,
        draft: GroupDraft,
        category: GroupCategory,
    ) -> Result<CustomGroup, GroupError> {
        let name = draft.name.trim().to_string();
        validate_group_name(&name)?;
        let icon = draft.icon.unwrap_or_else(|| DEFAULT_ICON.to_string());
        validate_icon(&icon)?;
        let color = draft.color.unwrap_or_else(|| DEFAULT_COLOR.to_string()).to_lowercase();
        validate_color(&color)?;
        if let Some(description) = &draft.description {
            validate_description(description)?;
        }
        self.check_spec(&draft.spec)?;

        let document_count = self.executor().count(&draft.spec, owner)?;
        let now = Utc::now();
        let group = CustomGroup {
            id: GroupId::new_v4(),
            owner: owner.clone(),
            name,
            category,
            icon,
            color,
            description: draft.description,
            spec: draft.spec,
            document_count,
            last_recomputed: Some(now),
            created_at: now,
            updated_at: now,
            active: true,
        };
        self.db.insert_group(&group)?;

        tracing::info!(
            owner = %owner,
            group = %group.id,
            category = %category,
            document_count,
            "created group"
        );
        Ok(group)
    }

    /// Apply `update` to one of `owner`'s groups
    ///
    /// Identity, owner, category and creation time never change. A new
    /// specification triggers a count recomputation.
    ///
    /// # Errors
    ///
    /// Returns `GroupError::NotFound`, `GroupError::InvalidInput`,
    /// `GroupError::Filter` or `GroupError::Execution`.
    pub fn update(&self, owner: &OwnerId, id: GroupId, update: GroupUpdate) -> Result<CustomGroup, GroupError> {
        let mut group = self.get(owner, id)?;

        if let Some(name) = update.name {
            let name = name.trim().to_string();
            validate_group_name(&name)?;
            group.name = name;
        }
        if let Some(icon) = update.icon {
            validate_icon(&icon)?;
            group.icon = icon;
        }
        if let Some(color) = update.color {
            let color = color.to_lowercase();
            validate_color(&color)?;
            group.color = color;
        }
        if let Some(description) = update.description {
            validate_description(&description)?;
            group.description = Some(description).filter(|d| !d.trim().is_empty());
        }
        if let Some(active) = update.active {
            group.active = active;
        }
        if let Some(spec) = update.spec {
            self.check_spec(&spec)?;
            let now = Utc::now();
            group.document_count = self.executor().count(&spec, owner)?;
            group.last_recomputed = Some(now);
            group.spec = spec;
        }

        group.updated_at = Utc::now();
        self.db.insert_group(&group)?;
        tracing::info!(owner = %owner, group = %id, "updated group");
        Ok(group)
    }

    /// Delete one of `owner`'s groups; documents are untouched
    ///
    /// # Errors
    ///
    /// Returns `GroupError::NotFound` if there is nothing to delete.
    pub fn delete(&self, owner: &OwnerId, id: GroupId) -> Result<CustomGroup, GroupError> {
        let removed = self
            .db
            .remove_group(owner, id)?
            .ok_or_else(|| GroupError::NotFound(id.to_string()))?;
        tracing::info!(owner = %owner, group = %id, "deleted group");
        Ok(removed)
    }

    /// All of `owner`'s groups, newest first, with freshly computed counts
    ///
    /// Stored counts that have drifted are written back best-effort.
    ///
    /// # Errors
    ///
    /// Returns `GroupError::Execution` if the groups cannot be read or counted.
    pub fn list(&self, owner: &OwnerId) -> Result<Vec<CustomGroup>, GroupError> {
        use rayon::prelude::*;

        let mut groups = self.db.list_groups(owner)?;
        groups.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));

        let exec = self.executor();
        let counts: Vec<usize> = groups
            .par_iter()
            .map(|group| exec.count(&group.spec, owner))
            .collect::<Result<_, _>>()?;

        let now = Utc::now();
        for (group, count) in groups.iter_mut().zip(counts) {
            if group.document_count != count {
                tracing::debug!(group = %group.id, old = group.document_count, new = count, "group count drifted");
                self.store_count(owner, group.id, count);
            }
            group.document_count = count;
            group.last_recomputed = Some(now);
        }
        Ok(groups)
    }

    fn store_count(&self, owner: &OwnerId, id: GroupId, count: usize) {
        if let Err(e) = self.db.refresh_group_count(owner, id, count, Utc::now()) {
            tracing::warn!(group = %id, error = %e, "failed to store refreshed group count");
        }
    }
}

#[cfg(test)]
#[path = "operations_tests.rs"]
mod operations_tests;
