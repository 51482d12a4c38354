//! Literature document model
//!
//! Documents are owned by the surrounding library application; this crate only
//! reads them. The shape mirrors the fields smart-group filters may reference.

use crate::db::types::{DocumentId, OwnerId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Reading status of a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReadStatus {
    #[default]
    #[serde(alias = "未读")]
    Unread,
    #[serde(alias = "已读")]
    Read,
    #[serde(alias = "重点", alias = "flagged")]
    Important,
}

impl ReadStatus {
    pub const ALL: [Self; 3] = [Self::Unread, Self::Read, Self::Important];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unread => "unread",
            Self::Read => "read",
            Self::Important => "important",
        }
    }
}

impl FromStr for ReadStatus {
    type Err = String;

    /// Accepts the canonical English labels plus the legacy labels stored by
    /// earlier versions of the library (`未读`, `已读`, `重点`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "unread" | "未读" => Ok(Self::Unread),
            "read" | "已读" => Ok(Self::Read),
            "important" | "flagged" | "重点" => Ok(Self::Important),
            other => Err(format!(
                "unknown status '{other}' (expected unread, read or important)"
            )),
        }
    }
}

impl fmt::Display for ReadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_rating() -> u8 {
    3
}

/// A paper in the user's library
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: DocumentId,
    pub owner: OwnerId,
    pub title: String,
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default)]
    pub journal: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default, rename = "abstract")]
    pub abstract_text: Option<String>,
    #[serde(default)]
    pub doi: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub status: ReadStatus,
    #[serde(default = "default_rating")]
    pub rating: u8,
    #[serde(default)]
    pub is_favorite: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document {
    /// Create a new document with default metadata, timestamped now
    #[must_use]
    pub fn new(owner: OwnerId, title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: DocumentId::new_v4(),
            owner,
            title: title.into(),
            authors: Vec::new(),
            journal: None,
            year: None,
            abstract_text: None,
            doi: None,
            keywords: Vec::new(),
            tags: Vec::new(),
            status: ReadStatus::default(),
            rating: default_rating(),
            is_favorite: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check the invariants the library enforces on stored documents
    ///
    /// # Errors
    ///
    /// Returns a description of the first violated rule.
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("document title cannot be empty".to_string());
        }
        if !(1..=5).contains(&self.rating) {
            return Err(format!("rating must be between 1 and 5, got {}", self.rating));
        }
        if let Some(year) = self.year
            && !(1800..=2200).contains(&year)
        {
            return Err(format!("publication year {year} is out of range"));
        }
        Ok(())
    }
}

/// A document as supplied by an import file (no owner, optional id/timestamps)
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentImport {
    #[serde(default)]
    pub id: Option<DocumentId>,
    pub title: String,
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default)]
    pub journal: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default, rename = "abstract")]
    pub abstract_text: Option<String>,
    #[serde(default)]
    pub doi: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub status: ReadStatus,
    #[serde(default = "default_rating")]
    pub rating: u8,
    #[serde(default)]
    pub is_favorite: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl DocumentImport {
    /// Attach the importing owner and fill in missing identifiers and timestamps
    #[must_use]
    pub fn into_document(self, owner: OwnerId) -> Document {
        let now = Utc::now();
        let created_at = self.created_at.unwrap_or(now);
        Document {
            id: self.id.unwrap_or_else(DocumentId::new_v4),
            owner,
            title: self.title,
            authors: self.authors,
            journal: self.journal,
            year: self.year,
            abstract_text: self.abstract_text,
            doi: self.doi,
            keywords: self.keywords,
            tags: self.tags,
            status: self.status,
            rating: self.rating,
            is_favorite: self.is_favorite,
            created_at,
            updated_at: self.updated_at.unwrap_or(created_at),
        }
    }
}
