//! Filter specification data structures
//!
//! This module defines the closed expression tree smart groups are built from:
//! - `Field`: the whitelisted document fields a predicate may reference
//! - `Scalar`: typed literal values
//! - `Predicate`: comparison, range, membership, pattern and existence nodes
//!   combined with `All` / `Any`
//! - `SortKey`: ordered (field, direction) pairs
//! - `FilterSpec`: predicate + sort + the natural-language text it came from
//!
//! There is no variant for the document owner. Ownership is attached by the
//! executor when a query is run and cannot be expressed in a predicate.

use crate::document::ReadStatus;
use chrono::{DateTime, Utc};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Document fields a filter may reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    Title,
    Authors,
    Journal,
    Year,
    Status,
    Rating,
    Keywords,
    Tags,
    IsFavorite,
    CreatedAt,
    UpdatedAt,
}

/// Value type of a field, which decides the operators and literals it accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    TextList,
    Integer,
    Number,
    Status,
    Boolean,
    Timestamp,
}

impl Field {
    pub const ALL: [Self; 11] = [
        Self::Title,
        Self::Authors,
        Self::Journal,
        Self::Year,
        Self::Status,
        Self::Rating,
        Self::Keywords,
        Self::Tags,
        Self::IsFavorite,
        Self::CreatedAt,
        Self::UpdatedAt,
    ];

    /// Name used in filter JSON
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Authors => "authors",
            Self::Journal => "journal",
            Self::Year => "year",
            Self::Status => "status",
            Self::Rating => "rating",
            Self::Keywords => "keywords",
            Self::Tags => "tags",
            Self::IsFavorite => "isFavorite",
            Self::CreatedAt => "createdAt",
            Self::UpdatedAt => "updatedAt",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.name() == name)
    }

    #[must_use]
    pub const fn kind(self) -> FieldKind {
        match self {
            Self::Title | Self::Journal => FieldKind::Text,
            Self::Authors | Self::Keywords | Self::Tags => FieldKind::TextList,
            Self::Year => FieldKind::Integer,
            Self::Rating => FieldKind::Number,
            Self::Status => FieldKind::Status,
            Self::IsFavorite => FieldKind::Boolean,
            Self::CreatedAt | Self::UpdatedAt => FieldKind::Timestamp,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Typed literal value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scalar {
    Text(String),
    Number(f64),
    Bool(bool),
    Status(ReadStatus),
    Timestamp(DateTime<Utc>),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => write!(f, "\"{s}\""),
            Self::Number(n) => write!(f, "{n}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Status(s) => write!(f, "{s}"),
            Self::Timestamp(t) => write!(f, "{}", t.format("%Y-%m-%d %H:%M:%S")),
        }
    }
}

/// Equality operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompareOp {
    Eq,
    Ne,
}

/// Set operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SetOp {
    /// Value (or any element of a list field) is in the set
    In,
    /// Value (and every element of a list field) is outside the set
    NotIn,
    /// List field contains every value of the set
    All,
}

/// One side of a range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bound {
    pub value: Scalar,
    pub inclusive: bool,
}

impl Bound {
    #[must_use]
    pub const fn inclusive(value: Scalar) -> Self {
        Self { value, inclusive: true }
    }

    #[must_use]
    pub const fn exclusive(value: Scalar) -> Self {
        Self { value, inclusive: false }
    }
}

/// Case-insensitive text pattern with a bounded compiled size
#[derive(Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TextPattern {
    source: String,
    regex: Regex,
}

impl TextPattern {
    /// Upper bound on the compiled program, keeps adversarial patterns cheap
    const SIZE_LIMIT: usize = 1 << 20;

    /// # Errors
    ///
    /// Returns the regex compiler's message if the pattern is invalid or too large.
    pub fn new(source: impl Into<String>) -> Result<Self, String> {
        let source = source.into();
        let regex = RegexBuilder::new(&source)
            .case_insensitive(true)
            .size_limit(Self::SIZE_LIMIT)
            .dfa_size_limit(Self::SIZE_LIMIT)
            .build()
            .map_err(|e| e.to_string())?;
        Ok(Self { source, regex })
    }

    /// Pattern matching `text` literally, anywhere in the value
    ///
    /// # Errors
    ///
    /// Returns an error only if the escaped literal exceeds the size limit.
    pub fn substring(text: &str) -> Result<Self, String> {
        Self::new(regex::escape(text))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    #[must_use]
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

impl TryFrom<String> for TextPattern {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TextPattern> for String {
    fn from(pattern: TextPattern) -> Self {
        pattern.source
    }
}

impl PartialEq for TextPattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl fmt::Debug for TextPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TextPattern").field(&self.source).finish()
    }
}

/// Boolean expression over document fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Predicate {
    /// Every child matches (an empty list matches everything)
    All(Vec<Predicate>),
    /// At least one child matches
    Any(Vec<Predicate>),
    Compare {
        field: Field,
        op: CompareOp,
        value: Scalar,
    },
    Range {
        field: Field,
        lower: Option<Bound>,
        upper: Option<Bound>,
    },
    Membership {
        field: Field,
        op: SetOp,
        values: Vec<Scalar>,
    },
    Matches {
        field: Field,
        pattern: TextPattern,
    },
    Exists {
        field: Field,
        present: bool,
    },
}

impl Predicate {
    /// Predicate matching every document
    #[must_use]
    pub const fn always() -> Self {
        Self::All(Vec::new())
    }

    #[must_use]
    pub fn equals(field: Field, value: Scalar) -> Self {
        Self::Compare { field, op: CompareOp::Eq, value }
    }

    #[must_use]
    pub fn at_least(field: Field, value: Scalar) -> Self {
        Self::Range {
            field,
            lower: Some(Bound::inclusive(value)),
            upper: None,
        }
    }

    #[must_use]
    pub fn one_of(field: Field, values: Vec<Scalar>) -> Self {
        Self::Membership { field, op: SetOp::In, values }
    }

    /// Combine clauses with AND, unwrapping a single clause
    #[must_use]
    pub fn all_of(mut clauses: Vec<Self>) -> Self {
        if clauses.len() == 1 {
            clauses.remove(0)
        } else {
            Self::All(clauses)
        }
    }

    #[must_use]
    pub fn is_always(&self) -> bool {
        matches!(self, Self::All(children) if children.is_empty())
    }

    /// Nesting depth, counting leaves as depth 1
    #[must_use]
    pub fn depth(&self) -> usize {
        match self {
            Self::All(children) | Self::Any(children) => {
                1 + children.iter().map(Self::depth).max().unwrap_or(0)
            }
            _ => 1,
        }
    }

    /// Total number of nodes in the tree
    #[must_use]
    pub fn node_count(&self) -> usize {
        match self {
            Self::All(children) | Self::Any(children) => {
                1 + children.iter().map(Self::node_count).sum::<usize>()
            }
            _ => 1,
        }
    }

    /// Every field referenced anywhere in the tree
    #[must_use]
    pub fn fields(&self) -> Vec<Field> {
        let mut out = Vec::new();
        self.collect_fields(&mut out);
        out
    }

    fn collect_fields(&self, out: &mut Vec<Field>) {
        match self {
            Self::All(children) | Self::Any(children) => {
                for child in children {
                    child.collect_fields(out);
                }
            }
            Self::Compare { field, .. }
            | Self::Range { field, .. }
            | Self::Membership { field, .. }
            | Self::Matches { field, .. }
            | Self::Exists { field, .. } => {
                if !out.contains(field) {
                    out.push(*field);
                }
            }
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn join(f: &mut fmt::Formatter<'_>, children: &[Predicate], sep: &str) -> fmt::Result {
            write!(f, "(")?;
            for (i, child) in children.iter().enumerate() {
                if i > 0 {
                    write!(f, " {sep} ")?;
                }
                write!(f, "{child}")?;
            }
            write!(f, ")")
        }

        match self {
            Self::All(children) if children.is_empty() => write!(f, "(everything)"),
            Self::All(children) => join(f, children, "AND"),
            Self::Any(children) => join(f, children, "OR"),
            Self::Compare { field, op, value } => {
                let sym = match op {
                    CompareOp::Eq => "=",
                    CompareOp::Ne => "!=",
                };
                write!(f, "{field} {sym} {value}")
            }
            Self::Range { field, lower, upper } => {
                let mut first = true;
                if let Some(b) = lower {
                    let sym = if b.inclusive { ">=" } else { ">" };
                    write!(f, "{field} {sym} {}", b.value)?;
                    first = false;
                }
                if let Some(b) = upper {
                    if !first {
                        write!(f, " AND ")?;
                    }
                    let sym = if b.inclusive { "<=" } else { "<" };
                    write!(f, "{field} {sym} {}", b.value)?;
                }
                Ok(())
            }
            Self::Membership { field, op, values } => {
                let word = match op {
                    SetOp::In => "in",
                    SetOp::NotIn => "not in",
                    SetOp::All => "contains all of",
                };
                let items: Vec<String> = values.iter().map(ToString::to_string).collect();
                write!(f, "{field} {word} [{}]", items.join(", "))
            }
            Self::Matches { field, pattern } => write!(f, "{field} ~ /{}/i", pattern.as_str()),
            Self::Exists { field, present: true } => write!(f, "{field} is set"),
            Self::Exists { field, present: false } => write!(f, "{field} is missing"),
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[serde(rename = "asc")]
    Ascending,
    #[serde(rename = "desc")]
    Descending,
}

/// One sort criterion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortKey {
    pub field: Field,
    pub direction: SortDirection,
}

impl SortKey {
    #[must_use]
    pub const fn asc(field: Field) -> Self {
        Self { field, direction: SortDirection::Ascending }
    }

    #[must_use]
    pub const fn desc(field: Field) -> Self {
        Self { field, direction: SortDirection::Descending }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dir = match self.direction {
            SortDirection::Ascending => "asc",
            SortDirection::Descending => "desc",
        };
        write!(f, "{} {dir}", self.field)
    }
}

/// Validated predicate + sort describing a subset of a user's documents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterSpec {
    pub predicate: Predicate,
    #[serde(default)]
    pub sort: Vec<SortKey>,
    /// Natural-language request this specification was translated from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_text: Option<String>,
}

impl FilterSpec {
    #[must_use]
    pub const fn new(predicate: Predicate, sort: Vec<SortKey>) -> Self {
        Self {
            predicate,
            sort,
            source_text: None,
        }
    }

    #[must_use]
    pub fn with_source_text(mut self, text: impl Into<String>) -> Self {
        self.source_text = Some(text.into());
        self
    }

    /// Same predicate and sort, ignoring the source text
    #[must_use]
    pub fn same_query(&self, other: &Self) -> bool {
        self.predicate == other.predicate && self.sort == other.sort
    }
}

impl fmt::Display for FilterSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.predicate)?;
        if !self.sort.is_empty() {
            let keys: Vec<String> = self.sort.iter().map(ToString::to_string).collect();
            write!(f, "; sort by {}", keys.join(", "))?;
        }
        Ok(())
    }
}
