//! In-process evaluation of predicates and sort keys against documents

use super::types::{
    Bound, CompareOp, Field, Predicate, Scalar, SetOp, SortDirection, SortKey, TextPattern,
};
use crate::document::{Document, ReadStatus};
use chrono::{DateTime, Utc};
use std::cmp::Ordering;

/// Borrowed view of one document field
#[derive(Debug, Clone, Copy)]
enum FieldValue<'a> {
    Text(Option<&'a str>),
    List(&'a [String]),
    Number(Option<f64>),
    Status(ReadStatus),
    Bool(bool),
    Timestamp(DateTime<Utc>),
}

impl<'a> FieldValue<'a> {
    fn of(doc: &'a Document, field: Field) -> Self {
        match field {
            Field::Title => Self::Text(Some(doc.title.as_str())),
            Field::Journal => Self::Text(doc.journal.as_deref()),
            Field::Authors => Self::List(&doc.authors),
            Field::Keywords => Self::List(&doc.keywords),
            Field::Tags => Self::List(&doc.tags),
            Field::Year => Self::Number(doc.year.map(f64::from)),
            Field::Rating => Self::Number(Some(f64::from(doc.rating))),
            Field::Status => Self::Status(doc.status),
            Field::IsFavorite => Self::Bool(doc.is_favorite),
            Field::CreatedAt => Self::Timestamp(doc.created_at),
            Field::UpdatedAt => Self::Timestamp(doc.updated_at),
        }
    }

    fn is_present(self) -> bool {
        match self {
            Self::Text(text) => text.is_some_and(|s| !s.is_empty()),
            Self::List(items) => !items.is_empty(),
            Self::Number(n) => n.is_some(),
            Self::Status(_) | Self::Bool(_) | Self::Timestamp(_) => true,
        }
    }

    /// Equality; a list field equals a value when any element does
    fn equals(self, scalar: &Scalar) -> bool {
        match (self, scalar) {
            (Self::Text(Some(s)), Scalar::Text(v)) => s == v.as_str(),
            (Self::List(items), Scalar::Text(v)) => items.iter().any(|item| item == v),
            (Self::Number(Some(n)), Scalar::Number(v)) => n == *v,
            (Self::Status(s), Scalar::Status(v)) => s == *v,
            (Self::Bool(b), Scalar::Bool(v)) => b == *v,
            (Self::Timestamp(t), Scalar::Timestamp(v)) => t == *v,
            _ => false,
        }
    }

    fn order(self, scalar: &Scalar) -> Option<Ordering> {
        match (self, scalar) {
            (Self::Number(Some(n)), Scalar::Number(v)) => n.partial_cmp(v),
            (Self::Timestamp(t), Scalar::Timestamp(v)) => Some(t.cmp(v)),
            _ => None,
        }
    }

    fn matches(self, pattern: &TextPattern) -> bool {
        match self {
            Self::Text(Some(s)) => pattern.is_match(s),
            Self::List(items) => items.iter().any(|item| pattern.is_match(item)),
            _ => false,
        }
    }
}

fn above(value: FieldValue<'_>, bound: &Bound) -> bool {
    match value.order(&bound.value) {
        Some(Ordering::Greater) => true,
        Some(Ordering::Equal) => bound.inclusive,
        _ => false,
    }
}

fn below(value: FieldValue<'_>, bound: &Bound) -> bool {
    match value.order(&bound.value) {
        Some(Ordering::Less) => true,
        Some(Ordering::Equal) => bound.inclusive,
        _ => false,
    }
}

impl Predicate {
    /// Evaluate against one document
    ///
    /// Missing values never satisfy a comparison, range or pattern; they do
    /// satisfy `$ne` and `$nin`.
    #[must_use]
    pub fn matches(&self, doc: &Document) -> bool {
        match self {
            Self::All(children) => children.iter().all(|c| c.matches(doc)),
            Self::Any(children) => children.iter().any(|c| c.matches(doc)),
            Self::Compare { field, op, value } => {
                let hit = FieldValue::of(doc, *field).equals(value);
                match op {
                    CompareOp::Eq => hit,
                    CompareOp::Ne => !hit,
                }
            }
            Self::Range { field, lower, upper } => {
                let value = FieldValue::of(doc, *field);
                lower.as_ref().is_none_or(|b| above(value, b))
                    && upper.as_ref().is_none_or(|b| below(value, b))
            }
            Self::Membership { field, op, values } => {
                let value = FieldValue::of(doc, *field);
                match op {
                    SetOp::In => values.iter().any(|v| value.equals(v)),
                    SetOp::NotIn => !values.iter().any(|v| value.equals(v)),
                    SetOp::All => values.iter().all(|v| value.equals(v)),
                }
            }
            Self::Matches { field, pattern } => FieldValue::of(doc, *field).matches(pattern),
            Self::Exists { field, present } => FieldValue::of(doc, *field).is_present() == *present,
        }
    }
}

fn lowered(text: Option<&str>) -> Option<String> {
    text.map(str::to_lowercase)
}

/// Ascending order of two values of the same field; absent values sort first
fn compare_values(a: FieldValue<'_>, b: FieldValue<'_>) -> Ordering {
    match (a, b) {
        (FieldValue::Text(x), FieldValue::Text(y)) => lowered(x).cmp(&lowered(y)),
        (FieldValue::List(x), FieldValue::List(y)) => {
            lowered(x.first().map(String::as_str)).cmp(&lowered(y.first().map(String::as_str)))
        }
        (FieldValue::Number(x), FieldValue::Number(y)) => match (x, y) {
            (Some(x), Some(y)) => x.total_cmp(&y),
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        },
        (FieldValue::Status(x), FieldValue::Status(y)) => x.cmp(&y),
        (FieldValue::Bool(x), FieldValue::Bool(y)) => x.cmp(&y),
        (FieldValue::Timestamp(x), FieldValue::Timestamp(y)) => x.cmp(&y),
        _ => Ordering::Equal,
    }
}

/// Total order over documents for the given sort keys
///
/// Ties after the last key fall back to newest `createdAt` first, then to the
/// document id, so repeated executions page identically.
#[must_use]
pub fn compare_documents(a: &Document, b: &Document, keys: &[SortKey]) -> Ordering {
    for key in keys {
        let ord = compare_values(FieldValue::of(a, key.field), FieldValue::of(b, key.field));
        let ord = match key.direction {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    b.created_at
        .cmp(&a.created_at)
        .then_with(|| a.id.cmp(&b.id))
}
