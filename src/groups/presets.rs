//! Built-in smart groups
//!
//! Presets are code-defined and never persisted. Their specifications are
//! rebuilt on every resolution so relative dates ("this month", "the last
//! five years") track the clock.

use crate::document::ReadStatus;
use crate::query::{Field, FilterSpec, Predicate, Scalar, SortKey};
use chrono::{DateTime, Datelike, Local, TimeZone, Utc};

/// A built-in group definition
pub struct Preset {
    pub key: &'static str,
    pub name: &'static str,
    pub icon: &'static str,
    pub color: &'static str,
    build: fn(DateTime<Local>) -> FilterSpec,
}

impl Preset {
    /// Specification as of now
    #[must_use]
    pub fn spec(&self) -> FilterSpec {
        self.spec_at(Local::now())
    }

    /// Specification as of `now`
    #[must_use]
    pub fn spec_at(&self, now: DateTime<Local>) -> FilterSpec {
        (self.build)(now)
    }
}

impl std::fmt::Debug for Preset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Preset").field("key", &self.key).finish_non_exhaustive()
    }
}

fn status(value: ReadStatus) -> Scalar {
    Scalar::Status(value)
}

fn recent_high_impact(now: DateTime<Local>) -> FilterSpec {
    FilterSpec::new(
        Predicate::at_least(Field::Year, Scalar::Number(f64::from(now.year() - 5))),
        vec![SortKey::desc(Field::Year), SortKey::desc(Field::Rating)],
    )
}

fn unread(_: DateTime<Local>) -> FilterSpec {
    FilterSpec::new(
        Predicate::equals(Field::Status, status(ReadStatus::Unread)),
        vec![SortKey::desc(Field::CreatedAt)],
    )
}

fn this_month(now: DateTime<Local>) -> FilterSpec {
    let start = Local
        .with_ymd_and_hms(now.year(), now.month(), 1, 0, 0, 0)
        .earliest()
        .map_or(now.with_timezone(&Utc), |ts| ts.with_timezone(&Utc));
    FilterSpec::new(
        Predicate::at_least(Field::CreatedAt, Scalar::Timestamp(start)),
        vec![SortKey::desc(Field::CreatedAt)],
    )
}

fn favorites(_: DateTime<Local>) -> FilterSpec {
    FilterSpec::new(
        Predicate::equals(Field::IsFavorite, Scalar::Bool(true)),
        vec![SortKey::desc(Field::UpdatedAt)],
    )
}

fn important(_: DateTime<Local>) -> FilterSpec {
    FilterSpec::new(
        Predicate::equals(Field::Status, status(ReadStatus::Important)),
        vec![SortKey::desc(Field::UpdatedAt)],
    )
}

fn recent_read(_: DateTime<Local>) -> FilterSpec {
    FilterSpec::new(
        Predicate::one_of(
            Field::Status,
            vec![status(ReadStatus::Read), status(ReadStatus::Important)],
        ),
        vec![SortKey::desc(Field::UpdatedAt)],
    )
}

/// The preset catalog, in display order
pub static PRESETS: [Preset; 6] = [
    Preset {
        key: "recent-high-impact",
        name: "Recent high impact",
        icon: "fire",
        color: "#ff6b6b",
        build: recent_high_impact,
    },
    Preset {
        key: "unread",
        name: "Unread",
        icon: "book",
        color: "#4ecdc4",
        build: unread,
    },
    Preset {
        key: "this-month",
        name: "Added this month",
        icon: "calendar",
        color: "#45b7d1",
        build: this_month,
    },
    Preset {
        key: "favorites",
        name: "Favorites",
        icon: "heart",
        color: "#f7b731",
        build: favorites,
    },
    Preset {
        key: "important",
        name: "Important",
        icon: "star",
        color: "#eb3b5a",
        build: important,
    },
    Preset {
        key: "recent-read",
        name: "Recently read",
        icon: "eye",
        color: "#8854d0",
        build: recent_read,
    },
];

/// Look up a preset by key
#[must_use]
pub fn find(key: &str) -> Option<&'static Preset> {
    PRESETS.iter().find(|p| p.key == key)
}
