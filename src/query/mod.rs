//! Filter specifications: the closed query language smart groups are stored in
//!
//! A [`FilterSpec`] is produced in one of three ways: statically by a preset,
//! from a JSON payload supplied by the user, or from the JSON a text
//! generation model returns. The last two go through
//! [`FilterSpec::from_json`], which rejects anything outside the whitelisted
//! fields and operators.
//!
//! # Examples
//!
//! ```
//! use litgroups::query::{FilterSpec, Limits};
//! use serde_json::json;
//!
//! let spec = FilterSpec::from_json(
//!     &json!({"filter": {"year": {"$gte": 2020}}, "sort": {"year": -1}}),
//!     &Limits::default(),
//! )
//! .unwrap();
//! assert_eq!(spec.to_string(), "year >= 2020; sort by year desc");
//!
//! let rejected = FilterSpec::from_json(&json!({"filter": {"userId": "bob"}}), &Limits::default());
//! assert!(rejected.is_err());
//! ```

pub mod error;
pub mod eval;
pub mod types;
pub mod validate;

pub use error::FilterError;
pub use eval::compare_documents;
pub use types::{
    Bound, CompareOp, Field, FieldKind, FilterSpec, Predicate, Scalar, SetOp, SortDirection,
    SortKey, TextPattern,
};
pub use validate::{Limits, parse_sort, parse_timestamp};
