//! Smart groups
//!
//! A smart group is a named filter specification. Its members are never
//! stored; they are computed against the owner's library each time the group
//! is opened. There are two kinds:
//!
//! - presets, defined in code and shared by every user ([`presets::PRESETS`])
//! - custom groups, created by a user from an explicit filter or a
//!   natural-language request and persisted per owner
//!
//! [`GroupManager`] is the entry point for everything that resolves, counts
//! or changes groups.

pub mod error;
pub mod operations;
pub mod presets;
pub mod types;

pub use error::GroupError;
pub use operations::{GroupManager, Preview};
pub use presets::{PRESETS, Preset};
pub use types::{
    CustomGroup, GroupCategory, GroupDraft, GroupUpdate, PresetSummary, ResolvedGroup,
};
