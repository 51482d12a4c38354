//! Type wrappers for database keys and identifiers
//!
//! Every record in the store lives under a key of the form `owner \0 id`.
//! Scoping a lookup to an owner is therefore a matter of building the key from
//! an [`OwnerId`]; there is no code path that reads a record by id alone.
//!
//! # Types
//!
//! - **`OwnerId`**: Authenticated identity of the requesting user
//! - **`DocumentId`** / **`GroupId`**: UUID identifiers for documents and custom groups
//! - **`RecordKey`**: Owner-prefixed storage key
//!
//! # Examples
//!
//! ```
//! use litgroups::db::types::{GroupId, OwnerId, RecordKey};
//!
//! let owner = OwnerId::new("alice").unwrap();
//! let id = GroupId::new_v4();
//! let key = RecordKey::new(&owner, &id.to_string());
//! assert!(key.as_bytes().starts_with(&RecordKey::owner_prefix(&owner)));
//! ```

use super::error::DbError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

const KEY_SEPARATOR: u8 = 0;
const MAX_OWNER_LEN: usize = 128;

/// Identity of the user a request is made on behalf of
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OwnerId(String);

impl OwnerId {
    /// # Errors
    ///
    /// Returns `DbError::InvalidKey` if the identity is empty, too long, or
    /// contains the key separator byte.
    pub fn new(id: impl Into<String>) -> Result<Self, DbError> {
        let id = id.into();
        let trimmed = id.trim();
        if trimmed.is_empty() {
            return Err(DbError::InvalidKey("owner id cannot be empty".into()));
        }
        if trimmed.len() > MAX_OWNER_LEN {
            return Err(DbError::InvalidKey(format!(
                "owner id too long (max {MAX_OWNER_LEN} bytes)"
            )));
        }
        if trimmed.bytes().any(|b| b == KEY_SEPARATOR) {
            return Err(DbError::InvalidKey("owner id contains a NUL byte".into()));
        }
        Ok(Self(trimmed.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for OwnerId {
    type Error = DbError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<OwnerId> for String {
    fn from(owner: OwnerId) -> Self {
        owner.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            #[must_use]
            pub fn new_v4() -> Self {
                Self(Uuid::new_v4())
            }

            #[must_use]
            pub const fn from_uuid(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl FromStr for $name {
            type Err = DbError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s.trim())
                    .map(Self)
                    .map_err(|e| DbError::InvalidKey(format!("'{s}': {e}")))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

uuid_id!(
    /// Identifier of a stored document
    DocumentId
);

uuid_id!(
    /// Identifier of a custom group
    GroupId
);

/// Owner-prefixed storage key (`owner \0 id`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordKey(Vec<u8>);

impl RecordKey {
    #[must_use]
    pub fn new(owner: &OwnerId, id: &str) -> Self {
        let mut key = Self::owner_prefix(owner);
        key.extend_from_slice(id.as_bytes());
        Self(key)
    }

    /// Prefix shared by every key belonging to `owner`
    #[must_use]
    pub fn owner_prefix(owner: &OwnerId) -> Vec<u8> {
        let mut prefix = Vec::with_capacity(owner.as_str().len() + 1);
        prefix.extend_from_slice(owner.as_str().as_bytes());
        prefix.push(KEY_SEPARATOR);
        prefix
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl AsRef<[u8]> for RecordKey {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

#[cfg(test)]
#[path = "types_tests.rs"]
mod types_tests;
