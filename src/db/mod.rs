//! Database wrapper module for litgroups
//!
//! Provides owner-scoped storage for documents and custom groups using sled as
//! the embedded database backend.
//!
//! Uses two sled trees, both keyed by `owner \0 id`:
//! - `documents`: the user's literature records
//! - `groups`: persisted custom groups
//!
//! Values are JSON-encoded. Every read path goes through an owner prefix, so
//! a record belonging to one user cannot be returned for another.

use crate::document::Document;
use crate::executor::{DocumentStore, ScopedQuery};
use crate::groups::types::CustomGroup;
use crate::query::compare_documents;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use sled::{Db, Tree};
use std::path::Path;

pub mod error;
pub mod types;

pub use error::DbError;
pub use types::{DocumentId, GroupId, OwnerId, RecordKey};

/// A value stored under an owner-prefixed key
pub trait Record: Serialize + DeserializeOwned {
    fn owner(&self) -> &OwnerId;

    /// Identifier part of the storage key
    fn record_id(&self) -> String;

    /// Checks run before the record is written
    ///
    /// # Errors
    ///
    /// Returns a description of the violated rule.
    fn check(&self) -> Result<(), String> {
        Ok(())
    }
}

impl Record for Document {
    fn owner(&self) -> &OwnerId {
        &self.owner
    }

    fn record_id(&self) -> String {
        self.id.to_string()
    }

    fn check(&self) -> Result<(), String> {
        self.validate()
    }
}

/// Database wrapper that encapsulates all database operations
pub struct Database {
    db: Db,
    documents: Tree,
    groups: Tree,
}

impl Database {
    /// Opens or creates a database at the specified path
    ///
    /// # Examples
    /// ```no_run
    /// use litgroups::db::Database;
    /// let db = Database::open("my_db").unwrap();
    /// ```
    ///
    /// # Errors
    ///
    /// Returns `DbError` if the database cannot be opened or if the internal trees cannot be created.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, DbError> {
        let db = sled::open(path)?;
        let documents = db.open_tree("documents")?;
        let groups = db.open_tree("groups")?;
        Ok(Self { db, documents, groups })
    }

    /// Insert or replace a document
    ///
    /// # Errors
    ///
    /// Returns `DbError::InvalidRecord` if the document fails validation, or
    /// `DbError` if encoding or the write fails.
    pub fn insert_document(&self, doc: &Document) -> Result<(), DbError> {
        put(&self.documents, doc)
    }

    /// Get one of `owner`'s documents
    ///
    /// # Errors
    ///
    /// Returns `DbError` if the read or decoding fails.
    pub fn get_document(&self, owner: &OwnerId, id: DocumentId) -> Result<Option<Document>, DbError> {
        get(&self.documents, owner, &id.to_string())
    }

    /// Remove one of `owner`'s documents, returning whether it existed
    ///
    /// # Errors
    ///
    /// Returns `DbError` if the write fails.
    pub fn remove_document(&self, owner: &OwnerId, id: DocumentId) -> Result<bool, DbError> {
        let key = RecordKey::new(owner, &id.to_string());
        Ok(self.documents.remove(key)?.is_some())
    }

    /// All of `owner`'s documents in storage order
    ///
    /// # Errors
    ///
    /// Returns `DbError` if iteration or decoding fails.
    pub fn list_documents(&self, owner: &OwnerId) -> Result<Vec<Document>, DbError> {
        scan(&self.documents, owner).collect()
    }

    /// Insert or replace a custom group
    ///
    /// # Errors
    ///
    /// Returns `DbError` if encoding or the write fails.
    pub fn insert_group(&self, group: &CustomGroup) -> Result<(), DbError> {
        put(&self.groups, group)
    }

    /// Get one of `owner`'s groups
    ///
    /// # Errors
    ///
    /// Returns `DbError` if the read or decoding fails.
    pub fn get_group(&self, owner: &OwnerId, id: GroupId) -> Result<Option<CustomGroup>, DbError> {
        get(&self.groups, owner, &id.to_string())
    }

    /// Remove one of `owner`'s groups, returning the removed record
    ///
    /// # Errors
    ///
    /// Returns `DbError` if the write or decoding fails.
    pub fn remove_group(&self, owner: &OwnerId, id: GroupId) -> Result<Option<CustomGroup>, DbError> {
        let key = RecordKey::new(owner, &id.to_string());
        self.groups
            .remove(key)?
            .map(|value| serde_json::from_slice(&value).map_err(|e| DbError::decode(&e)))
            .transpose()
    }

    /// All of `owner`'s groups in storage order
    ///
    /// # Errors
    ///
    /// Returns `DbError` if iteration or decoding fails.
    pub fn list_groups(&self, owner: &OwnerId) -> Result<Vec<CustomGroup>, DbError> {
        scan(&self.groups, owner).collect()
    }

    /// Store a freshly computed member count on a group
    ///
    /// Returns `false` if the group no longer exists. The update is atomic with
    /// respect to concurrent writers of the same key.
    ///
    /// # Errors
    ///
    /// Returns `DbError` if the read-modify-write fails.
    pub fn refresh_group_count(
        &self,
        owner: &OwnerId,
        id: GroupId,
        count: usize,
        at: DateTime<Utc>,
    ) -> Result<bool, DbError> {
        let key = RecordKey::new(owner, &id.to_string());
        let mut failure = None;
        let updated = self.groups.update_and_fetch(key, |old| {
            let old = old?;
            let mut group: CustomGroup = match serde_json::from_slice(old) {
                Ok(group) => group,
                Err(e) => {
                    failure = Some(DbError::decode(&e));
                    return Some(old.to_vec());
                }
            };
            group.document_count = count;
            group.last_recomputed = Some(at);
            match serde_json::to_vec(&group) {
                Ok(bytes) => Some(bytes),
                Err(e) => {
                    failure = Some(DbError::encode(&e));
                    Some(old.to_vec())
                }
            }
        })?;
        match failure {
            Some(err) => Err(err),
            None => Ok(updated.is_some()),
        }
    }

    /// Total number of stored documents across all owners
    #[must_use]
    pub fn count(&self) -> usize {
        self.documents.len()
    }

    /// Flush all pending writes to disk
    ///
    /// # Errors
    ///
    /// Returns `DbError` if the flush operation fails.
    pub fn flush(&self) -> Result<(), DbError> {
        self.db.flush()?;
        Ok(())
    }

    /// Clear all documents and groups
    ///
    /// # Warning
    /// This operation is irreversible!
    ///
    /// # Errors
    ///
    /// Returns `DbError` if clearing either tree fails.
    pub fn clear(&self) -> Result<(), DbError> {
        self.documents.clear()?;
        self.groups.clear()?;
        Ok(())
    }

    fn matching<'q>(
        &'q self,
        query: &'q ScopedQuery<'q>,
    ) -> impl Iterator<Item = Result<Document, DbError>> + 'q {
        scan::<Document>(&self.documents, query.owner()).filter(move |doc| match doc {
            Ok(doc) => query.admits(doc),
            Err(_) => true,
        })
    }
}

impl DocumentStore for Database {
    fn find(&self, query: &ScopedQuery<'_>) -> Result<Vec<Document>, DbError> {
        let mut docs = self.matching(query).collect::<Result<Vec<_>, _>>()?;
        docs.sort_by(|a, b| compare_documents(a, b, query.sort()));
        Ok(docs.into_iter().skip(query.skip()).take(query.limit()).collect())
    }

    fn count(&self, query: &ScopedQuery<'_>) -> Result<usize, DbError> {
        let mut total = 0;
        for doc in self.matching(query) {
            doc?;
            total += 1;
        }
        Ok(total)
    }
}

impl Drop for Database {
    fn drop(&mut self) {
        // Best-effort flush; callers needing durability call flush()
        let _ = self.db.flush();
    }
}

fn put<T: Record>(tree: &Tree, record: &T) -> Result<(), DbError> {
    record.check().map_err(DbError::InvalidRecord)?;
    let key = RecordKey::new(record.owner(), &record.record_id());
    let value = serde_json::to_vec(record).map_err(|e| DbError::encode(&e))?;
    tree.insert(key, value)?;
    Ok(())
}

fn get<T: Record>(tree: &Tree, owner: &OwnerId, id: &str) -> Result<Option<T>, DbError> {
    let key = RecordKey::new(owner, id);
    match tree.get(key)? {
        Some(value) => decode_owned(&value, owner).map(Some),
        None => Ok(None),
    }
}

fn scan<'t, T: Record + 't>(
    tree: &'t Tree,
    owner: &'t OwnerId,
) -> impl Iterator<Item = Result<T, DbError>> + 't {
    tree.scan_prefix(RecordKey::owner_prefix(owner))
        .map(move |entry| decode_owned(&entry?.1, owner))
}

/// Decode a value read under `owner`'s prefix and confirm it really is theirs
fn decode_owned<T: Record>(value: &[u8], owner: &OwnerId) -> Result<T, DbError> {
    let record: T = serde_json::from_slice(value).map_err(|e| DbError::decode(&e))?;
    if record.owner() != owner {
        tracing::warn!(
            record = %record.record_id(),
            "record stored under a foreign owner prefix"
        );
        return Err(DbError::OwnerMismatch(record.record_id()));
    }
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::{Executor, Page};
    use crate::query::{Field, FilterSpec, Predicate, Scalar};
    use tempfile::TempDir;

    fn open() -> (TempDir, Database) {
        let dir = TempDir::new().unwrap();
        let db = Database::open(dir.path().join("db")).unwrap();
        (dir, db)
    }

    fn owner(name: &str) -> OwnerId {
        OwnerId::new(name).unwrap()
    }

    #[test]
    fn test_insert_and_get_document() {
        let (_dir, db) = open();
        let doc = Document::new(owner("alice"), "Attention Is All You Need");
        db.insert_document(&doc).unwrap();

        assert_eq!(db.get_document(&owner("alice"), doc.id).unwrap(), Some(doc.clone()));
        assert_eq!(db.get_document(&owner("bob"), doc.id).unwrap(), None);
        assert_eq!(db.count(), 1);
    }

    #[test]
    fn test_invalid_document_is_not_written() {
        let (_dir, db) = open();
        let mut doc = Document::new(owner("alice"), "Paper");
        doc.rating = 9;
        assert!(matches!(db.insert_document(&doc), Err(DbError::InvalidRecord(_))));
        assert_eq!(db.count(), 0);
    }

    #[test]
    fn test_list_is_owner_scoped() {
        let (_dir, db) = open();
        for i in 0..3 {
            db.insert_document(&Document::new(owner("alice"), format!("A{i}"))).unwrap();
        }
        db.insert_document(&Document::new(owner("alicia"), "B")).unwrap();

        assert_eq!(db.list_documents(&owner("alice")).unwrap().len(), 3);
        assert_eq!(db.list_documents(&owner("alicia")).unwrap().len(), 1);
        assert!(db.list_documents(&owner("al")).unwrap().is_empty());
    }

    #[test]
    fn test_remove_document() {
        let (_dir, db) = open();
        let doc = Document::new(owner("alice"), "Paper");
        db.insert_document(&doc).unwrap();

        assert!(!db.remove_document(&owner("bob"), doc.id).unwrap());
        assert!(db.remove_document(&owner("alice"), doc.id).unwrap());
        assert!(!db.remove_document(&owner("alice"), doc.id).unwrap());
    }

    #[test]
    fn test_foreign_record_under_prefix_is_reported() {
        let (_dir, db) = open();
        let doc = Document::new(owner("mallory"), "Planted");
        let key = RecordKey::new(&owner("alice"), &doc.id.to_string());
        db.documents
            .insert(key, serde_json::to_vec(&doc).unwrap())
            .unwrap();

        assert!(matches!(
            db.list_documents(&owner("alice")),
            Err(DbError::OwnerMismatch(_))
        ));
    }

    #[test]
    fn test_store_find_applies_owner_and_predicate() {
        let (_dir, db) = open();
        let mut fav = Document::new(owner("alice"), "Fav");
        fav.is_favorite = true;
        let mut other_fav = Document::new(owner("bob"), "Bob fav");
        other_fav.is_favorite = true;
        db.insert_document(&fav).unwrap();
        db.insert_document(&other_fav).unwrap();
        db.insert_document(&Document::new(owner("alice"), "Plain")).unwrap();

        let spec = FilterSpec::new(
            Predicate::equals(Field::IsFavorite, Scalar::Bool(true)),
            Vec::new(),
        );
        let page = Executor::new(&db, 100)
            .execute(&spec, &owner("alice"), Page::default())
            .unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].id, fav.id);
    }

    #[test]
    fn test_reopen_existing_database() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("db");
        let doc = Document::new(owner("alice"), "Persistent");
        {
            let db = Database::open(&path).unwrap();
            db.insert_document(&doc).unwrap();
            db.flush().unwrap();
        }
        let db = Database::open(&path).unwrap();
        assert_eq!(db.list_documents(&owner("alice")).unwrap(), vec![doc]);
    }

    #[test]
    fn test_clear() {
        let (_dir, db) = open();
        db.insert_document(&Document::new(owner("alice"), "Paper")).unwrap();
        db.clear().unwrap();
        assert_eq!(db.count(), 0);
    }
}
