//! Docs command - import and list documents

use crate::cli::DocsCommands;
use crate::db::{Database, OwnerId};
use crate::document::{Document, DocumentImport};
use crate::{LitError, output};
use std::fs;
use std::path::Path;

type Result<T> = std::result::Result<T, LitError>;

/// Execute a document command
///
/// # Errors
/// Returns an error if the file cannot be read or parsed, or storage fails
pub fn execute(db: &Database, owner: &OwnerId, command: &DocsCommands, quiet: bool) -> Result<()> {
    match command {
        DocsCommands::Import { file } => {
            let imported = import_file(db, owner, file)?;
            if quiet {
                println!("{imported}");
            } else {
                println!("Imported {imported} document(s) for {owner}");
            }
            Ok(())
        }
        DocsCommands::List { limit } => list_documents(db, owner, *limit, quiet),
    }
}

/// Read a JSON array of documents and store them under `owner`
///
/// Every entry is validated before anything is written.
///
/// # Errors
/// Returns an error if the file is unreadable, not a JSON array of documents,
/// or an entry violates document rules.
pub fn import_file(db: &Database, owner: &OwnerId, path: &Path) -> Result<usize> {
    let text = fs::read_to_string(path)?;
    let entries: Vec<DocumentImport> = serde_json::from_str(&text)?;
    let docs: Vec<Document> = entries
        .into_iter()
        .map(|entry| entry.into_document(owner.clone()))
        .collect();

    for (index, doc) in docs.iter().enumerate() {
        doc.validate()
            .map_err(|reason| LitError::InvalidInput(format!("entry {index}: {reason}")))?;
    }
    for doc in &docs {
        db.insert_document(doc)?;
    }
    db.flush()?;

    tracing::info!(owner = %owner, count = docs.len(), "imported documents");
    Ok(docs.len())
}

fn list_documents(db: &Database, owner: &OwnerId, limit: usize, quiet: bool) -> Result<()> {
    let mut docs = db.list_documents(owner)?;
    if docs.is_empty() {
        if !quiet {
            println!("No documents. Import some with: litgroups docs import <file.json>");
        }
        return Ok(());
    }
    docs.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    let total = docs.len();
    for doc in docs.iter().take(limit) {
        println!("{}", output::document_line(doc, quiet));
    }
    if !quiet && total > limit {
        println!("... and {} more", total - limit);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{TestDb, owner};
    use tempfile::TempDir;

    #[test]
    fn test_import_file() {
        let test_db = TestDb::new();
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("docs.json");
        fs::write(
            &path,
            r#"[
                {"title": "Attention Is All You Need", "year": 2017, "keywords": ["transformer"]},
                {"title": "深度学习综述", "year": 2021, "status": "已读", "isFavorite": true}
            ]"#,
        )
        .unwrap();

        let alice = owner("alice");
        assert_eq!(import_file(test_db.db(), &alice, &path).unwrap(), 2);
        let docs = test_db.db().list_documents(&alice).unwrap();
        assert_eq!(docs.len(), 2);
        assert!(docs.iter().all(|d| d.owner == alice));
        assert!(test_db.db().list_documents(&owner("bob")).unwrap().is_empty());
    }

    #[test]
    fn test_import_rejects_invalid_entry_atomically() {
        let test_db = TestDb::new();
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("docs.json");
        fs::write(&path, r#"[{"title": "Fine"}, {"title": "Bad", "rating": 9}]"#).unwrap();

        let alice = owner("alice");
        let err = import_file(test_db.db(), &alice, &path).unwrap_err();
        assert!(matches!(err, LitError::InvalidInput(msg) if msg.starts_with("entry 1")));
        assert!(test_db.db().list_documents(&alice).unwrap().is_empty());
    }

    #[test]
    fn test_import_rejects_non_array() {
        let test_db = TestDb::new();
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("docs.json");
        fs::write(&path, r#"{"title": "Not a list"}"#).unwrap();
        assert!(matches!(
            import_file(test_db.db(), &owner("alice"), &path),
            Err(LitError::JsonError(_))
        ));
    }
}
