//! Testing utilities for litgroups
//!
//! This module provides helper types and functions for writing tests:
//! a `TestDb` wrapper for temporary database management, document seeding
//! helpers, and a `ScriptedGenerator` standing in for the text generation model.
//!
//! Only available when compiled with `cfg(test)`.

use crate::db::{Database, OwnerId};
use crate::document::Document;
use crate::translate::{GenerationError, TextGenerator};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// Wrapper for a temporary test database that cleans up on drop
///
/// The database lives inside a `TempDir`, which removes the directory when the
/// wrapper goes out of scope.
pub struct TestDb {
    db: Database,
    _dir: TempDir,
}

impl TestDb {
    /// Create an empty database in a fresh temporary directory
    ///
    /// # Panics
    /// Panics if the directory or database cannot be created.
    #[must_use]
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let db = Database::open(dir.path().join("db")).expect("Failed to open test database");
        Self { db, _dir: dir }
    }

    /// Get a reference to the underlying database
    #[must_use]
    pub const fn db(&self) -> &Database {
        &self.db
    }

    /// Insert documents, panicking on failure
    pub fn seed(&self, docs: &[Document]) {
        for doc in docs {
            self.db.insert_document(doc).expect("Failed to seed document");
        }
    }
}

impl Default for TestDb {
    fn default() -> Self {
        Self::new()
    }
}

/// Shorthand for a valid owner id
///
/// # Panics
/// Panics if `name` is not a valid owner id.
#[must_use]
pub fn owner(name: &str) -> OwnerId {
    OwnerId::new(name).expect("valid owner id")
}

/// Build a document for `owner` with the given title, then let `f` adjust it
pub fn doc(owner: &OwnerId, title: &str, f: impl FnOnce(&mut Document)) -> Document {
    let mut doc = Document::new(owner.clone(), title);
    f(&mut doc);
    doc
}

#[derive(Default)]
struct Script {
    responses: Vec<Result<String, GenerationError>>,
    prompts: Vec<String>,
}

/// Text generator that replays canned responses and records prompts
///
/// Clones share the same script, so a test can keep a handle to inspect calls
/// after moving the generator into a translator. Once the script runs out, the
/// last response is repeated.
#[derive(Clone, Default)]
pub struct ScriptedGenerator {
    script: Arc<Mutex<Script>>,
}

impl ScriptedGenerator {
    #[must_use]
    pub fn new(responses: Vec<Result<String, GenerationError>>) -> Self {
        Self {
            script: Arc::new(Mutex::new(Script {
                responses,
                prompts: Vec::new(),
            })),
        }
    }

    /// Always answer with `text`
    #[must_use]
    pub fn reply(text: &str) -> Self {
        Self::new(vec![Ok(text.to_string())])
    }

    /// Always fail with `err`
    #[must_use]
    pub fn failing(err: GenerationError) -> Self {
        Self::new(vec![Err(err)])
    }

    /// Number of generation calls made so far
    ///
    /// # Panics
    /// Panics if the script mutex is poisoned.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.script.lock().expect("script lock").prompts.len()
    }

    /// Prompts received so far
    ///
    /// # Panics
    /// Panics if the script mutex is poisoned.
    #[must_use]
    pub fn prompts(&self) -> Vec<String> {
        self.script.lock().expect("script lock").prompts.clone()
    }
}

impl TextGenerator for ScriptedGenerator {
    fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let mut script = self.script.lock().expect("script lock");
        let index = script.prompts.len();
        script.prompts.push(prompt.to_string());
        match script.responses.get(index).or_else(|| script.responses.last()) {
            Some(response) => response.clone(),
            None => Err(GenerationError::Unavailable("no scripted response".into())),
        }
    }
}
