//! Owner-scoped execution of filter specifications
//!
//! The executor is the only place a [`ScopedQuery`] can be built, and it
//! always builds one from the requesting owner plus the group's predicate.
//! Stores never see an unscoped predicate.

use crate::db::{DbError, OwnerId};
use crate::document::Document;
use crate::query::{Field, FilterSpec, Predicate, SortKey};
use serde::Serialize;

/// Sort applied when a specification does not name one
const DEFAULT_SORT: [SortKey; 1] = [SortKey::desc(Field::CreatedAt)];

/// Document store query capability
pub trait DocumentStore {
    /// Matching documents, sorted, after skipping and limiting
    ///
    /// # Errors
    ///
    /// Returns `DbError` if the store cannot be read.
    fn find(&self, query: &ScopedQuery<'_>) -> Result<Vec<Document>, DbError>;

    /// Number of matching documents
    ///
    /// # Errors
    ///
    /// Returns `DbError` if the store cannot be read.
    fn count(&self, query: &ScopedQuery<'_>) -> Result<usize, DbError>;
}

/// A predicate bound to the owner it runs for
#[derive(Debug, Clone, Copy)]
pub struct ScopedQuery<'a> {
    owner: &'a OwnerId,
    predicate: &'a Predicate,
    sort: &'a [SortKey],
    skip: usize,
    limit: usize,
}

impl<'a> ScopedQuery<'a> {
    pub(crate) const fn new(
        owner: &'a OwnerId,
        predicate: &'a Predicate,
        sort: &'a [SortKey],
        skip: usize,
        limit: usize,
    ) -> Self {
        Self { owner, predicate, sort, skip, limit }
    }

    #[must_use]
    pub const fn owner(&self) -> &'a OwnerId {
        self.owner
    }

    #[must_use]
    pub const fn predicate(&self) -> &'a Predicate {
        self.predicate
    }

    #[must_use]
    pub const fn sort(&self) -> &'a [SortKey] {
        self.sort
    }

    #[must_use]
    pub const fn skip(&self) -> usize {
        self.skip
    }

    #[must_use]
    pub const fn limit(&self) -> usize {
        self.limit
    }

    /// Whether `doc` belongs to the owner and satisfies the predicate
    #[must_use]
    pub fn admits(&self, doc: &Document) -> bool {
        doc.owner == *self.owner && self.predicate.matches(doc)
    }
}

/// Requested page (1-indexed)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub number: usize,
    pub size: usize,
}

impl Page {
    #[must_use]
    pub const fn new(number: usize, size: usize) -> Self {
        Self { number, size }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(1, 20)
    }
}

/// One page of results plus the total match count
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryPage {
    pub items: Vec<Document>,
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
    pub pages: usize,
}

/// Runs filter specifications against a document store
pub struct Executor<'a, S: DocumentStore + ?Sized> {
    store: &'a S,
    max_page_size: usize,
}

impl<'a, S: DocumentStore + ?Sized> Executor<'a, S> {
    #[must_use]
    pub const fn new(store: &'a S, max_page_size: usize) -> Self {
        Self { store, max_page_size }
    }

    /// Clamp a requested page to `1..` and `1..=max_page_size`
    #[must_use]
    pub fn normalize(&self, page: Page) -> Page {
        Page::new(page.number.max(1), page.size.clamp(1, self.max_page_size.max(1)))
    }

    /// Fetch one page of `owner`'s documents matching `spec`
    ///
    /// # Errors
    ///
    /// Returns `DbError` if the store fails.
    pub fn execute(&self, spec: &FilterSpec, owner: &OwnerId, page: Page) -> Result<QueryPage, DbError> {
        let page = self.normalize(page);
        let sort: &[SortKey] = if spec.sort.is_empty() { &DEFAULT_SORT } else { &spec.sort };

        let total = self.store.count(&ScopedQuery::new(owner, &spec.predicate, sort, 0, usize::MAX))?;
        let skip = (page.number - 1).saturating_mul(page.size);
        let items = if skip >= total {
            Vec::new()
        } else {
            self.store.find(&ScopedQuery::new(owner, &spec.predicate, sort, skip, page.size))?
        };

        tracing::debug!(
            owner = %owner,
            total,
            page = page.number,
            returned = items.len(),
            "executed filter"
        );

        Ok(QueryPage {
            items,
            total,
            page: page.number,
            page_size: page.size,
            pages: total.div_ceil(page.size),
        })
    }

    /// Count `owner`'s documents matching `spec`
    ///
    /// # Errors
    ///
    /// Returns `DbError` if the store fails.
    pub fn count(&self, spec: &FilterSpec, owner: &OwnerId) -> Result<usize, DbError> {
        self.store
            .count(&ScopedQuery::new(owner, &spec.predicate, &[], 0, usize::MAX))
    }
}
