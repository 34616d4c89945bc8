//! In-memory document index.
//!
//! Owns the per-document ordered page texts. Registration is a one-time
//! write per upload; every query path reads an immutable [`Arc`] snapshot,
//! so no lock is held across a retrieval. The id-to-document map sits
//! behind a single coarse `RwLock` — writes are rare relative to reads
//! and contention is negligible.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

/// An immutable, registered document: ordered page texts plus bookkeeping.
#[derive(Debug)]
pub struct IndexedDocument {
    pub id: String,
    /// Page texts in reading order; index 0 is page 1. Pages may be empty.
    pub pages: Vec<String>,
    /// SHA-256 over the page texts, for change detection and debugging.
    pub content_hash: String,
    pub registered_at: DateTime<Utc>,
}

impl IndexedDocument {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

/// Thread-safe registry of indexed documents.
#[derive(Default)]
pub struct DocumentIndex {
    docs: RwLock<HashMap<String, Arc<IndexedDocument>>>,
}

impl DocumentIndex {
    pub fn new() -> Self {
        Self {
            docs: RwLock::new(HashMap::new()),
        }
    }

    /// Register a document, replacing any prior text stored under the same
    /// id. Returns the stored snapshot.
    pub fn register(&self, id: impl Into<String>, pages: Vec<String>) -> Arc<IndexedDocument> {
        let id = id.into();
        let doc = Arc::new(IndexedDocument {
            content_hash: content_hash(&pages),
            id: id.clone(),
            pages,
            registered_at: Utc::now(),
        });
        let mut docs = self.docs.write().unwrap();
        docs.insert(id, doc.clone());
        doc
    }

    /// Fetch an immutable snapshot of a document, if registered.
    pub fn get(&self, id: &str) -> Option<Arc<IndexedDocument>> {
        let docs = self.docs.read().unwrap();
        docs.get(id).cloned()
    }

    /// Drop a document. Returns whether anything was removed; subsequent
    /// lookups behave as "no document".
    pub fn remove(&self, id: &str) -> bool {
        let mut docs = self.docs.write().unwrap();
        docs.remove(id).is_some()
    }

    pub fn contains(&self, id: &str) -> bool {
        let docs = self.docs.read().unwrap();
        docs.contains_key(id)
    }

    pub fn len(&self) -> usize {
        let docs = self.docs.read().unwrap();
        docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// SHA-256 over all pages, with a separator so page boundaries matter.
fn content_hash(pages: &[String]) -> String {
    let mut hasher = Sha256::new();
    for page in pages {
        hasher.update(page.as_bytes());
        hasher.update([0u8]);
    }
    format!("{:x}", hasher.finalize())
}
