//! In-memory document store with swap-on-reload semantics.
//!
//! The store holds an immutable [`Corpus`] behind an `Arc`. `load` builds a new
//! corpus off to the side and swaps it in, so readers holding a snapshot keep
//! seeing the previous contents until they drop it.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::error::{Error, Result};
use crate::types::{Document, DocumentId};

/// Immutable, ordered set of documents with id lookup.
#[derive(Debug, Default)]
pub struct Corpus {
    documents: Vec<Document>,
    by_id: HashMap<DocumentId, usize>,
}

impl Corpus {
    pub fn new(documents: Vec<Document>) -> Result<Self> {
        let mut by_id = HashMap::with_capacity(documents.len());
        for (pos, doc) in documents.iter().enumerate() {
            if by_id.insert(doc.id.clone(), pos).is_some() {
                return Err(Error::DuplicateId(doc.id.clone()));
            }
        }
        Ok(Self { documents, by_id })
    }

    pub fn get(&self, id: &str) -> Result<&Document> {
        self.by_id
            .get(id)
            .map(|&pos| &self.documents[pos])
            .ok_or_else(|| Error::NotFound(format!("document '{id}'")))
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct DocumentStore {
    current: RwLock<Arc<Corpus>>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole corpus. On error the previous corpus is left untouched.
    pub fn load(&self, documents: Vec<Document>) -> Result<()> {
        self.replace(Corpus::new(documents)?);
        Ok(())
    }

    /// Swap in an already validated corpus.
    ///
    /// The lock only ever guards a pointer swap, so a poisoned lock still
    /// holds a complete corpus and is recovered rather than reported.
    pub fn replace(&self, corpus: Corpus) {
        let count = corpus.len();
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(corpus);
        tracing::info!(documents = count, "document store loaded");
    }

    pub fn get(&self, id: &str) -> Result<Document> {
        self.snapshot()?.get(id).cloned()
    }

    /// The corpus as of now; unaffected by later reloads.
    pub fn snapshot(&self) -> Result<Arc<Corpus>> {
        Ok(Arc::clone(&*self.current.read().unwrap_or_else(PoisonError::into_inner)))
    }

    /// Document ids in ingestion order.
    pub fn ids(&self) -> Result<Vec<DocumentId>> {
        Ok(self.snapshot()?.documents().iter().map(|d| d.id.clone()).collect())
    }

    pub fn len(&self) -> usize {
        self.snapshot().map(|c| c.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
