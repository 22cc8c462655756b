//! In-memory embedding cache keyed by `(content_hash, embedder_id)`.
//!
//! Document embeddings are written through on misses, so re-ingesting an
//! unchanged corpus costs no provider calls. Queries read the cache but never
//! fill it, which keeps its size bounded by the corpora ingested.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use knowdb_core::traits::Embedder;
use knowdb_core::{Embedding, ProviderError};

type CacheKey = (String, String);

pub struct CachedEmbedder<E> {
    inner: E,
    entries: RwLock<HashMap<CacheKey, Embedding>>,
}

impl<E: Embedder> CachedEmbedder<E> {
    pub fn new(inner: E) -> Self {
        Self { inner, entries: RwLock::new(HashMap::new()) }
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn key(&self, text: &str) -> CacheKey {
        (hash_content(text), self.inner.embedder_id().to_string())
    }

    fn lookup(&self, key: &CacheKey) -> Option<Embedding> {
        self.entries.read().ok().and_then(|m| m.get(key).cloned())
    }
}

fn hash_content(s: &str) -> String {
    blake3::hash(s.as_bytes()).to_hex().to_string()
}

#[async_trait]
impl<E: Embedder> Embedder for CachedEmbedder<E> {
    fn embedder_id(&self) -> &str {
        self.inner.embedder_id()
    }

    fn dim(&self) -> usize {
        self.inner.dim()
    }

    async fn embed(&self, text: &str) -> Result<Embedding, ProviderError> {
        let key = self.key(text);
        if let Some(hit) = self.lookup(&key) {
            return Ok(hit);
        }
        // The lock is released before awaiting the provider.
        let vector = self.inner.embed(text).await?;
        if vector.len() == self.inner.dim() {
            if let Ok(mut m) = self.entries.write() {
                m.insert(key, vector.clone());
            }
        }
        Ok(vector)
    }

    async fn embed_query(&self, text: &str) -> Result<Embedding, ProviderError> {
        if let Some(hit) = self.lookup(&self.key(text)) {
            return Ok(hit);
        }
        self.inner.embed_query(text).await
    }
}
