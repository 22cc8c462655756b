use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{ProviderError, Result};
use crate::types::{DocumentId, Embedding, SearchHit};

/// Converts text into a fixed-length vector.
///
/// Implementations must be deterministic for identical text under the same
/// configuration and must return vectors of length `dim()`. Calls may be slow
/// and may fail; callers must not hold locks across `embed`.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Stable identifier for the provider/model (e.g., `hash:xxh64:d1024`).
    fn embedder_id(&self) -> &str;
    /// Embedding dimensionality (D).
    fn dim(&self) -> usize;
    async fn embed(&self, text: &str) -> std::result::Result<Embedding, ProviderError>;

    /// Embed a query. Same vector as `embed`; wrappers that keep per-text
    /// state (caches) must not retain anything for queries.
    async fn embed_query(&self, text: &str) -> std::result::Result<Embedding, ProviderError> {
        self.embed(text).await
    }
}

#[async_trait]
impl<E: Embedder + ?Sized> Embedder for Arc<E> {
    fn embedder_id(&self) -> &str {
        (**self).embedder_id()
    }

    fn dim(&self) -> usize {
        (**self).dim()
    }

    async fn embed(&self, text: &str) -> std::result::Result<Embedding, ProviderError> {
        (**self).embed(text).await
    }

    async fn embed_query(&self, text: &str) -> std::result::Result<Embedding, ProviderError> {
        (**self).embed_query(text).await
    }
}

/// Stores one vector per document id and answers k-nearest queries.
///
/// `build` replaces the contents atomically. `search_vec` never observes a
/// partially built index.
pub trait VectorIndexer: Send + Sync {
    fn build(&self, entries: Vec<(DocumentId, Embedding)>) -> Result<()>;
    fn search_vec(&self, query_vec: &[f32], k: usize) -> Result<Vec<SearchHit>>;
    fn len(&self) -> usize;
    /// Dimension of the stored vectors, `None` until the first non-empty build.
    fn dim(&self) -> Option<usize>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
