//! Embedding providers for the knowledge base.
//!
//! The default stack is `CachedEmbedder<TimeoutEmbedder<HashEmbedder>>`: cache
//! hits skip the provider entirely, misses are bounded by the configured
//! timeout.

use std::sync::Arc;

use knowdb_core::config::{EmbedderConfig, RetrievalConfig};
use knowdb_core::traits::Embedder;

pub mod cache;
pub mod hash;
pub mod timeout;

pub use cache::CachedEmbedder;
pub use hash::HashEmbedder;
pub use timeout::TimeoutEmbedder;

pub fn get_default_embedder(embedder: &EmbedderConfig, retrieval: &RetrievalConfig) -> Arc<dyn Embedder> {
    let base = TimeoutEmbedder::new(HashEmbedder::new(embedder.dimension), retrieval.embed_timeout());
    tracing::debug!(
        embedder = base.embedder_id(),
        cache = embedder.cache,
        timeout = ?base.timeout(),
        "embedder ready"
    );
    if embedder.cache {
        Arc::new(CachedEmbedder::new(base))
    } else {
        Arc::new(base)
    }
}
