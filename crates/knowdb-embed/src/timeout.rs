use std::time::Duration;

use async_trait::async_trait;

use knowdb_core::traits::Embedder;
use knowdb_core::{Embedding, ProviderError};

/// Bounds every `embed` call of the wrapped provider.
pub struct TimeoutEmbedder<E> {
    inner: E,
    timeout: Duration,
}

impl<E: Embedder> TimeoutEmbedder<E> {
    pub fn new(inner: E, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl<E: Embedder> Embedder for TimeoutEmbedder<E> {
    fn embedder_id(&self) -> &str {
        self.inner.embedder_id()
    }

    fn dim(&self) -> usize {
        self.inner.dim()
    }

    async fn embed(&self, text: &str) -> Result<Embedding, ProviderError> {
        self.bounded(self.inner.embed(text)).await
    }

    async fn embed_query(&self, text: &str) -> Result<Embedding, ProviderError> {
        self.bounded(self.inner.embed_query(text)).await
    }
}

impl<E: Embedder> TimeoutEmbedder<E> {
    async fn bounded<F>(&self, call: F) -> Result<Embedding, ProviderError>
    where
        F: std::future::Future<Output = Result<Embedding, ProviderError>>,
    {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(embedder = self.inner.embedder_id(), timeout = ?self.timeout, "embedding timed out");
                Err(ProviderError::Timeout(self.timeout))
            }
        }
    }
}
