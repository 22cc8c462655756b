use std::hash::Hasher;

use async_trait::async_trait;
use twox_hash::XxHash64;

use knowdb_core::traits::Embedder;
use knowdb_core::{Embedding, ProviderError};

/// Deterministic hashed bag-of-words embedder.
///
/// Each lowercase alphanumeric token is hashed with xxh64 into one of `dim`
/// buckets; bucket counts are then L2-normalized. Texts sharing vocabulary
/// end up close under cosine similarity, which is all the small corpora need,
/// and nothing has to be downloaded. Text without tokens maps to the zero vector.
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dim: usize,
    id: String,
}

impl HashEmbedder {
    pub fn new(dim: usize) -> Self {
        Self { dim, id: format!("hash:xxh64:d{dim}") }
    }

    pub fn embed_now(&self, text: &str) -> Embedding {
        let mut v = vec![0f32; self.dim];
        if self.dim == 0 {
            return v;
        }
        for token in tokens(text) {
            let mut hasher = XxHash64::with_seed(0);
            hasher.write(token.as_bytes());
            let idx = (hasher.finish() % self.dim as u64) as usize;
            v[idx] += 1.0;
        }
        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in &mut v {
                *x /= norm;
            }
        }
        v
    }
}

#[async_trait]
impl Embedder for HashEmbedder {
    fn embedder_id(&self) -> &str {
        &self.id
    }

    fn dim(&self) -> usize {
        self.dim
    }

    async fn embed(&self, text: &str) -> Result<Embedding, ProviderError> {
        Ok(self.embed_now(text))
    }
}

fn tokens(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
}
