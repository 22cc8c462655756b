//! Exact brute-force vector index.
//!
//! Every query is compared against every stored vector (`O(n·D)`), which is
//! exact and plenty fast for corpora up to a few thousand documents. The
//! entries live in an immutable [`Snapshot`]; `build` prepares a new snapshot
//! without touching the current one and swaps the `Arc` in a single write, so
//! queries only ever see a complete old or a complete new index.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::{Arc, RwLock};

use knowdb_core::traits::VectorIndexer;
use knowdb_core::{DocumentId, Embedding, Error, Result, SearchHit, SimilarityMetric};

use crate::similarity;

/// A document id paired with its stored vector.
#[derive(Debug, Clone)]
pub(crate) struct IndexEntry {
    pub(crate) id: DocumentId,
    vector: Embedding,
}

#[derive(Debug, Default)]
struct Snapshot {
    dim: Option<usize>,
    entries: Vec<IndexEntry>,
}

pub struct FlatIndex {
    metric: SimilarityMetric,
    expected_dim: Option<usize>,
    current: RwLock<Arc<Snapshot>>,
}

impl FlatIndex {
    /// Empty index whose dimension is inferred from the first build.
    pub fn new(metric: SimilarityMetric) -> Self {
        Self { metric, expected_dim: None, current: RwLock::new(Arc::new(Snapshot::default())) }
    }

    /// Empty index that only accepts vectors of `dim` components.
    pub fn with_dimension(metric: SimilarityMetric, dim: usize) -> Self {
        let snapshot = Snapshot { dim: Some(dim), entries: Vec::new() };
        Self { metric, expected_dim: Some(dim), current: RwLock::new(Arc::new(snapshot)) }
    }

    pub fn metric(&self) -> SimilarityMetric {
        self.metric
    }

    /// Replace the index contents. On error the previous contents stay live.
    pub fn build(&self, entries: Vec<(DocumentId, Embedding)>) -> Result<()> {
        let snapshot = Arc::new(self.prepare(entries)?);
        let (count, dim) = (snapshot.entries.len(), snapshot.dim);
        *self.current.write().map_err(|_| Error::Operation("vector index lock poisoned".into()))? = snapshot;
        tracing::info!(entries = count, dim = ?dim, metric = ?self.metric, "vector index built");
        Ok(())
    }

    /// Top-`k` entries by descending score; ties keep insertion order.
    pub fn query(&self, vector: &[f32], k: usize) -> Result<Vec<SearchHit>> {
        if k == 0 {
            return Err(Error::InvalidInput("k must be positive".into()));
        }
        let snapshot = self.snapshot()?;
        if let Some(dim) = snapshot.dim {
            if vector.len() != dim {
                return Err(Error::DimensionMismatch { expected: dim, actual: vector.len() });
            }
        }
        if snapshot.entries.is_empty() {
            return Err(Error::EmptyIndex);
        }
        if vector.iter().any(|x| !x.is_finite()) {
            return Err(Error::InvalidInput("query vector has non-finite components".into()));
        }

        let query = similarity::prepare(self.metric, vector);
        let mut scored: Vec<(usize, f32)> = snapshot
            .entries
            .iter()
            .enumerate()
            .map(|(pos, e)| (pos, canonical(similarity::score(self.metric, &query, &e.vector))))
            .collect();

        if k < scored.len() {
            scored.select_nth_unstable_by(k - 1, rank_order);
            scored.truncate(k);
        }
        scored.sort_by(rank_order);

        tracing::debug!(k, returned = scored.len(), "vector query");
        Ok(scored
            .into_iter()
            .map(|(pos, score)| SearchHit { id: snapshot.entries[pos].id.clone(), score })
            .collect())
    }

    /// Ids in insertion order.
    pub fn ids(&self) -> Result<Vec<DocumentId>> {
        Ok(self.snapshot()?.entries.iter().map(|e| e.id.clone()).collect())
    }

    fn snapshot(&self) -> Result<Arc<Snapshot>> {
        self.current
            .read()
            .map(|guard| Arc::clone(&*guard))
            .map_err(|_| Error::Operation("vector index lock poisoned".into()))
    }

    fn prepare(&self, entries: Vec<(DocumentId, Embedding)>) -> Result<Snapshot> {
        let dim = self.expected_dim.or_else(|| entries.first().map(|(_, v)| v.len()));
        let Some(dim) = dim else {
            return Ok(Snapshot::default());
        };
        if dim == 0 {
            return Err(Error::InvalidInput("vectors must have at least one component".into()));
        }
        let mut seen = HashSet::with_capacity(entries.len());
        let mut prepared = Vec::with_capacity(entries.len());
        for (id, vector) in entries {
            if vector.len() != dim {
                return Err(Error::DimensionMismatch { expected: dim, actual: vector.len() });
            }
            if vector.iter().any(|x| !x.is_finite()) {
                return Err(Error::InvalidInput(format!("vector for '{id}' has non-finite components")));
            }
            if !seen.insert(id.clone()) {
                return Err(Error::DuplicateId(id));
            }
            prepared.push(IndexEntry { vector: similarity::prepare(self.metric, &vector), id });
        }
        Ok(Snapshot { dim: Some(dim), entries: prepared })
    }
}

// -0.0 and 0.0 must tie under `total_cmp`.
fn canonical(score: f32) -> f32 {
    if score == 0.0 { 0.0 } else { score }
}

fn rank_order(a: &(usize, f32), b: &(usize, f32)) -> Ordering {
    b.1.total_cmp(&a.1).then(a.0.cmp(&b.0))
}

impl VectorIndexer for FlatIndex {
    fn build(&self, entries: Vec<(DocumentId, Embedding)>) -> Result<()> {
        FlatIndex::build(self, entries)
    }

    fn search_vec(&self, query_vec: &[f32], k: usize) -> Result<Vec<SearchHit>> {
        self.query(query_vec, k)
    }

    fn len(&self) -> usize {
        self.snapshot().map(|s| s.entries.len()).unwrap_or(0)
    }

    fn dim(&self) -> Option<usize> {
        self.snapshot().ok().and_then(|s| s.dim)
    }
}
