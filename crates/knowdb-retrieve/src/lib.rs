use std::sync::{Arc, RwLock};

use knowdb_core::config::RetrievalConfig;
use knowdb_core::corpus;
use knowdb_core::store::{Corpus, DocumentStore};
use knowdb_core::traits::{Embedder, VectorIndexer};
use knowdb_core::{Document, Error, Result, RetrievedDocument};
use knowdb_vector::FlatIndex;

pub mod format;

pub use format::{render, NO_RESULTS_MARKER};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestReport {
    pub documents: usize,
    pub dimension: Option<usize>,
}

/// Single entry point for agents: embeds queries, searches the index and
/// resolves hits against the document store.
///
/// The store and the index are swapped together under `generation`, so a
/// query running during `ingest` resolves against a consistent pair. No lock
/// is held while the embedder is awaited.
pub struct KnowledgeBase<VI> where VI: VectorIndexer {
    index: VI,
    store: DocumentStore,
    embedder: Arc<dyn Embedder>,
    config: RetrievalConfig,
    generation: RwLock<()>,
    ingest_lock: tokio::sync::Mutex<()>,
}

impl KnowledgeBase<FlatIndex> {
    pub fn from_config(config: RetrievalConfig, embedder: Arc<dyn Embedder>) -> Result<Self> {
        config.validate()?;
        let index = match config.embedding_dimension {
            Some(dim) => FlatIndex::with_dimension(config.metric, dim),
            None => FlatIndex::new(config.metric),
        };
        Ok(Self::new(index, embedder, config))
    }
}

impl<VI> KnowledgeBase<VI> where VI: VectorIndexer {
    pub fn new(index: VI, embedder: Arc<dyn Embedder>, config: RetrievalConfig) -> Self {
        Self {
            index,
            store: DocumentStore::new(),
            embedder,
            config,
            generation: RwLock::new(()),
            ingest_lock: tokio::sync::Mutex::new(()),
        }
    }

    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    pub fn document_count(&self) -> usize {
        self.store.len()
    }

    /// Replace the corpus: embed every document in order, then swap index and
    /// store together. Nothing is committed if any step fails.
    pub async fn ingest(&self, documents: Vec<Document>) -> Result<IngestReport> {
        corpus::validate(&documents)?;
        let _ingest = self.ingest_lock.lock().await;

        let mut entries = Vec::with_capacity(documents.len());
        for doc in &documents {
            let vector = self.embedder.embed(&doc.content).await.map_err(|e| {
                tracing::warn!(id = %doc.id, error = %e, "document embedding failed");
                Error::Provider(e)
            })?;
            entries.push((doc.id.clone(), vector));
        }

        let corpus = Corpus::new(documents)?;
        let count = corpus.len();
        {
            let _generation = self.generation.write().map_err(|_| poisoned())?;
            self.index.build(entries)?;
            // Cannot fail, so the new index never goes live without its documents.
            self.store.replace(corpus);
        }
        let report = IngestReport { documents: count, dimension: self.index.dim() };
        tracing::info!(documents = report.documents, dim = ?report.dimension, "knowledge base ingested");
        Ok(report)
    }

    /// Top-`k` documents for `query`. An empty index yields an empty result;
    /// a provider failure yields `Error::Retrieval`.
    pub async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<RetrievedDocument>> {
        if query.trim().is_empty() {
            return Err(Error::InvalidInput("query must not be empty".into()));
        }
        if k == 0 {
            return Err(Error::InvalidInput("k must be positive".into()));
        }

        let vector = self.embedder.embed_query(query).await.map_err(|e| {
            tracing::warn!(error = %e, "query embedding failed");
            Error::Retrieval(e)
        })?;

        let _generation = self.generation.read().map_err(|_| poisoned())?;
        let hits = match self.index.search_vec(&vector, k) {
            Ok(hits) => hits,
            Err(Error::EmptyIndex) => {
                tracing::debug!("retrieval against empty index");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e),
        };
        let corpus = self.store.snapshot()?;
        tracing::debug!(k, hits = hits.len(), "retrieved");
        hits.into_iter()
            .enumerate()
            .map(|(i, hit)| {
                Ok(RetrievedDocument { rank: i + 1, document: corpus.get(&hit.id)?.clone(), score: hit.score })
            })
            .collect()
    }

    pub async fn retrieve_default(&self, query: &str) -> Result<Vec<RetrievedDocument>> {
        self.retrieve(query, self.config.top_k).await
    }

    /// `retrieve` rendered with the configured citation style.
    pub async fn retrieve_text(&self, query: &str, k: usize) -> Result<String> {
        let results = self.retrieve(query, k).await?;
        render(&results, self.config.citation_style)
    }
}

fn poisoned() -> Error {
    Error::Operation("knowledge base lock poisoned".into())
}
