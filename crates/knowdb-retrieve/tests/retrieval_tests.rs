use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use knowdb_core::config::RetrievalConfig;
use knowdb_core::corpus;
use knowdb_core::traits::Embedder;
use knowdb_core::{CitationStyle, Document, Embedding, Error, ProviderError};
use knowdb_embed::{CachedEmbedder, HashEmbedder, TimeoutEmbedder};
use knowdb_retrieve::{KnowledgeBase, NO_RESULTS_MARKER};
use knowdb_vector::FlatIndex;

const SERVICES_QUERY: &str = "What are the benefits of breaking an application into independent services?";

/// Hash embedder that can be switched into a failing provider.
struct FlakyEmbedder {
    inner: HashEmbedder,
    failing: AtomicBool,
}

#[async_trait]
impl Embedder for FlakyEmbedder {
    fn embedder_id(&self) -> &str {
        self.inner.embedder_id()
    }
    fn dim(&self) -> usize {
        self.inner.dim()
    }
    async fn embed(&self, text: &str) -> Result<Embedding, ProviderError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(ProviderError::Failed("503 from embedding endpoint".into()));
        }
        self.inner.embed(text).await
    }
}

struct StalledEmbedder;

#[async_trait]
impl Embedder for StalledEmbedder {
    fn embedder_id(&self) -> &str {
        "stalled"
    }
    fn dim(&self) -> usize {
        8
    }
    async fn embed(&self, _text: &str) -> Result<Embedding, ProviderError> {
        futures::future::pending::<()>().await;
        Ok(vec![0.0; 8])
    }
}

fn knowledge_base() -> KnowledgeBase<FlatIndex> {
    KnowledgeBase::from_config(RetrievalConfig::default(), Arc::new(HashEmbedder::new(1024))).expect("kb")
}

#[tokio::test]
async fn microservices_question_ranks_microservices_first() {
    let kb = knowledge_base();
    let report = kb.ingest(corpus::architecture()).await.unwrap();
    assert_eq!(report.documents, 5);
    assert_eq!(report.dimension, Some(1024));

    let results = kb.retrieve(SERVICES_QUERY, 3).await.unwrap();
    assert_eq!(results.len(), 3);
    assert_eq!(results[0].document.id, "arch1");
    assert_eq!(results.iter().map(|r| r.rank).collect::<Vec<_>>(), [1, 2, 3]);

    let text = kb.retrieve_text(SERVICES_QUERY, 3).await.unwrap();
    let first_line = text.lines().next().unwrap();
    assert!(first_line.starts_with("1. "), "{first_line}");
    assert!(first_line.contains("Microservices Architecture"), "{first_line}");
}

#[tokio::test]
async fn empty_corpus_returns_no_results_marker() {
    let kb = knowledge_base();
    kb.ingest(Vec::new()).await.unwrap();

    assert!(kb.retrieve("anything at all", 3).await.unwrap().is_empty());
    let text = kb.retrieve_text("anything at all", 3).await.unwrap();
    assert_eq!(text, NO_RESULTS_MARKER);
    assert!(!text.is_empty());
}

#[tokio::test]
async fn never_ingested_base_is_empty_not_failed() {
    let kb = knowledge_base();
    assert!(kb.retrieve("vector databases", 3).await.unwrap().is_empty());
}

#[tokio::test]
async fn repeated_retrieval_is_identical() {
    let kb = knowledge_base();
    kb.ingest(corpus::ml_primer()).await.unwrap();

    let first = kb.retrieve("vector databases", 3).await.unwrap();
    let second = kb.retrieve("vector databases", 3).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(first[0].document.id, "doc5");
    assert_eq!(kb.retrieve_text("vector databases", 3).await.unwrap(), kb.retrieve_text("vector databases", 3).await.unwrap());
}

#[tokio::test]
async fn oversized_k_returns_corpus_size() {
    let kb = knowledge_base();
    kb.ingest(corpus::architecture()).await.unwrap();

    let results = kb.retrieve("cloud scaling", 50).await.unwrap();
    assert_eq!(results.len(), 5);
    assert!(results.windows(2).all(|w| w[0].score >= w[1].score));
    assert_eq!(results.last().unwrap().rank, 5);
}

#[tokio::test]
async fn default_k_comes_from_config() {
    let config = RetrievalConfig { top_k: 2, ..RetrievalConfig::default() };
    let kb = KnowledgeBase::from_config(config, Arc::new(HashEmbedder::new(256))).unwrap();
    kb.ingest(corpus::ml_primer()).await.unwrap();
    assert_eq!(kb.retrieve_default("neural networks").await.unwrap().len(), 2);
}

#[tokio::test]
async fn provider_failure_is_a_retrieval_error_not_an_empty_result() {
    let embedder = Arc::new(FlakyEmbedder { inner: HashEmbedder::new(128), failing: AtomicBool::new(false) });
    let kb = KnowledgeBase::from_config(RetrievalConfig::default(), embedder.clone()).unwrap();
    kb.ingest(corpus::architecture()).await.unwrap();

    embedder.failing.store(true, Ordering::SeqCst);
    let err = kb.retrieve(SERVICES_QUERY, 3).await.unwrap_err();
    assert!(matches!(err, Error::Retrieval(ProviderError::Failed(_))), "{err:?}");
    assert!(err.is_provider_failure());
    assert!(kb.retrieve_text(SERVICES_QUERY, 3).await.is_err());

    // The index survives the failed request.
    embedder.failing.store(false, Ordering::SeqCst);
    assert_eq!(kb.retrieve(SERVICES_QUERY, 1).await.unwrap()[0].document.id, "arch1");
}

#[tokio::test]
async fn provider_failure_during_ingest_commits_nothing() {
    let embedder = Arc::new(FlakyEmbedder { inner: HashEmbedder::new(128), failing: AtomicBool::new(false) });
    let kb = KnowledgeBase::from_config(RetrievalConfig::default(), embedder.clone()).unwrap();
    kb.ingest(corpus::architecture()).await.unwrap();

    embedder.failing.store(true, Ordering::SeqCst);
    assert!(matches!(kb.ingest(corpus::ml_primer()).await, Err(Error::Provider(_))));
    embedder.failing.store(false, Ordering::SeqCst);

    assert_eq!(kb.document_count(), 5);
    assert_eq!(kb.retrieve(SERVICES_QUERY, 1).await.unwrap()[0].document.id, "arch1");
}

#[tokio::test(start_paused = true)]
async fn stalled_provider_times_out() {
    let embedder = Arc::new(TimeoutEmbedder::new(StalledEmbedder, Duration::from_secs(2)));
    let kb = KnowledgeBase::from_config(RetrievalConfig::default(), embedder).unwrap();

    let err = kb.retrieve("is anyone there", 3).await.unwrap_err();
    assert!(matches!(err, Error::Retrieval(ProviderError::Timeout(d)) if d == Duration::from_secs(2)));
}

#[tokio::test]
async fn duplicate_ids_keep_previous_knowledge() {
    let kb = knowledge_base();
    kb.ingest(corpus::architecture()).await.unwrap();

    let dupes = vec![Document::new("x", "One", "first body"), Document::new("x", "Two", "second body")];
    assert!(matches!(kb.ingest(dupes).await, Err(Error::DuplicateId(id)) if id == "x"));

    assert_eq!(kb.retrieve(SERVICES_QUERY, 1).await.unwrap()[0].document.id, "arch1");
}

#[tokio::test]
async fn configured_dimension_mismatch_rejects_ingest() {
    let config = RetrievalConfig { embedding_dimension: Some(64), ..RetrievalConfig::default() };
    let kb = KnowledgeBase::from_config(config, Arc::new(HashEmbedder::new(32))).unwrap();

    let err = kb.ingest(corpus::ml_primer()).await.unwrap_err();
    assert!(matches!(err, Error::DimensionMismatch { expected: 64, actual: 32 }));
    assert_eq!(kb.document_count(), 0);
}

#[tokio::test]
async fn invalid_queries_are_rejected() {
    let kb = knowledge_base();
    kb.ingest(corpus::ml_primer()).await.unwrap();
    assert!(matches!(kb.retrieve("   ", 3).await, Err(Error::InvalidInput(_))));
    assert!(matches!(kb.retrieve("rag", 0).await, Err(Error::InvalidInput(_))));
}

#[tokio::test]
async fn block_style_follows_config() {
    let config = RetrievalConfig { citation_style: CitationStyle::Block, ..RetrievalConfig::default() };
    let kb = KnowledgeBase::from_config(config, Arc::new(HashEmbedder::new(512))).unwrap();
    kb.ingest(corpus::ml_primer()).await.unwrap();

    let text = kb.retrieve_text("vector databases", 2).await.unwrap();
    assert!(text.starts_with("[1] Vector Databases:\n"), "{text}");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn queries_during_reingest_see_one_corpus() {
    let kb = Arc::new(knowledge_base());
    kb.ingest(corpus::architecture()).await.unwrap();

    let arch: HashSet<String> = corpus::architecture().into_iter().map(|d| d.id).collect();
    let ml: HashSet<String> = corpus::ml_primer().into_iter().map(|d| d.id).collect();

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let kb = Arc::clone(&kb);
            let (arch, ml) = (arch.clone(), ml.clone());
            tokio::spawn(async move {
                for _ in 0..200 {
                    let results = kb.retrieve("benefits of learning systems", 10).await.unwrap();
                    let ids: HashSet<String> = results.into_iter().map(|r| r.document.id).collect();
                    assert!(ids == arch || ids == ml, "mixed generations: {ids:?}");
                }
            })
        })
        .collect();

    for i in 0..50 {
        let docs = if i % 2 == 0 { corpus::ml_primer() } else { corpus::architecture() };
        kb.ingest(docs).await.unwrap();
        tokio::task::yield_now().await;
    }
    for r in futures::future::join_all(readers).await {
        r.unwrap();
    }
}

#[tokio::test]
async fn distinct_queries_do_not_grow_the_embedding_cache() {
    let embedder = Arc::new(CachedEmbedder::new(HashEmbedder::new(256)));
    let kb = KnowledgeBase::from_config(RetrievalConfig::default(), embedder.clone()).unwrap();
    kb.ingest(corpus::architecture()).await.unwrap();
    assert_eq!(embedder.len(), 5);

    for i in 0..2000 {
        kb.retrieve(&format!("distinct question {i}"), 3).await.unwrap();
    }
    assert_eq!(embedder.len(), 5);

    // Re-ingesting the same corpus is served from the cache.
    kb.ingest(corpus::architecture()).await.unwrap();
    assert_eq!(embedder.len(), 5);
}
