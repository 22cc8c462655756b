use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use knowdb_core::config::RetrievalConfig;
use knowdb_core::corpus;
use knowdb_core::traits::Embedder;
use knowdb_core::{Embedding, ProviderError};
use knowdb_embed::HashEmbedder;
use knowdb_retrieve::{KnowledgeBase, NO_RESULTS_MARKER};
use knowdb_tools::{default_registry, ToolError, ToolInput};
use serde_json::json;

struct SwitchableEmbedder {
    inner: HashEmbedder,
    down: AtomicBool,
}

#[async_trait]
impl Embedder for SwitchableEmbedder {
    fn embedder_id(&self) -> &str {
        self.inner.embedder_id()
    }
    fn dim(&self) -> usize {
        self.inner.dim()
    }
    async fn embed(&self, text: &str) -> Result<Embedding, ProviderError> {
        if self.down.load(Ordering::SeqCst) {
            return Err(ProviderError::Failed("connection refused".into()));
        }
        self.inner.embed(text).await
    }
}

#[tokio::test]
async fn default_registry_exposes_three_tools() {
    let kb = Arc::new(KnowledgeBase::from_config(RetrievalConfig::default(), Arc::new(HashEmbedder::new(256))).unwrap());
    let registry = default_registry(kb);
    let names: Vec<_> = registry.list_tools().iter().map(|t| t.name()).collect();
    assert_eq!(names, ["retrieve_documents", "calculate", "convert_units"]);
    for tool in registry.list_tools() {
        assert_eq!(tool.input_schema()["type"], "object");
        assert!(!tool.description().is_empty());
    }
}

#[tokio::test]
async fn retrieve_documents_returns_citations() {
    let kb = Arc::new(KnowledgeBase::from_config(RetrievalConfig::default(), Arc::new(HashEmbedder::new(1024))).unwrap());
    kb.ingest(corpus::architecture()).await.unwrap();
    let registry = default_registry(kb);

    let out = registry
        .invoke(
            "retrieve_documents",
            ToolInput::new(json!({"query": "What are the benefits of breaking an application into independent services?", "k": 2})),
        )
        .await
        .unwrap();
    assert!(out.success);
    assert!(out.message.starts_with("1. Microservices Architecture:"), "{}", out.message);
    assert_eq!(out.message.lines().count(), 2);
}

#[tokio::test]
async fn retrieve_documents_on_empty_base_is_the_marker() {
    let kb = Arc::new(KnowledgeBase::from_config(RetrievalConfig::default(), Arc::new(HashEmbedder::new(64))).unwrap());
    let registry = default_registry(kb);
    let out = registry.invoke("retrieve_documents", ToolInput::new(json!({"query": "anything"}))).await.unwrap();
    assert_eq!(out.message, NO_RESULTS_MARKER);
}

#[tokio::test]
async fn retrieval_outage_fails_the_call() {
    let embedder = Arc::new(SwitchableEmbedder { inner: HashEmbedder::new(128), down: AtomicBool::new(false) });
    let kb = Arc::new(KnowledgeBase::from_config(RetrievalConfig::default(), embedder.clone()).unwrap());
    kb.ingest(corpus::ml_primer()).await.unwrap();
    let registry = default_registry(kb);

    embedder.down.store(true, Ordering::SeqCst);
    let err = registry
        .invoke("retrieve_documents", ToolInput::new(json!({"query": "vector databases"})))
        .await
        .unwrap_err();
    assert!(matches!(err, ToolError::ExecutionFailed(msg) if !msg.contains(NO_RESULTS_MARKER)));
}

#[tokio::test]
async fn retrieve_documents_validates_arguments() {
    let kb = Arc::new(KnowledgeBase::from_config(RetrievalConfig::default(), Arc::new(HashEmbedder::new(64))).unwrap());
    let registry = default_registry(kb);
    for params in [json!({}), json!({"query": 5}), json!({"query": "x", "k": 0}), json!({"query": "  "})] {
        let err = registry.invoke("retrieve_documents", ToolInput::new(params.clone())).await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidInput(_)), "{params}: {err:?}");
    }
}

#[tokio::test]
async fn calculator_and_converter_through_registry() {
    let kb = Arc::new(KnowledgeBase::from_config(RetrievalConfig::default(), Arc::new(HashEmbedder::new(64))).unwrap());
    let registry = default_registry(kb);

    let out = registry.invoke("calculate", ToolInput::new(json!({"expression": "sqrt(16) + 2^3"}))).await.unwrap();
    assert_eq!(out.message, "sqrt(16) + 2^3 = 12");
    assert_eq!(out.data.unwrap()["result"], 12.0);

    let err = registry.invoke("calculate", ToolInput::new(json!({"expression": "__import__('os')"}))).await.unwrap_err();
    assert!(matches!(err, ToolError::InvalidInput(_)));

    let out = registry
        .invoke("convert_units", ToolInput::new(json!({"value": 100, "from_unit": "km", "to_unit": "mi"})))
        .await
        .unwrap();
    assert_eq!(out.message, "100.0 km = 62.1371 mi");
}
