use std::sync::Arc;

use async_trait::async_trait;
use knowdb_core::traits::VectorIndexer;
use knowdb_core::Error;
use knowdb_retrieve::KnowledgeBase;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{Tool, ToolError, ToolInput, ToolOutput, ToolResult};

#[derive(Debug, Deserialize)]
struct RetrieveArgs {
    query: String,
    k: Option<usize>,
}

/// Exposes `KnowledgeBase::retrieve_text` to agents.
///
/// A provider failure fails the call. It is never rendered as the
/// no-results marker, so the agent can tell "nothing relevant" from
/// "retrieval is down".
pub struct RetrieveDocumentsTool<VI: VectorIndexer> {
    kb: Arc<KnowledgeBase<VI>>,
}

impl<VI: VectorIndexer> RetrieveDocumentsTool<VI> {
    pub fn new(kb: Arc<KnowledgeBase<VI>>) -> Self {
        Self { kb }
    }
}

#[async_trait]
impl<VI: VectorIndexer + 'static> Tool for RetrieveDocumentsTool<VI> {
    fn name(&self) -> &'static str {
        "retrieve_documents"
    }

    fn description(&self) -> &'static str {
        "Search the knowledge base for documents relevant to a query and return them as numbered citations."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {"type": "string", "description": "Natural-language search query"},
                "k": {"type": "integer", "minimum": 1, "description": "Number of documents to return"}
            },
            "required": ["query"]
        })
    }

    async fn invoke(&self, input: ToolInput) -> ToolResult<ToolOutput> {
        let args: RetrieveArgs = input.parse()?;
        let k = args.k.unwrap_or(self.kb.config().top_k);
        match self.kb.retrieve_text(&args.query, k).await {
            Ok(text) => Ok(ToolOutput::success_with_data(text, json!({"query": args.query, "k": k}))),
            Err(Error::InvalidInput(msg)) => Err(ToolError::InvalidInput(msg)),
            Err(e @ Error::Retrieval(_)) => Err(ToolError::ExecutionFailed(format!("retrieval unavailable: {e}"))),
            Err(e) => Err(ToolError::ExecutionFailed(e.to_string())),
        }
    }
}
