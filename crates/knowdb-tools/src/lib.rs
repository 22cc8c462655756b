//! Agent-callable tools over the knowledge base.

use std::sync::Arc;

use knowdb_core::traits::VectorIndexer;
use knowdb_retrieve::KnowledgeBase;

pub mod calc;
pub mod registry;
pub mod retrieve;
pub mod tool;
pub mod units;

pub use calc::CalculatorTool;
pub use registry::ToolRegistry;
pub use retrieve::RetrieveDocumentsTool;
pub use tool::{Tool, ToolError, ToolInput, ToolOutput, ToolResult};
pub use units::ConvertUnitsTool;

/// Registry with the retrieval, calculator and unit conversion tools.
pub fn default_registry<VI: VectorIndexer + 'static>(kb: Arc<KnowledgeBase<VI>>) -> ToolRegistry {
    let tools: [Arc<dyn Tool>; 3] =
        [Arc::new(RetrieveDocumentsTool::new(kb)), Arc::new(CalculatorTool), Arc::new(ConvertUnitsTool)];
    let mut registry = ToolRegistry::new();
    for tool in tools {
        // Names are distinct constants.
        if let Err(e) = registry.register(tool) {
            tracing::error!(error = %e, "default tool skipped");
        }
    }
    registry
}
