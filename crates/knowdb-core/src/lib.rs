#![deny(warnings)]
#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

pub mod config;
pub mod corpus;
pub mod error;
pub mod store;
pub mod traits;
pub mod types;

pub use error::{Error, ProviderError, Result};
pub use types::{CitationStyle, Document, DocumentId, Embedding, RetrievedDocument, SearchHit, SimilarityMetric};
