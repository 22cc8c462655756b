//! Domain types shared by the store, the index and the retrieval façade.

use serde::{Deserialize, Serialize};

pub type DocumentId = String;
pub type Embedding = Vec<f32>;

/// An immutable corpus record.
///
/// - `id`: unique within one load
/// - `title`: short human-readable label used in citations
/// - `content`: the text that gets embedded and handed to the model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub title: String,
    pub content: String,
}

impl Document {
    pub fn new(id: impl Into<String>, title: impl Into<String>, content: impl Into<String>) -> Self {
        Self { id: id.into(), title: title.into(), content: content.into() }
    }
}

/// The minimal surface returned by a vector index.
///
/// `id` matches `Document::id`. `score` is metric-specific but higher is
/// always better.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: DocumentId,
    pub score: f32,
}

/// One ranked entry of a retrieval result. `rank` starts at 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedDocument {
    pub rank: usize,
    pub document: Document,
    pub score: f32,
}

/// Similarity metric used to rank index entries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SimilarityMetric {
    /// Inner product of L2-normalized vectors.
    #[default]
    Cosine,
    /// Exact L2 distance, reported as `1 / (1 + distance)`.
    Euclidean,
}

impl std::str::FromStr for SimilarityMetric {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cosine" => Ok(Self::Cosine),
            "euclidean" | "l2" => Ok(Self::Euclidean),
            other => Err(crate::error::Error::InvalidConfig(format!("unknown similarity metric '{other}'"))),
        }
    }
}

/// Layout of the citation block handed back to an agent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CitationStyle {
    /// `rank. title: content`, one line per result.
    #[default]
    Inline,
    /// `[rank] title:` followed by the content, entries separated by a blank line.
    Block,
}

impl std::str::FromStr for CitationStyle {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "inline" => Ok(Self::Inline),
            "block" => Ok(Self::Block),
            other => Err(crate::error::Error::InvalidConfig(format!("unknown citation style '{other}'"))),
        }
    }
}
