//! Corpus sources: the built-in knowledge bases, JSON files and directories of
//! `.txt` files, plus validation of ingestion input.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::types::Document;

/// Software architecture knowledge base used by the research agents.
pub fn architecture() -> Vec<Document> {
    vec![
        Document::new(
            "arch1",
            "Microservices Architecture",
            "Microservices breaks applications into small, independent services. \
             Benefits: independent deployment, technology flexibility. \
             Challenges: distributed complexity, data consistency.",
        ),
        Document::new(
            "arch2",
            "Monolithic Architecture",
            "Monolithic bundles all functionality into a single unit. \
             Benefits: simpler development and deployment. \
             Drawbacks: scaling limitations, technology lock-in.",
        ),
        Document::new(
            "cloud1",
            "Cloud Computing",
            "Cloud offers scalability, cost efficiency, and global reach. \
             Key benefits: pay-as-you-go, automatic scaling, managed services. \
             Providers: AWS, Azure, GCP.",
        ),
        Document::new(
            "devops1",
            "DevOps Practices",
            "DevOps combines development and operations. \
             Key practices: CI/CD, infrastructure as code, monitoring. \
             Benefits: faster releases, better collaboration.",
        ),
        Document::new(
            "ai1",
            "AI in Enterprise",
            "Enterprise AI focuses on automation and insights. \
             Use cases: chatbots, analytics, document processing. \
             Challenges: data quality, model governance.",
        ),
    ]
}

/// Machine learning primer used by the question-answering agent.
pub fn ml_primer() -> Vec<Document> {
    vec![
        Document::new(
            "doc1",
            "Introduction to Machine Learning",
            "Machine learning is a subset of AI that enables systems to learn from experience. \
             Key types include supervised learning, unsupervised learning, and reinforcement learning.",
        ),
        Document::new(
            "doc2",
            "Neural Networks",
            "Neural networks are computing systems inspired by biological neural networks. \
             Deep learning uses networks with many layers. \
             Common architectures include CNNs for images and Transformers for sequences.",
        ),
        Document::new(
            "doc3",
            "Large Language Models",
            "LLMs like GPT-4 are trained on vast text data to understand and generate language. \
             They use transformer architecture and can perform tasks like generation, summarization, and Q&A.",
        ),
        Document::new(
            "doc4",
            "RAG Systems",
            "Retrieval-Augmented Generation combines retrieval with generative models. \
             RAG retrieves relevant documents and uses them as context, improving accuracy and reducing hallucinations.",
        ),
        Document::new(
            "doc5",
            "Vector Databases",
            "Vector databases store data as embeddings and enable similarity search. \
             Popular options include Pinecone, Weaviate, Chroma, and FAISS. Essential for RAG and semantic search.",
        ),
    ]
}

/// Look up a built-in corpus by name.
pub fn builtin(name: &str) -> Option<Vec<Document>> {
    match name {
        "architecture" => Some(architecture()),
        "ml-primer" | "ml_primer" => Some(ml_primer()),
        _ => None,
    }
}

/// Read a JSON array of `{id, title, content}` objects.
pub fn load_json(path: &Path) -> Result<Vec<Document>> {
    let raw = fs::read_to_string(path)
        .map_err(|e| Error::InvalidInput(format!("cannot read {}: {e}", path.display())))?;
    let documents: Vec<Document> = serde_json::from_str(&raw)
        .map_err(|e| Error::InvalidInput(format!("{} is not a document array: {e}", path.display())))?;
    validate(&documents)?;
    Ok(documents)
}

/// Load every `.txt` file under `root`, sorted by path.
///
/// The file stem is the id, the first non-empty line the title and the rest
/// of the file the content. A single-line file uses its line for both.
pub fn load_dir(root: &Path) -> Result<Vec<Document>> {
    let files = list_txt_files(root);
    if files.is_empty() {
        tracing::warn!(dir = %root.display(), "no .txt files found");
    }
    let mut documents = Vec::with_capacity(files.len());
    for path in &files {
        let raw = match fs::read_to_string(path) {
            Ok(s) => s,
            Err(_) => String::from_utf8_lossy(
                &fs::read(path).map_err(|e| Error::InvalidInput(format!("cannot read {}: {e}", path.display())))?,
            )
            .into_owned(),
        };
        let id = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .ok_or_else(|| Error::InvalidInput(format!("{} has no file name", path.display())))?;
        let (title, content) = split_title(&raw);
        documents.push(Document { id, title, content });
    }
    tracing::info!(dir = %root.display(), documents = documents.len(), "loaded corpus directory");
    validate(&documents)?;
    Ok(documents)
}

/// Check ingestion input: non-empty fields and ids unique within the batch.
pub fn validate(documents: &[Document]) -> Result<()> {
    let mut seen = HashSet::with_capacity(documents.len());
    for doc in documents {
        if doc.id.trim().is_empty() {
            return Err(Error::InvalidInput("document id must not be empty".into()));
        }
        if doc.title.trim().is_empty() {
            return Err(Error::InvalidInput(format!("document '{}' has an empty title", doc.id)));
        }
        if doc.content.trim().is_empty() {
            return Err(Error::InvalidInput(format!("document '{}' has empty content", doc.id)));
        }
        if !seen.insert(doc.id.as_str()) {
            return Err(Error::DuplicateId(doc.id.clone()));
        }
    }
    Ok(())
}

fn split_title(raw: &str) -> (String, String) {
    let trimmed = raw.trim();
    match trimmed.split_once('\n') {
        Some((first, rest)) if !rest.trim().is_empty() => (first.trim().to_string(), rest.trim().to_string()),
        Some((first, _)) => (first.trim().to_string(), first.trim().to_string()),
        None => (trimmed.to_string(), trimmed.to_string()),
    }
}

fn list_txt_files(root: &Path) -> Vec<PathBuf> {
    let mut txt_files: Vec<PathBuf> = walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| p.extension().and_then(|s| s.to_str()) == Some("txt"))
        .collect();
    txt_files.sort();
    txt_files
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_title_uses_first_line() {
        let (title, content) = split_title("\n  Water storage \n\nKeep barrels sealed.\nRotate yearly.\n");
        assert_eq!(title, "Water storage");
        assert_eq!(content, "Keep barrels sealed.\nRotate yearly.");
    }

    #[test]
    fn split_title_single_line_reuses_line() {
        let (title, content) = split_title("just one line");
        assert_eq!(title, "just one line");
        assert_eq!(content, "just one line");
    }

    #[test]
    fn builtin_corpora_are_valid() {
        for name in ["architecture", "ml-primer"] {
            let docs = builtin(name).expect("builtin");
            assert_eq!(docs.len(), 5);
            validate(&docs).expect("valid");
        }
        assert!(builtin("weather").is_none());
    }
}
