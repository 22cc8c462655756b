use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context as _, Result};
use clap::Parser as _;
use tracing_subscriber::{layer::SubscriberExt as _, util::SubscriberInitExt as _};

use knowdb_core::config::{expand_path, Config, RetrievalConfig};
use knowdb_core::{corpus, Document, Error};
use knowdb_embed::get_default_embedder;
use knowdb_retrieve::KnowledgeBase;
use knowdb_tools::{default_registry, ToolInput};
use knowdb_vector::FlatIndex;

mod cli;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "knowdb=info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::load().context("loading configuration")?;
    let cli = Cli::parse();

    match cli.command {
        Commands::Query { text, k, corpus, metric, style } => {
            let mut retrieval = config.retrieval()?;
            if let Some(metric) = metric {
                retrieval.metric = metric.parse()?;
            }
            if let Some(style) = style {
                retrieval.citation_style = style.parse()?;
            }
            let kb = knowledge_base(&config, retrieval, &corpus).await?;
            let k = k.unwrap_or(kb.config().top_k);
            match kb.retrieve_text(&text, k).await {
                Ok(out) => println!("{out}"),
                Err(e @ Error::Retrieval(_)) => bail!("retrieval unavailable: {e}"),
                Err(e) => return Err(e.into()),
            }
        }
        Commands::Tool { name, input, corpus } => {
            let params: serde_json::Value = serde_json::from_str(&input).context("tool input must be JSON")?;
            let kb = knowledge_base(&config, config.retrieval()?, &corpus).await?;
            let registry = default_registry(Arc::new(kb));
            let out = registry.invoke(&name, ToolInput::new(params)).await?;
            println!("{}", out.message);
        }
        Commands::Tools => {
            let kb = KnowledgeBase::from_config(config.retrieval()?, embedder(&config)?)?;
            for tool in default_registry(Arc::new(kb)).list_tools() {
                println!("{:<20} {}", tool.name(), tool.description());
            }
        }
    }
    Ok(())
}

fn embedder(config: &Config) -> Result<Arc<dyn knowdb_core::traits::Embedder>> {
    Ok(get_default_embedder(&config.embedder()?, &config.retrieval()?))
}

async fn knowledge_base(
    config: &Config,
    retrieval: RetrievalConfig,
    source: &str,
) -> Result<KnowledgeBase<FlatIndex>> {
    let documents = load_corpus(source)?;
    let kb = KnowledgeBase::from_config(retrieval, embedder(config)?)?;
    let report = kb.ingest(documents).await?;
    tracing::info!(corpus = source, documents = report.documents, "corpus ready");
    Ok(kb)
}

fn load_corpus(source: &str) -> Result<Vec<Document>> {
    if let Some(docs) = corpus::builtin(source) {
        return Ok(docs);
    }
    let path = expand_path(source);
    load_path(&path).with_context(|| format!("loading corpus from {}", path.display()))
}

fn load_path(path: &Path) -> Result<Vec<Document>> {
    if path.is_dir() {
        Ok(corpus::load_dir(path)?)
    } else if path.is_file() {
        Ok(corpus::load_json(path)?)
    } else {
        bail!("not a built-in corpus, file or directory")
    }
}
