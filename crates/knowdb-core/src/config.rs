//! Configuration loader and path helpers.
//!
//! Uses Figment to merge `config.toml` + `config.<env>.toml` + `APP_*` env vars.
//! Nested keys use a double underscore: `APP_RETRIEVAL__TOP_K=5`.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::types::{CitationStyle, SimilarityMetric};

pub const DEFAULT_TOP_K: usize = 3;
pub const DEFAULT_EMBED_TIMEOUT_MS: u64 = 5_000;
pub const DEFAULT_EMBEDDING_DIM: usize = 1024;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    pub top_k: usize,
    pub metric: SimilarityMetric,
    /// Expected vector dimension. When unset the index infers it from the first built vector.
    pub embedding_dimension: Option<usize>,
    pub embed_timeout_ms: u64,
    pub citation_style: CitationStyle,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            metric: SimilarityMetric::Cosine,
            embedding_dimension: None,
            embed_timeout_ms: DEFAULT_EMBED_TIMEOUT_MS,
            citation_style: CitationStyle::Inline,
        }
    }
}

impl RetrievalConfig {
    pub fn validate(&self) -> Result<()> {
        if self.top_k == 0 {
            return Err(Error::InvalidConfig("retrieval.top_k must be positive".into()));
        }
        if self.embedding_dimension == Some(0) {
            return Err(Error::InvalidConfig("retrieval.embedding_dimension must be positive".into()));
        }
        if self.embed_timeout_ms == 0 {
            return Err(Error::InvalidConfig("retrieval.embed_timeout_ms must be positive".into()));
        }
        Ok(())
    }

    pub fn embed_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.embed_timeout_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbedderConfig {
    pub dimension: usize,
    /// Keep a write-through cache of document embeddings keyed by content hash.
    pub cache: bool,
}

impl Default for EmbedderConfig {
    fn default() -> Self {
        Self { dimension: DEFAULT_EMBEDDING_DIM, cache: true }
    }
}

impl EmbedderConfig {
    pub fn validate(&self) -> Result<()> {
        if self.dimension == 0 {
            return Err(Error::InvalidConfig("embedder.dimension must be positive".into()));
        }
        Ok(())
    }
}

pub struct Config {
    figment: Figment,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Figment::new().merge(Toml::file("config.toml"));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file("config.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("config.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("config.test.toml")),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));

        let config = Self { figment };
        config.validate()?;
        tracing::debug!(env = %env_name, "configuration loaded");
        Ok(config)
    }

    pub fn from_figment(figment: Figment) -> Self {
        Self { figment }
    }

    pub fn get<T>(&self, key: &str) -> anyhow::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| anyhow::anyhow!("Failed to get '{}': {}", key, e))
    }

    pub fn retrieval(&self) -> Result<RetrievalConfig> {
        self.section("retrieval")
    }

    pub fn embedder(&self) -> Result<EmbedderConfig> {
        self.section("embedder")
    }

    /// Extract a section on top of its defaults so a missing table is not an error.
    fn section<T>(&self, key: &str) -> Result<T>
    where
        T: Default + Serialize + serde::de::DeserializeOwned,
    {
        Figment::new()
            .merge(Serialized::defaults(T::default()))
            .merge(self.figment.focus(key))
            .extract()
            .map_err(|e| Error::InvalidConfig(format!("[{key}]: {e}")))
    }

    fn validate(&self) -> Result<()> {
        self.retrieval()?.validate()?;
        self.embedder()?.validate()
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}
