//! Configuration management for DocQA.
//!
//! Settings are assembled once at process start, in increasing precedence:
//! - Built-in defaults
//! - The YAML config file (`docqa.yaml` in the working directory, or `--config`)
//! - `DOCQA_*` environment variables
//! - Command-line flags
//!
//! The resulting [`Settings`] is validated and then handed by reference (or
//! inside an `Arc`) to every component that needs it. Nothing reads
//! configuration from global state afterwards.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{AppError, AppResult};

/// Default config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "docqa.yaml";

pub const KNOWN_EMBEDDING_PROVIDERS: &[&str] = &["ollama", "mock"];
pub const KNOWN_RERANKER_PROVIDERS: &[&str] = &["http", "lexical"];
pub const KNOWN_GENERATION_PROVIDERS: &[&str] = &["ollama"];

/// Main application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Directory scanned (non-recursively) by `ingest`
    pub files_directory: PathBuf,

    pub store: StoreSettings,

    pub retrieval: RetrievalSettings,

    pub chunking: ChunkingSettings,

    pub embedding: EmbeddingSettings,

    pub reranker: RerankerSettings,

    pub generation: GenerationSettings,

    /// Optional YAML file overriding the built-in answer prompt
    pub prompt_file: Option<PathBuf>,

    pub server: ServerSettings,

    pub logging: LoggingSettings,
}

/// Which vector store backend holds the chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// LanceDB table persisted on disk
    Lancedb,
    /// Process-local store, lost on exit
    Memory,
}

/// Metric the vector store ranks by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimilarityMetric {
    #[serde(rename = "L2", alias = "l2")]
    L2,
    #[serde(rename = "COSINE", alias = "cosine")]
    Cosine,
    #[serde(rename = "IP", alias = "ip", alias = "dot")]
    InnerProduct,
}

impl FromStr for SimilarityMetric {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "L2" => Ok(Self::L2),
            "COSINE" => Ok(Self::Cosine),
            "IP" | "DOT" => Ok(Self::InnerProduct),
            other => Err(AppError::Config(format!(
                "Unknown similarity metric: {}. Supported: L2, COSINE, IP",
                other
            ))),
        }
    }
}

impl fmt::Display for SimilarityMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::L2 => "L2",
            Self::Cosine => "COSINE",
            Self::InnerProduct => "IP",
        };
        f.write_str(name)
    }
}

impl FromStr for StoreBackend {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "lancedb" => Ok(Self::Lancedb),
            "memory" => Ok(Self::Memory),
            other => Err(AppError::Config(format!(
                "Unknown vector store: {}. Supported: lancedb, memory",
                other
            ))),
        }
    }
}

impl fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Lancedb => "lancedb",
            Self::Memory => "memory",
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    pub backend: StoreBackend,

    /// Connection string / directory of the persisted store
    pub persisted_db: String,

    /// Table (collection) holding the chunks
    pub collection: String,

    pub similarity_metric: SimilarityMetric,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalSettings {
    /// Candidates fetched from the vector stage
    pub top_k_retrieval: usize,

    /// Candidates kept after reranking
    pub top_k_ranking: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingSettings {
    /// Maximum chunk length in characters
    pub chunk_size: usize,

    /// Characters shared between consecutive chunks
    pub chunk_overlap: usize,

    /// Chunks embedded per provider call during ingestion
    pub embed_batch_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    /// "ollama" or "mock"
    pub provider: String,

    /// Model name or a short alias from `aliases`
    pub model: String,

    pub dimensions: usize,

    pub endpoint: String,

    /// Short name -> provider model identifier
    pub aliases: HashMap<String, String>,
}

impl EmbeddingSettings {
    /// Resolve `model` through the alias table.
    pub fn resolved_model(&self) -> &str {
        self.aliases
            .get(&self.model)
            .map(String::as_str)
            .unwrap_or(&self.model)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RerankerSettings {
    /// "http" (TEI-compatible rerank service) or "lexical"
    pub provider: String,

    pub model: String,

    pub endpoint: String,

    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    pub provider: String,

    pub endpoint: String,

    pub model: String,

    pub temperature: f32,

    pub max_tokens: u32,

    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: Option<String>,
    pub no_color: bool,
    pub verbose: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            files_directory: PathBuf::from("./Files"),
            store: StoreSettings::default(),
            retrieval: RetrievalSettings::default(),
            chunking: ChunkingSettings::default(),
            embedding: EmbeddingSettings::default(),
            reranker: RerankerSettings::default(),
            generation: GenerationSettings::default(),
            prompt_file: None,
            server: ServerSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Lancedb,
            persisted_db: "./data/docqa.lancedb".to_string(),
            collection: "rag_documents".to_string(),
            similarity_metric: SimilarityMetric::L2,
        }
    }
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            top_k_retrieval: 10,
            top_k_ranking: 5,
        }
    }
}

impl Default for ChunkingSettings {
    fn default() -> Self {
        Self {
            chunk_size: 500,
            chunk_overlap: 50,
            embed_batch_size: 32,
        }
    }
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        let aliases = [
            ("MiniLM", "all-minilm"),
            ("nomic", "nomic-embed-text"),
            ("mxbai", "mxbai-embed-large"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        Self {
            provider: "ollama".to_string(), // Local-first default
            model: "nomic".to_string(),
            dimensions: 768,
            endpoint: "http://localhost:11434".to_string(),
            aliases,
        }
    }
}

impl Default for RerankerSettings {
    fn default() -> Self {
        Self {
            provider: "http".to_string(),
            model: "BAAI/bge-reranker-base".to_string(),
            endpoint: "http://localhost:8080".to_string(),
            timeout_secs: 30,
        }
    }
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            provider: "ollama".to_string(),
            endpoint: "http://localhost:11434".to_string(),
            model: "gemma3:1b".to_string(),
            temperature: 0.7,
            max_tokens: 1024,
            timeout_secs: 120,
        }
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

impl Settings {
    /// Load settings from defaults, the YAML file and the process environment.
    ///
    /// An explicit `config_file` must exist. Without one, `docqa.yaml` in the
    /// working directory is read if present.
    ///
    /// # Example
    /// ```no_run
    /// use docqa_core::Settings;
    ///
    /// let settings = Settings::load(None).expect("Failed to load settings");
    /// println!("Collection: {}", settings.store.collection);
    /// ```
    pub fn load(config_file: Option<&Path>) -> AppResult<Self> {
        let config_file = config_file
            .map(Path::to_path_buf)
            .or_else(|| std::env::var("DOCQA_CONFIG").ok().map(PathBuf::from));

        let mut settings = match config_file {
            Some(path) => {
                if !path.exists() {
                    return Err(AppError::Config(format!(
                        "Config file does not exist: {:?}",
                        path
                    )));
                }
                Self::from_yaml_file(&path)?
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::from_yaml_file(&default_path)?
                } else {
                    Self::default()
                }
            }
        };

        settings.apply_env(|key| std::env::var(key).ok())?;

        Ok(settings)
    }

    /// Parse a YAML config file. Missing keys keep their defaults.
    pub fn from_yaml_file(path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        Self::from_yaml_str(&contents)
            .map_err(|e| AppError::Config(format!("Failed to parse config file {:?}: {}", path, e)))
    }

    pub fn from_yaml_str(contents: &str) -> AppResult<Self> {
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(contents)?)
    }

    /// Overlay `DOCQA_*` variables resolved through `lookup`.
    ///
    /// Environment variables:
    /// - `DOCQA_FILES_DIRECTORY`
    /// - `DOCQA_VECTOR_STORE`: `lancedb` or `memory`
    /// - `DOCQA_PERSISTED_DB`
    /// - `DOCQA_COLLECTION`
    /// - `DOCQA_SIMILARITY_METRIC`: `L2`, `COSINE` or `IP`
    /// - `DOCQA_TOP_K_RETRIEVAL`, `DOCQA_TOP_K_RANKING`
    /// - `DOCQA_EMBEDDING_PROVIDER`, `DOCQA_EMBEDDING_MODEL`, `DOCQA_EMBEDDING_ENDPOINT`
    /// - `DOCQA_RERANKER_PROVIDER`, `DOCQA_RERANKER_MODEL`, `DOCQA_RERANKER_ENDPOINT`
    /// - `DOCQA_GENERATION_MODEL`, `DOCQA_GENERATION_ENDPOINT`
    /// - `DOCQA_PROMPT_FILE`
    /// - `NO_COLOR`: disable colored output
    pub fn apply_env<F>(&mut self, lookup: F) -> AppResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup("DOCQA_FILES_DIRECTORY") {
            self.files_directory = PathBuf::from(dir);
        }
        if let Some(backend) = lookup("DOCQA_VECTOR_STORE") {
            self.store.backend = backend.parse()?;
        }
        if let Some(uri) = lookup("DOCQA_PERSISTED_DB") {
            self.store.persisted_db = uri;
        }
        if let Some(collection) = lookup("DOCQA_COLLECTION") {
            self.store.collection = collection;
        }
        if let Some(metric) = lookup("DOCQA_SIMILARITY_METRIC") {
            self.store.similarity_metric = metric.parse()?;
        }
        if let Some(k) = lookup("DOCQA_TOP_K_RETRIEVAL") {
            self.retrieval.top_k_retrieval = parse_number("DOCQA_TOP_K_RETRIEVAL", &k)?;
        }
        if let Some(k) = lookup("DOCQA_TOP_K_RANKING") {
            self.retrieval.top_k_ranking = parse_number("DOCQA_TOP_K_RANKING", &k)?;
        }
        if let Some(provider) = lookup("DOCQA_EMBEDDING_PROVIDER") {
            self.embedding.provider = provider;
        }
        if let Some(model) = lookup("DOCQA_EMBEDDING_MODEL") {
            self.embedding.model = model;
        }
        if let Some(endpoint) = lookup("DOCQA_EMBEDDING_ENDPOINT") {
            self.embedding.endpoint = endpoint;
        }
        if let Some(provider) = lookup("DOCQA_RERANKER_PROVIDER") {
            self.reranker.provider = provider;
        }
        if let Some(model) = lookup("DOCQA_RERANKER_MODEL") {
            self.reranker.model = model;
        }
        if let Some(endpoint) = lookup("DOCQA_RERANKER_ENDPOINT") {
            self.reranker.endpoint = endpoint;
        }
        if let Some(model) = lookup("DOCQA_GENERATION_MODEL") {
            self.generation.model = model;
        }
        if let Some(endpoint) = lookup("DOCQA_GENERATION_ENDPOINT") {
            self.generation.endpoint = endpoint;
        }
        if let Some(prompt_file) = lookup("DOCQA_PROMPT_FILE") {
            self.prompt_file = Some(PathBuf::from(prompt_file));
        }
        if lookup("NO_COLOR").is_some() {
            self.logging.no_color = true;
        }

        Ok(())
    }

    /// Apply CLI overrides to the settings.
    ///
    /// Flags win over both the config file and the environment.
    pub fn with_overrides(
        mut self,
        files_directory: Option<PathBuf>,
        persisted_db: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(dir) = files_directory {
            self.files_directory = dir;
        }

        if let Some(uri) = persisted_db {
            self.store.persisted_db = uri;
        }

        if let Some(level) = log_level {
            self.logging.level = Some(level);
        }

        if verbose {
            self.logging.verbose = true;
            // Verbose mode implies debug logging
            if self.logging.level.is_none() {
                self.logging.level = Some("debug".to_string());
            }
        }

        if no_color {
            self.logging.no_color = true;
        }

        self
    }

    /// Check cross-field invariants and provider names.
    pub fn validate(&self) -> AppResult<()> {
        let retrieval = &self.retrieval;
        if retrieval.top_k_ranking == 0 {
            return Err(AppError::Config(
                "top_k_ranking must be greater than 0".to_string(),
            ));
        }
        if retrieval.top_k_retrieval < retrieval.top_k_ranking {
            return Err(AppError::Config(format!(
                "top_k_retrieval ({}) must be >= top_k_ranking ({})",
                retrieval.top_k_retrieval, retrieval.top_k_ranking
            )));
        }

        let chunking = &self.chunking;
        if chunking.chunk_size == 0 {
            return Err(AppError::Config(
                "chunk_size must be greater than 0".to_string(),
            ));
        }
        if chunking.chunk_overlap >= chunking.chunk_size {
            return Err(AppError::Config(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                chunking.chunk_overlap, chunking.chunk_size
            )));
        }
        if chunking.embed_batch_size == 0 {
            return Err(AppError::Config(
                "embed_batch_size must be greater than 0".to_string(),
            ));
        }

        if self.store.collection.trim().is_empty() {
            return Err(AppError::Config(
                "store collection name cannot be empty".to_string(),
            ));
        }

        if self.embedding.dimensions == 0 {
            return Err(AppError::Config(
                "embedding dimensions must be greater than 0".to_string(),
            ));
        }

        check_known("embedding", &self.embedding.provider, KNOWN_EMBEDDING_PROVIDERS)?;
        check_known("reranker", &self.reranker.provider, KNOWN_RERANKER_PROVIDERS)?;
        check_known(
            "generation",
            &self.generation.provider,
            KNOWN_GENERATION_PROVIDERS,
        )?;

        if !(0.0..=2.0).contains(&self.generation.temperature) {
            return Err(AppError::Config(format!(
                "generation temperature must be within 0.0..=2.0, got {}",
                self.generation.temperature
            )));
        }

        if self.reranker.timeout_secs == 0 || self.generation.timeout_secs == 0 {
            return Err(AppError::Config(
                "timeouts must be at least one second".to_string(),
            ));
        }

        Ok(())
    }
}

fn parse_number(key: &str, value: &str) -> AppResult<usize> {
    value
        .trim()
        .parse()
        .map_err(|_| AppError::Config(format!("{} must be a whole number, got '{}'", key, value)))
}

fn check_known(kind: &str, provider: &str, known: &[&str]) -> AppResult<()> {
    if known.contains(&provider.to_lowercase().as_str()) {
        Ok(())
    } else {
        Err(AppError::Config(format!(
            "Unknown {} provider: {}. Supported: {}",
            kind,
            provider,
            known.join(", ")
        )))
    }
}
