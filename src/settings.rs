use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::domain::DomainError;
use crate::infrastructure::embeddings::{DEFAULT_SIMPLE_DIMENSIONS, DEFAULT_SIMPLE_MODEL};

/// Manifest filename inside the vector store directory.
const CONFIG_FILENAME: &str = "config.json";

/// Embedding backends compiled into the binary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "backend", rename_all = "kebab-case")]
pub enum EmbeddingBackend {
    /// Deterministic hash embedder (always available).
    Simple {
        #[serde(default = "default_simple_model")]
        model: String,
        #[serde(default = "default_simple_dim")]
        dimensions: usize,
    },
    /// Semantic embeddings powered by FastEmbed (feature gated).
    #[cfg(feature = "fastembed-engine")]
    FastEmbed { model: String },
}

impl EmbeddingBackend {
    pub fn id(&self) -> &'static str {
        match self {
            EmbeddingBackend::Simple { .. } => "simple",
            #[cfg(feature = "fastembed-engine")]
            EmbeddingBackend::FastEmbed { .. } => "fastembed",
        }
    }

    pub fn model_name(&self) -> &str {
        match self {
            EmbeddingBackend::Simple { model, .. } => model,
            #[cfg(feature = "fastembed-engine")]
            EmbeddingBackend::FastEmbed { model } => model,
        }
    }

    pub fn with_default_model(id: &str) -> Option<Self> {
        match id.trim().to_ascii_lowercase().as_str() {
            "simple" => Some(EmbeddingBackend::Simple {
                model: default_simple_model(),
                dimensions: default_simple_dim(),
            }),
            #[cfg(feature = "fastembed-engine")]
            "fastembed" => Some(EmbeddingBackend::FastEmbed {
                model: default_fastembed_model(),
            }),
            _ => None,
        }
    }

    /// Resolves a backend id plus an optional model override.
    pub fn resolve(id: &str, model: Option<&str>) -> Result<Self, DomainError> {
        let mut backend = Self::with_default_model(id).ok_or_else(|| {
            DomainError::validation(format!(
                "unknown or unavailable embedding backend `{id}` (available: {})",
                available_backend_ids().join(", ")
            ))
        })?;

        if let Some(name) = model.map(str::trim).filter(|name| !name.is_empty()) {
            match &mut backend {
                EmbeddingBackend::Simple { model, .. } => *model = name.to_string(),
                #[cfg(feature = "fastembed-engine")]
                EmbeddingBackend::FastEmbed { model } => *model = name.to_string(),
            }
        }

        Ok(backend)
    }
}

impl Default for EmbeddingBackend {
    fn default() -> Self {
        #[cfg(feature = "fastembed-engine")]
        {
            EmbeddingBackend::FastEmbed {
                model: default_fastembed_model(),
            }
        }
        #[cfg(not(feature = "fastembed-engine"))]
        {
            EmbeddingBackend::Simple {
                model: default_simple_model(),
                dimensions: default_simple_dim(),
            }
        }
    }
}

pub fn available_backend_ids() -> Vec<&'static str> {
    #[cfg(feature = "fastembed-engine")]
    {
        vec!["fastembed", "simple"]
    }
    #[cfg(not(feature = "fastembed-engine"))]
    {
        vec!["simple"]
    }
}

/// Manifest persisted next to the vector store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub embedding: EmbeddingBackend,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_csv: Option<PathBuf>,
}

/// Thread-safe manager loading and persisting the store manifest.
pub struct ConfigManager {
    path: PathBuf,
    exists: bool,
    state: RwLock<StoreConfig>,
}

impl ConfigManager {
    /// Loads `<data_dir>/config.json`. A missing file yields defaults; a file
    /// that exists but cannot be read or parsed is a storage error.
    pub fn load(data_dir: impl AsRef<Path>) -> Result<Self, DomainError> {
        let path = data_dir.as_ref().join(CONFIG_FILENAME);
        let loaded = match fs::read(&path) {
            Ok(bytes) => Some(serde_json::from_slice::<StoreConfig>(&bytes).map_err(|err| {
                DomainError::storage(format!(
                    "store manifest {} is unreadable: {err}",
                    path.display()
                ))
            })?),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => None,
            Err(err) => {
                return Err(DomainError::storage(format!(
                    "failed to read store manifest {}: {err}",
                    path.display()
                )))
            }
        };

        Ok(Self {
            path,
            exists: loaded.is_some(),
            state: RwLock::new(loaded.unwrap_or_default()),
        })
    }

    /// A manager with default contents that ignores whatever is on disk.
    pub fn fresh(data_dir: impl AsRef<Path>) -> Self {
        Self {
            path: data_dir.as_ref().join(CONFIG_FILENAME),
            exists: false,
            state: RwLock::new(StoreConfig::default()),
        }
    }

    /// Whether a manifest was found on disk when loading.
    pub fn exists(&self) -> bool {
        self.exists
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn current(&self) -> StoreConfig {
        self.state.read().clone()
    }

    /// Replaces the manifest and writes it to disk.
    pub fn save(&self, config: StoreConfig) -> std::io::Result<StoreConfig> {
        let mut guard = self.state.write();
        self.persist(&config)?;
        *guard = config;
        Ok(guard.clone())
    }

    fn persist(&self, config: &StoreConfig) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let payload = serde_json::to_vec_pretty(config)?;
        fs::write(&self.path, payload)
    }
}

/// LLM providers the connector can talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    #[default]
    Ollama,
    OpenAi,
    Anthropic,
}

impl LlmProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            LlmProvider::Ollama => "ollama",
            LlmProvider::OpenAi => "openai",
            LlmProvider::Anthropic => "anthropic",
        }
    }

    fn base_env(&self) -> (&'static str, &'static str) {
        match self {
            LlmProvider::Ollama => ("OLLAMA_API_BASE", "http://localhost:11434"),
            LlmProvider::OpenAi => ("OPENAI_API_BASE", "https://api.openai.com/v1"),
            LlmProvider::Anthropic => ("ANTHROPIC_API_BASE", "https://api.anthropic.com/v1"),
        }
    }

    fn key_env(&self) -> Option<&'static str> {
        match self {
            LlmProvider::Ollama => None,
            LlmProvider::OpenAi => Some("OPENAI_API_KEY"),
            LlmProvider::Anthropic => Some("ANTHROPIC_API_KEY"),
        }
    }
}

impl fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LlmProvider {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "ollama" => Ok(LlmProvider::Ollama),
            "openai" => Ok(LlmProvider::OpenAi),
            "anthropic" => Ok(LlmProvider::Anthropic),
            other => Err(DomainError::validation(format!(
                "Unsupported LLM provider: {other}. Supported providers: ollama, openai, anthropic"
            ))),
        }
    }
}

pub const DEFAULT_LLM_MODEL: &str = "gemma3:27b-it-qat";

/// Connection settings for the language model.
#[derive(Debug, Clone, PartialEq)]
pub struct LlmSettings {
    pub provider: LlmProvider,
    pub model: String,
    pub api_key: Option<String>,
    pub api_base: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout: Duration,
}

impl LlmSettings {
    pub fn from_env() -> Result<Self, DomainError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds settings from an arbitrary variable lookup; blank values count
    /// as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, DomainError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let provider = match get("LLM_PROVIDER") {
            Some(value) => value.parse()?,
            None => LlmProvider::default(),
        };

        let (base_key, base_default) = provider.base_env();
        let api_base = get("LLM_API_BASE")
            .or_else(|| get(base_key))
            .unwrap_or_else(|| base_default.to_string())
            .trim_end_matches('/')
            .to_string();

        let api_key = provider.key_env().and_then(|key| get(key));
        if provider.key_env().is_some() && api_key.is_none() {
            return Err(DomainError::validation(format!(
                "API key required for {provider}"
            )));
        }

        let timeout_secs = parse_or(get("LLM_TIMEOUT_SECS"), "LLM_TIMEOUT_SECS", 120)?;

        Ok(Self {
            provider,
            model: get("LLM_MODEL").unwrap_or_else(|| DEFAULT_LLM_MODEL.to_string()),
            api_key,
            api_base,
            temperature: parse_or(get("LLM_TEMPERATURE"), "LLM_TEMPERATURE", 0.2)?,
            max_tokens: parse_or(get("LLM_MAX_TOKENS"), "LLM_MAX_TOKENS", 2000)?,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

fn parse_or<T: FromStr>(value: Option<String>, key: &str, default: T) -> Result<T, DomainError> {
    match value {
        Some(raw) => raw
            .parse()
            .map_err(|_| DomainError::validation(format!("invalid value `{raw}` for {key}"))),
        None => Ok(default),
    }
}

const fn default_simple_dim() -> usize {
    DEFAULT_SIMPLE_DIMENSIONS
}

fn default_simple_model() -> String {
    DEFAULT_SIMPLE_MODEL.to_string()
}

#[cfg(feature = "fastembed-engine")]
fn default_fastembed_model() -> String {
    crate::infrastructure::embeddings::DEFAULT_FASTEMBED_MODEL.to_string()
}
