use std::sync::Arc;

use chrono::Utc;
use tracing::debug;

use crate::{
    application::dtos::{HealthStatusResponse, SearchRequest, SearchResponse, SearchResultDto},
    domain::{DomainError, EntryEmbedding, ReviewEntry},
};

const MAX_SEARCH_LIMIT: usize = 100;

/// High level configuration shared by the service and its adapters.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub embedding_model: String,
    pub default_limit: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            embedding_model: "adtarget/simple-hash".into(),
            default_limit: 50,
        }
    }
}

impl ServiceConfig {
    pub fn new(embedding_model: impl Into<String>, default_limit: usize) -> Self {
        Self {
            embedding_model: embedding_model.into(),
            default_limit: default_limit.clamp(1, MAX_SEARCH_LIMIT),
        }
    }

    pub fn with_model(embedding_model: impl Into<String>) -> Self {
        Self::new(embedding_model, Self::default().default_limit)
    }

    pub fn embedding_model(&self) -> &str {
        &self.embedding_model
    }
}

/// Abstraction over any embedding engine (FastEmbed, hashing, remote, etc).
pub trait EmbeddingEngine: Send + Sync {
    fn embed(&self, model: &str, text: &str) -> Result<Vec<f32>, DomainError>;

    fn embed_batch(&self, model: &str, texts: &[String]) -> Result<Vec<Vec<f32>>, DomainError> {
        texts.iter().map(|text| self.embed(model, text)).collect()
    }

    fn dims(&self, _model: &str) -> Option<usize> {
        None
    }
}

/// Contract for the embedded vector storage engine.
pub trait VectorStore: Send + Sync {
    /// Appends entries after all existing ones, preserving their order.
    fn append(&self, entries: &[ReviewEntry]) -> Result<(), DomainError>;

    fn search(
        &self,
        embedding: &EntryEmbedding,
        limit: usize,
    ) -> Result<Vec<(ReviewEntry, f32)>, DomainError>;

    fn count(&self) -> Result<usize, DomainError>;

    /// Oldest entry, if any.
    fn first(&self) -> Result<Option<ReviewEntry>, DomainError>;

    fn clear(&self) -> Result<(), DomainError>;

    fn ping(&self) -> Result<(), DomainError>;
}

/// Embeds review texts and delegates storage and similarity search to the store.
pub struct ReviewService {
    embedder: Arc<dyn EmbeddingEngine>,
    store: Arc<dyn VectorStore>,
    config: ServiceConfig,
}

impl ReviewService {
    pub fn new(
        embedder: Arc<dyn EmbeddingEngine>,
        store: Arc<dyn VectorStore>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            embedder,
            store,
            config,
        }
    }

    /// Embeds a batch of texts and appends them to the store. Blank texts are
    /// skipped; returns the number of entries written.
    pub fn ingest_texts(&self, texts: &[String]) -> Result<usize, DomainError> {
        let batch: Vec<String> = texts
            .iter()
            .filter(|text| !text.trim().is_empty())
            .cloned()
            .collect();
        if batch.is_empty() {
            return Ok(0);
        }

        let vectors = self
            .embedder
            .embed_batch(&self.config.embedding_model, &batch)?;
        if vectors.len() != batch.len() {
            return Err(DomainError::embedding(format!(
                "embedder returned {} vectors for {} texts",
                vectors.len(),
                batch.len()
            )));
        }

        let entries: Vec<ReviewEntry> = batch
            .into_iter()
            .zip(vectors)
            .map(|(text, vector)| {
                ReviewEntry::new(
                    text,
                    EntryEmbedding::new(&self.config.embedding_model, vector),
                )
            })
            .collect();

        self.store.append(&entries)?;
        debug!(count = entries.len(), "appended review entries");

        Ok(entries.len())
    }

    pub fn search(&self, request: SearchRequest) -> Result<SearchResponse, DomainError> {
        if request.query.trim().is_empty() {
            return Err(DomainError::validation("query cannot be empty"));
        }

        let matches = self.nearest(request.query.trim(), request.limit)?;
        let results = matches
            .into_iter()
            .map(|(entry, score)| SearchResultDto {
                id: entry.id,
                text: entry.text,
                score,
                created_at: entry.created_at,
            })
            .collect();

        Ok(SearchResponse {
            query: request.query,
            results,
        })
    }

    /// Texts of the entries most similar to `query`, best first.
    pub fn search_texts(&self, query: &str, limit: usize) -> Result<Vec<String>, DomainError> {
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(self
            .nearest(query.trim(), limit)?
            .into_iter()
            .map(|(entry, _)| entry.text)
            .collect())
    }

    pub fn count(&self) -> Result<usize, DomainError> {
        self.store.count()
    }

    pub fn clear(&self) -> Result<(), DomainError> {
        self.store.clear()
    }

    /// Model that embedded the entries already in the store.
    pub fn stored_model(&self) -> Result<Option<String>, DomainError> {
        Ok(self.store.first()?.map(|entry| entry.embedding.model))
    }

    pub fn default_limit(&self) -> usize {
        self.config.default_limit
    }

    pub fn embedding_model(&self) -> &str {
        self.config.embedding_model()
    }

    pub fn embedding_dimensions(&self) -> Option<usize> {
        self.embedder.dims(self.config.embedding_model())
    }

    pub fn health(&self) -> Result<HealthStatusResponse, DomainError> {
        self.store.ping()?;

        Ok(HealthStatusResponse {
            ok: true,
            message: "ready".into(),
            details: Some(format!(
                "model: {}, checked_at: {}",
                self.config.embedding_model,
                Utc::now()
            )),
        })
    }

    fn nearest(&self, query: &str, limit: usize) -> Result<Vec<(ReviewEntry, f32)>, DomainError> {
        let effective_limit = limit.clamp(1, MAX_SEARCH_LIMIT);
        let vector = self.embedder.embed(&self.config.embedding_model, query)?;
        let embedding = EntryEmbedding::new(&self.config.embedding_model, vector);
        self.store.search(&embedding, effective_limit)
    }
}
