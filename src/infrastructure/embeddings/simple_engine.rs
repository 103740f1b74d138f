use ahash::RandomState;

use crate::{application::services::EmbeddingEngine, domain::DomainError};

pub const DEFAULT_SIMPLE_MODEL: &str = "adtarget/simple-hash";
pub const DEFAULT_SIMPLE_DIMENSIONS: usize = 256;

const MIN_DIMENSIONS: usize = 8;
const MAX_DIMENSIONS: usize = 4096;
const HASH_SEEDS: [u64; 4] = [
    0x243f_6a88_85a3_08d3,
    0x1319_8a2e_0370_7344,
    0xa409_3822_299f_31d0,
    0x082e_fa98_ec4e_6c89,
];

/// Deterministic embedder that hashes lowercase tokens into a fixed-size,
/// L2-normalised vector. No model download, no native runtime.
pub struct SimpleEmbedEngine {
    model_name: String,
    dimensions: usize,
}

impl SimpleEmbedEngine {
    pub fn try_new(model_name: impl Into<String>, dimensions: usize) -> Result<Self, DomainError> {
        if dimensions == 0 {
            return Err(DomainError::validation(
                "embedding dimensions must be greater than zero",
            ));
        }
        Ok(Self::new(model_name, dimensions))
    }

    /// Dimensions are clamped into `8..=4096`.
    pub fn new(model_name: impl Into<String>, dimensions: usize) -> Self {
        Self {
            model_name: model_name.into(),
            dimensions: dimensions.clamp(MIN_DIMENSIONS, MAX_DIMENSIONS),
        }
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
        text.split(|c: char| c.is_whitespace() || c.is_ascii_punctuation())
            .filter(|token| !token.is_empty())
            .map(str::to_lowercase)
    }

    fn hash_token(token: &str) -> usize {
        // fixed seeds so vectors stay stable across processes
        let [k0, k1, k2, k3] = HASH_SEEDS;
        RandomState::with_seeds(k0, k1, k2, k3).hash_one(token) as usize
    }

    fn embed_internal(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];

        for token in Self::tokenize(text) {
            let idx = Self::hash_token(&token) % self.dimensions;
            vector[idx] += 1.0;
        }

        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for value in &mut vector {
                *value /= norm;
            }
        }

        vector
    }

    fn check_model(&self, model: &str) -> Result<(), DomainError> {
        if model.eq_ignore_ascii_case(&self.model_name) {
            Ok(())
        } else {
            Err(DomainError::embedding(format!(
                "engine initialised for `{}` but `{}` requested",
                self.model_name, model
            )))
        }
    }
}

impl Default for SimpleEmbedEngine {
    fn default() -> Self {
        Self::new(DEFAULT_SIMPLE_MODEL, DEFAULT_SIMPLE_DIMENSIONS)
    }
}

impl EmbeddingEngine for SimpleEmbedEngine {
    fn embed(&self, model: &str, text: &str) -> Result<Vec<f32>, DomainError> {
        self.check_model(model)?;
        if text.trim().is_empty() {
            return Err(DomainError::validation("text payload cannot be empty"));
        }
        Ok(self.embed_internal(text))
    }

    fn dims(&self, _model: &str) -> Option<usize> {
        Some(self.dimensions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_text_gives_same_normalised_vector() {
        let engine = SimpleEmbedEngine::new("test/hash", 32);
        let a = engine.embed("test/hash", "Great bike, smooth ride").unwrap();
        let b = engine.embed("TEST/HASH", "great bike smooth ride").unwrap();

        assert_eq!(a.len(), 32);
        assert_eq!(a, b);
        let norm: f32 = a.iter().map(|v| v * v).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn rejects_wrong_model_and_blank_text() {
        let engine = SimpleEmbedEngine::default();
        assert!(matches!(
            engine.embed("other", "text"),
            Err(DomainError::Embedding(_))
        ));
        assert!(matches!(
            engine.embed(DEFAULT_SIMPLE_MODEL, "   "),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn dimensions_are_clamped() {
        assert_eq!(SimpleEmbedEngine::new("m", 1).dims("m"), Some(8));
        assert!(SimpleEmbedEngine::try_new("m", 0).is_err());
    }
}
