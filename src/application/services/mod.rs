//! Service layer orchestrating domain operations and infrastructure adapters.

pub mod parsing;
pub mod progress;
pub mod prompts;
pub mod question;
pub mod recommendation;
mod review_service;
mod supervisor;

pub use review_service::{EmbeddingEngine, ReviewService, ServiceConfig, VectorStore};
pub use supervisor::{
    LanguageModel, SupervisorConfig, SupervisorService, TabularSource, CLARIFICATION_MESSAGE,
};
