//! Domain layer: core entities and value objects for the assistant.

pub mod errors;
pub mod models;

pub use errors::DomainError;
pub use models::{
    AnalysisKind, AnalysisReport, EntryEmbedding, ProgressStep, QuestionInfo, QuestionOutcome,
    Recommendations, ReviewEntry,
};
