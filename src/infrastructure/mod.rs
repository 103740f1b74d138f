//! Infrastructure layer wiring concrete adapters (embeddings, storage, CSV, LLM).

pub mod embeddings;
pub mod llm;
pub mod storage;
pub mod tabular;

#[cfg(feature = "fastembed-engine")]
pub use embeddings::FastEmbedEngine;
pub use embeddings::SimpleEmbedEngine;
pub use llm::LlmConnector;
pub use storage::SledVectorStore;
pub use tabular::CsvDataset;
