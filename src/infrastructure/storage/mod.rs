//! Storage adapters.
//!
//! Exposes the embedded sled-backed vector store holding the review
//! embeddings produced by the setup step.

pub mod sled_store;

pub use sled_store::SledVectorStore;
