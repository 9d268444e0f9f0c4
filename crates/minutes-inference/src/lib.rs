//! # minutes-inference
//!
//! LLM inference backend abstraction for minutes.
//!
//! This crate provides:
//! - Ollama implementation of the inference traits (default)
//! - Mock backend for deterministic tests (feature `mock`)
//!
//! # Feature Flags
//!
//! - `ollama` (default): Enable Ollama backend
//! - `mock`: Enable mock backend for downstream tests
//! - `integration`: Enable tests that require a live Ollama server
//!
//! # Example
//!
//! ```rust,no_run
//! use minutes_inference::OllamaBackend;
//! use minutes_core::EmbeddingBackend;
//!
//! #[tokio::main]
//! async fn main() {
//!     let backend = OllamaBackend::from_env();
//!     let texts = vec!["Hello".to_string()];
//!     let embeddings = backend.embed_texts(&texts).await.unwrap();
//! }
//! ```

#[cfg(feature = "ollama")]
pub mod ollama;

// Mock inference backend for testing
#[cfg(any(test, feature = "mock"))]
pub mod mock;

// Re-export core types
pub use minutes_core::{EmbeddingBackend, GenerationBackend, InferenceBackend, Vector};

#[cfg(feature = "ollama")]
pub use ollama::OllamaBackend;

#[cfg(any(test, feature = "mock"))]
pub use mock::MockInferenceBackend;
