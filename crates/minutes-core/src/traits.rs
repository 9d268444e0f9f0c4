//! Core traits for minutes abstractions.
//!
//! These traits define the interfaces that concrete implementations
//! must satisfy, enabling pluggable backends and testability.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{Meeting, MeetingSummary, ProjectCount, Vector};

// =============================================================================
// INFERENCE TRAITS
// =============================================================================

/// Backend capable of producing embedding vectors.
#[async_trait]
pub trait EmbeddingBackend: Send + Sync {
    /// Generate embeddings for a batch of texts, one vector per input,
    /// in input order.
    async fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vector>>;

    /// Embedding vector dimension.
    fn dimension(&self) -> usize;

    /// Identifier of the embedding model. Stored alongside vectors so
    /// retrieval can skip vectors produced by a different model.
    fn model_version(&self) -> &str;
}

/// Backend capable of text generation.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Generate free-form text from a prompt.
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Generate free-form text with a system prompt.
    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String>;

    /// Generate output constrained to valid JSON.
    async fn generate_json(&self, prompt: &str) -> Result<String>;

    /// Generate JSON-constrained output with a system prompt.
    async fn generate_json_with_system(&self, system: &str, prompt: &str) -> Result<String>;

    /// Name of the generation model in use.
    fn model_name(&self) -> &str;
}

/// Full inference backend: embeddings plus generation.
#[async_trait]
pub trait InferenceBackend: EmbeddingBackend + GenerationBackend {
    /// Check backend availability. `Ok(false)` means reachable-but-unhealthy
    /// or unreachable; errors are reserved for misconfiguration.
    async fn health_check(&self) -> Result<bool>;
}

// =============================================================================
// STORAGE TRAITS
// =============================================================================

/// Repository for meeting records.
///
/// Records are created whole and never mutated afterwards; the only
/// write operations are `create` and `delete`.
#[async_trait]
pub trait MeetingStore: Send + Sync {
    /// Persist a fully assembled meeting.
    async fn create(&self, meeting: Meeting) -> Result<()>;

    /// Fetch a full meeting by ID.
    async fn get(&self, id: Uuid) -> Result<Meeting>;

    /// List meeting summaries, newest first.
    async fn list(&self) -> Result<Vec<MeetingSummary>>;

    /// Distinct project names with meeting counts.
    async fn list_projects(&self) -> Result<Vec<ProjectCount>>;

    /// IDs of meetings belonging to a project (exact name match).
    async fn meeting_ids_for_project(&self, name: &str) -> Result<Vec<Uuid>>;

    /// Remove a meeting.
    async fn delete(&self, id: Uuid) -> Result<()>;
}
