//! Centralized default constants for the minutes system.
//!
//! **This module is the single source of truth** for all shared default
//! values. Crates reference these constants instead of defining their own
//! magic numbers.

// =============================================================================
// CHUNKING
// =============================================================================

/// Maximum characters per chunk for transcript splitting.
pub const CHUNK_CHARS: usize = 1000;

/// Fraction of a chunk re-included at the start of the next chunk.
pub const CHUNK_OVERLAP_FRACTION: f32 = 0.15;

// =============================================================================
// EMBEDDING
// =============================================================================

/// Default embedding model name (Ollama).
pub const EMBED_MODEL: &str = "nomic-embed-text";

/// Default embedding vector dimension for nomic-embed-text.
pub const EMBED_DIMENSION: usize = 768;

// =============================================================================
// INFERENCE
// =============================================================================

/// Default Ollama base URL.
pub const OLLAMA_URL: &str = "http://127.0.0.1:11434";

/// Default generation model name (Ollama).
pub const GEN_MODEL: &str = "gpt-oss:20b";

/// Timeout for embedding requests in seconds.
pub const EMBED_TIMEOUT_SECS: u64 = 30;

/// Timeout for generation requests in seconds.
pub const GEN_TIMEOUT_SECS: u64 = 120;

// =============================================================================
// EXTRACTION
// =============================================================================

/// Per-extractor call timeout in seconds. A hung model call becomes a
/// degraded result rather than blocking the run.
pub const EXTRACT_TIMEOUT_SECS: u64 = 45;

/// Maximum transcript characters embedded into one extraction prompt.
/// Larger transcripts are reduced to a representative excerpt.
pub const EXTRACT_PROMPT_BUDGET: usize = 24_000;

/// Severity assigned to blockers/risks when the model omits one.
pub const DEFAULT_SEVERITY: &str = "medium";

/// Project name used when neither the caller, the model, nor the title
/// yields one.
pub const UNNAMED_PROJECT: &str = "Unnamed Project";

// =============================================================================
// RETRIEVAL / CHAT
// =============================================================================

/// Number of chunks retrieved to ground a chat answer.
pub const CHAT_TOP_K: usize = 5;

// =============================================================================
// SERVER
// =============================================================================

/// Default HTTP server port.
pub const SERVER_PORT: u16 = 3000;
