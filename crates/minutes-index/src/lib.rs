//! # minutes-index
//!
//! Transcript chunking and in-memory embedding index for minutes.
//!
//! Chunks are utterance-aligned and overlapping; the index groups vectors
//! per meeting with copy-on-write replacement so concurrent readers never
//! observe a half-written meeting.

pub mod chunking;
pub mod index;

pub use chunking::{Chunk, ChunkerConfig, TranscriptChunker};
pub use index::{cosine_similarity, EmbeddingIndex, ScoredChunk, SearchScope};
