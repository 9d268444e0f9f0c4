//! # minutes-core
//!
//! Core types, traits, and abstractions for the minutes system.
//!
//! This crate provides the foundational data structures and trait definitions
//! that other minutes crates depend on.

pub mod defaults;
pub mod error;
pub mod models;
pub mod traits;
pub mod transcript;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use models::*;
pub use traits::*;
pub use transcript::{
    clean_text, normalize_segments, normalize_text, NormalizedTranscript, TranscriptSegment,
    Utterance,
};
