//! # minutes-pipeline
//!
//! Orchestration layer for minutes: the end-to-end processing pipeline,
//! the default in-memory meeting store, and the retrieval-augmented
//! chatbot over indexed transcripts.

pub mod chatbot;
pub mod pipeline;
pub mod store;

pub use chatbot::{ChatSession, MeetingChatbot, NO_CONTEXT_ANSWER};
pub use pipeline::{MeetingPipeline, MeetingSubmission, RunState, TranscriptInput};
pub use store::MemoryStore;
