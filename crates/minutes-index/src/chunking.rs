//! Utterance-aligned transcript chunking for embedding generation.
//!
//! Transcripts are split on utterance boundaries only; a statement is never
//! cut mid-sentence. Consecutive chunks share trailing utterances so that
//! context spanning a boundary remains retrievable.
//!
//! # Example
//!
//! ```rust,ignore
//! use minutes_index::chunking::{ChunkerConfig, TranscriptChunker};
//!
//! let chunker = TranscriptChunker::new(ChunkerConfig::default());
//! let chunks = chunker.chunk(meeting_id, &normalized.utterances);
//! ```

use minutes_core::Utterance;
use uuid::Uuid;

/// Configuration for transcript chunking.
#[derive(Debug, Clone)]
pub struct ChunkerConfig {
    /// Maximum size of a chunk in characters.
    pub max_chunk_chars: usize,
    /// Fraction of `max_chunk_chars` re-included at the start of the
    /// next chunk, rounded up to whole utterances.
    pub overlap_fraction: f32,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            max_chunk_chars: minutes_core::defaults::CHUNK_CHARS,
            overlap_fraction: minutes_core::defaults::CHUNK_OVERLAP_FRACTION,
        }
    }
}

/// A contiguous run of utterances prepared for embedding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Meeting this chunk belongs to.
    pub meeting_id: Uuid,
    /// Position of the chunk within the meeting, starting at 0.
    pub chunk_index: usize,
    /// Rendered `Speaker: text` lines joined by newlines.
    pub text: String,
    /// Utterance order span covered by this chunk: [start, end).
    pub utterance_span: (usize, usize),
}

impl Chunk {
    /// Get the length of the chunk in bytes.
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Check if the chunk is empty.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Deterministic utterance-boundary chunker.
pub struct TranscriptChunker {
    config: ChunkerConfig,
}

impl Default for TranscriptChunker {
    fn default() -> Self {
        Self::new(ChunkerConfig::default())
    }
}

impl TranscriptChunker {
    pub fn new(config: ChunkerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ChunkerConfig {
        &self.config
    }

    /// Split utterances into overlapping chunks.
    ///
    /// Utterances are accumulated in order until adding the next one would
    /// exceed the size budget. An utterance longer than the budget forms a
    /// chunk of its own. After each emission the window backs up over
    /// trailing utterances until the overlap budget is covered, always
    /// advancing by at least one utterance.
    pub fn chunk(&self, meeting_id: Uuid, utterances: &[Utterance]) -> Vec<Chunk> {
        let lines: Vec<String> = utterances
            .iter()
            .map(|u| match &u.speaker {
                Some(s) => format!("{}: {}", s, u.text),
                None => u.text.clone(),
            })
            .collect();

        let overlap_target =
            (self.config.max_chunk_chars as f32 * self.config.overlap_fraction) as usize;

        let mut chunks = Vec::new();
        let mut start = 0usize;

        while start < lines.len() {
            let mut end = start;
            let mut size = 0usize;
            while end < lines.len() {
                let addition = lines[end].len() + if size > 0 { 1 } else { 0 };
                if size + addition > self.config.max_chunk_chars && end > start {
                    break;
                }
                size += addition;
                end += 1;
            }

            chunks.push(Chunk {
                meeting_id,
                chunk_index: chunks.len(),
                text: lines[start..end].join("\n"),
                utterance_span: (start, end),
            });

            if end >= lines.len() {
                break;
            }

            // Back up over whole trailing utterances to build the overlap,
            // keeping at least one utterance of forward progress.
            let mut back = end;
            let mut overlap_size = 0usize;
            while back > start + 1 && overlap_size < overlap_target {
                overlap_size += lines[back - 1].len() + 1;
                back -= 1;
            }
            start = back;
        }

        chunks
    }
}
