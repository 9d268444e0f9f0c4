//! Transcript normalization.
//!
//! Accepts either raw plain text or pre-segmented structured input and
//! produces an ordered sequence of [`Utterance`]s plus extracted metadata.
//! Normalization never calls a model; it rejects input only when nothing
//! usable remains.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// `Speaker: text` line shape. The speaker part is a short run of letters
/// and spaces, so sentences containing a colon mid-thought do not match.
static SPEAKER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Za-z][A-Za-z\s]+?):\s*(.+)$").unwrap());

/// `Meeting ID:` / `Title:` header lines near the top of an export.
static HEADER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(Meeting ID|Title):\s*(.+)$").unwrap());

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// One attributed statement in normalized order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Utterance {
    /// Speaker name, `None` when the source line carried no attribution.
    pub speaker: Option<String>,
    pub text: String,
    pub timestamp: Option<String>,
    /// Position in the normalized sequence, starting at 0.
    pub order: usize,
}

/// One entry of a structured (JSON) transcript submission. Field aliases
/// cover the common export shapes seen in the wild.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TranscriptSegment {
    #[serde(default, alias = "name")]
    pub speaker: Option<String>,
    #[serde(default, alias = "content", alias = "utterance")]
    pub text: Option<String>,
    #[serde(default, alias = "time", alias = "start")]
    pub timestamp: Option<String>,
}

/// Output of normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedTranscript {
    pub utterances: Vec<Utterance>,
    /// Distinct speakers in first-appearance order.
    pub speakers: Vec<String>,
    /// Title extracted from header lines, if any.
    pub title: Option<String>,
    /// Structured entries discarded for having no usable text.
    pub dropped: usize,
}

impl NormalizedTranscript {
    /// Render back to `Speaker: text` lines for prompting and chunk text.
    pub fn full_text(&self) -> String {
        self.utterances
            .iter()
            .map(|u| match &u.speaker {
                Some(s) => format!("{}: {}", s, u.text),
                None => u.text.clone(),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Collapse runs of whitespace and trim.
pub fn clean_text(text: &str) -> String {
    WHITESPACE_RE.replace_all(text.trim(), " ").to_string()
}

/// Normalize a plain-text transcript.
///
/// Lines matching `Speaker: text` become attributed utterances; once
/// speaker tags have been seen, an unmatched line continues the previous
/// utterance. A transcript with no speaker tags at all becomes a single
/// unattributed utterance. `Title:` / `Meeting ID:` headers in the first
/// three lines are consumed as metadata, as is a short bare first line.
pub fn normalize_text(raw: &str) -> Result<NormalizedTranscript> {
    let mut utterances: Vec<Utterance> = Vec::new();
    let mut speakers: Vec<String> = Vec::new();
    let mut title: Option<String> = None;
    let mut has_speaker_tags = false;
    let mut plain_parts: Vec<String> = Vec::new();

    for (i, line) in raw.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if i < 3 {
            if let Some(caps) = HEADER_RE.captures(line) {
                let key = caps.get(1).map(|m| m.as_str().to_lowercase());
                if key.as_deref() == Some("meeting id") {
                    continue;
                }
                title = Some(caps[2].trim().to_string());
                continue;
            }
            if i == 0 && !SPEAKER_RE.is_match(line) && line.len() < 100 {
                title = Some(line.to_string());
                continue;
            }
        }

        if let Some(caps) = SPEAKER_RE.captures(line) {
            has_speaker_tags = true;
            let speaker = caps[1].trim().to_string();
            let text = clean_text(&caps[2]);
            if text.is_empty() {
                continue;
            }
            if !speakers.contains(&speaker) {
                speakers.push(speaker.clone());
            }
            let order = utterances.len();
            utterances.push(Utterance {
                speaker: Some(speaker),
                text,
                timestamp: None,
                order,
            });
        } else if has_speaker_tags {
            // Continuation of the previous speaker's statement.
            if let Some(last) = utterances.last_mut() {
                let cleaned = clean_text(line);
                if !cleaned.is_empty() {
                    last.text.push(' ');
                    last.text.push_str(&cleaned);
                }
            }
        } else {
            plain_parts.push(clean_text(line));
        }
    }

    if !has_speaker_tags && !plain_parts.is_empty() {
        utterances.push(Utterance {
            speaker: None,
            text: plain_parts.join(" "),
            timestamp: None,
            order: 0,
        });
    }

    if utterances.is_empty() {
        return Err(Error::InvalidInput(
            "transcript contains no usable content".to_string(),
        ));
    }

    debug!(
        component = "normalizer",
        utterance_count = utterances.len(),
        speaker_count = speakers.len(),
        has_title = title.is_some(),
        "Normalized plain-text transcript"
    );

    Ok(NormalizedTranscript {
        utterances,
        speakers,
        title,
        dropped: 0,
    })
}

/// Normalize structured segments. Entries without usable text are dropped
/// and counted rather than failing the submission.
pub fn normalize_segments(segments: &[TranscriptSegment]) -> Result<NormalizedTranscript> {
    let mut utterances: Vec<Utterance> = Vec::new();
    let mut speakers: Vec<String> = Vec::new();
    let mut dropped = 0usize;

    for segment in segments {
        let text = segment.text.as_deref().map(clean_text).unwrap_or_default();
        if text.is_empty() {
            dropped += 1;
            continue;
        }
        let speaker = segment
            .speaker
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        if let Some(s) = &speaker {
            if !speakers.contains(s) {
                speakers.push(s.clone());
            }
        }
        let order = utterances.len();
        utterances.push(Utterance {
            speaker,
            text,
            timestamp: segment.timestamp.clone(),
            order,
        });
    }

    if dropped > 0 {
        warn!(
            component = "normalizer",
            dropped_count = dropped,
            "Dropped transcript entries with no usable text"
        );
    }

    if utterances.is_empty() {
        return Err(Error::InvalidInput(
            "transcript contains no usable content".to_string(),
        ));
    }

    Ok(NormalizedTranscript {
        utterances,
        speakers,
        title: None,
        dropped,
    })
}
