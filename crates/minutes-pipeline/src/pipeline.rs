//! End-to-end meeting processing pipeline.
//!
//! A run moves through Received, Normalizing, Extracting, Assembling and
//! ends Persisted or Failed. Extraction passes run concurrently over the
//! same immutable excerpt; the meeting record is assembled only after all
//! of them complete or degrade, persisted atomically, and indexed on a
//! detached task afterwards.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use minutes_core::{
    defaults, normalize_segments, normalize_text, GenerationBackend, Meeting, MeetingStore,
    NormalizedTranscript, Result, TranscriptSegment,
};
use minutes_extract::{coverage_excerpt, ExtractionOutcome, ExtractorSet};
use minutes_index::{EmbeddingIndex, TranscriptChunker};

/// Pipeline run state, for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Received,
    Normalizing,
    Extracting,
    Assembling,
    Persisted,
    Failed,
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RunState::Received => "received",
            RunState::Normalizing => "normalizing",
            RunState::Extracting => "extracting",
            RunState::Assembling => "assembling",
            RunState::Persisted => "persisted",
            RunState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Transcript payload of a submission.
#[derive(Debug, Clone)]
pub enum TranscriptInput {
    /// Raw plain text, possibly speaker-tagged.
    Text(String),
    /// Pre-segmented structured entries.
    Segments(Vec<TranscriptSegment>),
}

/// One meeting submission.
#[derive(Debug, Clone)]
pub struct MeetingSubmission {
    pub transcript: TranscriptInput,
    pub title: Option<String>,
    pub project_name: Option<String>,
}

/// End-to-end pipeline for processing meeting transcripts.
pub struct MeetingPipeline {
    extractors: ExtractorSet,
    store: Arc<dyn MeetingStore>,
    index: Arc<EmbeddingIndex>,
    chunker: TranscriptChunker,
}

impl MeetingPipeline {
    pub fn new(
        backend: Arc<dyn GenerationBackend>,
        store: Arc<dyn MeetingStore>,
        index: Arc<EmbeddingIndex>,
    ) -> Self {
        Self {
            extractors: ExtractorSet::new(backend),
            store,
            index,
            chunker: TranscriptChunker::default(),
        }
    }

    /// Process one submission to a persisted meeting record.
    ///
    /// Fails only on unusable input or a storage error; a misbehaving
    /// extraction pass degrades to its default shape instead. Indexing
    /// runs on a spawned task after persistence and is not awaited.
    #[instrument(skip(self, submission), fields(subsystem = "pipeline", op = "process"))]
    pub async fn process(&self, submission: MeetingSubmission) -> Result<Meeting> {
        let meeting_id = Uuid::new_v4();
        info!(meeting_id = %meeting_id, state = %RunState::Received, "Processing meeting submission");

        debug!(meeting_id = %meeting_id, state = %RunState::Normalizing, "Normalizing transcript");
        let normalized = match &submission.transcript {
            TranscriptInput::Text(raw) => normalize_text(raw),
            TranscriptInput::Segments(segments) => normalize_segments(segments),
        };
        let normalized = match normalized {
            Ok(n) => n,
            Err(e) => {
                warn!(meeting_id = %meeting_id, state = %RunState::Failed, error = %e, "Submission rejected");
                return Err(e);
            }
        };

        let title = submission
            .title
            .clone()
            .filter(|t| !t.trim().is_empty())
            .or_else(|| normalized.title.clone());

        let full_text = normalized.full_text();
        let excerpt = coverage_excerpt(&full_text, defaults::EXTRACT_PROMPT_BUDGET);

        info!(meeting_id = %meeting_id, state = %RunState::Extracting, "Running extraction passes");
        let user_name = submission
            .project_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string);

        let name_outcome = async {
            match &user_name {
                Some(name) => ExtractionOutcome::ok(Some(name.clone())),
                None => self.extractors.project_name(&excerpt, title.as_deref()).await,
            }
        };

        let (summary, name, details, health, pulse, pain_points, ideas) = tokio::join!(
            self.extractors.summary(&excerpt),
            name_outcome,
            self.extractors.project_details(&excerpt),
            self.extractors.health(&excerpt),
            self.extractors.pulse(&excerpt, &normalized.speakers),
            self.extractors.pain_points(&excerpt),
            self.extractors.external_ideas(&excerpt),
        );

        let degraded_count = [
            summary.degraded,
            name.degraded,
            details.degraded,
            health.degraded,
            pulse.degraded,
            pain_points.degraded,
            ideas.degraded,
        ]
        .iter()
        .filter(|&&d| d)
        .count();
        if degraded_count > 0 {
            warn!(
                meeting_id = %meeting_id,
                degraded = degraded_count,
                "Extraction completed with degraded passes"
            );
        }

        info!(meeting_id = %meeting_id, state = %RunState::Assembling, "Assembling meeting record");
        let meeting = assemble(
            meeting_id,
            title,
            AssemblyParts {
                summary: summary.value,
                project_name: name.value,
                details: details.value,
                health: health.value,
                pulse: pulse.value,
                pain_points: pain_points.value,
                ideas: ideas.value,
                full_text,
            },
        );

        if let Err(e) = self.store.create(meeting.clone()).await {
            error!(meeting_id = %meeting_id, state = %RunState::Failed, error = %e, "Failed to persist meeting");
            return Err(e);
        }
        info!(meeting_id = %meeting_id, state = %RunState::Persisted, "Meeting persisted");

        self.spawn_indexing(&meeting, normalized);
        Ok(meeting)
    }

    fn spawn_indexing(&self, meeting: &Meeting, normalized: NormalizedTranscript) {
        let chunks = self.chunker.chunk(meeting.id, &normalized.utterances);
        let index = Arc::clone(&self.index);
        let meeting_id = meeting.id;
        let project_name = meeting.project_name.clone();

        tokio::spawn(async move {
            let chunk_count = chunks.len();
            match index.upsert(meeting_id, project_name, chunks).await {
                Ok(()) => {
                    info!(meeting_id = %meeting_id, chunk_count, "Meeting indexed for retrieval")
                }
                Err(e) => {
                    error!(meeting_id = %meeting_id, error = %e, "Failed to index meeting")
                }
            }
        });
    }
}

fn assemble(meeting_id: Uuid, title: Option<String>, parts: AssemblyParts) -> Meeting {
    // Resolution order: caller, extracted, title, unnamed fallback.
    let project_name = parts
        .project_name
        .or_else(|| title.clone())
        .unwrap_or_else(|| defaults::UNNAMED_PROJECT.to_string());

    let summary = if project_name != defaults::UNNAMED_PROJECT {
        format!("**Project: {}**\n\n{}", project_name, parts.summary)
    } else {
        parts.summary
    };

    // Health blockers and risks are carried onto each project detail,
    // matching the per-project rollup the summary view expects.
    let mut details = parts.details;
    for detail in &mut details {
        detail.blockers = parts
            .health
            .blockers
            .iter()
            .map(|b| b.description.clone())
            .collect();
        detail.risks = parts
            .health
            .risks
            .iter()
            .map(|r| r.description.clone())
            .collect();
    }

    let overall_sentiment = parts.pulse.overall_sentiment.clone();

    Meeting {
        id: meeting_id,
        title,
        project_name: Some(project_name),
        created_at: Utc::now(),
        transcript_raw: parts.full_text,
        summary,
        project_details: details,
        pain_points: parts.pain_points,
        health_signals: parts.health,
        pulse: parts.pulse,
        external_ideas_scope: parts.ideas,
        overall_sentiment,
    }
}

struct AssemblyParts {
    summary: String,
    project_name: Option<String>,
    details: Vec<minutes_core::ProjectDetail>,
    health: minutes_core::HealthSignals,
    pulse: minutes_core::Pulse,
    pain_points: minutes_core::PainPoints,
    ideas: Vec<minutes_core::ExternalIdea>,
    full_text: String,
}
