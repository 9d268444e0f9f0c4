//! # minutes-extract
//!
//! Schema-constrained LLM extraction passes for minutes.
//!
//! Each extraction kind lives in its own module with its prompt and parse
//! rules; all of them share the driver's call-parse-retry-degrade policy,
//! so a single misbehaving pass yields its default-shaped result instead
//! of failing the run.
//!
//! Callers are expected to reduce oversized transcripts with
//! [`coverage_excerpt`] once and feed the same excerpt to every pass.

pub mod driver;
pub mod health;
pub mod ideas;
pub mod pain_points;
pub mod project;
pub mod project_name;
pub mod pulse;
pub mod subset;
pub mod summary;

use std::sync::Arc;

use minutes_core::{ExternalIdea, GenerationBackend, HealthSignals, PainPoints, ProjectDetail, Pulse};

pub use driver::ExtractionOutcome;
pub use project::{merge_duplicates, normalize_status};
pub use subset::coverage_excerpt;

/// All extraction passes bound to one generation backend.
pub struct ExtractorSet {
    backend: Arc<dyn GenerationBackend>,
}

impl ExtractorSet {
    pub fn new(backend: Arc<dyn GenerationBackend>) -> Self {
        Self { backend }
    }

    pub async fn summary(&self, transcript: &str) -> ExtractionOutcome<String> {
        summary::extract(self.backend.as_ref(), transcript).await
    }

    pub async fn project_name(
        &self,
        transcript: &str,
        meeting_title: Option<&str>,
    ) -> ExtractionOutcome<Option<String>> {
        project_name::extract(self.backend.as_ref(), transcript, meeting_title).await
    }

    pub async fn project_details(&self, transcript: &str) -> ExtractionOutcome<Vec<ProjectDetail>> {
        project::extract(self.backend.as_ref(), transcript).await
    }

    pub async fn health(&self, transcript: &str) -> ExtractionOutcome<HealthSignals> {
        health::extract(self.backend.as_ref(), transcript).await
    }

    pub async fn pulse(&self, transcript: &str, speakers: &[String]) -> ExtractionOutcome<Pulse> {
        pulse::extract(self.backend.as_ref(), transcript, speakers).await
    }

    pub async fn pain_points(&self, transcript: &str) -> ExtractionOutcome<PainPoints> {
        pain_points::extract(self.backend.as_ref(), transcript).await
    }

    pub async fn external_ideas(&self, transcript: &str) -> ExtractionOutcome<Vec<ExternalIdea>> {
        ideas::extract(self.backend.as_ref(), transcript).await
    }
}
