//! Domain models for minutes.
//!
//! The durable aggregate is [`Meeting`]; everything an extraction pass
//! produces is folded into it before persistence. All extraction-facing
//! types use permissive serde defaults so a model response missing optional
//! fields still parses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::defaults;

/// Embedding vector. Dimension is fixed per embedding model version.
pub type Vector = Vec<f32>;

fn default_severity() -> String {
    defaults::DEFAULT_SEVERITY.to_string()
}

fn default_sentiment() -> String {
    "neutral".to_string()
}

fn default_sentiment_score() -> f32 {
    0.5
}

fn default_feasibility() -> String {
    "medium".to_string()
}

// =============================================================================
// PROJECT EXTRACTION
// =============================================================================

/// One project or initiative surfaced from a meeting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectDetail {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub timeline_hints: String,
    #[serde(default)]
    pub blockers: Vec<String>,
    #[serde(default)]
    pub risks: Vec<String>,
}

// =============================================================================
// HEALTH EXTRACTION
// =============================================================================

/// A blocker or impediment raised in a meeting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Blocker {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub project: Option<String>,
    #[serde(default = "default_severity")]
    pub severity: String,
}

/// A risk or concern raised in a meeting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Risk {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub project: Option<String>,
    #[serde(default = "default_severity")]
    pub severity: String,
}

/// A commitment (or non-commitment) signal with its interpretation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitmentSignal {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub interpretation: String,
    #[serde(default)]
    pub project: Option<String>,
}

/// Project health signals: owners, blockers, risks, commitment signals.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HealthSignals {
    #[serde(default)]
    pub owners: Vec<String>,
    #[serde(default)]
    pub blockers: Vec<Blocker>,
    #[serde(default)]
    pub risks: Vec<Risk>,
    #[serde(default)]
    pub commitment_signals: Vec<CommitmentSignal>,
}

// =============================================================================
// PULSE EXTRACTION
// =============================================================================

/// Sentiment for a single identifiable speaker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeakerSentiment {
    #[serde(default)]
    pub speaker: String,
    #[serde(default = "default_sentiment")]
    pub sentiment: String,
    #[serde(default = "default_sentiment_score")]
    pub sentiment_score: f32,
    #[serde(default)]
    pub engagement_level: String,
}

/// A behavioral pattern observed in the conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BehavioralCue {
    #[serde(default)]
    pub cue: String,
    #[serde(default, rename = "type")]
    pub kind: String,
}

/// Meeting pulse: sentiment, tone, and behavioral cues.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pulse {
    #[serde(default = "default_sentiment")]
    pub overall_sentiment: String,
    #[serde(default = "default_sentiment_score")]
    pub sentiment_score: f32,
    #[serde(default)]
    pub tone: Vec<String>,
    #[serde(default)]
    pub speaker_sentiments: Vec<SpeakerSentiment>,
    #[serde(default)]
    pub behavioral_cues: Vec<BehavioralCue>,
    #[serde(default)]
    pub key_insights: Vec<String>,
}

impl Default for Pulse {
    fn default() -> Self {
        Self {
            overall_sentiment: default_sentiment(),
            sentiment_score: default_sentiment_score(),
            tone: Vec::new(),
            speaker_sentiments: Vec::new(),
            behavioral_cues: Vec::new(),
            key_insights: Vec::new(),
        }
    }
}

impl Pulse {
    /// Clamp all sentiment scores into `[0, 1]`. Model outputs occasionally
    /// stray outside the requested range.
    pub fn clamp_scores(&mut self) {
        self.sentiment_score = self.sentiment_score.clamp(0.0, 1.0);
        for s in &mut self.speaker_sentiments {
            s.sentiment_score = s.sentiment_score.clamp(0.0, 1.0);
        }
    }
}

// =============================================================================
// PAIN POINTS EXTRACTION
// =============================================================================

/// A pain point tied to a specific project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectPainPoint {
    #[serde(default)]
    pub project: Option<String>,
    #[serde(default)]
    pub pain_point: String,
    #[serde(default = "default_severity")]
    pub severity: String,
    #[serde(default)]
    pub impact: String,
}

/// An organizational/process-level pain point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneralPainPoint {
    #[serde(default)]
    pub pain_point: String,
    #[serde(default)]
    pub category: String,
    #[serde(default = "default_severity")]
    pub severity: String,
    #[serde(default)]
    pub impact: String,
}

/// Pain points split into project-specific and general.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PainPoints {
    #[serde(default)]
    pub project_specific: Vec<ProjectPainPoint>,
    #[serde(default)]
    pub general: Vec<GeneralPainPoint>,
}

// =============================================================================
// EXTERNAL IDEAS EXTRACTION
// =============================================================================

/// An idea or opportunity outside the main project's scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalIdea {
    #[serde(default)]
    pub idea: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub scope: String,
    #[serde(default = "default_feasibility")]
    pub feasibility: String,
    #[serde(default)]
    pub potential_value: String,
    #[serde(default)]
    pub suggested_by: String,
    #[serde(default)]
    pub related_to: String,
}

// =============================================================================
// MEETING AGGREGATE
// =============================================================================

/// The durable meeting record. Created atomically once all extraction
/// passes complete or degrade; immutable afterwards except deletion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meeting {
    pub id: Uuid,
    pub title: Option<String>,
    pub project_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub transcript_raw: String,
    pub summary: String,
    pub project_details: Vec<ProjectDetail>,
    pub pain_points: PainPoints,
    pub health_signals: HealthSignals,
    pub pulse: Pulse,
    pub external_ideas_scope: Vec<ExternalIdea>,
    pub overall_sentiment: String,
}

/// Listing row for a meeting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeetingSummary {
    pub id: Uuid,
    pub title: Option<String>,
    pub project_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Distinct project name with the number of meetings carrying it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectCount {
    pub name: String,
    pub count: usize,
}

// =============================================================================
// CHAT
// =============================================================================

/// Retrieval/chat boundary: one project's meetings, or all meetings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChatScope {
    Global,
    Project(String),
}

impl std::fmt::Display for ChatScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChatScope::Global => write!(f, "global"),
            ChatScope::Project(name) => write!(f, "project:{}", name),
        }
    }
}

/// Role of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnRole {
    User,
    Assistant,
}

/// One ephemeral conversation turn. Turns are session-local and discarded
/// whenever the session scope changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: TurnRole,
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_signals_parse_with_missing_fields() {
        let json = r#"{"owners": ["Alice"], "blockers": [{"description": "infra outage"}]}"#;
        let health: HealthSignals = serde_json::from_str(json).unwrap();
        assert_eq!(health.owners, vec!["Alice"]);
        assert_eq!(health.blockers.len(), 1);
        assert_eq!(health.blockers[0].severity, "medium");
        assert!(health.risks.is_empty());
        assert!(health.commitment_signals.is_empty());
    }

    #[test]
    fn test_pulse_default_is_neutral() {
        let pulse = Pulse::default();
        assert_eq!(pulse.overall_sentiment, "neutral");
        assert!((pulse.sentiment_score - 0.5).abs() < f32::EPSILON);
        assert!(pulse.speaker_sentiments.is_empty());
    }

    #[test]
    fn test_pulse_clamp_scores() {
        let mut pulse = Pulse {
            sentiment_score: 1.7,
            speaker_sentiments: vec![SpeakerSentiment {
                speaker: "Bob".to_string(),
                sentiment: "negative".to_string(),
                sentiment_score: -0.2,
                engagement_level: "low".to_string(),
            }],
            ..Pulse::default()
        };
        pulse.clamp_scores();
        assert_eq!(pulse.sentiment_score, 1.0);
        assert_eq!(pulse.speaker_sentiments[0].sentiment_score, 0.0);
    }

    #[test]
    fn test_behavioral_cue_type_field_rename() {
        let json = r#"{"cue": "low participation", "type": "engagement"}"#;
        let cue: BehavioralCue = serde_json::from_str(json).unwrap();
        assert_eq!(cue.kind, "engagement");

        let back = serde_json::to_value(&cue).unwrap();
        assert_eq!(back["type"], "engagement");
    }

    #[test]
    fn test_project_detail_parse_minimal() {
        let detail: ProjectDetail = serde_json::from_str(r#"{"name": "API Launch"}"#).unwrap();
        assert_eq!(detail.name, "API Launch");
        assert!(detail.blockers.is_empty());
        assert!(detail.status.is_empty());
    }

    #[test]
    fn test_scope_display() {
        assert_eq!(ChatScope::Global.to_string(), "global");
        assert_eq!(
            ChatScope::Project("Portal".to_string()).to_string(),
            "project:Portal"
        );
    }

    #[test]
    fn test_meeting_round_trips_through_json() {
        let meeting = Meeting {
            id: Uuid::new_v4(),
            title: Some("Standup".to_string()),
            project_name: Some("Portal".to_string()),
            created_at: Utc::now(),
            transcript_raw: "Alice: hello".to_string(),
            summary: "Short standup.".to_string(),
            project_details: vec![],
            pain_points: PainPoints::default(),
            health_signals: HealthSignals::default(),
            pulse: Pulse::default(),
            external_ideas_scope: vec![],
            overall_sentiment: "neutral".to_string(),
        };
        let json = serde_json::to_string(&meeting).unwrap();
        let back: Meeting = serde_json::from_str(&json).unwrap();
        assert_eq!(back, meeting);
    }
}
