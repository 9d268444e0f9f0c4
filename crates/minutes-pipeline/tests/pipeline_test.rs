//! End-to-end pipeline and chatbot tests against the mock backend.

use std::sync::Arc;
use std::time::Duration;

use minutes_core::{ChatScope, Error, MeetingStore, Pulse};
use minutes_index::{Chunk, EmbeddingIndex};
use minutes_inference::MockInferenceBackend;
use minutes_pipeline::{
    ChatSession, MeetingChatbot, MeetingPipeline, MeetingSubmission, MemoryStore, TranscriptInput,
    NO_CONTEXT_ANSWER,
};
use uuid::Uuid;

const TRANSCRIPT: &str = "Alice: We finished the login flow for the portal redesign.\n\
Bob: Great. I'll start on the dashboard next week, once the API keys arrive.";

/// Mock with one canned response per extraction pass, keyed on a phrase
/// unique to that pass's prompt.
fn canned_backend() -> MockInferenceBackend {
    MockInferenceBackend::new()
        .with_canned_response(
            "Executive Summary (keep it sharp",
            "The team aligned on the portal redesign and upcoming dashboard work.",
        )
        .with_canned_response("Main Project Name", "Portal Redesign")
        .with_canned_response(
            "Return a JSON array of projects",
            r#"[{"name": "Portal Redesign", "status": "in_progress", "owner": "Alice"}]"#,
        )
        .with_canned_response(
            "Return a JSON object with health signals",
            r#"{"owners": [], "blockers": [{"description": "API keys pending"}], "risks": []}"#,
        )
        .with_canned_response(
            "Return a JSON object with pulse analysis",
            r#"{"overall_sentiment": "positive", "sentiment_score": 0.8, "tone": ["collaborative"]}"#,
        )
        .with_canned_response(
            "Return a JSON object with pain points analysis",
            r#"{"project_specific": [], "general": []}"#,
        )
        .with_canned_response("containing an array of external", r#"{"ideas": []}"#)
}

struct Fixture {
    backend: MockInferenceBackend,
    store: Arc<MemoryStore>,
    index: Arc<EmbeddingIndex>,
    pipeline: MeetingPipeline,
}

fn fixture(backend: MockInferenceBackend) -> Fixture {
    let store = Arc::new(MemoryStore::new());
    let index = Arc::new(EmbeddingIndex::new(Arc::new(backend.clone())));
    let pipeline = MeetingPipeline::new(
        Arc::new(backend.clone()),
        store.clone(),
        index.clone(),
    );
    Fixture {
        backend,
        store,
        index,
        pipeline,
    }
}

fn text_submission(text: &str) -> MeetingSubmission {
    MeetingSubmission {
        transcript: TranscriptInput::Text(text.to_string()),
        title: None,
        project_name: None,
    }
}

async fn wait_for_indexing(index: &EmbeddingIndex, expected: usize) {
    for _ in 0..100 {
        if index.meeting_count().await == expected {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("indexing did not complete, {} meetings expected", expected);
}

#[tokio::test]
async fn test_end_to_end_processing() {
    let f = fixture(canned_backend());
    let meeting = f.pipeline.process(text_submission(TRANSCRIPT)).await.unwrap();

    assert_eq!(meeting.project_name.as_deref(), Some("Portal Redesign"));
    assert_eq!(
        meeting.summary,
        "**Project: Portal Redesign**\n\nThe team aligned on the portal redesign and upcoming dashboard work."
    );
    assert_eq!(meeting.project_details.len(), 1);
    assert_eq!(meeting.project_details[0].status, "In Progress");
    assert_eq!(meeting.project_details[0].owner, "Alice");
    assert_eq!(
        meeting.project_details[0].blockers,
        vec!["API keys pending".to_string()]
    );
    assert_eq!(meeting.overall_sentiment, "positive");
    assert_eq!(meeting.pulse.tone, vec!["collaborative".to_string()]);
    assert!(meeting.transcript_raw.starts_with("Alice: We finished"));

    // The persisted record matches what process() returned.
    let stored = f.store.get(meeting.id).await.unwrap();
    assert_eq!(stored, meeting);

    // Indexing runs on a detached task after persistence.
    wait_for_indexing(&f.index, 1).await;
}

#[tokio::test]
async fn test_empty_transcript_rejected_before_any_model_call() {
    let f = fixture(canned_backend());
    let err = f
        .pipeline
        .process(text_submission("   \n\n  "))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::InvalidInput(_)));
    assert_eq!(f.backend.total_call_count(), 0);
}

#[tokio::test]
async fn test_pulse_double_failure_still_persists_with_default() {
    let backend = canned_backend().with_failing_matcher("pulse analysis", 2);
    let f = fixture(backend);

    let meeting = f.pipeline.process(text_submission(TRANSCRIPT)).await.unwrap();

    assert_eq!(meeting.pulse, Pulse::default());
    assert_eq!(meeting.overall_sentiment, "neutral");
    // Every other facet still extracted normally.
    assert_eq!(meeting.project_name.as_deref(), Some("Portal Redesign"));
    assert!(f.store.get(meeting.id).await.is_ok());
}

#[tokio::test]
async fn test_user_supplied_project_name_skips_extraction() {
    let f = fixture(canned_backend());
    let submission = MeetingSubmission {
        transcript: TranscriptInput::Text(TRANSCRIPT.to_string()),
        title: None,
        project_name: Some("Apollo".to_string()),
    };

    let meeting = f.pipeline.process(submission).await.unwrap();
    assert_eq!(meeting.project_name.as_deref(), Some("Apollo"));
    assert!(meeting.summary.starts_with("**Project: Apollo**\n\n"));

    let name_calls = f
        .backend
        .get_calls()
        .iter()
        .filter(|c| c.input.contains("Main Project Name"))
        .count();
    assert_eq!(name_calls, 0);
}

#[tokio::test]
async fn test_unnamed_fallback_leaves_summary_unprefixed() {
    let backend = MockInferenceBackend::new()
        .with_canned_response("Main Project Name", "UNSURE")
        .with_canned_response("Executive Summary (keep it sharp", "A short recap.")
        .with_default_response("{}");
    let f = fixture(backend);

    let meeting = f.pipeline.process(text_submission(TRANSCRIPT)).await.unwrap();

    assert_eq!(meeting.project_name.as_deref(), Some("Unnamed Project"));
    assert_eq!(meeting.summary, "A short recap.");
}

#[tokio::test]
async fn test_title_used_when_extraction_unsure() {
    let backend = MockInferenceBackend::new()
        .with_canned_response("Main Project Name", "unknown")
        .with_canned_response("Executive Summary (keep it sharp", "Recap.")
        .with_default_response("{}");
    let f = fixture(backend);

    let submission = MeetingSubmission {
        transcript: TranscriptInput::Text(TRANSCRIPT.to_string()),
        title: Some("Q3 Planning".to_string()),
        project_name: None,
    };
    let meeting = f.pipeline.process(submission).await.unwrap();

    assert_eq!(meeting.title.as_deref(), Some("Q3 Planning"));
    assert_eq!(meeting.project_name.as_deref(), Some("Q3 Planning"));
    assert!(meeting.summary.starts_with("**Project: Q3 Planning**"));
}

// ---------------------------------------------------------------------------
// Chatbot
// ---------------------------------------------------------------------------

fn chatbot(f: &Fixture) -> MeetingChatbot {
    MeetingChatbot::new(
        Arc::new(f.backend.clone()),
        f.index.clone(),
        f.store.clone(),
    )
}

#[tokio::test]
async fn test_chat_without_context_gives_fixed_answer() {
    let f = fixture(MockInferenceBackend::new());
    let bot = chatbot(&f);
    let mut session = ChatSession::default();

    let answer = bot.answer(&mut session, "What was decided?").await.unwrap();
    assert_eq!(answer, NO_CONTEXT_ANSWER);
    assert!(session.turns().is_empty());
    assert_eq!(f.backend.generate_call_count(), 0);
}

#[tokio::test]
async fn test_chat_unknown_project_gives_fixed_answer() {
    let f = fixture(MockInferenceBackend::new());
    let bot = chatbot(&f);
    let mut session = ChatSession::new(ChatScope::Project("Ghost".to_string()));

    let answer = bot.answer(&mut session, "Any updates?").await.unwrap();
    assert_eq!(answer, "I couldn't find any meetings for the project 'Ghost'.");
    assert!(session.turns().is_empty());
}

#[tokio::test]
async fn test_chat_grounded_answer_records_turns() {
    let backend = MockInferenceBackend::new()
        .with_canned_response("answers questions about meeting transcripts", "Alice finished the login flow.");
    let f = fixture(backend);

    let meeting_id = Uuid::new_v4();
    f.index
        .upsert(
            meeting_id,
            Some("Portal Redesign".to_string()),
            vec![Chunk {
                meeting_id,
                chunk_index: 0,
                text: "Alice: We finished the login flow.".to_string(),
                utterance_span: (0, 1),
            }],
        )
        .await
        .unwrap();

    let bot = chatbot(&f);
    let mut session = ChatSession::default();
    let answer = bot.answer(&mut session, "Who finished what?").await.unwrap();

    assert_eq!(answer, "Alice finished the login flow.");
    assert_eq!(session.turns().len(), 2);
    assert_eq!(session.turns()[0].content, "Who finished what?");
    assert_eq!(session.turns()[1].content, "Alice finished the login flow.");

    // The grounding context reached the model with meeting labels.
    let last = f.backend.get_calls().into_iter().last().unwrap();
    assert!(last.input.contains(&format!("[Meeting {}, Chunk 1]:", meeting_id)));
}

#[tokio::test]
async fn test_chat_scope_switch_clears_turns() {
    let backend = MockInferenceBackend::new()
        .with_canned_response("answers questions about meeting transcripts", "An answer.");
    let f = fixture(backend);

    let meeting_id = Uuid::new_v4();
    f.index
        .upsert(
            meeting_id,
            None,
            vec![Chunk {
                meeting_id,
                chunk_index: 0,
                text: "Bob: dashboard next week.".to_string(),
                utterance_span: (0, 1),
            }],
        )
        .await
        .unwrap();

    let bot = chatbot(&f);
    let mut session = ChatSession::default();
    bot.answer(&mut session, "When is the dashboard due?").await.unwrap();
    assert_eq!(session.turns().len(), 2);

    session.set_scope(ChatScope::Project("Portal Redesign".to_string()));
    assert!(session.turns().is_empty());
}
