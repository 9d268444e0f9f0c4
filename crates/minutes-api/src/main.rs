//! minutes-api - HTTP API server for minutes

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use tokio::sync::Mutex;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use minutes_core::{
    defaults, ChatScope, EmbeddingBackend, GenerationBackend, MeetingStore, TranscriptSegment,
};
use minutes_index::EmbeddingIndex;
use minutes_inference::OllamaBackend;
use minutes_pipeline::{
    ChatSession, MeetingChatbot, MeetingPipeline, MeetingSubmission, MemoryStore, TranscriptInput,
};

// =============================================================================
// APPLICATION STATE
// =============================================================================

#[derive(Clone)]
struct AppState {
    store: Arc<dyn MeetingStore>,
    pipeline: Arc<MeetingPipeline>,
    chatbot: Arc<MeetingChatbot>,
    /// Single server-side conversation, re-scoped per chat request.
    session: Arc<Mutex<ChatSession>>,
}

impl AppState {
    fn new(gen: Arc<dyn GenerationBackend>, embed: Arc<dyn EmbeddingBackend>) -> Self {
        let store: Arc<dyn MeetingStore> = Arc::new(MemoryStore::new());
        let index = Arc::new(EmbeddingIndex::new(embed));
        let pipeline = Arc::new(MeetingPipeline::new(
            gen.clone(),
            store.clone(),
            index.clone(),
        ));
        let chatbot = Arc::new(MeetingChatbot::new(gen, index, store.clone()));
        Self {
            store,
            pipeline,
            chatbot,
            session: Arc::new(Mutex::new(ChatSession::default())),
        }
    }
}

fn app(state: AppState) -> Router {
    Router::new()
        .route("/api/meetings", post(create_meeting).get(list_meetings))
        .route("/api/meetings/:id", get(get_meeting))
        .route("/api/projects", get(list_projects))
        .route("/api/chat", post(chat))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// =============================================================================
// HANDLERS
// =============================================================================

#[derive(Debug, Deserialize)]
struct CreateMeetingRequest {
    transcript: Option<String>,
    segments: Option<Vec<TranscriptSegment>>,
    title: Option<String>,
    project_name: Option<String>,
}

async fn create_meeting(
    State(state): State<AppState>,
    Json(req): Json<CreateMeetingRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let transcript = match (req.segments, req.transcript) {
        (Some(segments), _) => TranscriptInput::Segments(segments),
        (None, Some(text)) => TranscriptInput::Text(text),
        (None, None) => {
            return Err(ApiError::BadRequest(
                "Either 'transcript' or 'segments' is required".to_string(),
            ))
        }
    };
    let submission = MeetingSubmission {
        transcript,
        title: req.title,
        project_name: req.project_name,
    };

    // Run on a detached task so processing reaches persistence even if
    // the client disconnects mid-request.
    let pipeline = state.pipeline.clone();
    let meeting = tokio::spawn(async move { pipeline.process(submission).await })
        .await
        .map_err(|e| ApiError::Internal(format!("Pipeline task failed: {}", e)))??;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "meeting_id": meeting.id,
            "title": meeting.title,
            "project_name": meeting.project_name,
            "summary": meeting.summary,
            "project_details": meeting.project_details,
            "overall_sentiment": meeting.overall_sentiment,
        })),
    ))
}

async fn list_meetings(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.store.list().await?))
}

async fn get_meeting(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = Uuid::parse_str(&id)
        .map_err(|_| ApiError::BadRequest(format!("Invalid meeting id '{}'", id)))?;
    Ok(Json(state.store.get(id).await?))
}

async fn list_projects(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.store.list_projects().await?))
}

#[derive(Debug, Deserialize)]
struct ChatRequest {
    question: String,
    project_name: Option<String>,
}

async fn chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let scope = match req.project_name {
        Some(name) => ChatScope::Project(name),
        None => ChatScope::Global,
    };

    let mut session = state.session.lock().await;
    session.set_scope(scope);
    let response = state.chatbot.answer(&mut session, &req.question).await?;

    Ok(Json(serde_json::json!({ "response": response })))
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

// =============================================================================
// ERROR HANDLING
// =============================================================================

#[derive(Debug)]
enum ApiError {
    BadRequest(String),
    NotFound(String),
    Internal(String),
}

impl From<minutes_core::Error> for ApiError {
    fn from(err: minutes_core::Error) -> Self {
        match err {
            minutes_core::Error::InvalidInput(msg) => ApiError::BadRequest(msg),
            minutes_core::Error::NotFound(msg) => ApiError::NotFound(msg),
            e @ minutes_core::Error::MeetingNotFound(_) => ApiError::NotFound(e.to_string()),
            e => ApiError::Internal(e.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(serde_json::json!({
            "success": false,
            "error": message,
        }));

        (status, body).into_response()
    }
}

// =============================================================================
// SERVER
// =============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    //
    // Environment variables:
    //   LOG_FORMAT  - "json" or "text" (default: "text")
    //   RUST_LOG    - standard env filter (default: "minutes_api=debug,tower_http=debug")
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "minutes_api=debug,tower_http=debug".into());
    let registry = tracing_subscriber::registry().with(env_filter);
    if log_format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    // Get configuration from environment
    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(defaults::SERVER_PORT);

    let backend = Arc::new(OllamaBackend::from_env());
    info!(
        gen_model = backend.model_name(),
        embed_model = backend.model_version(),
        "Inference backend configured"
    );

    let state = AppState::new(backend.clone(), backend);
    let app = app(state);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================
