//! HTTP Endpoints
//!
//! REST API for the loan advisor.

use std::str::FromStr;
use std::time::{Duration, Instant};

use axum::{
    extract::{MatchedPath, Path, Request, State},
    http::{HeaderValue, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use loan_assist_agent::{TurnInput, TurnRequest};
use loan_assist_core::{
    DialogueState, EligibilityVerdict, FinancialProfile, Intent, LanguageCode, Modality,
    ProfileField, Turn, TurnFailure,
};

use crate::metrics::{record_request, record_turn, render};
use crate::state::AppState;
use crate::ServerError;

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    let server = &state.config.server;
    let cors_layer = build_cors_layer(&server.cors_origins, server.cors_enabled);
    let timeout = Duration::from_secs(server.timeout_seconds);

    Router::new()
        // Session endpoints
        .route("/api/sessions", post(create_session).get(list_sessions))
        .route("/api/sessions/:id", get(get_session).delete(delete_session))
        .route("/api/sessions/:id/turns", post(submit_turn))
        // Health check
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .route_layer(middleware::from_fn(track_requests))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(timeout))
        .layer(cors_layer)
        .with_state(state)
}

/// Build CORS layer from configured origins
///
/// - If cors_enabled is false, returns permissive layer (for dev)
/// - If cors_origins is empty, defaults to localhost:3000
fn build_cors_layer(origins: &[String], enabled: bool) -> CorsLayer {
    if !enabled {
        tracing::warn!("CORS is disabled - allowing all origins");
        return CorsLayer::permissive();
    }

    let mut parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| {
            origin.parse::<HeaderValue>().ok().or_else(|| {
                tracing::warn!(origin = %origin, "Invalid CORS origin");
                None
            })
        })
        .collect();

    if parsed.is_empty() {
        tracing::info!("No valid CORS origins configured, defaulting to localhost:3000");
        parsed.push(HeaderValue::from_static("http://localhost:3000"));
    }

    CorsLayer::new()
        .allow_origin(parsed)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any)
}

async fn track_requests(request: Request, next: Next) -> Response {
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());
    let response = next.run(request).await;
    record_request(route, response.status().as_u16());
    response
}

fn parse_language(tag: Option<&str>) -> Result<Option<LanguageCode>, ServerError> {
    tag.map(|tag| {
        LanguageCode::from_str(tag).map_err(|e| ServerError::InvalidRequest(e.to_string()))
    })
    .transpose()
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateSessionRequest {
    #[serde(default)]
    pub display_language: Option<String>,
}

/// Create session
async fn create_session(
    State(state): State<AppState>,
    body: Option<Json<CreateSessionRequest>>,
) -> Result<impl IntoResponse, ServerError> {
    let request = body.map(|Json(request)| request).unwrap_or_default();
    let display_language = parse_language(request.display_language.as_deref())?;
    let session_id = state.assistant.create_session(display_language).await?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "session_id": session_id })),
    ))
}

/// List sessions
async fn list_sessions(State(state): State<AppState>) -> Json<serde_json::Value> {
    let sessions = state.assistant.list_sessions().await;
    Json(serde_json::json!({
        "count": sessions.len(),
        "sessions": sessions,
    }))
}

#[derive(Debug, Serialize)]
pub struct SessionView {
    pub session_id: String,
    pub display_language: Option<LanguageCode>,
    pub detected_language: Option<LanguageCode>,
    pub profile: FinancialProfile,
    pub missing_fields: Vec<ProfileField>,
    pub outstanding: Option<ProfileField>,
    pub turns: Vec<Turn>,
}

/// Get session info
async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionView>, ServerError> {
    let session = state.assistant.get_session(&id).await?;

    Ok(Json(SessionView {
        session_id: session.id.clone(),
        display_language: session.display_language,
        detected_language: session.detected_language,
        profile: session.state.profile().clone(),
        missing_fields: session.state.missing_fields(),
        outstanding: session.state.outstanding(),
        turns: session.turns,
    }))
}

/// Delete session
async fn delete_session(State(state): State<AppState>, Path(id): Path<String>) -> StatusCode {
    state.assistant.end_session(&id).await;
    StatusCode::NO_CONTENT
}

/// Turn request body
#[derive(Debug, Deserialize)]
pub struct TurnBody {
    pub modality: Modality,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub audio_base64: Option<String>,
    #[serde(default)]
    pub duration_seconds: Option<f64>,
    #[serde(default)]
    pub display_language: Option<String>,
    #[serde(default)]
    pub synthesize: bool,
}

impl TurnBody {
    fn into_request(self) -> Result<TurnRequest, ServerError> {
        let input = match self.modality {
            Modality::Text => TurnInput::Text(self.text.unwrap_or_default()),
            Modality::Voice => {
                let bytes = match self.audio_base64.as_deref() {
                    Some(encoded) => STANDARD.decode(encoded.trim()).map_err(|e| {
                        ServerError::InvalidRequest(format!("audio_base64: {}", e))
                    })?,
                    None => Vec::new(),
                };
                TurnInput::Voice {
                    bytes,
                    declared_duration_secs: self.duration_seconds,
                }
            }
        };

        Ok(TurnRequest {
            input,
            display_language: parse_language(self.display_language.as_deref())?,
            synthesize: self.synthesize,
        })
    }
}

/// Delivered turn
#[derive(Debug, Serialize)]
pub struct TurnResult {
    pub session_id: String,
    pub response_text: String,
    pub response_english: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_audio: Option<String>,
    pub detected_language: LanguageCode,
    pub intent: Intent,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verdict: Option<EligibilityVerdict>,
    pub missing_fields: Vec<ProfileField>,
    pub state: DialogueState,
}

/// Failed turn
#[derive(Debug, Serialize)]
pub struct TurnFailureBody {
    pub session_id: String,
    pub failure: TurnFailure,
    pub apology: String,
    pub detected_language: Option<LanguageCode>,
    pub state: DialogueState,
}

/// Run one turn; an unknown session id starts a new session
async fn submit_turn(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(body): Json<TurnBody>,
) -> Result<Response, ServerError> {
    let request = body.into_request()?;
    let started = Instant::now();
    let outcome = state.assistant.submit_turn(&session_id, request).await?;
    let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
    let final_state = outcome.final_state();

    match outcome.result {
        Ok(delivered) => {
            record_turn(Some(delivered.detected_language), None, elapsed_ms);
            let result = TurnResult {
                session_id,
                response_text: delivered.response_text,
                response_english: delivered.response_english,
                response_audio: delivered.response_audio.map(|audio| STANDARD.encode(audio)),
                detected_language: delivered.detected_language,
                intent: delivered.intent,
                verdict: delivered.verdict,
                missing_fields: delivered.missing_fields,
                state: final_state,
            };
            Ok(Json(result).into_response())
        }
        Err(failed) => {
            record_turn(failed.detected_language, Some(failed.failure), elapsed_ms);
            let body = TurnFailureBody {
                session_id,
                failure: failed.failure,
                apology: failed.apology,
                detected_language: failed.detected_language,
                state: final_state,
            };
            Ok((StatusCode::UNPROCESSABLE_ENTITY, Json(body)).into_response())
        }
    }
}

/// Health check
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "sessions": state.assistant.session_count(),
        "language_service": state.assistant.orchestrator().language_service().authority_name(),
    }))
}

/// Prometheus metrics
async fn metrics_handler() -> impl IntoResponse {
    (
        [(axum::http::header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        render(),
    )
}
