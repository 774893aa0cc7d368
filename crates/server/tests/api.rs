//! Router tests driven through `tower::ServiceExt::oneshot`

use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::{json, Value};
use tower::ServiceExt;

use loan_assist_agent::{DialogueOrchestrator, LoanAssistant, ResponseComposer};
use loan_assist_config::Settings;
use loan_assist_pipeline::{AudioGate, LanguageService, ScriptedAuthority};
use loan_assist_server::{create_router, AppState};

fn app() -> Router {
    let language = LanguageService::new(Arc::new(ScriptedAuthority::new()), Duration::from_secs(2));
    let orchestrator =
        DialogueOrchestrator::new(language, AudioGate::default(), ResponseComposer::new(None));
    create_router(AppState::new(Settings::default(), LoanAssistant::new(orchestrator)))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

#[tokio::test]
async fn test_health() {
    let app = app();
    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["language_service"], "scripted");
}

#[tokio::test]
async fn test_session_lifecycle() {
    let app = app();

    let (status, body) = send(
        &app,
        "POST",
        "/api/sessions",
        Some(json!({ "display_language": "ta-IN" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["session_id"].as_str().unwrap().to_string();

    let (status, body) = send(&app, "GET", "/api/sessions", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert_eq!(body["sessions"][0]["id"], id.as_str());

    let (status, body) = send(&app, "GET", &format!("/api/sessions/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["display_language"], "ta-IN");
    assert_eq!(body["missing_fields"].as_array().unwrap().len(), 6);

    let (status, _) = send(&app, "DELETE", &format!("/api/sessions/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, "GET", &format!("/api/sessions/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_session_without_body() {
    let app = app();
    let (status, body) = send(&app, "POST", "/api/sessions", None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body["session_id"].is_string());
}

#[tokio::test]
async fn test_unsupported_display_language_rejected() {
    let app = app();
    let (status, _) = send(
        &app,
        "POST",
        "/api/sessions",
        Some(json!({ "display_language": "fr-FR" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_text_turn() {
    let app = app();
    let (status, body) = send(
        &app,
        "POST",
        "/api/sessions/abc/turns",
        Some(json!({ "modality": "text", "text": "I am 32" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["detected_language"], "en-IN");
    assert_eq!(body["intent"], "slot_filling");
    assert_eq!(body["state"]["state"], "delivered");
    assert!(body["response_text"]
        .as_str()
        .unwrap()
        .contains("monthly income"));
    assert!(body.get("response_audio").is_none());

    let (_, session) = send(&app, "GET", "/api/sessions/abc", None).await;
    assert_eq!(session["profile"]["age"], 32);
    assert_eq!(session["outstanding"], "monthly_income");
    assert_eq!(session["turns"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_failed_turn_is_unprocessable() {
    let app = app();
    let audio = STANDARD.encode([1u8; 16]);
    let (status, body) = send(
        &app,
        "POST",
        "/api/sessions/abc/turns",
        Some(json!({ "modality": "voice", "audio_base64": audio, "duration_seconds": 45.0 })),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["failure"], "AudioTooLong");
    assert_eq!(body["state"]["state"], "failed");
    assert!(body["apology"].as_str().unwrap().contains("30 seconds"));
    assert!(body["detected_language"].is_null());
}

#[tokio::test]
async fn test_invalid_audio_encoding_is_bad_request() {
    let app = app();
    let (status, _) = send(
        &app,
        "POST",
        "/api/sessions/abc/turns",
        Some(json!({ "modality": "voice", "audio_base64": "not base64!" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_speech_response_is_base64() {
    let app = app();
    let (status, body) = send(
        &app,
        "POST",
        "/api/sessions/abc/turns",
        Some(json!({ "modality": "text", "text": "I am 32", "synthesize": true })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let audio = STANDARD
        .decode(body["response_audio"].as_str().unwrap())
        .unwrap();
    assert_eq!(&audio[..4], b"RIFF");
}
