//! HTTP Handlers

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use agent_core::{provider::ModelInfo, AgentError, Role, NO_ANSWER_WARNING};
use agent_runtime::MISSING_KEY_MESSAGE;
use math_assistant::{AssistantError, MathAssistant};

use crate::state::AppState;

// ============================================================================
// Response Types
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub groq_connected: bool,
    pub knowledge_connected: bool,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub question: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    pub model: String,
}

#[derive(Debug, Serialize)]
pub struct HistoryEntry {
    pub role: Role,
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, error: impl Into<String>, code: &str) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
            code: code.into(),
        }),
    )
}

/// Key from the request if given, otherwise the configured one
pub fn resolve_api_key(requested: Option<&str>, configured: &str) -> Option<String> {
    requested
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .or_else(|| Some(configured.trim()).filter(|k| !k.is_empty()))
        .map(str::to_string)
}

/// Status code for a failed turn
pub const fn status_for(err: &AssistantError) -> StatusCode {
    match err {
        AssistantError::EmptyQuestion => StatusCode::BAD_REQUEST,
        AssistantError::Agent(AgentError::Config(_)) => StatusCode::UNAUTHORIZED,
        _ => StatusCode::BAD_GATEWAY,
    }
}

fn missing_key() -> ApiError {
    api_error(StatusCode::UNAUTHORIZED, MISSING_KEY_MESSAGE, "MISSING_API_KEY")
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let groq_connected = match resolve_api_key(None, &state.groq.api_key) {
        Some(key) => match state.provider_for(&key) {
            Ok(provider) => provider.health_check().await.unwrap_or(false),
            Err(_) => false,
        },
        None => false,
    };

    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        groq_connected,
        knowledge_connected: state.knowledge.health_check().await,
    })
}

/// Models available to the configured key
pub async fn list_models(State(state): State<AppState>) -> Result<Json<Vec<ModelInfo>>, ApiError> {
    let key = resolve_api_key(None, &state.groq.api_key).ok_or_else(missing_key)?;

    let provider = state.provider_for(&key).map_err(|e| {
        api_error(StatusCode::UNAUTHORIZED, e.user_message(), "CONFIG_ERROR")
    })?;

    let models = provider.list_models().await.map_err(|e| {
        tracing::error!("Model listing error: {}", e);
        api_error(StatusCode::BAD_GATEWAY, e.user_message(), "PROVIDER_ERROR")
    })?;

    Ok(Json(models))
}

/// Displayed chat history of the session
pub async fn history(State(state): State<AppState>) -> Json<Vec<HistoryEntry>> {
    let session = state.session.lock().await;

    Json(
        session
            .history()
            .iter()
            .map(|m| HistoryEntry {
                role: m.role,
                content: m.content.clone(),
            })
            .collect(),
    )
}

/// Main chat endpoint
pub async fn chat_handler(
    State(state): State<AppState>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    if payload.question.trim().is_empty() {
        let err = AssistantError::EmptyQuestion;
        return Err(api_error(status_for(&err), err.user_message(), "EMPTY_QUESTION"));
    }

    let key = resolve_api_key(payload.api_key.as_deref(), &state.groq.api_key)
        .ok_or_else(missing_key)?;

    let provider = state.provider_for(&key).map_err(|e| {
        api_error(StatusCode::UNAUTHORIZED, e.user_message(), "CONFIG_ERROR")
    })?;

    let settings = match payload.model.as_deref().map(str::trim).filter(|m| !m.is_empty()) {
        Some(model) => state.settings.clone().with_model(model),
        None => state.settings.clone(),
    };

    let assistant = MathAssistant::new(provider, state.knowledge.clone(), &settings).map_err(|e| {
        tracing::error!("Assistant setup error: {}", e);
        api_error(StatusCode::INTERNAL_SERVER_ERROR, e.user_message(), "SETUP_ERROR")
    })?;

    // One turn at a time
    let mut session = state.session.lock().await;

    let reply = assistant.converse(&mut session, &payload.question).await.map_err(|e| {
        tracing::error!("Agent error: {}", e);
        api_error(status_for(&e), e.user_message(), "AGENT_ERROR")
    })?;

    if reply.answer.is_none() {
        tracing::warn!(messages = reply.transcript.len(), "No answer extracted");
    }

    Ok(Json(ChatResponse {
        warning: reply.answer.is_none().then(|| NO_ANSWER_WARNING.to_string()),
        answer: reply.answer,
        model: settings.model,
    }))
}
