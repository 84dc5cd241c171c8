//! math-agent HTTP Server
//!
//! Axum-based server exposing the math & reasoning assistant over a small
//! REST API. One in-memory chat session, one turn at a time.

mod handlers;
mod state;

use std::sync::Arc;

use axum::{routing::{get, post}, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use agent_runtime::{GroqConfig, GroqProvider, LlmProvider};
use math_assistant::{AssistantSettings, KnowledgeSource, WikipediaClient};

use crate::handlers::{chat_handler, health_check, history, list_models};
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment
    dotenvy::dotenv().ok();

    let groq = GroqConfig::from_env();
    let settings = AssistantSettings::from_env();

    // Verify Groq connection when a key is configured
    match GroqProvider::new(groq.clone()) {
        Ok(provider) => match provider.health_check().await {
            Ok(true) => {
                tracing::info!("✓ Connected to Groq");
                if let Ok(models) = provider.list_models().await {
                    for model in models {
                        tracing::info!("  Model: {}", model.id);
                    }
                }
            }
            Ok(false) | Err(_) => {
                tracing::warn!("⚠ Groq not reachable - requests will fail until it is");
            }
        },
        Err(_) => {
            tracing::warn!("⚠ GROQ_API_KEY not set - each request must carry an api_key");
        }
    }

    // Initialize knowledge source
    let knowledge: Arc<dyn KnowledgeSource> = Arc::new(WikipediaClient::from_env()?);
    if knowledge.health_check().await {
        tracing::info!("✓ Connected to Wikipedia");
    } else {
        tracing::warn!("⚠ Wikipedia not reachable - lookups will report errors");
    }

    tracing::info!("Model: {} (max {} iterations)", settings.model, settings.max_iterations);

    let state = AppState::new(groq, knowledge, settings);

    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build router
    let app = Router::new()
        // Health & info
        .route("/health", get(health_check))
        .route("/api/models", get(list_models))

        // Assistant API
        .route("/api/history", get(history))
        .route("/api/chat", post(chat_handler))

        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("🚀 math-agent server running on http://{}", addr);
    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("");
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /health          - Health check");
    tracing::info!("  GET  /api/models      - List available models");
    tracing::info!("  GET  /api/history     - Chat history");
    tracing::info!("  POST /api/chat        - Ask a question");
    tracing::info!("");

    axum::serve(listener, app).await?;

    Ok(())
}
