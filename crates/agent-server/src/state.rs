//! Application State

use std::sync::Arc;

use tokio::sync::Mutex;

use agent_core::{LlmProvider, Result, Session};
use agent_runtime::{GroqConfig, GroqProvider};
use math_assistant::{AssistantSettings, KnowledgeSource, GREETING};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Groq settings; the key may be empty and supplied per request
    pub groq: GroqConfig,

    /// Encyclopedia behind the `wikipedia_search` tool
    pub knowledge: Arc<dyn KnowledgeSource>,

    /// Model and iteration settings
    pub settings: AssistantSettings,

    /// The single chat session; held for the whole turn
    pub session: Arc<Mutex<Session>>,
}

impl AppState {
    pub fn new(groq: GroqConfig, knowledge: Arc<dyn KnowledgeSource>, settings: AssistantSettings) -> Self {
        Self {
            groq,
            knowledge,
            settings,
            session: Arc::new(Mutex::new(Session::with_greeting(GREETING))),
        }
    }

    /// Provider authenticated with `api_key`
    pub fn provider_for(&self, api_key: &str) -> Result<Arc<dyn LlmProvider>> {
        let provider = GroqProvider::new(self.groq.clone().with_api_key(api_key))?;
        Ok(Arc::new(provider))
    }
}
