//! Math Assistant
//!
//! Wires the three tools into a conversation agent and turns a question into
//! a [`Reply`]: the full transcript plus the extracted answer, if any.

use std::sync::Arc;

use agent_core::{
    provider::DEFAULT_MODEL,
    reasoning::DEFAULT_MAX_ITERATIONS,
    Agent, AgentBuilder, GenerationOptions, LlmProvider, Session, ToolRegistry, Transcript,
    NO_ANSWER_WARNING,
};

use crate::error::{AssistantError, Result};
use crate::knowledge::KnowledgeSource;
use crate::svckit::{CalculatorTool, ReasoningResponder, ReasoningTool, WikipediaSearchTool};

/// First message of every chat session
pub const GREETING: &str = "Hi 👋 I'm a math & reasoning assistant. Ask me anything!";

/// Agent settings that come from configuration rather than code
#[derive(Clone, Debug)]
pub struct AssistantSettings {
    pub model: String,
    pub max_iterations: usize,
    pub temperature: Option<f32>,
    /// Optional operator instructions; tool choice otherwise rests on the tool descriptions
    pub system_prompt: Option<String>,
}

impl Default for AssistantSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.into(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
            temperature: None,
            system_prompt: None,
        }
    }
}

impl AssistantSettings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key-value source (environment, test fixtures)
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            model: lookup("GROQ_MODEL")
                .map(|m| m.trim().to_string())
                .filter(|m| !m.is_empty())
                .unwrap_or(defaults.model),
            max_iterations: lookup("AGENT_MAX_ITERATIONS")
                .and_then(|v| v.trim().parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(defaults.max_iterations),
            system_prompt: lookup("AGENT_SYSTEM_PROMPT").filter(|p| !p.trim().is_empty()),
            ..defaults
        }
    }

    /// Same settings with a different model
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    fn generation(&self) -> GenerationOptions {
        GenerationOptions {
            temperature: self.temperature,
            ..GenerationOptions::with_model(&self.model)
        }
    }
}

/// The three assistant tools in their fixed order
pub fn tool_registry(
    provider: Arc<dyn LlmProvider>,
    knowledge: Arc<dyn KnowledgeSource>,
    options: GenerationOptions,
) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(WikipediaSearchTool::new(knowledge));
    registry.register(CalculatorTool);
    registry.register(ReasoningTool::new(ReasoningResponder::new(provider, options)));
    registry
}

/// Result of one question
#[derive(Clone, Debug)]
pub struct Reply {
    pub transcript: Transcript,
    pub answer: Option<String>,
}

impl Reply {
    /// The answer, or the warning shown when none could be extracted
    pub fn display_text(&self) -> &str {
        self.answer.as_deref().unwrap_or(NO_ANSWER_WARNING)
    }
}

/// Conversation agent configured with the math tools
pub struct MathAssistant {
    agent: Agent,
}

impl MathAssistant {
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        knowledge: Arc<dyn KnowledgeSource>,
        settings: &AssistantSettings,
    ) -> Result<Self> {
        let tools = tool_registry(provider.clone(), knowledge, settings.generation());

        let mut builder = AgentBuilder::new()
            .provider(provider)
            .tools(tools)
            .model(settings.model.clone())
            .max_iterations(settings.max_iterations);

        if let Some(temperature) = settings.temperature {
            builder = builder.temperature(temperature);
        }
        if let Some(prompt) = &settings.system_prompt {
            builder = builder.system_prompt(prompt.clone());
        }

        Ok(Self { agent: builder.build()? })
    }

    /// Answer one question from a fresh transcript
    pub async fn solve(&self, question: &str) -> Result<Reply> {
        if question.trim().is_empty() {
            return Err(AssistantError::EmptyQuestion);
        }

        let transcript = self.agent.ask(question).await?;
        let answer = transcript.final_answer().map(str::to_string);

        tracing::debug!(
            messages = transcript.len(),
            tool_messages = transcript.tool_messages().count(),
            answered = answer.is_some(),
            "Question solved"
        );

        Ok(Reply { transcript, answer })
    }

    /// Answer a question inside a chat session, recording both sides
    pub async fn converse(&self, session: &mut Session, question: &str) -> Result<Reply> {
        if question.trim().is_empty() {
            return Err(AssistantError::EmptyQuestion);
        }

        session.push_question(question);
        let reply = self.solve(question).await?;

        if let Some(answer) = &reply.answer {
            session.push_answer(answer.clone());
        }

        Ok(reply)
    }

    pub fn agent(&self) -> &Agent {
        &self.agent
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agent_core::{AgentError, Completion, Role, ScriptedProvider, Tool};
    use crate::knowledge::StaticKnowledge;
    use crate::svckit::{render_reasoning_prompt, INVALID_EXPRESSION};
    use async_trait::async_trait;

    struct DownKnowledge;

    #[async_trait]
    impl KnowledgeSource for DownKnowledge {
        async fn lookup(&self, _query: &str) -> Result<String> {
            Err(AssistantError::Lookup("Wikipedia returned HTTP 503".into()))
        }

        async fn health_check(&self) -> bool {
            false
        }

        fn name(&self) -> &str {
            "down"
        }
    }

    fn assistant(provider: &Arc<ScriptedProvider>) -> MathAssistant {
        let knowledge = StaticKnowledge::new().with_page(
            "Ada Lovelace",
            "Augusta Ada King, Countess of Lovelace, was an English mathematician and writer.",
        );
        MathAssistant::new(provider.clone(), Arc::new(knowledge), &AssistantSettings::default()).unwrap()
    }

    #[tokio::test]
    async fn test_calculator_round_trip() {
        let provider = Arc::new(ScriptedProvider::new([
            ScriptedProvider::call("calculator", "expression", "12 * (3+4)"),
            Completion::text("12 times (3 + 4) is 84."),
        ]));

        let reply = assistant(&provider).solve("What is 12 times (3 + 4)?").await.unwrap();
        let messages = reply.transcript.messages();

        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0].role, Role::User);
        assert_eq!(messages[1].role, Role::Assistant);
        assert_eq!(messages[1].tool_calls.len(), 1);
        assert_eq!(messages[2].role, Role::Tool);
        assert_eq!(messages[2].content, "84");
        assert_eq!(messages[2].tool_call_id(), messages[1].tool_calls[0].id.as_deref());
        assert_eq!(reply.answer.as_deref(), Some("12 times (3 + 4) is 84."));
    }

    #[tokio::test]
    async fn test_lookup_answer_is_the_paraphrase() {
        let provider = Arc::new(ScriptedProvider::new([
            ScriptedProvider::call("wikipedia_search", "query", "Ada Lovelace"),
            Completion::text("Ada Lovelace was an English mathematician."),
        ]));

        let reply = assistant(&provider).solve("Who was Ada Lovelace?").await.unwrap();
        let observation = reply.transcript.tool_messages().next().unwrap();

        assert!(observation.content.starts_with("Page: Ada Lovelace\nSummary: "));
        assert_eq!(reply.answer.as_deref(), Some("Ada Lovelace was an English mathematician."));
    }

    #[tokio::test]
    async fn test_bad_expression_is_an_observation() {
        let provider = Arc::new(ScriptedProvider::new([
            ScriptedProvider::call("calculator", "expression", "import os"),
            Completion::text("I could not evaluate that."),
        ]));

        let reply = assistant(&provider).solve("Run import os").await.unwrap();
        assert_eq!(reply.transcript.tool_messages().next().unwrap().content, INVALID_EXPRESSION);
    }

    #[tokio::test]
    async fn test_reasoning_tool_shares_the_provider() {
        let provider = Arc::new(ScriptedProvider::new([
            ScriptedProvider::call("reasoning_tool", "question", "If all A are B, are all B A?"),
            Completion::text("Not necessarily; some B may not be A."),
            Completion::text("No. All A being B does not make all B A."),
        ]));

        let reply = assistant(&provider).solve("If all A are B, are all B A?").await.unwrap();
        assert_eq!(
            reply.transcript.tool_messages().next().unwrap().content,
            "Not necessarily; some B may not be A."
        );
        assert_eq!(reply.answer.as_deref(), Some("No. All A being B does not make all B A."));

        let requests = provider.requests().await;
        assert_eq!(requests.len(), 3);
        assert_eq!(requests[0].tool_names, ["wikipedia_search", "calculator", "reasoning_tool"]);
        assert!(requests[1].tool_names.is_empty());
        assert_eq!(
            requests[1].messages[0].content,
            render_reasoning_prompt("If all A are B, are all B A?")
        );
        assert_eq!(provider.remaining().await, 0);
    }

    #[tokio::test]
    async fn test_blank_final_message_yields_no_answer() {
        let provider = Arc::new(ScriptedProvider::new([Completion::text("   ")]));

        let reply = assistant(&provider).solve("What is 2 + 2?").await.unwrap();
        assert!(reply.answer.is_none());
        assert_eq!(reply.display_text(), NO_ANSWER_WARNING);
    }

    #[tokio::test]
    async fn test_empty_question_never_reaches_the_model() {
        let provider = Arc::new(ScriptedProvider::new(Vec::new()));
        let assistant = assistant(&provider);
        let mut session = Session::with_greeting(GREETING);

        assert!(matches!(assistant.solve("  ").await, Err(AssistantError::EmptyQuestion)));
        assert!(matches!(
            assistant.converse(&mut session, "").await,
            Err(AssistantError::EmptyQuestion)
        ));
        assert!(provider.requests().await.is_empty());
        assert_eq!(session.message_count(), 1);
    }

    #[tokio::test]
    async fn test_converse_records_history() {
        let provider = Arc::new(ScriptedProvider::new([
            Completion::text("4"),
            Completion::text(""),
        ]));
        let assistant = assistant(&provider);
        let mut session = Session::with_greeting(GREETING);

        assistant.converse(&mut session, "What is 2 + 2?").await.unwrap();
        let reply = assistant.converse(&mut session, "And nothing?").await.unwrap();
        assert!(reply.answer.is_none());

        let history: Vec<_> = session.history().iter().map(|m| (m.role, m.content.as_str())).collect();
        assert_eq!(
            history,
            [
                (Role::Assistant, GREETING),
                (Role::User, "What is 2 + 2?"),
                (Role::Assistant, "4"),
                (Role::User, "And nothing?"),
            ]
        );
    }

    #[tokio::test]
    async fn test_provider_failure_propagates() {
        let provider = Arc::new(ScriptedProvider::failing(AgentError::Auth("invalid api key".into())));
        let err = assistant(&provider).solve("What is 2 + 2?").await.unwrap_err();
        assert!(matches!(err, AssistantError::Agent(AgentError::Auth(_))));
    }

    #[test]
    fn test_registry_order_and_descriptions() {
        let provider: Arc<dyn LlmProvider> = Arc::new(ScriptedProvider::new(Vec::new()));
        let registry = tool_registry(provider, Arc::new(StaticKnowledge::new()), GenerationOptions::default());

        let schemas = registry.schemas();
        let described: Vec<_> = schemas
            .iter()
            .map(|s| (s.name.as_str(), s.description.as_str(), s.parameters[0].name.as_str()))
            .collect();
        assert_eq!(
            described,
            [
                ("wikipedia_search", "Search Wikipedia for factual information", "query"),
                ("calculator", "Evaluate numeric expressions safely using Rust's meval library", "expression"),
                ("reasoning_tool", "Solve logic and reasoning questions with explanation", "question"),
            ]
        );
        assert!(registry.get("calculator").is_some_and(|t| t.schema().parameters[0].required));
    }

    #[test]
    fn test_settings_from_lookup() {
        let settings = AssistantSettings::from_lookup(|key| match key {
            "GROQ_MODEL" => Some("llama-3.3-70b-versatile".into()),
            "AGENT_MAX_ITERATIONS" => Some("0".into()),
            "AGENT_SYSTEM_PROMPT" => Some("  ".into()),
            _ => None,
        });
        assert_eq!(settings.model, "llama-3.3-70b-versatile");
        assert_eq!(settings.max_iterations, DEFAULT_MAX_ITERATIONS);
        assert!(settings.system_prompt.is_none());

        let settings = AssistantSettings::from_lookup(|key| {
            (key == "AGENT_SYSTEM_PROMPT").then(|| "Answer in French.".to_string())
        });
        assert_eq!(settings.system_prompt.as_deref(), Some("Answer in French."));
    }

    #[tokio::test]
    async fn test_no_system_prompt_by_default() {
        let provider = Arc::new(ScriptedProvider::new([Completion::text("4")]));
        let reply = assistant(&provider).solve("What is 2 + 2?").await.unwrap();

        let requests = provider.requests().await;
        assert!(requests[0].options.system_prompt.is_none());
        assert_eq!(requests[0].messages.len(), 1);
        assert!(reply.transcript.messages().iter().all(|m| m.role != Role::System));
    }

    #[tokio::test]
    async fn test_configured_system_prompt_reaches_the_provider_only() {
        let provider = Arc::new(ScriptedProvider::new([Completion::text("4")]));
        let settings = AssistantSettings {
            system_prompt: Some("Answer in French.".into()),
            ..AssistantSettings::default()
        };
        let assistant = MathAssistant::new(provider.clone(), Arc::new(StaticKnowledge::new()), &settings).unwrap();
        let reply = assistant.solve("What is 2 + 2?").await.unwrap();

        let requests = provider.requests().await;
        assert_eq!(requests[0].options.system_prompt.as_deref(), Some("Answer in French."));
        assert!(reply.transcript.messages().iter().all(|m| m.role != Role::System));
    }

    #[tokio::test]
    async fn test_lookup_outage_fails_the_question() {
        let provider = Arc::new(ScriptedProvider::new([
            ScriptedProvider::call("wikipedia_search", "query", "Ada Lovelace"),
            Completion::text("Ada Lovelace was a mathematician (from memory)."),
        ]));
        let assistant = MathAssistant::new(provider.clone(), Arc::new(DownKnowledge), &AssistantSettings::default()).unwrap();

        let err = assistant.solve("Who was Ada Lovelace?").await.unwrap_err();
        assert!(matches!(err, AssistantError::Agent(AgentError::ToolExecution(ref m)) if m.contains("HTTP 503")));
        assert_eq!(provider.requests().await.len(), 1);
    }
}
