//! Reasoning Loop
//!
//! Drives the tool-calling conversation: the model either answers or asks
//! for a tool, the tool runs, its observation is appended, and the model is
//! asked again until it produces a terminal message.

use std::sync::Arc;

use crate::error::{AgentError, Result};
use crate::message::{Message, Transcript};
use crate::provider::{GenerationOptions, LlmProvider};
use crate::tool::{ToolCall, ToolRegistry, ToolResult};

/// Default cap on model calls per question
pub const DEFAULT_MAX_ITERATIONS: usize = 10;

/// Agent configuration
#[derive(Clone, Debug)]
pub struct AgentConfig {
    /// Maximum model calls before giving up
    pub max_iterations: usize,

    /// Generation options (model, sampling, optional system prompt)
    pub generation: GenerationOptions,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            generation: GenerationOptions::default(),
        }
    }
}

/// The main Agent struct
pub struct Agent {
    provider: Arc<dyn LlmProvider>,
    tools: Arc<ToolRegistry>,
    config: AgentConfig,
}

impl Agent {
    /// Create a new agent
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        tools: Arc<ToolRegistry>,
        config: AgentConfig,
    ) -> Self {
        Self {
            provider,
            tools,
            config,
        }
    }

    /// Answer a question, returning the full transcript of the turn
    pub async fn ask(&self, question: &str) -> Result<Transcript> {
        let mut transcript = Transcript::seeded(question);
        self.run(&mut transcript).await?;
        Ok(transcript)
    }

    /// Continue a transcript until the model produces a terminal message
    pub async fn run(&self, transcript: &mut Transcript) -> Result<()> {
        let schemas = self.tools.schemas();

        for iteration in 1..=self.config.max_iterations {
            tracing::debug!(iteration, "Agent iteration");

            let completion = self.provider
                .complete(transcript.messages(), &schemas, &self.config.generation)
                .await?;

            if !completion.requests_tool() {
                transcript.push(Message::assistant(completion.content).with_model(completion.model));
                return Ok(());
            }

            let calls: Vec<ToolCall> = completion.tool_calls
                .into_iter()
                .map(|mut call| {
                    if call.id.is_none() {
                        call.id = Some(uuid::Uuid::new_v4().to_string());
                    }
                    call
                })
                .collect();

            transcript.push(
                Message::assistant_tool_calls(completion.content, calls.clone())
                    .with_model(completion.model),
            );

            // One tool at a time, in the order the model asked for them
            for call in &calls {
                tracing::debug!(tool = %call.name, "Executing tool");
                let result = self.execute_tool(call).await?;
                transcript.push(Message::tool(result.output, call.id.clone(), &call.name));
            }
        }

        Err(AgentError::MaxIterations(self.config.max_iterations))
    }

    /// Execute a tool call
    ///
    /// Unknown tools and invalid arguments become an in-band observation so
    /// the model can correct itself. Any other failure ends the turn.
    async fn execute_tool(&self, call: &ToolCall) -> Result<ToolResult> {
        match self.tools.execute(call).await {
            Ok(result) => Ok(result.with_id(call.id.clone())),
            Err(e @ (AgentError::ToolNotFound(_) | AgentError::ToolValidation(_))) => {
                tracing::warn!(tool = %call.name, error = %e, "Tool call rejected");
                Ok(ToolResult::failure(call.name.clone(), format!("Error: {e}")).with_id(call.id.clone()))
            }
            Err(e) => {
                tracing::error!(tool = %call.name, error = %e, "Tool failed");
                Err(e)
            }
        }
    }

    /// Get the tool registry
    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Get configuration
    pub const fn config(&self) -> &AgentConfig {
        &self.config
    }
}

/// Builder for Agent configuration
pub struct AgentBuilder {
    provider: Option<Arc<dyn LlmProvider>>,
    tools: ToolRegistry,
    config: AgentConfig,
}

impl Default for AgentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AgentBuilder {
    pub fn new() -> Self {
        Self {
            provider: None,
            tools: ToolRegistry::new(),
            config: AgentConfig::default(),
        }
    }

    #[must_use]
    pub fn provider(mut self, provider: Arc<dyn LlmProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    #[must_use]
    pub fn tool<T: crate::tool::Tool + 'static>(mut self, tool: T) -> Self {
        self.tools.register(tool);
        self
    }

    #[must_use]
    pub fn tools(mut self, tools: ToolRegistry) -> Self {
        self.tools = tools;
        self
    }

    #[must_use]
    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.generation.system_prompt = Some(prompt.into());
        self
    }

    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.generation.model = model.into();
        self
    }

    #[must_use]
    pub const fn temperature(mut self, temp: f32) -> Self {
        self.config.generation.temperature = Some(temp);
        self
    }

    #[must_use]
    pub const fn max_iterations(mut self, max: usize) -> Self {
        self.config.max_iterations = max;
        self
    }

    pub fn build(self) -> Result<Agent> {
        let provider = self.provider
            .ok_or_else(|| AgentError::Config("Provider is required".into()))?;

        if self.config.max_iterations == 0 {
            return Err(AgentError::Config("max_iterations must be at least 1".into()));
        }

        Ok(Agent::new(provider, Arc::new(self.tools), self.config))
    }
}
