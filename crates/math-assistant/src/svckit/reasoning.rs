//! Reasoning Tool
//!
//! Forwards a sub-question to the same model through a fixed prompt and
//! returns its raw reply. The sub-call has no tools and no system prompt.

use std::sync::Arc;
use async_trait::async_trait;

use agent_core::{
    GenerationOptions, LlmProvider, Message,
    Tool, ToolSchema, ToolCall, ToolResult,
    tool::ParameterSchema,
    Result as CoreResult,
};

pub const REASONING_TOOL: &str = "reasoning_tool";
pub const REASONING_DESCRIPTION: &str = "Solve logic and reasoning questions with explanation";

/// Prompt template; `{question}` is replaced by the sub-question
pub const REASONING_PROMPT: &str = "\nYou are a math assistant. For calculations, only generate numeric expressions suitable for the calculator tool.\n\nQuestion: {question}\nAnswer:\n";

/// Fill the reasoning prompt with a question
pub fn render_reasoning_prompt(question: &str) -> String {
    REASONING_PROMPT.replacen("{question}", question, 1)
}

/// Single-shot model call behind the reasoning tool
#[derive(Clone)]
pub struct ReasoningResponder {
    provider: Arc<dyn LlmProvider>,
    options: GenerationOptions,
}

impl ReasoningResponder {
    pub fn new(provider: Arc<dyn LlmProvider>, options: GenerationOptions) -> Self {
        let options = GenerationOptions {
            system_prompt: None,
            ..options
        };
        Self { provider, options }
    }

    /// Ask the model once and return its content unchanged
    pub async fn respond(&self, question: &str) -> CoreResult<String> {
        let messages = [Message::user(render_reasoning_prompt(question))];
        let completion = self.provider
            .complete(&messages, &[], &self.options)
            .await?;

        Ok(completion.content)
    }
}

/// Tool wrapper around [`ReasoningResponder`]
pub struct ReasoningTool {
    responder: ReasoningResponder,
}

impl ReasoningTool {
    pub fn new(responder: ReasoningResponder) -> Self {
        Self { responder }
    }
}

#[async_trait]
impl Tool for ReasoningTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema::single_string(
            REASONING_TOOL,
            REASONING_DESCRIPTION,
            ParameterSchema::required_string("question", "Logic or word problem to reason through"),
        )
    }

    async fn execute(&self, call: &ToolCall) -> CoreResult<ToolResult> {
        let question = call.string_arg("question")?;
        let reply = self.responder.respond(question).await?;
        Ok(ToolResult::success(REASONING_TOOL, reply))
    }
}
