//! Scripted Provider
//!
//! For testing and offline demos. Replays a fixed sequence of completions
//! and records every request it receives.

use std::collections::VecDeque;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::{AgentError, Result};
use crate::message::Message;
use crate::provider::{Completion, GenerationOptions, LlmProvider, ModelInfo};
use crate::tool::{ToolCall, ToolSchema};

/// A request as seen by the scripted provider
#[derive(Clone, Debug)]
pub struct RecordedRequest {
    pub messages: Vec<Message>,
    pub tool_names: Vec<String>,
    pub options: GenerationOptions,
}

/// Provider that answers from a pre-recorded script
pub struct ScriptedProvider {
    script: Mutex<VecDeque<Result<Completion>>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl ScriptedProvider {
    pub fn new(script: impl IntoIterator<Item = Completion>) -> Self {
        Self {
            script: Mutex::new(script.into_iter().map(Ok).collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Script that fails on the first call
    pub fn failing(error: AgentError) -> Self {
        Self {
            script: Mutex::new(VecDeque::from([Err(error)])),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Convenience: a completion requesting one tool with one string argument
    pub fn call(tool: &str, param: &str, value: &str) -> Completion {
        Completion::tool_use(vec![ToolCall::new(tool).with_arg(param, value)])
    }

    /// Requests received so far
    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().await.clone()
    }

    /// Completions not yet consumed
    pub async fn remaining(&self) -> usize {
        self.script.lock().await.len()
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    async fn complete(
        &self,
        messages: &[Message],
        tools: &[ToolSchema],
        options: &GenerationOptions,
    ) -> Result<Completion> {
        self.requests.lock().await.push(RecordedRequest {
            messages: messages.to_vec(),
            tool_names: tools.iter().map(|t| t.name.clone()).collect(),
            options: options.clone(),
        });

        let mut completion = self
            .script
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Err(AgentError::Provider("script exhausted".into())))?;

        if completion.model.is_empty() {
            completion.model.clone_from(&options.model);
        }
        Ok(completion)
    }

    async fn list_models(&self) -> Result<Vec<ModelInfo>> {
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_replays_in_order_and_records() {
        let provider = ScriptedProvider::new([
            ScriptedProvider::call("calculator", "expression", "1+1"),
            Completion::text("2"),
        ]);
        let options = GenerationOptions::default();

        let first = provider.complete(&[Message::user("1+1?")], &[], &options).await.unwrap();
        assert!(first.requests_tool());
        assert_eq!(first.model, "llama-3.1-8b-instant");

        let second = provider.complete(&[], &[], &options).await.unwrap();
        assert_eq!(second.content, "2");

        assert_eq!(provider.requests().await.len(), 2);
        assert_eq!(provider.remaining().await, 0);
    }

    #[tokio::test]
    async fn test_exhausted_script_errors() {
        let provider = ScriptedProvider::new(Vec::new());
        let result = provider.complete(&[], &[], &GenerationOptions::default()).await;
        assert!(matches!(result, Err(AgentError::Provider(_))));
    }
}
