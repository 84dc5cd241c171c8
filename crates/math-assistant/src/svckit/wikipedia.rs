//! Wikipedia Search Tool
//!
//! Exposes a [`KnowledgeSource`] to the model. Lookup failures are returned
//! as errors and end the turn.

use std::sync::Arc;
use async_trait::async_trait;

use agent_core::{
    AgentError,
    Tool, ToolSchema, ToolCall, ToolResult,
    tool::ParameterSchema,
    Result as CoreResult,
};

use crate::knowledge::KnowledgeSource;

pub const WIKIPEDIA_TOOL: &str = "wikipedia_search";
pub const WIKIPEDIA_DESCRIPTION: &str = "Search Wikipedia for factual information";

/// Tool for looking up encyclopedic facts
pub struct WikipediaSearchTool {
    source: Arc<dyn KnowledgeSource>,
}

impl WikipediaSearchTool {
    pub fn new(source: Arc<dyn KnowledgeSource>) -> Self {
        Self { source }
    }
}

#[async_trait]
impl Tool for WikipediaSearchTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema::single_string(
            WIKIPEDIA_TOOL,
            WIKIPEDIA_DESCRIPTION,
            ParameterSchema::required_string("query", "Topic or phrase to look up (e.g., 'Ada Lovelace')"),
        )
    }

    async fn execute(&self, call: &ToolCall) -> CoreResult<ToolResult> {
        let query = call.string_arg("query")?;

        tracing::debug!(source = self.source.name(), %query, "Knowledge lookup");

        let summary = self.source
            .lookup(query)
            .await
            .map_err(AgentError::from)?;

        Ok(ToolResult::success(WIKIPEDIA_TOOL, summary))
    }
}
