//! Error Types for the Math Assistant

use thiserror::Error;

use agent_core::AgentError;

pub type Result<T> = std::result::Result<T, AssistantError>;

#[derive(Error, Debug)]
pub enum AssistantError {
    #[error("Please enter a question.")]
    EmptyQuestion,

    #[error("Knowledge lookup failed: {0}")]
    Lookup(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error(transparent)]
    Agent(#[from] AgentError),
}

impl AssistantError {
    /// Message suitable for showing to the end user
    pub fn user_message(&self) -> String {
        match self {
            Self::Agent(e) => e.user_message(),
            Self::Lookup(_) | Self::Network(_) => {
                "The knowledge service is currently unavailable. Please try again.".into()
            }
            other => other.to_string(),
        }
    }
}

impl From<AssistantError> for AgentError {
    fn from(err: AssistantError) -> Self {
        match err {
            AssistantError::Agent(inner) => inner,
            other => Self::ToolExecution(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_boundary_conversion() {
        let err: AgentError = AssistantError::Lookup("HTTP 503".into()).into();
        assert!(matches!(err, AgentError::ToolExecution(ref m) if m.contains("HTTP 503")));

        let err: AgentError = AssistantError::Agent(AgentError::RateLimited("x".into())).into();
        assert!(matches!(err, AgentError::RateLimited(_)));
    }

    #[test]
    fn test_user_messages() {
        assert_eq!(AssistantError::EmptyQuestion.user_message(), "Please enter a question.");
        let config = AssistantError::Agent(AgentError::Config("Please add your Groq API key to continue.".into()));
        assert_eq!(config.user_message(), "Please add your Groq API key to continue.");
    }
}
