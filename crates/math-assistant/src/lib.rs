//! # math-assistant
//!
//! Math and reasoning assistant built on `agent-core`: a conversation agent
//! with an encyclopedia lookup, a numeric calculator and a reasoning tool.
//!
//! ## Flow of one question
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  "What is 12 times (3 + 4)?"                                │
//! ├─────────────────────────────────────────────────────────────┤
//! │  user       What is 12 times (3 + 4)?                       │
//! │  assistant  → calculator("12 * (3+4)")                      │
//! │  tool       84                                              │
//! │  assistant  12 times (3 + 4) is 84.        ◄── final answer │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The final answer is the last assistant message of the transcript, never
//! a tool observation. A blank final message yields no answer and the shell
//! shows [`agent_core::NO_ANSWER_WARNING`] instead.

pub mod assistant;
pub mod error;
pub mod knowledge;
pub mod svckit;

pub use assistant::{
    tool_registry, AssistantSettings, MathAssistant, Reply, GREETING,
};
pub use error::{AssistantError, Result};
pub use knowledge::{KnowledgeSource, StaticKnowledge, WikipediaClient, WikipediaConfig};

/// Re-export tools for easy registration
pub mod tools {
    pub use crate::svckit::{
        CalculatorTool,
        ReasoningTool,
        WikipediaSearchTool,
    };
}
