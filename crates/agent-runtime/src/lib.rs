//! # agent-runtime
//!
//! Runtime providers for the math-agent system.
//!
//! ## Providers
//!
//! - **Groq** (default): hosted inference over Groq's OpenAI-compatible API
//!
//! ## Usage
//!
//! ```rust,ignore
//! use agent_runtime::groq::{GroqConfig, GroqProvider};
//!
//! let provider = GroqProvider::new(GroqConfig::from_env())?;
//! let agent = AgentBuilder::new()
//!     .provider(Arc::new(provider))
//!     .build()?;
//! ```

#[cfg(feature = "groq")]
pub mod groq;

#[cfg(feature = "groq")]
pub use groq::{GroqConfig, GroqProvider, MISSING_KEY_MESSAGE};

// Re-export core types for convenience
pub use agent_core::{
    Agent, AgentError, LlmProvider, Message, Result, Role, Session, Tool, ToolRegistry,
};
