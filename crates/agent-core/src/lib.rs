//! # agent-core
//!
//! Core agent logic with provider-agnostic LLM abstraction, an ordered tool
//! registry and deterministic answer extraction.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        Agent                                 │
//! │  ┌─────────────┐  ┌─────────────┐  ┌─────────────────────┐   │
//! │  │  Reasoning  │  │    Tools    │  │   LlmProvider       │   │
//! │  │    Loop     │──│   Registry  │──│   (Strategy)        │   │
//! │  └──────┬──────┘  └─────────────┘  └─────────────────────┘   │
//! │         │ Transcript                                         │
//! │  ┌──────▼──────┐                                             │
//! │  │   Answer    │                                             │
//! │  │  Extractor  │                                             │
//! │  └─────────────┘                                             │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The `LlmProvider` trait enables swapping between Groq, any other
//! OpenAI-compatible endpoint, or the [`ScriptedProvider`] used in tests.

pub mod error;
pub mod extract;
pub mod message;
pub mod provider;
pub mod reasoning;
pub mod scripted;
pub mod session;
pub mod tool;

pub use error::{AgentError, Result};
pub use extract::{extract_final_answer, NO_ANSWER_WARNING};
pub use message::{Message, Role, Transcript};
pub use provider::{Completion, GenerationOptions, LlmProvider};
pub use reasoning::{Agent, AgentBuilder, AgentConfig};
pub use scripted::ScriptedProvider;
pub use session::Session;
pub use tool::{Tool, ToolCall, ToolRegistry, ToolResult, ToolSchema};
