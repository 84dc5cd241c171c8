//! Service Kit - Agent Tools
//!
//! Tools that implement `agent_core::Tool` for the math assistant.

mod calculator;
mod reasoning;
mod wikipedia;

pub use calculator::{
    evaluate, try_evaluate, CalculatorTool, EvalError,
    CALCULATOR_DESCRIPTION, CALCULATOR_TOOL, INVALID_EXPRESSION,
};
pub use reasoning::{
    render_reasoning_prompt, ReasoningResponder, ReasoningTool,
    REASONING_DESCRIPTION, REASONING_PROMPT, REASONING_TOOL,
};
pub use wikipedia::{WikipediaSearchTool, WIKIPEDIA_DESCRIPTION, WIKIPEDIA_TOOL};
