//! Calculator Tool
//!
//! Evaluates numeric expressions with `meval`. Every failure is folded into
//! the [`INVALID_EXPRESSION`] sentinel so the model always gets a string back.
//!
//! Results are `f64` values rendered with Rust's `Display`: the shortest
//! decimal that round-trips, never scientific notation, integral values
//! without a fractional part (`84`, not `84.0`), and `inf`, `-inf` or `NaN`
//! for non-finite results.
//!
//! Syntax is `meval`'s (`+ - * / % ^`, parentheses, `sqrt`, `sin`, `pi`, ...).
//! Python-style `**` is accepted as a synonym for `^`.

use async_trait::async_trait;
use thiserror::Error;

use agent_core::{
    Tool, ToolSchema, ToolCall, ToolResult,
    tool::ParameterSchema,
    Result as CoreResult,
};

/// Returned in place of any evaluation failure
pub const INVALID_EXPRESSION: &str = "Invalid expression";

pub const CALCULATOR_TOOL: &str = "calculator";
pub const CALCULATOR_DESCRIPTION: &str = "Evaluate numeric expressions safely using Rust's meval library";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum EvalError {
    #[error("empty expression")]
    Empty,

    #[error("{0}")]
    Backend(String),
}

/// Evaluate an expression, reporting why it failed
pub fn try_evaluate(expression: &str) -> Result<String, EvalError> {
    if expression.trim().is_empty() {
        return Err(EvalError::Empty);
    }

    let normalized = expression.replace("**", "^");
    let value = meval::eval_str(&normalized).map_err(|e| EvalError::Backend(e.to_string()))?;
    Ok(value.to_string())
}

/// Evaluate an expression; failures become [`INVALID_EXPRESSION`]
pub fn evaluate(expression: &str) -> String {
    try_evaluate(expression).unwrap_or_else(|e| {
        tracing::debug!(%expression, error = %e, "Expression rejected");
        INVALID_EXPRESSION.to_string()
    })
}

/// Tool wrapper around [`evaluate`]
pub struct CalculatorTool;

#[async_trait]
impl Tool for CalculatorTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema::single_string(
            CALCULATOR_TOOL,
            CALCULATOR_DESCRIPTION,
            ParameterSchema::required_string(
                "expression",
                "Numeric expression to evaluate (e.g., '12 * (3 + 4)', 'sqrt(16) + 5')",
            ),
        )
    }

    async fn execute(&self, call: &ToolCall) -> CoreResult<ToolResult> {
        let expression = call.string_arg("expression")?;

        Ok(match try_evaluate(expression) {
            Ok(value) => ToolResult::success(CALCULATOR_TOOL, value),
            Err(e) => {
                tracing::debug!(%expression, error = %e, "Expression rejected");
                ToolResult::failure(CALCULATOR_TOOL, INVALID_EXPRESSION)
            }
        })
    }
}
