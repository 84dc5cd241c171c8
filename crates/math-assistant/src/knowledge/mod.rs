//! Knowledge Lookup
//!
//! Abstractions and implementations for encyclopedia-style summary services.

mod fixed;
mod wikipedia;

pub use fixed::StaticKnowledge;
pub use wikipedia::{WikipediaClient, WikipediaConfig, MAX_QUERY_CHARS, NO_RESULT};

use async_trait::async_trait;

use crate::error::Result;

/// Knowledge source trait (Strategy pattern)
///
/// Forwards a free-text query and returns a plain-text summary. Transport
/// failures are returned to the caller untouched.
#[async_trait]
pub trait KnowledgeSource: Send + Sync {
    /// Summarise what the source knows about `query`
    async fn lookup(&self, query: &str) -> Result<String>;

    /// Check if the source is reachable
    async fn health_check(&self) -> bool;

    /// Source name
    fn name(&self) -> &str;
}

/// Format one hit the way every source reports it
pub(crate) fn format_page(title: &str, summary: &str) -> String {
    format!("Page: {title}\nSummary: {summary}")
}

/// Truncate to at most `max_chars` characters
pub(crate) fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}
