//! Static Knowledge Source
//!
//! For testing and offline demos. Answers from an in-memory set of pages.

use std::collections::BTreeMap;

use async_trait::async_trait;

use super::{format_page, KnowledgeSource, NO_RESULT};
use crate::error::Result;

/// In-memory knowledge source keyed by page title
#[derive(Default)]
pub struct StaticKnowledge {
    pages: BTreeMap<String, (String, String)>,
}

impl StaticKnowledge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a page (title matching is case-insensitive)
    #[must_use]
    pub fn with_page(mut self, title: impl Into<String>, summary: impl Into<String>) -> Self {
        let title = title.into();
        self.pages.insert(title.to_lowercase(), (title, summary.into()));
        self
    }
}

#[async_trait]
impl KnowledgeSource for StaticKnowledge {
    async fn lookup(&self, query: &str) -> Result<String> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(NO_RESULT.into());
        }

        let hits: Vec<String> = self
            .pages
            .iter()
            .filter(|(key, _)| needle.contains(key.as_str()) || key.contains(&needle))
            .map(|(_, (title, summary))| format_page(title, summary))
            .collect();

        if hits.is_empty() {
            Ok(NO_RESULT.into())
        } else {
            Ok(hits.join("\n\n"))
        }
    }

    async fn health_check(&self) -> bool {
        true
    }

    fn name(&self) -> &str {
        "static"
    }
}
