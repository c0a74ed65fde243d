//! In-process knowledge base.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;

use crate::errors::KnowledgeBaseError;
use crate::knowledge::KnowledgeBase;

/// Knowledge base backed by a fixed list of articles.
///
/// Search matches an article when any query word (case-insensitive) occurs in
/// its title. `offline()` simulates a network outage on every call.
#[derive(Debug, Clone, Default)]
pub struct InMemoryKnowledgeBase {
    articles: Vec<(String, String)>,
    offline: bool,
    queries: Arc<Mutex<Vec<String>>>,
}

impl InMemoryKnowledgeBase {
    /// Empty knowledge base
    pub fn new() -> Self {
        Self::default()
    }

    /// Knowledge base whose every request fails
    pub fn offline() -> Self {
        Self {
            offline: true,
            ..Self::default()
        }
    }

    /// Add an article
    pub fn with_article(mut self, title: impl Into<String>, extract: impl Into<String>) -> Self {
        self.articles.push((title.into(), extract.into()));
        self
    }

    /// Search queries received so far
    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().clone()
    }

    fn check_online(&self) -> Result<(), KnowledgeBaseError> {
        if self.offline {
            Err(KnowledgeBaseError::RequestFailed("network unreachable".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl KnowledgeBase for InMemoryKnowledgeBase {
    async fn search(&self, query: &str) -> Result<Vec<String>, KnowledgeBaseError> {
        self.queries.lock().push(query.to_string());
        self.check_online()?;

        let words: Vec<String> = query
            .split_whitespace()
            .map(|w| w.to_lowercase())
            .collect();

        Ok(self
            .articles
            .iter()
            .filter(|(title, _)| {
                let title = title.to_lowercase();
                words.iter().any(|w| title.contains(w.as_str()))
            })
            .map(|(title, _)| title.clone())
            .collect())
    }

    async fn extract(&self, title: &str, _sentences: u32) -> Result<Option<String>, KnowledgeBaseError> {
        self.check_online()?;
        Ok(self
            .articles
            .iter()
            .find(|(t, _)| t == title)
            .map(|(_, extract)| extract.clone()))
    }
}
