/*!
 * Knowledge-base lookups used for corroboration and enrichment.
 *
 * A lookup is two-step: a search returning ranked page titles, then an
 * extract request for one title returning a short plain-text summary.
 * - `wikipedia`: MediaWiki API client
 * - `memory`: in-process knowledge base for tests and offline runs
 */

use async_trait::async_trait;
use std::fmt::Debug;

use crate::errors::KnowledgeBaseError;

pub mod memory;
pub mod wikipedia;

pub use memory::InMemoryKnowledgeBase;
pub use wikipedia::WikipediaClient;

/// Summary of the best-matching article for a query
#[derive(Debug, Clone, PartialEq)]
pub struct ArticleSummary {
    /// Article title
    pub title: String,
    /// Plain-text introduction
    pub extract: String,
}

/// A searchable source of short article summaries
#[async_trait]
pub trait KnowledgeBase: Send + Sync + Debug {
    /// Search for `query`, returning page titles ranked best first
    async fn search(&self, query: &str) -> Result<Vec<String>, KnowledgeBaseError>;

    /// Fetch the first `sentences` sentences of the article called `title`
    ///
    /// Returns `Ok(None)` when the article exists but has no extract.
    async fn extract(&self, title: &str, sentences: u32) -> Result<Option<String>, KnowledgeBaseError>;

    /// Search and fetch the top hit's extract in one step
    ///
    /// `Ok(None)` means the search succeeded but produced nothing usable.
    async fn top_summary(&self, query: &str, sentences: u32) -> Result<Option<ArticleSummary>, KnowledgeBaseError> {
        let titles = self.search(query).await?;
        let Some(title) = titles.into_iter().next() else {
            return Ok(None);
        };

        let extract = self.extract(&title, sentences).await?;
        Ok(extract
            .filter(|text| !text.trim().is_empty())
            .map(|extract| ArticleSummary { title, extract }))
    }
}
