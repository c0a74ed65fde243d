use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;
use url::Url;

use crate::errors::KnowledgeBaseError;
use crate::knowledge::KnowledgeBase;

/// Number of search hits requested per query
const SEARCH_LIMIT: u32 = 3;

/// MediaWiki API client (Wikipedia by default)
#[derive(Debug)]
pub struct WikipediaClient {
    /// `api.php` endpoint
    endpoint: String,
    /// HTTP client carrying the user agent and timeout
    client: Client,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    query: Option<SearchQuery>,
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    #[serde(default)]
    search: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    title: String,
}

#[derive(Debug, Deserialize)]
struct ExtractResponse {
    #[serde(default)]
    query: Option<ExtractQuery>,
}

#[derive(Debug, Deserialize)]
struct ExtractQuery {
    #[serde(default)]
    pages: BTreeMap<String, ExtractPage>,
}

#[derive(Debug, Deserialize)]
struct ExtractPage {
    #[serde(default)]
    extract: Option<String>,
}

impl WikipediaClient {
    /// Create a client for `endpoint` identifying itself as `user_agent`
    pub fn new(endpoint: impl Into<String>, user_agent: &str, timeout_secs: u64) -> Self {
        Self {
            endpoint: endpoint.into(),
            client: Client::builder()
                .user_agent(user_agent.to_string())
                .timeout(Duration::from_secs(timeout_secs))
                .build()
                .unwrap_or_default(),
        }
    }

    /// Build the search URL for `query`
    pub fn search_url(&self, query: &str) -> Result<Url, KnowledgeBaseError> {
        let limit = SEARCH_LIMIT.to_string();
        Url::parse_with_params(
            &self.endpoint,
            &[
                ("action", "query"),
                ("list", "search"),
                ("srsearch", query),
                ("srlimit", limit.as_str()),
                ("format", "json"),
                ("utf8", "1"),
            ],
        )
        .map_err(|e| KnowledgeBaseError::RequestFailed(format!("invalid endpoint: {}", e)))
    }

    /// Build the intro-extract URL for `title`
    pub fn extract_url(&self, title: &str, sentences: u32) -> Result<Url, KnowledgeBaseError> {
        let sentences = sentences.to_string();
        Url::parse_with_params(
            &self.endpoint,
            &[
                ("action", "query"),
                ("titles", title),
                ("prop", "extracts"),
                ("exintro", "1"),
                ("explaintext", "1"),
                ("exsentences", sentences.as_str()),
                ("format", "json"),
                ("utf8", "1"),
            ],
        )
        .map_err(|e| KnowledgeBaseError::RequestFailed(format!("invalid endpoint: {}", e)))
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: Url) -> Result<T, KnowledgeBaseError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(KnowledgeBaseError::Status(status.as_u16()));
        }
        response
            .json::<T>()
            .await
            .map_err(|e| KnowledgeBaseError::ParseError(e.to_string()))
    }
}

#[async_trait]
impl KnowledgeBase for WikipediaClient {
    async fn search(&self, query: &str) -> Result<Vec<String>, KnowledgeBaseError> {
        let url = self.search_url(query)?;
        debug!("Knowledge base search: {}", query);
        let response: SearchResponse = self.get_json(url).await?;

        Ok(response
            .query
            .map(|q| q.search.into_iter().map(|hit| hit.title).collect())
            .unwrap_or_default())
    }

    async fn extract(&self, title: &str, sentences: u32) -> Result<Option<String>, KnowledgeBaseError> {
        let url = self.extract_url(title, sentences)?;
        let response: ExtractResponse = self.get_json(url).await?;

        Ok(response
            .query
            .and_then(|q| q.pages.into_values().next())
            .and_then(|page| page.extract))
    }
}
