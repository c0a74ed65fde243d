/*!
 * Extraction of verifiable claims from a text.
 *
 * The model lists claims one per line. Lines are cleaned of numbering and
 * bullets and kept when long enough to be a statement. The cached extractor
 * lets several checks of one section share a single extraction call.
 */

use async_trait::async_trait;
use log::debug;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use regex::Regex;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Arc;

use crate::errors::JudgeError;
use crate::verification::judge::Judge;
use crate::verification::prompts::JudgePrompts;

static NUMBERING: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+[.)]\s*").unwrap());
static BULLET: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[-*]\s*").unwrap());

/// Claims kept per text
pub const MAX_CLAIMS: usize = 6;

/// Shorter lines are not statements
const MIN_CLAIM_CHARS: usize = 16;

/// Listings held by the cache before it starts over
pub const CLAIM_CACHE_CAPACITY: usize = 64;

/// Trimmed lines of a model listing with numbering and bullets removed
pub fn listed_lines(text: &str) -> impl Iterator<Item = String> + '_ {
    text.lines().map(|line| {
        let line = line.trim();
        let line = NUMBERING.replace(line, "");
        BULLET.replace(&line, "").into_owned()
    })
}

/// Parse a claim listing
pub fn parse_claims(text: &str) -> Vec<String> {
    listed_lines(text)
        .filter(|line| line.chars().count() >= MIN_CLAIM_CHARS)
        .take(MAX_CLAIMS)
        .collect()
}

/// Source of verifiable claims
#[async_trait]
pub trait ClaimExtractor: Send + Sync {
    /// Up to six claims from `text`; empty when the text states none
    async fn extract_claims(&self, text: &str, title: &str) -> Result<Vec<String>, JudgeError>;
}

/// Claim extraction through the judge
#[derive(Debug, Clone)]
pub struct LlmClaimExtractor {
    judge: Judge,
    prompts: JudgePrompts,
}

impl LlmClaimExtractor {
    pub fn new(judge: Judge, prompts: JudgePrompts) -> Self {
        Self { judge, prompts }
    }
}

#[async_trait]
impl ClaimExtractor for LlmClaimExtractor {
    async fn extract_claims(&self, text: &str, title: &str) -> Result<Vec<String>, JudgeError> {
        let prompt = self.prompts.claim_extraction(title, text);
        let answer = self.judge.ask_text(&prompt, 512).await?;
        Ok(parse_claims(&answer))
    }
}

/// Memoizing wrapper keyed by a digest of title and text
///
/// Only successful extractions are stored. The cache holds at most
/// `capacity` listings and is emptied when a new one would exceed it.
pub struct CachedClaimExtractor {
    inner: Arc<dyn ClaimExtractor>,
    cache: RwLock<HashMap<String, Vec<String>>>,
    hits: RwLock<usize>,
    capacity: usize,
}

impl CachedClaimExtractor {
    pub fn new(inner: Arc<dyn ClaimExtractor>) -> Self {
        Self::with_capacity(inner, CLAIM_CACHE_CAPACITY)
    }

    pub fn with_capacity(inner: Arc<dyn ClaimExtractor>, capacity: usize) -> Self {
        Self {
            inner,
            cache: RwLock::new(HashMap::new()),
            hits: RwLock::new(0),
            capacity: capacity.max(1),
        }
    }

    fn key(text: &str, title: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(title.as_bytes());
        hasher.update([0u8]);
        hasher.update(text.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    /// Number of lookups answered from the cache
    pub fn hits(&self) -> usize {
        *self.hits.read()
    }

    /// Number of cached listings
    pub fn len(&self) -> usize {
        self.cache.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.read().is_empty()
    }

    /// Drop every cached listing
    pub fn clear(&self) {
        self.cache.write().clear();
    }
}

#[async_trait]
impl ClaimExtractor for CachedClaimExtractor {
    async fn extract_claims(&self, text: &str, title: &str) -> Result<Vec<String>, JudgeError> {
        let key = Self::key(text, title);
        if let Some(claims) = self.cache.read().get(&key) {
            *self.hits.write() += 1;
            debug!("Claim cache hit for '{}'", title);
            return Ok(claims.clone());
        }

        let claims = self.inner.extract_claims(text, title).await?;
        let mut cache = self.cache.write();
        if cache.len() >= self.capacity {
            debug!("Claim cache full ({} listings), starting over", cache.len());
            cache.clear();
        }
        cache.insert(key, claims.clone());
        Ok(claims)
    }
}
