/*!
 * External corroboration of claims.
 *
 * Each claim is turned into a short keyword query. The top knowledge-base
 * hit's extract is handed to the judge, which decides whether it supports
 * the claim. Claims whose lookup fails outright are not counted.
 */

use log::{debug, info, warn};
use serde::Deserialize;
use std::sync::Arc;

use crate::knowledge::KnowledgeBase;
use crate::verification::claims::ClaimExtractor;
use crate::verification::head;
use crate::verification::judge::Judge;
use crate::verification::model::CheckResult;
use crate::verification::pacing::CallPacer;
use crate::verification::prompts::JudgePrompts;

const MAX_RESEARCHED_CLAIMS: usize = 5;
const QUERY_TERMS: usize = 4;
const EXTRACT_SENTENCES: u32 = 5;

/// Score when no claim could be looked up
const UNVERIFIABLE_SCORE: i64 = 80;

const STOPWORDS: &[&str] = &[
    "the", "a", "an", "is", "are", "was", "were", "be", "been", "has", "have", "had", "do", "does",
    "did", "will", "would", "could", "should", "may", "might", "can", "shall", "that", "this",
    "these", "those", "it", "its", "of", "in", "on", "at", "to", "for", "with", "by", "from", "as",
    "or", "and", "not", "no", "but", "if", "then", "than", "so", "very",
];

/// Keyword terms of a claim, capitalized words first, longer words first
pub fn search_terms(claim: &str) -> Vec<String> {
    let mut terms: Vec<String> = claim
        .split_whitespace()
        .map(|word| {
            word.chars()
                .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
                .collect::<String>()
        })
        .filter(|clean| clean.chars().count() > 2)
        .filter(|clean| !STOPWORDS.contains(&clean.to_lowercase().as_str()))
        .collect();

    terms.sort_by_key(|term| {
        let capitalized = term.chars().next().is_some_and(char::is_uppercase);
        (!capitalized, std::cmp::Reverse(term.chars().count()))
    });
    terms
}

/// Outcome of corroborating one claim
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Corroboration {
    Supported,
    Unsupported(String),
}

#[derive(Debug, Deserialize)]
struct FactCheck {
    supported: Option<bool>,
    #[serde(default)]
    note: Option<String>,
}

/// External corroboration checker
#[derive(Clone)]
pub struct ResearchChecker {
    judge: Judge,
    prompts: JudgePrompts,
    claims: Arc<dyn ClaimExtractor>,
    knowledge: Arc<dyn KnowledgeBase>,
    pacer: CallPacer,
}

impl std::fmt::Debug for ResearchChecker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResearchChecker")
            .field("judge", &self.judge)
            .field("knowledge", &self.knowledge)
            .field("pacer", &self.pacer)
            .finish()
    }
}

impl ResearchChecker {
    pub fn new(
        judge: Judge,
        prompts: JudgePrompts,
        claims: Arc<dyn ClaimExtractor>,
        knowledge: Arc<dyn KnowledgeBase>,
        pacer: CallPacer,
    ) -> Self {
        Self {
            judge,
            prompts,
            claims,
            knowledge,
            pacer,
        }
    }

    /// Corroborate one claim; `None` when it could not be looked up
    pub async fn corroborate(&self, claim: &str) -> Option<Corroboration> {
        let terms = search_terms(claim);
        if terms.is_empty() {
            debug!("No search terms in claim: {}", claim);
            return None;
        }
        let query = terms[..terms.len().min(QUERY_TERMS)].join(" ");

        let titles = match self.knowledge.search(&query).await {
            Ok(titles) => titles,
            Err(e) => {
                warn!("Knowledge-base search failed for '{}': {}", query, e);
                return None;
            }
        };
        let Some(title) = titles.into_iter().next() else {
            return Some(Corroboration::Unsupported("no knowledge-base results".to_string()));
        };

        let extract = match self.knowledge.extract(&title, EXTRACT_SENTENCES).await {
            Ok(extract) => extract.unwrap_or_default(),
            Err(e) => {
                warn!("Knowledge-base extract failed for '{}': {}", title, e);
                return None;
            }
        };
        if extract.trim().is_empty() {
            return Some(Corroboration::Unsupported(format!("empty extract from '{}'", title)));
        }

        Some(self.fact_check(claim, &title, &extract).await)
    }

    async fn fact_check(&self, claim: &str, title: &str, extract: &str) -> Corroboration {
        let prompt = self.prompts.fact_check(claim, title, extract);
        match self.judge.ask::<FactCheck>(&prompt, 256).await {
            Ok(FactCheck { supported: Some(true), .. }) => Corroboration::Supported,
            Ok(FactCheck { supported: Some(false), note }) => {
                Corroboration::Unsupported(note.unwrap_or_else(|| "no knowledge-base match".to_string()))
            }
            Ok(_) => Corroboration::Unsupported("LLM check inconclusive".to_string()),
            Err(e) => {
                debug!("Fact check unavailable: {}", e);
                Corroboration::Unsupported("LLM check inconclusive".to_string())
            }
        }
    }

    pub async fn check(&self, original: &str, title: &str) -> CheckResult {
        let claims = match self.claims.extract_claims(original, title).await {
            Ok(claims) => claims,
            Err(e) => {
                debug!("Claim extraction unavailable: {}", e);
                Vec::new()
            }
        };
        if claims.is_empty() {
            return CheckResult::perfect();
        }

        let mut checked = 0i64;
        let mut supported = 0i64;
        let mut flagged = Vec::new();

        for claim in claims.iter().take(MAX_RESEARCHED_CLAIMS) {
            match self.pacer.run(self.corroborate(claim)).await {
                Some(Corroboration::Supported) => {
                    checked += 1;
                    supported += 1;
                }
                Some(Corroboration::Unsupported(note)) => {
                    checked += 1;
                    flagged.push(format!("Unverified: {} → {}", head(claim, 80), note));
                }
                None => {}
            }
        }

        if checked == 0 {
            info!("Research: no claims could be looked up");
            return CheckResult::scored(
                UNVERIFIABLE_SCORE,
                vec!["No claims could be verified externally".to_string()],
            );
        }

        info!("Research: {}/{} claims corroborated", supported, checked);
        CheckResult::new(supported * 100 / checked, Vec::new(), Vec::new(), flagged)
    }
}
