/*!
 * Concept enrichment for readers of a translated section.
 *
 * Key concepts are extracted from the original text, each concept is looked
 * up in the knowledge base, and the judge writes a short explanation and a
 * localized title in the target language. Concepts without a usable
 * knowledge-base match are dropped.
 */

use log::{debug, info};
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;

use crate::knowledge::{ArticleSummary, KnowledgeBase};
use crate::verification::claims::listed_lines;
use crate::verification::judge::Judge;
use crate::verification::model::{EnrichmentEntry, Section};
use crate::verification::pacing::CallPacer;
use crate::verification::prompts::JudgePrompts;

static PREAMBLE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?:Here is|Below is|다음은|아래는).*?\n").unwrap());

const MAX_CONCEPTS: usize = 8;
const MAX_ENRICHED: usize = 6;
const SUMMARY_SENTENCES: u32 = 8;
const MIN_EXTRACT_CHARS: usize = 51;
const MIN_EXPLANATION_CHARS: usize = 30;

/// Parse a concept listing
pub fn parse_concepts(text: &str) -> Vec<String> {
    listed_lines(text)
        .map(|line| line.trim_matches(|c| c == '"' || c == '\'').to_string())
        .filter(|line| {
            let len = line.chars().count();
            len > 2 && len < 80
        })
        .take(MAX_CONCEPTS)
        .collect()
}

/// Explanation text with any leading preamble lines removed
pub fn clean_explanation(text: &str) -> String {
    PREAMBLE.replace_all(text, "").trim().to_string()
}

/// Enrichment researcher
#[derive(Clone)]
pub struct ConceptResearcher {
    judge: Judge,
    prompts: JudgePrompts,
    knowledge: Arc<dyn KnowledgeBase>,
    pacer: CallPacer,
    min_chars: usize,
    domain_suffix: String,
}

impl std::fmt::Debug for ConceptResearcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConceptResearcher")
            .field("judge", &self.judge)
            .field("min_chars", &self.min_chars)
            .field("domain_suffix", &self.domain_suffix)
            .finish()
    }
}

impl ConceptResearcher {
    pub fn new(judge: Judge, prompts: JudgePrompts, knowledge: Arc<dyn KnowledgeBase>, pacer: CallPacer) -> Self {
        Self {
            judge,
            prompts,
            knowledge,
            pacer,
            min_chars: 100,
            domain_suffix: "mathematics".to_string(),
        }
    }

    /// Shortest original text worth enriching
    pub fn with_min_chars(mut self, min_chars: usize) -> Self {
        self.min_chars = min_chars;
        self
    }

    /// Word appended to a concept when the plain lookup misses
    pub fn with_domain_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.domain_suffix = suffix.into();
        self
    }

    async fn concepts(&self, text: &str, title: &str) -> Vec<String> {
        let prompt = self.prompts.concept_extraction(title, text);
        match self.judge.ask_text_at(&prompt, 0.2, 512).await {
            Ok(answer) => parse_concepts(&answer),
            Err(e) => {
                debug!("Concept extraction unavailable: {}", e);
                Vec::new()
            }
        }
    }

    async fn summary(&self, query: &str) -> Option<ArticleSummary> {
        match self.knowledge.top_summary(query, SUMMARY_SENTENCES).await {
            Ok(summary) => summary.filter(|s| s.extract.chars().count() >= MIN_EXTRACT_CHARS),
            Err(e) => {
                debug!("Knowledge-base lookup failed for '{}': {}", query, e);
                None
            }
        }
    }

    async fn localized_title(&self, concept: &str) -> String {
        let prompt = self.prompts.concept_title(concept);
        let answer = match self.judge.ask_text_at(&prompt, 0.1, 64).await {
            Ok(answer) => answer,
            Err(e) => {
                debug!("Title translation unavailable for '{}': {}", concept, e);
                return concept.to_string();
            }
        };

        let title = answer
            .trim()
            .lines()
            .next()
            .unwrap_or_default()
            .trim_matches(|c| c == '"' || c == '\'');
        if title.chars().count() < 2 {
            concept.to_string()
        } else {
            title.to_string()
        }
    }

    /// Build the note for one concept, `None` when it cannot be researched
    pub async fn research(&self, concept: &str, context: &str) -> Option<EnrichmentEntry> {
        let summary = match self.summary(concept).await {
            Some(summary) => summary,
            None => self.summary(&format!("{} {}", concept, self.domain_suffix)).await?,
        };

        let prompt = self
            .prompts
            .concept_explanation(concept, &summary.title, &summary.extract, context);
        let explanation = match self.judge.ask_text_at(&prompt, 0.3, 512).await {
            Ok(text) if text.chars().count() >= MIN_EXPLANATION_CHARS => clean_explanation(&text),
            Ok(_) => {
                debug!("Explanation for '{}' too short", concept);
                return None;
            }
            Err(e) => {
                debug!("Explanation unavailable for '{}': {}", concept, e);
                return None;
            }
        };

        Some(EnrichmentEntry {
            term: concept.to_string(),
            title_localized: self.localized_title(concept).await,
            explanation,
            source: summary.title,
        })
    }

    /// Notes for the key concepts of a section
    pub async fn enrich(&self, section: &Section) -> Vec<EnrichmentEntry> {
        let original = section.content_original.as_str();
        if original.chars().count() < self.min_chars {
            return Vec::new();
        }

        let concepts = self.concepts(original, &section.title_original).await;
        let mut entries = Vec::new();
        for concept in concepts.iter().take(MAX_ENRICHED) {
            debug!("Researching: {}", concept);
            if let Some(entry) = self.pacer.run(self.research(concept, original)).await {
                entries.push(entry);
            }
        }

        info!(
            "Section {}: {} of {} concepts enriched",
            section.section_id,
            entries.len(),
            concepts.len().min(MAX_ENRICHED)
        );
        entries
    }
}
