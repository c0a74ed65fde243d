//! Semantic equivalence scoring.
//!
//! Paragraphs are paired by position and rated 1-10 by the judge. Glossary
//! usage and paragraph structure adjust the averaged rating.

use log::{debug, info};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

use crate::verification::glossary::Glossary;
use crate::verification::judge::Judge;
use crate::verification::model::CheckResult;
use crate::verification::prompts::JudgePrompts;
use crate::verification::{head, lenient_int};

/// Paragraph pairs rated per section
const MAX_RATED_PARAGRAPHS: usize = 8;

/// Characters of each paragraph sent for rating
const PARAGRAPH_CHARS: usize = 800;

/// Rating used when the judge gives no usable answer
const NEUTRAL_RATING: i64 = 7;

const MAX_GLOSSARY_ISSUES: usize = 5;
const GLOSSARY_PENALTY: i64 = 3;
const STRUCTURE_PENALTY: i64 = 10;

#[derive(Debug, Deserialize)]
struct ParagraphRating {
    #[serde(default)]
    score: Value,
    #[serde(default)]
    reason: Option<String>,
}

/// Non-empty trimmed paragraphs separated by blank lines
pub fn paragraphs(text: &str) -> Vec<&str> {
    text.split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect()
}

/// Semantic checker
#[derive(Debug, Clone)]
pub struct SemanticChecker {
    judge: Judge,
    prompts: JudgePrompts,
    glossary: Arc<Glossary>,
}

impl SemanticChecker {
    pub fn new(judge: Judge, prompts: JudgePrompts, glossary: Arc<Glossary>) -> Self {
        Self {
            judge,
            prompts,
            glossary,
        }
    }

    async fn rate(&self, title: &str, original: &str, translated: &str) -> (i64, Option<String>) {
        let prompt = self.prompts.paragraph_rating(
            title,
            head(original, PARAGRAPH_CHARS),
            head(translated, PARAGRAPH_CHARS),
        );
        match self.judge.ask::<ParagraphRating>(&prompt, 256).await {
            Ok(rating) => {
                let score = lenient_int(&rating.score).unwrap_or(NEUTRAL_RATING).clamp(1, 10);
                (score, rating.reason.filter(|r| !r.trim().is_empty()))
            }
            Err(e) => {
                debug!("Paragraph rating unavailable: {}", e);
                (NEUTRAL_RATING, None)
            }
        }
    }

    pub async fn check(&self, original: &str, translated: &str, title: &str) -> CheckResult {
        let orig_paras = paragraphs(original);
        let trans_paras = paragraphs(translated);
        if orig_paras.is_empty() || trans_paras.is_empty() {
            return CheckResult::perfect();
        }

        let mut issues = Vec::new();
        let pairs = orig_paras.len().min(trans_paras.len()).min(MAX_RATED_PARAGRAPHS);
        let mut total = 0;

        for i in 0..pairs {
            let partner = trans_paras[i.min(trans_paras.len() - 1)];
            let (score, reason) = self.rate(title, orig_paras[i], partner).await;
            total += score;

            if score < 5 {
                let reason = reason.unwrap_or_else(|| "meaning may be distorted".to_string());
                issues.push(format!("Para {}: low semantic score {}/10 - {}", i + 1, score, reason));
            } else if score < 7 {
                let reason = reason.unwrap_or_else(|| "minor meaning shift".to_string());
                issues.push(format!("Para {}: moderate score {}/10 - {}", i + 1, score, reason));
            }
        }

        let mut score = total * 10 / pairs as i64;

        let glossary_issues: Vec<String> = self
            .glossary
            .missing_terms(original, translated)
            .into_iter()
            .take(MAX_GLOSSARY_ISSUES)
            .map(|entry| format!("Glossary: '{}' ({}) not found in translation", entry.source, entry.target))
            .collect();
        score -= GLOSSARY_PENALTY * glossary_issues.len() as i64;
        issues.extend(glossary_issues);

        let ratio = trans_paras.len() as f64 / orig_paras.len() as f64;
        if !(0.5..=2.0).contains(&ratio) {
            issues.push(format!(
                "Paragraph count mismatch: {} orig vs {} trans",
                orig_paras.len(),
                trans_paras.len()
            ));
            score -= STRUCTURE_PENALTY;
        }

        info!("Semantic score {} over {} paragraph pairs", score.max(0), pairs);
        CheckResult::scored(score, issues)
    }
}
