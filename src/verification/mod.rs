/*!
 * Translation verification engine.
 *
 * A section is checked by four independent modules, run in order:
 * - `formula`: math token integrity, with deterministic repairs
 * - `semantic`: paragraph meaning preservation and glossary usage
 * - `logic`: claim preservation and internal consistency
 * - `research`: corroboration of claims against a knowledge base
 *
 * Module scores are folded into one weighted score by `aggregate`.
 * `enrichment` is a separate pass producing reader notes for key concepts.
 * `verifier` wires everything for one section.
 */

use serde_json::Value;

pub mod aggregate;
pub mod claims;
pub mod enrichment;
pub mod formula;
pub mod glossary;
pub mod judge;
pub mod logic;
pub mod model;
pub mod pacing;
pub mod prompts;
pub mod research;
pub mod semantic;
pub mod tokens;
pub mod verifier;

pub use aggregate::{ScoreWeights, aggregate};
pub use claims::{CachedClaimExtractor, ClaimExtractor, LlmClaimExtractor};
pub use formula::FormulaChecker;
pub use glossary::{Glossary, GlossaryEntry};
pub use judge::Judge;
pub use model::{
    CheckResult, EnrichmentEntry, ModuleReport, Section, VerificationReport, VerifyModule,
};
pub use pacing::CallPacer;
pub use prompts::JudgePrompts;
pub use tokens::{RuleTokenizer, Tokenizer};
pub use verifier::{SectionVerifier, VerifierOptions};

/// Longest prefix of `text` with at most `max_chars` characters
pub(crate) fn head(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

/// Integer reading of a loosely typed JSON value
///
/// Models answer `7`, `7.5` or `"7"` for the same question.
pub(crate) fn lenient_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>().ok().or_else(|| s.parse::<f64>().ok().map(|f| f as i64))
        }
        _ => None,
    }
}
