/*!
 * Formula integrity checking with mechanical repair.
 *
 * The checker compares math token sets of the original and the translation,
 * applies a fixed sequence of repairs to the translation, then scores the
 * share of original tokens that survive. Mid-range scores are reviewed by
 * the judge, which may report that some "missing" tokens are present in an
 * equivalent notation.
 */

use log::{debug, info};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::verification::{head, lenient_int};
use crate::verification::judge::Judge;
use crate::verification::model::CheckResult;
use crate::verification::prompts::JudgePrompts;
use crate::verification::tokens::{Tokenizer, math_spans};

static HTML_SUP: Lazy<Regex> = Lazy::new(|| Regex::new(r"<sup>(.*?)</sup>").unwrap());
static HTML_SUB: Lazy<Regex> = Lazy::new(|| Regex::new(r"<sub>(.*?)</sub>").unwrap());

/// Function names whose lost backslash is restored
const BACKSLASH_COMMANDS: &[&str] = &[
    "frac", "sum", "prod", "int", "lim", "sqrt", "log", "ln", "sin", "cos", "tan", "exp", "infty",
    "partial", "nabla",
];

/// Rule-based scores in this range get a judge review
const REVIEW_RANGE: std::ops::RangeInclusive<i64> = 50..=90;

/// Missing tokens shown to the judge
const REVIEW_SAMPLE: usize = 5;

/// Mechanical repairs, applied in declaration order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormulaRepair {
    /// `<sup>x</sup>` becomes `^{x}`
    HtmlSuperscript,
    /// `<sub>x</sub>` becomes `_{x}`
    HtmlSubscript,
    /// A missing `$..$` token whose body is present undelimited gets its delimiters back
    MathDelimiters,
    /// `frac{`, `sum (` etc. regain their backslash
    CommandBackslash,
}

impl FormulaRepair {
    pub const ORDER: [FormulaRepair; 4] = [
        FormulaRepair::HtmlSuperscript,
        FormulaRepair::HtmlSubscript,
        FormulaRepair::MathDelimiters,
        FormulaRepair::CommandBackslash,
    ];

    /// Apply this repair, returning the new text and one log line per fix
    fn apply(&self, text: String, missing: &BTreeSet<String>) -> (String, Vec<String>) {
        match self {
            FormulaRepair::HtmlSuperscript => convert_html_tag(text, &HTML_SUP, "^", "superscripts"),
            FormulaRepair::HtmlSubscript => convert_html_tag(text, &HTML_SUB, "_", "subscripts"),
            FormulaRepair::MathDelimiters => restore_delimiters(text, missing),
            FormulaRepair::CommandBackslash => restore_backslashes(text),
        }
    }
}

fn convert_html_tag(text: String, tag: &Regex, marker: &str, kind: &str) -> (String, Vec<String>) {
    let count = tag.find_iter(&text).count();
    if count == 0 {
        return (text, Vec::new());
    }
    let fixed = tag
        .replace_all(&text, |caps: &Captures| format!("{}{{{}}}", marker, &caps[1]))
        .into_owned();
    (fixed, vec![format!("Converted {} HTML {} to LaTeX", count, kind)])
}

fn restore_delimiters(mut text: String, missing: &BTreeSet<String>) -> (String, Vec<String>) {
    let mut fixes = Vec::new();
    for token in missing {
        let inner = if token.len() >= 4 && token.starts_with("$$") && token.ends_with("$$") {
            &token[2..token.len() - 2]
        } else if token.len() >= 2 && token.starts_with('$') && token.ends_with('$') {
            &token[1..token.len() - 1]
        } else {
            continue;
        };

        if inner.is_empty() || text.contains(token.as_str()) {
            continue;
        }
        // The body may also have lost its command backslashes
        let stripped = strip_command_backslashes(inner);
        let found = [inner, stripped.as_str()]
            .into_iter()
            .find_map(|body| bare_occurrence(&text, body).map(|start| start..start + body.len()));
        let Some(range) = found else {
            continue;
        };
        text.replace_range(range, token);
        fixes.push(format!("Restored math delimiters: {}", head(token, 40)));
    }
    (text, fixes)
}

/// Characters that make a neighbouring occurrence part of a larger expression or word
fn continues_expression(c: char) -> bool {
    c.is_ascii_alphanumeric() || "\\$^_{}+-*/=<>|".contains(c)
}

/// Start of the first occurrence of `body` outside every math region that
/// stands on its own
fn bare_occurrence(text: &str, body: &str) -> Option<usize> {
    let spans = math_spans(text);
    text.match_indices(body).map(|(start, _)| start).find(|&start| {
        let end = start + body.len();
        let in_region = spans.iter().any(|span| span.start < end && start < span.end);
        let joined_before = text[..start].chars().next_back().is_some_and(continues_expression);
        let joined_after = text[end..].chars().next().is_some_and(continues_expression);
        !in_region && !joined_before && !joined_after
    })
}

fn strip_command_backslashes(body: &str) -> String {
    BACKSLASH_COMMANDS
        .iter()
        .fold(body.to_string(), |acc, name| acc.replace(&format!("\\{}", name), name))
}

/// Prefix `\` to `name` where it stands alone and opens an argument
fn restore_command(text: &str, name: &str) -> Option<String> {
    let mut out = String::with_capacity(text.len() + 8);
    let mut last = 0;
    let mut changed = false;

    for (idx, _) in text.match_indices(name) {
        let standalone = text[..idx]
            .chars()
            .next_back()
            .is_none_or(|c| c != '\\' && !c.is_ascii_alphabetic());
        let opens_argument = text[idx + name.len()..]
            .chars()
            .next()
            .is_some_and(|c| c.is_whitespace() || c == '{' || c == '(');

        if standalone && opens_argument {
            out.push_str(&text[last..idx]);
            out.push('\\');
            last = idx;
            changed = true;
        }
    }

    changed.then(|| {
        out.push_str(&text[last..]);
        out
    })
}

fn restore_backslashes(mut text: String) -> (String, Vec<String>) {
    let mut fixes = Vec::new();
    for name in BACKSLASH_COMMANDS {
        if let Some(fixed) = restore_command(&text, name) {
            text = fixed;
            fixes.push(format!("Restored backslash for \\{}", name));
        }
    }
    (text, fixes)
}

/// Rule-based outcome before any judge review
#[derive(Debug, Clone, PartialEq)]
pub struct FormulaAnalysis {
    /// Translation after repairs
    pub repaired: String,
    /// One entry per applied fix
    pub auto_fixed: Vec<String>,
    /// Distinct tokens in the original
    pub original_count: usize,
    /// Original tokens absent from the repaired translation, sorted
    pub still_missing: Vec<String>,
}

impl FormulaAnalysis {
    /// `100 * (original - missing) / original`, truncating
    pub fn score_with_missing(&self, missing: usize) -> i64 {
        if self.original_count == 0 {
            return 100;
        }
        let preserved = self.original_count.saturating_sub(missing);
        (preserved * 100 / self.original_count) as i64
    }

    /// Score from the rule-based comparison alone
    pub fn rule_score(&self) -> i64 {
        self.score_with_missing(self.still_missing.len())
    }

    /// The score is ambiguous enough to ask the judge
    pub fn needs_review(&self) -> bool {
        !self.still_missing.is_empty() && REVIEW_RANGE.contains(&self.rule_score())
    }

    fn missing_issues(&self) -> Vec<String> {
        self.still_missing
            .iter()
            .map(|token| format!("Missing: {}", head(token, 60)))
            .collect()
    }

    /// Final result, optionally crediting `equivalent` tokens found by review
    pub fn into_result(self, equivalent: Option<usize>) -> (CheckResult, String) {
        let mut issues = self.missing_issues();
        let score = match equivalent {
            Some(n) => {
                issues.push(format!("LLM: {} formulas in equivalent form", n));
                self.score_with_missing(self.still_missing.len().saturating_sub(n))
            }
            None => self.rule_score(),
        };
        (CheckResult::new(score, issues, self.auto_fixed, Vec::new()), self.repaired)
    }
}

#[derive(Debug, Deserialize)]
struct FormulaReview {
    #[serde(default)]
    actually_preserved: Value,
}

/// Formula integrity checker
#[derive(Clone)]
pub struct FormulaChecker {
    tokenizer: Arc<dyn Tokenizer>,
}

impl std::fmt::Debug for FormulaChecker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormulaChecker").finish_non_exhaustive()
    }
}

impl FormulaChecker {
    pub fn new(tokenizer: Arc<dyn Tokenizer>) -> Self {
        Self { tokenizer }
    }

    /// Compare token sets and repair what can be repaired mechanically
    pub fn analyze(&self, original: &str, translated: &str) -> FormulaAnalysis {
        let original_tokens = self.tokenizer.tokens(original);
        if original_tokens.is_empty() {
            return FormulaAnalysis {
                repaired: translated.to_string(),
                auto_fixed: Vec::new(),
                original_count: 0,
                still_missing: Vec::new(),
            };
        }

        let translated_tokens = self.tokenizer.tokens(translated);
        let missing: BTreeSet<String> = original_tokens.difference(&translated_tokens).cloned().collect();

        let mut repaired = translated.to_string();
        let mut auto_fixed = Vec::new();
        for repair in FormulaRepair::ORDER {
            let (text, fixes) = repair.apply(repaired, &missing);
            if !fixes.is_empty() {
                debug!("{:?}: {}", repair, fixes.join("; "));
            }
            repaired = text;
            auto_fixed.extend(fixes);
        }

        let repaired_tokens = self.tokenizer.tokens(&repaired);
        let still_missing = original_tokens.difference(&repaired_tokens).cloned().collect();

        FormulaAnalysis {
            repaired,
            auto_fixed,
            original_count: original_tokens.len(),
            still_missing,
        }
    }

    /// Full check: rules, repairs and an optional judge review of ambiguous scores
    ///
    /// Returns the result and the (possibly repaired) translation.
    pub async fn check(
        &self,
        judge: Option<(&Judge, &JudgePrompts)>,
        original: &str,
        translated: &str,
    ) -> (CheckResult, String) {
        let analysis = self.analyze(original, translated);
        if !analysis.auto_fixed.is_empty() {
            info!("Formula repairs applied: {}", analysis.auto_fixed.len());
        }

        let equivalent = match judge {
            Some((judge, prompts)) if analysis.needs_review() => {
                let sample: Vec<String> = analysis.still_missing.iter().take(REVIEW_SAMPLE).cloned().collect();
                let prompt = prompts.formula_review(original, &analysis.repaired, &sample);
                match judge.ask::<FormulaReview>(&prompt, 512).await {
                    Ok(review) => lenient_int(&review.actually_preserved)
                        .filter(|n| *n > 0 && (*n as usize) <= analysis.still_missing.len())
                        .map(|n| n as usize),
                    Err(e) => {
                        debug!("Formula review unavailable: {}", e);
                        None
                    }
                }
            }
            _ => None,
        };

        analysis.into_result(equivalent)
    }
}
