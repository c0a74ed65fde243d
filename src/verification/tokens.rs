/*!
 * Math and markup token extraction.
 *
 * Three token classes are collected into one set:
 * - whole math regions (`$..$`, `$$..$$`, `\(..\)`, `\[..\]`)
 * - commands from a fixed vocabulary (`\frac{a}{b}`, `\sum`, `\alpha`, ...)
 * - single-letter variables with optional `_`/`^` modifiers, searched only
 *   inside math regions
 *
 * Comparison between texts is by set difference, so duplicates collapse.
 */

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;
use std::ops::Range;

/// Math region patterns, in extraction order
static MATH_REGIONS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?s)\$[^$]+?\$",
        r"(?s)\$\$[^$]+?\$\$",
        r"(?s)\\\([^)]+?\\\)",
        r"(?s)\\\[[^\]]+?\\\]",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

/// Command vocabulary; each pattern is matched independently
static COMMANDS: Lazy<Vec<Regex>> = Lazy::new(|| {
    let mut patterns: Vec<String> = vec![
        r"\\frac\{[^}]*\}\{[^}]*\}".to_string(),
        r"\\mathbb\{[A-Z]\}".to_string(),
        r"\\mathcal\{[A-Z]\}".to_string(),
        r"\\mathfrak\{[a-z]\}".to_string(),
        r"\\text\{[^}]*\}".to_string(),
        r"\\mathrm\{[^}]*\}".to_string(),
        r"\\operatorname\{[^}]*\}".to_string(),
    ];
    const BARE: &[&str] = &[
        "sum", "prod", "int", "lim", "inf", "sup", "sqrt", "log", "ln", "exp", "sin", "cos", "tan",
        "alpha", "beta", "gamma", "delta", "epsilon", "zeta", "eta", "theta", "lambda", "mu", "nu",
        "pi", "rho", "sigma", "tau", "phi", "chi", "psi", "omega", "Gamma", "Delta", "Theta",
        "Lambda", "Sigma", "Phi", "Psi", "Omega", "subset", "supset", "subseteq", "supseteq", "in",
        "notin", "cup", "cap", "times", "otimes", "oplus", "to", "rightarrow", "leftarrow",
        "mapsto", "infty", "partial", "nabla", "forall", "exists", "leq", "geq", "neq", "approx",
        "equiv",
    ];
    patterns.extend(BARE.iter().map(|name| format!(r"\\{}", name)));
    patterns.iter().map(|p| Regex::new(p).unwrap()).collect()
});

/// Variable body, anchored; the preceding-character rule is checked by hand
static VARIABLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z](?:_\{?[^}\s]*\}?)?(?:\^\{?[^}\s]*\}?)?").unwrap());

/// Extracts the comparable token set of a text
pub trait Tokenizer: Send + Sync {
    fn tokens(&self, text: &str) -> BTreeSet<String>;
}

/// Regex-driven tokenizer covering LaTeX-style notation
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleTokenizer;

impl RuleTokenizer {
    pub fn new() -> Self {
        Self
    }
}

impl Tokenizer for RuleTokenizer {
    fn tokens(&self, text: &str) -> BTreeSet<String> {
        let regions = math_regions(text);
        let mut tokens: BTreeSet<String> = regions.iter().map(|r| r.to_string()).collect();

        for command in COMMANDS.iter() {
            tokens.extend(command.find_iter(text).map(|m| m.as_str().to_string()));
        }

        for region in &regions {
            tokens.extend(variables(region).into_iter().map(str::to_string));
        }

        tokens
    }
}

/// All math regions of `text`, pattern by pattern (overlaps allowed)
pub fn math_regions(text: &str) -> Vec<&str> {
    math_spans(text).into_iter().map(|span| &text[span]).collect()
}

/// Byte ranges of the math regions of `text`, in the order of `math_regions`
pub fn math_spans(text: &str) -> Vec<Range<usize>> {
    MATH_REGIONS
        .iter()
        .flat_map(|pattern| pattern.find_iter(text).map(|m| m.range()))
        .collect()
}

/// Variables in a math region: a letter not preceded by a letter or backslash
fn variables(region: &str) -> Vec<&str> {
    let bytes = region.as_bytes();
    let mut found = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        let starts_variable = bytes[pos].is_ascii_alphabetic()
            && (pos == 0 || !(bytes[pos - 1].is_ascii_alphabetic() || bytes[pos - 1] == b'\\'));

        if starts_variable {
            if let Some(m) = VARIABLE.find(&region[pos..]) {
                found.push(&region[pos..pos + m.end()]);
                pos += m.end().max(1);
                continue;
            }
        }
        pos += 1;
    }
    found
}
