/*!
 * Prompt templates for verification judgments.
 *
 * Templates carry `{placeholder}` markers filled by `render`. Every
 * structured judgment ends with the exact JSON shape the caller decodes.
 */

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::language_utils::display_language;
use crate::verification::head;

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{([a-z_]+)\}").unwrap());

/// Prompt template with `{name}` placeholders
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    template: &'static str,
}

impl PromptTemplate {
    pub const FORMULA_REVIEW: &'static str = r#"You are a mathematical formula verification expert.
Compare the original {source_language} math text with its {target_language} translation.
Some formulas appear to be missing from the translation. Check if they are:
1. Actually present but in a different equivalent notation
2. Genuinely missing

Missing formulas:
{missing}

Original (first 1500 chars):
{original}

Translation (first 1500 chars):
{translated}

Respond in JSON only:
{"actually_preserved": <number of formulas that ARE present in equivalent form>, "genuinely_missing": <number truly missing>, "notes": "<brief explanation>"}"#;

    pub const PARAGRAPH_RATING: &'static str = r#"Compare this {source_language} paragraph with its {target_language} translation.
Rate semantic preservation on a scale of 1-10:
- 10: Perfect meaning preservation
- 7-9: Minor omissions/additions but core meaning intact
- 4-6: Some meaning lost or distorted
- 1-3: Severely distorted or mostly wrong

Section: {title}

{source_language}:
{original}

{target_language} translation:
{translated}

Respond in JSON only:
{"score": <1-10>, "reason": "<brief reason in English, max 20 words>"}"#;

    pub const CLAIM_EXTRACTION: &'static str = r#"Extract verifiable factual claims from this math text.
Focus on: theorem attributions, dates, numerical values, definitions, named results.

Title: {title}
Text (first 2000 chars):
{text}

List up to 6 claims, one per line. Each claim should be a single clear statement.
Output ONLY the claims, one per line:"#;

    pub const CLAIM_PRESERVATION: &'static str = r#"Is this factual claim preserved in the {target_language} translation below?

Claim: {claim}

{target_language} translation (first 2000 chars):
{translated}

Respond in JSON:
{"preserved": true/false, "reason": "<brief reason>"}"#;

    pub const INTERNAL_LOGIC: &'static str = r#"Analyze this {target_language} math translation for internal logic issues.
Look for: contradictions, variable inconsistencies, broken definitions.

Text (first 2000 chars):
{translated}

If no issues found, respond: {"issues": []}
If issues found, respond: {"issues": ["issue1", "issue2"]}
Respond in JSON only:"#;

    pub const FACT_CHECK: &'static str = r#"Does this reference extract support or contradict the claim?

Claim: {claim}

Reference article: {article}
Extract: {extract}

Respond in JSON:
{"supported": true/false, "note": "<brief explanation>"}"#;

    pub const CONCEPT_EXTRACTION: &'static str = r#"You are analyzing a mathematics textbook section for educational enrichment.
Extract key concepts that a first-time reader would need explained.

Focus on:
1. Mathematical concepts/objects (e.g., "Leech Lattice", "Monster group", "modular form")
2. Mathematicians mentioned (e.g., "Ramanujan", "Euler", "Gauss")
3. Named theorems/results (e.g., "Fermat's Last Theorem", "Euler's formula")
4. Technical terms that aren't self-explanatory (e.g., "homeomorphism", "compact manifold")

Do NOT include:
- Basic terms (number, function, set, proof)
- Terms that are self-explanatory from context

Section title: {title}
Text (first 2500 chars):
{text}

List the most important 4-8 concepts, one per line.
Output ONLY the concept names, nothing else:"#;

    pub const CONCEPT_EXPLANATION: &'static str = r#"You are creating an educational note for a {target_language} reader studying mathematics.
Write a clear, accessible explanation of "{concept}" based on the reference information below.

Reference article: {article}
Reference extract:
{extract}

Section context (where this concept appears):
{context}

Write in {target_language}. Your explanation should include:
1. What the concept is (1-2 sentences, in plain words)
2. Why it matters or where it is used (1 sentence)
3. How it relates to this section (1 sentence)

Rules:
- Write only in {target_language}
- Keep mathematical notation in LaTeX ($...$)
- 3-5 sentences in total, concise
- Include an analogy or intuitive explanation
- Output only the explanation (no title, no numbering)

Explanation:"#;

    pub const CONCEPT_TITLE: &'static str = r#"Translate this mathematical concept name to {target_language} (with original in parentheses).
Format: "{target_language} Name (Original Name)"
If it's a person's name, use {target_language} transliteration.

Concept: {concept}

{target_language} title (one line only):"#;

    /// Wrap a template
    pub const fn new(template: &'static str) -> Self {
        Self { template }
    }

    /// Fill every `{name}` marker from `values` in one pass
    ///
    /// Substituted text is never rescanned; unknown markers stay as written.
    pub fn render(&self, values: &[(&str, &str)]) -> String {
        PLACEHOLDER
            .replace_all(self.template, |caps: &Captures| {
                let name = &caps[1];
                values
                    .iter()
                    .find(|(key, _)| *key == name)
                    .map(|(_, value)| value.to_string())
                    .unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned()
    }
}

/// Prompt builder bound to a language pair
#[derive(Debug, Clone)]
pub struct JudgePrompts {
    source_language: String,
    target_language: String,
}

impl JudgePrompts {
    /// Builder for ISO codes `source` and `target`
    pub fn new(source: &str, target: &str) -> Self {
        Self {
            source_language: display_language(source),
            target_language: display_language(target),
        }
    }

    pub fn target_language(&self) -> &str {
        &self.target_language
    }

    fn render(&self, template: &'static str, values: &[(&str, &str)]) -> String {
        let mut all = vec![
            ("source_language", self.source_language.as_str()),
            ("target_language", self.target_language.as_str()),
        ];
        all.extend_from_slice(values);
        PromptTemplate::new(template).render(&all)
    }

    pub fn formula_review(&self, original: &str, translated: &str, missing: &[String]) -> String {
        let missing = missing
            .iter()
            .map(|token| format!("  - {}", token))
            .collect::<Vec<_>>()
            .join("\n");
        self.render(
            PromptTemplate::FORMULA_REVIEW,
            &[
                ("missing", missing.as_str()),
                ("original", head(original, 1500)),
                ("translated", head(translated, 1500)),
            ],
        )
    }

    pub fn paragraph_rating(&self, title: &str, original: &str, translated: &str) -> String {
        self.render(
            PromptTemplate::PARAGRAPH_RATING,
            &[("title", title), ("original", original), ("translated", translated)],
        )
    }

    pub fn claim_extraction(&self, title: &str, text: &str) -> String {
        self.render(
            PromptTemplate::CLAIM_EXTRACTION,
            &[("title", title), ("text", head(text, 2000))],
        )
    }

    pub fn claim_preservation(&self, claim: &str, translated: &str) -> String {
        self.render(
            PromptTemplate::CLAIM_PRESERVATION,
            &[("claim", claim), ("translated", head(translated, 2000))],
        )
    }

    pub fn internal_logic(&self, translated: &str) -> String {
        self.render(PromptTemplate::INTERNAL_LOGIC, &[("translated", head(translated, 2000))])
    }

    pub fn fact_check(&self, claim: &str, article: &str, extract: &str) -> String {
        self.render(
            PromptTemplate::FACT_CHECK,
            &[("claim", claim), ("article", article), ("extract", head(extract, 1000))],
        )
    }

    pub fn concept_extraction(&self, title: &str, text: &str) -> String {
        self.render(
            PromptTemplate::CONCEPT_EXTRACTION,
            &[("title", title), ("text", head(text, 2500))],
        )
    }

    pub fn concept_explanation(&self, concept: &str, article: &str, extract: &str, context: &str) -> String {
        self.render(
            PromptTemplate::CONCEPT_EXPLANATION,
            &[
                ("concept", concept),
                ("article", article),
                ("extract", head(extract, 1500)),
                ("context", head(context, 500)),
            ],
        )
    }

    pub fn concept_title(&self, concept: &str) -> String {
        self.render(PromptTemplate::CONCEPT_TITLE, &[("concept", concept)])
    }
}
