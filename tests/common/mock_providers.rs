/*!
 * Scripted collaborators for end-to-end tests
 *
 * The judge script answers every prompt kind the verifier sends with a
 * favourable judgment, so individual tests only override what they exercise.
 */

use std::sync::Arc;

use vertrans::app_config::Config;
use vertrans::knowledge::InMemoryKnowledgeBase;
use vertrans::providers::mock::MockProvider;
use vertrans::verification::{Glossary, SectionVerifier, VerifierOptions};

pub const CLAIMS: &str = "1. 1729 is the smallest number expressible as a sum of two cubes in two ways.\n\
    2. Ramanujan noted this when Hardy visited him.";

pub const EXPLANATION: &str = "라마누잔은 인도의 수학자로, 정수론과 무한급수에 큰 업적을 남겼다. \
    이 절의 1729 일화는 그의 수에 대한 직관을 보여준다.";

/// Needles identifying each prompt kind
pub mod needles {
    pub const FORMULA: &str = "formula verification expert";
    pub const PARAGRAPH: &str = "Rate semantic preservation";
    pub const CLAIMS: &str = "Extract verifiable factual claims";
    pub const PRESERVATION: &str = "Is this factual claim preserved";
    pub const LOGIC: &str = "internal logic issues";
    pub const FACT_CHECK: &str = "support or contradict the claim";
    pub const CONCEPTS: &str = "educational enrichment";
    pub const EXPLANATION: &str = "educational note";
    pub const TITLE: &str = "Translate this mathematical concept";
}

/// Provider answering every prompt kind favourably, after any `overrides`
pub fn favourable_judge(overrides: &[(&str, &str)]) -> MockProvider {
    let mut provider = MockProvider::scripted();
    for (needle, answer) in overrides {
        provider = provider.on(*needle, *answer);
    }
    provider
        .on(needles::FORMULA, r#"{"actually_preserved": 0, "genuinely_missing": 1}"#)
        .on(needles::PARAGRAPH, r#"{"score": 9, "reason": "faithful"}"#)
        .on(needles::CLAIMS, CLAIMS)
        .on(needles::PRESERVATION, r#"{"preserved": true, "reason": "present"}"#)
        .on(needles::LOGIC, r#"{"issues": []}"#)
        .on(needles::FACT_CHECK, r#"{"supported": true, "note": "consistent"}"#)
        .on(needles::CONCEPTS, "1. Ramanujan\n2. Taxicab number")
        .on(needles::EXPLANATION, EXPLANATION)
        .on(needles::TITLE, "라마누잔 (Ramanujan)")
}

/// Knowledge base holding the articles the taxicab section refers to
pub fn taxicab_knowledge() -> InMemoryKnowledgeBase {
    InMemoryKnowledgeBase::new()
        .with_article(
            "Srinivasa Ramanujan",
            "Srinivasa Ramanujan was an Indian mathematician who made substantial contributions \
             to number theory, infinite series and continued fractions.",
        )
        .with_article(
            "Taxicab number",
            "The nth taxicab number is the smallest integer that can be expressed as a sum of two \
             positive integer cubes in n distinct ways. The best known is 1729.",
        )
}

/// Options for tests: default configuration without pauses
pub fn test_options() -> VerifierOptions {
    VerifierOptions::from(&Config::default()).unpaced()
}

/// Verifier over the given collaborators with an empty glossary
pub fn verifier(provider: MockProvider, knowledge: InMemoryKnowledgeBase) -> SectionVerifier {
    SectionVerifier::new(Arc::new(provider), Arc::new(knowledge), Glossary::default(), test_options())
}
