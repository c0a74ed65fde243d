/*!
 * Tests for the verification building blocks through the public API
 */

use std::sync::Arc;

use vertrans::app_config::Config;
use vertrans::knowledge::InMemoryKnowledgeBase;
use vertrans::providers::mock::MockProvider;
use vertrans::verification::semantic::SemanticChecker;
use vertrans::verification::{
    FormulaChecker, Glossary, GlossaryEntry, Judge, JudgePrompts, RuleTokenizer, Section, SectionVerifier,
    VerifyModule,
};

use crate::common;
use crate::common::mock_providers::{favourable_judge, needles, taxicab_knowledge, test_options};

fn formula_checker() -> FormulaChecker {
    FormulaChecker::new(Arc::new(RuleTokenizer::new()))
}

#[test]
fn test_analyze_onRepairedOutput_shouldApplyNoFurtherFixes() {
    let original = "Let $f(x) = \\frac{1}{x}$ and $x^{2}$ with $\\sum_{i} a_{i}$.";
    let translated = "f(x) = frac{1}{x} 이고 x<sup>2</sup> 이며 sum_{i} a<sub>i</sub> 이다.";

    let first = formula_checker().analyze(original, translated);
    assert!(!first.auto_fixed.is_empty());

    let second = formula_checker().analyze(original, &first.repaired);
    assert!(second.auto_fixed.is_empty());
    assert_eq!(second.repaired, first.repaired);
    assert_eq!(second.still_missing, first.still_missing);
}

#[test]
fn test_analyze_withoutMathInOriginal_shouldScorePerfect() {
    let analysis = formula_checker().analyze("No formulas here.", "여기에는 수식이 없다.");
    assert_eq!(analysis.original_count, 0);
    assert_eq!(analysis.rule_score(), 100);
}

#[tokio::test]
async fn test_formulaCheck_withTaxicabSection_shouldPreserveEveryToken() {
    let section = common::taxicab_section();
    let (result, repaired) = formula_checker()
        .check(None, &section.content_original, &section.content_translated)
        .await;

    assert_eq!(result.score(), 100);
    assert!(result.issues().is_empty());
    assert_eq!(repaired, section.content_translated);
}

#[tokio::test]
async fn test_semanticCheck_withMissingGlossaryTerm_shouldDeductThreePoints() {
    let glossary = Glossary::from_entries(vec![GlossaryEntry::new("eigenvalue", "고유값")]);
    let checker = SemanticChecker::new(
        Judge::new(Arc::new(favourable_judge(&[])), "test-model"),
        JudgePrompts::new("en", "ko"),
        Arc::new(glossary),
    );

    let result = checker
        .check("Every eigenvalue is real.", "모든 값은 실수이다.", "Eigenvalues")
        .await;
    assert_eq!(result.score(), 87);
    assert_eq!(
        result.issues(),
        &["Glossary: 'eigenvalue' (고유값) not found in translation".to_string()]
    );
}

#[tokio::test]
async fn test_semanticCheck_withJapaneseTargetAndDefaultGlossary_shouldNotPenalize() {
    let config = Config {
        target_language: "ja".to_string(),
        ..Config::default()
    };
    let checker = SemanticChecker::new(
        Judge::new(Arc::new(favourable_judge(&[])), "test-model"),
        JudgePrompts::new("en", "ja"),
        Arc::new(config.glossary()),
    );

    let result = checker
        .check(
            "Every polynomial sequence satisfies the theorem.",
            "すべての多項式の数列はその定理を満たす。",
            "Polynomials",
        )
        .await;
    assert_eq!(result.score(), 90);
    assert!(result.issues().is_empty());
}

#[tokio::test]
async fn test_verifySection_withFormulaOnly_shouldSkipJudgedModules() {
    let provider = favourable_judge(&[]);
    let options = test_options().with_modules(vec![VerifyModule::Formula]);
    let verifier = SectionVerifier::new(
        Arc::new(provider.clone()),
        Arc::new(taxicab_knowledge()),
        Glossary::default(),
        options,
    );

    let mut section = common::stripped_delimiter_section();
    let report = verifier.verify_section(&mut section).await;

    assert_eq!(report.score, 100);
    assert!(report.semantic.as_ref().is_some_and(|r| r.skipped));
    assert_eq!(report.summary_line(), "Score: 100 (F:100 S:- L:- R:-)");
    assert_eq!(provider.request_count(), 0);
}

#[tokio::test]
async fn test_verifySection_withEmptyTranslation_shouldMarkSkipped() {
    let verifier = SectionVerifier::new(
        Arc::new(MockProvider::failing()),
        Arc::new(InMemoryKnowledgeBase::offline()),
        Glossary::default(),
        test_options(),
    );

    let mut section = Section::new("empty", "t", "Original.", "");
    let report = verifier.verify_section(&mut section).await;
    assert!(report.skipped);
    assert_eq!(report.score, 100);
    assert!(report.formula.is_none());
}

#[tokio::test]
async fn test_verifySection_withSharedClaims_shouldExtractOnce() {
    let provider = favourable_judge(&[]);
    let verifier = SectionVerifier::new(
        Arc::new(provider.clone()),
        Arc::new(taxicab_knowledge()),
        Glossary::default(),
        test_options(),
    );

    let mut section = common::taxicab_section();
    verifier.verify_section(&mut section).await;
    assert_eq!(provider.prompts_containing(needles::CLAIMS), 1);
}
