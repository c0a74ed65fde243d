/*!
 * End-to-end verification of single sections with scripted collaborators
 */

use vertrans::knowledge::InMemoryKnowledgeBase;
use vertrans::providers::mock::MockProvider;
use vertrans::verification::VerifyModule;

use crate::common;
use crate::common::mock_providers::{favourable_judge, needles, taxicab_knowledge, verifier};

#[tokio::test]
async fn test_verifySection_withFaithfulTranslation_shouldScoreHigh() {
    common::init_test_logging();
    let mut section = common::taxicab_section();
    let report = verifier(favourable_judge(&[]), taxicab_knowledge())
        .verify_section(&mut section)
        .await;

    assert_eq!(report.formula.as_ref().map(|r| r.score), Some(100));
    assert_eq!(report.semantic.as_ref().map(|r| r.score), Some(90));
    assert_eq!(report.logic.as_ref().map(|r| r.score), Some(100));
    assert_eq!(report.research.as_ref().map(|r| r.score), Some(100));
    assert_eq!(report.score, 97);
    assert_eq!(report.summary_line(), "Score: 97 (F:100 S:90 L:100 R:100)");
    assert_eq!(section.verification.as_ref(), Some(&report));
}

#[tokio::test]
async fn test_verifySection_withStrippedDelimiters_shouldRepairBeforeLaterModules() {
    let provider = favourable_judge(&[]);
    let mut section = common::stripped_delimiter_section();
    let report = verifier(provider.clone(), taxicab_knowledge())
        .verify_section(&mut section)
        .await;

    let formula = report.formula.as_ref().unwrap();
    assert_eq!(formula.score, 100);
    assert_eq!(formula.auto_fixed, vec!["Restored math delimiters: $1729 = 1^3+12^3$".to_string()]);
    assert_eq!(section.content_translated, "숫자 $1729 = 1^3+12^3$ 는 유명하다.");
    assert!(provider.prompts_containing("숫자 $1729") >= 1);
}

#[tokio::test]
async fn test_verifySection_withCollapsedParagraphs_shouldPenalizeStructure() {
    let mut section = common::collapsed_paragraph_section();
    let report = verifier(favourable_judge(&[]), taxicab_knowledge())
        .verify_section(&mut section)
        .await;

    let semantic = report.semantic.as_ref().unwrap();
    assert_eq!(semantic.score, 80);
    assert!(semantic.issues.contains(&"Paragraph count mismatch: 4 orig vs 1 trans".to_string()));
}

#[tokio::test]
async fn test_verifySection_withKnowledgeBaseOffline_shouldScoreResearchEighty() {
    let mut section = common::taxicab_section();
    let report = verifier(favourable_judge(&[]), InMemoryKnowledgeBase::offline())
        .verify_section(&mut section)
        .await;

    let research = report.research.as_ref().unwrap();
    assert_eq!(research.score, 80);
    assert_eq!(research.issues, vec!["No claims could be verified externally".to_string()]);
    assert!(research.flagged.is_empty());
}

#[tokio::test]
async fn test_verifySection_withProviderDown_shouldFallBackToNeutralScores() {
    common::init_test_logging();
    let mut section = common::taxicab_section();
    let report = verifier(MockProvider::failing(), taxicab_knowledge())
        .verify_section(&mut section)
        .await;

    assert_eq!(report.formula.as_ref().map(|r| r.score), Some(100));
    assert_eq!(report.semantic.as_ref().map(|r| r.score), Some(70));
    assert_eq!(report.logic.as_ref().map(|r| r.score), Some(100));
    assert_eq!(report.research.as_ref().map(|r| r.score), Some(100));
    assert_eq!(report.score, 91);
}

#[tokio::test]
async fn test_verifySection_withContradictedClaims_shouldFlagThem() {
    let provider = favourable_judge(&[(needles::FACT_CHECK, r#"{"supported": false, "note": "contradicts"}"#)]);
    let mut section = common::taxicab_section();
    let report = verifier(provider, taxicab_knowledge()).verify_section(&mut section).await;

    let research = report.research.as_ref().unwrap();
    assert_eq!(research.score, 0);
    assert_eq!(research.flagged.len(), 2);
    assert!(research.flagged.iter().all(|f| f.starts_with("Unverified: ") && f.ends_with("→ contradicts")));
}

#[tokio::test]
async fn test_verifySection_withEveryModule_shouldKeepScoresInRange() {
    let provider = favourable_judge(&[
        (needles::PARAGRAPH, r#"{"score": -40}"#),
        (needles::LOGIC, r#"{"issues": ["a", "b", "c", "d", "e"]}"#),
        (needles::PRESERVATION, r#"{"preserved": false}"#),
    ]);
    let mut section = common::collapsed_paragraph_section();
    let report = verifier(provider, taxicab_knowledge()).verify_section(&mut section).await;

    for module in VerifyModule::ALL {
        let score = report.module(module).map(|r| r.score).unwrap();
        assert!(score <= 100, "{} out of range: {}", module, score);
    }
    assert_eq!(report.semantic.as_ref().map(|r| r.score), Some(0));
    assert_eq!(report.logic.as_ref().map(|r| r.score), Some(0));
}

#[tokio::test]
async fn test_enrichSection_withKnownConcepts_shouldBuildNotes() {
    let section = common::taxicab_section();
    let entries = verifier(favourable_judge(&[]), taxicab_knowledge())
        .enrich_section(&section)
        .await;

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].term, "Ramanujan");
    assert_eq!(entries[0].source, "Srinivasa Ramanujan");
    assert_eq!(entries[0].title_localized, "라마누잔 (Ramanujan)");
    assert_eq!(entries[1].source, "Taxicab number");
}
