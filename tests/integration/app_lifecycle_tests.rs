/*!
 * Integration tests for application lifecycle
 */

use anyhow::Result;
use std::fs;
use std::sync::Arc;

use vertrans::app_config::Config;
use vertrans::app_controller::{Controller, RunMode};
use vertrans::file_utils::FileManager;
use vertrans::knowledge::InMemoryKnowledgeBase;
use vertrans::providers::mock::MockProvider;
use vertrans::verification::Section;

use crate::common;
use crate::common::mock_providers::{favourable_judge, taxicab_knowledge, test_options};

fn controller(provider: MockProvider, knowledge: InMemoryKnowledgeBase) -> Controller {
    let config = Config {
        glossary: Some(Vec::new()),
        ..Config::default()
    };
    Controller::with_components(config, Arc::new(provider), Arc::new(knowledge), test_options())
}

#[tokio::test]
async fn test_run_withDirectory_shouldVerifyAndWriteBack() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let first = common::create_section_file(temp_dir.path(), "ch1/a.json", &common::taxicab_section())?;
    let second = common::create_section_file(temp_dir.path(), "ch1/b.json", &common::collapsed_paragraph_section())?;
    common::create_section_file(temp_dir.path(), "ch2/untranslated.json", &Section::new("u", "t", "Original only.", ""))?;

    let summary = controller(favourable_judge(&[]), taxicab_knowledge())
        .run(temp_dir.path(), RunMode::verify())
        .await?;

    assert_eq!(summary.scores.len(), 2);
    assert_eq!(summary.skipped, 1);
    assert!(summary.failed.is_empty());

    let verified = FileManager::read_section(&first)?;
    assert_eq!(verified.verification.as_ref().map(|r| r.score), Some(97));
    let collapsed = FileManager::read_section(&second)?;
    assert!(collapsed.verification.is_some());
    Ok(())
}

#[tokio::test]
async fn test_run_withDryRun_shouldLeaveFilesUntouched() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_section_file(temp_dir.path(), "s.json", &common::stripped_delimiter_section())?;
    let before = fs::read_to_string(&path)?;

    let mode = RunMode {
        dry_run: true,
        ..RunMode::verify()
    };
    let summary = controller(favourable_judge(&[]), taxicab_knowledge()).run(&path, mode).await?;

    assert_eq!(summary.scores.len(), 1);
    assert_eq!(fs::read_to_string(&path)?, before);
    Ok(())
}

#[tokio::test]
async fn test_run_withUnknownFields_shouldPreserveThemOnWrite() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let mut section = common::taxicab_section();
    section.extra.insert("page_start".to_string(), serde_json::json!(42));
    let path = common::create_section_file(temp_dir.path(), "s.json", &section)?;

    controller(favourable_judge(&[]), taxicab_knowledge())
        .run(&path, RunMode::verify())
        .await?;

    let raw: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path)?)?;
    assert_eq!(raw["page_start"], 42);
    assert_eq!(raw["verification"]["score"], 97);
    assert_eq!(raw["verification"]["formula"]["score"], 100);
    Ok(())
}

#[tokio::test]
async fn test_run_withEnrichMode_shouldAttachNotes() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_section_file(temp_dir.path(), "s.json", &common::taxicab_section())?;

    let summary = controller(favourable_judge(&[]), taxicab_knowledge())
        .run(&path, RunMode::enrich())
        .await?;

    assert_eq!(summary.enriched, 1);
    let section = FileManager::read_section(&path)?;
    assert!(section.verification.is_none());
    assert_eq!(section.enrichments.map(|e| e.len()), Some(2));
    Ok(())
}

#[tokio::test]
async fn test_run_withInvalidFileInDirectory_shouldContinue() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    common::create_section_file(temp_dir.path(), "good.json", &common::taxicab_section())?;
    let bad = common::create_test_file(temp_dir.path(), "bad.json", "{ not json")?;

    let summary = controller(favourable_judge(&[]), taxicab_knowledge())
        .run(temp_dir.path(), RunMode::verify())
        .await?;

    assert_eq!(summary.scores.len(), 1);
    assert_eq!(summary.failed, vec![bad]);
    Ok(())
}

#[tokio::test]
async fn test_run_withInvalidSingleFile_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let bad = common::create_test_file(temp_dir.path(), "bad.json", "42")?;

    let result = controller(favourable_judge(&[]), taxicab_knowledge())
        .run(&bad, RunMode::verify())
        .await;
    assert!(result.is_err());
    Ok(())
}

#[test]
fn test_testConnection_withFailingProvider_shouldFail() {
    let controller = controller(MockProvider::failing(), InMemoryKnowledgeBase::new());
    let result = tokio_test::block_on(async { controller.test_connection().await });
    assert!(result.is_err());
}

#[test]
fn test_withConfig_forAnthropicWithoutKey_shouldFail() {
    let mut config = Config::default();
    config.verification.provider = vertrans::app_config::VerificationProvider::Anthropic;
    assert!(Controller::with_config(config).is_err());
}
