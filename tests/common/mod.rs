/*!
 * Common test utilities for the vertrans test suite
 */

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use vertrans::file_utils::FileManager;
use vertrans::verification::Section;

// Re-export the scripted provider builders
pub mod mock_providers;

/// Routes `log` output through the test harness; safe to call repeatedly
pub fn init_test_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Writes `section` as a JSON record under `dir`
pub fn create_section_file(dir: &Path, filename: &str, section: &Section) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    FileManager::write_section(&file_path, section)?;
    Ok(file_path)
}

/// The taxicab-number section with a faithful Korean translation
pub fn taxicab_section() -> Section {
    Section::new(
        "test",
        "Weakening Hypotheses and Strengthening Conclusions",
        "The number 1729 is famous for being expressible as the sum of two cubes \
         in two different ways: $1729 = 1^3 + 12^3 = 9^3 + 10^3$. \
         This was noted by Ramanujan when Hardy visited him.",
        "숫자 1729는 두 가지 다른 방식으로 세제곱의 합으로 나타낼 수 있다는 점에서 유명합니다: \
         $1729 = 1^3 + 12^3 = 9^3 + 10^3$. \
         이것은 하디가 라마누잔을 방문했을 때 라마누잔이 언급한 것입니다.",
    )
}

/// The taxicab-number section with the math delimiters stripped from the translation
pub fn stripped_delimiter_section() -> Section {
    Section::new(
        "stripped",
        "Taxicab",
        "The number $1729 = 1^3+12^3$ is famous.",
        "숫자 1729 = 1^3+12^3 는 유명하다.",
    )
}

/// A section with four original paragraphs rendered as one
pub fn collapsed_paragraph_section() -> Section {
    Section::new(
        "collapsed",
        "Paragraphs",
        "First paragraph.\n\nSecond paragraph.\n\nThird paragraph.\n\nFourth paragraph.",
        "네 문단이 하나로 합쳐진 번역.",
    )
}
