/*!
 * Tests for section file operations
 */

use anyhow::Result;

use vertrans::file_utils::FileManager;
use vertrans::verification::Section;

use crate::common;

#[test]
fn test_sectionFiles_withSingleFile_shouldReturnIt() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_section_file(temp_dir.path(), "one.json", &common::taxicab_section())?;
    assert_eq!(FileManager::section_files(&path)?, vec![path]);
    Ok(())
}

#[test]
fn test_sectionFiles_withDirectory_shouldOnlyListJson() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    common::create_section_file(temp_dir.path(), "b/two.json", &common::taxicab_section())?;
    common::create_section_file(temp_dir.path(), "a/one.json", &common::taxicab_section())?;
    common::create_test_file(temp_dir.path(), "a/readme.md", "# notes")?;

    let files = FileManager::section_files(temp_dir.path())?;
    assert_eq!(files, vec![temp_dir.path().join("a/one.json"), temp_dir.path().join("b/two.json")]);
    Ok(())
}

#[test]
fn test_readSection_withLegacyEnrichmentTitle_shouldAcceptAlias() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(
        temp_dir.path(),
        "legacy.json",
        r#"{"section_id": "1", "content_original": "x", "content_translated": "y",
            "enrichments": [{"term": "Euler", "title_ko": "오일러 (Euler)", "explanation": "e", "source": "Leonhard Euler"}]}"#,
    )?;

    let section: Section = FileManager::read_section(&path)?;
    let entries = section.enrichments.unwrap_or_default();
    assert_eq!(entries[0].title_localized, "오일러 (Euler)");
    Ok(())
}
