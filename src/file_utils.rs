use anyhow::{Context, Result, anyhow};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::errors::AppError;
use crate::verification::model::Section;

// @module: File and directory utilities

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_file()
    }

    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_dir()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path)?;
        }
        Ok(())
    }

    /// Find files with a specific extension in a directory, sorted by path
    pub fn find_files<P: AsRef<Path>>(dir: P, extension: &str) -> Result<Vec<PathBuf>> {
        let extension = extension.trim_start_matches('.');
        let mut result = Vec::new();

        for entry in WalkDir::new(dir.as_ref()).follow_links(true) {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();

            if path.is_file()
                && path
                    .extension()
                    .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case(extension))
            {
                result.push(path.to_path_buf());
            }
        }

        result.sort();
        Ok(result)
    }

    /// Section files at `path`: the file itself, or every `.json` file below a directory
    pub fn section_files<P: AsRef<Path>>(path: P) -> Result<Vec<PathBuf>> {
        let path = path.as_ref();
        if Self::file_exists(path) {
            Ok(vec![path.to_path_buf()])
        } else if Self::dir_exists(path) {
            Self::find_files(path, "json")
        } else {
            Err(anyhow!(AppError::File(format!("Path does not exist: {:?}", path))))
        }
    }

    /// Read a file to a string
    pub fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
        fs::read_to_string(&path).with_context(|| format!("Failed to read file: {:?}", path.as_ref()))
    }

    /// Write a string to a file
    pub fn write_to_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        // Ensure the parent directory exists
        if let Some(parent) = path.as_ref().parent() {
            Self::ensure_dir(parent)?;
        }

        fs::write(&path, content).with_context(|| format!("Failed to write to file: {:?}", path.as_ref()))?;
        Ok(())
    }

    /// Load one section record
    pub fn read_section<P: AsRef<Path>>(path: P) -> Result<Section> {
        let content = Self::read_to_string(&path)?;
        serde_json::from_str(&content)
            .map_err(|e| AppError::Section(e.to_string()))
            .with_context(|| format!("Invalid section record: {:?}", path.as_ref()))
    }

    /// Save one section record as pretty-printed JSON
    pub fn write_section<P: AsRef<Path>>(path: P, section: &Section) -> Result<()> {
        let mut content = serde_json::to_string_pretty(section).context("Failed to serialize section")?;
        content.push('\n');
        Self::write_to_file(path, &content)
    }
}
