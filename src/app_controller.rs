use anyhow::{Context, Result, anyhow};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, error, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::app_config::Config;
use crate::file_utils::FileManager;
use crate::knowledge::KnowledgeBase;
use crate::providers::Provider;
use crate::verification::{SectionVerifier, VerifierOptions};

// @module: Application controller for section verification

/// Sections scoring below this are listed after a run
pub const LOW_SCORE_THRESHOLD: u8 = 60;

/// What a run does to each section
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunMode {
    /// Run the verification modules
    pub verify: bool,
    /// Attach enrichment notes
    pub enrich: bool,
    /// Leave files untouched
    pub dry_run: bool,
}

impl RunMode {
    pub fn verify() -> Self {
        Self {
            verify: true,
            enrich: false,
            dry_run: false,
        }
    }

    pub fn enrich() -> Self {
        Self {
            verify: false,
            enrich: true,
            dry_run: false,
        }
    }
}

/// Outcome of a run over one or more section files
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    /// `(section_id, score)` of each verified section, in processing order
    pub scores: Vec<(String, u8)>,
    /// Sections without a translation
    pub skipped: usize,
    /// Sections that received at least one enrichment note
    pub enriched: usize,
    /// Files that could not be read or written
    pub failed: Vec<PathBuf>,
}

impl RunSummary {
    /// Mean verification score, if any section was verified
    pub fn average(&self) -> Option<f64> {
        if self.scores.is_empty() {
            return None;
        }
        let total: u32 = self.scores.iter().map(|(_, s)| u32::from(*s)).sum();
        Some(f64::from(total) / self.scores.len() as f64)
    }

    /// Sections scoring below `threshold`
    pub fn low_scores(&self, threshold: u8) -> Vec<&(String, u8)> {
        self.scores.iter().filter(|(_, s)| *s < threshold).collect()
    }
}

/// Main application controller for section verification
pub struct Controller {
    // @field: App configuration
    config: Config,
    provider: Arc<dyn Provider>,
    verifier: SectionVerifier,
}

impl Controller {
    // @method: Create a controller with the configured provider and knowledge base
    pub fn with_config(config: Config) -> Result<Self> {
        let provider = config.build_provider()?;
        let knowledge = config.build_knowledge_base();
        let options = VerifierOptions::from(&config);
        Ok(Self::with_components(config, provider, knowledge, options))
    }

    /// Create a controller around explicit collaborators
    pub fn with_components(
        config: Config,
        provider: Arc<dyn Provider>,
        knowledge: Arc<dyn KnowledgeBase>,
        options: VerifierOptions,
    ) -> Self {
        let verifier = SectionVerifier::new(Arc::clone(&provider), knowledge, config.glossary(), options);
        Self {
            config,
            provider,
            verifier,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Check that the provider answers and the judgment model is available
    pub async fn test_connection(&self) -> Result<()> {
        let model = &self.verifier.options().model;
        self.provider
            .test_connection(model)
            .await
            .with_context(|| format!("{} is not usable with model '{}'", self.provider.name(), model))
    }

    /// Process every section file at `path`
    pub async fn run(&self, path: &Path, mode: RunMode) -> Result<RunSummary> {
        let files = FileManager::section_files(path)?;
        if files.is_empty() {
            warn!("No section files found under {:?}", path);
            return Ok(RunSummary::default());
        }
        info!("Processing {} section file(s)", files.len());

        let progress_bar = ProgressBar::new(files.len() as u64);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(style.progress_chars("█▓▒░"));

        let mut summary = RunSummary::default();
        for file in &files {
            let name = file.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default();
            progress_bar.set_message(name);

            if let Err(e) = self.process_file(file, mode, &mut summary, &progress_bar).await {
                // A single named file is the whole run
                if files.len() == 1 {
                    progress_bar.finish_and_clear();
                    return Err(e);
                }
                error!("Failed to process {:?}: {:#}", file, e);
                summary.failed.push(file.clone());
            }
            progress_bar.inc(1);
        }
        progress_bar.finish_and_clear();

        self.report(&summary);
        Ok(summary)
    }

    async fn process_file(
        &self,
        file: &Path,
        mode: RunMode,
        summary: &mut RunSummary,
        progress_bar: &ProgressBar,
    ) -> Result<()> {
        let mut section = FileManager::read_section(file)?;
        let mut changed = false;

        if mode.verify {
            if section.content_translated.is_empty() {
                info!("Section {} has no translation, skipping", section.section_id);
                summary.skipped += 1;
            } else {
                let report = self.verifier.verify_section(&mut section).await;
                progress_bar.println(format!("  Section {}: {}", section.section_id, report.summary_line()));
                summary.scores.push((section.section_id.clone(), report.score));
                changed = true;
            }
        }

        if mode.enrich && !section.content_original.is_empty() {
            let entries = self.verifier.enrich_section(&section).await;
            if entries.is_empty() {
                debug!("Section {}: no enrichment needed", section.section_id);
            } else {
                progress_bar.println(format!("  Section {}: {} concepts researched", section.section_id, entries.len()));
                section.enrichments = Some(entries);
                summary.enriched += 1;
                changed = true;
            }
        }

        if changed && !mode.dry_run {
            FileManager::write_section(file, &section)?;
        }
        Ok(())
    }

    fn report(&self, summary: &RunSummary) {
        if let Some(average) = summary.average() {
            println!("Average verification score: {:.1}", average);
            let low = summary.low_scores(LOW_SCORE_THRESHOLD);
            if !low.is_empty() {
                println!("Low-score sections (<{}):", LOW_SCORE_THRESHOLD);
                for (id, score) in low {
                    println!("  {}: {}", id, score);
                }
            }
        }
        if summary.enriched > 0 {
            println!("Enriched sections: {}", summary.enriched);
        }
        if !summary.failed.is_empty() {
            println!("Failed files: {}", summary.failed.len());
        }
    }
}

/// Fail early when a run has nothing to do
pub fn ensure_mode(mode: RunMode) -> Result<()> {
    if !mode.verify && !mode.enrich {
        return Err(anyhow!("Nothing to do: neither verification nor enrichment requested"));
    }
    Ok(())
}
