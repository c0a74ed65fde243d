/*!
 * Per-section verification driver.
 *
 * `SectionVerifier` owns one instance of every checker and runs the enabled
 * modules in order: formula, semantic, logic, research. The formula module
 * may repair the translation; later modules see the repaired text and the
 * repair is written back to the section. Verification of a section never
 * fails: every external failure has already been mapped to a neutral
 * result by the module that hit it.
 */

use log::{debug, info};
use std::sync::Arc;
use std::time::Duration;

use crate::app_config::Config;
use crate::knowledge::KnowledgeBase;
use crate::providers::Provider;
use crate::verification::aggregate::{ScoreWeights, aggregate};
use crate::verification::claims::{CachedClaimExtractor, ClaimExtractor, LlmClaimExtractor};
use crate::verification::enrichment::ConceptResearcher;
use crate::verification::formula::FormulaChecker;
use crate::verification::glossary::Glossary;
use crate::verification::judge::Judge;
use crate::verification::logic::LogicChecker;
use crate::verification::model::{EnrichmentEntry, ModuleReport, Section, VerificationReport, VerifyModule};
use crate::verification::pacing::CallPacer;
use crate::verification::prompts::JudgePrompts;
use crate::verification::research::ResearchChecker;
use crate::verification::semantic::SemanticChecker;
use crate::verification::tokens::{RuleTokenizer, Tokenizer};

/// Settings for a verification run
#[derive(Debug, Clone)]
pub struct VerifierOptions {
    pub source_language: String,
    pub target_language: String,
    /// Model for formula, semantic, claim and logic judgments
    pub model: String,
    /// Model for corroboration and enrichment judgments
    pub research_model: String,
    pub modules: Vec<VerifyModule>,
    pub weights: ScoreWeights,
    pub temperature: f32,
    pub call_timeout: Duration,
    pub research_interval: Duration,
    pub module_interval: Duration,
    pub min_enrich_chars: usize,
    pub domain_suffix: String,
}

impl From<&Config> for VerifierOptions {
    fn from(config: &Config) -> Self {
        let verification = &config.verification;
        Self {
            source_language: config.source_language.clone(),
            target_language: config.target_language.clone(),
            model: verification.get_model(),
            research_model: verification.get_research_model(),
            modules: verification.modules.clone(),
            weights: verification.weights,
            temperature: verification.temperature,
            call_timeout: Duration::from_secs(verification.call_timeout_secs),
            research_interval: Duration::from_millis(verification.research_interval_ms),
            module_interval: Duration::from_millis(verification.module_interval_ms),
            min_enrich_chars: verification.min_enrich_chars,
            domain_suffix: verification.domain_suffix.clone(),
        }
    }
}

impl Default for VerifierOptions {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl VerifierOptions {
    /// Options without pauses between calls
    pub fn unpaced(mut self) -> Self {
        self.research_interval = Duration::ZERO;
        self.module_interval = Duration::ZERO;
        self
    }

    /// Restrict the run to `modules`
    pub fn with_modules(mut self, modules: Vec<VerifyModule>) -> Self {
        self.modules = modules;
        self
    }

    pub fn is_enabled(&self, module: VerifyModule) -> bool {
        self.modules.contains(&module)
    }
}

/// Verifies and enriches sections
pub struct SectionVerifier {
    options: VerifierOptions,
    judge: Judge,
    prompts: JudgePrompts,
    claims: Arc<CachedClaimExtractor>,
    formula: FormulaChecker,
    semantic: SemanticChecker,
    logic: LogicChecker,
    research: ResearchChecker,
    enrichment: ConceptResearcher,
}

impl std::fmt::Debug for SectionVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SectionVerifier").field("options", &self.options).finish()
    }
}

impl SectionVerifier {
    /// Verifier with the rule-based tokenizer
    pub fn new(
        provider: Arc<dyn Provider>,
        knowledge: Arc<dyn KnowledgeBase>,
        glossary: Glossary,
        options: VerifierOptions,
    ) -> Self {
        Self::with_tokenizer(provider, knowledge, glossary, Arc::new(RuleTokenizer::new()), options)
    }

    pub fn with_tokenizer(
        provider: Arc<dyn Provider>,
        knowledge: Arc<dyn KnowledgeBase>,
        glossary: Glossary,
        tokenizer: Arc<dyn Tokenizer>,
        options: VerifierOptions,
    ) -> Self {
        let judge = Judge::new(Arc::clone(&provider), options.model.clone())
            .with_temperature(options.temperature)
            .with_timeout(options.call_timeout);
        let research_judge = judge.for_model(options.research_model.clone());
        let prompts = JudgePrompts::new(&options.source_language, &options.target_language);

        // Logic and research share one extraction per section
        let claim_cache = Arc::new(CachedClaimExtractor::new(Arc::new(LlmClaimExtractor::new(
            judge.clone(),
            prompts.clone(),
        ))));
        let claims: Arc<dyn ClaimExtractor> = claim_cache.clone();
        let pacer = CallPacer::sequential(options.research_interval);

        Self {
            formula: FormulaChecker::new(tokenizer),
            semantic: SemanticChecker::new(judge.clone(), prompts.clone(), Arc::new(glossary)),
            logic: LogicChecker::new(judge.clone(), prompts.clone(), Arc::clone(&claims)),
            research: ResearchChecker::new(
                research_judge.clone(),
                prompts.clone(),
                claims,
                Arc::clone(&knowledge),
                pacer.clone(),
            ),
            enrichment: ConceptResearcher::new(research_judge, prompts.clone(), knowledge, pacer)
                .with_min_chars(options.min_enrich_chars)
                .with_domain_suffix(options.domain_suffix.clone()),
            claims: claim_cache,
            judge,
            prompts,
            options,
        }
    }

    pub fn options(&self) -> &VerifierOptions {
        &self.options
    }

    /// Verify `section`, storing the report and any repaired translation in it
    pub async fn verify_section(&self, section: &mut Section) -> VerificationReport {
        if !section.is_verifiable() {
            debug!("Section {} has nothing to verify", section.section_id);
            let report = VerificationReport::skipped_section();
            section.verification = Some(report.clone());
            return report;
        }

        // Listings are only shared within a section
        self.claims.clear();

        let original = section.content_original.clone();
        let title = section.title_original.clone();
        let mut report = VerificationReport::default();
        let mut first = true;

        for module in VerifyModule::ALL {
            if !self.options.is_enabled(module) {
                report.set_module(module, ModuleReport::skipped());
                continue;
            }
            if !first && !self.options.module_interval.is_zero() {
                tokio::time::sleep(self.options.module_interval).await;
            }
            first = false;

            let translated = section.content_translated.clone();
            let result = match module {
                VerifyModule::Formula => {
                    let (result, repaired) = self
                        .formula
                        .check(Some((&self.judge, &self.prompts)), &original, &translated)
                        .await;
                    if repaired != translated {
                        info!("Section {}: translation repaired", section.section_id);
                        section.content_translated = repaired;
                    }
                    result
                }
                VerifyModule::Semantic => self.semantic.check(&original, &translated, &title).await,
                VerifyModule::Logic => self.logic.check(&original, &translated, &title).await,
                VerifyModule::Research => self.research.check(&original, &title).await,
            };
            debug!("Section {} {}: {}", section.section_id, module, result.score());
            report.set_module(module, ModuleReport::from(result));
        }

        report.score = aggregate(&report, &self.options.weights);
        info!("Section {}: {}", section.section_id, report.summary_line());
        section.verification = Some(report.clone());
        report
    }

    /// Reader notes for the key concepts of `section`
    pub async fn enrich_section(&self, section: &Section) -> Vec<EnrichmentEntry> {
        self.enrichment.enrich(section).await
    }
}
