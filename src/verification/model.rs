/*!
 * Data model shared by the verification checks.
 *
 * `Section` is the record exchanged with the rest of the document pipeline.
 * Unknown keys are carried through untouched so that a verify pass never
 * drops fields it does not own.
 */

use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// One verification check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerifyModule {
    /// Math token fidelity and mechanical repair
    Formula,
    /// Paragraph-level meaning equivalence
    Semantic,
    /// Claim preservation and internal consistency
    Logic,
    /// External corroboration of claims
    Research,
}

impl VerifyModule {
    /// All modules in run order
    pub const ALL: [VerifyModule; 4] = [
        VerifyModule::Formula,
        VerifyModule::Semantic,
        VerifyModule::Logic,
        VerifyModule::Research,
    ];

    /// Lowercase module name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Formula => "formula",
            Self::Semantic => "semantic",
            Self::Logic => "logic",
            Self::Research => "research",
        }
    }

    /// One-letter tag used in summary lines
    pub fn tag(&self) -> char {
        match self {
            Self::Formula => 'F',
            Self::Semantic => 'S',
            Self::Logic => 'L',
            Self::Research => 'R',
        }
    }
}

impl fmt::Display for VerifyModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VerifyModule {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "formula" => Ok(Self::Formula),
            "semantic" => Ok(Self::Semantic),
            "logic" => Ok(Self::Logic),
            "research" => Ok(Self::Research),
            _ => Err(anyhow!("Unknown verification module: {}", s)),
        }
    }
}

/// Outcome of one check: a score in [0, 100] plus ordered findings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckResult {
    score: u8,
    issues: Vec<String>,
    auto_fixed: Vec<String>,
    flagged: Vec<String>,
}

impl CheckResult {
    /// Build a result, clamping `score` into [0, 100]
    pub fn new(score: i64, issues: Vec<String>, auto_fixed: Vec<String>, flagged: Vec<String>) -> Self {
        Self {
            score: score.clamp(0, 100) as u8,
            issues,
            auto_fixed,
            flagged,
        }
    }

    /// Result with only a score and issues
    pub fn scored(score: i64, issues: Vec<String>) -> Self {
        Self::new(score, issues, Vec::new(), Vec::new())
    }

    /// Score 100, nothing to report
    pub fn perfect() -> Self {
        Self::scored(100, Vec::new())
    }

    pub fn score(&self) -> u8 {
        self.score
    }

    pub fn issues(&self) -> &[String] {
        &self.issues
    }

    pub fn auto_fixed(&self) -> &[String] {
        &self.auto_fixed
    }

    pub fn flagged(&self) -> &[String] {
        &self.flagged
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Serialized form of one module's result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleReport {
    pub score: u8,
    #[serde(default)]
    pub issues: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub auto_fixed: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub flagged: Vec<String>,
    /// Module was disabled for this run
    #[serde(default, skip_serializing_if = "is_false")]
    pub skipped: bool,
}

impl ModuleReport {
    /// Placeholder for a module that did not run
    pub fn skipped() -> Self {
        Self {
            score: 100,
            issues: Vec::new(),
            auto_fixed: Vec::new(),
            flagged: Vec::new(),
            skipped: true,
        }
    }
}

impl From<CheckResult> for ModuleReport {
    fn from(result: CheckResult) -> Self {
        Self {
            score: result.score,
            issues: result.issues,
            auto_fixed: result.auto_fixed,
            flagged: result.flagged,
            skipped: false,
        }
    }
}

/// Per-section verification report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationReport {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formula: Option<ModuleReport>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semantic: Option<ModuleReport>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logic: Option<ModuleReport>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub research: Option<ModuleReport>,
    /// Weighted aggregate
    pub score: u8,
    /// Section had nothing to verify
    #[serde(default, skip_serializing_if = "is_false")]
    pub skipped: bool,
}

impl Default for VerificationReport {
    fn default() -> Self {
        Self {
            formula: None,
            semantic: None,
            logic: None,
            research: None,
            score: 100,
            skipped: false,
        }
    }
}

impl VerificationReport {
    /// Report for a section with an empty original or translation
    pub fn skipped_section() -> Self {
        Self {
            skipped: true,
            ..Self::default()
        }
    }

    /// Report of `module`, if present
    pub fn module(&self, module: VerifyModule) -> Option<&ModuleReport> {
        match module {
            VerifyModule::Formula => self.formula.as_ref(),
            VerifyModule::Semantic => self.semantic.as_ref(),
            VerifyModule::Logic => self.logic.as_ref(),
            VerifyModule::Research => self.research.as_ref(),
        }
    }

    /// Store the report of `module`
    pub fn set_module(&mut self, module: VerifyModule, report: ModuleReport) {
        let slot = match module {
            VerifyModule::Formula => &mut self.formula,
            VerifyModule::Semantic => &mut self.semantic,
            VerifyModule::Logic => &mut self.logic,
            VerifyModule::Research => &mut self.research,
        };
        *slot = Some(report);
    }

    /// `Score: 81 (F:80 S:70 L:100 R:-)`
    pub fn summary_line(&self) -> String {
        let parts: Vec<String> = VerifyModule::ALL
            .iter()
            .map(|m| {
                let value = self
                    .module(*m)
                    .filter(|r| !r.skipped)
                    .map(|r| r.score.to_string())
                    .unwrap_or_else(|| "-".to_string());
                format!("{}:{}", m.tag(), value)
            })
            .collect();
        format!("Score: {} ({})", self.score, parts.join(" "))
    }
}

/// Explanatory note attached to a section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichmentEntry {
    /// Concept name as found in the original
    pub term: String,
    /// Concept title in the target language
    #[serde(alias = "title_ko")]
    pub title_localized: String,
    /// Explanation in the target language
    pub explanation: String,
    /// Knowledge-base article the explanation draws on
    pub source: String,
}

/// A section record: original text, translation and verification output
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Section {
    #[serde(default)]
    pub section_id: String,
    #[serde(default)]
    pub title_original: String,
    #[serde(default)]
    pub title_translated: String,
    #[serde(default)]
    pub content_original: String,
    #[serde(default)]
    pub content_translated: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verification: Option<VerificationReport>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enrichments: Option<Vec<EnrichmentEntry>>,
    /// Fields owned by other pipeline stages
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Section {
    /// Section with the given texts and no verification output
    pub fn new(
        section_id: impl Into<String>,
        title: impl Into<String>,
        original: impl Into<String>,
        translated: impl Into<String>,
    ) -> Self {
        Self {
            section_id: section_id.into(),
            title_original: title.into(),
            content_original: original.into(),
            content_translated: translated.into(),
            ..Self::default()
        }
    }

    /// Neither side is the empty string
    pub fn is_verifiable(&self) -> bool {
        !self.content_original.is_empty() && !self.content_translated.is_empty()
    }
}
