//! Weighted aggregation of module scores.

use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::verification::model::{VerificationReport, VerifyModule};

/// Relative weight of each module in the section score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub formula: f64,
    pub semantic: f64,
    pub logic: f64,
    pub research: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            formula: 0.35,
            semantic: 0.30,
            logic: 0.20,
            research: 0.15,
        }
    }
}

impl ScoreWeights {
    pub fn weight(&self, module: VerifyModule) -> f64 {
        match module {
            VerifyModule::Formula => self.formula,
            VerifyModule::Semantic => self.semantic,
            VerifyModule::Logic => self.logic,
            VerifyModule::Research => self.research,
        }
    }

    /// Weights must be finite, non-negative and not all zero
    pub fn validate(&self) -> Result<()> {
        for module in VerifyModule::ALL {
            let weight = self.weight(module);
            if !weight.is_finite() || weight < 0.0 {
                return Err(anyhow!("Invalid weight for {}: {}", module, weight));
            }
        }
        if VerifyModule::ALL.iter().map(|m| self.weight(*m)).sum::<f64>() <= 0.0 {
            return Err(anyhow!("Score weights must not all be zero"));
        }
        Ok(())
    }
}

/// Weighted mean of the modules that ran, renormalized over their weights
///
/// A report where no module ran, or every module that ran has zero weight, scores 100.
pub fn aggregate(report: &VerificationReport, weights: &ScoreWeights) -> u8 {
    let (weighted, total) = VerifyModule::ALL
        .iter()
        .filter_map(|m| {
            report
                .module(*m)
                .filter(|r| !r.skipped)
                .map(|r| (f64::from(r.score), weights.weight(*m)))
        })
        .fold((0.0, 0.0), |(sum, total), (score, weight)| (sum + score * weight, total + weight));

    if total <= 0.0 {
        return 100;
    }
    (weighted / total).round().clamp(0.0, 100.0) as u8
}
