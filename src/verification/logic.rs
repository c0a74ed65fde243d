//! Claim preservation and internal logic checks.

use log::{debug, info};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

use crate::verification::claims::ClaimExtractor;
use crate::verification::head;
use crate::verification::judge::Judge;
use crate::verification::model::CheckResult;
use crate::verification::prompts::JudgePrompts;

const MAX_CHECKED_CLAIMS: usize = 8;
const MAX_LOGIC_ISSUES: usize = 3;
const LOGIC_PENALTY: i64 = 5;

#[derive(Debug, Deserialize)]
struct ClaimPreservation {
    #[serde(default)]
    preserved: Option<bool>,
    #[serde(default)]
    reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LogicIssues {
    #[serde(default)]
    issues: Vec<Value>,
}

fn issue_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Logic and fact checker
#[derive(Clone)]
pub struct LogicChecker {
    judge: Judge,
    prompts: JudgePrompts,
    claims: Arc<dyn ClaimExtractor>,
}

impl std::fmt::Debug for LogicChecker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogicChecker").field("judge", &self.judge).finish()
    }
}

impl LogicChecker {
    pub fn new(judge: Judge, prompts: JudgePrompts, claims: Arc<dyn ClaimExtractor>) -> Self {
        Self { judge, prompts, claims }
    }

    /// Whether `claim` survives in the translation; a failed call counts as preserved
    async fn preserved(&self, claim: &str, translated: &str) -> Result<(), String> {
        let prompt = self.prompts.claim_preservation(claim, translated);
        match self.judge.ask::<ClaimPreservation>(&prompt, 256).await {
            Ok(ClaimPreservation { preserved: Some(false), reason }) => {
                Err(reason.unwrap_or_else(|| "claim not found in translation".to_string()))
            }
            Ok(_) => Ok(()),
            Err(e) => {
                debug!("Claim preservation unavailable: {}", e);
                Ok(())
            }
        }
    }

    async fn internal_issues(&self, translated: &str) -> Vec<String> {
        let prompt = self.prompts.internal_logic(translated);
        match self.judge.ask::<LogicIssues>(&prompt, 512).await {
            Ok(parsed) => parsed.issues.iter().take(MAX_LOGIC_ISSUES).map(issue_text).collect(),
            Err(e) => {
                debug!("Internal logic check unavailable: {}", e);
                Vec::new()
            }
        }
    }

    pub async fn check(&self, original: &str, translated: &str, title: &str) -> CheckResult {
        let claims = match self.claims.extract_claims(original, title).await {
            Ok(claims) => claims,
            Err(e) => {
                debug!("Claim extraction unavailable: {}", e);
                Vec::new()
            }
        };
        if claims.is_empty() {
            return CheckResult::perfect();
        }

        let checked: Vec<&String> = claims.iter().take(MAX_CHECKED_CLAIMS).collect();
        let mut flagged = Vec::new();
        for claim in &checked {
            if let Err(reason) = self.preserved(claim, translated).await {
                flagged.push(format!("{} → {}", head(claim, 80), reason));
            }
        }

        let issues = self.internal_issues(translated).await;
        let preserved = (checked.len() - flagged.len()) as i64;
        let score = preserved * 100 / checked.len() as i64 - LOGIC_PENALTY * issues.len() as i64;

        info!(
            "Logic score {}: {}/{} claims preserved, {} logic issues",
            score.max(0),
            preserved,
            checked.len(),
            issues.len()
        );
        CheckResult::new(score, issues, Vec::new(), flagged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::mock::MockProvider;
    use crate::verification::claims::LlmClaimExtractor;

    const CLAIMS: &str = "1. Ramanujan noted that 1729 is a taxicab number.\n\
        2. Hardy visited Ramanujan in a hospital in Putney.";

    fn checker(provider: MockProvider) -> LogicChecker {
        let judge = Judge::new(Arc::new(provider), "m");
        let prompts = JudgePrompts::new("en", "ko");
        let claims = Arc::new(LlmClaimExtractor::new(judge.clone(), prompts.clone()));
        LogicChecker::new(judge, prompts, claims)
    }

    #[tokio::test]
    async fn test_check_withNoClaims_shouldBePerfect() {
        let result = checker(MockProvider::failing()).check("text", "번역", "t").await;
        assert_eq!(result.score(), 100);
        assert!(result.flagged().is_empty());
    }

    #[tokio::test]
    async fn test_check_withDroppedClaimAndIssue_shouldFlagAndPenalize() {
        let provider = MockProvider::scripted()
            .on("Extract verifiable factual claims", CLAIMS)
            .on("Claim: Hardy", r#"{"preserved": false, "reason": "Putney omitted"}"#)
            .on("Claim: Ramanujan", r#"{"preserved": true, "reason": "ok"}"#)
            .on("internal logic issues", r#"{"issues": ["x redefined as y"]}"#);
        let result = checker(provider).check("original", "번역", "Taxicab").await;

        assert_eq!(result.score(), 45);
        assert_eq!(
            result.flagged(),
            ["Hardy visited Ramanujan in a hospital in Putney. → Putney omitted"]
        );
        assert_eq!(result.issues(), ["x redefined as y"]);
    }

    #[tokio::test]
    async fn test_check_withFailedPreservationCalls_shouldCountAsPreserved() {
        let provider = MockProvider::scripted()
            .on("Extract verifiable factual claims", CLAIMS)
            .on("internal logic issues", r#"{"issues": []}"#);
        let result = checker(provider).check("original", "번역", "Taxicab").await;
        assert_eq!(result.score(), 100);
    }

    #[tokio::test]
    async fn test_check_withManyLogicIssues_shouldKeepThree() {
        let provider = MockProvider::scripted()
            .on("Extract verifiable factual claims", CLAIMS)
            .on("Claim:", r#"{"preserved": true}"#)
            .on("internal logic issues", r#"{"issues": ["a", "b", {"detail": "c"}, "d"]}"#);
        let result = checker(provider).check("original", "번역", "Taxicab").await;
        assert_eq!(result.issues().len(), 3);
        assert_eq!(result.issues()[2], r#"{"detail":"c"}"#);
        assert_eq!(result.score(), 85);
    }

    #[tokio::test]
    async fn test_check_withMissingReason_shouldUseDefault() {
        let provider = MockProvider::scripted()
            .on("Extract verifiable factual claims", "Euler proved the Basel problem in 1734.")
            .on("Claim:", r#"{"preserved": false}"#);
        let result = checker(provider).check("original", "번역", "Basel").await;
        assert_eq!(
            result.flagged(),
            ["Euler proved the Basel problem in 1734. → claim not found in translation"]
        );
        assert_eq!(result.score(), 0);
    }
}
