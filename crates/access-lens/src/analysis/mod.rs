//! Analysis pipeline: audit, normalize, score.

mod scheduler;

pub use scheduler::AnalysisScheduler;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::audit::{RuleAuditor, RuleSet};
use crate::issues::{normalize, AccessibilityIssue};
use crate::oracle::OracleError;
use crate::scoring::{score, AccessibilityScore};

/// Immutable outcome of one completed audit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    pub issues: Vec<AccessibilityIssue>,
    pub score: AccessibilityScore,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("HTML content required")]
    EmptyContent,
    #[error("accessibility audit failed: {0}")]
    Audit(#[source] OracleError),
}

impl AnalysisError {
    /// Audit failures are transient from the caller's point of view.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AnalysisError::Audit(_))
    }
}

/// Run the auditor once and derive issues and scores from its output.
pub async fn run_pipeline<A>(
    auditor: &A,
    rules: &RuleSet,
    content: &str,
) -> Result<AnalysisResult, AnalysisError>
where
    A: RuleAuditor + ?Sized,
{
    let audit = auditor
        .run_audit(content, rules)
        .await
        .map_err(AnalysisError::Audit)?;

    Ok(AnalysisResult {
        issues: normalize(&audit),
        score: score(&audit),
        timestamp: Utc::now(),
    })
}
