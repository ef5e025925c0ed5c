use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::analysis::{AnalysisError, AnalysisResult, AnalysisScheduler};
use crate::audit::{RuleAuditor, RuleSet};
use crate::config::RemediationConfig;
use crate::content::{apply_suggestion, ensure_tree, render_story, ContentError, PatchOutcome};
use crate::issues::{AccessibilityIssue, SeverityBreakdown};
use crate::remediation::{
    AltTextRequest, RemediationEngine, RemediationSuggestion, SuggestionOracle, SuggestionRequest,
};
use crate::scoring::{AccessibilityScore, ScoreGrade};

/// Content to analyze: raw HTML, or a content tree rendered to HTML first.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub html_content: Option<String>,
    #[serde(default)]
    pub story: Option<Value>,
}

impl AnalyzeRequest {
    pub fn html(html: impl Into<String>) -> Self {
        Self {
            html_content: Some(html.into()),
            story: None,
        }
    }

    /// HTML to audit. Raw HTML wins when both are present; a story may be sent
    /// whole (with its tree under `content`) or as the tree itself.
    pub fn resolve_html(&self) -> String {
        if let Some(html) = self.html_content.as_deref() {
            if !html.trim().is_empty() {
                return html.to_string();
            }
        }
        match &self.story {
            Some(story) => render_story(story.get("content").unwrap_or(story)),
            None => String::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RemediateRequest {
    pub content: Value,
    pub fix: RemediationSuggestion,
}

/// Analysis result as returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub score: AccessibilityScore,
    pub grade: ScoreGrade,
    pub severity: SeverityBreakdown,
    pub issues: Vec<AccessibilityIssue>,
    pub suggestions: Vec<RemediationSuggestion>,
    pub timestamp: DateTime<Utc>,
}

impl AnalysisReport {
    fn new(result: AnalysisResult, suggestions: Vec<RemediationSuggestion>) -> Self {
        Self {
            grade: result.score.grade(),
            severity: SeverityBreakdown::from_issues(&result.issues),
            score: result.score,
            issues: result.issues,
            suggestions,
            timestamp: result.timestamp,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Analysis(#[from] AnalysisError),
    #[error(transparent)]
    Content(#[from] ContentError),
    #[error("imageUrl required")]
    MissingImageUrl,
}

/// Composes the analysis scheduler with the remediation engine.
pub struct AccessibilityService<A, S> {
    scheduler: AnalysisScheduler<A>,
    remediation: RemediationEngine<S>,
}

impl<A, S> AccessibilityService<A, S>
where
    A: RuleAuditor + 'static,
    S: SuggestionOracle + 'static,
{
    pub fn new(auditor: Arc<A>, oracle: Arc<S>, rules: RuleSet, config: &RemediationConfig) -> Self {
        Self {
            scheduler: AnalysisScheduler::new(auditor, rules),
            remediation: RemediationEngine::new(oracle, config),
        }
    }

    /// Audit and score the content, then ask for suggestions on the result.
    pub async fn analyze(&self, request: &AnalyzeRequest) -> Result<AnalysisReport, ServiceError> {
        let html = request.resolve_html();
        let result = self.scheduler.analyze(&html).await?;
        let suggestions = self
            .remediation
            .generate_suggestions(&html, &result.issues)
            .await;
        Ok(AnalysisReport::new(result, suggestions))
    }

    pub async fn suggestions(
        &self,
        request: &SuggestionRequest,
    ) -> Result<Vec<RemediationSuggestion>, ServiceError> {
        if request.html_content.trim().is_empty() {
            return Err(AnalysisError::EmptyContent.into());
        }
        Ok(self
            .remediation
            .generate_suggestions(&request.html_content, &request.issues)
            .await)
    }

    pub async fn alt_text(&self, request: &AltTextRequest) -> Result<String, ServiceError> {
        let image_url = request.image_url.trim();
        if image_url.is_empty() {
            return Err(ServiceError::MissingImageUrl);
        }
        Ok(self
            .remediation
            .generate_alt_text(image_url, &request.context)
            .await)
    }

    /// Apply one suggestion to a content tree.
    pub fn remediate(&self, request: &RemediateRequest) -> Result<PatchOutcome, ServiceError> {
        ensure_tree(&request.content)?;
        Ok(apply_suggestion(&request.content, &request.fix))
    }

    pub fn latest(&self) -> Option<AnalysisResult> {
        self.scheduler.latest()
    }
}
