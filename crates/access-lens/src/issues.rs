//! Normalization of raw violations into ranked accessibility issues.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::audit::{Impact, NodeRef, RuleAuditResult, RuleRecord};

/// Severity assigned to violations the auditor left unrated.
pub const DEFAULT_IMPACT: Impact = Impact::Moderate;

/// Stable issue representation consumed by ranking, heat-mapping, and remediation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessibilityIssue {
    pub id: String,
    pub impact: Impact,
    pub description: String,
    pub help: String,
    pub help_url: String,
    #[serde(default)]
    pub nodes: Vec<NodeRef>,
    #[serde(default)]
    pub tags: BTreeSet<String>,
}

impl AccessibilityIssue {
    /// First selector of the first affected node, when the auditor reported one.
    pub fn primary_target(&self) -> Option<&str> {
        self.nodes
            .first()
            .and_then(|node| node.target.first())
            .map(String::as_str)
    }
}

impl From<&RuleRecord> for AccessibilityIssue {
    fn from(record: &RuleRecord) -> Self {
        Self {
            id: record.rule_id.clone(),
            impact: record.impact.unwrap_or(DEFAULT_IMPACT),
            description: record.description.clone(),
            help: record.help.clone(),
            help_url: record.help_url.clone(),
            nodes: record.affected_nodes.clone(),
            tags: record.tags.clone(),
        }
    }
}

/// Map every violation 1:1, preserving auditor order.
pub fn normalize(audit: &RuleAuditResult) -> Vec<AccessibilityIssue> {
    audit.violations.iter().map(AccessibilityIssue::from).collect()
}

/// Stable sort, most urgent first. Ties keep their original order.
pub fn rank_by_severity(issues: &mut [AccessibilityIssue]) {
    issues.sort_by_key(|issue| issue.impact.rank());
}

/// The `limit` most urgent issues, without mutating the caller's list.
pub fn top_ranked(issues: &[AccessibilityIssue], limit: usize) -> Vec<AccessibilityIssue> {
    let mut ranked = issues.to_vec();
    rank_by_severity(&mut ranked);
    ranked.truncate(limit);
    ranked
}

/// Issue counts per severity, used for summaries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeverityBreakdown {
    pub critical: usize,
    pub serious: usize,
    pub moderate: usize,
    pub minor: usize,
}

impl SeverityBreakdown {
    pub fn from_issues(issues: &[AccessibilityIssue]) -> Self {
        let mut breakdown = Self::default();
        for issue in issues {
            match issue.impact {
                Impact::Critical => breakdown.critical += 1,
                Impact::Serious => breakdown.serious += 1,
                Impact::Moderate => breakdown.moderate += 1,
                Impact::Minor => breakdown.minor += 1,
            }
        }
        breakdown
    }

    pub fn total(&self) -> usize {
        self.critical + self.serious + self.moderate + self.minor
    }
}
