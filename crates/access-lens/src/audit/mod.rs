//! Boundary to the rule-audit oracle.
//!
//! The oracle evaluates an HTML fragment against a set of enabled rules and
//! reports one [`RuleRecord`] per applicable rule, either in `passes` or in
//! `violations`. Everything downstream (scoring, issue normalization) only
//! depends on these records, so any auditor implementing [`RuleAuditor`] can be
//! plugged into the pipeline.

mod contrast;
pub mod rules;

pub use contrast::{contrast_ratio, parse_color, Rgb};
pub use rules::HtmlRuleAuditor;

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::oracle::OracleError;

/// Severity reported by the auditor for a failing rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    Critical,
    Serious,
    Moderate,
    Minor,
}

impl Impact {
    /// Urgency rank, lower is more urgent.
    pub fn rank(self) -> u8 {
        match self {
            Impact::Critical => 0,
            Impact::Serious => 1,
            Impact::Moderate => 2,
            Impact::Minor => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Impact::Critical => "critical",
            Impact::Serious => "serious",
            Impact::Moderate => "moderate",
            Impact::Minor => "minor",
        }
    }
}

/// Reference to a DOM node that a rule evaluated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeRef {
    pub html: String,
    #[serde(default)]
    pub target: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_summary: Option<String>,
}

/// Outcome of one rule in one audit run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleRecord {
    #[serde(rename = "id", alias = "ruleId")]
    pub rule_id: String,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default)]
    pub impact: Option<Impact>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub help: String,
    #[serde(default)]
    pub help_url: String,
    #[serde(default, rename = "nodes", alias = "affectedNodes")]
    pub affected_nodes: Vec<NodeRef>,
}

impl RuleRecord {
    pub fn new<I, T>(rule_id: impl Into<String>, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            rule_id: rule_id.into(),
            tags: tags.into_iter().map(Into::into).collect(),
            impact: None,
            description: String::new(),
            help: String::new(),
            help_url: String::new(),
            affected_nodes: Vec::new(),
        }
    }

    pub fn with_impact(mut self, impact: Impact) -> Self {
        self.impact = Some(impact);
        self
    }

    pub fn with_nodes(mut self, nodes: Vec<NodeRef>) -> Self {
        self.affected_nodes = nodes;
        self
    }

    /// True when the record carries at least one of `tags`.
    pub fn has_any_tag(&self, tags: &[&str]) -> bool {
        tags.iter().any(|tag| self.tags.contains(*tag))
    }
}

/// Raw pass/violation lists produced by one audit run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleAuditResult {
    #[serde(default)]
    pub passes: Vec<RuleRecord>,
    #[serde(default)]
    pub violations: Vec<RuleRecord>,
}

impl RuleAuditResult {
    pub fn is_empty(&self) -> bool {
        self.passes.is_empty() && self.violations.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleToggle {
    pub enabled: bool,
}

/// Enabled-rules configuration handed to the auditor (`ruleId -> {enabled}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleSet {
    rules: BTreeMap<String, RuleToggle>,
}

impl RuleSet {
    pub const IMAGE_ALT: &'static str = "image-alt";
    pub const LABEL: &'static str = "label";
    pub const LINK_NAME: &'static str = "link-name";
    pub const COLOR_CONTRAST: &'static str = "color-contrast";

    /// The four rules every audit must support, all enabled.
    pub fn standard() -> Self {
        Self::from_ids([
            Self::COLOR_CONTRAST,
            Self::IMAGE_ALT,
            Self::LABEL,
            Self::LINK_NAME,
        ])
    }

    pub fn from_ids<I, T>(ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let rules = ids
            .into_iter()
            .map(|id| (id.into(), RuleToggle { enabled: true }))
            .collect();
        Self { rules }
    }

    pub fn set_enabled(&mut self, rule_id: impl Into<String>, enabled: bool) {
        self.rules.insert(rule_id.into(), RuleToggle { enabled });
    }

    pub fn is_enabled(&self, rule_id: &str) -> bool {
        self.rules
            .get(rule_id)
            .map(|toggle| toggle.enabled)
            .unwrap_or(false)
    }

    pub fn enabled_ids(&self) -> impl Iterator<Item = &str> {
        self.rules
            .iter()
            .filter(|(_, toggle)| toggle.enabled)
            .map(|(id, _)| id.as_str())
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::standard()
    }
}

/// Rule-audit oracle. Implementations must not report a rule in both lists.
#[async_trait]
pub trait RuleAuditor: Send + Sync {
    async fn run_audit(
        &self,
        html: &str,
        rules: &RuleSet,
    ) -> Result<RuleAuditResult, OracleError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rule_records_accept_axe_field_names() {
        let record: RuleRecord = serde_json::from_value(serde_json::json!({
            "id": "image-alt",
            "tags": ["wcag2a", "cat.text-alternatives"],
            "impact": "critical",
            "description": "Ensures <img> elements have alternate text",
            "help": "Images must have alternate text",
            "helpUrl": "https://dequeuniversity.com/rules/axe/4.8/image-alt",
            "nodes": [{ "html": "<img src=\"a.png\">", "target": ["img"] }]
        }))
        .expect("axe record parses");

        assert_eq!(record.rule_id, "image-alt");
        assert_eq!(record.impact, Some(Impact::Critical));
        assert!(record.has_any_tag(&["wcag2a"]));
        assert_eq!(record.affected_nodes[0].target, vec!["img".to_string()]);
    }

    #[test]
    fn rule_set_reports_only_enabled_rules() {
        let mut rules = RuleSet::standard();
        rules.set_enabled(RuleSet::LABEL, false);

        assert!(rules.is_enabled(RuleSet::IMAGE_ALT));
        assert!(!rules.is_enabled(RuleSet::LABEL));
        assert!(!rules.is_enabled("region"));
        assert_eq!(rules.enabled_ids().count(), 3);

        let json = serde_json::to_value(&rules).expect("serializes");
        assert_eq!(json["label"]["enabled"], serde_json::json!(false));
    }
}
