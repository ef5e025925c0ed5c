//! Score aggregation over raw rule-audit output.
//!
//! Every score is the same pass ratio, `round(100 * passes / (passes + violations))`,
//! restricted to the records whose tags intersect a filter. A filter that matches
//! nothing scores 100: absence of evidence is not treated as failure.

mod taxonomy;

pub use taxonomy::{PourCategory, ScoreBand, ScoreGrade, WcagLevel};

use serde::Serialize;

use crate::audit::{RuleAuditResult, RuleRecord};

/// Pass ratio as an integer percentage, rounded half up. `ratio(0, 0) == 100`.
pub fn ratio(passed: usize, failed: usize) -> u8 {
    let total = passed as u64 + failed as u64;
    if total == 0 {
        return 100;
    }
    let rounded = (200 * passed as u64 + total) / (2 * total);
    rounded as u8
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WcagScores {
    pub a: u8,
    pub aa: u8,
    pub aaa: u8,
}

impl WcagScores {
    pub fn level(&self, level: WcagLevel) -> u8 {
        match level {
            WcagLevel::A => self.a,
            WcagLevel::AA => self.aa,
            WcagLevel::AAA => self.aaa,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CategoryScores {
    pub perceivable: u8,
    pub operable: u8,
    pub understandable: u8,
    pub robust: u8,
}

impl CategoryScores {
    pub fn category(&self, category: PourCategory) -> u8 {
        match category {
            PourCategory::Perceivable => self.perceivable,
            PourCategory::Operable => self.operable,
            PourCategory::Understandable => self.understandable,
            PourCategory::Robust => self.robust,
        }
    }
}

/// Compliance score tree for one audit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AccessibilityScore {
    pub overall: u8,
    pub wcag: WcagScores,
    pub categories: CategoryScores,
}

impl AccessibilityScore {
    /// Score of a content fragment nothing could be evaluated against.
    pub fn perfect() -> Self {
        Self {
            overall: 100,
            wcag: WcagScores {
                a: 100,
                aa: 100,
                aaa: 100,
            },
            categories: CategoryScores {
                perceivable: 100,
                operable: 100,
                understandable: 100,
                robust: 100,
            },
        }
    }

    pub fn grade(&self) -> ScoreGrade {
        ScoreGrade::from_score(self.overall)
    }

    pub fn band(&self) -> ScoreBand {
        ScoreBand::from_score(self.overall)
    }
}

/// Aggregate an audit into the full score tree. Pure and deterministic.
pub fn score(audit: &RuleAuditResult) -> AccessibilityScore {
    let level = |level: WcagLevel| filtered_ratio(audit, level.tags());
    let category = |category: PourCategory| filtered_ratio(audit, category.tags());

    AccessibilityScore {
        overall: ratio(audit.passes.len(), audit.violations.len()),
        wcag: WcagScores {
            a: level(WcagLevel::A),
            aa: level(WcagLevel::AA),
            aaa: level(WcagLevel::AAA),
        },
        categories: CategoryScores {
            perceivable: category(PourCategory::Perceivable),
            operable: category(PourCategory::Operable),
            understandable: category(PourCategory::Understandable),
            robust: category(PourCategory::Robust),
        },
    }
}

fn filtered_ratio(audit: &RuleAuditResult, tags: &[&str]) -> u8 {
    let matching = |records: &[RuleRecord]| {
        records
            .iter()
            .filter(|record| record.has_any_tag(tags))
            .count()
    };
    ratio(
        matching(audit.passes.as_slice()),
        matching(audit.violations.as_slice()),
    )
}
