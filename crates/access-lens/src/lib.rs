//! AccessLens accessibility scoring engine.
//!
//! Raw HTML flows through a rule auditor, the violations are normalized into
//! ranked issues, and the pass/fail records are folded into an overall,
//! WCAG-level, and POUR-category score tree. The [`analysis::AnalysisScheduler`]
//! wraps the pipeline so a single content cursor is never audited twice at once.

pub mod analysis;
pub mod audit;
pub mod config;
pub mod content;
pub mod error;
pub mod issues;
pub mod oracle;
pub mod remediation;
pub mod router;
pub mod scoring;
pub mod service;
pub mod telemetry;
