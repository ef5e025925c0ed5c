use crate::infra::build_service;
use access_lens::config::{AppConfig, AuditConfig};
use access_lens::error::AppError;
use access_lens::issues::rank_by_severity;
use access_lens::scoring::{PourCategory, WcagLevel};
use access_lens::service::{AnalysisReport, AnalyzeRequest};
use clap::Args;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub(crate) struct AnalyzeArgs {
    /// HTML file to audit, or a `.json` story whose content tree is rendered first
    pub(crate) file: PathBuf,
    /// Print the full report as JSON instead of a summary
    #[arg(long)]
    pub(crate) json: bool,
    /// Comma separated rule ids to run, overriding AUDIT_RULES
    #[arg(long)]
    pub(crate) rules: Option<String>,
}

pub(crate) async fn run_analyze(args: AnalyzeArgs) -> Result<(), AppError> {
    let AnalyzeArgs { file, json, rules } = args;

    let mut config = AppConfig::load()?;
    if let Some(rules) = rules {
        config.audit.rules = AuditConfig::parse_rules(&rules)?;
    }

    let request = load_request(&file)?;
    let service = build_service(&config)?;
    let report = service.analyze(&request).await?;

    if json {
        let rendered = serde_json::to_string_pretty(&report)
            .map_err(|err| AppError::InvalidRequest(format!("failed to encode report: {err}")))?;
        println!("{rendered}");
    } else {
        print!("{}", render_report(&report));
    }
    Ok(())
}

fn load_request(file: &Path) -> Result<AnalyzeRequest, AppError> {
    let raw = std::fs::read_to_string(file)?;
    let is_story = file
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if !is_story {
        return Ok(AnalyzeRequest::html(raw));
    }

    let story = serde_json::from_str(&raw).map_err(|err| {
        AppError::InvalidRequest(format!("{} is not a JSON story: {err}", file.display()))
    })?;
    Ok(AnalyzeRequest {
        html_content: None,
        story: Some(story),
    })
}

/// Plain-text summary: score tree, then issues most urgent first.
pub(crate) fn render_report(report: &AnalysisReport) -> String {
    let mut out = String::new();
    let score = &report.score;

    let _ = writeln!(
        out,
        "Accessibility score: {}/100 (grade {}, {})",
        score.overall,
        report.grade.label(),
        score.band().label()
    );

    let levels: Vec<String> = WcagLevel::ALL
        .iter()
        .map(|level| format!("{} {}", level.label(), score.wcag.level(*level)))
        .collect();
    let _ = writeln!(out, "  WCAG        {}", levels.join("  "));

    let categories: Vec<String> = PourCategory::ALL
        .iter()
        .map(|category| format!("{} {}", category.label(), score.categories.category(*category)))
        .collect();
    let _ = writeln!(out, "  Principles  {}", categories.join("  "));

    let severity = &report.severity;
    let _ = writeln!(
        out,
        "Issues: {} ({} critical, {} serious, {} moderate, {} minor)",
        severity.total(),
        severity.critical,
        severity.serious,
        severity.moderate,
        severity.minor
    );

    let mut issues = report.issues.clone();
    rank_by_severity(&mut issues);
    for issue in &issues {
        let _ = writeln!(out, "  [{}] {}: {}", issue.impact.label(), issue.id, issue.help);
        if let Some(target) = issue.primary_target() {
            match issue.nodes.len() {
                0 | 1 => {
                    let _ = writeln!(out, "      {target}");
                }
                count => {
                    let _ = writeln!(out, "      {target} (+{} more)", count - 1);
                }
            }
        }
    }

    if !report.suggestions.is_empty() {
        let _ = writeln!(out, "Suggestions:");
        for suggestion in &report.suggestions {
            let _ = writeln!(
                out,
                "  {} -> {} ({:.0}% confidence)",
                suggestion.element,
                suggestion.suggestion,
                suggestion.confidence * 100.0
            );
        }
    }

    out
}
