//! End-to-end analysis through the public service facade: the built-in HTML
//! auditor, story rendering, and score aggregation over fixed audit fixtures.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use access_lens::audit::{HtmlRuleAuditor, Impact, RuleAuditResult, RuleAuditor, RuleRecord, RuleSet};
use access_lens::config::RemediationConfig;
use access_lens::oracle::OracleError;
use access_lens::remediation::ConfiguredSuggestionOracle;
use access_lens::scoring::{ScoreBand, ScoreGrade};
use access_lens::service::{AccessibilityService, AnalyzeRequest};

fn built_in_service() -> AccessibilityService<HtmlRuleAuditor, ConfiguredSuggestionOracle> {
    AccessibilityService::new(
        Arc::new(HtmlRuleAuditor),
        Arc::new(ConfiguredSuggestionOracle::Disabled),
        RuleSet::standard(),
        &RemediationConfig::default(),
    )
}

/// Replays one audit fixture and counts how often it was asked.
struct FixtureAuditor {
    fixture: RuleAuditResult,
    calls: AtomicUsize,
}

#[async_trait]
impl RuleAuditor for FixtureAuditor {
    async fn run_audit(&self, _html: &str, _rules: &RuleSet) -> Result<RuleAuditResult, OracleError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        Ok(self.fixture.clone())
    }
}

fn fixture_service(
    fixture: RuleAuditResult,
) -> (
    Arc<FixtureAuditor>,
    AccessibilityService<FixtureAuditor, ConfiguredSuggestionOracle>,
) {
    let auditor = Arc::new(FixtureAuditor {
        fixture,
        calls: AtomicUsize::new(0),
    });
    let service = AccessibilityService::new(
        auditor.clone(),
        Arc::new(ConfiguredSuggestionOracle::Disabled),
        RuleSet::standard(),
        &RemediationConfig::default(),
    );
    (auditor, service)
}

#[tokio::test]
async fn built_in_auditor_scores_a_page_with_a_missing_alt() {
    let html = r#"
        <main>
          <img src="hero.png">
          <label>Email <input type="email"></label>
          <a href="/pricing">Pricing</a>
        </main>"#;

    let report = built_in_service()
        .analyze(&AnalyzeRequest::html(html))
        .await
        .expect("analysis succeeds");

    assert_eq!(report.issues.len(), 1);
    assert_eq!(report.issues[0].id, "image-alt");
    assert_eq!(report.issues[0].impact, Impact::Critical);
    assert_eq!(report.score.overall, 67);
    assert_eq!(report.score.categories.perceivable, 0);
    assert_eq!(report.score.categories.robust, 100);
    assert_eq!(report.grade, ScoreGrade::D);
    assert_eq!(report.severity.critical, 1);
    assert!(report.suggestions.is_empty());
}

#[tokio::test]
async fn rendered_story_is_audited_like_raw_html() {
    let request: AnalyzeRequest = serde_json::from_value(serde_json::json!({
        "story": {
            "name": "Launch",
            "content": {
                "component": "page",
                "body": [
                    {
                        "_uid": "post-1",
                        "component": "blog_post",
                        "title": "Launch day",
                        "author": "Editorial",
                        "featured_image": { "filename": "https://cdn.test/launch.jpg" }
                    }
                ]
            }
        }
    }))
    .expect("request parses");

    let report = built_in_service()
        .analyze(&request)
        .await
        .expect("analysis succeeds");

    assert_eq!(report.issues.len(), 1);
    assert_eq!(report.issues[0].id, "image-alt");
    assert_eq!(report.score.overall, 0);
    assert_eq!(report.score.band(), ScoreBand::Failing);
}

#[tokio::test]
async fn weighted_scores_follow_wcag_and_pour_tags() {
    let mut passes = Vec::new();
    for index in 0..4 {
        passes.push(RuleRecord::new(
            format!("alt-{index}"),
            ["wcag2a", "cat.text-alternatives"],
        ));
        passes.push(RuleRecord::new(format!("lang-{index}"), ["wcag2a", "cat.language"]));
    }
    let violations = vec![
        RuleRecord::new("color-contrast", ["wcag2a", "cat.color"]).with_impact(Impact::Serious),
        RuleRecord::new("focus-order", ["wcag2aa", "cat.keyboard"]),
    ];

    let (_, service) = fixture_service(RuleAuditResult { passes, violations });
    let report = service
        .analyze(&AnalyzeRequest::html("<main>fixture</main>"))
        .await
        .expect("analysis succeeds");

    assert_eq!(report.score.overall, 80);
    assert_eq!(report.score.wcag.a, 89);
    assert_eq!(report.score.wcag.aa, 80);
    assert_eq!(report.score.wcag.aaa, 80);
    assert_eq!(report.score.categories.perceivable, 80);
    assert_eq!(report.score.categories.operable, 0);
    assert_eq!(report.score.categories.understandable, 100);
    assert_eq!(report.score.categories.robust, 100);
    assert_eq!(report.grade, ScoreGrade::B);

    assert_eq!(report.issues[0].id, "color-contrast");
    assert_eq!(report.issues[1].impact, Impact::Moderate);
}

#[tokio::test]
async fn concurrent_service_calls_share_one_audit() {
    let (auditor, service) = fixture_service(RuleAuditResult::default());
    let request = AnalyzeRequest::html("<main><p>Same draft</p></main>");

    let (first, second) = tokio::join!(service.analyze(&request), service.analyze(&request));
    let first = first.expect("first succeeds");
    let second = second.expect("second succeeds");

    assert_eq!(auditor.calls.load(Ordering::SeqCst), 1);
    assert_eq!(first.timestamp, second.timestamp);
    assert_eq!(first.score.overall, 100);

    let latest = service.latest().expect("result committed");
    assert_eq!(latest.timestamp, first.timestamp);
}
