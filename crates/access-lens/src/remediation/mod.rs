//! Remediation suggestions from an external text-generation oracle.
//!
//! The oracle is advisory: every failure mode (transport error, timeout,
//! non-success status, unparsable body) degrades to "no suggestions" and is only
//! logged. Analysis results are never blocked on it.

mod http;

pub use http::{ConfiguredSuggestionOracle, HttpSuggestionOracle};

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, warn};

use crate::config::RemediationConfig;
use crate::issues::{top_ranked, AccessibilityIssue};
use crate::oracle::OracleError;

/// Text used whenever alt text could not be generated.
pub const ALT_TEXT_FALLBACK: &str = "Image description unavailable";

/// Kind of fix a suggestion proposes; selects the content patch applied for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SuggestionType {
    AltText,
    AriaLabel,
    HeadingStructure,
    ColorContrast,
    FocusManagement,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemediationSuggestion {
    #[serde(rename = "type")]
    pub kind: SuggestionType,
    pub element: String,
    pub issue: String,
    pub suggestion: String,
    #[serde(deserialize_with = "clamped_confidence")]
    pub confidence: f32,
    pub auto_fixable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component_id: Option<String>,
}

fn clamped_confidence<'de, D>(deserializer: D) -> Result<f32, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = f32::deserialize(deserializer)?;
    Ok(if raw.is_nan() { 0.0 } else { raw.clamp(0.0, 1.0) })
}

/// Batch sent to the oracle.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionRequest {
    #[serde(default)]
    pub html_content: String,
    #[serde(default)]
    pub issues: Vec<AccessibilityIssue>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SuggestionResponse {
    #[serde(default)]
    pub suggestions: Vec<RemediationSuggestion>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AltTextRequest {
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub context: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AltTextResponse {
    #[serde(default)]
    pub alt_text: Option<String>,
}

/// External suggestion generator.
#[async_trait]
pub trait SuggestionOracle: Send + Sync {
    async fn suggest(
        &self,
        request: &SuggestionRequest,
    ) -> Result<Vec<RemediationSuggestion>, OracleError>;

    async fn describe_image(&self, request: &AltTextRequest) -> Result<String, OracleError>;
}

/// Applies the top-N policy and the degrade-to-empty rule around an oracle.
pub struct RemediationEngine<S> {
    oracle: Arc<S>,
    max_issues: usize,
    timeout: Duration,
}

impl<S> RemediationEngine<S>
where
    S: SuggestionOracle + 'static,
{
    pub fn new(oracle: Arc<S>, config: &RemediationConfig) -> Self {
        Self {
            oracle,
            max_issues: config.max_issues,
            timeout: config.timeout(),
        }
    }

    /// Suggestions for the most urgent issues. Never fails.
    pub async fn generate_suggestions(
        &self,
        html_content: &str,
        issues: &[AccessibilityIssue],
    ) -> Vec<RemediationSuggestion> {
        if issues.is_empty() {
            return Vec::new();
        }

        let request = SuggestionRequest {
            html_content: html_content.to_string(),
            issues: top_ranked(issues, self.max_issues),
        };

        match tokio::time::timeout(self.timeout, self.oracle.suggest(&request)).await {
            Ok(Ok(suggestions)) => {
                debug!(
                    requested = request.issues.len(),
                    received = suggestions.len(),
                    "remediation suggestions received"
                );
                suggestions
            }
            Ok(Err(err)) => {
                warn!(error = %err, "remediation oracle failed; returning no suggestions");
                Vec::new()
            }
            Err(_) => {
                warn!(
                    timeout_ms = self.timeout.as_millis() as u64,
                    "remediation oracle timed out; returning no suggestions"
                );
                Vec::new()
            }
        }
    }

    /// Alt text for an image, or [`ALT_TEXT_FALLBACK`] when the oracle cannot help.
    pub async fn generate_alt_text(&self, image_url: &str, context: &str) -> String {
        let request = AltTextRequest {
            image_url: image_url.to_string(),
            context: context.to_string(),
        };

        match tokio::time::timeout(self.timeout, self.oracle.describe_image(&request)).await {
            Ok(Ok(text)) if !text.trim().is_empty() => text.trim().to_string(),
            Ok(Ok(_)) => ALT_TEXT_FALLBACK.to_string(),
            Ok(Err(err)) => {
                warn!(error = %err, image_url, "alt text generation failed");
                ALT_TEXT_FALLBACK.to_string()
            }
            Err(_) => {
                warn!(image_url, "alt text generation timed out");
                ALT_TEXT_FALLBACK.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::Impact;
    use std::collections::BTreeSet;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingOracle {
        batches: Mutex<Vec<Vec<String>>>,
        reply: Vec<RemediationSuggestion>,
        fail: bool,
    }

    #[async_trait]
    impl SuggestionOracle for RecordingOracle {
        async fn suggest(
            &self,
            request: &SuggestionRequest,
        ) -> Result<Vec<RemediationSuggestion>, OracleError> {
            let ids = request.issues.iter().map(|issue| issue.id.clone()).collect();
            self.batches.lock().expect("batches mutex").push(ids);
            if self.fail {
                return Err(OracleError::malformed("expected JSON object"));
            }
            Ok(self.reply.clone())
        }

        async fn describe_image(&self, _request: &AltTextRequest) -> Result<String, OracleError> {
            if self.fail {
                return Err(OracleError::unavailable("connection refused"));
            }
            Ok("  Two kayaks on a calm lake  ".to_string())
        }
    }

    fn issue(id: &str, impact: Impact) -> AccessibilityIssue {
        AccessibilityIssue {
            id: id.to_string(),
            impact,
            description: String::new(),
            help: String::new(),
            help_url: String::new(),
            nodes: Vec::new(),
            tags: BTreeSet::new(),
        }
    }

    fn config(max_issues: usize) -> RemediationConfig {
        RemediationConfig {
            endpoint: None,
            timeout_secs: 5,
            max_issues,
        }
    }

    fn suggestion() -> RemediationSuggestion {
        RemediationSuggestion {
            kind: SuggestionType::AltText,
            element: "img.hero".to_string(),
            issue: "Image missing alt text".to_string(),
            suggestion: "Harbor at dusk".to_string(),
            confidence: 0.9,
            auto_fixable: true,
            code: None,
            component_id: Some("hero-1".to_string()),
        }
    }

    #[tokio::test]
    async fn sends_only_the_most_urgent_issues() {
        let oracle = Arc::new(RecordingOracle {
            reply: vec![suggestion()],
            ..RecordingOracle::default()
        });
        let engine = RemediationEngine::new(oracle.clone(), &config(2));

        let issues = vec![
            issue("region", Impact::Minor),
            issue("image-alt", Impact::Critical),
            issue("link-name", Impact::Serious),
        ];
        let suggestions = engine.generate_suggestions("<main></main>", &issues).await;

        assert_eq!(suggestions, vec![suggestion()]);
        let batches = oracle.batches.lock().expect("batches mutex");
        assert_eq!(batches.as_slice(), [vec!["image-alt", "link-name"]]);
    }

    #[tokio::test]
    async fn oracle_errors_degrade_to_no_suggestions() {
        let oracle = Arc::new(RecordingOracle {
            fail: true,
            ..RecordingOracle::default()
        });
        let engine = RemediationEngine::new(oracle, &config(10));

        let suggestions = engine
            .generate_suggestions("<main></main>", &[issue("label", Impact::Critical)])
            .await;
        assert!(suggestions.is_empty());
    }

    #[tokio::test]
    async fn empty_issue_list_skips_the_oracle() {
        let oracle = Arc::new(RecordingOracle::default());
        let engine = RemediationEngine::new(oracle.clone(), &config(10));

        assert!(engine.generate_suggestions("<main></main>", &[]).await.is_empty());
        assert!(oracle.batches.lock().expect("batches mutex").is_empty());
    }

    #[tokio::test]
    async fn alt_text_is_trimmed_or_falls_back() {
        let engine = RemediationEngine::new(Arc::new(RecordingOracle::default()), &config(10));
        assert_eq!(
            engine.generate_alt_text("https://cdn.test/kayak.jpg", "").await,
            "Two kayaks on a calm lake"
        );

        let failing = RemediationEngine::new(
            Arc::new(RecordingOracle {
                fail: true,
                ..RecordingOracle::default()
            }),
            &config(10),
        );
        assert_eq!(
            failing.generate_alt_text("https://cdn.test/kayak.jpg", "").await,
            ALT_TEXT_FALLBACK
        );
    }

    #[test]
    fn suggestions_tolerate_unknown_types_and_clamp_confidence() {
        let parsed: SuggestionResponse = serde_json::from_value(serde_json::json!({
            "suggestions": [
                {
                    "type": "landmark-regions",
                    "element": "div",
                    "issue": "No main landmark",
                    "suggestion": "Wrap content in <main>",
                    "confidence": 1.7,
                    "autoFixable": false
                },
                {
                    "type": "aria-label",
                    "element": "button.close",
                    "issue": "Button has no name",
                    "suggestion": "Close dialog",
                    "confidence": 0.8,
                    "autoFixable": true,
                    "code": null,
                    "componentId": "btn-7"
                }
            ]
        }))
        .expect("response parses");

        assert_eq!(parsed.suggestions[0].kind, SuggestionType::Unknown);
        assert_eq!(parsed.suggestions[0].confidence, 1.0);
        assert_eq!(parsed.suggestions[1].kind, SuggestionType::AriaLabel);
        assert_eq!(parsed.suggestions[1].component_id.as_deref(), Some("btn-7"));
    }
}
