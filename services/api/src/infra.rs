use access_lens::audit::HtmlRuleAuditor;
use access_lens::config::AppConfig;
use access_lens::error::AppError;
use access_lens::remediation::ConfiguredSuggestionOracle;
use access_lens::service::AccessibilityService;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

pub(crate) type LensService = AccessibilityService<HtmlRuleAuditor, ConfiguredSuggestionOracle>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Service wired with the built-in auditor and the configured remediation oracle.
pub(crate) fn build_service(config: &AppConfig) -> Result<LensService, AppError> {
    let oracle = ConfiguredSuggestionOracle::from_config(&config.remediation)?;
    if matches!(oracle, ConfiguredSuggestionOracle::Disabled) {
        tracing::debug!("no remediation endpoint configured; suggestions disabled");
    }

    Ok(AccessibilityService::new(
        Arc::new(HtmlRuleAuditor),
        Arc::new(oracle),
        config.audit.rules.clone(),
        &config.remediation,
    ))
}
