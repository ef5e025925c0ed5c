use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde_json::json;
use tracing::warn;

use crate::audit::RuleAuditor;
use crate::error::AppError;
use crate::remediation::{AltTextRequest, SuggestionOracle, SuggestionRequest};
use crate::service::{AccessibilityService, AnalyzeRequest, RemediateRequest, ServiceError};

/// Router exposing analysis, suggestion, alt-text and remediation endpoints.
pub fn accessibility_router<A, S>(service: Arc<AccessibilityService<A, S>>) -> Router
where
    A: RuleAuditor + 'static,
    S: SuggestionOracle + 'static,
{
    Router::new()
        .route("/api/v1/analyze", post(analyze_handler::<A, S>))
        .route("/api/v1/analyze/latest", get(latest_handler::<A, S>))
        .route("/api/v1/suggestions", post(suggestions_handler::<A, S>))
        .route("/api/v1/alt-text", post(alt_text_handler::<A, S>))
        .route("/api/v1/remediate", post(remediate_handler::<A, S>))
        .with_state(service)
}

fn failure(err: ServiceError) -> Response {
    if let ServiceError::Analysis(inner) = &err {
        if inner.is_retryable() {
            warn!(error = %inner, "analysis failed; client may retry");
        }
    }
    AppError::from(err).into_response()
}

pub(crate) async fn analyze_handler<A, S>(
    State(service): State<Arc<AccessibilityService<A, S>>>,
    axum::Json(request): axum::Json<AnalyzeRequest>,
) -> Response
where
    A: RuleAuditor + 'static,
    S: SuggestionOracle + 'static,
{
    match service.analyze(&request).await {
        Ok(report) => (StatusCode::OK, axum::Json(report)).into_response(),
        Err(err) => failure(err),
    }
}

pub(crate) async fn latest_handler<A, S>(
    State(service): State<Arc<AccessibilityService<A, S>>>,
) -> Response
where
    A: RuleAuditor + 'static,
    S: SuggestionOracle + 'static,
{
    match service.latest() {
        Some(result) => (StatusCode::OK, axum::Json(result)).into_response(),
        None => {
            let payload = json!({
                "error": "no analysis has completed yet",
            });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn suggestions_handler<A, S>(
    State(service): State<Arc<AccessibilityService<A, S>>>,
    axum::Json(request): axum::Json<SuggestionRequest>,
) -> Response
where
    A: RuleAuditor + 'static,
    S: SuggestionOracle + 'static,
{
    match service.suggestions(&request).await {
        Ok(suggestions) => {
            let payload = json!({ "suggestions": suggestions });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(err) => failure(err),
    }
}

pub(crate) async fn alt_text_handler<A, S>(
    State(service): State<Arc<AccessibilityService<A, S>>>,
    axum::Json(request): axum::Json<AltTextRequest>,
) -> Response
where
    A: RuleAuditor + 'static,
    S: SuggestionOracle + 'static,
{
    match service.alt_text(&request).await {
        Ok(alt_text) => {
            let payload = json!({ "altText": alt_text });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(err) => failure(err),
    }
}

pub(crate) async fn remediate_handler<A, S>(
    State(service): State<Arc<AccessibilityService<A, S>>>,
    axum::Json(request): axum::Json<RemediateRequest>,
) -> Response
where
    A: RuleAuditor + 'static,
    S: SuggestionOracle + 'static,
{
    match service.remediate(&request) {
        Ok(outcome) => (StatusCode::OK, axum::Json(outcome)).into_response(),
        Err(err) => failure(err),
    }
}
