use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

use crate::analysis::AnalysisError;
use crate::config::ConfigError;
use crate::content::ContentError;
use crate::oracle::OracleError;
use crate::service::ServiceError;
use crate::telemetry::TelemetryError;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Analysis(AnalysisError),
    Content(ContentError),
    Oracle(OracleError),
    InvalidRequest(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::Analysis(AnalysisError::EmptyContent)
            | AppError::Content(_)
            | AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Analysis(AnalysisError::Audit(_)) | AppError::Oracle(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn is_retryable(&self) -> bool {
        match self {
            AppError::Analysis(err) => err.is_retryable(),
            AppError::Oracle(_) => true,
            _ => false,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Analysis(err) => write!(f, "{}", err),
            AppError::Content(err) => write!(f, "{}", err),
            AppError::Oracle(err) => write!(f, "remediation oracle error: {}", err),
            AppError::InvalidRequest(message) => write!(f, "{}", message),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Analysis(err) => Some(err),
            AppError::Content(err) => Some(err),
            AppError::Oracle(err) => Some(err),
            AppError::InvalidRequest(_) => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = if self.is_retryable() {
            json!({ "error": self.to_string(), "retryable": true })
        } else {
            json!({ "error": self.to_string() })
        };
        (status, Json(body)).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<AnalysisError> for AppError {
    fn from(value: AnalysisError) -> Self {
        Self::Analysis(value)
    }
}

impl From<ContentError> for AppError {
    fn from(value: ContentError) -> Self {
        Self::Content(value)
    }
}

impl From<OracleError> for AppError {
    fn from(value: OracleError) -> Self {
        Self::Oracle(value)
    }
}

impl From<ServiceError> for AppError {
    fn from(value: ServiceError) -> Self {
        match value {
            ServiceError::Analysis(err) => Self::Analysis(err),
            ServiceError::Content(err) => Self::Content(err),
            other @ ServiceError::MissingImageUrl => Self::InvalidRequest(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_content_maps_to_bad_request() {
        let response = AppError::from(AnalysisError::EmptyContent).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn audit_failures_are_retryable_service_errors() {
        let err = AppError::from(AnalysisError::Audit(OracleError::unavailable("browser gone")));
        assert!(err.is_retryable());
        assert_eq!(err.into_response().status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn missing_image_url_is_a_bad_request() {
        let err = AppError::from(ServiceError::MissingImageUrl);
        assert_eq!(err.to_string(), "imageUrl required");
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }
}
