use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{
    AltTextRequest, AltTextResponse, RemediationSuggestion, SuggestionOracle, SuggestionRequest,
    SuggestionResponse,
};
use crate::config::RemediationConfig;
use crate::oracle::OracleError;

/// Suggestion oracle reached over HTTP.
///
/// `POST {base}/generate-suggestions` with `{htmlContent, issues}` answers
/// `{suggestions}`; `POST {base}/generate-alt-text` with `{imageUrl, context}`
/// answers `{altText}`.
#[derive(Debug, Clone)]
pub struct HttpSuggestionOracle {
    client: Client,
    base_url: String,
}

impl HttpSuggestionOracle {
    pub fn new(base_url: impl Into<String>, config: &RemediationConfig) -> Result<Self, OracleError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|err| OracleError::unavailable(format!("failed to build HTTP client: {err}")))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R, OracleError>
    where
        B: Serialize + ?Sized + Sync,
        R: DeserializeOwned,
    {
        let response = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(|err| OracleError::unavailable(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(OracleError::unavailable(format!(
                "{path} responded with {status}"
            )));
        }

        response
            .json::<R>()
            .await
            .map_err(|err| OracleError::malformed(err.to_string()))
    }
}

#[async_trait]
impl SuggestionOracle for HttpSuggestionOracle {
    async fn suggest(
        &self,
        request: &SuggestionRequest,
    ) -> Result<Vec<RemediationSuggestion>, OracleError> {
        let response: SuggestionResponse = self.post_json("generate-suggestions", request).await?;
        Ok(response.suggestions)
    }

    async fn describe_image(&self, request: &AltTextRequest) -> Result<String, OracleError> {
        let response: AltTextResponse = self.post_json("generate-alt-text", request).await?;
        response
            .alt_text
            .ok_or_else(|| OracleError::malformed("response did not include altText"))
    }
}

/// Oracle selected from configuration: HTTP when an endpoint is set, otherwise
/// a disabled oracle that proposes nothing.
#[derive(Debug, Clone)]
pub enum ConfiguredSuggestionOracle {
    Http(HttpSuggestionOracle),
    Disabled,
}

impl ConfiguredSuggestionOracle {
    pub fn from_config(config: &RemediationConfig) -> Result<Self, OracleError> {
        match config.endpoint.as_deref() {
            Some(endpoint) => Ok(Self::Http(HttpSuggestionOracle::new(endpoint, config)?)),
            None => Ok(Self::Disabled),
        }
    }
}

#[async_trait]
impl SuggestionOracle for ConfiguredSuggestionOracle {
    async fn suggest(
        &self,
        request: &SuggestionRequest,
    ) -> Result<Vec<RemediationSuggestion>, OracleError> {
        match self {
            Self::Http(oracle) => oracle.suggest(request).await,
            Self::Disabled => Ok(Vec::new()),
        }
    }

    async fn describe_image(&self, request: &AltTextRequest) -> Result<String, OracleError> {
        match self {
            Self::Http(oracle) => oracle.describe_image(request).await,
            Self::Disabled => Err(OracleError::unavailable(
                "no remediation endpoint configured",
            )),
        }
    }
}
