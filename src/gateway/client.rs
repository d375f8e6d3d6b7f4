//! HTTP client for the survey service API.
//!
//! Translates domain operations into authenticated JSON requests and
//! normalizes the heterogeneous reply shapes the backend is known to
//! produce. Response-count lookups are deliberately infallible: any
//! transport or decode failure resolves to zero so one bad lookup can
//! never take down a whole dashboard refresh.

use crate::auth::TokenProvider;
use crate::models::{NewResponse, NewSurvey, Survey, SurveyResponse};
use async_trait::async_trait;
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Failure of a primary gateway operation.
///
/// Only survey listing and the explicit CRUD calls surface these;
/// response-count lookups swallow them (see [`SurveyGateway::response_count`]).
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("cannot connect to survey service at {url}")]
    Connect { url: String },

    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("survey service returned {status} for {url}")]
    Status { status: StatusCode, url: String },

    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

impl TransportError {
    fn from_request(url: &str, source: reqwest::Error) -> Self {
        let url = url.to_string();
        if source.is_timeout() {
            TransportError::Timeout { url }
        } else if source.is_connect() {
            TransportError::Connect { url }
        } else if source.is_decode() {
            TransportError::Decode { url, source }
        } else {
            TransportError::Request { url, source }
        }
    }
}

/// Configuration for the gateway.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            timeout_seconds: 30,
        }
    }
}

/// The slice of the gateway the dashboard aggregator depends on.
///
/// Kept narrow so tests can substitute a scripted implementation.
#[async_trait]
pub trait SurveyApi: Send + Sync {
    /// Fetch every survey. Failure here is a hard failure; callers must
    /// not fold it into zero-valued statistics.
    async fn list_surveys(&self) -> Result<Vec<Survey>, TransportError>;

    /// Fetch the response count for one survey. Never fails: any
    /// transport or decode problem resolves to `0`.
    async fn response_count(&self, survey_id: i64) -> u64;
}

/// The recognized wire shapes of a response-count reply, in the order
/// they are tried. Anything else counts as zero.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CountPayload {
    Bare(u64),
    Keyed { count: u64 },
    Legacy { #[serde(rename = "responseCount")] response_count: u64 },
}

impl CountPayload {
    fn into_count(self) -> u64 {
        match self {
            CountPayload::Bare(count) => count,
            CountPayload::Keyed { count } => count,
            CountPayload::Legacy { response_count } => response_count,
        }
    }
}

/// Fold a count lookup outcome into the value the dashboard uses.
fn resolve_count(survey_id: i64, fetched: Result<CountPayload, TransportError>) -> u64 {
    match fetched {
        Ok(payload) => payload.into_count(),
        Err(err) => {
            debug!("response count for survey {survey_id} defaulted to 0: {err}");
            0
        }
    }
}

/// Authenticated HTTP client for the survey service.
pub struct SurveyGateway {
    http: reqwest::Client,
    base_url: String,
    tokens: Arc<dyn TokenProvider>,
}

impl SurveyGateway {
    /// Create a gateway. The token provider is consulted per request, so
    /// a session established later is picked up automatically.
    pub fn new(config: &GatewayConfig, tokens: Arc<dyn TokenProvider>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .expect("failed to build HTTP client");

        Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            tokens,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/api/surveys{}", self.base_url, path)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match self.tokens.current_token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn read_json<T: DeserializeOwned>(
        url: &str,
        response: reqwest::Response,
    ) -> Result<T, TransportError> {
        if !response.status().is_success() {
            return Err(TransportError::Status {
                status: response.status(),
                url: url.to_string(),
            });
        }
        response
            .json::<T>()
            .await
            .map_err(|e| TransportError::from_request(url, e))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, TransportError> {
        debug!("GET {url}");
        let response = self
            .authorized(self.http.get(url))
            .send()
            .await
            .map_err(|e| TransportError::from_request(url, e))?;
        Self::read_json(url, response).await
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        url: &str,
        body: &impl Serialize,
    ) -> Result<T, TransportError> {
        let response = self
            .authorized(request)
            .json(body)
            .send()
            .await
            .map_err(|e| TransportError::from_request(url, e))?;
        Self::read_json(url, response).await
    }

    /// Fetch a single survey by id.
    pub async fn survey(&self, id: i64) -> Result<Survey, TransportError> {
        let url = self.endpoint(&format!("/{id}"));
        self.get_json(&url).await
    }

    /// Create a new survey and return the stored entity.
    pub async fn create_survey(&self, payload: &NewSurvey) -> Result<Survey, TransportError> {
        let url = self.endpoint("/create");
        debug!("POST {url}");
        self.send_json(self.http.post(&url), &url, payload).await
    }

    /// Replace an existing survey.
    pub async fn update_survey(
        &self,
        id: i64,
        payload: &NewSurvey,
    ) -> Result<Survey, TransportError> {
        let url = self.endpoint(&format!("/{id}"));
        debug!("PUT {url}");
        self.send_json(self.http.put(&url), &url, payload).await
    }

    /// Delete a survey.
    pub async fn delete_survey(&self, id: i64) -> Result<(), TransportError> {
        let url = self.endpoint(&format!("/{id}"));
        debug!("DELETE {url}");
        let response = self
            .authorized(self.http.delete(&url))
            .send()
            .await
            .map_err(|e| TransportError::from_request(&url, e))?;

        if !response.status().is_success() {
            return Err(TransportError::Status {
                status: response.status(),
                url,
            });
        }
        Ok(())
    }

    /// Submit a response to a survey.
    pub async fn submit_response(
        &self,
        id: i64,
        payload: &NewResponse,
    ) -> Result<SurveyResponse, TransportError> {
        let url = self.endpoint(&format!("/{id}/respond"));
        debug!("POST {url}");
        self.send_json(self.http.post(&url), &url, payload).await
    }

    /// Fetch every response submitted to a survey.
    pub async fn responses(&self, id: i64) -> Result<Vec<SurveyResponse>, TransportError> {
        let url = self.endpoint(&format!("/{id}/responses"));
        self.get_json(&url).await
    }
}

#[async_trait]
impl SurveyApi for SurveyGateway {
    async fn list_surveys(&self) -> Result<Vec<Survey>, TransportError> {
        let url = self.endpoint("/all");
        self.get_json(&url).await
    }

    async fn response_count(&self, survey_id: i64) -> u64 {
        let url = self.endpoint(&format!("/{survey_id}/response-count"));
        let fetched = self.get_json::<CountPayload>(&url).await;
        resolve_count(survey_id, fetched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::StaticToken;

    fn decode(json: &str) -> Result<CountPayload, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[test]
    fn test_count_bare_number() {
        assert_eq!(decode("5").unwrap().into_count(), 5);
        assert_eq!(decode("0").unwrap().into_count(), 0);
    }

    #[test]
    fn test_count_keyed_object() {
        assert_eq!(decode(r#"{"count": 7}"#).unwrap().into_count(), 7);
    }

    #[test]
    fn test_count_legacy_field() {
        assert_eq!(decode(r#"{"responseCount": 3}"#).unwrap().into_count(), 3);
    }

    #[test]
    fn test_count_prefers_first_recognized_shape() {
        let both = r#"{"count": 7, "responseCount": 3}"#;
        assert_eq!(decode(both).unwrap().into_count(), 7);
    }

    #[test]
    fn test_count_rejects_unknown_shapes() {
        assert!(decode("{}").is_err());
        assert!(decode(r#""five""#).is_err());
        assert!(decode("-2").is_err());
        assert!(decode(r#"{"total": 4}"#).is_err());
    }

    #[test]
    fn test_resolve_count_defaults_failures_to_zero() {
        let err = TransportError::Status {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            url: "http://localhost:8080/api/surveys/1/response-count".to_string(),
        };
        assert_eq!(resolve_count(1, Err(err)), 0);
        assert_eq!(resolve_count(1, Ok(decode(r#"{"count": 9}"#).unwrap())), 9);
    }

    #[test]
    fn test_endpoint_building() {
        let config = GatewayConfig {
            base_url: "http://localhost:8080/".to_string(),
            timeout_seconds: 5,
        };
        let gateway = SurveyGateway::new(&config, Arc::new(StaticToken::new(None)));

        assert_eq!(
            gateway.endpoint("/all"),
            "http://localhost:8080/api/surveys/all"
        );
        assert_eq!(
            gateway.endpoint("/42/response-count"),
            "http://localhost:8080/api/surveys/42/response-count"
        );
    }

    #[test]
    fn test_transport_error_display() {
        let err = TransportError::Status {
            status: StatusCode::UNAUTHORIZED,
            url: "http://localhost:8080/api/surveys/all".to_string(),
        };
        let message = err.to_string();
        assert!(message.contains("401"));
        assert!(message.contains("/api/surveys/all"));
    }
}
