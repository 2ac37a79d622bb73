use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::request::{Envelope, PredictionRequest, ShareRequest};
use super::result::PredictionResult;
use super::share::ShareableOdds;
use crate::config::ApiConfig;

pub const PREDICT_PATH: &str = "/predict";
pub const DEMO_LOGIN_PATH: &str = "/auth/demo-login";
pub const SHAREABLE_ODDS_PATH: &str = "/shareable-odds";

const MESSAGE_LIMIT: usize = 200;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{endpoint} responded with {status}: {message}")]
    Status {
        endpoint: String,
        status: u16,
        message: String,
    },
    #[error("{endpoint} returned a body that is not JSON: {source}")]
    MalformedBody {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("{endpoint} response has no {field}")]
    MissingField {
        endpoint: String,
        field: &'static str,
    },
}

impl ApiError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Status { status: 401, .. })
    }
}

/// Remote prediction service.
#[async_trait]
pub trait PredictionApi: Send + Sync {
    async fn predict(
        &self,
        request: &PredictionRequest,
        token: Option<&str>,
    ) -> Result<PredictionResult, ApiError>;

    /// Exchange the demo credentials for an access token.
    async fn demo_login(&self) -> Result<String, ApiError>;

    async fn shareable_odds(
        &self,
        request: &ShareRequest,
        token: Option<&str>,
    ) -> Result<ShareableOdds, ApiError>;
}

/// [`PredictionApi`] over HTTP with a shared connection pool.
#[derive(Debug, Clone)]
pub struct HttpPredictionClient {
    http: reqwest::Client,
    api: ApiConfig,
}

impl HttpPredictionClient {
    pub fn new(api: ApiConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(api.timeout)
            .build()
            .map_err(ApiError::Client)?;
        Ok(Self { http, api })
    }

    pub fn base_url(&self) -> &str {
        &self.api.base_url
    }

    async fn post_json<B>(&self, path: &str, body: &B, token: Option<&str>) -> Result<Value, ApiError>
    where
        B: Serialize + ?Sized + Sync,
    {
        let endpoint = self.api.endpoint(path);
        debug!(%endpoint, authenticated = token.is_some(), "posting to prediction service");

        let mut builder = self.http.post(&endpoint).json(body);
        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }

        let response = builder
            .send()
            .await
            .map_err(|source| ApiError::Transport {
                endpoint: endpoint.clone(),
                source,
            })?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|source| ApiError::Transport {
                endpoint: endpoint.clone(),
                source,
            })?;

        if !status.is_success() {
            let message = error_message(&text)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string());
            warn!(%endpoint, status = status.as_u16(), %message, "prediction service rejected request");
            return Err(ApiError::Status {
                endpoint,
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&text).map_err(|source| ApiError::MalformedBody { endpoint, source })
    }
}

#[async_trait]
impl PredictionApi for HttpPredictionClient {
    async fn predict(
        &self,
        request: &PredictionRequest,
        token: Option<&str>,
    ) -> Result<PredictionResult, ApiError> {
        let body = Envelope {
            prediction_data: request,
        };
        let data = self.post_json(PREDICT_PATH, &body, token).await?;
        Ok(PredictionResult::from_value(&data))
    }

    async fn demo_login(&self) -> Result<String, ApiError> {
        let data = self
            .post_json(DEMO_LOGIN_PATH, &serde_json::json!({ "demo": true }), None)
            .await?;
        data.get("access_token")
            .and_then(Value::as_str)
            .filter(|token| !token.is_empty())
            .map(str::to_string)
            .ok_or_else(|| ApiError::MissingField {
                endpoint: self.api.endpoint(DEMO_LOGIN_PATH),
                field: "access_token",
            })
    }

    async fn shareable_odds(
        &self,
        request: &ShareRequest,
        token: Option<&str>,
    ) -> Result<ShareableOdds, ApiError> {
        let body = Envelope {
            prediction_data: request,
        };
        let data = self.post_json(SHAREABLE_ODDS_PATH, &body, token).await?;
        ShareableOdds::from_value(&data).ok_or_else(|| ApiError::MissingField {
            endpoint: self.api.endpoint(SHAREABLE_ODDS_PATH),
            field: "sharing_data",
        })
    }
}

/// Prefer the service's own `error`/`detail` text, else a trimmed body.
fn error_message(body: &str) -> Option<String> {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        let detail = ["error", "detail", "message"]
            .iter()
            .find_map(|key| value.get(*key).and_then(Value::as_str));
        if let Some(detail) = detail {
            return Some(detail.to_string());
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.chars().take(MESSAGE_LIMIT).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_message_prefers_service_detail() {
        assert_eq!(
            error_message(r#"{"error":"goal too vague"}"#).as_deref(),
            Some("goal too vague")
        );
        assert_eq!(
            error_message(r#"{"detail":"Not authenticated"}"#).as_deref(),
            Some("Not authenticated")
        );
        assert_eq!(error_message("  upstream timeout  ").as_deref(), Some("upstream timeout"));
        assert_eq!(error_message(""), None);
    }

    #[test]
    fn long_bodies_are_truncated() {
        let body = "x".repeat(MESSAGE_LIMIT * 2);
        assert_eq!(
            error_message(&body).map(|message| message.len()),
            Some(MESSAGE_LIMIT)
        );
    }

    #[test]
    fn only_401_counts_as_unauthorized() {
        let status = |status| ApiError::Status {
            endpoint: "http://localhost/predict".to_string(),
            status,
            message: String::new(),
        };
        assert!(status(401).is_unauthorized());
        assert!(!status(403).is_unauthorized());
    }

    #[test]
    fn client_builds_from_api_config() {
        let client =
            HttpPredictionClient::new(ApiConfig::new("http://127.0.0.1:9")).expect("client builds");
        assert_eq!(client.base_url(), "http://127.0.0.1:9");
    }
}
