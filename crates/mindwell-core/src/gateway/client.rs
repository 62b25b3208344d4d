//! ApiClient: authenticated JSON requests against the MindWell backend.

use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use url::Url;

use crate::error::GatewayError;
use crate::storage::Config;

/// Client for the MindWell REST API.
///
/// Requests carry `Authorization: Bearer <token>` whenever a token is set.
/// Without one, requests go out unauthenticated; public endpoints such as
/// community posts still work. Every request is bounded by the configured
/// timeout and is never retried.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http_client: Client,
    base_url: Url,
    timeout_ms: u64,
    token: Option<String>,
}

/// A completed HTTP exchange whose status has not been judged yet.
#[derive(Debug)]
pub(crate) struct RawResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl RawResponse {
    /// Best human-readable message from an error body.
    pub fn error_message(&self) -> String {
        error_message(self.status, &self.body)
    }
}

impl ApiClient {
    /// Create a client for `base_url` with a per-request timeout.
    pub fn new(base_url: &str, timeout_ms: u64) -> Result<Self, GatewayError> {
        let mut base_url = Url::parse(base_url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        let http_client = Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .map_err(GatewayError::Network)?;
        Ok(Self {
            http_client,
            base_url,
            timeout_ms,
            token: None,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, GatewayError> {
        Self::new(&config.api_base_url(), config.api.timeout_ms)
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, GatewayError> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    /// Send a request and return the status and JSON body (Null when empty
    /// or not JSON) without interpreting the status.
    pub(crate) async fn send_raw(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> Result<RawResponse, GatewayError> {
        let url = self.endpoint(path)?;
        tracing::debug!(%method, %url, authenticated = self.token.is_some(), "api request");

        let mut request = self.http_client.request(method, url);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| self.transport_error(e))?;
        let status = response.status();
        let text = response.text().await.map_err(|e| self.transport_error(e))?;
        let body = serde_json::from_str(&text).unwrap_or(Value::Null);
        tracing::debug!(status = status.as_u16(), path, "api response");
        Ok(RawResponse { status, body })
    }

    /// Send a request and decode a 2xx body into `T`.
    ///
    /// 401 responses become [`GatewayError::Auth`]; any other non-2xx status
    /// becomes [`GatewayError::Api`].
    pub(crate) async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> Result<T, GatewayError> {
        let raw = self.send_raw(method, path, query, body).await?;
        if !raw.status.is_success() {
            return Err(classify_failure(&raw));
        }
        decode(path, raw.body)
    }

    fn transport_error(&self, err: reqwest::Error) -> GatewayError {
        if err.is_timeout() {
            GatewayError::Timeout {
                timeout_ms: self.timeout_ms,
            }
        } else {
            GatewayError::from(err)
        }
    }
}

pub(crate) fn classify_failure(raw: &RawResponse) -> GatewayError {
    let message = raw.error_message();
    if raw.status == StatusCode::UNAUTHORIZED {
        GatewayError::Auth(message)
    } else {
        GatewayError::Api {
            status: raw.status.as_u16(),
            message,
        }
    }
}

pub(crate) fn decode<T: DeserializeOwned>(endpoint: &str, body: Value) -> Result<T, GatewayError> {
    serde_json::from_value(body).map_err(|e| GatewayError::Decode {
        endpoint: endpoint.to_string(),
        message: e.to_string(),
    })
}

fn error_message(status: StatusCode, body: &Value) -> String {
    ["error", "message", "msg"]
        .iter()
        .find_map(|k| body.get(*k).and_then(Value::as_str))
        .map(str::to_string)
        .unwrap_or_else(|| format!("HTTP error! status: {}", status.as_u16()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn endpoint_keeps_base_path() {
        let client = ApiClient::new("https://example.com/mindwell", 1000).unwrap();
        assert_eq!(
            client.endpoint("/api/auth/login").unwrap().as_str(),
            "https://example.com/mindwell/api/auth/login"
        );
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        assert!(matches!(
            ApiClient::new("not a url", 1000),
            Err(GatewayError::InvalidUrl(_))
        ));
    }

    #[test]
    fn error_message_prefers_error_field() {
        let body = json!({"error": "Invalid credentials", "message": "ignored"});
        assert_eq!(error_message(StatusCode::UNAUTHORIZED, &body), "Invalid credentials");
        let body = json!({"message": "Content is required"});
        assert_eq!(error_message(StatusCode::BAD_REQUEST, &body), "Content is required");
        assert_eq!(
            error_message(StatusCode::BAD_GATEWAY, &Value::Null),
            "HTTP error! status: 502"
        );
    }

    #[test]
    fn unauthorized_is_auth_error() {
        let raw = RawResponse {
            status: StatusCode::UNAUTHORIZED,
            body: json!({"msg": "Token has expired"}),
        };
        assert!(matches!(classify_failure(&raw), GatewayError::Auth(m) if m == "Token has expired"));
        let raw = RawResponse {
            status: StatusCode::NOT_FOUND,
            body: Value::Null,
        };
        assert!(matches!(classify_failure(&raw), GatewayError::Api { status: 404, .. }));
    }
}
