//! HTTP plumbing shared by every service wrapper.
//!
//! The remote API wraps each response body in a JSON envelope:
//!
//! ```text
//! { "status": "success" | "error", "message": "...", "data": { ... } }
//! ```
//!
//! `ApiClient` owns the base URL, the device id header, and the bearer token
//! obtained at login. Request bodies and response payloads are never logged;
//! they carry PINs and credentials.

use std::fmt;
use std::time::Duration;

use log::{debug, warn};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Errors that can occur when calling the remote API.
#[derive(Debug)]
pub enum ApiError {
    /// Client misconfigured or missing credentials. Nothing was sent.
    Config(String),
    /// Network-level failure (timeout, DNS, connection refused).
    Network(String),
    /// The API answered with a non-2xx HTTP status.
    Api { status: u16, message: String },
    /// 2xx response whose envelope carries `status != "success"`.
    Rejected(String),
    /// Failed to decode the response body.
    Parse(String),
}

impl ApiError {
    /// The string shown to the user as a toast. Server-supplied messages are
    /// passed through opaquely; everything else collapses to a generic line.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Config(msg) => msg.clone(),
            ApiError::Network(_) => "Network error. Check your connection and try again.".to_string(),
            ApiError::Api { message, .. } | ApiError::Rejected(message) if !message.is_empty() => {
                message.clone()
            }
            _ => "Something went wrong. Please try again.".to_string(),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Config(msg) => write!(f, "config error: {msg}"),
            ApiError::Network(msg) => write!(f, "network error: {msg}"),
            ApiError::Api { status, message } => {
                write!(f, "API error (HTTP {status}): {message}")
            }
            ApiError::Rejected(msg) => write!(f, "request rejected: {msg}"),
            ApiError::Parse(msg) => write!(f, "parse error: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

/// The wire envelope wrapped around every response body.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub status: String,
    pub message: Option<String>,
    pub data: Option<T>,
}

pub struct ApiClient {
    base_url: String,
    device_id: String,
    token: Option<String>,
    timeout: Duration,
    http: reqwest::Client,
}

impl ApiClient {
    /// Creates a client for the given base URL and device identity.
    /// A trailing slash on the base URL is tolerated and stripped.
    pub fn new(base_url: impl Into<String>, device_id: impl Into<String>, timeout_secs: u64) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            device_id: device_id.into(),
            token: None,
            timeout: Duration::from_secs(timeout_secs),
            http: reqwest::Client::new(),
        }
    }

    /// Attaches the bearer token returned by a login call.
    pub fn authorize(&mut self, token: impl Into<String>) {
        self.token = Some(token.into());
    }

    /// Drops the bearer token; subsequent requests go out unauthenticated.
    pub fn deauthorize(&mut self) {
        self.token = None;
    }

    pub fn is_authorized(&self) -> bool {
        self.token.is_some()
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let mut req = self
            .http
            .request(method, url)
            .timeout(self.timeout)
            .header("X-Device-Id", &self.device_id);
        if let Some(token) = &self.token {
            req = req.header("Authorization", format!("Bearer {token}"));
        }
        req
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.get_json_query(path, &[]).await
    }

    pub(crate) async fn get_json_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ApiError> {
        debug!("GET {path}");
        let mut req = self.request(Method::GET, path);
        if !query.is_empty() {
            req = req.query(query);
        }
        let response = req
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        Self::read_envelope(path, response).await
    }

    pub(crate) async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        debug!("POST {path}");
        let response = self
            .request(Method::POST, path)
            .json(body)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        Self::read_envelope(path, response).await
    }

    async fn read_envelope<T: DeserializeOwned>(
        path: &str,
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let status = response.status();
        debug!("{path} answered HTTP {}", status.as_u16());
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        decode_body(path, status.as_u16(), &body)
    }
}

/// Pure decode step, split out so envelope handling is testable without a
/// live socket. `http_status` is the already-read response status.
fn decode_body<T: DeserializeOwned>(
    path: &str,
    http_status: u16,
    body: &str,
) -> Result<T, ApiError> {
    if !(200..300).contains(&http_status) {
        // Prefer the envelope's message; fall back to the raw body so the
        // log line stays useful when a proxy answers with plain text.
        let message = serde_json::from_str::<Envelope<serde_json::Value>>(body)
            .ok()
            .and_then(|env| env.message)
            .unwrap_or_else(|| body.trim().to_string());
        warn!("{path} failed: HTTP {http_status} - {message}");
        return Err(ApiError::Api {
            status: http_status,
            message,
        });
    }

    let envelope: Envelope<T> =
        serde_json::from_str(body).map_err(|e| ApiError::Parse(format!("{path}: {e}")))?;

    if envelope.status != "success" {
        let message = envelope
            .message
            .unwrap_or_else(|| "request rejected".to_string());
        warn!("{path} rejected: {message}");
        return Err(ApiError::Rejected(message));
    }

    envelope
        .data
        .ok_or_else(|| ApiError::Parse(format!("{path}: envelope has no data field")))
}
