//! Airtable request gateway
//!
//! Performs one authenticated JSON request per call and classifies the
//! outcome. Non-success responses are reduced to either the message the API
//! supplied or an opaque status code. Nothing here retries, paginates, or
//! logs request contents; diagnostics carry the method, path, and status
//! only.

use std::fmt;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method};
use serde_json::Value;
use thiserror::Error;

/// Gateway configuration
#[derive(Debug, Clone)]
pub struct AirtableConfig {
    /// API key sent as a bearer credential on every request
    pub api_key: String,
    /// REST endpoint, without a trailing slash
    pub base_url: String,
    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for AirtableConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://api.airtable.com/v0".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// The two failure shapes a non-success response reduces to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiFailure {
    /// The body carried `{"error": {"message": ...}}`
    Remote { status: u16, message: String },
    /// The body was empty, unparsable, or missing a message
    Status(u16),
}

impl fmt::Display for ApiFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiFailure::Remote { message, .. } => write!(f, "{message}"),
            ApiFailure::Status(status) => write!(f, "Airtable API error: {status}"),
        }
    }
}

/// Gateway errors
#[derive(Debug, Error)]
pub enum AirtableError {
    #[error("Airtable client not configured: {0}")]
    NotConfigured(String),

    /// The API answered with a non-success status
    #[error("{0}")]
    Api(ApiFailure),

    #[error("Network error: {0}")]
    Network(String),

    /// A success response whose body was not valid JSON
    #[error("Invalid response from Airtable: {0}")]
    InvalidResponse(String),
}

/// Authenticated HTTP gateway to the Airtable REST API
pub struct AirtableClient {
    config: AirtableConfig,
    client: Client,
    auth_header: HeaderValue,
}

impl AirtableClient {
    /// Create a new gateway. Fails when the API key is empty or unusable as
    /// a header value.
    pub fn new(config: AirtableConfig) -> Result<Self, AirtableError> {
        if config.api_key.is_empty() {
            return Err(AirtableError::NotConfigured(
                "Airtable API key is required".to_string(),
            ));
        }

        let mut auth_header = HeaderValue::from_str(&format!("Bearer {}", config.api_key))
            .map_err(|_| {
                AirtableError::NotConfigured(
                    "Airtable API key contains characters not allowed in a header".to_string(),
                )
            })?;
        // Marks the credential sensitive so it is redacted from Debug output
        auth_header.set_sensitive(true);

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AirtableError::Network(e.to_string()))?;

        Ok(Self {
            config,
            client,
            auth_header,
        })
    }

    /// Perform one authenticated JSON request.
    ///
    /// `path` is appended to the configured endpoint and must begin with
    /// `/`. A query string may be included in `path`.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value, AirtableError> {
        self.request_with_headers(method, path, body, HeaderMap::new())
            .await
    }

    /// Same as [`AirtableClient::request`], with extra headers that override
    /// the defaults.
    pub async fn request_with_headers(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        extra_headers: HeaderMap,
    ) -> Result<Value, AirtableError> {
        let url = format!("{}{}", self.config.base_url, path);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, self.auth_header.clone());
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        for (name, value) in &extra_headers {
            headers.insert(name.clone(), value.clone());
        }

        tracing::debug!(method = %method, path, "Airtable request");

        let mut request = self.client.request(method, url).headers(headers);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AirtableError::Network(e.to_string()))?;

        let status = response.status();
        tracing::debug!(status = status.as_u16(), path, "Airtable response");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AirtableError::Api(classify_failure(status.as_u16(), &body)));
        }

        response
            .json()
            .await
            .map_err(|e| AirtableError::InvalidResponse(e.to_string()))
    }
}

/// Classify a non-success response body (pure function)
fn classify_failure(status: u16, body: &str) -> ApiFailure {
    match serde_json::from_str::<Value>(body) {
        Ok(parsed) => match parsed
            .get("error")
            .and_then(|error| error.get("message"))
            .and_then(Value::as_str)
        {
            Some(message) => ApiFailure::Remote {
                status,
                message: message.to_string(),
            },
            None => ApiFailure::Status(status),
        },
        Err(_) => ApiFailure::Status(status),
    }
}
