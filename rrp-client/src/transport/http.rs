//! HTTP transport backed by reqwest

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};

use super::Transport;
use crate::error::{mapping, ClientError, ErrorContext, Result};
use crate::util::timed;

/// UserAgent structure for identifying the client to the server
#[derive(Debug, Clone)]
pub struct UserAgent {
    /// Application name
    pub app_name: String,

    /// Version string
    pub version: String,

    /// Optional extra info
    pub extra: Option<String>,
}

impl Default for UserAgent {
    fn default() -> Self {
        Self {
            app_name: "rrp-client".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            extra: None,
        }
    }
}

impl fmt::Display for UserAgent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.app_name, self.version)?;

        if let Some(ref extra) = self.extra {
            write!(f, " ({})", extra)?;
        }

        Ok(())
    }
}

/// Posts envelopes as JSON over HTTP(S).
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http_client: Client,
}

impl HttpTransport {
    /// Build a transport with the given client settings.
    ///
    /// The timeout, if any, surfaces as a transport failure of the call.
    pub fn new(
        user_agent: &str,
        timeout: Option<Duration>,
        custom_headers: &HashMap<String, String>,
        compression: bool,
    ) -> Result<Self> {
        let mut headers = HeaderMap::new();
        for (key, value) in custom_headers {
            let header_name = HeaderName::from_str(key)
                .map_err(|e| ClientError::configuration(format!("Invalid header name: {}", e)))?;

            let header_value = HeaderValue::from_str(value)
                .map_err(|e| ClientError::configuration(format!("Invalid header value: {}", e)))?;

            headers.insert(header_name, header_value);
        }

        let mut builder = Client::builder()
            .user_agent(user_agent)
            .default_headers(headers)
            .gzip(compression);

        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let http_client = builder
            .build()
            .map_err(|e| ClientError::configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { http_client })
    }

    /// Use an already configured reqwest client
    pub fn from_client(http_client: Client) -> Self {
        Self { http_client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post(&self, endpoint: &str, envelope: Value) -> Result<Value> {
        debug!(endpoint, "posting request envelope");

        let (outcome, elapsed) = timed(self.http_client.post(endpoint).json(&envelope).send()).await;

        let response = outcome.map_err(|e| {
            warn!(endpoint, error = %e, "request envelope could not be sent");
            ClientError::from(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = match response.text().await {
                Ok(body) => body,
                Err(e) => format!("Failed to read error response: {}", e),
            };

            let mut context = ErrorContext::for_source("http_transport").endpoint(endpoint);
            let error = mapping::map_http_error(status, &body, &mut context);
            warn!(endpoint, status = status.as_u16(), error = %error, "endpoint rejected request");
            return Err(error.with_context(context));
        }

        let json = response.json::<Value>().await.map_err(|e| {
            ClientError::parsing(format!("Failed to parse response envelope: {}", e)).with_context(
                ErrorContext::for_source("http_transport")
                    .endpoint(endpoint)
                    .status_code(status.as_u16()),
            )
        })?;

        debug!(
            endpoint,
            status = status.as_u16(),
            elapsed_ms = elapsed.as_millis() as u64,
            "received response envelope"
        );

        Ok(json)
    }
}
