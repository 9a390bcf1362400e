//! Error handling for the RRP client
//!
//! This module provides the error system used across the client:
//! - Categorizes errors by type (network, timeout, HTTP status, codec, etc.)
//! - Adds rich context to errors for better debugging
//! - Produces the JSON dump carried by synthetic failure responses
//! - Provides a convenient Result type alias
//!
//! Note that the dispatcher never returns these errors to its callers; they
//! surface from the transport and codec layers and are translated into
//! failed responses by [`crate::core::Dispatcher`].

use std::fmt;
use std::collections::HashMap;
use serde_json::{json, Value};
use thiserror::Error;

pub mod mapping;

/// Result type for RRP client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Main error type for the RRP client
#[derive(Error, Debug)]
pub enum ClientError {
    /// Network or connection errors
    #[error("Network error: {0}")]
    Network(String),

    /// Timeout errors
    #[error("Timeout error: {0}")]
    Timeout(String),

    /// Non-success HTTP status returned by the endpoint
    #[error("HTTP error: {0}")]
    Http(String),

    /// Response parsing errors
    #[error("Parsing error: {0}")]
    Parsing(String),

    /// Request serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Envelope shape errors (missing response body or metadata)
    #[error("Codec error: {0}")]
    Codec(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Unexpected or internal errors
    #[error("Internal error: {0}")]
    Internal(String),

    /// Errors with additional context
    #[error("{inner}")]
    WithContext {
        inner: Box<ClientError>,
        context: ErrorContext,
    },
}

impl ClientError {
    /// Create a network error
    pub fn network(message: impl Into<String>) -> Self {
        ClientError::Network(message.into())
    }

    /// Create a timeout error
    pub fn timeout(message: impl Into<String>) -> Self {
        ClientError::Timeout(message.into())
    }

    /// Create an HTTP status error
    pub fn http(message: impl Into<String>) -> Self {
        ClientError::Http(message.into())
    }

    /// Create a parsing error
    pub fn parsing(message: impl Into<String>) -> Self {
        ClientError::Parsing(message.into())
    }

    /// Create a serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        ClientError::Serialization(message.into())
    }

    /// Create a codec error
    pub fn codec(message: impl Into<String>) -> Self {
        ClientError::Codec(message.into())
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        ClientError::Configuration(message.into())
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        ClientError::Internal(message.into())
    }

    /// Add context to an existing error
    pub fn with_context(self, context: ErrorContext) -> Self {
        ClientError::WithContext {
            inner: Box::new(self),
            context,
        }
    }

    /// Add a single context key/value to an existing error
    pub fn with_context_value(self, key: impl Into<String>, value: impl fmt::Display) -> Self {
        let mut context = ErrorContext::new();
        context.add(key, value);
        self.with_context(context)
    }

    /// The error without any context wrappers
    pub fn root(&self) -> &ClientError {
        match self {
            ClientError::WithContext { inner, .. } => inner.root(),
            other => other,
        }
    }

    /// Short machine-readable name of the error kind
    pub fn kind(&self) -> &'static str {
        match self.root() {
            ClientError::Network(_) => "network",
            ClientError::Timeout(_) => "timeout",
            ClientError::Http(_) => "http",
            ClientError::Parsing(_) => "parsing",
            ClientError::Serialization(_) => "serialization",
            ClientError::Codec(_) => "codec",
            ClientError::Configuration(_) => "configuration",
            ClientError::Internal(_) => "internal",
            ClientError::WithContext { .. } => "unknown",
        }
    }

    /// The bare message of the root error, without the kind prefix
    pub fn message(&self) -> &str {
        match self.root() {
            ClientError::Network(m)
            | ClientError::Timeout(m)
            | ClientError::Http(m)
            | ClientError::Parsing(m)
            | ClientError::Serialization(m)
            | ClientError::Codec(m)
            | ClientError::Configuration(m)
            | ClientError::Internal(m) => m,
            ClientError::WithContext { .. } => "",
        }
    }

    /// The context attached to this error, if any
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            ClientError::WithContext { context, .. } => Some(context),
            _ => None,
        }
    }

    /// Get the endpoint if available
    pub fn endpoint(&self) -> Option<&str> {
        self.context().and_then(|c| c.endpoint.as_deref())
    }

    /// Get the HTTP status code if available
    pub fn status_code(&self) -> Option<u16> {
        self.context().and_then(|c| c.status_code)
    }

    /// Serialized dump of the error, used as the complete text of
    /// synthetic failure messages.
    pub fn dump(&self) -> Value {
        let mut dump = json!({
            "kind": self.kind(),
            "message": self.message(),
        });

        if let Some(context) = self.context() {
            dump["context"] = context.to_json();
        }

        dump
    }
}

/// Error context information
#[derive(Debug, Clone)]
pub struct ErrorContext {
    /// Component that generated the error
    pub source: String,

    /// Time the error was recorded
    pub timestamp: Option<chrono::DateTime<chrono::Utc>>,

    /// HTTP status code if applicable
    pub status_code: Option<u16>,

    /// Request ID for tracing
    pub request_id: Option<String>,

    /// Endpoint that was called
    pub endpoint: Option<String>,

    /// Additional context data
    pub data: HashMap<String, String>,
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self {
            source: "unknown".to_string(),
            timestamp: Some(chrono::Utc::now()),
            status_code: None,
            request_id: None,
            endpoint: None,
            data: HashMap::new(),
        }
    }
}

impl ErrorContext {
    /// Create a new error context
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new error context for a specific component
    pub fn for_source(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            ..Self::default()
        }
    }

    /// Add an HTTP status code
    pub fn status_code(mut self, code: u16) -> Self {
        self.status_code = Some(code);
        self
    }

    /// Add a request ID
    pub fn request_id(mut self, id: impl Into<String>) -> Self {
        self.request_id = Some(id.into());
        self
    }

    /// Add an endpoint
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Add a context value
    pub fn add<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: fmt::Display,
    {
        self.data.insert(key.into(), value.to_string());
    }

    /// Add a context value and return self (builder pattern)
    pub fn with<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: fmt::Display,
    {
        self.add(key, value);
        self
    }

    fn to_json(&self) -> Value {
        json!({
            "source": self.source,
            "timestamp": self.timestamp.map(|t| t.to_rfc3339()),
            "statusCode": self.status_code,
            "requestId": self.request_id,
            "endpoint": self.endpoint,
            "data": self.data,
        })
    }
}

/// Convert reqwest errors to ClientError
impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        let mut context = ErrorContext::for_source("http_transport");
        if let Some(url) = err.url() {
            context = context.endpoint(url.as_str());
        }

        let client_error = if err.is_timeout() {
            ClientError::timeout(format!("Request timed out: {}", err))
        } else if err.is_connect() {
            ClientError::network(format!("Connection error: {}", err))
        } else if err.is_redirect() {
            ClientError::network(format!("Too many redirects: {}", err))
        } else if err.is_decode() {
            ClientError::parsing(format!("Response decode error: {}", err))
        } else if err.is_request() {
            ClientError::network(format!("Request failed: {}", err))
        } else {
            ClientError::internal(format!("HTTP client error: {}", err))
        };

        if let Some(status) = err.status() {
            client_error.with_context(context.status_code(status.as_u16()))
        } else {
            client_error.with_context(context)
        }
    }
}

/// Convert serde_json errors to ClientError
impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::parsing(format!("JSON error: {}", err))
            .with_context(ErrorContext::for_source("json"))
    }
}
