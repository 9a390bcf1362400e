//! Wire envelopes exchanged with the WebApi endpoint

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ClientError, Result};
use crate::models::message::ResponseMessage;
use crate::sanitizer::WebValue;

/// What the server should do with a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Verb {
    /// Run the handler and commit its effects
    Execute,
    /// Validate and evaluate without committing anything
    Evaluate,
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verb::Execute => f.write_str("Execute"),
            Verb::Evaluate => f.write_str("Evaluate"),
        }
    }
}

/// Outbound envelope. The request itself is embedded by reference.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestEnvelope<'a, R> {
    pub verb: Verb,
    pub request_id: String,
    pub request: &'a R,
    pub omit_validation_source_ids: Vec<String>,
}

/// Response-level fields the server sends outside the response body.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResponseMetadata {
    pub id: Option<String>,
    pub messages: Vec<ResponseMessage>,
    pub executed: bool,
    pub failed: bool,
}

/// Inbound envelope, after sanitization.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResponseEnvelope {
    /// The response body
    pub response: Option<WebValue>,

    /// Authoritative response-level fields
    pub metadata: Option<ResponseMetadata>,
}

impl ResponseEnvelope {
    /// Read an envelope out of a sanitized value.
    ///
    /// A missing or null `response`/`metadata` member is kept as `None`; a
    /// metadata block of the wrong shape is an error.
    pub fn from_web_value(mut value: WebValue) -> Result<Self> {
        if value.as_object().is_none() {
            return Err(ClientError::codec("Response envelope is not an object"));
        }

        let response = value.take("response").filter(|r| !r.is_null());
        let metadata = match value.take("metadata").filter(|m| !m.is_null()) {
            Some(raw) => Some(serde_json::from_value(raw.into_json()).map_err(|e| {
                ClientError::codec(format!("Malformed response metadata: {}", e))
            })?),
            None => None,
        };

        Ok(Self { response, metadata })
    }
}
