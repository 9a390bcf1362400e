//! Responses as seen by interceptors and callers

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{ClientError, Result};
use crate::models::message::{EventLevel, ResponseMessage};
use crate::sanitizer::WebValue;

/// Outcome of one dispatch of a request.
///
/// The four response-level fields are held explicitly; everything else the
/// server put into the response body is kept, sanitized, in `payload`.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    /// Id of the response
    pub id: Option<String>,

    /// Messages, in server order
    pub messages: Vec<ResponseMessage>,

    /// The server attempted the operation
    pub executed: bool,

    /// The operation did not succeed
    pub failed: bool,

    /// Remaining members of the response body
    #[serde(skip)]
    pub payload: WebValue,
}

impl Response {
    /// Create an empty response
    pub fn new() -> Self {
        Self {
            payload: WebValue::object(),
            ..Self::default()
        }
    }

    /// Failed response carrying a single message
    pub fn failure(id: Option<String>, message: ResponseMessage) -> Self {
        Self {
            id,
            messages: vec![message],
            executed: false,
            failed: true,
            payload: WebValue::object(),
        }
    }

    /// Whether any message, nested ones included, is at Error severity or worse
    pub fn has_errors(&self) -> bool {
        self.all_messages().any(|m| m.event_level.is_error())
    }

    /// All messages with the given severity, nested ones included
    pub fn messages_at(&self, level: EventLevel) -> Vec<&ResponseMessage> {
        self.all_messages().filter(|m| m.event_level == level).collect()
    }

    /// Depth-first iteration over every message of the response
    pub fn all_messages(&self) -> impl Iterator<Item = &ResponseMessage> {
        self.messages.iter().flat_map(ResponseMessage::walk)
    }

    /// Full response body as plain JSON: the payload members plus the four
    /// response-level fields.
    pub fn to_json(&self) -> serde_json::Value {
        let mut body = match self.payload.clone().into_json() {
            serde_json::Value::Object(map) => map,
            _ => serde_json::Map::new(),
        };

        if let Ok(serde_json::Value::Object(fields)) = serde_json::to_value(self) {
            body.extend(fields);
        }

        serde_json::Value::Object(body)
    }

    /// Deserialize the full response body into a typed response.
    pub fn payload_as<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_value(self.to_json()).map_err(|e| {
            ClientError::parsing(format!("Failed to read typed response: {}", e))
        })
    }
}
