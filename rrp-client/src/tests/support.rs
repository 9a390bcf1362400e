//! Shared fixtures for the test modules

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize, Serializer};

use crate::error::ClientError;
use crate::interceptors::Interceptor;
use crate::models::{EventLevel, RemoteRequest, RequestBody, Response, ResponseMessage, Verb};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetOrder {
    pub order_number: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetOrderResponse {
    pub id: Option<String>,
    pub executed: bool,
    pub failed: bool,
    pub shipped_on: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub lines: Vec<OrderLine>,
}

#[derive(Debug, Deserialize)]
pub struct OrderLine {
    pub sku: String,
}

impl RequestBody for GetOrder {
    const TYPE_NAME: &'static str = "Shop.Orders.GetOrderRequest, Shop";
    type Response = GetOrderResponse;
}

/// Body that cannot be serialized
#[derive(Debug)]
pub struct Unserializable;

impl Serialize for Unserializable {
    fn serialize<S: Serializer>(&self, _serializer: S) -> std::result::Result<S::Ok, S::Error> {
        Err(serde::ser::Error::custom("body refuses to serialize"))
    }
}

impl RequestBody for Unserializable {
    const TYPE_NAME: &'static str = "Shop.Broken, Shop";
    type Response = serde_json::Value;
}

pub type Journal = Arc<Mutex<Vec<String>>>;

pub fn journal() -> Journal {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn entries(journal: &Journal) -> Vec<String> {
    journal.lock().unwrap().clone()
}

/// Records every hook call as `<name>.<hook>`.
pub struct Recorder {
    pub name: &'static str,
    pub journal: Journal,
    /// Translate transport errors into a successful response
    pub translate_errors: bool,
}

impl Recorder {
    pub fn new(name: &'static str, journal: &Journal) -> Self {
        Self {
            name,
            journal: journal.clone(),
            translate_errors: false,
        }
    }

    pub fn translating(mut self) -> Self {
        self.translate_errors = true;
        self
    }

    fn record(&self, hook: &str) {
        self.journal.lock().unwrap().push(format!("{}.{}", self.name, hook));
    }
}

#[async_trait]
impl Interceptor for Recorder {
    async fn on_request(&self, _request: &mut dyn RemoteRequest, _verb: Verb) {
        self.record("request");
    }

    async fn on_response(&self, _request: &dyn RemoteRequest, mut response: Response, _verb: Verb) -> Response {
        self.record("response");
        response.messages.push(
            ResponseMessage::new(format!("Seen.{}", self.name), self.name, None).with_level(EventLevel::Verbose),
        );
        response
    }

    async fn on_http_error(
        &self,
        request: &dyn RemoteRequest,
        _error: &ClientError,
        _verb: Verb,
    ) -> Option<Response> {
        self.record("http_error");
        if !self.translate_errors {
            return None;
        }

        let mut response = Response::new();
        response.id = Some(request.id().to_string());
        response.executed = true;
        response.messages.push(ResponseMessage::new(
            format!("Offline.{}", self.name),
            "Queued for later",
            None,
        ));
        Some(response)
    }
}
