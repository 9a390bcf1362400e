//! Requests and their response history

use std::any::Any;
use std::collections::BTreeSet;

use serde::de::DeserializeOwned;
use serde::{Serialize, Serializer};

use crate::error::Result;
use crate::models::envelope::Verb;
use crate::models::response::Response;

/// Body of a request for one server-side operation.
///
/// `TYPE_NAME` is the fully qualified server type the body maps to; it is
/// written as `$type` ahead of every other member on the wire.
pub trait RequestBody: Serialize + Send + Sync + 'static {
    /// Wire type name of the server-side request
    const TYPE_NAME: &'static str;

    /// Typed response the server answers this request with
    type Response: DeserializeOwned;
}

/// Type-erased view of a request, handed to interceptors.
pub trait RemoteRequest: Send + Sync {
    /// Unique id of the request
    fn id(&self) -> &str;

    /// Wire type name
    fn type_name(&self) -> &str;

    /// Source ids of validation messages the caller has acknowledged
    fn omit_validation_source_ids(&self) -> &BTreeSet<String>;

    /// Mutable access to the acknowledged validation ids
    fn omit_validation_source_ids_mut(&mut self) -> &mut BTreeSet<String>;

    /// All responses, most recent first
    fn responses(&self) -> &[Response];

    /// The most recent response, if the request was dispatched before
    fn response(&self) -> Option<&Response> {
        self.responses().first()
    }

    /// The concrete request, for downcasting
    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<'r> dyn RemoteRequest + 'r {
    /// The typed request, if its body is a `B`
    pub fn downcast_ref<B: RequestBody>(&self) -> Option<&Request<B>> {
        self.as_any().downcast_ref()
    }

    /// The typed request for rewriting before it is sent, if its body is a `B`
    pub fn downcast_mut<B: RequestBody>(&mut self) -> Option<&mut Request<B>> {
        self.as_any_mut().downcast_mut()
    }
}

/// A request for a server-side operation plus everything the client tracks
/// about it.
#[derive(Debug, Clone)]
pub struct Request<B> {
    id: String,
    omit_validation_source_ids: BTreeSet<String>,
    responses: Vec<Response>,
    body: B,
}

impl<B: RequestBody> Request<B> {
    /// Create a request with a fresh unique id
    pub fn new(body: B) -> Self {
        Self::with_id(crate::util::generate_request_id(), body)
    }

    /// Create a request with a caller-chosen id
    pub fn with_id(id: impl Into<String>, body: B) -> Self {
        Self {
            id: id.into(),
            omit_validation_source_ids: BTreeSet::new(),
            responses: Vec::new(),
            body,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// All responses, most recent first
    pub fn responses(&self) -> &[Response] {
        &self.responses
    }

    /// The most recent response
    pub fn response(&self) -> Option<&Response> {
        self.responses.first()
    }

    pub fn body(&self) -> &B {
        &self.body
    }

    pub fn body_mut(&mut self) -> &mut B {
        &mut self.body
    }

    pub fn into_body(self) -> B {
        self.body
    }

    /// Silence a validation message on the next dispatch
    pub fn omit_validation(&mut self, source_id: impl Into<String>) {
        self.omit_validation_source_ids.insert(source_id.into());
    }

    /// Acknowledge every omittable validation message of `response`, nested
    /// messages included. Returns how many ids were newly added.
    pub fn acknowledge_validations(&mut self, response: &Response) -> usize {
        response
            .all_messages()
            .filter(|m| m.is_omittable_validation)
            .filter(|m| self.omit_validation_source_ids.insert(m.source_id.clone()))
            .count()
    }

    /// Record a new response as the most recent one.
    pub(crate) fn add_response(&mut self, response: Response) {
        self.responses.insert(0, response);
    }

    /// The most recent response read as the body's typed response
    pub fn typed_response(&self) -> Result<Option<B::Response>> {
        self.responses.first().map(Response::payload_as).transpose()
    }

    /// Owned, type-erased copy of the request for broadcasting
    pub fn snapshot(&self, verb: Verb) -> CompletedRequest {
        CompletedRequest {
            id: self.id.clone(),
            type_name: B::TYPE_NAME,
            verb,
            omit_validation_source_ids: self.omit_validation_source_ids.clone(),
            responses: self.responses.clone(),
        }
    }
}

impl<B: RequestBody> RemoteRequest for Request<B> {
    fn id(&self) -> &str {
        Request::id(self)
    }

    fn type_name(&self) -> &str {
        B::TYPE_NAME
    }

    fn omit_validation_source_ids(&self) -> &BTreeSet<String> {
        &self.omit_validation_source_ids
    }

    fn omit_validation_source_ids_mut(&mut self) -> &mut BTreeSet<String> {
        &mut self.omit_validation_source_ids
    }

    fn responses(&self) -> &[Response] {
        Request::responses(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WireRequest<'a, B> {
    #[serde(rename = "$type")]
    type_name: &'static str,
    id: &'a str,
    omit_validation_source_ids: &'a BTreeSet<String>,
    #[serde(flatten)]
    body: &'a B,
}

impl<B: RequestBody> Serialize for Request<B> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        WireRequest {
            type_name: B::TYPE_NAME,
            id: &self.id,
            omit_validation_source_ids: &self.omit_validation_source_ids,
            body: &self.body,
        }
        .serialize(serializer)
    }
}

/// A dispatched request as published on the global channel.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletedRequest {
    pub id: String,
    pub type_name: &'static str,
    pub verb: Verb,
    pub omit_validation_source_ids: BTreeSet<String>,
    /// Responses, most recent first
    pub responses: Vec<Response>,
}

impl CompletedRequest {
    /// The response produced by the dispatch that published this snapshot
    pub fn response(&self) -> Option<&Response> {
        self.responses.first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    use crate::models::message::ResponseMessage;

    #[derive(Debug, Clone, Serialize)]
    #[serde(rename_all = "camelCase")]
    struct CancelOrder {
        order_number: u32,
    }

    #[derive(Debug, Deserialize)]
    struct CancelOrderResponse {
        failed: bool,
    }

    impl RequestBody for CancelOrder {
        const TYPE_NAME: &'static str = "Shop.Orders.CancelOrderRequest, Shop";
        type Response = CancelOrderResponse;
    }

    #[test]
    fn test_wire_shape_puts_type_first() {
        let mut request = Request::with_id("req-1", CancelOrder { order_number: 7 });
        request.omit_validation("Orders.Late");

        let text = serde_json::to_string(&request).unwrap();
        assert!(text.starts_with(r#"{"$type":"Shop.Orders.CancelOrderRequest, Shop""#));

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["id"], "req-1");
        assert_eq!(value["orderNumber"], 7);
        assert_eq!(value["omitValidationSourceIds"], json!(["Orders.Late"]));
    }

    #[test]
    fn test_history_is_most_recent_first() {
        let mut request = Request::new(CancelOrder { order_number: 1 });
        assert!(request.response().is_none());
        assert!(request.typed_response().unwrap().is_none());

        let mut first = Response::new();
        first.id = Some("first".into());
        let mut second = Response::new();
        second.id = Some("second".into());
        second.failed = true;

        request.add_response(first);
        request.add_response(second);

        assert_eq!(request.responses().len(), 2);
        assert_eq!(request.response().unwrap().id.as_deref(), Some("second"));
        assert!(request.typed_response().unwrap().unwrap().failed);
    }

    #[test]
    fn test_acknowledge_validations_collects_nested_ids() {
        let mut response = Response::new();
        response.messages.push(
            ResponseMessage::new("Orders.Summary", "2 warnings", None)
                .with_nested(ResponseMessage::new("Orders.Late", "late", None).omittable())
                .with_nested(ResponseMessage::new("Orders.Big", "big", None).omittable()),
        );
        response.messages.push(ResponseMessage::new("Orders.Info", "fyi", None));

        let mut request = Request::new(CancelOrder { order_number: 1 });
        request.omit_validation("Orders.Late");

        assert_eq!(request.acknowledge_validations(&response), 1);
        let ids: Vec<&str> = request.omit_validation_source_ids().iter().map(String::as_str).collect();
        assert_eq!(ids, vec!["Orders.Big", "Orders.Late"]);
    }

    #[test]
    fn test_downcast_reaches_typed_body() {
        #[derive(Debug, Serialize)]
        struct ReopenOrder;

        impl RequestBody for ReopenOrder {
            const TYPE_NAME: &'static str = "Shop.Orders.ReopenOrderRequest, Shop";
            type Response = CancelOrderResponse;
        }

        let mut request = Request::with_id("req-2", CancelOrder { order_number: 3 });
        let erased: &mut dyn RemoteRequest = &mut request;

        assert!(erased.downcast_ref::<ReopenOrder>().is_none());
        erased.downcast_mut::<CancelOrder>().unwrap().body_mut().order_number = 30;
        assert_eq!(erased.downcast_ref::<CancelOrder>().unwrap().id(), "req-2");

        assert_eq!(request.body().order_number, 30);
    }
}
