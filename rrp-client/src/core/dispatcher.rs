//! Dispatch engine
//!
//! One dispatch moves through
//! `Created → RequestIntercepted → Sent → {Succeeded | TransportFailed} →
//! ResponseIntercepted → Completed` and reaches `Completed` exactly once.
//! Whatever goes wrong on the way ends up as a failed [`Response`] in the
//! request's history; the caller never sees an error.

use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex};

use futures::FutureExt;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, trace, warn};

use super::builder::DispatcherBuilder;
use super::handle::DispatchHandle;
use crate::codec;
use crate::error::ClientError;
use crate::interceptors::{Interceptor, InterceptorChain};
use crate::models::{
    CompletedRequest, EventLevel, Request, RequestBody, Response, ResponseEnvelope, ResponseMessage, Verb,
};
use crate::sanitizer;
use crate::transport::Transport;

/// Source id of the message synthesized for a rejected transport call
pub const HTTP_ERROR_SOURCE_ID: &str = "HTTP Error";

/// Source id of the message synthesized for faults outside the transport
pub const EXCEPTION_SOURCE_ID: &str = "Exception";

/// Why a dispatch produced no server response.
enum Failure {
    /// The transport rejected the call; interceptors may translate it.
    Transport(ClientError),
    /// Preparing the call or reading its result failed; always translated
    /// by the default synthesis.
    Fault(ClientError),
}

struct DispatcherInner {
    endpoint: String,
    transport: Arc<dyn Transport>,
    interceptors: InterceptorChain,
    subscribers: Mutex<Vec<mpsc::UnboundedSender<CompletedRequest>>>,
}

/// Sends requests to the WebApi endpoint.
///
/// Cloning is cheap and every clone shares the same transport, interceptors
/// and global completion channel.
#[derive(Clone)]
pub struct Dispatcher {
    inner: Arc<DispatcherInner>,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("endpoint", &self.inner.endpoint)
            .field("interceptors", &self.inner.interceptors)
            .finish()
    }
}

impl Dispatcher {
    /// Create a dispatcher from its parts
    pub fn new(endpoint: impl Into<String>, transport: Arc<dyn Transport>, interceptors: InterceptorChain) -> Self {
        Self {
            inner: Arc::new(DispatcherInner {
                endpoint: endpoint.into(),
                transport,
                interceptors,
                subscribers: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Create a builder
    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder::new()
    }

    /// URL every request is posted to
    pub fn endpoint(&self) -> &str {
        &self.inner.endpoint
    }

    /// Subscribe to every request completed from now on, in completion
    /// order. Completions are queued until read, however far the subscriber
    /// falls behind. The channel stays open as long as the dispatcher exists.
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<CompletedRequest> {
        let (sender, receiver) = mpsc::unbounded_channel();
        self.lock_subscribers().push(sender);
        receiver
    }

    /// Execute the request on the server.
    ///
    /// # Panics
    ///
    /// Panics when called outside of a Tokio runtime.
    pub fn try_execute<B: RequestBody>(&self, request: Request<B>) -> DispatchHandle<B> {
        self.dispatch(request, Verb::Execute)
    }

    /// Let the server validate and evaluate the request without committing
    /// any effect.
    ///
    /// # Panics
    ///
    /// Panics when called outside of a Tokio runtime.
    pub fn evaluate<B: RequestBody>(&self, request: Request<B>) -> DispatchHandle<B> {
        self.dispatch(request, Verb::Evaluate)
    }

    /// Dispatch on a task of its own. The dispatch runs to completion even if
    /// the returned handle is dropped.
    ///
    /// # Panics
    ///
    /// Panics when called outside of a Tokio runtime.
    pub fn dispatch<B: RequestBody>(&self, request: Request<B>, verb: Verb) -> DispatchHandle<B> {
        let (sender, receiver) = oneshot::channel();
        let handle = DispatchHandle::new(request.id().to_string(), verb, receiver);
        let dispatcher = self.clone();

        tokio::spawn(async move {
            let mut request = request;
            dispatcher.complete(&mut request, verb).await;

            let snapshot = request.snapshot(verb);
            if sender.send(request).is_err() {
                trace!(request_id = %snapshot.id, "dispatch handle dropped before completion");
            }
            dispatcher.publish(snapshot);
        });

        handle
    }

    /// Dispatch on the current task. When this returns, the new response is
    /// at the front of the request's history and the completion has been
    /// published on the global channel.
    pub async fn dispatch_in_place<B: RequestBody>(&self, request: &mut Request<B>, verb: Verb) {
        self.complete(request, verb).await;
        self.publish(request.snapshot(verb));
    }

    /// Run the state machine, turning a panic in a hook into a failed
    /// response so that the request still completes.
    async fn complete<B: RequestBody>(&self, request: &mut Request<B>, verb: Verb) {
        let outcome = AssertUnwindSafe(self.run(&mut *request, verb)).catch_unwind().await;
        if outcome.is_err() {
            error!(request_id = request.id(), %verb, "dispatch panicked");
            let fault = ClientError::internal("dispatch panicked");
            let synthesized = failure_response(request.id(), EXCEPTION_SOURCE_ID, &fault);

            // A hook that panics again leaves the synthesized response as is
            let intercepted = AssertUnwindSafe(
                self.inner
                    .interceptors
                    .on_response(&*request, synthesized.clone(), verb),
            )
            .catch_unwind()
            .await;
            request.add_response(intercepted.unwrap_or(synthesized));
        }
    }

    async fn run<B: RequestBody>(&self, request: &mut Request<B>, verb: Verb) {
        let chain = &self.inner.interceptors;
        debug!(request_id = request.id(), type_name = B::TYPE_NAME, %verb, "dispatching request");

        chain.on_request(&mut *request, verb).await;

        let response = match self.send(request, verb).await {
            Ok(response) => response,
            Err(Failure::Transport(err)) => {
                warn!(request_id = request.id(), error = %err, "transport rejected request");
                match chain.on_http_error(&*request, &err, verb).await {
                    Some(response) => response,
                    None => failure_response(request.id(), HTTP_ERROR_SOURCE_ID, &err),
                }
            }
            Err(Failure::Fault(err)) => {
                warn!(request_id = request.id(), error = %err, "request could not be processed");
                failure_response(request.id(), EXCEPTION_SOURCE_ID, &err)
            }
        };

        let response = chain.on_response(&*request, response, verb).await;
        debug!(
            request_id = request.id(),
            executed = response.executed,
            failed = response.failed,
            messages = response.messages.len(),
            "request completed"
        );
        request.add_response(response);
    }

    async fn send<B: RequestBody>(&self, request: &Request<B>, verb: Verb) -> Result<Response, Failure> {
        let payload = {
            let envelope = codec::encode(request, verb);
            serde_json::to_value(&envelope).map_err(|e| {
                Failure::Fault(ClientError::serialization(format!("Failed to serialize request: {}", e)))
            })?
        };

        let raw = self
            .inner
            .transport
            .post(&self.inner.endpoint, payload)
            .await
            .map_err(Failure::Transport)?;

        let envelope = ResponseEnvelope::from_web_value(sanitizer::sanitize_json(raw)).map_err(Failure::Fault)?;
        codec::decode(envelope).map_err(Failure::Fault)
    }

    fn publish(&self, completed: CompletedRequest) {
        let mut subscribers = self.lock_subscribers();
        subscribers.retain(|subscriber| subscriber.send(completed.clone()).is_ok());
        if subscribers.is_empty() {
            trace!(request_id = %completed.id, "no global subscribers for completed request");
        }
    }

    fn lock_subscribers(&self) -> std::sync::MutexGuard<'_, Vec<mpsc::UnboundedSender<CompletedRequest>>> {
        // Senders are only pushed and pruned, a poisoned list is still intact
        self.inner
            .subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Failed response describing `error`, with a single Error-level message.
pub(crate) fn failure_response(request_id: &str, source_id: &str, error: &ClientError) -> Response {
    let message = ResponseMessage::new(
        source_id,
        format!("Error calling the remote interface: {}", error.message()),
        Some(error.dump().to_string()),
    )
    .with_level(EventLevel::Error);

    Response::failure(Some(request_id.to_string()), message)
}
