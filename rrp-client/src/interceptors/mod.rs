//! Interceptors
//!
//! An interceptor lets cross-cutting code take part in every dispatch
//! without touching call sites. It may inspect or rewrite the outgoing
//! request, replace the received response, or translate a transport failure
//! into a response of its own.
//!
//! All hooks have defaults, so an interceptor implements only what it needs:
//!
//! ```
//! use async_trait::async_trait;
//! use rrp_client::interceptors::Interceptor;
//! use rrp_client::models::{RemoteRequest, Verb};
//!
//! struct AuditTrail;
//!
//! #[async_trait]
//! impl Interceptor for AuditTrail {
//!     async fn on_request(&self, request: &mut dyn RemoteRequest, verb: Verb) {
//!         tracing::info!(id = request.id(), %verb, "sending request");
//!     }
//! }
//! ```
//!
//! Several interceptors are combined with an [`InterceptorChain`].

mod chain;

pub use chain::InterceptorChain;

use async_trait::async_trait;

use crate::error::ClientError;
use crate::models::{RemoteRequest, Response, Verb};

/// Extension point of the dispatcher.
#[async_trait]
pub trait Interceptor: Send + Sync {
    /// Called before the request is sent. The request may be modified; use
    /// `request.downcast_mut::<B>()` to reach a typed body.
    async fn on_request(&self, _request: &mut dyn RemoteRequest, _verb: Verb) {}

    /// Called with the received (already sanitized and unwrapped) response.
    /// The returned response supersedes the given one for every later
    /// interceptor and for the request's history.
    async fn on_response(&self, _request: &dyn RemoteRequest, response: Response, _verb: Verb) -> Response {
        response
    }

    /// Called when the transport rejected the call. Returning a response
    /// replaces the default error translation; `None` leaves the decision to
    /// the next interceptor.
    async fn on_http_error(
        &self,
        _request: &dyn RemoteRequest,
        _error: &ClientError,
        _verb: Verb,
    ) -> Option<Response> {
        None
    }
}
