//! Ordered composition of interceptors

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use super::Interceptor;
use crate::error::ClientError;
use crate::models::{RemoteRequest, Response, Verb};

/// Several interceptors used as one.
///
/// Requests pass the interceptors in registration order, responses and
/// transport errors in reverse order, so the calls nest like this:
///
/// ```text
/// request  => first => second =>
///                                 server
/// response <= first <= second <=
/// ```
#[derive(Clone, Default)]
pub struct InterceptorChain {
    interceptors: Vec<Arc<dyn Interceptor>>,
}

impl InterceptorChain {
    /// Create an empty chain
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a chain from interceptors in registration order
    pub fn with_interceptors(interceptors: Vec<Arc<dyn Interceptor>>) -> Self {
        Self { interceptors }
    }

    /// Register an interceptor after all existing ones
    pub fn push(&mut self, interceptor: Arc<dyn Interceptor>) {
        self.interceptors.push(interceptor);
    }

    pub fn len(&self) -> usize {
        self.interceptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interceptors.is_empty()
    }
}

impl std::fmt::Debug for InterceptorChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InterceptorChain")
            .field("len", &self.interceptors.len())
            .finish()
    }
}

#[async_trait]
impl Interceptor for InterceptorChain {
    async fn on_request(&self, request: &mut dyn RemoteRequest, verb: Verb) {
        for interceptor in &self.interceptors {
            interceptor.on_request(request, verb).await;
        }
    }

    async fn on_response(&self, request: &dyn RemoteRequest, response: Response, verb: Verb) -> Response {
        let mut response = response;
        for interceptor in self.interceptors.iter().rev() {
            response = interceptor.on_response(request, response, verb).await;
        }
        response
    }

    async fn on_http_error(
        &self,
        request: &dyn RemoteRequest,
        error: &ClientError,
        verb: Verb,
    ) -> Option<Response> {
        for (position, interceptor) in self.interceptors.iter().enumerate().rev() {
            if let Some(response) = interceptor.on_http_error(request, error, verb).await {
                debug!(request_id = request.id(), position, "interceptor translated transport error");
                return Some(response);
            }
        }
        None
    }
}
