//! Per-call completion channel

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::sync::oneshot;

use crate::error::{ClientError, Result};
use crate::models::Verb;

/// Completion of one dispatch.
///
/// Resolves exactly once, to the request with its new response at the front
/// of the history. The result is buffered, so awaiting the handle after the
/// dispatch already completed still yields it. Dropping the handle does not
/// stop the dispatch.
///
/// Failures of the call itself are reported inside the response; the error
/// case only occurs when the runtime dropped the dispatch task before it could
/// finish, e.g. during shutdown.
#[derive(Debug)]
pub struct DispatchHandle<B> {
    request_id: String,
    verb: Verb,
    /// `None` once the request was handed out
    receiver: Option<oneshot::Receiver<crate::models::Request<B>>>,
}

impl<B> DispatchHandle<B> {
    pub(crate) fn new(
        request_id: String,
        verb: Verb,
        receiver: oneshot::Receiver<crate::models::Request<B>>,
    ) -> Self {
        Self {
            request_id,
            verb,
            receiver: Some(receiver),
        }
    }

    /// Id of the dispatched request
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// Verb the request was dispatched with
    pub fn verb(&self) -> Verb {
        self.verb
    }

    /// Take the completed request without waiting, `None` while the dispatch
    /// is still running. Awaiting the handle after a successful take yields
    /// an error.
    pub fn try_take(&mut self) -> Option<crate::models::Request<B>> {
        let request = self.receiver.as_mut()?.try_recv().ok()?;
        self.receiver = None;
        Some(request)
    }
}

impl<B> Future for DispatchHandle<B> {
    type Output = Result<crate::models::Request<B>>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        let receiver = match this.receiver.as_mut() {
            Some(receiver) => receiver,
            None => {
                return Poll::Ready(Err(ClientError::internal(format!(
                    "Request {} was already taken from its dispatch handle",
                    this.request_id
                ))))
            }
        };

        let outcome = futures::ready!(Pin::new(receiver).poll(cx));
        this.receiver = None;
        Poll::Ready(outcome.map_err(|_| {
            ClientError::internal(format!(
                "Dispatch of request {} was dropped before completion",
                this.request_id
            ))
        }))
    }
}
