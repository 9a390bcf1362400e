//! Transport collaborators
//!
//! The dispatcher does not talk HTTP itself; it hands the serialized
//! envelope to a [`Transport`]. [`HttpTransport`] is the reqwest-based
//! default, tests substitute their own.

mod http;

pub use http::{HttpTransport, UserAgent};

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

/// Sends a request envelope to the endpoint and returns the raw response
/// envelope.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    /// POST `envelope` to `endpoint`. Fails with a transport error on
    /// network or protocol failure.
    async fn post(&self, endpoint: &str, envelope: Value) -> Result<Value>;
}
