//! # RRP Client
//!
//! Client for WebApi endpoints following the request/response pattern: every
//! server operation is a typed request, posted as one envelope to a single
//! endpoint, and answered with a response carrying structured messages.
//!
//! This crate provides:
//!
//! - The request, response and message model together with the wire codec
//! - A sanitizer turning wire JSON into clean values (`$values` wrappers
//!   removed, ISO-8601 strings parsed to dates)
//! - An interceptor chain for cross-cutting concerns
//! - A dispatcher that never fails: transport and processing failures become
//!   failed responses in the request's history
//! - Configuration management utilities
//!
//! ## Architecture
//!
//! - `Dispatcher`: runs each dispatch and publishes its completion
//! - `Interceptor`: hooks into requests, responses and transport errors
//! - `Transport`: posts envelopes, `HttpTransport` being the default
//! - `ClientError`: error type of the transport and codec layers
//!
//! ```no_run
//! use rrp_client::{Request, RequestBody};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize)]
//! #[serde(rename_all = "camelCase")]
//! struct GetOrder {
//!     order_number: u32,
//! }
//!
//! #[derive(Deserialize)]
//! struct GetOrderResponse {
//!     failed: bool,
//! }
//!
//! impl RequestBody for GetOrder {
//!     const TYPE_NAME: &'static str = "Shop.Orders.GetOrderRequest, Shop";
//!     type Response = GetOrderResponse;
//! }
//!
//! # async fn run() -> rrp_client::Result<()> {
//! let dispatcher = rrp_client::dispatcher()
//!     .url("https://shop.example.com/api/rrp")
//!     .build()?;
//!
//! let request = dispatcher.try_execute(Request::new(GetOrder { order_number: 7 })).await?;
//! if let Some(response) = request.response() {
//!     println!("failed: {}", response.failed);
//! }
//! # Ok(())
//! # }
//! ```

pub mod codec;

// Re-export configuration management
pub mod config;
pub use config::{ClientConfig, ConfigProvider};

// Re-export the dispatch engine
pub mod core;
pub use crate::core::{DispatchHandle, Dispatcher, DispatcherBuilder};

// Re-export error handling
pub mod error;
pub use error::{ClientError, ErrorContext, Result};

pub mod interceptors;
pub use interceptors::{Interceptor, InterceptorChain};

pub mod models;
pub use models::{
    CompletedRequest, EventLevel, RemoteRequest, Request, RequestBody, Response, ResponseMessage, Verb,
};

pub mod sanitizer;
pub use sanitizer::WebValue;

pub mod transport;
pub use transport::{HttpTransport, Transport};

// Utility module for common functionality
mod util;

#[cfg(test)]
mod tests;

/// Create a new default dispatcher builder
pub fn dispatcher() -> DispatcherBuilder {
    DispatcherBuilder::new()
}
