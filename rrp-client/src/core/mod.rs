//! Dispatch engine
//!
//! - [`Dispatcher`]: sends requests and records their responses
//! - [`DispatchHandle`]: per-call completion, awaitable
//! - [`DispatcherBuilder`]: builder pattern for creating dispatchers
//!
//! Every dispatch completes exactly once, on its handle and on the
//! dispatcher's global channel, in that order.

pub mod builder;
mod dispatcher;
mod handle;

pub use builder::DispatcherBuilder;
pub use dispatcher::{Dispatcher, EXCEPTION_SOURCE_ID, HTTP_ERROR_SOURCE_ID};
pub use handle::DispatchHandle;
