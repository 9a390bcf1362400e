//! Data model of the request/response pattern
//!
//! This module contains the request, response and message types as well as
//! the wire envelopes exchanged with the server.

pub mod envelope;
pub mod message;
pub mod request;
pub mod response;

pub use envelope::{RequestEnvelope, ResponseEnvelope, ResponseMetadata, Verb};
pub use message::{EventLevel, MessageWalk, ResponseMessage};
pub use request::{CompletedRequest, RemoteRequest, Request, RequestBody};
pub use response::Response;
