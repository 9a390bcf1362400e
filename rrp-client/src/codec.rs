//! Envelope codec
//!
//! Bridges typed requests and responses to the wire envelopes of the WebApi
//! endpoint.

use crate::error::{ClientError, Result};
use crate::models::{RemoteRequest, Request, RequestBody, RequestEnvelope, Response, ResponseEnvelope, Verb};

/// Body members that are carried in the metadata block instead.
const METADATA_FIELDS: [&str; 4] = ["id", "messages", "executed", "failed"];

/// Wrap a request for sending.
pub fn encode<B: RequestBody>(request: &Request<B>, verb: Verb) -> RequestEnvelope<'_, Request<B>> {
    RequestEnvelope {
        verb,
        request_id: request.id().to_string(),
        request,
        omit_validation_source_ids: request.omit_validation_source_ids().iter().cloned().collect(),
    }
}

/// Unwrap a received envelope.
///
/// The metadata block is authoritative: its id, messages and status flags
/// replace whatever the response body carried for those fields.
pub fn decode(envelope: ResponseEnvelope) -> Result<Response> {
    let mut payload = envelope
        .response
        .ok_or_else(|| ClientError::codec("Response envelope carries no response"))?;
    let metadata = envelope
        .metadata
        .ok_or_else(|| ClientError::codec("Response envelope carries no metadata"))?;

    for field in METADATA_FIELDS {
        payload.take(field);
    }

    Ok(Response {
        id: metadata.id,
        messages: metadata.messages,
        executed: metadata.executed,
        failed: metadata.failed,
        payload,
    })
}
