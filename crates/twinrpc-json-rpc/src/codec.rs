//! Encoding and decoding of JSON-RPC envelopes. No I/O happens here.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::error::{JsonRpcError, JsonRpcErrorCode};
use crate::id::IdGenerator;
use crate::request::{CallId, Request, RequestParams};
use crate::response::{Outcome, Response};
use crate::types::{RequestId, Version};

/// Why a response could not be turned into a result value.
#[derive(Debug, Error)]
pub enum ResponseError {
    /// The bytes are not JSON at all
    #[error("Malformed response: {0}")]
    Malformed(#[from] serde_json::Error),

    /// Valid JSON, but not a usable response envelope
    #[error("Not a valid JSON-RPC response: {0}")]
    Invalid(String),

    /// The server answered with an error object
    #[error(transparent)]
    Fault(#[from] JsonRpcError),
}

/// Encode an outgoing request.
///
/// `params` is written verbatim when present and omitted otherwise. With
/// [`CallId::Notification`] the envelope has no `id` member at all; with
/// [`CallId::Auto`] an id is drawn from `ids`.
pub fn encode_request(
    method: &str,
    params: Option<&RequestParams>,
    id: CallId,
    version: Version,
    ids: &dyn IdGenerator,
) -> serde_json::Result<Vec<u8>> {
    let id = match id {
        CallId::Auto => Some(RequestId::Number(ids.next_id())),
        CallId::Explicit(id) => Some(id),
        CallId::Notification => None,
    };
    let request = Request::new(method, params.cloned(), id).with_version(version);
    serde_json::to_vec(&request)
}

/// Decode request bytes into a JSON value.
///
/// Only JSON syntax is checked here; envelope rules belong to
/// [`verify`](crate::validate::verify).
pub fn decode_request(bytes: &[u8]) -> Result<Value, JsonRpcError> {
    serde_json::from_slice(bytes).map_err(|_| JsonRpcError::parse_error())
}

/// Encode the response to one call.
pub fn encode_response(
    outcome: &Outcome,
    id: Option<RequestId>,
    version: Version,
) -> serde_json::Result<Vec<u8>> {
    serde_json::to_vec(&Response::from_outcome(outcome, id, version))
}

/// Decode a response and return what the remote method returned.
///
/// A `null` result is a legitimate return value. An error object from the
/// server becomes [`ResponseError::Fault`] carrying the server's code and
/// message plus the response's own id and version.
pub fn decode_response(bytes: &[u8]) -> Result<Value, ResponseError> {
    let response: Value = serde_json::from_slice(bytes)?;
    let Some(envelope) = response.as_object() else {
        return Err(ResponseError::Invalid("response is not an object".to_string()));
    };

    let version = Version::of_response(envelope.get("jsonrpc"));
    let result = envelope.get("result");
    let error = envelope.get("error");

    let conflicting = match version {
        Version::V2 => result.is_some() && error.is_some(),
        Version::V1 => {
            result.is_some_and(|r| !r.is_null()) && error.is_some_and(|e| !e.is_null())
        }
    };
    if conflicting {
        return Err(ResponseError::Invalid(
            "both result and error are set".to_string(),
        ));
    }

    if let Some(error) = error.filter(|e| !e.is_null()) {
        return Err(ResponseError::Fault(fault_from(error, envelope, version)?));
    }

    match result {
        Some(result) => Ok(result.clone()),
        None => Err(ResponseError::Invalid(
            "neither result nor error present".to_string(),
        )),
    }
}

fn fault_from(
    error: &Value,
    envelope: &Map<String, Value>,
    version: Version,
) -> Result<JsonRpcError, ResponseError> {
    let message = error
        .get("message")
        .and_then(Value::as_str)
        .ok_or_else(|| ResponseError::Invalid("error object has no message".to_string()))?;
    let code = error
        .get("code")
        .and_then(Value::as_i64)
        .ok_or_else(|| ResponseError::Invalid("error object has no integer code".to_string()))?;
    let id = envelope.get("id").and_then(RequestId::from_value);

    Ok(JsonRpcError::new(JsonRpcErrorCode::from_code(code), message)
        .with_data(error.get("data").cloned())
        .addressed(id, version))
}
