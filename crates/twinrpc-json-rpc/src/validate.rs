//! Envelope validation for decoded requests.

use serde_json::Value;

use crate::error::JsonRpcError;
use crate::request::{Request, RequestParams};
use crate::types::{RequestId, Version};

/// Check a decoded request against the envelope rules and normalize it.
///
/// A missing `jsonrpc` means version 1.0 and a missing or `null` id marks a
/// notification. Failures carry whatever id and version could be read from
/// `decoded` so the caller can address the error reply; an id of the wrong
/// type is reported at `id: null`.
pub fn verify(decoded: &Value) -> Result<Request, JsonRpcError> {
    let Some(envelope) = decoded.as_object() else {
        return Err(JsonRpcError::invalid_request("Invalid request type"));
    };

    let id = match envelope.get("id") {
        None | Some(Value::Null) => None,
        Some(raw) => match RequestId::from_value(raw) {
            Some(id) => Some(id),
            None => {
                let version = envelope
                    .get("jsonrpc")
                    .and_then(|raw| Version::from_wire(raw).ok())
                    .unwrap_or_default();
                return Err(JsonRpcError::invalid_request("Invalid id type").addressed(None, version));
            }
        },
    };

    let version = match envelope.get("jsonrpc") {
        None => Version::V1,
        Some(raw) => Version::from_wire(raw).map_err(|_| {
            JsonRpcError::invalid_request("Invalid jsonrpc type").addressed(id.clone(), Version::V1)
        })?,
    };

    let method = match envelope.get("method") {
        Some(Value::String(method)) => method.clone(),
        _ => {
            return Err(JsonRpcError::invalid_request("Invalid method type").addressed(id, version));
        }
    };

    let params = match envelope.get("params") {
        None => None,
        Some(raw) => match RequestParams::from_value(raw) {
            Some(params) => Some(params),
            None => {
                return Err(
                    JsonRpcError::invalid_request("Invalid params type").addressed(id, version)
                );
            }
        },
    };

    Ok(Request {
        method,
        params,
        id,
        version,
    })
}

/// Whether `decoded` must be answered even when it fails validation.
///
/// Only an object whose `id` is absent or `null` is a notification. Anything
/// else, including a non-object or an id of the wrong type, is a call.
pub fn expects_reply(decoded: &Value) -> bool {
    match decoded.as_object() {
        Some(envelope) => !matches!(envelope.get("id"), None | Some(Value::Null)),
        None => true,
    }
}
