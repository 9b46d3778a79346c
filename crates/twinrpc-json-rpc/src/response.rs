use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use serde_json::Value;

use crate::error::{ErrorObject, JsonRpcError};
use crate::types::{RequestId, Version};

/// Resolved result of dispatching one call.
pub type Outcome = Result<Value, JsonRpcError>;

/// A response envelope for a single call.
///
/// V1 responses always carry both `result` and `error` (one of them null).
/// V2 responses carry the `"2.0"` tag and exactly one of the two.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub id: Option<RequestId>,
    pub version: Version,
    pub payload: Result<Value, ErrorObject>,
}

impl Response {
    pub fn success(id: Option<RequestId>, version: Version, result: Value) -> Self {
        Self {
            id,
            version,
            payload: Ok(result),
        }
    }

    pub fn error(id: Option<RequestId>, version: Version, error: ErrorObject) -> Self {
        Self {
            id,
            version,
            payload: Err(error),
        }
    }

    /// Shape an outcome for the call identified by `id`/`version`.
    pub fn from_outcome(outcome: &Outcome, id: Option<RequestId>, version: Version) -> Self {
        match outcome {
            Ok(value) => Self::success(id, version, value.clone()),
            Err(err) => Self::error(id, version, err.to_error_object()),
        }
    }

    /// Answer an error at the address it carries.
    pub fn from_error(error: &JsonRpcError) -> Self {
        Self::error(error.id.clone(), error.version, error.to_error_object())
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

impl Serialize for Response {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(None)?;
        if let Some(tag) = self.version.tag() {
            map.serialize_entry("jsonrpc", tag)?;
        }
        map.serialize_entry("id", &self.id)?;
        match (&self.payload, self.version) {
            (Ok(result), Version::V1) => {
                map.serialize_entry("result", result)?;
                map.serialize_entry("error", &Value::Null)?;
            }
            (Ok(result), Version::V2) => {
                map.serialize_entry("result", result)?;
            }
            (Err(error), Version::V1) => {
                map.serialize_entry("result", &Value::Null)?;
                map.serialize_entry("error", error)?;
            }
            (Err(error), Version::V2) => {
                map.serialize_entry("error", error)?;
            }
        }
        map.end()
    }
}
