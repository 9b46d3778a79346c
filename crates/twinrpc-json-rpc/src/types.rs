use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Identifier of a JSON-RPC call.
///
/// A missing or `null` id is not represented here: the envelope carries
/// `Option<RequestId>` and `None` marks a notification.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestId {
    String(String),
    Number(i64),
}

impl RequestId {
    /// Read an id from its wire form. Returns `None` for anything that is not
    /// an integer or a string.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(RequestId::String(s.clone())),
            Value::Number(n) => n.as_i64().map(RequestId::Number),
            _ => None,
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            RequestId::String(s) => Value::String(s.clone()),
            RequestId::Number(n) => Value::from(*n),
        }
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestId::String(s) => write!(f, "{}", s),
            RequestId::Number(n) => write!(f, "{}", n),
        }
    }
}

impl From<i64> for RequestId {
    fn from(n: i64) -> Self {
        RequestId::Number(n)
    }
}

impl From<&str> for RequestId {
    fn from(s: &str) -> Self {
        RequestId::String(s.to_string())
    }
}

impl From<String> for RequestId {
    fn from(s: String) -> Self {
        RequestId::String(s)
    }
}

/// Protocol dialect of a single call.
///
/// Version 1.0 never puts a `jsonrpc` key on the wire; version 2.0 is tagged
/// with the string `"2.0"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Version {
    #[default]
    V1,
    V2,
}

/// Reason a `jsonrpc` member could not be read as a version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidVersion;

impl Version {
    /// Coerce the `jsonrpc` member of a request.
    ///
    /// Strings are parsed as floats and numbers are taken as-is; `2.0` selects
    /// V2 and every other number selects V1.
    pub fn from_wire(value: &Value) -> Result<Self, InvalidVersion> {
        let tag = match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
        .ok_or(InvalidVersion)?;

        if tag == 2.0 {
            Ok(Version::V2)
        } else {
            Ok(Version::V1)
        }
    }

    /// Read the version a response claims. Only the exact tag `"2.0"` counts
    /// as V2, everything else (including absence) is V1.
    pub fn of_response(value: Option<&Value>) -> Self {
        match value {
            Some(Value::String(s)) if s == crate::JSONRPC_VERSION => Version::V2,
            _ => Version::V1,
        }
    }

    pub fn as_f64(&self) -> f64 {
        match self {
            Version::V1 => 1.0,
            Version::V2 => 2.0,
        }
    }

    /// The wire tag, if this version has one.
    pub fn tag(&self) -> Option<&'static str> {
        match self {
            Version::V1 => None,
            Version::V2 => Some(crate::JSONRPC_VERSION),
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Version::V1 => write!(f, "1.0"),
            Version::V2 => write!(f, "2.0"),
        }
    }
}
