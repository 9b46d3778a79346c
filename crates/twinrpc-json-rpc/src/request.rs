use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use crate::types::{RequestId, Version};

/// Parameters for a JSON-RPC request
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum RequestParams {
    /// Positional parameters as an array
    Array(Vec<Value>),
    /// Named parameters as an object
    Object(HashMap<String, Value>),
}

impl RequestParams {
    /// Read `params` from the wire. Anything other than an array or an
    /// object is rejected.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Array(items) => Some(RequestParams::Array(items.clone())),
            Value::Object(map) => Some(RequestParams::Object(
                map.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
            )),
            _ => None,
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            RequestParams::Object(map) => {
                Value::Object(map.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            }
            RequestParams::Array(arr) => Value::Array(arr.clone()),
        }
    }
}

impl From<HashMap<String, Value>> for RequestParams {
    fn from(map: HashMap<String, Value>) -> Self {
        RequestParams::Object(map)
    }
}

impl From<Vec<Value>> for RequestParams {
    fn from(vec: Vec<Value>) -> Self {
        RequestParams::Array(vec)
    }
}

/// How an outgoing request is addressed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CallId {
    /// Draw a fresh id from the caller's id generator
    #[default]
    Auto,
    /// Use exactly this id
    Explicit(RequestId),
    /// Send without an id; no response will come back
    Notification,
}

impl From<RequestId> for CallId {
    fn from(id: RequestId) -> Self {
        CallId::Explicit(id)
    }
}

/// A request envelope that passed validation.
///
/// `id == None` marks a notification. Serializes to the normalized wire form:
/// V1 omits `jsonrpc`, V2 writes `"2.0"`, a missing id is omitted.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub method: String,
    pub params: Option<RequestParams>,
    pub id: Option<RequestId>,
    pub version: Version,
}

impl Request {
    pub fn new(method: impl Into<String>, params: Option<RequestParams>, id: Option<RequestId>) -> Self {
        Self {
            method: method.into(),
            params,
            id,
            version: Version::V1,
        }
    }

    pub fn with_version(mut self, version: Version) -> Self {
        self.version = version;
        self
    }

    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }

    pub fn to_value(&self) -> Value {
        // Serializing a map of JSON values cannot fail
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

impl Serialize for Request {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(None)?;
        if let Some(tag) = self.version.tag() {
            map.serialize_entry("jsonrpc", tag)?;
        }
        map.serialize_entry("method", &self.method)?;
        if let Some(params) = &self.params {
            map.serialize_entry("params", params)?;
        }
        if let Some(id) = &self.id {
            map.serialize_entry("id", id)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // Test-only lookup of a named parameter
    trait ParamsGet {
        fn get(&self, key: &str) -> Option<&Value>;
    }

    impl ParamsGet for RequestParams {
        fn get(&self, key: &str) -> Option<&Value> {
            match self {
                RequestParams::Object(map) => map.get(key),
                RequestParams::Array(_) => None,
            }
        }
    }

    #[test]
    fn test_v1_request_serialization() {
        let request = Request::new(
            "echo",
            Some(RequestParams::Array(vec![json!("ab")])),
            Some(RequestId::Number(1)),
        );

        assert_eq!(
            request.to_value(),
            json!({"method": "echo", "params": ["ab"], "id": 1})
        );
    }

    #[test]
    fn test_v2_notification_serialization() {
        let request = Request::new("ping", None, None).with_version(Version::V2);

        assert!(request.is_notification());
        assert_eq!(request.to_value(), json!({"jsonrpc": "2.0", "method": "ping"}));
    }

    #[test]
    fn test_request_with_object_params() {
        let mut params = HashMap::new();
        params.insert("name".to_string(), json!("test"));
        params.insert("value".to_string(), json!(42));

        let request = Request::new("set_value", Some(params.into()), Some("req1".into()));

        assert_eq!(
            request.to_value(),
            json!({"method": "set_value", "params": {"name": "test", "value": 42}, "id": "req1"})
        );
    }

    #[test]
    fn test_request_with_array_params() {
        let params = vec![json!("test"), json!(42), json!(true)];
        let request = Request::new("process", Some(params.into()), Some(RequestId::Number(2)));

        assert_eq!(
            request.params,
            Some(RequestParams::Array(vec![json!("test"), json!(42), json!(true)]))
        );
        assert_eq!(request.params.unwrap().to_value(), json!(["test", 42, true]));
    }

    #[test]
    fn test_params_from_value() {
        assert_eq!(
            RequestParams::from_value(&json!([1, 2])),
            Some(RequestParams::Array(vec![json!(1), json!(2)]))
        );
        let object = RequestParams::from_value(&json!({"data": "x"})).unwrap();
        assert_eq!(object.get("data"), Some(&json!("x")));
        assert_eq!(RequestParams::from_value(&json!("abcdef")), None);
        assert_eq!(RequestParams::from_value(&json!(123)), None);
    }
}
