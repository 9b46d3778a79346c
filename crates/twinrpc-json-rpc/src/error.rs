use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

use crate::error_codes;
use crate::types::{RequestId, Version};

/// JSON-RPC error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonRpcErrorCode {
    ParseError,
    InvalidRequest,
    MethodNotFound,
    InvalidParams,
    InternalError,
    /// Code chosen by a handler, passed through verbatim
    Application(i64),
}

impl JsonRpcErrorCode {
    pub fn code(&self) -> i64 {
        match self {
            JsonRpcErrorCode::ParseError => error_codes::PARSE_ERROR,
            JsonRpcErrorCode::InvalidRequest => error_codes::INVALID_REQUEST,
            JsonRpcErrorCode::MethodNotFound => error_codes::METHOD_NOT_FOUND,
            JsonRpcErrorCode::InvalidParams => error_codes::INVALID_PARAMS,
            JsonRpcErrorCode::InternalError => error_codes::INTERNAL_ERROR,
            JsonRpcErrorCode::Application(code) => *code,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            JsonRpcErrorCode::ParseError => "Parse error",
            JsonRpcErrorCode::InvalidRequest => "Invalid Request",
            JsonRpcErrorCode::MethodNotFound => "Method not found",
            JsonRpcErrorCode::InvalidParams => "Invalid params",
            JsonRpcErrorCode::InternalError => "Internal error",
            JsonRpcErrorCode::Application(_) => "Application error",
        }
    }

    /// Map a numeric code back onto the reserved set.
    pub fn from_code(code: i64) -> Self {
        match code {
            error_codes::PARSE_ERROR => JsonRpcErrorCode::ParseError,
            error_codes::INVALID_REQUEST => JsonRpcErrorCode::InvalidRequest,
            error_codes::METHOD_NOT_FOUND => JsonRpcErrorCode::MethodNotFound,
            error_codes::INVALID_PARAMS => JsonRpcErrorCode::InvalidParams,
            error_codes::INTERNAL_ERROR => JsonRpcErrorCode::InternalError,
            other => JsonRpcErrorCode::Application(other),
        }
    }
}

impl fmt::Display for JsonRpcErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code(), self.message())
    }
}

/// The `error` member of a response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorObject {
    pub message: String,
    pub code: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl From<&JsonRpcError> for ErrorObject {
    fn from(error: &JsonRpcError) -> Self {
        Self {
            message: error.message.clone(),
            code: error.code.code(),
            data: error.data.clone(),
        }
    }
}

/// A protocol-level failure together with the addressing needed to answer it.
///
/// Built explicitly wherever a failure is detected (decode, validation,
/// dispatch) and carried as a value until the response is shaped. `id` and
/// `version` hold whatever could be recovered from the offending request.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("JSON-RPC error {}: {message}", .code.code())]
pub struct JsonRpcError {
    pub code: JsonRpcErrorCode,
    pub message: String,
    pub data: Option<Value>,
    pub id: Option<RequestId>,
    pub version: Version,
}

impl JsonRpcError {
    pub fn new(code: JsonRpcErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
            id: None,
            version: Version::V1,
        }
    }

    pub fn parse_error() -> Self {
        let code = JsonRpcErrorCode::ParseError;
        Self::new(code, code.message())
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(JsonRpcErrorCode::InvalidRequest, message)
    }

    pub fn method_not_found(method: &str) -> Self {
        Self::new(
            JsonRpcErrorCode::MethodNotFound,
            format!("Method {} not found", method),
        )
    }

    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::new(JsonRpcErrorCode::InvalidParams, message)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(JsonRpcErrorCode::InternalError, message)
    }

    pub fn application(code: i64, message: impl Into<String>) -> Self {
        Self::new(JsonRpcErrorCode::from_code(code), message)
    }

    /// What a client reports when the server refuses its credentials.
    pub fn unauthorized() -> Self {
        Self::new(JsonRpcErrorCode::InvalidRequest, "Unauthorized")
    }

    pub fn with_data(mut self, data: Option<Value>) -> Self {
        self.data = data;
        self
    }

    /// Attach the id and version of the call this error answers.
    pub fn addressed(mut self, id: Option<RequestId>, version: Version) -> Self {
        self.id = id;
        self.version = version;
        self
    }

    pub fn to_error_object(&self) -> ErrorObject {
        ErrorObject::from(self)
    }
}

/// Failure reported by a method handler.
///
/// Without an explicit code the failure is reported as an internal error.
/// Handlers that reject the *shape* of their arguments use
/// [`HandlerError::invalid_params`].
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct HandlerError {
    pub message: String,
    pub code: Option<i64>,
    pub data: Option<Value>,
}

impl HandlerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
            data: None,
        }
    }

    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::new(message).with_code(error_codes::INVALID_PARAMS)
    }

    pub fn with_code(mut self, code: i64) -> Self {
        self.code = Some(code);
        self
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }
}

impl From<HandlerError> for JsonRpcError {
    fn from(err: HandlerError) -> Self {
        let code = match err.code {
            Some(code) => JsonRpcErrorCode::from_code(code),
            None => JsonRpcErrorCode::InternalError,
        };
        JsonRpcError::new(code, err.message).with_data(err.data)
    }
}

impl From<serde_json::Error> for HandlerError {
    fn from(err: serde_json::Error) -> Self {
        HandlerError::new(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_error_codes() {
        assert_eq!(JsonRpcErrorCode::ParseError.code(), -32700);
        assert_eq!(JsonRpcErrorCode::InvalidRequest.code(), -32600);
        assert_eq!(JsonRpcErrorCode::MethodNotFound.code(), -32601);
        assert_eq!(JsonRpcErrorCode::InvalidParams.code(), -32602);
        assert_eq!(JsonRpcErrorCode::InternalError.code(), -32603);
        assert_eq!(JsonRpcErrorCode::Application(42).code(), 42);
    }

    #[test]
    fn test_from_code_roundtrip() {
        assert_eq!(JsonRpcErrorCode::from_code(-32601), JsonRpcErrorCode::MethodNotFound);
        assert_eq!(JsonRpcErrorCode::from_code(123), JsonRpcErrorCode::Application(123));
    }

    #[test]
    fn test_method_not_found_message() {
        let error = JsonRpcError::method_not_found("missing");
        assert_eq!(error.message, "Method missing not found");
        assert_eq!(error.to_string(), "JSON-RPC error -32601: Method missing not found");
    }

    #[test]
    fn test_error_object_serialization() {
        let object = JsonRpcError::internal_error("boom").to_error_object();
        let value = serde_json::to_value(&object).unwrap();
        assert_eq!(value, json!({"message": "boom", "code": -32603}));

        let object = JsonRpcError::application(7, "custom")
            .with_data(Some(json!({"hint": 1})))
            .to_error_object();
        let value = serde_json::to_value(&object).unwrap();
        assert_eq!(value, json!({"message": "custom", "code": 7, "data": {"hint": 1}}));
    }

    #[test]
    fn test_handler_error_mapping() {
        let plain: JsonRpcError = HandlerError::new("failed").into();
        assert_eq!(plain.code, JsonRpcErrorCode::InternalError);

        let typed: JsonRpcError = HandlerError::invalid_params("expected a number").into();
        assert_eq!(typed.code, JsonRpcErrorCode::InvalidParams);

        let custom: JsonRpcError = HandlerError::new("quota exceeded")
            .with_code(-32010)
            .with_data(json!("retry later"))
            .into();
        assert_eq!(custom.code.code(), -32010);
        assert_eq!(custom.data, Some(json!("retry later")));
    }

    #[test]
    fn test_addressed_error() {
        let error = JsonRpcError::invalid_request("Invalid method type")
            .addressed(Some(RequestId::Number(9)), Version::V2);
        assert_eq!(error.id, Some(RequestId::Number(9)));
        assert_eq!(error.version, Version::V2);
    }
}
