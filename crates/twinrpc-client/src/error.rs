//! Error types for client operations

use thiserror::Error;
use twinrpc_json_rpc::{JsonRpcError, ResponseError};
use twinrpc_netstring::NetstringError;

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Error, Debug)]
pub enum ClientError {
    /// Transport-level errors
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// The server answered with a JSON-RPC error, or refused the credentials
    #[error("Protocol error: {0}")]
    Protocol(#[from] JsonRpcError),

    /// The server answered with something that is not a usable response
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// JSON parsing errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP client errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Operation timed out")]
    Timeout,

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Transport-specific errors
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("HTTP transport error: {0}")]
    Http(String),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Framing error: {0}")]
    Framing(#[from] NetstringError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ClientError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// JSON-RPC error code, if the server reported one
    pub fn error_code(&self) -> Option<i64> {
        match self {
            Self::Protocol(err) => Some(err.code.code()),
            _ => None,
        }
    }

    pub fn is_protocol_error(&self) -> bool {
        matches!(self, Self::Protocol(_))
    }
}

impl From<ResponseError> for ClientError {
    fn from(err: ResponseError) -> Self {
        match err {
            ResponseError::Malformed(err) => Self::Json(err),
            ResponseError::Invalid(message) => Self::InvalidResponse(message),
            ResponseError::Fault(err) => Self::Protocol(err),
        }
    }
}
