//! # HTTP JSON-RPC Server
//!
//! Serves a [`MethodRegistry`](twinrpc_json_rpc::MethodRegistry) over HTTP
//! POST. Request bodies are handed to the
//! [`BatchCoordinator`](twinrpc_json_rpc::BatchCoordinator) whole; the reply
//! is written with an exact `Content-Length`, or as `204 No Content` when the
//! request only carried notifications.
//!
//! ## Features
//! - JSON-RPC 1.0 and 2.0 on the same endpoint
//! - `application/json` and legacy `text/json` request bodies
//! - Request body size limit
//! - Optional HTTP Basic authentication

pub mod auth;
pub mod handler;
pub mod server;

// Re-export main types
pub use handler::RpcHttpHandler;
pub use server::{HttpJsonRpcServer, HttpJsonRpcServerBuilder, ServerConfig};

/// Result type for HTTP server operations
pub type Result<T> = std::result::Result<T, HttpServerError>;

/// HTTP server errors
#[derive(Debug, thiserror::Error)]
pub enum HttpServerError {
    #[error("HTTP error: {0}")]
    Http(#[from] hyper::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}
