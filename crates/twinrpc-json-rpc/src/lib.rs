//! # JSON-RPC 1.0/2.0 Protocol Core
//!
//! Transport-agnostic encoding, validation, dispatch and batch handling for
//! JSON-RPC. Both protocol versions are served side by side: every call is
//! answered in the dialect it was made in, and a single batch may mix them.
//!
//! ## Features
//! - V1 and V2 request/response shapes, including V1 notifications
//! - Explicit method registry with positional and named parameter binding
//! - Synchronous and asynchronous handlers awaited uniformly
//! - Concurrent batch processing that keeps input order
//! - Injectable request id generation for clients
//! - Basic auth credentials shared by servers and clients

pub mod batch;
pub mod codec;
pub mod credentials;
pub mod dispatch;
pub mod error;
pub mod id;
pub mod prelude;
pub mod registry;
pub mod request;
pub mod response;
pub mod types;
pub mod validate;

// Re-export main types
pub use batch::BatchCoordinator;
pub use codec::{decode_request, decode_response, encode_request, encode_response, ResponseError};
pub use credentials::Credentials;
pub use dispatch::Dispatcher;
pub use error::{ErrorObject, HandlerError, JsonRpcError, JsonRpcErrorCode};
pub use id::{IdGenerator, RandomIdGenerator, SequentialIdGenerator};
pub use registry::{Arguments, MethodRegistry, MethodSignature, RpcHandler};
pub use request::{CallId, Request, RequestParams};
pub use response::{Outcome, Response};
pub use types::{RequestId, Version};
pub use validate::{expects_reply, verify};

/// Wire tag of JSON-RPC 2.0 envelopes
pub const JSONRPC_VERSION: &str = "2.0";

/// Reserved JSON-RPC error codes
pub mod error_codes {
    pub const PARSE_ERROR: i64 = -32700;
    pub const INVALID_REQUEST: i64 = -32600;
    pub const METHOD_NOT_FOUND: i64 = -32601;
    pub const INVALID_PARAMS: i64 = -32602;
    pub const INTERNAL_ERROR: i64 = -32603;
}
