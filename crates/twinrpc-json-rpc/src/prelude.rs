//! Commonly used types, for glob import.
//!
//! ```rust
//! use twinrpc_json_rpc::prelude::*;
//! ```

pub use crate::batch::BatchCoordinator;
pub use crate::credentials::Credentials;
pub use crate::error::{HandlerError, JsonRpcError, JsonRpcErrorCode};
pub use crate::registry::{Arguments, MethodRegistry, MethodSignature, RpcHandler};
pub use crate::request::{CallId, RequestParams};
pub use crate::types::{RequestId, Version};

pub use crate::error_codes::*;
