//! Common imports for client code
//!
//! ```rust
//! use twinrpc_client::prelude::*;
//! ```

pub use crate::client::JsonRpcClient;
pub use crate::config::{ClientConfig, TimeoutConfig};
pub use crate::error::{ClientError, ClientResult};
pub use twinrpc_json_rpc::{Credentials, RequestParams, Version};
