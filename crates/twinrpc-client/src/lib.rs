//! # JSON-RPC client
//!
//! A proxy for calling remote methods over HTTP or netstring, speaking
//! either JSON-RPC 1.0 or 2.0.
//!
//! ```rust,no_run
//! use serde_json::json;
//! use twinrpc_client::prelude::*;
//!
//! # async fn example() -> ClientResult<()> {
//! let client = JsonRpcClient::http("http://127.0.0.1:8999/", ClientConfig::default())?;
//! let echoed = client.call_positional("echo", vec![json!("hello")]).await?;
//! assert_eq!(echoed, json!("hello"));
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod prelude;
pub mod transport;

pub use client::JsonRpcClient;
pub use config::{ClientConfig, TimeoutConfig};
pub use error::{ClientError, ClientResult, TransportError};
pub use transport::{BoxedTransport, HttpTransport, NetstringTransport, Transport, TransportType};
pub use twinrpc_json_rpc::Credentials;
