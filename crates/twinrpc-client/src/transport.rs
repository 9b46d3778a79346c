//! Transport layer for the JSON-RPC client

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::ClientResult;

pub mod http;
pub mod netstring;

pub use http::HttpTransport;
pub use netstring::NetstringTransport;

/// Transport type enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportType {
    /// JSON-RPC over HTTP POST
    Http,
    /// One netstring frame per TCP connection
    Netstring,
}

impl std::fmt::Display for TransportType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportType::Http => write!(f, "HTTP"),
            TransportType::Netstring => write!(f, "netstring"),
        }
    }
}

/// Moves one encoded request to the server and brings back its answer.
///
/// `Ok(None)` means the server accepted the request without a body, which is
/// the normal outcome for a notification.
#[async_trait]
pub trait Transport: Send + Sync {
    fn transport_type(&self) -> TransportType;

    /// Human readable server address
    fn endpoint(&self) -> String;

    async fn send(&self, body: Bytes) -> ClientResult<Option<Bytes>>;
}

/// Boxed transport for dynamic dispatch
pub type BoxedTransport = Box<dyn Transport>;
