//! # Netstring JSON-RPC Transport
//!
//! Frames JSON-RPC bodies as netstrings (`<length>:<payload>,`) and serves
//! them one request per connection: the server reads a single frame, writes
//! at most one frame back and closes the connection.

pub mod codec;
pub mod server;

pub use codec::{DEFAULT_MAX_FRAME_LEN, NetstringCodec};
pub use server::{NetstringConfig, NetstringServer};

/// Result type for netstring operations
pub type Result<T> = std::result::Result<T, NetstringError>;

/// Netstring framing and transport errors
#[derive(Debug, thiserror::Error)]
pub enum NetstringError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid length prefix: {0}")]
    InvalidLength(String),

    #[error("Frame of {len} bytes exceeds limit of {max} bytes")]
    FrameTooLarge { len: usize, max: usize },

    #[error("Frame not terminated by ',' (found {0:#04x})")]
    MissingTerminator(u8),

    #[error("Connection closed in the middle of a frame")]
    Incomplete,
}
