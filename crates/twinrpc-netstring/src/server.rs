//! One-request-per-connection netstring server.

use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use futures::{SinkExt, StreamExt};
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tokio_util::codec::Framed;
use tracing::{debug, error, info, warn};
use twinrpc_json_rpc::{BatchCoordinator, MethodRegistry};

use crate::codec::{DEFAULT_MAX_FRAME_LEN, NetstringCodec};
use crate::{NetstringError, Result};

/// Configuration for the netstring server
#[derive(Debug, Clone)]
pub struct NetstringConfig {
    /// Address to bind to
    pub bind_address: SocketAddr,
    /// Largest accepted request payload
    pub max_frame_len: usize,
}

impl Default for NetstringConfig {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from(([127, 0, 0, 1], 8998)),
            max_frame_len: DEFAULT_MAX_FRAME_LEN,
        }
    }
}

impl NetstringConfig {
    pub fn bind_address(mut self, addr: SocketAddr) -> Self {
        self.bind_address = addr;
        self
    }

    pub fn max_frame_len(mut self, len: usize) -> Self {
        self.max_frame_len = len;
        self
    }
}

#[derive(Debug, Clone)]
pub struct NetstringServer {
    config: NetstringConfig,
    coordinator: Arc<BatchCoordinator>,
}

impl NetstringServer {
    pub fn new(config: NetstringConfig, registry: Arc<MethodRegistry>) -> Self {
        Self {
            config,
            coordinator: Arc::new(BatchCoordinator::new(registry)),
        }
    }

    pub fn config(&self) -> &NetstringConfig {
        &self.config
    }

    /// Bind the configured address and serve until an accept fails.
    pub async fn run(&self) -> Result<()> {
        let listener = TcpListener::bind(self.config.bind_address).await?;
        self.serve(listener).await
    }

    /// Serve on an already bound listener.
    pub async fn serve(&self, listener: TcpListener) -> Result<()> {
        info!(
            "JSON-RPC netstring server listening on {}",
            listener.local_addr()?
        );

        loop {
            let (stream, peer_addr) = listener.accept().await?;
            debug!("New connection from {}", peer_addr);

            let coordinator = Arc::clone(&self.coordinator);
            let max_frame_len = self.config.max_frame_len;
            tokio::spawn(async move {
                match serve_connection(stream, coordinator, max_frame_len).await {
                    Ok(()) => {}
                    Err(NetstringError::Incomplete) => {
                        debug!("Client {} disconnected mid-frame", peer_addr);
                    }
                    Err(err @ NetstringError::Io(_)) => {
                        error!("Error serving connection from {}: {}", peer_addr, err);
                    }
                    Err(err) => {
                        warn!("Rejected frame from {}: {}", peer_addr, err);
                    }
                }
            });
        }
    }
}

/// Read one frame, answer it and close.
async fn serve_connection(
    stream: TcpStream,
    coordinator: Arc<BatchCoordinator>,
    max_frame_len: usize,
) -> Result<()> {
    let mut framed = Framed::new(stream, NetstringCodec::with_max_frame_len(max_frame_len));

    let request = match framed.next().await {
        Some(frame) => frame?,
        None => {
            debug!("Connection closed before a request arrived");
            return Ok(());
        }
    };

    if let Some(reply) = coordinator.handle(&request).await {
        framed.send(Bytes::from(reply)).await?;
    }
    framed.into_inner().shutdown().await?;
    Ok(())
}
