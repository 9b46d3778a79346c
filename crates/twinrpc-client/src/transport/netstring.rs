//! Netstring transport: one TCP connection per request

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_util::codec::Framed;
use tracing::debug;
use twinrpc_netstring::{DEFAULT_MAX_FRAME_LEN, NetstringCodec};

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult, TransportError};
use crate::transport::{Transport, TransportType};

#[derive(Debug, Clone)]
pub struct NetstringTransport {
    address: String,
    connect_timeout: Duration,
    max_frame_len: usize,
}

impl NetstringTransport {
    /// Create a transport for `address` (`host:port`)
    pub fn new(address: impl Into<String>, config: &ClientConfig) -> ClientResult<Self> {
        let address = address.into();
        if address.rsplit_once(':').is_none_or(|(host, port)| {
            host.is_empty() || port.parse::<u16>().is_err()
        }) {
            return Err(ClientError::config(format!(
                "netstring address must be host:port, got {}",
                address
            )));
        }

        Ok(Self {
            address,
            connect_timeout: config.timeouts.connect,
            max_frame_len: DEFAULT_MAX_FRAME_LEN,
        })
    }

    pub fn with_max_frame_len(mut self, max_frame_len: usize) -> Self {
        self.max_frame_len = max_frame_len;
        self
    }

    async fn connect(&self) -> ClientResult<TcpStream> {
        match tokio::time::timeout(self.connect_timeout, TcpStream::connect(&self.address)).await {
            Ok(Ok(stream)) => Ok(stream),
            Ok(Err(e)) => Err(TransportError::ConnectionFailed(format!(
                "{}: {}",
                self.address, e
            ))
            .into()),
            Err(_) => Err(ClientError::Timeout),
        }
    }
}

#[async_trait]
impl Transport for NetstringTransport {
    fn transport_type(&self) -> TransportType {
        TransportType::Netstring
    }

    fn endpoint(&self) -> String {
        self.address.clone()
    }

    async fn send(&self, body: Bytes) -> ClientResult<Option<Bytes>> {
        let stream = self.connect().await?;
        let mut framed = Framed::new(stream, NetstringCodec::with_max_frame_len(self.max_frame_len));

        framed.send(body).await.map_err(TransportError::from)?;

        match framed.next().await {
            Some(frame) => Ok(Some(frame.map_err(TransportError::from)?)),
            None => {
                debug!("{} closed the connection without a reply", self.address);
                Ok(None)
            }
        }
    }
}
