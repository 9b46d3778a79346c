//! HTTP JSON-RPC server: configuration, builder and accept loop.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tracing::{debug, error, info};
use twinrpc_json_rpc::{BatchCoordinator, Credentials, MethodRegistry};

use crate::handler::RpcHttpHandler;
use crate::{HttpServerError, Result};

/// Configuration for the HTTP JSON-RPC server
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to
    pub bind_address: SocketAddr,
    /// Path of the JSON-RPC endpoint
    pub rpc_path: String,
    /// Maximum request body size
    pub max_body_size: usize,
    /// Required Basic credentials, if any
    pub credentials: Option<Credentials>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from(([127, 0, 0, 1], 8999)),
            rpc_path: "/".to_string(),
            max_body_size: 1024 * 1024, // 1MB
            credentials: None,
        }
    }
}

/// Builder for [`HttpJsonRpcServer`]
#[derive(Debug, Default)]
pub struct HttpJsonRpcServerBuilder {
    config: ServerConfig,
    registry: Option<Arc<MethodRegistry>>,
}

impl HttpJsonRpcServerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the bind address
    pub fn bind_address(mut self, addr: SocketAddr) -> Self {
        self.config.bind_address = addr;
        self
    }

    /// Set the JSON-RPC endpoint path
    pub fn rpc_path(mut self, path: impl Into<String>) -> Self {
        self.config.rpc_path = path.into();
        self
    }

    /// Set maximum request body size
    pub fn max_body_size(mut self, size: usize) -> Self {
        self.config.max_body_size = size;
        self
    }

    /// Require HTTP Basic authentication
    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.config.credentials = Some(Credentials::new(username, password));
        self
    }

    /// Methods served by this server
    pub fn registry(mut self, registry: Arc<MethodRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Result<HttpJsonRpcServer> {
        if !self.config.rpc_path.starts_with('/') {
            return Err(HttpServerError::Config(format!(
                "rpc path must start with '/': {}",
                self.config.rpc_path
            )));
        }
        if self.config.max_body_size == 0 {
            return Err(HttpServerError::Config(
                "max body size must be greater than zero".to_string(),
            ));
        }

        let registry = self.registry.unwrap_or_default();
        let coordinator = Arc::new(BatchCoordinator::new(registry));
        let handler = RpcHttpHandler::new(Arc::new(self.config), coordinator);
        Ok(HttpJsonRpcServer { handler })
    }
}

/// JSON-RPC over HTTP POST, one tokio task per connection.
#[derive(Debug, Clone)]
pub struct HttpJsonRpcServer {
    handler: RpcHttpHandler,
}

impl HttpJsonRpcServer {
    pub fn builder() -> HttpJsonRpcServerBuilder {
        HttpJsonRpcServerBuilder::new()
    }

    pub fn config(&self) -> &ServerConfig {
        self.handler.config()
    }

    /// Bind the configured address and serve until an accept fails.
    pub async fn run(&self) -> Result<()> {
        let listener = TcpListener::bind(self.config().bind_address).await?;
        self.serve(listener).await
    }

    /// Serve on an already bound listener.
    pub async fn serve(&self, listener: TcpListener) -> Result<()> {
        let local_addr = listener.local_addr()?;
        info!("JSON-RPC HTTP server listening on {}", local_addr);
        info!("JSON-RPC endpoint available at: {}", self.config().rpc_path);

        loop {
            let (stream, peer_addr) = listener.accept().await?;
            debug!("New connection from {}", peer_addr);

            let handler = self.handler.clone();
            tokio::spawn(async move {
                let io = TokioIo::new(stream);
                let service = service_fn(move |req| {
                    let handler = handler.clone();
                    async move { Ok::<_, Infallible>(handler.handle(req).await) }
                });

                if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                    if err.is_incomplete_message() {
                        debug!("Client disconnected: {}", err);
                    } else {
                        error!("Error serving connection: {}", err);
                    }
                }
            });
        }
    }
}
