//! Shared server fixtures for the integration tests.
//!
//! Every fixture binds port 0 so tests can run in parallel.

use std::net::SocketAddr;
use std::sync::{Arc, Once};

use tokio::net::TcpListener;
use twinrpc_echo_server::demo_registry;
use twinrpc_http_server::HttpJsonRpcServer;
use twinrpc_netstring::{NetstringConfig, NetstringServer};

pub const USERNAME: &str = "user";
pub const PASSWORD: &str = "secret";

static TRACING: Once = Once::new();

/// Honour RUST_LOG when debugging a failing test
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Start the demo HTTP server, optionally behind Basic credentials.
#[allow(dead_code)]
pub async fn start_http_server(with_credentials: bool) -> SocketAddr {
    init_tracing();

    let mut builder = HttpJsonRpcServer::builder().registry(Arc::new(demo_registry()));
    if with_credentials {
        builder = builder.credentials(USERNAME, PASSWORD);
    }
    let server = builder.build().expect("demo server config is valid");

    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local address");
    tokio::spawn(async move { server.serve(listener).await });
    addr
}

/// Start the demo netstring server.
#[allow(dead_code)]
pub async fn start_netstring_server() -> SocketAddr {
    init_tracing();

    let server = NetstringServer::new(NetstringConfig::default(), Arc::new(demo_registry()));
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local address");
    tokio::spawn(async move { server.serve(listener).await });
    addr
}

#[allow(dead_code)]
pub fn http_url(addr: SocketAddr) -> String {
    format!("http://{}/", addr)
}
