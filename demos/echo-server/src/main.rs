//! Echo Server
//!
//! Serves the demo handlers over HTTP and netstring at the same time.
//!
//! Usage:
//! ```bash
//! # Defaults: HTTP on 127.0.0.1:8999, netstring on 127.0.0.1:8998
//! RUST_LOG=info cargo run --package twinrpc-echo-server
//!
//! # Require Basic credentials on the HTTP endpoint
//! RUST_LOG=debug cargo run --package twinrpc-echo-server -- --username user --password secret
//!
//! # HTTP only
//! cargo run --package twinrpc-echo-server -- --no-netstring
//! ```

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use twinrpc_echo_server::demo_registry;
use twinrpc_http_server::HttpJsonRpcServer;
use twinrpc_netstring::{NetstringConfig, NetstringServer};

/// Command-line arguments for the echo server
#[derive(Parser, Debug)]
#[command(name = "echo-server")]
#[command(about = "JSON-RPC 1.0/2.0 demo server over HTTP and netstring")]
struct Args {
    /// HTTP bind address
    #[arg(long, env = "TWINRPC_HTTP_ADDR", default_value = "127.0.0.1:8999")]
    http_addr: SocketAddr,

    /// Path of the JSON-RPC endpoint
    #[arg(long, default_value = "/")]
    rpc_path: String,

    /// Netstring bind address
    #[arg(long, env = "TWINRPC_NETSTRING_ADDR", default_value = "127.0.0.1:8998")]
    netstring_addr: SocketAddr,

    /// Do not start the netstring server
    #[arg(long)]
    no_netstring: bool,

    /// Maximum request size in bytes, for both transports
    #[arg(long, default_value_t = 1024 * 1024)]
    max_request_size: usize,

    /// Username required on the HTTP endpoint
    #[arg(long, env = "TWINRPC_USERNAME", requires = "password")]
    username: Option<String>,

    /// Password required on the HTTP endpoint
    #[arg(long, env = "TWINRPC_PASSWORD", requires = "username")]
    password: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .init();

    let args = Args::parse();
    let registry = Arc::new(demo_registry());
    info!("Registered methods: {}", registry.registered_methods().join(", "));

    let mut builder = HttpJsonRpcServer::builder()
        .bind_address(args.http_addr)
        .rpc_path(args.rpc_path)
        .max_body_size(args.max_request_size)
        .registry(Arc::clone(&registry));
    if let (Some(username), Some(password)) = (args.username, args.password) {
        info!("HTTP Basic authentication enabled for user {}", username);
        builder = builder.credentials(username, password);
    }
    let http = builder.build().context("invalid HTTP server configuration")?;

    if args.no_netstring {
        http.run().await?;
        return Ok(());
    }

    let netstring = NetstringServer::new(
        NetstringConfig::default()
            .bind_address(args.netstring_addr)
            .max_frame_len(args.max_request_size),
        registry,
    );

    tokio::select! {
        result = http.run() => result.context("HTTP server stopped")?,
        result = netstring.run() => result.context("netstring server stopped")?,
        _ = tokio::signal::ctrl_c() => info!("Shutting down"),
    }
    Ok(())
}
