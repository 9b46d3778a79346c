//! Echo Client
//!
//! Calls one method on a JSON-RPC server and prints the result as JSON.
//!
//! Usage:
//! ```bash
//! # Positional arguments are parsed as JSON, falling back to plain strings
//! cargo run --package twinrpc-echo-client -- echo hello
//! cargo run --package twinrpc-echo-client -- add 2 3
//!
//! # Keyword arguments over JSON-RPC 2.0
//! cargo run --package twinrpc-echo-client -- --rpc-version 2 describe --named name=Ada --named greeting=Hi
//!
//! # Netstring transport
//! cargo run --package twinrpc-echo-client -- --transport netstring --url 127.0.0.1:8998 echo hello
//! ```

use std::collections::HashMap;
use std::time::Duration;

use anyhow::{Result, anyhow, bail};
use clap::{Parser, ValueEnum};
use serde_json::Value;
use tracing::debug;
use twinrpc_client::prelude::*;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum TransportKind {
    Http,
    Netstring,
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Transport to use
    #[arg(short, long, value_enum, default_value = "http")]
    transport: TransportKind,

    /// Server URL (HTTP) or host:port (netstring)
    #[arg(short, long, env = "TWINRPC_URL")]
    url: Option<String>,

    /// Protocol version, 1 or 2
    #[arg(long, default_value = "1")]
    rpc_version: String,

    /// Request timeout in seconds
    #[arg(long, default_value = "30")]
    timeout: u64,

    /// Log every request body before sending it
    #[arg(short, long)]
    verbose: bool,

    /// Send as a notification and do not wait for a result
    #[arg(long)]
    notify: bool,

    /// HTTP Basic username
    #[arg(long, env = "TWINRPC_USERNAME", requires = "password")]
    username: Option<String>,

    /// HTTP Basic password
    #[arg(long, env = "TWINRPC_PASSWORD", requires = "username")]
    password: Option<String>,

    /// Keyword argument as name=value; cannot be mixed with positional arguments
    #[arg(short, long = "named", value_name = "NAME=VALUE", conflicts_with = "params")]
    named: Vec<String>,

    /// Method to call
    method: String,

    /// Positional arguments
    params: Vec<String>,
}

/// JSON when it parses, a plain string otherwise.
fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

fn parse_version(raw: &str) -> Result<Version> {
    Version::from_wire(&Value::String(raw.to_string()))
        .map_err(|_| anyhow!("invalid protocol version: {}", raw))
}

fn build_params(args: &Args) -> Result<RequestParams> {
    if args.named.is_empty() {
        return Ok(RequestParams::Array(
            args.params.iter().map(|raw| parse_value(raw)).collect(),
        ));
    }

    let mut named = HashMap::new();
    for pair in &args.named {
        let Some((name, value)) = pair.split_once('=') else {
            bail!("expected NAME=VALUE, got {}", pair);
        };
        named.insert(name.to_string(), parse_value(value));
    }
    Ok(RequestParams::Object(named))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_target(false)
        .without_time()
        .init();

    let mut config = ClientConfig::default()
        .with_version(parse_version(&args.rpc_version)?)
        .with_request_timeout(Duration::from_secs(args.timeout))
        .with_verbose(args.verbose);
    if let (Some(username), Some(password)) = (&args.username, &args.password) {
        config = config.with_credentials(username, password);
    }

    let client = match args.transport {
        TransportKind::Http => {
            let url = args.url.as_deref().unwrap_or("http://127.0.0.1:8999/");
            JsonRpcClient::http(url, config)?
        }
        TransportKind::Netstring => {
            let address = args.url.as_deref().unwrap_or("127.0.0.1:8998");
            JsonRpcClient::netstring(address, config)?
        }
    };
    debug!("Using {:?}", client);

    let params = build_params(&args)?;
    if args.notify {
        client.notify(&args.method, Some(params)).await?;
        return Ok(());
    }

    match client.call(&args.method, Some(params)).await {
        Ok(result) => {
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(())
        }
        Err(ClientError::Protocol(err)) => {
            bail!("{} (code {})", err.message, err.code.code())
        }
        Err(err) => Err(err.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_value() {
        assert_eq!(parse_value("3"), json!(3));
        assert_eq!(parse_value("[1, 2]"), json!([1, 2]));
        assert_eq!(parse_value("hello"), json!("hello"));
        assert_eq!(parse_value("\"quoted\""), json!("quoted"));
    }

    #[test]
    fn test_parse_version() {
        assert_eq!(parse_version("1").unwrap(), Version::V1);
        assert_eq!(parse_version("2.0").unwrap(), Version::V2);
        assert!(parse_version("two").is_err());
    }

    #[test]
    fn test_build_params() {
        let args = Args::parse_from(["echo-client", "add", "2", "3"]);
        assert_eq!(
            build_params(&args).unwrap(),
            RequestParams::Array(vec![json!(2), json!(3)])
        );

        let args = Args::parse_from(["echo-client", "describe", "--named", "name=Ada"]);
        assert_eq!(
            build_params(&args).unwrap().to_value(),
            json!({"name": "Ada"})
        );

        let args = Args::parse_from(["echo-client", "describe", "--named", "oops"]);
        assert!(build_params(&args).is_err());
    }
}
