//! Demo handlers shared by the echo server binary and the integration tests.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::debug;
use twinrpc_json_rpc::prelude::*;

/// Default pause for `slow_echo`, in milliseconds
pub const DEFAULT_SLOW_ECHO_DELAY_MS: u64 = 50;

/// `describe(name, greeting="Hello")`: exercises keyword binding and defaults.
struct Describe;

#[async_trait]
impl RpcHandler for Describe {
    async fn call(&self, args: Arguments) -> Result<Value, HandlerError> {
        let name: String = args.parse("name")?;
        let greeting: String = args.parse("greeting")?;
        Ok(json!(format!("{}, {}!", greeting, name)))
    }
}

/// Registry with every demo method.
pub fn demo_registry() -> MethodRegistry {
    let mut registry = MethodRegistry::new();

    registry.register_fn("echo", MethodSignature::positional(&["data"]), |args| {
        Ok(args.get("data").cloned().unwrap_or(Value::Null))
    });

    registry.register_fn("add", MethodSignature::positional(&["a", "b"]), |args| {
        match (args.get("a"), args.get("b")) {
            (Some(Value::Number(a)), Some(Value::Number(b))) => match (a.as_i64(), b.as_i64()) {
                (Some(a), Some(b)) => a
                    .checked_add(b)
                    .map(Value::from)
                    .ok_or_else(|| HandlerError::new("integer overflow")),
                _ => Ok(json!(a.as_f64().unwrap_or_default() + b.as_f64().unwrap_or_default())),
            },
            (Some(Value::String(a)), Some(Value::String(b))) => Ok(json!(format!("{}{}", a, b))),
            _ => Err(HandlerError::invalid_params(
                "add() expects two numbers or two strings",
            )),
        }
    });

    registry.register_fn("fail", MethodSignature::new(), |_| {
        Err(HandlerError::new("The method raised an exception!"))
    });

    registry.register_async(
        "slow_echo",
        MethodSignature::new()
            .required("data")
            .optional("delay_ms", json!(DEFAULT_SLOW_ECHO_DELAY_MS)),
        |args| async move {
            let delay_ms: u64 = args.parse("delay_ms")?;
            debug!("slow_echo sleeping {}ms", delay_ms);
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            Ok(args.get("data").cloned().unwrap_or(Value::Null))
        },
    );

    registry.register_fn("return_none", MethodSignature::new(), |_| Ok(Value::Null));

    registry.register(
        "describe",
        MethodSignature::new()
            .required("name")
            .optional("greeting", json!("Hello")),
        Describe,
    );

    registry
}
