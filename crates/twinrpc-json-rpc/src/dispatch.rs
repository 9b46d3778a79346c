use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tracing::{debug, warn};

use crate::error::JsonRpcError;
use crate::registry::MethodRegistry;
use crate::request::RequestParams;
use crate::response::Outcome;

/// Resolves a method in the registry, binds its params and runs it.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: Arc<MethodRegistry>,
}

impl Dispatcher {
    pub fn new(registry: Arc<MethodRegistry>) -> Self {
        Self { registry }
    }

    /// Invoke `method` and resolve to its outcome.
    ///
    /// The returned error carries no address; the caller attaches the id and
    /// version of the call when shaping the response. A handler that panics
    /// is reported as an internal error.
    pub async fn invoke(&self, method: &str, params: Option<RequestParams>) -> Outcome {
        let entry = self
            .registry
            .resolve(method)
            .ok_or_else(|| JsonRpcError::method_not_found(method))?;
        let args = entry.signature.bind(method, params)?;

        debug!(method = %method, args = args.len(), "Invoking handler");
        match AssertUnwindSafe(entry.handler.call(args)).catch_unwind().await {
            Ok(result) => result.map_err(JsonRpcError::from),
            Err(panic) => {
                let message = panic
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "handler panicked".to_string());
                warn!(method = %method, "Handler panicked: {}", message);
                Err(JsonRpcError::internal_error(message))
            }
        }
    }
}
