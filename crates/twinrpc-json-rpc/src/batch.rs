use std::sync::Arc;

use futures::future::join_all;
use serde_json::Value;
use tracing::{debug, error};

use crate::codec::decode_request;
use crate::dispatch::Dispatcher;
use crate::registry::MethodRegistry;
use crate::response::Response;
use crate::validate::{expects_reply, verify};

/// Turns one request body into one response body.
///
/// A body that is not JSON is answered with a parse error addressed to
/// `id: null`. Each element of a batch is validated and dispatched on its
/// own; all of them run concurrently and the replies keep input order.
/// Notifications produce no entry, but an element that is not an object or
/// carries an id of the wrong type is answered at `id: null`. The reply is `None` when no entry remains, the bare object when
/// one remains (even for a batch), and an array otherwise.
#[derive(Debug, Clone)]
pub struct BatchCoordinator {
    dispatcher: Dispatcher,
}

impl BatchCoordinator {
    pub fn new(registry: Arc<MethodRegistry>) -> Self {
        Self {
            dispatcher: Dispatcher::new(registry),
        }
    }

    pub async fn handle(&self, body: &[u8]) -> Option<Vec<u8>> {
        let decoded = match decode_request(body) {
            Ok(decoded) => decoded,
            Err(err) => {
                debug!(len = body.len(), "Rejecting unparseable request body");
                return assemble(vec![Response::from_error(&err)]);
            }
        };

        let elements = match decoded {
            Value::Array(elements) => elements,
            single => vec![single],
        };
        if elements.is_empty() {
            debug!("Empty batch, nothing to answer");
            return None;
        }

        let entries = join_all(elements.iter().map(|element| self.process(element)))
            .await
            .into_iter()
            .flatten()
            .collect();
        assemble(entries)
    }

    async fn process(&self, element: &Value) -> Option<Response> {
        let request = match verify(element) {
            Ok(request) => request,
            Err(err) => {
                debug!(id = ?err.id, "Invalid request: {}", err.message);
                return expects_reply(element).then(|| Response::from_error(&err));
            }
        };

        debug!(method = %request.method, id = ?request.id, version = %request.version, "Dispatching call");
        let outcome = self
            .dispatcher
            .invoke(&request.method, request.params)
            .await;

        match request.id {
            Some(id) => Some(Response::from_outcome(&outcome, Some(id), request.version)),
            None => {
                if let Err(err) = &outcome {
                    debug!(method = %request.method, "Notification failed: {}", err.message);
                }
                None
            }
        }
    }
}

fn assemble(mut entries: Vec<Response>) -> Option<Vec<u8>> {
    let encoded = match entries.len() {
        0 => return None,
        1 => serde_json::to_vec(&entries.remove(0)),
        _ => serde_json::to_vec(&entries),
    };
    match encoded {
        Ok(bytes) => Some(bytes),
        Err(err) => {
            error!("Failed to encode response: {}", err);
            None
        }
    }
}
