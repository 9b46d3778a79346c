//! HTTP request handler for JSON-RPC over POST

use std::sync::Arc;

use bytes::Bytes;
use http::header::{ALLOW, CONTENT_LENGTH, CONTENT_TYPE, WWW_AUTHENTICATE};
use http::{HeaderValue, Method, Request, Response, StatusCode};
use http_body::Body;
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use tracing::{debug, error, warn};
use twinrpc_json_rpc::BatchCoordinator;

use crate::auth;
use crate::server::ServerConfig;

/// Media types accepted for request bodies
const JSON_CONTENT_TYPES: [&str; 2] = ["application/json", "text/json"];

/// Handles one HTTP request against the configured endpoint.
#[derive(Debug, Clone)]
pub struct RpcHttpHandler {
    config: Arc<ServerConfig>,
    coordinator: Arc<BatchCoordinator>,
}

impl RpcHttpHandler {
    pub fn new(config: Arc<ServerConfig>, coordinator: Arc<BatchCoordinator>) -> Self {
        Self {
            config,
            coordinator,
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Route, authenticate and answer a request.
    ///
    /// Transport problems are answered with a plain-text status; everything
    /// that reaches the coordinator is answered with JSON-RPC.
    pub async fn handle<B>(&self, req: Request<B>) -> Response<Full<Bytes>>
    where
        B: Body,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let path = req.uri().path();
        debug!("Handling {} {}", req.method(), path);

        if path != self.config.rpc_path {
            return text_response(StatusCode::NOT_FOUND, "Not Found");
        }

        if let Some(credentials) = &self.config.credentials {
            if !auth::authorize(credentials, req.headers()) {
                warn!("Rejected request with missing or invalid credentials");
                let mut response = text_response(StatusCode::UNAUTHORIZED, "Unauthorized");
                if let Ok(challenge) = HeaderValue::from_str(&auth::challenge()) {
                    response.headers_mut().insert(WWW_AUTHENTICATE, challenge);
                }
                return response;
            }
        }

        if req.method() != Method::POST {
            let mut response = text_response(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed");
            response
                .headers_mut()
                .insert(ALLOW, HeaderValue::from_static("POST"));
            return response;
        }

        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|ct| ct.to_str().ok())
            .unwrap_or("");
        if !is_json_content_type(content_type) {
            warn!("Invalid content type: {}", content_type);
            return text_response(
                StatusCode::BAD_REQUEST,
                "Content-Type must be application/json",
            );
        }

        let body = match Limited::new(req.into_body(), self.config.max_body_size)
            .collect()
            .await
        {
            Ok(collected) => collected.to_bytes(),
            Err(err) if err.downcast_ref::<LengthLimitError>().is_some() => {
                warn!(
                    "Request body larger than {} bytes",
                    self.config.max_body_size
                );
                return text_response(StatusCode::PAYLOAD_TOO_LARGE, "Request body too large");
            }
            Err(err) => {
                error!("Failed to read request body: {}", err);
                return text_response(StatusCode::BAD_REQUEST, "Failed to read request body");
            }
        };

        match self.coordinator.handle(&body).await {
            Some(reply) => json_response(reply),
            None => {
                debug!("No response to send");
                let mut response = Response::new(Full::new(Bytes::new()));
                *response.status_mut() = StatusCode::NO_CONTENT;
                response
            }
        }
    }
}

/// `application/json` or `text/json`, with optional parameters.
fn is_json_content_type(value: &str) -> bool {
    let media_type = value.split(';').next().unwrap_or("").trim();
    JSON_CONTENT_TYPES
        .iter()
        .any(|accepted| media_type.eq_ignore_ascii_case(accepted))
}

fn text_response(status: StatusCode, message: &'static str) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from_static(message.as_bytes())));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
    response
}

fn json_response(reply: Vec<u8>) -> Response<Full<Bytes>> {
    let length = HeaderValue::from(reply.len());
    let mut response = Response::new(Full::new(Bytes::from(reply)));
    let headers = response.headers_mut();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(CONTENT_LENGTH, length);
    response
}
