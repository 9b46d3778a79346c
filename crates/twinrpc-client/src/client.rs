//! High level JSON-RPC proxy

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info};
use twinrpc_json_rpc::{
    CallId, IdGenerator, RandomIdGenerator, RequestParams, decode_response, encode_request,
};

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::transport::{BoxedTransport, HttpTransport, NetstringTransport};

/// Calls remote methods over any [`Transport`](crate::transport::Transport).
///
/// Every call is independent: a fresh request id, a fresh encode and, on the
/// netstring transport, a fresh connection.
pub struct JsonRpcClient {
    transport: Arc<BoxedTransport>,
    config: ClientConfig,
    ids: Arc<dyn IdGenerator>,
}

impl JsonRpcClient {
    pub fn new(transport: BoxedTransport, config: ClientConfig) -> Self {
        Self {
            transport: Arc::new(transport),
            config,
            ids: Arc::new(RandomIdGenerator),
        }
    }

    /// Client posting to an HTTP endpoint such as `http://127.0.0.1:8999/`
    pub fn http(url: &str, config: ClientConfig) -> ClientResult<Self> {
        let transport = HttpTransport::new(url, &config)?;
        Ok(Self::new(Box::new(transport), config))
    }

    /// Client talking to a netstring server at `host:port`
    pub fn netstring(address: &str, config: ClientConfig) -> ClientResult<Self> {
        let transport = NetstringTransport::new(address, &config)?;
        Ok(Self::new(Box::new(transport), config))
    }

    /// Replace the random id source
    pub fn with_id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn endpoint(&self) -> String {
        self.transport.endpoint()
    }

    /// Call `method` and return its result.
    ///
    /// `params` is sent verbatim when present and omitted otherwise.
    pub async fn call(&self, method: &str, params: Option<RequestParams>) -> ClientResult<Value> {
        let reply = self.exchange(method, params.as_ref(), CallId::Auto).await?;
        match reply {
            Some(bytes) => Ok(decode_response(&bytes)?),
            None => Err(ClientError::InvalidResponse(format!(
                "empty response to {}()",
                method
            ))),
        }
    }

    /// Call with positional arguments. An empty list is still sent as `[]`.
    pub async fn call_positional(&self, method: &str, args: Vec<Value>) -> ClientResult<Value> {
        self.call(method, Some(RequestParams::Array(args))).await
    }

    /// Call with keyword arguments
    pub async fn call_named(
        &self,
        method: &str,
        args: HashMap<String, Value>,
    ) -> ClientResult<Value> {
        self.call(method, Some(RequestParams::Object(args))).await
    }

    /// Call and deserialize the result into `T`
    pub async fn call_as<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Option<RequestParams>,
    ) -> ClientResult<T> {
        let value = self.call(method, params).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Send a notification. Nothing is expected back and nothing is decoded.
    pub async fn notify(&self, method: &str, params: Option<RequestParams>) -> ClientResult<()> {
        if let Some(reply) = self.exchange(method, params.as_ref(), CallId::Notification).await? {
            debug!("Ignoring {} byte reply to notification {}", reply.len(), method);
        }
        Ok(())
    }

    async fn exchange(
        &self,
        method: &str,
        params: Option<&RequestParams>,
        id: CallId,
    ) -> ClientResult<Option<Bytes>> {
        let body = encode_request(method, params, id, self.config.version, self.ids.as_ref())?;
        if self.config.verbose {
            info!("Sending: {}", String::from_utf8_lossy(&body));
        } else {
            debug!("Sending {} to {}", method, self.transport.endpoint());
        }

        let send = self.transport.send(Bytes::from(body));
        match tokio::time::timeout(self.config.timeouts.request, send).await {
            Ok(result) => result,
            Err(_) => Err(ClientError::Timeout),
        }
    }
}

impl std::fmt::Debug for JsonRpcClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonRpcClient")
            .field("transport", &self.transport.transport_type())
            .field("endpoint", &self.transport.endpoint())
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use crate::transport::{Transport, TransportType};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use serde_json::json;
    use std::time::Duration;
    use twinrpc_json_rpc::{SequentialIdGenerator, Version};

    /// Records every body and answers with a canned reply
    struct MockTransport {
        sent: Arc<Mutex<Vec<Value>>>,
        reply: Option<&'static str>,
        delay: Duration,
    }

    #[async_trait]
    impl Transport for MockTransport {
        fn transport_type(&self) -> TransportType {
            TransportType::Http
        }

        fn endpoint(&self) -> String {
            "mock://".to_string()
        }

        async fn send(&self, body: Bytes) -> ClientResult<Option<Bytes>> {
            self.sent.lock().push(serde_json::from_slice(&body)?);
            tokio::time::sleep(self.delay).await;
            Ok(self.reply.map(|reply| Bytes::from_static(reply.as_bytes())))
        }
    }

    fn mock_client(
        reply: Option<&'static str>,
        config: ClientConfig,
    ) -> (JsonRpcClient, Arc<Mutex<Vec<Value>>>) {
        let sent = Arc::new(Mutex::new(Vec::new()));
        let transport = MockTransport {
            sent: Arc::clone(&sent),
            reply,
            delay: Duration::ZERO,
        };
        let client = JsonRpcClient::new(Box::new(transport), config)
            .with_id_generator(Arc::new(SequentialIdGenerator::new(7)));
        (client, sent)
    }

    #[tokio::test]
    async fn test_call_positional_v1() {
        let (client, sent) = mock_client(
            Some(r#"{"result": "AB", "error": null, "id": 7}"#),
            ClientConfig::default(),
        );

        let result = client.call_positional("echo", vec![json!("AB")]).await.unwrap();
        assert_eq!(result, json!("AB"));
        assert_eq!(
            sent.lock()[0],
            json!({"method": "echo", "id": 7, "params": ["AB"]})
        );
    }

    #[tokio::test]
    async fn test_call_named_v2() {
        let (client, sent) = mock_client(
            Some(r#"{"jsonrpc": "2.0", "result": 3, "id": 7}"#),
            ClientConfig::default().with_version(Version::V2),
        );

        let args = HashMap::from([("a".to_string(), json!(1)), ("b".to_string(), json!(2))]);
        let result: i64 = client
            .call_as("add", Some(RequestParams::Object(args)))
            .await
            .unwrap();
        assert_eq!(result, 3);

        let request = sent.lock()[0].clone();
        assert_eq!(request["jsonrpc"], json!("2.0"));
        assert_eq!(request["params"], json!({"a": 1, "b": 2}));
    }

    #[tokio::test]
    async fn test_call_without_params_omits_member() {
        let (client, sent) = mock_client(
            Some(r#"{"result": null, "error": null, "id": 7}"#),
            ClientConfig::default(),
        );
        assert_eq!(client.call("return_none", None).await.unwrap(), Value::Null);
        assert!(sent.lock()[0].get("params").is_none());
    }

    #[tokio::test]
    async fn test_error_response_is_protocol_error() {
        let (client, _) = mock_client(
            Some(r#"{"result": null, "error": {"message": "Method ECHO not found", "code": -32601}, "id": 7}"#),
            ClientConfig::default(),
        );

        let err = client.call_positional("ECHO", vec![]).await.unwrap_err();
        assert_eq!(err.error_code(), Some(-32601));
        match err {
            ClientError::Protocol(err) => assert_eq!(err.message, "Method ECHO not found"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_reply_to_call() {
        let (client, _) = mock_client(None, ClientConfig::default());
        let err = client.call("echo", None).await.unwrap_err();
        assert!(matches!(err, ClientError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_garbage_reply() {
        let (client, _) = mock_client(Some("<html>"), ClientConfig::default());
        let err = client.call("echo", None).await.unwrap_err();
        assert!(matches!(err, ClientError::Json(_)));
    }

    #[tokio::test]
    async fn test_notify_has_no_id() {
        let (client, sent) = mock_client(None, ClientConfig::default().with_verbose(true));
        client
            .notify("echo", Some(RequestParams::Array(vec![json!("x")])))
            .await
            .unwrap();
        let request = sent.lock()[0].clone();
        assert!(request.get("id").is_none());
        assert_eq!(request["method"], json!("echo"));
    }

    #[tokio::test]
    async fn test_ids_are_fresh_per_call() {
        let (client, sent) = mock_client(
            Some(r#"{"result": 1, "error": null, "id": 0}"#),
            ClientConfig::default(),
        );
        client.call("a", None).await.unwrap();
        client.call("b", None).await.unwrap();
        let sent = sent.lock();
        assert_eq!(sent[0]["id"], json!(7));
        assert_eq!(sent[1]["id"], json!(8));
    }

    #[tokio::test]
    async fn test_request_timeout() {
        let transport = MockTransport {
            sent: Arc::new(Mutex::new(Vec::new())),
            reply: Some(r#"{"result": 1, "error": null, "id": 1}"#),
            delay: Duration::from_millis(500),
        };
        let config = ClientConfig::default().with_request_timeout(Duration::from_millis(20));
        let client = JsonRpcClient::new(Box::new(transport), config);

        let err = client.call("slow", None).await.unwrap_err();
        assert!(matches!(err, ClientError::Timeout));
    }

    #[test]
    fn test_constructors() {
        let client = JsonRpcClient::http("http://localhost:8999/", ClientConfig::default()).unwrap();
        assert_eq!(client.endpoint(), "http://localhost:8999/");

        let client = JsonRpcClient::netstring("localhost:8998", ClientConfig::default()).unwrap();
        assert_eq!(client.endpoint(), "localhost:8998");

        assert!(matches!(
            JsonRpcClient::http("ws://localhost/", ClientConfig::default()),
            Err(ClientError::Transport(TransportError::ConnectionFailed(_)))
        ));
    }
}
