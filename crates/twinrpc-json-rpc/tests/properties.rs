use std::sync::Arc;

use proptest::prelude::*;
use serde_json::{json, Value};
use tokio::runtime::Runtime;
use twinrpc_json_rpc::id::ID_MAX;
use twinrpc_json_rpc::prelude::*;
use twinrpc_json_rpc::{decode_request, encode_request, verify, Request, SequentialIdGenerator};

fn coordinator() -> BatchCoordinator {
    let mut registry = MethodRegistry::new();
    registry.register_fn("echo", MethodSignature::positional(&["data"]), |args| {
        Ok(args.get("data").cloned().unwrap_or(Value::Null))
    });
    registry.register_fn("fail", MethodSignature::new(), |_| {
        Err(HandlerError::new("always fails"))
    });
    BatchCoordinator::new(Arc::new(registry))
}

fn scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<i32>().prop_map(Value::from),
        "[a-zA-Z0-9 ]{0,8}".prop_map(Value::from),
        any::<bool>().prop_map(Value::from),
        Just(Value::Null),
    ]
}

fn request_id() -> impl Strategy<Value = RequestId> {
    prop_oneof![
        (1..=ID_MAX).prop_map(RequestId::Number),
        "[a-z0-9]{1,10}".prop_map(RequestId::String),
    ]
}

fn version() -> impl Strategy<Value = Version> {
    prop_oneof![Just(Version::V1), Just(Version::V2)]
}

fn params() -> impl Strategy<Value = Option<RequestParams>> {
    prop_oneof![
        Just(None),
        prop::collection::vec(scalar(), 0..4).prop_map(|items| Some(RequestParams::Array(items))),
        prop::collection::hash_map("[a-z]{1,6}", scalar(), 0..4)
            .prop_map(|map| Some(RequestParams::Object(map))),
    ]
}

fn wire_version() -> impl Strategy<Value = Option<Value>> {
    prop_oneof![
        Just(None),
        Just(Some(json!("2.0"))),
        Just(Some(json!("1.0"))),
        Just(Some(json!(2))),
        Just(Some(json!(1.0))),
    ]
}

fn wire_id() -> impl Strategy<Value = Option<Value>> {
    prop_oneof![
        Just(None),
        Just(Some(Value::Null)),
        any::<i64>().prop_map(|n| Some(Value::from(n))),
        "[a-z0-9]{0,6}".prop_map(|s| Some(Value::from(s))),
    ]
}

proptest! {
    #[test]
    fn test_encode_decode_request_round_trip(
        method in "[a-z_]{1,12}",
        params in params(),
        id in request_id(),
        version in version(),
    ) {
        let ids = SequentialIdGenerator::default();
        let bytes = encode_request(&method, params.as_ref(), CallId::Explicit(id.clone()), version, &ids).unwrap();
        let decoded = decode_request(&bytes).unwrap();

        let mut expected = json!({"method": method, "id": id.to_value()});
        if let Some(params) = &params {
            expected["params"] = params.to_value();
        }
        if version == Version::V2 {
            expected["jsonrpc"] = json!("2.0");
        }
        prop_assert_eq!(decoded, expected);
    }

    #[test]
    fn test_verify_is_idempotent(
        method in "[a-z]{1,8}",
        id in wire_id(),
        jsonrpc in wire_version(),
        params in params(),
    ) {
        let mut raw = json!({"method": method});
        if let Some(id) = id {
            raw["id"] = id;
        }
        if let Some(jsonrpc) = jsonrpc {
            raw["jsonrpc"] = jsonrpc;
        }
        if let Some(params) = params {
            raw["params"] = params.to_value();
        }

        let once = verify(&raw).unwrap();
        let twice = verify(&once.to_value()).unwrap();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn test_notifications_never_answered(
        method in prop_oneof![Just("echo"), Just("fail"), Just("missing")],
        params in params(),
        version in version(),
    ) {
        let request = Request::new(method, params, None).with_version(version);
        let body = serde_json::to_vec(&request).unwrap();

        let rt = Runtime::new().unwrap();
        let response = rt.block_on(coordinator().handle(&body));
        prop_assert!(response.is_none());
    }

    #[test]
    fn test_batch_answers_only_calls_in_order(
        elements in prop::collection::vec((any::<bool>(), version()), 1..12),
    ) {
        let batch: Vec<Value> = elements
            .iter()
            .enumerate()
            .map(|(i, (notify, version))| {
                let id = if *notify { None } else { Some(RequestId::Number(i as i64 + 1)) };
                Request::new("echo", Some(RequestParams::Array(vec![json!(i)])), id)
                    .with_version(*version)
                    .to_value()
            })
            .collect();
        let expected_ids: Vec<Value> = elements
            .iter()
            .enumerate()
            .filter(|(_, (notify, _))| !notify)
            .map(|(i, _)| json!(i as i64 + 1))
            .collect();

        let rt = Runtime::new().unwrap();
        let body = serde_json::to_vec(&batch).unwrap();
        let response = rt.block_on(coordinator().handle(&body));

        let entries: Vec<Value> = match response {
            None => Vec::new(),
            Some(bytes) => match serde_json::from_slice::<Value>(&bytes).unwrap() {
                Value::Array(entries) => entries,
                single => vec![single],
            },
        };
        let ids: Vec<Value> = entries.iter().map(|entry| entry["id"].clone()).collect();
        prop_assert_eq!(ids, expected_ids);
    }

    #[test]
    fn test_response_shape_per_version(
        method in prop_oneof![Just("echo"), Just("fail"), Just("missing")],
        id in request_id(),
        version in version(),
    ) {
        let request = Request::new(method, Some(RequestParams::Array(vec![json!("x")])), Some(id))
            .with_version(version);
        let body = serde_json::to_vec(&request).unwrap();

        let rt = Runtime::new().unwrap();
        let bytes = rt.block_on(coordinator().handle(&body)).unwrap();
        let response: Value = serde_json::from_slice(&bytes).unwrap();
        let envelope = response.as_object().unwrap();

        match version {
            Version::V1 => {
                prop_assert!(envelope.contains_key("result"));
                prop_assert!(envelope.contains_key("error"));
                prop_assert!(envelope["result"].is_null() || envelope["error"].is_null());
                prop_assert!(!envelope.contains_key("jsonrpc"));
            }
            Version::V2 => {
                prop_assert_eq!(envelope.get("jsonrpc"), Some(&json!("2.0")));
                prop_assert!(envelope.contains_key("result") != envelope.contains_key("error"));
            }
        }
    }
}
