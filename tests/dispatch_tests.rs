//! End-to-end dispatch tests against a local mock server.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::Deserialize;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use relaykit::{
    Accessory, Callbacks, Dispatcher, Identified, NetConfig, NetEvent, RequestDescriptor,
    ResponsePayload, Serializer,
};

#[derive(Debug, Deserialize)]
struct ApiResult {
    errcode: i64,
    errmsg: Option<String>,
    data: Option<serde_json::Value>,
}

impl ResponsePayload for ApiResult {
    fn business_code(&self) -> i64 {
        self.errcode
    }

    fn business_message(&self) -> Option<&str> {
        self.errmsg.as_deref()
    }
}

fn dispatcher_for(server: &MockServer) -> Dispatcher {
    Dispatcher::new(NetConfig::new().base_url(server.uri())).expect("dispatcher")
}

/// Shared log of lifecycle transitions, pushed to from accessories and
/// callbacks.
type Log = Arc<Mutex<Vec<String>>>;

struct LoggingAccessory {
    log: Log,
}

impl Identified for LoggingAccessory {
    fn identifier(&self) -> &str {
        "logging"
    }
}

impl Accessory for LoggingAccessory {
    fn on_will_start(&self, _descriptor: &RequestDescriptor) {
        self.log.lock().unwrap().push("will_start".to_string());
    }

    fn on_will_complete(&self, _descriptor: &RequestDescriptor, success: bool) {
        self.log
            .lock()
            .unwrap()
            .push(format!("will_complete {success}"));
    }

    fn on_did_complete(&self, _descriptor: &RequestDescriptor, success: bool) {
        self.log
            .lock()
            .unwrap()
            .push(format!("did_complete {success}"));
    }
}

fn logging_callbacks(log: &Log) -> Callbacks<ApiResult> {
    let success_log = Arc::clone(log);
    let failure_log = Arc::clone(log);
    let completed_log = Arc::clone(log);
    Callbacks::new()
        .on_success(move |_d, _envelope| {
            success_log.lock().unwrap().push("success".to_string());
        })
        .on_failure(move |_d, error| {
            failure_log
                .lock()
                .unwrap()
                .push(format!("failure {}", error.code()));
        })
        .on_completed(move |_d, succeeded| {
            completed_log
                .lock()
                .unwrap()
                .push(format!("completed {succeeded}"));
        })
}

#[tokio::test]
async fn test_success_with_zero_business_code() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/banner"))
        .and(query_param("size", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "errcode": 0,
            "errmsg": null,
            "data": {"total": 1}
        })))
        .mount(&server)
        .await;

    let dispatcher = dispatcher_for(&server);
    let result: Arc<Mutex<Option<ApiResult>>> = Arc::new(Mutex::new(None));
    let captured = Arc::clone(&result);
    let log: Log = Arc::new(Mutex::new(Vec::new()));
    let completed_log = Arc::clone(&log);

    dispatcher
        .dispatch::<ApiResult, _>(
            RequestDescriptor::new("/banner").parameter("size", 10),
            Callbacks::new()
                .on_success(move |_d, envelope| {
                    assert_eq!(envelope.status, 200);
                    *captured.lock().unwrap() = envelope.payload;
                })
                .on_completed(move |_d, succeeded| {
                    completed_log
                        .lock()
                        .unwrap()
                        .push(format!("completed {succeeded}"));
                }),
        )
        .await;

    let payload = result.lock().unwrap().take().expect("missing payload");
    assert_eq!(payload.errcode, 0);
    assert_eq!(payload.data, Some(serde_json::json!({"total": 1})));
    assert_eq!(log.lock().unwrap().as_slice(), ["completed true"]);
}

#[tokio::test]
async fn test_lifecycle_order() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "errcode": 0, "errmsg": null, "data": null
        })))
        .mount(&server)
        .await;

    let log: Log = Arc::new(Mutex::new(Vec::new()));
    let dispatcher = dispatcher_for(&server);
    let descriptor = RequestDescriptor::new("/ping").add_accessory(Arc::new(LoggingAccessory {
        log: Arc::clone(&log),
    }));

    dispatcher
        .dispatch::<ApiResult, _>(descriptor, logging_callbacks(&log))
        .await;

    assert_eq!(
        log.lock().unwrap().as_slice(),
        [
            "will_start",
            "will_complete true",
            "success",
            "completed true",
            "did_complete true"
        ]
    );
}

#[tokio::test]
async fn test_business_error_fails_and_broadcasts_token_invalid() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "errcode": relaykit::TOKEN_INVALID,
            "errmsg": "token expired",
            "data": null
        })))
        .mount(&server)
        .await;

    let dispatcher = dispatcher_for(&server);
    let mut events = dispatcher.subscribe();
    let log: Log = Arc::new(Mutex::new(Vec::new()));

    dispatcher
        .dispatch::<ApiResult, _>(RequestDescriptor::new("/wallet"), logging_callbacks(&log))
        .await;

    assert_eq!(
        log.lock().unwrap().as_slice(),
        [
            format!("failure {}", relaykit::TOKEN_INVALID),
            "completed false".to_string()
        ]
    );
    match events.try_recv() {
        Ok(NetEvent::TokenInvalid { code, message }) => {
            assert_eq!(code, relaykit::TOKEN_INVALID);
            assert_eq!(message.as_deref(), Some("token expired"));
        }
        other => panic!("unexpected event: {other:?}"),
    }
}

#[tokio::test]
async fn test_table_code_broadcasts_debug_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "errcode": 404, "errmsg": null, "data": null
        })))
        .mount(&server)
        .await;

    let dispatcher = dispatcher_for(&server);
    let mut events = dispatcher.subscribe();
    let log: Log = Arc::new(Mutex::new(Vec::new()));

    dispatcher
        .dispatch::<ApiResult, _>(RequestDescriptor::new("/missing"), logging_callbacks(&log))
        .await;

    assert_eq!(
        log.lock().unwrap().as_slice(),
        ["failure 404", "completed false"]
    );
    match events.try_recv() {
        Ok(NetEvent::DebugError { message }) => {
            assert_eq!(Some(message.as_str()), relaykit::lookup_error_code(404));
        }
        other => panic!("unexpected event: {other:?}"),
    }
}

#[tokio::test]
async fn test_unknown_business_code_fails_without_event() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "errcode": 99999, "errmsg": "strange", "data": null
        })))
        .mount(&server)
        .await;

    let dispatcher = dispatcher_for(&server);
    let mut events = dispatcher.subscribe();
    let log: Log = Arc::new(Mutex::new(Vec::new()));

    dispatcher
        .dispatch::<ApiResult, _>(RequestDescriptor::new("/odd"), logging_callbacks(&log))
        .await;

    assert_eq!(
        log.lock().unwrap().as_slice(),
        ["failure 99999", "completed false"]
    );
    assert!(events.try_recv().is_err());
}

#[tokio::test]
async fn test_empty_status_is_success_without_payload() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let dispatcher = dispatcher_for(&server);
    let seen: Arc<Mutex<Option<(u16, bool)>>> = Arc::new(Mutex::new(None));
    let captured = Arc::clone(&seen);

    dispatcher
        .dispatch::<ApiResult, _>(
            RequestDescriptor::new("/orders").method(relaykit::Method::Delete),
            Callbacks::new().on_success(move |_d, envelope| {
                *captured.lock().unwrap() = Some((envelope.status, envelope.payload.is_none()));
            }),
        )
        .await;

    assert_eq!(*seen.lock().unwrap(), Some((204, true)));
}

#[tokio::test]
async fn test_malformed_body_is_format_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let dispatcher = dispatcher_for(&server);
    let log: Log = Arc::new(Mutex::new(Vec::new()));

    dispatcher
        .dispatch::<ApiResult, _>(RequestDescriptor::new("/broken"), logging_callbacks(&log))
        .await;

    assert_eq!(
        log.lock().unwrap().as_slice(),
        ["failure -5", "completed false"]
    );
}

#[tokio::test]
async fn test_shape_mismatch_is_mapping_error() {
    let server = MockServer::start().await;
    // Valid JSON, but missing the fields ApiResult requires.
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .mount(&server)
        .await;

    let dispatcher = dispatcher_for(&server);
    let log: Log = Arc::new(Mutex::new(Vec::new()));

    dispatcher
        .dispatch::<ApiResult, _>(RequestDescriptor::new("/shape"), logging_callbacks(&log))
        .await;

    assert_eq!(
        log.lock().unwrap().as_slice(),
        ["failure -6", "completed false"]
    );
}

#[tokio::test]
async fn test_transport_error() {
    // Nothing is listening on this port.
    let dispatcher =
        Dispatcher::new(NetConfig::new().base_url("http://127.0.0.1:9")).expect("dispatcher");
    let log: Log = Arc::new(Mutex::new(Vec::new()));

    dispatcher
        .dispatch::<ApiResult, _>(RequestDescriptor::new("/ping"), logging_callbacks(&log))
        .await;

    assert_eq!(
        log.lock().unwrap().as_slice(),
        ["failure -1", "completed false"]
    );
}

#[tokio::test]
async fn test_build_failure_reaches_failure_callback() {
    let dispatcher = Dispatcher::new(
        NetConfig::new().base_url("http://x.test/api"),
    )
    .expect("dispatcher");
    let log: Log = Arc::new(Mutex::new(Vec::new()));

    dispatcher
        .dispatch::<ApiResult, _>(
            RequestDescriptor::new("/ping").header("bad header", "x"),
            logging_callbacks(&log),
        )
        .await;

    assert_eq!(
        log.lock().unwrap().as_slice(),
        ["failure -3", "completed false"]
    );
}

#[derive(Debug, Deserialize)]
struct XmlResult {
    errcode: i64,
}

impl ResponsePayload for XmlResult {
    fn business_code(&self) -> i64 {
        self.errcode
    }
}

#[tokio::test]
async fn test_xml_payload() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<response><errcode>0</errcode></response>"),
        )
        .mount(&server)
        .await;

    let dispatcher = dispatcher_for(&server);
    let seen: Arc<Mutex<Option<i64>>> = Arc::new(Mutex::new(None));
    let captured = Arc::clone(&seen);

    dispatcher
        .dispatch::<XmlResult, _>(
            RequestDescriptor::new("/feed").serializer(Serializer::Xml),
            Callbacks::new().on_success(move |_d, envelope| {
                *captured.lock().unwrap() = envelope.payload.map(|p: XmlResult| p.errcode);
            }),
        )
        .await;

    assert_eq!(*seen.lock().unwrap(), Some(0));
}

#[tokio::test]
async fn test_custom_request_bypasses_builder() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/raw"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "errcode": 0, "errmsg": null, "data": null
        })))
        .mount(&server)
        .await;

    // No base URL configured anywhere; the custom request carries the full
    // target itself.
    let dispatcher = Dispatcher::new(NetConfig::new()).expect("dispatcher");
    let outbound = relaykit::OutboundRequest {
        url: format!("{}/raw", server.uri()).parse().unwrap(),
        method: relaykit::Method::Put,
        headers: Default::default(),
        body: None,
    };
    let log: Log = Arc::new(Mutex::new(Vec::new()));

    dispatcher
        .dispatch::<ApiResult, _>(
            RequestDescriptor::new("").custom_request(outbound),
            logging_callbacks(&log),
        )
        .await;

    assert_eq!(
        log.lock().unwrap().as_slice(),
        ["success", "completed true"]
    );
}

#[test]
fn test_submit_completes_on_global_runtime() {
    let server = relaykit::runtime::block_on(async {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "errcode": 0, "errmsg": null, "data": null
            })))
            .mount(&server)
            .await;
        server
    });

    let dispatcher = dispatcher_for(&server);
    let (tx, rx) = std::sync::mpsc::channel();
    dispatcher.submit::<ApiResult, _>(
        RequestDescriptor::new("/ping"),
        Callbacks::new().on_completed(move |_d, succeeded| {
            let _ = tx.send(succeeded);
        }),
    );

    let succeeded = rx.recv_timeout(Duration::from_secs(5)).expect("timed out");
    assert!(succeeded);
}
