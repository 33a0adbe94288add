#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::time::Duration;

use secrecy::SecretString;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_string_contains, method};
use wiremock::{Mock, MockServer, ResponseTemplate};
use zbx_relay::error::{Error as RelayError, ZbxError};
use zbx_relay::types::{EventValue, PollWindow};
use zbx_relay::zbx_client::{MonitoringApi, Session, ZbxClient};

const WINDOW: PollWindow = PollWindow {
    from: 1_700_000_000,
    till: 1_700_000_010,
};

fn client(base: &MockServer) -> ZbxClient {
    client_with_timeout(base, Duration::from_secs(2))
}

fn client_with_timeout(base: &MockServer, timeout: Duration) -> ZbxClient {
    ZbxClient::new(
        Url::parse(&base.uri()).expect("valid mock url"),
        timeout,
        Duration::from_secs(1),
        true,
    )
    .expect("client")
}

fn legacy_session() -> Session {
    Session::new(SecretString::from("token"), "6.0.3")
}

fn rpc_ok(result: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "jsonrpc": "2.0",
        "result": result,
        "id": 1
    }))
}

async fn mount_login(server: &MockServer, version: &str) {
    Mock::given(method("POST"))
        .and(body_string_contains("apiinfo.version"))
        .respond_with(rpc_ok(json!(version)))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(body_string_contains("user.checkAuthentication"))
        .respond_with(rpc_ok(json!({ "userid": "1", "username": "Admin" })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn login_opens_session_with_server_version() {
    let server = MockServer::start().await;
    mount_login(&server, "6.0.3").await;

    let session = client(&server)
        .login(&SecretString::from("token"))
        .await
        .expect("login");
    assert_eq!(session.api_version(), "6.0.3");

    let requests = server.received_requests().await.expect("requests");
    assert_eq!(requests.len(), 2);
    let version_call: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(version_call["method"], "apiinfo.version");
    assert!(version_call.get("auth").is_none());
    let check_call: serde_json::Value = serde_json::from_slice(&requests[1].body).unwrap();
    assert_eq!(check_call["params"]["token"], "token");
}

#[tokio::test]
async fn login_with_rejected_token_is_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_string_contains("apiinfo.version"))
        .respond_with(rpc_ok(json!("6.0.3")))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_string_contains("user.checkAuthentication"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "error": {
                "code": -32602,
                "message": "Invalid params.",
                "data": "Session terminated, re-login, please."
            },
            "id": 1
        })))
        .expect(1)
        .mount(&server)
        .await;

    let err = client(&server)
        .login(&SecretString::from("bad"))
        .await
        .expect_err("login should fail");
    match err {
        RelayError::Auth(ZbxError::Api { code, message }) => {
            assert_eq!(code, -32602);
            assert!(message.contains("Session terminated"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn login_without_user_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_string_contains("apiinfo.version"))
        .respond_with(rpc_ok(json!("7.0.0")))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_string_contains("user.checkAuthentication"))
        .respond_with(rpc_ok(json!({})))
        .mount(&server)
        .await;

    let err = client(&server)
        .login(&SecretString::from("token"))
        .await
        .expect_err("login should fail");
    assert!(matches!(err, RelayError::Auth(ZbxError::Rejected)));
}

#[tokio::test]
async fn unreachable_server_fails_login_as_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = client(&server)
        .login(&SecretString::from("token"))
        .await
        .expect_err("login should fail");
    assert!(matches!(err, RelayError::Auth(_)));
}

#[tokio::test]
async fn list_resolved_events_parses_hosts_and_values() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_string_contains("event.get"))
        .respond_with(rpc_ok(json!([
            {
                "eventid": "101",
                "name": "Disk full",
                "clock": "1700000005",
                "value": "0",
                "hosts": [
                    { "hostid": "10084", "name": "web-1" },
                    { "hostid": "10085", "name": "web-2" }
                ]
            },
            {
                "eventid": "100",
                "name": "CPU high",
                "clock": 1_700_000_001,
                "value": 1,
                "hosts": []
            }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let events = client(&server)
        .list_resolved_events(&legacy_session(), WINDOW)
        .await
        .expect("events");

    assert_eq!(events.len(), 2);
    assert_eq!(events[0].event_id, "101");
    assert_eq!(events[0].clock, 1_700_000_005);
    assert!(events[0].value.is_resolved());
    assert_eq!(events[0].host_names(), vec!["web-1", "web-2"]);
    assert_eq!(events[1].value, EventValue::Problem);
    assert_eq!(events[1].host_names(), vec!["Unknown"]);
}

#[tokio::test]
async fn problem_request_payload_snapshot() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(rpc_ok(json!([])))
        .mount(&server)
        .await;

    let problems = client(&server)
        .list_open_problems(&legacy_session(), WINDOW)
        .await
        .expect("problems");
    assert!(problems.is_empty());

    let requests = server.received_requests().await.expect("requests");
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).expect("json body");
    insta::assert_json_snapshot!("problem_get_payload", body);
}

#[tokio::test]
async fn contiguous_windows_query_disjoint_seconds() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(rpc_ok(json!([])))
        .mount(&server)
        .await;

    let client = client(&server);
    let session = legacy_session();
    let first = PollWindow {
        from: 1000,
        till: 1010,
    };
    let second = PollWindow {
        from: 1010,
        till: 1020,
    };
    client.list_resolved_events(&session, first).await.unwrap();
    client.list_resolved_events(&session, second).await.unwrap();

    let requests = server.received_requests().await.expect("requests");
    let bounds: Vec<(i64, i64)> = requests
        .iter()
        .map(|r| {
            let body: serde_json::Value = serde_json::from_slice(&r.body).unwrap();
            (
                body["params"]["time_from"].as_i64().unwrap(),
                body["params"]["time_till"].as_i64().unwrap(),
            )
        })
        .collect();
    assert_eq!(bounds, vec![(1000, 1009), (1010, 1019)]);
}

#[tokio::test]
async fn bearer_header_replaces_auth_member_on_recent_servers() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(rpc_ok(json!([])))
        .mount(&server)
        .await;

    let client = client(&server);
    let modern = Session::new(SecretString::from("token"), "7.0.1");
    client
        .list_open_problems(&modern, WINDOW)
        .await
        .expect("modern");
    client
        .list_open_problems(&legacy_session(), WINDOW)
        .await
        .expect("legacy");

    let requests = server.received_requests().await.expect("requests");

    let modern_body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert!(modern_body.get("auth").is_none());
    assert_eq!(
        requests[0].headers.get("authorization").unwrap(),
        "Bearer token"
    );

    let legacy_body: serde_json::Value = serde_json::from_slice(&requests[1].body).unwrap();
    assert_eq!(legacy_body["auth"], "token");
    assert!(requests[1].headers.get("authorization").is_none());
    assert!(requests[1].headers.get("x-correlation-id").is_some());
}

#[tokio::test]
async fn event_hosts_lookup_and_placeholder() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_string_contains("\"7\""))
        .respond_with(rpc_ok(json!([
            { "eventid": "7", "hosts": [ { "hostid": "1", "name": "db-1" } ] }
        ])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_string_contains("\"8\""))
        .respond_with(rpc_ok(json!([])))
        .mount(&server)
        .await;

    let client = client(&server);
    let session = legacy_session();
    assert_eq!(
        client.get_event_hosts(&session, "7").await.unwrap(),
        vec!["db-1"]
    );
    assert_eq!(
        client.get_event_hosts(&session, "8").await.unwrap(),
        vec!["Unknown"]
    );
}

#[tokio::test]
async fn retries_exhaust_on_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;

    let err = client(&server)
        .list_open_problems(&legacy_session(), WINDOW)
        .await
        .expect_err("should fail");
    match err {
        RelayError::Zabbix(ZbxError::RetryExhausted { .. }) => {}
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn returns_api_error_details_without_retry() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "error": {
                "code": 42,
                "message": "Invalid token"
            },
            "id": 1
        })))
        .expect(1)
        .mount(&server)
        .await;

    let err = client(&server)
        .list_resolved_events(&legacy_session(), WINDOW)
        .await
        .expect_err("should fail");
    match err {
        RelayError::Zabbix(ZbxError::Api { code, message }) => {
            assert_eq!(code, 42);
            assert_eq!(message, "Invalid token");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn slow_server_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(rpc_ok(json!([])).set_delay(Duration::from_secs(1)))
        .mount(&server)
        .await;

    let err = client_with_timeout(&server, Duration::from_millis(200))
        .list_open_problems(&legacy_session(), WINDOW)
        .await
        .expect_err("should time out");
    let is_timeout = |e: &ZbxError| matches!(e, ZbxError::Request { source } if source.is_timeout());
    match err {
        RelayError::Zabbix(ref inner) if is_timeout(inner) => {}
        RelayError::Zabbix(ZbxError::RetryExhausted { ref source }) if is_timeout(source.as_ref()) => {}
        other => panic!("unexpected error: {other}"),
    }
}
