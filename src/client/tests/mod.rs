use super::*;
use crate::config::PollConfig;
use crate::error::ErrorKind;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};


/// Client pointed at a wiremock server with a short request timeout
fn create_test_client(server: &MockServer) -> DashboardClient {
    let config = Config {
        base_url: server.uri(),
        request_timeout: Duration::from_secs(5),
        poll: PollConfig::new(Duration::from_millis(20), Duration::from_secs(5)),
        ..Default::default()
    };
    DashboardClient::new(config).unwrap()
}

#[test]
fn test_new_rejects_invalid_config() {
    let config = Config {
        base_url: "localhost without scheme".to_string(),
        ..Default::default()
    };
    let err = DashboardClient::new(config).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Config);
}

#[test]
fn test_base_url_gets_trailing_slash() {
    let config = Config {
        base_url: "http://ev.example.com/dashboard".to_string(),
        ..Default::default()
    };
    let client = DashboardClient::new(config).unwrap();
    assert_eq!(client.base_url().as_str(), "http://ev.example.com/dashboard/");
    assert_eq!(
        client.endpoint("api/models/").unwrap().as_str(),
        "http://ev.example.com/dashboard/api/models/"
    );
}

#[test]
fn test_error_message_shapes() {
    assert_eq!(
        error_message(r#"{"detail": "未找到该车型数据"}"#).as_deref(),
        Some("未找到该车型数据")
    );
    assert_eq!(
        error_message(r#"{"success": false, "message": "bad request"}"#).as_deref(),
        Some("bad request")
    );
    assert_eq!(
        error_message(
            r#"{"detail": [{"loc": ["query", "brand"], "msg": "field required"},
                           {"loc": ["query", "model"], "msg": "field required"}]}"#
        )
        .as_deref(),
        Some("field required; field required")
    );
    assert_eq!(error_message("<html>502</html>"), None);
    assert_eq!(error_message(r#"{"detail": 42}"#), None);
}

#[tokio::test]
async fn test_non_json_error_body_uses_status_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/regions/states"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>bad gateway</html>"))
        .mount(&server)
        .await;

    let client = create_test_client(&server);
    let err = client.list_states().await.unwrap_err();

    assert!(matches!(err, Error::Service { status: Some(502), .. }));
    assert!(err.service_message().unwrap().contains("502"));
}

#[tokio::test]
async fn test_invalid_json_is_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/regions/states"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{not json"))
        .mount(&server)
        .await;

    let client = create_test_client(&server);
    let err = client.list_states().await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::TransportError);
}

#[tokio::test]
async fn test_unreachable_service_is_transport_error() {
    // Nothing listens on port 1, so the connection is refused.
    let client = DashboardClient::new(Config {
        base_url: "http://127.0.0.1:1".to_string(),
        request_timeout: Duration::from_secs(2),
        ..Default::default()
    })
    .unwrap();

    let err = client.list_states().await.unwrap_err();
    assert!(matches!(err, Error::Network(_)));
    assert_eq!(err.kind(), ErrorKind::TransportError);
}

#[tokio::test]
async fn test_requests_carry_user_agent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/regions/states"))
        .and(wiremock::matchers::header("user-agent", "evdash-test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": ["WA"]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = DashboardClient::new(Config {
        base_url: server.uri(),
        user_agent: "evdash-test".to_string(),
        ..Default::default()
    })
    .unwrap();

    assert_eq!(client.list_states().await.unwrap(), vec!["WA".to_string()]);
}
