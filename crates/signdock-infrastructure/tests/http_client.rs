use std::time::Duration;

use serde_json::json;
use signdock_domain::account::HttpMethod;
use signdock_domain::shared::DomainError;
use signdock_domain::signin::{SigninRequest, SigninTransport};
use signdock_infrastructure::http::HttpClient;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn request(server: &MockServer, method: HttpMethod) -> SigninRequest {
    SigninRequest {
        method,
        url: format!("{}/checkin", server.uri()),
        headers: vec![
            ("Cookie".to_string(), "sid=42".to_string()),
            ("X-Trace".to_string(), "abc".to_string()),
        ],
        body: None,
    }
}

#[tokio::test]
async fn sends_headers_and_json_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/checkin"))
        .and(header("cookie", "sid=42"))
        .and(header("x-trace", "abc"))
        .and(body_json(json!({"action": "checkin"})))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"status":"ok"}"#))
        .expect(1)
        .mount(&server)
        .await;

    let client = HttpClient::new().unwrap();
    let mut req = request(&server, HttpMethod::Post);
    req.headers
        .push(("Content-Type".to_string(), "application/json".to_string()));
    req.body = Some(json!({"action": "checkin"}));

    let response = client.send(&req, Duration::from_secs(5)).await.unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(response.status_text, "OK");
    assert_eq!(response.body, r#"{"status":"ok"}"#);
    assert!(response.is_success_status());
}

#[tokio::test]
async fn error_statuses_are_responses_not_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/checkin"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let client = HttpClient::new().unwrap();
    let response = client
        .send(&request(&server, HttpMethod::Get), Duration::from_secs(5))
        .await
        .unwrap();

    assert_eq!(response.status, 503);
    assert_eq!(response.body, "maintenance");
    assert!(!response.is_success_status());
}

#[tokio::test]
async fn slow_server_times_out_as_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    let client = HttpClient::new().unwrap();
    let err = client
        .send(
            &request(&server, HttpMethod::Get),
            Duration::from_millis(200),
        )
        .await
        .unwrap_err();

    match err {
        DomainError::Transport(message) => assert!(message.contains("timed out"), "{}", message),
        other => panic!("expected transport error, got {:?}", other),
    }
}

#[tokio::test]
async fn unreachable_host_is_transport_error() {
    let client = HttpClient::new().unwrap();
    let req = SigninRequest {
        method: HttpMethod::Get,
        // Port 9 (discard) on loopback is closed on test machines.
        url: "http://127.0.0.1:9/checkin".to_string(),
        headers: vec![],
        body: None,
    };

    let err = client.send(&req, Duration::from_secs(2)).await.unwrap_err();

    assert!(matches!(err, DomainError::Transport(_)));
}

#[tokio::test]
async fn invalid_header_is_skipped_not_fatal() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header("x-trace", "abc"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = HttpClient::new().unwrap();
    let mut req = request(&server, HttpMethod::Get);
    req.headers
        .push(("Bad Header".to_string(), "x".to_string()));

    let response = client.send(&req, Duration::from_secs(5)).await.unwrap();

    assert_eq!(response.status, 204);
}
