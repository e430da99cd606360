mod common;

use common::{InMemoryRegistry, TestApp};
use hiremebuddy_push::domain::device::Platform;
use serde_json::{Value, json};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const USER_ID: &str = "c4ca4238-a0b9-4382-8dcc-509a6f75849b";

async fn spawn_with_devices(server: &MockServer, tokens: &[&str]) -> TestApp {
    let registry = InMemoryRegistry::with_devices(USER_ID, tokens);
    TestApp::spawn(registry, server).await
}

fn send_payload() -> Value {
    json!({
        "user_id": USER_ID,
        "title": "New job request",
        "body": "A client in Windhoek needs an electrician",
        "data": { "booking_id": "42" }
    })
}

#[tokio::test]
async fn test_send_returns_summary() {
    let server = MockServer::start().await;
    common::mount_token_endpoint(&server).await;
    Mock::given(method("POST"))
        .and(path(common::send_path()))
        .and(body_partial_json(json!({ "message": { "token": "device-1" } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::sent_body("device-1")))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(common::send_path()))
        .and(body_partial_json(json!({ "message": { "token": "device-2" } })))
        .respond_with(ResponseTemplate::new(404).set_body_json(common::unregistered_body()))
        .mount(&server)
        .await;

    let app = spawn_with_devices(&server, &["device-1", "device-2"]).await;

    let resp = app
        .client
        .post(format!("{}/v1/push/send", app.server_url))
        .header("Origin", "https://hiremebuddy.app")
        .json(&send_payload())
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    assert_eq!(resp.headers().get("access-control-allow-origin").unwrap(), "*");
    assert!(resp.headers().contains_key("x-request-id"));

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body, json!({ "success": true, "sent": 1, "failed": 1, "total": 2 }));
    assert_eq!(app.registry.is_active("device-2"), Some(false));
}

#[tokio::test]
async fn test_send_without_devices() {
    let server = MockServer::start().await;
    let app = spawn_with_devices(&server, &[]).await;

    let resp = app.client.post(format!("{}/v1/push/send", app.server_url)).json(&send_payload()).send().await.unwrap();

    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body, json!({ "success": true, "message": "No devices to notify" }));
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn test_legacy_function_path() {
    let server = MockServer::start().await;
    let app = spawn_with_devices(&server, &[]).await;

    let resp = app
        .client
        .post(format!("{}/send-push-notification", app.server_url))
        .json(&send_payload())
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn test_cors_preflight() {
    let server = MockServer::start().await;
    let app = spawn_with_devices(&server, &[]).await;

    let resp = app
        .client
        .request(reqwest::Method::OPTIONS, format!("{}/v1/push/send", app.server_url))
        .header("Origin", "https://hiremebuddy.app")
        .header("Access-Control-Request-Method", "POST")
        .header("Access-Control-Request-Headers", "authorization, x-client-info, apikey, content-type")
        .send()
        .await
        .unwrap();

    assert!(resp.status().is_success());
    let headers = resp.headers().clone();
    assert_eq!(headers.get("access-control-allow-origin").unwrap(), "*");
    let allowed = headers.get("access-control-allow-headers").unwrap().to_str().unwrap().to_lowercase();
    for expected in ["authorization", "x-client-info", "apikey", "content-type"] {
        assert!(allowed.contains(expected), "missing {expected} in {allowed}");
    }
    assert!(resp.text().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_fatal_failure_returns_500_with_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(401).set_body_string("unauthorized"))
        .mount(&server)
        .await;

    let app = spawn_with_devices(&server, &["device-1"]).await;

    let resp = app
        .client
        .post(format!("{}/v1/push/send", app.server_url))
        .header("Origin", "https://hiremebuddy.app")
        .json(&send_payload())
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 500);
    assert_eq!(resp.headers().get("access-control-allow-origin").unwrap(), "*");
    let body: Value = resp.json().await.unwrap();
    let error = body["error"].as_str().unwrap();
    assert!(error.contains("authentication failed"), "unexpected error: {error}");
    assert_eq!(common::count_requests(&server, &common::send_path()).await, 0);
}

#[tokio::test]
async fn test_empty_user_id_is_rejected() {
    let server = MockServer::start().await;
    let app = spawn_with_devices(&server, &["device-1"]).await;

    let resp = app
        .client
        .post(format!("{}/v1/push/send", app.server_url))
        .json(&json!({ "user_id": "", "title": "Hi", "body": "There" }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "user_id cannot be empty");
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn test_malformed_body_is_rejected() {
    let server = MockServer::start().await;
    let app = spawn_with_devices(&server, &[]).await;

    let resp = app
        .client
        .post(format!("{}/v1/push/send", app.server_url))
        .header("Content-Type", "application/json")
        .body("{ not json")
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_register_device_reactivates_token() {
    let server = MockServer::start().await;
    let app = spawn_with_devices(&server, &[]).await;
    app.registry.insert("previous-owner", "shared-token", false);

    let resp = app
        .client
        .put(format!("{}/v1/push/devices", app.server_url))
        .json(&json!({ "user_id": USER_ID, "token": "shared-token", "platform": "ios" }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    assert_eq!(app.registry.is_active("shared-token"), Some(true));
    assert_eq!(app.registry.owner("shared-token").as_deref(), Some(USER_ID));
    assert_eq!(app.registry.platform("shared-token"), Some(Platform::Ios));
}

#[tokio::test]
async fn test_register_device_rejects_blank_token() {
    let server = MockServer::start().await;
    let app = spawn_with_devices(&server, &[]).await;

    let resp = app
        .client
        .put(format!("{}/v1/push/devices", app.server_url))
        .json(&json!({ "user_id": USER_ID, "token": "   " }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Token cannot be empty");
}

#[tokio::test]
async fn test_register_device_accepts_mixed_case_platform() {
    let server = MockServer::start().await;
    let app = spawn_with_devices(&server, &[]).await;

    let resp = app
        .client
        .put(format!("{}/v1/push/devices", app.server_url))
        .json(&json!({ "user_id": USER_ID, "token": "iphone-token", "platform": "iOS" }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    assert_eq!(app.registry.platform("iphone-token"), Some(Platform::Ios));
}
