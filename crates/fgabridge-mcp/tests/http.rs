//! End-to-end tests for the HTTP transport, with the OpenFGA backend mocked.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use fgabridge_client::ClientProvider;
use fgabridge_core::FgaSettings;
use fgabridge_mcp::{AppState, McpServer};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn app_for_settings(settings: FgaSettings) -> Router {
    let provider = Arc::new(ClientProvider::new(settings));
    let server = Arc::new(McpServer::new(provider));
    fgabridge_mcp::http::router(AppState::new(server))
}

fn app_for(backend: &MockServer, store_id: &str) -> Router {
    let mut settings = FgaSettings {
        request_timeout: Duration::from_secs(2),
        ..Default::default()
    };
    settings.apply_url(&backend.uri()).unwrap();
    settings.store_id = Some(store_id.to_string());
    app_for_settings(settings)
}

async fn post_json(app: &Router, uri: &str, payload: &Value) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

async fn call(app: &Router, payload: Value) -> (StatusCode, Value) {
    post_json(app, "/call", &payload).await
}

#[tokio::test]
async fn healthz_answers_ok_without_backend() {
    // The backend address points nowhere; /healthz must not care.
    let mut settings = FgaSettings::default();
    settings.apply_url("http://127.0.0.1:1").unwrap();
    let app = app_for_settings(settings);

    let response = app
        .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"OK");
}

#[tokio::test]
async fn call_check_succeeds_and_is_repeatable() {
    let backend = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/stores/S0/check"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "allowed": true })))
        .expect(2)
        .mount(&backend)
        .await;

    let app = app_for(&backend, "S0");
    let payload = json!({ "tool": "check", "args": { "user": "u1", "relation": "r1", "object": "o1" } });

    // Identical calls against unchanged backend state give identical strings.
    let (status, body) = call(&app, payload.clone()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "result": "u1 has the relation r1 to o1" }));

    let (_, second) = call(&app, payload).await;
    assert_eq!(second, json!({ "result": "u1 has the relation r1 to o1" }));
}

#[tokio::test]
async fn call_list_objects_formats_results() {
    let backend = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/stores/S0/list-objects"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "objects": ["doc:cv", "doc:report"]
        })))
        .mount(&backend)
        .await;

    let app = app_for(&backend, "S0");
    let (status, body) = call(
        &app,
        json!({ "tool": "list_objects", "args": { "user": "u2", "relation": "r2", "type": "t2" } }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "result": "u2 has a r2 relationship with doc:cv, doc:report" })
    );
}

#[tokio::test]
async fn call_missing_tool_is_bad_request() {
    let backend = MockServer::start().await;
    let app = app_for(&backend, "S0");

    let (status, body) = call(&app, json!({ "args": { "user": "u1" } })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing 'tool' in request body");
}

#[tokio::test]
async fn call_missing_args_is_bad_request_and_backend_is_untouched() {
    let backend = MockServer::start().await;
    let app = app_for(&backend, "S0");

    let (status, body) = call(
        &app,
        json!({ "tool": "check", "args": { "user": "u1", "relation": "r1" } }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing required arg 'object' for check");
    assert!(backend.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn call_missing_single_args_use_contractual_messages() {
    let backend = MockServer::start().await;
    let app = app_for(&backend, "S0");

    let (status, body) = call(&app, json!({ "tool": "create_store", "args": {} })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing required arg 'name' for create_store");

    let (_, body) = call(&app, json!({ "tool": "get_store", "args": {} })).await;
    assert_eq!(body["error"], "Missing required arg 'store_id' for get_store");

    let (_, body) = call(&app, json!({ "tool": "delete_store", "args": {} })).await;
    assert_eq!(body["error"], "Missing required arg 'store_id' for delete_store");
}

#[tokio::test]
async fn call_unsupported_tool_is_bad_request() {
    let backend = MockServer::start().await;
    let app = app_for(&backend, "S0");

    let (status, body) = call(&app, json!({ "tool": "unknown_tool", "args": {} })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Unsupported tool: unknown_tool");
    assert!(backend.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn call_malformed_body_is_bad_request() {
    let backend = MockServer::start().await;
    let app = app_for(&backend, "S0");

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/call")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn backend_failure_degrades_to_result_string() {
    let backend = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/stores/S0/list-users"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "code": "internal_error",
            "message": "boom"
        })))
        .mount(&backend)
        .await;

    let app = app_for(&backend, "S0");
    let (status, body) = call(
        &app,
        json!({ "tool": "list_users", "args": { "object": "o", "type": "t", "relation": "r" } }),
    )
    .await;

    // Operation-level failure: the transport still reports success.
    assert_eq!(status, StatusCode::OK);
    let result = body["result"].as_str().unwrap();
    assert!(
        result.starts_with("Error listing users:"),
        "unexpected result: {result}"
    );
}

#[tokio::test]
async fn client_acquisition_failure_is_internal_error() {
    // No host configured at all.
    let app = app_for_settings(FgaSettings::default());

    let (status, body) = call(
        &app,
        json!({ "tool": "check", "args": { "user": "u", "relation": "r", "object": "o" } }),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("FGA_API_HOST"));
}

#[tokio::test]
async fn store_management_tools_work_end_to_end() {
    let backend = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/stores"))
        .and(body_partial_json(json!({ "name": "My New Store" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "01GXSA8YR785C4FYS3C0RTG7B1",
            "name": "My New Store"
        })))
        .mount(&backend)
        .await;
    Mock::given(method("GET"))
        .and(path("/stores/01GXSA8YR785C4FYS3C0RTG7B1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "01GXSA8YR785C4FYS3C0RTG7B1",
            "name": "My New Store"
        })))
        .mount(&backend)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/stores/01GXSA8YR785C4FYS3C0RTG7B1"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&backend)
        .await;

    let app = app_for(&backend, "S0");

    let (_, body) = call(
        &app,
        json!({ "tool": "create_store", "args": { "name": "My New Store" } }),
    )
    .await;
    assert_eq!(
        body["result"],
        "Store 'My New Store' created successfully with ID: 01GXSA8YR785C4FYS3C0RTG7B1"
    );

    let (_, body) = call(
        &app,
        json!({ "tool": "get_store", "args": { "store_id": "01GXSA8YR785C4FYS3C0RTG7B1" } }),
    )
    .await;
    let details = body["result"].as_str().unwrap();
    assert!(details.starts_with("Store details:"));
    assert!(details.contains("ID: 01GXSA8YR785C4FYS3C0RTG7B1"));
    assert!(details.contains("Name: My New Store"));

    let (_, body) = call(
        &app,
        json!({ "tool": "delete_store", "args": { "store_id": "01GXSA8YR785C4FYS3C0RTG7B1" } }),
    )
    .await;
    assert_eq!(
        body["result"],
        "Store with ID '01GXSA8YR785C4FYS3C0RTG7B1' has been successfully deleted"
    );
}

#[tokio::test]
async fn authorization_model_tools_work_end_to_end() {
    let backend = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/stores/S0/authorization-models"))
        .and(body_partial_json(json!({ "schema_version": "1.1" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "authorization_model_id": "01GXSA8YR785C4FYS3C0RTG7B1"
        })))
        .mount(&backend)
        .await;
    Mock::given(method("GET"))
        .and(path("/stores/S0/authorization-models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "authorization_models": [
                { "id": "01GXSA8YR785C4FYS3C0RTG7B1", "schema_version": "1.1" },
                { "id": "01GXSA0000000000000000G7B0", "schema_version": "1.1" }
            ],
            "continuation_token": ""
        })))
        .mount(&backend)
        .await;

    let app = app_for(&backend, "S0");

    let model = json!({
        "schema_version": "1.1",
        "type_definitions": [
            { "type": "user", "relations": {} },
            { "type": "document", "relations": { "viewer": { "this": {} } } }
        ]
    });
    let (_, body) = call(
        &app,
        json!({ "tool": "write_authorization_model", "args": { "store_id": "S0", "auth_model_data": model } }),
    )
    .await;
    assert_eq!(
        body["result"],
        "Authorization model successfully created with ID: 01GXSA8YR785C4FYS3C0RTG7B1"
    );

    let (_, body) = call(
        &app,
        json!({ "tool": "read_authorization_models", "args": { "store_id": "S0" } }),
    )
    .await;
    let listed = body["result"].as_str().unwrap();
    assert!(listed.starts_with("Found authorization models:"));
    assert!(listed.contains("ID: 01GXSA8YR785C4FYS3C0RTG7B1, Schema Version: 1.1"));

    let (_, body) = call(
        &app,
        json!({ "tool": "get_latest_authorization_model_id", "args": { "store_id": "S0" } }),
    )
    .await;
    assert_eq!(
        body["result"],
        "Latest authorization model ID: 01GXSA8YR785C4FYS3C0RTG7B1"
    );
}

#[tokio::test]
async fn relationship_scenario_matches_contract() {
    // Store seeded with: (anne, owner, document:report1), (bob, viewer,
    // document:report1), (anne, owner, document:report2), (charlie, viewer,
    // document:report2).
    let backend = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/stores/S0/check"))
        .and(body_partial_json(json!({ "tuple_key": { "user": "anne", "object": "document:report1" } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "allowed": true })))
        .mount(&backend)
        .await;
    Mock::given(method("POST"))
        .and(path("/stores/S0/check"))
        .and(body_partial_json(json!({ "tuple_key": { "user": "bob", "object": "document:report1" } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "allowed": false })))
        .mount(&backend)
        .await;
    Mock::given(method("POST"))
        .and(path("/stores/S0/list-objects"))
        .and(body_partial_json(json!({ "user": "anne", "relation": "owner", "type": "document" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "objects": ["document:report1", "document:report2"]
        })))
        .mount(&backend)
        .await;
    Mock::given(method("POST"))
        .and(path("/stores/S0/list-users"))
        .and(body_partial_json(json!({ "object": { "id": "report1" } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "users": [{ "object": { "type": "user", "id": "bob" } }]
        })))
        .mount(&backend)
        .await;
    Mock::given(method("POST"))
        .and(path("/stores/S0/list-users"))
        .and(body_partial_json(json!({ "object": { "id": "nonexistent" } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "users": [] })))
        .mount(&backend)
        .await;

    let app = app_for(&backend, "S0");

    let (_, body) = call(
        &app,
        json!({ "tool": "check", "args": { "user": "anne", "relation": "owner", "object": "document:report1" } }),
    )
    .await;
    assert_eq!(body["result"], "anne has the relation owner to document:report1");

    let (_, body) = call(
        &app,
        json!({ "tool": "check", "args": { "user": "bob", "relation": "owner", "object": "document:report1" } }),
    )
    .await;
    assert_eq!(
        body["result"],
        "bob does not have the relation owner to document:report1"
    );

    let (_, body) = call(
        &app,
        json!({ "tool": "list_objects", "args": { "user": "anne", "relation": "owner", "type": "document" } }),
    )
    .await;
    let result = body["result"].as_str().unwrap();
    assert!(result.contains("document:report1"));
    assert!(result.contains("document:report2"));

    let (_, body) = call(
        &app,
        json!({ "tool": "list_users", "args": { "object": "report1", "type": "document", "relation": "viewer" } }),
    )
    .await;
    assert_eq!(body["result"], "bob have the viewer relationship with report1");

    let (_, body) = call(
        &app,
        json!({ "tool": "list_users", "args": { "object": "nonexistent", "type": "document", "relation": "viewer" } }),
    )
    .await;
    assert_eq!(
        body["result"],
        "No users found with the viewer relationship with nonexistent"
    );
}

#[tokio::test]
async fn mcp_post_serves_json_rpc() {
    let backend = MockServer::start().await;
    let app = app_for(&backend, "S0");

    let (status, body) = post_json(
        &app,
        "/mcp",
        &json!({ "jsonrpc": "2.0", "id": 1, "method": "initialize" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"]["serverInfo"]["name"], "fgabridge");

    let (_, body) = post_json(
        &app,
        "/mcp",
        &json!({ "jsonrpc": "2.0", "id": 2, "method": "tools/list" }),
    )
    .await;
    assert_eq!(body["result"]["tools"].as_array().unwrap().len(), 15);
}

#[tokio::test]
async fn sse_stream_opens_and_unknown_sessions_are_rejected() {
    let backend = MockServer::start().await;
    let app = app_for(&backend, "S0");

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/sse").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/event-stream"
    );

    let (status, body) = post_json(
        &app,
        "/messages/not-a-session",
        &json!({ "jsonrpc": "2.0", "id": 1, "method": "tools/list" }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "unknown session");
}
