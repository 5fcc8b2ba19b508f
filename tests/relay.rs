//! Relay client and network actor against an in-process relay stub

use axum::{
    extract::Path,
    http::{HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};
use tokio::sync::mpsc;

use probe_tui::compose::AuthMode;
use probe_tui::messages::{NetworkCommand, NetworkResponse};
use probe_tui::{classify, AppState, Config, DispatchError, HttpMethod, NetworkActor, RelayClient, RequestForm};

const TOKEN: &str = "test-token";

async fn spawn_relay(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn client_for(relay_url: &str) -> RelayClient {
    RelayClient::new(&Config {
        relay_url: relay_url.to_string(),
        csrf_token: Some(TOKEN.to_string()),
        timeout_ms: 5_000,
    })
}

fn has_token(headers: &HeaderMap) -> bool {
    headers.get("x-csrftoken").and_then(|v| v.to_str().ok()) == Some(TOKEN)
}

/// Echoes the received descriptor back inside a relay-shaped result
async fn echo_send(headers: HeaderMap, Json(descriptor): Json<Value>) -> (StatusCode, Json<Value>) {
    if !has_token(&headers) {
        return (StatusCode::FORBIDDEN, Json(json!({ "detail": "CSRF failed" })));
    }
    (
        StatusCode::OK,
        Json(json!({
            "status_code": 201,
            "time": 12.6,
            "headers": { "content-type": "application/json" },
            "body": { "echo": descriptor },
        })),
    )
}

async fn save_request(
    headers: HeaderMap,
    Path(collection_id): Path<u64>,
    Json(payload): Json<Value>,
) -> (StatusCode, Json<Value>) {
    if !has_token(&headers) || payload["name"].as_str().unwrap_or("").is_empty() {
        return (StatusCode::BAD_REQUEST, Json(json!({})));
    }
    (StatusCode::CREATED, Json(json!({ "id": collection_id * 100 + 1 })))
}

fn relay_router() -> Router {
    Router::new()
        .route("/api/send/", post(echo_send))
        .route("/collections/{id}/requests/new/", post(save_request))
}

#[tokio::test]
async fn test_send_posts_descriptor_and_reads_result() {
    let relay = spawn_relay(relay_router()).await;
    let client = client_for(&relay);

    let mut form = RequestForm {
        method: HttpMethod::GET,
        url: "example.com/items".into(),
        ..RequestForm::default()
    };
    form.params.push("q", "a b");
    form.auth.set_mode(AuthMode::Bearer);
    form.auth.bearer_token = "abc".into();
    let descriptor = form.compose().unwrap().descriptor;

    let record = client.send(&descriptor).await.unwrap();
    assert_eq!(record.status_code, Some(201));

    let echo = &record.body["echo"];
    assert_eq!(echo["method"], "GET");
    assert_eq!(echo["url"], "https://example.com/items?q=a%20b");
    assert_eq!(echo["params"]["q"], "a b");
    assert_eq!(echo["headers"]["Authorization"], "Bearer abc");
    assert_eq!(echo["auth"]["type"], "bearer");
    assert_eq!(echo["follow_redirects"], true);

    let view = classify(&record);
    assert_eq!(view.status_label, "201");
    assert_eq!(view.elapsed_label, "13 ms");
}

#[tokio::test]
async fn test_relay_error_status_is_reported() {
    let app = Router::new().route(
        "/api/send/",
        post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
    );
    let client = client_for(&spawn_relay(app).await);
    let descriptor = RequestForm::default().compose().unwrap().descriptor;

    let err = client.send(&descriptor).await.unwrap_err();
    assert_eq!(
        err,
        DispatchError::Relay {
            status: 500,
            reason: "Internal Server Error".into()
        }
    );
    assert_eq!(err.to_string(), "Server returned 500 Internal Server Error");
}

#[tokio::test]
async fn test_wrong_token_is_a_relay_error() {
    let relay = spawn_relay(relay_router()).await;
    let client = RelayClient::new(&Config {
        relay_url: relay,
        csrf_token: Some("stale".into()),
        timeout_ms: 5_000,
    });
    let descriptor = RequestForm::default().compose().unwrap().descriptor;

    match client.send(&descriptor).await {
        Err(DispatchError::Relay { status, .. }) => assert_eq!(status, 403),
        other => panic!("expected relay error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_unparsable_payload_is_malformed_response() {
    let app = Router::new().route("/api/send/", post(|| async { "<html>not json</html>" }));
    let client = client_for(&spawn_relay(app).await);
    let descriptor = RequestForm::default().compose().unwrap().descriptor;

    let err = client.send(&descriptor).await.unwrap_err();
    assert!(matches!(err, DispatchError::MalformedResponse(_)));
}

#[tokio::test]
async fn test_loosely_typed_payload_still_reads() {
    let app = Router::new().route(
        "/api/send/",
        post(|| async { Json(json!({ "status_code": "200", "body": "plain text" })) }),
    );
    let client = client_for(&spawn_relay(app).await);
    let descriptor = RequestForm::default().compose().unwrap().descriptor;

    let record = client.send(&descriptor).await.unwrap();
    assert_eq!(record.status_code, None);
    assert_eq!(record.elapsed_ms, None);
    assert_eq!(record.body, json!("plain text"));
    assert_eq!(classify(&record).status_label, "-");
}

#[tokio::test]
async fn test_unreachable_relay_is_network_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = client_for(&format!("http://{}", addr));
    let descriptor = RequestForm::default().compose().unwrap().descriptor;

    let err = client.send(&descriptor).await.unwrap_err();
    assert!(matches!(err, DispatchError::Network(_)), "got {:?}", err);
}

#[tokio::test]
async fn test_save_into_collection() {
    let client = client_for(&spawn_relay(relay_router()).await);
    let form = RequestForm::default();
    let plan = form.save_payload("List items", "", Some(7)).unwrap();

    let saved = client.save(plan.collection_id, &plan.payload).await.unwrap();
    assert_eq!(saved.id, Some(701));
}

#[tokio::test]
async fn test_actor_round_trip_applies_latest_send() {
    let client = client_for(&spawn_relay(relay_router()).await);
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
    let (resp_tx, mut resp_rx) = mpsc::unbounded_channel();
    tokio::spawn(NetworkActor::new(client, resp_tx).run(cmd_rx));

    let mut state = AppState::new();
    state.form.url = "https://example.com/first".into();
    let first = state.prepare_request().unwrap();
    state.form.url = "https://example.com/second".into();
    let second = state.prepare_request().unwrap();
    cmd_tx.send(first).unwrap();
    cmd_tx.send(second).unwrap();

    for _ in 0..2 {
        let response: NetworkResponse = resp_rx.recv().await.unwrap();
        state.handle_response(response);
    }

    let shown = state.response.as_ref().unwrap();
    assert_eq!(shown.body["echo"]["url"], "https://example.com/second");
    assert_eq!(state.history.len(), 2);
    assert!(!state.is_loading());

    cmd_tx.send(NetworkCommand::Shutdown).unwrap();
}
