//! Integration tests for the local HTTP API.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tether_daemon::config::Config;
use tether_daemon::connectivity::ConnectivityMonitor;
use tether_daemon::coordinator::SyncCoordinator;
use tether_daemon::remote::MemoryRemoteStore;
use tether_daemon::AppState;
use tower::ServiceExt;

struct TestApp {
    router: Router,
    remote: Arc<MemoryRemoteStore>,
    state: AppState,
}

fn test_app(config: Config) -> TestApp {
    let remote = Arc::new(MemoryRemoteStore::new());
    let connectivity = ConnectivityMonitor::new_shared(true);
    let coordinator = SyncCoordinator::new_shared(remote.clone(), connectivity.clone());
    let state = AppState {
        coordinator,
        connectivity,
        config: Arc::new(config),
    };
    TestApp {
        router: tether_daemon::app(state.clone()),
        remote,
        state,
    }
}

async fn send(router: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into()))
    };
    (status, value)
}

fn promo(title: &str) -> Value {
    json!({"title": title, "content": "Fresh bread daily", "audioPath": "bafy123"})
}

#[tokio::test]
async fn test_health_reports_sync_state() {
    let app = test_app(Config::default());

    let (status, body) = send(&app.router, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(body["online"], true);
    assert_eq!(body["pending"], 0);

    app.remote.set_available(false);
    app.state.connectivity.report(false);
    send(&app.router, Method::POST, "/generations", Some(promo("Promo A"))).await;

    let (_, body) = send(&app.router, Method::GET, "/health", None).await;
    assert_eq!(body["status"], "syncing");
    assert_eq!(body["online"], false);
    assert_eq!(body["pending"], 1);
    assert_eq!(body["cached"], 1);

    let (status, banner) = send(&app.router, Method::GET, "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(banner.as_str().unwrap().starts_with("tether-daemon"));
}

#[tokio::test]
async fn test_create_and_list_online() {
    let mut config = Config::default();
    config.audio_gateway_url = Some("https://gateway.example.com/ipfs".into());
    let app = test_app(config);

    let (status, created) = send(&app.router, Method::POST, "/generations", Some(promo("Promo A"))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["title"], "Promo A");
    assert_eq!(created["provisional"], false);
    assert_eq!(created["audioUrl"], "https://gateway.example.com/ipfs/bafy123");

    let (status, listed) = send(&app.router, Method::GET, "/generations", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert_eq!(listed[0]["id"], created["id"]);
}

#[tokio::test]
async fn test_create_invalid_payload() {
    let app = test_app(Config::default());

    let (status, body) = send(&app.router, Method::POST, "/generations", Some(promo("  "))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("title"));
    assert!(app.remote.inserted_titles().is_empty());
}

#[tokio::test]
async fn test_create_online_failure_is_bad_gateway() {
    let app = test_app(Config::default());
    app.remote.set_available(false);

    let (status, body) = send(&app.router, Method::POST, "/generations", Some(promo("Promo A"))).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "Remote store error");
}

#[tokio::test]
async fn test_offline_round_trip_through_connectivity_endpoint() {
    let app = test_app(Config::default());
    app.state.coordinator.spawn_reconnect_listener();

    app.remote.set_available(false);
    let (status, _) = send(&app.router, Method::PUT, "/connectivity", Some(json!({"online": false}))).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, created) = send(&app.router, Method::POST, "/generations", Some(promo("Promo A"))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["provisional"], true);
    assert!(created["id"].as_str().unwrap().starts_with("temp_"));
    assert!(created.get("audioUrl").is_none());

    let (_, connectivity) = send(&app.router, Method::GET, "/connectivity", None).await;
    assert_eq!(connectivity, json!({"online": false, "pending": 1}));

    app.remote.set_available(true);
    send(&app.router, Method::PUT, "/connectivity", Some(json!({"online": true}))).await;

    for _ in 0..100 {
        if app.state.coordinator.pending_count().await == 0 {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }

    let (_, listed) = send(&app.router, Method::GET, "/generations", None).await;
    let listed = listed.as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["title"], "Promo A");
    assert_eq!(listed[0]["provisional"], false);
    assert!(!listed[0]["id"].as_str().unwrap().starts_with("temp_"));
}

#[tokio::test]
async fn test_delete() {
    let app = test_app(Config::default());
    let (_, created) = send(&app.router, Method::POST, "/generations", Some(promo("Promo A"))).await;
    let uri = format!("/generations/{}", created["id"].as_str().unwrap());

    let (status, _) = send(&app.router, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(app.remote.records().is_empty());

    app.remote.set_available(false);
    let (status, _) = send(&app.router, Method::DELETE, "/generations/gen_1", None).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_pending_export_and_import() {
    let app = test_app(Config::default());
    app.remote.set_available(false);
    app.state.connectivity.report(false);
    send(&app.router, Method::POST, "/generations", Some(promo("Promo A"))).await;

    let (status, snapshot) = send(&app.router, Method::GET, "/pending", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(snapshot["formatVersion"], 1);
    assert_eq!(snapshot["pendingOps"].as_array().unwrap().len(), 1);
    assert_eq!(snapshot["pendingOps"][0]["operation"]["type"], "create");

    let other = test_app(Config::default());
    let (status, body) = send(&other.router, Method::POST, "/pending", Some(snapshot)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"imported": 1, "pending": 1}));

    let (status, _) = send(
        &other.router,
        Method::POST,
        "/pending",
        Some(json!({"formatVersion": 99, "exportedAt": 0, "pendingOps": []})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
