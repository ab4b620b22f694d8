//! `/api/events` through the real router with the static auth gate.

use std::sync::Arc;
use std::time::Duration;

use auth::gateways::StaticAuthGate;
use auth::{AccountConfig, AuthContext, CookieSettings};
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use events::api::rest::routes;
use events::domain::service::Service;
use events::infra::storage::FixedSnapshot;
use events::TieredEventStore;
use serde_json::{json, Value};
use tower::ServiceExt;

fn account(email: &str, role: &str, token: &str) -> AccountConfig {
    AccountConfig {
        id: None,
        email: email.into(),
        name: email.into(),
        password: "pw".into(),
        role: Some(role.into()),
        roles: vec![],
        is_active: true,
        token: Some(token.into()),
    }
}

fn app(dir: &tempfile::TempDir) -> Router {
    let gate = Arc::new(StaticAuthGate::new(
        &[
            account("events@harbor.test", "event_manager", "events-token"),
            account("news@harbor.test", "news_manager", "news-token"),
        ],
        Duration::from_secs(60),
    ));
    let auth = Arc::new(AuthContext::new(gate, CookieSettings::default()));
    let store = TieredEventStore::new(FixedSnapshot(None), dir.path().join("events.json"));
    let service = Arc::new(Service::new(Arc::new(store)));
    routes::register_routes(Router::new(), service, auth)
}

async fn call(app: &Router, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
    let mut req = Request::builder().method(method).uri(uri);
    if let Some(t) = token {
        req = req.header(header::COOKIE, format!("auth_token={t}"));
    }
    let body = match body {
        Some(v) => {
            req = req.header(header::CONTENT_TYPE, "application/json");
            Body::from(v.to_string())
        }
        None => Body::empty(),
    };
    let resp = app.clone().oneshot(req.body(body).unwrap()).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn public_listing_is_sorted_and_filterable() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(&dir);

    let (status, body) = call(&app, Method::GET, "/api/events", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let dates: Vec<_> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["date"].as_str().unwrap().to_string())
        .collect();
    let mut sorted = dates.clone();
    sorted.sort();
    assert_eq!(dates, sorted);
    assert_eq!(dates.len(), 4);

    let (_, body) = call(&app, Method::GET, "/api/events?status=completed", None, None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (status, body) = call(&app, Method::GET, "/api/events?status=bogus", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn create_requires_events_capability() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(&dir);
    let payload = json!({
        "title": "ECDIS Generic Course",
        "date": "2027-01-18",
        "time": "09:00 - 17:00",
        "location": "Simulator Hall",
        "maxCapacity": 8,
        "currentRegistrations": 2,
        "status": "registration-open"
    });

    let (status, body) = call(&app, Method::POST, "/api/events", None, Some(payload.clone())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);

    let (status, body) = call(&app, Method::POST, "/api/events", Some("news-token"), Some(payload.clone())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Insufficient permissions: 'events' required");

    let (status, body) = call(&app, Method::POST, "/api/events", Some("events-token"), Some(payload)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Event created successfully");
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = call(&app, Method::GET, &format!("/api/events/{id}"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "registration-open");
    assert_eq!(body["data"]["maxCapacity"], 8);
}

async fn send_raw(app: &Router, method: Method, uri: &str, token: Option<&str>, body: &'static str) -> (StatusCode, Value) {
    let mut req = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(t) = token {
        req = req.header(header::COOKIE, format!("auth_token={t}"));
    }
    let resp = app.clone().oneshot(req.body(Body::from(body)).unwrap()).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn malformed_body_from_unprivileged_caller_is_still_refused() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(&dir);

    for (method, uri) in [(Method::POST, "/api/events"), (Method::PUT, "/api/events/1")] {
        let (status, body) = send_raw(&app, method.clone(), uri, Some("news-token"), "{not json").await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{method} {uri}");
        assert_eq!(body["error"], "Insufficient permissions: 'events' required");

        let (status, _) = send_raw(&app, method.clone(), uri, None, "{not json").await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{method} {uri}");

        let (status, _) = send_raw(&app, method, uri, Some("events-token"), "{not json").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}

#[tokio::test]
async fn validation_errors_are_400() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(&dir);

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/events",
        Some("events-token"),
        Some(json!({"title": "No date", "time": "09:00", "location": "Pier"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "date is required");

    let (status, _) = call(
        &app,
        Method::PUT,
        "/api/events/1",
        Some("events-token"),
        Some(json!({"currentRegistrations": 99})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn update_and_delete() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(&dir);

    let (status, body) = call(
        &app,
        Method::PUT,
        "/api/events/2",
        Some("events-token"),
        Some(json!({"status": "cancelled"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "cancelled");
    assert_eq!(body["data"]["title"], "Bridge Resource Management Workshop");

    let (status, body) = call(&app, Method::DELETE, "/api/events/2", Some("events-token"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Event deleted successfully");

    let (status, body) = call(&app, Method::DELETE, "/api/events/2", Some("events-token"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Event not found");

    let (status, _) = call(&app, Method::GET, "/api/events/2", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
