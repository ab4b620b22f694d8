//! `/api/news` visibility and authorization through the real router.

use std::sync::Arc;
use std::time::Duration;

use auth::gateways::StaticAuthGate;
use auth::{AccountConfig, AuthContext, CookieSettings};
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use news::api::rest::routes;
use news::domain::service::{Service, ServiceConfig};
use news::infra::storage::InMemoryNewsRepository;
use serde_json::{json, Value};
use tower::ServiceExt;

fn account(email: &str, name: &str, role: &str, token: &str) -> AccountConfig {
    AccountConfig {
        id: None,
        email: email.into(),
        name: name.into(),
        password: "pw".into(),
        role: Some(role.into()),
        roles: vec![],
        is_active: true,
        token: Some(token.into()),
    }
}

fn app() -> Router {
    let gate = Arc::new(StaticAuthGate::new(
        &[
            account("editor@harbor.test", "News Desk", "news_editor", "editor"),
            account("viewer@harbor.test", "Viewer", "viewer", "viewer"),
        ],
        Duration::from_secs(60),
    ));
    let auth = Arc::new(AuthContext::new(gate, CookieSettings::default()));
    let service = Arc::new(Service::new(
        Arc::new(InMemoryNewsRepository::new()),
        ServiceConfig::default(),
    ));
    routes::register_routes(Router::new(), service, auth)
}

async fn call(app: &Router, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
    let mut req = Request::builder().method(method).uri(uri);
    if let Some(t) = token {
        req = req.header(header::AUTHORIZATION, format!("Bearer {t}"));
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

async fn send_raw(app: &Router, method: Method, uri: &str, token: &str, body: &'static str) -> (StatusCode, Value) {
    let req = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn viewer_gets_403_even_for_malformed_json() {
    let app = app();
    for (method, uri) in [(Method::POST, "/api/news"), (Method::PUT, "/api/news/1")] {
        let (status, body) = send_raw(&app, method.clone(), uri, "viewer", "{not json").await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{method} {uri}");
        assert_eq!(body["error"], "Insufficient permissions: 'news' required");

        let (status, _) = send_raw(&app, method, uri, "editor", "{not json").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}

#[tokio::test]
async fn post_without_session_is_401() {
    let (status, body) = call(
        &app(),
        Method::POST,
        "/api/news",
        None,
        Some(json!({"title": "T", "content": "C"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn viewer_cannot_write() {
    let (status, _) = call(
        &app(),
        Method::POST,
        "/api/news",
        Some("viewer"),
        Some(json!({"title": "T", "content": "C"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn drafts_are_hidden_from_the_public() {
    let app = app();
    let (status, body) = call(
        &app,
        Method::POST,
        "/api/news",
        Some("editor"),
        Some(json!({"title": "Winter timetable", "content": "Draft text"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["author"], "News Desk");
    assert_eq!(body["data"]["status"], "draft");
    assert!(body["data"]["publishedAt"].is_null());
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let (_, public) = call(&app, Method::GET, "/api/news", None, None).await;
    assert_eq!(public["data"].as_array().unwrap().len(), 0);
    let (status, _) = call(&app, Method::GET, &format!("/api/news/{id}"), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = call(&app, Method::GET, &format!("/api/news/{id}"), Some("viewer"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, editor) = call(&app, Method::GET, "/api/news", Some("editor"), None).await;
    assert_eq!(editor["data"].as_array().unwrap().len(), 1);

    let (status, body) = call(
        &app,
        Method::PUT,
        &format!("/api/news/{id}"),
        Some("editor"),
        Some(json!({"status": "published"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["publishedAt"].is_string());

    let (status, body) = call(&app, Method::GET, &format!("/api/news/{id}"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["title"], "Winter timetable");
}

#[tokio::test]
async fn listing_is_newest_first_with_filters() {
    let app = app();
    for (title, category) in [("First", "fleet"), ("Second", "courses"), ("Third", "fleet")] {
        let (status, _) = call(
            &app,
            Method::POST,
            "/api/news",
            Some("editor"),
            Some(json!({"title": title, "content": "x", "category": category, "status": "published"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    let (_, body) = call(&app, Method::GET, "/api/news", None, None).await;
    let titles: Vec<_> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["title"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(titles, ["Third", "Second", "First"]);

    let (_, body) = call(&app, Method::GET, "/api/news?category=fleet", None, None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn delete_and_unknown_ids() {
    let app = app();
    let (_, body) = call(
        &app,
        Method::POST,
        "/api/news",
        Some("editor"),
        Some(json!({"title": "Short lived", "content": "x"})),
    )
    .await;
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = call(&app, Method::DELETE, &format!("/api/news/{id}"), Some("editor"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Article deleted successfully");

    let (status, _) = call(&app, Method::DELETE, &format!("/api/news/{id}"), Some("editor"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = call(&app, Method::GET, "/api/news/not-a-uuid", Some("editor"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
