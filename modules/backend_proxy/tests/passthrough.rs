//! Passthrough against a mocked news backend.

use std::sync::Arc;
use std::time::Duration;

use auth::gateways::StaticAuthGate;
use auth::{AuthContext, CookieSettings};
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use backend_proxy::{register_routes, Upstream};
use httpmock::prelude::*;
use serde_json::{json, Value};
use tower::ServiceExt;

fn auth() -> Arc<AuthContext> {
    Arc::new(AuthContext::new(
        Arc::new(StaticAuthGate::new(&[], Duration::from_secs(60))),
        CookieSettings::default(),
    ))
}

fn app(base: Option<&str>) -> Router {
    let upstream = base.map(|b| Arc::new(Upstream::new(b, Duration::from_millis(500)).unwrap()));
    register_routes(Router::new(), upstream, auth())
}

async fn send(app: Router, req: Request<Body>) -> (StatusCode, Option<String>, Vec<u8>) {
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let ct = resp
        .headers()
        .get(header::CONTENT_TYPE)
        .map(|v| v.to_str().unwrap().to_string());
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, ct, bytes.to_vec())
}

#[tokio::test]
async fn get_with_query_is_relayed_verbatim() {
    let server = MockServer::start_async().await;
    let m = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/news/featured")
                .query_param("limit", "3")
                .header("accept", "application/json");
            then.status(200)
                .header("content-type", "application/json")
                .body(r#"{"data":[{"id":1}]}"#);
        })
        .await;

    let (status, ct, body) = send(
        app(Some(&server.base_url())),
        Request::get("/api/laravel/news/featured?limit=3")
            .header(header::ACCEPT, "application/json")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    m.assert_async().await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ct.as_deref(), Some("application/json"));
    assert_eq!(body, br#"{"data":[{"id":1}]}"#);
}

#[tokio::test]
async fn cookie_token_becomes_bearer() {
    let server = MockServer::start_async().await;
    let m = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/news")
                .header("authorization", "Bearer from-cookie")
                .json_body(json!({"title": "Regatta"}));
            then.status(201).json_body(json!({"created": true}));
        })
        .await;

    let (status, _, body) = send(
        app(Some(&server.base_url())),
        Request::post("/api/laravel/news")
            .header(header::COOKIE, "auth_token=from-cookie")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json!({"title": "Regatta"}).to_string()))
            .unwrap(),
    )
    .await;

    m.assert_async().await;
    assert_eq!(status, StatusCode::CREATED);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["created"], true);
}

#[tokio::test]
async fn explicit_authorization_wins_over_cookie() {
    let server = MockServer::start_async().await;
    let m = server
        .mock_async(|when, then| {
            when.method(DELETE)
                .path("/api/news/7")
                .header("authorization", "Bearer explicit");
            then.status(204);
        })
        .await;

    let (status, _, _) = send(
        app(Some(&server.base_url())),
        Request::delete("/api/laravel/news/7")
            .header(header::AUTHORIZATION, "Bearer explicit")
            .header(header::COOKIE, "auth_token=from-cookie")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    m.assert_async().await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn upstream_errors_pass_through() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.path("/api/news/missing");
            then.status(404)
                .header("content-type", "text/plain")
                .body("no such article");
        })
        .await;

    let (status, ct, body) = send(
        app(Some(&server.base_url())),
        Request::get("/api/laravel/news/missing")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(ct.as_deref(), Some("text/plain"));
    assert_eq!(body, b"no such article");
}

#[tokio::test]
async fn unreachable_backend_is_502_envelope() {
    let (status, _, body) = send(
        app(Some("http://127.0.0.1:9")),
        Request::get("/api/laravel/news").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "News backend unreachable");
}

#[tokio::test]
async fn unconfigured_backend_is_503() {
    let (status, _, body) = send(
        app(None),
        Request::get("/api/laravel/news/1").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn encoded_traversal_stays_inside_news_scope() {
    let server = MockServer::start_async().await;
    let admin = server
        .mock_async(|when, then| {
            when.path("/admin/users")
                .header("authorization", "Bearer victim-session");
            then.status(200).body("ADMIN DATA");
        })
        .await;

    let (status, _, body) = send(
        app(Some(&server.base_url())),
        Request::get("/api/laravel/news/..%2F..%2Fadmin%2Fusers")
            .header(header::COOKIE, "auth_token=victim-session")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    admin.assert_hits_async(0).await;
    assert_ne!(body, b"ADMIN DATA");
    assert_ne!(status, StatusCode::OK);
}

#[tokio::test]
async fn dot_segments_are_refused_before_forwarding() {
    let server = MockServer::start_async().await;
    let any_call = server
        .mock_async(|when, then| {
            when.any_request();
            then.status(200).body("reached");
        })
        .await;

    for uri in [
        "/api/laravel/news/../../admin/users",
        "/api/laravel/news/%2e%2e/%2E%2E/admin/users",
        "/api/laravel/news/a/.%2e/.%2e/.%2e/admin",
    ] {
        let (status, _, body) = send(
            app(Some(&server.base_url())),
            Request::get(uri)
                .header(header::COOKIE, "auth_token=victim-session")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["error"], "Invalid news path");
    }
    any_call.assert_hits_async(0).await;
}
