//! `RemoteAuthGate` against a mocked auth backend.

use std::time::Duration;

use auth::gateways::RemoteAuthGate;
use auth::{AuthError, AuthGate};
use httpmock::prelude::*;
use permissions::{Capability, Role};
use serde_json::json;

fn gate(server: &MockServer) -> RemoteAuthGate {
    RemoteAuthGate::new(&server.base_url(), Duration::from_secs(2)).unwrap()
}

#[tokio::test]
async fn verify_normalizes_legacy_role() {
    let server = MockServer::start_async().await;
    let m = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/auth/verify")
                .header("authorization", "Bearer good");
            then.status(200).json_body(json!({
                "success": true,
                "data": {"user": {
                    "id": 42,
                    "email": "bosun@harbor.test",
                    "name": "Bosun",
                    "role": "Content-Manager",
                    "is_active": 1,
                    "created_at": "2025-01-10 08:00:00"
                }}
            }));
        })
        .await;

    let id = gate(&server).verify("good").await.unwrap().unwrap();
    m.assert_async().await;
    assert_eq!(id.id, "42");
    assert!(id.roles.contains(Role::ContentManager));
    assert!(id.can(Capability::Events) && id.can(Capability::News));
    assert!(!id.can(Capability::Settings));
    assert!(id.created_at.is_some());
}

#[tokio::test]
async fn rejected_and_inactive_tokens_verify_to_none() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/auth/verify").header("authorization", "Bearer bad");
            then.status(401).json_body(json!({"success": false}));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/auth/verify").header("authorization", "Bearer idle");
            then.status(200).json_body(json!({
                "user": {"id": 1, "email": "idle@harbor.test", "role": "admin", "isActive": false}
            }));
        })
        .await;

    let gate = gate(&server);
    assert!(gate.verify("bad").await.unwrap().is_none());
    assert!(gate.verify("idle").await.unwrap().is_none());
}

#[tokio::test]
async fn backend_failure_is_an_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/auth/verify");
            then.status(500);
        })
        .await;

    let err = gate(&server).verify("any").await.unwrap_err();
    assert!(matches!(err, AuthError::Upstream { status: 500 }));
}

#[tokio::test]
async fn unreachable_backend() {
    let gate = RemoteAuthGate::new("http://127.0.0.1:9", Duration::from_millis(500)).unwrap();
    assert!(matches!(
        gate.verify("any").await,
        Err(AuthError::Unreachable(_))
    ));
}

#[tokio::test]
async fn login_forwards_credentials() {
    let server = MockServer::start_async().await;
    let m = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/auth/login")
                .json_body(json!({"email": "bosun@harbor.test", "password": "knots"}));
            then.status(200).json_body(json!({
                "success": true,
                "data": {
                    "token": "issued",
                    "user": {"id": "u1", "email": "bosun@harbor.test", "roles": ["user_manager"]}
                }
            }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/auth/login")
                .json_body(json!({"email": "bosun@harbor.test", "password": "wrong"}));
            then.status(401);
        })
        .await;

    let gate = gate(&server);
    let session = gate.login("bosun@harbor.test", "knots").await.unwrap().unwrap();
    m.assert_async().await;
    assert_eq!(session.token, "issued");
    assert!(session.identity.can(Capability::Users));

    assert!(gate.login("bosun@harbor.test", "wrong").await.unwrap().is_none());
}

#[tokio::test]
async fn logout_is_forwarded() {
    let server = MockServer::start_async().await;
    let m = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/auth/logout")
                .header("authorization", "Bearer t");
            then.status(200);
        })
        .await;

    gate(&server).logout("t").await.unwrap();
    m.assert_async().await;
}
