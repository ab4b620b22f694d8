use async_trait::async_trait;
use modkit::TracedClient;
use reqwest::{Method, StatusCode};
use serde_json::{json, Value};
use std::time::Duration;

use crate::contract::{
    client::AuthGate,
    error::AuthError,
    model::{Identity, Session},
};
use crate::domain::identity::{identity_from_payload, token_from_payload};

/// Gate backed by the external auth service (`/auth/verify`, `/auth/login`,
/// `/auth/logout` under `base`).
#[derive(Clone, Debug)]
pub struct RemoteAuthGate {
    client: TracedClient,
    base: String,
}

impl RemoteAuthGate {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let parsed = url::Url::parse(base_url)
            .map_err(|e| anyhow::anyhow!("invalid auth backend_url '{base_url}': {e}"))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            anyhow::bail!("auth backend_url must be http(s), got '{base_url}'");
        }
        Ok(Self {
            client: TracedClient::with_timeout(timeout)?,
            base: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    async fn send(&self, req: reqwest::RequestBuilder) -> Result<reqwest::Response, AuthError> {
        let req = req
            .build()
            .map_err(|e| AuthError::Unreachable(e.to_string()))?;
        self.client
            .execute(req)
            .await
            .map_err(|e| AuthError::Unreachable(e.to_string()))
    }

    async fn json_body(resp: reqwest::Response) -> Result<Value, AuthError> {
        resp.json::<Value>()
            .await
            .map_err(|e| AuthError::Malformed(e.to_string()))
    }
}

#[async_trait]
impl AuthGate for RemoteAuthGate {
    async fn verify(&self, token: &str) -> Result<Option<Identity>, AuthError> {
        let resp = self
            .send(
                self.client
                    .request(Method::GET, &self.url("/auth/verify"))
                    .bearer_auth(token)
                    .header(reqwest::header::ACCEPT, "application/json"),
            )
            .await?;

        match resp.status() {
            s if s.is_success() => {}
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::NOT_FOUND => {
                return Ok(None)
            }
            s => return Err(AuthError::Upstream { status: s.as_u16() }),
        }

        let body = Self::json_body(resp).await?;
        if body.get("success").and_then(Value::as_bool) == Some(false) {
            return Ok(None);
        }
        let identity = identity_from_payload(&body)
            .ok_or_else(|| AuthError::Malformed("no user in verify response".into()))?;
        if !identity.is_active {
            tracing::debug!(user = %identity.email, "token belongs to inactive account");
            return Ok(None);
        }
        Ok(Some(identity))
    }

    async fn login(&self, email: &str, password: &str) -> Result<Option<Session>, AuthError> {
        let resp = self
            .send(
                self.client
                    .request(Method::POST, &self.url("/auth/login"))
                    .header(reqwest::header::ACCEPT, "application/json")
                    .json(&json!({ "email": email, "password": password })),
            )
            .await?;

        match resp.status() {
            s if s.is_success() => {}
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::UNPROCESSABLE_ENTITY => {
                return Ok(None)
            }
            s => return Err(AuthError::Upstream { status: s.as_u16() }),
        }

        let body = Self::json_body(resp).await?;
        let token = token_from_payload(&body)
            .ok_or_else(|| AuthError::Malformed("no token in login response".into()))?;
        let identity = identity_from_payload(&body)
            .ok_or_else(|| AuthError::Malformed("no user in login response".into()))?;
        if !identity.is_active {
            return Ok(None);
        }
        Ok(Some(Session { token, identity }))
    }

    async fn logout(&self, token: &str) -> Result<(), AuthError> {
        let resp = self
            .send(
                self.client
                    .request(Method::POST, &self.url("/auth/logout"))
                    .bearer_auth(token),
            )
            .await?;
        let status = resp.status();
        if status.is_success() || status == StatusCode::UNAUTHORIZED {
            Ok(())
        } else {
            Err(AuthError::Upstream {
                status: status.as_u16(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_http_base() {
        assert!(RemoteAuthGate::new("ftp://auth.local", Duration::from_secs(1)).is_err());
        assert!(RemoteAuthGate::new("not a url", Duration::from_secs(1)).is_err());
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let gate = RemoteAuthGate::new("http://auth.local/api/", Duration::from_secs(1)).unwrap();
        assert_eq!(gate.url("/auth/verify"), "http://auth.local/api/auth/verify");
    }
}
