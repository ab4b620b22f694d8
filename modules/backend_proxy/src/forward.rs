//! Verbatim forwarding of a request to the news backend.

use axum::{
    body::{Body, Bytes},
    http::{header, HeaderMap, Method},
    response::{IntoResponse, Response},
};
use modkit::{ApiError, TracedClient};
use std::time::Duration;

/// Request headers copied to the backend as they are.
const FORWARDED: [header::HeaderName; 3] = [header::CONTENT_TYPE, header::ACCEPT, header::AUTHORIZATION];

/// Public prefix mapped onto `{base}/api/news`.
pub const PUBLIC_PREFIX: &str = "/api/laravel/news";

#[derive(Clone, Debug)]
pub struct Upstream {
    client: TracedClient,
    base: String,
    /// Path every target must stay under, e.g. `/v1/api/news`.
    scope: String,
}

/// A segment URL parsing would collapse (`.`, `..` in any percent-encoded
/// spelling), or one carrying a backslash, which http(s) URLs treat as `/`.
fn is_unsafe_segment(segment: &str) -> bool {
    let lowered = segment.to_ascii_lowercase().replace("%2e", ".");
    lowered == "." || lowered == ".." || segment.contains('\\')
}

impl Upstream {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let base = base_url.trim_end_matches('/').to_string();
        let parsed = url::Url::parse(&format!("{base}/api/news"))
            .map_err(|e| anyhow::anyhow!("invalid backend_proxy base_url '{base_url}': {e}"))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            anyhow::bail!("backend_proxy base_url must be http(s), got '{base_url}'");
        }
        Ok(Self {
            client: TracedClient::with_timeout(timeout)?,
            base,
            scope: parsed.path().to_string(),
        })
    }

    /// `{base}/api/news[/{raw_path}][?{query}]`.
    ///
    /// `raw_path` is the still percent-encoded remainder after
    /// [`PUBLIC_PREFIX`] and is copied as is. Dot segments are refused so the
    /// resolved URL never leaves the news scope.
    pub fn target(&self, raw_path: &str, query: Option<&str>) -> Result<url::Url, ApiError> {
        let path = raw_path.trim_start_matches('/');
        if path.split('/').any(is_unsafe_segment) {
            return Err(ApiError::validation("Invalid news path"));
        }

        let mut raw = format!("{}/api/news", self.base);
        if !path.is_empty() {
            raw.push('/');
            raw.push_str(path);
        }
        if let Some(q) = query.filter(|q| !q.is_empty()) {
            raw.push('?');
            raw.push_str(q);
        }

        let url = url::Url::parse(&raw).map_err(|_| ApiError::validation("Invalid news path"))?;
        let inside = url.path() == self.scope
            || url
                .path()
                .strip_prefix(self.scope.as_str())
                .is_some_and(|rest| rest.starts_with('/'));
        if !inside {
            return Err(ApiError::validation("Invalid news path"));
        }
        Ok(url)
    }

    /// `session_token` is sent as a bearer token when the caller brought no
    /// `Authorization` header of its own.
    pub async fn forward(
        &self,
        method: Method,
        raw_path: &str,
        query: Option<&str>,
        headers: &HeaderMap,
        session_token: Option<String>,
        body: Bytes,
    ) -> Result<Response, ApiError> {
        let url = self.target(raw_path, query)?;
        let mut req = self.client.request(method, url.as_str());
        for name in FORWARDED.iter() {
            for value in headers.get_all(name) {
                req = req.header(name, value);
            }
        }
        if !headers.contains_key(header::AUTHORIZATION) {
            if let Some(token) = session_token {
                req = req.bearer_auth(token);
            }
        }
        if !body.is_empty() {
            req = req.body(body);
        }

        let req = req
            .build()
            .map_err(|e| ApiError::internal(anyhow::anyhow!("cannot build upstream request: {e}")))?;
        let resp = self.client.execute(req).await.map_err(|e| {
            tracing::warn!(error = %e, %url, "news backend unreachable");
            ApiError::BadGateway("News backend unreachable".into())
        })?;

        let status = resp.status();
        let content_type = resp.headers().get(header::CONTENT_TYPE).cloned();
        let bytes = resp.bytes().await.map_err(|e| {
            tracing::warn!(error = %e, %url, "news backend response truncated");
            ApiError::BadGateway("News backend response could not be read".into())
        })?;

        let mut out = (status, Body::from(bytes)).into_response();
        if let Some(ct) = content_type {
            out.headers_mut().insert(header::CONTENT_TYPE, ct);
        } else {
            out.headers_mut().remove(header::CONTENT_TYPE);
        }
        Ok(out)
    }
}
