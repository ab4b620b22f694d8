use std::sync::Arc;

use auth::{api::rest::cookie::read_cookie, AuthContext};
use axum::{
    body::Bytes,
    extract::{OriginalUri, RawQuery},
    http::{HeaderMap, Method},
    response::Response,
    Extension,
};
use modkit::{ApiError, ApiResult};

use crate::forward::{Upstream, PUBLIC_PREFIX};

/// `None` when no backend is configured.
pub type UpstreamHandle = Option<Arc<Upstream>>;

async fn relay(
    upstream: UpstreamHandle,
    auth: &AuthContext,
    method: Method,
    raw_path: &str,
    query: Option<String>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Response> {
    let upstream =
        upstream.ok_or_else(|| ApiError::Unavailable("News backend is not configured".into()))?;
    let session = read_cookie(&headers, &auth.cookie().name);
    tracing::debug!(%method, path = raw_path, "proxying to news backend");
    upstream
        .forward(method, raw_path, query.as_deref(), &headers, session, body)
        .await
}

/// Both passthrough routes. The path is taken from the raw request URI, so
/// percent-escapes reach the backend untouched.
pub async fn proxy(
    Extension(upstream): Extension<UpstreamHandle>,
    Extension(auth): Extension<Arc<AuthContext>>,
    method: Method,
    OriginalUri(uri): OriginalUri,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Response> {
    let raw_path = uri.path().strip_prefix(PUBLIC_PREFIX).unwrap_or_default();
    relay(upstream, &auth, method, raw_path, query, headers, body).await
}
