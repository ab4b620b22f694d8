use std::sync::Arc;

use axum::{
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Extension, Json,
};
use modkit::{api::response, ApiEnvelope, ApiError, ApiResult, JsonBody};

use crate::api::rest::{
    cookie,
    dto::{LoginDto, LoginReq, ProfileDto, VerifyDto},
    extract::{AuthContext, Authenticated},
};

fn cookie_header(
    value: Result<header::HeaderValue, header::InvalidHeaderValue>,
) -> ApiResult<header::HeaderValue> {
    value.map_err(|e| ApiError::internal(anyhow::anyhow!("cannot encode session cookie: {e}")))
}

pub async fn login(
    Extension(ctx): Extension<Arc<AuthContext>>,
    JsonBody(req): JsonBody<LoginReq>,
) -> ApiResult<impl IntoResponse> {
    if req.email.trim().is_empty() || req.password.is_empty() {
        return Err(ApiError::validation("Email and password are required"));
    }

    let session = ctx
        .gate()
        .login(req.email.trim(), &req.password)
        .await?
        .ok_or_else(|| ApiError::Unauthenticated("Invalid email or password".into()))?;

    let set_cookie = cookie_header(cookie::session_cookie(ctx.cookie(), &session.token))?;
    tracing::info!(user = %session.identity.email, "login succeeded");

    Ok((
        [(header::SET_COOKIE, set_cookie)],
        response::ok_with_message(
            LoginDto {
                user: session.identity.into(),
            },
            "Login successful",
        ),
    ))
}

pub async fn verify(auth: Authenticated) -> ApiResult<impl IntoResponse> {
    Ok(response::ok(VerifyDto {
        valid: true,
        user: auth.identity.into(),
    }))
}

pub async fn profile(auth: Authenticated) -> ApiResult<impl IntoResponse> {
    Ok(response::ok(ProfileDto::from(auth.identity)))
}

/// Always clears the cookie; revoking the token upstream is best-effort.
pub async fn logout(
    Extension(ctx): Extension<Arc<AuthContext>>,
    headers: HeaderMap,
) -> ApiResult<impl IntoResponse> {
    if let Some(token) = ctx.token_from(&headers) {
        if let Err(e) = ctx.gate().logout(&token).await {
            tracing::warn!(error = %e, "token revocation failed");
        }
    }
    let cleared = cookie_header(cookie::clear_cookie(ctx.cookie()))?;
    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cleared)],
        Json(ApiEnvelope::<()>::message("Logged out successfully")),
    ))
}
