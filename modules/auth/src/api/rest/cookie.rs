//! Session cookie encoding and token lookup.

use axum::http::{header, HeaderMap, HeaderValue};
use axum::http::header::InvalidHeaderValue;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct CookieSettings {
    pub name: String,
    pub secure: bool,
    pub max_age: Duration,
}

impl Default for CookieSettings {
    fn default() -> Self {
        Self {
            name: "auth_token".to_string(),
            secure: true,
            max_age: Duration::from_secs(24 * 60 * 60),
        }
    }
}

/// Value of cookie `name` across every `Cookie` header.
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v.trim_matches('"').to_string())
        .filter(|v| !v.is_empty())
}

/// `Authorization: Bearer <token>`, scheme matched case-insensitively.
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then(|| token.to_string())
}

fn render(settings: &CookieSettings, value: &str, max_age: u64) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!(
        "{}={}; Path=/; Max-Age={}; HttpOnly; SameSite=Strict",
        settings.name, value, max_age
    );
    if settings.secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

pub fn session_cookie(settings: &CookieSettings, token: &str) -> Result<HeaderValue, InvalidHeaderValue> {
    render(settings, token, settings.max_age.as_secs())
}

pub fn clear_cookie(settings: &CookieSettings) -> Result<HeaderValue, InvalidHeaderValue> {
    render(settings, "", 0)
}
