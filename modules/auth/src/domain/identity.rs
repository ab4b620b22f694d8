//! Identity normalization: the only place raw role strings are looked at.

use chrono::{DateTime, NaiveDateTime, Utc};
use permissions::RoleSet;
use serde::Deserialize;
use serde_json::Value;

use crate::contract::model::Identity;

/// User record as the auth backend sends it. Field casing varies between
/// backend versions, so both camelCase and snake_case are accepted.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawIdentity {
    pub id: Value,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub roles: Option<Vec<String>>,
    #[serde(default, alias = "is_active")]
    pub is_active: Option<Value>,
    #[serde(default, alias = "created_at")]
    pub created_at: Option<String>,
    #[serde(default, alias = "updated_at")]
    pub updated_at: Option<String>,
    #[serde(default, alias = "last_login")]
    pub last_login: Option<String>,
}

impl From<RawIdentity> for Identity {
    fn from(raw: RawIdentity) -> Self {
        let roles = RoleSet::from_legacy(raw.role.as_deref(), raw.roles.as_deref().unwrap_or(&[]));
        let id = match raw.id {
            Value::String(s) => s,
            other => other.to_string(),
        };
        let mut identity = Identity::new(id, raw.email, raw.name.unwrap_or_default(), roles);
        identity.is_active = raw.is_active.as_ref().map(truthy).unwrap_or(true);
        identity.created_at = raw.created_at.as_deref().and_then(parse_timestamp);
        identity.updated_at = raw.updated_at.as_deref().and_then(parse_timestamp);
        identity.last_login = raw.last_login.as_deref().and_then(parse_timestamp);
        identity
    }
}

/// `true`, `1` and `"1"` all mean active (database booleans leak through).
fn truthy(v: &Value) -> bool {
    match v {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_i64().is_some_and(|n| n != 0),
        Value::String(s) => matches!(s.as_str(), "1" | "true"),
        _ => false,
    }
}

/// RFC 3339, or `YYYY-MM-DD HH:MM:SS` taken as UTC.
fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|n| n.and_utc())
        })
}

/// Find the user object in a backend payload: `{data: {user}}`, `{user}`,
/// `{data}` or the bare object.
pub fn identity_from_payload(payload: &Value) -> Option<Identity> {
    let candidates = [
        payload.get("data").and_then(|d| d.get("user")),
        payload.get("user"),
        payload.get("data"),
        Some(payload),
    ];
    candidates
        .into_iter()
        .flatten()
        .find_map(|v| RawIdentity::deserialize(v).ok())
        .map(Identity::from)
}

/// Session token in a login payload: `token`, `access_token`, at the top
/// level or under `data`.
pub fn token_from_payload(payload: &Value) -> Option<String> {
    [Some(payload), payload.get("data")]
        .into_iter()
        .flatten()
        .find_map(|v| {
            v.get("token")
                .or_else(|| v.get("access_token"))
                .and_then(Value::as_str)
        })
        .map(str::to_owned)
}
