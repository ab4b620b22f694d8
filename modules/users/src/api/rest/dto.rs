use chrono::{DateTime, Utc};
use permissions::{Role, RoleSet};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::contract::model::{NewUser, ProbeReport, User, UserPatch};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    /// Primary role, for clients that only show one.
    pub role: Option<Role>,
    pub roles: RoleSet,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

impl From<User> for UserDto {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            name: u.name,
            role: u.roles.primary(),
            roles: u.roles,
            is_active: u.is_active,
            created_at: u.created_at,
            updated_at: u.updated_at,
            last_login: u.last_login,
        }
    }
}

/// Accepts the legacy single `role` next to `roles`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserReq {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: String,
    pub role: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
    pub is_active: Option<bool>,
    pub password: Option<String>,
}

impl From<CreateUserReq> for NewUser {
    fn from(r: CreateUserReq) -> Self {
        Self {
            email: r.email,
            name: r.name,
            roles: merge_roles(r.role, Some(r.roles)).unwrap_or_default(),
            is_active: r.is_active,
            password: r.password,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserReq {
    pub email: Option<String>,
    pub name: Option<String>,
    pub role: Option<String>,
    pub roles: Option<Vec<String>>,
    pub is_active: Option<bool>,
    pub password: Option<String>,
}

impl From<UpdateUserReq> for UserPatch {
    fn from(r: UpdateUserReq) -> Self {
        Self {
            email: r.email,
            name: r.name,
            roles: merge_roles(r.role, r.roles),
            is_active: r.is_active,
            password: r.password,
        }
    }
}

fn merge_roles(role: Option<String>, roles: Option<Vec<String>>) -> Option<Vec<String>> {
    match (role, roles) {
        (None, None) => None,
        (role, roles) => Some(role.into_iter().chain(roles.unwrap_or_default()).collect()),
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeDto {
    pub status: &'static str,
    pub users: usize,
    pub latency_ms: u64,
}

impl From<ProbeReport> for ProbeDto {
    fn from(r: ProbeReport) -> Self {
        Self {
            status: "connected",
            users: r.users,
            latency_ms: r.latency_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_role_merges_into_roles() {
        let patch: UserPatch = UpdateUserReq {
            role: Some("admin".into()),
            roles: Some(vec!["viewer".into()]),
            ..Default::default()
        }
        .into();
        assert_eq!(patch.roles.unwrap(), ["admin", "viewer"]);

        let untouched: UserPatch = UpdateUserReq::default().into();
        assert!(untouched.roles.is_none());
    }
}
