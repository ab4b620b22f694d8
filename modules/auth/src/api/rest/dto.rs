use chrono::{DateTime, Utc};
use permissions::{CapabilitySet, Role, RoleSet};
use serde::{Deserialize, Serialize};

use crate::contract::model::Identity;

#[derive(Debug, Clone, Deserialize)]
pub struct LoginReq {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Identity as exposed to the back-office client. `role` is the primary
/// role for clients that only understand one; `capabilities` is advisory.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileDto {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: Option<Role>,
    pub roles: RoleSet,
    pub capabilities: CapabilitySet,
    pub is_active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_login: Option<DateTime<Utc>>,
}

impl From<Identity> for ProfileDto {
    fn from(id: Identity) -> Self {
        Self {
            role: id.roles.primary(),
            id: id.id,
            email: id.email,
            name: id.name,
            roles: id.roles,
            capabilities: id.capabilities,
            is_active: id.is_active,
            created_at: id.created_at,
            updated_at: id.updated_at,
            last_login: id.last_login,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct VerifyDto {
    pub valid: bool,
    pub user: ProfileDto,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginDto {
    pub user: ProfileDto,
}
