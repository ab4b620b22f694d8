use chrono::{DateTime, Utc};
use permissions::RoleSet;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub roles: RoleSet,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

/// Role names arrive raw; the service rejects names it does not know.
#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub roles: Vec<String>,
    pub is_active: Option<bool>,
    /// Without one the user exists in the directory but cannot sign in.
    pub password: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub email: Option<String>,
    pub name: Option<String>,
    pub roles: Option<Vec<String>>,
    pub is_active: Option<bool>,
    pub password: Option<String>,
}

/// Result of the storage connectivity probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeReport {
    pub users: usize,
    pub latency_ms: u64,
}
