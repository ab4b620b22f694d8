use chrono::{DateTime, Utc};
use permissions::{Capability, CapabilitySet, RoleSet};
use uuid::Uuid;

/// Verified caller. Roles are normalized and capabilities resolved once,
/// when the identity is built.
#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    pub id: String,
    pub email: String,
    pub name: String,
    pub roles: RoleSet,
    pub capabilities: CapabilitySet,
    pub is_active: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub last_login: Option<DateTime<Utc>>,
}

impl Identity {
    pub fn new(
        id: impl Into<String>,
        email: impl Into<String>,
        name: impl Into<String>,
        roles: RoleSet,
    ) -> Self {
        let capabilities = permissions::resolve(&roles);
        Self {
            id: id.into(),
            email: email.into(),
            name: name.into(),
            roles,
            capabilities,
            is_active: true,
            created_at: None,
            updated_at: None,
            last_login: None,
        }
    }

    pub fn can(&self, capability: Capability) -> bool {
        self.capabilities.contains(capability)
    }
}

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub identity: Identity,
}

/// Back-office account as kept in the local directory. The same record
/// backs `/api/users` and the static gate, so status and role changes apply
/// to the next request.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub id: Uuid,
    /// Lower-cased.
    pub email: String,
    pub name: String,
    /// `None` for accounts that cannot sign in with a password.
    pub password: Option<String>,
    pub roles: RoleSet,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

impl Account {
    pub fn identity(&self) -> Identity {
        let mut identity = Identity::new(
            self.id.to_string(),
            self.email.clone(),
            self.name.clone(),
            self.roles.clone(),
        );
        identity.is_active = self.is_active;
        identity.created_at = Some(self.created_at);
        identity.updated_at = Some(self.updated_at);
        identity.last_login = self.last_login;
        identity
    }
}
