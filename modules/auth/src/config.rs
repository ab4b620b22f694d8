use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthConfig {
    /// External auth backend. When absent, `accounts` are used instead.
    pub backend_url: Option<String>,
    pub cookie_name: String,
    #[serde(with = "humantime_serde")]
    pub session_ttl: Duration,
    pub secure_cookie: bool,
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
    pub accounts: Vec<AccountConfig>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            backend_url: None,
            cookie_name: "auth_token".to_string(),
            session_ttl: Duration::from_secs(24 * 60 * 60),
            secure_cookie: true,
            request_timeout: Duration::from_secs(10),
            accounts: Vec::new(),
        }
    }
}

/// Locally configured back-office account (offline / development mode).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AccountConfig {
    /// Generated at startup when absent.
    #[serde(default)]
    pub id: Option<Uuid>,
    pub email: String,
    #[serde(default)]
    pub name: String,
    pub password: String,
    /// Legacy single role; merged with `roles`.
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default = "active")]
    pub is_active: bool,
    /// Pre-issued token that never expires (API clients, smoke tests).
    #[serde(default)]
    pub token: Option<String>,
}

fn active() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_and_accounts() {
        let cfg: AuthConfig = serde_json::from_value(json!({
            "session_ttl": "2h",
            "accounts": [
                {"email": "ops@harbor.test", "password": "pw", "role": "administrator"}
            ]
        }))
        .unwrap();

        assert_eq!(cfg.cookie_name, "auth_token");
        assert!(cfg.secure_cookie);
        assert_eq!(cfg.session_ttl, Duration::from_secs(7200));
        assert!(cfg.accounts[0].is_active);
        assert_eq!(cfg.accounts[0].role.as_deref(), Some("administrator"));
    }
}
