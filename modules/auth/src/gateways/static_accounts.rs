use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::config::AccountConfig;
use crate::contract::{
    client::AuthGate,
    error::AuthError,
    model::{Identity, Session},
};
use crate::infra::storage::AccountStore;

struct SessionEntry {
    account_id: Uuid,
    expires_at: DateTime<Utc>,
}

/// In-process gate over the local [`AccountStore`]. Sessions hold only the
/// account id; the account is read again on every verify.
pub struct StaticAuthGate {
    store: Arc<AccountStore>,
    sessions: DashMap<String, SessionEntry>,
    ttl: chrono::Duration,
}

impl StaticAuthGate {
    pub fn new(accounts: &[AccountConfig], ttl: Duration) -> Self {
        Self::with_store(Arc::new(AccountStore::from_config(accounts)), ttl)
    }

    pub fn with_store(store: Arc<AccountStore>, ttl: Duration) -> Self {
        Self {
            store,
            sessions: DashMap::new(),
            ttl: chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::hours(24)),
        }
    }

    pub fn account_count(&self) -> usize {
        self.store.len()
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }
}

#[async_trait]
impl AuthGate for StaticAuthGate {
    async fn verify(&self, token: &str) -> Result<Option<Identity>, AuthError> {
        let session = self
            .sessions
            .get(token)
            .map(|s| (s.account_id, s.expires_at));

        let account = match session {
            Some((_, expires_at)) if expires_at <= Utc::now() => {
                self.sessions.remove(token);
                tracing::debug!("session expired");
                return Ok(None);
            }
            Some((account_id, _)) => match self.store.get(account_id) {
                Some(account) => account,
                None => {
                    self.sessions.remove(token);
                    return Ok(None);
                }
            },
            None => match self.store.find_by_api_token(token) {
                Some(account) => account,
                None => return Ok(None),
            },
        };

        Ok(account.is_active.then(|| account.identity()))
    }

    async fn login(&self, email: &str, password: &str) -> Result<Option<Session>, AuthError> {
        let Some(account) = self.store.find_by_email(email) else {
            return Ok(None);
        };
        if account.password.as_deref() != Some(password) || !account.is_active {
            return Ok(None);
        }

        let now = Utc::now();
        self.sessions.retain(|_, s| s.expires_at > now);

        let Some(account) = self.store.update_with(account.id, |a| a.last_login = Some(now)) else {
            return Ok(None);
        };
        let identity = account.identity();

        let token = Uuid::new_v4().simple().to_string();
        self.sessions.insert(
            token.clone(),
            SessionEntry {
                account_id: account.id,
                expires_at: now + self.ttl,
            },
        );
        tracing::info!(user = %identity.email, "session issued");
        Ok(Some(Session { token, identity }))
    }

    async fn logout(&self, token: &str) -> Result<(), AuthError> {
        self.sessions.remove(token);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use permissions::{Capability, RoleSet};

    const OPS_ID: Uuid = Uuid::from_u128(0x0b5);

    fn account(email: &str, role: &str, active: bool, token: Option<&str>) -> AccountConfig {
        AccountConfig {
            id: None,
            email: email.into(),
            name: "Dock Master".into(),
            password: "s3cret".into(),
            role: Some(role.into()),
            roles: vec![],
            is_active: active,
            token: token.map(Into::into),
        }
    }

    #[tokio::test]
    async fn login_verify_logout() {
        let mut ops = account("Ops@Harbor.test", "event-manager", true, None);
        ops.id = Some(OPS_ID);
        let gate = StaticAuthGate::new(&[ops], Duration::from_secs(60));

        assert!(gate.login("ops@harbor.test", "wrong").await.unwrap().is_none());
        let session = gate
            .login(" OPS@harbor.test ", "s3cret")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(session.identity.id, OPS_ID.to_string());
        assert!(session.identity.last_login.is_some());

        let who = gate.verify(&session.token).await.unwrap().unwrap();
        assert!(who.can(Capability::Events));
        assert!(!who.can(Capability::Users));

        gate.logout(&session.token).await.unwrap();
        assert!(gate.verify(&session.token).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn inactive_account_is_locked_out() {
        let gate = StaticAuthGate::new(
            &[account("idle@harbor.test", "admin", false, Some("fixed"))],
            Duration::from_secs(60),
        );
        assert!(gate.login("idle@harbor.test", "s3cret").await.unwrap().is_none());
        assert!(gate.verify("fixed").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn expired_session_is_dropped() {
        let gate = StaticAuthGate::new(
            &[account("ops@harbor.test", "admin", true, None)],
            Duration::ZERO,
        );
        let session = gate.login("ops@harbor.test", "s3cret").await.unwrap().unwrap();
        assert_eq!(gate.session_count(), 1);
        assert!(gate.verify(&session.token).await.unwrap().is_none());
        assert_eq!(gate.session_count(), 0);
    }

    #[tokio::test]
    async fn login_sweeps_sessions_that_were_never_presented() {
        let gate = StaticAuthGate::new(
            &[account("ops@harbor.test", "admin", true, None)],
            Duration::ZERO,
        );
        for _ in 0..5 {
            gate.login("ops@harbor.test", "s3cret").await.unwrap().unwrap();
        }
        assert_eq!(gate.session_count(), 1);
    }

    #[tokio::test]
    async fn fixed_token_never_expires() {
        let gate = StaticAuthGate::new(
            &[account("api@harbor.test", "viewer", true, Some("svc-token"))],
            Duration::ZERO,
        );
        let who = gate.verify("svc-token").await.unwrap().unwrap();
        assert!(who.capabilities.is_empty());
        assert_eq!(gate.account_count(), 1);
    }

    #[tokio::test]
    async fn directory_changes_apply_to_live_sessions() {
        let store = Arc::new(AccountStore::from_config(&[account(
            "crew@harbor.test",
            "viewer",
            true,
            None,
        )]));
        let gate = StaticAuthGate::with_store(store.clone(), Duration::from_secs(60));
        let session = gate.login("crew@harbor.test", "s3cret").await.unwrap().unwrap();
        let id = session.identity.id.parse::<Uuid>().unwrap();

        assert!(!gate.verify(&session.token).await.unwrap().unwrap().can(Capability::News));
        store.update_with(id, |a| a.roles = RoleSet::from_names(["news_manager"]));
        assert!(gate.verify(&session.token).await.unwrap().unwrap().can(Capability::News));

        store.update_with(id, |a| a.is_active = false);
        assert!(gate.verify(&session.token).await.unwrap().is_none());

        store.update_with(id, |a| a.is_active = true);
        assert!(store.remove(id));
        assert!(gate.verify(&session.token).await.unwrap().is_none());
        assert_eq!(gate.session_count(), 0);
    }
}
