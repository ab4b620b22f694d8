use chrono::Utc;
use dashmap::DashMap;
use permissions::RoleSet;
use uuid::Uuid;

use crate::config::AccountConfig;
use crate::contract::model::Account;

/// Process-wide account directory shared by the static gate and the users
/// module. Every call is a short map operation; no lock outlives it.
#[derive(Default)]
pub struct AccountStore {
    accounts: DashMap<Uuid, Account>,
    /// Pre-issued tokens from configuration → account id.
    api_tokens: DashMap<String, Uuid>,
}

impl AccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed from configuration. A repeated email keeps the first entry.
    pub fn from_config(accounts: &[AccountConfig]) -> Self {
        let store = Self::new();
        let now = Utc::now();
        for acc in accounts {
            let email = acc.email.trim().to_lowercase();
            if store.find_by_email(&email).is_some() {
                tracing::warn!(%email, "duplicate configured account ignored");
                continue;
            }
            let account = Account {
                id: acc.id.unwrap_or_else(Uuid::new_v4),
                email,
                name: acc.name.clone(),
                password: Some(acc.password.clone()),
                roles: RoleSet::from_legacy(acc.role.as_deref(), &acc.roles),
                is_active: acc.is_active,
                created_at: now,
                updated_at: now,
                last_login: None,
            };
            if let Some(token) = &acc.token {
                store.api_tokens.insert(token.clone(), account.id);
            }
            store.accounts.insert(account.id, account);
        }
        store
    }

    /// Oldest first, ties by email.
    pub fn list(&self) -> Vec<Account> {
        let mut all: Vec<Account> = self.accounts.iter().map(|a| a.value().clone()).collect();
        all.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.email.cmp(&b.email)));
        all
    }

    pub fn get(&self, id: Uuid) -> Option<Account> {
        self.accounts.get(&id).map(|a| a.clone())
    }

    pub fn find_by_email(&self, email: &str) -> Option<Account> {
        let email = email.trim();
        self.accounts
            .iter()
            .find(|a| a.email.eq_ignore_ascii_case(email))
            .map(|a| a.value().clone())
    }

    pub fn find_by_api_token(&self, token: &str) -> Option<Account> {
        let id = *self.api_tokens.get(token)?;
        self.get(id)
    }

    /// Case-insensitive; `except` skips one account (the one being edited).
    pub fn email_taken(&self, email: &str, except: Option<Uuid>) -> bool {
        self.accounts
            .iter()
            .any(|a| Some(a.id) != except && a.email.eq_ignore_ascii_case(email))
    }

    pub fn insert(&self, account: Account) {
        self.accounts.insert(account.id, account);
    }

    /// Apply `edit` in place; `None` when the account does not exist.
    pub fn update_with<F>(&self, id: Uuid, edit: F) -> Option<Account>
    where
        F: FnOnce(&mut Account),
    {
        let mut slot = self.accounts.get_mut(&id)?;
        edit(&mut slot);
        Some(slot.clone())
    }

    /// Also revokes any configured token pointing at the account.
    pub fn remove(&self, id: Uuid) -> bool {
        let removed = self.accounts.remove(&id).is_some();
        if removed {
            self.api_tokens.retain(|_, owner| *owner != id);
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}
