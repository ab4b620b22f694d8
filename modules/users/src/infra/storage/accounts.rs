use std::sync::Arc;

use async_trait::async_trait;
use auth::{Account, AccountStore};
use uuid::Uuid;

use crate::contract::model::User;
use crate::domain::repo::UsersRepository;

/// Users live in the auth module's account directory, so every change here
/// is what the next sign-in and token check see.
pub struct AccountsRepository {
    store: Arc<AccountStore>,
}

impl AccountsRepository {
    pub fn new(store: Arc<AccountStore>) -> Self {
        Self { store }
    }
}

fn to_user(a: Account) -> User {
    User {
        id: a.id,
        email: a.email,
        name: a.name,
        roles: a.roles,
        is_active: a.is_active,
        created_at: a.created_at,
        updated_at: a.updated_at,
        last_login: a.last_login,
    }
}

#[async_trait]
impl UsersRepository for AccountsRepository {
    async fn list(&self) -> anyhow::Result<Vec<User>> {
        Ok(self.store.list().into_iter().map(to_user).collect())
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        Ok(self.store.get(id).map(to_user))
    }

    async fn email_exists(&self, email: &str, except: Option<Uuid>) -> anyhow::Result<bool> {
        Ok(self.store.email_taken(email, except))
    }

    async fn insert(&self, user: User, password: Option<String>) -> anyhow::Result<()> {
        self.store.insert(Account {
            id: user.id,
            email: user.email,
            name: user.name,
            password,
            roles: user.roles,
            is_active: user.is_active,
            created_at: user.created_at,
            updated_at: user.updated_at,
            last_login: user.last_login,
        });
        Ok(())
    }

    async fn update(&self, user: User, password: Option<String>) -> anyhow::Result<bool> {
        // last_login belongs to the gate and is left as stored.
        let updated = self.store.update_with(user.id, |a| {
            a.email = user.email;
            a.name = user.name;
            a.roles = user.roles;
            a.is_active = user.is_active;
            a.updated_at = user.updated_at;
            if password.is_some() {
                a.password = password;
            }
        });
        Ok(updated.is_some())
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        Ok(self.store.remove(id))
    }

    async fn ping(&self) -> anyhow::Result<usize> {
        Ok(self.store.len())
    }
}
