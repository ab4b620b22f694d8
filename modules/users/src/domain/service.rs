use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use permissions::{Role, RoleSet};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::contract::model::{NewUser, ProbeReport, User, UserPatch};
use crate::domain::error::DomainError;
use crate::domain::repo::UsersRepository;

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub max_name_length: usize,
    pub probe_timeout: Duration,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            max_name_length: 100,
            probe_timeout: Duration::from_secs(5),
        }
    }
}

/// The authenticated caller, as far as self-protection rules care.
#[derive(Debug, Clone)]
pub struct Actor {
    pub id: String,
    pub email: String,
}

impl Actor {
    fn is(&self, user: &User) -> bool {
        self.id == user.id.to_string() || self.email.eq_ignore_ascii_case(&user.email)
    }
}

#[derive(Clone)]
pub struct Service {
    repo: Arc<dyn UsersRepository>,
    config: ServiceConfig,
}

impl Service {
    pub fn new(repo: Arc<dyn UsersRepository>, config: ServiceConfig) -> Self {
        Self { repo, config }
    }

    #[instrument(name = "users.service.list", skip(self))]
    pub async fn list(&self) -> Result<Vec<User>, DomainError> {
        Ok(self.repo.list().await?)
    }

    #[instrument(name = "users.service.get", skip(self), fields(user_id = %id))]
    pub async fn get(&self, id: Uuid) -> Result<User, DomainError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::user_not_found(id))
    }

    #[instrument(name = "users.service.create", skip(self, new), fields(email = %new.email))]
    pub async fn create(&self, new: NewUser) -> Result<User, DomainError> {
        let email = validate_email(&new.email)?;
        let name = self.validate_name(&new.name)?;
        let roles = parse_roles(&new.roles)?;
        let password = new.password.as_deref().map(validate_password).transpose()?;

        if self.repo.email_exists(&email, None).await? {
            return Err(DomainError::email_already_exists(email));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email,
            name,
            roles,
            is_active: new.is_active.unwrap_or(true),
            created_at: now,
            updated_at: now,
            last_login: None,
        };
        self.repo.insert(user.clone(), password).await?;
        info!(user_id = %user.id, "user created");
        Ok(user)
    }

    #[instrument(name = "users.service.update", skip(self, patch, actor), fields(user_id = %id))]
    pub async fn update(&self, actor: &Actor, id: Uuid, patch: UserPatch) -> Result<User, DomainError> {
        let mut user = self.get(id).await?;

        if let Some(active) = patch.is_active {
            if active != user.is_active && actor.is(&user) {
                return Err(DomainError::SelfAction("You cannot change your own status"));
            }
            user.is_active = active;
        }
        if let Some(email) = patch.email {
            let email = validate_email(&email)?;
            if self.repo.email_exists(&email, Some(id)).await? {
                return Err(DomainError::email_already_exists(email));
            }
            user.email = email;
        }
        if let Some(name) = patch.name {
            user.name = self.validate_name(&name)?;
        }
        if let Some(roles) = patch.roles {
            user.roles = parse_roles(&roles)?;
        }
        let password = patch.password.as_deref().map(validate_password).transpose()?;
        user.updated_at = Utc::now();

        if !self.repo.update(user.clone(), password).await? {
            return Err(DomainError::user_not_found(id));
        }
        info!("user updated");
        Ok(user)
    }

    /// Flip `is_active`. Nobody can lock themselves out.
    #[instrument(name = "users.service.toggle_status", skip(self, actor), fields(user_id = %id))]
    pub async fn toggle_status(&self, actor: &Actor, id: Uuid) -> Result<User, DomainError> {
        let mut user = self.get(id).await?;
        if actor.is(&user) {
            return Err(DomainError::SelfAction("You cannot change your own status"));
        }
        user.is_active = !user.is_active;
        user.updated_at = Utc::now();
        if !self.repo.update(user.clone(), None).await? {
            return Err(DomainError::user_not_found(id));
        }
        info!(active = user.is_active, "user status toggled");
        Ok(user)
    }

    #[instrument(name = "users.service.delete", skip(self, actor), fields(user_id = %id))]
    pub async fn delete(&self, actor: &Actor, id: Uuid) -> Result<(), DomainError> {
        let user = self.get(id).await?;
        if actor.is(&user) {
            return Err(DomainError::SelfAction("You cannot delete your own account"));
        }
        if !self.repo.delete(id).await? {
            return Err(DomainError::user_not_found(id));
        }
        info!("user deleted");
        Ok(())
    }

    /// Round trip to storage, bounded by `probe_timeout`.
    #[instrument(name = "users.service.probe", skip(self))]
    pub async fn probe(&self) -> Result<ProbeReport, DomainError> {
        let started = Instant::now();
        match tokio::time::timeout(self.config.probe_timeout, self.repo.ping()).await {
            Ok(Ok(users)) => {
                let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
                debug!(users, latency_ms, "storage probe ok");
                Ok(ProbeReport { users, latency_ms })
            }
            Ok(Err(e)) => Err(DomainError::Storage(e)),
            Err(_) => {
                warn!(timeout = ?self.config.probe_timeout, "storage probe timed out");
                Err(DomainError::ProbeTimeout(self.config.probe_timeout))
            }
        }
    }

    fn validate_name(&self, raw: &str) -> Result<String, DomainError> {
        let name = raw.trim();
        if name.is_empty() {
            return Err(DomainError::EmptyName);
        }
        let len = name.chars().count();
        if len > self.config.max_name_length {
            return Err(DomainError::NameTooLong {
                len,
                max: self.config.max_name_length,
            });
        }
        Ok(name.to_string())
    }
}

fn validate_email(raw: &str) -> Result<String, DomainError> {
    let email = raw.trim().to_lowercase();
    let valid = email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.'));
    if valid {
        Ok(email)
    } else {
        Err(DomainError::invalid_email(raw.trim()))
    }
}

fn validate_password(raw: &str) -> Result<String, DomainError> {
    if raw.is_empty() {
        return Err(DomainError::EmptyPassword);
    }
    Ok(raw.to_string())
}

/// Strict: a name outside the enumeration is a client error here.
fn parse_roles(names: &[String]) -> Result<RoleSet, DomainError> {
    names
        .iter()
        .map(|n| Role::parse(n).ok_or_else(|| DomainError::UnknownRole { role: n.clone() }))
        .collect()
}
