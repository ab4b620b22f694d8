//! Request extractors other modules use to authenticate callers.

use std::marker::PhantomData;
use std::ops::Deref;
use std::sync::Arc;

use axum::{extract::FromRequestParts, http::request::Parts, http::HeaderMap};
use modkit::{ApiError, ApiResult};
use permissions::Capability;

use crate::api::rest::cookie::{bearer_token, read_cookie, CookieSettings};
use crate::contract::{client::AuthGate, model::Identity};

/// Gate plus cookie settings; attached to routers as `Extension<Arc<AuthContext>>`.
pub struct AuthContext {
    gate: Arc<dyn AuthGate>,
    cookie: CookieSettings,
}

impl AuthContext {
    pub fn new(gate: Arc<dyn AuthGate>, cookie: CookieSettings) -> Self {
        Self { gate, cookie }
    }

    pub fn gate(&self) -> &Arc<dyn AuthGate> {
        &self.gate
    }

    pub fn cookie(&self) -> &CookieSettings {
        &self.cookie
    }

    /// Session cookie first, then a bearer header.
    pub fn token_from(&self, headers: &HeaderMap) -> Option<String> {
        read_cookie(headers, &self.cookie.name).or_else(|| bearer_token(headers))
    }
}

fn context(parts: &Parts) -> ApiResult<Arc<AuthContext>> {
    parts
        .extensions
        .get::<Arc<AuthContext>>()
        .cloned()
        .ok_or_else(|| ApiError::internal(anyhow::anyhow!("AuthContext extension missing")))
}

/// A verified caller. Rejects with 401 when the token is missing or invalid.
#[derive(Debug, Clone)]
pub struct Authenticated {
    pub identity: Identity,
    pub token: String,
}

impl Authenticated {
    pub fn require(&self, capability: Capability) -> ApiResult<()> {
        if self.identity.can(capability) {
            Ok(())
        } else {
            tracing::debug!(user = %self.identity.email, %capability, "capability missing");
            Err(ApiError::forbidden(capability))
        }
    }
}

impl<S: Send + Sync> FromRequestParts<S> for Authenticated {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let ctx = context(parts)?;
        let token = ctx
            .token_from(&parts.headers)
            .ok_or_else(ApiError::unauthenticated)?;
        let identity = ctx
            .gate
            .verify(&token)
            .await
            .map_err(ApiError::from)?
            .ok_or_else(ApiError::unauthenticated)?;
        Ok(Self { identity, token })
    }
}

/// Capability demanded by an [`Authorized`] extractor.
pub trait Grant: Send + Sync + 'static {
    const CAPABILITY: Capability;
}

/// One marker per [`Capability`].
pub mod grant {
    use super::{Capability, Grant};

    #[derive(Debug)]
    pub struct Users;
    #[derive(Debug)]
    pub struct Events;
    #[derive(Debug)]
    pub struct News;
    #[derive(Debug)]
    pub struct Settings;

    impl Grant for Users {
        const CAPABILITY: Capability = Capability::Users;
    }
    impl Grant for Events {
        const CAPABILITY: Capability = Capability::Events;
    }
    impl Grant for News {
        const CAPABILITY: Capability = Capability::News;
    }
    impl Grant for Settings {
        const CAPABILITY: Capability = Capability::Settings;
    }
}

/// A verified caller holding `G::CAPABILITY`: 401 without a valid session,
/// 403 without the capability.
///
/// Runs from request parts, so it settles before any body extractor; callers
/// without the capability never see body validation errors.
#[derive(Debug)]
pub struct Authorized<G: Grant> {
    caller: Authenticated,
    _grant: PhantomData<G>,
}

impl<G: Grant> Authorized<G> {
    pub fn into_inner(self) -> Authenticated {
        self.caller
    }
}

impl<G: Grant> Deref for Authorized<G> {
    type Target = Authenticated;

    fn deref(&self) -> &Authenticated {
        &self.caller
    }
}

impl<S: Send + Sync, G: Grant> FromRequestParts<S> for Authorized<G> {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let caller = Authenticated::from_request_parts(parts, state).await?;
        caller.require(G::CAPABILITY)?;
        Ok(Self {
            caller,
            _grant: PhantomData,
        })
    }
}

/// Optional caller for public endpoints whose output depends on who asks.
/// Gate failures degrade to anonymous.
#[derive(Debug, Clone)]
pub struct MaybeAuthenticated(pub Option<Identity>);

impl MaybeAuthenticated {
    pub fn can(&self, capability: Capability) -> bool {
        self.0.as_ref().is_some_and(|id| id.can(capability))
    }
}

impl<S: Send + Sync> FromRequestParts<S> for MaybeAuthenticated {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let ctx = context(parts)?;
        let Some(token) = ctx.token_from(&parts.headers) else {
            return Ok(Self(None));
        };
        match ctx.gate.verify(&token).await {
            Ok(identity) => Ok(Self(identity)),
            Err(e) => {
                tracing::warn!(error = %e, "auth gate failed, treating caller as anonymous");
                Ok(Self(None))
            }
        }
    }
}
