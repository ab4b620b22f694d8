use axum::{
    routing::{get, post},
    Extension, Router,
};
use std::sync::Arc;

use crate::api::rest::{extract::AuthContext, handlers};

pub fn register_routes(router: Router, ctx: Arc<AuthContext>) -> Router {
    let auth = Router::new()
        .route("/api/auth/login", post(handlers::login))
        .route("/api/auth/verify", get(handlers::verify))
        .route("/api/auth/profile", get(handlers::profile))
        .route("/api/auth/logout", post(handlers::logout))
        .layer(Extension(ctx));
    router.merge(auth)
}
