use axum::{
    routing::{get, patch},
    Extension, Router,
};
use std::sync::Arc;

use auth::AuthContext;

use crate::api::rest::handlers;
use crate::domain::service::Service;

pub fn register_routes(router: Router, service: Arc<Service>, auth: Arc<AuthContext>) -> Router {
    let users = Router::new()
        .route(
            "/api/users",
            get(handlers::list_users).post(handlers::create_user),
        )
        .route(
            "/api/users/{id}",
            get(handlers::get_user)
                .put(handlers::update_user)
                .delete(handlers::delete_user),
        )
        .route("/api/users/{id}/toggle-status", patch(handlers::toggle_status))
        .route("/api/test-db", get(handlers::test_db))
        .layer(Extension(service))
        .layer(Extension(auth));
    router.merge(users)
}
