use axum::{routing::get, Extension, Router};
use std::sync::Arc;

use auth::AuthContext;

use crate::api::rest::handlers;
use crate::domain::service::Service;

pub fn register_routes(router: Router, service: Arc<Service>, auth: Arc<AuthContext>) -> Router {
    let events = Router::new()
        .route(
            "/api/events",
            get(handlers::list_events).post(handlers::create_event),
        )
        .route(
            "/api/events/{id}",
            get(handlers::get_event)
                .put(handlers::update_event)
                .delete(handlers::delete_event),
        )
        .layer(Extension(service))
        .layer(Extension(auth));
    router.merge(events)
}
