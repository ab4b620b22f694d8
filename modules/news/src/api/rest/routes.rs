use axum::{routing::get, Extension, Router};
use std::sync::Arc;

use auth::AuthContext;

use crate::api::rest::handlers;
use crate::domain::service::Service;

pub fn register_routes(router: Router, service: Arc<Service>, auth: Arc<AuthContext>) -> Router {
    let news = Router::new()
        .route(
            "/api/news",
            get(handlers::list_news).post(handlers::create_article),
        )
        .route(
            "/api/news/{id}",
            get(handlers::get_article)
                .put(handlers::update_article)
                .delete(handlers::delete_article),
        )
        .layer(Extension(service))
        .layer(Extension(auth));
    router.merge(news)
}
