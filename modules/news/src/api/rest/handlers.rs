use std::sync::Arc;

use auth::{grant, Authorized, MaybeAuthenticated};
use axum::{
    extract::{Path, Query},
    response::IntoResponse,
    Extension,
};
use modkit::{api::response, ApiError, ApiResult, JsonBody};
use permissions::Capability;
use uuid::Uuid;

use crate::api::rest::dto::{ArticleDto, ArticleReq, ListNewsQuery};
use crate::domain::service::{Audience, Service};

fn audience(caller: &MaybeAuthenticated) -> Audience {
    if caller.can(Capability::News) {
        Audience::Editor
    } else {
        Audience::Public
    }
}

/// Non-UUID ids cannot name an article.
fn article_id(raw: &str) -> ApiResult<Uuid> {
    raw.parse()
        .map_err(|_| ApiError::not_found("Article not found"))
}

pub async fn list_news(
    Extension(svc): Extension<Arc<Service>>,
    caller: MaybeAuthenticated,
    Query(query): Query<ListNewsQuery>,
) -> ApiResult<impl IntoResponse> {
    let articles = svc.list(audience(&caller), query.into()).await?;
    Ok(response::ok(
        articles.into_iter().map(ArticleDto::from).collect::<Vec<_>>(),
    ))
}

pub async fn get_article(
    Extension(svc): Extension<Arc<Service>>,
    caller: MaybeAuthenticated,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let article = svc.get(audience(&caller), article_id(&id)?).await?;
    Ok(response::ok(ArticleDto::from(article)))
}

pub async fn create_article(
    Extension(svc): Extension<Arc<Service>>,
    auth: Authorized<grant::News>,
    JsonBody(req): JsonBody<ArticleReq>,
) -> ApiResult<impl IntoResponse> {
    let article = svc.create(req.into_new(&auth.identity.name)).await?;
    Ok(response::created(
        ArticleDto::from(article),
        "Article created successfully",
    ))
}

pub async fn update_article(
    Extension(svc): Extension<Arc<Service>>,
    _auth: Authorized<grant::News>,
    Path(id): Path<String>,
    JsonBody(req): JsonBody<ArticleReq>,
) -> ApiResult<impl IntoResponse> {
    let article = svc.update(article_id(&id)?, req.into()).await?;
    Ok(response::ok_with_message(
        ArticleDto::from(article),
        "Article updated successfully",
    ))
}

pub async fn delete_article(
    Extension(svc): Extension<Arc<Service>>,
    _auth: Authorized<grant::News>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    svc.delete(article_id(&id)?).await?;
    Ok(response::message("Article deleted successfully"))
}
