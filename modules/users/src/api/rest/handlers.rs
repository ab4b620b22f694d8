use std::sync::Arc;

use auth::{grant, Authenticated, Authorized};
use axum::{extract::Path, response::IntoResponse, Extension};
use modkit::{api::response, ApiError, ApiResult, JsonBody};
use uuid::Uuid;

use crate::api::rest::dto::{CreateUserReq, ProbeDto, UpdateUserReq, UserDto};
use crate::domain::service::{Actor, Service};

fn actor(auth: &Authenticated) -> Actor {
    Actor {
        id: auth.identity.id.clone(),
        email: auth.identity.email.clone(),
    }
}

fn user_id(raw: &str) -> ApiResult<Uuid> {
    raw.parse().map_err(|_| ApiError::not_found("User not found"))
}

pub async fn list_users(
    Extension(svc): Extension<Arc<Service>>,
    _auth: Authorized<grant::Users>,
) -> ApiResult<impl IntoResponse> {
    let users = svc.list().await?;
    Ok(response::ok(
        users.into_iter().map(UserDto::from).collect::<Vec<_>>(),
    ))
}

pub async fn get_user(
    Extension(svc): Extension<Arc<Service>>,
    _auth: Authorized<grant::Users>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    Ok(response::ok(UserDto::from(svc.get(user_id(&id)?).await?)))
}

pub async fn create_user(
    Extension(svc): Extension<Arc<Service>>,
    _auth: Authorized<grant::Users>,
    JsonBody(req): JsonBody<CreateUserReq>,
) -> ApiResult<impl IntoResponse> {
    let user = svc.create(req.into()).await?;
    Ok(response::created(UserDto::from(user), "User created successfully"))
}

pub async fn update_user(
    Extension(svc): Extension<Arc<Service>>,
    auth: Authorized<grant::Users>,
    Path(id): Path<String>,
    JsonBody(req): JsonBody<UpdateUserReq>,
) -> ApiResult<impl IntoResponse> {
    let user = svc.update(&actor(&auth), user_id(&id)?, req.into()).await?;
    Ok(response::ok_with_message(
        UserDto::from(user),
        "User updated successfully",
    ))
}

pub async fn delete_user(
    Extension(svc): Extension<Arc<Service>>,
    auth: Authorized<grant::Users>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    svc.delete(&actor(&auth), user_id(&id)?).await?;
    Ok(response::message("User deleted successfully"))
}

pub async fn toggle_status(
    Extension(svc): Extension<Arc<Service>>,
    auth: Authorized<grant::Users>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let user = svc.toggle_status(&actor(&auth), user_id(&id)?).await?;
    let msg = if user.is_active {
        "User activated successfully"
    } else {
        "User deactivated successfully"
    };
    Ok(response::ok_with_message(UserDto::from(user), msg))
}

pub async fn test_db(
    Extension(svc): Extension<Arc<Service>>,
    _auth: Authorized<grant::Settings>,
) -> ApiResult<impl IntoResponse> {
    let report = svc.probe().await?;
    Ok(response::ok_with_message(
        ProbeDto::from(report),
        "Storage connection successful",
    ))
}
