use std::sync::Arc;

use auth::{grant, Authorized};
use axum::{
    extract::{Path, Query},
    response::IntoResponse,
    Extension,
};
use modkit::{api::response, ApiResult, JsonBody};

use crate::api::rest::dto::{EventDto, EventReq, ListEventsQuery};
use crate::domain::service::Service;

pub async fn list_events(
    Extension(svc): Extension<Arc<Service>>,
    Query(query): Query<ListEventsQuery>,
) -> ApiResult<impl IntoResponse> {
    let events = svc.list(query.into()).await?;
    Ok(response::ok(
        events.into_iter().map(EventDto::from).collect::<Vec<_>>(),
    ))
}

pub async fn get_event(
    Extension(svc): Extension<Arc<Service>>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    Ok(response::ok(EventDto::from(svc.get(&id).await?)))
}

pub async fn create_event(
    Extension(svc): Extension<Arc<Service>>,
    _auth: Authorized<grant::Events>,
    JsonBody(req): JsonBody<EventReq>,
) -> ApiResult<impl IntoResponse> {
    let event = svc.create(req.into()).await?;
    Ok(response::created(
        EventDto::from(event),
        "Event created successfully",
    ))
}

pub async fn update_event(
    Extension(svc): Extension<Arc<Service>>,
    _auth: Authorized<grant::Events>,
    Path(id): Path<String>,
    JsonBody(req): JsonBody<EventReq>,
) -> ApiResult<impl IntoResponse> {
    let event = svc.update(&id, req.into()).await?;
    Ok(response::ok_with_message(
        EventDto::from(event),
        "Event updated successfully",
    ))
}

pub async fn delete_event(
    Extension(svc): Extension<Arc<Service>>,
    _auth: Authorized<grant::Events>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    svc.delete(&id).await?;
    Ok(response::message("Event deleted successfully"))
}
