use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use service::pagination::Pagination;
use service::visits::domain::{ActionStatus, VisitRequestView};
use service::Actor;

use crate::{errors::JsonApiError, routes::auth::{json_body, path_id, ServerState}};

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct ListQuery {
    /// 1-based; listing is unpaginated when absent
    pub page: Option<u32>,
    /// clamped to 1..=100, default 20
    pub per_page: Option<u32>,
}

#[utoipa::path(
    get, path = "/solicitudes", tag = "visits",
    params(ListQuery),
    responses(
        (status = 200, description = "Visible requests, newest first", body = [crate::openapi::VisitRequestDoc]),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn list(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
    Query(q): Query<ListQuery>,
) -> Result<Json<Vec<VisitRequestView>>, JsonApiError> {
    let page = Pagination::from_query(q.page, q.per_page);
    let items = state.visits.list(&actor, page).await?;
    info!(count = items.len(), rol = actor.role_name(), "list visit requests");
    Ok(Json(items))
}

#[utoipa::path(
    post, path = "/solicitudes", tag = "visits",
    request_body = crate::openapi::VisitRequestInputDoc,
    responses(
        (status = 201, description = "Created", body = crate::openapi::VisitRequestDoc),
        (status = 400, description = "Validation Error"),
        (status = 403, description = "Only clients create requests")
    )
)]
pub async fn create(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<VisitRequestView>), JsonApiError> {
    let body = json_body(payload)?;
    let view = state.visits.create(&actor, &body).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

#[utoipa::path(
    get, path = "/solicitudes/{id}", tag = "visits",
    params(("id" = i32, Path, description = "Visit request ID")),
    responses(
        (status = 200, description = "OK", body = crate::openapi::VisitRequestDoc),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
    id: Result<Path<i32>, PathRejection>,
) -> Result<Json<VisitRequestView>, JsonApiError> {
    let id = path_id(id)?;
    Ok(Json(state.visits.get(&actor, id).await?))
}

#[utoipa::path(
    put, path = "/solicitudes/{id}", tag = "visits",
    params(("id" = i32, Path, description = "Visit request ID")),
    request_body = crate::openapi::VisitRequestInputDoc,
    responses(
        (status = 200, description = "Updated", body = crate::openapi::VisitRequestDoc),
        (status = 400, description = "Validation Error"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
    id: Result<Path<i32>, PathRejection>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<VisitRequestView>, JsonApiError> {
    let id = path_id(id)?;
    let body = json_body(payload)?;
    Ok(Json(state.visits.update(&actor, id, &body, false).await?))
}

#[utoipa::path(
    patch, path = "/solicitudes/{id}", tag = "visits",
    params(("id" = i32, Path, description = "Visit request ID")),
    request_body = crate::openapi::VisitRequestInputDoc,
    responses(
        (status = 200, description = "Updated", body = crate::openapi::VisitRequestDoc),
        (status = 400, description = "Validation Error"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn partial_update(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
    id: Result<Path<i32>, PathRejection>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<VisitRequestView>, JsonApiError> {
    let id = path_id(id)?;
    let body = json_body(payload)?;
    Ok(Json(state.visits.update(&actor, id, &body, true).await?))
}

#[utoipa::path(
    post, path = "/solicitudes/{id}/aceptar-servicio", tag = "visits",
    params(("id" = i32, Path, description = "Visit request ID")),
    responses(
        (status = 200, description = "Assigned to the calling gardener", body = crate::openapi::VisitRequestDoc),
        (status = 400, description = "No longer available"),
        (status = 403, description = "Gardeners only"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn accept(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
    id: Result<Path<i32>, PathRejection>,
) -> Result<Json<VisitRequestView>, JsonApiError> {
    let id = path_id(id)?;
    Ok(Json(state.visits.accept(&actor, id).await?))
}

#[utoipa::path(
    post, path = "/solicitudes/{id}/confirmar-visita", tag = "visits",
    params(("id" = i32, Path, description = "Visit request ID")),
    responses(
        (status = 200, description = "Confirmed", body = crate::openapi::ActionStatusDoc),
        (status = 400, description = "Not in ASIGNADA"),
        (status = 403, description = "Clients only"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn confirm(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
    id: Result<Path<i32>, PathRejection>,
) -> Result<Json<ActionStatus>, JsonApiError> {
    let id = path_id(id)?;
    Ok(Json(state.visits.confirm(&actor, id).await?))
}

#[utoipa::path(
    patch, path = "/solicitudes/{id}/asignar-jardinero-admin", tag = "visits",
    params(("id" = i32, Path, description = "Visit request ID")),
    request_body = crate::openapi::AssignGardenerDoc,
    responses(
        (status = 200, description = "Assigned", body = crate::openapi::ActionStatusDoc),
        (status = 400, description = "Validation Error"),
        (status = 403, description = "Admins only"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn assign_by_admin(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
    id: Result<Path<i32>, PathRejection>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ActionStatus>, JsonApiError> {
    let id = path_id(id)?;
    let body = json_body(payload)?;
    Ok(Json(state.visits.assign_by_admin(&actor, id, &body).await?))
}
