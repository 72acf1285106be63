use axum::{
    extract::{rejection::PathRejection, Path, State},
    http::StatusCode,
    Extension,
};
use tracing::info;

use service::Actor;

use crate::{errors::JsonApiError, routes::auth::{path_id, ServerState}};

#[utoipa::path(
    delete, path = "/admin/accounts/{id}", tag = "admin",
    params(("id" = i32, Path, description = "Account ID")),
    responses(
        (status = 204, description = "Removed"),
        (status = 403, description = "Admins only"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_account(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
    id: Result<Path<i32>, PathRejection>,
) -> Result<StatusCode, JsonApiError> {
    let id = path_id(id)?;
    let removal = state.accounts.remove(&actor, id).await?;
    info!(account_id = removal.account_id, reverted_requests = removal.reverted_requests, "delete account");
    Ok(StatusCode::NO_CONTENT)
}
