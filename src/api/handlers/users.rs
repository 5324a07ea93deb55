//! Profile and address book of the authenticated user.

use axum::{Extension, Json, extract::State, http::StatusCode};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;
use uuid::Uuid;

use crate::api::doc::USER_TAG;
use crate::api::dto::{AddressRequest, AddressResponse, ErrorResponse, ProfileResponse, address_list};
use crate::api::middleware::CurrentUser;
use crate::error::AppResult;
use crate::state::AppState;
use crate::utils::{PathParam, ValidatedJson};

/// All routes expect [`CurrentUser`] from the auth middleware.
pub fn user_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(get_profile))
        .routes(routes!(add_address))
        .routes(routes!(remove_address))
}

#[utoipa::path(
    get,
    path = "/profile",
    tag = USER_TAG,
    responses(
        (status = 200, description = "Current user with addresses", body = ProfileResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
async fn get_profile(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> AppResult<Json<ProfileResponse>> {
    let profile = state.services.users.profile(user.id).await?;
    Ok(Json(profile.into()))
}

/// A default address replaces the previous default.
#[utoipa::path(
    post,
    path = "/addresses",
    tag = USER_TAG,
    request_body = AddressRequest,
    responses(
        (status = 201, description = "Updated address list", body = [AddressResponse]),
        (status = 400, description = "Invalid address", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
async fn add_address(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<AddressRequest>,
) -> AppResult<(StatusCode, Json<Vec<AddressResponse>>)> {
    let addresses = state
        .services
        .users
        .add_address(user.id, payload.into())
        .await?;
    Ok((StatusCode::CREATED, Json(address_list(addresses))))
}

#[utoipa::path(
    delete,
    path = "/addresses/{id}",
    tag = USER_TAG,
    params(("id" = Uuid, Path, description = "Address ID")),
    responses(
        (status = 200, description = "Remaining addresses", body = [AddressResponse]),
        (status = 404, description = "No such address for this user", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
async fn remove_address(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    PathParam(address_id): PathParam<Uuid>,
) -> AppResult<Json<Vec<AddressResponse>>> {
    let remaining = state
        .services
        .users
        .remove_address(user.id, address_id)
        .await?;
    Ok(Json(address_list(remaining)))
}
