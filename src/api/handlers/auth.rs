//! Registration and login.

use axum::{Json, extract::State, http::StatusCode};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::api::doc::AUTH_TAG;
use crate::api::dto::{AuthResponse, ErrorResponse, LoginRequest, RegisterRequest};
use crate::error::AppResult;
use crate::models::User;
use crate::state::AppState;
use crate::utils::ValidatedJson;
use crate::utils::jwt::generate_token;

/// # Routes
/// - `POST /register` - Create an account and get a token
/// - `POST /login` - Exchange credentials for a token
pub fn auth_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(register))
        .routes(routes!(login))
}

fn issue(state: &AppState, user: User) -> AppResult<AuthResponse> {
    let token = generate_token(
        &user,
        &state.jwt_config.secret,
        state.jwt_config.token_expiration,
    )?;
    Ok(AuthResponse {
        user: user.into(),
        token,
    })
}

#[utoipa::path(
    post,
    path = "/register",
    tag = AUTH_TAG,
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 400, description = "Invalid data or email/username taken", body = ErrorResponse)
    )
)]
async fn register(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RegisterRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    let user = state
        .services
        .users
        .register(&payload.username, &payload.email, &payload.password)
        .await?;

    Ok((StatusCode::CREATED, Json(issue(&state, user)?)))
}

#[utoipa::path(
    post,
    path = "/login",
    tag = AUTH_TAG,
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse)
    )
)]
async fn login(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let user = state
        .services
        .users
        .authenticate(&payload.email, &payload.password)
        .await?;

    Ok(Json(issue(&state, user)?))
}
