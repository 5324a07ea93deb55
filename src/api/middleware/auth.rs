//! Bearer token authentication and the admin role gate.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use tracing::debug;

use crate::error::AppError;
use crate::models::User;
use crate::state::AppState;
use crate::utils::jwt::validate_token;

const AUTHENTICATE_MESSAGE: &str = "Please authenticate";

/// The authenticated account, attached to request extensions by
/// [`auth_middleware`] and extracted in handlers with `Extension<CurrentUser>`.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Resolves `Authorization: Bearer <token>` to a stored user.
///
/// Missing or malformed headers, bad signatures, expired tokens and tokens
/// naming a deleted user all fail with the same 401.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::unauthorized(AUTHENTICATE_MESSAGE))?;

    let claims = validate_token(token, &state.jwt_config.secret).map_err(|e| {
        debug!(error = %e, "Rejected bearer token");
        AppError::unauthorized(AUTHENTICATE_MESSAGE)
    })?;
    let user_id = claims
        .user_id()
        .map_err(|_| AppError::unauthorized(AUTHENTICATE_MESSAGE))?;

    let user = match state.services.users.get_user(user_id).await {
        Ok(user) => user,
        Err(AppError::NotFound { .. }) => {
            debug!(user_id = %user_id, "Token names a missing user");
            return Err(AppError::unauthorized(AUTHENTICATE_MESSAGE));
        }
        Err(e) => return Err(e),
    };

    request.extensions_mut().insert(CurrentUser(user));
    Ok(next.run(request).await)
}

/// Lets the request through only for admins. Must run after [`auth_middleware`].
pub async fn admin_middleware(request: Request, next: Next) -> Result<Response, AppError> {
    let current = request
        .extensions()
        .get::<CurrentUser>()
        .ok_or_else(|| AppError::unauthorized(AUTHENTICATE_MESSAGE))?;

    if !current.0.role.is_admin() {
        return Err(AppError::forbidden("Admin access required"));
    }

    Ok(next.run(request).await)
}
