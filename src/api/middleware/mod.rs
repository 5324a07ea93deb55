//! Middleware components for request processing.

mod auth;
mod cors;
mod error_handler;
mod logging;
mod request_id;

pub use auth::{CurrentUser, admin_middleware, auth_middleware};
pub use cors::cors_layer;
pub use error_handler::{error_code, error_status};
pub use logging::logging_middleware;
pub use request_id::{REQUEST_ID_HEADER, RequestId, current_request_id, request_id_middleware};
