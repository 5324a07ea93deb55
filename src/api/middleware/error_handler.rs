//! `AppError` to HTTP response conversion.
//!
//! Server-side failures are logged with their source and rendered with a
//! generic message; everything else carries its own message.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::error;

use super::current_request_id;
use crate::api::dto::ErrorResponse;
use crate::error::AppError;

pub fn error_status(error: &AppError) -> StatusCode {
    match error {
        AppError::NotFound { .. } => StatusCode::NOT_FOUND,
        AppError::Conflict { .. }
        | AppError::Validation { .. }
        | AppError::ValidationErrors { .. }
        | AppError::BadRequest { .. }
        | AppError::InsufficientStock { .. }
        | AppError::InvalidState { .. } => StatusCode::BAD_REQUEST,
        AppError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
        AppError::Forbidden { .. } => StatusCode::FORBIDDEN,
        AppError::Database { .. } | AppError::Configuration { .. } | AppError::Internal { .. } => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
        AppError::ConnectionPool { .. } => StatusCode::SERVICE_UNAVAILABLE,
    }
}

pub fn error_code(error: &AppError) -> &'static str {
    match error {
        AppError::NotFound { .. } => "NOT_FOUND",
        AppError::Conflict { .. } => "CONFLICT",
        AppError::Validation { .. } | AppError::ValidationErrors { .. } => "VALIDATION_ERROR",
        AppError::BadRequest { .. } => "BAD_REQUEST",
        AppError::InsufficientStock { .. } => "INSUFFICIENT_STOCK",
        AppError::InvalidState { .. } => "INVALID_STATE",
        AppError::Unauthorized { .. } => "UNAUTHORIZED",
        AppError::Forbidden { .. } => "FORBIDDEN",
        AppError::Database { .. } => "DATABASE_ERROR",
        AppError::Configuration { .. } => "CONFIGURATION_ERROR",
        AppError::ConnectionPool { .. } => "SERVICE_UNAVAILABLE",
        AppError::Internal { .. } => "INTERNAL_ERROR",
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn error_body(error: &AppError) -> ErrorResponse {
    let code = error_code(error);

    match error {
        AppError::NotFound {
            entity,
            field,
            value,
        } => ErrorResponse::new(code, format!("{} not found", capitalize(entity)))
            .with_details(json!({ "field": field, "value": value })),
        AppError::Conflict { entity, field, .. } => {
            ErrorResponse::new(code, format!("{} already exists", capitalize(entity)))
                .with_details(json!({ "field": field }))
        }
        AppError::Validation { field, reason } => ErrorResponse::new(code, reason.as_str())
            .with_details(json!([{ "field": field, "message": reason }])),
        AppError::ValidationErrors { errors } => {
            ErrorResponse::new(code, "Validation failed").with_details(json!(errors))
        }
        AppError::BadRequest { message }
        | AppError::Unauthorized { message }
        | AppError::Forbidden { message } => ErrorResponse::new(code, message.as_str()),
        AppError::InsufficientStock {
            product,
            requested,
            available,
        } => ErrorResponse::new(code, error.to_string()).with_details(json!({
            "product": product,
            "requested": requested,
            "available": available,
        })),
        AppError::InvalidState { message } => ErrorResponse::new(code, message.as_str()),
        AppError::Database { .. } | AppError::Internal { .. } => {
            ErrorResponse::new(code, "An internal error occurred")
        }
        AppError::Configuration { .. } => ErrorResponse::new(code, "Server misconfigured"),
        AppError::ConnectionPool { .. } => {
            ErrorResponse::new(code, "Database connection unavailable")
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = error_status(&self);
        if status.is_server_error() {
            error!(error = ?self, code = error_code(&self), "Request failed");
        }

        let body = error_body(&self).with_request_id(current_request_id());
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationFieldError;

    async fn body_json(error: AppError) -> (StatusCode, serde_json::Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_not_found_names_entity() {
        let (status, body) = body_json(AppError::not_found("product", "id", "42")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Product not found");
        assert_eq!(body["code"], "NOT_FOUND");
        assert_eq!(body["details"]["value"], "42");
        assert!(body.get("requestId").is_none());
    }

    #[tokio::test]
    async fn test_conflict_is_bad_request_with_conflict_code() {
        let (status, body) = body_json(AppError::Conflict {
            entity: "user".to_string(),
            field: "email".to_string(),
            value: "a@b.c".to_string(),
        })
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "CONFLICT");
        assert_eq!(body["error"], "User already exists");
    }

    #[tokio::test]
    async fn test_validation_errors_list_fields() {
        let (status, body) = body_json(AppError::ValidationErrors {
            errors: vec![ValidationFieldError {
                field: "email".to_string(),
                message: "Invalid email format".to_string(),
            }],
        })
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["details"][0]["field"], "email");
    }

    #[tokio::test]
    async fn test_insufficient_stock_details() {
        let (status, body) = body_json(AppError::InsufficientStock {
            product: "Mouse".to_string(),
            requested: 6,
            available: Some(4),
        })
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INSUFFICIENT_STOCK");
        assert_eq!(body["details"]["available"], 4);
    }

    #[tokio::test]
    async fn test_internal_errors_are_sanitized() {
        let (status, body) = body_json(AppError::Database {
            operation: "insert".to_string(),
            source: anyhow::anyhow!("password=hunter2 leaked"),
        })
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "An internal error occurred");
        assert!(!body.to_string().contains("hunter2"));
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            error_status(&AppError::unauthorized("x")),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(error_status(&AppError::forbidden("x")), StatusCode::FORBIDDEN);
        assert_eq!(
            error_status(&AppError::invalid_state("x")),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            error_status(&AppError::ConnectionPool {
                source: anyhow::anyhow!("timeout")
            }),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
