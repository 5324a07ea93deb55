//! Router configuration for the API.

use axum::{Router, middleware};
use tower_http::compression::CompressionLayer;
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::doc::ApiDoc;
use crate::api::handlers;
use crate::api::middleware::{
    auth_middleware, cors_layer, logging_middleware, request_id_middleware,
};
use crate::config::CorsConfig;
use crate::state::AppState;

pub const OPENAPI_JSON_PATH: &str = "/api-docs/openapi.json";
pub const SWAGGER_UI_PATH: &str = "/swagger-ui";

/// Collects every route with its OpenAPI fragment.
fn api_router(state: &AppState) -> OpenApiRouter<AppState> {
    let users = handlers::users::user_routes().route_layer(middleware::from_fn_with_state(
        state.clone(),
        auth_middleware,
    ));

    OpenApiRouter::with_openapi(ApiDoc::openapi())
        .nest("/api/auth", handlers::auth::auth_routes())
        .nest("/api/users", users)
        .nest("/api/products", handlers::products::product_routes(state.clone()))
        .nest("/api/orders", handlers::orders::order_routes(state.clone()))
        .nest("/api/reports", handlers::reports::report_routes(state.clone()))
        .merge(handlers::health::health_routes())
}

/// The generated OpenAPI document.
pub fn openapi(state: &AppState) -> utoipa::openapi::OpenApi {
    api_router(state).into_openapi()
}

/// Creates the application router with all routes and middleware.
///
/// Layers run last-added first: request id, logging, CORS, then
/// compression.
pub fn create_router(state: AppState, cors: &CorsConfig) -> Router {
    let (router, api) = api_router(&state).split_for_parts();

    router
        .merge(SwaggerUi::new(SWAGGER_UI_PATH).url(OPENAPI_JSON_PATH, api))
        .layer(CompressionLayer::new())
        .layer(cors_layer(cors))
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn(request_id_middleware))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::middleware::REQUEST_ID_HEADER;
    use crate::config::{CatalogConfig, JwtConfig};
    use crate::db::{lazy_connection_pool, testing};
    use crate::models::Role;
    use crate::utils::jwt::generate_token;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use serde_json::Value;
    use tower::ServiceExt;
    use uuid::Uuid;

    const SECRET: &str = "router-test-secret-that-is-long-enough";

    fn state_over(pool: crate::db::AsyncDbPool) -> AppState {
        AppState::new(
            pool,
            JwtConfig {
                secret: SECRET.to_string(),
                token_expiration: 1,
            },
            CatalogConfig::default(),
        )
    }

    fn state() -> AppState {
        state_over(lazy_connection_pool("postgres://localhost:1/unused"))
    }

    fn app() -> Router {
        create_router(state(), &CorsConfig::default())
    }

    async fn send(request: Request<Body>) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
        let response = app().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, headers, body.to_vec())
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_protected_routes_need_a_token() {
        for (method, uri) in [
            ("GET", "/api/users/profile"),
            ("GET", "/api/orders"),
            ("POST", "/api/products"),
            ("GET", "/api/reports/sales-by-category"),
        ] {
            let request = Request::builder()
                .method(method)
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{}"))
                .unwrap();
            let (status, _, body) = send(request).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "{method} {uri}");

            let json: Value = serde_json::from_slice(&body).unwrap();
            assert_eq!(json["error"], "Please authenticate");
        }
    }

    #[tokio::test]
    async fn test_error_body_carries_request_id() {
        let request = Request::builder()
            .uri("/api/users/profile")
            .header(REQUEST_ID_HEADER, "trace-me")
            .body(Body::empty())
            .unwrap();
        let (_, headers, body) = send(request).await;

        assert_eq!(headers.get(REQUEST_ID_HEADER).unwrap(), "trace-me");
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["requestId"], "trace-me");
    }

    #[tokio::test]
    async fn test_malformed_id_is_a_bad_request() {
        let (status, _, body) = send(get("/api/products/not-a-uuid")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let json: Value = serde_json::from_slice(&body).unwrap();
        assert!(json["error"].is_string());
    }

    #[tokio::test]
    async fn test_out_of_range_page_is_rejected_before_the_database() {
        let (status, _, body) = send(get("/api/products?page=0")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_huge_page_is_rejected_before_the_database() {
        let (status, _, body) = send(get("/api/products?page=9223372036854775807&limit=10")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let (status, _, _) = send(get("/api/nothing-here")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_liveness_needs_no_database() {
        let (status, _, _) = send(get("/health/live")).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_openapi_document_is_served() {
        let (status, _, body) = send(get(OPENAPI_JSON_PATH)).await;
        assert_eq!(status, StatusCode::OK);

        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["info"]["title"], "commerce-rs");
        assert!(json["components"]["securitySchemes"]["bearerAuth"].is_object());
    }

    #[tokio::test]
    async fn test_openapi_lists_every_resource() {
        let doc = openapi(&state());
        let paths: Vec<&String> = doc.paths.paths.keys().collect();

        for expected in [
            "/api/auth/register",
            "/api/auth/login",
            "/api/users/profile",
            "/api/products/{id}/reviews",
            "/api/orders/{id}/status",
            "/api/reports/sales-by-category",
            "/health",
        ] {
            assert!(
                paths.iter().any(|p| p.as_str() == expected),
                "missing {expected} in {paths:?}"
            );
        }
    }

    fn authorized(method: &str, uri: &str, token: &str, body: &'static str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    #[ignore = "requires PostgreSQL at DATABASE_URL"]
    async fn test_admin_routes_forbid_regular_users() {
        let pool = testing::migrated_pool().await;
        let user = testing::create_user(&pool, Role::User).await;
        let product = testing::create_product(&pool, "Books", "12.00", 3).await;
        let app = create_router(state_over(pool.clone()), &CorsConfig::default());
        let token = generate_token(&user, SECRET, 1).unwrap();

        for (method, uri, body) in [
            ("PATCH", format!("/api/products/{}/stock", product.id), r#"{"quantity":5}"#),
            ("DELETE", format!("/api/products/{}", product.id), ""),
            ("PATCH", format!("/api/orders/{}/status", Uuid::new_v4()), r#"{"status":"shipped"}"#),
        ] {
            let response = app
                .clone()
                .oneshot(authorized(method, &uri, &token, body))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::FORBIDDEN, "{method} {uri}");
        }

        assert_eq!(testing::stock_of(&pool, product.id).await, 3);
    }

    #[tokio::test]
    #[ignore = "requires PostgreSQL at DATABASE_URL"]
    async fn test_admin_adjusts_stock_with_quantity_body() {
        let pool = testing::migrated_pool().await;
        let admin = testing::create_user(&pool, Role::Admin).await;
        let product = testing::create_product(&pool, "Books", "12.00", 3).await;
        let app = create_router(state_over(pool.clone()), &CorsConfig::default());
        let token = generate_token(&admin, SECRET, 1).unwrap();

        let uri = format!("/api/products/{}/stock", product.id);
        let response = app
            .oneshot(authorized("PATCH", &uri, &token, r#"{"quantity":5}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(testing::stock_of(&pool, product.id).await, 8);
    }
}
