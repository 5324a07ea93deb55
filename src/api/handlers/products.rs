//! Catalog endpoints.
//!
//! Browsing is public, reviews need a token and maintenance needs an admin.

use axum::{Extension, Json, extract::State, http::StatusCode, middleware};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;
use uuid::Uuid;

use crate::api::doc::PRODUCT_TAG;
use crate::api::dto::{
    CreateProductRequest, ErrorResponse, ProductDetailResponse, ProductListQuery,
    ProductListResponse, ProductResponse, ReviewRequest, StockAdjustmentRequest,
    UpdateProductRequest,
};
use crate::api::middleware::{CurrentUser, admin_middleware, auth_middleware};
use crate::error::AppResult;
use crate::state::AppState;
use crate::utils::{PathParam, ValidatedJson, ValidatedQuery};

pub fn product_routes(state: AppState) -> OpenApiRouter<AppState> {
    let public = OpenApiRouter::new()
        .routes(routes!(list_products))
        .routes(routes!(get_product));

    let reviewers = OpenApiRouter::new()
        .routes(routes!(add_review))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    // Layers run last-added first: token check, then role gate.
    let admin = OpenApiRouter::new()
        .routes(routes!(create_product))
        .routes(routes!(update_product))
        .routes(routes!(adjust_stock))
        .routes(routes!(delete_product))
        .route_layer(middleware::from_fn(admin_middleware))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    public.merge(reviewers).merge(admin)
}

/// Lists products one page at a time.
///
/// A non-blank `search` matches any term against name and description and
/// ignores `category`, `minPrice` and `maxPrice`.
#[utoipa::path(
    get,
    path = "/",
    tag = PRODUCT_TAG,
    params(ProductListQuery),
    responses(
        (status = 200, description = "One page of products", body = ProductListResponse),
        (status = 400, description = "Invalid paging or filter values", body = ErrorResponse)
    )
)]
async fn list_products(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<ProductListQuery>,
) -> AppResult<Json<ProductListResponse>> {
    let page = state.services.catalog.list(query.into()).await?;
    Ok(Json(page.into()))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = PRODUCT_TAG,
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product with reviews", body = ProductDetailResponse),
        (status = 404, description = "Product not found", body = ErrorResponse)
    )
)]
async fn get_product(
    State(state): State<AppState>,
    PathParam(product_id): PathParam<Uuid>,
) -> AppResult<Json<ProductDetailResponse>> {
    let detail = state.services.catalog.get_with_reviews(product_id).await?;
    Ok(Json(detail.into()))
}

#[utoipa::path(
    post,
    path = "/",
    tag = PRODUCT_TAG,
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Product created", body = ProductResponse),
        (status = 400, description = "Invalid product data", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Admin access required", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
async fn create_product(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateProductRequest>,
) -> AppResult<(StatusCode, Json<ProductResponse>)> {
    let product = state.services.catalog.create(payload.into()).await?;
    Ok((StatusCode::CREATED, Json(product.into())))
}

#[utoipa::path(
    put,
    path = "/{id}",
    tag = PRODUCT_TAG,
    params(("id" = Uuid, Path, description = "Product ID")),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Product updated", body = ProductResponse),
        (status = 404, description = "Product not found", body = ErrorResponse),
        (status = 403, description = "Admin access required", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
async fn update_product(
    State(state): State<AppState>,
    PathParam(product_id): PathParam<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateProductRequest>,
) -> AppResult<Json<ProductResponse>> {
    let product = state
        .services
        .catalog
        .update(product_id, payload.into())
        .await?;
    Ok(Json(product.into()))
}

#[utoipa::path(
    patch,
    path = "/{id}/stock",
    tag = PRODUCT_TAG,
    params(("id" = Uuid, Path, description = "Product ID")),
    request_body = StockAdjustmentRequest,
    responses(
        (status = 200, description = "Stock adjusted", body = ProductResponse),
        (status = 400, description = "Stock would go negative or overflow", body = ErrorResponse),
        (status = 404, description = "Product not found", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
async fn adjust_stock(
    State(state): State<AppState>,
    PathParam(product_id): PathParam<Uuid>,
    ValidatedJson(payload): ValidatedJson<StockAdjustmentRequest>,
) -> AppResult<Json<ProductResponse>> {
    let product = state
        .services
        .catalog
        .adjust_stock(product_id, payload.quantity)
        .await?;
    Ok(Json(product.into()))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = PRODUCT_TAG,
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 204, description = "Product deleted"),
        (status = 404, description = "Product not found", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
async fn delete_product(
    State(state): State<AppState>,
    PathParam(product_id): PathParam<Uuid>,
) -> AppResult<StatusCode> {
    state.services.catalog.delete(product_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/{id}/reviews",
    tag = PRODUCT_TAG,
    params(("id" = Uuid, Path, description = "Product ID")),
    request_body = ReviewRequest,
    responses(
        (status = 201, description = "Review stored; product with refreshed rating", body = ProductResponse),
        (status = 404, description = "Product not found", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
async fn add_review(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    PathParam(product_id): PathParam<Uuid>,
    ValidatedJson(payload): ValidatedJson<ReviewRequest>,
) -> AppResult<(StatusCode, Json<ProductResponse>)> {
    let product = state
        .services
        .catalog
        .add_review(product_id, &user, payload.rating, payload.comment)
        .await?;
    Ok((StatusCode::CREATED, Json(product.into())))
}
