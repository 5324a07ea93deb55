//! Order placement, listing, cancellation and status changes.

use axum::{Extension, Json, extract::State, http::StatusCode, middleware};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;
use uuid::Uuid;

use crate::api::doc::ORDER_TAG;
use crate::api::dto::{
    CancelOrderResponse, CreateOrderRequest, ErrorResponse, OrderResponse,
    UpdateOrderStatusRequest,
};
use crate::api::middleware::{CurrentUser, admin_middleware, auth_middleware};
use crate::error::AppResult;
use crate::state::AppState;
use crate::utils::{PathParam, ValidatedJson};

pub fn order_routes(state: AppState) -> OpenApiRouter<AppState> {
    let customer = OpenApiRouter::new()
        .routes(routes!(place_order, list_my_orders))
        .routes(routes!(cancel_order))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    let admin = OpenApiRouter::new()
        .routes(routes!(update_order_status))
        .route_layer(middleware::from_fn(admin_middleware))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    customer.merge(admin)
}

/// Places an order; stock for every line is decremented in one transaction.
#[utoipa::path(
    post,
    path = "/",
    tag = ORDER_TAG,
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order placed", body = OrderResponse),
        (status = 400, description = "Invalid lines or insufficient stock", body = ErrorResponse),
        (status = 404, description = "Unknown product", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
async fn place_order(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<CreateOrderRequest>,
) -> AppResult<(StatusCode, Json<OrderResponse>)> {
    let (lines, shipping) = payload.into_parts();
    let placed = state.services.orders.place(user.id, lines, shipping).await?;
    Ok((StatusCode::CREATED, Json(placed.into())))
}

#[utoipa::path(
    get,
    path = "/",
    tag = ORDER_TAG,
    responses(
        (status = 200, description = "The caller's orders, newest first", body = [OrderResponse])
    ),
    security(("bearerAuth" = []))
)]
async fn list_my_orders(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> AppResult<Json<Vec<OrderResponse>>> {
    let orders = state.services.orders.list_mine(user.id).await?;
    Ok(Json(orders.into_iter().map(OrderResponse::from).collect()))
}

/// Cancels one of the caller's pending orders and restores its stock.
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = ORDER_TAG,
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order cancelled", body = CancelOrderResponse),
        (status = 400, description = "Order is no longer pending", body = ErrorResponse),
        (status = 404, description = "No such order for this user", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
async fn cancel_order(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    PathParam(order_id): PathParam<Uuid>,
) -> AppResult<Json<CancelOrderResponse>> {
    let cancelled = state.services.orders.cancel(order_id, user.id).await?;
    Ok(Json(CancelOrderResponse {
        message: "Order cancelled".to_string(),
        order: cancelled.into(),
    }))
}

#[utoipa::path(
    patch,
    path = "/{id}/status",
    tag = ORDER_TAG,
    params(("id" = Uuid, Path, description = "Order ID")),
    request_body = UpdateOrderStatusRequest,
    responses(
        (status = 200, description = "Status changed", body = OrderResponse),
        (status = 400, description = "Transition not allowed", body = ErrorResponse),
        (status = 403, description = "Admin access required", body = ErrorResponse),
        (status = 404, description = "Order not found", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
async fn update_order_status(
    State(state): State<AppState>,
    PathParam(order_id): PathParam<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateOrderStatusRequest>,
) -> AppResult<Json<OrderResponse>> {
    let order = state
        .services
        .orders
        .set_status(order_id, payload.status)
        .await?;
    Ok(Json(order.into()))
}
