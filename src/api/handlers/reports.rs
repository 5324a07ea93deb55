//! Admin reports.

use axum::{Json, extract::State, middleware};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::api::doc::REPORT_TAG;
use crate::api::dto::{CategorySalesResponse, ErrorResponse};
use crate::api::middleware::{admin_middleware, auth_middleware};
use crate::error::AppResult;
use crate::state::AppState;

pub fn report_routes(state: AppState) -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(sales_by_category))
        .route_layer(middleware::from_fn(admin_middleware))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Revenue, units and line count per category, highest revenue first.
///
/// Lines whose product has since been deleted are left out.
#[utoipa::path(
    get,
    path = "/sales-by-category",
    tag = REPORT_TAG,
    responses(
        (status = 200, description = "Sales per category", body = [CategorySalesResponse]),
        (status = 403, description = "Admin access required", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
async fn sales_by_category(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<CategorySalesResponse>>> {
    let report = state.services.reports.sales_by_category().await?;
    Ok(Json(report.into_iter().map(CategorySalesResponse::from).collect()))
}
