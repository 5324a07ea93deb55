use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

pub const AUTH_TAG: &str = "Auth";
pub const USER_TAG: &str = "Users";
pub const PRODUCT_TAG: &str = "Products";
pub const ORDER_TAG: &str = "Orders";
pub const REPORT_TAG: &str = "Reports";
pub const HEALTH_TAG: &str = "Health";

#[derive(OpenApi)]
#[openapi(
    info(
        title = "commerce-rs",
        description = "Catalog, ordering and reporting API",
    ),
    modifiers(&SecurityAddon),
    components(
        schemas(
            crate::api::dto::ErrorResponse,
            crate::models::Role,
            crate::models::OrderStatus,
        )
    ),
    tags(
        (name = AUTH_TAG, description = "Registration and login"),
        (name = USER_TAG, description = "Profile and address book of the current user"),
        (name = PRODUCT_TAG, description = "Catalog browsing, maintenance and reviews"),
        (name = ORDER_TAG, description = "Order placement and lifecycle"),
        (name = REPORT_TAG, description = "Sales reports (admin)"),
        (name = HEALTH_TAG, description = "Health check endpoints"),
    )
)]
pub struct ApiDoc;

pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearerAuth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Token returned by /api/auth/login"))
                        .build(),
                ),
            )
        }
    }
}
