//! Data Transfer Objects for API requests and responses.
//!
//! Field names are camelCase on the wire.

mod auth;
mod error;
mod health;
mod order;
mod product;
mod report;
mod user;

pub use auth::{AuthResponse, LoginRequest, RegisterRequest};
pub use error::ErrorResponse;
pub use health::{ComponentHealth, HealthResponse, HealthStatus};
pub use order::{
    CancelOrderResponse, CreateOrderRequest, OrderItemResponse, OrderLineInput, OrderResponse,
    ShippingAddressDto, UpdateOrderStatusRequest,
};
pub use product::{
    CreateProductRequest, ProductDetailResponse, ProductListQuery, ProductListResponse,
    ProductResponse, ReviewRequest, ReviewResponse, StockAdjustmentRequest, UpdateProductRequest,
};
pub use report::CategorySalesResponse;
pub use user::{AddressRequest, AddressResponse, ProfileResponse, UserResponse, address_list};
