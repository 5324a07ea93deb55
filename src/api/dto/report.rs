//! Report DTOs

use bigdecimal::BigDecimal;
use serde::Serialize;
use utoipa::ToSchema;

use crate::services::CategorySales;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategorySalesResponse {
    #[schema(example = "Electronics")]
    pub category: String,
    #[schema(value_type = String, example = "1299.95")]
    pub total_sales: BigDecimal,
    pub total_items: i64,
    /// Unweighted mean of line prices, unrounded
    #[schema(value_type = String, example = "259.9900000000000000")]
    pub average_price: BigDecimal,
    /// Number of order lines in the category
    pub order_count: i64,
}

impl From<CategorySales> for CategorySalesResponse {
    fn from(s: CategorySales) -> Self {
        Self {
            category: s.category,
            total_sales: s.total_sales,
            total_items: s.total_items,
            average_price: s.average_price,
            order_count: s.order_count,
        }
    }
}
