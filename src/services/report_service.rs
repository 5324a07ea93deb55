//! Sales reporting over persisted order lines.

use bigdecimal::BigDecimal;

use crate::error::AppResult;
use crate::repositories::{CategorySalesRow, ReportRepository};

/// Aggregated sales for one product category.
#[derive(Debug, Clone, PartialEq)]
pub struct CategorySales {
    pub category: String,
    pub total_sales: BigDecimal,
    pub total_items: i64,
    /// Unweighted mean of the line prices, unrounded
    pub average_price: BigDecimal,
    /// Number of contributing order lines
    pub order_count: i64,
}

impl From<CategorySalesRow> for CategorySales {
    fn from(row: CategorySalesRow) -> Self {
        Self {
            category: row.category,
            total_sales: row.total_sales.unwrap_or_default(),
            total_items: row.total_items.unwrap_or_default(),
            average_price: row.average_price.unwrap_or_default(),
            order_count: row.order_count,
        }
    }
}

#[derive(Clone)]
pub struct ReportService {
    repo: ReportRepository,
}

impl ReportService {
    pub fn new(repo: ReportRepository) -> Self {
        Self { repo }
    }

    /// Sales per category, highest total first.
    pub async fn sales_by_category(&self) -> AppResult<Vec<CategorySales>> {
        let rows = self.repo.sales_by_category().await?;
        Ok(rows.into_iter().map(CategorySales::from).collect())
    }
}
