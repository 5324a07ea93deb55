//! Read-only queries backing the sales reports.

use bigdecimal::BigDecimal;
use diesel::dsl::{avg, count_star, sql, sum};
use diesel::prelude::*;
use diesel::sql_types::{Nullable, Numeric};
use diesel_async::RunQueryDsl;

use crate::db::AsyncDbPool;
use crate::error::AppError;
use crate::schema::{order_items, products};

const LINE_TOTAL_SUM: &str = "SUM(order_items.price * order_items.quantity)";

/// Aggregates for one category as PostgreSQL returns them.
///
/// `SUM` and `AVG` are nullable in SQL even though a group always has rows.
#[derive(Debug, Clone, PartialEq, Queryable)]
pub struct CategorySalesRow {
    pub category: String,
    pub total_sales: Option<BigDecimal>,
    pub total_items: Option<i64>,
    pub average_price: Option<BigDecimal>,
    pub order_count: i64,
}

#[derive(Clone)]
pub struct ReportRepository {
    pool: AsyncDbPool,
}

impl ReportRepository {
    pub fn new(pool: AsyncDbPool) -> Self {
        Self { pool }
    }

    /// Groups every order line by its product's current category.
    ///
    /// Lines whose product has been deleted drop out of the inner join. Rows
    /// come back by total sales descending, then category name.
    pub async fn sales_by_category(&self) -> Result<Vec<CategorySalesRow>, AppError> {
        let mut conn = self.pool.get().await?;

        order_items::table
            .inner_join(products::table)
            .group_by(products::category)
            .select((
                products::category,
                sql::<Nullable<Numeric>>(LINE_TOTAL_SUM),
                sum(order_items::quantity),
                avg(order_items::price),
                count_star(),
            ))
            .order((
                sql::<Nullable<Numeric>>(LINE_TOTAL_SUM).desc(),
                products::category.asc(),
            ))
            .load::<CategorySalesRow>(&mut conn)
            .await
            .map_err(AppError::from)
    }
}
