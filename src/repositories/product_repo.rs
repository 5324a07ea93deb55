//! Product repository: catalog queries, stock mutation and reviews.

use bigdecimal::BigDecimal;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use uuid::Uuid;

use crate::db::AsyncDbPool;
use crate::error::AppError;
use crate::models::{NewProduct, NewReview, Product, Review, UpdateProduct, average_rating};
use crate::schema::{product_reviews, products};

/// Filter applied to catalog listings.
///
/// Text search and the structured filter are mutually exclusive.
#[derive(Debug, Clone, PartialEq)]
pub enum ProductFilter {
    /// Any term may match the name or the description (case-insensitive).
    Search { terms: Vec<String> },
    Structured {
        category: Option<String>,
        min_price: Option<BigDecimal>,
        max_price: Option<BigDecimal>,
    },
}

impl Default for ProductFilter {
    fn default() -> Self {
        ProductFilter::Structured {
            category: None,
            min_price: None,
            max_price: None,
        }
    }
}

/// Escapes `LIKE` metacharacters so a term matches literally.
pub(crate) fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for ch in term.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

/// Stored stock values that stay within `0..=i32::MAX` once `delta` is added.
///
/// `None` when no stock value can take the delta.
pub(crate) fn stock_window(delta: i32) -> Option<(i32, i32)> {
    let delta = i64::from(delta);
    let low = (-delta).max(0);
    let high = i64::from(i32::MAX) - delta.max(0);
    Some((i32::try_from(low).ok()?, i32::try_from(high).ok()?))
}

fn filtered(filter: &ProductFilter) -> products::BoxedQuery<'static, Pg> {
    let mut query = products::table.into_boxed();

    match filter {
        ProductFilter::Search { terms } => {
            for term in terms {
                let pattern = like_pattern(term);
                query = query.or_filter(
                    products::name
                        .ilike(pattern.clone())
                        .or(products::description.ilike(pattern)),
                );
            }
        }
        ProductFilter::Structured {
            category,
            min_price,
            max_price,
        } => {
            if let Some(category) = category {
                query = query.filter(products::category.eq(category.clone()));
            }
            if let Some(min) = min_price {
                query = query.filter(products::price.ge(min.clone()));
            }
            if let Some(max) = max_price {
                query = query.filter(products::price.le(max.clone()));
            }
        }
    }

    query
}

#[derive(Clone)]
pub struct ProductRepository {
    pool: AsyncDbPool,
}

impl ProductRepository {
    pub fn new(pool: AsyncDbPool) -> Self {
        Self { pool }
    }

    /// Loads one page of matching products plus the total match count.
    ///
    /// # Arguments
    /// * `filter` - Search or structured filter
    /// * `offset` - Rows to skip
    /// * `limit` - Page size
    pub async fn list(
        &self,
        filter: &ProductFilter,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<Product>, i64), AppError> {
        let mut conn = self.pool.get().await?;

        let total: i64 = filtered(filter)
            .count()
            .get_result(&mut conn)
            .await
            .map_err(AppError::from)?;

        let items = filtered(filter)
            .order((products::created_at.asc(), products::id.asc()))
            .offset(offset)
            .limit(limit)
            .select(Product::as_select())
            .load(&mut conn)
            .await
            .map_err(AppError::from)?;

        Ok((items, total))
    }

    pub async fn find_by_id(&self, product_id: Uuid) -> Result<Option<Product>, AppError> {
        let mut conn = self.pool.get().await?;

        products::table
            .find(product_id)
            .select(Product::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(AppError::from)
    }

    pub async fn create(&self, new_product: NewProduct) -> Result<Product, AppError> {
        let mut conn = self.pool.get().await?;

        diesel::insert_into(products::table)
            .values(&new_product)
            .returning(Product::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(AppError::from)
    }

    /// Merges the supplied fields into the stored product.
    ///
    /// An empty changeset returns the current row unchanged.
    pub async fn update(
        &self,
        product_id: Uuid,
        changes: UpdateProduct,
    ) -> Result<Option<Product>, AppError> {
        if changes.is_empty() {
            return self.find_by_id(product_id).await;
        }

        let mut conn = self.pool.get().await?;

        diesel::update(products::table.find(product_id))
            .set((&changes, products::updated_at.eq(diesel::dsl::now)))
            .returning(Product::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(AppError::from)
    }

    /// Adds a signed delta to the stock in a single conditional update.
    ///
    /// Fails with `NotFound` for an unknown product, with `InsufficientStock`
    /// when the result would drop below zero and with a validation error
    /// when it would not fit the column.
    pub async fn adjust_stock(&self, product_id: Uuid, delta: i32) -> Result<Product, AppError> {
        let mut conn = self.pool.get().await?;

        let updated = match stock_window(delta) {
            Some((low, high)) => diesel::update(
                products::table
                    .find(product_id)
                    .filter(products::stock.between(low, high)),
            )
            .set((
                products::stock.eq(products::stock + delta),
                products::updated_at.eq(diesel::dsl::now),
            ))
            .returning(Product::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(AppError::from)?,
            None => None,
        };

        if let Some(product) = updated {
            return Ok(product);
        }

        let current = products::table
            .find(product_id)
            .select(Product::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(AppError::from)?;

        match current {
            Some(product) if i64::from(product.stock) + i64::from(delta) < 0 => {
                Err(AppError::InsufficientStock {
                    product: product.name,
                    requested: delta.saturating_neg(),
                    available: Some(product.stock),
                })
            }
            Some(_) => Err(AppError::validation(
                "quantity",
                format!("Stock cannot exceed {}", i32::MAX),
            )),
            None => Err(AppError::not_found("product", "id", product_id)),
        }
    }

    /// Deletes a product; order lines keep their snapshot.
    ///
    /// # Returns
    /// The number of deleted rows
    pub async fn delete(&self, product_id: Uuid) -> Result<usize, AppError> {
        let mut conn = self.pool.get().await?;

        diesel::delete(products::table.find(product_id))
            .execute(&mut conn)
            .await
            .map_err(AppError::from)
    }

    /// Records a review and refreshes the product's mean rating.
    pub async fn add_review(&self, review: NewReview) -> Result<Product, AppError> {
        let mut conn = self.pool.get().await?;

        conn.transaction::<_, AppError, _>(|conn| {
            async move {
                let product_id = review.product_id;

                let exists = products::table
                    .find(product_id)
                    .select(products::id)
                    .for_update()
                    .first::<Uuid>(conn)
                    .await
                    .optional()?;
                if exists.is_none() {
                    return Err(AppError::not_found("product", "id", product_id));
                }

                diesel::insert_into(product_reviews::table)
                    .values(&review)
                    .execute(conn)
                    .await?;

                let ratings: Vec<i32> = product_reviews::table
                    .filter(product_reviews::product_id.eq(product_id))
                    .select(product_reviews::rating)
                    .load(conn)
                    .await?;

                let product = diesel::update(products::table.find(product_id))
                    .set((
                        products::rating.eq(average_rating(&ratings)),
                        products::updated_at.eq(diesel::dsl::now),
                    ))
                    .returning(Product::as_returning())
                    .get_result(conn)
                    .await?;

                Ok(product)
            }
            .scope_boxed()
        })
        .await
    }

    /// Reviews of one product, oldest first.
    pub async fn list_reviews(&self, product_id: Uuid) -> Result<Vec<Review>, AppError> {
        let mut conn = self.pool.get().await?;

        product_reviews::table
            .filter(product_reviews::product_id.eq(product_id))
            .order((product_reviews::created_at.asc(), product_reviews::id.asc()))
            .select(Review::as_select())
            .load(&mut conn)
            .await
            .map_err(AppError::from)
    }

    /// Inserts a batch of products, optionally clearing the catalog first.
    ///
    /// # Returns
    /// The number of inserted rows
    pub async fn seed(&self, batch: Vec<NewProduct>, append: bool) -> Result<usize, AppError> {
        let mut conn = self.pool.get().await?;

        conn.transaction::<_, AppError, _>(|conn| {
            async move {
                if !append {
                    diesel::delete(products::table).execute(conn).await?;
                }

                let inserted = diesel::insert_into(products::table)
                    .values(&batch)
                    .execute(conn)
                    .await?;

                Ok(inserted)
            }
            .scope_boxed()
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diesel::debug_query;

    use crate::db::testing::{create_product, migrated_pool, stock_of};

    #[test]
    fn test_like_pattern_wraps_term() {
        assert_eq!(like_pattern("laptop"), "%laptop%");
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("100%"), "%100\\%%");
        assert_eq!(like_pattern("a_b"), "%a\\_b%");
        assert_eq!(like_pattern("c:\\"), "%c:\\\\%");
    }

    #[test]
    fn test_search_filter_ors_terms_and_ignores_structure() {
        let filter = ProductFilter::Search {
            terms: vec!["phone".to_string(), "case".to_string()],
        };
        let sql = debug_query::<Pg, _>(&filtered(&filter)).to_string();

        assert!(sql.contains("ILIKE"));
        assert!(sql.contains(" OR "));
        assert!(!sql.contains("\"category\" ="));
    }

    #[test]
    fn test_structured_filter_bounds_price() {
        let filter = ProductFilter::Structured {
            category: Some("Books".to_string()),
            min_price: Some(BigDecimal::from(10)),
            max_price: Some(BigDecimal::from(20)),
        };
        let sql = debug_query::<Pg, _>(&filtered(&filter)).to_string();

        assert!(sql.contains("\"products\".\"category\" = $1"));
        assert!(sql.contains("\"products\".\"price\" >= $2"));
        assert!(sql.contains("\"products\".\"price\" <= $3"));
        assert!(!sql.contains("ILIKE"));
    }

    #[test]
    fn test_stock_window_keeps_result_in_range() {
        assert_eq!(stock_window(0), Some((0, i32::MAX)));
        assert_eq!(stock_window(-3), Some((3, i32::MAX)));
        assert_eq!(stock_window(5), Some((0, i32::MAX - 5)));
        assert_eq!(stock_window(i32::MAX), Some((0, 0)));
        assert_eq!(stock_window(i32::MIN), None);
    }

    #[test]
    fn test_default_filter_has_no_where_clause() {
        let sql = debug_query::<Pg, _>(&filtered(&ProductFilter::default())).to_string();
        assert!(!sql.contains("WHERE"));
    }

    #[tokio::test]
    #[ignore = "requires PostgreSQL at DATABASE_URL"]
    async fn test_adjust_stock_stays_within_column_range() {
        let pool = migrated_pool().await;
        let product = create_product(&pool, "Books", "9.99", 5).await;
        let repo = ProductRepository::new(pool.clone());

        assert_eq!(repo.adjust_stock(product.id, -2).await.unwrap().stock, 3);

        let result = repo.adjust_stock(product.id, -4).await;
        assert!(matches!(
            result,
            Err(AppError::InsufficientStock { available: Some(3), .. })
        ));

        let result = repo.adjust_stock(product.id, i32::MAX).await;
        assert!(matches!(result, Err(AppError::Validation { field, .. }) if field == "quantity"));

        let result = repo.adjust_stock(product.id, i32::MIN).await;
        assert!(matches!(result, Err(AppError::InsufficientStock { .. })));
        assert_eq!(stock_of(&pool, product.id).await, 3);
    }

    #[tokio::test]
    #[ignore = "requires PostgreSQL at DATABASE_URL"]
    async fn test_adjust_stock_of_unknown_product_is_not_found() {
        let repo = ProductRepository::new(migrated_pool().await);
        let result = repo.adjust_stock(Uuid::new_v4(), 1).await;
        assert!(matches!(result, Err(AppError::NotFound { .. })));
    }
}
