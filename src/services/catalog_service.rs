//! Catalog service: product listing, admin maintenance and reviews.

use bigdecimal::BigDecimal;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::config::CatalogConfig;
use crate::error::{AppError, AppResult};
use crate::models::{NewProduct, NewReview, Product, Review, UpdateProduct, User};
use crate::repositories::{ProductFilter, ProductRepository};

/// Listing parameters as received from the caller.
#[derive(Debug, Clone, Default)]
pub struct ProductQuery {
    pub category: Option<String>,
    pub min_price: Option<BigDecimal>,
    pub max_price: Option<BigDecimal>,
    pub search: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl ProductQuery {
    /// Text search wins over the structured filter when it has any term.
    pub fn to_filter(&self) -> ProductFilter {
        let terms: Vec<String> = self
            .search
            .as_deref()
            .unwrap_or_default()
            .split_whitespace()
            .map(str::to_string)
            .collect();

        if terms.is_empty() {
            ProductFilter::Structured {
                category: self.category.clone(),
                min_price: self.min_price.clone(),
                max_price: self.max_price.clone(),
            }
        } else {
            ProductFilter::Search { terms }
        }
    }
}

/// One page of a product listing.
#[derive(Debug, Clone)]
pub struct ProductPage {
    pub products: Vec<Product>,
    pub total: i64,
    pub page: i64,
    pub pages: i64,
}

/// Rows skipped before `page`; fails when the offset does not fit in an `i64`.
pub fn page_offset(page: i64, limit: i64) -> AppResult<i64> {
    page.checked_sub(1)
        .and_then(|skipped| skipped.checked_mul(limit))
        .ok_or_else(|| AppError::validation("page", "Page is out of range"))
}

/// `ceil(total / limit)`, 0 for an empty result.
pub fn page_count(total: i64, limit: i64) -> i64 {
    if total <= 0 || limit <= 0 {
        return 0;
    }
    (total + limit - 1) / limit
}

#[derive(Clone)]
pub struct CatalogService {
    repo: ProductRepository,
    config: CatalogConfig,
}

impl CatalogService {
    pub fn new(repo: ProductRepository, config: CatalogConfig) -> Self {
        Self { repo, config }
    }

    /// Lists products matching `query`, one page at a time.
    pub async fn list(&self, query: ProductQuery) -> AppResult<ProductPage> {
        let page = query.page.unwrap_or(1);
        if page < 1 {
            return Err(AppError::validation("page", "Page must be at least 1"));
        }
        let limit = query.limit.unwrap_or(self.config.default_page_size);
        if !(1..=self.config.max_page_size).contains(&limit) {
            return Err(AppError::validation(
                "limit",
                format!("Limit must be between 1 and {}", self.config.max_page_size),
            ));
        }

        let offset = page_offset(page, limit)?;
        let filter = query.to_filter();
        let (products, total) = self.repo.list(&filter, offset, limit).await?;

        Ok(ProductPage {
            products,
            total,
            page,
            pages: page_count(total, limit),
        })
    }

    pub async fn get(&self, product_id: Uuid) -> AppResult<Product> {
        self.repo
            .find_by_id(product_id)
            .await?
            .ok_or_else(|| AppError::not_found("product", "id", product_id))
    }

    /// The product together with its reviews.
    pub async fn get_with_reviews(&self, product_id: Uuid) -> AppResult<(Product, Vec<Review>)> {
        let product = self.get(product_id).await?;
        let reviews = self.repo.list_reviews(product_id).await?;
        Ok((product, reviews))
    }

    #[instrument(skip(self, new_product), fields(name = %new_product.name))]
    pub async fn create(&self, new_product: NewProduct) -> AppResult<Product> {
        let product = self.repo.create(new_product).await?;
        info!(product_id = %product.id, "Product created");
        Ok(product)
    }

    pub async fn update(&self, product_id: Uuid, changes: UpdateProduct) -> AppResult<Product> {
        let product = self
            .repo
            .update(product_id, changes)
            .await?
            .ok_or_else(|| AppError::not_found("product", "id", product_id))?;

        info!(product_id = %product.id, "Product updated");
        Ok(product)
    }

    /// Adds `delta` to the stock; the result may not go below zero.
    pub async fn adjust_stock(&self, product_id: Uuid, delta: i32) -> AppResult<Product> {
        let product = self.repo.adjust_stock(product_id, delta).await?;
        info!(product_id = %product.id, delta, stock = product.stock, "Stock adjusted");
        Ok(product)
    }

    pub async fn delete(&self, product_id: Uuid) -> AppResult<()> {
        if self.repo.delete(product_id).await? == 0 {
            return Err(AppError::not_found("product", "id", product_id));
        }
        info!(product_id = %product_id, "Product deleted");
        Ok(())
    }

    /// Records a review by `author` and returns the re-rated product.
    pub async fn add_review(
        &self,
        product_id: Uuid,
        author: &User,
        rating: i32,
        comment: String,
    ) -> AppResult<Product> {
        if !(1..=5).contains(&rating) {
            return Err(AppError::validation("rating", "Rating must be between 1 and 5"));
        }

        let product = self
            .repo
            .add_review(NewReview {
                product_id,
                user_id: author.id,
                username: author.username.clone(),
                rating,
                comment,
            })
            .await?;

        info!(product_id = %product.id, user_id = %author.id, rating = product.rating, "Review added");
        Ok(product)
    }

    /// Loads the built-in sample catalog.
    ///
    /// # Returns
    /// The number of inserted products
    pub async fn seed(&self, append: bool) -> AppResult<usize> {
        let inserted = self.repo.seed(sample_catalog(), append).await?;
        info!(inserted, append, "Catalog seeded");
        Ok(inserted)
    }
}

/// Sample products used by the `seed` command.
pub fn sample_catalog() -> Vec<NewProduct> {
    let item = |name: &str, price: i64, category: &str, stock: i32, description: &str| NewProduct {
        name: name.to_string(),
        description: description.to_string(),
        price: BigDecimal::from(price),
        category: category.to_string(),
        stock,
        images: Vec::new(),
        rating: 4.5,
    };

    vec![
        item("ASUS Laptop", 69999, "Electronics", 10, "15.6 inch, Core i5, 8GB RAM"),
        item("Samsung Galaxy S23", 79999, "Electronics", 15, "128GB, 8GB RAM, 50MP camera"),
        item("JavaScript Book", 2499, "Books", 50, "Learn programming from scratch"),
        item("Sony WH-1000XM4 Headphones", 29999, "Electronics", 8, "Wireless, noise cancelling"),
        item("Nike T-Shirt", 3999, "Clothing", 25, "Sports, cotton"),
        item("Apple Watch Series 8", 39999, "Electronics", 12, "GPS, 45mm"),
        item("PlayStation 5", 49999, "Gaming", 5, "Digital Edition"),
        item("Samsung Monitor", 34999, "Electronics", 7, "27 inch, 4K UHD"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_search_takes_precedence_over_filters() {
        let query = ProductQuery {
            category: Some("Books".to_string()),
            min_price: Some(BigDecimal::from(1)),
            search: Some("  galaxy   watch ".to_string()),
            ..Default::default()
        };

        assert_eq!(
            query.to_filter(),
            ProductFilter::Search {
                terms: vec!["galaxy".to_string(), "watch".to_string()]
            }
        );
    }

    #[test]
    fn test_blank_search_falls_back_to_structured_filter() {
        let query = ProductQuery {
            category: Some("Gaming".to_string()),
            search: Some("   ".to_string()),
            ..Default::default()
        };

        assert_eq!(
            query.to_filter(),
            ProductFilter::Structured {
                category: Some("Gaming".to_string()),
                min_price: None,
                max_price: None,
            }
        );
    }

    #[test]
    fn test_page_count() {
        assert_eq!(page_count(0, 10), 0);
        assert_eq!(page_count(1, 10), 1);
        assert_eq!(page_count(10, 10), 1);
        assert_eq!(page_count(11, 10), 2);
        assert_eq!(page_count(25, 1), 25);
    }

    #[test]
    fn test_page_offset() {
        assert_eq!(page_offset(1, 10).unwrap(), 0);
        assert_eq!(page_offset(3, 25).unwrap(), 50);
    }

    #[test]
    fn test_page_offset_overflow_is_a_validation_error() {
        let result = page_offset(i64::MAX, 10);
        assert!(matches!(result, Err(AppError::Validation { field, .. }) if field == "page"));
        assert!(page_offset(i64::MIN, 1).is_err());
    }

    #[test]
    fn test_sample_catalog_is_valid() {
        let catalog = sample_catalog();
        assert_eq!(catalog.len(), 8);
        assert!(catalog.iter().all(|p| p.stock >= 0 && p.price >= BigDecimal::from(0)));
        assert!(catalog.iter().any(|p| p.category == "Gaming"));
    }

    proptest! {
        #[test]
        fn property_pages_cover_total(total in 0i64..10_000, limit in 1i64..=100) {
            let pages = page_count(total, limit);
            prop_assert!(pages * limit >= total);
            prop_assert!(pages == 0 || (pages - 1) * limit < total);
        }
    }
}
