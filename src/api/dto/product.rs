//! Catalog DTOs: listing query, admin payloads and product views.
//!
//! Prices travel as decimal strings (`"19.99"`).

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::models::{NewProduct, Product, Review, UpdateProduct, max_price};
use crate::services::{ProductPage, ProductQuery};

/// Prices are stored with two decimals, so the bound applies after rounding.
fn storable_price(price: &BigDecimal) -> Result<(), ValidationError> {
    let (code, message) = if *price < BigDecimal::from(0) {
        ("non_negative", "Price cannot be negative".to_string())
    } else if price.round(2) > max_price() {
        ("max_price", format!("Price cannot exceed {}", max_price()))
    } else {
        return Ok(());
    };

    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    Err(err)
}

/// `GET /api/products` query string.
///
/// A non-blank `search` takes precedence; `category` and the price bounds
/// only apply without it.
#[derive(Debug, Default, Deserialize, IntoParams, Validate)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct ProductListQuery {
    pub category: Option<String>,
    #[param(value_type = Option<String>, example = "10.00")]
    pub min_price: Option<BigDecimal>,
    #[param(value_type = Option<String>, example = "99.99")]
    pub max_price: Option<BigDecimal>,
    /// Whitespace separated terms matched against name and description
    pub search: Option<String>,
    #[validate(range(min = 1, message = "Page must be at least 1"))]
    #[param(minimum = 1, example = 1)]
    pub page: Option<i64>,
    #[validate(range(min = 1, max = 100, message = "Limit must be between 1 and 100"))]
    #[param(minimum = 1, maximum = 100, example = 10)]
    pub limit: Option<i64>,
}

impl From<ProductListQuery> for ProductQuery {
    fn from(q: ProductListQuery) -> Self {
        Self {
            category: q.category,
            min_price: q.min_price,
            max_price: q.max_price,
            search: q.search,
            page: q.page,
            limit: q.limit,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    #[validate(length(min = 1, max = 200, message = "Name must be between 1 and 200 characters"))]
    #[schema(example = "Wireless Mouse")]
    pub name: String,
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
    #[validate(custom(function = "storable_price"))]
    #[schema(value_type = String, example = "29.99")]
    pub price: BigDecimal,
    #[validate(length(min = 1, max = 100, message = "Category is required"))]
    #[schema(example = "Electronics")]
    pub category: String,
    #[validate(range(min = 0, message = "Stock cannot be negative"))]
    #[serde(default)]
    pub stock: i32,
    #[serde(default)]
    pub images: Vec<String>,
}

impl From<CreateProductRequest> for NewProduct {
    fn from(req: CreateProductRequest) -> Self {
        Self {
            name: req.name,
            description: req.description,
            price: req.price,
            category: req.category,
            stock: req.stock,
            images: req.images,
            rating: 0.0,
        }
    }
}

/// Merge update; absent fields keep their stored value.
#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    #[validate(length(min = 1, max = 200, message = "Name must be between 1 and 200 characters"))]
    pub name: Option<String>,
    #[validate(length(min = 1, message = "Description cannot be empty"))]
    pub description: Option<String>,
    #[validate(custom(function = "storable_price"))]
    #[schema(value_type = Option<String>, example = "24.99")]
    pub price: Option<BigDecimal>,
    #[validate(length(min = 1, max = 100, message = "Category cannot be empty"))]
    pub category: Option<String>,
    #[validate(range(min = 0, message = "Stock cannot be negative"))]
    pub stock: Option<i32>,
    pub images: Option<Vec<String>>,
}

impl From<UpdateProductRequest> for UpdateProduct {
    fn from(req: UpdateProductRequest) -> Self {
        Self {
            name: req.name,
            description: req.description,
            price: req.price,
            category: req.category,
            stock: req.stock,
            images: req.images,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct StockAdjustmentRequest {
    /// Signed change applied to the current stock
    #[serde(alias = "delta")]
    #[schema(example = -3)]
    pub quantity: i32,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct ReviewRequest {
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    #[schema(minimum = 1, maximum = 5, example = 5)]
    pub rating: i32,
    #[validate(length(max = 2000, message = "Comment is too long"))]
    #[serde(default)]
    pub comment: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    #[schema(value_type = String, example = "29.99")]
    pub price: BigDecimal,
    pub category: String,
    pub stock: i32,
    pub images: Vec<String>,
    #[schema(example = 4.5)]
    pub rating: f64,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Product> for ProductResponse {
    fn from(p: Product) -> Self {
        Self {
            id: p.id,
            name: p.name,
            description: p.description,
            price: p.price,
            category: p.category,
            stock: p.stock,
            images: p.images,
            rating: p.rating,
            created_at: p.created_at.to_jiff().to_string(),
            updated_at: p.updated_at.to_jiff().to_string(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewResponse {
    pub user_id: Uuid,
    pub username: String,
    pub rating: i32,
    pub comment: String,
    pub date: String,
}

impl From<Review> for ReviewResponse {
    fn from(r: Review) -> Self {
        Self {
            user_id: r.user_id,
            username: r.username,
            rating: r.rating,
            comment: r.comment,
            date: r.created_at.to_jiff().to_string(),
        }
    }
}

/// A product with its reviews, returned by `GET /api/products/{id}`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ProductDetailResponse {
    #[serde(flatten)]
    pub product: ProductResponse,
    pub reviews: Vec<ReviewResponse>,
}

impl From<(Product, Vec<Review>)> for ProductDetailResponse {
    fn from((product, reviews): (Product, Vec<Review>)) -> Self {
        Self {
            product: product.into(),
            reviews: reviews.into_iter().map(ReviewResponse::from).collect(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductListResponse {
    pub products: Vec<ProductResponse>,
    /// Rows matching the filter across all pages
    pub total: i64,
    pub page: i64,
    pub pages: i64,
}

impl From<ProductPage> for ProductListResponse {
    fn from(page: ProductPage) -> Self {
        Self {
            products: page.products.into_iter().map(ProductResponse::from).collect(),
            total: page.total,
            page: page.page,
            pages: page.pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_query_string_uses_camel_case_prices() {
        let uri: axum::http::Uri = "/api/products?minPrice=10&maxPrice=20.5&page=2&limit=5"
            .parse()
            .unwrap();
        let axum::extract::Query(q) = axum::extract::Query::<ProductListQuery>::try_from_uri(&uri).unwrap();
        assert_eq!(q.min_price, Some(BigDecimal::from(10)));
        assert_eq!(q.max_price, Some(BigDecimal::from_str("20.5").unwrap()));
        assert_eq!(q.page, Some(2));
        assert!(q.validate().is_ok());
    }

    #[test]
    fn test_limit_above_max_fails_validation() {
        let q = ProductListQuery {
            limit: Some(101),
            ..Default::default()
        };
        assert!(q.validate().unwrap_err().field_errors().contains_key("limit"));
    }

    #[test]
    fn test_create_request_defaults_and_price_string() {
        let req: CreateProductRequest = serde_json::from_str(
            r#"{"name":"Mouse","description":"Wireless","price":"29.99","category":"Electronics"}"#,
        )
        .unwrap();
        assert_eq!(req.stock, 0);
        assert!(req.images.is_empty());
        assert!(req.validate().is_ok());

        let product: NewProduct = req.into();
        assert_eq!(product.rating, 0.0);
    }

    #[test]
    fn test_negative_price_rejected() {
        let req: CreateProductRequest = serde_json::from_str(
            r#"{"name":"Mouse","description":"d","price":"-1","category":"c"}"#,
        )
        .unwrap();
        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("price"));
    }

    #[test]
    fn test_price_beyond_column_precision_rejected() {
        let req: CreateProductRequest = serde_json::from_str(
            r#"{"name":"Yacht","description":"d","price":"1e13","category":"c"}"#,
        )
        .unwrap();
        let errors = req.validate().unwrap_err();
        assert_eq!(errors.field_errors()["price"][0].code, "max_price");

        let req: UpdateProductRequest =
            serde_json::from_str(r#"{"price":"9999999999.999"}"#).unwrap();
        assert!(req.validate().is_err());

        let req: UpdateProductRequest =
            serde_json::from_str(r#"{"price":"9999999999.99"}"#).unwrap();
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_stock_adjustment_reads_quantity() {
        let req: StockAdjustmentRequest = serde_json::from_str(r#"{"quantity":-4}"#).unwrap();
        assert_eq!(req.quantity, -4);

        let req: StockAdjustmentRequest = serde_json::from_str(r#"{"delta":2}"#).unwrap();
        assert_eq!(req.quantity, 2);
    }

    #[test]
    fn test_update_request_validates_present_fields_only() {
        let req: UpdateProductRequest = serde_json::from_str(r#"{"stock":5}"#).unwrap();
        assert!(req.validate().is_ok());

        let req: UpdateProductRequest = serde_json::from_str(r#"{"price":"-0.01"}"#).unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_review_rating_bounds() {
        let req: ReviewRequest = serde_json::from_str(r#"{"rating":6}"#).unwrap();
        assert!(req.validate().is_err());
        let req: ReviewRequest = serde_json::from_str(r#"{"rating":1,"comment":"meh"}"#).unwrap();
        assert!(req.validate().is_ok());
    }
}
