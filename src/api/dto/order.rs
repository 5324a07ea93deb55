//! Order DTOs

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::{OrderItem, OrderLineRequest, OrderStatus, OrderWithItems, ShippingAddress};

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineInput {
    pub product_id: Uuid,
    #[schema(minimum = 1, example = 2)]
    pub quantity: i32,
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddressDto {
    #[validate(length(min = 1, max = 200, message = "Street is required"))]
    pub street: String,
    #[validate(length(min = 1, max = 100, message = "City is required"))]
    pub city: String,
    #[validate(length(min = 1, max = 20, message = "Zip code is required"))]
    pub zip_code: String,
}

/// Line checks (non-empty list, positive quantities) happen in the order
/// service; the shipping address is checked here.
#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    #[serde(alias = "items")]
    pub products: Vec<OrderLineInput>,
    #[validate(nested)]
    pub shipping_address: ShippingAddressDto,
}

impl CreateOrderRequest {
    pub fn into_parts(self) -> (Vec<OrderLineRequest>, ShippingAddress) {
        let lines = self
            .products
            .into_iter()
            .map(|line| OrderLineRequest {
                product_id: line.product_id,
                quantity: line.quantity,
            })
            .collect();
        let address = self.shipping_address;
        (
            lines,
            ShippingAddress {
                street: address.street,
                city: address.city,
                zip_code: address.zip_code,
            },
        )
    }
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct UpdateOrderStatusRequest {
    pub status: OrderStatus,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemResponse {
    pub product_id: Uuid,
    /// Product name at order time
    pub name: String,
    /// Unit price at order time
    #[schema(value_type = String, example = "29.99")]
    pub price: BigDecimal,
    pub quantity: i32,
}

impl From<OrderItem> for OrderItemResponse {
    fn from(item: OrderItem) -> Self {
        Self {
            product_id: item.product_id,
            name: item.name,
            price: item.price,
            quantity: item.quantity,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub products: Vec<OrderItemResponse>,
    #[schema(value_type = String, example = "59.98")]
    pub total_amount: BigDecimal,
    pub shipping_address: ShippingAddressDto,
    pub status: OrderStatus,
    pub created_at: String,
    pub updated_at: String,
}

impl From<OrderWithItems> for OrderResponse {
    fn from(OrderWithItems { order, items }: OrderWithItems) -> Self {
        Self {
            id: order.id,
            user_id: order.user_id,
            products: items.into_iter().map(OrderItemResponse::from).collect(),
            total_amount: order.total_amount,
            shipping_address: ShippingAddressDto {
                street: order.ship_street,
                city: order.ship_city,
                zip_code: order.ship_zip_code,
            },
            status: order.status,
            created_at: order.created_at.to_jiff().to_string(),
            updated_at: order.updated_at.to_jiff().to_string(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CancelOrderResponse {
    #[schema(example = "Order cancelled")]
    pub message: String,
    pub order: OrderResponse,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_order_request_shape() {
        let product_id = Uuid::new_v4();
        let body = format!(
            r#"{{"products":[{{"productId":"{product_id}","quantity":3}}],
                "shippingAddress":{{"street":"1 Main St","city":"Springfield","zipCode":"12345"}}}}"#
        );
        let req: CreateOrderRequest = serde_json::from_str(&body).unwrap();
        assert!(req.validate().is_ok());

        let (lines, address) = req.into_parts();
        assert_eq!(
            lines,
            vec![OrderLineRequest {
                product_id,
                quantity: 3
            }]
        );
        assert_eq!(address.zip_code, "12345");
    }

    #[test]
    fn test_items_key_is_accepted_as_products() {
        let product_id = Uuid::new_v4();
        let body = format!(
            r#"{{"items":[{{"productId":"{product_id}","quantity":1}}],
                "shippingAddress":{{"street":"1 Main St","city":"Springfield","zipCode":"12345"}}}}"#
        );
        let req: CreateOrderRequest = serde_json::from_str(&body).unwrap();
        assert_eq!(req.products.len(), 1);
    }

    #[test]
    fn test_order_response_lists_products() {
        let order_id = Uuid::new_v4();
        let response = OrderResponse::from(OrderWithItems {
            order: crate::models::Order {
                id: order_id,
                user_id: Uuid::new_v4(),
                total_amount: BigDecimal::from(20),
                ship_street: "1 Main St".to_string(),
                ship_city: "Springfield".to_string(),
                ship_zip_code: "12345".to_string(),
                status: OrderStatus::Pending,
                created_at: jiff::Timestamp::now().into(),
                updated_at: jiff::Timestamp::now().into(),
            },
            items: vec![OrderItem {
                id: Uuid::new_v4(),
                order_id,
                product_id: Uuid::new_v4(),
                name: "Nike T-Shirt".to_string(),
                price: BigDecimal::from(10),
                quantity: 2,
                position: 0,
            }],
        });

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["products"][0]["name"], "Nike T-Shirt");
        assert_eq!(json["shippingAddress"]["zipCode"], "12345");
        assert!(json.get("items").is_none());
    }

    #[test]
    fn test_blank_shipping_city_fails_validation() {
        let req: CreateOrderRequest = serde_json::from_str(
            r#"{"products":[],"shippingAddress":{"street":"s","city":"","zipCode":"z"}}"#,
        )
        .unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_status_request_accepts_lowercase() {
        let req: UpdateOrderStatusRequest =
            serde_json::from_str(r#"{"status":"shipped"}"#).unwrap();
        assert_eq!(req.status, OrderStatus::Shipped);
        assert!(serde_json::from_str::<UpdateOrderStatusRequest>(r#"{"status":"lost"}"#).is_err());
    }
}
