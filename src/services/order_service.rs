//! Order service: placement, listing, status changes and cancellation.

use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{
    OrderLineRequest, OrderStatus, OrderWithItems, ShippingAddress, quantities_by_product,
};
use crate::repositories::OrderRepository;

/// Rejects empty orders, non-positive quantities and per-product totals
/// beyond `i32::MAX` before touching the database.
pub fn validate_lines(lines: &[OrderLineRequest]) -> AppResult<()> {
    if lines.is_empty() {
        return Err(AppError::validation("products", "Order must contain at least one item"));
    }
    if let Some(position) = lines.iter().position(|line| line.quantity <= 0) {
        return Err(AppError::validation(
            &format!("products[{position}].quantity"),
            "Quantity must be at least 1",
        ));
    }
    if quantities_by_product(lines.iter().map(|l| (l.product_id, l.quantity))).is_none() {
        return Err(AppError::validation(
            "products",
            "Total quantity for a product is too large",
        ));
    }
    Ok(())
}

#[derive(Clone)]
pub struct OrderService {
    repo: OrderRepository,
}

impl OrderService {
    pub fn new(repo: OrderRepository) -> Self {
        Self { repo }
    }

    /// Places an order for `user_id`, decrementing stock atomically.
    #[instrument(skip(self, lines, shipping), fields(lines = lines.len()))]
    pub async fn place(
        &self,
        user_id: Uuid,
        lines: Vec<OrderLineRequest>,
        shipping: ShippingAddress,
    ) -> AppResult<OrderWithItems> {
        validate_lines(&lines)?;

        let placed = self.repo.create(user_id, lines, shipping).await?;
        info!(
            order_id = %placed.order.id,
            user_id = %user_id,
            total = %placed.order.total_amount,
            "Order placed"
        );
        Ok(placed)
    }

    pub async fn list_mine(&self, user_id: Uuid) -> AppResult<Vec<OrderWithItems>> {
        self.repo.list_for_user(user_id).await
    }

    /// Moves an order to `next` if the lifecycle allows it.
    pub async fn set_status(&self, order_id: Uuid, next: OrderStatus) -> AppResult<OrderWithItems> {
        let updated = self.repo.update_status(order_id, next).await?;
        info!(order_id = %order_id, status = %next, "Order status changed");
        Ok(updated)
    }

    /// Cancels the caller's pending order and restores its stock.
    pub async fn cancel(&self, order_id: Uuid, user_id: Uuid) -> AppResult<OrderWithItems> {
        let cancelled = self.repo.cancel(order_id, user_id).await?;
        info!(
            order_id = %order_id,
            user_id = %user_id,
            lines = cancelled.items.len(),
            "Order cancelled"
        );
        Ok(cancelled)
    }
}
