//! Order repository.
//!
//! Every stock-touching operation runs inside one transaction with the
//! affected product rows locked in id order.

use std::collections::HashMap;

use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use crate::db::AsyncDbPool;
use crate::error::AppError;
use crate::models::{
    NewOrder, NewOrderItem, Order, OrderItem, OrderLineRequest, OrderStatus, OrderWithItems,
    Product, ShippingAddress, max_order_total, order_total, quantities_by_product,
};
use crate::schema::{order_items, orders, products};

#[derive(Clone)]
pub struct OrderRepository {
    pool: AsyncDbPool,
}

fn quantity_too_large() -> AppError {
    AppError::validation("products", "Total quantity for a product is too large")
}

async fn restore_stock(conn: &mut AsyncPgConnection, items: &[OrderItem]) -> Result<(), AppError> {
    let restock = quantities_by_product(items.iter().map(|i| (i.product_id, i.quantity)))
        .ok_or_else(quantity_too_large)?;

    // Products deleted since the order was placed are skipped.
    for (product_id, quantity) in restock {
        diesel::update(products::table.find(product_id))
            .set((
                products::stock.eq(products::stock + quantity),
                products::updated_at.eq(diesel::dsl::now),
            ))
            .execute(conn)
            .await?;
    }
    Ok(())
}

async fn load_items(conn: &mut AsyncPgConnection, order: &Order) -> Result<Vec<OrderItem>, AppError> {
    OrderItem::belonging_to(order)
        .order(order_items::position.asc())
        .select(OrderItem::as_select())
        .load(conn)
        .await
        .map_err(AppError::from)
}

impl OrderRepository {
    pub fn new(pool: AsyncDbPool) -> Self {
        Self { pool }
    }

    /// Places an order and decrements stock for every line.
    ///
    /// The whole operation is one transaction; any failure leaves stock
    /// untouched.
    ///
    /// # Errors
    /// * `NotFound` naming the first missing product
    /// * `InsufficientStock` naming the first product that cannot cover its line
    pub async fn create(
        &self,
        user_id: Uuid,
        lines: Vec<OrderLineRequest>,
        shipping: ShippingAddress,
    ) -> Result<OrderWithItems, AppError> {
        let mut conn = self.pool.get().await?;

        conn.transaction::<_, AppError, _>(|conn| {
            async move {
                let wanted = quantities_by_product(lines.iter().map(|l| (l.product_id, l.quantity)))
                    .ok_or_else(quantity_too_large)?;
                let ids: Vec<Uuid> = wanted.keys().copied().collect();

                let locked: Vec<Product> = products::table
                    .filter(products::id.eq_any(ids))
                    .order(products::id.asc())
                    .for_update()
                    .select(Product::as_select())
                    .load(conn)
                    .await?;
                let mut catalog: HashMap<Uuid, Product> =
                    locked.into_iter().map(|p| (p.id, p)).collect();

                let mut remaining: HashMap<Uuid, i32> =
                    catalog.iter().map(|(id, p)| (*id, p.stock)).collect();
                let mut snapshots = Vec::with_capacity(lines.len());

                for line in &lines {
                    let product = catalog.get(&line.product_id).ok_or_else(|| {
                        AppError::not_found("product", "id", line.product_id)
                    })?;
                    let left = remaining.entry(line.product_id).or_insert(0);
                    if *left < line.quantity {
                        return Err(AppError::InsufficientStock {
                            product: product.name.clone(),
                            requested: line.quantity,
                            available: Some(*left),
                        });
                    }
                    *left -= line.quantity;
                    snapshots.push((product.name.clone(), product.price.clone(), line));
                }

                let total_amount =
                    order_total(snapshots.iter().map(|(_, price, line)| (price, line.quantity)));
                if total_amount > max_order_total() {
                    return Err(AppError::validation(
                        "products",
                        format!("Order total cannot exceed {}", max_order_total()),
                    ));
                }

                for (product_id, quantity) in &wanted {
                    let updated = diesel::update(
                        products::table
                            .find(*product_id)
                            .filter(products::stock.ge(*quantity)),
                    )
                    .set((
                        products::stock.eq(products::stock - *quantity),
                        products::updated_at.eq(diesel::dsl::now),
                    ))
                    .execute(conn)
                    .await?;

                    if updated == 0 {
                        let product = catalog.remove(product_id);
                        return Err(AppError::InsufficientStock {
                            product: product.map(|p| p.name).unwrap_or_else(|| product_id.to_string()),
                            requested: *quantity,
                            available: None,
                        });
                    }
                }

                let order = diesel::insert_into(orders::table)
                    .values(&NewOrder {
                        id: Uuid::new_v4(),
                        user_id,
                        total_amount,
                        ship_street: shipping.street,
                        ship_city: shipping.city,
                        ship_zip_code: shipping.zip_code,
                        status: OrderStatus::Pending,
                    })
                    .returning(Order::as_returning())
                    .get_result(conn)
                    .await?;

                let new_items: Vec<NewOrderItem> = snapshots
                    .into_iter()
                    .enumerate()
                    .map(|(position, (name, price, line))| NewOrderItem {
                        order_id: order.id,
                        product_id: line.product_id,
                        name,
                        price,
                        quantity: line.quantity,
                        position: position as i32,
                    })
                    .collect();

                let items = diesel::insert_into(order_items::table)
                    .values(&new_items)
                    .returning(OrderItem::as_returning())
                    .get_results(conn)
                    .await?;

                Ok(OrderWithItems { order, items })
            }
            .scope_boxed()
        })
        .await
    }

    /// Lists a user's orders, newest first, each with its lines.
    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<OrderWithItems>, AppError> {
        let mut conn = self.pool.get().await?;

        let user_orders: Vec<Order> = orders::table
            .filter(orders::user_id.eq(user_id))
            .order((orders::created_at.desc(), orders::id.desc()))
            .select(Order::as_select())
            .load(&mut conn)
            .await
            .map_err(AppError::from)?;

        let items: Vec<OrderItem> = OrderItem::belonging_to(&user_orders)
            .order(order_items::position.asc())
            .select(OrderItem::as_select())
            .load(&mut conn)
            .await
            .map_err(AppError::from)?;

        Ok(items
            .grouped_by(&user_orders)
            .into_iter()
            .zip(user_orders)
            .map(|(items, order)| OrderWithItems { order, items })
            .collect())
    }

    /// Moves an order along the lifecycle.
    ///
    /// `pending -> cancelled` restores stock in the same transaction. Illegal
    /// transitions fail with `InvalidState` before anything is written.
    pub async fn update_status(
        &self,
        order_id: Uuid,
        next: OrderStatus,
    ) -> Result<OrderWithItems, AppError> {
        let mut conn = self.pool.get().await?;

        conn.transaction::<_, AppError, _>(|conn| {
            async move {
                let current = orders::table
                    .find(order_id)
                    .for_update()
                    .select(Order::as_select())
                    .first(conn)
                    .await
                    .optional()?
                    .ok_or_else(|| AppError::not_found("order", "id", order_id))?;

                if !current.status.can_transition_to(next) {
                    return Err(AppError::invalid_state(format!(
                        "Cannot change order status from {} to {}",
                        current.status, next
                    )));
                }

                let items = load_items(conn, &current).await?;
                if next == OrderStatus::Cancelled {
                    restore_stock(conn, &items).await?;
                }

                let order = diesel::update(orders::table.find(order_id))
                    .set((
                        orders::status.eq(next),
                        orders::updated_at.eq(diesel::dsl::now),
                    ))
                    .returning(Order::as_returning())
                    .get_result(conn)
                    .await?;

                Ok(OrderWithItems { order, items })
            }
            .scope_boxed()
        })
        .await
    }

    /// Cancels and deletes a pending order owned by `user_id`, restoring stock.
    ///
    /// # Returns
    /// The removed order with its lines
    pub async fn cancel(&self, order_id: Uuid, user_id: Uuid) -> Result<OrderWithItems, AppError> {
        let mut conn = self.pool.get().await?;

        conn.transaction::<_, AppError, _>(|conn| {
            async move {
                let order = orders::table
                    .find(order_id)
                    .filter(orders::user_id.eq(user_id))
                    .for_update()
                    .select(Order::as_select())
                    .first(conn)
                    .await
                    .optional()?
                    .ok_or_else(|| AppError::not_found("order", "id", order_id))?;

                if order.status != OrderStatus::Pending {
                    return Err(AppError::invalid_state("Cannot cancel non-pending order"));
                }

                let items = load_items(conn, &order).await?;
                restore_stock(conn, &items).await?;

                diesel::delete(orders::table.find(order_id))
                    .execute(conn)
                    .await?;

                Ok(OrderWithItems { order, items })
            }
            .scope_boxed()
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bigdecimal::BigDecimal;

    use crate::db::testing::{create_product, create_user, migrated_pool, stock_of};
    use crate::models::Role;

    fn shipping() -> ShippingAddress {
        ShippingAddress {
            street: "1 Main St".to_string(),
            city: "Springfield".to_string(),
            zip_code: "12345".to_string(),
        }
    }

    fn line(product_id: Uuid, quantity: i32) -> OrderLineRequest {
        OrderLineRequest {
            product_id,
            quantity,
        }
    }

    #[tokio::test]
    #[ignore = "requires PostgreSQL at DATABASE_URL"]
    async fn test_cancel_restores_pre_order_stock() {
        let pool = migrated_pool().await;
        let user = create_user(&pool, Role::User).await;
        let product = create_product(&pool, "Books", "25.00", 10).await;
        let repo = OrderRepository::new(pool.clone());

        let placed = repo
            .create(user.id, vec![line(product.id, 3)], shipping())
            .await
            .unwrap();
        assert_eq!(placed.order.total_amount, BigDecimal::from(75));
        assert_eq!(placed.order.status, OrderStatus::Pending);
        assert_eq!(stock_of(&pool, product.id).await, 7);

        repo.cancel(placed.order.id, user.id).await.unwrap();
        assert_eq!(stock_of(&pool, product.id).await, 10);
        assert!(repo.list_for_user(user.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    #[ignore = "requires PostgreSQL at DATABASE_URL"]
    async fn test_cancelling_a_processing_order_leaves_stock_alone() {
        let pool = migrated_pool().await;
        let user = create_user(&pool, Role::User).await;
        let product = create_product(&pool, "Books", "5.00", 10).await;
        let repo = OrderRepository::new(pool.clone());

        let placed = repo
            .create(user.id, vec![line(product.id, 2)], shipping())
            .await
            .unwrap();
        repo.update_status(placed.order.id, OrderStatus::Processing)
            .await
            .unwrap();

        let result = repo.cancel(placed.order.id, user.id).await;
        assert!(matches!(result, Err(AppError::InvalidState { .. })));
        assert_eq!(stock_of(&pool, product.id).await, 8);
    }

    #[tokio::test]
    #[ignore = "requires PostgreSQL at DATABASE_URL"]
    async fn test_concurrent_orders_cannot_oversell() {
        let pool = migrated_pool().await;
        let user = create_user(&pool, Role::User).await;
        let product = create_product(&pool, "Gaming", "499.99", 10).await;
        let repo = OrderRepository::new(pool.clone());

        let (first, second) = tokio::join!(
            repo.create(user.id, vec![line(product.id, 6)], shipping()),
            repo.create(user.id, vec![line(product.id, 6)], shipping()),
        );
        let results = [first, second];

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(
            results
                .iter()
                .any(|r| matches!(r, Err(AppError::InsufficientStock { .. })))
        );
        assert_eq!(stock_of(&pool, product.id).await, 4);
    }

    #[tokio::test]
    #[ignore = "requires PostgreSQL at DATABASE_URL"]
    async fn test_failed_line_rolls_back_earlier_lines() {
        let pool = migrated_pool().await;
        let user = create_user(&pool, Role::User).await;
        let plenty = create_product(&pool, "Books", "1.00", 50).await;
        let scarce = create_product(&pool, "Books", "1.00", 1).await;
        let repo = OrderRepository::new(pool.clone());

        let result = repo
            .create(
                user.id,
                vec![line(plenty.id, 5), line(scarce.id, 2)],
                shipping(),
            )
            .await;

        assert!(matches!(result, Err(AppError::InsufficientStock { .. })));
        assert_eq!(stock_of(&pool, plenty.id).await, 50);
        assert_eq!(stock_of(&pool, scarce.id).await, 1);
    }

    #[tokio::test]
    #[ignore = "requires PostgreSQL at DATABASE_URL"]
    async fn test_total_beyond_column_is_a_validation_error() {
        let pool = migrated_pool().await;
        let user = create_user(&pool, Role::User).await;
        let product = create_product(&pool, "Luxury", "9999999999.99", 1000).await;
        let repo = OrderRepository::new(pool.clone());

        let result = repo
            .create(user.id, vec![line(product.id, 101)], shipping())
            .await;

        assert!(matches!(result, Err(AppError::Validation { field, .. }) if field == "products"));
        assert_eq!(stock_of(&pool, product.id).await, 1000);
    }
}
