//! Order Service
//!
//! Every mutation of an order's item set runs in one transaction together
//! with the aggregation event it emits. The transaction's first statement
//! touches the affected order rows, which takes SQLite's write lock before
//! items or the tax rate are read.

use crate::aggregation::{AggregateEvent, AggregationEngine};
use crate::db::repository::order_item::NewOrderItem;
use crate::db::repository::{order, order_item, product};
use crate::order_money::{line_total, round_money};
use crate::utils::validation::{validate_price, validate_quantity};
use crate::utils::{AppError, AppResult};
use shared::models::{
    Order, OrderCreate, OrderItem, OrderItemCreate, OrderItemUpdate, OrderUpdate, OrderWithItems,
};
use sqlx::SqlitePool;
use std::sync::Arc;
use validator::Validate;

#[derive(Debug, Clone)]
pub struct OrderService {
    pool: SqlitePool,
    engine: Arc<AggregationEngine>,
}

impl OrderService {
    pub fn new(pool: SqlitePool, engine: Arc<AggregationEngine>) -> Self {
        Self { pool, engine }
    }

    // =========================================================================
    // Orders
    // =========================================================================

    pub async fn list_orders(&self) -> AppResult<Vec<Order>> {
        Ok(order::find_all(&self.pool).await?)
    }

    pub async fn list_orders_for_user(&self, user_id: i64) -> AppResult<Vec<Order>> {
        Ok(order::find_by_user(&self.pool, user_id).await?)
    }

    pub async fn get_order(&self, id: i64) -> AppResult<Order> {
        order::find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Order {id} not found")))
    }

    pub async fn get_order_with_items(&self, id: i64) -> AppResult<OrderWithItems> {
        let mut conn = self.pool.acquire().await?;
        let order = order::find_by_id(&mut *conn, id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Order {id} not found")))?;
        let items = order_item::find_by_order(&mut *conn, id).await?;
        Ok(OrderWithItems { order, items })
    }

    /// New orders start with all aggregates at 0.00
    pub async fn create_order(&self, data: OrderCreate) -> AppResult<Order> {
        data.validate()?;
        let order = order::create(&self.pool, &data).await?;
        tracing::info!(order_id = order.id, order_number = %order.order_number, "Order created");
        Ok(order)
    }

    pub async fn update_order(&self, id: i64, data: OrderUpdate) -> AppResult<Order> {
        data.validate()?;
        let order = order::update(&self.pool, id, &data).await?;
        tracing::debug!(order_id = id, status = %order.status, "Order updated");
        Ok(order)
    }

    /// Delete an order and, first, every item it owns
    pub async fn delete_order(&self, id: i64) -> AppResult<()> {
        if self.delete_orders(&[id]).await? == 0 {
            return Err(AppError::not_found(format!("Order {id} not found")));
        }
        Ok(())
    }

    /// Delete many orders atomically; unknown ids are ignored.
    ///
    /// Returns the number of orders deleted.
    pub async fn bulk_delete_orders(&self, ids: &[i64]) -> AppResult<u64> {
        self.delete_orders(ids).await
    }

    async fn delete_orders(&self, ids: &[i64]) -> AppResult<u64> {
        let mut tx = self.pool.begin().await?;
        let existing = order::touch_many(&mut tx, ids).await?;
        if existing.is_empty() {
            tx.rollback().await?;
            return Ok(0);
        }

        self.engine
            .handle(&mut tx, &AggregateEvent::OrdersDeleting { order_ids: existing.clone() })
            .await?;
        let deleted = order::delete_many(&mut tx, &existing).await?;
        tx.commit().await?;

        tracing::info!(requested = ids.len(), deleted, "Orders deleted");
        Ok(deleted)
    }

    // =========================================================================
    // Line items
    // =========================================================================

    pub async fn list_items(&self, order_id: i64) -> AppResult<Vec<OrderItem>> {
        let mut conn = self.pool.acquire().await?;
        if order::find_by_id(&mut *conn, order_id).await?.is_none() {
            return Err(AppError::not_found(format!("Order {order_id} not found")));
        }
        Ok(order_item::find_by_order(&mut *conn, order_id).await?)
    }

    pub async fn get_item(&self, id: i64) -> AppResult<OrderItem> {
        order_item::find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Order item {id} not found")))
    }

    /// Add a line item.
    ///
    /// Without an explicit unit price the product's current price is captured.
    /// Without an explicit line total it is `round(unit_price * quantity, 2)`.
    pub async fn add_item(&self, data: OrderItemCreate) -> AppResult<OrderItem> {
        validate_quantity(data.quantity)?;
        if let Some(unit_price) = data.unit_price {
            validate_price(unit_price, "unit_price")?;
        }
        if let Some(total) = data.line_total {
            validate_price(total, "line_total")?;
        }

        let mut tx = self.pool.begin().await?;
        if !order::touch(&mut *tx, data.order_id).await? {
            return Err(AppError::not_found(format!("Order {} not found", data.order_id)));
        }
        // An explicit price skips the lookup; the product_id foreign key still applies
        let unit_price = match data.unit_price {
            Some(price) => round_money(price),
            None => product::find_price(&mut *tx, data.product_id)
                .await?
                .ok_or_else(|| AppError::not_found(format!("Product {} not found", data.product_id)))?,
        };
        let item = order_item::create(
            &mut *tx,
            &NewOrderItem {
                order_id: data.order_id,
                product_id: data.product_id,
                quantity: data.quantity,
                unit_price,
                line_total: data
                    .line_total
                    .map(round_money)
                    .unwrap_or_else(|| line_total(unit_price, data.quantity)),
            },
        )
        .await?;

        self.engine
            .handle(&mut tx, &AggregateEvent::LineItemChanged { order_id: item.order_id })
            .await?;
        tx.commit().await?;

        tracing::debug!(
            order_id = item.order_id,
            item_id = item.id,
            quantity = item.quantity,
            line_total = %item.line_total,
            "Line item added"
        );
        Ok(item)
    }

    /// Change quantity and/or unit price.
    ///
    /// The line total is recomputed when either changes, unless supplied.
    pub async fn update_item(&self, id: i64, data: OrderItemUpdate) -> AppResult<OrderItem> {
        if let Some(quantity) = data.quantity {
            validate_quantity(quantity)?;
        }
        if let Some(unit_price) = data.unit_price {
            validate_price(unit_price, "unit_price")?;
        }
        if let Some(total) = data.line_total {
            validate_price(total, "line_total")?;
        }

        let mut tx = self.pool.begin().await?;
        let order_id = order::touch_for_item(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Order item {id} not found")))?;
        let current = order_item::find_by_id(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Order item {id} not found")))?;

        let quantity = data.quantity.unwrap_or(current.quantity);
        let unit_price = data.unit_price.map(round_money).unwrap_or(current.unit_price);
        let new_total = match data.line_total {
            Some(total) => round_money(total),
            None if data.quantity.is_some() || data.unit_price.is_some() => {
                line_total(unit_price, quantity)
            }
            None => current.line_total,
        };

        let item = order_item::update(&mut *tx, id, quantity, unit_price, new_total).await?;
        self.engine
            .handle(&mut tx, &AggregateEvent::LineItemChanged { order_id })
            .await?;
        tx.commit().await?;

        tracing::debug!(order_id, item_id = id, quantity, line_total = %new_total, "Line item updated");
        Ok(item)
    }

    pub async fn remove_item(&self, id: i64) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;
        let order_id = order::touch_for_item(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Order item {id} not found")))?;
        order_item::delete(&mut *tx, id).await?;
        self.engine
            .handle(&mut tx, &AggregateEvent::LineItemChanged { order_id })
            .await?;
        tx.commit().await?;

        tracing::debug!(order_id, item_id = id, "Line item removed");
        Ok(())
    }

    /// Remove many items; each affected order is recomputed once.
    ///
    /// Returns the number of items removed.
    pub async fn bulk_remove_items(&self, ids: &[i64]) -> AppResult<u64> {
        let mut tx = self.pool.begin().await?;
        let order_ids = order::touch_for_items(&mut tx, ids).await?;
        let removed = order_item::delete_many(&mut tx, ids).await?;
        for order_id in &order_ids {
            self.engine
                .handle(&mut tx, &AggregateEvent::LineItemChanged { order_id: *order_id })
                .await?;
        }
        tx.commit().await?;

        tracing::info!(removed, orders = order_ids.len(), "Line items bulk removed");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use crate::db::repository::setting;
    use rust_decimal::Decimal;
    use shared::models::{GLOBAL_TAX_RATE_KEY, OrderStatus, ProductCreate, SettingType};
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    async fn setup(rate: Option<&str>) -> (SqlitePool, OrderService) {
        let db = DbService::open_in_memory().await.unwrap();
        if let Some(rate) = rate {
            setting::create(&db.pool, GLOBAL_TAX_RATE_KEY, Some(rate), SettingType::Number, None)
                .await
                .unwrap();
        }
        let engine = Arc::new(AggregationEngine::with_settings_rate(db.pool.clone(), 100));
        (db.pool.clone(), OrderService::new(db.pool, engine))
    }

    async fn seed_product(pool: &SqlitePool, price: &str) -> i64 {
        product::create(
            pool,
            &ProductCreate {
                name: format!("Item @ {price}"),
                description: None,
                price: dec(price),
                stock: Some(100),
                sku: None,
                image_url: None,
                is_active: None,
                category_id: None,
            },
        )
        .await
        .unwrap()
        .id
    }

    fn item(order_id: i64, product_id: i64, quantity: i32) -> OrderItemCreate {
        OrderItemCreate {
            order_id,
            product_id,
            quantity,
            unit_price: None,
            line_total: None,
        }
    }

    #[tokio::test]
    async fn test_new_order_has_zero_aggregates_and_number() {
        let (_pool, svc) = setup(Some("8")).await;
        let order = svc.create_order(OrderCreate::default()).await.unwrap();
        assert_eq!(order.subtotal, Decimal::ZERO);
        assert_eq!(order.tax_amount, Decimal::ZERO);
        assert_eq!(order.total_amount, Decimal::ZERO);
        assert_eq!(order.status, OrderStatus::Pending);
        assert!(order.order_number.starts_with("ORD-"));
        assert!(order.order_number.ends_with("-000001"));

        let second = svc.create_order(OrderCreate::default()).await.unwrap();
        assert_ne!(order.order_number, second.order_number);
    }

    #[tokio::test]
    async fn test_quantity_edit_scenario() {
        let (pool, svc) = setup(Some("8")).await;
        let product_id = seed_product(&pool, "25.00").await;
        let order = svc.create_order(OrderCreate::default()).await.unwrap();

        let line = svc.add_item(item(order.id, product_id, 2)).await.unwrap();
        assert_eq!(line.unit_price, dec("25.00"));
        assert_eq!(line.line_total, dec("50.00"));
        let o = svc.get_order(order.id).await.unwrap();
        assert_eq!((o.subtotal, o.tax_amount, o.total_amount), (dec("50.00"), dec("4.00"), dec("54.00")));

        let line = svc
            .update_item(
                line.id,
                OrderItemUpdate {
                    quantity: Some(3),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(line.line_total, dec("75.00"));
        let o = svc.get_order(order.id).await.unwrap();
        assert_eq!((o.subtotal, o.tax_amount, o.total_amount), (dec("75.00"), dec("6.00"), dec("81.00")));
    }

    #[tokio::test]
    async fn test_unit_price_is_a_snapshot() {
        let (pool, svc) = setup(None).await;
        let product_id = seed_product(&pool, "10.00").await;
        let order = svc.create_order(OrderCreate::default()).await.unwrap();
        let line = svc.add_item(item(order.id, product_id, 1)).await.unwrap();

        product::update(
            &pool,
            product_id,
            &shared::models::ProductUpdate {
                price: Some(dec("99.00")),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(svc.get_item(line.id).await.unwrap().unit_price, dec("10.00"));
        assert_eq!(svc.get_order(order.id).await.unwrap().total_amount, dec("10.00"));
    }

    #[tokio::test]
    async fn test_explicit_prices_are_kept() {
        let (pool, svc) = setup(None).await;
        let product_id = seed_product(&pool, "10.00").await;
        let order = svc.create_order(OrderCreate::default()).await.unwrap();

        let discounted = svc
            .add_item(OrderItemCreate {
                unit_price: Some(dec("19.99")),
                ..item(order.id, product_id, 3)
            })
            .await
            .unwrap();
        assert_eq!(discounted.line_total, dec("59.97"));

        let bundled = svc
            .add_item(OrderItemCreate {
                line_total: Some(dec("15.00")),
                ..item(order.id, product_id, 2)
            })
            .await
            .unwrap();
        assert_eq!(bundled.unit_price, dec("10.00"));
        assert_eq!(bundled.line_total, dec("15.00"));

        assert_eq!(svc.get_order(order.id).await.unwrap().subtotal, dec("74.97"));
    }

    #[tokio::test]
    async fn test_invalid_items_are_rejected_without_side_effects() {
        let (pool, svc) = setup(Some("10")).await;
        let product_id = seed_product(&pool, "5.00").await;
        let order = svc.create_order(OrderCreate::default()).await.unwrap();
        svc.add_item(item(order.id, product_id, 1)).await.unwrap();

        let err = svc.add_item(item(order.id, product_id, 0)).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let err = svc
            .add_item(OrderItemCreate {
                unit_price: Some(dec("-1")),
                ..item(order.id, product_id, 1)
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let err = svc.add_item(item(order.id, 999, 1)).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let err = svc.add_item(item(999, product_id, 1)).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let err = svc
            .add_item(OrderItemCreate {
                unit_price: Some(dec("5.00")),
                ..item(order.id, 999, 1)
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let with_items = svc.get_order_with_items(order.id).await.unwrap();
        assert_eq!(with_items.items.len(), 1);
        assert_eq!(with_items.order.total_amount, dec("5.50"));
    }

    #[tokio::test]
    async fn test_remove_and_bulk_remove_recompute() {
        let (pool, svc) = setup(Some("10")).await;
        let product_id = seed_product(&pool, "10.00").await;
        let a = svc.create_order(OrderCreate::default()).await.unwrap();
        let b = svc.create_order(OrderCreate::default()).await.unwrap();

        let a1 = svc.add_item(item(a.id, product_id, 1)).await.unwrap();
        let a2 = svc.add_item(item(a.id, product_id, 2)).await.unwrap();
        let b1 = svc.add_item(item(b.id, product_id, 3)).await.unwrap();
        svc.add_item(item(b.id, product_id, 4)).await.unwrap();

        svc.remove_item(a1.id).await.unwrap();
        let oa = svc.get_order(a.id).await.unwrap();
        assert_eq!((oa.subtotal, oa.total_amount), (dec("20.00"), dec("22.00")));
        assert!(matches!(svc.remove_item(a1.id).await, Err(AppError::NotFound(_))));

        let removed = svc.bulk_remove_items(&[a2.id, b1.id, 12345]).await.unwrap();
        assert_eq!(removed, 2);

        let oa = svc.get_order(a.id).await.unwrap();
        assert_eq!((oa.subtotal, oa.tax_amount, oa.total_amount), (Decimal::ZERO, Decimal::ZERO, Decimal::ZERO));
        let ob = svc.get_order(b.id).await.unwrap();
        assert_eq!((ob.subtotal, ob.tax_amount, ob.total_amount), (dec("40.00"), dec("4.00"), dec("44.00")));
    }

    #[tokio::test]
    async fn test_delete_order_cascades_items() {
        let (pool, svc) = setup(None).await;
        let product_id = seed_product(&pool, "2.00").await;
        let order = svc.create_order(OrderCreate::default()).await.unwrap();
        let mut item_ids = Vec::new();
        for qty in 1..=4 {
            item_ids.push(svc.add_item(item(order.id, product_id, qty)).await.unwrap().id);
        }

        svc.delete_order(order.id).await.unwrap();

        assert!(matches!(svc.get_order(order.id).await, Err(AppError::NotFound(_))));
        for id in item_ids {
            assert!(matches!(svc.get_item(id).await, Err(AppError::NotFound(_))));
        }
        assert_eq!(order_item::count_by_order(&pool, order.id).await.unwrap(), 0);
        assert!(matches!(svc.delete_order(order.id).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_bulk_delete_orders() {
        let (pool, svc) = setup(None).await;
        let product_id = seed_product(&pool, "2.00").await;
        let mut ids = Vec::new();
        for _ in 0..3 {
            let order = svc.create_order(OrderCreate::default()).await.unwrap();
            svc.add_item(item(order.id, product_id, 2)).await.unwrap();
            ids.push(order.id);
        }
        let survivor = ids.pop().unwrap();
        ids.push(4242);

        assert_eq!(svc.bulk_delete_orders(&ids).await.unwrap(), 2);
        let remaining = svc.list_orders().await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, survivor);
        assert_eq!(svc.list_items(survivor).await.unwrap().len(), 1);
        assert_eq!(svc.bulk_delete_orders(&[]).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_update_order_leaves_aggregates() {
        let (pool, svc) = setup(Some("5")).await;
        let product_id = seed_product(&pool, "20.00").await;
        let order = svc.create_order(OrderCreate::default()).await.unwrap();
        svc.add_item(item(order.id, product_id, 1)).await.unwrap();

        let updated = svc
            .update_order(
                order.id,
                OrderUpdate {
                    status: Some(OrderStatus::Shipped),
                    tracking_number: Some("TRK-1".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.status, OrderStatus::Shipped);
        assert_eq!(updated.tracking_number.as_deref(), Some("TRK-1"));
        assert_eq!(updated.total_amount, dec("21.00"));
    }
}
