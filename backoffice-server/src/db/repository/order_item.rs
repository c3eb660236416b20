//! Order Item Repository

use super::{MAX_BIND_IDS, RepoError, RepoResult, cents, push_id_list};
use crate::order_money::from_cents;
use rust_decimal::Decimal;
use shared::models::OrderItem;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqliteExecutor};

#[derive(Debug, sqlx::FromRow)]
struct OrderItemRow {
    id: i64,
    order_id: i64,
    product_id: i64,
    quantity: i32,
    unit_price_cents: i64,
    line_total_cents: i64,
    created_at: i64,
    updated_at: i64,
}

impl From<OrderItemRow> for OrderItem {
    fn from(row: OrderItemRow) -> Self {
        Self {
            id: row.id,
            order_id: row.order_id,
            product_id: row.product_id,
            quantity: row.quantity,
            unit_price: from_cents(row.unit_price_cents),
            line_total: from_cents(row.line_total_cents),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// A fully resolved line item ready to be written
#[derive(Debug, Clone, Copy)]
pub struct NewOrderItem {
    pub order_id: i64,
    pub product_id: i64,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub line_total: Decimal,
}

pub async fn find_by_id<'e, E>(executor: E, id: i64) -> RepoResult<Option<OrderItem>>
where
    E: SqliteExecutor<'e>,
{
    let row = sqlx::query_as::<_, OrderItemRow>(
        "SELECT id, order_id, product_id, quantity, unit_price_cents, line_total_cents, created_at, updated_at FROM order_item WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(executor)
    .await?;
    Ok(row.map(OrderItem::from))
}

pub async fn find_by_order<'e, E>(executor: E, order_id: i64) -> RepoResult<Vec<OrderItem>>
where
    E: SqliteExecutor<'e>,
{
    let rows = sqlx::query_as::<_, OrderItemRow>(
        "SELECT id, order_id, product_id, quantity, unit_price_cents, line_total_cents, created_at, updated_at FROM order_item WHERE order_id = ? ORDER BY id",
    )
    .bind(order_id)
    .fetch_all(executor)
    .await?;
    Ok(rows.into_iter().map(OrderItem::from).collect())
}

/// Line totals of every item owned by the order
pub async fn line_totals<'e, E>(executor: E, order_id: i64) -> RepoResult<Vec<Decimal>>
where
    E: SqliteExecutor<'e>,
{
    let totals = sqlx::query_scalar::<_, i64>(
        "SELECT line_total_cents FROM order_item WHERE order_id = ? ORDER BY id",
    )
    .bind(order_id)
    .fetch_all(executor)
    .await?;
    Ok(totals.into_iter().map(from_cents).collect())
}

pub async fn create<'e, E>(executor: E, item: &NewOrderItem) -> RepoResult<OrderItem>
where
    E: SqliteExecutor<'e>,
{
    let now = shared::util::now_millis();
    let row = sqlx::query_as::<_, OrderItemRow>(
        "INSERT INTO order_item (order_id, product_id, quantity, unit_price_cents, line_total_cents, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6) RETURNING id, order_id, product_id, quantity, unit_price_cents, line_total_cents, created_at, updated_at",
    )
    .bind(item.order_id)
    .bind(item.product_id)
    .bind(item.quantity)
    .bind(cents(item.unit_price, "unit_price")?)
    .bind(cents(item.line_total, "line_total")?)
    .bind(now)
    .fetch_one(executor)
    .await?;
    Ok(row.into())
}

/// Overwrite quantity, unit price and line total of one item
pub async fn update<'e, E>(
    executor: E,
    id: i64,
    quantity: i32,
    unit_price: Decimal,
    line_total: Decimal,
) -> RepoResult<OrderItem>
where
    E: SqliteExecutor<'e>,
{
    let row = sqlx::query_as::<_, OrderItemRow>(
        "UPDATE order_item SET quantity = ?1, unit_price_cents = ?2, line_total_cents = ?3, updated_at = ?4 WHERE id = ?5 RETURNING id, order_id, product_id, quantity, unit_price_cents, line_total_cents, created_at, updated_at",
    )
    .bind(quantity)
    .bind(cents(unit_price, "unit_price")?)
    .bind(cents(line_total, "line_total")?)
    .bind(shared::util::now_millis())
    .bind(id)
    .fetch_optional(executor)
    .await?
    .ok_or_else(|| RepoError::NotFound(format!("Order item {id} not found")))?;
    Ok(row.into())
}

pub async fn delete<'e, E>(executor: E, id: i64) -> RepoResult<bool>
where
    E: SqliteExecutor<'e>,
{
    let rows = sqlx::query("DELETE FROM order_item WHERE id = ?")
        .bind(id)
        .execute(executor)
        .await?;
    Ok(rows.rows_affected() > 0)
}

pub async fn delete_many(conn: &mut SqliteConnection, ids: &[i64]) -> RepoResult<u64> {
    let mut deleted = 0;
    for chunk in ids.chunks(MAX_BIND_IDS) {
        let mut qb = QueryBuilder::<Sqlite>::new("DELETE FROM order_item WHERE id IN ");
        push_id_list(&mut qb, chunk);
        deleted += qb.build().execute(&mut *conn).await?.rows_affected();
    }
    Ok(deleted)
}

/// Delete every item owned by one of `order_ids`
pub async fn delete_by_orders(conn: &mut SqliteConnection, order_ids: &[i64]) -> RepoResult<u64> {
    let mut deleted = 0;
    for chunk in order_ids.chunks(MAX_BIND_IDS) {
        let mut qb = QueryBuilder::<Sqlite>::new("DELETE FROM order_item WHERE order_id IN ");
        push_id_list(&mut qb, chunk);
        deleted += qb.build().execute(&mut *conn).await?.rows_affected();
    }
    Ok(deleted)
}

pub async fn count_by_order<'e, E>(executor: E, order_id: i64) -> RepoResult<i64>
where
    E: SqliteExecutor<'e>,
{
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM order_item WHERE order_id = ?")
        .bind(order_id)
        .fetch_one(executor)
        .await?;
    Ok(count)
}

pub async fn count_by_product<'e, E>(executor: E, product_id: i64) -> RepoResult<i64>
where
    E: SqliteExecutor<'e>,
{
    let count =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM order_item WHERE product_id = ?")
            .bind(product_id)
            .fetch_one(executor)
            .await?;
    Ok(count)
}
