//! Order Repository
//!
//! Aggregate columns (`subtotal_cents`, `tax_amount_cents`, `total_amount_cents`)
//! are only ever written through [`write_aggregates`].
//!
//! The `touch*` functions bump `updated_at` and are meant to be the first
//! statement of a transaction: SQLite hands out its write lock on the first
//! write, so everything read afterwards belongs to one consistent snapshot.

use super::{MAX_BIND_IDS, RepoError, RepoResult, push_id_list};
use crate::order_money::{OrderTotals, from_cents};
use rust_decimal::Decimal;
use shared::models::{Order, OrderCreate, OrderStatus, OrderUpdate};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqliteExecutor};

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: i64,
    order_number: String,
    user_id: Option<i64>,
    order_date: i64,
    status: OrderStatus,
    shipping_address: Option<String>,
    payment_method: Option<String>,
    tracking_number: Option<String>,
    notes: Option<String>,
    subtotal_cents: i64,
    tax_amount_cents: i64,
    total_amount_cents: i64,
    created_at: i64,
    updated_at: i64,
}

impl From<OrderRow> for Order {
    fn from(row: OrderRow) -> Self {
        Self {
            id: row.id,
            order_number: row.order_number,
            user_id: row.user_id,
            order_date: row.order_date,
            status: row.status,
            shipping_address: row.shipping_address,
            payment_method: row.payment_method,
            tracking_number: row.tracking_number,
            notes: row.notes,
            subtotal: from_cents(row.subtotal_cents),
            tax_amount: from_cents(row.tax_amount_cents),
            total_amount: from_cents(row.total_amount_cents),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Stored aggregates next to the subtotal re-derived from the order's items
#[derive(Debug, Clone, Copy, sqlx::FromRow)]
struct DriftRow {
    id: i64,
    subtotal_cents: i64,
    tax_amount_cents: i64,
    total_amount_cents: i64,
    item_subtotal_cents: i64,
}

#[derive(Debug, Clone, Copy)]
pub struct AggregateSnapshot {
    pub id: i64,
    pub stored: OrderTotals,
    pub item_subtotal: Decimal,
}

pub async fn find_all<'e, E>(executor: E) -> RepoResult<Vec<Order>>
where
    E: SqliteExecutor<'e>,
{
    let rows = sqlx::query_as::<_, OrderRow>(
        "SELECT id, order_number, user_id, order_date, status, shipping_address, payment_method, tracking_number, notes, subtotal_cents, tax_amount_cents, total_amount_cents, created_at, updated_at FROM orders ORDER BY order_date DESC, id DESC",
    )
    .fetch_all(executor)
    .await?;
    Ok(rows.into_iter().map(Order::from).collect())
}

pub async fn find_by_user<'e, E>(executor: E, user_id: i64) -> RepoResult<Vec<Order>>
where
    E: SqliteExecutor<'e>,
{
    let rows = sqlx::query_as::<_, OrderRow>(
        "SELECT id, order_number, user_id, order_date, status, shipping_address, payment_method, tracking_number, notes, subtotal_cents, tax_amount_cents, total_amount_cents, created_at, updated_at FROM orders WHERE user_id = ? ORDER BY order_date DESC, id DESC",
    )
    .bind(user_id)
    .fetch_all(executor)
    .await?;
    Ok(rows.into_iter().map(Order::from).collect())
}

pub async fn find_by_id<'e, E>(executor: E, id: i64) -> RepoResult<Option<Order>>
where
    E: SqliteExecutor<'e>,
{
    let row = sqlx::query_as::<_, OrderRow>(
        "SELECT id, order_number, user_id, order_date, status, shipping_address, payment_method, tracking_number, notes, subtotal_cents, tax_amount_cents, total_amount_cents, created_at, updated_at FROM orders WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(executor)
    .await?;
    Ok(row.map(Order::from))
}

/// Insert an order with zeroed aggregates.
///
/// Without an explicit number, one is generated as `ORD-YYYYMMDD-NNNNNN` from
/// the next AUTOINCREMENT value of the table.
pub async fn create<'e, E>(executor: E, data: &OrderCreate) -> RepoResult<Order>
where
    E: SqliteExecutor<'e>,
{
    let now = shared::util::now_millis();
    let order_date = data.order_date.unwrap_or(now);
    let row = sqlx::query_as::<_, OrderRow>(
        "INSERT INTO orders (order_number, user_id, order_date, status, shipping_address, payment_method, tracking_number, notes, subtotal_cents, tax_amount_cents, total_amount_cents, created_at, updated_at) \
         VALUES (COALESCE(?1, 'ORD-' || ?2 || '-' || printf('%06d', COALESCE((SELECT seq FROM sqlite_sequence WHERE name = 'orders'), 0) + 1)), ?3, ?4, ?5, ?6, ?7, ?8, ?9, 0, 0, 0, ?10, ?10) \
         RETURNING id, order_number, user_id, order_date, status, shipping_address, payment_method, tracking_number, notes, subtotal_cents, tax_amount_cents, total_amount_cents, created_at, updated_at",
    )
    .bind(&data.order_number)
    .bind(shared::util::date_stamp(order_date))
    .bind(data.user_id)
    .bind(order_date)
    .bind(data.status.unwrap_or_default())
    .bind(&data.shipping_address)
    .bind(&data.payment_method)
    .bind(&data.tracking_number)
    .bind(&data.notes)
    .bind(now)
    .fetch_one(executor)
    .await?;
    Ok(row.into())
}

/// Update pass-through fields and status; aggregates are left alone
pub async fn update<'e, E>(executor: E, id: i64, data: &OrderUpdate) -> RepoResult<Order>
where
    E: SqliteExecutor<'e>,
{
    let now = shared::util::now_millis();
    let row = sqlx::query_as::<_, OrderRow>(
        "UPDATE orders SET user_id = COALESCE(?1, user_id), status = COALESCE(?2, status), shipping_address = COALESCE(?3, shipping_address), payment_method = COALESCE(?4, payment_method), tracking_number = COALESCE(?5, tracking_number), notes = COALESCE(?6, notes), updated_at = ?7 WHERE id = ?8 \
         RETURNING id, order_number, user_id, order_date, status, shipping_address, payment_method, tracking_number, notes, subtotal_cents, tax_amount_cents, total_amount_cents, created_at, updated_at",
    )
    .bind(data.user_id)
    .bind(data.status)
    .bind(&data.shipping_address)
    .bind(&data.payment_method)
    .bind(&data.tracking_number)
    .bind(&data.notes)
    .bind(now)
    .bind(id)
    .fetch_optional(executor)
    .await?
    .ok_or_else(|| RepoError::NotFound(format!("Order {id} not found")))?;
    Ok(row.into())
}

/// Take the write lock on one order. Returns false when it does not exist.
pub async fn touch<'e, E>(executor: E, id: i64) -> RepoResult<bool>
where
    E: SqliteExecutor<'e>,
{
    let rows = sqlx::query("UPDATE orders SET updated_at = ? WHERE id = ?")
        .bind(shared::util::now_millis())
        .bind(id)
        .execute(executor)
        .await?;
    Ok(rows.rows_affected() > 0)
}

/// Touch the order owning `item_id`, returning its id
pub async fn touch_for_item<'e, E>(executor: E, item_id: i64) -> RepoResult<Option<i64>>
where
    E: SqliteExecutor<'e>,
{
    let order_id = sqlx::query_scalar::<_, i64>(
        "UPDATE orders SET updated_at = ?1 WHERE id = (SELECT order_id FROM order_item WHERE id = ?2) RETURNING id",
    )
    .bind(shared::util::now_millis())
    .bind(item_id)
    .fetch_optional(executor)
    .await?;
    Ok(order_id)
}

/// Touch every order owning one of `item_ids`, returning the distinct order ids
pub async fn touch_for_items(conn: &mut SqliteConnection, item_ids: &[i64]) -> RepoResult<Vec<i64>> {
    let now = shared::util::now_millis();
    let mut order_ids = Vec::new();
    for chunk in item_ids.chunks(MAX_BIND_IDS) {
        let mut qb = QueryBuilder::<Sqlite>::new("UPDATE orders SET updated_at = ");
        qb.push_bind(now);
        qb.push(" WHERE id IN (SELECT order_id FROM order_item WHERE id IN ");
        push_id_list(&mut qb, chunk);
        qb.push(") RETURNING id");
        let ids: Vec<i64> = qb.build_query_scalar().fetch_all(&mut *conn).await?;
        order_ids.extend(ids);
    }
    order_ids.sort_unstable();
    order_ids.dedup();
    Ok(order_ids)
}

/// Touch the given orders, returning the ids that exist
pub async fn touch_many(conn: &mut SqliteConnection, ids: &[i64]) -> RepoResult<Vec<i64>> {
    let now = shared::util::now_millis();
    let mut existing = Vec::with_capacity(ids.len());
    for chunk in ids.chunks(MAX_BIND_IDS) {
        let mut qb = QueryBuilder::<Sqlite>::new("UPDATE orders SET updated_at = ");
        qb.push_bind(now);
        qb.push(" WHERE id IN ");
        push_id_list(&mut qb, chunk);
        qb.push(" RETURNING id");
        let found: Vec<i64> = qb.build_query_scalar().fetch_all(&mut *conn).await?;
        existing.extend(found);
    }
    existing.sort_unstable();
    existing.dedup();
    Ok(existing)
}

/// Touch the next `limit` orders after `after_id` (sweep batch lock)
pub async fn touch_range<'e, E>(executor: E, after_id: i64, limit: i64) -> RepoResult<u64>
where
    E: SqliteExecutor<'e>,
{
    let rows = sqlx::query(
        "UPDATE orders SET updated_at = ?1 WHERE id IN (SELECT id FROM orders WHERE id > ?2 ORDER BY id LIMIT ?3)",
    )
    .bind(shared::util::now_millis())
    .bind(after_id)
    .bind(limit)
    .execute(executor)
    .await?;
    Ok(rows.rows_affected())
}

/// `(id, stored subtotal)` for the next `limit` orders after `after_id`
pub async fn list_subtotals_after<'e, E>(
    executor: E,
    after_id: i64,
    limit: i64,
) -> RepoResult<Vec<(i64, Decimal)>>
where
    E: SqliteExecutor<'e>,
{
    let rows = sqlx::query_as::<_, (i64, i64)>(
        "SELECT id, subtotal_cents FROM orders WHERE id > ? ORDER BY id LIMIT ?",
    )
    .bind(after_id)
    .bind(limit)
    .fetch_all(executor)
    .await?;
    Ok(rows
        .into_iter()
        .map(|(id, subtotal)| (id, from_cents(subtotal)))
        .collect())
}

/// Stored aggregates plus the item-derived subtotal for the next batch
pub async fn list_snapshots_after<'e, E>(
    executor: E,
    after_id: i64,
    limit: i64,
) -> RepoResult<Vec<AggregateSnapshot>>
where
    E: SqliteExecutor<'e>,
{
    let rows = sqlx::query_as::<_, DriftRow>(
        "SELECT o.id, o.subtotal_cents, o.tax_amount_cents, o.total_amount_cents, \
         COALESCE((SELECT SUM(i.line_total_cents) FROM order_item i WHERE i.order_id = o.id), 0) AS item_subtotal_cents \
         FROM orders o WHERE o.id > ? ORDER BY o.id LIMIT ?",
    )
    .bind(after_id)
    .bind(limit)
    .fetch_all(executor)
    .await?;
    Ok(rows
        .into_iter()
        .map(|row| AggregateSnapshot {
            id: row.id,
            stored: OrderTotals {
                subtotal: from_cents(row.subtotal_cents),
                tax_amount: from_cents(row.tax_amount_cents),
                total_amount: from_cents(row.total_amount_cents),
            },
            item_subtotal: from_cents(row.item_subtotal_cents),
        })
        .collect())
}

/// Write all three aggregate fields in one statement
pub async fn write_aggregates<'e, E>(executor: E, id: i64, totals: &OrderTotals) -> RepoResult<bool>
where
    E: SqliteExecutor<'e>,
{
    let rows = sqlx::query(
        "UPDATE orders SET subtotal_cents = ?1, tax_amount_cents = ?2, total_amount_cents = ?3, updated_at = ?4 WHERE id = ?5",
    )
    .bind(super::cents(totals.subtotal, "subtotal")?)
    .bind(super::cents(totals.tax_amount, "tax_amount")?)
    .bind(super::cents(totals.total_amount, "total_amount")?)
    .bind(shared::util::now_millis())
    .bind(id)
    .execute(executor)
    .await?;
    Ok(rows.rows_affected() > 0)
}

/// Delete order rows. Items must already be gone.
pub async fn delete_many(conn: &mut SqliteConnection, ids: &[i64]) -> RepoResult<u64> {
    let mut deleted = 0;
    for chunk in ids.chunks(MAX_BIND_IDS) {
        let mut qb = QueryBuilder::<Sqlite>::new("DELETE FROM orders WHERE id IN ");
        push_id_list(&mut qb, chunk);
        deleted += qb.build().execute(&mut *conn).await?.rows_affected();
    }
    Ok(deleted)
}

pub async fn count<'e, E>(executor: E) -> RepoResult<i64>
where
    E: SqliteExecutor<'e>,
{
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM orders")
        .fetch_one(executor)
        .await?;
    Ok(count)
}

/// Sum of all order totals
pub async fn sum_total<'e, E>(executor: E) -> RepoResult<Decimal>
where
    E: SqliteExecutor<'e>,
{
    let cents = sqlx::query_scalar::<_, i64>(
        "SELECT COALESCE(SUM(total_amount_cents), 0) FROM orders",
    )
    .fetch_one(executor)
    .await?;
    Ok(from_cents(cents))
}
