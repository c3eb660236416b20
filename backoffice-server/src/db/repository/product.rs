//! Product Repository

use super::{RepoError, RepoResult, cents};
use crate::order_money::from_cents;
use rust_decimal::Decimal;
use shared::models::{Product, ProductCreate, ProductUpdate};
use sqlx::{SqliteConnection, SqliteExecutor};

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: i64,
    name: String,
    description: Option<String>,
    price_cents: i64,
    stock: i32,
    sku: Option<String>,
    image_url: Option<String>,
    is_active: bool,
    category_id: Option<i64>,
    created_at: i64,
    updated_at: i64,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            price: from_cents(row.price_cents),
            stock: row.stock,
            sku: row.sku,
            image_url: row.image_url,
            is_active: row.is_active,
            category_id: row.category_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

pub async fn find_all<'e, E>(executor: E) -> RepoResult<Vec<Product>>
where
    E: SqliteExecutor<'e>,
{
    let rows = sqlx::query_as::<_, ProductRow>(
        "SELECT id, name, description, price_cents, stock, sku, image_url, is_active, category_id, created_at, updated_at FROM product ORDER BY id",
    )
    .fetch_all(executor)
    .await?;
    Ok(rows.into_iter().map(Product::from).collect())
}

pub async fn find_by_category<'e, E>(executor: E, category_id: i64) -> RepoResult<Vec<Product>>
where
    E: SqliteExecutor<'e>,
{
    let rows = sqlx::query_as::<_, ProductRow>(
        "SELECT id, name, description, price_cents, stock, sku, image_url, is_active, category_id, created_at, updated_at FROM product WHERE category_id = ? ORDER BY id",
    )
    .bind(category_id)
    .fetch_all(executor)
    .await?;
    Ok(rows.into_iter().map(Product::from).collect())
}

pub async fn find_by_id<'e, E>(executor: E, id: i64) -> RepoResult<Option<Product>>
where
    E: SqliteExecutor<'e>,
{
    let row = sqlx::query_as::<_, ProductRow>(
        "SELECT id, name, description, price_cents, stock, sku, image_url, is_active, category_id, created_at, updated_at FROM product WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(executor)
    .await?;
    Ok(row.map(Product::from))
}

/// Current catalog price, used as the default unit price of a new line item
pub async fn find_price<'e, E>(executor: E, id: i64) -> RepoResult<Option<Decimal>>
where
    E: SqliteExecutor<'e>,
{
    let price = sqlx::query_scalar::<_, i64>("SELECT price_cents FROM product WHERE id = ?")
        .bind(id)
        .fetch_optional(executor)
        .await?;
    Ok(price.map(from_cents))
}

pub async fn create<'e, E>(executor: E, data: &ProductCreate) -> RepoResult<Product>
where
    E: SqliteExecutor<'e>,
{
    let now = shared::util::now_millis();
    let row = sqlx::query_as::<_, ProductRow>(
        "INSERT INTO product (name, description, price_cents, stock, sku, image_url, is_active, category_id, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9) RETURNING id, name, description, price_cents, stock, sku, image_url, is_active, category_id, created_at, updated_at",
    )
    .bind(&data.name)
    .bind(&data.description)
    .bind(cents(data.price, "price")?)
    .bind(data.stock.unwrap_or(0))
    .bind(&data.sku)
    .bind(&data.image_url)
    .bind(data.is_active.unwrap_or(true))
    .bind(data.category_id)
    .bind(now)
    .fetch_one(executor)
    .await?;
    Ok(row.into())
}

pub async fn update<'e, E>(executor: E, id: i64, data: &ProductUpdate) -> RepoResult<Product>
where
    E: SqliteExecutor<'e>,
{
    let price_cents = data.price.map(|p| cents(p, "price")).transpose()?;
    let now = shared::util::now_millis();
    let row = sqlx::query_as::<_, ProductRow>(
        "UPDATE product SET name = COALESCE(?1, name), description = COALESCE(?2, description), price_cents = COALESCE(?3, price_cents), stock = COALESCE(?4, stock), sku = COALESCE(?5, sku), image_url = COALESCE(?6, image_url), is_active = COALESCE(?7, is_active), category_id = COALESCE(?8, category_id), updated_at = ?9 WHERE id = ?10 RETURNING id, name, description, price_cents, stock, sku, image_url, is_active, category_id, created_at, updated_at",
    )
    .bind(&data.name)
    .bind(&data.description)
    .bind(price_cents)
    .bind(data.stock)
    .bind(&data.sku)
    .bind(&data.image_url)
    .bind(data.is_active)
    .bind(data.category_id)
    .bind(now)
    .bind(id)
    .fetch_optional(executor)
    .await?
    .ok_or_else(|| RepoError::NotFound(format!("Product {id} not found")))?;
    Ok(row.into())
}

/// Hard delete a product that no order item references
pub async fn delete(conn: &mut SqliteConnection, id: i64) -> RepoResult<bool> {
    let referenced = super::order_item::count_by_product(&mut *conn, id).await?;
    if referenced > 0 {
        return Err(RepoError::Validation(format!(
            "Product {id} is referenced by {referenced} order item(s)"
        )));
    }
    let rows = sqlx::query("DELETE FROM product WHERE id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(rows.rows_affected() > 0)
}

pub async fn count<'e, E>(executor: E) -> RepoResult<i64>
where
    E: SqliteExecutor<'e>,
{
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM product")
        .fetch_one(executor)
        .await?;
    Ok(count)
}
