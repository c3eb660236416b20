//! Category Repository

use super::{RepoError, RepoResult};
use shared::models::{Category, CategoryCreate, CategoryUpdate};
use sqlx::{SqliteConnection, SqliteExecutor};

pub async fn find_all<'e, E>(executor: E) -> RepoResult<Vec<Category>>
where
    E: SqliteExecutor<'e>,
{
    let categories = sqlx::query_as::<_, Category>(
        "SELECT id, name, description, slug, created_at, updated_at FROM category ORDER BY name",
    )
    .fetch_all(executor)
    .await?;
    Ok(categories)
}

pub async fn find_by_id<'e, E>(executor: E, id: i64) -> RepoResult<Option<Category>>
where
    E: SqliteExecutor<'e>,
{
    let category = sqlx::query_as::<_, Category>(
        "SELECT id, name, description, slug, created_at, updated_at FROM category WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(executor)
    .await?;
    Ok(category)
}

pub async fn create<'e, E>(executor: E, data: &CategoryCreate) -> RepoResult<Category>
where
    E: SqliteExecutor<'e>,
{
    let now = shared::util::now_millis();
    let category = sqlx::query_as::<_, Category>(
        "INSERT INTO category (name, description, slug, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?4) RETURNING id, name, description, slug, created_at, updated_at",
    )
    .bind(&data.name)
    .bind(&data.description)
    .bind(&data.slug)
    .bind(now)
    .fetch_one(executor)
    .await?;
    Ok(category)
}

pub async fn update<'e, E>(executor: E, id: i64, data: &CategoryUpdate) -> RepoResult<Category>
where
    E: SqliteExecutor<'e>,
{
    let now = shared::util::now_millis();
    sqlx::query_as::<_, Category>(
        "UPDATE category SET name = COALESCE(?1, name), description = COALESCE(?2, description), slug = COALESCE(?3, slug), updated_at = ?4 WHERE id = ?5 RETURNING id, name, description, slug, created_at, updated_at",
    )
    .bind(&data.name)
    .bind(&data.description)
    .bind(&data.slug)
    .bind(now)
    .bind(id)
    .fetch_optional(executor)
    .await?
    .ok_or_else(|| RepoError::NotFound(format!("Category {id} not found")))
}

/// Hard delete a category that no product references
pub async fn delete(conn: &mut SqliteConnection, id: i64) -> RepoResult<bool> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM product WHERE category_id = ?")
        .bind(id)
        .fetch_one(&mut *conn)
        .await?;
    if count > 0 {
        return Err(RepoError::Validation(
            "Cannot delete category with products".into(),
        ));
    }
    let rows = sqlx::query("DELETE FROM category WHERE id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(rows.rows_affected() > 0)
}

pub async fn count<'e, E>(executor: E) -> RepoResult<i64>
where
    E: SqliteExecutor<'e>,
{
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM category")
        .fetch_one(executor)
        .await?;
    Ok(count)
}
