//! Setting Repository

use super::{RepoError, RepoResult};
use shared::models::{Setting, SettingType};
use sqlx::SqliteExecutor;

pub async fn find_all<'e, E>(executor: E) -> RepoResult<Vec<Setting>>
where
    E: SqliteExecutor<'e>,
{
    let settings = sqlx::query_as::<_, Setting>(
        "SELECT id, key, value, value_type, description, created_at, updated_at FROM setting ORDER BY key",
    )
    .fetch_all(executor)
    .await?;
    Ok(settings)
}

pub async fn find_by_id<'e, E>(executor: E, id: i64) -> RepoResult<Option<Setting>>
where
    E: SqliteExecutor<'e>,
{
    let setting = sqlx::query_as::<_, Setting>(
        "SELECT id, key, value, value_type, description, created_at, updated_at FROM setting WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(executor)
    .await?;
    Ok(setting)
}

pub async fn find_by_key<'e, E>(executor: E, key: &str) -> RepoResult<Option<Setting>>
where
    E: SqliteExecutor<'e>,
{
    let setting = sqlx::query_as::<_, Setting>(
        "SELECT id, key, value, value_type, description, created_at, updated_at FROM setting WHERE key = ?",
    )
    .bind(key)
    .fetch_optional(executor)
    .await?;
    Ok(setting)
}

/// Raw value for `key`; `None` when the row is absent or its value is NULL
pub async fn get_value<'e, E>(executor: E, key: &str) -> RepoResult<Option<String>>
where
    E: SqliteExecutor<'e>,
{
    let value = sqlx::query_scalar::<_, Option<String>>("SELECT value FROM setting WHERE key = ?")
        .bind(key)
        .fetch_optional(executor)
        .await?;
    Ok(value.flatten())
}

pub async fn create<'e, E>(
    executor: E,
    key: &str,
    value: Option<&str>,
    value_type: SettingType,
    description: Option<&str>,
) -> RepoResult<Setting>
where
    E: SqliteExecutor<'e>,
{
    let now = shared::util::now_millis();
    let setting = sqlx::query_as::<_, Setting>(
        "INSERT INTO setting (key, value, value_type, description, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?5) RETURNING id, key, value, value_type, description, created_at, updated_at",
    )
    .bind(key)
    .bind(value)
    .bind(value_type)
    .bind(description)
    .bind(now)
    .fetch_one(executor)
    .await?;
    Ok(setting)
}

/// Update value, type and description. The key never changes.
pub async fn update<'e, E>(
    executor: E,
    id: i64,
    value: Option<&str>,
    value_type: Option<SettingType>,
    description: Option<&str>,
) -> RepoResult<Setting>
where
    E: SqliteExecutor<'e>,
{
    let now = shared::util::now_millis();
    sqlx::query_as::<_, Setting>(
        "UPDATE setting SET value = COALESCE(?1, value), value_type = COALESCE(?2, value_type), description = COALESCE(?3, description), updated_at = ?4 WHERE id = ?5 RETURNING id, key, value, value_type, description, created_at, updated_at",
    )
    .bind(value)
    .bind(value_type)
    .bind(description)
    .bind(now)
    .bind(id)
    .fetch_optional(executor)
    .await?
    .ok_or_else(|| RepoError::NotFound(format!("Setting {id} not found")))
}

/// Delete a setting, returning the deleted key
pub async fn delete<'e, E>(executor: E, id: i64) -> RepoResult<Option<String>>
where
    E: SqliteExecutor<'e>,
{
    let key = sqlx::query_scalar::<_, String>("DELETE FROM setting WHERE id = ? RETURNING key")
        .bind(id)
        .fetch_optional(executor)
        .await?;
    Ok(key)
}
