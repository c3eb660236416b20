//! User Repository

use super::{RepoError, RepoResult};
use shared::models::{Role, User};
use sqlx::{SqliteConnection, SqliteExecutor};

pub async fn find_all<'e, E>(executor: E) -> RepoResult<Vec<User>>
where
    E: SqliteExecutor<'e>,
{
    let users = sqlx::query_as::<_, User>(
        "SELECT id, name, email, password_hash, role, created_at, updated_at FROM app_user ORDER BY id",
    )
    .fetch_all(executor)
    .await?;
    Ok(users)
}

pub async fn find_by_id<'e, E>(executor: E, id: i64) -> RepoResult<Option<User>>
where
    E: SqliteExecutor<'e>,
{
    let user = sqlx::query_as::<_, User>(
        "SELECT id, name, email, password_hash, role, created_at, updated_at FROM app_user WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(executor)
    .await?;
    Ok(user)
}

pub async fn find_by_email<'e, E>(executor: E, email: &str) -> RepoResult<Option<User>>
where
    E: SqliteExecutor<'e>,
{
    let user = sqlx::query_as::<_, User>(
        "SELECT id, name, email, password_hash, role, created_at, updated_at FROM app_user WHERE email = ? LIMIT 1",
    )
    .bind(email)
    .fetch_optional(executor)
    .await?;
    Ok(user)
}

pub async fn create<'e, E>(
    executor: E,
    name: &str,
    email: &str,
    password_hash: &str,
    role: Role,
) -> RepoResult<User>
where
    E: SqliteExecutor<'e>,
{
    let now = shared::util::now_millis();
    let user = sqlx::query_as::<_, User>(
        "INSERT INTO app_user (name, email, password_hash, role, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?5) RETURNING id, name, email, password_hash, role, created_at, updated_at",
    )
    .bind(name)
    .bind(email)
    .bind(password_hash)
    .bind(role)
    .bind(now)
    .fetch_one(executor)
    .await?;
    Ok(user)
}

pub async fn update<'e, E>(
    executor: E,
    id: i64,
    name: Option<&str>,
    email: Option<&str>,
    password_hash: Option<&str>,
    role: Option<Role>,
) -> RepoResult<User>
where
    E: SqliteExecutor<'e>,
{
    let now = shared::util::now_millis();
    sqlx::query_as::<_, User>(
        "UPDATE app_user SET name = COALESCE(?1, name), email = COALESCE(?2, email), password_hash = COALESCE(?3, password_hash), role = COALESCE(?4, role), updated_at = ?5 WHERE id = ?6 RETURNING id, name, email, password_hash, role, created_at, updated_at",
    )
    .bind(name)
    .bind(email)
    .bind(password_hash)
    .bind(role)
    .bind(now)
    .bind(id)
    .fetch_optional(executor)
    .await?
    .ok_or_else(|| RepoError::NotFound(format!("User {id} not found")))
}

/// Delete a user, detaching their orders first
pub async fn delete(conn: &mut SqliteConnection, id: i64) -> RepoResult<bool> {
    let now = shared::util::now_millis();
    sqlx::query("UPDATE orders SET user_id = NULL, updated_at = ?1 WHERE user_id = ?2")
        .bind(now)
        .bind(id)
        .execute(&mut *conn)
        .await?;
    let rows = sqlx::query("DELETE FROM app_user WHERE id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(rows.rows_affected() > 0)
}

pub async fn count<'e, E>(executor: E) -> RepoResult<i64>
where
    E: SqliteExecutor<'e>,
{
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM app_user")
        .fetch_one(executor)
        .await?;
    Ok(count)
}
