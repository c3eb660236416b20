//! User Service - accounts and credential checks

use crate::auth::{hash_password, verify_password};
use crate::db::repository::user;
use crate::utils::{AppError, AppResult};
use shared::models::{CurrentUser, Role, User, UserCreate, UserUpdate};
use sqlx::SqlitePool;
use validator::Validate;

#[derive(Debug, Clone)]
pub struct UserService {
    pool: SqlitePool,
}

impl UserService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> AppResult<Vec<User>> {
        Ok(user::find_all(&self.pool).await?)
    }

    pub async fn find_by_id(&self, id: i64) -> AppResult<User> {
        user::find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("User {id} not found")))
    }

    pub async fn create(&self, data: UserCreate) -> AppResult<User> {
        data.validate()?;
        let hash = hash_password(&data.password)?;
        let created = user::create(
            &self.pool,
            &data.name,
            &data.email,
            &hash,
            data.role.unwrap_or_default(),
        )
        .await?;
        tracing::info!(user_id = created.id, role = %created.role, "User created");
        Ok(created)
    }

    /// A new password is re-hashed; omitted fields are kept
    pub async fn update(&self, id: i64, data: UserUpdate) -> AppResult<User> {
        data.validate()?;
        let hash = data.password.as_deref().map(hash_password).transpose()?;
        Ok(user::update(
            &self.pool,
            id,
            data.name.as_deref(),
            data.email.as_deref(),
            hash.as_deref(),
            data.role,
        )
        .await?)
    }

    /// Orders of the user are kept and detached
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;
        if !user::delete(&mut tx, id).await? {
            return Err(AppError::not_found(format!("User {id} not found")));
        }
        tx.commit().await?;
        tracing::info!(user_id = id, "User deleted");
        Ok(())
    }

    /// Check credentials. Unknown email and wrong password both give `None`.
    pub async fn authenticate(&self, email: &str, password: &str) -> AppResult<Option<CurrentUser>> {
        let Some(found) = user::find_by_email(&self.pool, email).await? else {
            tracing::debug!(%email, "Login attempt for unknown email");
            return Ok(None);
        };
        if !verify_password(password, &found.password_hash) {
            tracing::debug!(user_id = found.id, "Login attempt with wrong password");
            return Ok(None);
        }
        Ok(Some(CurrentUser::from(&found)))
    }

    /// Find-or-create the bootstrap admin. Returns true when it was created.
    pub async fn ensure_default_admin(&self, email: &str, password: &str, name: &str) -> AppResult<bool> {
        if let Some(existing) = user::find_by_email(&self.pool, email).await? {
            if !existing.role.is_admin() {
                tracing::warn!(user_id = existing.id, %email, "Default admin email belongs to a non-admin user");
            }
            return Ok(false);
        }

        self.create(UserCreate {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            role: Some(Role::Admin),
        })
        .await?;
        tracing::info!(%email, "Default admin created");
        Ok(true)
    }
}
