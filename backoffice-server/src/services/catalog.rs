//! Catalog Service - categories and products
//!
//! Products are leaf data for the order pipeline: their current price is the
//! default unit price of a new line item and is never read again afterwards.

use crate::db::repository::{category, product};
use crate::utils::validation::validate_price;
use crate::utils::{AppError, AppResult};
use rust_decimal::Decimal;
use shared::models::{Category, CategoryCreate, CategoryUpdate, Product, ProductCreate, ProductUpdate};
use sqlx::SqlitePool;
use validator::Validate;

#[derive(Debug, Clone)]
pub struct CatalogService {
    pool: SqlitePool,
}

impl CatalogService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // =========================================================================
    // Categories
    // =========================================================================

    pub async fn list_categories(&self) -> AppResult<Vec<Category>> {
        Ok(category::find_all(&self.pool).await?)
    }

    pub async fn get_category(&self, id: i64) -> AppResult<Category> {
        category::find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Category {id} not found")))
    }

    pub async fn create_category(&self, data: CategoryCreate) -> AppResult<Category> {
        data.validate()?;
        let category = category::create(&self.pool, &data).await?;
        tracing::info!(category_id = category.id, name = %category.name, "Category created");
        Ok(category)
    }

    pub async fn update_category(&self, id: i64, data: CategoryUpdate) -> AppResult<Category> {
        data.validate()?;
        Ok(category::update(&self.pool, id, &data).await?)
    }

    /// Rejected while any product still belongs to the category
    pub async fn delete_category(&self, id: i64) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;
        if !category::delete(&mut tx, id).await? {
            return Err(AppError::not_found(format!("Category {id} not found")));
        }
        tx.commit().await?;
        tracing::info!(category_id = id, "Category deleted");
        Ok(())
    }

    // =========================================================================
    // Products
    // =========================================================================

    pub async fn list_products(&self) -> AppResult<Vec<Product>> {
        Ok(product::find_all(&self.pool).await?)
    }

    pub async fn list_products_by_category(&self, category_id: i64) -> AppResult<Vec<Product>> {
        Ok(product::find_by_category(&self.pool, category_id).await?)
    }

    pub async fn get_product(&self, id: i64) -> AppResult<Product> {
        product::find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Product {id} not found")))
    }

    pub async fn get_product_price(&self, id: i64) -> AppResult<Decimal> {
        product::find_price(&self.pool, id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Product {id} not found")))
    }

    pub async fn create_product(&self, data: ProductCreate) -> AppResult<Product> {
        data.validate()?;
        validate_price(data.price, "price")?;
        if let Some(category_id) = data.category_id {
            self.get_category(category_id).await?;
        }
        let product = product::create(&self.pool, &data).await?;
        tracing::info!(product_id = product.id, price = %product.price, "Product created");
        Ok(product)
    }

    /// Price changes never touch existing order items
    pub async fn update_product(&self, id: i64, data: ProductUpdate) -> AppResult<Product> {
        data.validate()?;
        if let Some(price) = data.price {
            validate_price(price, "price")?;
        }
        if let Some(category_id) = data.category_id {
            self.get_category(category_id).await?;
        }
        Ok(product::update(&self.pool, id, &data).await?)
    }

    /// Rejected while any order item references the product
    pub async fn delete_product(&self, id: i64) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;
        if !product::delete(&mut tx, id).await? {
            return Err(AppError::not_found(format!("Product {id} not found")));
        }
        tx.commit().await?;
        tracing::info!(product_id = id, "Product deleted");
        Ok(())
    }
}
