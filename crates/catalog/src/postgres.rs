use async_trait::async_trait;
use common::{Money, ProductId};
use sqlx::{PgPool, Row, postgres::PgRow};

use crate::{
    error::{CatalogError, Result},
    product::{Product, ProductUpdate},
    store::{Catalog, ReservedLine, StockRequest},
};

/// PostgreSQL-backed catalog implementation.
///
/// Stock reservation runs inside a single transaction with
/// `SELECT ... FOR UPDATE` on every requested product row, so two
/// concurrent reservations on the same product serialize at the database.
#[derive(Clone)]
pub struct PostgresCatalog {
    pool: PgPool,
}

impl PostgresCatalog {
    /// Creates a new PostgreSQL catalog.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }

    fn row_to_product(row: &PgRow) -> Result<Product> {
        Ok(Product {
            id: ProductId::new(row.try_get::<String, _>("id")?),
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            price: Money::from_cents(row.try_get("price_cents")?),
            stock: row.try_get::<i64, _>("stock")? as u32,
            image_url: row.try_get("image_url")?,
        })
    }
}

/// Maps transaction-level contention errors to the retryable
/// [`CatalogError::StockConflict`] variant.
fn map_db_error(e: sqlx::Error) -> CatalogError {
    if let sqlx::Error::Database(ref db_err) = e
        && matches!(db_err.code().as_deref(), Some("40001") | Some("40P01"))
    {
        return CatalogError::StockConflict;
    }
    CatalogError::Database(e)
}

#[async_trait]
impl Catalog for PostgresCatalog {
    async fn get_product(&self, id: &ProductId) -> Result<Product> {
        let row = sqlx::query(
            "SELECT id, name, description, price_cents, stock, image_url FROM products WHERE id = $1",
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| CatalogError::ProductNotFound(id.clone()))?;

        Self::row_to_product(&row)
    }

    async fn list_products(&self) -> Result<Vec<Product>> {
        let rows = sqlx::query(
            "SELECT id, name, description, price_cents, stock, image_url FROM products ORDER BY name ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_product).collect()
    }

    async fn insert_product(&self, product: Product) -> Result<Product> {
        sqlx::query(
            r#"
            INSERT INTO products (id, name, description, price_cents, stock, image_url)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(product.id.as_str())
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price.cents())
        .bind(product.stock as i64)
        .bind(&product.image_url)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.constraint() == Some("unique_product_name")
            {
                return CatalogError::DuplicateName {
                    name: product.name.clone(),
                };
            }
            CatalogError::Database(e)
        })?;

        Ok(product)
    }

    async fn update_product(&self, id: &ProductId, update: ProductUpdate) -> Result<Product> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(
            "SELECT id, name, description, price_cents, stock, image_url FROM products WHERE id = $1 FOR UPDATE",
        )
        .bind(id.as_str())
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| CatalogError::ProductNotFound(id.clone()))?;

        let mut product = Self::row_to_product(&row)?;
        update.apply_to(&mut product);

        sqlx::query(
            r#"
            UPDATE products
            SET name = $2, description = $3, price_cents = $4, stock = $5, image_url = $6
            WHERE id = $1
            "#,
        )
        .bind(id.as_str())
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price.cents())
        .bind(product.stock as i64)
        .bind(&product.image_url)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.constraint() == Some("unique_product_name")
            {
                return CatalogError::DuplicateName {
                    name: product.name.clone(),
                };
            }
            CatalogError::Database(e)
        })?;

        tx.commit().await?;
        Ok(product)
    }

    async fn delete_product(&self, id: &ProductId) -> Result<()> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id.as_str())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(CatalogError::ProductNotFound(id.clone()));
        }
        Ok(())
    }

    async fn reserve_stock(&self, requests: &[StockRequest]) -> Result<Vec<ReservedLine>> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;
        let mut lines = Vec::with_capacity(requests.len());

        for request in requests {
            // Lock the row for the duration of validate + decrement.
            let row = sqlx::query(
                "SELECT id, name, description, price_cents, stock, image_url FROM products WHERE id = $1 FOR UPDATE",
            )
            .bind(request.product_id.as_str())
            .fetch_optional(&mut *tx)
            .await
            .map_err(map_db_error)?
            .ok_or_else(|| CatalogError::ProductNotFound(request.product_id.clone()))?;

            let product = Self::row_to_product(&row)?;
            if !product.has_stock_for(request.quantity) {
                // Dropping the transaction rolls back earlier decrements.
                return Err(CatalogError::InsufficientStock {
                    product_id: product.id,
                    product_name: product.name,
                    available: product.stock,
                    requested: request.quantity,
                });
            }

            sqlx::query("UPDATE products SET stock = stock - $2 WHERE id = $1")
                .bind(request.product_id.as_str())
                .bind(request.quantity as i64)
                .execute(&mut *tx)
                .await
                .map_err(map_db_error)?;

            lines.push(ReservedLine {
                product_id: product.id,
                product_name: product.name,
                quantity: request.quantity,
                unit_price: product.price,
            });
        }

        tx.commit().await.map_err(map_db_error)?;
        Ok(lines)
    }

    async fn release_stock(&self, requests: &[StockRequest]) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        for request in requests {
            sqlx::query("UPDATE products SET stock = stock + $2 WHERE id = $1")
                .bind(request.product_id.as_str())
                .bind(request.quantity as i64)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}
