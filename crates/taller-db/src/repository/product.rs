//! # Product Repository
//!
//! Inventory operations: product CRUD, the paginated listing, and
//! per-location stock levels.
//!
//! ## Stock Model
//! ```text
//! products (1) ──< stock_levels (N)
//!                  UNIQUE (product_id, location)
//! ```
//! A product's stock is the sum of its per-workshop rows. Registering a
//! product creates its first stock row; restocks upsert the row for the
//! receiving workshop.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use taller_core::{
    validation, NewProduct, Product, ProductPage, ProductUpdate, ProductWithStock, StockLevel,
    DEFAULT_MIN_STOCK,
};

/// Products per page in the inventory listing.
const PAGE_SIZE: u32 = 20;

/// Repository for products and stock levels.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Registers a product together with its initial stock at one
    /// workshop. Both rows are written in one transaction.
    pub async fn create(&self, input: NewProduct) -> DbResult<Product> {
        validation::validate_new_product(&input)?;

        let product = Product {
            id: Uuid::new_v4().to_string(),
            name: input.name,
            description: input.description,
            cost_cents: input.cost_cents,
            price_cents: input.price_cents,
            supplier_id: input.supplier_id,
            created_at: Utc::now(),
        };

        debug!(id = %product.id, name = %product.name, "Registering product");

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO products (id, name, description, cost_cents, price_cents, supplier_id, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.cost_cents)
        .bind(product.price_cents)
        .bind(&product.supplier_id)
        .bind(product.created_at)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO stock_levels (id, product_id, location, quantity, min_stock)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&product.id)
        .bind(input.location.trim())
        .bind(input.initial_quantity)
        .bind(input.min_stock.unwrap_or(DEFAULT_MIN_STOCK))
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(product)
    }

    /// Gets a product by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            "SELECT id, name, description, cost_cents, price_cents, supplier_id, created_at \
             FROM products WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Replaces a product's editable fields. Stock is untouched.
    pub async fn update(&self, id: &str, input: ProductUpdate) -> DbResult<Product> {
        validation::validate_product_update(&input)?;

        let result = sqlx::query(
            r#"
            UPDATE products
            SET name = ?1, description = ?2, cost_cents = ?3, price_cents = ?4, supplier_id = ?5
            WHERE id = ?6
            "#,
        )
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.cost_cents)
        .bind(input.price_cents)
        .bind(&input.supplier_id)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        // Re-read for the authoritative created_at.
        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Deletes a product. Its stock rows go with it (FK cascade); sale
    /// history keeps its snapshots.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// One page of the inventory listing, optionally filtered by a name
    /// substring. Each row carries the supplier name and the quantity
    /// summed across all workshops.
    ///
    /// Pages are 1-based; an out-of-range page returns an empty page
    /// with the correct totals.
    pub async fn list(&self, page: u32, search: Option<&str>) -> DbResult<ProductPage> {
        let page = page.max(1);
        let pattern = format!("%{}%", search.unwrap_or("").trim());

        let total_products: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE name LIKE ?1")
                .bind(&pattern)
                .fetch_one(&self.pool)
                .await?;

        let items = sqlx::query_as::<_, ProductWithStock>(
            r#"
            SELECT p.id, p.name, p.description, p.cost_cents, p.price_cents,
                   s.name AS supplier_name,
                   COALESCE((SELECT SUM(sl.quantity)
                             FROM stock_levels sl
                             WHERE sl.product_id = p.id), 0) AS total_quantity
            FROM products p
            LEFT JOIN suppliers s ON s.id = p.supplier_id
            WHERE p.name LIKE ?1
            ORDER BY p.name COLLATE NOCASE
            LIMIT ?2 OFFSET ?3
            "#,
        )
        .bind(&pattern)
        .bind(PAGE_SIZE as i64)
        .bind(((page - 1) * PAGE_SIZE) as i64)
        .fetch_all(&self.pool)
        .await?;

        let total_pages = (total_products as u32).div_ceil(PAGE_SIZE);

        Ok(ProductPage {
            items,
            total_products,
            total_pages,
            page,
        })
    }

    /// Lists a product's stock rows, one per workshop.
    pub async fn stock_levels(&self, product_id: &str) -> DbResult<Vec<StockLevel>> {
        let levels = sqlx::query_as::<_, StockLevel>(
            "SELECT id, product_id, location, quantity, min_stock \
             FROM stock_levels WHERE product_id = ?1 ORDER BY location",
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(levels)
    }

    /// Adds stock at a workshop, creating the (product, location) row if
    /// this is the first delivery there.
    pub async fn add_stock(
        &self,
        product_id: &str,
        location: &str,
        quantity: i64,
    ) -> DbResult<StockLevel> {
        validation::validate_required_text("location", location)?;
        validation::validate_quantity("quantity", quantity)?;

        let location = location.trim();

        sqlx::query(
            r#"
            INSERT INTO stock_levels (id, product_id, location, quantity, min_stock)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT (product_id, location)
            DO UPDATE SET quantity = quantity + excluded.quantity
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(product_id)
        .bind(location)
        .bind(quantity)
        .bind(DEFAULT_MIN_STOCK)
        .execute(&self.pool)
        .await?;

        let level = sqlx::query_as::<_, StockLevel>(
            "SELECT id, product_id, location, quantity, min_stock \
             FROM stock_levels WHERE product_id = ?1 AND location = ?2",
        )
        .bind(product_id)
        .bind(location)
        .fetch_one(&self.pool)
        .await?;

        Ok(level)
    }
}

// =============================================================================
// Integration Tests (in-memory SQLite)
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn screen(name: &str, qty: i64) -> NewProduct {
        NewProduct {
            name: name.to_string(),
            description: Some("pantalla OLED".to_string()),
            cost_cents: Some(30_000),
            price_cents: 55_000,
            supplier_id: None,
            location: "principal".to_string(),
            initial_quantity: qty,
            min_stock: None,
        }
    }

    #[tokio::test]
    async fn create_writes_product_and_initial_stock() {
        let db = test_db().await;
        let p = db.products().create(screen("Pantalla A54", 8)).await.unwrap();

        let levels = db.products().stock_levels(&p.id).await.unwrap();
        assert_eq!(levels.len(), 1);
        assert_eq!(levels[0].location, "principal");
        assert_eq!(levels[0].quantity, 8);
        assert_eq!(levels[0].min_stock, DEFAULT_MIN_STOCK);
    }

    #[tokio::test]
    async fn add_stock_upserts_per_location() {
        let db = test_db().await;
        let p = db.products().create(screen("Pantalla A54", 8)).await.unwrap();

        let same = db.products().add_stock(&p.id, "principal", 4).await.unwrap();
        assert_eq!(same.quantity, 12);

        let other = db.products().add_stock(&p.id, "sucursal", 3).await.unwrap();
        assert_eq!(other.quantity, 3);

        assert_eq!(db.products().stock_levels(&p.id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn add_stock_rejects_nonpositive_quantity() {
        let db = test_db().await;
        let p = db.products().create(screen("Pantalla A54", 8)).await.unwrap();

        let err = db.products().add_stock(&p.id, "principal", 0).await.unwrap_err();
        assert!(matches!(err, DbError::Validation(_)));
    }

    #[tokio::test]
    async fn listing_paginates_and_searches() {
        let db = test_db().await;
        for i in 0..25 {
            db.products()
                .create(screen(&format!("Pantalla {i:02}"), 1))
                .await
                .unwrap();
        }
        db.products().create(screen("Bateria X", 1)).await.unwrap();

        let page1 = db.products().list(1, None).await.unwrap();
        assert_eq!(page1.total_products, 26);
        assert_eq!(page1.total_pages, 2);
        assert_eq!(page1.items.len(), 20);
        assert_eq!(page1.items[0].total_quantity, 1);

        let page2 = db.products().list(2, None).await.unwrap();
        assert_eq!(page2.items.len(), 6);

        let filtered = db.products().list(1, Some("Bateria")).await.unwrap();
        assert_eq!(filtered.total_products, 1);
        assert_eq!(filtered.items[0].name, "Bateria X");
    }

    #[tokio::test]
    async fn update_and_delete() {
        let db = test_db().await;
        let p = db.products().create(screen("Pantalla A54", 8)).await.unwrap();

        let updated = db
            .products()
            .update(
                &p.id,
                ProductUpdate {
                    name: "Pantalla A54 (OEM)".to_string(),
                    description: p.description.clone(),
                    cost_cents: Some(28_000),
                    price_cents: 52_000,
                    supplier_id: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.price_cents, 52_000);

        db.products().delete(&p.id).await.unwrap();
        assert!(db.products().get_by_id(&p.id).await.unwrap().is_none());
        assert!(db.products().stock_levels(&p.id).await.unwrap().is_empty());
    }
}
