//! # Supplier Repository
//!
//! CRUD for parts suppliers. Supplier names are unique; a duplicate
//! insert surfaces as [`DbError::UniqueViolation`] via the SQLite
//! constraint rather than a racy pre-check.

use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use taller_core::{validation, NewSupplier, Supplier};

/// Repository for supplier operations.
#[derive(Debug, Clone)]
pub struct SupplierRepository {
    pool: SqlitePool,
}

impl SupplierRepository {
    /// Creates a new SupplierRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SupplierRepository { pool }
    }

    /// Registers a new supplier.
    pub async fn create(&self, input: NewSupplier) -> DbResult<Supplier> {
        validation::validate_supplier(&input)?;

        let supplier = Supplier {
            id: Uuid::new_v4().to_string(),
            name: input.name,
            contact: input.contact,
            phone: input.phone,
            email: input.email,
            address: input.address,
        };

        debug!(id = %supplier.id, name = %supplier.name, "Creating supplier");

        sqlx::query(
            r#"
            INSERT INTO suppliers (id, name, contact, phone, email, address)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&supplier.id)
        .bind(&supplier.name)
        .bind(&supplier.contact)
        .bind(&supplier.phone)
        .bind(&supplier.email)
        .bind(&supplier.address)
        .execute(&self.pool)
        .await?;

        Ok(supplier)
    }

    /// Gets a supplier by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Supplier>> {
        let supplier = sqlx::query_as::<_, Supplier>(
            "SELECT id, name, contact, phone, email, address FROM suppliers WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(supplier)
    }

    /// Lists all suppliers ordered by name.
    pub async fn list(&self) -> DbResult<Vec<Supplier>> {
        let suppliers = sqlx::query_as::<_, Supplier>(
            "SELECT id, name, contact, phone, email, address FROM suppliers \
             ORDER BY name COLLATE NOCASE",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(suppliers)
    }

    /// Replaces a supplier's contact details.
    pub async fn update(&self, id: &str, input: NewSupplier) -> DbResult<Supplier> {
        validation::validate_supplier(&input)?;

        let result = sqlx::query(
            r#"
            UPDATE suppliers
            SET name = ?1, contact = ?2, phone = ?3, email = ?4, address = ?5
            WHERE id = ?6
            "#,
        )
        .bind(&input.name)
        .bind(&input.contact)
        .bind(&input.phone)
        .bind(&input.email)
        .bind(&input.address)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Supplier", id));
        }

        Ok(Supplier {
            id: id.to_string(),
            name: input.name,
            contact: input.contact,
            phone: input.phone,
            email: input.email,
            address: input.address,
        })
    }

    /// Deletes a supplier. Payable accounts and products that reference
    /// it have their supplier_id set to NULL by the FK.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM suppliers WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Supplier", id));
        }

        Ok(())
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

    fn supplier(name: &str) -> NewSupplier {
        NewSupplier {
            name: name.to_string(),
            contact: Some("Carlos".to_string()),
            phone: Some("555-0101".to_string()),
            email: None,
            address: None,
        }
    }

    #[tokio::test]
    async fn create_list_and_get() {
        let db = test_db().await;
        let s1 = db.suppliers().create(supplier("Zeta Parts")).await.unwrap();
        db.suppliers().create(supplier("Apex Electronics")).await.unwrap();

        let all = db.suppliers().list().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].name, "Apex Electronics");

        let fetched = db.suppliers().get_by_id(&s1.id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "Zeta Parts");
    }

    #[tokio::test]
    async fn duplicate_name_is_rejected() {
        let db = test_db().await;
        db.suppliers().create(supplier("Apex")).await.unwrap();

        let err = db.suppliers().create(supplier("Apex")).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn empty_name_is_rejected() {
        let db = test_db().await;
        let err = db.suppliers().create(supplier("   ")).await.unwrap_err();
        assert!(matches!(err, DbError::Validation(_)));
    }

    #[tokio::test]
    async fn update_and_delete() {
        let db = test_db().await;
        let s = db.suppliers().create(supplier("Apex")).await.unwrap();

        let mut changed = supplier("Apex Renamed");
        changed.phone = None;
        let updated = db.suppliers().update(&s.id, changed).await.unwrap();
        assert_eq!(updated.name, "Apex Renamed");
        assert!(updated.phone.is_none());

        db.suppliers().delete(&s.id).await.unwrap();
        assert!(db.suppliers().get_by_id(&s.id).await.unwrap().is_none());

        let err = db.suppliers().delete(&s.id).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
