//! # Repair Order Repository
//!
//! Intake, progress updates and listing of repair orders.
//!
//! ## Workflow
//! ```text
//! received ─► diagnosing ─► awaiting_approval ─► repairing ─► repaired
//!                                │                   │            │
//!                                │             awaiting_parts     ▼
//!                                │                   │     ready_for_pickup
//!                                ▼                   ▼            │
//!                           unrepairable ◄───────────┘            ▼
//!                                                             delivered
//! ```
//! Status moves are not constrained to this happy path; the counter can
//! set any status. `delivered` is normally set by checkout (see
//! [`crate::repository::sale`]).

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use taller_core::error::ValidationError;
use taller_core::{validation, NewRepairOrder, OrderFilter, OrderUpdate, RepairOrder};

const ORDER_COLUMNS: &str = "id, customer_name, customer_phone, customer_email, device_brand, \
     device_model, serial_number, unlock_code, reported_fault, cosmetic_details, accessories, \
     initial_quote_cents, location, diagnosis, parts_used, final_price_cents, status, created_at";

/// Repository for repair orders.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Registers a device at the counter. The order starts in `received`
    /// with no diagnosis or final price.
    pub async fn create(&self, input: NewRepairOrder) -> DbResult<RepairOrder> {
        validation::validate_new_order(&input)?;

        let order = RepairOrder {
            id: Uuid::new_v4().to_string(),
            customer_name: input.customer_name,
            customer_phone: input.customer_phone,
            customer_email: input.customer_email,
            device_brand: input.device_brand,
            device_model: input.device_model,
            serial_number: input.serial_number,
            unlock_code: input.unlock_code,
            reported_fault: input.reported_fault,
            cosmetic_details: input.cosmetic_details,
            accessories: input.accessories,
            initial_quote_cents: input.initial_quote_cents,
            location: input.location,
            diagnosis: None,
            parts_used: None,
            final_price_cents: None,
            status: Default::default(),
            created_at: Utc::now(),
        };

        debug!(id = %order.id, customer = %order.customer_name, "Registering repair order");

        sqlx::query(
            r#"
            INSERT INTO repair_orders (
                id, customer_name, customer_phone, customer_email,
                device_brand, device_model, serial_number, unlock_code,
                reported_fault, cosmetic_details, accessories,
                initial_quote_cents, location, diagnosis, parts_used,
                final_price_cents, status, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)
            "#,
        )
        .bind(&order.id)
        .bind(&order.customer_name)
        .bind(&order.customer_phone)
        .bind(&order.customer_email)
        .bind(&order.device_brand)
        .bind(&order.device_model)
        .bind(&order.serial_number)
        .bind(&order.unlock_code)
        .bind(&order.reported_fault)
        .bind(&order.cosmetic_details)
        .bind(&order.accessories)
        .bind(order.initial_quote_cents)
        .bind(&order.location)
        .bind(&order.diagnosis)
        .bind(&order.parts_used)
        .bind(order.final_price_cents)
        .bind(order.status)
        .bind(order.created_at)
        .execute(&self.pool)
        .await?;

        Ok(order)
    }

    /// Gets an order by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<RepairOrder>> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM repair_orders WHERE id = ?1");
        let order = sqlx::query_as::<_, RepairOrder>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(order)
    }

    /// Applies a partial update as the repair progresses. `None` fields
    /// keep their current value (COALESCE in SQL), so technicians can
    /// post just a status change or just a diagnosis.
    pub async fn update(&self, id: &str, update: OrderUpdate) -> DbResult<RepairOrder> {
        if update.is_empty() {
            return Err(ValidationError::Invalid {
                field: "update".to_string(),
                reason: "no fields provided".to_string(),
            }
            .into());
        }

        debug!(id = %id, status = ?update.status, "Updating repair order");

        let result = sqlx::query(
            r#"
            UPDATE repair_orders
            SET status            = COALESCE(?1, status),
                diagnosis         = COALESCE(?2, diagnosis),
                parts_used        = COALESCE(?3, parts_used),
                final_price_cents = COALESCE(?4, final_price_cents)
            WHERE id = ?5
            "#,
        )
        .bind(update.status)
        .bind(&update.diagnosis)
        .bind(&update.parts_used)
        .bind(update.final_price_cents)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("RepairOrder", id));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("RepairOrder", id))
    }

    /// Lists orders, newest first, filtered by workflow stage.
    pub async fn list(&self, filter: OrderFilter) -> DbResult<Vec<RepairOrder>> {
        let where_clause = match filter {
            OrderFilter::All => "",
            OrderFilter::Pending => {
                "WHERE status IN ('received', 'diagnosing', 'awaiting_approval')"
            }
            OrderFilter::InProgress => "WHERE status IN ('repairing', 'awaiting_parts')",
            OrderFilter::Completed => {
                "WHERE status IN ('repaired', 'ready_for_pickup', 'delivered', 'unrepairable')"
            }
        };

        let sql = format!(
            "SELECT {ORDER_COLUMNS} FROM repair_orders {where_clause} ORDER BY created_at DESC"
        );

        let orders = sqlx::query_as::<_, RepairOrder>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(orders)
    }
}

// =============================================================================
// Integration Tests (in-memory SQLite)
// =============================================================================
