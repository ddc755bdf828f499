//! # Sale Repository
//!
//! Checkout and sales reporting.
//!
//! ## Checkout Transaction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      checkout(NewSale)                                  │
//! │                                                                         │
//! │  BEGIN                                                                  │
//! │    1. INSERT sale                                                       │
//! │    2. INSERT each line item (description/price/cost snapshots)          │
//! │    3. for items that reference a product:                               │
//! │         decrement stock at the selling workshop                         │
//! │    4. if the sale delivers a repair order:                              │
//! │         UPDATE repair_orders SET status = 'delivered'                   │
//! │  COMMIT                                                                 │
//! │                                                                         │
//! │  All or nothing: a failed stock update voids the whole checkout.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{NaiveDate, NaiveTime, Utc};
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use taller_core::{validation, NewSale, Sale, SaleItem, SaleWithItems, SalesReport};

/// Repository for sales.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Records a checkout: the sale, its line items, the stock
    /// decrements and the repair-order delivery, atomically.
    pub async fn checkout(&self, input: NewSale) -> DbResult<SaleWithItems> {
        validation::validate_new_sale(&input)?;

        let sale = Sale {
            id: Uuid::new_v4().to_string(),
            order_id: input.order_id,
            customer_name: input.customer_name,
            customer_document: input.customer_document,
            total_cents: input.total_cents,
            method: input.method,
            sold_at: Utc::now(),
        };

        debug!(id = %sale.id, total_cents = sale.total_cents, items = input.items.len(), "Checkout");

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO sales (id, order_id, customer_name, customer_document, total_cents, method, sold_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&sale.id)
        .bind(&sale.order_id)
        .bind(&sale.customer_name)
        .bind(&sale.customer_document)
        .bind(sale.total_cents)
        .bind(&sale.method)
        .bind(sale.sold_at)
        .execute(&mut *tx)
        .await?;

        let mut items = Vec::with_capacity(input.items.len());
        for line in input.items {
            let item = SaleItem {
                id: Uuid::new_v4().to_string(),
                sale_id: sale.id.clone(),
                product_id: line.product_id,
                description: line.description,
                quantity: line.quantity,
                unit_price_cents: line.unit_price_cents,
                unit_cost_cents: line.unit_cost_cents,
                line_total_cents: line.line_total_cents,
            };

            sqlx::query(
                r#"
                INSERT INTO sale_items (
                    id, sale_id, product_id, description, quantity,
                    unit_price_cents, unit_cost_cents, line_total_cents
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                "#,
            )
            .bind(&item.id)
            .bind(&item.sale_id)
            .bind(&item.product_id)
            .bind(&item.description)
            .bind(item.quantity)
            .bind(item.unit_price_cents)
            .bind(item.unit_cost_cents)
            .bind(item.line_total_cents)
            .execute(&mut *tx)
            .await?;

            // Service lines (no product reference) carry no stock.
            if let Some(product_id) = &item.product_id {
                sqlx::query(
                    r#"
                    UPDATE stock_levels
                    SET quantity = quantity - ?1
                    WHERE product_id = ?2 AND location = ?3
                    "#,
                )
                .bind(item.quantity)
                .bind(product_id)
                .bind(&input.location)
                .execute(&mut *tx)
                .await?;
            }

            items.push(item);
        }

        if let Some(order_id) = &sale.order_id {
            sqlx::query("UPDATE repair_orders SET status = 'delivered' WHERE id = ?1")
                .bind(order_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        info!(id = %sale.id, total_cents = sale.total_cents, "Sale recorded");

        Ok(SaleWithItems { sale, items })
    }

    /// Gets a sale with its line items.
    pub async fn get_with_items(&self, id: &str) -> DbResult<SaleWithItems> {
        let sale = sqlx::query_as::<_, Sale>(
            "SELECT id, order_id, customer_name, customer_document, total_cents, method, sold_at \
             FROM sales WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("Sale", id))?;

        let items = sqlx::query_as::<_, SaleItem>(
            "SELECT id, sale_id, product_id, description, quantity, \
                    unit_price_cents, unit_cost_cents, line_total_cents \
             FROM sale_items WHERE sale_id = ?1",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(SaleWithItems { sale, items })
    }

    /// Sales report over a date range (inclusive on both ends). Missing
    /// bounds default to the beginning of time and today.
    ///
    /// Income is the sum of sale totals; cost is the sum of snapshot
    /// unit costs times quantities, so later product edits never change
    /// a historical report.
    pub async fn sales_report(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> DbResult<SalesReport> {
        let from = from.unwrap_or_default();
        let to = to.unwrap_or_else(|| Utc::now().date_naive());

        let start = from.and_time(NaiveTime::MIN).and_utc();
        let end = to
            .succ_opt()
            .unwrap_or(NaiveDate::MAX)
            .and_time(NaiveTime::MIN)
            .and_utc();

        let income_cents: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(total_cents), 0) FROM sales \
             WHERE sold_at >= ?1 AND sold_at < ?2",
        )
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await?;

        let cost_cents: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(si.unit_cost_cents * si.quantity), 0) \
             FROM sale_items si \
             JOIN sales s ON s.id = si.sale_id \
             WHERE s.sold_at >= ?1 AND s.sold_at < ?2",
        )
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await?;

        let details = sqlx::query_as::<_, Sale>(
            "SELECT id, order_id, customer_name, customer_document, total_cents, method, sold_at \
             FROM sales WHERE sold_at >= ?1 AND sold_at < ?2 ORDER BY sold_at DESC",
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        Ok(SalesReport {
            income_cents,
            cost_cents,
            gross_profit_cents: income_cents - cost_cents,
            details,
        })
    }
}

// =============================================================================
// Integration Tests (in-memory SQLite)
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::Duration;
    use taller_core::{NewProduct, NewRepairOrder, NewSaleItem, OrderStatus, OrderUpdate};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn seeded_product(db: &Database, qty: i64) -> String {
        db.products()
            .create(NewProduct {
                name: "Pantalla A54".to_string(),
                description: None,
                cost_cents: Some(30_000),
                price_cents: 55_000,
                supplier_id: None,
                location: "principal".to_string(),
                initial_quantity: qty,
                min_stock: None,
            })
            .await
            .unwrap()
            .id
    }

    fn product_line(product_id: &str, qty: i64) -> NewSaleItem {
        NewSaleItem {
            product_id: Some(product_id.to_string()),
            description: "Pantalla A54".to_string(),
            quantity: qty,
            unit_price_cents: 55_000,
            unit_cost_cents: 30_000,
            line_total_cents: 55_000 * qty,
        }
    }

    fn basic_sale(items: Vec<NewSaleItem>, total_cents: i64) -> NewSale {
        NewSale {
            order_id: None,
            customer_name: Some("Juan".to_string()),
            customer_document: None,
            total_cents,
            method: Some("efectivo".to_string()),
            location: "principal".to_string(),
            items,
        }
    }

    #[tokio::test]
    async fn checkout_decrements_stock_and_snapshots_lines() {
        let db = test_db().await;
        let product_id = seeded_product(&db, 10).await;

        let sale = db
            .sales()
            .checkout(basic_sale(vec![product_line(&product_id, 2)], 110_000))
            .await
            .unwrap();
        assert_eq!(sale.items.len(), 1);
        assert_eq!(sale.items[0].line_total_cents, 110_000);

        let levels = db.products().stock_levels(&product_id).await.unwrap();
        assert_eq!(levels[0].quantity, 8);

        let fetched = db.sales().get_with_items(&sale.sale.id).await.unwrap();
        assert_eq!(fetched.sale.total_cents, 110_000);
        assert_eq!(fetched.items.len(), 1);
    }

    #[tokio::test]
    async fn checkout_delivers_linked_repair_order() {
        let db = test_db().await;
        let order = db
            .orders()
            .create(NewRepairOrder {
                customer_name: "Maria".to_string(),
                customer_phone: None,
                customer_email: None,
                device_brand: None,
                device_model: None,
                serial_number: None,
                unlock_code: None,
                reported_fault: "no carga".to_string(),
                cosmetic_details: None,
                accessories: None,
                initial_quote_cents: None,
                location: None,
            })
            .await
            .unwrap();
        db.orders()
            .update(
                &order.id,
                OrderUpdate {
                    status: Some(OrderStatus::ReadyForPickup),
                    final_price_cents: Some(60_000),
                    ..OrderUpdate::default()
                },
            )
            .await
            .unwrap();

        let mut sale = basic_sale(
            vec![NewSaleItem {
                product_id: None,
                description: "Reparacion orden".to_string(),
                quantity: 1,
                unit_price_cents: 60_000,
                unit_cost_cents: 0,
                line_total_cents: 60_000,
            }],
            60_000,
        );
        sale.order_id = Some(order.id.clone());

        db.sales().checkout(sale).await.unwrap();

        let delivered = db.orders().get_by_id(&order.id).await.unwrap().unwrap();
        assert_eq!(delivered.status, OrderStatus::Delivered);
    }

    #[tokio::test]
    async fn checkout_rejects_empty_cart() {
        let db = test_db().await;
        let err = db.sales().checkout(basic_sale(vec![], 1000)).await.unwrap_err();
        assert!(matches!(err, DbError::Validation(_)));
    }

    #[tokio::test]
    async fn report_totals_income_cost_and_profit() {
        let db = test_db().await;
        let product_id = seeded_product(&db, 10).await;

        db.sales()
            .checkout(basic_sale(vec![product_line(&product_id, 2)], 110_000))
            .await
            .unwrap();
        db.sales()
            .checkout(basic_sale(vec![product_line(&product_id, 1)], 55_000))
            .await
            .unwrap();

        let report = db.sales().sales_report(None, None).await.unwrap();
        assert_eq!(report.income_cents, 165_000);
        assert_eq!(report.cost_cents, 90_000);
        assert_eq!(report.gross_profit_cents, 75_000);
        assert_eq!(report.details.len(), 2);

        // A window that ends before today sees nothing.
        let past_end = Utc::now().date_naive() - Duration::days(7);
        let empty = db.sales().sales_report(None, Some(past_end)).await.unwrap();
        assert_eq!(empty.income_cents, 0);
        assert!(empty.details.is_empty());
    }

    #[tokio::test]
    async fn unknown_sale_is_not_found() {
        let db = test_db().await;
        let err = db.sales().get_with_items("missing").await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
