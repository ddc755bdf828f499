//! # Payable Repository
//!
//! Database operations for accounts payable and their payments, including
//! the settlement critical section.
//!
//! ## Account Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Payable Account Lifecycle                            │
//! │                                                                         │
//! │  1. REGISTER INVOICE                                                    │
//! │     └── create() → PayableAccount { state: Pending, payment_seq: 0 }    │
//! │                                                                         │
//! │  2. RECORD PAYMENTS (abonos)                                            │
//! │     └── submit_payment() ─┬─► Partial (balance remains)                 │
//! │                           └─► Paid (settled, maybe via discount)        │
//! │                                                                         │
//! │  3. PAID IS TERMINAL                                                    │
//! │     └── submit_payment() against Paid → SettlementError::AlreadyPaid    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## The Read-Decide-Write Race
//! `submit_payment` reads the current cash total, lets the pure engine
//! decide, then writes the payment and the state transition. Two
//! concurrent submissions must not both settle the account off the same
//! stale balance. Three mechanisms close the race:
//!
//! 1. the settlement transaction opens as `BEGIN IMMEDIATE`, taking the
//!    write lock before the snapshot read, so concurrent writers queue
//!    and each sees the state the previous one committed (the second
//!    settling payment is then rejected by the engine itself);
//! 2. a writer that cannot get the lock within SQLite's busy timeout
//!    surfaces as the retryable [`DbError::Conflict`], never as a plain
//!    store error;
//! 3. the state UPDATE is additionally guarded by the `payment_seq`
//!    read at decision time — zero rows affected rolls the submission
//!    back as [`DbError::Conflict`].

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use taller_core::{
    settlement, validation, AccountFilter, Money, MonthlyPaidTotal, NewPayableAccount,
    PayableAccount, PayableSummary, PaymentReceipt, SupplierPayment,
};

/// Account columns, shared by the point read and the snapshot read inside
/// the settlement transaction.
const ACCOUNT_COLUMNS: &str = "id, supplier_id, invoice_number, description, total_cents, \
     early_discount_bps, issue_date, due_date, state, payment_seq, created_at";

/// Repository for payable accounts and supplier payments.
#[derive(Debug, Clone)]
pub struct PayableRepository {
    pool: SqlitePool,
}

impl PayableRepository {
    /// Creates a new PayableRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PayableRepository { pool }
    }

    /// Registers a new payable account in state Pending.
    pub async fn create(&self, input: NewPayableAccount) -> DbResult<PayableAccount> {
        validation::validate_new_account(&input)?;

        let account = PayableAccount {
            id: Uuid::new_v4().to_string(),
            supplier_id: input.supplier_id,
            invoice_number: input.invoice_number,
            description: input.description,
            total_cents: input.total_cents,
            early_discount_bps: input.early_discount_bps,
            issue_date: input.issue_date,
            due_date: input.due_date,
            state: Default::default(),
            payment_seq: 0,
            created_at: Utc::now(),
        };

        debug!(id = %account.id, total_cents = account.total_cents, "Registering payable account");

        sqlx::query(
            r#"
            INSERT INTO payable_accounts (
                id, supplier_id, invoice_number, description,
                total_cents, early_discount_bps, issue_date, due_date,
                state, payment_seq, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&account.id)
        .bind(&account.supplier_id)
        .bind(&account.invoice_number)
        .bind(&account.description)
        .bind(account.total_cents)
        .bind(account.early_discount_bps)
        .bind(account.issue_date)
        .bind(account.due_date)
        .bind(account.state)
        .bind(account.payment_seq)
        .bind(account.created_at)
        .execute(&self.pool)
        .await?;

        Ok(account)
    }

    /// Gets an account by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<PayableAccount>> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM payable_accounts WHERE id = ?1");
        let account = sqlx::query_as::<_, PayableAccount>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(account)
    }

    /// Lists accounts as summaries with the derived paid total
    /// (cash + forgiven) and the last payment date.
    ///
    /// - `Open`: pending/partial accounts, soonest due date first
    ///   (accounts without a due date sort last)
    /// - `Paid`: settled accounts, most recently settled first
    pub async fn list(&self, filter: AccountFilter) -> DbResult<Vec<PayableSummary>> {
        let sql = match filter {
            AccountFilter::Open => {
                "SELECT a.id, a.supplier_id, s.name AS supplier_name, a.invoice_number,
                        a.description, a.total_cents, a.early_discount_bps, a.issue_date,
                        a.due_date, a.state,
                        COALESCE((SELECT SUM(p.amount_cents + p.discount_cents)
                                  FROM supplier_payments p
                                  WHERE p.account_id = a.id), 0) AS paid_cents,
                        (SELECT MAX(p.paid_at)
                         FROM supplier_payments p
                         WHERE p.account_id = a.id) AS last_payment_at
                 FROM payable_accounts a
                 LEFT JOIN suppliers s ON s.id = a.supplier_id
                 WHERE a.state != 'paid'
                 ORDER BY a.due_date IS NULL, a.due_date ASC"
            }
            AccountFilter::Paid => {
                "SELECT a.id, a.supplier_id, s.name AS supplier_name, a.invoice_number,
                        a.description, a.total_cents, a.early_discount_bps, a.issue_date,
                        a.due_date, a.state,
                        COALESCE((SELECT SUM(p.amount_cents + p.discount_cents)
                                  FROM supplier_payments p
                                  WHERE p.account_id = a.id), 0) AS paid_cents,
                        (SELECT MAX(p.paid_at)
                         FROM supplier_payments p
                         WHERE p.account_id = a.id) AS last_payment_at
                 FROM payable_accounts a
                 LEFT JOIN suppliers s ON s.id = a.supplier_id
                 WHERE a.state = 'paid'
                 ORDER BY last_payment_at DESC"
            }
        };

        let summaries = sqlx::query_as::<_, PayableSummary>(sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(summaries)
    }

    /// Lists the payment history of an account, newest first.
    pub async fn list_payments(&self, account_id: &str) -> DbResult<Vec<SupplierPayment>> {
        let payments = sqlx::query_as::<_, SupplierPayment>(
            r#"
            SELECT id, account_id, amount_cents, discount_cents, method, notes, paid_at
            FROM supplier_payments
            WHERE account_id = ?1
            ORDER BY paid_at DESC
            "#,
        )
        .bind(account_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(payments)
    }

    /// Records a payment (abono) against an account.
    ///
    /// ## What This Does
    /// Inside one transaction:
    /// 1. read the account snapshot and the cash paid so far
    /// 2. let the settlement engine accept/reject and pick the new state
    /// 3. insert the payment row (cash amount + any discount granted)
    /// 4. transition the account state, guarded by the `payment_seq`
    ///    read in step 1
    ///
    /// Both writes commit together or neither does. A rejected payment
    /// leaves the account and its history untouched.
    ///
    /// ## Errors
    /// - [`DbError::NotFound`] — unknown account
    /// - [`DbError::Settlement`] — engine rejection (negative amount,
    ///   exceeds balance, already paid); not retryable as-is
    /// - [`DbError::Conflict`] — a concurrent payment won the race or
    ///   held the write lock past the busy timeout; retry the whole
    ///   call once
    pub async fn submit_payment(
        &self,
        account_id: &str,
        amount: Money,
        method: Option<&str>,
        notes: Option<&str>,
    ) -> DbResult<PaymentReceipt> {
        debug!(account_id = %account_id, amount = %amount, "Submitting payment");

        // IMMEDIATE: take the write lock before the snapshot read, so a
        // second writer on this database queues here instead of failing
        // mid-transaction with SQLITE_BUSY.
        let mut tx = self
            .pool
            .begin_with("BEGIN IMMEDIATE")
            .await
            .map_err(|e| busy_to_conflict(e, account_id))?;

        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM payable_accounts WHERE id = ?1");
        let account = sqlx::query_as::<_, PayableAccount>(&sql)
            .bind(account_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| DbError::not_found("PayableAccount", account_id))?;

        // Cash only: granted discounts are forgiven balance, not money
        // received, and must not shrink the raw balance twice.
        let paid_cents: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(amount_cents), 0) FROM supplier_payments WHERE account_id = ?1",
        )
        .bind(account_id)
        .fetch_one(&mut *tx)
        .await?;

        let today = Utc::now().date_naive();
        let decision =
            settlement::evaluate_payment(&account, Money::from_cents(paid_cents), amount, today)?;

        let payment = SupplierPayment {
            id: Uuid::new_v4().to_string(),
            account_id: account_id.to_string(),
            amount_cents: decision.amount.cents(),
            discount_cents: decision.discount_granted.cents(),
            method: method.map(str::to_string),
            notes: notes.map(str::to_string),
            paid_at: Utc::now(),
        };

        sqlx::query(
            r#"
            INSERT INTO supplier_payments (
                id, account_id, amount_cents, discount_cents, method, notes, paid_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&payment.id)
        .bind(&payment.account_id)
        .bind(payment.amount_cents)
        .bind(payment.discount_cents)
        .bind(&payment.method)
        .bind(&payment.notes)
        .bind(payment.paid_at)
        .execute(&mut *tx)
        .await?;

        // The seq guard: if another transaction recorded a payment after
        // our snapshot, this matches zero rows and the insert above rolls
        // back with the transaction.
        let result = sqlx::query(
            r#"
            UPDATE payable_accounts
            SET state = ?1, payment_seq = payment_seq + 1
            WHERE id = ?2 AND payment_seq = ?3
            "#,
        )
        .bind(decision.new_state)
        .bind(account_id)
        .bind(account.payment_seq)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(DbError::conflict(account_id));
        }

        tx.commit()
            .await
            .map_err(|e| busy_to_conflict(e, account_id))?;

        info!(
            account_id = %account_id,
            amount_cents = payment.amount_cents,
            discount_cents = payment.discount_cents,
            new_state = ?decision.new_state,
            "Payment recorded"
        );

        Ok(PaymentReceipt {
            payment,
            new_state: decision.new_state,
        })
    }

    /// Aggregates all payments by calendar month: cash received and
    /// discount forgiven, newest month first. Computed by aggregation,
    /// never stored.
    pub async fn paid_by_month(&self) -> DbResult<Vec<MonthlyPaidTotal>> {
        let rows = sqlx::query_as::<_, MonthlyPaidTotal>(
            r#"
            SELECT strftime('%Y-%m', paid_at) AS month,
                   SUM(amount_cents) AS cash_cents,
                   SUM(discount_cents) AS discount_cents
            FROM supplier_payments
            GROUP BY month
            ORDER BY month DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}

/// SQLITE_BUSY on the settlement transaction means another writer held
/// the database past the busy timeout. That is a lost race, not a store
/// failure, so it maps to the retryable [`DbError::Conflict`].
fn busy_to_conflict(err: sqlx::Error, account_id: &str) -> DbError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.message().contains("database is locked") => {
            DbError::conflict(account_id)
        }
        _ => err.into(),
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
    use taller_core::{AccountState, SettlementError};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn temp_file_db(max_connections: u32) -> (Database, std::path::PathBuf) {
        let path = std::env::temp_dir().join(format!("taller-test-{}.db", Uuid::new_v4()));
        let db = Database::new(DbConfig::new(&path).max_connections(max_connections))
            .await
            .unwrap();
        (db, path)
    }

    fn remove_db_files(path: &std::path::Path) {
        for suffix in ["", "-wal", "-shm"] {
            let _ = std::fs::remove_file(format!("{}{}", path.display(), suffix));
        }
    }

    fn invoice(total_cents: i64, discount_bps: u32, due_in_days: Option<i64>) -> NewPayableAccount {
        NewPayableAccount {
            supplier_id: None,
            invoice_number: Some("F-100".to_string()),
            description: Some("pantallas".to_string()),
            total_cents,
            early_discount_bps: discount_bps,
            issue_date: None,
            due_date: due_in_days.map(|d| Utc::now().date_naive() + Duration::days(d)),
        }
    }

    #[tokio::test]
    async fn create_and_get_roundtrip() {
        let db = test_db().await;
        let created = db.payables().create(invoice(100_000, 0, None)).await.unwrap();

        let fetched = db.payables().get_by_id(&created.id).await.unwrap().unwrap();
        assert_eq!(fetched.state, AccountState::Pending);
        assert_eq!(fetched.total_cents, 100_000);
        assert_eq!(fetched.payment_seq, 0);

        assert!(db.payables().get_by_id("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn create_rejects_invalid_totals() {
        let db = test_db().await;
        let err = db.payables().create(invoice(0, 0, None)).await.unwrap_err();
        assert!(matches!(err, DbError::Validation(_)));
    }

    #[tokio::test]
    async fn partial_payments_then_settlement_without_discount() {
        let db = test_db().await;
        let acc = db.payables().create(invoice(100_000, 0, None)).await.unwrap();

        let r1 = db
            .payables()
            .submit_payment(&acc.id, Money::from_cents(40_000), Some("efectivo"), None)
            .await
            .unwrap();
        assert_eq!(r1.new_state, AccountState::Partial);
        assert_eq!(r1.payment.discount_cents, 0);

        let open = db.payables().list(AccountFilter::Open).await.unwrap();
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].paid_cents, 40_000);
        assert!(open[0].last_payment_at.is_some());

        let r2 = db
            .payables()
            .submit_payment(&acc.id, Money::from_cents(60_000), None, None)
            .await
            .unwrap();
        assert_eq!(r2.new_state, AccountState::Paid);
        assert_eq!(r2.payment.discount_cents, 0);

        let paid = db.payables().list(AccountFilter::Paid).await.unwrap();
        assert_eq!(paid.len(), 1);
        assert_eq!(paid[0].paid_cents, 100_000);
        assert!(db.payables().list(AccountFilter::Open).await.unwrap().is_empty());

        let payments = db.payables().list_payments(&acc.id).await.unwrap();
        assert_eq!(payments.len(), 2);
    }

    #[tokio::test]
    async fn discounted_settlement_inside_window() {
        let db = test_db().await;
        // $1,000 at 10%, due tomorrow: $900 settles and forgives $100.
        let acc = db.payables().create(invoice(100_000, 1000, Some(1))).await.unwrap();

        let receipt = db
            .payables()
            .submit_payment(&acc.id, Money::from_cents(90_000), Some("transferencia"), None)
            .await
            .unwrap();

        assert_eq!(receipt.new_state, AccountState::Paid);
        assert_eq!(receipt.payment.amount_cents, 90_000);
        assert_eq!(receipt.payment.discount_cents, 10_000);

        // Cash + forgiven covers the full total in the listing.
        let paid = db.payables().list(AccountFilter::Paid).await.unwrap();
        assert_eq!(paid[0].paid_cents, 100_000);
    }

    #[tokio::test]
    async fn paid_account_is_terminal() {
        let db = test_db().await;
        let acc = db.payables().create(invoice(50_000, 0, None)).await.unwrap();

        db.payables()
            .submit_payment(&acc.id, Money::from_cents(50_000), None, None)
            .await
            .unwrap();

        let err = db
            .payables()
            .submit_payment(&acc.id, Money::from_cents(1), None, None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Settlement(SettlementError::AlreadyPaid { .. })
        ));

        // Nothing was written by the rejected attempt.
        assert_eq!(db.payables().list_payments(&acc.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn overpayment_is_rejected_and_writes_nothing() {
        let db = test_db().await;
        let acc = db.payables().create(invoice(100_000, 0, None)).await.unwrap();

        let err = db
            .payables()
            .submit_payment(&acc.id, Money::from_cents(100_001), None, None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Settlement(SettlementError::ExceedsBalance { .. })
        ));

        assert!(db.payables().list_payments(&acc.id).await.unwrap().is_empty());
        let acc = db.payables().get_by_id(&acc.id).await.unwrap().unwrap();
        assert_eq!(acc.state, AccountState::Pending);
    }

    #[tokio::test]
    async fn negative_payment_is_rejected() {
        let db = test_db().await;
        let acc = db.payables().create(invoice(100_000, 0, None)).await.unwrap();

        let err = db
            .payables()
            .submit_payment(&acc.id, Money::from_cents(-500), None, None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Settlement(SettlementError::NegativeAmount { .. })
        ));
        assert!(db.payables().list_payments(&acc.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_account_is_not_found() {
        let db = test_db().await;
        let err = db
            .payables()
            .submit_payment("missing", Money::from_cents(100), None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    /// Two settling payments racing on the same account: exactly one may
    /// win. The loser surfaces as Conflict, or as a settlement rejection
    /// if its transaction serialized after the winner's commit.
    #[tokio::test]
    async fn concurrent_final_payments_settle_once() {
        let db = test_db().await;
        let acc = db.payables().create(invoice(10_000, 0, None)).await.unwrap();

        let payables_a = db.payables();
        let payables_b = db.payables();
        let (ra, rb) = tokio::join!(
            payables_a.submit_payment(&acc.id, Money::from_cents(10_000), None, None),
            payables_b.submit_payment(&acc.id, Money::from_cents(10_000), None, None),
        );

        let outcomes = [ra, rb];
        let accepted = outcomes.iter().filter(|r| r.is_ok()).count();
        assert_eq!(accepted, 1, "exactly one settlement must win");

        let loser = outcomes.iter().find(|r| r.is_err()).unwrap();
        match loser.as_ref().unwrap_err() {
            DbError::Conflict { .. } => {}
            DbError::Settlement(SettlementError::AlreadyPaid { .. }) => {}
            DbError::Settlement(SettlementError::ExceedsBalance { .. }) => {}
            other => panic!("unexpected loser error: {other}"),
        }

        let account = db.payables().get_by_id(&acc.id).await.unwrap().unwrap();
        assert_eq!(account.state, AccountState::Paid);
        assert_eq!(db.payables().list_payments(&acc.id).await.unwrap().len(), 1);
    }

    /// Same race on a file-backed database with real connection
    /// parallelism: the loser must surface as the retryable Conflict or
    /// an engine rejection against fresh state, never as a raw store
    /// error like "database is locked".
    #[tokio::test]
    async fn racing_writers_on_separate_connections_get_domain_errors() {
        let (db, path) = temp_file_db(4).await;

        for round in 0..10 {
            let acc = db.payables().create(invoice(10_000, 0, None)).await.unwrap();

            let payables_a = db.payables();
            let payables_b = db.payables();
            let (ra, rb) = tokio::join!(
                payables_a.submit_payment(&acc.id, Money::from_cents(10_000), None, None),
                payables_b.submit_payment(&acc.id, Money::from_cents(10_000), None, None),
            );

            let outcomes = [ra, rb];
            let accepted = outcomes.iter().filter(|r| r.is_ok()).count();
            assert_eq!(accepted, 1, "round {round}: exactly one settlement must win");

            let loser = outcomes.iter().find(|r| r.is_err()).unwrap();
            match loser.as_ref().unwrap_err() {
                DbError::Conflict { .. }
                | DbError::Settlement(SettlementError::AlreadyPaid { .. })
                | DbError::Settlement(SettlementError::ExceedsBalance { .. }) => {}
                other => panic!("round {round}: unexpected loser error: {other}"),
            }

            let account = db.payables().get_by_id(&acc.id).await.unwrap().unwrap();
            assert_eq!(account.state, AccountState::Paid);
            assert_eq!(db.payables().list_payments(&acc.id).await.unwrap().len(), 1);
        }

        db.close().await;
        remove_db_files(&path);
    }

    #[tokio::test]
    async fn monthly_aggregation_totals_cash_and_discounts() {
        let db = test_db().await;
        let acc = db.payables().create(invoice(100_000, 1000, Some(3))).await.unwrap();
        db.payables()
            .submit_payment(&acc.id, Money::from_cents(90_000), None, None)
            .await
            .unwrap();

        let months = db.payables().paid_by_month().await.unwrap();
        assert_eq!(months.len(), 1);
        assert_eq!(months[0].month, Utc::now().format("%Y-%m").to_string());
        assert_eq!(months[0].cash_cents, 90_000);
        assert_eq!(months[0].discount_cents, 10_000);
    }
}
