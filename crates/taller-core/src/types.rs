//! # Domain Types
//!
//! Core domain types used throughout Taller.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌──────────────────┐   ┌──────────────────┐   ┌──────────────────┐    │
//! │  │  PayableAccount  │   │ SupplierPayment  │   │    Supplier      │    │
//! │  │  ──────────────  │   │  ──────────────  │   │  ──────────────  │    │
//! │  │  id (UUID)       │   │  id (UUID)       │   │  id (UUID)       │    │
//! │  │  total_cents     │   │  account_id (FK) │   │  name (unique)   │    │
//! │  │  early_discount  │   │  amount_cents    │   │  contact info    │    │
//! │  │  due_date, state │   │  discount_cents  │   └──────────────────┘    │
//! │  └──────────────────┘   └──────────────────┘                           │
//! │                                                                         │
//! │  ┌──────────────────┐   ┌──────────────────┐   ┌──────────────────┐    │
//! │  │   RepairOrder    │   │  Product/Stock   │   │  Sale/SaleItem   │    │
//! │  │  intake + status │   │  multi-location  │   │  POS checkout    │    │
//! │  └──────────────────┘   └──────────────────┘   └──────────────────┘    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Entities have an `id` (UUID v4, immutable, used for relations) and,
//! where it exists, a business identifier (invoice number, supplier name).
//!
//! ## Payments Are Append-Only
//! `SupplierPayment` rows are never mutated or deleted once recorded;
//! corrections are modeled as new payments.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Discount Rate
// =============================================================================

/// Early-payment discount rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 1000 bps = 10% (a typical pronto-pago discount)
///
/// The previous system stored this as a floating percent; basis points
/// keep discount math in integers end to end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DiscountRate(u32);

impl DiscountRate {
    /// Creates a discount rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        DiscountRate(bps)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero discount rate.
    #[inline]
    pub const fn zero() -> Self {
        DiscountRate(0)
    }

    /// Checks if the rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for DiscountRate {
    fn default() -> Self {
        DiscountRate::zero()
    }
}

// =============================================================================
// Payable Account
// =============================================================================

/// Lifecycle state of a payable account.
///
/// ```text
/// Pending ──payment──► Partial ──settling payment──► Paid (terminal)
///    └──────────────full settling payment───────────────┘
/// ```
///
/// - `Pending` ⟺ zero payments recorded
/// - `Paid` ⟺ cash received + discounts forgiven equals the total
/// - no payment is ever accepted against a `Paid` account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum AccountState {
    /// No payments recorded yet.
    Pending,
    /// At least one payment recorded, balance remains.
    Partial,
    /// Fully settled. Terminal.
    Paid,
}

impl Default for AccountState {
    fn default() -> Self {
        AccountState::Pending
    }
}

/// An obligation owed to a supplier, tracked until fully paid.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct PayableAccount {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Supplier the invoice came from, if known.
    pub supplier_id: Option<String>,

    /// Supplier's invoice number.
    pub invoice_number: Option<String>,

    /// Free-text description of what the invoice covers.
    pub description: Option<String>,

    /// Invoice total in cents. Always > 0, immutable after creation.
    pub total_cents: i64,

    /// Early-payment discount in basis points (1000 = 10%). Zero means
    /// no discount was negotiated.
    pub early_discount_bps: u32,

    /// Date the invoice was issued.
    #[ts(as = "Option<String>")]
    pub issue_date: Option<NaiveDate>,

    /// Last day the early-payment discount can be honored. Also used to
    /// sort the open-accounts listing.
    #[ts(as = "Option<String>")]
    pub due_date: Option<NaiveDate>,

    /// Current lifecycle state.
    pub state: AccountState,

    /// Optimistic-concurrency counter, incremented on every accepted
    /// payment. Guards the read-decide-write settlement sequence.
    pub payment_seq: i64,

    /// When the account was registered.
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl PayableAccount {
    /// Returns the invoice total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    /// Returns the early-payment discount rate.
    #[inline]
    pub fn discount_rate(&self) -> DiscountRate {
        DiscountRate::from_bps(self.early_discount_bps)
    }

    /// Checks whether the account is terminally settled.
    #[inline]
    pub fn is_paid(&self) -> bool {
        self.state == AccountState::Paid
    }
}

/// Input for registering a new payable account.
///
/// Validated by [`crate::validation::validate_new_account`] before it
/// reaches the store.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewPayableAccount {
    pub supplier_id: Option<String>,
    pub invoice_number: Option<String>,
    pub description: Option<String>,
    pub total_cents: i64,
    pub early_discount_bps: u32,
    #[ts(as = "Option<String>")]
    pub issue_date: Option<NaiveDate>,
    #[ts(as = "Option<String>")]
    pub due_date: Option<NaiveDate>,
}

/// A payment (abono) recorded against a payable account. Append-only.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct SupplierPayment {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Owning payable account.
    pub account_id: String,

    /// Cash actually handed over, in cents. Never negative.
    pub amount_cents: i64,

    /// Balance forgiven on this payment, in cents. Nonzero only on the
    /// settling payment of an account whose early-payment discount was
    /// still in its window.
    pub discount_cents: i64,

    /// Payment method, free text ("efectivo", "transferencia", ...).
    pub method: Option<String>,

    /// Free-text notes.
    pub notes: Option<String>,

    /// Server-assigned payment timestamp.
    #[ts(as = "String")]
    pub paid_at: DateTime<Utc>,
}

impl SupplierPayment {
    /// Cash amount as Money.
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }

    /// Forgiven amount as Money.
    #[inline]
    pub fn discount(&self) -> Money {
        Money::from_cents(self.discount_cents)
    }
}

/// Result of an accepted payment: the persisted record plus the state
/// the account transitioned to.
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
pub struct PaymentReceipt {
    pub payment: SupplierPayment,
    pub new_state: AccountState,
}

/// Filter for payable listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountFilter {
    /// Pending and partially paid accounts, soonest due first.
    Open,
    /// Settled accounts, most recently settled first.
    Paid,
}

/// A payable account as shown in listings: account columns plus the
/// derived paid total and last payment date. Computed by aggregation,
/// never stored redundantly.
#[derive(Debug, Clone, Serialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct PayableSummary {
    pub id: String,
    pub supplier_id: Option<String>,
    pub supplier_name: Option<String>,
    pub invoice_number: Option<String>,
    pub description: Option<String>,
    pub total_cents: i64,
    pub early_discount_bps: u32,
    #[ts(as = "Option<String>")]
    pub issue_date: Option<NaiveDate>,
    #[ts(as = "Option<String>")]
    pub due_date: Option<NaiveDate>,
    pub state: AccountState,

    /// SUM(amount + discount) over the account's payments: cash received
    /// plus balance forgiven, i.e. how much of the total is covered.
    pub paid_cents: i64,

    /// Timestamp of the most recent payment, if any. For `Paid` accounts
    /// this is the settlement date.
    #[ts(as = "Option<String>")]
    pub last_payment_at: Option<DateTime<Utc>>,
}

/// One row of the settlement-month aggregation: totals of cash paid and
/// discount forgiven across all payments in a calendar month.
#[derive(Debug, Clone, Serialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct MonthlyPaidTotal {
    /// Calendar month in `YYYY-MM` form.
    pub month: String,
    pub cash_cents: i64,
    pub discount_cents: i64,
}

// =============================================================================
// Supplier
// =============================================================================

/// A parts supplier.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Supplier {
    pub id: String,
    /// Business name. Unique.
    pub name: String,
    pub contact: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}

/// Input for creating or updating a supplier.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewSupplier {
    pub name: String,
    pub contact: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}

// =============================================================================
// Product & Stock
// =============================================================================

/// A part or accessory carried in inventory.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    /// Acquisition cost in cents (for margin reporting).
    pub cost_cents: Option<i64>,
    /// Sale price in cents.
    pub price_cents: i64,
    pub supplier_id: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// Returns the sale price as Money.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

/// Quantity of a product held at one workshop location.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct StockLevel {
    pub id: String,
    pub product_id: String,
    /// Workshop name. Stock is tracked per (product, location).
    pub location: String,
    pub quantity: i64,
    /// Reorder threshold.
    pub min_stock: i64,
}

/// Input for registering a product with its initial stock at one location.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewProduct {
    pub name: String,
    pub description: Option<String>,
    pub cost_cents: Option<i64>,
    pub price_cents: i64,
    pub supplier_id: Option<String>,
    /// Workshop receiving the initial stock.
    pub location: String,
    pub initial_quantity: i64,
    pub min_stock: Option<i64>,
}

/// Replacement values for a product's editable fields. Stock is adjusted
/// separately, through the per-location stock operations.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductUpdate {
    pub name: String,
    pub description: Option<String>,
    pub cost_cents: Option<i64>,
    pub price_cents: i64,
    pub supplier_id: Option<String>,
}

/// A product in the inventory listing: product columns plus supplier
/// name and the quantity summed across all locations.
#[derive(Debug, Clone, Serialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct ProductWithStock {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub cost_cents: Option<i64>,
    pub price_cents: i64,
    pub supplier_name: Option<String>,
    pub total_quantity: i64,
}

/// One page of the inventory listing.
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
pub struct ProductPage {
    pub items: Vec<ProductWithStock>,
    pub total_products: i64,
    pub total_pages: u32,
    pub page: u32,
}

// =============================================================================
// Repair Orders
// =============================================================================

/// Workflow status of a repair order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Device just received at the counter.
    Received,
    /// Technician is diagnosing the fault.
    Diagnosing,
    /// Waiting for the customer to approve the quote.
    AwaitingApproval,
    /// Repair in progress.
    Repairing,
    /// Blocked on a part.
    AwaitingParts,
    /// Repair finished, not yet ready at the counter.
    Repaired,
    /// Ready for the customer to pick up.
    ReadyForPickup,
    /// Handed back to the customer (set by checkout).
    Delivered,
    /// Device could not be repaired.
    Unrepairable,
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Received
    }
}

/// A repair order: the customer, the device, and the work done on it.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct RepairOrder {
    pub id: String,
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub customer_email: Option<String>,
    pub device_brand: Option<String>,
    pub device_model: Option<String>,
    pub serial_number: Option<String>,
    pub unlock_code: Option<String>,
    /// What the customer says is wrong. Required at intake.
    pub reported_fault: String,
    pub cosmetic_details: Option<String>,
    pub accessories: Option<String>,
    pub initial_quote_cents: Option<i64>,
    /// Workshop the device was received at.
    pub location: Option<String>,
    pub diagnosis: Option<String>,
    pub parts_used: Option<String>,
    pub final_price_cents: Option<i64>,
    pub status: OrderStatus,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// Intake form for a new repair order.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewRepairOrder {
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub customer_email: Option<String>,
    pub device_brand: Option<String>,
    pub device_model: Option<String>,
    pub serial_number: Option<String>,
    pub unlock_code: Option<String>,
    pub reported_fault: String,
    pub cosmetic_details: Option<String>,
    pub accessories: Option<String>,
    pub initial_quote_cents: Option<i64>,
    pub location: Option<String>,
}

/// Partial update applied by technicians as an order progresses.
/// `None` fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderUpdate {
    pub status: Option<OrderStatus>,
    pub diagnosis: Option<String>,
    pub parts_used: Option<String>,
    pub final_price_cents: Option<i64>,
}

impl OrderUpdate {
    /// True when the update carries no fields at all.
    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.diagnosis.is_none()
            && self.parts_used.is_none()
            && self.final_price_cents.is_none()
    }
}

/// Filter for the repair-order listing, mapping to status groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderFilter {
    All,
    /// Received, Diagnosing, AwaitingApproval.
    Pending,
    /// Repairing, AwaitingParts.
    InProgress,
    /// Repaired, ReadyForPickup, Delivered, Unrepairable.
    Completed,
}

// =============================================================================
// Sales
// =============================================================================

/// A point-of-sale checkout, optionally tied to a repair order.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Sale {
    pub id: String,
    /// Repair order delivered by this sale, if any.
    pub order_id: Option<String>,
    pub customer_name: Option<String>,
    pub customer_document: Option<String>,
    pub total_cents: i64,
    pub method: Option<String>,
    #[ts(as = "String")]
    pub sold_at: DateTime<Utc>,
}

/// A line item on a sale.
///
/// ## Snapshot Pattern
/// Description, unit price and unit cost are copied from the product at
/// checkout time so the sale history survives later product edits.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct SaleItem {
    pub id: String,
    pub sale_id: String,
    pub product_id: Option<String>,
    pub description: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub unit_cost_cents: i64,
    pub line_total_cents: i64,
}

/// Checkout input.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewSale {
    pub order_id: Option<String>,
    pub customer_name: Option<String>,
    pub customer_document: Option<String>,
    pub total_cents: i64,
    pub method: Option<String>,
    /// Workshop whose stock the item quantities are drawn from.
    pub location: String,
    pub items: Vec<NewSaleItem>,
}

/// One line of a checkout input.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewSaleItem {
    pub product_id: Option<String>,
    pub description: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub unit_cost_cents: i64,
    pub line_total_cents: i64,
}

/// A sale joined with its items.
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
pub struct SaleWithItems {
    pub sale: Sale,
    pub items: Vec<SaleItem>,
}

/// Sales report over a date range: aggregate totals plus the sales that
/// produced them.
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
pub struct SalesReport {
    pub income_cents: i64,
    pub cost_cents: i64,
    pub gross_profit_cents: i64,
    pub details: Vec<Sale>,
}

// =============================================================================
// Unit Tests
// =============================================================================
