//! # taller-core: Pure Business Logic for Taller
//!
//! This crate is the **heart** of Taller, the operations backend for an
//! electronics repair shop. It contains all business logic as pure
//! functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Taller Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  Calling Layer (HTTP / UI)                      │   │
//! │  │   intake forms ──► inventory ──► checkout ──► payables          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ taller-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌────────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │ settlement │  │   money   │  │ validation│  │   │
//! │  │   │ Payable   │  │ balances   │  │   Money   │  │   rules   │  │   │
//! │  │   │ Order ... │  │ discounts  │  │  (cents)  │  │   checks  │  │   │
//! │  │   └───────────┘  └────────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    taller-db (Database Layer)                   │   │
//! │  │              SQLite queries, migrations, repositories           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (PayableAccount, RepairOrder, Sale, etc.)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`settlement`] - The payable settlement engine
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: same input = same output; the settlement engine
//!    takes `today` as an argument instead of reading the clock
//! 2. **No I/O**: database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: all monetary values are in cents (i64) to avoid
//!    float errors
//! 4. **Explicit Errors**: all errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use taller_core::money::Money;
//! use taller_core::types::DiscountRate;
//!
//! // Create money from cents (never from floats!)
//! let invoice = Money::from_cents(100_000); // $1,000.00
//!
//! // Early-payment discount of 10% (1000 basis points)
//! let rate = DiscountRate::from_bps(1000);
//! let discounted = invoice.apply_percentage_discount(rate);
//! assert_eq!(discounted.cents(), 90_000);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod settlement;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use taller_core::Money` instead of
// `use taller_core::money::Money`

pub use error::{SettlementError, ValidationError};
pub use money::Money;
pub use settlement::{Outstanding, SettlementDecision};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Default minimum stock threshold for a new stock level row.
///
/// ## Business Reason
/// The shop reorders a part when its quantity at a workshop drops below
/// this value, unless the intake form specified something else.
pub const DEFAULT_MIN_STOCK: i64 = 5;

/// Maximum line items allowed on a single sale.
///
/// ## Business Reason
/// Prevents runaway checkouts and keeps receipts printable.
pub const MAX_SALE_ITEMS: usize = 100;

/// Upper bound (exclusive) for an early-payment discount, in basis points.
///
/// A 100% discount would make an account settle with no payment at all,
/// which is a write-off, not a discount.
pub const MAX_DISCOUNT_BPS: u32 = 10_000;
