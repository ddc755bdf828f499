//! # Error Types
//!
//! Domain-specific error types for taller-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  taller-core errors (this file)                                         │
//! │  ├── ValidationError  - Input validation failures                       │
//! │  └── SettlementError  - Rejected payable payments                       │
//! │                                                                         │
//! │  taller-db errors (separate crate)                                      │
//! │  └── DbError          - Store failures, lost races; wraps the above     │
//! │                                                                         │
//! │  Flow: ValidationError / SettlementError → DbError → calling layer      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (amounts, ids)
//! 3. Errors are enum variants, never String
//! 4. A rejected payment is an error value, not a panic — the caller
//!    decides whether it is retryable

use thiserror::Error;

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when user input doesn't meet requirements. Used for early
/// validation before business logic runs.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be strictly positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format or inconsistent combination of fields.
    #[error("{field} has invalid value: {reason}")]
    Invalid { field: String, reason: String },
}

// =============================================================================
// Settlement Error
// =============================================================================

/// Reasons the settlement engine rejects a proposed payment.
///
/// All three are non-retryable without changing the input, and a rejected
/// payment leaves the account and its payment history untouched.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettlementError {
    /// The account is already fully settled; Paid is terminal.
    #[error("account {account_id} is already paid")]
    AlreadyPaid { account_id: String },

    /// A payment cannot take money back.
    #[error("negative payment: {proposed_cents} cents")]
    NegativeAmount { proposed_cents: i64 },

    /// The payment exceeds the balance needed to settle the account
    /// right now (after any early-payment discount in effect).
    #[error("payment exceeds balance: proposed {proposed_cents} cents, outstanding {target_cents} cents")]
    ExceedsBalance {
        proposed_cents: i64,
        target_cents: i64,
    },
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Convenience alias for validation results.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Convenience alias for settlement results.
pub type SettlementResult<T> = Result<T, SettlementError>;

// =============================================================================
// Unit Tests
// =============================================================================
