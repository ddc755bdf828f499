//! # Validation Module
//!
//! Input validation for the request structs before they reach business
//! logic or the store.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Calling layer (HTTP / UI)                                     │
//! │  ├── Presence/type checks, numeric parsing of request bodies           │
//! │  └── Immediate user feedback                                            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE — business rule validation on typed input         │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                             │
//! │  ├── NOT NULL / UNIQUE / FK constraints                                 │
//! │  └── CHECK constraints on amounts                                       │
//! │                                                                         │
//! │  Defense in depth: multiple layers catch different errors               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::{ValidationError, ValidationResult};
use crate::types::{
    NewPayableAccount, NewProduct, NewRepairOrder, NewSale, NewSupplier, ProductUpdate,
};
use crate::{MAX_DISCOUNT_BPS, MAX_SALE_ITEMS};

/// Maximum length for short free-text fields (names, methods, locations).
const MAX_TEXT_LEN: usize = 200;

// =============================================================================
// Field Validators
// =============================================================================

/// Validates a required free-text field: non-empty after trimming and
/// within length bounds.
pub fn validate_required_text(field: &str, value: &str) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.len() > MAX_TEXT_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_TEXT_LEN,
        });
    }

    Ok(())
}

/// Validates an amount that must be strictly positive (invoice totals,
/// sale totals).
pub fn validate_positive_cents(field: &str, cents: i64) -> ValidationResult<()> {
    if cents <= 0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Validates an early-payment discount rate: `[0, 10000)` basis points.
/// 100% is not a discount, it is a write-off.
pub fn validate_discount_bps(bps: u32) -> ValidationResult<()> {
    if bps >= MAX_DISCOUNT_BPS {
        return Err(ValidationError::OutOfRange {
            field: "early_discount_bps".to_string(),
            min: 0,
            max: MAX_DISCOUNT_BPS as i64 - 1,
        });
    }
    Ok(())
}

/// Validates a stock or sale quantity.
pub fn validate_quantity(field: &str, quantity: i64) -> ValidationResult<()> {
    if quantity <= 0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Request Struct Validators
// =============================================================================

/// Validates a new payable account before it is persisted.
///
/// ## Rules
/// - total must be > 0 (it is immutable afterwards, so a zero total
///   could never be settled meaningfully)
/// - discount rate within `[0, 10000)` bps
/// - when both dates are present, the due date cannot precede the
///   issue date
pub fn validate_new_account(input: &NewPayableAccount) -> ValidationResult<()> {
    validate_positive_cents("total_cents", input.total_cents)?;
    validate_discount_bps(input.early_discount_bps)?;

    if let (Some(issued), Some(due)) = (input.issue_date, input.due_date) {
        if due < issued {
            return Err(ValidationError::Invalid {
                field: "due_date".to_string(),
                reason: "due date precedes issue date".to_string(),
            });
        }
    }

    Ok(())
}

/// Validates a supplier create/update payload.
pub fn validate_supplier(input: &NewSupplier) -> ValidationResult<()> {
    validate_required_text("name", &input.name)
}

/// Validates a new product with its initial stock.
pub fn validate_new_product(input: &NewProduct) -> ValidationResult<()> {
    validate_required_text("name", &input.name)?;
    validate_required_text("location", &input.location)?;

    if input.price_cents < 0 {
        return Err(ValidationError::Invalid {
            field: "price_cents".to_string(),
            reason: "price cannot be negative".to_string(),
        });
    }

    if input.initial_quantity < 0 {
        return Err(ValidationError::Invalid {
            field: "initial_quantity".to_string(),
            reason: "initial quantity cannot be negative".to_string(),
        });
    }

    Ok(())
}

/// Validates a product edit payload.
pub fn validate_product_update(input: &ProductUpdate) -> ValidationResult<()> {
    validate_required_text("name", &input.name)?;

    if input.price_cents < 0 {
        return Err(ValidationError::Invalid {
            field: "price_cents".to_string(),
            reason: "price cannot be negative".to_string(),
        });
    }

    Ok(())
}

/// Validates a repair-order intake form.
pub fn validate_new_order(input: &NewRepairOrder) -> ValidationResult<()> {
    validate_required_text("customer_name", &input.customer_name)?;
    validate_required_text("reported_fault", &input.reported_fault)?;
    Ok(())
}

/// Validates a checkout payload.
///
/// ## Rules
/// - at least one line item, at most [`MAX_SALE_ITEMS`]
/// - positive total
/// - every line has a description and a positive quantity
pub fn validate_new_sale(input: &NewSale) -> ValidationResult<()> {
    if input.items.is_empty() {
        return Err(ValidationError::Required {
            field: "items".to_string(),
        });
    }

    if input.items.len() > MAX_SALE_ITEMS {
        return Err(ValidationError::OutOfRange {
            field: "items".to_string(),
            min: 1,
            max: MAX_SALE_ITEMS as i64,
        });
    }

    validate_positive_cents("total_cents", input.total_cents)?;
    validate_required_text("location", &input.location)?;

    for item in &input.items {
        validate_required_text("item.description", &item.description)?;
        validate_quantity("item.quantity", item.quantity)?;
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
