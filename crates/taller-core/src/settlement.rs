//! # Settlement Engine
//!
//! Decides what happens when a payment (abono) is proposed against a
//! payable account: whether to accept it, how much early-payment
//! discount to forgive, and which state the account ends up in.
//!
//! ## The Early-Payment Discount Rule
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  A supplier invoice of $1,000 with a 10% pronto-pago discount and a    │
//! │  due date of Friday:                                                   │
//! │                                                                        │
//! │  • Pay $900 on Thursday  → account settles; $100 is forgiven as a      │
//! │                            discount line on that payment.              │
//! │  • Pay $500 on Thursday  → partial payment; NO discount is earned,     │
//! │                            the account stays open at $400-to-settle    │
//! │                            ($900 discounted total − $500 paid).        │
//! │  • Pay the rest Saturday → window closed; the remaining $500 of the    │
//! │                            undiscounted balance is owed in full.       │
//! │                                                                        │
//! │  The discount is honored only when the FULL remaining balance is       │
//! │  settled on or before the due date. The settling payment absorbs the   │
//! │  residual gap as a discount line, keeping cash received and balance    │
//! │  forgiven separately auditable.                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Purity
//! Everything here is a pure function of `(account snapshot, paid_so_far,
//! proposed amount, today)`. The caller (taller-db) reads the snapshot and
//! writes the outcome inside one transaction; this module never touches
//! the clock or the store.
//!
//! ## Exact Arithmetic
//! All amounts are integer cents, so finality is exact equality against
//! the target balance and overpayment is an exact comparison. There is no
//! rounding tolerance anywhere in this module.

use chrono::NaiveDate;
use serde::Serialize;
use ts_rs::TS;

use crate::error::{SettlementError, SettlementResult};
use crate::money::Money;
use crate::types::{AccountState, PayableAccount};

// =============================================================================
// Outstanding Balance
// =============================================================================

/// The two balances of an open account, plus whether the early-payment
/// discount window is in effect.
///
/// - `raw_balance` is what is owed with no discount: `total − cash paid`.
/// - `target_balance` is what must be paid **right now** to fully settle:
///   the discounted total minus cash paid while the window is open,
///   otherwise the raw balance.
///
/// Granted discounts are excluded from `paid_so_far` by the caller — they
/// are forgiven balance, not cash received — but an account carrying a
/// granted discount is already `Paid` and never reaches this computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct Outstanding {
    pub raw_balance: Money,
    pub target_balance: Money,
    pub eligible: bool,
}

/// Computes the outstanding balances of an account.
///
/// `paid_so_far` is the sum of prior cash payments (`amount_cents` only).
/// Eligibility is evaluated against `today`, not the account's creation
/// date: the discount lapses the day after `due_date`.
pub fn outstanding(account: &PayableAccount, paid_so_far: Money, today: NaiveDate) -> Outstanding {
    let raw_balance = account.total() - paid_so_far;

    let eligible = match account.due_date {
        Some(due) => today <= due && !account.discount_rate().is_zero(),
        None => false,
    };

    let target_balance = if eligible {
        let discounted_total = account.total().apply_percentage_discount(account.discount_rate());
        discounted_total - paid_so_far
    } else {
        raw_balance
    };

    Outstanding {
        raw_balance,
        target_balance,
        eligible,
    }
}

// =============================================================================
// Payment Evaluation
// =============================================================================

/// The accepted outcome of a proposed payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct SettlementDecision {
    /// State the account transitions to when this decision is persisted.
    pub new_state: AccountState,

    /// Cash amount of the payment (echoed from the proposal).
    pub amount: Money,

    /// Balance forgiven on this payment. Zero unless the payment is final
    /// and the discount window is open, in which case it is the gap
    /// between the undiscounted balance and the cash paid.
    pub discount_granted: Money,

    /// The balances the decision was computed against.
    pub outstanding: Outstanding,
}

impl SettlementDecision {
    /// True when this decision settles the account.
    #[inline]
    pub fn is_final(&self) -> bool {
        self.new_state == AccountState::Paid
    }
}

/// Evaluates a proposed payment against an account snapshot.
///
/// ## Preconditions checked here
/// - the account is not already `Paid`
/// - the amount is not negative
/// - the amount does not exceed the current target balance
///
/// ## Decision
/// - `proposed == target_balance` → final: account goes `Paid`, and if
///   the discount window is open the residual `raw_balance − proposed`
///   is granted as the discount line
/// - otherwise → account goes (or stays) `Partial`, no discount
///
/// Note the granted discount is **not** `total × rate`: earlier payments
/// outside the window shrink the residual the discount can still forgive.
pub fn evaluate_payment(
    account: &PayableAccount,
    paid_so_far: Money,
    proposed: Money,
    today: NaiveDate,
) -> SettlementResult<SettlementDecision> {
    if account.is_paid() {
        return Err(SettlementError::AlreadyPaid {
            account_id: account.id.clone(),
        });
    }

    if proposed.is_negative() {
        return Err(SettlementError::NegativeAmount {
            proposed_cents: proposed.cents(),
        });
    }

    let outstanding = outstanding(account, paid_so_far, today);

    if proposed > outstanding.target_balance {
        return Err(SettlementError::ExceedsBalance {
            proposed_cents: proposed.cents(),
            target_cents: outstanding.target_balance.cents(),
        });
    }

    let is_final = proposed == outstanding.target_balance;

    let (new_state, discount_granted) = if is_final {
        let discount = if outstanding.eligible {
            outstanding.raw_balance - proposed
        } else {
            Money::zero()
        };
        (AccountState::Paid, discount)
    } else {
        (AccountState::Partial, Money::zero())
    };

    Ok(SettlementDecision {
        new_state,
        amount: proposed,
        discount_granted,
        outstanding,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn account(total_cents: i64, discount_bps: u32, due_date: Option<NaiveDate>) -> PayableAccount {
        PayableAccount {
            id: "acc-1".to_string(),
            supplier_id: None,
            invoice_number: Some("F-0042".to_string()),
            description: None,
            total_cents,
            early_discount_bps: discount_bps,
            issue_date: None,
            due_date,
            state: AccountState::Pending,
            payment_seq: 0,
            created_at: Utc::now(),
        }
    }

    fn today() -> NaiveDate {
        Utc::now().date_naive()
    }

    #[test]
    fn full_payment_settles_without_discount() {
        let acc = account(100_000, 0, None);
        let decision =
            evaluate_payment(&acc, Money::zero(), Money::from_cents(100_000), today()).unwrap();

        assert_eq!(decision.new_state, AccountState::Paid);
        assert!(decision.is_final());
        assert_eq!(decision.discount_granted, Money::zero());
    }

    /// Scenario: $1,000 invoice, 10% discount, due tomorrow. Paying the
    /// discounted total of $900 today settles the account and forgives
    /// the remaining $100.
    #[test]
    fn discounted_settlement_within_window() {
        let acc = account(100_000, 1000, Some(today() + Duration::days(1)));

        let out = outstanding(&acc, Money::zero(), today());
        assert!(out.eligible);
        assert_eq!(out.raw_balance.cents(), 100_000);
        assert_eq!(out.target_balance.cents(), 90_000);

        let decision =
            evaluate_payment(&acc, Money::zero(), Money::from_cents(90_000), today()).unwrap();
        assert_eq!(decision.new_state, AccountState::Paid);
        assert_eq!(decision.discount_granted.cents(), 10_000);
    }

    /// Scenario: partial inside the window, remainder after it lapses.
    /// The partial payment earns nothing; once the due date passes the
    /// target reverts to the raw balance and settles without a discount.
    #[test]
    fn partial_then_lapsed_window() {
        let due = today();
        let acc = account(100_000, 1000, Some(due));

        // Day 1 (on the due date): pay 500.00 of the 900.00 target.
        let d1 = evaluate_payment(&acc, Money::zero(), Money::from_cents(50_000), due).unwrap();
        assert_eq!(d1.new_state, AccountState::Partial);
        assert_eq!(d1.discount_granted, Money::zero());

        // Day 2 (window closed): target is the raw balance again.
        let day2 = due + Duration::days(1);
        let mut acc2 = acc.clone();
        acc2.state = AccountState::Partial;

        let out = outstanding(&acc2, Money::from_cents(50_000), day2);
        assert!(!out.eligible);
        assert_eq!(out.target_balance.cents(), 50_000);

        let d2 =
            evaluate_payment(&acc2, Money::from_cents(50_000), Money::from_cents(40_000), day2)
                .unwrap();
        assert_eq!(d2.new_state, AccountState::Partial);

        // Final 100.00 settles with no discount.
        let d3 =
            evaluate_payment(&acc2, Money::from_cents(90_000), Money::from_cents(10_000), day2)
                .unwrap();
        assert_eq!(d3.new_state, AccountState::Paid);
        assert_eq!(d3.discount_granted, Money::zero());
    }

    #[test]
    fn overpayment_is_rejected_exactly() {
        let acc = account(100_000, 0, None);
        let err = evaluate_payment(&acc, Money::zero(), Money::from_cents(100_001), today())
            .unwrap_err();

        assert_eq!(
            err,
            SettlementError::ExceedsBalance {
                proposed_cents: 100_001,
                target_cents: 100_000,
            }
        );
    }

    #[test]
    fn overpayment_checked_against_discounted_target() {
        // 900.01 exceeds the 900.00 discounted target even though it is
        // well under the raw 1,000.00 balance.
        let acc = account(100_000, 1000, Some(today() + Duration::days(7)));
        let err = evaluate_payment(&acc, Money::zero(), Money::from_cents(90_001), today())
            .unwrap_err();

        assert!(matches!(err, SettlementError::ExceedsBalance { target_cents: 90_000, .. }));
    }

    #[test]
    fn negative_payment_is_rejected() {
        let acc = account(100_000, 0, None);
        let err =
            evaluate_payment(&acc, Money::zero(), Money::from_cents(-500), today()).unwrap_err();
        assert_eq!(err, SettlementError::NegativeAmount { proposed_cents: -500 });
    }

    #[test]
    fn paid_account_rejects_everything() {
        let mut acc = account(100_000, 0, None);
        acc.state = AccountState::Paid;

        let err = evaluate_payment(&acc, Money::from_cents(100_000), Money::zero(), today())
            .unwrap_err();
        assert_eq!(
            err,
            SettlementError::AlreadyPaid {
                account_id: "acc-1".to_string()
            }
        );
    }

    #[test]
    fn discount_without_due_date_never_applies() {
        let acc = account(100_000, 1000, None);
        let out = outstanding(&acc, Money::zero(), today());
        assert!(!out.eligible);
        assert_eq!(out.target_balance.cents(), 100_000);
    }

    #[test]
    fn due_date_is_inclusive() {
        let acc = account(100_000, 1000, Some(today()));
        assert!(outstanding(&acc, Money::zero(), today()).eligible);
        assert!(!outstanding(&acc, Money::zero(), today() + Duration::days(1)).eligible);
    }

    #[test]
    fn zero_payment_is_accepted_as_partial() {
        let acc = account(100_000, 0, None);
        let decision = evaluate_payment(&acc, Money::zero(), Money::zero(), today()).unwrap();
        assert_eq!(decision.new_state, AccountState::Partial);
        assert_eq!(decision.discount_granted, Money::zero());
    }

    /// Cash received plus balance forgiven always reconstructs the exact
    /// invoice total on settlement, regardless of the payment path.
    #[test]
    fn settlement_partitions_total_exactly() {
        let due = today() + Duration::days(3);
        let acc = account(77_777, 725, Some(due)); // odd total, 7.25%

        let out = outstanding(&acc, Money::zero(), today());
        let decision = evaluate_payment(&acc, Money::zero(), out.target_balance, today()).unwrap();

        assert!(decision.is_final());
        assert_eq!(
            (decision.amount + decision.discount_granted).cents(),
            acc.total_cents
        );
    }

    /// Partial payments inside the window shrink the residual the
    /// discount can forgive: the granted amount is whatever gap remains,
    /// not total × rate.
    #[test]
    fn discount_is_residual_not_proportional() {
        let due = today() + Duration::days(3);
        let acc = account(100_000, 1000, Some(due));

        // 600.00 paid inside the window (target was 900.00).
        let paid = Money::from_cents(60_000);
        let out = outstanding(&acc, paid, today());
        assert_eq!(out.target_balance.cents(), 30_000);

        let decision = evaluate_payment(&acc, paid, Money::from_cents(30_000), today()).unwrap();
        assert_eq!(decision.new_state, AccountState::Paid);
        // raw balance 40,000 − cash 30,000 = 10,000 forgiven, which is
        // still total × 10% here because every payment stayed in-window.
        assert_eq!(decision.discount_granted.cents(), 10_000);
        assert_eq!((paid + decision.amount + decision.discount_granted).cents(), 100_000);
    }
}
