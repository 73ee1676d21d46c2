//! The Accountant: pure, stateless calculation functions over a credit
//! line snapshot plus a target timestamp.
//!
//! - Interest/principal accrual across an elapsed window
//! - Write-down percent/amount from payment-implied lateness
//! - Strict interest -> principal -> balance payment waterfall
//!
//! Nothing here mutates state; the credit line commits results and is
//! responsible for advancing `interest_accrued_as_of`, which is what makes
//! repeated calls idempotent.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::credit_line::CreditLine;
use crate::error::TranchedCreditError;
use crate::fixed_point::{
    mul_div_down, saturating_sub_money, DAYS_PER_YEAR, HUNDRED, SECONDS_PER_DAY, SECONDS_PER_YEAR,
};
use crate::types::{Money, Timestamp};
use crate::TranchedCreditResult;

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// Interest and principal newly accrued over an assessment window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AccrualResult {
    pub interest_accrued: Money,
    pub principal_accrued: Money,
}

/// Expected-loss markdown for a delinquent credit line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WritedownResult {
    /// Whole percent in [0, 100], rounded down.
    pub percent: Decimal,
    pub amount: Money,
}

/// How a payment splits across the waterfall.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PaymentAllocation {
    pub interest_payment: Money,
    pub principal_payment: Money,
    pub additional_balance_payment: Money,
}

impl PaymentAllocation {
    pub fn total(&self) -> Money {
        self.interest_payment + self.principal_payment + self.additional_balance_payment
    }
}

// ---------------------------------------------------------------------------
// Accrual
// ---------------------------------------------------------------------------

/// Interest and principal accrued between `interest_accrued_as_of` and
/// `min(timestamp, term_end_time)`.
///
/// Interest is simple (non-compounding) on the pre-accrual balance. Once
/// the window extends past `last_full_payment_time` plus the grace period,
/// late-fee interest accrues on the same balance at `late_fee_apr` for the
/// portion of the window beyond the grace boundary. The full balance
/// becomes principal-due exactly when the window first crosses
/// `term_end_time`; committing `interest_accrued_as_of` forward prevents
/// re-triggering on later calls.
pub fn calculate_interest_and_principal_accrued(
    cl: &CreditLine,
    timestamp: Timestamp,
    late_fee_grace_period_in_days: u64,
) -> TranchedCreditResult<AccrualResult> {
    if !cl.is_initialized() {
        return Ok(AccrualResult::default());
    }

    let end = timestamp.min(cl.term_end_time);
    let as_of = cl.interest_accrued_as_of;
    let seconds_per_year = Decimal::from(SECONDS_PER_YEAR);

    let mut interest_accrued = Decimal::ZERO;
    if end > as_of {
        let elapsed = Decimal::from(end - as_of);
        interest_accrued = mul_div_down(
            cl.balance * cl.terms.interest_apr,
            elapsed,
            seconds_per_year,
            "interest accrual",
        )?;

        let grace_boundary = cl
            .last_full_payment_time
            .saturating_add(late_fee_grace_period_in_days * SECONDS_PER_DAY);
        if timestamp > grace_boundary {
            let late_start = as_of.max(grace_boundary);
            if end > late_start {
                let late_elapsed = Decimal::from(end - late_start);
                interest_accrued += mul_div_down(
                    cl.balance * cl.terms.late_fee_apr,
                    late_elapsed,
                    seconds_per_year,
                    "late fee accrual",
                )?;
            }
        }
    }

    // The balance falls due when the window first crosses term end.
    let principal_accrued = if timestamp >= cl.term_end_time && as_of < cl.term_end_time {
        cl.balance
    } else {
        Decimal::ZERO
    };

    Ok(AccrualResult {
        interest_accrued,
        principal_accrued,
    })
}

// ---------------------------------------------------------------------------
// Write-down
// ---------------------------------------------------------------------------

/// Write-down percent and amount implied by the magnitude of unpaid
/// interest.
///
/// Days late are backed out of `interest_owed` relative to one day's
/// interest on the current balance, so partial payments reduce lateness
/// rather than only missed checkpoints counting. Past `term_end_time`,
/// wall-clock days since term end are added on top; the two regimes agree
/// exactly at the boundary.
pub fn calculate_writedown_for(
    cl: &CreditLine,
    timestamp: Timestamp,
    grace_period_in_days: u64,
    max_days_late: u64,
) -> TranchedCreditResult<WritedownResult> {
    if max_days_late == 0 {
        return Err(TranchedCreditError::DivisionByZero {
            context: "writedown max_days_late".into(),
        });
    }
    if cl.balance.is_zero() {
        return Ok(WritedownResult::default());
    }

    let interest_owed_per_day = mul_div_down(
        cl.balance,
        cl.terms.interest_apr,
        DAYS_PER_YEAR,
        "writedown daily interest",
    )?;
    if interest_owed_per_day.is_zero() {
        return Ok(WritedownResult::default());
    }

    let mut days_late = cl.interest_owed / interest_owed_per_day;
    if timestamp > cl.term_end_time {
        days_late += Decimal::from(timestamp - cl.term_end_time) / Decimal::from(SECONDS_PER_DAY);
    }

    let grace = Decimal::from(grace_period_in_days);
    if days_late <= grace {
        return Ok(WritedownResult::default());
    }

    let raw = (days_late - grace) * HUNDRED / Decimal::from(max_days_late);
    let percent = raw.min(HUNDRED).trunc();
    let amount = mul_div_down(cl.balance, percent, HUNDRED, "writedown amount")?;

    Ok(WritedownResult { percent, amount })
}

// ---------------------------------------------------------------------------
// Payment allocation
// ---------------------------------------------------------------------------

/// Split a payment in strict waterfall order: interest owed, then
/// principal owed, then extra paydown of the remaining balance.
///
/// The components never total more than `payment_amount` and each is
/// capped by its corresponding owed amount or remaining balance.
pub fn allocate_payment(
    payment_amount: Money,
    balance: Money,
    total_interest_owed: Money,
    total_principal_owed: Money,
) -> TranchedCreditResult<PaymentAllocation> {
    for (value, field) in [
        (payment_amount, "payment_amount"),
        (balance, "balance"),
        (total_interest_owed, "total_interest_owed"),
        (total_principal_owed, "total_principal_owed"),
    ] {
        if value < Decimal::ZERO {
            return Err(TranchedCreditError::invalid_input(
                field,
                "cannot be negative",
            ));
        }
    }

    let interest_payment = payment_amount.min(total_interest_owed);
    let mut remaining = payment_amount - interest_payment;

    let principal_payment = remaining.min(total_principal_owed);
    remaining -= principal_payment;

    let balance_remaining = saturating_sub_money(balance, principal_payment);
    let additional_balance_payment = remaining.min(balance_remaining);

    Ok(PaymentAllocation {
        interest_payment,
        principal_payment,
        additional_balance_payment,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
