//! Per-facility credit line ledger.
//!
//! Holds the outstanding balance, owed amounts, and term clock for one
//! borrower facility, and owns the `assess` state transition that commits
//! the Accountant's results. States (Uninitialized, Active, Late,
//! Delinquent, TermEnded, FullyRepaid) are implicit in field values;
//! [`CreditLine::status`] derives them for inspection only.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::accountant::{self, PaymentAllocation};
use crate::error::TranchedCreditError;
use crate::fixed_point::{validate_amount, validate_rate, SECONDS_PER_DAY};
use crate::types::{AuthContext, Money, ProtocolConfig, Rate, Role, Timestamp};
use crate::TranchedCreditResult;

// ---------------------------------------------------------------------------
// Terms
// ---------------------------------------------------------------------------

/// Immutable facility terms, fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CreditLineTerms {
    /// Maximum outstanding principal.
    pub limit: Money,
    pub interest_apr: Rate,
    pub late_fee_apr: Rate,
    pub payment_period_in_days: u64,
    pub term_in_days: u64,
    pub principal_grace_period_in_days: u64,
}

impl CreditLineTerms {
    pub fn validate(&self) -> TranchedCreditResult<()> {
        validate_amount(self.limit, "limit")?;
        validate_rate(self.interest_apr, "interest_apr")?;
        validate_rate(self.late_fee_apr, "late_fee_apr")?;
        if self.payment_period_in_days == 0 {
            return Err(TranchedCreditError::invalid_input(
                "payment_period_in_days",
                "must be positive",
            ));
        }
        if self.term_in_days < self.payment_period_in_days {
            return Err(TranchedCreditError::invalid_input(
                "term_in_days",
                "must be at least one payment period",
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Credit line
// ---------------------------------------------------------------------------

/// Derived lifecycle stage; never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CreditLineStatus {
    Uninitialized,
    Active,
    Late,
    Delinquent,
    TermEnded,
    FullyRepaid,
}

/// Outcome of one `assess` transition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AssessmentResult {
    pub interest_accrued: Money,
    pub principal_accrued: Money,
    pub payment: PaymentAllocation,
}

impl AssessmentResult {
    /// Principal actually collected, including early balance paydown.
    pub fn principal_collected(&self) -> Money {
        self.payment.principal_payment + self.payment.additional_balance_payment
    }
}

/// One borrower facility. Uninitialized until the first drawdown starts
/// the term clock; persists at zero balance, never destroyed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditLine {
    pub terms: CreditLineTerms,
    /// Outstanding principal. Only moves via drawdown or payment
    /// allocation, never by accrual.
    pub balance: Money,
    pub interest_owed: Money,
    pub principal_owed: Money,
    /// Funds transferred in but not yet applied by `assess`.
    #[serde(default)]
    pub collected_payment_balance: Money,
    pub interest_accrued_as_of: Timestamp,
    pub last_full_payment_time: Timestamp,
    pub term_start_time: Timestamp,
    /// Zero until initialized; the initialization sentinel.
    pub term_end_time: Timestamp,
    pub next_due_time: Timestamp,
}

impl CreditLine {
    pub fn new(terms: CreditLineTerms) -> TranchedCreditResult<Self> {
        terms.validate()?;
        Ok(CreditLine {
            terms,
            balance: Decimal::ZERO,
            interest_owed: Decimal::ZERO,
            principal_owed: Decimal::ZERO,
            collected_payment_balance: Decimal::ZERO,
            interest_accrued_as_of: 0,
            last_full_payment_time: 0,
            term_start_time: 0,
            term_end_time: 0,
            next_due_time: 0,
        })
    }

    pub fn is_initialized(&self) -> bool {
        self.term_end_time > 0
    }

    pub fn period_in_seconds(&self) -> u64 {
        self.terms.payment_period_in_days * SECONDS_PER_DAY
    }

    /// Start the term clock. Called on the first drawdown.
    pub(crate) fn start_term(&mut self, timestamp: Timestamp) {
        self.term_start_time = timestamp;
        self.term_end_time = timestamp + self.terms.term_in_days * SECONDS_PER_DAY;
        self.next_due_time = timestamp + self.period_in_seconds();
        self.interest_accrued_as_of = timestamp;
        self.last_full_payment_time = timestamp;
    }

    // -----------------------------------------------------------------------
    // Operations
    // -----------------------------------------------------------------------

    /// Draw principal against the facility. Borrower only. The first
    /// drawdown initializes the term; later drawdowns accrue interest on
    /// the pre-drawdown balance up to `timestamp` before increasing it.
    pub fn drawdown(
        &mut self,
        auth: &AuthContext,
        amount: Money,
        timestamp: Timestamp,
        config: &ProtocolConfig,
    ) -> TranchedCreditResult<()> {
        auth.require(Role::Borrower, "drawdown")?;
        validate_amount(amount, "amount")?;

        if !self.is_initialized() {
            self.start_term(timestamp);
        } else {
            if timestamp >= self.term_end_time {
                return Err(TranchedCreditError::invalid_state(
                    "drawdown",
                    "term has ended",
                ));
            }
            if timestamp < self.interest_accrued_as_of {
                return Err(TranchedCreditError::invalid_input(
                    "timestamp",
                    "precedes the accrual checkpoint",
                ));
            }
        }

        if self.balance + amount > self.terms.limit {
            return Err(TranchedCreditError::invalid_input(
                "amount",
                "would exceed the facility limit",
            ));
        }

        // Accrue at the old balance before the balance changes.
        let accrual = accountant::calculate_interest_and_principal_accrued(
            self,
            timestamp,
            config.late_fee_grace_period_in_days,
        )?;
        self.interest_owed += accrual.interest_accrued;
        self.principal_owed += accrual.principal_accrued;
        self.interest_accrued_as_of = timestamp.min(self.term_end_time);

        self.balance += amount;
        Ok(())
    }

    /// Transfer funds into the facility for the next assessment.
    pub fn collect_payment(&mut self, amount: Money) -> TranchedCreditResult<()> {
        validate_amount(amount, "amount")?;
        self.collected_payment_balance += amount;
        Ok(())
    }

    /// Advance accrual to `timestamp` and apply any collected funds.
    ///
    /// Compute-then-commit: the Accountant produces all deltas from the
    /// pre-transition snapshot, then every field is written once.
    /// Re-assessing at the same timestamp with no new funds is a no-op.
    pub fn assess(
        &mut self,
        timestamp: Timestamp,
        config: &ProtocolConfig,
    ) -> TranchedCreditResult<AssessmentResult> {
        if !self.is_initialized() {
            return Err(TranchedCreditError::invalid_state(
                "assess",
                "credit line is uninitialized",
            ));
        }
        if timestamp < self.interest_accrued_as_of {
            return Err(TranchedCreditError::invalid_input(
                "timestamp",
                "precedes the accrual checkpoint",
            ));
        }

        let accrual = accountant::calculate_interest_and_principal_accrued(
            self,
            timestamp,
            config.late_fee_grace_period_in_days,
        )?;
        let interest_owed = self.interest_owed + accrual.interest_accrued;
        let principal_owed = self.principal_owed + accrual.principal_accrued;

        let payment = accountant::allocate_payment(
            self.collected_payment_balance,
            self.balance,
            interest_owed,
            principal_owed,
        )?;

        // Commit.
        self.interest_owed = interest_owed - payment.interest_payment;
        self.principal_owed = principal_owed - payment.principal_payment;
        self.balance -= payment.principal_payment + payment.additional_balance_payment;
        self.collected_payment_balance -= payment.total();

        if self.interest_owed.is_zero() && self.principal_owed.is_zero() {
            self.last_full_payment_time = timestamp;
            self.advance_next_due_time(timestamp);
        }
        self.interest_accrued_as_of = timestamp.min(self.term_end_time);

        Ok(AssessmentResult {
            interest_accrued: accrual.interest_accrued,
            principal_accrued: accrual.principal_accrued,
            payment,
        })
    }

    /// Move `next_due_time` to the first period boundary after
    /// `timestamp`, skipping any missed periods, capped at term end.
    fn advance_next_due_time(&mut self, timestamp: Timestamp) {
        if timestamp < self.next_due_time || self.next_due_time >= self.term_end_time {
            return;
        }
        let period = self.period_in_seconds();
        let elapsed_periods = (timestamp - self.term_start_time) / period + 1;
        let candidate = self.term_start_time + elapsed_periods * period;
        self.next_due_time = candidate.min(self.term_end_time);
    }

    // -----------------------------------------------------------------------
    // Read-only inspectors (never reject)
    // -----------------------------------------------------------------------

    /// Interest that would be owed if assessed at `timestamp`. Zero for an
    /// uninitialized line.
    pub fn interest_owed_at(
        &self,
        timestamp: Timestamp,
        config: &ProtocolConfig,
    ) -> TranchedCreditResult<Money> {
        if !self.is_initialized() || timestamp < self.interest_accrued_as_of {
            return Ok(self.interest_owed);
        }
        let accrual = accountant::calculate_interest_and_principal_accrued(
            self,
            timestamp,
            config.late_fee_grace_period_in_days,
        )?;
        Ok(self.interest_owed + accrual.interest_accrued)
    }

    /// Derive the implicit lifecycle stage at `timestamp`.
    pub fn status(
        &self,
        timestamp: Timestamp,
        config: &ProtocolConfig,
    ) -> TranchedCreditResult<CreditLineStatus> {
        if !self.is_initialized() {
            return Ok(CreditLineStatus::Uninitialized);
        }
        if self.balance.is_zero() && self.interest_owed.is_zero() && self.principal_owed.is_zero()
        {
            return Ok(CreditLineStatus::FullyRepaid);
        }
        let writedown = accountant::calculate_writedown_for(
            self,
            timestamp,
            config.writedown_grace_period_in_days,
            config.writedown_max_days_late,
        )?;
        if writedown.percent > Decimal::ZERO {
            return Ok(CreditLineStatus::Delinquent);
        }
        if timestamp >= self.term_end_time {
            return Ok(CreditLineStatus::TermEnded);
        }
        let past_due = timestamp >= self.next_due_time
            && (self.interest_owed > Decimal::ZERO || self.principal_owed > Decimal::ZERO);
        if past_due {
            return Ok(CreditLineStatus::Late);
        }
        Ok(CreditLineStatus::Active)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
