//! Tranched pool: junior/senior capital, pool tokens, and the payment
//! waterfall that feeds both tranches from credit line collections.
//!
//! Lifecycle: Open -> JuniorLocked -> Funded (senior locked) ->
//! Drawndown -> Closed. A payment flows: funds into the credit line,
//! `assess`, then the collected interest and principal are split across
//! tranches pro rata by principal deposited, with the protocol reserve
//! fee and the junior subordination fee skimmed from interest. Write-downs
//! mark expected loss against unrepaid principal, junior first; recoveries
//! unwind senior first.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::accountant::{self, WritedownResult};
use crate::credit_line::{AssessmentResult, CreditLine, CreditLineTerms};
use crate::error::TranchedCreditError;
use crate::fixed_point::{
    mul_div_down, saturating_sub_money, share_price_delta, share_price_to_money, validate_amount,
    validate_rate, ATOMIC_UNITS_PER_DOLLAR, SECONDS_PER_DAY, SHARE_PRICE_SCALE,
};
use crate::types::{AuthContext, ConfigHandle, Money, PoolId, Rate, Role, Timestamp, TokenId};
use crate::TranchedCreditResult;

// ---------------------------------------------------------------------------
// Tranches
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrancheKind {
    Junior,
    Senior,
}

/// One risk class of pool capital.
///
/// Share prices are integral fixed-point at [`SHARE_PRICE_SCALE`]:
/// `principal_share_price` starts at 1.0 and tracks the redeemable
/// fraction of deposited principal; `interest_share_price` starts at 0
/// and only grows. Truncation remainders from crediting are carried on
/// the tranche so repeated small allocations never leak value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tranche {
    pub kind: TrancheKind,
    pub principal_deposited: Money,
    pub principal_share_price: Decimal,
    pub interest_share_price: Decimal,
    /// Zero while unlocked; once locked, deposits are rejected and
    /// capital stays committed until this timestamp passes.
    pub locked_until: Timestamp,
    pub interest_carry: Decimal,
    pub principal_carry: Decimal,
    /// Expected-loss amount currently marked against this tranche's
    /// unrepaid principal, in atomic units.
    pub writedown_applied: Money,
}

impl Tranche {
    fn new(kind: TrancheKind) -> Self {
        Tranche {
            kind,
            principal_deposited: Decimal::ZERO,
            principal_share_price: SHARE_PRICE_SCALE,
            interest_share_price: Decimal::ZERO,
            locked_until: 0,
            interest_carry: Decimal::ZERO,
            principal_carry: Decimal::ZERO,
            writedown_applied: Decimal::ZERO,
        }
    }

    pub fn is_locked(&self) -> bool {
        self.locked_until != 0
    }

    /// Current redeemable principal value across the whole tranche.
    pub fn principal_value(&self) -> TranchedCreditResult<Money> {
        if self.principal_deposited.is_zero() {
            return Ok(Decimal::ZERO);
        }
        share_price_to_money(
            self.principal_deposited,
            self.principal_share_price,
            "tranche principal value",
        )
    }

    fn credit_interest(&mut self, amount: Money) -> TranchedCreditResult<()> {
        if amount.is_zero() {
            return Ok(());
        }
        let (delta, carry) = share_price_delta(
            amount,
            self.principal_deposited,
            self.interest_carry,
            "tranche interest credit",
        )?;
        self.interest_share_price += delta;
        self.interest_carry = carry;
        Ok(())
    }

    fn credit_principal(&mut self, amount: Money) -> TranchedCreditResult<()> {
        if amount.is_zero() {
            return Ok(());
        }
        let (delta, carry) = share_price_delta(
            amount,
            self.principal_deposited,
            self.principal_carry,
            "tranche principal credit",
        )?;
        self.principal_share_price += delta;
        self.principal_carry = carry;
        Ok(())
    }

    /// Mark lent-out capital by lowering the principal share price.
    fn debit_principal(&mut self, amount: Money) -> TranchedCreditResult<()> {
        if amount.is_zero() {
            return Ok(());
        }
        let (delta, _) = share_price_delta(
            amount,
            self.principal_deposited,
            Decimal::ZERO,
            "tranche principal debit",
        )?;
        self.principal_share_price = saturating_sub_money(self.principal_share_price, delta);
        Ok(())
    }

    /// Unrepaid principal claim not yet marked down. Redeemable value is
    /// excluded: capital sitting in the tranche is not at risk.
    fn at_risk_principal(&self) -> TranchedCreditResult<Money> {
        let redeemable = self.principal_value()?;
        Ok(saturating_sub_money(
            self.principal_deposited - self.writedown_applied,
            redeemable,
        ))
    }

    /// Absorb up to `amount` of expected loss; returns what was absorbed.
    fn apply_writedown(&mut self, amount: Money) -> TranchedCreditResult<Money> {
        let absorbed = amount.min(self.at_risk_principal()?);
        self.writedown_applied += absorbed;
        Ok(absorbed)
    }

    /// Reverse previously marked loss; returns what was restored.
    fn restore_writedown(&mut self, amount: Money) -> Money {
        let restored = amount.min(self.writedown_applied);
        self.writedown_applied -= restored;
        restored
    }
}

// ---------------------------------------------------------------------------
// Pool tokens
// ---------------------------------------------------------------------------

/// One depositor's claim on one tranche of one pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolToken {
    pub id: TokenId,
    pub tranche: TrancheKind,
    pub owner: String,
    pub principal_amount: Money,
    pub principal_redeemed: Money,
    pub interest_redeemed: Money,
}

/// Redeemable amounts for a token at a point in time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WithdrawalAmounts {
    pub interest: Money,
    pub principal: Money,
}

impl WithdrawalAmounts {
    pub fn total(&self) -> Money {
        self.interest + self.principal
    }
}

// ---------------------------------------------------------------------------
// Pool
// ---------------------------------------------------------------------------

/// Derived lifecycle stage of a pool; never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PoolPhase {
    Open,
    JuniorLocked,
    Funded,
    Drawndown,
    Closed,
}

/// How one collection event was distributed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DistributionSummary {
    pub senior_interest: Money,
    pub junior_interest: Money,
    pub senior_principal: Money,
    pub junior_principal: Money,
    pub reserve_fee: Money,
}

/// Full outcome of a `pay`/`assess` on a pool.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PaymentSummary {
    pub assessment: AssessmentResult,
    pub distribution: DistributionSummary,
    pub writedown: WritedownResult,
}

/// One borrower pool: a credit line funded by a junior and a senior
/// tranche, with pool tokens tracking each depositor's claim.
#[derive(Debug, Clone, Serialize)]
pub struct TranchedPool {
    pub id: PoolId,
    pub borrower: String,
    /// Fraction of senior interest paid to junior for subordinating.
    pub junior_fee_rate: Rate,
    pub credit_line: CreditLine,
    pub junior: Tranche,
    pub senior: Tranche,
    pub tokens: BTreeMap<TokenId, PoolToken>,
    pub reserve_collected: Money,
    pub total_drawn: Money,
    next_token_id: TokenId,
    #[serde(skip)]
    config: ConfigHandle,
}

impl TranchedPool {
    pub fn new(
        id: PoolId,
        borrower: &str,
        terms: CreditLineTerms,
        junior_fee_rate: Rate,
        config: ConfigHandle,
    ) -> TranchedCreditResult<Self> {
        validate_rate(junior_fee_rate, "junior_fee_rate")?;
        if junior_fee_rate + config.get().reserve_fee_rate > Decimal::ONE {
            return Err(TranchedCreditError::invalid_input(
                "junior_fee_rate",
                "junior fee plus reserve fee cannot exceed 100%",
            ));
        }
        Ok(TranchedPool {
            id,
            borrower: borrower.to_string(),
            junior_fee_rate,
            credit_line: CreditLine::new(terms)?,
            junior: Tranche::new(TrancheKind::Junior),
            senior: Tranche::new(TrancheKind::Senior),
            tokens: BTreeMap::new(),
            reserve_collected: Decimal::ZERO,
            total_drawn: Decimal::ZERO,
            next_token_id: 1,
            config,
        })
    }

    pub fn tranche(&self, kind: TrancheKind) -> &Tranche {
        match kind {
            TrancheKind::Junior => &self.junior,
            TrancheKind::Senior => &self.senior,
        }
    }

    fn tranche_mut(&mut self, kind: TrancheKind) -> &mut Tranche {
        match kind {
            TrancheKind::Junior => &mut self.junior,
            TrancheKind::Senior => &mut self.senior,
        }
    }

    pub fn token(&self, id: TokenId) -> TranchedCreditResult<&PoolToken> {
        self.tokens
            .get(&id)
            .ok_or_else(|| TranchedCreditError::invalid_input("token_id", "unknown pool token"))
    }

    pub fn total_deposited(&self) -> Money {
        self.junior.principal_deposited + self.senior.principal_deposited
    }

    pub fn phase(&self) -> PoolPhase {
        if !self.junior.is_locked() {
            return PoolPhase::Open;
        }
        if !self.senior.is_locked() {
            return PoolPhase::JuniorLocked;
        }
        if self.total_drawn.is_zero() {
            return PoolPhase::Funded;
        }
        if self.credit_line.balance.is_zero()
            && self.credit_line.interest_owed.is_zero()
            && self.credit_line.principal_owed.is_zero()
        {
            return PoolPhase::Closed;
        }
        PoolPhase::Drawndown
    }

    // -----------------------------------------------------------------------
    // Capital formation
    // -----------------------------------------------------------------------

    /// Deposit into a tranche, minting a pool token for the caller.
    /// Senior deposits require junior capital to be locked first, since
    /// senior sizing is computed against committed junior capital.
    pub fn deposit(
        &mut self,
        auth: &AuthContext,
        kind: TrancheKind,
        amount: Money,
        _timestamp: Timestamp,
    ) -> TranchedCreditResult<TokenId> {
        validate_amount(amount, "amount")?;
        if kind == TrancheKind::Senior && !self.junior.is_locked() {
            return Err(TranchedCreditError::invalid_state(
                "deposit",
                "senior deposits require the junior tranche to be locked",
            ));
        }
        if self.tranche(kind).is_locked() {
            return Err(TranchedCreditError::invalid_state(
                "deposit",
                "tranche is locked",
            ));
        }

        let id = self.next_token_id;
        self.next_token_id += 1;
        self.tranche_mut(kind).principal_deposited += amount;
        self.tokens.insert(
            id,
            PoolToken {
                id,
                tranche: kind,
                owner: auth.caller.clone(),
                principal_amount: amount,
                principal_redeemed: Decimal::ZERO,
                interest_redeemed: Decimal::ZERO,
            },
        );
        Ok(id)
    }

    /// Commit junior capital. Once only; borrower or admin.
    pub fn lock_junior_capital(
        &mut self,
        auth: &AuthContext,
        timestamp: Timestamp,
    ) -> TranchedCreditResult<()> {
        auth.require_any(&[Role::Borrower, Role::Admin], "lock junior capital")?;
        if self.junior.is_locked() {
            return Err(TranchedCreditError::invalid_state(
                "lock junior capital",
                "junior tranche is already locked",
            ));
        }
        self.junior.locked_until = self.lock_deadline(timestamp);
        Ok(())
    }

    /// Lock the senior tranche, making the facility drawdownable.
    pub fn lock_pool(
        &mut self,
        auth: &AuthContext,
        timestamp: Timestamp,
    ) -> TranchedCreditResult<()> {
        auth.require_any(&[Role::Borrower, Role::Admin], "lock pool")?;
        if !self.junior.is_locked() {
            return Err(TranchedCreditError::invalid_state(
                "lock pool",
                "junior tranche must be locked first",
            ));
        }
        if self.senior.is_locked() {
            return Err(TranchedCreditError::invalid_state(
                "lock pool",
                "pool is already locked",
            ));
        }
        self.senior.locked_until = self.lock_deadline(timestamp);
        Ok(())
    }

    fn lock_deadline(&self, timestamp: Timestamp) -> Timestamp {
        timestamp + self.config.get().drawdown_window_in_days * SECONDS_PER_DAY
    }

    // -----------------------------------------------------------------------
    // Borrowing and repayment
    // -----------------------------------------------------------------------

    /// Borrower draws deposited capital through the credit line. Lowers
    /// both tranches' principal share prices pro rata to mark the capital
    /// as lent out.
    pub fn drawdown(
        &mut self,
        auth: &AuthContext,
        amount: Money,
        timestamp: Timestamp,
    ) -> TranchedCreditResult<()> {
        if auth.caller != self.borrower {
            return Err(TranchedCreditError::not_owner("drawdown"));
        }
        if !self.senior.is_locked() {
            return Err(TranchedCreditError::invalid_state(
                "drawdown",
                "pool must be locked before drawdown",
            ));
        }
        validate_amount(amount, "amount")?;
        let available = self.total_deposited() - self.total_drawn;
        if amount > available {
            return Err(TranchedCreditError::invalid_input(
                "amount",
                "exceeds undeployed pool capital",
            ));
        }

        let config = self.config.get();
        self.credit_line.drawdown(auth, amount, timestamp, &config)?;
        self.total_drawn += amount;

        let senior_share = if self.senior.principal_deposited.is_zero() {
            Decimal::ZERO
        } else {
            mul_div_down(
                amount,
                self.senior.principal_deposited,
                self.total_deposited(),
                "drawdown senior share",
            )?
        };
        let junior_share = amount - senior_share;
        self.senior.debit_principal(senior_share)?;
        self.junior.debit_principal(junior_share)?;
        Ok(())
    }

    /// Apply a payment: funds in, assess the credit line, distribute the
    /// collections across tranches, refresh the write-down.
    pub fn pay(&mut self, amount: Money, timestamp: Timestamp) -> TranchedCreditResult<PaymentSummary> {
        if amount < Decimal::ZERO {
            return Err(TranchedCreditError::invalid_input(
                "amount",
                "cannot be negative",
            ));
        }
        // Guard the assessment preconditions up front so a rejected
        // payment never leaves funds collected.
        if !self.credit_line.is_initialized() {
            return Err(TranchedCreditError::invalid_state(
                "pay",
                "credit line is uninitialized",
            ));
        }
        if timestamp < self.credit_line.interest_accrued_as_of {
            return Err(TranchedCreditError::invalid_input(
                "timestamp",
                "precedes the accrual checkpoint",
            ));
        }
        if amount > Decimal::ZERO {
            self.credit_line.collect_payment(amount)?;
        }
        let config = self.config.get();
        let assessment = self.credit_line.assess(timestamp, &config)?;

        let distribution = self.collect_interest_and_principal(
            assessment.payment.interest_payment,
            assessment.principal_collected(),
        )?;
        let writedown = self.refresh_writedown(timestamp)?;

        Ok(PaymentSummary {
            assessment,
            distribution,
            writedown,
        })
    }

    /// Re-assess without new funds: applies any collected balance and
    /// refreshes the write-down.
    pub fn assess(&mut self, timestamp: Timestamp) -> TranchedCreditResult<PaymentSummary> {
        self.pay(Decimal::ZERO, timestamp)
    }

    /// Split collected interest and principal between tranches pro rata by
    /// principal deposited, skimming the reserve fee from both sides'
    /// interest and the junior fee from senior's interest.
    ///
    /// A tranche holding less than one whole currency unit receives
    /// nothing (its share goes to the reserve) rather than dividing by a
    /// degenerate denominator.
    fn collect_interest_and_principal(
        &mut self,
        interest: Money,
        principal: Money,
    ) -> TranchedCreditResult<DistributionSummary> {
        if interest.is_zero() && principal.is_zero() {
            return Ok(DistributionSummary::default());
        }

        let total = self.total_deposited();
        if total.is_zero() {
            self.reserve_collected += interest + principal;
            return Ok(DistributionSummary {
                reserve_fee: interest + principal,
                ..DistributionSummary::default()
            });
        }

        let junior_fundable = self.junior.principal_deposited >= ATOMIC_UNITS_PER_DOLLAR;
        let senior_fundable = self.senior.principal_deposited >= ATOMIC_UNITS_PER_DOLLAR;
        let reserve_rate = self.config.get().reserve_fee_rate;

        let senior_gross = mul_div_down(
            interest,
            self.senior.principal_deposited,
            total,
            "senior interest share",
        )?;
        let junior_gross = interest - senior_gross;
        let senior_principal_gross = mul_div_down(
            principal,
            self.senior.principal_deposited,
            total,
            "senior principal share",
        )?;
        let junior_principal_gross = principal - senior_principal_gross;

        let mut reserve_fee = Decimal::ZERO;
        let mut senior_interest = Decimal::ZERO;
        let mut junior_interest = Decimal::ZERO;
        let mut senior_principal = Decimal::ZERO;
        let mut junior_principal = Decimal::ZERO;
        let mut junior_fee = Decimal::ZERO;

        if senior_fundable {
            let senior_reserve =
                mul_div_down(senior_gross, reserve_rate, Decimal::ONE, "reserve fee")?;
            junior_fee = mul_div_down(
                senior_gross,
                self.junior_fee_rate,
                Decimal::ONE,
                "junior fee",
            )?;
            senior_interest = senior_gross - senior_reserve - junior_fee;
            senior_principal = senior_principal_gross;
            reserve_fee += senior_reserve;
        } else {
            reserve_fee += senior_gross + senior_principal_gross;
        }

        if junior_fundable {
            let junior_reserve =
                mul_div_down(junior_gross, reserve_rate, Decimal::ONE, "reserve fee")?;
            junior_interest = junior_gross - junior_reserve + junior_fee;
            junior_principal = junior_principal_gross;
            reserve_fee += junior_reserve;
        } else {
            reserve_fee += junior_gross + junior_principal_gross + junior_fee;
        }

        self.senior.credit_interest(senior_interest)?;
        self.junior.credit_interest(junior_interest)?;
        self.senior.credit_principal(senior_principal)?;
        self.junior.credit_principal(junior_principal)?;
        self.reserve_collected += reserve_fee;

        Ok(DistributionSummary {
            senior_interest,
            junior_interest,
            senior_principal,
            junior_principal,
            reserve_fee,
        })
    }

    /// Recompute the write-down and apply the delta against what is
    /// already marked. Junior absorbs losses first; recoveries restore
    /// senior first (first-loss subordination).
    fn refresh_writedown(&mut self, timestamp: Timestamp) -> TranchedCreditResult<WritedownResult> {
        let config = self.config.get();
        let writedown = accountant::calculate_writedown_for(
            &self.credit_line,
            timestamp,
            config.writedown_grace_period_in_days,
            config.writedown_max_days_late,
        )?;

        let applied = self.junior.writedown_applied + self.senior.writedown_applied;
        if writedown.amount > applied {
            let mut remaining = writedown.amount - applied;
            remaining -= self.junior.apply_writedown(remaining)?;
            if remaining > Decimal::ZERO {
                self.senior.apply_writedown(remaining)?;
            }
        } else if writedown.amount < applied {
            let mut remaining = applied - writedown.amount;
            remaining -= self.senior.restore_writedown(remaining);
            if remaining > Decimal::ZERO {
                self.junior.restore_writedown(remaining);
            }
        }
        Ok(writedown)
    }

    // -----------------------------------------------------------------------
    // Redemption
    // -----------------------------------------------------------------------

    /// What a token could withdraw right now. Zero while its tranche's
    /// capital is committed (locked and inside the drawdown window).
    pub fn available_to_withdraw(
        &self,
        token_id: TokenId,
        timestamp: Timestamp,
    ) -> TranchedCreditResult<WithdrawalAmounts> {
        let token = self.token(token_id)?;
        let tranche = self.tranche(token.tranche);

        if !tranche.is_locked() {
            return Ok(WithdrawalAmounts {
                interest: Decimal::ZERO,
                principal: token.principal_amount - token.principal_redeemed,
            });
        }
        if timestamp <= tranche.locked_until {
            return Ok(WithdrawalAmounts::default());
        }

        let expected_interest = share_price_to_money(
            token.principal_amount,
            tranche.interest_share_price,
            "token interest value",
        )?;
        let expected_principal = share_price_to_money(
            token.principal_amount,
            tranche.principal_share_price,
            "token principal value",
        )?;
        let principal_cap = token.principal_amount - token.principal_redeemed;

        Ok(WithdrawalAmounts {
            interest: saturating_sub_money(expected_interest, token.interest_redeemed),
            principal: saturating_sub_money(expected_principal, token.principal_redeemed)
                .min(principal_cap),
        })
    }

    /// Withdraw up to `amount` for a token, interest first. Before the
    /// tranche locks this returns uncommitted capital; afterwards it
    /// redeems against share prices.
    pub fn withdraw(
        &mut self,
        auth: &AuthContext,
        token_id: TokenId,
        amount: Money,
        timestamp: Timestamp,
    ) -> TranchedCreditResult<WithdrawalAmounts> {
        validate_amount(amount, "amount")?;
        let token = self.token(token_id)?;
        if token.owner != auth.caller {
            return Err(TranchedCreditError::not_owner("withdraw"));
        }
        let tranche_kind = token.tranche;
        let tranche = self.tranche(tranche_kind);

        if tranche.is_locked() && timestamp <= tranche.locked_until {
            return Err(TranchedCreditError::invalid_state(
                "withdraw",
                "capital is committed until the drawdown window passes",
            ));
        }

        let available = self.available_to_withdraw(token_id, timestamp)?;
        if amount > available.total() {
            return Err(TranchedCreditError::invalid_input(
                "amount",
                "exceeds redeemable value",
            ));
        }

        let interest_take = amount.min(available.interest);
        let principal_take = (amount - interest_take).min(available.principal);

        if !self.tranche(tranche_kind).is_locked() {
            // Uncommitted capital: the deposit itself shrinks.
            let token = self
                .tokens
                .get_mut(&token_id)
                .ok_or_else(|| TranchedCreditError::invalid_input("token_id", "unknown pool token"))?;
            token.principal_amount -= principal_take;
            let burn = token.principal_amount.is_zero();
            self.tranche_mut(tranche_kind).principal_deposited -= principal_take;
            if burn {
                self.tokens.remove(&token_id);
            }
        } else {
            let token = self
                .tokens
                .get_mut(&token_id)
                .ok_or_else(|| TranchedCreditError::invalid_input("token_id", "unknown pool token"))?;
            token.interest_redeemed += interest_take;
            token.principal_redeemed += principal_take;
        }

        Ok(WithdrawalAmounts {
            interest: interest_take,
            principal: principal_take,
        })
    }

    /// Withdraw everything currently redeemable. A zero result is a
    /// successful no-op, not an error.
    pub fn withdraw_max(
        &mut self,
        auth: &AuthContext,
        token_id: TokenId,
        timestamp: Timestamp,
    ) -> TranchedCreditResult<WithdrawalAmounts> {
        let available = self.available_to_withdraw(token_id, timestamp)?;
        if available.total().is_zero() {
            let token = self.token(token_id)?;
            if token.owner != auth.caller {
                return Err(TranchedCreditError::not_owner("withdraw"));
            }
            return Ok(WithdrawalAmounts::default());
        }
        self.withdraw(auth, token_id, available.total(), timestamp)
    }

    /// Burn a fully redeemed token. Rejected while principal or accrued
    /// interest remains claimable.
    pub fn burn(
        &mut self,
        auth: &AuthContext,
        token_id: TokenId,
        timestamp: Timestamp,
    ) -> TranchedCreditResult<()> {
        let token = self.token(token_id)?;
        if token.owner != auth.caller {
            return Err(TranchedCreditError::not_owner("burn"));
        }
        if token.principal_redeemed != token.principal_amount {
            return Err(TranchedCreditError::invalid_state(
                "burn",
                "principal not fully redeemed",
            ));
        }
        let available = self.available_to_withdraw(token_id, timestamp)?;
        if !available.interest.is_zero() {
            return Err(TranchedCreditError::invalid_state(
                "burn",
                "accrued interest not fully claimed",
            ));
        }
        self.tokens.remove(&token_id);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Multi-pool payment
// ---------------------------------------------------------------------------

/// Apply one payment per pool, best-effort sequential: a failing pool
/// reports an error in its slot without rolling back pools already paid.
pub fn pay_multiple(
    pools: &mut [TranchedPool],
    amounts: &[Money],
    timestamp: Timestamp,
) -> TranchedCreditResult<Vec<TranchedCreditResult<PaymentSummary>>> {
    if pools.len() != amounts.len() {
        return Err(TranchedCreditError::invalid_input(
            "amounts",
            "must match the number of pools",
        ));
    }
    Ok(pools
        .iter_mut()
        .zip(amounts)
        .map(|(pool, amount)| pool.pay(*amount, timestamp))
        .collect())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
