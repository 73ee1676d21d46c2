//! Leverage strategies: how much senior capital a pool's committed
//! junior capital supports.
//!
//! A strategy answers one question, the leverage ratio. Investment
//! sizing is derived from it: `junior_deposited * ratio` is the senior
//! target, and the estimate is whatever of that target is still unfilled.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::TranchedCreditError;
use crate::fixed_point::{mul_div_down, saturating_sub_money};
use crate::pool::TranchedPool;
use crate::types::{AuthContext, ConfigHandle, Money, PoolId, Role, Timestamp};
use crate::TranchedCreditResult;

/// Source of the senior-to-junior leverage ratio for a pool.
pub trait LeverageStrategy {
    fn leverage_ratio(&self, pool: &TranchedPool) -> TranchedCreditResult<Decimal>;

    /// Senior capital the pool could still absorb at this strategy's
    /// ratio. Zero once the senior target is met or exceeded.
    fn estimate_investment(&self, pool: &TranchedPool) -> TranchedCreditResult<Money> {
        let ratio = self.leverage_ratio(pool)?;
        let target = mul_div_down(
            pool.junior.principal_deposited,
            ratio,
            Decimal::ONE,
            "senior investment target",
        )?;
        Ok(saturating_sub_money(
            target,
            pool.senior.principal_deposited,
        ))
    }

    /// The amount to actually invest, capped by available capital.
    fn invest_amount(
        &self,
        pool: &TranchedPool,
        available: Money,
    ) -> TranchedCreditResult<Money> {
        Ok(self.estimate_investment(pool)?.min(available))
    }
}

// ---------------------------------------------------------------------------
// Fixed strategy
// ---------------------------------------------------------------------------

/// Applies the protocol-wide configured ratio to every pool.
#[derive(Debug, Clone)]
pub struct FixedLeverageStrategy {
    config: ConfigHandle,
}

impl FixedLeverageStrategy {
    pub fn new(config: ConfigHandle) -> Self {
        FixedLeverageStrategy { config }
    }
}

impl LeverageStrategy for FixedLeverageStrategy {
    fn leverage_ratio(&self, pool: &TranchedPool) -> TranchedCreditResult<Decimal> {
        if !pool.junior.is_locked() {
            return Err(TranchedCreditError::invalid_state(
                "leverage ratio",
                "junior capital is not locked",
            ));
        }
        Ok(self.config.get().fixed_leverage_ratio)
    }
}

// ---------------------------------------------------------------------------
// Dynamic strategy
// ---------------------------------------------------------------------------

/// A per-pool ratio set by an admin after underwriting that pool's
/// junior tranche.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LeverageRatioEntry {
    pub ratio: Decimal,
    /// The junior `locked_until` observed when the ratio was set. A later
    /// lock invalidates the entry.
    pub junior_locked_until: Timestamp,
}

/// Per-pool ratios with staleness detection: a ratio set against one
/// junior lock must not be reused after the tranche is relocked.
#[derive(Debug, Clone, Default)]
pub struct DynamicLeverageStrategy {
    ratios: HashMap<PoolId, LeverageRatioEntry>,
}

impl DynamicLeverageStrategy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the ratio for a pool. Admin only; the junior tranche must
    /// already be locked so the entry binds to a specific commitment.
    pub fn set_leverage_ratio(
        &mut self,
        auth: &AuthContext,
        pool: &TranchedPool,
        ratio: Decimal,
    ) -> TranchedCreditResult<()> {
        auth.require(Role::Admin, "set leverage ratio")?;
        if ratio < Decimal::ZERO {
            return Err(TranchedCreditError::invalid_input(
                "ratio",
                "cannot be negative",
            ));
        }
        if !pool.junior.is_locked() {
            return Err(TranchedCreditError::invalid_state(
                "set leverage ratio",
                "junior capital is not locked",
            ));
        }
        self.ratios.insert(
            pool.id,
            LeverageRatioEntry {
                ratio,
                junior_locked_until: pool.junior.locked_until,
            },
        );
        Ok(())
    }

    pub fn entry(&self, pool_id: PoolId) -> Option<&LeverageRatioEntry> {
        self.ratios.get(&pool_id)
    }
}

impl LeverageStrategy for DynamicLeverageStrategy {
    fn leverage_ratio(&self, pool: &TranchedPool) -> TranchedCreditResult<Decimal> {
        let entry = self
            .ratios
            .get(&pool.id)
            .ok_or_else(|| TranchedCreditError::NotYetSet {
                context: format!("leverage ratio for pool {}", pool.id),
            })?;
        if entry.junior_locked_until != pool.junior.locked_until {
            return Err(TranchedCreditError::Stale {
                context: format!("leverage ratio for pool {}", pool.id),
            });
        }
        Ok(entry.ratio)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
