use std::collections::HashSet;
use std::sync::{Arc, RwLock};

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::TranchedCreditError;
use crate::TranchedCreditResult;

/// Monetary values in atomic units of a 6-decimal currency
/// ($1 = 1_000_000 units). Always integral. Wraps Decimal to prevent
/// accidental f64 usage.
pub type Money = Decimal;

/// Rates expressed as decimals (0.05 = 5% APR). Never as percentages.
pub type Rate = Decimal;

/// Seconds since epoch, injected by the caller. The engine never reads a
/// system clock.
pub type Timestamp = u64;

/// Identifier for a minted pool token.
pub type TokenId = u64;

/// Identifier for a pool.
pub type PoolId = u64;

/// Roles recognised by privileged operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Admin,
    Borrower,
}

/// Caller identity plus granted roles, passed explicitly into every
/// privileged operation. Checks run before any state mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthContext {
    pub caller: String,
    pub roles: HashSet<Role>,
}

impl AuthContext {
    pub fn new(caller: &str, roles: &[Role]) -> Self {
        AuthContext {
            caller: caller.to_string(),
            roles: roles.iter().copied().collect(),
        }
    }

    pub fn admin(caller: &str) -> Self {
        Self::new(caller, &[Role::Admin])
    }

    pub fn borrower(caller: &str) -> Self {
        Self::new(caller, &[Role::Borrower])
    }

    /// An identity with no roles (depositors, token holders).
    pub fn participant(caller: &str) -> Self {
        Self::new(caller, &[])
    }

    pub fn require(&self, role: Role, operation: &str) -> TranchedCreditResult<()> {
        if self.roles.contains(&role) {
            Ok(())
        } else {
            Err(TranchedCreditError::unauthorized(operation, role))
        }
    }

    pub fn require_any(&self, roles: &[Role], operation: &str) -> TranchedCreditResult<()> {
        if roles.iter().any(|r| self.roles.contains(r)) {
            Ok(())
        } else {
            Err(TranchedCreditError::Unauthorized {
                operation: operation.into(),
                required: format!("one of {roles:?}"),
            })
        }
    }
}

/// Protocol-level parameters shared by every component. Injected at
/// construction; never looked up ambiently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProtocolConfig {
    /// Fraction of collected interest skimmed to the protocol reserve.
    pub reserve_fee_rate: Rate,
    /// Days after the last full payment before late-fee interest accrues.
    pub late_fee_grace_period_in_days: u64,
    /// Days late tolerated before any write-down applies.
    pub writedown_grace_period_in_days: u64,
    /// Days late at which the write-down reaches 100%.
    pub writedown_max_days_late: u64,
    /// Days after a tranche lock during which capital stays committed
    /// for drawdown and cannot be withdrawn.
    pub drawdown_window_in_days: u64,
    /// Senior capital per unit of junior capital for the fixed strategy.
    pub fixed_leverage_ratio: Decimal,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        ProtocolConfig {
            reserve_fee_rate: dec!(0.10),
            late_fee_grace_period_in_days: 30,
            writedown_grace_period_in_days: 30,
            writedown_max_days_late: 120,
            drawdown_window_in_days: 10,
            fixed_leverage_ratio: dec!(4),
        }
    }
}

impl ProtocolConfig {
    pub fn validate(&self) -> TranchedCreditResult<()> {
        if self.reserve_fee_rate < Decimal::ZERO || self.reserve_fee_rate >= Decimal::ONE {
            return Err(TranchedCreditError::invalid_input(
                "reserve_fee_rate",
                "must be in [0, 1)",
            ));
        }
        if self.writedown_max_days_late == 0 {
            return Err(TranchedCreditError::invalid_input(
                "writedown_max_days_late",
                "must be positive",
            ));
        }
        if self.fixed_leverage_ratio < Decimal::ZERO {
            return Err(TranchedCreditError::invalid_input(
                "fixed_leverage_ratio",
                "cannot be negative",
            ));
        }
        Ok(())
    }
}

/// Shared handle to the protocol configuration. Every holder observes
/// reconfiguration through the same reference; updates are admin-gated.
#[derive(Debug, Clone)]
pub struct ConfigHandle {
    inner: Arc<RwLock<ProtocolConfig>>,
}

impl ConfigHandle {
    pub fn new(config: ProtocolConfig) -> TranchedCreditResult<Self> {
        config.validate()?;
        Ok(ConfigHandle {
            inner: Arc::new(RwLock::new(config)),
        })
    }

    pub fn get(&self) -> ProtocolConfig {
        match self.inner.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn update(
        &self,
        auth: &AuthContext,
        config: ProtocolConfig,
    ) -> TranchedCreditResult<()> {
        auth.require(Role::Admin, "update config")?;
        config.validate()?;
        let mut guard = match self.inner.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = config;
        Ok(())
    }
}

impl Default for ConfigHandle {
    fn default() -> Self {
        ConfigHandle {
            inner: Arc::new(RwLock::new(ProtocolConfig::default())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_role_present() {
        let auth = AuthContext::borrower("bob");
        assert!(auth.require(Role::Borrower, "drawdown").is_ok());
    }

    #[test]
    fn test_require_role_missing() {
        let auth = AuthContext::participant("alice");
        let err = auth.require(Role::Admin, "update config").unwrap_err();
        assert!(matches!(err, TranchedCreditError::Unauthorized { .. }));
    }

    #[test]
    fn test_require_any() {
        let auth = AuthContext::borrower("bob");
        assert!(auth
            .require_any(&[Role::Borrower, Role::Admin], "lock")
            .is_ok());
        assert!(auth.require_any(&[Role::Admin], "lock").is_err());
    }

    #[test]
    fn test_config_update_requires_admin() {
        let handle = ConfigHandle::default();
        let mut config = handle.get();
        config.writedown_max_days_late = 90;

        let err = handle
            .update(&AuthContext::participant("alice"), config.clone())
            .unwrap_err();
        assert!(matches!(err, TranchedCreditError::Unauthorized { .. }));

        handle.update(&AuthContext::admin("gov"), config).unwrap();
        assert_eq!(handle.get().writedown_max_days_late, 90);
    }

    #[test]
    fn test_config_update_visible_through_clones() {
        let handle = ConfigHandle::default();
        let other = handle.clone();
        let mut config = handle.get();
        config.late_fee_grace_period_in_days = 15;
        handle.update(&AuthContext::admin("gov"), config).unwrap();
        assert_eq!(other.get().late_fee_grace_period_in_days, 15);
    }

    #[test]
    fn test_config_rejects_bad_reserve_fee() {
        let config = ProtocolConfig {
            reserve_fee_rate: dec!(1.5),
            ..ProtocolConfig::default()
        };
        assert!(ConfigHandle::new(config).is_err());
    }
}
