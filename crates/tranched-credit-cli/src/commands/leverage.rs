use clap::Args;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{json, Value};

use tranched_credit_core::credit_line::CreditLineTerms;
use tranched_credit_core::leverage::{FixedLeverageStrategy, LeverageStrategy};
use tranched_credit_core::pool::{TranchedPool, TrancheKind};
use tranched_credit_core::types::{AuthContext, ConfigHandle, ProtocolConfig};

/// Arguments for senior investment sizing
#[derive(Args)]
pub struct EstimateInvestmentArgs {
    /// Committed junior capital in atomic units
    #[arg(long)]
    pub junior: Decimal,

    /// Senior capital already deposited
    #[arg(long, default_value = "0")]
    pub senior: Decimal,

    /// Leverage ratio override (defaults to the protocol configuration)
    #[arg(long)]
    pub ratio: Option<Decimal>,
}

pub fn run_estimate_investment(
    args: EstimateInvestmentArgs,
) -> Result<Value, Box<dyn std::error::Error>> {
    let mut config = ProtocolConfig::default();
    if let Some(ratio) = args.ratio {
        config.fixed_leverage_ratio = ratio;
    }
    let handle = ConfigHandle::new(config)?;

    // A scratch pool carrying the requested capital structure.
    let terms = CreditLineTerms {
        limit: dec!(1_000_000_000_000_000),
        interest_apr: Decimal::ZERO,
        late_fee_apr: Decimal::ZERO,
        payment_period_in_days: 30,
        term_in_days: 360,
        principal_grace_period_in_days: 0,
    };
    let mut pool = TranchedPool::new(0, "borrower", terms, Decimal::ZERO, handle.clone())?;
    let depositor = AuthContext::participant("depositor");
    let borrower = AuthContext::borrower("borrower");

    pool.deposit(&depositor, TrancheKind::Junior, args.junior, 0)?;
    pool.lock_junior_capital(&borrower, 0)?;
    if args.senior > Decimal::ZERO {
        pool.deposit(&depositor, TrancheKind::Senior, args.senior, 0)?;
    }

    let strategy = FixedLeverageStrategy::new(handle.clone());
    let ratio = strategy.leverage_ratio(&pool)?;
    let estimate = strategy.estimate_investment(&pool)?;

    Ok(json!({
        "estimated_investment": estimate,
        "leverage_ratio": ratio,
        "junior_deposited": args.junior,
        "senior_deposited": args.senior,
    }))
}
