use clap::Args;
use rust_decimal::Decimal;
use serde_json::{json, Value};

use tranched_credit_core::accountant;
use tranched_credit_core::credit_line::{CreditLine, CreditLineTerms};
use tranched_credit_core::types::{AuthContext, ProtocolConfig};

use crate::input;

/// Arguments for interest and principal accrual
#[derive(Args)]
pub struct AccrueArgs {
    /// Path to a JSON credit line snapshot (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Outstanding principal in atomic units
    #[arg(long)]
    pub balance: Option<Decimal>,

    /// Interest APR as a decimal fraction (0.03 = 3%)
    #[arg(long)]
    pub interest_apr: Option<Decimal>,

    /// Late-fee APR as a decimal fraction
    #[arg(long, default_value = "0")]
    pub late_fee_apr: Decimal,

    /// Payment period in days
    #[arg(long, default_value_t = 30)]
    pub period_days: u64,

    /// Term length in days
    #[arg(long, default_value_t = 360)]
    pub term_days: u64,

    /// Epoch seconds of the drawdown that started the term
    #[arg(long, default_value_t = 0)]
    pub drawn_at: u64,

    /// Epoch seconds of the last full payment
    #[arg(long)]
    pub last_full_payment: Option<u64>,

    /// Epoch seconds to accrue up to
    #[arg(long)]
    pub at: u64,

    /// Days of grace before late fees apply
    #[arg(long, default_value_t = 30)]
    pub late_grace_days: u64,
}

/// Arguments for the payment waterfall
#[derive(Args)]
pub struct AllocatePaymentArgs {
    /// Payment amount in atomic units
    #[arg(long)]
    pub amount: Decimal,

    /// Outstanding principal in atomic units
    #[arg(long)]
    pub balance: Decimal,

    /// Interest currently owed
    #[arg(long)]
    pub interest_owed: Decimal,

    /// Principal currently owed
    #[arg(long)]
    pub principal_owed: Decimal,
}

/// Arguments for the write-down calculation
#[derive(Args)]
pub struct WritedownArgs {
    /// Path to a JSON credit line snapshot (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Outstanding principal in atomic units
    #[arg(long)]
    pub balance: Option<Decimal>,

    /// Interest APR as a decimal fraction
    #[arg(long)]
    pub interest_apr: Option<Decimal>,

    /// Unpaid interest implying the lateness
    #[arg(long, default_value = "0")]
    pub interest_owed: Decimal,

    /// Term length in days
    #[arg(long, default_value_t = 360)]
    pub term_days: u64,

    /// Epoch seconds of the evaluation
    #[arg(long)]
    pub at: u64,

    /// Days late tolerated before any write-down
    #[arg(long, default_value_t = 30)]
    pub grace_days: u64,

    /// Days late at which the write-down reaches 100%
    #[arg(long, default_value_t = 120)]
    pub max_days_late: u64,
}

fn load_or_build_line(
    input: &Option<String>,
    balance: Option<Decimal>,
    interest_apr: Option<Decimal>,
    late_fee_apr: Decimal,
    period_days: u64,
    term_days: u64,
    drawn_at: u64,
) -> Result<CreditLine, Box<dyn std::error::Error>> {
    if let Some(path) = input {
        return Ok(input::read_json(path)?);
    }
    if let Some(data) = input::read_stdin()? {
        return Ok(serde_json::from_value(data)?);
    }

    let balance = balance.ok_or("--balance is required (or provide --input)")?;
    let interest_apr = interest_apr.ok_or("--interest-apr is required (or provide --input)")?;
    let terms = CreditLineTerms {
        limit: balance,
        interest_apr,
        late_fee_apr,
        payment_period_in_days: period_days,
        term_in_days: term_days,
        principal_grace_period_in_days: 0,
    };
    let mut line = CreditLine::new(terms)?;
    line.drawdown(
        &AuthContext::borrower("cli"),
        balance,
        drawn_at,
        &ProtocolConfig::default(),
    )?;
    Ok(line)
}

pub fn run_accrue(args: AccrueArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut line = load_or_build_line(
        &args.input,
        args.balance,
        args.interest_apr,
        args.late_fee_apr,
        args.period_days,
        args.term_days,
        args.drawn_at,
    )?;
    if let Some(t) = args.last_full_payment {
        line.last_full_payment_time = t;
    }

    let accrual = accountant::calculate_interest_and_principal_accrued(
        &line,
        args.at,
        args.late_grace_days,
    )?;

    Ok(json!({
        "interest_accrued": accrual.interest_accrued,
        "principal_accrued": accrual.principal_accrued,
        "total_interest_owed": line.interest_owed + accrual.interest_accrued,
        "total_principal_owed": line.principal_owed + accrual.principal_accrued,
        "balance": line.balance,
    }))
}

pub fn run_allocate_payment(args: AllocatePaymentArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let allocation = accountant::allocate_payment(
        args.amount,
        args.balance,
        args.interest_owed,
        args.principal_owed,
    )?;

    Ok(json!({
        "interest_payment": allocation.interest_payment,
        "principal_payment": allocation.principal_payment,
        "additional_balance_payment": allocation.additional_balance_payment,
        "total_allocated": allocation.total(),
        "unallocated": args.amount - allocation.total(),
    }))
}

pub fn run_writedown(args: WritedownArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut line = load_or_build_line(
        &args.input,
        args.balance,
        args.interest_apr,
        Decimal::ZERO,
        30,
        args.term_days,
        0,
    )?;
    if args.balance.is_some() {
        line.interest_owed = args.interest_owed;
    }

    let writedown = accountant::calculate_writedown_for(
        &line,
        args.at,
        args.grace_days,
        args.max_days_late,
    )?;

    Ok(json!({
        "percent": writedown.percent,
        "amount": writedown.amount,
        "balance": line.balance,
    }))
}
