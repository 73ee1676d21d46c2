use chrono::DateTime;
use clap::Args;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{json, Value};

use tranched_credit_core::credit_line::CreditLineTerms;
use tranched_credit_core::pool::{TranchedPool, TrancheKind};
use tranched_credit_core::types::{AuthContext, ConfigHandle, ProtocolConfig, Timestamp};

use crate::input;

/// Arguments for pool lifecycle simulation
#[derive(Args)]
pub struct SimulateArgs {
    /// Path to a JSON simulation timeline (or pipe via stdin)
    #[arg(long)]
    pub input: Option<String>,
}

/// A full simulation: pool setup plus an ordered event timeline.
#[derive(Deserialize)]
struct SimulationInput {
    #[serde(default)]
    pool_id: u64,
    borrower: String,
    junior_fee_rate: Decimal,
    terms: CreditLineTerms,
    #[serde(default)]
    config: Option<ProtocolConfig>,
    events: Vec<SimulationEvent>,
}

#[derive(Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
enum SimulationEvent {
    Deposit {
        caller: String,
        tranche: TrancheKind,
        amount: Decimal,
        at: Timestamp,
    },
    LockJuniorCapital {
        at: Timestamp,
    },
    LockPool {
        at: Timestamp,
    },
    Drawdown {
        amount: Decimal,
        at: Timestamp,
    },
    Pay {
        amount: Decimal,
        at: Timestamp,
    },
    Assess {
        at: Timestamp,
    },
    Withdraw {
        caller: String,
        token: u64,
        amount: Option<Decimal>,
        at: Timestamp,
    },
}

pub fn run_simulate(args: SimulateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let sim: SimulationInput = if let Some(ref path) = args.input {
        input::read_json(path)?
    } else if let Some(data) = input::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        return Err("--input file is required for simulation (or pipe JSON via stdin)".into());
    };

    let config = match sim.config {
        Some(config) => ConfigHandle::new(config)?,
        None => ConfigHandle::default(),
    };
    let mut pool = TranchedPool::new(
        sim.pool_id,
        &sim.borrower,
        sim.terms,
        sim.junior_fee_rate,
        config,
    )?;
    let borrower = AuthContext::borrower(&sim.borrower);

    let mut log = Vec::with_capacity(sim.events.len());
    for (step, event) in sim.events.into_iter().enumerate() {
        let row = match event {
            SimulationEvent::Deposit {
                caller,
                tranche,
                amount,
                at,
            } => {
                let token = pool.deposit(
                    &AuthContext::participant(&caller),
                    tranche,
                    amount,
                    at,
                )?;
                json!({
                    "step": step,
                    "at": render_time(at),
                    "action": "deposit",
                    "token": token,
                    "amount": amount,
                })
            }
            SimulationEvent::LockJuniorCapital { at } => {
                pool.lock_junior_capital(&borrower, at)?;
                json!({
                    "step": step,
                    "at": render_time(at),
                    "action": "lock_junior_capital",
                    "locked_until": render_time(pool.junior.locked_until),
                })
            }
            SimulationEvent::LockPool { at } => {
                pool.lock_pool(&borrower, at)?;
                json!({
                    "step": step,
                    "at": render_time(at),
                    "action": "lock_pool",
                    "locked_until": render_time(pool.senior.locked_until),
                })
            }
            SimulationEvent::Drawdown { amount, at } => {
                pool.drawdown(&borrower, amount, at)?;
                json!({
                    "step": step,
                    "at": render_time(at),
                    "action": "drawdown",
                    "amount": amount,
                    "balance": pool.credit_line.balance,
                })
            }
            SimulationEvent::Pay { amount, at } => {
                let summary = pool.pay(amount, at)?;
                json!({
                    "step": step,
                    "at": render_time(at),
                    "action": "pay",
                    "amount": amount,
                    "summary": serde_json::to_value(summary)?,
                })
            }
            SimulationEvent::Assess { at } => {
                let summary = pool.assess(at)?;
                json!({
                    "step": step,
                    "at": render_time(at),
                    "action": "assess",
                    "summary": serde_json::to_value(summary)?,
                })
            }
            SimulationEvent::Withdraw {
                caller,
                token,
                amount,
                at,
            } => {
                let auth = AuthContext::participant(&caller);
                let out = match amount {
                    Some(amount) => pool.withdraw(&auth, token, amount, at)?,
                    None => pool.withdraw_max(&auth, token, at)?,
                };
                json!({
                    "step": step,
                    "at": render_time(at),
                    "action": "withdraw",
                    "token": token,
                    "interest": out.interest,
                    "principal": out.principal,
                })
            }
        };
        log.push(row);
    }

    Ok(json!({
        "phase": pool.phase(),
        "events": log,
        "pool": serde_json::to_value(&pool)?,
    }))
}

fn render_time(at: Timestamp) -> String {
    match DateTime::from_timestamp(at as i64, 0) {
        Some(dt) => dt.to_rfc3339(),
        None => at.to_string(),
    }
}
