//! Tranched credit engine.
//!
//! A deterministic lending core: borrower credit lines with periodic
//! interest accrual, junior/senior tranched pools with a payment
//! waterfall, and leverage strategies for sizing senior capital against
//! committed junior capital.
//!
//! - All arithmetic uses `rust_decimal::Decimal`. No `f64` anywhere.
//! - Time is an injected `u64` of epoch seconds; the engine never reads
//!   a system clock.
//! - Every state transition validates inputs first and either commits
//!   fully or returns an error leaving state untouched.

pub mod accountant;
pub mod credit_line;
pub mod error;
pub mod fixed_point;
pub mod leverage;
pub mod pool;
pub mod types;

pub use error::TranchedCreditError;

/// Convenient result alias used across the crate.
pub type TranchedCreditResult<T> = Result<T, TranchedCreditError>;
