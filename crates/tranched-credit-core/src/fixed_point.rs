//! Fixed-point numeric kernel.
//!
//! All arithmetic above this module uses `rust_decimal::Decimal`. No `f64`.
//! Currency amounts are integral Decimals in atomic units of a 6-decimal
//! currency; tranche share prices are integral Decimals at
//! [`SHARE_PRICE_SCALE`]. Every division that produces a committed value
//! truncates toward zero, and no operation here returns a negative amount.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::error::TranchedCreditError;
use crate::TranchedCreditResult;

pub const SECONDS_PER_DAY: u64 = 86_400;
/// 365-day year.
pub const SECONDS_PER_YEAR: u64 = 31_536_000;
pub const DAYS_PER_YEAR: Decimal = dec!(365);

/// Atomic units per whole currency unit (6-decimal, USDC-like).
pub const ATOMIC_UNITS_PER_DOLLAR: Decimal = dec!(1_000_000);

/// Share prices are integral fixed-point at this scale (1.0 = 1e12).
///
/// Decimal's 96-bit mantissa cannot hold atomic amounts multiplied by a
/// 1e18 scale for realistically sized pools, so the kernel uses 1e12,
/// which keeps sub-unit precision for pools up to ~1e16 atomic units.
pub const SHARE_PRICE_SCALE: Decimal = dec!(1_000_000_000_000);

pub const HUNDRED: Decimal = dec!(100);

/// `trunc(a * b / denom)` with overflow and zero-denominator checks.
pub fn mul_div_down(
    a: Decimal,
    b: Decimal,
    denom: Decimal,
    context: &str,
) -> TranchedCreditResult<Decimal> {
    if denom.is_zero() {
        return Err(TranchedCreditError::DivisionByZero {
            context: context.into(),
        });
    }
    let product = a
        .checked_mul(b)
        .ok_or_else(|| TranchedCreditError::ArithmeticBound {
            context: context.into(),
        })?;
    Ok((product / denom).trunc())
}

/// `max(a - b, 0)`. Rounding must never create a negative balance.
pub fn saturating_sub_money(a: Decimal, b: Decimal) -> Decimal {
    if b >= a {
        Decimal::ZERO
    } else {
        a - b
    }
}

/// Share-price increment for crediting `amount` to a tranche with
/// `principal_deposited` capital, carrying the truncation remainder.
///
/// Returns `(price_delta, new_carry)`. The carry is the remainder of the
/// scaled numerator (`amount * SHARE_PRICE_SCALE + carry`) modulo
/// `principal_deposited`; folding it into the next credit means repeated
/// sub-precision allocations eventually surface as whole share-price
/// units instead of leaking.
pub fn share_price_delta(
    amount: Decimal,
    principal_deposited: Decimal,
    carry: Decimal,
    context: &str,
) -> TranchedCreditResult<(Decimal, Decimal)> {
    if principal_deposited.is_zero() {
        return Err(TranchedCreditError::DivisionByZero {
            context: context.into(),
        });
    }
    let scaled = amount
        .checked_mul(SHARE_PRICE_SCALE)
        .ok_or_else(|| TranchedCreditError::ArithmeticBound {
            context: context.into(),
        })?
        + carry;
    let delta = (scaled / principal_deposited).trunc();
    let new_carry = scaled - delta * principal_deposited;
    Ok((delta, new_carry))
}

/// Convert a share-price amount back into atomic currency units.
pub fn share_price_to_money(
    principal: Decimal,
    share_price: Decimal,
    context: &str,
) -> TranchedCreditResult<Decimal> {
    mul_div_down(principal, share_price, SHARE_PRICE_SCALE, context)
}

/// Reject amounts that are not positive integral atomic units.
pub fn validate_amount(amount: Decimal, field: &str) -> TranchedCreditResult<()> {
    if amount <= Decimal::ZERO {
        return Err(TranchedCreditError::invalid_input(
            field,
            "must be a positive amount",
        ));
    }
    if amount != amount.trunc() {
        return Err(TranchedCreditError::invalid_input(
            field,
            "must be integral atomic units",
        ));
    }
    Ok(())
}

/// Reject rates outside [0, 1].
pub fn validate_rate(rate: Decimal, field: &str) -> TranchedCreditResult<()> {
    if rate < Decimal::ZERO || rate > Decimal::ONE {
        return Err(TranchedCreditError::invalid_input(
            field,
            "must be in [0, 1]",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_mul_div_down_truncates() {
        // 10 * 1 / 3 = 3.33.. -> 3
        let out = mul_div_down(dec!(10), dec!(1), dec!(3), "t").unwrap();
        assert_eq!(out, dec!(3));
    }

    #[test]
    fn test_mul_div_down_zero_denominator() {
        let err = mul_div_down(dec!(1), dec!(1), Decimal::ZERO, "t").unwrap_err();
        assert!(matches!(
            err,
            TranchedCreditError::DivisionByZero { .. }
        ));
    }

    #[test]
    fn test_mul_div_down_overflow() {
        let err = mul_div_down(Decimal::MAX, dec!(2), dec!(1), "t").unwrap_err();
        assert!(matches!(
            err,
            TranchedCreditError::ArithmeticBound { .. }
        ));
    }

    #[test]
    fn test_saturating_sub_floors_at_zero() {
        assert_eq!(saturating_sub_money(dec!(3), dec!(5)), Decimal::ZERO);
        assert_eq!(saturating_sub_money(dec!(5), dec!(3)), dec!(2));
    }

    #[test]
    fn test_share_price_delta_carries_remainder() {
        // Crediting 1 unit to 3 units deposited, three times: each credit
        // truncates, but the carry makes the third credit land exactly.
        let deposited = dec!(3);
        let (d1, c1) = share_price_delta(dec!(1), deposited, Decimal::ZERO, "t").unwrap();
        let (d2, c2) = share_price_delta(dec!(1), deposited, c1, "t").unwrap();
        let (d3, c3) = share_price_delta(dec!(1), deposited, c2, "t").unwrap();
        assert_eq!(d1 + d2 + d3, SHARE_PRICE_SCALE);
        assert_eq!(c3, Decimal::ZERO);
    }

    #[test]
    fn test_share_price_roundtrip() {
        let deposited = dec!(1_000_000_000);
        let (delta, _) =
            share_price_delta(dec!(2_465_753), deposited, Decimal::ZERO, "t").unwrap();
        let back = share_price_to_money(deposited, delta, "t").unwrap();
        assert!(back <= dec!(2_465_753));
        assert!(dec!(2_465_753) - back < dec!(2));
    }

    #[test]
    fn test_validate_amount() {
        assert!(validate_amount(dec!(1), "x").is_ok());
        assert!(validate_amount(Decimal::ZERO, "x").is_err());
        assert!(validate_amount(dec!(-1), "x").is_err());
        assert!(validate_amount(dec!(1.5), "x").is_err());
    }

    #[test]
    fn test_validate_rate() {
        assert!(validate_rate(dec!(0.03), "x").is_ok());
        assert!(validate_rate(dec!(1.01), "x").is_err());
        assert!(validate_rate(dec!(-0.01), "x").is_err());
    }
}
