//! End-to-end accrual and repayment scenarios on a single credit line.

use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use tranched_credit_core::accountant;
use tranched_credit_core::credit_line::{CreditLine, CreditLineStatus, CreditLineTerms};
use tranched_credit_core::fixed_point::SECONDS_PER_DAY;
use tranched_credit_core::types::{AuthContext, ProtocolConfig};

const DAY: u64 = SECONDS_PER_DAY;

fn sample_terms() -> CreditLineTerms {
    CreditLineTerms {
        limit: dec!(10_000_000_000),
        interest_apr: dec!(0.03),
        late_fee_apr: dec!(0.02),
        payment_period_in_days: 30,
        term_in_days: 360,
        principal_grace_period_in_days: 0,
    }
}

fn drawn_line() -> (CreditLine, ProtocolConfig) {
    let config = ProtocolConfig::default();
    let mut cl = CreditLine::new(sample_terms()).unwrap();
    cl.drawdown(
        &AuthContext::borrower("bob"),
        dec!(1_000_000_000),
        0,
        &config,
    )
    .unwrap();
    (cl, config)
}

#[test]
fn hundred_seconds_of_interest_on_one_thousand_dollars() {
    let (cl, config) = drawn_line();
    // 1_000_000_000 * 0.03 * 100 / 31_536_000, truncated.
    assert_eq!(cl.interest_owed_at(100, &config).unwrap(), dec!(95));
}

#[test]
fn interest_owed_is_monotonic_in_time() {
    let (cl, config) = drawn_line();
    let mut previous = Decimal::ZERO;
    for t in (0..=400 * DAY).step_by((10 * DAY) as usize) {
        let owed = cl.interest_owed_at(t, &config).unwrap();
        assert!(owed >= previous, "accrued interest regressed at t={t}");
        previous = owed;
    }
}

#[test]
fn payment_allocation_worked_examples() {
    // Partial: covers interest, leaves some scheduled principal unpaid.
    let partial = accountant::allocate_payment(dec!(15), dec!(40), dec!(10), dec!(20)).unwrap();
    assert_eq!(partial.interest_payment, dec!(10));
    assert_eq!(partial.principal_payment, dec!(5));
    assert_eq!(partial.additional_balance_payment, Decimal::ZERO);

    // Surplus: pays everything owed, then prepays remaining balance.
    let surplus = accountant::allocate_payment(dec!(55), dec!(40), dec!(10), dec!(20)).unwrap();
    assert_eq!(surplus.interest_payment, dec!(10));
    assert_eq!(surplus.principal_payment, dec!(20));
    assert_eq!(surplus.additional_balance_payment, dec!(20));
}

#[test]
fn full_term_with_on_time_payments_never_goes_late() {
    let (mut cl, config) = drawn_line();
    let period_interest = dec!(2_465_753);

    for period in 1..=11u64 {
        let t = period * 30 * DAY;
        cl.collect_payment(period_interest).unwrap();
        cl.assess(t, &config).unwrap();
        assert_eq!(cl.interest_owed, Decimal::ZERO);
        assert_eq!(cl.last_full_payment_time, t);
        assert_eq!(cl.status(t, &config).unwrap(), CreditLineStatus::Active);
    }

    // Final period: interest plus the full balance comes due at term end.
    cl.collect_payment(period_interest + dec!(1_000_000_000))
        .unwrap();
    cl.assess(360 * DAY, &config).unwrap();
    assert_eq!(cl.balance, Decimal::ZERO);
    assert_eq!(cl.principal_owed, Decimal::ZERO);
    assert_eq!(
        cl.status(360 * DAY, &config).unwrap(),
        CreditLineStatus::FullyRepaid
    );
}

#[test]
fn overpayment_zeroes_balance_without_going_negative() {
    let (mut cl, config) = drawn_line();
    cl.collect_payment(dec!(2_000_000_000)).unwrap();
    let out = cl.assess(30 * DAY, &config).unwrap();

    assert_eq!(out.payment.interest_payment, dec!(2_465_753));
    assert_eq!(out.payment.additional_balance_payment, dec!(1_000_000_000));
    assert_eq!(cl.balance, Decimal::ZERO);
    // The unallocatable surplus stays as credit for future assessments.
    assert_eq!(
        cl.collected_payment_balance,
        dec!(2_000_000_000) - dec!(2_465_753) - dec!(1_000_000_000)
    );
}

#[test]
fn late_payment_accrues_late_fees_after_grace() {
    let (mut cl, config) = drawn_line();
    // 70 days without payment: 40 of them past the 30-day grace period.
    cl.assess(70 * DAY, &config).unwrap();

    let regular = dec!(5_753_424); // 1e9 * 0.03 * 70d / year
    let late = dec!(2_191_780); // 1e9 * 0.02 * 40d / year
    assert_eq!(cl.interest_owed, regular + late);
}

#[test]
fn missed_periods_then_catchup_restores_schedule() {
    let (mut cl, config) = drawn_line();
    cl.assess(95 * DAY, &config).unwrap();
    assert!(cl.interest_owed > Decimal::ZERO);
    assert_eq!(cl.next_due_time, 30 * DAY);

    cl.collect_payment(dec!(50_000_000)).unwrap();
    cl.assess(95 * DAY, &config).unwrap();
    assert_eq!(cl.interest_owed, Decimal::ZERO);
    assert_eq!(cl.next_due_time, 120 * DAY);
    assert_eq!(cl.last_full_payment_time, 95 * DAY);
}
