//! Full pool lifecycle scenarios: capital formation through leverage,
//! drawdown, a year of payments, redemption, and delinquency.

use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use tranched_credit_core::credit_line::CreditLineTerms;
use tranched_credit_core::fixed_point::{SECONDS_PER_DAY, SHARE_PRICE_SCALE};
use tranched_credit_core::leverage::{FixedLeverageStrategy, LeverageStrategy};
use tranched_credit_core::pool::{PoolPhase, TranchedPool, TrancheKind};
use tranched_credit_core::types::{AuthContext, ConfigHandle};

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

fn new_pool(config: &ConfigHandle) -> TranchedPool {
    TranchedPool::new(1, "bob", sample_terms(), dec!(0.20), config.clone()).unwrap()
}

#[test]
fn full_lifecycle_with_on_time_payments() {
    let config = ConfigHandle::default();
    let mut pool = new_pool(&config);
    let alice = AuthContext::participant("alice");
    let spool = AuthContext::participant("spool");
    let borrower = AuthContext::borrower("bob");

    // Junior commits $1000; the fixed strategy sizes senior at 4x.
    let junior_token = pool
        .deposit(&alice, TrancheKind::Junior, dec!(1_000_000_000), 0)
        .unwrap();
    pool.lock_junior_capital(&borrower, 0).unwrap();

    let strategy = FixedLeverageStrategy::new(config.clone());
    let senior_amount = strategy.estimate_investment(&pool).unwrap();
    assert_eq!(senior_amount, dec!(4_000_000_000));
    let senior_token = pool
        .deposit(&spool, TrancheKind::Senior, senior_amount, 0)
        .unwrap();

    pool.lock_pool(&borrower, 0).unwrap();
    pool.drawdown(&borrower, dec!(5_000_000_000), 0).unwrap();
    assert_eq!(pool.phase(), PoolPhase::Drawndown);

    // Interest on $5000 at 3% per 30-day period.
    let period_interest = dec!(12_328_767);
    for period in 1..=11u64 {
        let summary = pool.pay(period_interest, period * 30 * DAY).unwrap();
        assert_eq!(summary.assessment.payment.interest_payment, period_interest);
        assert_eq!(summary.writedown.percent, Decimal::ZERO);
    }
    // Term end: final interest plus the whole balance.
    pool.pay(period_interest + dec!(5_000_000_000), 360 * DAY)
        .unwrap();
    assert_eq!(pool.phase(), PoolPhase::Closed);
    assert_eq!(pool.senior.principal_share_price, SHARE_PRICE_SCALE);
    assert_eq!(pool.junior.principal_share_price, SHARE_PRICE_SCALE);

    // Redemption. Per period: senior keeps 9_863_013 - 10% reserve
    // - 20% junior fee = 6_904_110; junior keeps 2_465_754 - 10%
    // + junior fee = 4_191_781.
    let junior_out = pool
        .withdraw_max(&alice, junior_token, 360 * DAY)
        .unwrap();
    assert_eq!(junior_out.principal, dec!(1_000_000_000));
    assert_eq!(junior_out.interest, dec!(4_191_781) * dec!(12));

    let senior_out = pool
        .withdraw_max(&spool, senior_token, 360 * DAY)
        .unwrap();
    assert_eq!(senior_out.principal, dec!(4_000_000_000));
    assert_eq!(senior_out.interest, dec!(6_904_110) * dec!(12));

    // Every unit of collected interest ends up with a lender or the
    // reserve.
    assert_eq!(
        junior_out.interest + senior_out.interest + pool.reserve_collected,
        period_interest * dec!(12),
    );

    pool.burn(&alice, junior_token, 360 * DAY).unwrap();
    pool.burn(&spool, senior_token, 360 * DAY).unwrap();
    assert!(pool.tokens.is_empty());
}

#[test]
fn waterfall_conserves_every_payment() {
    let config = ConfigHandle::default();
    let mut pool = new_pool(&config);
    let borrower = AuthContext::borrower("bob");
    pool.deposit(
        &AuthContext::participant("alice"),
        TrancheKind::Junior,
        dec!(1_000_000_000),
        0,
    )
    .unwrap();
    pool.lock_junior_capital(&borrower, 0).unwrap();
    pool.deposit(
        &AuthContext::participant("spool"),
        TrancheKind::Senior,
        dec!(4_000_000_000),
        0,
    )
    .unwrap();
    pool.lock_pool(&borrower, 0).unwrap();
    pool.drawdown(&borrower, dec!(5_000_000_000), 0).unwrap();

    // Irregular amounts and dates, including a catch-up after lateness.
    let schedule = [
        (dec!(7_000_001), 30 * DAY),
        (dec!(333_333), 45 * DAY),
        (dec!(60_000_007), 95 * DAY),
        (dec!(12_345_679), 120 * DAY),
    ];
    for (amount, t) in schedule {
        let summary = pool.pay(amount, t).unwrap();
        let d = summary.distribution;
        assert_eq!(
            d.senior_interest
                + d.junior_interest
                + d.senior_principal
                + d.junior_principal
                + d.reserve_fee,
            summary.assessment.payment.total(),
            "distribution leaked value at t={t}"
        );
    }
}

#[test]
fn writedown_grows_continuously_and_junior_takes_first_loss() {
    let config = ConfigHandle::default();
    let mut pool = new_pool(&config);
    let borrower = AuthContext::borrower("bob");
    pool.deposit(
        &AuthContext::participant("alice"),
        TrancheKind::Junior,
        dec!(1_000_000_000),
        0,
    )
    .unwrap();
    pool.lock_junior_capital(&borrower, 0).unwrap();
    pool.deposit(
        &AuthContext::participant("spool"),
        TrancheKind::Senior,
        dec!(4_000_000_000),
        0,
    )
    .unwrap();
    pool.lock_pool(&borrower, 0).unwrap();
    pool.drawdown(&borrower, dec!(5_000_000_000), 0).unwrap();

    let mut previous = Decimal::ZERO;
    for day in 30..=150u64 {
        let summary = pool.assess(day * DAY).unwrap();
        let percent = summary.writedown.percent;
        assert!(percent >= previous, "writedown regressed on day {day}");
        assert!(
            percent - previous <= dec!(2),
            "writedown jumped on day {day}"
        );
        previous = percent;

        // Senior never absorbs loss while junior has claim left.
        if pool.senior.writedown_applied > Decimal::ZERO {
            assert_eq!(pool.junior.writedown_applied, dec!(1_000_000_000));
        }
    }
    assert!(previous > Decimal::ZERO);
    assert!(pool.junior.writedown_applied > Decimal::ZERO);
}

#[test]
fn curing_delinquency_restores_senior_before_junior() {
    let config = ConfigHandle::default();
    let mut pool = new_pool(&config);
    let borrower = AuthContext::borrower("bob");
    pool.deposit(
        &AuthContext::participant("alice"),
        TrancheKind::Junior,
        dec!(1_000_000_000),
        0,
    )
    .unwrap();
    pool.lock_junior_capital(&borrower, 0).unwrap();
    pool.deposit(
        &AuthContext::participant("spool"),
        TrancheKind::Senior,
        dec!(4_000_000_000),
        0,
    )
    .unwrap();
    pool.lock_pool(&borrower, 0).unwrap();
    pool.drawdown(&borrower, dec!(5_000_000_000), 0).unwrap();

    // Deep delinquency marks down both tranches.
    pool.assess(150 * DAY).unwrap();
    let junior_before = pool.junior.writedown_applied;
    let senior_before = pool.senior.writedown_applied;
    assert!(junior_before > Decimal::ZERO);
    assert!(senior_before > Decimal::ZERO);

    // A partial cure shrinks the write-down; the recovery must come out
    // of senior's mark before junior's.
    pool.pay(dec!(50_000_000), 150 * DAY).unwrap();
    assert!(pool.senior.writedown_applied < senior_before);
    assert_eq!(pool.junior.writedown_applied, junior_before);

    // A full cure clears both.
    pool.pay(dec!(60_000_000), 150 * DAY).unwrap();
    assert_eq!(pool.senior.writedown_applied, Decimal::ZERO);
    assert_eq!(pool.junior.writedown_applied, Decimal::ZERO);
}

#[test]
fn equal_depositors_with_odd_payments_split_evenly() {
    let config = ConfigHandle::default();
    let mut pool = new_pool(&config);
    let borrower = AuthContext::borrower("bob");
    let alice = AuthContext::participant("alice");
    let carol = AuthContext::participant("carol");

    let t1 = pool
        .deposit(&alice, TrancheKind::Junior, dec!(500_000_000), 0)
        .unwrap();
    let t2 = pool
        .deposit(&carol, TrancheKind::Junior, dec!(500_000_000), 0)
        .unwrap();
    pool.lock_junior_capital(&borrower, 0).unwrap();
    pool.lock_pool(&borrower, 0).unwrap();
    pool.drawdown(&borrower, dec!(1_000_000_000), 0).unwrap();

    // Prime-ish payment amounts force truncation on every distribution.
    let mut t = 30 * DAY;
    for amount in [dec!(999_983), dec!(500_009), dec!(73), dec!(1_299_827)] {
        pool.pay(amount, t).unwrap();
        t += 7 * DAY;
    }

    let a1 = pool.available_to_withdraw(t1, t).unwrap();
    let a2 = pool.available_to_withdraw(t2, t).unwrap();
    assert_eq!(a1.interest, a2.interest);
    assert_eq!(a1.principal, a2.principal);

    // Withdrawals settle exactly what was quoted.
    let w1 = pool.withdraw_max(&alice, t1, t).unwrap();
    let w2 = pool.withdraw_max(&carol, t2, t).unwrap();
    assert_eq!(w1.total(), a1.total());
    assert_eq!(w2.total(), a2.total());
}

#[test]
fn assess_twice_at_same_time_changes_nothing() {
    let config = ConfigHandle::default();
    let mut pool = new_pool(&config);
    let borrower = AuthContext::borrower("bob");
    pool.deposit(
        &AuthContext::participant("alice"),
        TrancheKind::Junior,
        dec!(1_000_000_000),
        0,
    )
    .unwrap();
    pool.lock_junior_capital(&borrower, 0).unwrap();
    pool.lock_pool(&borrower, 0).unwrap();
    pool.drawdown(&borrower, dec!(1_000_000_000), 0).unwrap();

    pool.pay(dec!(2_000_000), 45 * DAY).unwrap();
    let junior_snapshot = pool.junior.clone();
    let line_snapshot = pool.credit_line.clone();

    let summary = pool.assess(45 * DAY).unwrap();
    assert_eq!(summary.assessment.payment.total(), Decimal::ZERO);
    assert_eq!(pool.junior, junior_snapshot);
    assert_eq!(pool.credit_line, line_snapshot);
}
