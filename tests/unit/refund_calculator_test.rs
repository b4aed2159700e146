// Refund arithmetic: base tiers, fee deduction and resulting refund status.

#[path = "../helpers/mod.rs"]
mod helpers;

use chrono::{Duration, Utc};
use helpers::TestDataFactory;
use parlour::bookings::RefundStatus;
use parlour::policies::{CancellationPolicy, FeeType};
use parlour::refunds::RefundCalculator;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn any_policy() -> impl Strategy<Value = Option<CancellationPolicy>> {
    prop_oneof![
        Just(None),
        Just(Some(CancellationPolicy::FullRefund)),
        Just(Some(CancellationPolicy::PartialRefund)),
        Just(Some(CancellationPolicy::CreditOnly)),
        Just(Some(CancellationPolicy::NoRefund)),
    ]
}

#[test]
fn test_full_refund_outside_fee_window_returns_total() {
    let now = Utc::now();
    let booking = TestDataFactory::booking(dec!(1200.00), Duration::hours(48), now);
    let policy = TestDataFactory::policy(CancellationPolicy::FullRefund, FeeType::Fixed, dec!(100));

    let result = RefundCalculator::compute(&booking, Some(&policy), now);

    assert_eq!(result.cancellation_fee, Decimal::ZERO);
    assert_eq!(result.refund_amount, dec!(1200.00));
    assert_eq!(result.refund_status, RefundStatus::Pending);
}

#[test]
fn test_partial_refund_halves_then_deducts_fee() {
    let now = Utc::now();
    let booking = TestDataFactory::booking(dec!(1000.00), Duration::hours(5), now);
    let policy = TestDataFactory::policy(
        CancellationPolicy::PartialRefund,
        FeeType::Percentage,
        dec!(10),
    );

    let result = RefundCalculator::compute(&booking, Some(&policy), now);

    // base 500, fee 10% of 1000 = 100
    assert_eq!(result.cancellation_fee, dec!(100.00));
    assert_eq!(result.refund_amount, dec!(400.00));
    assert_eq!(result.refund_status, RefundStatus::Pending);
}

#[test]
fn test_partial_refund_of_odd_paise_rounds_to_currency() {
    let now = Utc::now();
    let booking = TestDataFactory::booking(dec!(999.99), Duration::hours(48), now);
    let policy = TestDataFactory::policy(CancellationPolicy::PartialRefund, FeeType::Fixed, dec!(0));

    let result = RefundCalculator::compute(&booking, Some(&policy), now);

    assert_eq!(result.refund_amount, dec!(500.00));
}

#[test]
fn test_credit_only_and_no_refund_owe_nothing() {
    let now = Utc::now();
    let booking = TestDataFactory::booking(dec!(800.00), Duration::hours(72), now);

    for tier in [CancellationPolicy::CreditOnly, CancellationPolicy::NoRefund] {
        let policy = TestDataFactory::policy(tier, FeeType::Fixed, dec!(0));
        let result = RefundCalculator::compute(&booking, Some(&policy), now);
        assert_eq!(result.refund_amount, Decimal::ZERO);
        assert_eq!(result.refund_status, RefundStatus::NotApplicable);
    }
}

#[test]
fn test_missing_policy_refunds_everything() {
    let now = Utc::now();
    let booking = TestDataFactory::booking(dec!(650.00), Duration::minutes(30), now);

    let result = RefundCalculator::compute(&booking, None, now);

    assert_eq!(result.cancellation_fee, Decimal::ZERO);
    assert_eq!(result.refund_amount, dec!(650.00));
    assert_eq!(result.refund_status, RefundStatus::Pending);
}

#[test]
fn test_fee_exceeding_partial_base_leaves_nothing() {
    let now = Utc::now();
    let booking = TestDataFactory::booking(dec!(1000.00), Duration::hours(1), now);
    let policy = TestDataFactory::policy(
        CancellationPolicy::PartialRefund,
        FeeType::Fixed,
        dec!(600),
    );

    let result = RefundCalculator::compute(&booking, Some(&policy), now);

    assert_eq!(result.cancellation_fee, dec!(600));
    assert_eq!(result.refund_amount, Decimal::ZERO);
    assert_eq!(result.refund_status, RefundStatus::NotApplicable);
}

proptest! {
    #[test]
    fn prop_refund_never_negative_or_above_base(
        total_paise in 0i64..10_000_000,
        fee_paise in 0i64..10_000_000,
        policy in any_policy(),
    ) {
        let total = Decimal::new(total_paise, 2);
        let fee = Decimal::new(fee_paise, 2);

        let base = RefundCalculator::refund_base(total, policy);
        let refund = RefundCalculator::refund_amount(base, fee);

        prop_assert!(base <= total);
        prop_assert!(refund >= Decimal::ZERO);
        prop_assert!(refund <= base);
    }

    #[test]
    fn prop_status_follows_amount(
        total_paise in 0i64..10_000_000,
        hours_before in -48i64..96,
        fee_value in 0u32..=100,
        policy in any_policy(),
    ) {
        let now = Utc::now();
        let booking = TestDataFactory::booking(
            Decimal::new(total_paise, 2),
            Duration::hours(hours_before),
            now,
        );
        let setting = policy.map(|tier| {
            TestDataFactory::policy(tier, FeeType::Percentage, Decimal::from(fee_value))
        });

        let result = RefundCalculator::compute(&booking, setting.as_ref(), now);

        if result.refund_amount > Decimal::ZERO {
            prop_assert_eq!(result.refund_status, RefundStatus::Pending);
        } else {
            prop_assert_eq!(result.refund_status, RefundStatus::NotApplicable);
        }
        prop_assert!(result.refund_amount <= booking.total_amount);
    }
}
