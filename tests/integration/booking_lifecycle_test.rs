// Booking flow through the wired services over in-memory storage:
// pricing, coupons, policy snapshots, cancellation and rescheduling.

#[path = "../helpers/mod.rs"]
mod helpers;

use chrono::{Duration, Utc};
use helpers::{TestContext, TestDataFactory};
use parlour::bookings::{BookingStatus, CancelledBy, CreateBookingRequest, RefundStatus};
use parlour::catalog::ExtraRequest;
use parlour::core::AppError;
use parlour::coupons::{CouponRequest, DiscountType};
use parlour::policies::{CancellationPolicy, FeeType};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn booking_request(service_id: &str, starts_in: Duration) -> CreateBookingRequest {
    CreateBookingRequest {
        customer_name: "  Ananya Rao ".to_string(),
        customer_email: "Ananya@Example.com".to_string(),
        customer_phone: Some("+919811111111".to_string()),
        service_id: service_id.to_string(),
        extra_ids: Vec::new(),
        employee_id: None,
        scheduled_at: Utc::now() + starts_in,
        coupon_code: None,
        notes: None,
    }
}

async fn seed_service(ctx: &TestContext, price: Decimal) -> String {
    let service = ctx
        .services
        .catalog
        .create_service(TestDataFactory::service_request("Keratin Treatment", price))
        .await
        .unwrap();
    service.id.unwrap()
}

async fn seed_active_policy(
    ctx: &TestContext,
    tier: CancellationPolicy,
    fee_type: FeeType,
    fee_value: Decimal,
) -> String {
    let policy = ctx
        .services
        .policies
        .create_policy(TestDataFactory::policy_request(tier, fee_type, fee_value))
        .await
        .unwrap();
    let id = policy.id.unwrap();
    ctx.services.policies.activate_policy(&id).await.unwrap();
    id
}

#[actix_web::test]
async fn test_create_prices_service_and_extras() {
    let (ctx, _) = TestContext::new();
    let service_id = seed_service(&ctx, dec!(2500.00)).await;
    let extra = ctx
        .services
        .catalog
        .add_extra(
            &service_id,
            ExtraRequest {
                name: "Scalp massage".to_string(),
                price: dec!(350.00),
                duration_minutes: 15,
                is_active: true,
            },
        )
        .await
        .unwrap();

    let mut request = booking_request(&service_id, Duration::days(3));
    request.extra_ids = vec![extra.id.clone().unwrap()];

    let booking = ctx.services.bookings.create_booking(request).await.unwrap();

    assert_eq!(booking.status, BookingStatus::Pending);
    assert_eq!(booking.subtotal, dec!(2850.00));
    assert_eq!(booking.total_amount, dec!(2850.00));
    assert_eq!(booking.duration_minutes, 75);
    assert_eq!(booking.customer_name, "Ananya Rao");
    assert_eq!(booking.customer_email, "ananya@example.com");
    assert_eq!(booking.extras.len(), 1);
    assert_eq!(booking.extras[0].name, "Scalp massage");

    let stored = ctx.bookings.get(booking.id.as_deref().unwrap()).unwrap();
    assert_eq!(stored.total_amount, dec!(2850.00));
}

#[actix_web::test]
async fn test_create_rejects_past_time_and_foreign_extra() {
    let (ctx, _) = TestContext::new();
    let service_id = seed_service(&ctx, dec!(900.00)).await;
    let other_id = seed_service(&ctx, dec!(400.00)).await;
    let foreign = ctx
        .services
        .catalog
        .add_extra(
            &other_id,
            ExtraRequest {
                name: "Nail art".to_string(),
                price: dec!(150.00),
                duration_minutes: 10,
                is_active: true,
            },
        )
        .await
        .unwrap();

    let past = booking_request(&service_id, -Duration::hours(1));
    assert!(matches!(
        ctx.services.bookings.create_booking(past).await,
        Err(AppError::Validation(_))
    ));

    let mut request = booking_request(&service_id, Duration::days(1));
    request.extra_ids = vec![foreign.id.unwrap()];
    assert!(matches!(
        ctx.services.bookings.create_booking(request).await,
        Err(AppError::Validation(_))
    ));
}

#[actix_web::test]
async fn test_inactive_service_cannot_be_booked() {
    let (ctx, _) = TestContext::new();
    let mut request = TestDataFactory::service_request("Bridal Makeup", dec!(8000.00));
    request.is_active = false;
    let service = ctx.services.catalog.create_service(request).await.unwrap();

    let result = ctx
        .services
        .bookings
        .create_booking(booking_request(&service.id.unwrap(), Duration::days(5)))
        .await;

    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[actix_web::test]
async fn test_coupon_discount_applied_and_redeemed() {
    let (ctx, _) = TestContext::new();
    let service_id = seed_service(&ctx, dec!(1000.00)).await;
    let coupon = ctx
        .services
        .coupons
        .create_coupon(CouponRequest {
            code: "diwali20".to_string(),
            discount_type: DiscountType::Percentage,
            discount_value: dec!(20),
            min_order_amount: None,
            max_discount_amount: Some(dec!(150)),
            usage_limit: Some(1),
            valid_from: None,
            valid_until: None,
            is_active: true,
        })
        .await
        .unwrap();

    let mut request = booking_request(&service_id, Duration::days(2));
    request.coupon_code = Some("DIWALI20".to_string());
    let booking = ctx
        .services
        .bookings
        .create_booking(request.clone())
        .await
        .unwrap();

    assert_eq!(booking.discount_amount, dec!(150));
    assert_eq!(booking.total_amount, dec!(850.00));
    assert_eq!(booking.coupon_id, coupon.id);

    let stored = ctx.services.coupons.get_coupon(coupon.id.as_deref().unwrap()).await.unwrap();
    assert_eq!(stored.used_count, 1);

    // Usage limit of one is now exhausted
    assert!(matches!(
        ctx.services.bookings.create_booking(request).await,
        Err(AppError::Validation(_))
    ));
}

#[actix_web::test]
async fn test_booking_snapshots_active_policy() {
    let (ctx, _) = TestContext::new();
    let service_id = seed_service(&ctx, dec!(600.00)).await;

    let without = ctx
        .services
        .bookings
        .create_booking(booking_request(&service_id, Duration::days(1)))
        .await
        .unwrap();
    assert!(without.policy_id.is_none());

    let policy_id = seed_active_policy(
        &ctx,
        CancellationPolicy::PartialRefund,
        FeeType::Fixed,
        dec!(0),
    )
    .await;
    let with = ctx
        .services
        .bookings
        .create_booking(booking_request(&service_id, Duration::days(1)))
        .await
        .unwrap();
    assert_eq!(with.policy_id.as_deref(), Some(policy_id.as_str()));
}

#[actix_web::test]
async fn test_confirm_then_cancel_outside_free_window() {
    let (ctx, _) = TestContext::new();
    let service_id = seed_service(&ctx, dec!(1500.00)).await;
    seed_active_policy(&ctx, CancellationPolicy::FullRefund, FeeType::Fixed, dec!(200)).await;

    let booking = ctx
        .services
        .bookings
        .create_booking(booking_request(&service_id, Duration::days(4)))
        .await
        .unwrap();
    let id = booking.id.unwrap();

    let confirmed = ctx
        .services
        .bookings
        .confirm_booking(&id, " pay_N1a2b3c4 ")
        .await
        .unwrap();
    assert_eq!(confirmed.status, BookingStatus::Confirmed);
    assert_eq!(confirmed.payment_id.as_deref(), Some("pay_N1a2b3c4"));

    let cancelled = ctx
        .services
        .bookings
        .cancel_booking(&id, Some("Travelling".to_string()), CancelledBy::Customer)
        .await
        .unwrap();

    assert_eq!(cancelled.status, BookingStatus::Cancelled);
    assert_eq!(cancelled.cancellation_fee, Some(Decimal::ZERO));
    assert_eq!(cancelled.refund_amount, Some(dec!(1500.00)));
    assert_eq!(cancelled.refund_status, Some(RefundStatus::Pending));
    assert_eq!(cancelled.cancellation_reason.as_deref(), Some("Travelling"));
    assert!(cancelled.cancelled_at.is_some());

    // Cancelling twice is a conflict
    assert!(matches!(
        ctx.services
            .bookings
            .cancel_booking(&id, None, CancelledBy::Admin)
            .await,
        Err(AppError::Conflict(_))
    ));
}

#[actix_web::test]
async fn test_late_cancel_charges_fee_and_respects_cutoff() {
    let (ctx, _) = TestContext::new();
    let service_id = seed_service(&ctx, dec!(2000.00)).await;
    seed_active_policy(
        &ctx,
        CancellationPolicy::PartialRefund,
        FeeType::Percentage,
        dec!(10),
    )
    .await;

    // Inside the 24h free window, outside the 2h cutoff
    let late = ctx
        .services
        .bookings
        .create_booking(booking_request(&service_id, Duration::hours(6)))
        .await
        .unwrap();
    let cancelled = ctx
        .services
        .bookings
        .cancel_booking(late.id.as_deref().unwrap(), None, CancelledBy::Customer)
        .await
        .unwrap();
    assert_eq!(cancelled.cancellation_fee, Some(dec!(200.00)));
    assert_eq!(cancelled.refund_amount, Some(dec!(800.00)));

    // Inside the cutoff: customers are refused, admins may override
    let imminent = ctx
        .services
        .bookings
        .create_booking(booking_request(&service_id, Duration::minutes(30)))
        .await
        .unwrap();
    let imminent_id = imminent.id.unwrap();
    assert!(matches!(
        ctx.services
            .bookings
            .cancel_booking(&imminent_id, None, CancelledBy::Customer)
            .await,
        Err(AppError::Conflict(_))
    ));
    let overridden = ctx
        .services
        .bookings
        .cancel_booking(&imminent_id, None, CancelledBy::Admin)
        .await
        .unwrap();
    assert_eq!(overridden.status, BookingStatus::Cancelled);
}

#[actix_web::test]
async fn test_no_refund_policy_marks_not_applicable() {
    let (ctx, _) = TestContext::new();
    let service_id = seed_service(&ctx, dec!(700.00)).await;
    seed_active_policy(&ctx, CancellationPolicy::NoRefund, FeeType::Fixed, dec!(0)).await;

    let booking = ctx
        .services
        .bookings
        .create_booking(booking_request(&service_id, Duration::days(3)))
        .await
        .unwrap();
    let cancelled = ctx
        .services
        .bookings
        .cancel_booking(booking.id.as_deref().unwrap(), None, CancelledBy::Customer)
        .await
        .unwrap();

    assert_eq!(cancelled.refund_amount, Some(Decimal::ZERO));
    assert_eq!(cancelled.refund_status, Some(RefundStatus::NotApplicable));
}

#[actix_web::test]
async fn test_reschedule_limits() {
    let (ctx, _) = TestContext::new();
    let service_id = seed_service(&ctx, dec!(1200.00)).await;
    seed_active_policy(&ctx, CancellationPolicy::FullRefund, FeeType::Fixed, dec!(0)).await;

    let booking = ctx
        .services
        .bookings
        .create_booking(booking_request(&service_id, Duration::days(5)))
        .await
        .unwrap();
    let id = booking.id.unwrap();

    let first = ctx
        .services
        .bookings
        .reschedule_booking(&id, Utc::now() + Duration::days(6))
        .await
        .unwrap();
    assert_eq!(first.reschedule_count, 1);

    let second = ctx
        .services
        .bookings
        .reschedule_booking(&id, Utc::now() + Duration::days(7))
        .await
        .unwrap();
    assert_eq!(second.reschedule_count, 2);

    // max_reschedules is 2
    assert!(matches!(
        ctx.services
            .bookings
            .reschedule_booking(&id, Utc::now() + Duration::days(8))
            .await,
        Err(AppError::Conflict(_))
    ));
}

#[actix_web::test]
async fn test_reschedule_rejected_inside_cutoff_or_into_past() {
    let (ctx, _) = TestContext::new();
    let service_id = seed_service(&ctx, dec!(1200.00)).await;
    seed_active_policy(&ctx, CancellationPolicy::FullRefund, FeeType::Fixed, dec!(0)).await;

    let soon = ctx
        .services
        .bookings
        .create_booking(booking_request(&service_id, Duration::hours(3)))
        .await
        .unwrap();
    assert!(matches!(
        ctx.services
            .bookings
            .reschedule_booking(soon.id.as_deref().unwrap(), Utc::now() + Duration::days(2))
            .await,
        Err(AppError::Conflict(_))
    ));

    let later = ctx
        .services
        .bookings
        .create_booking(booking_request(&service_id, Duration::days(3)))
        .await
        .unwrap();
    assert!(matches!(
        ctx.services
            .bookings
            .reschedule_booking(later.id.as_deref().unwrap(), Utc::now() - Duration::hours(1))
            .await,
        Err(AppError::Validation(_))
    ));
}

#[actix_web::test]
async fn test_complete_requires_confirmation() {
    let (ctx, _) = TestContext::new();
    let service_id = seed_service(&ctx, dec!(500.00)).await;
    let booking = ctx
        .services
        .bookings
        .create_booking(booking_request(&service_id, Duration::days(1)))
        .await
        .unwrap();
    let id = booking.id.unwrap();

    assert!(ctx.services.bookings.complete_booking(&id).await.is_err());

    ctx.services.bookings.confirm_booking(&id, "pay_abc").await.unwrap();
    let completed = ctx.services.bookings.complete_booking(&id).await.unwrap();
    assert_eq!(completed.status, BookingStatus::Completed);

    // Completed bookings are closed
    assert!(ctx
        .services
        .bookings
        .cancel_booking(&id, None, CancelledBy::Admin)
        .await
        .is_err());
}

#[actix_web::test]
async fn test_list_filters_by_status() {
    let (ctx, _) = TestContext::new();
    let service_id = seed_service(&ctx, dec!(500.00)).await;
    for days in 1..=3 {
        ctx.services
            .bookings
            .create_booking(booking_request(&service_id, Duration::days(days)))
            .await
            .unwrap();
    }
    let all = ctx.services.bookings.list_bookings(None, 50, 0).await.unwrap();
    let id = all[0].id.clone().unwrap();
    ctx.services.bookings.confirm_booking(&id, "pay_1").await.unwrap();

    let pending = ctx
        .services
        .bookings
        .list_bookings(Some(BookingStatus::Pending), 50, 0)
        .await
        .unwrap();
    let confirmed = ctx
        .services
        .bookings
        .list_bookings(Some(BookingStatus::Confirmed), 50, 0)
        .await
        .unwrap();

    assert_eq!(all.len(), 3);
    assert_eq!(pending.len(), 2);
    assert_eq!(confirmed.len(), 1);
    assert_eq!(
        ctx.services.bookings.list_bookings(None, 2, 2).await.unwrap().len(),
        1
    );
}

#[actix_web::test]
async fn test_failed_insert_gives_coupon_use_back() {
    let (ctx, _) = TestContext::new();
    let service_id = seed_service(&ctx, dec!(800.00)).await;
    let coupon = ctx
        .services
        .coupons
        .create_coupon(CouponRequest {
            code: "FIRSTVISIT".to_string(),
            discount_type: DiscountType::Fixed,
            discount_value: dec!(100),
            min_order_amount: None,
            max_discount_amount: None,
            usage_limit: Some(1),
            valid_from: None,
            valid_until: None,
            is_active: true,
        })
        .await
        .unwrap();
    let coupon_id = coupon.id.unwrap();

    let mut request = booking_request(&service_id, Duration::days(3));
    request.coupon_code = Some("FIRSTVISIT".to_string());

    *ctx.bookings.fail_create.lock().unwrap() = true;
    assert!(ctx
        .services
        .bookings
        .create_booking(request.clone())
        .await
        .is_err());
    assert_eq!(
        ctx.services.coupons.get_coupon(&coupon_id).await.unwrap().used_count,
        0
    );
    assert!(ctx.bookings.bookings.lock().unwrap().is_empty());

    // The single use is still available once inserts succeed
    *ctx.bookings.fail_create.lock().unwrap() = false;
    let booking = ctx.services.bookings.create_booking(request).await.unwrap();
    assert_eq!(booking.discount_amount, dec!(100));
    assert_eq!(
        ctx.services.coupons.get_coupon(&coupon_id).await.unwrap().used_count,
        1
    );
}

#[actix_web::test]
async fn test_confirm_racing_cancel_does_not_reopen_booking() {
    let (ctx, _) = TestContext::new();
    let service_id = seed_service(&ctx, dec!(1200.00)).await;
    let booking = ctx
        .services
        .bookings
        .create_booking(booking_request(&service_id, Duration::days(2)))
        .await
        .unwrap();
    let id = booking.id.unwrap();

    // A customer cancellation lands between the admin's read and write
    ctx.bookings.write_after_next_read(&id, |stored| {
        stored.status = BookingStatus::Cancelled;
        stored.refund_status = Some(RefundStatus::NotApplicable);
        stored.refund_amount = Some(Decimal::ZERO);
        stored.cancelled_at = Some(Utc::now());
    });

    let result = ctx.services.bookings.confirm_booking(&id, "pay_late").await;

    assert!(matches!(result, Err(AppError::Conflict(_))));
    let stored = ctx.bookings.get(&id).unwrap();
    assert_eq!(stored.status, BookingStatus::Cancelled);
    assert!(stored.payment_id.is_none());
}

#[actix_web::test]
async fn test_concurrent_reschedule_is_not_lost() {
    let (ctx, _) = TestContext::new();
    let service_id = seed_service(&ctx, dec!(700.00)).await;
    let booking = ctx
        .services
        .bookings
        .create_booking(booking_request(&service_id, Duration::days(4)))
        .await
        .unwrap();
    let id = booking.id.unwrap();

    let moved_to = Utc::now() + Duration::days(6);
    ctx.bookings.write_after_next_read(&id, move |stored| {
        stored.scheduled_at = moved_to;
        stored.reschedule_count += 1;
    });

    let result = ctx
        .services
        .bookings
        .reschedule_booking(&id, Utc::now() + Duration::days(5))
        .await;

    assert!(matches!(result, Err(AppError::Conflict(_))));
    let stored = ctx.bookings.get(&id).unwrap();
    assert_eq!(stored.reschedule_count, 1);
    assert_eq!(stored.scheduled_at, moved_to);
}
