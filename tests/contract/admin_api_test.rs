// HTTP contract for the admin surface behind X-API-Key.

#[path = "../helpers/mod.rs"]
mod helpers;

use actix_web::{http::StatusCode, test, App};
use chrono::{Duration, Utc};
use helpers::{TestContext, TestDataFactory};
use parlour::bookings::RefundStatus;
use rust_decimal_macros::dec;
use serde_json::{json, Value};

/// Status of a request whether it was answered or rejected by middleware
macro_rules! status_of {
    ($app:expr, $req:expr) => {
        match test::try_call_service($app, $req).await {
            Ok(resp) => resp.status(),
            Err(err) => err.as_response_error().status_code(),
        }
    };
}

#[actix_web::test]
async fn test_admin_requires_valid_key() {
    let (ctx, _) = TestContext::new();
    let app = test::init_service(
        App::new().configure(|cfg| ctx.services.configure(cfg, ctx.limiter())),
    )
    .await;

    let missing = status_of!(
        &app,
        test::TestRequest::get().uri("/admin/policies").to_request()
    );
    assert_eq!(missing, StatusCode::UNAUTHORIZED);

    let forged = status_of!(
        &app,
        test::TestRequest::get()
            .uri("/admin/policies")
            .insert_header(("X-API-Key", format!("plr_{}", "0".repeat(64))))
            .to_request()
    );
    assert_eq!(forged, StatusCode::UNAUTHORIZED);

    let key = ctx.admin_key().await;
    let allowed = status_of!(
        &app,
        test::TestRequest::get()
            .uri("/admin/policies")
            .insert_header(("X-API-Key", key))
            .to_request()
    );
    assert_eq!(allowed, StatusCode::OK);
}

#[actix_web::test]
async fn test_policy_crud_and_activation() {
    let (ctx, _) = TestContext::new();
    let key = ctx.admin_key().await;
    let app = test::init_service(
        App::new().configure(|cfg| ctx.services.configure(cfg, ctx.limiter())),
    )
    .await;

    let create = |body: Value| {
        test::TestRequest::post()
            .uri("/admin/policies")
            .insert_header(("X-API-Key", key.clone()))
            .set_json(body)
            .to_request()
    };

    let resp = test::call_service(
        &app,
        create(json!({
            "name": "Standard",
            "cancellation_policy": "partial_refund",
            "cancellation_fee_type": "percentage",
            "cancellation_fee_value": "10",
        })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let standard: Value = test::read_body_json(resp).await;
    assert_eq!(standard["is_active"], false);
    assert_eq!(standard["free_cancellation_hours"], 24);
    assert_eq!(standard["max_reschedules"], 2);
    let standard_id = standard["id"].as_str().unwrap().to_string();

    let resp = test::call_service(
        &app,
        create(json!({
            "name": "Too steep",
            "cancellation_policy": "full_refund",
            "cancellation_fee_type": "percentage",
            "cancellation_fee_value": "150",
        })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = test::call_service(
        &app,
        create(json!({
            "name": "Festive",
            "cancellation_policy": "no_refund",
        })),
    )
    .await;
    let festive: Value = test::read_body_json(resp).await;
    let festive_id = festive["id"].as_str().unwrap().to_string();

    for id in [&standard_id, &festive_id] {
        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri(&format!("/admin/policies/{}/activate", id))
                .insert_header(("X-API-Key", key.clone()))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    let active = ctx.services.policies.get_active().await.unwrap().unwrap();
    assert_eq!(active.id.as_deref(), Some(festive_id.as_str()));

    // The active policy is protected; the inactive one can go
    let resp = test::call_service(
        &app,
        test::TestRequest::delete()
            .uri(&format!("/admin/policies/{}", festive_id))
            .insert_header(("X-API-Key", key.clone()))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let resp = test::call_service(
        &app,
        test::TestRequest::delete()
            .uri(&format!("/admin/policies/{}", standard_id))
            .insert_header(("X-API-Key", key.clone()))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = test::call_service(
        &app,
        test::TestRequest::put()
            .uri(&format!("/admin/policies/{}", festive_id))
            .insert_header(("X-API-Key", key.clone()))
            .set_json(json!({
                "name": "Festive",
                "cancellation_policy": "credit_only",
                "free_cancellation_hours": 48,
            }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Value = test::read_body_json(resp).await;
    assert_eq!(updated["cancellation_policy"], "credit_only");
    assert_eq!(updated["free_cancellation_hours"], 48);
}

#[actix_web::test]
async fn test_service_extra_and_coupon_management() {
    let (ctx, _) = TestContext::new();
    let key = ctx.admin_key().await;
    let app = test::init_service(
        App::new().configure(|cfg| ctx.services.configure(cfg, ctx.limiter())),
    )
    .await;

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/admin/services")
            .insert_header(("X-API-Key", key.clone()))
            .set_json(json!({
                "name": "Pedicure",
                "duration_minutes": 45,
                "price": "799.00",
            }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let service: Value = test::read_body_json(resp).await;
    assert_eq!(service["currency"], "INR");
    let service_id = service["id"].as_str().unwrap().to_string();

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/admin/services/{}/extras", service_id))
            .insert_header(("X-API-Key", key.clone()))
            .set_json(json!({"name": "Paraffin wax", "price": "250.00", "duration_minutes": 15}))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let extra: Value = test::read_body_json(resp).await;
    let extra_id = extra["id"].as_str().unwrap().to_string();

    let resp = test::call_service(
        &app,
        test::TestRequest::put()
            .uri(&format!("/admin/extras/{}", extra_id))
            .insert_header(("X-API-Key", key.clone()))
            .set_json(json!({"name": "Paraffin wax", "price": "300.00", "is_active": false}))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let extra: Value = test::read_body_json(resp).await;
    assert_eq!(TestDataFactory::amount(&extra["price"]), dec!(300.00));
    assert_eq!(extra["is_active"], false);

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/admin/coupons")
            .insert_header(("X-API-Key", key.clone()))
            .set_json(json!({
                "code": "monsoon15",
                "discount_type": "percentage",
                "discount_value": "15",
            }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let coupon: Value = test::read_body_json(resp).await;
    assert_eq!(coupon["code"], "MONSOON15");

    // Codes are unique regardless of case
    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/admin/coupons")
            .insert_header(("X-API-Key", key.clone()))
            .set_json(json!({
                "code": "Monsoon15",
                "discount_type": "fixed",
                "discount_value": "100",
            }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // A service with bookings can only be deactivated
    ctx.catalog
        .booked_services
        .lock()
        .unwrap()
        .insert(service_id.clone());
    let resp = test::call_service(
        &app,
        test::TestRequest::delete()
            .uri(&format!("/admin/services/{}", service_id))
            .insert_header(("X-API-Key", key.clone()))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[actix_web::test]
async fn test_booking_administration_and_refund() {
    let (ctx, gateway) = TestContext::new();
    let key = ctx.admin_key().await;
    let service = ctx
        .services
        .catalog
        .create_service(TestDataFactory::service_request("Hydra Facial", dec!(3000.00)))
        .await
        .unwrap();
    let booking = ctx
        .services
        .bookings
        .create_booking(
            serde_json::from_value(TestDataFactory::booking_payload(
                service.id.as_deref().unwrap(),
                Utc::now() + Duration::minutes(45),
            ))
            .unwrap(),
        )
        .await
        .unwrap();
    let id = booking.id.unwrap();

    let app = test::init_service(
        App::new().configure(|cfg| ctx.services.configure(cfg, ctx.limiter())),
    )
    .await;
    let admin_post = |uri: String, body: Option<Value>| {
        let req = test::TestRequest::post()
            .uri(&uri)
            .insert_header(("X-API-Key", key.clone()));
        match body {
            Some(body) => req.set_json(body).to_request(),
            None => req.to_request(),
        }
    };

    let resp = test::call_service(
        &app,
        admin_post(
            format!("/admin/bookings/{}/confirm", id),
            Some(json!({"payment_id": "pay_Hydra01"})),
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let confirmed: Value = test::read_body_json(resp).await;
    assert_eq!(confirmed["status"], "confirmed");
    assert_eq!(confirmed["payment_id"], "pay_Hydra01");

    // Inside any cutoff, but admins may still cancel
    let resp = test::call_service(
        &app,
        admin_post(
            format!("/admin/bookings/{}/cancel", id),
            Some(json!({"reason": "Therapist unavailable"})),
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let cancelled: Value = test::read_body_json(resp).await;
    assert_eq!(cancelled["refund_status"], "pending");
    assert_eq!(TestDataFactory::amount(&cancelled["refund_amount"]), dec!(3000.00));

    let resp = test::call_service(&app, admin_post(format!("/admin/bookings/{}/refund", id), None)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let refunded: Value = test::read_body_json(resp).await;
    assert_eq!(refunded["refund_status"], "processed");
    assert_eq!(refunded["refund_transaction_id"], "rfnd_test_1");

    let resp = test::call_service(&app, admin_post(format!("/admin/bookings/{}/refund", id), None)).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    assert_eq!(gateway.call_count(), 1);

    {
        let calls = gateway.calls.lock().unwrap();
        assert_eq!(calls[0].payment_id, "pay_Hydra01");
        assert_eq!(calls[0].amount, dec!(3000.00));
        assert_eq!(calls[0].reason, "Therapist unavailable");
    }

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/admin/bookings?status=cancelled&limit=10")
            .insert_header(("X-API-Key", key.clone()))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let listed: Value = test::read_body_json(resp).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert_eq!(listed[0]["id"], json!(id));
}

#[actix_web::test]
async fn test_failed_gateway_refund_surfaces_502() {
    let gateway = std::sync::Arc::new(helpers::FakeGateway::failing(
        "Razorpay refund failed with status 500: SERVER_ERROR",
    ));
    let ctx = TestContext::with_gateway(gateway.clone());
    let key = ctx.admin_key().await;

    let now = Utc::now();
    let mut booking =
        TestDataFactory::cancelled_booking(dec!(900.00), now + Duration::days(2), now, None);
    booking.refund_amount = Some(dec!(900.00));
    booking.refund_status = Some(RefundStatus::Pending);
    let id = booking.id.clone().unwrap();
    ctx.bookings.insert(booking);

    let app = test::init_service(
        App::new().configure(|cfg| ctx.services.configure(cfg, ctx.limiter())),
    )
    .await;
    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/admin/bookings/{}/refund", id))
            .insert_header(("X-API-Key", key))
            .to_request(),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(
        ctx.bookings.get(&id).unwrap().refund_status,
        Some(RefundStatus::Failed)
    );
}

#[actix_web::test]
async fn test_recalculate_endpoint_honours_dry_run() {
    let (ctx, _) = TestContext::new();
    let key = ctx.admin_key().await;
    let scheduled_at = Utc::now() + Duration::days(1);
    let booking = TestDataFactory::cancelled_booking(
        dec!(1000.00),
        scheduled_at,
        scheduled_at - Duration::hours(3),
        None,
    );
    let id = booking.id.clone().unwrap();
    ctx.bookings.insert(booking);

    let app = test::init_service(
        App::new().configure(|cfg| ctx.services.configure(cfg, ctx.limiter())),
    )
    .await;

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/admin/refunds/recalculate?dry_run=true")
            .insert_header(("X-API-Key", key.clone()))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let summary: Value = test::read_body_json(resp).await;
    assert_eq!(summary["dry_run"], true);
    assert_eq!(summary["updated"], 1);
    assert!(ctx.bookings.get(&id).unwrap().refund_status.is_none());

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/admin/refunds/recalculate")
            .insert_header(("X-API-Key", key))
            .to_request(),
    )
    .await;
    let summary: Value = test::read_body_json(resp).await;
    assert_eq!(summary["dry_run"], false);
    assert_eq!(summary["adjustments"][0]["booking_id"], json!(id));
    assert_eq!(
        ctx.bookings.get(&id).unwrap().refund_status,
        Some(RefundStatus::Pending)
    );
}
