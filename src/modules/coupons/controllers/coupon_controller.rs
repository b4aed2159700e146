use std::sync::Arc;

use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::core::error::AppError;
use crate::modules::coupons::models::CouponRequest;
use crate::modules::coupons::services::CouponService;

#[derive(Debug, Deserialize)]
pub struct ListCouponsQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    50
}

/// GET /admin/coupons
pub async fn list_coupons(
    service: web::Data<Arc<CouponService>>,
    query: web::Query<ListCouponsQuery>,
) -> Result<HttpResponse, AppError> {
    let coupons = service.list_coupons(query.limit, query.offset).await?;
    Ok(HttpResponse::Ok().json(coupons))
}

/// POST /admin/coupons
pub async fn create_coupon(
    service: web::Data<Arc<CouponService>>,
    request: web::Json<CouponRequest>,
) -> Result<HttpResponse, AppError> {
    let coupon = service.create_coupon(request.into_inner()).await?;
    Ok(HttpResponse::Created().json(coupon))
}

/// GET /admin/coupons/{id}
pub async fn get_coupon(
    service: web::Data<Arc<CouponService>>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let coupon = service.get_coupon(&path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(coupon))
}

/// PUT /admin/coupons/{id}
pub async fn update_coupon(
    service: web::Data<Arc<CouponService>>,
    path: web::Path<String>,
    request: web::Json<CouponRequest>,
) -> Result<HttpResponse, AppError> {
    let coupon = service
        .update_coupon(&path.into_inner(), request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(coupon))
}

/// DELETE /admin/coupons/{id}
pub async fn delete_coupon(
    service: web::Data<Arc<CouponService>>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    service.delete_coupon(&path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Admin coupon routes (mounted under /admin)
pub fn configure_admin(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/coupons")
            .route("", web::get().to(list_coupons))
            .route("", web::post().to(create_coupon))
            .route("/{id}", web::get().to(get_coupon))
            .route("/{id}", web::put().to(update_coupon))
            .route("/{id}", web::delete().to(delete_coupon)),
    );
}
