use std::sync::Arc;

use actix_web::{web, HttpResponse};

use crate::core::error::AppError;
use crate::modules::policies::models::PolicyRequest;
use crate::modules::policies::services::PolicyService;

/// GET /admin/policies
pub async fn list_policies(
    service: web::Data<Arc<PolicyService>>,
) -> Result<HttpResponse, AppError> {
    let policies = service.list_policies().await?;
    Ok(HttpResponse::Ok().json(policies))
}

/// POST /admin/policies
pub async fn create_policy(
    service: web::Data<Arc<PolicyService>>,
    request: web::Json<PolicyRequest>,
) -> Result<HttpResponse, AppError> {
    let policy = service.create_policy(request.into_inner()).await?;
    Ok(HttpResponse::Created().json(policy))
}

/// GET /admin/policies/{id}
pub async fn get_policy(
    service: web::Data<Arc<PolicyService>>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let policy = service.get_policy(&path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(policy))
}

/// PUT /admin/policies/{id}
pub async fn update_policy(
    service: web::Data<Arc<PolicyService>>,
    path: web::Path<String>,
    request: web::Json<PolicyRequest>,
) -> Result<HttpResponse, AppError> {
    let policy = service
        .update_policy(&path.into_inner(), request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(policy))
}

/// DELETE /admin/policies/{id}
pub async fn delete_policy(
    service: web::Data<Arc<PolicyService>>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    service.delete_policy(&path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// POST /admin/policies/{id}/activate
pub async fn activate_policy(
    service: web::Data<Arc<PolicyService>>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let policy = service.activate_policy(&path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(policy))
}

pub fn configure_admin(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/policies")
            .route("", web::get().to(list_policies))
            .route("", web::post().to(create_policy))
            .route("/{id}", web::get().to(get_policy))
            .route("/{id}", web::put().to(update_policy))
            .route("/{id}", web::delete().to(delete_policy))
            .route("/{id}/activate", web::post().to(activate_policy)),
    );
}
