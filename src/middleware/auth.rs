use crate::core::AppError;
use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpMessage,
};
use argon2::{
    password_hash::{PasswordHasher, SaltString},
    Argon2, PasswordHash, PasswordVerifier,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures_util::future::LocalBoxFuture;
use sqlx::MySqlPool;
use std::future::{ready, Ready};
use std::rc::Rc;
use std::sync::Arc;

/// Characters of a key stored in clear for lookup
pub const KEY_PREFIX_LEN: usize = 12;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AdminApiKey {
    pub id: String,
    pub key_prefix: String,
    pub key_hash: String,
    pub label: String,
    pub is_active: bool,
    pub last_used_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Authenticated admin, available to handlers via request extensions
#[derive(Debug, Clone)]
pub struct AdminPrincipal {
    pub key_id: String,
    pub label: String,
}

#[async_trait]
pub trait AdminKeyStore: Send + Sync {
    /// Active keys sharing `prefix`
    async fn find_by_prefix(&self, prefix: &str) -> crate::core::Result<Vec<AdminApiKey>>;

    async fn create(&self, key: &AdminApiKey) -> crate::core::Result<()>;

    async fn touch(&self, id: &str) -> crate::core::Result<()>;
}

pub struct MySqlAdminKeyStore {
    pool: MySqlPool,
}

impl MySqlAdminKeyStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AdminKeyStore for MySqlAdminKeyStore {
    async fn find_by_prefix(&self, prefix: &str) -> crate::core::Result<Vec<AdminApiKey>> {
        sqlx::query_as::<_, AdminApiKey>(
            r#"
            SELECT id, key_prefix, key_hash, label, is_active, last_used_at, created_at
            FROM admin_api_keys
            WHERE key_prefix = ? AND is_active = TRUE
            "#,
        )
        .bind(prefix)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)
    }

    async fn create(&self, key: &AdminApiKey) -> crate::core::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO admin_api_keys (id, key_prefix, key_hash, label, is_active, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&key.id)
        .bind(&key.key_prefix)
        .bind(&key.key_hash)
        .bind(&key.label)
        .bind(key.is_active)
        .bind(key.created_at)
        .execute(&self.pool)
        .await
        .map_err(AppError::Database)?;
        Ok(())
    }

    async fn touch(&self, id: &str) -> crate::core::Result<()> {
        sqlx::query("UPDATE admin_api_keys SET last_used_at = NOW() WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(())
    }
}

/// `X-API-Key` authentication for the admin scope
pub struct AdminAuth {
    store: Arc<dyn AdminKeyStore>,
}

impl AdminAuth {
    pub fn new(store: Arc<dyn AdminKeyStore>) -> Self {
        Self { store }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AdminAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = AdminAuthMiddleware<S>;
    type Future = Ready<std::result::Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AdminAuthMiddleware {
            service: Rc::new(service),
            store: self.store.clone(),
        }))
    }
}

pub struct AdminAuthMiddleware<S> {
    service: Rc<S>,
    store: Arc<dyn AdminKeyStore>,
}

impl<S, B> Service<ServiceRequest> for AdminAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, std::result::Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let svc = self.service.clone();
        let store = self.store.clone();

        Box::pin(async move {
            let api_key = req
                .headers()
                .get("X-API-Key")
                .and_then(|h| h.to_str().ok())
                .map(str::to_string)
                .ok_or_else(|| Error::from(AppError::unauthorized("Missing X-API-Key header")))?;

            let principal = authenticate(store.as_ref(), &api_key)
                .await
                .map_err(Error::from)?;

            tracing::debug!(key_id = %principal.key_id, path = %req.path(), "Admin request authenticated");
            req.extensions_mut().insert(principal);

            svc.call(req).await
        })
    }
}

/// Resolve a presented key to its admin principal
pub async fn authenticate(
    store: &dyn AdminKeyStore,
    api_key: &str,
) -> crate::core::Result<AdminPrincipal> {
    let prefix = key_prefix(api_key).ok_or_else(|| AppError::unauthorized("Invalid API key"))?;

    for candidate in store.find_by_prefix(prefix).await? {
        if verify_api_key(api_key, &candidate.key_hash)? {
            if let Err(e) = store.touch(&candidate.id).await {
                tracing::warn!(key_id = %candidate.id, error = %e, "Failed to record key usage");
            }
            return Ok(AdminPrincipal {
                key_id: candidate.id,
                label: candidate.label,
            });
        }
    }

    Err(AppError::unauthorized("Invalid API key"))
}

pub fn key_prefix(api_key: &str) -> Option<&str> {
    api_key.get(..KEY_PREFIX_LEN)
}

/// New random admin key, shown to the operator once
pub fn generate_api_key() -> String {
    format!(
        "plr_{}{}",
        uuid::Uuid::new_v4().simple(),
        uuid::Uuid::new_v4().simple()
    )
}

/// Build a storable record for `api_key`; the key itself is not kept
pub fn new_admin_key(api_key: &str, label: &str) -> crate::core::Result<AdminApiKey> {
    let prefix = key_prefix(api_key)
        .ok_or_else(|| AppError::validation("API key is too short"))?
        .to_string();

    Ok(AdminApiKey {
        id: uuid::Uuid::new_v4().to_string(),
        key_prefix: prefix,
        key_hash: hash_api_key(api_key)?,
        label: label.to_string(),
        is_active: true,
        last_used_at: None,
        created_at: Some(Utc::now()),
    })
}

pub fn hash_api_key(api_key: &str) -> crate::core::Result<String> {
    let salt = SaltString::encode_b64(uuid::Uuid::new_v4().as_bytes())
        .map_err(|e| AppError::internal(format!("Failed to build salt: {}", e)))?;

    Argon2::default()
        .hash_password(api_key.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::internal(format!("Failed to hash API key: {}", e)))
}

pub fn verify_api_key(api_key: &str, hash: &str) -> crate::core::Result<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| AppError::internal(format!("Invalid hash format: {}", e)))?;

    Ok(Argon2::default()
        .verify_password(api_key.as_bytes(), &parsed_hash)
        .is_ok())
}
