pub mod auth;
pub mod rate_limit;
pub mod request_id;

pub use auth::{
    authenticate, generate_api_key, hash_api_key, new_admin_key, verify_api_key, AdminApiKey,
    AdminAuth, AdminKeyStore, AdminPrincipal, MySqlAdminKeyStore,
};
pub use rate_limit::RateLimiter;
pub use request_id::RequestId;
