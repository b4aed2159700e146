use std::sync::Arc;

use actix_web::web;
use sqlx::MySqlPool;

use crate::core::Currency;
use crate::middleware::{AdminAuth, AdminKeyStore, MySqlAdminKeyStore, RateLimiter};
use crate::modules::bookings::{BookingRepository, BookingService, MySqlBookingRepository};
use crate::modules::catalog::{CatalogRepository, CatalogService, MySqlCatalogRepository};
use crate::modules::coupons::{CouponRepository, CouponService, MySqlCouponRepository};
use crate::modules::gateways::GatewayService;
use crate::modules::policies::{MySqlPolicyRepository, PolicyRepository, PolicyService};
use crate::modules::refunds::RefundService;
use crate::modules::{configure_admin, configure_public, health};

/// Gateway used for booking refunds
pub const REFUND_GATEWAY: &str = "razorpay";

/// Storage backends behind the services
pub struct Repositories {
    pub catalog: Arc<dyn CatalogRepository>,
    pub coupons: Arc<dyn CouponRepository>,
    pub policies: Arc<dyn PolicyRepository>,
    pub bookings: Arc<dyn BookingRepository>,
    pub admin_keys: Arc<dyn AdminKeyStore>,
}

impl Repositories {
    pub fn mysql(pool: &MySqlPool) -> Self {
        Self {
            catalog: Arc::new(MySqlCatalogRepository::new(pool.clone())),
            coupons: Arc::new(MySqlCouponRepository::new(pool.clone())),
            policies: Arc::new(MySqlPolicyRepository::new(pool.clone())),
            bookings: Arc::new(MySqlBookingRepository::new(pool.clone())),
            admin_keys: Arc::new(MySqlAdminKeyStore::new(pool.clone())),
        }
    }
}

/// Wired service graph shared by the HTTP server and CLI commands
#[derive(Clone)]
pub struct AppServices {
    pub catalog: Arc<CatalogService>,
    pub coupons: Arc<CouponService>,
    pub policies: Arc<PolicyService>,
    pub bookings: Arc<BookingService>,
    pub refunds: Arc<RefundService>,
    pub gateways: Arc<GatewayService>,
    pub admin_keys: Arc<dyn AdminKeyStore>,
}

impl AppServices {
    pub fn new(
        repos: Repositories,
        gateways: GatewayService,
        default_currency: Currency,
    ) -> Self {
        let gateways = Arc::new(gateways);
        let catalog = Arc::new(CatalogService::new(repos.catalog, default_currency));
        let coupons = Arc::new(CouponService::new(repos.coupons));
        let policies = Arc::new(PolicyService::new(repos.policies));
        let bookings = Arc::new(BookingService::new(
            repos.bookings.clone(),
            catalog.clone(),
            coupons.clone(),
            policies.clone(),
        ));
        let refunds = Arc::new(RefundService::new(
            repos.bookings,
            policies.clone(),
            gateways.clone(),
            REFUND_GATEWAY,
        ));

        Self {
            catalog,
            coupons,
            policies,
            bookings,
            refunds,
            gateways,
            admin_keys: repos.admin_keys,
        }
    }

    /// Register shared state and every route. `/admin` is registered first
    /// so the catch-all public scope never shadows it.
    pub fn configure(&self, cfg: &mut web::ServiceConfig, limiter: RateLimiter) {
        cfg.app_data(web::Data::new(self.catalog.clone()))
            .app_data(web::Data::new(self.coupons.clone()))
            .app_data(web::Data::new(self.policies.clone()))
            .app_data(web::Data::new(self.bookings.clone()))
            .app_data(web::Data::new(self.refunds.clone()))
            .app_data(web::Data::new(self.gateways.clone()))
            .service(
                web::scope("/admin")
                    .wrap(AdminAuth::new(self.admin_keys.clone()))
                    .configure(configure_admin),
            )
            .configure(health::configure)
            .service(web::scope("").wrap(limiter).configure(configure_public));
    }
}
