pub mod bookings;
pub mod catalog;
pub mod coupons;
pub mod gateways;
pub mod health;
pub mod policies;
pub mod refunds;

use actix_web::web;

/// Customer-facing routes
pub fn configure_public(cfg: &mut web::ServiceConfig) {
    catalog::controllers::configure_public(cfg);
    bookings::controllers::configure_public(cfg);
    refunds::controllers::configure_public(cfg);
}

/// Routes mounted under `/admin`
pub fn configure_admin(cfg: &mut web::ServiceConfig) {
    catalog::controllers::configure_admin(cfg);
    coupons::controllers::configure_admin(cfg);
    policies::controllers::configure_admin(cfg);
    refunds::controllers::configure_admin(cfg);
    bookings::controllers::configure_admin(cfg);
}
