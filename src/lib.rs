//! Parlour: salon and home-care booking backend.
//!
//! Bookings are priced from the service catalog, carry a snapshot of the
//! active cancellation policy, and are refunded through Razorpay when
//! cancelled.

pub mod app;
pub mod cli;
pub mod config;
pub mod core;
pub mod middleware;
pub mod modules;

pub use app::{AppServices, Repositories, REFUND_GATEWAY};
pub use modules::bookings;
pub use modules::catalog;
pub use modules::coupons;
pub use modules::gateways;
pub use modules::policies;
pub use modules::refunds;
