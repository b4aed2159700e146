pub mod controllers;
pub mod models;
pub mod repositories;
pub mod services;

pub use models::{Coupon, CouponRequest, DiscountType};
pub use repositories::{CouponRepository, MySqlCouponRepository};
pub use services::{AppliedCoupon, CouponService};
