pub mod coupon_repository;

pub use coupon_repository::{CouponRepository, MySqlCouponRepository};
