pub mod coupon;

pub use coupon::{normalize_code, Coupon, CouponRequest, DiscountType};
