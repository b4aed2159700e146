pub mod booking_policy_setting;

pub use booking_policy_setting::{BookingPolicySetting, CancellationPolicy, FeeType, PolicyRequest};
