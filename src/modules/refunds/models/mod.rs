pub mod recalculation;

pub use recalculation::{RecalculationSummary, RefundAdjustment};
