use chrono::{DateTime, FixedOffset, Utc};

use super::{AppError, Result};

/// Salon-local time handling.
/// All timestamps are stored as UTC; the salon's fixed offset is only applied
/// for display and gateway notes.
#[derive(Debug, Clone, Copy)]
pub struct SalonClock {
    offset: FixedOffset,
}

impl SalonClock {
    /// Build a clock from an offset in minutes east of UTC (IST is 330)
    pub fn from_offset_minutes(minutes: i32) -> Result<Self> {
        let offset = FixedOffset::east_opt(minutes * 60).ok_or_else(|| {
            AppError::Configuration(format!("Invalid UTC offset: {} minutes", minutes))
        })?;
        Ok(Self { offset })
    }

    /// Convert a UTC timestamp to salon-local time
    pub fn to_local(&self, utc_time: DateTime<Utc>) -> DateTime<FixedOffset> {
        utc_time.with_timezone(&self.offset)
    }

    /// Format timestamp as ISO 8601 in salon-local time
    pub fn format_local(&self, utc_time: DateTime<Utc>) -> String {
        self.to_local(utc_time).to_rfc3339()
    }
}

/// Fractional hours from `now` until `start`; negative once the start has passed.
pub fn hours_until(start: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    (start - now).num_seconds() as f64 / 3600.0
}
