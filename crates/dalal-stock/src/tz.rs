//! Market timezone

use chrono::FixedOffset;

/// Indian Standard Time (UTC+5:30): trading hours and naive news
/// timestamps are both read against this offset
pub(crate) fn ist() -> FixedOffset {
    FixedOffset::east_opt(5 * 3600 + 1800).expect("IST offset is in range")
}
