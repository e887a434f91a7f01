use chrono::{DateTime, Utc};

/// Returns the current epoch seconds.
pub fn current_epoch() -> i64 {
    Utc::now().timestamp()
}

/// Convert epoch seconds to a UTC timestamp, falling back to 1970-01-01 when out of range.
pub fn from_epoch(epoch: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(epoch, 0).unwrap_or_default()
}

/// Log-friendly rendering of an event date.
pub fn format_epoch(epoch: i64) -> String {
    from_epoch(epoch).format("%Y-%m-%d %H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_epoch() {
        assert_eq!(format_epoch(0), "1970-01-01 00:00:00");
        assert_eq!(format_epoch(1_700_000_000), "2023-11-14 22:13:20");
        assert_eq!(format_epoch(i64::MAX), "1970-01-01 00:00:00");
    }
}
