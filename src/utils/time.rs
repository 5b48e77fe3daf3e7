use chrono::{NaiveDate, NaiveTime, SecondsFormat, TimeZone, Utc};

use crate::errors::{Error, Result};

/// Fixed-width UTC timestamp; lexicographic order matches chronological
/// order, which the appointment listing's ORDER BY relies on.
pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Combines a `YYYY-MM-DD` date and a `HH:MM[:SS]` time into one UTC instant.
pub fn combine_instant(date: &str, time: &str) -> Result<String> {
    let date = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .map_err(|_| Error::InvalidDatetime)?;
    let time = NaiveTime::parse_from_str(time.trim(), "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(time.trim(), "%H:%M"))
        .map_err(|_| Error::InvalidDatetime)?;

    let instant = Utc.from_utc_datetime(&date.and_time(time));
    Ok(instant.to_rfc3339_opts(SecondsFormat::Millis, true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combine_instant() {
        assert_eq!(
            combine_instant("2026-03-01", "14:30").unwrap(),
            "2026-03-01T14:30:00.000Z"
        );
        assert_eq!(
            combine_instant("2026-03-01", "14:30:15").unwrap(),
            "2026-03-01T14:30:15.000Z"
        );
    }

    #[test]
    fn test_combine_instant_rejects_garbage() {
        assert!(combine_instant("tomorrow", "14:30").is_err());
        assert!(combine_instant("2026-03-01", "half past two").is_err());
        assert!(combine_instant("2026-02-30", "14:30").is_err());
    }
}
