use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;

pub const IST_ZONE: &str = "Asia/Kolkata";

/// 12-hour clock with zone abbreviation, e.g. `3:04:05 PM IST`.
const TIME_FORMAT: &str = "%-I:%M:%S %p %Z";

pub fn resolve_ist() -> Result<Tz> {
    IST_ZONE
        .parse::<Tz>()
        .map_err(|e| anyhow!("Failed to load timezone {}: {}", IST_ZONE, e))
}

pub fn format_in_zone(instant: DateTime<Utc>, zone: Tz) -> String {
    instant.with_timezone(&zone).format(TIME_FORMAT).to_string()
}

pub fn format_ist_time(instant: DateTime<Utc>) -> Result<String> {
    Ok(format_in_zone(instant, resolve_ist()?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_resolve_ist() {
        assert_eq!(resolve_ist().unwrap(), chrono_tz::Asia::Kolkata);
    }

    #[test]
    fn test_afternoon() {
        let instant = Utc.with_ymd_and_hms(2024, 1, 1, 9, 34, 5).unwrap();
        assert_eq!(format_ist_time(instant).unwrap(), "3:04:05 PM IST");
    }

    #[test]
    fn test_midnight_is_twelve_am() {
        let instant = Utc.with_ymd_and_hms(2024, 6, 30, 18, 30, 0).unwrap();
        assert_eq!(format_ist_time(instant).unwrap(), "12:00:00 AM IST");
    }

    #[test]
    fn test_crosses_date_line_into_morning() {
        let instant = Utc.with_ymd_and_hms(2024, 3, 10, 23, 59, 59).unwrap();
        assert_eq!(format_ist_time(instant).unwrap(), "5:29:59 AM IST");
    }

    #[test]
    fn test_noon() {
        let instant = Utc.with_ymd_and_hms(2024, 3, 10, 6, 30, 0).unwrap();
        assert_eq!(format_in_zone(instant, chrono_tz::Asia::Kolkata), "12:00:00 PM IST");
    }
}
