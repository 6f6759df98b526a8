//! Conversion between local calendar dates and absolute instants.
//!
//! Movements are stamped with UTC instants. The operator thinks in local
//! calendar days, so both the record filter bounds and the displayed
//! timestamps go through [`LocalZone`].

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, Offset, Utc};
use thiserror::Error;

/// Display format for local timestamps.
pub const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Input format for calendar dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Error returned when a UTC offset string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid UTC offset '{0}': expected the form +HH:MM or -HH:MM")]
pub struct ZoneParseError(pub String);

/// The operator's fixed local time zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalZone {
    offset: FixedOffset,
}

impl LocalZone {
    /// Creates a zone from a fixed UTC offset.
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    /// Asia/Shanghai, UTC+08:00 all year round.
    pub fn shanghai() -> Self {
        Self {
            offset: FixedOffset::east_opt(8 * 3600).unwrap_or_else(utc_offset),
        }
    }

    /// Parses an offset of the form `+HH:MM`, `-HH:MM`, `+HHMM` or `Z`.
    pub fn parse(s: &str) -> Result<Self, ZoneParseError> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("z") || trimmed.eq_ignore_ascii_case("utc") {
            return Ok(Self::new(utc_offset()));
        }

        let err = || ZoneParseError(s.to_string());
        let (sign, rest) = match trimmed.as_bytes().first() {
            Some(b'+') => (1, &trimmed[1..]),
            Some(b'-') => (-1, &trimmed[1..]),
            _ => return Err(err()),
        };
        let digits: String = rest.chars().filter(|c| *c != ':').collect();
        if digits.len() != 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(err());
        }
        let hours: i32 = digits[..2].parse().map_err(|_| err())?;
        let minutes: i32 = digits[2..].parse().map_err(|_| err())?;
        if hours > 23 || minutes > 59 {
            return Err(err());
        }

        FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
            .map(Self::new)
            .ok_or_else(err)
    }

    /// Returns the underlying offset.
    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// First instant of `date` in this zone (local 00:00:00).
    pub fn start_of_day(&self, date: NaiveDate) -> DateTime<Utc> {
        let local_midnight = date.and_time(NaiveTime::MIN);
        (local_midnight - Duration::seconds(i64::from(self.offset.local_minus_utc()))).and_utc()
    }

    /// Last instant of `date` in this zone (local 23:59:59.999999).
    pub fn end_of_day(&self, date: NaiveDate) -> DateTime<Utc> {
        self.start_of_day(date) + Duration::days(1) - Duration::microseconds(1)
    }

    /// Converts an absolute instant into local wall-clock time.
    pub fn to_local(&self, instant: DateTime<Utc>) -> DateTime<FixedOffset> {
        instant.with_timezone(&self.offset)
    }

    /// Formats an instant as local `YYYY-MM-DD HH:MM:SS`.
    pub fn format(&self, instant: DateTime<Utc>) -> String {
        self.to_local(instant).format(DISPLAY_FORMAT).to_string()
    }

    /// Parses a `YYYY-MM-DD` calendar date.
    pub fn parse_date(s: &str) -> Result<NaiveDate, chrono::ParseError> {
        NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
    }
}

impl Default for LocalZone {
    fn default() -> Self {
        Self::shanghai()
    }
}

impl std::fmt::Display for LocalZone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.offset)
    }
}

impl std::str::FromStr for LocalZone {
    type Err = ZoneParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn utc_offset() -> FixedOffset {
    Utc.fix()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn shanghai_is_eight_hours_east() {
        assert_eq!(LocalZone::shanghai().offset().local_minus_utc(), 8 * 3600);
        assert_eq!(LocalZone::default(), LocalZone::shanghai());
    }

    #[test]
    fn start_of_day_is_local_midnight() {
        let zone = LocalZone::shanghai();
        let start = zone.start_of_day(date(2024, 3, 15));
        assert_eq!(start, Utc.with_ymd_and_hms(2024, 3, 14, 16, 0, 0).unwrap());
    }

    #[test]
    fn end_of_day_is_last_local_microsecond() {
        let zone = LocalZone::shanghai();
        let end = zone.end_of_day(date(2024, 3, 15));
        let expected = Utc.with_ymd_and_hms(2024, 3, 15, 15, 59, 59).unwrap()
            + Duration::microseconds(999_999);
        assert_eq!(end, expected);
    }

    #[test]
    fn late_evening_falls_inside_the_same_local_day() {
        let zone = LocalZone::shanghai();
        // 23:50 local on 2024-03-15 is 15:50 UTC.
        let instant = Utc.with_ymd_and_hms(2024, 3, 15, 15, 50, 0).unwrap();
        let day = date(2024, 3, 15);
        assert!(instant >= zone.start_of_day(day));
        assert!(instant <= zone.end_of_day(day));
        assert_eq!(zone.format(instant), "2024-03-15 23:50:00");
    }

    #[test]
    fn format_uses_local_wall_clock() {
        let zone = LocalZone::shanghai();
        let instant = Utc.with_ymd_and_hms(2024, 12, 31, 20, 5, 9).unwrap();
        assert_eq!(zone.format(instant), "2025-01-01 04:05:09");
    }

    #[test]
    fn parse_accepts_common_offset_forms() {
        assert_eq!(LocalZone::parse("+08:00").unwrap(), LocalZone::shanghai());
        assert_eq!(LocalZone::parse("+0800").unwrap(), LocalZone::shanghai());
        assert_eq!(
            LocalZone::parse("-05:30").unwrap().offset().local_minus_utc(),
            -(5 * 3600 + 30 * 60)
        );
        assert_eq!(LocalZone::parse("Z").unwrap().offset().local_minus_utc(), 0);
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(LocalZone::parse("Asia/Shanghai").is_err());
        assert!(LocalZone::parse("+8").is_err());
        assert!(LocalZone::parse("+25:00").is_err());
        assert!("".parse::<LocalZone>().is_err());
    }

    #[test]
    fn parse_date_reads_iso_calendar_dates() {
        assert_eq!(LocalZone::parse_date("2024-03-15").unwrap(), date(2024, 3, 15));
        assert!(LocalZone::parse_date("15/03/2024").is_err());
    }
}
