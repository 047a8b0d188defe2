//! Market-Hours Gate
//!
//! Decides whether the market is open at an instant. Saturday and Sunday
//! are always closed; on weekdays the market is open strictly between the
//! configured start and end times in the exchange's zone. No holiday
//! calendar is consulted.

use chrono::{DateTime, Datelike, NaiveTime, Utc, Weekday};
use chrono_tz::Tz;

/// Check whether `now` falls inside the trading window.
///
/// Both boundaries are exclusive: at exactly `start` or `end` the market is
/// reported closed.
#[must_use]
pub fn is_open(now: DateTime<Utc>, zone: Tz, start: NaiveTime, end: NaiveTime) -> bool {
    let local = now.with_timezone(&zone);

    if matches!(local.weekday(), Weekday::Sat | Weekday::Sun) {
        return false;
    }

    let time = local.time();
    start < time && time < end
}

/// Trading window of one exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarketHours {
    /// Exchange time zone.
    pub zone: Tz,
    /// Session open (exclusive).
    pub open: NaiveTime,
    /// Session close (exclusive).
    pub close: NaiveTime,
}

impl MarketHours {
    /// Create a trading window.
    #[must_use]
    pub const fn new(zone: Tz, open: NaiveTime, close: NaiveTime) -> Self {
        Self { zone, open, close }
    }

    /// Check whether `now` falls inside this window.
    #[must_use]
    pub fn is_open(&self, now: DateTime<Utc>) -> bool {
        is_open(now, self.zone, self.open, self.close)
    }
}

impl Default for MarketHours {
    /// NSE cash session: 09:15 to 15:30 IST.
    fn default() -> Self {
        Self::new(
            chrono_tz::Asia::Kolkata,
            NaiveTime::from_hms_opt(9, 15, 0).unwrap_or(NaiveTime::MIN),
            NaiveTime::from_hms_opt(15, 30, 0).unwrap_or(NaiveTime::MIN),
        )
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use chrono_tz::Asia::Kolkata;
    use test_case::test_case;

    use super::*;

    fn ist(y: i32, m: u32, d: u32, hh: u32, mm: u32, ss: u32) -> DateTime<Utc> {
        Kolkata
            .with_ymd_and_hms(y, m, d, hh, mm, ss)
            .unwrap()
            .with_timezone(&Utc)
    }

    // 2025-11-10 is a Monday, 2025-11-15 a Saturday.
    #[test_case(ist(2025, 11, 10, 9, 14, 0), false ; "monday before open")]
    #[test_case(ist(2025, 11, 10, 9, 16, 0), true ; "monday after open")]
    #[test_case(ist(2025, 11, 10, 9, 15, 0), false ; "exactly at open")]
    #[test_case(ist(2025, 11, 10, 15, 30, 0), false ; "exactly at close")]
    #[test_case(ist(2025, 11, 10, 15, 29, 59), true ; "just before close")]
    #[test_case(ist(2025, 11, 14, 12, 0, 0), true ; "friday midday")]
    #[test_case(ist(2025, 11, 15, 10, 0, 0), false ; "saturday")]
    #[test_case(ist(2025, 11, 16, 10, 0, 0), false ; "sunday")]
    fn default_session(now: DateTime<Utc>, expected: bool) {
        assert_eq!(MarketHours::default().is_open(now), expected);
    }

    #[test]
    fn converts_utc_into_zone() {
        // 03:50 UTC on a Monday is 09:20 IST.
        let now = Utc.with_ymd_and_hms(2025, 11, 10, 3, 50, 0).unwrap();
        let start = NaiveTime::from_hms_opt(9, 15, 0).unwrap();
        let end = NaiveTime::from_hms_opt(15, 30, 0).unwrap();

        assert!(is_open(now, Kolkata, start, end));
        assert!(!is_open(now, chrono_tz::UTC, start, end));
    }

    #[test]
    fn weekday_is_judged_in_zone() {
        // Friday 23:00 UTC is already Saturday in IST.
        let now = Utc.with_ymd_and_hms(2025, 11, 14, 23, 0, 0).unwrap();
        let start = NaiveTime::MIN;
        let end = NaiveTime::from_hms_opt(23, 59, 59).unwrap();

        assert!(!is_open(now, Kolkata, start, end));
        assert!(is_open(now, chrono_tz::UTC, start, end));
    }
}
