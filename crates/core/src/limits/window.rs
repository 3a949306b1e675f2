//! Limit windows and their reset instants. All instants are UTC.

use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// A spend-limit window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LimitWindow {
    /// Resets at 00:00 UTC every day.
    Daily,
    /// Resets at 00:00 UTC on the first of every month.
    Monthly,
}

impl LimitWindow {
    /// Returns the first reset instant strictly after `now`.
    #[must_use]
    pub fn next_reset(self, now: DateTime<Utc>) -> DateTime<Utc> {
        let today = now.date_naive();
        let next = match self {
            Self::Daily => today.checked_add_days(Days::new(1)),
            Self::Monthly => {
                if today.month() == 12 {
                    NaiveDate::from_ymd_opt(today.year() + 1, 1, 1)
                } else {
                    NaiveDate::from_ymd_opt(today.year(), today.month() + 1, 1)
                }
            }
        };
        next.map_or(DateTime::<Utc>::MAX_UTC, |date| {
            date.and_time(NaiveTime::MIN).and_utc()
        })
    }
}

/// Applies the lazy reset to one window.
///
/// Returns `(spent, reset_at)`: unchanged while `now < reset_at`, otherwise
/// zero spent and the next reset after `now`.
#[must_use]
pub fn roll(
    window: LimitWindow,
    spent: i64,
    reset_at: DateTime<Utc>,
    now: DateTime<Utc>,
) -> (i64, DateTime<Utc>) {
    if now >= reset_at {
        (0, window.next_reset(now))
    } else {
        (spent, reset_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[rstest]
    #[case(at(2026, 3, 14, 9, 30), at(2026, 3, 15, 0, 0))]
    #[case(at(2026, 3, 14, 0, 0), at(2026, 3, 15, 0, 0))]
    #[case(at(2026, 12, 31, 23, 59), at(2027, 1, 1, 0, 0))]
    #[case(at(2028, 2, 28, 12, 0), at(2028, 2, 29, 0, 0))]
    fn test_daily_reset(#[case] now: DateTime<Utc>, #[case] expected: DateTime<Utc>) {
        assert_eq!(LimitWindow::Daily.next_reset(now), expected);
    }

    #[rstest]
    #[case(at(2026, 1, 31, 23, 0), at(2026, 2, 1, 0, 0))]
    #[case(at(2026, 2, 1, 0, 0), at(2026, 3, 1, 0, 0))]
    #[case(at(2026, 12, 5, 8, 0), at(2027, 1, 1, 0, 0))]
    fn test_monthly_reset(#[case] now: DateTime<Utc>, #[case] expected: DateTime<Utc>) {
        assert_eq!(LimitWindow::Monthly.next_reset(now), expected);
    }

    #[test]
    fn test_roll_before_reset_keeps_spent() {
        let reset = at(2026, 3, 15, 0, 0);
        assert_eq!(
            roll(LimitWindow::Daily, 700, reset, at(2026, 3, 14, 23, 59)),
            (700, reset)
        );
    }

    #[test]
    fn test_roll_at_reset_zeroes_spent() {
        let reset = at(2026, 3, 15, 0, 0);
        assert_eq!(
            roll(LimitWindow::Daily, 700, reset, reset),
            (0, at(2026, 3, 16, 0, 0))
        );
    }

    #[test]
    fn test_roll_after_long_idle_schedules_from_now() {
        let reset = at(2026, 1, 1, 0, 0);
        assert_eq!(
            roll(LimitWindow::Monthly, 9_000, reset, at(2026, 6, 10, 4, 0)),
            (0, at(2026, 7, 1, 0, 0))
        );
    }
}
