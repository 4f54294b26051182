//! Human-readable verification ages.
//!
//! Units use fixed lengths: a month is 30 days and a year is 365 days.

use chrono::{DateTime, Utc};

const MINUTE: i64 = 60;
const HOUR: i64 = 60 * MINUTE;
const DAY: i64 = 24 * HOUR;
const MONTH: i64 = 30 * DAY;
const YEAR: i64 = 365 * DAY;

/// Pick the largest whole unit for `elapsed_secs` and render it.
///
/// Negative input (a stamp in the future, usually clock skew) renders as
/// `"0 seconds ago"`.
#[must_use]
pub fn format_elapsed(elapsed_secs: i64) -> String {
    let elapsed = elapsed_secs.max(0);

    let (count, unit) = if elapsed < MINUTE {
        (elapsed, "second")
    } else if elapsed < HOUR {
        (elapsed / MINUTE, "minute")
    } else if elapsed < DAY {
        (elapsed / HOUR, "hour")
    } else if elapsed < MONTH {
        (elapsed / DAY, "day")
    } else if elapsed < YEAR {
        (elapsed / MONTH, "month")
    } else {
        (elapsed / YEAR, "year")
    };

    let plural = if count == 1 { "" } else { "s" };
    format!("{count} {unit}{plural} ago")
}

/// Age of `then` relative to `now`, in whole elapsed seconds.
#[must_use]
pub fn relative_age(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    format_elapsed((now - then).num_seconds())
}

/// `"Last verified: …"` line for an inventory row.
#[must_use]
pub fn last_verified_label(last_verified_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    last_verified_at.map_or_else(
        || "Last verified: never".to_owned(),
        |then| format!("Last verified: {}", relative_age(then, now)),
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    #[test]
    fn test_unit_boundaries() {
        let cases = [
            (0, "0 seconds ago"),
            (1, "1 second ago"),
            (59, "59 seconds ago"),
            (60, "1 minute ago"),
            (119, "1 minute ago"),
            (120, "2 minutes ago"),
            (3_599, "59 minutes ago"),
            (3_600, "1 hour ago"),
            (86_399, "23 hours ago"),
            (86_400, "1 day ago"),
            (2_591_999, "29 days ago"),
            (2_592_000, "1 month ago"),
            (31_535_999, "12 months ago"),
            (31_536_000, "1 year ago"),
            (63_072_000, "2 years ago"),
        ];

        for (elapsed, expected) in cases {
            assert_eq!(format_elapsed(elapsed), expected, "elapsed = {elapsed}");
        }
    }

    #[test]
    fn test_future_stamp_clamps_to_zero() {
        assert_eq!(format_elapsed(-30), "0 seconds ago");
    }

    #[test]
    fn test_relative_age_floors_partial_seconds() {
        let now = Utc.with_ymd_and_hms(2025, 5, 1, 12, 0, 0).unwrap();
        let then = now - Duration::milliseconds(90_900);
        assert_eq!(relative_age(then, now), "1 minute ago");
    }

    #[test]
    fn test_last_verified_label() {
        let now = Utc.with_ymd_and_hms(2025, 5, 1, 12, 0, 0).unwrap();
        assert_eq!(
            last_verified_label(Some(now - Duration::hours(3)), now),
            "Last verified: 3 hours ago"
        );
        assert_eq!(last_verified_label(None, now), "Last verified: never");
    }
}
