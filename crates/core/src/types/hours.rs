//! Weekly operating hours.
//!
//! Days follow the remote `shop_hours.day_of_week` column: `0` is Sunday and
//! `6` is Saturday. Times are kept at minute precision and always render as
//! `HH:MM`, whatever precision the store returned.

use core::fmt;

use chrono::{Datelike, Weekday};
use serde::{Deserialize, Serialize};

/// Label shown when a shop has no hour window for the day.
pub const CLOSED_TODAY: &str = "Closed today";

/// Errors that can occur when decoding hour values.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum HoursError {
    /// Day-of-week outside `0..=6`.
    #[error("day of week must be between 0 and 6 (got {0})")]
    InvalidDay(i64),
    /// Time-of-day string is not `HH:MM[:SS…]`.
    #[error("invalid time of day: {0:?}")]
    InvalidTime(String),
}

/// Day of the week, Sunday-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct DayOfWeek(u8);

impl DayOfWeek {
    /// Sunday.
    pub const SUNDAY: Self = Self(0);
    /// Saturday.
    pub const SATURDAY: Self = Self(6);

    /// Create a day from its Sunday-based index.
    ///
    /// # Errors
    ///
    /// Returns [`HoursError::InvalidDay`] if `day` is not in `0..=6`.
    pub fn new(day: i64) -> Result<Self, HoursError> {
        u8::try_from(day)
            .ok()
            .filter(|d| *d <= 6)
            .map(Self)
            .ok_or(HoursError::InvalidDay(day))
    }

    /// The current day on the local clock.
    #[must_use]
    pub fn today() -> Self {
        Self::from(chrono::Local::now().weekday())
    }

    /// Sunday-based index.
    #[must_use]
    pub const fn index(self) -> u8 {
        self.0
    }
}

impl From<Weekday> for DayOfWeek {
    fn from(day: Weekday) -> Self {
        // num_days_from_sunday is always 0..=6
        #[allow(clippy::cast_possible_truncation)]
        Self(day.num_days_from_sunday() as u8)
    }
}

impl TryFrom<i64> for DayOfWeek {
    type Error = HoursError;

    fn try_from(day: i64) -> Result<Self, Self::Error> {
        Self::new(day)
    }
}

impl From<DayOfWeek> for u8 {
    fn from(day: DayOfWeek) -> Self {
        day.0
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A wall-clock time at minute precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay {
    hour: u8,
    minute: u8,
}

impl TimeOfDay {
    /// Create a time from hour and minute.
    ///
    /// `24:00` is accepted since `PostgreSQL` `time` columns allow it as an
    /// end-of-day marker.
    ///
    /// # Errors
    ///
    /// Returns [`HoursError::InvalidTime`] if the values are out of range.
    pub fn new(hour: u8, minute: u8) -> Result<Self, HoursError> {
        let valid = minute < 60 && (hour < 24 || (hour == 24 && minute == 0));
        if valid {
            Ok(Self { hour, minute })
        } else {
            Err(HoursError::InvalidTime(format!("{hour:02}:{minute:02}")))
        }
    }

    /// Parse `HH:MM`, `HH:MM:SS` or `HH:MM:SS.ffffff` (optionally followed by
    /// a UTC offset). Anything after the minutes is dropped.
    ///
    /// # Errors
    ///
    /// Returns [`HoursError::InvalidTime`] if the leading `HH:MM` is malformed.
    pub fn parse(s: &str) -> Result<Self, HoursError> {
        let invalid = || HoursError::InvalidTime(s.to_owned());

        let hour = s.get(0..2).ok_or_else(invalid)?;
        let separator = s.get(2..3).ok_or_else(invalid)?;
        let minute = s.get(3..5).ok_or_else(invalid)?;
        let rest = s.get(5..).unwrap_or_default();

        if separator != ":" || (!rest.is_empty() && !rest.starts_with([':', '.', '+', '-'])) {
            return Err(invalid());
        }
        if !hour.bytes().chain(minute.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        let hour = hour.parse::<u8>().map_err(|_| invalid())?;
        let minute = minute.parse::<u8>().map_err(|_| invalid())?;
        Self::new(hour, minute).map_err(|_| invalid())
    }

    /// Hour component.
    #[must_use]
    pub const fn hour(self) -> u8 {
        self.hour
    }

    /// Minute component.
    #[must_use]
    pub const fn minute(self) -> u8 {
        self.minute
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl std::str::FromStr for TimeOfDay {
    type Err = HoursError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = HoursError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<TimeOfDay> for String {
    fn from(time: TimeOfDay) -> Self {
        time.to_string()
    }
}

/// One opening window on a given day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpeningHours {
    /// Day the window applies to.
    pub day_of_week: DayOfWeek,
    /// Opening time.
    pub open_time: TimeOfDay,
    /// Closing time.
    pub close_time: TimeOfDay,
}

impl fmt::Display for OpeningHours {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.open_time, self.close_time)
    }
}

/// Format the windows that fall on `day`, joined with `", "`.
///
/// Returns `None` when the shop has no window on that day.
#[must_use]
pub fn hours_on(hours: &[OpeningHours], day: DayOfWeek) -> Option<String> {
    let windows: Vec<String> = hours
        .iter()
        .filter(|h| h.day_of_week == day)
        .map(ToString::to_string)
        .collect();

    if windows.is_empty() {
        None
    } else {
        Some(windows.join(", "))
    }
}

/// Card label for a day's hours: `"Open today: …"` or [`CLOSED_TODAY`].
#[must_use]
pub fn hours_label(hours: &[OpeningHours], day: DayOfWeek) -> String {
    hours_on(hours, day).map_or_else(
        || CLOSED_TODAY.to_owned(),
        |windows| format!("Open today: {windows}"),
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn window(day: i64, open: &str, close: &str) -> OpeningHours {
        OpeningHours {
            day_of_week: DayOfWeek::new(day).unwrap(),
            open_time: TimeOfDay::parse(open).unwrap(),
            close_time: TimeOfDay::parse(close).unwrap(),
        }
    }

    #[test]
    fn test_parse_truncates_seconds() {
        assert_eq!(TimeOfDay::parse("08:30:00").unwrap().to_string(), "08:30");
        assert_eq!(TimeOfDay::parse("17:05").unwrap().to_string(), "17:05");
        assert_eq!(
            TimeOfDay::parse("23:59:59.123456").unwrap().to_string(),
            "23:59"
        );
        assert_eq!(
            TimeOfDay::parse("09:00:00+02").unwrap().to_string(),
            "09:00",
        );
        assert_eq!(TimeOfDay::parse("24:00:00").unwrap().to_string(), "24:00");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(TimeOfDay::parse("").is_err());
        assert!(TimeOfDay::parse("8:30").is_err());
        assert!(TimeOfDay::parse("08-30").is_err());
        assert!(TimeOfDay::parse("25:00").is_err());
        assert!(TimeOfDay::parse("10:60").is_err());
        assert!(TimeOfDay::parse("24:30").is_err());
        assert!(TimeOfDay::parse("10:30pm").is_err());
    }

    #[test]
    fn test_day_of_week_bounds() {
        assert_eq!(DayOfWeek::new(0).unwrap(), DayOfWeek::SUNDAY);
        assert_eq!(DayOfWeek::new(6).unwrap(), DayOfWeek::SATURDAY);
        assert!(matches!(DayOfWeek::new(7), Err(HoursError::InvalidDay(7))));
        assert!(matches!(DayOfWeek::new(-1), Err(HoursError::InvalidDay(-1))));
    }

    #[test]
    fn test_day_from_weekday_is_sunday_based() {
        assert_eq!(DayOfWeek::from(Weekday::Sun).index(), 0);
        assert_eq!(DayOfWeek::from(Weekday::Mon).index(), 1);
        assert_eq!(DayOfWeek::from(Weekday::Sat).index(), 6);
    }

    #[test]
    fn test_hours_on_single_window() {
        let hours = vec![window(1, "08:00:00", "17:00:00"), window(2, "09:00", "18:00")];
        let monday = DayOfWeek::new(1).unwrap();
        assert_eq!(hours_on(&hours, monday).as_deref(), Some("08:00 - 17:00"));
    }

    #[test]
    fn test_hours_on_joins_split_day() {
        let hours = vec![
            window(3, "08:00", "12:00"),
            window(4, "10:00", "16:00"),
            window(3, "13:30", "18:00"),
        ];
        let wednesday = DayOfWeek::new(3).unwrap();
        assert_eq!(
            hours_on(&hours, wednesday).as_deref(),
            Some("08:00 - 12:00, 13:30 - 18:00")
        );
    }

    #[test]
    fn test_hours_label_closed() {
        let hours = vec![window(1, "08:00", "17:00")];
        assert_eq!(hours_label(&hours, DayOfWeek::SUNDAY), CLOSED_TODAY);
        assert_eq!(hours_label(&[], DayOfWeek::SATURDAY), "Closed today");
    }

    #[test]
    fn test_hours_label_open() {
        let hours = vec![window(0, "10:00", "14:00")];
        assert_eq!(
            hours_label(&hours, DayOfWeek::SUNDAY),
            "Open today: 10:00 - 14:00"
        );
    }

    #[test]
    fn test_day_serde_rejects_out_of_range() {
        assert!(serde_json::from_str::<DayOfWeek>("9").is_err());
        assert_eq!(serde_json::from_str::<DayOfWeek>("5").unwrap().index(), 5);
    }
}
