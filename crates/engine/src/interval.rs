//! Clock times and half-open minute intervals.
//!
//! Bookings are compared as `[start, start + duration)` intervals of minutes
//! since midnight. Touching endpoints do not overlap: a booking ending at
//! 10:00 and one starting at 10:00 share no time.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::EngineError;

/// Fallback duration for records stored before durations were tracked.
pub const DEFAULT_DURATION_MINUTES: u32 = 60;

/// A wall-clock time of day, minutes since midnight.
///
/// Parsed from `"HH:MM"` (24-hour) and serialized back to the same form, so
/// snapshots stay readable and stable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClockTime(u16);

impl ClockTime {
    pub fn new(hour: u8, minute: u8) -> Option<Self> {
        if hour > 23 || minute > 59 {
            return None;
        }
        Some(Self(u16::from(hour) * 60 + u16::from(minute)))
    }

    /// Compile-time constructor for known-valid times.
    #[must_use]
    pub const fn at(hour: u16, minute: u16) -> Self {
        assert!(hour < 24 && minute < 60);
        Self(hour * 60 + minute)
    }

    /// Minutes since midnight.
    #[must_use]
    pub const fn minutes(self) -> u16 {
        self.0
    }

    /// Start of the interval obtained by booking `duration_minutes` here.
    #[must_use]
    pub fn interval(self, duration_minutes: u32) -> TimeInterval {
        TimeInterval::new(self, duration_minutes)
    }

    /// The time `minutes` later, saturating at the end of the day grid.
    #[must_use]
    pub fn advanced_by(self, minutes: u32) -> Option<Self> {
        let total = u32::from(self.0) + minutes;
        u16::try_from(total).ok().filter(|m| *m < 24 * 60).map(Self)
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.0 / 60, self.0 % 60)
    }
}

impl FromStr for ClockTime {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || EngineError::InvalidTimeFormat(s.to_string());

        let (hour, minute) = s.split_once(':').ok_or_else(invalid)?;
        if hour.is_empty()
            || minute.is_empty()
            || !hour.chars().all(|c| c.is_ascii_digit())
            || !minute.chars().all(|c| c.is_ascii_digit())
        {
            return Err(invalid());
        }

        let hour: u8 = hour.parse().map_err(|_| invalid())?;
        let minute: u8 = minute.parse().map_err(|_| invalid())?;
        ClockTime::new(hour, minute).ok_or_else(invalid)
    }
}

impl Serialize for ClockTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ClockTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Half-open `[start, end)` interval in minutes since midnight.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeInterval {
    start: u32,
    end: u32,
}

impl TimeInterval {
    #[must_use]
    pub fn new(start: ClockTime, duration_minutes: u32) -> Self {
        let start = u32::from(start.minutes());
        Self {
            start,
            end: start + duration_minutes,
        }
    }

    #[must_use]
    pub const fn start(self) -> u32 {
        self.start
    }

    #[must_use]
    pub const fn end(self) -> u32 {
        self.end
    }

    /// Half-open overlap test. Touching endpoints are not an overlap.
    #[must_use]
    pub const fn overlaps(self, other: TimeInterval) -> bool {
        self.start < other.end && self.end > other.start
    }

    #[must_use]
    pub const fn contains_minute(self, minute: u32) -> bool {
        self.start <= minute && minute < self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(raw: &str) -> ClockTime {
        raw.parse().unwrap()
    }

    #[test]
    fn parse_and_display() {
        assert_eq!(t("09:00").minutes(), 540);
        assert_eq!(t("20:30").minutes(), 1230);
        assert_eq!(t("00:00").minutes(), 0);
        assert_eq!(t("23:59").to_string(), "23:59");
        assert_eq!(t("9:5").to_string(), "09:05");
    }

    #[test]
    fn parse_rejects_garbage() {
        for raw in ["", "10", "10:", ":30", "24:00", "10:60", "ab:cd", "10:00:00", "-1:30"] {
            assert!(
                raw.parse::<ClockTime>().is_err(),
                "expected {raw:?} to be rejected"
            );
        }
    }

    #[test]
    fn serde_uses_clock_string() {
        let time = t("10:15");
        assert_eq!(serde_json::to_string(&time).unwrap(), "\"10:15\"");
        let back: ClockTime = serde_json::from_str("\"10:15\"").unwrap();
        assert_eq!(back, time);
        assert!(serde_json::from_str::<ClockTime>("\"25:00\"").is_err());
    }

    #[test]
    fn overlap_is_half_open() {
        let ten_to_eleven = t("10:00").interval(60);
        assert!(ten_to_eleven.overlaps(t("10:30").interval(60)));
        assert!(ten_to_eleven.overlaps(t("10:15").interval(30)));
        assert!(ten_to_eleven.overlaps(t("09:30").interval(31)));

        // Touching endpoints are free.
        assert!(!ten_to_eleven.overlaps(t("11:00").interval(60)));
        assert!(!ten_to_eleven.overlaps(t("09:00").interval(60)));
    }

    #[test]
    fn contains_minute_excludes_end() {
        let interval = t("10:00").interval(60);
        assert!(interval.contains_minute(600));
        assert!(interval.contains_minute(659));
        assert!(!interval.contains_minute(660));
        assert!(!interval.contains_minute(599));
    }

    #[test]
    fn advanced_by_stops_at_midnight() {
        assert_eq!(t("09:00").advanced_by(30), Some(t("09:30")));
        assert_eq!(t("23:30").advanced_by(30), None);
    }
}
