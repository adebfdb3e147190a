//! Absolute time windows and the shared timestamp codec.

use chrono::{NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};

/// Timestamp codec used on the wire: `YYYY-MM-DD HH:MM:SS`.
///
/// `YYYY-MM-DD HH:MM` is also accepted on input.
pub mod timestamp {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    /// Canonical output format.
    pub const FORMAT: &str = "%Y-%m-%d %H:%M:%S";
    const SHORT_FORMAT: &str = "%Y-%m-%d %H:%M";

    /// Parses a timestamp in either accepted format.
    pub fn parse(s: &str) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(s, FORMAT)
            .or_else(|_| NaiveDateTime::parse_from_str(s, SHORT_FORMAT))
            .ok()
    }

    pub fn serialize<S: Serializer>(t: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(&t.format(FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(d)?;
        parse(&raw).ok_or_else(|| {
            serde::de::Error::custom(format!(
                "invalid timestamp `{raw}`, expected YYYY-MM-DD HH:MM:SS"
            ))
        })
    }
}

/// A half-open interval of absolute time during which something may happen.
///
/// Invariant: `start < end`.
///
/// # Examples
///
/// ```
/// use u_dispatch::models::TimeWindow;
///
/// let tw = TimeWindow::parse("2025-01-15 09:00", "2025-01-15 17:00").unwrap();
/// assert_eq!(tw.duration_seconds(), 8 * 3600);
/// assert!(TimeWindow::parse("2025-01-15 17:00", "2025-01-15 09:00").is_none());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawTimeWindow")]
pub struct TimeWindow {
    #[serde(with = "timestamp")]
    start: NaiveDateTime,
    #[serde(with = "timestamp")]
    end: NaiveDateTime,
}

#[derive(Deserialize)]
struct RawTimeWindow {
    #[serde(with = "timestamp")]
    start: NaiveDateTime,
    #[serde(with = "timestamp")]
    end: NaiveDateTime,
}

impl TryFrom<RawTimeWindow> for TimeWindow {
    type Error = String;

    fn try_from(raw: RawTimeWindow) -> Result<Self, Self::Error> {
        TimeWindow::new(raw.start, raw.end)
            .ok_or_else(|| "time window start must be before its end".to_string())
    }
}

impl TimeWindow {
    /// Creates a time window.
    ///
    /// Returns `None` if `start >= end`.
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Option<Self> {
        if start >= end {
            return None;
        }
        Some(Self { start, end })
    }

    /// Parses both bounds with the wire timestamp format.
    pub fn parse(start: &str, end: &str) -> Option<Self> {
        Self::new(timestamp::parse(start)?, timestamp::parse(end)?)
    }

    /// Window opening.
    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    /// Window closing.
    pub fn end(&self) -> NaiveDateTime {
        self.end
    }

    /// Length of the window in whole seconds.
    pub fn duration_seconds(&self) -> i64 {
        (self.end - self.start).num_seconds()
    }

    /// Returns `true` if `t` lies within `[start, end]`.
    pub fn contains(&self, t: NaiveDateTime) -> bool {
        t >= self.start && t <= self.end
    }

    /// Returns `true` if `other` lies entirely inside this window.
    pub fn encloses(&self, other: &TimeWindow) -> bool {
        other.start >= self.start && other.end <= self.end
    }

    /// Offset of the window bounds from `origin`, in seconds.
    pub(crate) fn offsets_from(&self, origin: NaiveDateTime) -> (f64, f64) {
        (seconds_between(origin, self.start), seconds_between(origin, self.end))
    }
}

/// Signed seconds from `origin` to `t`, with millisecond resolution.
pub(crate) fn seconds_between(origin: NaiveDateTime, t: NaiveDateTime) -> f64 {
    (t - origin).num_milliseconds() as f64 / 1000.0
}

/// The absolute timestamp `seconds` after `origin`, rounded to milliseconds.
pub(crate) fn at_offset(origin: NaiveDateTime, seconds: f64) -> NaiveDateTime {
    origin + TimeDelta::milliseconds((seconds * 1000.0).round() as i64)
}
