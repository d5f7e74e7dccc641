use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

const MINUTES_PER_DAY: u16 = 24 * 60;

/// Malformed weekly slot input, rejected before it can reach the resolver.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidScheduleSlot {
    #[error("day of week must be between 1 (Monday) and 7 (Sunday), found {0}")]
    DayOutOfRange(u8),
    #[error("'{0}' is not a valid HH:MM time of day")]
    MalformedTime(String),
    #[error("slot must start before it ends ({start} >= {end})")]
    EmptyInterval { start: TimeOfDay, end: TimeOfDay },
}

/// ISO weekday number, Monday = 1 through Sunday = 7.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct DayOfWeek(u8);

impl DayOfWeek {
    pub fn new(value: u8) -> Result<Self, InvalidScheduleSlot> {
        if (1..=7).contains(&value) {
            Ok(Self(value))
        } else {
            Err(InvalidScheduleSlot::DayOutOfRange(value))
        }
    }

    pub fn of(date: NaiveDate) -> Self {
        Self(date.weekday().number_from_monday() as u8)
    }

    pub const fn number(self) -> u8 {
        self.0
    }

    pub const fn label(self) -> &'static str {
        match self.0 {
            1 => "Monday",
            2 => "Tuesday",
            3 => "Wednesday",
            4 => "Thursday",
            5 => "Friday",
            6 => "Saturday",
            _ => "Sunday",
        }
    }
}

impl<'de> Deserialize<'de> for DayOfWeek {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = u8::deserialize(deserializer)?;
        DayOfWeek::new(raw).map_err(serde::de::Error::custom)
    }
}

/// Local time of day with minute precision, ordered as minutes since midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeOfDay(u16);

impl TimeOfDay {
    pub fn from_hm(hours: u16, minutes: u16) -> Result<Self, InvalidScheduleSlot> {
        if hours >= 24 || minutes >= 60 {
            return Err(InvalidScheduleSlot::MalformedTime(format!(
                "{hours:02}:{minutes:02}"
            )));
        }
        Ok(Self(hours * 60 + minutes))
    }

    /// `24:00` is accepted so a slot can run until midnight.
    pub fn from_minutes(minutes: u16) -> Option<Self> {
        (minutes <= MINUTES_PER_DAY).then_some(Self(minutes))
    }

    pub const fn minutes(self) -> u16 {
        self.0
    }
}

impl FromStr for TimeOfDay {
    type Err = InvalidScheduleSlot;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        let malformed = || InvalidScheduleSlot::MalformedTime(trimmed.to_string());

        let digits = |part: &str, min_len: usize| {
            (min_len..=2).contains(&part.len()) && part.bytes().all(|byte| byte.is_ascii_digit())
        };

        // Accept HH:MM:SS from backends that serialize full times; seconds are dropped.
        let mut parts = trimmed.split(':');
        let (hours, minutes) = match (parts.next(), parts.next()) {
            (Some(hours), Some(minutes)) if digits(hours, 1) && digits(minutes, 2) => {
                (hours, minutes)
            }
            _ => return Err(malformed()),
        };
        match (parts.next(), parts.next()) {
            (None, None) => {}
            (Some(seconds), None) if digits(seconds, 2) && seconds < "60" => {}
            _ => return Err(malformed()),
        }

        let hours: u16 = hours.parse().map_err(|_| malformed())?;
        let minutes: u16 = minutes.parse().map_err(|_| malformed())?;
        if hours == 24 && minutes == 0 {
            return Ok(Self(MINUTES_PER_DAY));
        }
        TimeOfDay::from_hm(hours, minutes).map_err(|_| malformed())
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.0 / 60, self.0 % 60)
    }
}

impl Serialize for TimeOfDay {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TimeOfDay {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// One recurring weekly teaching window. Start is always strictly before end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ScheduleSlot {
    day_of_week: DayOfWeek,
    start_time: TimeOfDay,
    end_time: TimeOfDay,
}

impl ScheduleSlot {
    pub fn new(
        day_of_week: DayOfWeek,
        start_time: TimeOfDay,
        end_time: TimeOfDay,
    ) -> Result<Self, InvalidScheduleSlot> {
        if start_time >= end_time {
            return Err(InvalidScheduleSlot::EmptyInterval {
                start: start_time,
                end: end_time,
            });
        }

        Ok(Self {
            day_of_week,
            start_time,
            end_time,
        })
    }

    /// Convenience constructor from raw parts, e.g. `ScheduleSlot::parse(1, "08:00", "09:30")`.
    pub fn parse(day: u8, start: &str, end: &str) -> Result<Self, InvalidScheduleSlot> {
        Self::new(DayOfWeek::new(day)?, start.parse()?, end.parse()?)
    }

    pub fn day_of_week(&self) -> DayOfWeek {
        self.day_of_week
    }

    pub fn start_time(&self) -> TimeOfDay {
        self.start_time
    }

    pub fn end_time(&self) -> TimeOfDay {
        self.end_time
    }

    /// Same weekday and the half-open intervals `[start, end)` intersect.
    pub fn overlaps(&self, other: &ScheduleSlot) -> bool {
        self.day_of_week == other.day_of_week
            && self.start_time < other.end_time
            && other.start_time < self.end_time
    }
}

impl fmt::Display for ScheduleSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}-{}",
            self.day_of_week.label(),
            self.start_time,
            self.end_time
        )
    }
}

impl FromStr for ScheduleSlot {
    type Err = InvalidScheduleSlot;

    /// Parses the catalog export form `D HH:MM-HH:MM`, e.g. `3 16:00-17:30`.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        let malformed = || InvalidScheduleSlot::MalformedTime(trimmed.to_string());

        let (day, times) = trimmed.split_once(char::is_whitespace).ok_or_else(malformed)?;
        let (start, end) = times.trim().split_once('-').ok_or_else(malformed)?;
        let day: u8 = day.parse().map_err(|_| malformed())?;

        ScheduleSlot::parse(day, start, end)
    }
}

#[derive(Deserialize)]
struct RawScheduleSlot {
    day_of_week: DayOfWeek,
    start_time: TimeOfDay,
    end_time: TimeOfDay,
}

impl<'de> Deserialize<'de> for ScheduleSlot {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = RawScheduleSlot::deserialize(deserializer)?;
        ScheduleSlot::new(raw.day_of_week, raw.start_time, raw.end_time)
            .map_err(serde::de::Error::custom)
    }
}

pub fn overlaps(a: &ScheduleSlot, b: &ScheduleSlot) -> bool {
    a.overlaps(b)
}

/// Inclusive date range; `end == None` is open-ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct DateSpan {
    pub(crate) start: NaiveDate,
    pub(crate) end: Option<NaiveDate>,
}

impl DateSpan {
    pub(crate) fn intersect(self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Option<Self> {
        let start = match start {
            Some(other) if other > self.start => other,
            _ => self.start,
        };
        let end = match (self.end, end) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (Some(a), None) => Some(a),
            (None, other) => other,
        };

        match end {
            Some(end) if end < start => None,
            _ => Some(Self { start, end }),
        }
    }

    /// Whether any date in the span falls on `day`.
    pub(crate) fn contains_weekday(self, day: DayOfWeek) -> bool {
        let mut date = self.start;
        for _ in 0..7 {
            if let Some(end) = self.end {
                if date > end {
                    return false;
                }
            }
            if DayOfWeek::of(date) == day {
                return true;
            }
            match date.succ_opt() {
                Some(next) => date = next,
                None => return false,
            }
        }
        false
    }
}
