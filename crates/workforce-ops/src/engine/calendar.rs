use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Calendar month used as the scoring and reporting window, keyed as `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Period {
    year: i32,
    month: u32,
}

impl Period {
    pub fn new(year: i32, month: u32) -> Result<Self, PeriodParseError> {
        if !(1..=12).contains(&month) {
            return Err(PeriodParseError::MonthOutOfRange(month));
        }
        Ok(Self { year, month })
    }

    /// The period containing the given calendar date.
    pub fn containing(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .unwrap_or(NaiveDate::MIN)
    }

    pub fn last_day(&self) -> NaiveDate {
        let (next_year, next_month) = if self.month == 12 {
            (self.year + 1, 1)
        } else {
            (self.year, self.month + 1)
        };
        NaiveDate::from_ymd_opt(next_year, next_month, 1)
            .map(|first_of_next| first_of_next - Duration::days(1))
            .unwrap_or(NaiveDate::MAX)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.first_day() && date <= self.last_day()
    }

    /// Number of working days (Monday through Friday) in the month.
    pub fn working_days(&self) -> u32 {
        weekday_count(self.first_day(), self.last_day())
    }

    /// Working days elapsed from the start of the month through `date`,
    /// clamped to the month boundaries. Zero when `date` precedes the month.
    pub fn working_days_through(&self, date: NaiveDate) -> u32 {
        if date < self.first_day() {
            return 0;
        }
        weekday_count(self.first_day(), date.min(self.last_day()))
    }

    /// The period `months` whole months before this one.
    pub fn months_back(&self, months: u32) -> Self {
        let total = self.year * 12 + self.month as i32 - 1 - months as i32;
        Self {
            year: total.div_euclid(12),
            month: (total.rem_euclid(12) + 1) as u32,
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for Period {
    type Err = PeriodParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        let (year_part, month_part) = trimmed
            .split_once('-')
            .ok_or_else(|| PeriodParseError::InvalidFormat(trimmed.to_string()))?;
        let year = year_part
            .parse::<i32>()
            .map_err(|_| PeriodParseError::InvalidFormat(trimmed.to_string()))?;
        let month = month_part
            .parse::<u32>()
            .map_err(|_| PeriodParseError::InvalidFormat(trimmed.to_string()))?;
        Self::new(year, month)
    }
}

impl Serialize for Period {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Period {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PeriodParseError {
    #[error("period '{0}' is not in YYYY-MM form")]
    InvalidFormat(String),
    #[error("month {0} is outside 1..=12")]
    MonthOutOfRange(u32),
}

/// Count of weekdays (Monday through Friday) in `[start, end]` inclusive.
/// Zero when `end` precedes `start`.
pub fn weekday_count(start: NaiveDate, end: NaiveDate) -> u32 {
    if end < start {
        return 0;
    }
    start
        .iter_days()
        .take_while(|day| *day <= end)
        .filter(|day| !matches!(day.weekday(), Weekday::Sat | Weekday::Sun))
        .count() as u32
}
