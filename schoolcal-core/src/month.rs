//! Month names and the year+month pair the calendar is scoped to.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Days, Month, NaiveDate};

use crate::error::{CalendarError, CalendarResult};

/// The twelve months in calendar order; position is the zero-based index.
const MONTHS: [Month; 12] = [
    Month::January,
    Month::February,
    Month::March,
    Month::April,
    Month::May,
    Month::June,
    Month::July,
    Month::August,
    Month::September,
    Month::October,
    Month::November,
    Month::December,
];

/// Map a canonical English month name ("January".."December") to its
/// zero-based index. Case and surrounding whitespace are ignored;
/// abbreviations are rejected.
pub fn month_index(name: &str) -> CalendarResult<u32> {
    let wanted = name.trim();
    MONTHS
        .iter()
        .position(|m| m.name().eq_ignore_ascii_case(wanted))
        .map(|i| i as u32)
        .ok_or_else(|| CalendarError::UnknownMonth(name.to_string()))
}

/// A calendar month in a specific year.
///
/// Only months whose first day and whose following month's first day are
/// representable dates can be built, so the accessors never fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct YearMonth {
    first: NaiveDate,
    // first day of the following month
    end: NaiveDate,
}

impl YearMonth {
    pub fn new(year: i32, month_index: u32) -> CalendarResult<Self> {
        if month_index > 11 {
            return Err(CalendarError::InvalidMonthIndex(month_index));
        }

        let first = NaiveDate::from_ymd_opt(year, month_index + 1, 1);
        let end = if month_index == 11 {
            year.checked_add(1)
                .and_then(|next_year| NaiveDate::from_ymd_opt(next_year, 1, 1))
        } else {
            NaiveDate::from_ymd_opt(year, month_index + 2, 1)
        };

        match (first, end) {
            (Some(first), Some(end)) => Ok(YearMonth { first, end }),
            _ => Err(CalendarError::InvalidDate(format!(
                "year {year} is outside the supported date range"
            ))),
        }
    }

    /// Build from a month name such as "July".
    pub fn from_name(year: i32, name: &str) -> CalendarResult<Self> {
        Self::new(year, month_index(name)?)
    }

    /// The month containing `date`.
    pub fn from_date(date: NaiveDate) -> CalendarResult<Self> {
        Self::new(date.year(), date.month0())
    }

    pub fn year(&self) -> i32 {
        self.first.year()
    }

    /// Zero-based month index (January = 0).
    pub fn index0(&self) -> u32 {
        self.first.month0()
    }

    /// One-based month number (January = 1).
    pub fn number(&self) -> u32 {
        self.first.month()
    }

    pub fn month(&self) -> Month {
        MONTHS[self.index0() as usize]
    }

    pub fn name(&self) -> &'static str {
        self.month().name()
    }

    pub fn first_day(&self) -> NaiveDate {
        self.first
    }

    /// First day of the following month; the exclusive upper bound of this one.
    pub fn end_day(&self) -> NaiveDate {
        self.end
    }

    pub fn days_in_month(&self) -> u32 {
        (self.end - self.first).num_days() as u32
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.first <= date && date < self.end
    }

    /// `None` past the last representable month.
    pub fn next(&self) -> Option<Self> {
        Self::from_date(self.end).ok()
    }

    /// `None` before the first representable month.
    pub fn prev(&self) -> Option<Self> {
        self.first
            .pred_opt()
            .and_then(|date| Self::from_date(date).ok())
    }

    /// Date for a one-based day number, constructed the way wall-clock date
    /// arithmetic does it: days past the end of the month roll forward into
    /// the following month (day 31 of June is July 1).
    pub fn day(&self, day: u32) -> CalendarResult<NaiveDate> {
        if day == 0 {
            return Err(CalendarError::InvalidDate(format!("{self} day 0")));
        }
        self.first
            .checked_add_days(Days::new(u64::from(day - 1)))
            .ok_or_else(|| CalendarError::InvalidDate(format!("{self} day {day}")))
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name(), self.year())
    }
}

/// Parses "2024-07" or "July 2024".
impl FromStr for YearMonth {
    type Err = CalendarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = || CalendarError::InvalidDate(s.to_string());

        if let Some((year, month)) = s.split_once('-') {
            let year: i32 = year.trim().parse().map_err(|_| invalid())?;
            let number: u32 = month.trim().parse().map_err(|_| invalid())?;
            if !(1..=12).contains(&number) {
                return Err(invalid());
            }
            return YearMonth::new(year, number - 1);
        }

        let mut parts = s.split_whitespace();
        match (parts.next(), parts.next(), parts.next()) {
            (Some(name), Some(year), None) => {
                let year: i32 = year.parse().map_err(|_| invalid())?;
                YearMonth::from_name(year, name)
            }
            _ => Err(invalid()),
        }
    }
}
