//! Resolves symbolic period names into concrete, inclusive date windows.
//!
//! The same resolution is used for balances, category breakdowns and budget
//! checks so that the spending compared against a budget covers exactly the
//! dates shown in the statistics for the same period.

use std::fmt::Display;

use time::{
    Date, Duration, Month, format_description::BorrowedFormatItem, macros::format_description,
};

use crate::Error;

const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// Parse an ISO `YYYY-MM-DD` date.
///
/// # Errors
/// Returns [Error::InvalidDate] if `text` is not a valid calendar date in that
/// form, e.g. "2025-02-30" or "18/06/2025".
pub fn parse_date(text: &str) -> Result<Date, Error> {
    Date::parse(text, DATE_FORMAT).map_err(|_| Error::InvalidDate(text.to_owned()))
}

/// A named period that transactions can be aggregated over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    /// The current calendar date.
    Day,
    /// From the Sunday a week before the next Sunday up to today. On a Sunday
    /// this reaches back to the previous Sunday.
    Week,
    /// The current calendar month.
    Month,
    /// The current calendar year.
    Year,
    /// An explicit range given by the caller.
    Custom,
    /// Every date.
    All,
}

impl Period {
    /// Interpret a period token.
    ///
    /// Tokens other than "day", "week", "month", "year" and "custom" mean
    /// [Period::All].
    pub fn from_token(token: &str) -> Self {
        match token {
            "day" => Self::Day,
            "week" => Self::Week,
            "month" => Self::Month,
            "year" => Self::Year,
            "custom" => Self::Custom,
            _ => Self::All,
        }
    }

    /// The canonical token for the period.
    pub fn as_token(self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
            Self::Custom => "custom",
            Self::All => "all",
        }
    }
}

impl Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_token())
    }
}

/// An inclusive range of dates, or no restriction at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateWindow {
    /// Matches every date.
    All,
    /// Matches dates `d` where `start <= d <= end`.
    Range {
        /// The first date in the window.
        start: Date,
        /// The last date in the window.
        end: Date,
    },
}

impl DateWindow {
    /// Whether `date` falls inside the window.
    pub fn contains(&self, date: Date) -> bool {
        match self {
            DateWindow::All => true,
            DateWindow::Range { start, end } => *start <= date && date <= *end,
        }
    }
}

/// A period together with the explicit bounds used by [Period::Custom].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodQuery {
    /// The period to aggregate over.
    pub period: Period,
    /// The first date of a custom period.
    pub start: Option<Date>,
    /// The last date of a custom period.
    pub end: Option<Date>,
}

impl PeriodQuery {
    /// A query for a named period without explicit bounds.
    pub fn new(period: Period) -> Self {
        Self {
            period,
            start: None,
            end: None,
        }
    }

    /// A query for the inclusive range `start..=end`.
    pub fn custom(start: Date, end: Date) -> Self {
        Self {
            period: Period::Custom,
            start: Some(start),
            end: Some(end),
        }
    }

    /// Resolve the query into a date window relative to `today`.
    ///
    /// # Errors
    /// Returns [Error::RangeRequired] if the period is [Period::Custom] and
    /// either bound is missing.
    pub fn resolve(&self, today: Date) -> Result<DateWindow, Error> {
        resolve_window(self.period, self.start, self.end, today)
    }
}

/// Map `period` to the window of dates it covers relative to `today`.
///
/// `start` and `end` are only used for [Period::Custom]. A custom range whose
/// start is after its end is not rejected, it simply matches nothing.
///
/// # Errors
/// Returns [Error::RangeRequired] if the period is [Period::Custom] and either
/// `start` or `end` is missing.
pub fn resolve_window(
    period: Period,
    start: Option<Date>,
    end: Option<Date>,
    today: Date,
) -> Result<DateWindow, Error> {
    let window = match period {
        Period::Day => DateWindow::Range {
            start: today,
            end: today,
        },
        Period::Week => week_window(today),
        Period::Month => month_window(today),
        Period::Year => year_window(today.year()),
        Period::Custom => match (start, end) {
            (Some(start), Some(end)) => DateWindow::Range { start, end },
            _ => return Err(Error::RangeRequired),
        },
        Period::All => DateWindow::All,
    };

    Ok(window)
}

fn week_window(today: Date) -> DateWindow {
    let days_until_sunday = (7 - today.weekday().number_days_from_sunday() as i64) % 7;
    let next_or_same_sunday = today + Duration::days(days_until_sunday);

    DateWindow::Range {
        start: next_or_same_sunday - Duration::days(7),
        end: today,
    }
}

fn month_window(today: Date) -> DateWindow {
    let (year, month) = (today.year(), today.month());
    let start = Date::from_calendar_date(year, month, 1).expect("invalid month start date");
    let end = Date::from_calendar_date(year, month, last_day_of_month(year, month))
        .expect("invalid month end date");

    DateWindow::Range { start, end }
}

fn year_window(year: i32) -> DateWindow {
    DateWindow::Range {
        start: Date::from_calendar_date(year, Month::January, 1).expect("invalid year start date"),
        end: Date::from_calendar_date(year, Month::December, 31).expect("invalid year end date"),
    }
}

fn last_day_of_month(year: i32, month: Month) -> u8 {
    match month {
        Month::January
        | Month::March
        | Month::May
        | Month::July
        | Month::August
        | Month::October
        | Month::December => 31,
        Month::April | Month::June | Month::September | Month::November => 30,
        Month::February => {
            if time::util::is_leap_year(year) {
                29
            } else {
                28
            }
        }
    }
}
