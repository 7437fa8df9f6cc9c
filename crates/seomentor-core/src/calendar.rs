//! Pure projection of roadmap day ordinals onto calendar dates.
//!
//! Nothing here touches a clock or holds a cursor: callers pass the start
//! date (the day the roadmap is first presented) and the month they want,
//! and get back plain values.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::analysis::RoadmapDay;

/// A calendar month, ordered chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    /// Returns `None` unless `month` is within `1..=12`.
    #[must_use]
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    #[must_use]
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    #[must_use]
    pub fn year(self) -> i32 {
        self.year
    }

    #[must_use]
    pub fn month(self) -> u32 {
        self.month
    }

    #[must_use]
    pub fn next(self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    #[must_use]
    pub fn prev(self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    /// First day of the month. `None` only for years outside chrono's range.
    #[must_use]
    pub fn first_day(self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    #[must_use]
    pub fn days_in_month(self) -> u32 {
        match (self.first_day(), self.next().first_day()) {
            (Some(first), Some(next)) => {
                u32::try_from(next.signed_duration_since(first).num_days()).unwrap_or(0)
            }
            _ => 0,
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (year, month) = s
            .trim()
            .split_once('-')
            .ok_or_else(|| format!("expected YYYY-MM, got '{s}'"))?;
        let year = year
            .parse::<i32>()
            .map_err(|e| format!("invalid year in '{s}': {e}"))?;
        let month = month
            .parse::<u32>()
            .map_err(|e| format!("invalid month in '{s}': {e}"))?;
        Self::new(year, month).ok_or_else(|| format!("month out of range in '{s}'"))
    }
}

impl TryFrom<String> for YearMonth {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<YearMonth> for String {
    fn from(value: YearMonth) -> Self {
        value.to_string()
    }
}

/// One slot of a Monday-first month grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CalendarCell {
    /// Padding before the 1st or after the last day of the month.
    Placeholder,
    Date {
        date: NaiveDate,
        in_plan: bool,
        /// Roadmap ordinal carried by this date, when inside the plan.
        plan_day: Option<u32>,
        task: Option<String>,
    },
}

impl CalendarCell {
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        matches!(self, Self::Placeholder)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthGrid {
    pub month: YearMonth,
    /// Row-major cells; the length is always a multiple of 7.
    pub cells: Vec<CalendarCell>,
}

impl MonthGrid {
    pub fn weeks(&self) -> impl Iterator<Item = &[CalendarCell]> {
        self.cells.chunks(7)
    }
}

/// The date window of one roadmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanCalendar {
    start: NaiveDate,
    plan_days: u32,
}

impl PlanCalendar {
    #[must_use]
    pub fn new(start: NaiveDate, plan_days: u32) -> Self {
        Self { start, plan_days }
    }

    #[must_use]
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    #[must_use]
    pub fn plan_days(&self) -> u32 {
        self.plan_days
    }

    /// `start + (day - 1)` for `day` in `1..=plan_days`.
    #[must_use]
    pub fn date_for(&self, day: u32) -> Option<NaiveDate> {
        if day == 0 || day > self.plan_days {
            return None;
        }
        self.start.checked_add_days(Days::new(u64::from(day - 1)))
    }

    /// Inverse of [`Self::date_for`].
    #[must_use]
    pub fn day_for(&self, date: NaiveDate) -> Option<u32> {
        let offset = date.signed_duration_since(self.start).num_days();
        let day = u32::try_from(offset).ok()?.checked_add(1)?;
        (day <= self.plan_days).then_some(day)
    }

    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.day_for(date).is_some()
    }

    /// Last date of the plan. Equal to the start for an empty plan.
    #[must_use]
    pub fn end_date(&self) -> NaiveDate {
        self.date_for(self.plan_days).unwrap_or(self.start)
    }

    /// Every month holding at least one plan date, in chronological order.
    #[must_use]
    pub fn months(&self) -> Vec<YearMonth> {
        let last = YearMonth::of(self.end_date());
        let mut out = Vec::new();
        let mut current = YearMonth::of(self.start);
        while current <= last {
            out.push(current);
            current = current.next();
        }
        out
    }

    #[must_use]
    pub fn has_prev(&self, month: YearMonth) -> bool {
        month > YearMonth::of(self.start)
    }

    #[must_use]
    pub fn has_next(&self, month: YearMonth) -> bool {
        month < YearMonth::of(self.end_date())
    }

    /// Render `month` as a Monday-first grid padded to whole weeks.
    ///
    /// Months outside the plan still render; none of their cells are in-plan.
    #[must_use]
    pub fn month_grid(&self, month: YearMonth, roadmap: &[RoadmapDay]) -> MonthGrid {
        let Some(first) = month.first_day() else {
            return MonthGrid {
                month,
                cells: Vec::new(),
            };
        };

        let leading = first.weekday().num_days_from_monday() as usize;
        let days = month.days_in_month() as usize;
        let trailing = (7 - (leading + days) % 7) % 7;

        let mut cells = Vec::with_capacity(leading + days + trailing);
        cells.extend(std::iter::repeat_n(CalendarCell::Placeholder, leading));

        for date in first.iter_days().take(days) {
            let plan_day = self.day_for(date);
            let task = plan_day.and_then(|day| {
                roadmap
                    .iter()
                    .find(|entry| entry.day == day)
                    .map(|entry| entry.task.clone())
            });
            cells.push(CalendarCell::Date {
                date,
                in_plan: plan_day.is_some(),
                plan_day,
                task,
            });
        }

        cells.extend(std::iter::repeat_n(CalendarCell::Placeholder, trailing));
        MonthGrid { month, cells }
    }
}
