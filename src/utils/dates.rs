use crate::error::InsightError;
use chrono::{Duration, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which slice of the calendar the dashboard is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    #[default]
    Today,
    Upcoming,
}

impl Period {
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Today => "today",
            Period::Upcoming => "upcoming",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = InsightError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "today" => Ok(Period::Today),
            "upcoming" => Ok(Period::Upcoming),
            other => Err(InsightError::InvalidRequest(format!(
                "unknown period '{}', expected 'today' or 'upcoming'",
                other
            ))),
        }
    }
}

/// Inclusive range of calendar dates sent to the fixture provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateWindow {
    /// `Today` covers only `today`; `Upcoming` covers the three days after it.
    pub fn for_period(period: Period, today: NaiveDate) -> Self {
        match period {
            Period::Today => Self {
                from: today,
                to: today,
            },
            Period::Upcoming => Self {
                from: today + Duration::days(1),
                to: today + Duration::days(3),
            },
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from <= date && date <= self.to
    }

    pub fn days(&self) -> i64 {
        (self.to - self.from).num_days() + 1
    }
}

impl fmt::Display for DateWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.from == self.to {
            write!(f, "{}", self.from.format("%Y-%m-%d"))
        } else {
            write!(
                f,
                "{} to {}",
                self.from.format("%Y-%m-%d"),
                self.to.format("%Y-%m-%d")
            )
        }
    }
}

/// The caller's local calendar date
pub fn local_today() -> NaiveDate {
    Local::now().date_naive()
}
