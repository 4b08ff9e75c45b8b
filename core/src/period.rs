//! Reporting period: `YYMM` codes and calendar day counts.
//!
//! A period code such as "2511" means November 2025. Day counts feed the
//! daily per-area rates, so they must follow the real calendar (leap years
//! included) rather than a 30-day month.

use crate::error::{ReportError, ReportResult};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportPeriod {
    pub year:  i32,
    pub month: u32,
}

/// Which slice of figures a computation reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Span {
    /// The reporting month.
    Current,
    /// Same month, one year earlier.
    Previous,
    /// January through the reporting month.
    Cumulative,
    /// January through the reporting month, one year earlier.
    PreviousCumulative,
}

impl Span {
    /// The comparison span one year earlier.
    pub fn prior_year(self) -> Span {
        match self {
            Span::Current | Span::Previous => Span::Previous,
            Span::Cumulative | Span::PreviousCumulative => Span::PreviousCumulative,
        }
    }
}

impl ReportPeriod {
    /// Parse a 4-digit `YYMM` code. Year is `2000 + YY`.
    pub fn parse(code: &str) -> ReportResult<Self> {
        let code = code.trim();
        let invalid = |reason: &str| ReportError::InvalidPeriod {
            code:   code.to_string(),
            reason: reason.to_string(),
        };

        if code.len() != 4 || !code.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid("expected 4 digits YYMM"));
        }
        let yy: i32 = code[0..2].parse().map_err(|_| invalid("bad year"))?;
        let mm: u32 = code[2..4].parse().map_err(|_| invalid("bad month"))?;
        if !(1..=12).contains(&mm) {
            return Err(invalid("month outside 01..12"));
        }
        Ok(Self { year: 2000 + yy, month: mm })
    }

    /// The `YYMM` code used in file names.
    pub fn code(&self) -> String {
        format!("{:02}{:02}", self.year.rem_euclid(100), self.month)
    }

    /// Calendar days covered by `span`.
    pub fn days(&self, span: Span) -> u32 {
        match span {
            Span::Current => days_in_month(self.year, self.month),
            Span::Previous => days_in_month(self.year - 1, self.month),
            Span::Cumulative => days_through_month(self.year, self.month),
            Span::PreviousCumulative => days_through_month(self.year - 1, self.month),
        }
    }
}

impl fmt::Display for ReportPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}", self.year, self.month)
    }
}

/// Number of days in `month` of `year`. Returns 0 for an invalid month.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return 0;
    };
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    match next {
        Some(next) => next.signed_duration_since(first).num_days() as u32,
        None => 0,
    }
}

/// Days from January 1st through the last day of `month`, inclusive.
pub fn days_through_month(year: i32, month: u32) -> u32 {
    if !(1..=12).contains(&month) {
        return 0;
    }
    match NaiveDate::from_ymd_opt(year, month, days_in_month(year, month)) {
        Some(last) => last.ordinal(),
        None => 0,
    }
}
