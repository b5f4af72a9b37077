use chrono::{Datelike, Days, NaiveDate};
use serde::Serialize;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(Error::InvertedRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn from_options(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<Option<Self>> {
        match (start, end) {
            (Some(start), Some(end)) => Self::new(start, end).map(Some),
            (None, None) => Ok(None),
            (Some(_), None) => Err(Error::IncompleteRange("Start date requires an end date.")),
            (None, Some(_)) => Err(Error::IncompleteRange("End date requires a start date.")),
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn day_count(&self) -> usize {
        (self.end - self.start).num_days() as usize + 1
    }

    pub fn label(&self) -> String {
        if self.start == self.end {
            format!("{}", self.start.format("%Y-%m-%d"))
        } else {
            format!(
                "{} → {}",
                self.start.format("%Y-%m-%d"),
                self.end.format("%Y-%m-%d")
            )
        }
    }
}

pub fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| Error::InvalidDate(value.to_string()))
}

pub fn iso_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn short_date(date: NaiveDate) -> String {
    date.format("%-d %b").to_string()
}

pub fn long_date(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}

pub fn rolling_date(year: i32, month0: i32, day: u32) -> Option<NaiveDate> {
    let year = year.checked_add(month0.div_euclid(12))?;
    let month = month0.rem_euclid(12) as u32 + 1;
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    first.checked_add_days(Days::new(u64::from(day.max(1) - 1)))
}

pub fn shift_months(date: NaiveDate, months: i32) -> Option<NaiveDate> {
    rolling_date(date.year(), date.month0() as i32 + months, date.day())
}

pub fn shift_years(date: NaiveDate, years: i32) -> Option<NaiveDate> {
    rolling_date(date.year().checked_add(years)?, date.month0() as i32, date.day())
}

pub fn with_day(date: NaiveDate, day: u32) -> Option<NaiveDate> {
    rolling_date(date.year(), date.month0() as i32, day)
}
