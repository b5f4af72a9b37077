use std::iter;

use chrono::NaiveDate;
use serde::Serialize;

use crate::dates::{DateRange, short_date};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeriesPoint {
    pub label: String,
    pub display_date: String,
    pub date: NaiveDate,
    pub value: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ComparisonSeries {
    pub current: Vec<SeriesPoint>,
    pub comparison: Vec<SeriesPoint>,
}

impl ComparisonSeries {
    pub fn len(&self) -> usize {
        self.current.len()
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }

    pub fn current_total(&self) -> u64 {
        self.current.iter().map(|point| point.value).sum()
    }

    pub fn comparison_total(&self) -> u64 {
        self.comparison.iter().map(|point| point.value).sum()
    }
}

pub fn generate<F>(current: &DateRange, comparison: &DateRange, lookup: F) -> ComparisonSeries
where
    F: Fn(NaiveDate) -> u64,
{
    let capacity = current.day_count();
    let mut series = ComparisonSeries {
        current: Vec::with_capacity(capacity),
        comparison: Vec::with_capacity(capacity),
    };

    let days = days_from(current.start())
        .take(capacity)
        .zip(days_from(comparison.start()));

    for (index, (current_date, comparison_date)) in days.enumerate() {
        let label = format!("Day {}", index + 1);
        series.current.push(point(&label, current_date, &lookup));
        series.comparison.push(point(&label, comparison_date, &lookup));
    }

    series
}

fn days_from(start: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    iter::successors(Some(start), |date| date.succ_opt())
}

fn point<F>(label: &str, date: NaiveDate, lookup: &F) -> SeriesPoint
where
    F: Fn(NaiveDate) -> u64,
{
    SeriesPoint {
        label: label.to_string(),
        display_date: short_date(date),
        date,
        value: lookup(date),
    }
}
