use std::fmt;

use chrono::{Datelike, Month, NaiveDate};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::dates::{DateRange, rolling_date, shift_months, shift_years, with_day};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
pub enum ComparisonMode {
    #[default]
    #[value(name = "month")]
    #[serde(rename = "month")]
    PreviousMonth,
    #[value(name = "year")]
    #[serde(rename = "year")]
    PreviousYear,
}

impl ComparisonMode {
    pub fn label(self) -> &'static str {
        match self {
            ComparisonMode::PreviousMonth => "Previous Month",
            ComparisonMode::PreviousYear => "Previous Year",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            ComparisonMode::PreviousMonth => ComparisonMode::PreviousYear,
            ComparisonMode::PreviousYear => ComparisonMode::PreviousMonth,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnsupportedReason {
    SpansYearBoundary,
    InvertedDerivation,
    OutOfCalendar,
}

impl fmt::Display for UnsupportedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnsupportedReason::SpansYearBoundary => {
                write!(f, "Range crosses a year boundary")
            }
            UnsupportedReason::InvertedDerivation => {
                write!(f, "Prior period would end before it starts")
            }
            UnsupportedReason::OutOfCalendar => write!(f, "Prior period is out of range"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Comparison {
    Available { range: DateRange },
    Unsupported { reason: UnsupportedReason },
}

impl Comparison {
    pub fn range(&self) -> Option<&DateRange> {
        match self {
            Comparison::Available { range } => Some(range),
            Comparison::Unsupported { .. } => None,
        }
    }
}

pub fn compute(current: &DateRange, mode: ComparisonMode) -> Comparison {
    let bounds = match mode {
        ComparisonMode::PreviousMonth => previous_month_bounds(current),
        ComparisonMode::PreviousYear => previous_year_bounds(current),
    };

    match bounds {
        Ok((start, end)) => match DateRange::new(start, end) {
            Ok(range) => Comparison::Available { range },
            Err(_) => Comparison::Unsupported {
                reason: UnsupportedReason::InvertedDerivation,
            },
        },
        Err(reason) => Comparison::Unsupported { reason },
    }
}

type Bounds = Result<(NaiveDate, NaiveDate), UnsupportedReason>;

fn previous_month_bounds(current: &DateRange) -> Bounds {
    let (start, end) = (current.start(), current.end());

    if start.month() == end.month() && start.year() == end.year() {
        let shifted_start = shift(shift_months(start, -1))?;
        let shifted_end = shift(shift_months(end, -1))?;
        if start.month() == Month::February.number_from_month() {
            return Ok((
                shift(with_day(shifted_start, 1))?,
                shift(with_day(shifted_end, 31))?,
            ));
        }
        return Ok((shifted_start, shifted_end));
    }

    if start.day() == 1 && start.month() == Month::January.number_from_month() {
        let prior_year = start.year() - 1;
        let shifted_start = shift(rolling_date(prior_year, 11, 1))?;
        let end_month0 = if end.month() == Month::January.number_from_month() {
            11
        } else {
            end.month0() as i32 - 1
        };
        let year_back = shift(shift_years(end, -1))?;
        let shifted_end = shift(rolling_date(year_back.year(), end_month0, year_back.day()))?;
        return Ok((shifted_start, shifted_end));
    }

    if start.year() == end.year() {
        return previous_year_bounds(current);
    }

    Err(UnsupportedReason::SpansYearBoundary)
}

fn previous_year_bounds(current: &DateRange) -> Bounds {
    Ok((
        shift(shift_years(current.start(), -1))?,
        shift(shift_years(current.end(), -1))?,
    ))
}

fn shift(date: Option<NaiveDate>) -> Result<NaiveDate, UnsupportedReason> {
    date.ok_or(UnsupportedReason::OutOfCalendar)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn range(start: NaiveDate, end: NaiveDate) -> DateRange {
        DateRange::new(start, end).unwrap()
    }

    fn available(start: NaiveDate, end: NaiveDate) -> Comparison {
        Comparison::Available {
            range: range(start, end),
        }
    }

    #[test]
    fn same_month_shifts_back_one_month() {
        let current = range(ymd(2024, 3, 5), ymd(2024, 3, 20));
        assert_eq!(
            compute(&current, ComparisonMode::PreviousMonth),
            available(ymd(2024, 2, 5), ymd(2024, 2, 20))
        );
    }

    #[test]
    fn january_maps_to_december_of_prior_year() {
        let current = range(ymd(2024, 1, 1), ymd(2024, 1, 10));
        assert_eq!(
            compute(&current, ComparisonMode::PreviousMonth),
            available(ymd(2023, 12, 1), ymd(2023, 12, 10))
        );
    }

    #[test]
    fn february_maps_to_whole_january() {
        let leap = range(ymd(2024, 2, 1), ymd(2024, 2, 29));
        assert_eq!(
            compute(&leap, ComparisonMode::PreviousMonth),
            available(ymd(2024, 1, 1), ymd(2024, 1, 31))
        );

        let partial = range(ymd(2023, 2, 10), ymd(2023, 2, 12));
        assert_eq!(
            compute(&partial, ComparisonMode::PreviousMonth),
            available(ymd(2023, 1, 1), ymd(2023, 1, 31))
        );
    }

    #[test]
    fn same_month_end_rolls_forward_past_short_month() {
        let current = range(ymd(2024, 3, 5), ymd(2024, 3, 31));
        assert_eq!(
            compute(&current, ComparisonMode::PreviousMonth),
            available(ymd(2024, 2, 5), ymd(2024, 3, 2))
        );
    }

    #[test]
    fn multi_month_range_within_year_falls_back_to_previous_year() {
        let current = range(ymd(2024, 2, 15), ymd(2024, 4, 10));
        assert_eq!(
            compute(&current, ComparisonMode::PreviousMonth),
            available(ymd(2023, 2, 15), ymd(2023, 4, 10))
        );
    }

    #[test]
    fn range_from_january_first_across_years_starts_in_december() {
        let current = range(ymd(2024, 1, 1), ymd(2025, 3, 15));
        assert_eq!(
            compute(&current, ComparisonMode::PreviousMonth),
            available(ymd(2023, 12, 1), ymd(2024, 2, 15))
        );

        let ends_in_january = range(ymd(2024, 1, 1), ymd(2025, 1, 20));
        assert_eq!(
            compute(&ends_in_january, ComparisonMode::PreviousMonth),
            available(ymd(2023, 12, 1), ymd(2024, 12, 20))
        );
    }

    #[test]
    fn range_from_january_first_ending_on_leap_day_shifts_year_before_month() {
        let current = range(ymd(2023, 1, 1), ymd(2024, 2, 29));
        assert_eq!(
            compute(&current, ComparisonMode::PreviousMonth),
            available(ymd(2022, 12, 1), ymd(2023, 1, 1))
        );
    }

    #[test]
    fn range_from_january_first_within_year_is_inverted() {
        let current = range(ymd(2024, 1, 1), ymd(2024, 3, 15));
        assert_eq!(
            compute(&current, ComparisonMode::PreviousMonth),
            Comparison::Unsupported {
                reason: UnsupportedReason::InvertedDerivation
            }
        );
    }

    #[test]
    fn cross_year_range_is_unsupported_for_previous_month() {
        let current = range(ymd(2023, 11, 15), ymd(2024, 2, 10));
        let comparison = compute(&current, ComparisonMode::PreviousMonth);
        assert_eq!(
            comparison,
            Comparison::Unsupported {
                reason: UnsupportedReason::SpansYearBoundary
            }
        );
        assert!(comparison.range().is_none());
    }

    #[test]
    fn cross_year_range_is_supported_for_previous_year() {
        let current = range(ymd(2023, 11, 15), ymd(2024, 2, 10));
        assert_eq!(
            compute(&current, ComparisonMode::PreviousYear),
            available(ymd(2022, 11, 15), ymd(2023, 2, 10))
        );
    }

    #[test]
    fn previous_year_rolls_leap_day_forward() {
        let current = range(ymd(2024, 2, 20), ymd(2024, 2, 29));
        assert_eq!(
            compute(&current, ComparisonMode::PreviousYear),
            available(ymd(2023, 2, 20), ymd(2023, 3, 1))
        );
    }

    #[test]
    fn mode_serializes_with_short_names() {
        let encoded = serde_json::to_string(&ComparisonMode::PreviousYear).unwrap();
        assert_eq!(encoded, "\"year\"");
        assert_eq!(ComparisonMode::default(), ComparisonMode::PreviousMonth);
        assert_eq!(
            ComparisonMode::PreviousMonth.toggled(),
            ComparisonMode::PreviousYear
        );
    }

    fn contains_leap_day(range: &DateRange) -> bool {
        range
            .start()
            .iter_days()
            .take(range.day_count())
            .any(|day| day.month() == 2 && day.day() == 29)
    }

    fn leap_free_date() -> impl Strategy<Value = NaiveDate> {
        (1901i32..2100, 1u32..=12, 1u32..=28).prop_map(|(y, m, d)| ymd(y, m, d))
    }

    proptest! {
        #[test]
        fn previous_year_preserves_month_day_and_length(
            start in leap_free_date(),
            extra_days in 0i64..300,
        ) {
            let end = start + chrono::Duration::days(extra_days);
            let current = range(start, end);
            prop_assume!(!contains_leap_day(&current));

            let first = compute(&current, ComparisonMode::PreviousYear);
            let second = compute(&current, ComparisonMode::PreviousYear);
            prop_assert_eq!(first, second);

            let derived = first.range().copied().unwrap();
            if !contains_leap_day(&derived) {
                prop_assert_eq!(derived.day_count(), current.day_count());
            }
            prop_assert_eq!(derived.start(), ymd(start.year() - 1, start.month(), start.day()));
            prop_assert_eq!(derived.end().month(), end.month());
            prop_assert_eq!(derived.end().day(), end.day());
            prop_assert_eq!(derived.end().year(), end.year() - 1);
        }

        #[test]
        fn same_month_ranges_always_have_a_comparison(
            start in leap_free_date(),
            extra_days in 0u32..28,
        ) {
            let end = with_day(start, (start.day() + extra_days).min(28)).unwrap();
            let current = range(start, end);
            let comparison = compute(&current, ComparisonMode::PreviousMonth);
            prop_assert!(comparison.range().is_some());
        }
    }
}
