use chrono::{Datelike, NaiveDate, Weekday};
use log::{info, warn};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use crate::error::Result;

#[derive(Debug, Clone, Default)]
pub struct OrderBook {
    counts: HashMap<NaiveDate, u64>,
}

impl OrderBook {
    pub fn from_counts(counts: HashMap<NaiveDate, u64>) -> Self {
        Self { counts }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let book = Self::from_json(&contents)?;
        info!("loaded {} order days from {}", book.len(), path.display());
        Ok(book)
    }

    pub fn from_json(contents: &str) -> Result<Self> {
        let raw: BTreeMap<String, u64> = serde_json::from_str(contents)?;
        let counts = raw
            .into_iter()
            .filter_map(|(key, count)| match NaiveDate::parse_from_str(&key, "%Y-%m-%d") {
                Ok(date) => Some((date, count)),
                Err(_) => {
                    warn!("skipping order entry with invalid date key '{key}'");
                    None
                }
            })
            .collect();
        Ok(Self { counts })
    }

    pub fn demo() -> Self {
        let mut counts = HashMap::new();
        let Some(first) = NaiveDate::from_ymd_opt(2023, 1, 1) else {
            return Self::default();
        };
        for date in first.iter_days().take_while(|date| date.year() <= 2025) {
            counts.insert(date, demo_count(date));
        }
        Self::from_counts(counts)
    }

    pub fn count_for(&self, date: NaiveDate) -> u64 {
        self.counts.get(&date).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

fn demo_count(date: NaiveDate) -> u64 {
    let seed = u64::from(date.ordinal()) * 37 + u64::from(date.year().unsigned_abs()) * 11;
    let base = 20 + seed % 45;
    match date.weekday() {
        Weekday::Sat | Weekday::Sun => base / 2,
        Weekday::Fri => base + 10,
        _ => base,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn missing_days_count_as_zero() {
        let book = OrderBook::from_json(r#"{"2024-03-05": 12}"#).unwrap();
        assert_eq!(book.count_for(ymd(2024, 3, 5)), 12);
        assert_eq!(book.count_for(ymd(2024, 3, 6)), 0);
    }

    #[test]
    fn invalid_keys_are_skipped() {
        let book = OrderBook::from_json(r#"{"2024-03-05": 12, "yesterday": 4, "2024-02-30": 1}"#)
            .unwrap();
        assert_eq!(book.len(), 1);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(OrderBook::from_json("[1, 2, 3]").is_err());
        assert!(OrderBook::from_json(r#"{"2024-03-05": -1}"#).is_err());
    }

    #[test]
    fn load_reads_orders_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"2024-01-01": 3, "2024-01-02": 9}}"#).unwrap();

        let book = OrderBook::load(file.path()).unwrap();

        assert_eq!(book.count_for(ymd(2024, 1, 1)), 3);
        assert_eq!(book.count_for(ymd(2024, 1, 2)), 9);
    }

    #[test]
    fn demo_data_is_stable_and_covers_three_years() {
        let first = OrderBook::demo();
        let second = OrderBook::demo();
        assert_eq!(first.len(), 365 + 366 + 365);
        let day = ymd(2024, 2, 29);
        assert_eq!(first.count_for(day), second.count_for(day));
        assert!(first.count_for(day) > 0);
        assert_eq!(first.count_for(ymd(2026, 1, 1)), 0);
    }
}
