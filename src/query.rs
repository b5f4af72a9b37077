use chrono::NaiveDate;
use url::form_urlencoded;

use crate::dates::{DateRange, iso_date, parse_date};

pub const START_DATE_PARAM: &str = "startDate";
pub const END_DATE_PARAM: &str = "endDate";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryState {
    params: Vec<(String, String)>,
}

impl QueryState {
    pub fn parse(query: &str) -> Self {
        let query = query.trim().trim_start_matches('?');
        let params = form_urlencoded::parse(query.as_bytes())
            .into_owned()
            .collect();
        Self { params }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }

    pub fn set(&mut self, key: &str, value: String) {
        let mut seen = false;
        self.params.retain_mut(|(name, current)| {
            if name != key {
                return true;
            }
            if seen {
                return false;
            }
            seen = true;
            current.clone_from(&value);
            true
        });
        if !seen {
            self.params.push((key.to_string(), value));
        }
    }

    pub fn remove(&mut self, key: &str) {
        self.params.retain(|(name, _)| name != key);
    }

    pub fn set_range(&mut self, range: Option<&DateRange>) {
        match range {
            Some(range) => {
                self.set(START_DATE_PARAM, iso_date(range.start()));
                self.set(END_DATE_PARAM, iso_date(range.end()));
            }
            None => {
                self.remove(START_DATE_PARAM);
                self.remove(END_DATE_PARAM);
            }
        }
    }

    pub fn range_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        let start = parse_date(self.get(START_DATE_PARAM)?).ok()?;
        let end = parse_date(self.get(END_DATE_PARAM)?).ok()?;
        Some((start, end))
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn share_link(&self, base: &str) -> String {
        let query = self.to_string();
        if query.is_empty() {
            base.to_string()
        } else {
            format!("{base}?{query}")
        }
    }
}

impl std::fmt::Display for QueryState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let encoded = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.params.iter())
            .finish();
        f.write_str(&encoded)
    }
}
