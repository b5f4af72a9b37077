use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::error::{Error, Result};

pub const DEFAULT_SHARE_BASE_URL: &str = "http://localhost:3000/";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ThemePreference {
    #[default]
    Terminal,
    Light,
    Dark,
}

impl ThemePreference {
    pub fn next(self) -> Self {
        match self {
            ThemePreference::Terminal => ThemePreference::Dark,
            ThemePreference::Dark => ThemePreference::Light,
            ThemePreference::Light => ThemePreference::Terminal,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Default, PartialEq)]
struct Config {
    theme: Option<ThemePreference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    last_query: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    orders_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    share_base_url: Option<String>,
}

fn config_path() -> Option<PathBuf> {
    let mut path = dirs::home_dir()?;
    path.push(".ordercmp.json");
    Some(path)
}

pub fn log_path() -> Option<PathBuf> {
    let mut path = dirs::home_dir()?;
    path.push(".ordercmp.log");
    Some(path)
}

pub fn read_theme() -> ThemePreference {
    read_config()
        .and_then(|config| config.theme)
        .unwrap_or_default()
}

pub fn write_theme(theme: ThemePreference) -> Result<()> {
    let mut config = read_config().unwrap_or_default();
    config.theme = Some(theme);
    write_config(&config)
}

pub fn read_last_query() -> Option<String> {
    read_config().and_then(|config| config.last_query)
}

pub fn write_last_query(query: &str) -> Result<()> {
    let mut config = read_config().unwrap_or_default();
    config.last_query = normalize_query(query);
    write_config(&config)
}

pub fn read_orders_path() -> Option<PathBuf> {
    read_config()
        .and_then(|config| config.orders_path)
        .map(PathBuf::from)
}

pub fn read_share_base_url() -> String {
    read_config()
        .and_then(|config| config.share_base_url)
        .unwrap_or_else(|| DEFAULT_SHARE_BASE_URL.to_string())
}

fn normalize_query(query: &str) -> Option<String> {
    let trimmed = query.trim().trim_start_matches('?');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn read_config() -> Option<Config> {
    let path = config_path()?;
    let contents = fs::read_to_string(path).ok()?;
    serde_json::from_str(&contents).ok()
}

fn write_config(config: &Config) -> Result<()> {
    let path = config_path().ok_or(Error::HomeDirNotFound)?;
    let json = serde_json::to_string_pretty(config)?;
    fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_query_drops_empty_values() {
        assert_eq!(normalize_query(""), None);
        assert_eq!(normalize_query("  ? "), None);
        assert_eq!(
            normalize_query("?startDate=2024-03-05&endDate=2024-03-20"),
            Some("startDate=2024-03-05&endDate=2024-03-20".to_string())
        );
    }

    #[test]
    fn config_defaults_missing_fields() {
        let config: Config = serde_json::from_str(r#"{"theme":"dark"}"#).unwrap();
        assert_eq!(config.theme, Some(ThemePreference::Dark));
        assert_eq!(config.last_query, None);
        assert_eq!(config.share_base_url, None);
    }

    #[test]
    fn config_skips_unset_fields_when_written() {
        let config = Config {
            theme: Some(ThemePreference::Light),
            last_query: Some("startDate=2024-01-01&endDate=2024-01-10".to_string()),
            ..Config::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"theme\":\"light\""));
        assert!(json.contains("last_query"));
        assert!(!json.contains("orders_path"));
    }

    #[test]
    fn theme_cycles_through_all_variants() {
        let start = ThemePreference::Terminal;
        assert_eq!(start.next().next().next(), start);
    }
}
