use chrono::NaiveDate;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid date '{0}'. Use YYYY-MM-DD.")]
    InvalidDate(String),
    #[error("Start date {start} cannot be after end date {end}.")]
    InvertedRange { start: NaiveDate, end: NaiveDate },
    #[error("{0}")]
    IncompleteRange(&'static str),
    #[error("Home directory not found")]
    HomeDirNotFound,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
