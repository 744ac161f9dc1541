use crate::config::time_step::TimeStepParseError;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("end_date cannot be earlier than start_date")]
    DateOrder,
    #[error("Failed to parse date: {0}")]
    DateParse(#[from] chrono::ParseError),
    #[error("{0}")]
    TimeStep(#[from] TimeStepParseError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("n_lat and n_lon must be greater than 0")]
    GridSize,
    #[error("std_dev must be finite and >= 0, got {0}")]
    StdDev(f64),
    #[error("mean must be finite, got {0}")]
    Mean(f64),
    #[error("chunk sizes must be greater than 0")]
    ChunkSize,
    #[error("month should be between 1 and 12, got {0}")]
    Month(u32),
    #[error("Invalid bbox: {0}")]
    Bbox(String),
    #[error("Invalid point: latitude must be between -90 and 90, got {0}")]
    Point(f64),
}
