//! Error types for the portfolio engine.

use thiserror::Error;

use crate::types::WeightVector;

/// Main error type for portfolio estimation and backtesting.
#[derive(Error, Debug)]
pub enum FrontierError {
    #[error("price file not found: {path} (fetch the data out-of-band first)")]
    MissingData { path: String },

    #[error("Data error: {0}")]
    DataError(String),

    #[error("CSV parsing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Date parsing error: {0}")]
    DateParseError(#[from] chrono::ParseError),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("degenerate statistics: portfolio volatility {volatility:e} too close to zero for a defined Sharpe ratio")]
    DegenerateStatistics { volatility: f64 },

    #[error("optimizer failed to converge after {iterations} iterations")]
    NonConvergence {
        iterations: usize,
        /// Best iterate found before giving up. Always a valid simplex point.
        best: WeightVector,
    },

    #[error("insufficient price window: {rows} row(s), need at least {required}")]
    InsufficientWindow { rows: usize, required: usize },

    #[error("unsupported optimization objective: {0}")]
    UnsupportedObjective(String),
}

/// Result type alias for portfolio operations.
pub type Result<T> = std::result::Result<T, FrontierError>;
