use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{0}'")]
    ConfigRead(PathBuf, #[source] std::io::Error),

    #[error("Failed to parse config file '{0}'")]
    ConfigParse(PathBuf, #[source] serde_json::Error),

    #[error("Failed to serialize config")]
    ConfigSerialize(#[source] serde_json::Error),

    #[error("Invalid hex color '{0}', expected #rrggbb or #rgb")]
    InvalidColor(String),

    #[error("Scenario targets differ between 2100 and 2200: only in 2100 {only_2100:?}, only in 2200 {only_2200:?}")]
    MismatchedScenarios {
        only_2100: Vec<String>,
        only_2200: Vec<String>,
    },

    #[error("Scenario '{0}' is defined more than once")]
    DuplicateScenario(String),

    #[error("Scenario '{scenario}' has a non-finite target")]
    NonFiniteTarget { scenario: String },

    #[error("Copy window start {start} is after its end {end}")]
    InvalidCopyWindow { start: i32, end: i32 },

    #[error("'{field}' = {value} is outside the supported years {min}..={max}")]
    YearOutOfRange {
        field: &'static str,
        value: i32,
        min: i32,
        max: i32,
    },

    #[error("Horizon of {value} years exceeds the maximum of {max}")]
    InvalidHorizon { value: i32, max: i32 },

    #[error("'{field}' must be a positive finite number, got {value}")]
    InvalidHeight { field: &'static str, value: f64 },

    #[error("Image size must be non-zero, got {0}x{1}")]
    InvalidImageSize(u32, u32),
}
