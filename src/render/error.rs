use polars::error::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Drawing failed: {0}")]
    Drawing(String),

    #[error("Failed to create output directory '{0}'")]
    OutputDir(PathBuf, #[source] std::io::Error),

    #[error("Failed to write '{0}'")]
    OutputWrite(PathBuf, #[source] std::io::Error),

    #[error("Failed to write CSV '{0}'")]
    CsvWrite(PathBuf, #[source] PolarsError),

    #[error("Chart has no stripes to draw")]
    EmptyChart,
}
