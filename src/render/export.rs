use crate::projection::synthesizer::Projection;
use crate::render::error::RenderError;
use polars::prelude::*;
use std::fs::File;
use std::path::Path;

/// Writes the projected values as CSV: a `year` column plus one column per scenario.
pub fn write_projection_csv(projection: &Projection, path: &Path) -> Result<(), RenderError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|e| RenderError::OutputDir(parent.to_path_buf(), e))?;
    }
    let mut df = projection
        .to_dataframe()
        .map_err(|e| RenderError::CsvWrite(path.to_path_buf(), e))?;
    let mut file =
        File::create(path).map_err(|e| RenderError::OutputWrite(path.to_path_buf(), e))?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(&mut df)
        .map_err(|e| RenderError::CsvWrite(path.to_path_buf(), e))
}
