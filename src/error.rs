use crate::config::error::ConfigError;
use crate::projection::error::ProjectionError;
use crate::render::error::RenderError;
use crate::series::error::SeriesError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StripesError {
    #[error(transparent)]
    Series(#[from] SeriesError),

    #[error(transparent)]
    Projection(#[from] ProjectionError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("Failed to create cache directory '{0}'")]
    CacheDirCreation(PathBuf, #[source] std::io::Error),

    #[error("Failed to determine cache directory")]
    CacheDirResolution(#[source] std::io::Error),
}
