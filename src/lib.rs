mod color;
mod config;
mod error;
mod projection;
mod render;
mod series;
mod types;
mod utils;
mod warming_stripes;

pub use error::StripesError;
pub use warming_stripes::*;

pub use color::gradient::{Gradient, GradientPreset};
pub use color::mapper::{blend_color, ColorMapper, ColorRange, GradientHalf};
pub use color::rgb::Rgb;

pub use config::error::ConfigError;
pub use config::scenario::{ScenarioTarget, ScenarioTargets};
pub use config::stripes_config::{
    StripesConfig, DEFAULT_DARK_COLOR, DEFAULT_DATA_URL, MAX_COPY_YEAR, MIN_COPY_YEAR,
};

pub use types::temperature_series::{AnomalyPoint, SeriesWindow, TemperatureSeries};

pub use series::error::SeriesError;
pub use series::loader::SeriesLoader;
pub use series::parser::parse_series;

pub use projection::error::ProjectionError;
pub use projection::policy::{FluctuationMode, OffsetPolicy};
pub use projection::ramp::{interpolate, WarmingRamp, FIRST_ANCHOR_YEAR, SECOND_ANCHOR_YEAR};
pub use projection::synthesizer::{
    tile, ProjectedSeries, Projection, ProjectionSynthesizer, MAX_HORIZON_YEARS,
};

pub use render::error::RenderError;
pub use render::export::write_projection_csv;
pub use render::layout::{Anchor, Label, Stripe, StripeChart, StripeLayout};
pub use render::plotters_sink::{ChartFormat, PlottersSink};
pub use render::sink::{RecordingSink, StripeSink};
