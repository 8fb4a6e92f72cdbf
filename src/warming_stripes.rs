//! Entry point tying the pipeline together: load the anomaly series, project the
//! scenarios, pick colors and hand the laid-out chart to one or more sinks.

use crate::color::gradient::Gradient;
use crate::color::mapper::{ColorMapper, ColorRange};
use crate::config::stripes_config::StripesConfig;
use crate::error::StripesError;
use crate::projection::synthesizer::{Projection, ProjectionSynthesizer};
use crate::render::export::write_projection_csv;
use crate::render::layout::{StripeChart, StripeLayout};
use crate::render::plotters_sink::{ChartFormat, PlottersSink};
use crate::render::sink::StripeSink;
use crate::series::loader::SeriesLoader;
use crate::types::temperature_series::TemperatureSeries;
use crate::utils::{ensure_cache_dir_exists, get_cache_dir};
use bon::bon;
use log::{info, warn};
use std::path::{Path, PathBuf};

/// The result of composing a series: projected values, their color scale and the chart.
#[derive(Debug, Clone, PartialEq)]
pub struct Composition {
    pub projection: Projection,
    pub mapper: ColorMapper,
    pub chart: StripeChart,
}

impl Composition {
    pub fn write_csv(&self, path: &Path) -> Result<(), StripesError> {
        Ok(write_projection_csv(&self.projection, path)?)
    }
}

pub struct WarmingStripes {
    config: StripesConfig,
    loader: SeriesLoader,
}

#[bon]
impl WarmingStripes {
    /// Validates `config` and prepares a loader caching into `cache_folder`.
    pub async fn with_cache_folder(
        config: StripesConfig,
        cache_folder: PathBuf,
    ) -> Result<Self, StripesError> {
        config.validate()?;
        ensure_cache_dir_exists(&cache_folder)
            .await
            .map_err(|e| StripesError::CacheDirCreation(cache_folder.clone(), e))?;
        let loader = SeriesLoader::builder()
            .cache_dir(&cache_folder)
            .comment_marker(config.comment_marker)
            .fetch_retries(config.fetch_retries)
            .cache_expiry_hours(config.cache_expiry_hours)
            .build();
        Ok(Self { config, loader })
    }

    /// Like [`WarmingStripes::with_cache_folder`], using the system cache directory.
    pub async fn new(config: StripesConfig) -> Result<Self, StripesError> {
        let cache_folder = get_cache_dir().map_err(StripesError::CacheDirResolution)?;
        Self::with_cache_folder(config, cache_folder).await
    }

    pub fn config(&self) -> &StripesConfig {
        &self.config
    }

    pub fn cache_dir(&self) -> &Path {
        self.loader.cache_dir()
    }

    /// Loads the configured dataset, from cache when fresh.
    pub async fn load_series(&self) -> Result<TemperatureSeries, StripesError> {
        Ok(self.loader.load(&self.config.data_url).await?)
    }

    /// Cuts the copy window from `series` and projects every configured scenario.
    pub fn project(&self, series: &TemperatureSeries) -> Result<Projection, StripesError> {
        let config = &self.config;
        let segment = series.window(config.copy_start_year, config.copy_end_year);
        if segment.len() < series.len() {
            info!(
                "Copy window {}..={} keeps {} of {} years",
                config.copy_start_year,
                config.copy_end_year,
                segment.len(),
                series.len()
            );
        }
        let last_year = segment.last_year().unwrap_or(config.copy_end_year);
        let horizon = ProjectionSynthesizer::horizon_for(last_year, config.horizon_years);
        let synthesizer = ProjectionSynthesizer::new(config.offset_policy, config.fluctuation);
        Ok(synthesizer.synthesize(&segment, &config.scenarios, horizon)?)
    }

    /// Color scale spanning every drawn value: the configured lower gradient
    /// below the midpoint, then on to the dark color.
    pub fn color_mapper(&self, projection: &Projection) -> ColorMapper {
        let range = ColorRange::from_values(projection.colored_values()).unwrap_or_else(|| {
            warn!("No finite values to color, using a degenerate range");
            ColorRange::new(projection.baseline, projection.baseline)
        });
        let lower = self.config.lower_gradient.gradient();
        let upper = Gradient::two_color(lower.end(), self.config.dark_color);
        ColorMapper::new(range, lower, upper)
    }

    /// Projects, colors and lays out `series` without drawing anything.
    pub fn compose(&self, series: &TemperatureSeries) -> Result<Composition, StripesError> {
        let projection = self.project(series)?;
        let mapper = self.color_mapper(&projection);
        let chart = StripeLayout::from_config(&self.config).build(
            &projection,
            &mapper,
            &self.config.scenarios,
        );
        Ok(Composition {
            projection,
            mapper,
            chart,
        })
    }

    /// Sends the composed chart to each sink in turn, stopping at the first failure.
    pub fn render_to<S: StripeSink>(
        &self,
        composition: &Composition,
        sinks: &mut [S],
    ) -> Result<(), StripesError> {
        for sink in sinks.iter_mut() {
            sink.render(&composition.chart)?;
        }
        Ok(())
    }

    /// Loads, composes and writes the chart as `<output_dir>/<output_stem>.<ext>`
    /// for every format. Nothing is written if loading or projecting fails.
    ///
    /// Defaults: the current directory and SVG only.
    #[builder]
    pub async fn generate(
        &self,
        output_dir: Option<PathBuf>,
        formats: Option<Vec<ChartFormat>>,
    ) -> Result<Vec<PathBuf>, StripesError> {
        let output_dir = output_dir.unwrap_or_else(|| PathBuf::from("."));
        let formats = formats.unwrap_or_else(|| vec![ChartFormat::Svg]);

        let series = self.load_series().await?;
        let composition = self.compose(&series)?;

        let mut sinks: Vec<PlottersSink> = formats
            .into_iter()
            .map(|format| PlottersSink::in_dir(&output_dir, &self.config.output_stem, format))
            .collect();
        self.render_to(&composition, &mut sinks[..])?;
        Ok(sinks.iter().map(|s| s.path().to_path_buf()).collect())
    }
}
