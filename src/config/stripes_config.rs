//! The single configuration structure for a warming-stripes run.
//!
//! Every value the pipeline depends on (data source, copy window, scenario
//! targets, colors, layout) lives here with a documented default, so a run can
//! be reproduced from one JSON file and tests can substitute any part of it.

use crate::color::gradient::GradientPreset;
use crate::color::rgb::Rgb;
use crate::config::error::ConfigError;
use crate::config::scenario::ScenarioTargets;
use crate::projection::policy::{FluctuationMode, OffsetPolicy};
use crate::projection::synthesizer::MAX_HORIZON_YEARS;
use bon::Builder;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Berkeley Earth global land+ocean annual summary.
pub const DEFAULT_DATA_URL: &str =
    "https://berkeley-earth-temperature.s3.us-west-1.amazonaws.com/Global/Complete_TAVG_summary.txt";

pub const DEFAULT_DARK_COLOR: Rgb = Rgb(0x24, 0x06, 0x27);

/// Bounds for the copy window years.
pub const MIN_COPY_YEAR: i32 = 0;
pub const MAX_COPY_YEAR: i32 = 9999;

/// Configuration for fetching, projecting, coloring and drawing the stripes.
///
/// Build one with [`StripesConfig::builder`]; every field has a default, so
/// `StripesConfig::builder().build()` equals [`StripesConfig::default`].
///
/// # Examples
///
/// ```
/// use warming_stripes::{FluctuationMode, StripesConfig};
///
/// let config = StripesConfig::builder()
///     .copy_start_year(1950)
///     .fluctuation(FluctuationMode::RampOnly)
///     .horizon_years(100)
///     .build();
///
/// assert_eq!(config.copy_end_year, 2024);
/// assert_eq!(config.horizon_years, Some(100));
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Builder)]
#[serde(default)]
pub struct StripesConfig {
    /// Where the anomaly table is downloaded from.
    #[builder(into, default = DEFAULT_DATA_URL.to_string())]
    pub data_url: String,

    /// Lines starting with this character are comments.
    #[builder(default = '%')]
    pub comment_marker: char,

    /// First year of the historical segment that is drawn and replayed (inclusive).
    #[builder(default = 1848)]
    pub copy_start_year: i32,

    /// Last year of the historical segment (inclusive). Projections start the year after
    /// the last year actually present in the data up to this one.
    #[builder(default = 2024)]
    pub copy_end_year: i32,

    /// Projected years after the last historical year. `None` projects through 2200.
    pub horizon_years: Option<i32>,

    #[builder(default)]
    pub offset_policy: OffsetPolicy,

    #[builder(default)]
    pub fluctuation: FluctuationMode,

    /// Scenario rows, bottom to top.
    #[builder(default = ScenarioTargets::rcp_defaults())]
    pub scenarios: ScenarioTargets,

    /// Gradient for the lower half of the value range.
    #[builder(default)]
    pub lower_gradient: GradientPreset,

    /// The upper half of the range fades from the lower gradient's end color to this one.
    #[builder(default = DEFAULT_DARK_COLOR)]
    pub dark_color: Rgb,

    #[builder(into, default = "Warming Stripes with copied fluctuations and linear ramps".to_string())]
    pub title: String,

    /// Height of each historical stripe, in chart units.
    #[builder(default = 1.0)]
    pub historical_height: f64,

    /// Height of each stacked scenario row, in chart units.
    #[builder(default = 0.2)]
    pub scenario_row_height: f64,

    /// Draw year, scenario and explanation labels.
    #[builder(default = true)]
    pub show_labels: bool,

    /// Output image size in pixels.
    #[builder(default = (1600, 600))]
    pub image_size: (u32, u32),

    /// File name, without extension, of the exported charts.
    #[builder(into, default = "warming_stripes".to_string())]
    pub output_stem: String,

    /// Additional download attempts after a failed fetch.
    #[builder(default = 2)]
    pub fetch_retries: u32,

    /// A cached series older than this is downloaded again. `0` keeps it forever.
    #[builder(default = 24 * 7)]
    pub cache_expiry_hours: u64,
}

impl Default for StripesConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl StripesConfig {
    /// Reads a JSON config. Missing fields take their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ConfigRead(path.to_path_buf(), e))?;
        let config: StripesConfig = serde_json::from_str(&text)
            .map_err(|e| ConfigError::ConfigParse(path.to_path_buf(), e))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(ConfigError::ConfigSerialize)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("copy_start_year", self.copy_start_year),
            ("copy_end_year", self.copy_end_year),
        ] {
            if !(MIN_COPY_YEAR..=MAX_COPY_YEAR).contains(&value) {
                return Err(ConfigError::YearOutOfRange {
                    field,
                    value,
                    min: MIN_COPY_YEAR,
                    max: MAX_COPY_YEAR,
                });
            }
        }
        if self.copy_start_year > self.copy_end_year {
            return Err(ConfigError::InvalidCopyWindow {
                start: self.copy_start_year,
                end: self.copy_end_year,
            });
        }
        for (field, value) in [
            ("historical_height", self.historical_height),
            ("scenario_row_height", self.scenario_row_height),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::InvalidHeight { field, value });
            }
        }
        if let Some(value) = self.horizon_years.filter(|h| *h > MAX_HORIZON_YEARS) {
            return Err(ConfigError::InvalidHorizon {
                value,
                max: MAX_HORIZON_YEARS,
            });
        }
        if self.image_size.0 == 0 || self.image_size.1 == 0 {
            return Err(ConfigError::InvalidImageSize(
                self.image_size.0,
                self.image_size.1,
            ));
        }
        self.scenarios.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::scenario::ScenarioTarget;
    use std::io::Write;

    #[test]
    fn test_defaults_match_reference_values() {
        let config = StripesConfig::default();
        assert_eq!(config.data_url, DEFAULT_DATA_URL);
        assert_eq!(config.comment_marker, '%');
        assert_eq!((config.copy_start_year, config.copy_end_year), (1848, 2024));
        assert_eq!(config.horizon_years, None);
        assert_eq!(config.offset_policy, OffsetPolicy::Difference);
        assert_eq!(config.fluctuation, FluctuationMode::Tiled);
        assert_eq!(config.dark_color.to_string(), "#240627");
        assert_eq!(config.scenarios.len(), 4);
        let rcp85 = config.scenarios.get("RCP8.5").unwrap();
        assert_eq!((rcp85.target_2100, rcp85.target_2200), (4.8, 7.8));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_json_partial_file_fills_defaults() -> Result<(), Box<dyn std::error::Error>> {
        let mut file = tempfile::NamedTempFile::new()?;
        write!(
            file,
            r##"{{
                "copy_start_year": 1900,
                "offset_policy": "last_value",
                "dark_color": "#102030",
                "scenarios": [{{"name": "X", "target_2100": 1.0, "target_2200": 2.0}}]
            }}"##
        )?;

        let config = StripesConfig::from_json_file(file.path())?;
        assert_eq!(config.copy_start_year, 1900);
        assert_eq!(config.copy_end_year, 2024);
        assert_eq!(config.offset_policy, OffsetPolicy::LastValue);
        assert_eq!(config.dark_color, Rgb(0x10, 0x20, 0x30));
        assert_eq!(
            config.scenarios.iter().collect::<Vec<_>>(),
            [&ScenarioTarget::new("X", 1.0, 2.0)]
        );
        Ok(())
    }

    #[test]
    fn test_json_round_trip_of_defaults() -> Result<(), ConfigError> {
        let json = StripesConfig::default().to_json_string()?;
        let back: StripesConfig = serde_json::from_str(&json).map_err(ConfigError::ConfigSerialize)?;
        assert_eq!(back, StripesConfig::default());
        Ok(())
    }

    #[test]
    fn test_invalid_json_color_is_a_parse_error() -> Result<(), Box<dyn std::error::Error>> {
        let mut file = tempfile::NamedTempFile::new()?;
        write!(file, r#"{{"dark_color": "purple"}}"#)?;
        assert!(matches!(
            StripesConfig::from_json_file(file.path()),
            Err(ConfigError::ConfigParse(..))
        ));
        Ok(())
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let window = StripesConfig::builder()
            .copy_start_year(2000)
            .copy_end_year(1990)
            .build();
        assert!(matches!(
            window.validate(),
            Err(ConfigError::InvalidCopyWindow {
                start: 2000,
                end: 1990
            })
        ));

        let height = StripesConfig::builder().scenario_row_height(0.0).build();
        assert!(matches!(
            height.validate(),
            Err(ConfigError::InvalidHeight {
                field: "scenario_row_height",
                ..
            })
        ));

        let size = StripesConfig::builder().image_size((0, 10)).build();
        assert!(matches!(
            size.validate(),
            Err(ConfigError::InvalidImageSize(0, 10))
        ));
    }

    #[test]
    fn test_validate_rejects_extreme_years_and_horizon() {
        let start = StripesConfig::builder().copy_start_year(i32::MIN).build();
        assert!(matches!(
            start.validate(),
            Err(ConfigError::YearOutOfRange {
                field: "copy_start_year",
                value: i32::MIN,
                ..
            })
        ));

        let end = StripesConfig::builder().copy_end_year(i32::MAX).build();
        assert!(matches!(
            end.validate(),
            Err(ConfigError::YearOutOfRange {
                field: "copy_end_year",
                ..
            })
        ));

        let horizon = StripesConfig::builder().horizon_years(i32::MAX).build();
        assert!(matches!(
            horizon.validate(),
            Err(ConfigError::InvalidHorizon {
                value: i32::MAX,
                max: MAX_HORIZON_YEARS
            })
        ));

        let longest = StripesConfig::builder()
            .horizon_years(MAX_HORIZON_YEARS)
            .build();
        assert!(longest.validate().is_ok());
        let negative = StripesConfig::builder().horizon_years(-5).build();
        assert!(negative.validate().is_ok());
    }
}
