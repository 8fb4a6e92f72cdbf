//! Builds per-scenario future series from a historical segment and RCP targets.

use crate::config::scenario::{ScenarioTarget, ScenarioTargets};
use crate::projection::error::ProjectionError;
use crate::projection::policy::{FluctuationMode, OffsetPolicy};
use crate::projection::ramp::{WarmingRamp, FIRST_ANCHOR_YEAR, SECOND_ANCHOR_YEAR};
use crate::types::temperature_series::SeriesWindow;
use log::debug;
use polars::prelude::*;

/// Longest projection [`ProjectionSynthesizer::synthesize`] will build.
pub const MAX_HORIZON_YEARS: i32 = 10_000;

/// Repeats `segment` until exactly `len` values are produced.
///
/// # Examples
///
/// ```
/// use warming_stripes::tile;
///
/// assert_eq!(tile(&[1.0, 2.0, 3.0], 7), [1.0, 2.0, 3.0, 1.0, 2.0, 3.0, 1.0]);
/// assert_eq!(tile(&[1.0, 2.0, 3.0], 2), [1.0, 2.0]);
/// ```
pub fn tile(segment: &[f64], len: usize) -> Vec<f64> {
    segment.iter().copied().cycle().take(len).collect()
}

/// One scenario's projected values for consecutive years starting at `start_year`.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedSeries {
    pub name: String,
    pub start_year: i32,
    pub values: Vec<f64>,
}

impl ProjectedSeries {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn points(&self) -> impl Iterator<Item = (i32, f64)> + '_ {
        (self.start_year..)
            .zip(self.values.iter())
            .map(|(year, value)| (year, *value))
    }

    pub fn value_at(&self, year: i32) -> Option<f64> {
        let index = usize::try_from(year.checked_sub(self.start_year)?).ok()?;
        self.values.get(index).copied()
    }
}

/// The aligned historical segment plus every scenario's continuation.
#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    /// Offset chosen by the [`OffsetPolicy`].
    pub offset: f64,
    /// Value the projections continue from: the last aligned historical value.
    pub baseline: f64,
    /// The historical segment as drawn (shifted when the policy shifts it).
    pub historical: SeriesWindow,
    /// Projected years, shared by all scenarios.
    pub years: Vec<i32>,
    pub scenarios: Vec<ProjectedSeries>,
}

impl Projection {
    pub fn last_historical_year(&self) -> Option<i32> {
        self.historical.last_year()
    }

    pub fn scenario(&self, name: &str) -> Option<&ProjectedSeries> {
        self.scenarios.iter().find(|s| s.name == name)
    }

    /// Every value that will be colored: the aligned segment and all projections.
    pub fn colored_values(&self) -> impl Iterator<Item = f64> + '_ {
        self.historical
            .values
            .iter()
            .chain(self.scenarios.iter().flat_map(|s| s.values.iter()))
            .copied()
    }

    /// Projected years as rows, one `f64` column per scenario.
    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let mut columns: Vec<Column> = Vec::with_capacity(self.scenarios.len() + 1);
        columns.push(Series::new("year".into(), self.years.clone()).into());
        for scenario in &self.scenarios {
            columns.push(Series::new(scenario.name.as_str().into(), scenario.values.clone()).into());
        }
        DataFrame::new(columns)
    }
}

/// Turns a historical segment into scenario projections.
///
/// For segment values `seg` ending in `last_year`, each scenario's value at a
/// projected year `y` is
///
/// ```text
/// ramp(y) + fluctuation(y)
/// ramp       through (last_year, baseline), (2100, baseline + t2100), (2200, baseline + t2200)
/// baseline   = last value of the aligned segment
/// fluctuation = tile(aligned - aligned[0]) for FluctuationMode::Tiled, 0 for RampOnly
/// ```
///
/// so the alignment offset reaches the projection once, through `baseline`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProjectionSynthesizer {
    offset_policy: OffsetPolicy,
    fluctuation: FluctuationMode,
}

impl ProjectionSynthesizer {
    pub fn new(offset_policy: OffsetPolicy, fluctuation: FluctuationMode) -> Self {
        Self {
            offset_policy,
            fluctuation,
        }
    }

    /// Projected years after `last_year`: `horizon_years`, or through 2200 when unset.
    pub fn horizon_for(last_year: i32, horizon_years: Option<i32>) -> i32 {
        horizon_years.unwrap_or_else(|| SECOND_ANCHOR_YEAR.saturating_sub(last_year))
    }

    /// Projects every scenario `horizon_years` years past the segment's last year.
    ///
    /// A horizon of zero or less yields scenarios with no values.
    ///
    /// # Errors
    ///
    /// * [`ProjectionError::EmptySegment`] if `segment` has no values.
    /// * [`ProjectionError::AnchorOrder`] if the segment ends in or after 2100.
    /// * [`ProjectionError::HorizonTooLong`] if `horizon_years` exceeds [`MAX_HORIZON_YEARS`].
    pub fn synthesize(
        &self,
        segment: &SeriesWindow,
        targets: &ScenarioTargets,
        horizon_years: i32,
    ) -> Result<Projection, ProjectionError> {
        let last_year = match (segment.last_year(), segment.values.is_empty()) {
            (Some(year), false) => year,
            _ => return Err(ProjectionError::EmptySegment),
        };
        if last_year >= FIRST_ANCHOR_YEAR {
            return Err(ProjectionError::AnchorOrder {
                last_year,
                first: FIRST_ANCHOR_YEAR,
                second: SECOND_ANCHOR_YEAR,
            });
        }
        if horizon_years > MAX_HORIZON_YEARS {
            return Err(ProjectionError::HorizonTooLong {
                horizon: horizon_years,
                max: MAX_HORIZON_YEARS,
            });
        }

        let offset = self.offset_policy.offset(&segment.values);
        let aligned = self.offset_policy.align(&segment.values, offset);
        let baseline = aligned[aligned.len() - 1];
        let horizon = usize::try_from(horizon_years).unwrap_or(0);

        let fluctuation = match self.fluctuation {
            FluctuationMode::Tiled => {
                let start = aligned[0];
                let deviations: Vec<f64> = aligned.iter().map(|v| v - start).collect();
                tile(&deviations, horizon)
            }
            FluctuationMode::RampOnly => vec![0.0; horizon],
        };
        let years: Vec<i32> = (last_year + 1..).take(horizon).collect();

        debug!(
            "Projecting {} scenarios over {} years from {} (policy {}, offset {:.3}, baseline {:.3})",
            targets.len(),
            horizon,
            last_year,
            self.offset_policy,
            offset,
            baseline
        );

        let scenarios = targets
            .iter()
            .map(|target| project_scenario(target, last_year, baseline, &years, &fluctuation))
            .collect();

        Ok(Projection {
            offset,
            baseline,
            historical: SeriesWindow::new(segment.years.clone(), aligned),
            years,
            scenarios,
        })
    }
}

fn project_scenario(
    target: &ScenarioTarget,
    last_year: i32,
    baseline: f64,
    years: &[i32],
    fluctuation: &[f64],
) -> ProjectedSeries {
    let ramp = WarmingRamp::new(last_year, baseline, target.target_2100, target.target_2200);
    ProjectedSeries {
        name: target.name.clone(),
        start_year: last_year + 1,
        values: years
            .iter()
            .zip(fluctuation.iter())
            .map(|(year, f)| ramp.at(*year) + f)
            .collect(),
    }
}
