//! The historical year/anomaly series and the copy window cut from it.

use polars::prelude::*;

const YEAR_COLUMN: &str = "year";
const ANOMALY_COLUMN: &str = "anomaly";

/// One year's global temperature anomaly, in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnomalyPoint {
    pub year: i32,
    pub anomaly: f64,
}

impl AnomalyPoint {
    pub fn new(year: i32, anomaly: f64) -> Self {
        Self { year, anomaly }
    }
}

/// An ordered year/anomaly series, read-only once loaded.
///
/// Years are expected to be ascending without duplicates, which holds for the
/// published dataset. The series keeps input order and does not enforce this.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TemperatureSeries {
    points: Vec<AnomalyPoint>,
}

impl TemperatureSeries {
    pub fn new(points: Vec<AnomalyPoint>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[AnomalyPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn years(&self) -> Vec<i32> {
        self.points.iter().map(|p| p.year).collect()
    }

    pub fn anomalies(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.anomaly).collect()
    }

    pub fn first_year(&self) -> Option<i32> {
        self.points.first().map(|p| p.year)
    }

    pub fn last_year(&self) -> Option<i32> {
        self.points.last().map(|p| p.year)
    }

    /// The points with `start <= year <= end`, in series order.
    ///
    /// # Examples
    ///
    /// ```
    /// use warming_stripes::{AnomalyPoint, TemperatureSeries};
    ///
    /// let series = TemperatureSeries::new(
    ///     (1850..1860).map(|y| AnomalyPoint::new(y, (y - 1850) as f64 * 0.1)).collect(),
    /// );
    /// let window = series.window(1848, 1852);
    /// assert_eq!(window.years, [1850, 1851, 1852]);
    /// assert_eq!(window.last_year(), Some(1852));
    /// ```
    pub fn window(&self, start: i32, end: i32) -> SeriesWindow {
        let (years, values) = self
            .points
            .iter()
            .filter(|p| (start..=end).contains(&p.year))
            .map(|p| (p.year, p.anomaly))
            .unzip();
        SeriesWindow { years, values }
    }

    /// Two-column frame: `year` (i32) and `anomaly` (f64).
    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        df!(
            YEAR_COLUMN => self.years(),
            ANOMALY_COLUMN => self.anomalies()
        )
    }

    /// Inverse of [`TemperatureSeries::to_dataframe`]. Rows with a null in either column are dropped.
    pub fn from_dataframe(df: &DataFrame) -> PolarsResult<Self> {
        let years = df.column(YEAR_COLUMN)?.i32()?;
        let anomalies = df.column(ANOMALY_COLUMN)?.f64()?;
        let points = years
            .into_iter()
            .zip(anomalies.into_iter())
            .filter_map(|(year, anomaly)| Some(AnomalyPoint::new(year?, anomaly?)))
            .collect();
        Ok(Self { points })
    }
}

impl FromIterator<AnomalyPoint> for TemperatureSeries {
    fn from_iter<I: IntoIterator<Item = AnomalyPoint>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// A contiguous slice of the historical series, by year.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SeriesWindow {
    pub years: Vec<i32>,
    pub values: Vec<f64>,
}

impl SeriesWindow {
    pub fn new(years: Vec<i32>, values: Vec<f64>) -> Self {
        Self { years, values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn first_year(&self) -> Option<i32> {
        self.years.first().copied()
    }

    pub fn last_year(&self) -> Option<i32> {
        self.years.last().copied()
    }
}
