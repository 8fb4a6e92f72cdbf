//! Parses the whitespace-delimited anomaly table into a [`TemperatureSeries`].

use crate::types::temperature_series::{AnomalyPoint, TemperatureSeries};
use log::debug;

/// Parses `year anomaly ...` rows, skipping comments, blank lines and malformed rows.
///
/// The year may be written as a real number and is truncated toward zero.
/// Rows whose first two fields do not parse, whose year does not fit an `i32`,
/// or whose anomaly is not finite are dropped without error. Input order is kept.
///
/// # Examples
///
/// ```
/// use warming_stripes::{parse_series, AnomalyPoint};
///
/// let series = parse_series("%comment\n2020 1.23\nbadrow\n2021 1.45\n", '%');
/// assert_eq!(
///     series.points(),
///     [AnomalyPoint::new(2020, 1.23), AnomalyPoint::new(2021, 1.45)]
/// );
/// ```
pub fn parse_series(text: &str, comment_marker: char) -> TemperatureSeries {
    text.lines()
        .enumerate()
        .filter(|(_, line)| {
            let trimmed = line.trim();
            !trimmed.is_empty() && !trimmed.starts_with(comment_marker)
        })
        .filter_map(|(number, line)| {
            let point = parse_row(line);
            if point.is_none() {
                debug!("Skipping malformed row {}: {:?}", number + 1, line);
            }
            point
        })
        .collect()
}

fn parse_row(line: &str) -> Option<AnomalyPoint> {
    let mut fields = line.split_whitespace();
    let year = fields.next()?.parse::<f64>().ok()?.trunc();
    let anomaly = fields.next()?.parse::<f64>().ok()?;
    if !year.is_finite() || year < i32::MIN as f64 || year > i32::MAX as f64 {
        return None;
    }
    if !anomaly.is_finite() {
        return None;
    }
    Some(AnomalyPoint::new(year as i32, anomaly))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drops_comments_and_bad_rows() {
        let series = parse_series("%comment\n2020 1.23\nbadrow\n2021 1.45\n", '%');
        assert_eq!(
            series.points(),
            [AnomalyPoint::new(2020, 1.23), AnomalyPoint::new(2021, 1.45)]
        );
    }

    #[test]
    fn test_berkeley_style_block() {
        let text = "\
% This file contains a brief summary of the changes in Earth's global average
% surface temperature estimated by combining the Berkeley Earth land-surface
%
%                 Annual Anomaly        Five-year Anomaly
% Year, Anomaly,  Unc.,        Anomaly, Unc.

  1850    -0.436     0.098        NaN       NaN
  1851    -0.335     0.128        NaN       NaN

  1852    -0.331     0.143     -0.373     0.080
";
        let series = parse_series(text, '%');
        assert_eq!(series.years(), [1850, 1851, 1852]);
        assert_eq!(series.anomalies(), [-0.436, -0.335, -0.331]);
    }

    #[test]
    fn test_fractional_years_truncate() {
        let series = parse_series("1850.917 0.1\n-3.5 0.2\n", '%');
        assert_eq!(series.years(), [1850, -3]);
    }

    #[test]
    fn test_rejects_missing_or_non_finite_fields() {
        let series = parse_series("1850\n1851 NaN\n1852 inf\nabc 0.1\n1e20 0.3\n1853 x\n", '%');
        assert!(series.is_empty());
    }

    #[test]
    fn test_custom_comment_marker_and_order_kept() {
        let series = parse_series("# header\n2001 0.5\n2000 0.4\n", '#');
        assert_eq!(series.years(), [2001, 2000]);
    }
}
