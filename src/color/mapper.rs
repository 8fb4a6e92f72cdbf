//! Maps anomaly values onto a two-gradient color scale with a seam at the middle of the range.

use crate::color::gradient::Gradient;
use crate::color::rgb::Rgb;
use ordered_float::OrderedFloat;

/// The global value range the color scale is stretched over.
///
/// Must be computed after every series that will be colored is final, since
/// each stripe's color depends on the global extrema.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorRange {
    pub min: f64,
    pub max: f64,
}

impl ColorRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Extrema over all finite values. Returns `None` when there are none.
    pub fn from_values<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        let mut extrema: Option<(OrderedFloat<f64>, OrderedFloat<f64>)> = None;
        for v in values.into_iter().filter(|v| v.is_finite()).map(OrderedFloat) {
            extrema = Some(match extrema {
                None => (v, v),
                Some((lo, hi)) => (lo.min(v), hi.max(v)),
            });
        }
        extrema.map(|(lo, hi)| Self::new(lo.into_inner(), hi.into_inner()))
    }

    /// Position of `value` inside the range, clamped to `[0, 1]`.
    ///
    /// A degenerate range (`min == max`) and non-finite values normalize to `0`.
    pub fn normalize(&self, value: f64) -> f64 {
        let span = self.max - self.min;
        if span == 0.0 || !span.is_finite() {
            return 0.0;
        }
        let norm = (value - self.min) / span;
        if norm.is_nan() {
            0.0
        } else {
            norm.clamp(0.0, 1.0)
        }
    }
}

/// Which of the two gradients a value was routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradientHalf {
    Lower,
    Upper,
}

/// Blends two gradients: the lower half of the range samples `lower`, the upper half `upper`.
///
/// A normalized value of exactly `0.5` goes to the lower gradient at fraction `1.0`.
///
/// # Examples
///
/// ```
/// use warming_stripes::{ColorMapper, ColorRange, Gradient, Rgb};
///
/// let mapper = ColorMapper::new(
///     ColorRange::new(-1.0, 3.0),
///     Gradient::two_color(Rgb(0, 0, 255), Rgb(255, 0, 0)),
///     Gradient::two_color(Rgb(255, 0, 0), Rgb(0, 0, 0)),
/// );
/// assert_eq!(mapper.map(-1.0), Rgb(0, 0, 255));
/// assert_eq!(mapper.map(1.0), Rgb(255, 0, 0));
/// assert_eq!(mapper.map(3.0), Rgb(0, 0, 0));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ColorMapper {
    range: ColorRange,
    lower: Gradient,
    upper: Gradient,
}

impl ColorMapper {
    pub fn new(range: ColorRange, lower: Gradient, upper: Gradient) -> Self {
        Self {
            range,
            lower,
            upper,
        }
    }

    pub fn range(&self) -> ColorRange {
        self.range
    }

    /// The gradient half a value falls in, and the fraction it samples there.
    pub fn locate(&self, value: f64) -> (GradientHalf, f64) {
        let norm = self.range.normalize(value);
        if norm <= 0.5 {
            (GradientHalf::Lower, norm * 2.0)
        } else {
            (GradientHalf::Upper, (norm - 0.5) * 2.0)
        }
    }

    pub fn map(&self, value: f64) -> Rgb {
        match self.locate(value) {
            (GradientHalf::Lower, t) => self.lower.sample(t),
            (GradientHalf::Upper, t) => self.upper.sample(t),
        }
    }
}

/// One-shot form of [`ColorMapper::map`].
pub fn blend_color(value: f64, min: f64, max: f64, lower: &Gradient, upper: &Gradient) -> Rgb {
    match ColorRange::new(min, max).normalize(value) {
        norm if norm <= 0.5 => lower.sample(norm * 2.0),
        norm => upper.sample((norm - 0.5) * 2.0),
    }
}
