//! Piecewise-linear color gradients sampled by a fraction in `[0, 1]`.

use crate::color::rgb::Rgb;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Moreland's diverging blue-to-red map, 33 evenly spaced stops.
const COOLWARM_STOPS: [Rgb; 33] = [
    Rgb(59, 76, 192),
    Rgb(68, 90, 204),
    Rgb(77, 104, 215),
    Rgb(87, 117, 225),
    Rgb(98, 130, 234),
    Rgb(108, 142, 241),
    Rgb(119, 154, 247),
    Rgb(130, 165, 251),
    Rgb(141, 176, 254),
    Rgb(152, 185, 255),
    Rgb(163, 194, 255),
    Rgb(174, 201, 253),
    Rgb(184, 208, 249),
    Rgb(194, 213, 244),
    Rgb(204, 217, 238),
    Rgb(213, 219, 230),
    Rgb(221, 221, 221),
    Rgb(229, 216, 209),
    Rgb(236, 211, 197),
    Rgb(241, 204, 185),
    Rgb(245, 196, 173),
    Rgb(247, 187, 160),
    Rgb(247, 177, 148),
    Rgb(247, 166, 135),
    Rgb(244, 154, 123),
    Rgb(241, 141, 111),
    Rgb(236, 127, 99),
    Rgb(229, 112, 88),
    Rgb(222, 96, 77),
    Rgb(213, 80, 66),
    Rgb(203, 62, 56),
    Rgb(192, 40, 47),
    Rgb(180, 4, 38),
];

/// Named gradients that can be selected from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GradientPreset {
    /// Blue through light grey to red. Good for anomalies around a reference.
    #[default]
    Coolwarm,
}

impl GradientPreset {
    pub fn gradient(self) -> Gradient {
        match self {
            GradientPreset::Coolwarm => Gradient::from_stops(COOLWARM_STOPS.to_vec())
                .unwrap_or_else(|| Gradient::two_color(Rgb::BLACK, Rgb::WHITE)),
        }
    }

    fn name(self) -> &'static str {
        match self {
            GradientPreset::Coolwarm => "coolwarm",
        }
    }
}

impl fmt::Display for GradientPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A gradient made of evenly spaced color stops.
///
/// Sampling at `t` interpolates linearly between the two stops surrounding `t`.
/// Fractions outside `[0, 1]` are clamped to the end colors.
///
/// # Examples
///
/// ```
/// use warming_stripes::{Gradient, Rgb};
///
/// let g = Gradient::two_color(Rgb(0, 0, 0), Rgb(200, 0, 100));
/// assert_eq!(g.sample(0.0), Rgb(0, 0, 0));
/// assert_eq!(g.sample(0.5), Rgb(100, 0, 50));
/// assert_eq!(g.sample(1.0), Rgb(200, 0, 100));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Gradient {
    stops: Vec<Rgb>,
}

impl Gradient {
    /// Builds a gradient from at least one stop. Returns `None` for an empty list.
    pub fn from_stops(stops: Vec<Rgb>) -> Option<Self> {
        if stops.is_empty() {
            None
        } else {
            Some(Self { stops })
        }
    }

    pub fn two_color(start: Rgb, end: Rgb) -> Self {
        Self {
            stops: vec![start, end],
        }
    }

    pub fn start(&self) -> Rgb {
        self.stops[0]
    }

    pub fn end(&self) -> Rgb {
        self.stops[self.stops.len() - 1]
    }

    pub fn sample(&self, t: f64) -> Rgb {
        if self.stops.len() == 1 {
            return self.stops[0];
        }
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let segments = (self.stops.len() - 1) as f64;
        let position = t * segments;
        let index = (position.floor() as usize).min(self.stops.len() - 2);
        let local = position - index as f64;
        self.stops[index].lerp(self.stops[index + 1], local)
    }
}
