//! How the copied historical segment is aligned and whether its fluctuation is replayed.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where the alignment offset comes from and what it is applied to.
///
/// Under both policies the projection continues from the last value of the
/// aligned segment, and the offset enters the projected values exactly once
/// (through the ramp's start anchor).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OffsetPolicy {
    /// `offset = last - first` of the segment, and the whole segment is shifted
    /// up by it before being drawn and replayed.
    #[default]
    Difference,
    /// `offset = last` value of the segment. The segment is drawn unshifted.
    LastValue,
}

impl OffsetPolicy {
    /// Alignment offset for a non-empty segment.
    pub fn offset(self, segment: &[f64]) -> f64 {
        match (segment.first(), segment.last()) {
            (Some(first), Some(last)) => match self {
                OffsetPolicy::Difference => last - first,
                OffsetPolicy::LastValue => *last,
            },
            _ => 0.0,
        }
    }

    /// The segment as it is drawn and replayed.
    pub fn align(self, segment: &[f64], offset: f64) -> Vec<f64> {
        match self {
            OffsetPolicy::Difference => segment.iter().map(|v| v + offset).collect(),
            OffsetPolicy::LastValue => segment.to_vec(),
        }
    }
}

impl fmt::Display for OffsetPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OffsetPolicy::Difference => write!(f, "difference"),
            OffsetPolicy::LastValue => write!(f, "last_value"),
        }
    }
}

/// Whether year-to-year historical variability is layered on top of the ramp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FluctuationMode {
    /// Repeat the aligned segment's deviations from its first value over the horizon.
    #[default]
    Tiled,
    /// Use the ramp alone.
    RampOnly,
}
