//! Piecewise-linear warming ramps through the scenario anchor years.

/// Year the first scenario target applies to.
pub const FIRST_ANCHOR_YEAR: i32 = 2100;
/// Year the second scenario target applies to.
pub const SECOND_ANCHOR_YEAR: i32 = 2200;

/// Linear interpolation of `x` over the control points `(xp, fp)`.
///
/// `xp` must be strictly increasing and as long as `fp`. Outside `[xp[0], xp[-1]]`
/// the nearest end value is returned. At a control point the stored value is
/// returned exactly.
pub fn interpolate(x: f64, xp: &[f64], fp: &[f64]) -> f64 {
    let n = xp.len().min(fp.len());
    if n == 0 {
        return f64::NAN;
    }
    if x <= xp[0] {
        return fp[0];
    }
    if x >= xp[n - 1] {
        return fp[n - 1];
    }
    // First control point strictly greater than x; 1 <= upper <= n - 1 here.
    let upper = xp[..n].partition_point(|&p| p <= x);
    let lower = upper - 1;
    if x == xp[lower] {
        return fp[lower];
    }
    let slope = (fp[upper] - fp[lower]) / (xp[upper] - xp[lower]);
    fp[lower] + (x - xp[lower]) * slope
}

/// A scenario's warming path: flat at `baseline` up to the last historical year,
/// then linear to `baseline + target_2100` at 2100 and `baseline + target_2200`
/// at 2200, flat afterwards.
///
/// # Examples
///
/// ```
/// use warming_stripes::WarmingRamp;
///
/// let ramp = WarmingRamp::new(2000, 1.0, 2.0, 3.0);
/// assert_eq!(ramp.at(2000), 1.0);
/// assert_eq!(ramp.at(2050), 2.0);
/// assert_eq!(ramp.at(2100), 3.0);
/// assert_eq!(ramp.at(2150), 3.5);
/// assert_eq!(ramp.at(2300), 4.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WarmingRamp {
    years: [f64; 3],
    values: [f64; 3],
}

impl WarmingRamp {
    /// `last_year` must be before [`FIRST_ANCHOR_YEAR`].
    pub fn new(last_year: i32, baseline: f64, target_2100: f64, target_2200: f64) -> Self {
        Self {
            years: [
                last_year as f64,
                FIRST_ANCHOR_YEAR as f64,
                SECOND_ANCHOR_YEAR as f64,
            ],
            values: [baseline, baseline + target_2100, baseline + target_2200],
        }
    }

    pub fn at(&self, year: i32) -> f64 {
        interpolate(year as f64, &self.years, &self.values)
    }
}
