//! What-if projection under a scaled treatment.
//!
//! Under a constant marginal effect, scaling every unit's treatment by `m`
//! moves the mean outcome by `(m - 1) * ate`. The multiplier range is display
//! metadata and is not enforced here.

use serde::{Deserialize, Serialize};

/// Upper bound on the number of points `sweep` returns.
pub const MAX_SWEEP_POINTS: usize = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CounterfactualProjection {
    pub baseline_mean: f64,
    pub ate: f64,
    pub multiplier: f64,
    pub projected_mean: f64,
}

impl CounterfactualProjection {
    pub fn new(baseline_mean: f64, ate: f64, multiplier: f64) -> Self {
        Self {
            baseline_mean,
            ate,
            multiplier,
            projected_mean: project(baseline_mean, ate, multiplier),
        }
    }

    /// Projected minus baseline.
    pub fn lift(&self) -> f64 {
        self.projected_mean - self.baseline_mean
    }
}

/// `baseline_mean + (multiplier - 1) * ate`. Exactly `baseline_mean` at 1.0.
pub fn project(baseline_mean: f64, ate: f64, multiplier: f64) -> f64 {
    baseline_mean + (multiplier - 1.0) * ate
}

/// Projections from `min` to `max` inclusive in `step` increments.
///
/// Points are computed as `min + i * step` to avoid accumulating error; the
/// last point is clamped to `max`. Empty if a bound is not finite, `step` is
/// not positive, or the range is inverted. At most [`MAX_SWEEP_POINTS`]
/// points are returned.
pub fn sweep(baseline_mean: f64, ate: f64, min: f64, max: f64, step: f64) -> Vec<CounterfactualProjection> {
    if !(min.is_finite() && max.is_finite()) || !(step > 0.0) || !(min <= max) {
        return Vec::new();
    }
    let count = ((max - min) / step + 1e-9).floor().min((MAX_SWEEP_POINTS - 1) as f64) as usize;
    (0..=count)
        .map(|i| (min + i as f64 * step).min(max))
        .map(|m| CounterfactualProjection::new(baseline_mean, ate, m))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_at_one() {
        assert_eq!(project(42.5, 0.1, 1.0), 42.5);
        assert_eq!(CounterfactualProjection::new(42.5, 0.1, 1.0).lift(), 0.0);
    }

    #[test]
    fn twenty_percent_more_spend() {
        let p = CounterfactualProjection::new(100.0, 0.1, 1.2);
        assert!((p.projected_mean - 100.02).abs() < 1e-12);
        assert!((p.lift() - 0.02).abs() < 1e-12);
    }

    #[test]
    fn sweep_covers_display_range() {
        let curve = sweep(10.0, 2.0, 0.5, 2.0, 0.05);
        assert_eq!(curve.len(), 31);
        assert_eq!(curve[0].multiplier, 0.5);
        assert!((curve[30].multiplier - 2.0).abs() < 1e-12);
        assert!((curve[0].projected_mean - 9.0).abs() < 1e-12);
        assert!(sweep(10.0, 2.0, 2.0, 0.5, 0.05).is_empty());
        assert!(sweep(10.0, 2.0, 0.5, 2.0, 0.0).is_empty());
    }

    #[test]
    fn sweep_is_bounded() {
        assert!(sweep(10.0, 2.0, 0.5, f64::INFINITY, 0.05).is_empty());
        assert!(sweep(10.0, 2.0, f64::NEG_INFINITY, 2.0, 0.05).is_empty());
        assert!(sweep(10.0, 2.0, 0.5, f64::NAN, 0.05).is_empty());

        let dense = sweep(10.0, 2.0, 0.0, 1e12, 1e-3);
        assert_eq!(dense.len(), MAX_SWEEP_POINTS);
        assert_eq!(dense[0].multiplier, 0.0);
    }
}
