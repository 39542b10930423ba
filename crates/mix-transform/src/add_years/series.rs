//! 1-D year-series interpolation.
//!
//! A series is one parameter restricted to a single fixing of its non-time
//! dimensions, pivoted to a year-indexed vector. `value_at` produces the
//! value at a new year under the horizon extender's policy flags.

use std::collections::BTreeMap;

use tracing::debug;

/// Policy flags governing one interpolation pass.
#[derive(Debug, Clone, Copy)]
pub struct SeriesPolicy {
    /// Extrapolation beyond the series' data range is permitted. Interior
    /// interpolation is always allowed.
    pub extrapolate: bool,
    /// With a single data point on the relevant side, copy it instead of
    /// refusing to extrapolate.
    pub bound_extend: bool,
    /// Replace a sign-changed extrapolated value by `reference * factor`.
    pub extrapol_neg: Option<f64>,
}

impl SeriesPolicy {
    /// Unrestricted policy, used for auxiliary lookups such as reading a
    /// lifetime at an off-grid vintage.
    pub fn permissive() -> Self {
        Self {
            extrapolate: true,
            bound_extend: true,
            extrapol_neg: None,
        }
    }
}

/// Value of a series at `year`.
///
/// Years inside the data range interpolate linearly between the adjacent
/// data years; an infinite neighbor wins over interpolation. Years outside
/// the range extrapolate from the two nearest data years when the policy
/// permits, with the sign guard applied against the nearest data point.
/// Returns `None` when no value can be produced.
pub fn value_at(points: &BTreeMap<i32, f64>, year: i32, policy: &SeriesPolicy) -> Option<f64> {
    if let Some(value) = points.get(&year) {
        return Some(*value);
    }
    let below = points.range(..year).next_back().map(|(&y, &v)| (y, v));
    let above = points.range(year..).next().map(|(&y, &v)| (y, v));
    match (below, above) {
        (Some(lo), Some(hi)) => {
            if lo.1.is_infinite() {
                return Some(lo.1);
            }
            if hi.1.is_infinite() {
                return Some(hi.1);
            }
            Some(lerp(lo, hi, year))
        }
        (Some(nearest), None) | (None, Some(nearest)) => {
            if !policy.extrapolate {
                return None;
            }
            let second = if below.is_some() {
                points.range(..nearest.0).next_back()
            } else {
                points.range(nearest.0 + 1..).next()
            };
            match second {
                None => policy.bound_extend.then_some(nearest.1),
                Some((&y2, &v2)) => {
                    if nearest.1.is_infinite() || v2.is_infinite() {
                        return Some(nearest.1);
                    }
                    let value = lerp((y2, v2), nearest, year);
                    Some(guard_sign(value, nearest.1, policy))
                }
            }
        }
        (None, None) => None,
    }
}

fn lerp((x0, v0): (i32, f64), (x1, v1): (i32, f64), x: i32) -> f64 {
    v0 + (v1 - v0) * ((x - x0) as f64) / ((x1 - x0) as f64)
}

/// Apply the `extrapol_neg` guard: an extrapolated value whose sign differs
/// from the nearest existing value is pulled back to `reference * factor`.
pub fn guard_sign(value: f64, reference: f64, policy: &SeriesPolicy) -> f64 {
    match policy.extrapol_neg {
        Some(factor) if value * reference < 0.0 => {
            let guarded = reference * factor;
            debug!(value, reference, guarded, "extrapolation changed sign; damping");
            guarded
        }
        _ => value,
    }
}
