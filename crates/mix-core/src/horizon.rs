//! Period arithmetic for the model horizon.
//!
//! Pure helpers shared by the horizon extender and the structural scenario
//! helpers: `duration_period` inference, cumulative durations between
//! vintage and active years, and the lifetime window predicates.

use std::collections::BTreeMap;

use crate::error::{MixError, MixResult};

/// Infer `duration_period` for a sorted horizon.
///
/// Each period's duration is the distance to its predecessor. The first
/// period's duration is the most common of the remaining differences (the
/// mode); a single-period horizon gets a duration of 1 year.
pub fn infer_duration_period(years: &[i32]) -> MixResult<Vec<(i32, i32)>> {
    if years.is_empty() {
        return Err(MixError::Schema("horizon has no periods".into()));
    }
    if years.windows(2).any(|w| w[0] >= w[1]) {
        return Err(MixError::Schema(
            "horizon periods must be strictly increasing".into(),
        ));
    }
    let diffs: Vec<i32> = years.windows(2).map(|w| w[1] - w[0]).collect();
    let first = if diffs.is_empty() {
        1
    } else {
        most_common_difference(&diffs)
    };
    let mut out = Vec::with_capacity(years.len());
    out.push((years[0], first));
    for (year, diff) in years[1..].iter().zip(diffs.iter()) {
        out.push((*year, *diff));
    }
    Ok(out)
}

/// Mode of a difference list; ties resolve to the smaller difference.
fn most_common_difference(diffs: &[i32]) -> i32 {
    let mut counts: BTreeMap<i32, usize> = BTreeMap::new();
    for d in diffs {
        *counts.entry(*d).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .max_by(|a, b| a.1.cmp(&b.1).then(b.0.cmp(&a.0)))
        .map(|(d, _)| d)
        .unwrap_or(1)
}

/// Cumulative `duration_period` over periods in `[yv, ya)`.
///
/// Precomputing this once per invocation (rather than tracking a lifetime
/// graph) is what the 2-D interpolation masks compare against.
#[derive(Debug, Clone)]
pub struct DurationSum {
    durations: BTreeMap<i32, f64>,
}

impl DurationSum {
    pub fn new(durations: BTreeMap<i32, f64>) -> Self {
        Self { durations }
    }

    /// Sum of period durations from `yv` up to but not including `ya`.
    pub fn between(&self, yv: i32, ya: i32) -> f64 {
        self.durations
            .range(yv..ya)
            .map(|(_, duration)| *duration)
            .sum()
    }

    /// True when a vintage of the given lifetime, built in `yv`, is still
    /// active in `ya`.
    pub fn within_lifetime(&self, yv: i32, ya: i32, lifetime: f64) -> bool {
        ya >= yv && self.between(yv, ya) < lifetime
    }
}

/// Active years for a vintage: all `ya >= yv` whose cumulative duration
/// from `yv` stays strictly below the lifetime.
pub fn years_active(years: &[i32], durations: &BTreeMap<i32, f64>, yv: i32, lifetime: f64) -> Vec<i32> {
    let sums = DurationSum::new(durations.clone());
    years
        .iter()
        .copied()
        .filter(|&ya| sums.within_lifetime(yv, ya, lifetime))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_inference_uses_mode_for_first_period() {
        // diffs [5, 5, 10] -> mode 5
        let inferred = infer_duration_period(&[2020, 2025, 2030, 2040]).unwrap();
        assert_eq!(
            inferred,
            vec![(2020, 5), (2025, 5), (2030, 5), (2040, 10)]
        );
    }

    #[test]
    fn duration_inference_uniform_horizon() {
        let inferred = infer_duration_period(&[2020, 2030, 2040]).unwrap();
        assert_eq!(inferred, vec![(2020, 10), (2030, 10), (2040, 10)]);
    }

    #[test]
    fn duration_inference_single_period_is_one_year() {
        assert_eq!(infer_duration_period(&[2020]).unwrap(), vec![(2020, 1)]);
    }

    #[test]
    fn duration_inference_rejects_unsorted() {
        assert!(infer_duration_period(&[2030, 2020]).is_err());
        assert!(infer_duration_period(&[]).is_err());
    }

    #[test]
    fn tie_break_prefers_smaller_difference() {
        let inferred = infer_duration_period(&[2020, 2025, 2035]).unwrap();
        assert_eq!(inferred[0], (2020, 5));
    }

    #[test]
    fn duration_sum_between_half_open() {
        let durations: BTreeMap<i32, f64> =
            [(2020, 10.0), (2030, 10.0), (2040, 10.0), (2050, 10.0)].into();
        let sums = DurationSum::new(durations);
        assert_eq!(sums.between(2020, 2020), 0.0);
        assert_eq!(sums.between(2020, 2030), 10.0);
        assert_eq!(sums.between(2020, 2040), 20.0);
        assert_eq!(sums.between(2030, 2050), 20.0);
    }

    #[test]
    fn years_active_matches_lifetime_window() {
        let years = [2020, 2030, 2040, 2050];
        let durations: BTreeMap<i32, f64> =
            [(2020, 10.0), (2030, 10.0), (2040, 10.0), (2050, 10.0)].into();
        assert_eq!(years_active(&years, &durations, 2020, 20.0), vec![2020, 2030]);
        assert_eq!(years_active(&years, &durations, 2030, 15.0), vec![2030, 2040]);
        assert!(years_active(&years, &durations, 2050, 0.0).is_empty());
    }
}
