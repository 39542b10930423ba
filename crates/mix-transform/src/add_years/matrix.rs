//! 2-D (vintage x active year) interpolation.
//!
//! Parameters with both `year_vtg` and `year_act` dimensions are viewed per
//! series as a matrix of yv-indexed rows and ya-indexed columns. Extension
//! to the enlarged horizon runs in three passes:
//!
//! 1. transition-period fix-up where the period step size changes,
//! 2. new active years filled along each existing vintage row,
//! 3. new vintage rows blended from the adjacent existing rows.
//!
//! Pass 3 aligns rows by *age* (index offset from the vintage in the union
//! year list) rather than by calendar column, so diagonal data such as
//! `var_cost[y, y]` interpolates to the new diagonal cells. Two masks apply
//! to every emitted cell: the triangular `ya >= yv` shape, and the lifetime
//! window computed from cumulative `duration_period`.

use std::collections::BTreeMap;

use mix_core::horizon::DurationSum;

use super::series::{guard_sign, value_at, SeriesPolicy};

/// One series as yv-indexed rows of ya-indexed columns.
pub type Matrix = BTreeMap<i32, BTreeMap<i32, f64>>;

/// Horizon context shared by all series of one add-years invocation.
pub struct MatrixContext<'a> {
    /// Source horizon Y, sorted.
    pub source_years: &'a [i32],
    /// Enlarged horizon Y ∪ Y', sorted.
    pub union_years: &'a [i32],
    /// New periods Y', sorted.
    pub new_years: &'a [i32],
    /// Cumulative durations over the enlarged horizon.
    pub sums: &'a DurationSum,
    /// Technical lifetime by vintage for this series' (node, technology),
    /// read from the already-extended target. `None` for series whose
    /// indices carry no technology, or with no declared lifetime.
    pub lifetimes: Option<&'a BTreeMap<i32, f64>>,
    pub policy: SeriesPolicy,
}

impl MatrixContext<'_> {
    fn lifetime_at(&self, yv: i32) -> Option<f64> {
        let lifetimes = self.lifetimes?;
        value_at(lifetimes, yv, &SeriesPolicy::permissive())
    }

    /// Lifetime window mask; falls back to the triangular shape when no
    /// lifetime is declared.
    fn within_window(&self, yv: i32, ya: i32) -> bool {
        match self.lifetime_at(yv) {
            Some(lifetime) => self.sums.within_lifetime(yv, ya, lifetime),
            None => ya >= yv,
        }
    }
}

/// Extend one series matrix to the enlarged horizon. The result contains
/// the (possibly realigned) source cells plus all newly produced cells.
pub fn extend_matrix(source: &Matrix, ctx: &MatrixContext) -> Matrix {
    let mut matrix = source.clone();
    realign_step_change(&mut matrix, ctx);
    extend_active_years(&mut matrix, ctx);
    extend_vintages(&mut matrix, ctx);
    matrix
}

/// Boundary year at which the period step size changes, and the step delta.
fn step_change(years: &[i32]) -> Option<(i32, i32)> {
    let diffs: Vec<i32> = years.windows(2).map(|w| w[1] - w[0]).collect();
    diffs
        .windows(2)
        .enumerate()
        .find(|(_, w)| w[0] != w[1])
        .map(|(i, w)| (years[i + 1], w[1] - w[0]))
}

/// Pass 1: when the period step changes before the first new year, move
/// cells past the change point back by the step delta, but only where the
/// move repairs a lifetime-window violation. Series without a declared
/// lifetime, or whose lifetime does not exceed the smallest new step, are
/// left alone.
fn realign_step_change(matrix: &mut Matrix, ctx: &MatrixContext) {
    let Some(&first_new) = ctx.new_years.first() else {
        return;
    };
    let Some((change_year, delta)) = step_change(ctx.source_years) else {
        return;
    };
    if change_year >= first_new {
        return;
    }
    let Some(lifetimes) = ctx.lifetimes else {
        return;
    };
    let min_step = ctx
        .union_years
        .windows(2)
        .map(|w| w[1] - w[0])
        .min()
        .unwrap_or(0);
    let max_lifetime = lifetimes.values().copied().fold(f64::NEG_INFINITY, f64::max);
    if max_lifetime <= min_step as f64 {
        return;
    }

    for (&yv, row) in matrix.iter_mut() {
        let Some(lifetime) = ctx.lifetime_at(yv) else {
            continue;
        };
        let shifted: Vec<i32> = row.keys().copied().filter(|&ya| ya >= change_year).collect();
        for ya in shifted {
            let target = ya - delta;
            if row.contains_key(&target) || !ctx.union_years.contains(&target) {
                continue;
            }
            let violates = !ctx.sums.within_lifetime(yv, ya, lifetime);
            let repairs = ctx.sums.within_lifetime(yv, target, lifetime);
            if violates && repairs {
                if let Some(value) = row.remove(&ya) {
                    row.insert(target, value);
                }
            }
        }
    }
}

/// Pass 2: fill each new active year along existing vintage rows with the
/// 1-D rules, inside the lifetime window. Values extrapolated past a row's
/// last column come from its two largest columns (phase-out fallback).
fn extend_active_years(matrix: &mut Matrix, ctx: &MatrixContext) {
    for (&yv, row) in matrix.iter_mut() {
        let mut added = Vec::new();
        for &year in ctx.new_years {
            if year < yv || row.contains_key(&year) || !ctx.within_window(yv, year) {
                continue;
            }
            if let Some(value) = value_at(row, year, &ctx.policy) {
                added.push((year, value));
            }
        }
        row.extend(added);
    }
}

/// Pass 3: produce a row for each new vintage by blending the adjacent
/// existing rows age-by-age, where a cell's age is its index offset from
/// the vintage in the union year list. Interior vintages blend with a
/// distance weight; vintages outside the existing range extrapolate from
/// the two nearest rows under the extrapolation permission.
fn extend_vintages(matrix: &mut Matrix, ctx: &MatrixContext) {
    let existing: Vec<i32> = matrix.keys().copied().collect();
    if existing.is_empty() {
        return;
    }
    let index: BTreeMap<i32, usize> = ctx
        .union_years
        .iter()
        .enumerate()
        .map(|(i, &y)| (y, i))
        .collect();

    for &yv in ctx.new_years {
        if matrix.contains_key(&yv) {
            continue;
        }
        let below = existing.iter().rev().find(|&&y| y < yv).copied();
        let above = existing.iter().find(|&&y| y > yv).copied();
        let ages = match (below, above) {
            (Some(lo), Some(hi)) => blend_rows(matrix, &index, lo, hi, yv),
            (Some(last), None) => {
                if !ctx.policy.extrapolate {
                    continue;
                }
                let second = existing.iter().rev().find(|&&y| y < last).copied();
                extrapolate_row(matrix, &index, last, second, yv, ctx)
            }
            (None, Some(first)) => {
                if !ctx.policy.extrapolate {
                    continue;
                }
                let second = existing.iter().find(|&&y| y > first).copied();
                extrapolate_row(matrix, &index, first, second, yv, ctx)
            }
            (None, None) => continue,
        };

        let Some(&base) = index.get(&yv) else {
            continue;
        };
        let mut row = BTreeMap::new();
        for (age, value) in ages {
            let Some(&ya) = ctx.union_years.get(base + age) else {
                continue;
            };
            if ctx.within_window(yv, ya) {
                row.insert(ya, value);
            }
        }
        if !row.is_empty() {
            matrix.insert(yv, row);
        }
    }
}

/// A row keyed by age instead of calendar year. Columns not on the union
/// grid, or before the vintage, are dropped.
fn age_profile(
    matrix: &Matrix,
    index: &BTreeMap<i32, usize>,
    yv: i32,
) -> BTreeMap<usize, f64> {
    let Some(row) = matrix.get(&yv) else {
        return BTreeMap::new();
    };
    let Some(&base) = index.get(&yv) else {
        return BTreeMap::new();
    };
    row.iter()
        .filter_map(|(&ya, &value)| {
            index
                .get(&ya)
                .and_then(|&i| i.checked_sub(base))
                .map(|age| (age, value))
        })
        .collect()
}

/// Distance-weighted blend of two existing rows over their common ages.
fn blend_rows(
    matrix: &Matrix,
    index: &BTreeMap<i32, usize>,
    lo: i32,
    hi: i32,
    yv: i32,
) -> BTreeMap<usize, f64> {
    let lo_ages = age_profile(matrix, index, lo);
    let hi_ages = age_profile(matrix, index, hi);
    let weight = (yv - lo) as f64 / (hi - lo) as f64;
    let mut out = BTreeMap::new();
    for (&age, &lo_value) in &lo_ages {
        let Some(&hi_value) = hi_ages.get(&age) else {
            continue;
        };
        let value = if lo_value.is_infinite() {
            lo_value
        } else if hi_value.is_infinite() {
            hi_value
        } else {
            lo_value + (hi_value - lo_value) * weight
        };
        out.insert(age, value);
    }
    out
}

/// Two-row linear extrapolation for a vintage outside the existing range;
/// with a single existing row, copy its profile under `bound_extend`.
fn extrapolate_row(
    matrix: &Matrix,
    index: &BTreeMap<i32, usize>,
    nearest: i32,
    second: Option<i32>,
    yv: i32,
    ctx: &MatrixContext,
) -> BTreeMap<usize, f64> {
    let nearest_ages = age_profile(matrix, index, nearest);
    let Some(second) = second else {
        return if ctx.policy.bound_extend {
            nearest_ages
        } else {
            BTreeMap::new()
        };
    };
    let second_ages = age_profile(matrix, index, second);
    let slope = (yv - nearest) as f64 / (nearest - second) as f64;
    let mut out = BTreeMap::new();
    for (&age, &near_value) in &nearest_ages {
        let Some(&second_value) = second_ages.get(&age) else {
            continue;
        };
        let value = if near_value.is_infinite() || second_value.is_infinite() {
            near_value
        } else {
            guard_sign(
                near_value + (near_value - second_value) * slope,
                near_value,
                &ctx.policy,
            )
        };
        out.insert(age, value);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix(rows: &[(i32, &[(i32, f64)])]) -> Matrix {
        rows.iter()
            .map(|(yv, cols)| (*yv, cols.iter().copied().collect()))
            .collect()
    }

    fn sums(years: &[i32], step: f64) -> DurationSum {
        DurationSum::new(years.iter().map(|&y| (y, step)).collect())
    }

    #[test]
    fn diagonal_series_interpolates_to_new_diagonal() {
        // var_cost[y, y] = 1, 2, 3 with lifetime 10 everywhere.
        let source = matrix(&[
            (2020, &[(2020, 1.0)]),
            (2030, &[(2030, 2.0)]),
            (2040, &[(2040, 3.0)]),
        ]);
        let union = [2020, 2025, 2030, 2035, 2040];
        let lifetimes: BTreeMap<i32, f64> = union.iter().map(|&y| (y, 10.0)).collect();
        let sums = sums(&union, 5.0);
        let ctx = MatrixContext {
            source_years: &[2020, 2030, 2040],
            union_years: &union,
            new_years: &[2025, 2035],
            sums: &sums,
            lifetimes: Some(&lifetimes),
            policy: SeriesPolicy {
                extrapolate: false,
                bound_extend: false,
                extrapol_neg: None,
            },
        };
        let extended = extend_matrix(&source, &ctx);
        assert_eq!(extended[&2025][&2025], 1.5);
        assert_eq!(extended[&2035][&2035], 2.5);
        // Source cells survive untouched.
        assert_eq!(extended[&2020][&2020], 1.0);
        assert_eq!(extended[&2040][&2040], 3.0);
    }

    #[test]
    fn lifetime_mask_cuts_cells_at_cumulative_duration() {
        // Vintage 2020 lives 10 years on a 10-year grid: active in 2020 only.
        let source = matrix(&[(2020, &[(2020, 1.0), (2030, 1.0)])]);
        let union = [2020, 2025, 2030];
        let lifetimes: BTreeMap<i32, f64> = [(2020, 10.0)].into();
        let sums = DurationSum::new([(2020, 5.0), (2025, 5.0), (2030, 10.0)].into());
        let ctx = MatrixContext {
            source_years: &[2020, 2030],
            union_years: &union,
            new_years: &[2025],
            sums: &sums,
            lifetimes: Some(&lifetimes),
            policy: SeriesPolicy {
                extrapolate: true,
                bound_extend: true,
                extrapol_neg: None,
            },
        };
        let extended = extend_matrix(&source, &ctx);
        // 2020 + 5 < 10: inside the window; interpolated along the row.
        assert_eq!(extended[&2020][&2025], 1.0);
        // New vintage 2025 with no row above: copied profile, masked at
        // cumulative duration >= lifetime.
        assert!(extended
            .get(&2025)
            .map(|row| row.keys().all(|&ya| ya >= 2025))
            .unwrap_or(true));
    }

    #[test]
    fn new_active_years_respect_extrapolation_permission() {
        let source = matrix(&[(2020, &[(2020, 1.0), (2030, 2.0)])]);
        let union = [2020, 2030, 2040];
        let sums = sums(&union, 10.0);
        let mut ctx = MatrixContext {
            source_years: &[2020, 2030],
            union_years: &union,
            new_years: &[2040],
            sums: &sums,
            lifetimes: None,
            policy: SeriesPolicy {
                extrapolate: false,
                bound_extend: false,
                extrapol_neg: None,
            },
        };
        let refused = extend_matrix(&source, &ctx);
        assert!(!refused[&2020].contains_key(&2040));

        ctx.policy.extrapolate = true;
        let extended = extend_matrix(&source, &ctx);
        assert_eq!(extended[&2020][&2040], 3.0);
    }

    #[test]
    fn step_change_detection() {
        assert_eq!(step_change(&[2020, 2030, 2040]), None);
        assert_eq!(step_change(&[2020, 2025, 2030, 2040]), Some((2030, 5)));
        assert_eq!(step_change(&[2020, 2030, 2050]), Some((2030, 10)));
        assert_eq!(step_change(&[2020]), None);
    }

    #[test]
    fn transition_fixup_moves_overhanging_cells() {
        // 5-year steps switch to 10-year at 2040; the vintage-2030 cell at
        // 2050 overshoots a 20-year lifetime but fits at 2045.
        let source = matrix(&[(2030, &[(2030, 1.0), (2050, 1.0)])]);
        let union = [2030, 2035, 2040, 2045, 2050];
        let lifetimes: BTreeMap<i32, f64> = [(2030, 20.0)].into();
        let sums = DurationSum::new(
            [(2030, 5.0), (2035, 5.0), (2040, 5.0), (2045, 5.0), (2050, 10.0)].into(),
        );
        let ctx = MatrixContext {
            source_years: &[2030, 2035, 2040, 2050],
            union_years: &union,
            new_years: &[2045],
            sums: &sums,
            lifetimes: Some(&lifetimes),
            policy: SeriesPolicy {
                extrapolate: false,
                bound_extend: false,
                extrapol_neg: None,
            },
        };
        let extended = extend_matrix(&source, &ctx);
        assert!(!extended[&2030].contains_key(&2050));
        assert_eq!(extended[&2030][&2045], 1.0);
    }

    #[test]
    fn vintage_extrapolation_uses_two_rows_and_sign_guard() {
        let source = matrix(&[(2020, &[(2020, 2.0)]), (2030, &[(2030, 0.5)])]);
        let union = [2020, 2030, 2040];
        let sums = sums(&union, 10.0);
        let ctx = MatrixContext {
            source_years: &[2020, 2030],
            union_years: &union,
            new_years: &[2040],
            sums: &sums,
            lifetimes: None,
            policy: SeriesPolicy {
                extrapolate: true,
                bound_extend: false,
                extrapol_neg: Some(0.5),
            },
        };
        let extended = extend_matrix(&source, &ctx);
        // Raw extrapolation gives -1.0; the guard pulls it to 0.5 * 0.5.
        assert_eq!(extended[&2040][&2040], 0.25);
    }

    #[test]
    fn empty_series_stays_empty() {
        let union = [2020, 2030];
        let sums = sums(&union, 10.0);
        let ctx = MatrixContext {
            source_years: &[2020],
            union_years: &union,
            new_years: &[2030],
            sums: &sums,
            lifetimes: None,
            policy: SeriesPolicy {
                extrapolate: true,
                bound_extend: true,
                extrapol_neg: None,
            },
        };
        assert!(extend_matrix(&Matrix::new(), &ctx).is_empty());
    }
}
