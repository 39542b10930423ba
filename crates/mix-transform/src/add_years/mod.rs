//! Horizon extension: clone a scenario onto an enlarged set of periods.
//!
//! `add_years` takes a source scenario with horizon Y and a disjoint list
//! of new periods Y', and populates a target scenario whose horizon is
//! Y ∪ Y'. Sets are copied with the year structure merged; every
//! time-indexed parameter is interpolated or extrapolated onto the new
//! periods, honoring technical lifetimes for vintage-indexed data.

pub mod matrix;
pub mod series;

use std::collections::{BTreeMap, BTreeSet};

use anyhow::{bail, Result};
use tracing::{debug, info, warn};

use mix_core::horizon::DurationSum;
use mix_core::registry::{registry, ItemKind};
use mix_core::units::modal_unit;
use mix_core::{MixError, ParRow, Scenario};

use matrix::{extend_matrix, Matrix, MatrixContext};
use series::{value_at, SeriesPolicy};

/// Options of one horizon extension.
#[derive(Debug, Clone)]
pub struct AddYearsOptions {
    /// New periods Y', disjoint from the source horizon.
    pub years_new: Vec<i32>,
    /// Re-point `cat_year[firstmodelyear]` (and the MACRO base year, when
    /// present) to this period.
    pub firstyear_new: Option<i32>,
    /// Re-point `cat_year[lastmodelyear]` to this period.
    pub lastyear_new: Option<i32>,
    /// Also extend MACRO parameters.
    pub macro_mode: bool,
    /// Restrict to these parameters; `None` extends all.
    pub parameters: Option<Vec<String>>,
    /// Restrict to rows whose node columns fall in this list.
    pub regions: Option<Vec<String>>,
    /// Overwrite parameters that already have data on the target.
    pub rewrite: bool,
    /// Coerce values under one commodity to the commodity's modal unit.
    pub unit_check: bool,
    /// Sign-flip damping factor for extrapolated values.
    pub extrapol_neg: Option<f64>,
    /// Copy single data points instead of refusing to extrapolate.
    pub bound_extend: bool,
}

impl Default for AddYearsOptions {
    fn default() -> Self {
        Self {
            years_new: Vec::new(),
            firstyear_new: None,
            lastyear_new: None,
            macro_mode: false,
            parameters: None,
            regions: None,
            rewrite: true,
            unit_check: true,
            extrapol_neg: Some(0.5),
            bound_extend: true,
        }
    }
}

/// Extend `source` onto `target` with the horizon enlarged by
/// `opts.years_new`. The target is left checked in.
pub fn add_years(source: &Scenario, target: &mut Scenario, opts: &AddYearsOptions) -> Result<()> {
    let source_years = source.years()?;
    let mut new_years = opts.years_new.clone();
    new_years.sort_unstable();
    new_years.dedup();
    if let Some(overlap) = new_years.iter().find(|y| source_years.contains(y)) {
        return Err(MixError::Overlap(format!(
            "new period {overlap} already exists in the source horizon"
        ))
        .into());
    }
    if let Some(names) = &opts.parameters {
        for name in names {
            if registry().lookup(name).is_none() {
                bail!("unknown parameter '{name}' in the parameter filter");
            }
        }
    }

    let message = format!(
        "add years: {}",
        new_years
            .iter()
            .map(|y| y.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    );
    target.transact(&message, |target| {
        merge_sets(source, target, &source_years, &new_years, opts)?;
        extend_parameters(source, target, &source_years, &new_years, opts)
    })?;
    info!(
        source = %source.id(),
        target = %target.id(),
        years = ?new_years,
        "horizon extended"
    );
    Ok(())
}

/// First phase: copy all sets, with the year structure merged and the
/// horizon categories re-pointed.
fn merge_sets(
    source: &Scenario,
    target: &mut Scenario,
    source_years: &[i32],
    new_years: &[i32],
    opts: &AddYearsOptions,
) -> mix_core::MixResult<()> {
    let mut union: Vec<i32> = source_years.to_vec();
    union.extend_from_slice(new_years);
    union.sort_unstable();

    for name in source.item_names() {
        let Some(item) = registry().lookup(name) else {
            continue;
        };
        if !matches!(item.kind, ItemKind::Set | ItemKind::IndexedSet) {
            continue;
        }
        match name.as_str() {
            "year" => target.add_set(
                "year",
                union.iter().map(|y| vec![y.to_string()]).collect(),
            )?,
            "type_year" => {
                let mut rows = source.set_rows("type_year")?.to_vec();
                rows.extend(new_years.iter().map(|y| vec![y.to_string()]));
                target.add_set("type_year", rows)?;
            }
            "cat_year" => merge_cat_year(source, target, new_years, opts)?,
            _ => target.add_set(name, source.set_rows(name)?.to_vec())?,
        }
    }

    for required in ["year", "technology"] {
        if target
            .set_rows(required)
            .map(|rows| rows.is_empty())
            .unwrap_or(true)
        {
            return Err(MixError::Schema(format!(
                "set '{required}' is empty after the new-year merge"
            )));
        }
    }

    // The horizon helper owns duration_period; recompute it from scratch
    // over the merged horizon rather than interpolating it.
    let durations = mix_core::horizon::infer_duration_period(&union)?;
    target.clear_par("duration_period").or_else(|err| match err {
        MixError::NotFound(_) => Ok(()),
        other => Err(other),
    })?;
    target.add_par(
        "duration_period",
        durations
            .into_iter()
            .map(|(year, length)| ParRow::new(vec![year.to_string()], length as f64, "y"))
            .collect(),
    )?;
    Ok(())
}

/// `cat_year` with new self/cumulative categories and the first/last model
/// year re-pointed.
fn merge_cat_year(
    source: &Scenario,
    target: &mut Scenario,
    new_years: &[i32],
    opts: &AddYearsOptions,
) -> mix_core::MixResult<()> {
    let mut repointed: BTreeMap<&str, i32> = BTreeMap::new();
    if let Some(first) = opts.firstyear_new {
        repointed.insert("firstmodelyear", first);
        for macro_category in ["baseyear_macro", "initializeyear_macro"] {
            if source
                .set_rows("cat_year")?
                .iter()
                .any(|row| row[0] == macro_category)
            {
                repointed.insert(macro_category, first);
            }
        }
    }
    if let Some(last) = opts.lastyear_new {
        repointed.insert("lastmodelyear", last);
    }
    let firstmodelyear = opts.firstyear_new.or_else(|| source.firstmodelyear().ok());

    let mut rows: Vec<Vec<String>> = Vec::new();
    for row in source.set_rows("cat_year")? {
        if repointed.contains_key(row[0].as_str()) {
            continue;
        }
        // Cumulative entries strictly below the new firstmodelyear drop out.
        if row[0] == "cumulative" {
            if let (Some(first), Ok(year)) = (firstmodelyear, mix_core::parse_year(&row[1])) {
                if year < first {
                    continue;
                }
            }
        }
        rows.push(row.clone());
    }
    for (category, year) in &repointed {
        rows.push(vec![category.to_string(), year.to_string()]);
    }
    for &year in new_years {
        rows.push(vec![year.to_string(), year.to_string()]);
        if firstmodelyear.map(|first| year >= first).unwrap_or(true) {
            rows.push(vec!["cumulative".to_string(), year.to_string()]);
        }
    }
    target.add_set("cat_year", rows)
}

/// Second phase: interpolate every in-scope parameter onto the merged
/// horizon. `technical_lifetime` goes first so the vintage masks of all
/// later 2-D parameters see the extended lifetimes.
fn extend_parameters(
    source: &Scenario,
    target: &mut Scenario,
    source_years: &[i32],
    new_years: &[i32],
    opts: &AddYearsOptions,
) -> mix_core::MixResult<()> {
    let union_years = target.years()?;
    let sums = DurationSum::new(target.duration_period()?);
    let source_fmy = source.firstmodelyear().ok();
    let target_fmy = target.firstmodelyear().ok();

    let mut names: Vec<String> = source
        .item_names()
        .filter(|name| {
            registry()
                .lookup(name)
                .map(|item| item.kind == ItemKind::Parameter)
                .unwrap_or(false)
        })
        .filter(|name| name.as_str() != "duration_period")
        .filter(|name| !registry().is_macro_only(name) || opts.macro_mode)
        .filter(|name| {
            opts.parameters
                .as_ref()
                .map(|wanted| wanted.contains(name))
                .unwrap_or(true)
        })
        .cloned()
        .collect();
    names.sort_unstable();
    if let Some(pos) = names.iter().position(|n| n == "technical_lifetime") {
        let lifetime = names.remove(pos);
        names.insert(0, lifetime);
    }

    for name in &names {
        let occupied = target
            .par_rows(name)
            .map(|rows| !rows.is_empty())
            .unwrap_or(false);
        if occupied && !opts.rewrite {
            return Err(MixError::Schema(format!(
                "target already has data for '{name}' and rewrite is disabled"
            )));
        }
        if occupied {
            target.clear_par(name)?;
        }
        let ctx = ParameterContext {
            source_years,
            union_years: &union_years,
            new_years,
            sums: &sums,
            extrapolate: name.starts_with("historical_")
                || matches!((source_fmy, target_fmy), (Some(s), Some(t)) if s > t),
            opts,
        };
        if let Err(err) = extend_parameter(source, target, name, &ctx) {
            warn!(parameter = %name, %err, "skipping parameter");
        }
    }
    Ok(())
}

struct ParameterContext<'a> {
    source_years: &'a [i32],
    union_years: &'a [i32],
    new_years: &'a [i32],
    sums: &'a DurationSum,
    extrapolate: bool,
    opts: &'a AddYearsOptions,
}

impl ParameterContext<'_> {
    fn policy(&self) -> SeriesPolicy {
        SeriesPolicy {
            extrapolate: self.extrapolate,
            bound_extend: self.opts.bound_extend,
            extrapol_neg: self.opts.extrapol_neg,
        }
    }
}

fn extend_parameter(
    source: &Scenario,
    target: &mut Scenario,
    name: &str,
    ctx: &ParameterContext,
) -> mix_core::MixResult<()> {
    let item = registry()
        .lookup(name)
        .ok_or_else(|| MixError::Schema(format!("item '{name}' is not declared")))?;
    let mut rows = source.par_rows(name)?.to_vec();

    // Region filter: rows with node columns must hit the admitted list.
    if let Some(regions) = &ctx.opts.regions {
        let node_positions: Vec<usize> = item
            .dims_backed_by("node")
            .into_iter()
            .map(|(pos, _)| pos)
            .collect();
        if !node_positions.is_empty() {
            rows.retain(|row| node_positions.iter().any(|&pos| regions.contains(&row.key[pos])));
        }
    }
    if rows.is_empty() {
        debug!(parameter = %name, "no data; nothing to extend");
        return Ok(());
    }
    normalize_units(&mut rows, item, ctx.opts.unit_check);

    let time_positions: Vec<usize> = registry()
        .time_dims_of(name)
        .into_iter()
        .map(|(pos, _)| pos)
        .collect();
    match time_positions.as_slice() {
        [] => target.add_par(name, rows),
        [pos] => extend_one_dim(target, name, rows, *pos, ctx),
        [row_pos, col_pos] => extend_two_dim(source, target, name, rows, *row_pos, *col_pos, ctx),
        more => Err(MixError::Schema(format!(
            "parameter '{name}' has {} year dimensions; at most two are supported",
            more.len()
        ))),
    }
}

/// Coerce every row under one commodity (or emission) to the commodity's
/// modal unit. Without `unit_check`, a commodity with divergent units is
/// warned about and its series dropped; other commodities still extend.
fn normalize_units(rows: &mut Vec<ParRow>, item: &mix_core::Item, unit_check: bool) {
    let Some(commodity_pos) = item
        .dims_backed_by("commodity")
        .into_iter()
        .chain(item.dims_backed_by("emission"))
        .map(|(pos, _)| pos)
        .next()
    else {
        return;
    };
    let mut by_commodity: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    for (i, row) in rows.iter().enumerate() {
        by_commodity
            .entry(row.key[commodity_pos].clone())
            .or_default()
            .push(i);
    }
    let mut dropped: BTreeSet<String> = BTreeSet::new();
    for (commodity, indices) in by_commodity {
        let units: BTreeSet<&str> = indices.iter().map(|&i| rows[i].unit.as_str()).collect();
        if units.len() <= 1 {
            continue;
        }
        if !unit_check {
            warn!(
                %commodity,
                units = ?units,
                "commodity mixes units and unit_check is disabled; skipping its series"
            );
            dropped.insert(commodity);
            continue;
        }
        let modal = modal_unit(indices.iter().map(|&i| rows[i].unit.as_str()))
            .unwrap_or_default();
        warn!(%commodity, unit = %modal, "coercing mixed units to the modal unit");
        for &i in &indices {
            rows[i].unit = modal.clone();
        }
    }
    if !dropped.is_empty() {
        rows.retain(|row| !dropped.contains(&row.key[commodity_pos]));
    }
}

/// Group rows into series by their non-time key columns.
fn group_series(
    rows: &[ParRow],
    time_positions: &[usize],
) -> BTreeMap<Vec<String>, Vec<ParRow>> {
    let mut series: BTreeMap<Vec<String>, Vec<ParRow>> = BTreeMap::new();
    for row in rows {
        let key: Vec<String> = row
            .key
            .iter()
            .enumerate()
            .filter(|(pos, _)| !time_positions.contains(pos))
            .map(|(_, value)| value.clone())
            .collect();
        series.entry(key).or_default().push(row.clone());
    }
    series
}

fn extend_one_dim(
    target: &mut Scenario,
    name: &str,
    rows: Vec<ParRow>,
    pos: usize,
    ctx: &ParameterContext,
) -> mix_core::MixResult<()> {
    let policy = ctx.policy();
    let mut out = rows.clone();
    for (_, members) in group_series(&rows, &[pos]) {
        let mut points: BTreeMap<i32, f64> = BTreeMap::new();
        for row in &members {
            points.insert(mix_core::parse_year(&row.key[pos])?, row.value);
        }
        let template = &members[0];
        for &year in ctx.new_years {
            if let Some(value) = value_at(&points, year, &policy) {
                let mut key = template.key.clone();
                key[pos] = year.to_string();
                out.push(ParRow {
                    key,
                    value,
                    unit: template.unit.clone(),
                });
            }
        }
    }
    target.add_par(name, out)
}

fn extend_two_dim(
    source: &Scenario,
    target: &mut Scenario,
    name: &str,
    rows: Vec<ParRow>,
    row_pos: usize,
    col_pos: usize,
    ctx: &ParameterContext,
) -> mix_core::MixResult<()> {
    let item = registry()
        .lookup(name)
        .ok_or_else(|| MixError::Schema(format!("item '{name}' is not declared")))?;
    let node_pos = item
        .dims_backed_by("node")
        .into_iter()
        .map(|(pos, _)| pos)
        .next();
    let tec_pos = item.dim_position("technology");

    let mut out = Vec::new();
    for (_, members) in group_series(&rows, &[row_pos, col_pos]) {
        let mut source_matrix = Matrix::new();
        for row in &members {
            source_matrix
                .entry(mix_core::parse_year(&row.key[row_pos])?)
                .or_default()
                .insert(mix_core::parse_year(&row.key[col_pos])?, row.value);
        }
        let template = &members[0];
        let lifetimes = match (node_pos, tec_pos) {
            (Some(n), Some(t)) => {
                let map = series_lifetimes(source, target, &template.key[n], &template.key[t])?;
                (!map.is_empty()).then_some(map)
            }
            _ => None,
        };
        let matrix_ctx = MatrixContext {
            source_years: ctx.source_years,
            union_years: ctx.union_years,
            new_years: ctx.new_years,
            sums: ctx.sums,
            lifetimes: lifetimes.as_ref(),
            policy: ctx.policy(),
        };
        let extended = extend_matrix(&source_matrix, &matrix_ctx);
        for (yv, columns) in extended {
            for (ya, value) in columns {
                let mut key = template.key.clone();
                key[row_pos] = yv.to_string();
                key[col_pos] = ya.to_string();
                out.push(ParRow {
                    key,
                    value,
                    unit: template.unit.clone(),
                });
            }
        }
    }
    target.add_par(name, out)
}

/// Lifetimes for one (node, technology), preferring the target's already
/// extended `technical_lifetime` and falling back to the source's.
fn series_lifetimes(
    source: &Scenario,
    target: &Scenario,
    node: &str,
    technology: &str,
) -> mix_core::MixResult<BTreeMap<i32, f64>> {
    let mut map = BTreeMap::new();
    let rows = match target.par_rows("technical_lifetime") {
        Ok(rows) if !rows.is_empty() => rows,
        _ => match source.par_rows("technical_lifetime") {
            Ok(rows) => rows,
            Err(_) => return Ok(map),
        },
    };
    for row in rows {
        if row.key[0] == node && row.key[1] == technology {
            map.insert(mix_core::parse_year(&row.key[2])?, row.value);
        }
    }
    Ok(map)
}
