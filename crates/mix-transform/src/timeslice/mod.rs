//! Sub-annual time-slice expansion.
//!
//! Rewrites a scenario so that configured commodities, and the technologies
//! producing or consuming them, are indexed by an enumerated set of slices
//! instead of the single `"year"` slice. Yearly rows are replicated
//! (identity policy) or partitioned by `duration_time` (split policy) per
//! slice, then removed in bounded chunks. Aggregate balances are preserved:
//! split values sum back to the yearly value because slice durations are
//! normalized to 1.0 per temporal level.

pub mod config;

use std::collections::{BTreeMap, BTreeSet};

use anyhow::{bail, Result};
use tracing::{debug, info, warn};

use mix_core::hierarchy::transitive_closure;
use mix_core::registry::registry;
use mix_core::{ParRow, Scenario};

pub use config::{SliceDef, SliceTable};

/// How a yearly value maps onto slices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlicePolicy {
    /// The value at every slice equals the yearly value.
    Identity,
    /// The yearly value is split across slices by fractional duration.
    Split,
}

/// Fixed treatment of every time-indexed parameter the expander touches;
/// parameters not listed are left alone. Processed in this order.
const POLICIES: &[(&str, SlicePolicy)] = &[
    ("input", SlicePolicy::Identity),
    ("output", SlicePolicy::Identity),
    ("capacity_factor", SlicePolicy::Identity),
    ("var_cost", SlicePolicy::Identity),
    ("growth_activity_lo", SlicePolicy::Identity),
    ("growth_activity_up", SlicePolicy::Identity),
    ("demand", SlicePolicy::Split),
    ("historical_activity", SlicePolicy::Split),
    ("bound_activity_lo", SlicePolicy::Split),
    ("bound_activity_up", SlicePolicy::Split),
    ("initial_activity_lo", SlicePolicy::Split),
    ("initial_activity_up", SlicePolicy::Split),
    ("abs_cost_activity_soft_lo", SlicePolicy::Split),
    ("abs_cost_activity_soft_up", SlicePolicy::Split),
];

/// Per-(parameter, member) multiplier override, e.g. non-uniform seasonal
/// demand shares.
#[derive(Debug, Clone)]
pub struct FactorOverride {
    pub parameter: String,
    /// Technology or commodity the override applies to.
    pub member: String,
    /// Slice-name to factor; slices not listed fall back to the policy
    /// default.
    pub factors: BTreeMap<String, f64>,
}

/// Options of one expansion run.
#[derive(Debug, Clone)]
pub struct TimeSliceOptions {
    /// Commodities whose balance moves to sub-annual resolution.
    pub commodities: Vec<String>,
    /// Reduce the slice table to this many buckets before installing.
    pub n_slices: Option<usize>,
    /// Drop pre-existing non-root rows of the temporal hierarchy.
    pub remove_old_hierarchy: bool,
    /// Yearly-row removal chunk size; a performance knob only.
    pub batch_size: usize,
    pub overrides: Vec<FactorOverride>,
}

impl Default for TimeSliceOptions {
    fn default() -> Self {
        Self {
            commodities: Vec::new(),
            n_slices: None,
            remove_old_hierarchy: true,
            batch_size: 1000,
            overrides: Vec::new(),
        }
    }
}

/// Technologies in scope, derived from nonzero `input`/`output` rows on
/// the configured commodities.
#[derive(Debug, Default)]
pub struct TecScope {
    pub producers: BTreeSet<String>,
    pub consumers: BTreeSet<String>,
}

impl TecScope {
    pub fn all(&self) -> BTreeSet<String> {
        self.producers.union(&self.consumers).cloned().collect()
    }

    /// Technologies that only consume the configured commodities.
    pub fn only_input(&self) -> BTreeSet<String> {
        self.consumers.difference(&self.producers).cloned().collect()
    }
}

/// Expand the scenario onto the slice table's sub-annual resolution.
pub fn expand_time_slices(
    scn: &mut Scenario,
    table: &SliceTable,
    opts: &TimeSliceOptions,
) -> Result<()> {
    table.validate()?;
    let table = match opts.n_slices {
        Some(n) => table.reduce(n),
        None => table.clone(),
    };

    install_temporal_structure(scn, &table, opts)?;
    let scope = derive_technologies(scn, &opts.commodities)?;
    let durations = scn.duration_time()?;
    let overrides = effective_overrides(opts, &scope);

    for &(name, policy) in POLICIES {
        let rows = match scn.par_rows(name) {
            Ok(rows) if !rows.is_empty() => rows.to_vec(),
            _ => continue,
        };
        rewrite_parameter(scn, name, policy, rows, &table, &scope, &durations, &overrides, opts)?;
    }
    info!(
        scenario = %scn.id(),
        slices = table.slices.len(),
        technologies = scope.all().len(),
        "sub-annual expansion complete"
    );
    Ok(())
}

/// Install slices, temporal levels, the hierarchy, its closure, and the
/// normalized `duration_time`.
fn install_temporal_structure(
    scn: &mut Scenario,
    table: &SliceTable,
    opts: &TimeSliceOptions,
) -> Result<()> {
    let mut level_sums: BTreeMap<&str, f64> = BTreeMap::new();
    for slice in &table.slices {
        *level_sums.entry(slice.level.as_str()).or_insert(0.0) += slice.duration;
    }
    for (level, sum) in &level_sums {
        if *sum <= 0.0 {
            bail!("temporal level '{level}' has non-positive total duration {sum}");
        }
    }

    let hierarchy = table.hierarchy_rows();
    let closure = transitive_closure(&hierarchy)?;

    scn.transact("install sub-annual time structure", |scn| {
        if opts.remove_old_hierarchy {
            // Slices and levels of an earlier expansion would otherwise
            // survive alongside the new table.
            for name in ["time", "lvl_temporal"] {
                if let Ok(rows) = scn.set_rows(name).map(|rows| rows.to_vec()) {
                    let stale: Vec<Vec<String>> = rows
                        .into_iter()
                        .filter(|row| row[0] != "year")
                        .collect();
                    scn.remove_set_rows(name, &stale)?;
                }
            }
            for name in ["map_temporal_hierarchy", "map_time"] {
                if let Ok(rows) = scn.set_rows(name).map(|rows| rows.to_vec()) {
                    scn.remove_set_rows(name, &rows)?;
                }
            }
            if scn.par_rows("duration_time").is_ok() {
                scn.clear_par("duration_time")?;
            }
        }

        scn.add_set(
            "time",
            table
                .slices
                .iter()
                .map(|s| vec![s.time_name.clone()])
                .collect(),
        )?;
        let mut levels: Vec<Vec<String>> = vec![vec!["year".into()]];
        levels.extend(table.slices.iter().map(|s| vec![s.level.clone()]));
        scn.add_set("lvl_temporal", levels)?;
        let mut hierarchy_rows: Vec<Vec<String>> =
            vec![vec!["year".into(), "year".into(), "year".into()]];
        hierarchy_rows.extend(
            table
                .slices
                .iter()
                .map(|s| vec![s.level.clone(), s.time_name.clone(), s.parent.clone()]),
        );
        scn.add_set("map_temporal_hierarchy", hierarchy_rows)?;
        scn.add_set(
            "map_time",
            closure
                .iter()
                .map(|(parent, child)| vec![parent.clone(), child.clone()])
                .collect(),
        )?;

        let mut duration_rows = vec![ParRow::new(vec!["year"], 1.0, "-")];
        for slice in &table.slices {
            let normalized = slice.duration / level_sums[slice.level.as_str()];
            duration_rows.push(ParRow::new(vec![slice.time_name.clone()], normalized, "-"));
        }
        scn.add_par("duration_time", duration_rows)?;
        Ok(())
    })?;

    // The per-level sums must come back as exactly 1 after normalization.
    let durations = scn.duration_time()?;
    for level in level_sums.keys() {
        let sum: f64 = table
            .slices
            .iter()
            .filter(|s| s.level == *level)
            .filter_map(|s| durations.get(&s.time_name))
            .sum();
        if (sum - 1.0).abs() > 1e-12 {
            bail!("duration_time of level '{level}' sums to {sum}, expected 1.0");
        }
    }
    Ok(())
}

/// Producers and consumers of the configured commodities. Zero-valued rows
/// do not bring a technology into scope.
fn derive_technologies(scn: &Scenario, commodities: &[String]) -> Result<TecScope> {
    let mut scope = TecScope::default();
    for (parameter, bucket) in [
        ("output", &mut scope.producers),
        ("input", &mut scope.consumers),
    ] {
        let item = registry()
            .lookup(parameter)
            .ok_or_else(|| anyhow::anyhow!("parameter '{parameter}' is not declared"))?;
        let Some(tec_pos) = item.dim_position("technology") else {
            continue;
        };
        let Some(commodity_pos) = item.dim_position("commodity") else {
            continue;
        };
        let rows = match scn.par_rows(parameter) {
            Ok(rows) => rows,
            Err(_) => continue,
        };
        for row in rows {
            if row.value != 0.0 && commodities.contains(&row.key[commodity_pos]) {
                bucket.insert(row.key[tec_pos].clone());
            }
        }
    }
    debug!(
        producers = scope.producers.len(),
        consumers = scope.consumers.len(),
        only_input = scope.only_input().len(),
        "derived technology scope"
    );
    Ok(scope)
}

/// Drop overrides whose member is outside the derived scope, warn for each.
fn effective_overrides(
    opts: &TimeSliceOptions,
    scope: &TecScope,
) -> BTreeMap<(String, String), BTreeMap<String, f64>> {
    let all_tecs = scope.all();
    let mut map = BTreeMap::new();
    for over in &opts.overrides {
        let known = match registry().lookup(&over.parameter) {
            None => false,
            Some(item) => {
                if item.dim_position("technology").is_some() {
                    all_tecs.contains(&over.member)
                } else {
                    opts.commodities.contains(&over.member)
                }
            }
        };
        if !known {
            warn!(
                parameter = %over.parameter,
                member = %over.member,
                "override references an unknown member; skipping"
            );
            continue;
        }
        map.insert(
            (over.parameter.clone(), over.member.clone()),
            over.factors.clone(),
        );
    }
    map
}

#[allow(clippy::too_many_arguments)]
fn rewrite_parameter(
    scn: &mut Scenario,
    name: &str,
    policy: SlicePolicy,
    rows: Vec<ParRow>,
    table: &SliceTable,
    scope: &TecScope,
    durations: &BTreeMap<String, f64>,
    overrides: &BTreeMap<(String, String), BTreeMap<String, f64>>,
    opts: &TimeSliceOptions,
) -> Result<()> {
    let item = registry()
        .lookup(name)
        .ok_or_else(|| anyhow::anyhow!("parameter '{name}' is not declared"))?;
    let sub_dims = registry().sub_annual_dims_of(name);
    if sub_dims.is_empty() {
        return Ok(());
    }
    let tec_pos = item.dim_position("technology");
    let commodity_pos = item.dim_position("commodity");
    let all_tecs = scope.all();

    let mut added: Vec<ParRow> = Vec::new();
    let mut removed: Vec<Vec<String>> = Vec::new();
    for row in &rows {
        if sub_dims.iter().any(|(pos, _)| row.key[*pos] != "year") {
            continue;
        }
        let member = match (tec_pos, commodity_pos) {
            (Some(pos), _) => {
                if !all_tecs.contains(&row.key[pos]) {
                    continue;
                }
                &row.key[pos]
            }
            (None, Some(pos)) => {
                if !opts.commodities.contains(&row.key[pos]) {
                    continue;
                }
                &row.key[pos]
            }
            (None, None) => continue,
        };
        let override_factors = overrides.get(&(name.to_string(), member.clone()));
        let commodity_expanded = commodity_pos
            .map(|pos| opts.commodities.contains(&row.key[pos]))
            .unwrap_or(false);

        for slice in &table.slices {
            let h = &slice.time_name;
            let default_factor = match policy {
                SlicePolicy::Identity => 1.0,
                SlicePolicy::Split => durations.get(h).copied().unwrap_or(0.0),
            };
            let factor = override_factors
                .and_then(|f| f.get(h).copied())
                .unwrap_or(default_factor);
            let mut key = row.key.clone();
            for (pos, dim) in &sub_dims {
                key[*pos] = match dim.as_str() {
                    // A commodity kept at yearly resolution keeps its
                    // endpoints at "year" on both sides.
                    "time_origin" | "time_dest" if !commodity_expanded => "year".to_string(),
                    _ => h.clone(),
                };
            }
            added.push(ParRow {
                key,
                value: row.value * factor,
                unit: row.unit.clone(),
            });
        }
        removed.push(row.key.clone());
    }
    if added.is_empty() {
        return Ok(());
    }

    let message = format!("expand {name} to sub-annual slices");
    scn.transact(&message, |scn| scn.add_par(name, added))?;
    for chunk in removed.chunks(opts.batch_size.max(1)) {
        let message = format!("remove yearly {name} rows ({} keys)", chunk.len());
        scn.transact(&message, |scn| scn.remove_par_rows(name, chunk))?;
    }
    debug!(parameter = %name, rewritten = removed.len(), "parameter expanded");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mix_core::Scheme;

    fn base_scenario() -> Scenario {
        let mut scn = Scenario::new("model", "base", Scheme::Message).unwrap();
        scn.add_set_elements("year", &["2020"]).unwrap();
        scn.add_set_elements("node", &["n"]).unwrap();
        scn.add_set_elements("commodity", &["elec", "gas"]).unwrap();
        scn.add_set_elements("level", &["final"]).unwrap();
        scn.add_set_elements("mode", &["m"]).unwrap();
        scn.add_set_elements("time", &["year"]).unwrap();
        scn.add_set_elements("technology", &["turbine", "boiler"])
            .unwrap();
        scn.commit("base structure").unwrap();
        scn
    }

    fn seasons() -> SliceTable {
        SliceTable {
            slices: ["summer", "winter"]
                .iter()
                .map(|name| SliceDef {
                    time_name: name.to_string(),
                    duration: 0.5,
                    level: "season".into(),
                    parent: "year".into(),
                    values: BTreeMap::new(),
                })
                .collect(),
            rate_columns: Vec::new(),
        }
    }

    fn options() -> TimeSliceOptions {
        TimeSliceOptions {
            commodities: vec!["elec".into()],
            ..TimeSliceOptions::default()
        }
    }

    #[test]
    fn demand_splits_by_duration() {
        let mut scn = base_scenario();
        scn.check_out().unwrap();
        scn.add_par(
            "demand",
            vec![ParRow::new(
                vec!["n", "elec", "final", "2020", "year"],
                4.0,
                "GWa",
            )],
        )
        .unwrap();
        scn.commit("demand").unwrap();

        expand_time_slices(&mut scn, &seasons(), &options()).unwrap();

        let rows = scn.par_rows("demand").unwrap();
        assert_eq!(rows.len(), 2);
        for row in rows {
            assert!(row.key[4] == "summer" || row.key[4] == "winter");
            assert_eq!(row.value, 2.0);
        }
        let durations = scn.duration_time().unwrap();
        assert_eq!(durations["summer"], 0.5);
        assert_eq!(durations["winter"], 0.5);
        assert_eq!(durations["year"], 1.0);
    }

    #[test]
    fn capacity_factor_is_replicated_per_slice() {
        let mut scn = base_scenario();
        scn.check_out().unwrap();
        scn.add_par(
            "output",
            vec![ParRow::new(
                vec!["n", "turbine", "2020", "2020", "m", "n", "elec", "final", "year", "year"],
                1.0,
                "GWa",
            )],
        )
        .unwrap();
        scn.add_par(
            "capacity_factor",
            vec![ParRow::new(
                vec!["n", "turbine", "2020", "2020", "year"],
                0.8,
                "-",
            )],
        )
        .unwrap();
        scn.commit("capacity factor").unwrap();

        expand_time_slices(&mut scn, &seasons(), &options()).unwrap();

        let rows = scn.par_rows("capacity_factor").unwrap();
        assert_eq!(rows.len(), 2);
        for row in rows {
            assert_eq!(row.value, 0.8);
        }
    }

    #[test]
    fn only_input_technologies_keep_yearly_output_endpoints() {
        let mut scn = base_scenario();
        scn.check_out().unwrap();
        // The boiler consumes elec and produces gas: only-input scope.
        scn.add_par(
            "input",
            vec![ParRow::new(
                vec!["n", "boiler", "2020", "2020", "m", "n", "elec", "final", "year", "year"],
                1.2,
                "GWa",
            )],
        )
        .unwrap();
        scn.add_par(
            "output",
            vec![ParRow::new(
                vec!["n", "boiler", "2020", "2020", "m", "n", "gas", "final", "year", "year"],
                0.9,
                "GWa",
            )],
        )
        .unwrap();
        scn.commit("boiler").unwrap();

        expand_time_slices(&mut scn, &seasons(), &options()).unwrap();

        for row in scn.par_rows("input").unwrap() {
            // time and time_origin both move to the slice.
            assert_ne!(row.key[8], "year");
            assert_eq!(row.key[8], row.key[9]);
        }
        for row in scn.par_rows("output").unwrap() {
            // Activity is sliced but the gas delivery stays yearly.
            assert_ne!(row.key[8], "year");
            assert_eq!(row.key[9], "year");
        }
    }

    #[test]
    fn zero_valued_links_leave_technologies_out_of_scope() {
        let mut scn = base_scenario();
        scn.check_out().unwrap();
        scn.add_par(
            "output",
            vec![ParRow::new(
                vec!["n", "turbine", "2020", "2020", "m", "n", "elec", "final", "year", "year"],
                0.0,
                "GWa",
            )],
        )
        .unwrap();
        scn.commit("zero output").unwrap();

        let scope = derive_technologies(&scn, &["elec".to_string()]).unwrap();
        assert!(scope.all().is_empty());

        expand_time_slices(&mut scn, &seasons(), &options()).unwrap();
        let rows = scn.par_rows("output").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].key[8], "year");
    }

    #[test]
    fn overrides_apply_and_unknown_members_warn_and_skip() {
        let mut scn = base_scenario();
        scn.check_out().unwrap();
        scn.add_par(
            "demand",
            vec![ParRow::new(
                vec!["n", "elec", "final", "2020", "year"],
                4.0,
                "GWa",
            )],
        )
        .unwrap();
        scn.commit("demand").unwrap();

        let mut opts = options();
        opts.overrides = vec![
            FactorOverride {
                parameter: "demand".into(),
                member: "elec".into(),
                factors: BTreeMap::from([("summer".to_string(), 0.7), ("winter".to_string(), 0.3)]),
            },
            FactorOverride {
                parameter: "demand".into(),
                member: "no_such_commodity".into(),
                factors: BTreeMap::new(),
            },
        ];
        expand_time_slices(&mut scn, &seasons(), &opts).unwrap();

        let rows = scn.par_rows("demand").unwrap();
        let summer = rows.iter().find(|r| r.key[4] == "summer").unwrap();
        let winter = rows.iter().find(|r| r.key[4] == "winter").unwrap();
        assert_eq!(summer.value, 4.0 * 0.7);
        assert_eq!(winter.value, 4.0 * 0.3);
    }

    #[test]
    fn hierarchy_closure_is_installed() {
        let mut scn = base_scenario();
        expand_time_slices(&mut scn, &seasons(), &options()).unwrap();
        let map_time = scn.set_rows("map_time").unwrap();
        assert!(map_time.contains(&vec!["year".to_string(), "summer".to_string()]));
        assert!(map_time.contains(&vec!["summer".to_string(), "summer".to_string()]));
        let hierarchy = scn.set_rows("map_temporal_hierarchy").unwrap();
        assert!(hierarchy.contains(&vec![
            "season".to_string(),
            "winter".to_string(),
            "year".to_string()
        ]));
    }

    #[test]
    fn reinstalling_a_different_table_drops_stale_slices() {
        let mut scn = base_scenario();
        expand_time_slices(&mut scn, &seasons(), &options()).unwrap();

        let quarters = SliceTable {
            slices: ["q1", "q2", "q3", "q4"]
                .iter()
                .map(|name| SliceDef {
                    time_name: name.to_string(),
                    duration: 0.25,
                    level: "quarter".into(),
                    parent: "year".into(),
                    values: BTreeMap::new(),
                })
                .collect(),
            rate_columns: Vec::new(),
        };
        expand_time_slices(&mut scn, &quarters, &options()).unwrap();

        let time = scn.set_rows("time").unwrap();
        assert!(!time.contains(&vec!["summer".to_string()]));
        assert!(time.contains(&vec!["year".to_string()]));
        assert!(time.contains(&vec!["q1".to_string()]));
        let levels = scn.set_rows("lvl_temporal").unwrap();
        assert!(!levels.contains(&vec!["season".to_string()]));

        let durations = scn.duration_time().unwrap();
        assert!(!durations.contains_key("summer"));
        assert_eq!(durations["q3"], 0.25);
        assert_eq!(durations["year"], 1.0);
    }

    #[test]
    fn split_values_sum_back_to_yearly_total() {
        let mut scn = base_scenario();
        scn.check_out().unwrap();
        scn.add_par(
            "output",
            vec![ParRow::new(
                vec!["n", "turbine", "2020", "2020", "m", "n", "elec", "final", "year", "year"],
                1.0,
                "GWa",
            )],
        )
        .unwrap();
        scn.add_par(
            "bound_activity_up",
            vec![ParRow::new(
                vec!["n", "turbine", "2020", "m", "year"],
                10.0,
                "GWa",
            )],
        )
        .unwrap();
        scn.commit("bounds").unwrap();

        expand_time_slices(&mut scn, &seasons(), &options()).unwrap();
        let total: f64 = scn
            .par_rows("bound_activity_up")
            .unwrap()
            .iter()
            .map(|r| r.value)
            .sum();
        assert!((total - 10.0).abs() < 1e-12);
    }
}
