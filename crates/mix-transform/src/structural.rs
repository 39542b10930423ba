//! Structural scenario helpers.
//!
//! Small but non-obvious routines that belong with the core: horizon
//! installation, vintage/activity window queries, and index-set renames.

use std::collections::{BTreeMap, BTreeSet};

use anyhow::{anyhow, bail, Context, Result};

use mix_core::hierarchy::{transitive_closure, HierarchyRow};
use mix_core::horizon::{self, infer_duration_period};
use mix_core::registry::{registry, ItemKind};
use mix_core::{ItemData, ParRow, Scenario};

/// Install a model horizon on a scenario whose `year` set is still empty.
///
/// Adds the periods sorted, points `cat_year[firstmodelyear]` at the given
/// year (or the earliest period), and computes `duration_period` with the
/// first period's length inferred from the mode of subsequent differences.
pub fn add_horizon(scn: &mut Scenario, years: &[i32], firstmodelyear: Option<i32>) -> Result<()> {
    let existing = scn
        .set_rows("year")
        .map(|rows| rows.len())
        .unwrap_or(0);
    if existing > 0 {
        bail!("the 'year' set already has {existing} elements; add_horizon requires an empty horizon");
    }
    let mut sorted: Vec<i32> = years.to_vec();
    sorted.sort_unstable();
    sorted.dedup();
    let durations = infer_duration_period(&sorted).context("inferring duration_period")?;
    let y0 = firstmodelyear.unwrap_or(sorted[0]);
    if !sorted.contains(&y0) {
        bail!("firstmodelyear {y0} is not among the supplied periods");
    }

    scn.transact("add model horizon", |scn| {
        scn.add_set(
            "year",
            sorted.iter().map(|y| vec![y.to_string()]).collect(),
        )?;
        scn.add_set_elements("type_year", &["firstmodelyear"])?;
        scn.add_set(
            "cat_year",
            vec![vec!["firstmodelyear".into(), y0.to_string()]],
        )?;
        scn.add_par(
            "duration_period",
            durations
                .iter()
                .map(|(year, length)| ParRow::new(vec![year.to_string()], *length as f64, "y"))
                .collect(),
        )?;
        Ok(())
    })
    .map_err(Into::into)
}

/// Optional restriction for [`vintage_and_active_years`].
#[derive(Debug, Clone)]
pub struct VintageFilter {
    pub node: String,
    pub technology: String,
    /// Restrict to one vintage year.
    pub year_vtg: Option<i32>,
}

/// All valid (vintage, active) year pairs of a scenario.
///
/// Without a filter, every pair with `ya >= yv` is returned. With a filter,
/// vintages are restricted to years where `technical_lifetime` is defined
/// for the (node, technology), active years to the lifetime window, and,
/// with `tl_only`, to years where the lifetime itself is defined.
pub fn vintage_and_active_years(
    scn: &Scenario,
    filter: Option<&VintageFilter>,
    tl_only: bool,
) -> Result<Vec<(i32, i32)>> {
    let years = scn.years()?;
    let Some(filter) = filter else {
        let mut pairs = Vec::new();
        for &yv in &years {
            for &ya in &years {
                if ya >= yv {
                    pairs.push((yv, ya));
                }
            }
        }
        return Ok(pairs);
    };

    let lifetimes = lifetimes_for(scn, &filter.node, &filter.technology)?;
    let durations = scn.duration_period()?;
    let mut pairs = Vec::new();
    for (&yv, &lifetime) in &lifetimes {
        if let Some(only) = filter.year_vtg {
            if yv != only {
                continue;
            }
        }
        for ya in horizon::years_active(&years, &durations, yv, lifetime) {
            if tl_only && !lifetimes.contains_key(&ya) {
                continue;
            }
            pairs.push((yv, ya));
        }
    }
    pairs.sort_unstable();
    Ok(pairs)
}

/// Active years of one vintage: every `ya >= yv` whose cumulative
/// `duration_period` from the vintage stays below the technical lifetime.
pub fn years_active(scn: &Scenario, node: &str, technology: &str, year_vtg: i32) -> Result<Vec<i32>> {
    let lifetimes = lifetimes_for(scn, node, technology)?;
    let lifetime = *lifetimes.get(&year_vtg).ok_or_else(|| {
        anyhow!("technical_lifetime is not defined for ({node}, {technology}, {year_vtg})")
    })?;
    let years = scn.years()?;
    let durations = scn.duration_period()?;
    Ok(horizon::years_active(&years, &durations, year_vtg, lifetime))
}

/// `technical_lifetime` of one (node, technology), keyed by vintage year.
pub fn lifetimes_for(scn: &Scenario, node: &str, technology: &str) -> Result<BTreeMap<i32, f64>> {
    let mut map = BTreeMap::new();
    for row in scn.par_rows("technical_lifetime")? {
        if row.key[0] == node && row.key[1] == technology {
            map.insert(mix_core::parse_year(&row.key[2])?, row.value);
        }
    }
    Ok(map)
}

/// Rebuild `map_node` from `map_spatial_hierarchy`.
///
/// The mapping is the reflexive transitive closure of the spatial forest:
/// every node maps to itself and a parent region maps to each of its
/// descendants. Nodes outside the hierarchy still get their self-loop.
/// Replaces any existing `map_node` rows.
pub fn update_node_mapping(scn: &mut Scenario) -> Result<()> {
    let forest: Vec<HierarchyRow> = scn
        .set_rows("map_spatial_hierarchy")
        .map(|rows| rows.to_vec())
        .unwrap_or_default()
        .into_iter()
        .map(|row| HierarchyRow {
            level: row[0].clone(),
            child: row[1].clone(),
            parent: row[2].clone(),
        })
        .collect();
    let mut pairs: BTreeSet<(String, String)> = transitive_closure(&forest)?.into_iter().collect();
    for node in scn.set_members("node")? {
        pairs.insert((node.clone(), node));
    }

    scn.transact("rebuild node mapping from the spatial hierarchy", |scn| {
        if let Ok(rows) = scn.set_rows("map_node").map(|rows| rows.to_vec()) {
            scn.remove_set_rows("map_node", &rows)?;
        }
        scn.add_set(
            "map_node",
            pairs
                .iter()
                .map(|(parent, descendant)| vec![parent.clone(), descendant.clone()])
                .collect(),
        )
    })
    .map_err(Into::into)
}

/// Rename members of an index set throughout a scenario.
///
/// Every set and parameter indexed by `set_name` has the mapping applied to
/// its rows; with `keep = true` the renamed rows are added alongside the
/// originals instead of replacing them. Fails when `set_name` is not an
/// index set. Runs inside a single committed transaction.
pub fn rename(
    scn: &mut Scenario,
    set_name: &str,
    mapping: &BTreeMap<String, String>,
    keep: bool,
) -> Result<()> {
    let item = registry()
        .lookup(set_name)
        .ok_or_else(|| anyhow!("set '{set_name}' is not declared in the registry"))?;
    if item.kind != ItemKind::Set {
        bail!("'{set_name}' is indexed by other sets; rename requires an index set");
    }

    let message = format!(
        "rename {set_name}: {}",
        mapping
            .iter()
            .map(|(from, to)| format!("{from} -> {to}"))
            .collect::<Vec<_>>()
            .join(", ")
    );

    let names: Vec<String> = scn.item_names().cloned().collect();
    scn.transact(&message, |scn| {
        // The index set itself.
        for (from, to) in mapping {
            scn.add_set(set_name, vec![vec![to.clone()]])?;
            if !keep {
                scn.remove_set_rows(set_name, &[vec![from.clone()]])?;
            }
        }

        // Every item with a column backed by the set.
        for name in &names {
            if name == set_name {
                continue;
            }
            let Some(decl) = registry().lookup(name) else {
                continue;
            };
            let positions: Vec<usize> = decl
                .coords
                .iter()
                .enumerate()
                .filter(|(_, coord)| coord.as_str() == set_name)
                .map(|(pos, _)| pos)
                .collect();
            if positions.is_empty() {
                continue;
            }
            match scn.item(name).cloned() {
                Some(ItemData::Set(data)) => {
                    let mut added = Vec::new();
                    let mut removed = Vec::new();
                    for row in &data.rows {
                        if let Some(new_row) = remap_key(row, &positions, mapping) {
                            added.push(new_row);
                            if !keep {
                                removed.push(row.clone());
                            }
                        }
                    }
                    scn.add_set(name, added)?;
                    scn.remove_set_rows(name, &removed)?;
                }
                Some(ItemData::Par(data)) => {
                    let mut added = Vec::new();
                    let mut removed = Vec::new();
                    for row in &data.rows {
                        if let Some(new_key) = remap_key(&row.key, &positions, mapping) {
                            added.push(ParRow {
                                key: new_key,
                                value: row.value,
                                unit: row.unit.clone(),
                            });
                            if !keep {
                                removed.push(row.key.clone());
                            }
                        }
                    }
                    scn.add_par(name, added)?;
                    scn.remove_par_rows(name, &removed)?;
                }
                _ => {}
            }
        }
        Ok(())
    })
    .map_err(Into::into)
}

/// Apply a member mapping at the given key positions; `None` when no
/// position matches.
fn remap_key(
    key: &[String],
    positions: &[usize],
    mapping: &BTreeMap<String, String>,
) -> Option<Vec<String>> {
    let mut out = key.to_vec();
    let mut touched = false;
    for &pos in positions {
        if let Some(to) = mapping.get(&key[pos]) {
            out[pos] = to.clone();
            touched = true;
        }
    }
    touched.then_some(out)
}
