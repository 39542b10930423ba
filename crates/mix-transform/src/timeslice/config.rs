//! Sub-annual slice descriptions.
//!
//! A slice table is loaded from a YAML or JSON file (sniffed by extension)
//! and lists `(time_name, duration, level, parent)` rows forming a forest
//! under the root slice `"year"`. Extra numeric columns may ride along in
//! `values`; `rate_columns` marks which of those sum under reduction (the
//! rest average).

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use mix_core::hierarchy::{check_forest, HierarchyRow};

/// One sub-annual slice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SliceDef {
    pub time_name: String,
    /// Fraction of the year, normalized per level at installation time.
    pub duration: f64,
    pub level: String,
    pub parent: String,
    /// Extra data columns, e.g. per-slice demand shares.
    #[serde(default)]
    pub values: BTreeMap<String, f64>,
}

/// A full slice description.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SliceTable {
    pub slices: Vec<SliceDef>,
    /// `values` columns that behave as rates (summed when slices merge);
    /// all other columns are stocks (averaged).
    #[serde(default)]
    pub rate_columns: Vec<String>,
}

impl SliceTable {
    /// Load a slice table, dispatching on the file extension.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading slice table {}", path.display()))?;
        let table: Self = match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => serde_yaml::from_str(&text)
                .with_context(|| format!("parsing YAML slice table {}", path.display()))?,
            Some("json") => serde_json::from_str(&text)
                .with_context(|| format!("parsing JSON slice table {}", path.display()))?,
            other => bail!(
                "unsupported slice table extension {:?} for {}",
                other,
                path.display()
            ),
        };
        table.validate()?;
        Ok(table)
    }

    /// A missing parent would leave slices unlinked from the balance
    /// equations, so it is fatal.
    pub fn validate(&self) -> Result<()> {
        if self.slices.is_empty() {
            bail!("slice table has no rows");
        }
        let rows: Vec<HierarchyRow> = self.hierarchy_rows();
        check_forest(&rows, &["year"])?;
        Ok(())
    }

    pub fn hierarchy_rows(&self) -> Vec<HierarchyRow> {
        self.slices
            .iter()
            .map(|s| HierarchyRow {
                level: s.level.clone(),
                child: s.time_name.clone(),
                parent: s.parent.clone(),
            })
            .collect()
    }

    pub fn slice_names(&self) -> Vec<&str> {
        self.slices.iter().map(|s| s.time_name.as_str()).collect()
    }

    /// Reduce to `n` contiguous buckets of size ⌊len/n⌋, the remainder
    /// folding into the last bucket. Durations and rate columns sum;
    /// stock columns average. A bucket takes its level and parent from its
    /// first slice and is named `<first>_<last>`.
    pub fn reduce(&self, n: usize) -> SliceTable {
        let len = self.slices.len();
        if n == 0 || n >= len {
            return self.clone();
        }
        let size = len / n;
        let mut slices = Vec::with_capacity(n);
        for bucket in 0..n {
            let start = bucket * size;
            let end = if bucket == n - 1 { len } else { start + size };
            let members = &self.slices[start..end];
            let first = &members[0];
            let last = &members[members.len() - 1];
            let time_name = if members.len() == 1 {
                first.time_name.clone()
            } else {
                format!("{}_{}", first.time_name, last.time_name)
            };
            let mut values: BTreeMap<String, f64> = BTreeMap::new();
            for column in members.iter().flat_map(|m| m.values.keys()) {
                let entries: Vec<f64> = members
                    .iter()
                    .filter_map(|m| m.values.get(column).copied())
                    .collect();
                let aggregated = if self.rate_columns.iter().any(|c| c == column) {
                    entries.iter().sum()
                } else {
                    entries.iter().sum::<f64>() / entries.len() as f64
                };
                values.insert(column.clone(), aggregated);
            }
            slices.push(SliceDef {
                time_name,
                duration: members.iter().map(|m| m.duration).sum(),
                level: first.level.clone(),
                parent: first.parent.clone(),
                values,
            });
        }
        SliceTable {
            slices,
            rate_columns: self.rate_columns.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn seasons() -> SliceTable {
        SliceTable {
            slices: ["s1", "s2", "s3", "s4"]
                .iter()
                .map(|name| SliceDef {
                    time_name: name.to_string(),
                    duration: 0.25,
                    level: "season".into(),
                    parent: "year".into(),
                    values: BTreeMap::from([("share".to_string(), 0.25)]),
                })
                .collect(),
            rate_columns: vec!["share".into()],
        }
    }

    #[test]
    fn reduction_folds_remainder_into_last_bucket() {
        let reduced = seasons().reduce(3);
        assert_eq!(reduced.slices.len(), 3);
        assert_eq!(reduced.slices[0].time_name, "s1");
        assert_eq!(reduced.slices[2].time_name, "s3_s4");
        assert_eq!(reduced.slices[2].duration, 0.5);
        // share is a rate column: summed.
        assert_eq!(reduced.slices[2].values["share"], 0.5);
    }

    #[test]
    fn reduction_averages_stock_columns() {
        let mut table = seasons();
        table.rate_columns.clear();
        let reduced = table.reduce(2);
        assert_eq!(reduced.slices[0].duration, 0.5);
        assert_eq!(reduced.slices[0].values["share"], 0.25);
    }

    #[test]
    fn reduction_is_identity_at_or_above_input_size() {
        let table = seasons();
        assert_eq!(table.reduce(4), table);
        assert_eq!(table.reduce(9), table);
        assert_eq!(table.reduce(0), table);
    }

    #[test]
    fn missing_parent_is_fatal() {
        let mut table = seasons();
        table.slices[1].parent = "nowhere".into();
        assert!(table.validate().is_err());
    }

    #[test]
    fn nested_levels_validate() {
        let mut table = seasons();
        table.slices.push(SliceDef {
            time_name: "s1_day".into(),
            duration: 0.125,
            level: "day".into(),
            parent: "s1".into(),
            values: BTreeMap::new(),
        });
        table.validate().unwrap();
    }

    #[test]
    fn load_sniffs_extension() {
        let dir = tempfile::tempdir().unwrap();
        let yaml = dir.path().join("slices.yaml");
        let mut file = std::fs::File::create(&yaml).unwrap();
        write!(
            file,
            "slices:\n  - time_name: summer\n    duration: 0.5\n    level: season\n    parent: year\n  - time_name: winter\n    duration: 0.5\n    level: season\n    parent: year\n"
        )
        .unwrap();
        let table = SliceTable::load(&yaml).unwrap();
        assert_eq!(table.slice_names(), vec!["summer", "winter"]);

        let txt = dir.path().join("slices.txt");
        std::fs::write(&txt, "x").unwrap();
        assert!(SliceTable::load(&txt).is_err());
    }
}
