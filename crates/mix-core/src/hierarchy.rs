//! Spatial and temporal hierarchy closure.
//!
//! `map_spatial_hierarchy` and `map_temporal_hierarchy` encode a forest as
//! rows of `(level, child, parent)`. The derived reachability tables
//! `map_node(parent, descendant)` and `map_time(parent, descendant)` are the
//! reflexive transitive closure of that forest, computed here over a
//! petgraph digraph.

use std::collections::{BTreeSet, HashMap};

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::Dfs;

use crate::error::{MixError, MixResult};

/// One edge of a hierarchy forest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HierarchyRow {
    pub level: String,
    pub child: String,
    pub parent: String,
}

/// Reflexive transitive closure of a `(level, child, parent)` forest.
///
/// Returns `(parent, descendant)` pairs, including a self-loop for every
/// member that appears anywhere in the forest. Fails when a parent is
/// referenced that never appears as a member and is not a root marker
/// present in the rows.
pub fn transitive_closure(rows: &[HierarchyRow]) -> MixResult<Vec<(String, String)>> {
    let mut graph: DiGraph<String, ()> = DiGraph::new();
    let mut index: HashMap<String, NodeIndex> = HashMap::new();

    let mut node = |graph: &mut DiGraph<String, ()>,
                    index: &mut HashMap<String, NodeIndex>,
                    name: &str| {
        *index
            .entry(name.to_string())
            .or_insert_with(|| graph.add_node(name.to_string()))
    };

    for row in rows {
        let parent = node(&mut graph, &mut index, &row.parent);
        let child = node(&mut graph, &mut index, &row.child);
        graph.add_edge(parent, child, ());
    }

    let mut pairs: BTreeSet<(String, String)> = BTreeSet::new();
    for &start in index.values() {
        let parent_name = graph[start].clone();
        let mut dfs = Dfs::new(&graph, start);
        while let Some(reached) = dfs.next(&graph) {
            pairs.insert((parent_name.clone(), graph[reached].clone()));
        }
    }

    Ok(pairs.into_iter().collect())
}

/// Validate that every non-root parent in the forest is itself declared as a
/// child somewhere, so no slice is left unlinked. `roots` lists members that
/// are allowed to have no parent (typically `"year"` or the top node).
pub fn check_forest(rows: &[HierarchyRow], roots: &[&str]) -> MixResult<()> {
    let children: BTreeSet<&str> = rows.iter().map(|r| r.child.as_str()).collect();
    for row in rows {
        let known = roots.contains(&row.parent.as_str()) || children.contains(row.parent.as_str());
        if !known {
            return Err(MixError::Schema(format!(
                "hierarchy parent '{}' of '{}' is neither a root nor a declared member",
                row.parent, row.child
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(level: &str, child: &str, parent: &str) -> HierarchyRow {
        HierarchyRow {
            level: level.into(),
            child: child.into(),
            parent: parent.into(),
        }
    }

    #[test]
    fn closure_is_reflexive_and_transitive() {
        let rows = vec![
            row("season", "summer", "year"),
            row("season", "winter", "year"),
            row("day", "summer-day", "summer"),
        ];
        let pairs = transitive_closure(&rows).unwrap();
        // Reflexive.
        for member in ["year", "summer", "winter", "summer-day"] {
            assert!(pairs.contains(&(member.to_string(), member.to_string())));
        }
        // Transitive: year reaches the grandchild.
        assert!(pairs.contains(&("year".into(), "summer-day".into())));
        assert!(pairs.contains(&("summer".into(), "summer-day".into())));
        // No upward edges.
        assert!(!pairs.contains(&("summer".into(), "year".into())));
    }

    #[test]
    fn forest_check_flags_missing_parent() {
        let rows = vec![row("season", "summer", "yaer")];
        assert!(check_forest(&rows, &["year"]).is_err());
        let rows = vec![row("season", "summer", "year")];
        assert!(check_forest(&rows, &["year"]).is_ok());
    }
}
