//! Unit bookkeeping.
//!
//! Units are opaque strings in the core; the only semantic operations are
//! "which units must exist on any open platform" and "what is the modal
//! unit under a commodity". The modal unit drives the horizon extender's
//! `unit_check` normalization.

use std::collections::BTreeMap;

/// Units every platform must know about. Missing entries on a legacy store
/// are auto-added with a warning at open time.
pub const REQUIRED_UNITS: &[&str] = &[
    "-", "%", "???", "cases", "kg", "km", "t", "tC", "tCO2", "USD", "y", "G$", "GW", "GWa", "MW",
    "MWa", "T$", "kg/kWa", "USD/GWa", "USD/kg", "USD/km", "USD/kWa", "USD/tC", "USD/tCO2",
];

/// The most frequent unit in a list; ties resolve to the lexicographically
/// smaller unit so the result is deterministic.
pub fn modal_unit<'a, I: IntoIterator<Item = &'a str>>(units: I) -> Option<String> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for unit in units {
        *counts.entry(unit).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .max_by(|a, b| a.1.cmp(&b.1).then(b.0.cmp(a.0)))
        .map(|(unit, _)| unit.to_string())
}

/// Per-commodity unit registry enforcing one unit per commodity.
#[derive(Debug, Clone, Default)]
pub struct CommodityUnits {
    map: BTreeMap<String, String>,
}

impl CommodityUnits {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the unit chosen for a commodity; returns the previously
    /// recorded unit when it differs.
    pub fn assign(&mut self, commodity: &str, unit: &str) -> Option<String> {
        match self.map.get(commodity) {
            Some(existing) if existing != unit => Some(existing.clone()),
            Some(_) => None,
            None => {
                self.map.insert(commodity.to_string(), unit.to_string());
                None
            }
        }
    }

    pub fn unit_of(&self, commodity: &str) -> Option<&str> {
        self.map.get(commodity).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modal_unit_picks_most_frequent() {
        let units = ["GWa", "GWa", "MWa"];
        assert_eq!(modal_unit(units).as_deref(), Some("GWa"));
    }

    #[test]
    fn modal_unit_tie_breaks_deterministically() {
        let units = ["MWa", "GWa"];
        assert_eq!(modal_unit(units).as_deref(), Some("GWa"));
        assert_eq!(modal_unit([]).as_deref(), None);
    }

    #[test]
    fn commodity_units_flag_conflicts() {
        let mut reg = CommodityUnits::new();
        assert_eq!(reg.assign("electricity", "GWa"), None);
        assert_eq!(reg.assign("electricity", "GWa"), None);
        assert_eq!(reg.assign("electricity", "MWa").as_deref(), Some("GWa"));
        assert_eq!(reg.unit_of("electricity"), Some("GWa"));
    }
}
