//! Versioned scenario container.
//!
//! A [`Scenario`] holds the items of one (model, scenario, version) triple:
//! set tuples, parameter rows with values and units, and variable/equation
//! rows with (level, marginal) pairs after a solve. Items conform to the
//! process-wide item registry; all writes are validated against it.
//!
//! Mutation is legal only between `check_out` and `commit`. The scoped
//! [`Scenario::transact`] helper guarantees release on all exit paths and is
//! a no-op when the scenario is already checked out.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{MixError, MixResult};
use crate::registry::{registry, Item, ItemKind, Scheme};

/// Identity of a scenario within a platform.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ScenarioId {
    pub model: String,
    pub scenario: String,
    pub version: u32,
}

impl std::fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}#{}", self.model, self.scenario, self.version)
    }
}

/// One parameter row: index-tuple, value, unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParRow {
    pub key: Vec<String>,
    pub value: f64,
    pub unit: String,
}

impl ParRow {
    pub fn new<K: Into<String>>(key: Vec<K>, value: f64, unit: &str) -> Self {
        Self {
            key: key.into_iter().map(Into::into).collect(),
            value,
            unit: unit.to_string(),
        }
    }
}

/// One variable/equation row after solution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolRow {
    pub key: Vec<String>,
    pub level: f64,
    pub marginal: f64,
}

/// Payload of a set-kind item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SetData {
    pub dims: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Payload of a parameter item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParData {
    pub dims: Vec<String>,
    pub rows: Vec<ParRow>,
}

/// Payload of a variable or equation item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SolData {
    pub dims: Vec<String>,
    pub rows: Vec<SolRow>,
}

/// Stored payload of one item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ItemData {
    Set(SetData),
    Par(ParData),
    Var(SolData),
    Equ(SolData),
}

impl ItemData {
    pub fn dims(&self) -> &[String] {
        match self {
            ItemData::Set(d) => &d.dims,
            ItemData::Par(d) => &d.dims,
            ItemData::Var(d) => &d.dims,
            ItemData::Equ(d) => &d.dims,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            ItemData::Set(d) => d.rows.is_empty(),
            ItemData::Par(d) => d.rows.is_empty(),
            ItemData::Var(d) => d.rows.is_empty(),
            ItemData::Equ(d) => d.rows.is_empty(),
        }
    }

    /// Empty payload matching a registry item.
    pub fn empty_for(item: &Item) -> Self {
        let dims = item.dims.clone();
        match item.kind {
            ItemKind::Set | ItemKind::IndexedSet => ItemData::Set(SetData { dims, rows: vec![] }),
            ItemKind::Parameter => ItemData::Par(ParData { dims, rows: vec![] }),
            ItemKind::Variable => ItemData::Var(SolData { dims, rows: vec![] }),
            ItemKind::Equation => ItemData::Equ(SolData { dims, rows: vec![] }),
        }
    }
}

/// Filter map from dimension name to admitted members.
pub type Filters = BTreeMap<String, Vec<String>>;

/// Check one index-tuple against a filter map.
pub fn key_matches(dims: &[String], key: &[String], filters: &Filters) -> bool {
    for (dim, allowed) in filters {
        match dims.iter().position(|d| d == dim) {
            Some(pos) => {
                if !allowed.contains(&key[pos]) {
                    return false;
                }
            }
            None => return false,
        }
    }
    true
}

/// A versioned container of model data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pub model: String,
    pub scenario: String,
    pub version: u32,
    scheme: Scheme,
    items: BTreeMap<String, ItemData>,
    checked_out: bool,
    has_solution: bool,
    last_commit: Option<String>,
    #[serde(skip)]
    snapshot: Option<BTreeMap<String, ItemData>>,
}

impl Scenario {
    /// Create a fresh, checked-out scenario. Only MESSAGE (and, after
    /// conversion, MESSAGE-MACRO) schemes are accepted at construction.
    pub fn new(model: &str, scenario: &str, scheme: Scheme) -> MixResult<Self> {
        if scheme == Scheme::Macro {
            return Err(MixError::Schema(
                "scenarios must be constructed with scheme MESSAGE or MESSAGE-MACRO".into(),
            ));
        }
        Ok(Self {
            model: model.to_string(),
            scenario: scenario.to_string(),
            version: 0,
            scheme,
            items: BTreeMap::new(),
            checked_out: true,
            has_solution: false,
            last_commit: None,
            snapshot: None,
        })
    }

    pub fn id(&self) -> ScenarioId {
        ScenarioId {
            model: self.model.clone(),
            scenario: self.scenario.clone(),
            version: self.version,
        }
    }

    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    /// Convert a MESSAGE scenario to the MESSAGE-MACRO union scheme.
    pub fn set_scheme_message_macro(&mut self) {
        self.scheme = Scheme::MessageMacro;
    }

    // ------------------------------------------------------------------
    // Transaction state
    // ------------------------------------------------------------------

    pub fn is_checked_out(&self) -> bool {
        self.checked_out
    }

    /// Acquire the write lock. Fails when already held or when a solution
    /// is still attached.
    pub fn check_out(&mut self) -> MixResult<()> {
        if self.checked_out {
            return Err(MixError::Transaction(format!(
                "scenario {} is already checked out",
                self.id()
            )));
        }
        if self.has_solution {
            return Err(MixError::Solution(format!(
                "scenario {} has a solution; remove it before checking out",
                self.id()
            )));
        }
        self.snapshot = Some(self.items.clone());
        self.checked_out = true;
        Ok(())
    }

    /// Commit pending changes with a descriptive message.
    pub fn commit(&mut self, message: &str) -> MixResult<()> {
        if !self.checked_out {
            return Err(MixError::Transaction(format!(
                "scenario {} is not checked out",
                self.id()
            )));
        }
        self.checked_out = false;
        self.snapshot = None;
        self.last_commit = Some(message.to_string());
        Ok(())
    }

    /// Drop pending changes and release the write lock.
    pub fn discard_changes(&mut self) -> MixResult<()> {
        if !self.checked_out {
            return Err(MixError::Transaction(format!(
                "scenario {} is not checked out",
                self.id()
            )));
        }
        if let Some(snapshot) = self.snapshot.take() {
            self.items = snapshot;
        }
        self.checked_out = false;
        Ok(())
    }

    pub fn last_commit_message(&self) -> Option<&str> {
        self.last_commit.as_deref()
    }

    /// Scoped write transaction: checks out if needed, commits on success,
    /// discards on error. A nested call (scenario already checked out) runs
    /// the closure directly and leaves lock handling to the outer scope.
    pub fn transact<T>(
        &mut self,
        message: &str,
        f: impl FnOnce(&mut Scenario) -> MixResult<T>,
    ) -> MixResult<T> {
        if self.checked_out {
            return f(self);
        }
        self.check_out()?;
        match f(self) {
            Ok(value) => {
                self.commit(message)?;
                Ok(value)
            }
            Err(err) => {
                self.discard_changes()?;
                Err(err)
            }
        }
    }

    fn ensure_writable(&self) -> MixResult<()> {
        if !self.checked_out {
            return Err(MixError::Transaction(format!(
                "scenario {} must be checked out before writing",
                self.id()
            )));
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Solution state
    // ------------------------------------------------------------------

    pub fn has_solution(&self) -> bool {
        self.has_solution
    }

    /// Drop all variable/equation levels and clear the solution flag.
    pub fn remove_solution(&mut self) -> MixResult<()> {
        for data in self.items.values_mut() {
            match data {
                ItemData::Var(d) | ItemData::Equ(d) => d.rows.clear(),
                _ => {}
            }
        }
        self.has_solution = false;
        Ok(())
    }

    /// Record solution rows for a variable or equation (typically done by
    /// the solver glue after a run).
    pub fn set_solution(&mut self, name: &str, rows: Vec<SolRow>) -> MixResult<()> {
        let item = self.registry_item(name)?;
        let arity = item.arity();
        for row in &rows {
            self.check_arity(name, arity, row.key.len())?;
        }
        match self.items.get_mut(name) {
            Some(ItemData::Var(d)) | Some(ItemData::Equ(d)) => {
                d.rows = rows;
                self.has_solution = true;
                Ok(())
            }
            _ => Err(MixError::Schema(format!(
                "item '{name}' is not a variable or equation"
            ))),
        }
    }

    // ------------------------------------------------------------------
    // Item access
    // ------------------------------------------------------------------

    fn registry_item(&self, name: &str) -> MixResult<&'static Item> {
        registry()
            .lookup_in(self.scheme, name)
            .ok_or_else(|| MixError::Schema(format!("item '{name}' is not declared in the registry")))
    }

    fn check_arity(&self, name: &str, expected: usize, got: usize) -> MixResult<()> {
        if expected != got {
            return Err(MixError::Schema(format!(
                "item '{name}' expects {expected} index columns, got {got}"
            )));
        }
        Ok(())
    }

    pub fn has_item(&self, name: &str) -> bool {
        self.items.contains_key(name)
    }

    pub fn item(&self, name: &str) -> Option<&ItemData> {
        self.items.get(name)
    }

    pub fn item_names(&self) -> impl Iterator<Item = &String> {
        self.items.keys()
    }

    /// Install an empty item matching the registry descriptor, replacing any
    /// existing payload. Used by structural initialization.
    pub fn init_item(&mut self, item: &Item) -> MixResult<()> {
        self.ensure_writable()?;
        self.items
            .insert(item.name.clone(), ItemData::empty_for(item));
        Ok(())
    }

    /// Remove an item payload entirely (used when re-initializing empty
    /// items with divergent dimension names).
    pub fn drop_item(&mut self, name: &str) -> MixResult<()> {
        self.ensure_writable()?;
        self.items.remove(name);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Sets
    // ------------------------------------------------------------------

    /// Add rows to a set. Index sets take single-element rows; indexed sets
    /// take rows matching their declared arity. Duplicate rows are ignored.
    pub fn add_set(&mut self, name: &str, rows: Vec<Vec<String>>) -> MixResult<()> {
        self.ensure_writable()?;
        let item = self.registry_item(name)?;
        let expected = match item.kind {
            ItemKind::Set => 1,
            ItemKind::IndexedSet => item.arity(),
            _ => {
                return Err(MixError::Schema(format!("item '{name}' is not a set")));
            }
        };
        for row in &rows {
            self.check_arity(name, expected, row.len())?;
        }
        let entry = self
            .items
            .entry(name.to_string())
            .or_insert_with(|| ItemData::empty_for(item));
        match entry {
            ItemData::Set(data) => {
                for row in rows {
                    if !data.rows.contains(&row) {
                        data.rows.push(row);
                    }
                }
                Ok(())
            }
            _ => Err(MixError::Schema(format!("item '{name}' is not a set"))),
        }
    }

    /// Convenience: add single elements to an index set.
    pub fn add_set_elements(&mut self, name: &str, elements: &[&str]) -> MixResult<()> {
        self.add_set(
            name,
            elements.iter().map(|e| vec![e.to_string()]).collect(),
        )
    }

    pub fn set_rows(&self, name: &str) -> MixResult<&[Vec<String>]> {
        match self.items.get(name) {
            Some(ItemData::Set(data)) => Ok(&data.rows),
            Some(_) => Err(MixError::Schema(format!("item '{name}' is not a set"))),
            None => Err(MixError::NotFound(format!("set '{name}'"))),
        }
    }

    /// Members of an index set (first column of each row).
    pub fn set_members(&self, name: &str) -> MixResult<Vec<String>> {
        Ok(self
            .set_rows(name)?
            .iter()
            .filter_map(|row| row.first().cloned())
            .collect())
    }

    pub fn remove_set_rows(&mut self, name: &str, rows: &[Vec<String>]) -> MixResult<()> {
        self.ensure_writable()?;
        match self.items.get_mut(name) {
            Some(ItemData::Set(data)) => {
                data.rows.retain(|row| !rows.contains(row));
                Ok(())
            }
            Some(_) => Err(MixError::Schema(format!("item '{name}' is not a set"))),
            None => Err(MixError::NotFound(format!("set '{name}'"))),
        }
    }

    // ------------------------------------------------------------------
    // Parameters
    // ------------------------------------------------------------------

    /// Upsert parameter rows (atomic per call: all rows validated first).
    pub fn add_par(&mut self, name: &str, rows: Vec<ParRow>) -> MixResult<()> {
        self.ensure_writable()?;
        let item = self.registry_item(name)?;
        if item.kind != ItemKind::Parameter {
            return Err(MixError::Schema(format!("item '{name}' is not a parameter")));
        }
        let arity = item.arity();
        for row in &rows {
            self.check_arity(name, arity, row.key.len())?;
        }
        let entry = self
            .items
            .entry(name.to_string())
            .or_insert_with(|| ItemData::empty_for(item));
        match entry {
            ItemData::Par(data) => {
                for row in rows {
                    match data.rows.iter_mut().find(|r| r.key == row.key) {
                        Some(existing) => *existing = row,
                        None => data.rows.push(row),
                    }
                }
                Ok(())
            }
            _ => Err(MixError::Schema(format!("item '{name}' is not a parameter"))),
        }
    }

    pub fn par_rows(&self, name: &str) -> MixResult<&[ParRow]> {
        match self.items.get(name) {
            Some(ItemData::Par(data)) => Ok(&data.rows),
            Some(_) => Err(MixError::Schema(format!("item '{name}' is not a parameter"))),
            None => Err(MixError::NotFound(format!("parameter '{name}'"))),
        }
    }

    /// Parameter rows restricted by a dimension-name filter map.
    pub fn par_rows_filtered(&self, name: &str, filters: &Filters) -> MixResult<Vec<ParRow>> {
        match self.items.get(name) {
            Some(ItemData::Par(data)) => Ok(data
                .rows
                .iter()
                .filter(|row| key_matches(&data.dims, &row.key, filters))
                .cloned()
                .collect()),
            Some(_) => Err(MixError::Schema(format!("item '{name}' is not a parameter"))),
            None => Err(MixError::NotFound(format!("parameter '{name}'"))),
        }
    }

    pub fn remove_par_rows(&mut self, name: &str, keys: &[Vec<String>]) -> MixResult<()> {
        self.ensure_writable()?;
        match self.items.get_mut(name) {
            Some(ItemData::Par(data)) => {
                data.rows.retain(|row| !keys.contains(&row.key));
                Ok(())
            }
            Some(_) => Err(MixError::Schema(format!("item '{name}' is not a parameter"))),
            None => Err(MixError::NotFound(format!("parameter '{name}'"))),
        }
    }

    /// Clear all rows of a parameter.
    pub fn clear_par(&mut self, name: &str) -> MixResult<()> {
        self.ensure_writable()?;
        match self.items.get_mut(name) {
            Some(ItemData::Par(data)) => {
                data.rows.clear();
                Ok(())
            }
            Some(_) => Err(MixError::Schema(format!("item '{name}' is not a parameter"))),
            None => Err(MixError::NotFound(format!("parameter '{name}'"))),
        }
    }

    /// Variable/equation rows (levels and marginals).
    pub fn sol_rows(&self, name: &str) -> MixResult<&[SolRow]> {
        match self.items.get(name) {
            Some(ItemData::Var(data)) | Some(ItemData::Equ(data)) => Ok(&data.rows),
            Some(_) => Err(MixError::Schema(format!(
                "item '{name}' is not a variable or equation"
            ))),
            None => Err(MixError::NotFound(format!("item '{name}'"))),
        }
    }

    // ------------------------------------------------------------------
    // Year structure
    // ------------------------------------------------------------------

    /// Periods of the horizon, sorted ascending.
    pub fn years(&self) -> MixResult<Vec<i32>> {
        let mut years = Vec::new();
        for member in self.set_members("year")? {
            years.push(parse_year(&member)?);
        }
        years.sort_unstable();
        Ok(years)
    }

    /// Years under a `type_year` category in `cat_year`.
    pub fn years_in_category(&self, type_year: &str) -> MixResult<Vec<i32>> {
        let mut years = Vec::new();
        for row in self.set_rows("cat_year")? {
            if row[0] == type_year {
                years.push(parse_year(&row[1])?);
            }
        }
        years.sort_unstable();
        Ok(years)
    }

    /// The single year under `cat_year[type_year=firstmodelyear]`.
    pub fn firstmodelyear(&self) -> MixResult<i32> {
        let years = self.years_in_category("firstmodelyear")?;
        match years.as_slice() {
            [year] => Ok(*year),
            [] => Err(MixError::NotFound(
                "cat_year has no firstmodelyear entry".into(),
            )),
            _ => Err(MixError::Schema(format!(
                "cat_year has {} firstmodelyear entries; exactly one is required",
                years.len()
            ))),
        }
    }

    /// `duration_period` as a year-to-length map.
    pub fn duration_period(&self) -> MixResult<BTreeMap<i32, f64>> {
        let mut map = BTreeMap::new();
        for row in self.par_rows("duration_period")? {
            map.insert(parse_year(&row.key[0])?, row.value);
        }
        Ok(map)
    }

    /// `duration_time` as a slice-to-fraction map.
    pub fn duration_time(&self) -> MixResult<BTreeMap<String, f64>> {
        let mut map = BTreeMap::new();
        for row in self.par_rows("duration_time")? {
            map.insert(row.key[0].clone(), row.value);
        }
        Ok(map)
    }
}

/// Parse a year-set member to its numeric value.
pub fn parse_year(member: &str) -> MixResult<i32> {
    member
        .parse::<i32>()
        .map_err(|_| MixError::Parse(format!("'{member}' is not a valid period")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario() -> Scenario {
        Scenario::new("model", "baseline", Scheme::Message).unwrap()
    }

    #[test]
    fn construction_rejects_macro_scheme() {
        assert!(Scenario::new("m", "s", Scheme::Macro).is_err());
        assert!(Scenario::new("m", "s", Scheme::MessageMacro).is_ok());
    }

    #[test]
    fn writes_require_check_out() {
        let mut scn = scenario();
        scn.commit("initial").unwrap();
        let err = scn.add_set_elements("year", &["2020"]).unwrap_err();
        assert!(matches!(err, MixError::Transaction(_)));
        scn.check_out().unwrap();
        scn.add_set_elements("year", &["2020"]).unwrap();
        scn.commit("add year").unwrap();
        assert_eq!(scn.set_members("year").unwrap(), vec!["2020"]);
    }

    #[test]
    fn discard_restores_snapshot() {
        let mut scn = scenario();
        scn.add_set_elements("year", &["2020"]).unwrap();
        scn.commit("initial").unwrap();
        scn.check_out().unwrap();
        scn.add_set_elements("year", &["2030"]).unwrap();
        scn.discard_changes().unwrap();
        assert_eq!(scn.set_members("year").unwrap(), vec!["2020"]);
    }

    #[test]
    fn transact_commits_on_success_and_is_reentrant() {
        let mut scn = scenario();
        scn.commit("initial").unwrap();
        scn.transact("outer", |s| {
            s.add_set_elements("technology", &["coal_ppl"])?;
            // Nested call must not commit or release the outer transaction.
            s.transact("inner", |s2| s2.add_set_elements("mode", &["standard"]))
        })
        .unwrap();
        assert!(!scn.is_checked_out());
        assert_eq!(scn.last_commit_message(), Some("outer"));
        assert_eq!(scn.set_members("technology").unwrap(), vec!["coal_ppl"]);
        assert_eq!(scn.set_members("mode").unwrap(), vec!["standard"]);
    }

    #[test]
    fn transact_discards_on_error() {
        let mut scn = scenario();
        scn.commit("initial").unwrap();
        let result: MixResult<()> = scn.transact("failing", |s| {
            s.add_set_elements("year", &["2020"])?;
            Err(MixError::Other("boom".into()))
        });
        assert!(result.is_err());
        assert!(!scn.is_checked_out());
        assert!(scn.set_rows("year").is_err());
    }

    #[test]
    fn add_par_validates_name_and_arity() {
        let mut scn = scenario();
        let err = scn
            .add_par("no_such_par", vec![ParRow::new(vec!["x"], 1.0, "-")])
            .unwrap_err();
        assert!(matches!(err, MixError::Schema(_)));

        // inv_cost is (node_loc, technology, year_vtg).
        let err = scn
            .add_par("inv_cost", vec![ParRow::new(vec!["n1", "tec"], 1.0, "USD")])
            .unwrap_err();
        assert!(matches!(err, MixError::Schema(_)));

        scn.add_par(
            "inv_cost",
            vec![ParRow::new(vec!["n1", "tec", "2020"], 1.0, "USD")],
        )
        .unwrap();
        assert_eq!(scn.par_rows("inv_cost").unwrap().len(), 1);
    }

    #[test]
    fn add_par_upserts_by_key() {
        let mut scn = scenario();
        scn.add_par(
            "inv_cost",
            vec![ParRow::new(vec!["n1", "tec", "2020"], 1.0, "USD")],
        )
        .unwrap();
        scn.add_par(
            "inv_cost",
            vec![ParRow::new(vec!["n1", "tec", "2020"], 2.0, "USD")],
        )
        .unwrap();
        let rows = scn.par_rows("inv_cost").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].value, 2.0);
    }

    #[test]
    fn filters_restrict_by_dimension_name() {
        let mut scn = scenario();
        scn.add_par(
            "inv_cost",
            vec![
                ParRow::new(vec!["n1", "tec", "2020"], 1.0, "USD"),
                ParRow::new(vec!["n2", "tec", "2020"], 2.0, "USD"),
            ],
        )
        .unwrap();
        let mut filters = Filters::new();
        filters.insert("node_loc".into(), vec!["n1".into()]);
        let rows = scn.par_rows_filtered("inv_cost", &filters).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].value, 1.0);
    }

    #[test]
    fn firstmodelyear_requires_unique_entry() {
        let mut scn = scenario();
        scn.add_set_elements("type_year", &["firstmodelyear"]).unwrap();
        scn.add_set_elements("year", &["2020", "2030"]).unwrap();
        assert!(scn.firstmodelyear().is_err());
        scn.add_set("cat_year", vec![vec!["firstmodelyear".into(), "2020".into()]])
            .unwrap();
        assert_eq!(scn.firstmodelyear().unwrap(), 2020);
        scn.add_set("cat_year", vec![vec!["firstmodelyear".into(), "2030".into()]])
            .unwrap();
        assert!(matches!(scn.firstmodelyear(), Err(MixError::Schema(_))));
    }

    #[test]
    fn solution_blocks_check_out_until_removed() {
        let mut scn = scenario();
        scn.commit("initial").unwrap();
        scn.check_out().unwrap();
        scn.init_item(registry().lookup("OBJ").unwrap()).unwrap();
        scn.set_solution(
            "OBJ",
            vec![SolRow {
                key: vec![],
                level: 42.0,
                marginal: 0.0,
            }],
        )
        .unwrap();
        scn.commit("solved").unwrap();
        assert!(scn.has_solution());
        assert!(matches!(scn.check_out(), Err(MixError::Solution(_))));
        scn.remove_solution().unwrap();
        scn.check_out().unwrap();
        assert!(scn.sol_rows("OBJ").unwrap().is_empty());
    }

    #[test]
    fn years_parse_and_sort() {
        let mut scn = scenario();
        scn.add_set_elements("year", &["2030", "2020", "2040"]).unwrap();
        assert_eq!(scn.years().unwrap(), vec![2020, 2030, 2040]);
        scn.add_set_elements("year", &["not-a-year"]).unwrap();
        assert!(scn.years().is_err());
    }
}
