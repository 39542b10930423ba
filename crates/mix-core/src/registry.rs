//! Declarative item registry for the MESSAGE and MACRO formulations.
//!
//! Every equation, parameter, set, and variable a scenario may carry is
//! declared here once, with its ordered tuple of indexing sets and distinct
//! dimension names. The registry is the single source of truth for:
//!
//! - structural initialization (`Platform::initialize` reads it to decide
//!   which items to create),
//! - the horizon extender's question "which columns of this parameter are
//!   indexed by `year`?",
//! - the time-slice expander's question "which columns are sub-annual?".
//!
//! Items are declared with a space-separated token string; each two-letter
//! token expands into a `(set, dimension)` pair. For example `nl` expands to
//! `(node, node_loc)` and `yv` to `(year, year_vtg)`.
//!
//! The registry is built once at process start behind a
//! [`once_cell::sync::Lazy`] and is read-only afterwards.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::{MixError, MixResult};

/// Kind of a scenario item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    /// Plain index set (one column, no backing coords).
    Set,
    /// Relation table over one or more index sets.
    IndexedSet,
    Parameter,
    Variable,
    Equation,
}

/// Which item family a scenario requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Scheme {
    Message,
    Macro,
    MessageMacro,
}

impl Scheme {
    pub fn from_str(input: &str) -> MixResult<Self> {
        match input {
            "MESSAGE" => Ok(Scheme::Message),
            "MACRO" => Ok(Scheme::Macro),
            "MESSAGE-MACRO" => Ok(Scheme::MessageMacro),
            other => Err(MixError::Parse(format!(
                "unknown scheme '{other}'; supported values: MESSAGE, MACRO, MESSAGE-MACRO"
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::Message => "MESSAGE",
            Scheme::Macro => "MACRO",
            Scheme::MessageMacro => "MESSAGE-MACRO",
        }
    }
}

/// Structural descriptor of one scenario item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    pub kind: ItemKind,
    /// Index sets whose Cartesian product the item is indexed over.
    /// Repeats are allowed when the same set indexes multiple columns.
    pub coords: Vec<String>,
    /// Distinct dimension names, parallel to `coords`.
    pub dims: Vec<String>,
    pub description: Option<String>,
    /// GAMS-side name when it differs from the item name.
    pub gams_name: Option<String>,
}

impl Item {
    /// Positions (and dimension names) of columns backed by the given set.
    pub fn dims_backed_by(&self, set: &str) -> Vec<(usize, &str)> {
        self.coords
            .iter()
            .enumerate()
            .filter(|(_, coord)| coord.as_str() == set)
            .map(|(pos, _)| (pos, self.dims[pos].as_str()))
            .collect()
    }

    /// Position of the first dimension with the given name, if any.
    pub fn dim_position(&self, dim: &str) -> Option<usize> {
        self.dims.iter().position(|d| d == dim)
    }

    pub fn arity(&self) -> usize {
        self.coords.len()
    }
}

/// Fixed table of two-letter dimension abbreviations.
///
/// Each entry is `(token, set, dimension)`.
const DIM_TOKENS: &[(&str, &str, &str)] = &[
    ("n", "node", "node"),
    ("nd", "node", "node_dest"),
    ("nl", "node", "node_loc"),
    ("no", "node", "node_origin"),
    ("np", "node", "node_parent"),
    ("nr", "node", "node_rel"),
    ("ns", "node", "node_share"),
    ("y", "year", "year"),
    ("ya", "year", "year_act"),
    ("yv", "year", "year_vtg"),
    ("yr", "year", "year_rel"),
    ("h", "time", "time"),
    ("hd", "time", "time_dest"),
    ("ho", "time", "time_origin"),
    ("hp", "time", "time_parent"),
    ("c", "commodity", "commodity"),
    ("e", "emission", "emission"),
    ("g", "grade", "grade"),
    ("l", "level", "level"),
    ("m", "mode", "mode"),
    ("q", "rating", "rating"),
    ("r", "relation", "relation"),
    ("s", "land_scenario", "land_scenario"),
    ("sec", "sector", "sector"),
    ("sh", "shares", "shares"),
    ("t", "technology", "technology"),
    ("ta", "technology", "technology_addon"),
    ("tp", "technology", "technology_primary"),
    ("ts", "technology", "technology_storage"),
    ("u", "land_type", "land_type"),
    ("ls", "lvl_spatial", "lvl_spatial"),
    ("lt", "lvl_temporal", "lvl_temporal"),
    ("tad", "type_addon", "type_addon"),
    ("te", "type_emission", "type_emission"),
    ("tn", "type_node", "type_node"),
    ("tr", "type_relation", "type_relation"),
    ("tt", "type_tec", "type_tec"),
    ("ty", "type_year", "type_year"),
];

/// Expand a space-separated token string into parallel coord/dim tuples.
fn expand_tokens(expr: &str) -> MixResult<(Vec<String>, Vec<String>)> {
    let mut coords = Vec::new();
    let mut dims = Vec::new();
    for token in expr.split_whitespace() {
        let (_, set, dim) = DIM_TOKENS
            .iter()
            .find(|(tok, _, _)| *tok == token)
            .ok_or_else(|| {
                MixError::Schema(format!("unknown dimension token '{token}' in '{expr}'"))
            })?;
        coords.push((*set).to_string());
        dims.push((*dim).to_string());
    }
    Ok((coords, dims))
}

/// One scheme's worth of declarations, in declaration order.
#[derive(Debug, Default)]
struct SchemeItems {
    items: Vec<Item>,
    by_name: HashMap<String, usize>,
}

impl SchemeItems {
    fn declare(&mut self, item: Item) -> MixResult<()> {
        if self.by_name.contains_key(&item.name) {
            return Err(MixError::Schema(format!(
                "item '{}' is already declared for this scheme",
                item.name
            )));
        }
        self.by_name.insert(item.name.clone(), self.items.len());
        self.items.push(item);
        Ok(())
    }

    fn get(&self, name: &str) -> Option<&Item> {
        self.by_name.get(name).map(|&idx| &self.items[idx])
    }
}

/// Process-wide immutable registry of MESSAGE and MACRO items.
#[derive(Debug, Default)]
pub struct Registry {
    message: SchemeItems,
    macro_: SchemeItems,
}

impl Registry {
    fn declare(
        &mut self,
        scheme: Scheme,
        kind: ItemKind,
        name: &str,
        expr: &str,
        description: &str,
    ) -> MixResult<()> {
        let (coords, dims) = expand_tokens(expr)?;
        debug_assert_eq!(coords.len(), dims.len());
        if scheme == Scheme::MessageMacro {
            return Err(MixError::Schema(
                "declare items under MESSAGE or MACRO; the union is derived".into(),
            ));
        }
        // Every coordinate must be a set declared earlier; MACRO items may
        // also reference MESSAGE index sets.
        if kind != ItemKind::Set {
            let own = match scheme {
                Scheme::Message => &self.message,
                _ => &self.macro_,
            };
            for coord in &coords {
                let known = own
                    .get(coord)
                    .map(|i| i.kind == ItemKind::Set)
                    .unwrap_or(false)
                    || (scheme == Scheme::Macro
                        && self
                            .message
                            .get(coord)
                            .map(|i| i.kind == ItemKind::Set)
                            .unwrap_or(false));
                if !known {
                    return Err(MixError::Schema(format!(
                        "item '{name}' references undeclared index set '{coord}'"
                    )));
                }
            }
        }
        let description = if description.is_empty() {
            None
        } else {
            Some(description.to_string())
        };
        let family = match scheme {
            Scheme::Message => &mut self.message,
            _ => &mut self.macro_,
        };
        family.declare(Item {
            name: name.to_string(),
            kind,
            coords,
            dims,
            description,
            gams_name: None,
        })
    }

    fn rename_gams(&mut self, scheme: Scheme, name: &str, gams: &str) -> MixResult<()> {
        let family = match scheme {
            Scheme::Message => &mut self.message,
            _ => &mut self.macro_,
        };
        let idx = *family
            .by_name
            .get(name)
            .ok_or_else(|| MixError::NotFound(format!("item '{name}'")))?;
        family.items[idx].gams_name = Some(gams.to_string());
        Ok(())
    }

    /// Look an item up across both schemes (MESSAGE wins on collision).
    pub fn lookup(&self, name: &str) -> Option<&Item> {
        self.message.get(name).or_else(|| self.macro_.get(name))
    }

    /// Look an item up within the scheme's own family (the union prefers
    /// MESSAGE where names collide).
    pub fn lookup_in(&self, scheme: Scheme, name: &str) -> Option<&Item> {
        match scheme {
            Scheme::Message => self.message.get(name),
            Scheme::Macro => self.macro_.get(name),
            Scheme::MessageMacro => self.lookup(name),
        }
    }

    /// All items of a kind for a scheme, in deterministic declaration order.
    pub fn items_of_kind(&self, scheme: Scheme, kind: ItemKind) -> Vec<&Item> {
        let mut out: Vec<&Item> = Vec::new();
        match scheme {
            Scheme::Message => out.extend(self.message.items.iter().filter(|i| i.kind == kind)),
            Scheme::Macro => out.extend(self.macro_.items.iter().filter(|i| i.kind == kind)),
            Scheme::MessageMacro => {
                out.extend(self.message.items.iter().filter(|i| i.kind == kind));
                out.extend(
                    self.macro_
                        .items
                        .iter()
                        .filter(|i| i.kind == kind && self.message.get(&i.name).is_none()),
                );
            }
        }
        out
    }

    /// All items (any kind) required by a scheme.
    pub fn items_for(&self, scheme: Scheme) -> Vec<&Item> {
        let mut out: Vec<&Item> = Vec::new();
        match scheme {
            Scheme::Message => out.extend(self.message.items.iter()),
            Scheme::Macro => out.extend(self.macro_.items.iter()),
            Scheme::MessageMacro => {
                out.extend(self.message.items.iter());
                out.extend(
                    self.macro_
                        .items
                        .iter()
                        .filter(|i| self.message.get(&i.name).is_none()),
                );
            }
        }
        out
    }

    /// Dimensions of an item backed by the `year` index set.
    ///
    /// This is the authority the horizon extender consults to classify a
    /// parameter as 0-, 1-, or 2-time-dimensional.
    pub fn time_dims_of(&self, name: &str) -> Vec<(usize, String)> {
        self.lookup(name)
            .map(|item| {
                item.dims_backed_by("year")
                    .into_iter()
                    .map(|(pos, dim)| (pos, dim.to_string()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Dimensions of an item backed by the `time` index set (sub-annual).
    pub fn sub_annual_dims_of(&self, name: &str) -> Vec<(usize, String)> {
        self.lookup(name)
            .map(|item| {
                item.dims_backed_by("time")
                    .into_iter()
                    .map(|(pos, dim)| (pos, dim.to_string()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// True when the item belongs only to the MACRO family.
    pub fn is_macro_only(&self, name: &str) -> bool {
        self.message.get(name).is_none() && self.macro_.get(name).is_some()
    }
}

/// Process-wide registry instance.
pub fn registry() -> &'static Registry {
    static REGISTRY: Lazy<Registry> = Lazy::new(|| {
        build_registry().expect("item registry declarations are internally consistent")
    });
    &REGISTRY
}

#[rustfmt::skip]
fn build_registry() -> MixResult<Registry> {
    use ItemKind::{Equation, IndexedSet, Parameter, Set, Variable};
    use Scheme::{Macro, Message};

    let mut r = Registry::default();

    // ------------------------------------------------------------------
    // MESSAGE index sets
    // ------------------------------------------------------------------
    for (name, descr) in [
        ("commodity", "Resources, electricity, water, land availability, etc."),
        ("emission", "Greenhouse gases, pollutants, etc."),
        ("grade", "Grades of extraction of raw materials"),
        ("land_scenario", "Scenarios of land use (for land-use model emulator)"),
        ("land_type", "Types of land use"),
        ("level", "Levels of the reference energy system or supply chain"),
        ("lvl_spatial", "Levels of spatial disaggregation"),
        ("lvl_temporal", "Levels of temporal disaggregation"),
        ("mode", "Modes of operation"),
        ("node", "Regions, countries, grid cells"),
        ("rating", "Identifies the 'quality' of the renewable energy potential"),
        ("relation", "Names of generic relations (linear constraints)"),
        ("shares", "Share constraint relations"),
        ("technology", "Technologies"),
        ("time", "Sub-annual time slices"),
        ("type_addon", "Type of addon technologies"),
        ("type_emission", "Types of emission aggregations"),
        ("type_node", "Types of nodes"),
        ("type_relation", "Types of relations (linear constraints)"),
        ("type_tec", "Types of technologies"),
        ("type_year", "Types of year aggregations"),
        ("year", "Periods of the model horizon"),
    ] {
        r.declare(Message, Set, name, "", descr)?;
    }

    // ------------------------------------------------------------------
    // MESSAGE indexed (mapping/category) sets
    // ------------------------------------------------------------------
    r.declare(Message, IndexedSet, "addon", "t", "Technologies that can be added onto parent technologies")?;
    r.declare(Message, IndexedSet, "balance_equality", "c l", "Commodities and levels with strict commodity balance")?;
    r.declare(Message, IndexedSet, "cat_addon", "tad ta", "Mapping of addon technologies to respective categories")?;
    r.declare(Message, IndexedSet, "cat_emission", "te e", "Mapping of emissions to categories")?;
    r.declare(Message, IndexedSet, "cat_node", "tn n", "Mapping of nodes to categories")?;
    r.declare(Message, IndexedSet, "cat_relation", "tr r", "Mapping of relations to categories")?;
    r.declare(Message, IndexedSet, "cat_tec", "tt t", "Mapping of technologies to categories")?;
    r.declare(Message, IndexedSet, "cat_year", "ty y", "Mapping of years to categories")?;
    r.declare(Message, IndexedSet, "level_renewable", "l", "Levels related to renewable resources")?;
    r.declare(Message, IndexedSet, "level_resource", "l", "Levels related to fossil resources")?;
    r.declare(Message, IndexedSet, "level_stocks", "l", "Levels with stock accounting")?;
    r.declare(Message, IndexedSet, "map_node", "np n", "Mapping of nodes across hierarchy levels (parent, descendant)")?;
    r.declare(Message, IndexedSet, "map_spatial_hierarchy", "ls n np", "Mapping of spatial resolution (level, child, parent)")?;
    r.declare(Message, IndexedSet, "map_tec", "nl t ya", "Mapping of technologies to periods of operation")?;
    r.declare(Message, IndexedSet, "map_tec_storage", "n t m ts m l c lt", "Mapping of charge/discharge technologies to storage reservoirs")?;
    r.declare(Message, IndexedSet, "map_temporal_hierarchy", "lt h hp", "Mapping of temporal resolution (level, child, parent)")?;
    r.declare(Message, IndexedSet, "map_time", "hp h", "Mapping of time slices across hierarchy levels (parent, descendant)")?;

    // ------------------------------------------------------------------
    // MESSAGE parameters
    // ------------------------------------------------------------------
    for (name, expr) in [
        ("abs_cost_activity_soft_lo", "nl t ya h"),
        ("abs_cost_activity_soft_up", "nl t ya h"),
        ("abs_cost_new_capacity_soft_lo", "nl t yv"),
        ("abs_cost_new_capacity_soft_up", "nl t yv"),
        ("addon_conversion", "n t yv ya m h tad"),
        ("addon_lo", "n t ya m h tad"),
        ("addon_up", "n t ya m h tad"),
        ("bound_activity_lo", "nl t ya m h"),
        ("bound_activity_up", "nl t ya m h"),
        ("bound_emission", "n te tt ty"),
        ("bound_extraction_up", "n c g y"),
        ("bound_new_capacity_lo", "nl t yv"),
        ("bound_new_capacity_up", "nl t yv"),
        ("bound_total_capacity_lo", "nl t ya"),
        ("bound_total_capacity_up", "nl t ya"),
        ("capacity_factor", "nl t yv ya h"),
        ("commodity_stock", "n c l y"),
        ("construction_time", "nl t yv"),
        ("demand", "n c l y h"),
        ("duration_period", "y"),
        ("duration_time", "h"),
        ("emission_factor", "nl t yv ya m e"),
        ("emission_scaling", "te e"),
        ("fix_cost", "nl t yv ya"),
        ("fixed_activity", "nl t yv ya m h"),
        ("fixed_capacity", "nl t yv ya"),
        ("fixed_extraction", "n c g y"),
        ("fixed_land", "n s y"),
        ("fixed_new_capacity", "nl t yv"),
        ("flexibility_factor", "nl t yv ya m c l h q"),
        ("growth_activity_lo", "nl t ya h"),
        ("growth_activity_up", "nl t ya h"),
        ("growth_land_lo", "n s y"),
        ("growth_land_up", "n s y"),
        ("growth_new_capacity_lo", "nl t yv"),
        ("growth_new_capacity_up", "nl t yv"),
        ("historical_activity", "nl t ya m h"),
        ("historical_emission", "n te tt ty"),
        ("historical_extraction", "n c g y"),
        ("historical_land", "n s y"),
        ("historical_new_capacity", "nl t yv"),
        ("initial_activity_lo", "nl t ya h"),
        ("initial_activity_up", "nl t ya h"),
        ("initial_new_capacity_lo", "nl t yv"),
        ("initial_new_capacity_up", "nl t yv"),
        ("input", "nl t yv ya m no c l h ho"),
        ("interestrate", "y"),
        ("inv_cost", "nl t yv"),
        ("land_cost", "n s y"),
        ("land_emission", "n s y e"),
        ("land_input", "n s y c l h"),
        ("land_output", "n s y c l h"),
        ("land_use", "n s y u"),
        ("level_cost_activity_soft_lo", "nl t ya h"),
        ("level_cost_activity_soft_up", "nl t ya h"),
        ("level_cost_new_capacity_soft_lo", "nl t yv"),
        ("level_cost_new_capacity_soft_up", "nl t yv"),
        ("min_utilization_factor", "nl t yv ya"),
        ("operation_factor", "nl t yv ya"),
        ("output", "nl t yv ya m nd c l h hd"),
        ("peak_load_factor", "n c l y h"),
        ("rating_bin", "n t ya c l h q"),
        ("relation_activity", "r nr yr nl t ya m"),
        ("relation_cost", "r nr yr"),
        ("relation_lower", "r nr yr"),
        ("relation_new_capacity", "r nr yr t"),
        ("relation_total_capacity", "r nr yr t"),
        ("relation_upper", "r nr yr"),
        ("renewable_capacity_factor", "n c g l y"),
        ("renewable_potential", "n c g l y"),
        ("resource_cost", "n c g y"),
        ("resource_remaining", "n c g y"),
        ("resource_volume", "n c g"),
        ("share_commodity_lo", "sh ns ya h"),
        ("share_commodity_up", "sh ns ya h"),
        ("share_mode_lo", "sh ns t m ya h"),
        ("share_mode_up", "sh ns t m ya h"),
        ("soft_activity_lo", "nl t ya h"),
        ("soft_activity_up", "nl t ya h"),
        ("soft_new_capacity_lo", "nl t yv"),
        ("soft_new_capacity_up", "nl t yv"),
        ("storage_initial", "n t m l c y h"),
        ("storage_self_discharge", "n t m l c y h"),
        ("subsidy", "nl tt ty"),
        ("tax", "nl tt ty"),
        ("tax_emission", "n te tt ty"),
        ("technical_lifetime", "nl t yv"),
        ("time_order", "lt h"),
        ("var_cost", "nl t yv ya m h"),
    ] {
        r.declare(Message, Parameter, name, expr, "")?;
    }

    // ------------------------------------------------------------------
    // MESSAGE variables
    // ------------------------------------------------------------------
    for (name, expr, descr) in [
        ("ACT", "nl t yv ya m h", "Activity of technology"),
        ("ACT_LO", "nl t ya h", "Relaxation variable for dynamic constraints on activity (downwards)"),
        ("ACT_UP", "nl t ya h", "Relaxation variable for dynamic constraints on activity (upwards)"),
        ("CAP", "nl t yv ya", "Total installed capacity"),
        ("CAP_NEW", "nl t yv", "New capacity"),
        ("COST_NODAL", "n y", "System costs at the node level over time"),
        ("EMISS", "n e tt y", "Aggregate emissions by technology type"),
        ("EXT", "n c g y", "Extraction of fossil resources"),
        ("LAND", "n s y", "Share of given land-use scenario"),
        ("OBJ", "", "Objective value of the optimization program"),
        ("PRICE_COMMODITY", "n c l y h", "Commodity price (undiscounted marginals of the commodity balance)"),
        ("PRICE_EMISSION", "n te tt y", "Emission price (undiscounted marginals of the emission constraint)"),
        ("REL", "r nr yr", "Auxiliary variable for left-hand side of user-defined relations"),
        ("STOCK", "n c l y", "Total quantity in intertemporal stock"),
    ] {
        r.declare(Message, Variable, name, expr, descr)?;
    }

    // ------------------------------------------------------------------
    // MESSAGE equations
    // ------------------------------------------------------------------
    for (name, expr) in [
        ("ACTIVITY_BOUND_ALL_MODES_LO", "nl t ya h"),
        ("ACTIVITY_BOUND_ALL_MODES_UP", "nl t ya h"),
        ("ACTIVITY_BOUND_LO", "nl t ya m h"),
        ("ACTIVITY_BOUND_UP", "nl t ya m h"),
        ("CAPACITY_CONSTRAINT", "nl t yv ya h"),
        ("CAPACITY_MAINTENANCE", "nl t yv ya"),
        ("COMMODITY_BALANCE_GT", "n c l y h"),
        ("COMMODITY_BALANCE_LT", "n c l y h"),
        ("COST_ACCOUNTING_NODAL", "n y"),
        ("EMISSION_CONSTRAINT", "n te tt ty"),
        ("EMISSION_EQUIVALENCE", "n e tt y"),
        ("EXTRACTION_EQUIVALENCE", "n c g y"),
        ("NEW_CAPACITY_BOUND_LO", "nl t yv"),
        ("NEW_CAPACITY_BOUND_UP", "nl t yv"),
        ("OBJECTIVE", ""),
        ("RELATION_CONSTRAINT_LO", "r nr yr"),
        ("RELATION_CONSTRAINT_UP", "r nr yr"),
        ("RESOURCE_CONSTRAINT", "n c g y"),
        ("RESOURCE_HORIZON", "n c g"),
        ("SHARE_CONSTRAINT_COMMODITY_LO", "sh ns ya h"),
        ("SHARE_CONSTRAINT_COMMODITY_UP", "sh ns ya h"),
    ] {
        r.declare(Message, Equation, name, expr, "")?;
    }

    // ------------------------------------------------------------------
    // MACRO scheme
    // ------------------------------------------------------------------
    r.declare(Macro, Set, "sector", "", "Sectors of the economy (MACRO)")?;
    r.declare(Macro, IndexedSet, "mapping_macro_sector", "sec c l", "Mapping of MACRO sectors to MESSAGE commodities and levels")?;

    for (name, expr) in [
        ("MERtoPPP", "n y"),
        ("aeei", "n sec y"),
        ("cost_MESSAGE", "n sec y"),
        ("demand_MESSAGE", "n sec y"),
        ("depr", "n"),
        ("drate", "n"),
        ("esub", "n"),
        ("gdp_calibrate", "n y"),
        ("grow", "n y"),
        ("historical_gdp", "n y"),
        ("kgdp", "n"),
        ("kpvs", "n"),
        ("lakl", "n"),
        ("lotol", "n"),
        ("prfconst", "n sec"),
        ("price_MESSAGE", "n sec y"),
    ] {
        r.declare(Macro, Parameter, name, expr, "")?;
    }
    r.rename_gams(Macro, "cost_MESSAGE", "cost_base")?;
    r.rename_gams(Macro, "demand_MESSAGE", "demand_base")?;
    r.rename_gams(Macro, "price_MESSAGE", "price_base")?;

    for (name, expr, descr) in [
        ("C", "n y", "Consumption"),
        ("GDP", "n y", "Gross domestic product (MACRO)"),
        ("I", "n y", "Investment"),
        ("K", "n y", "Capital stock"),
        ("UTILITY", "", "Utility function (discounted log of consumption)"),
    ] {
        r.declare(Macro, Variable, name, expr, descr)?;
    }

    for (name, expr) in [
        ("CAPITAL_CONSTRAINT", "n y"),
        ("COST_ACCOUNTING", "n y"),
        ("UTILITY_FUNCTION", ""),
    ] {
        r.declare(Macro, Equation, name, expr, "")?;
    }

    Ok(r)
}
