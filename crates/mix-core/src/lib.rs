//! # mix-core: Scenario Data Model Core
//!
//! Fundamental data structures for a versioned database of linear-programming
//! energy-system scenarios (the MESSAGE formulation and its MACRO extension).
//!
//! ## Design Philosophy
//!
//! Everything a scenario may contain (index sets, relation tables,
//! parameters, variables, equations) is declared once in a process-wide
//! [`registry::Registry`]. Scenarios are plain containers validated against
//! that registry on every write:
//!
//! - **Items**: set tuples, parameter rows `(key, value, unit)`, and
//!   variable/equation rows `(key, level, marginal)`
//! - **Transactions**: explicit check-out/commit with a scoped
//!   [`scenario::Scenario::transact`] helper
//! - **Year structure**: `cat_year` categories, `duration_period` inference,
//!   and the lifetime window predicates used by the transformations
//!
//! ## Modules
//!
//! - [`registry`] - Declarative MESSAGE/MACRO item tables
//! - [`scenario`] - The versioned scenario container
//! - [`hierarchy`] - Spatial/temporal forest closure (`map_node`, `map_time`)
//! - [`horizon`] - Period arithmetic and lifetime windows
//! - [`units`] - Required units and modal-unit selection
//!
//! ## Integration
//!
//! The `mix-store` crate persists scenarios behind a backend contract; the
//! `mix-transform` crate implements the horizon extension and time-slice
//! expansion on top of this data model.

pub mod error;
pub mod hierarchy;
pub mod horizon;
pub mod registry;
pub mod scenario;
pub mod units;

pub use error::{MixError, MixResult};
pub use registry::{registry, Item, ItemKind, Registry, Scheme};
pub use scenario::{
    key_matches, parse_year, Filters, ItemData, ParRow, Scenario, ScenarioId, SolRow,
};
