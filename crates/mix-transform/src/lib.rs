//! # mix-transform: Scenario Construction and Evolution
//!
//! The transformations that turn one committed scenario into another:
//! horizon extension with lifetime-aware interpolation, sub-annual
//! time-slice expansion, and the small structural helpers (horizon
//! installation, vintage window queries, index-set renames).
//!
//! ## Modules
//!
//! - [`add_years`] - Enlarge the period horizon and interpolate all data
//! - [`timeslice`] - Move commodity balances to sub-annual slices
//! - [`structural`] - add_horizon, vintage/active year queries, rename

pub mod add_years;
pub mod structural;
pub mod timeslice;

pub use add_years::{add_years, AddYearsOptions};
pub use structural::{
    add_horizon, rename, update_node_mapping, vintage_and_active_years, years_active, VintageFilter,
};
pub use timeslice::{expand_time_slices, FactorOverride, SliceDef, SliceTable, TimeSliceOptions};
