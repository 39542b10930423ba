//! # mix-solve: Solver Hand-Off
//!
//! Everything the core does around the external LP solver without doing
//! any optimization itself: CPLEX option files, solver input with the
//! version marker, runner argument construction, storage-item pre-flight,
//! and the infeasible-vs-infrastructure error split.
//!
//! ## Modules
//!
//! - [`options`] - `cplex.opt`/`cplex.op2` rendering and defaults
//! - [`run`] - Pre-flight, input serialization, runner invocation

pub mod options;
pub mod run;

pub use options::{CplexOptions, OptionValue};
pub use run::{
    preflight_storage_items, solve, solver_args, write_solver_input, MacroSettings, SolveConfig,
    SolveError, SolveReport, SolverRunner, MESSAGE_IX_VERSION,
};
