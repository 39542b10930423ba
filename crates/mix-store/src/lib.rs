//! # mix-store: Scenario Persistence
//!
//! Versioned storage of scenarios behind a backend contract. The core
//! consumes the [`backend::Backend`] trait only; two implementations are
//! provided, an in-memory map and a filesystem JSON store.
//!
//! ## Modules
//!
//! - [`backend`] - The storage contract and its two implementations
//! - [`platform`] - Open/create/clone lifecycle and the unit registry
//! - [`init`] - Structural initialization against the item registry

pub mod backend;
pub mod init;
pub mod platform;

pub use backend::{Backend, FsBackend, MemBackend};
pub use init::initialize;
pub use platform::{Platform, ScenarioUrl, VersionRef};
