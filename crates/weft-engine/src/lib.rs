//! Incremental constraint solving engine for Weft.
//!
//! Provides the [`Solver`], which owns variables and constraints and
//! keeps every enabled constraint satisfied as constraints are enabled,
//! disabled, and variables written. Uses the DeltaBlue algorithm:
//! strengths decide which constraints yield, and only the part of the
//! graph downstream of a change is revisited. Volatile chains are
//! refreshed through precomputed [`Plan`]s.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod error;
mod graph;
pub mod group;
pub mod metrics;
pub mod plan;
mod propagate;
pub mod solver;

pub use config::{ConfigError, SolverConfig};
pub use error::SolveError;
pub use group::{Group, GroupMember, GroupScope};
pub use metrics::SolveMetrics;
pub use plan::{Plan, PlanSeed, PlanStep};
pub use solver::Solver;
