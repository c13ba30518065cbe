//! Weft: incremental multi-way dataflow constraints.
//!
//! This is the top-level facade crate that re-exports the public API from all
//! Weft sub-crates. For most users, adding `weft` as a single dependency is
//! sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use weft::prelude::*;
//!
//! let mut solver = Solver::<f64>::new();
//! let [celsius, fahrenheit] = solver.variable_array([0.0, 32.0]).unwrap();
//!
//! // Either side can be solved for the other.
//! solver
//!     .constrain(Strength::Required, |c| {
//!         c.formula(fahrenheit, [celsius], |[t]| t * 9.0 / 5.0 + 32.0)?;
//!         c.formula(celsius, [fahrenheit], |[f]| (f - 32.0) * 5.0 / 9.0)?;
//!         Ok(())
//!     })
//!     .unwrap();
//!
//! solver.write(celsius, 100.0).unwrap();
//! assert_eq!(solver.value(fahrenheit).unwrap(), 212.0);
//!
//! solver.write(fahrenheit, 50.0).unwrap();
//! assert_eq!(solver.value(celsius).unwrap(), 10.0);
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `weft-core` | Ids, strengths, value cells, formula errors |
//! | [`arena`] | `weft-arena` | Generational slot arena backing the graph |
//! | [`constraint`] | `weft-constraint` | Methods, builder, constraint definitions |
//! | [`engine`] | `weft-engine` | The solver, plans, groups, config and metrics |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types and ids (`weft-core`).
///
/// Contains [`types::VarId`], [`types::ConstraintId`],
/// [`types::Strength`] and [`types::VarValue`].
pub use weft_core as types;

/// Generational slot arena (`weft-arena`).
///
/// Only needed when matching on [`arena::ArenaError`] inside a
/// [`engine::SolveError`].
pub use weft_arena as arena;

/// Constraint methods and validation (`weft-constraint`).
///
/// [`constraint::ConstraintBuilder`] is what the closure passed to
/// [`engine::Solver::constrain`] receives.
pub use weft_constraint as constraint;

/// The incremental solver (`weft-engine`).
///
/// [`engine::Solver`] owns the graph; [`engine::Plan`] replays volatile
/// propagation; [`engine::Group`] enables constraints together.
pub use weft_engine as engine;

/// Common imports for typical Weft usage.
///
/// ```rust
/// use weft::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use weft_core::{ConstraintId, FormulaError, Strength, VarId, VarValue};

    // Constraint building
    pub use weft_constraint::{BuildError, ConstraintBuilder, ConstraintDef};

    // Solver
    pub use weft_engine::{
        Group, GroupScope, Plan, PlanSeed, SolveError, SolveMetrics, Solver, SolverConfig,
    };
}
