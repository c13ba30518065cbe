//! Solver error types.
//!
//! Every fallible [`Solver`](crate::Solver) operation returns
//! [`SolveError`]. Builder and arena failures are wrapped so callers
//! match on one enum; [`Error::source`] still reaches the inner error.

use std::error::Error;
use std::fmt;

use weft_arena::ArenaError;
use weft_constraint::BuildError;
use weft_core::{ConstraintId, FormulaError, GraphGeneration, VarId};

/// Errors from solver operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SolveError {
    /// A required constraint has no method whose output can be
    /// claimed. The enable that triggered it has been rolled back.
    UnsatisfiableRequired {
        /// The required constraint that could not be enforced.
        constraint: ConstraintId,
    },
    /// Propagation reached a variable already visited in the same pass.
    /// The offending constraint has been disabled.
    ///
    /// The pass stops here: a constraint displaced earlier in it is not
    /// re-enforced on another of its outputs unless removing the
    /// offending constraint frees a variable it touches. Such a
    /// constraint stays enabled but unenforced until a later enable or
    /// disable reaches it.
    CycleDetected {
        /// The constraint that closed the cycle.
        constraint: ConstraintId,
    },
    /// The variable's last computation failed.
    FormulaFailed {
        /// The poisoned variable.
        variable: VarId,
        /// Why the computation failed.
        cause: FormulaError,
    },
    /// The variable has never been given a value.
    Unassigned {
        /// The variable that was read.
        variable: VarId,
    },
    /// The id does not name a live variable of this solver.
    UnknownVariable {
        /// The stale or foreign id.
        variable: VarId,
    },
    /// The id does not name a live constraint of this solver.
    UnknownConstraint {
        /// The stale or foreign id.
        constraint: ConstraintId,
    },
    /// The variable cannot be removed while constraints mention it.
    VariableInUse {
        /// The variable whose removal was requested.
        variable: VarId,
        /// Constraints referencing it, enabled or not.
        constraints: Vec<ConstraintId>,
    },
    /// The plan was built against an older graph.
    PlanInvalidated {
        /// Generation the plan was built at.
        built: GraphGeneration,
        /// Current solver generation.
        current: GraphGeneration,
    },
    /// A constraint declaration was malformed.
    Build(BuildError),
    /// Arena storage failure.
    Arena(ArenaError),
}

impl fmt::Display for SolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsatisfiableRequired { constraint } => {
                write!(f, "required constraint {constraint} cannot be satisfied")
            }
            Self::CycleDetected { constraint } => {
                write!(f, "cycle detected at constraint {constraint}")
            }
            Self::FormulaFailed { variable, cause } => {
                write!(f, "variable {variable} is poisoned: {cause}")
            }
            Self::Unassigned { variable } => write!(f, "variable {variable} has no value"),
            Self::UnknownVariable { variable } => write!(f, "unknown variable {variable}"),
            Self::UnknownConstraint { constraint } => {
                write!(f, "unknown constraint {constraint}")
            }
            Self::VariableInUse {
                variable,
                constraints,
            } => {
                write!(
                    f,
                    "variable {variable} is referenced by {} constraint(s)",
                    constraints.len()
                )
            }
            Self::PlanInvalidated { built, current } => {
                write!(
                    f,
                    "plan built at generation {built} is stale (solver is at {current})"
                )
            }
            Self::Build(e) => write!(f, "invalid constraint: {e}"),
            Self::Arena(e) => write!(f, "arena error: {e}"),
        }
    }
}

impl Error for SolveError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::FormulaFailed { cause, .. } => Some(cause),
            Self::Build(e) => Some(e),
            Self::Arena(e) => Some(e),
            _ => None,
        }
    }
}

impl From<BuildError> for SolveError {
    fn from(e: BuildError) -> Self {
        Self::Build(e)
    }
}

impl From<ArenaError> for SolveError {
    fn from(e: ArenaError) -> Self {
        Self::Arena(e)
    }
}
