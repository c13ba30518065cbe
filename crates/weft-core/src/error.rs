//! Error type for user computations.
//!
//! Structural errors (unsatisfiable constraints, cycles, stale plans)
//! belong to the engine; this crate only defines the cause recorded
//! when a formula fails, because it travels with poisoned values.

use std::error::Error;
use std::fmt;

use crate::id::VarId;

/// Why a method failed to produce its output.
///
/// Cloneable so a poisoned value can hand the original cause to every
/// reader and to every dependent formula that consumes it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FormulaError {
    /// The user computation reported a failure.
    Failed {
        /// Human-readable description of the failure.
        reason: String,
    },
    /// An input had never been assigned a value.
    UnassignedInput {
        /// The input that was read.
        variable: VarId,
    },
    /// A fixed-arity formula received a different number of inputs.
    Arity {
        /// Number of inputs the formula was declared with.
        expected: usize,
        /// Number of inputs supplied.
        found: usize,
    },
}

impl FormulaError {
    /// Shorthand for [`FormulaError::Failed`].
    pub fn new(reason: impl Into<String>) -> Self {
        Self::Failed {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for FormulaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Failed { reason } => write!(f, "formula failed: {reason}"),
            Self::UnassignedInput { variable } => {
                write!(f, "formula input {variable} has no value")
            }
            Self::Arity { expected, found } => {
                write!(f, "formula expects {expected} inputs, got {found}")
            }
        }
    }
}

impl Error for FormulaError {}
