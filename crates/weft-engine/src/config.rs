//! Solver configuration, validation, and error types.
//!
//! [`SolverConfig`] is the builder-input for constructing a
//! [`Solver`](crate::Solver). [`validate()`](SolverConfig::validate)
//! checks the invariants the solver relies on; the constructor
//! [`Solver::with_config`](crate::Solver::with_config) calls it before
//! allocating anything.

use std::error::Error;
use std::fmt;

use weft_core::Strength;

// ── SolverConfig ──────────────────────────────────────────────────

/// Construction parameters for a [`Solver`](crate::Solver).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SolverConfig {
    /// Strength of the one-shot edit constraint synthesised by
    /// [`write`](crate::Solver::write). Default: `Required`.
    ///
    /// A weaker write strength lets existing constraints of at least
    /// that strength override the written value instead of yielding.
    pub write_strength: Strength,
    /// Strength of observer constraints created by
    /// [`observe`](crate::Solver::observe). Default: `Required`.
    pub observer_strength: Strength,
    /// Initial capacity of the variable arena. Default: 0.
    pub variable_capacity: usize,
    /// Initial capacity of the constraint arena. Default: 0.
    pub constraint_capacity: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            write_strength: Strength::Required,
            observer_strength: Strength::Required,
            variable_capacity: 0,
            constraint_capacity: 0,
        }
    }
}

impl SolverConfig {
    /// Check structural invariants.
    ///
    /// A `Weakest` write or observer constraint could never displace
    /// anything, since enforcement requires an output walk strength
    /// strictly below the constraint's own strength.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.write_strength == Strength::Weakest {
            return Err(ConfigError::WeakestWriteStrength);
        }
        if self.observer_strength == Strength::Weakest {
            return Err(ConfigError::WeakestObserverStrength);
        }
        Ok(())
    }
}

// ── ConfigError ───────────────────────────────────────────────────

/// Errors detected during [`SolverConfig::validate()`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// `write_strength` is `Weakest`, so writes could never take effect.
    WeakestWriteStrength,
    /// `observer_strength` is `Weakest`, so observers could never run.
    WeakestObserverStrength,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WeakestWriteStrength => {
                write!(f, "write_strength must be stronger than weakest")
            }
            Self::WeakestObserverStrength => {
                write!(f, "observer_strength must be stronger than weakest")
            }
        }
    }
}

impl Error for ConfigError {}
