//! Arena-specific error types.

use std::error::Error;
use std::fmt;

/// Errors that can occur during arena operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArenaError {
    /// Slot indices are `u32`; no more slots can be allocated.
    CapacityExceeded {
        /// Number of slots already allocated.
        slots: usize,
    },
}

impl fmt::Display for ArenaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CapacityExceeded { slots } => {
                write!(f, "arena capacity exceeded: {slots} slots allocated")
            }
        }
    }
}

impl Error for ArenaError {}
