//! Typed arena keys.
//!
//! A [`SlotKey`] encodes a slot index plus the slot generation observed
//! at insertion. The generation allows O(1) staleness checks: a key is
//! live iff the slot is occupied and its generation still matches.

use weft_core::{ConstraintId, VarId};

/// A copyable key addressing one arena slot.
///
/// Implemented for the solver's id types so each arena only accepts
/// keys of its own kind.
pub trait SlotKey: Copy {
    /// Build a key from a slot index and generation.
    fn from_raw(index: u32, generation: u32) -> Self;

    /// Slot index.
    fn index(self) -> u32;

    /// Slot generation at insertion time.
    fn generation(self) -> u32;
}

impl SlotKey for VarId {
    fn from_raw(index: u32, generation: u32) -> Self {
        VarId::new(index, generation)
    }

    fn index(self) -> u32 {
        VarId::index(self)
    }

    fn generation(self) -> u32 {
        VarId::generation(self)
    }
}

impl SlotKey for ConstraintId {
    fn from_raw(index: u32, generation: u32) -> Self {
        ConstraintId::new(index, generation)
    }

    fn index(self) -> u32 {
        ConstraintId::index(self)
    }

    fn generation(self) -> u32 {
        ConstraintId::generation(self)
    }
}
