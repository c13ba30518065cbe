//! Strongly-typed identifiers and the [`VarList`] type alias.

use smallvec::SmallVec;
use std::fmt;

/// Identifies a variable within a solver.
///
/// Variables live in a generational arena: `index` is the slot, and
/// `generation` distinguishes a live variable from an earlier occupant
/// of the same slot. Two ids compare equal only if both parts match,
/// so a removed variable's id never aliases its replacement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId {
    index: u32,
    generation: u32,
}

impl VarId {
    /// Build an id from its raw parts.
    pub const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Slot index in the variable arena.
    pub const fn index(self) -> u32 {
        self.index
    }

    /// Slot generation at allocation time.
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Display for VarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.generation == 0 {
            write!(f, "v{}", self.index)
        } else {
            write!(f, "v{}#{}", self.index, self.generation)
        }
    }
}

/// Identifies a constraint within a solver.
///
/// Same generational layout as [`VarId`]. Internally synthesised edit
/// constraints draw from the same arena and are removed again before
/// the operation that created them returns.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConstraintId {
    index: u32,
    generation: u32,
}

impl ConstraintId {
    /// Build an id from its raw parts.
    pub const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Slot index in the constraint arena.
    pub const fn index(self) -> u32 {
        self.index
    }

    /// Slot generation at allocation time.
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Display for ConstraintId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.generation == 0 {
            write!(f, "c{}", self.index)
        } else {
            write!(f, "c{}#{}", self.index, self.generation)
        }
    }
}

/// Single-use traversal token.
///
/// Each propagation pass draws a fresh mark from a monotonic counter;
/// a variable is "visited" in a pass iff its stored mark equals the
/// pass's mark. [`Mark::NONE`] is never handed out, so fresh variables
/// are unvisited in every pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Mark(u64);

impl Mark {
    /// The mark carried by variables that were never visited.
    pub const NONE: Mark = Mark(0);

    /// The mark following this one.
    ///
    /// Wraps past `u64::MAX` onto 1, skipping [`Mark::NONE`].
    #[must_use]
    pub fn next(self) -> Self {
        match self.0.checked_add(1) {
            Some(n) => Self(n),
            None => Self(1),
        }
    }
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Counts structural changes to the enabled constraint set.
///
/// Incremented by every enable and disable, enabling stale plan
/// detection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GraphGeneration(pub u64);

impl GraphGeneration {
    /// The generation following this one.
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl fmt::Display for GraphGeneration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for GraphGeneration {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

/// An ordered list of variables.
///
/// Uses `SmallVec<[VarId; 4]>` to avoid heap allocation for the
/// common case of methods with up to four inputs. Wider relations
/// spill to the heap transparently.
pub type VarList = SmallVec<[VarId; 4]>;
