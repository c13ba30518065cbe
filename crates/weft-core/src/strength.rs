//! Constraint strengths.

use std::fmt;

/// Priority of a constraint.
///
/// A total order, weakest to strongest. When two constraints compete
/// for the same variable the stronger one wins; [`Strength::Required`]
/// constraints must always be satisfied and their failure is an error.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Strength {
    /// Lowest priority. Also the walk strength of a free variable.
    Weakest,
    /// Low priority, typically stay constraints anchoring defaults.
    Weak,
    /// Default priority for user constraints.
    #[default]
    Medium,
    /// High priority.
    Strong,
    /// Must be satisfied.
    Required,
}

impl Strength {
    /// All strengths, weakest first.
    pub const ALL: [Strength; 5] = [
        Strength::Weakest,
        Strength::Weak,
        Strength::Medium,
        Strength::Strong,
        Strength::Required,
    ];

    /// Whether this is [`Strength::Required`].
    pub fn is_required(self) -> bool {
        self == Strength::Required
    }

    /// The weaker of two strengths.
    pub fn weakest_of(self, other: Self) -> Self {
        self.min(other)
    }

    /// The stronger of two strengths.
    pub fn strongest_of(self, other: Self) -> Self {
        self.max(other)
    }
}

impl fmt::Display for Strength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Weakest => "weakest",
            Self::Weak => "weak",
            Self::Medium => "medium",
            Self::Strong => "strong",
            Self::Required => "required",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn ordering_is_weakest_to_required() {
        for pair in Strength::ALL.windows(2) {
            assert!(pair[0] < pair[1], "{} should be below {}", pair[0], pair[1]);
        }
        assert!(Strength::Required.is_required());
        assert!(!Strength::Strong.is_required());
    }

    #[test]
    fn default_is_medium() {
        assert_eq!(Strength::default(), Strength::Medium);
    }

    fn arb_strength() -> impl Strategy<Value = Strength> {
        prop::sample::select(Strength::ALL.to_vec())
    }

    proptest! {
        #[test]
        fn weakest_of_is_lower_bound(a in arb_strength(), b in arb_strength()) {
            let w = a.weakest_of(b);
            prop_assert!(w <= a && w <= b);
            prop_assert!(w == a || w == b);
        }

        #[test]
        fn strongest_of_is_upper_bound(a in arb_strength(), b in arb_strength()) {
            let s = a.strongest_of(b);
            prop_assert!(s >= a && s >= b);
            prop_assert_eq!(s, b.strongest_of(a));
        }
    }
}
