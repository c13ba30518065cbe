//! The per-variable value cell.

use crate::error::FormulaError;

/// Current contents of a variable.
///
/// A variable is readable only when [`Assigned`](VarValue::Assigned).
/// A [`Poisoned`](VarValue::Poisoned) value records the failure of the
/// method that last tried to compute it; it is replaced by the next
/// successful computation or write.
#[derive(Clone, Debug, PartialEq)]
pub enum VarValue<T> {
    /// Never written and never computed.
    Unassigned,
    /// A readable value.
    Assigned(T),
    /// The last computation of this variable failed.
    Poisoned(FormulaError),
}

impl<T> VarValue<T> {
    /// Wrap an optional initial value.
    pub fn from_option(value: Option<T>) -> Self {
        match value {
            Some(v) => Self::Assigned(v),
            None => Self::Unassigned,
        }
    }

    /// The value, if assigned.
    pub fn as_assigned(&self) -> Option<&T> {
        match self {
            Self::Assigned(v) => Some(v),
            _ => None,
        }
    }

    /// The failure cause, if poisoned.
    pub fn poison(&self) -> Option<&FormulaError> {
        match self {
            Self::Poisoned(cause) => Some(cause),
            _ => None,
        }
    }

    /// Whether the cell holds a readable value.
    pub fn is_assigned(&self) -> bool {
        matches!(self, Self::Assigned(_))
    }
}

impl<T> Default for VarValue<T> {
    fn default() -> Self {
        Self::Unassigned
    }
}

impl<T> From<Result<T, FormulaError>> for VarValue<T> {
    fn from(result: Result<T, FormulaError>) -> Self {
        match result {
            Ok(v) => Self::Assigned(v),
            Err(cause) => Self::Poisoned(cause),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_option() {
        assert_eq!(VarValue::from_option(Some(3)), VarValue::Assigned(3));
        assert_eq!(VarValue::<i32>::from_option(None), VarValue::Unassigned);
    }

    #[test]
    fn accessors() {
        let v = VarValue::Assigned(5);
        assert_eq!(v.as_assigned(), Some(&5));
        assert!(v.poison().is_none());
        assert!(v.is_assigned());

        let p: VarValue<i32> = Err(FormulaError::new("boom")).into();
        assert!(p.as_assigned().is_none());
        assert_eq!(p.poison(), Some(&FormulaError::new("boom")));
        assert!(!p.is_assigned());
        assert!(!VarValue::<i32>::default().is_assigned());
    }
}
