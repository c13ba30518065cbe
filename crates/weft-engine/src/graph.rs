//! Per-node solver state stored in the arenas.

use indexmap::IndexSet;

use weft_constraint::{ConstraintDef, Method};
use weft_core::{ConstraintId, Mark, Strength, VarId, VarValue};

/// A variable and its bookkeeping.
pub(crate) struct VariableNode<T> {
    pub(crate) value: VarValue<T>,
    pub(crate) name: Option<String>,
    /// Enabled constraints mentioning this variable, in enable order.
    pub(crate) constraints: IndexSet<ConstraintId>,
    pub(crate) determined_by: Option<ConstraintId>,
    pub(crate) walk_strength: Strength,
    /// Whether the value is fixed until the graph changes.
    pub(crate) constant: bool,
    pub(crate) mark: Mark,
}

impl<T> VariableNode<T> {
    pub(crate) fn new(value: VarValue<T>) -> Self {
        Self {
            value,
            name: None,
            constraints: IndexSet::new(),
            determined_by: None,
            walk_strength: Strength::Weakest,
            constant: true,
            mark: Mark::NONE,
        }
    }

    /// Forget the determining constraint.
    pub(crate) fn release(&mut self) {
        self.determined_by = None;
        self.walk_strength = Strength::Weakest;
        self.constant = true;
    }
}

/// A constraint and its enforcement state.
pub(crate) struct ConstraintNode<T> {
    pub(crate) def: ConstraintDef<T>,
    pub(crate) enabled: bool,
    /// Index into `def.methods()` of the enforcing method.
    pub(crate) enforcing: Option<usize>,
    /// Hidden output variable owned by an observer constraint.
    pub(crate) sink: Option<VarId>,
}

impl<T> ConstraintNode<T> {
    pub(crate) fn new(def: ConstraintDef<T>) -> Self {
        Self {
            def,
            enabled: false,
            enforcing: None,
            sink: None,
        }
    }

    pub(crate) fn enforcing_method(&self) -> Option<&Method<T>> {
        self.enforcing.and_then(|i| self.def.method(i))
    }

    pub(crate) fn enforced_output(&self) -> Option<VarId> {
        self.enforcing_method().map(Method::output)
    }
}
