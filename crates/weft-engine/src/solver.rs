//! The [`Solver`]: variable and constraint storage plus the public
//! mutation surface.
//!
//! Enable and disable drive the incremental algorithm in
//! [`propagate`](crate::propagate); this module owns the arenas, the
//! variable namespace, and the bookkeeping around each call (id checks,
//! graph generation, metrics, logging).

use std::collections::HashMap;

use indexmap::IndexMap;
use log::{debug, warn};

use weft_arena::Arena;
use weft_constraint::{BuildError, ConstraintBuilder, ConstraintDef};
use weft_core::{ConstraintId, GraphGeneration, Mark, Strength, VarId, VarValue};

use crate::config::{ConfigError, SolverConfig};
use crate::error::SolveError;
use crate::graph::{ConstraintNode, VariableNode};
use crate::metrics::SolveMetrics;

/// An incremental multi-way constraint solver over values of type `T`.
///
/// Variables and constraints are addressed by generational ids handed
/// out by this solver. Every operation runs to completion before
/// returning; a solver shared between threads must be wrapped in a
/// `Mutex`, which serialises the whole mutation surface.
///
/// # Examples
///
/// ```
/// use weft_core::Strength;
/// use weft_engine::Solver;
///
/// let mut solver = Solver::<i64>::new();
/// let a = solver.variable(1).unwrap();
/// let b = solver.variable(1).unwrap();
/// solver
///     .constrain(Strength::Strong, |c| {
///         c.formula(a, [b], |[b]| b * 2)?;
///         Ok(())
///     })
///     .unwrap();
/// assert_eq!(solver.value(a).unwrap(), 2);
///
/// solver.write(b, 5).unwrap();
/// assert_eq!(solver.value(a).unwrap(), 10);
/// ```
pub struct Solver<T> {
    pub(crate) variables: Arena<VarId, VariableNode<T>>,
    pub(crate) constraints: Arena<ConstraintId, ConstraintNode<T>>,
    names: IndexMap<String, VarId>,
    mark: Mark,
    pub(crate) generation: GraphGeneration,
    config: SolverConfig,
    pub(crate) metrics: SolveMetrics,
}

impl<T: Clone + 'static> Solver<T> {
    /// A solver with the default configuration.
    pub fn new() -> Self {
        Self::build(SolverConfig::default())
    }

    /// A solver with a validated configuration.
    pub fn with_config(config: SolverConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: SolverConfig) -> Self {
        Self {
            variables: Arena::with_capacity(config.variable_capacity),
            constraints: Arena::with_capacity(config.constraint_capacity),
            names: IndexMap::new(),
            mark: Mark::NONE,
            generation: GraphGeneration::default(),
            config,
            metrics: SolveMetrics::default(),
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    // ── Variables ─────────────────────────────────────────────────

    /// Create a variable holding `value`.
    pub fn variable(&mut self, value: T) -> Result<VarId, SolveError> {
        self.insert_variable(VarValue::Assigned(value))
    }

    /// Create a variable with no value.
    pub fn unassigned_variable(&mut self) -> Result<VarId, SolveError> {
        self.insert_variable(VarValue::Unassigned)
    }

    fn insert_variable(&mut self, value: VarValue<T>) -> Result<VarId, SolveError> {
        Ok(self.variables.insert(VariableNode::new(value))?)
    }

    /// The variable called `name`, created unassigned on first use.
    pub fn named(&mut self, name: &str) -> Result<VarId, SolveError> {
        if let Some(&v) = self.names.get(name) {
            return Ok(v);
        }
        let v = self.unassigned_variable()?;
        if let Some(node) = self.variables.get_mut(v) {
            node.name = Some(name.to_owned());
        }
        self.names.insert(name.to_owned(), v);
        Ok(v)
    }

    /// Create one variable per value, in order.
    pub fn variables<I>(&mut self, values: I) -> Result<Vec<VarId>, SolveError>
    where
        I: IntoIterator<Item = T>,
    {
        values.into_iter().map(|v| self.variable(v)).collect()
    }

    /// Create a fixed number of variables, for destructuring.
    pub fn variable_array<const N: usize>(
        &mut self,
        values: [T; N],
    ) -> Result<[VarId; N], SolveError> {
        let mut ids = [VarId::new(0, 0); N];
        for (slot, value) in ids.iter_mut().zip(values) {
            *slot = self.variable(value)?;
        }
        Ok(ids)
    }

    /// The name given through [`named`](Self::named), if any.
    pub fn name_of(&self, v: VarId) -> Option<&str> {
        self.variables.get(v)?.name.as_deref()
    }

    /// Number of live variables.
    pub fn variable_count(&self) -> usize {
        self.variables.len()
    }

    /// Number of live constraints, enabled or not.
    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    // ── Values ────────────────────────────────────────────────────

    /// Borrow the current value of `v`.
    ///
    /// A poisoned variable reports the cause recorded when its last
    /// computation failed; nothing is re-run.
    pub fn read(&self, v: VarId) -> Result<&T, SolveError> {
        match &self.var(v)?.value {
            VarValue::Assigned(value) => Ok(value),
            VarValue::Poisoned(cause) => Err(SolveError::FormulaFailed {
                variable: v,
                cause: cause.clone(),
            }),
            VarValue::Unassigned => Err(SolveError::Unassigned { variable: v }),
        }
    }

    /// Clone the current value of `v`.
    pub fn value(&self, v: VarId) -> Result<T, SolveError> {
        self.read(v).cloned()
    }

    /// The raw value cell of `v`.
    pub fn state(&self, v: VarId) -> Result<&VarValue<T>, SolveError> {
        Ok(&self.var(v)?.value)
    }

    /// Assign `value` to `v` and propagate.
    ///
    /// Without non-volatile enabled constraints on `v` the value is
    /// stored directly. Otherwise a one-shot edit constraint at the
    /// configured write strength is enabled and disabled again, so the
    /// final value can differ from `value` when a stronger constraint
    /// determines `v`.
    pub fn write(&mut self, v: VarId, value: T) -> Result<(), SolveError> {
        let node = self.var(v)?;
        let direct = node.constraints.iter().all(|&c| {
            self.constraints
                .get(c)
                .is_some_and(|n| n.def.is_volatile())
        });
        if direct {
            if let Some(node) = self.variables.get_mut(v) {
                node.value = VarValue::Assigned(value);
            }
            self.metrics.direct_writes += 1;
            debug!("wrote {v} directly");
            return Ok(());
        }

        let mut builder = ConstraintBuilder::new(self.config.write_strength);
        builder.label("write").constant(v, value)?;
        let edit = self.constraints.insert(ConstraintNode::new(builder.build()?))?;
        self.metrics.edits += 1;
        debug!("writing {v} through edit {edit}");

        let result = self.enable(edit);
        let cleanup = self.disable(edit);
        self.constraints.remove(edit);
        result.and(cleanup)
    }

    // ── Constraints ───────────────────────────────────────────────

    /// Store a disabled constraint.
    ///
    /// Every variable of `def` must belong to this solver.
    pub fn insert(&mut self, def: ConstraintDef<T>) -> Result<ConstraintId, SolveError> {
        for &v in def.variables() {
            self.var(v)?;
        }
        Ok(self.constraints.insert(ConstraintNode::new(def))?)
    }

    /// Declare a disabled constraint through a builder.
    pub fn build_constraint<F>(
        &mut self,
        strength: Strength,
        f: F,
    ) -> Result<ConstraintId, SolveError>
    where
        F: FnOnce(&mut ConstraintBuilder<T>) -> Result<(), BuildError>,
    {
        let mut builder = ConstraintBuilder::new(strength);
        f(&mut builder)?;
        self.insert(builder.build()?)
    }

    /// Declare and enable a constraint.
    ///
    /// If enabling fails the constraint is removed again, so an error
    /// leaves no trace of it.
    pub fn constrain<F>(&mut self, strength: Strength, f: F) -> Result<ConstraintId, SolveError>
    where
        F: FnOnce(&mut ConstraintBuilder<T>) -> Result<(), BuildError>,
    {
        let c = self.build_constraint(strength, f)?;
        self.enable_or_remove(c)
    }

    fn enable_or_remove(&mut self, c: ConstraintId) -> Result<ConstraintId, SolveError> {
        match self.enable(c) {
            Ok(()) => Ok(c),
            Err(err) => {
                if let Err(cleanup) = self.remove_constraint(c) {
                    warn!("removing failed constraint {c}: {cleanup}");
                }
                Err(err)
            }
        }
    }

    /// Enable a constraint keeping `v` at its current value.
    pub fn stay(&mut self, v: VarId, strength: Strength) -> Result<ConstraintId, SolveError> {
        self.constrain(strength, |c| {
            c.stay(v)?;
            Ok(())
        })
    }

    /// Enable a constraint holding `v` at `value`.
    pub fn edit(
        &mut self,
        v: VarId,
        value: T,
        strength: Strength,
    ) -> Result<ConstraintId, SolveError> {
        self.constrain(strength, |c| {
            c.constant(v, value)?;
            Ok(())
        })
    }

    /// Enable an observer that calls `f` with the values of `inputs`
    /// whenever any of them changes.
    ///
    /// The observer writes a hidden variable that is removed together
    /// with the constraint.
    pub fn observe<F>(&mut self, inputs: &[VarId], f: F) -> Result<ConstraintId, SolveError>
    where
        F: Fn(&[&T]) + Send + Sync + 'static,
    {
        let sink = self.unassigned_variable()?;
        let c = match self.insert_observer(sink, inputs, f) {
            Ok(c) => c,
            Err(err) => {
                self.variables.remove(sink);
                return Err(err);
            }
        };
        self.enable_or_remove(c)
    }

    fn insert_observer<F>(
        &mut self,
        sink: VarId,
        inputs: &[VarId],
        f: F,
    ) -> Result<ConstraintId, SolveError>
    where
        F: Fn(&[&T]) + Send + Sync + 'static,
    {
        let mut builder = ConstraintBuilder::new(self.config.observer_strength);
        builder.label("observer").observer(sink, inputs, f)?;
        let c = self.insert(builder.build()?)?;
        self.cons_mut(c)?.sink = Some(sink);
        Ok(c)
    }

    /// Copy constraint `c` with variables replaced according to `map`.
    ///
    /// The copy is disabled; variables absent from `map` are shared.
    pub fn substitute(
        &mut self,
        c: ConstraintId,
        map: &HashMap<VarId, VarId>,
    ) -> Result<ConstraintId, SolveError> {
        let def = self.cons(c)?.def.substitute(map)?;
        self.insert(def)
    }

    /// Add `c` to the graph and enforce it.
    ///
    /// Idempotent. A required constraint that cannot be enforced is
    /// rolled back: `c` is left disabled and anything it displaced is
    /// re-enforced before the error is returned.
    pub fn enable(&mut self, c: ConstraintId) -> Result<(), SolveError> {
        let node = self.cons_mut(c)?;
        if node.enabled {
            return Ok(());
        }
        node.enabled = true;
        node.enforcing = None;
        self.register(c)?;
        self.generation = self.generation.next();
        self.metrics.enables += 1;
        debug!("enabling {c}");

        match self.incremental_add(c) {
            Err(SolveError::UnsatisfiableRequired { constraint }) => {
                self.roll_back_enable(c, constraint);
                Err(SolveError::UnsatisfiableRequired { constraint })
            }
            other => other,
        }
    }

    fn roll_back_enable(&mut self, c: ConstraintId, failed: ConstraintId) {
        warn!("{failed} cannot be satisfied; rolling back enable of {c}");
        let enforcing = match self.constraints.get_mut(c) {
            Some(node) => {
                node.enabled = false;
                node.enforcing.is_some()
            }
            None => return,
        };
        let undo = if enforcing {
            self.incremental_remove(c)
        } else {
            self.deregister(c)
        };
        if let Err(err) = undo {
            warn!("rolling back {c}: {err}");
        }
        let stranded = failed != c
            && self
                .constraints
                .get(failed)
                .is_some_and(|n| n.enabled && n.enforcing.is_none());
        if stranded {
            if let Err(err) = self.incremental_add(failed) {
                warn!("re-enforcing {failed} after rollback: {err}");
            }
        }
    }

    /// Remove `c` from the graph.
    ///
    /// Idempotent. Constraints left without an enforcing method are
    /// re-enforced strongest first.
    pub fn disable(&mut self, c: ConstraintId) -> Result<(), SolveError> {
        let node = self.cons_mut(c)?;
        if !node.enabled {
            return Ok(());
        }
        node.enabled = false;
        let enforcing = node.enforcing.is_some();
        self.generation = self.generation.next();
        self.metrics.disables += 1;
        debug!("disabling {c}");

        if enforcing {
            self.incremental_remove(c)
        } else {
            self.deregister(c)
        }
    }

    /// Disable `c` and release its id.
    pub fn remove_constraint(&mut self, c: ConstraintId) -> Result<(), SolveError> {
        self.cons(c)?;
        let result = self.disable(c);
        if let Some(node) = self.constraints.remove(c) {
            if let Some(sink) = node.sink {
                self.variables.remove(sink);
            }
        }
        debug!("removed {c}");
        result
    }

    /// Release the id of `v`.
    ///
    /// Refused while any constraint, enabled or not, mentions `v`.
    pub fn remove_variable(&mut self, v: VarId) -> Result<(), SolveError> {
        self.var(v)?;
        let users: Vec<ConstraintId> = self
            .constraints
            .iter()
            .filter(|(_, node)| node.def.variables().contains(&v))
            .map(|(c, _)| c)
            .collect();
        if !users.is_empty() {
            return Err(SolveError::VariableInUse {
                variable: v,
                constraints: users,
            });
        }
        if let Some(node) = self.variables.remove(v) {
            if let Some(name) = node.name {
                self.names.shift_remove(&name);
            }
        }
        Ok(())
    }

    // ── Introspection ─────────────────────────────────────────────

    /// Whether `c` is part of the graph.
    pub fn is_enabled(&self, c: ConstraintId) -> Result<bool, SolveError> {
        Ok(self.cons(c)?.enabled)
    }

    /// Whether `c` currently has an enforcing method.
    pub fn is_enforcing(&self, c: ConstraintId) -> Result<bool, SolveError> {
        Ok(self.cons(c)?.enforcing.is_some())
    }

    /// The variable written by the enforcing method of `c`.
    pub fn enforcing_output(&self, c: ConstraintId) -> Result<Option<VarId>, SolveError> {
        Ok(self.cons(c)?.enforced_output())
    }

    /// The constraint whose enforcing method writes `v`.
    pub fn determined_by(&self, v: VarId) -> Result<Option<ConstraintId>, SolveError> {
        Ok(self.var(v)?.determined_by)
    }

    /// Strength with which the current value of `v` is held.
    pub fn walk_strength(&self, v: VarId) -> Result<Strength, SolveError> {
        Ok(self.var(v)?.walk_strength)
    }

    /// Whether `v` only changes when the graph changes.
    pub fn is_constant(&self, v: VarId) -> Result<bool, SolveError> {
        Ok(self.var(v)?.constant)
    }

    /// Declared strength of `c`.
    pub fn strength(&self, c: ConstraintId) -> Result<Strength, SolveError> {
        Ok(self.cons(c)?.def.strength())
    }

    /// Whether `c` is volatile.
    pub fn is_volatile(&self, c: ConstraintId) -> Result<bool, SolveError> {
        Ok(self.cons(c)?.def.is_volatile())
    }

    /// Diagnostic label of `c`.
    pub fn label(&self, c: ConstraintId) -> Result<Option<&str>, SolveError> {
        Ok(self.cons(c)?.def.label())
    }

    /// The declaration of `c`.
    pub fn definition(&self, c: ConstraintId) -> Result<&ConstraintDef<T>, SolveError> {
        Ok(&self.cons(c)?.def)
    }

    /// Enabled constraints mentioning `v`, in enable order.
    pub fn constraints_on(&self, v: VarId) -> Result<Vec<ConstraintId>, SolveError> {
        Ok(self.var(v)?.constraints.iter().copied().collect())
    }

    /// Counter bumped by every enable and disable; plans built at an
    /// older generation are rejected.
    pub fn generation(&self) -> GraphGeneration {
        self.generation
    }

    /// Work counters since construction or the last reset.
    pub fn metrics(&self) -> &SolveMetrics {
        &self.metrics
    }

    /// Zero the work counters.
    pub fn reset_metrics(&mut self) {
        self.metrics = SolveMetrics::default();
    }

    // ── Internal access ───────────────────────────────────────────

    pub(crate) fn var(&self, v: VarId) -> Result<&VariableNode<T>, SolveError> {
        self.variables
            .get(v)
            .ok_or(SolveError::UnknownVariable { variable: v })
    }

    pub(crate) fn var_mut(&mut self, v: VarId) -> Result<&mut VariableNode<T>, SolveError> {
        self.variables
            .get_mut(v)
            .ok_or(SolveError::UnknownVariable { variable: v })
    }

    pub(crate) fn cons(&self, c: ConstraintId) -> Result<&ConstraintNode<T>, SolveError> {
        self.constraints
            .get(c)
            .ok_or(SolveError::UnknownConstraint { constraint: c })
    }

    pub(crate) fn cons_mut(
        &mut self,
        c: ConstraintId,
    ) -> Result<&mut ConstraintNode<T>, SolveError> {
        self.constraints
            .get_mut(c)
            .ok_or(SolveError::UnknownConstraint { constraint: c })
    }

    pub(crate) fn next_mark(&mut self) -> Mark {
        self.mark = self.mark.next();
        self.mark
    }
}

impl<T: Clone + 'static> Default for Solver<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unconstrained_write_is_direct() {
        let mut s = Solver::new();
        let v = s.variable(3).unwrap();
        assert_eq!(s.value(v).unwrap(), 3);
        s.write(v, 4).unwrap();
        assert_eq!(s.value(v).unwrap(), 4);
        assert_eq!(s.metrics().direct_writes, 1);
        assert_eq!(s.metrics().edits, 0);
    }

    #[test]
    fn unassigned_read_is_an_error() {
        let mut s = Solver::<i32>::new();
        let v = s.unassigned_variable().unwrap();
        assert_eq!(s.read(v), Err(SolveError::Unassigned { variable: v }));
        assert_eq!(s.state(v), Ok(&VarValue::Unassigned));
    }

    #[test]
    fn named_variables_are_get_or_create() {
        let mut s = Solver::<i32>::new();
        let x = s.named("x").unwrap();
        let y = s.named("y").unwrap();
        assert_ne!(x, y);
        assert_eq!(s.named("x").unwrap(), x);
        assert_eq!(s.name_of(x), Some("x"));
        assert_eq!(s.variable_count(), 2);
    }

    #[test]
    fn variables_keep_order_and_identity() {
        let mut s = Solver::new();
        let vars = s.variables(["a", "b", "c"]).unwrap();
        assert_eq!(vars.len(), 3);
        let values: Vec<_> = vars.iter().map(|&v| s.value(v).unwrap()).collect();
        assert_eq!(values, vec!["a", "b", "c"]);

        let [x, y] = s.variable_array(["a", "a"]).unwrap();
        assert_ne!(x, y);
    }

    #[test]
    fn with_config_validates() {
        let bad = SolverConfig {
            write_strength: Strength::Weakest,
            ..SolverConfig::default()
        };
        assert!(matches!(
            Solver::<i32>::with_config(bad),
            Err(ConfigError::WeakestWriteStrength)
        ));
    }

    #[test]
    fn insert_rejects_foreign_variables() {
        let mut s = Solver::<i32>::new();
        let stranger = VarId::new(7, 0);
        let err = s
            .build_constraint(Strength::Medium, |c| {
                c.stay(stranger)?;
                Ok(())
            })
            .unwrap_err();
        assert_eq!(err, SolveError::UnknownVariable { variable: stranger });
        assert_eq!(s.constraint_count(), 0);
    }

    #[test]
    fn builder_errors_surface_as_build() {
        let mut s = Solver::<i32>::new();
        let err = s.build_constraint(Strength::Medium, |_| Ok(())).unwrap_err();
        assert_eq!(err, SolveError::Build(BuildError::EmptyConstraint));
    }

    #[test]
    fn build_constraint_is_disabled() {
        let mut s = Solver::new();
        let v = s.variable(1).unwrap();
        let c = s
            .build_constraint(Strength::Strong, |c| {
                c.constant(v, 5)?;
                Ok(())
            })
            .unwrap();
        assert!(!s.is_enabled(c).unwrap());
        assert_eq!(s.value(v).unwrap(), 1);
        s.enable(c).unwrap();
        assert_eq!(s.value(v).unwrap(), 5);
    }

    #[test]
    fn enable_and_disable_are_idempotent() {
        let mut s = Solver::new();
        let v = s.variable(0).unwrap();
        let c = s.edit(v, 9, Strength::Strong).unwrap();
        let generation = s.generation();
        s.enable(c).unwrap();
        assert_eq!(s.generation(), generation);
        assert_eq!(s.metrics().enables, 1);

        s.disable(c).unwrap();
        s.disable(c).unwrap();
        assert_eq!(s.metrics().disables, 1);
        assert!(s.constraints_on(v).unwrap().is_empty());
    }

    #[test]
    fn stale_ids_are_reported() {
        let mut s = Solver::new();
        let v = s.variable(0).unwrap();
        let c = s.stay(v, Strength::Weak).unwrap();
        s.remove_constraint(c).unwrap();
        assert_eq!(
            s.is_enabled(c),
            Err(SolveError::UnknownConstraint { constraint: c })
        );
        s.remove_variable(v).unwrap();
        assert_eq!(s.read(v), Err(SolveError::UnknownVariable { variable: v }));

        let w = s.variable(1).unwrap();
        assert_eq!(w.index(), v.index());
        assert_ne!(w, v);
    }

    #[test]
    fn variable_in_use_cannot_be_removed() {
        let mut s = Solver::new();
        let a = s.variable(1).unwrap();
        let b = s.variable(2).unwrap();
        let c = s
            .build_constraint(Strength::Medium, |c| {
                c.formula(a, [b], |[b]| *b)?;
                Ok(())
            })
            .unwrap();
        assert_eq!(
            s.remove_variable(b),
            Err(SolveError::VariableInUse {
                variable: b,
                constraints: vec![c],
            })
        );
        s.remove_constraint(c).unwrap();
        s.remove_variable(b).unwrap();
    }

    #[test]
    fn removed_name_is_released() {
        let mut s = Solver::<i32>::new();
        let x = s.named("x").unwrap();
        s.remove_variable(x).unwrap();
        let again = s.named("x").unwrap();
        assert_ne!(again, x);
    }
}
