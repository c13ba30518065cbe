//! The incremental DeltaBlue algorithm.
//!
//! Adding a constraint picks its weakest usable method, displaces the
//! previous determiner of that method's output, and walks forward
//! recomputing walk strengths and constant values. Displaced
//! constraints are re-enforced with the same mark until nothing more
//! moves. Removing a constraint walks forward from its vacated output,
//! collects every constraint left without a method, and re-adds them
//! strongest first.
//!
//! A mark is drawn per pass; a variable carrying the pass's mark has
//! already been claimed in that pass.

use indexmap::IndexSet;
use log::{trace, warn};
use smallvec::SmallVec;

use weft_constraint::Outcome;
use weft_core::{ConstraintId, FormulaError, Mark, Strength, VarId, VarList, VarValue};

use crate::error::SolveError;
use crate::solver::Solver;

impl<T: Clone + 'static> Solver<T> {
    /// Enforce `c`, then re-enforce whatever it displaced.
    pub(crate) fn incremental_add(&mut self, c: ConstraintId) -> Result<(), SolveError> {
        let mark = self.next_mark();
        let mut retracted = self.enforce(c, mark)?;
        while let Some(next) = retracted {
            retracted = self.enforce(next, mark)?;
        }
        Ok(())
    }

    /// Choose a method for `c` and make it the determiner of its output.
    ///
    /// Returns the constraint that previously determined that output.
    fn enforce(
        &mut self,
        c: ConstraintId,
        mark: Mark,
    ) -> Result<Option<ConstraintId>, SolveError> {
        let chosen = self.weakest_method(c, mark)?;
        let node = self.cons_mut(c)?;
        node.enforcing = chosen;
        let required = node.def.strength().is_required();
        let Some(output) = node.enforced_output() else {
            if required {
                self.metrics.unsatisfiable += 1;
                return Err(SolveError::UnsatisfiableRequired { constraint: c });
            }
            trace!("{c} left unenforced");
            return Ok(None);
        };
        let inputs: VarList = node
            .def
            .variables()
            .iter()
            .copied()
            .filter(|&v| v != output)
            .collect();

        for v in inputs {
            self.var_mut(v)?.mark = mark;
        }
        let retracted = self.var(output)?.determined_by;
        if let Some(r) = retracted {
            self.cons_mut(r)?.enforcing = None;
            self.metrics.retractions += 1;
            trace!("{c} retracts {r} from {output}");
        }
        self.var_mut(output)?.determined_by = Some(c);
        self.metrics.enforcements += 1;
        trace!("{c} enforces {output}");

        // On a cycle `retracted` is dropped unenforced.
        self.add_propagate(c, mark)?;
        self.var_mut(output)?.mark = mark;
        Ok(retracted)
    }

    /// Index of the method whose output is unclaimed in this pass and
    /// held most weakly, provided it is weaker than `c` itself.
    ///
    /// Ties go to the method declared first.
    fn weakest_method(&self, c: ConstraintId, mark: Mark) -> Result<Option<usize>, SolveError> {
        let node = self.cons(c)?;
        let mut weakest = node.def.strength();
        let mut chosen = None;
        for (i, method) in node.def.methods().iter().enumerate() {
            let output = self.var(method.output())?;
            if output.mark != mark && output.walk_strength < weakest {
                weakest = output.walk_strength;
                chosen = Some(i);
            }
        }
        Ok(chosen)
    }

    /// Recompute everything downstream of `c`.
    ///
    /// Reaching an output already claimed in this pass means the new
    /// method closed a cycle; the constraint that reached it is disabled
    /// and removed from the graph.
    fn add_propagate(&mut self, c: ConstraintId, mark: Mark) -> Result<(), SolveError> {
        let mut todo: IndexSet<ConstraintId> = IndexSet::new();
        todo.insert(c);
        while let Some(next) = todo.shift_remove_index(0) {
            let Some(output) = self.cons(next)?.enforced_output() else {
                continue;
            };
            if self.var(output)?.mark == mark {
                warn!("cycle through {next} at {output}; disabling it");
                self.metrics.cycles += 1;
                self.cons_mut(next)?.enabled = false;
                self.incremental_remove(next)?;
                return Err(SolveError::CycleDetected { constraint: next });
            }
            self.recalculate(next)?;
            todo.extend(self.consuming_constraints(output)?);
        }
        Ok(())
    }

    /// Drop `c`'s method, deregister it, and re-enforce the constraints
    /// this leaves stranded.
    ///
    /// The caller is responsible for the enabled flag. Every stranded
    /// constraint is attempted; the first error is returned.
    pub(crate) fn incremental_remove(&mut self, c: ConstraintId) -> Result<(), SolveError> {
        let node = self.cons_mut(c)?;
        let output = node.enforced_output();
        node.enforcing = None;
        self.deregister(c)?;
        let Some(output) = output else {
            return Ok(());
        };
        trace!("{c} releases {output}");

        let mut first_err = None;
        for orphan in self.remove_propagate_from(output)? {
            let node = self.cons(orphan)?;
            if !node.enabled || node.enforcing.is_some() {
                continue;
            }
            if let Err(err) = self.incremental_add(orphan) {
                first_err.get_or_insert(err);
            }
        }
        first_err.map_or(Ok(()), Err)
    }

    /// Reset `output` and recalculate its downstream constraints.
    ///
    /// Returns the unenforced constraints met on the way, strongest
    /// first and in discovery order among equals.
    fn remove_propagate_from(&mut self, output: VarId) -> Result<Vec<ConstraintId>, SolveError> {
        self.var_mut(output)?.release();

        let mut unenforced: IndexSet<ConstraintId> = IndexSet::new();
        let mut todo: IndexSet<VarId> = IndexSet::new();
        todo.insert(output);
        while let Some(v) = todo.shift_remove_index(0) {
            for &c in &self.var(v)?.constraints {
                if self.constraints.get(c).is_some_and(|n| n.enforcing.is_none()) {
                    unenforced.insert(c);
                }
            }
            for c in self.consuming_constraints(v)? {
                self.recalculate(c)?;
                if let Some(next) = self.cons(c)?.enforced_output() {
                    todo.insert(next);
                }
            }
        }

        let mut ranked: Vec<(Strength, ConstraintId)> = Vec::with_capacity(unenforced.len());
        for c in unenforced {
            ranked.push((self.cons(c)?.def.strength(), c));
        }
        ranked.sort_by(|a, b| b.0.cmp(&a.0));
        Ok(ranked.into_iter().map(|(_, c)| c).collect())
    }

    /// Enforcing constraints that read `v`.
    pub(crate) fn consuming_constraints(
        &self,
        v: VarId,
    ) -> Result<SmallVec<[ConstraintId; 4]>, SolveError> {
        let node = self.var(v)?;
        Ok(node
            .constraints
            .iter()
            .copied()
            .filter(|&c| {
                Some(c) != node.determined_by
                    && self
                        .constraints
                        .get(c)
                        .is_some_and(|n| n.enforcing.is_some())
            })
            .collect())
    }

    /// Refresh the walk strength and constant flag of `c`'s output, and
    /// its value when constant.
    fn recalculate(&mut self, c: ConstraintId) -> Result<(), SolveError> {
        let node = self.cons(c)?;
        let Some((index, output)) = node
            .enforcing
            .zip(node.enforced_output())
        else {
            return Ok(());
        };

        let mut walk = node.def.strength();
        for method in node.def.methods() {
            if method.output() != output {
                walk = walk.weakest_of(self.var(method.output())?.walk_strength);
            }
        }
        let mut constant = !node.def.is_volatile();
        for &v in node.def.variables() {
            if v != output && !self.var(v)?.constant {
                constant = false;
            }
        }

        let out = self.var_mut(output)?;
        out.walk_strength = walk;
        out.constant = constant;
        if constant {
            self.execute_method(c, index)?;
        }
        Ok(())
    }

    /// Run method `index` of `c` and store the outcome in its output.
    ///
    /// A poisoned or unassigned input poisons the output without
    /// calling the method.
    pub(crate) fn execute_method(&mut self, c: ConstraintId, index: usize) -> Result<(), SolveError> {
        let node = self
            .constraints
            .get(c)
            .ok_or(SolveError::UnknownConstraint { constraint: c })?;
        let Some(method) = node.def.method(index) else {
            return Ok(());
        };
        let output = method.output();

        let mut values: SmallVec<[&T; 4]> = SmallVec::with_capacity(method.inputs().len());
        let mut failure = None;
        for &input in method.inputs() {
            let var = self
                .variables
                .get(input)
                .ok_or(SolveError::UnknownVariable { variable: input })?;
            match &var.value {
                VarValue::Assigned(value) => values.push(value),
                VarValue::Poisoned(cause) => {
                    failure = Some(cause.clone());
                    break;
                }
                VarValue::Unassigned => {
                    failure = Some(FormulaError::UnassignedInput { variable: input });
                    break;
                }
            }
        }
        let outcome = match failure {
            Some(cause) => Outcome::Fail(cause),
            None => method.run(&values),
        };
        drop(values);

        self.metrics.methods_executed += 1;
        let out = self
            .variables
            .get_mut(output)
            .ok_or(SolveError::UnknownVariable { variable: output })?;
        match outcome {
            Outcome::Assign(value) => out.value = VarValue::Assigned(value),
            Outcome::Keep => {}
            Outcome::Fail(cause) => {
                trace!("{c} poisons {output}: {cause}");
                self.metrics.poisoned_outputs += 1;
                out.value = VarValue::Poisoned(cause);
            }
        }
        trace!("executed {c} into {output}");
        Ok(())
    }

    /// Add `c` to the incident set of each of its variables.
    pub(crate) fn register(&mut self, c: ConstraintId) -> Result<(), SolveError> {
        let node = self
            .constraints
            .get(c)
            .ok_or(SolveError::UnknownConstraint { constraint: c })?;
        for &v in node.def.variables() {
            let var = self
                .variables
                .get_mut(v)
                .ok_or(SolveError::UnknownVariable { variable: v })?;
            var.constraints.insert(c);
        }
        Ok(())
    }

    /// Remove `c` from the incident set of each of its variables.
    pub(crate) fn deregister(&mut self, c: ConstraintId) -> Result<(), SolveError> {
        let node = self
            .constraints
            .get(c)
            .ok_or(SolveError::UnknownConstraint { constraint: c })?;
        for &v in node.def.variables() {
            if let Some(var) = self.variables.get_mut(v) {
                var.constraints.shift_remove(&c);
            }
        }
        Ok(())
    }
}
