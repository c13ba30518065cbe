//! Precomputed replay of volatile propagation.
//!
//! Enabling constraints only executes methods whose output is constant.
//! Values downstream of a volatile constraint are refreshed on request:
//! [`Solver::plan`] orders the affected methods once, and
//! [`Solver::execute`] replays them as often as the caller likes.
//!
//! A [`Plan`] is stamped with the [`GraphGeneration`] it was built at.
//! Any later enable or disable bumps the solver's generation, and
//! executing the stale plan fails with
//! [`SolveError::PlanInvalidated`] instead of running methods that may
//! no longer be enforcing.

use indexmap::IndexSet;
use log::debug;

use weft_core::{ConstraintId, GraphGeneration, VarId};

use crate::error::SolveError;
use crate::solver::Solver;

/// Where a plan starts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlanSeed {
    /// Every volatile constraint enforcing a method on this variable.
    Variable(VarId),
    /// This constraint, if it is volatile and enforcing.
    Constraint(ConstraintId),
}

impl From<VarId> for PlanSeed {
    fn from(v: VarId) -> Self {
        Self::Variable(v)
    }
}

impl From<ConstraintId> for PlanSeed {
    fn from(c: ConstraintId) -> Self {
        Self::Constraint(c)
    }
}

/// One method execution.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlanStep {
    /// The enforcing constraint.
    pub constraint: ConstraintId,
    /// Index of its enforcing method at plan time.
    pub method: usize,
    /// The variable the method writes.
    pub output: VarId,
}

/// An ordered list of method executions captured from one graph state.
///
/// Each step's inputs are either constant or written by an earlier
/// step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Plan {
    steps: Vec<PlanStep>,
    generation: GraphGeneration,
}

impl Plan {
    /// The steps, in execution order.
    pub fn steps(&self) -> &[PlanStep] {
        &self.steps
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether the plan does nothing.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Solver generation the plan was built at.
    pub fn generation(&self) -> GraphGeneration {
        self.generation
    }
}

impl<T: Clone + 'static> Solver<T> {
    /// Order the methods downstream of the volatile constraints named by
    /// `seeds`.
    ///
    /// A constraint is scheduled once its output is unclaimed and every
    /// input is constant or already scheduled; constraints whose inputs
    /// are not yet known are revisited when another input is scheduled.
    pub fn plan<I>(&mut self, seeds: I) -> Result<Plan, SolveError>
    where
        I: IntoIterator,
        I::Item: Into<PlanSeed>,
    {
        let mut hot: IndexSet<ConstraintId> = IndexSet::new();
        for seed in seeds {
            match seed.into() {
                PlanSeed::Variable(v) => {
                    for &c in &self.var(v)?.constraints {
                        if self.is_volatile_source(c) {
                            hot.insert(c);
                        }
                    }
                }
                PlanSeed::Constraint(c) => {
                    self.cons(c)?;
                    if self.is_volatile_source(c) {
                        hot.insert(c);
                    }
                }
            }
        }

        let mark = self.next_mark();
        let mut steps = Vec::new();
        while let Some(c) = hot.shift_remove_index(0) {
            let node = self.cons(c)?;
            let (Some(method), Some(output)) = (node.enforcing, node.enforced_output()) else {
                continue;
            };
            if self.var(output)?.mark == mark {
                continue;
            }
            let mut known = true;
            for &v in node.def.variables() {
                if v == output {
                    continue;
                }
                let input = self.var(v)?;
                if input.mark != mark && !input.constant {
                    known = false;
                    break;
                }
            }
            if !known {
                continue;
            }
            steps.push(PlanStep {
                constraint: c,
                method,
                output,
            });
            self.var_mut(output)?.mark = mark;
            hot.extend(self.consuming_constraints(output)?);
        }

        self.metrics.plans_built += 1;
        debug!(
            "planned {} step(s) at generation {}",
            steps.len(),
            self.generation
        );
        Ok(Plan {
            steps,
            generation: self.generation,
        })
    }

    fn is_volatile_source(&self, c: ConstraintId) -> bool {
        self.constraints
            .get(c)
            .is_some_and(|n| n.enabled && n.def.is_volatile() && n.enforcing.is_some())
    }

    /// Run every step of `plan` in order.
    ///
    /// Fails without running anything if the graph changed since the
    /// plan was built.
    pub fn execute(&mut self, plan: &Plan) -> Result<(), SolveError> {
        if plan.generation != self.generation {
            return Err(SolveError::PlanInvalidated {
                built: plan.generation,
                current: self.generation,
            });
        }
        for step in &plan.steps {
            self.execute_method(step.constraint, step.method)?;
        }
        self.metrics.plan_steps_executed += plan.steps.len() as u64;
        Ok(())
    }

    /// Re-run the volatile constraints on `v` and everything downstream.
    pub fn recompute(&mut self, v: VarId) -> Result<(), SolveError> {
        let plan = self.plan([v])?;
        self.execute(&plan)
    }

    /// Re-run `c`, if volatile, and everything downstream.
    pub fn recompute_constraint(&mut self, c: ConstraintId) -> Result<(), SolveError> {
        let plan = self.plan([c])?;
        self.execute(&plan)
    }
}
