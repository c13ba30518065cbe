//! Cumulative solver counters.
//!
//! [`SolveMetrics`] counts the work done by a [`Solver`](crate::Solver)
//! since construction or the last
//! [`reset_metrics`](crate::Solver::reset_metrics), for profiling and
//! test assertions.

/// Counters accumulated across solver operations.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SolveMetrics {
    /// Constraints moved from disabled to enabled.
    pub enables: u64,
    /// Constraints moved from enabled to disabled.
    pub disables: u64,
    /// Writes routed through a one-shot edit constraint.
    pub edits: u64,
    /// Writes stored directly because no enabled constraint could
    /// override them.
    pub direct_writes: u64,
    /// Methods chosen to enforce a constraint.
    pub enforcements: u64,
    /// Constraints displaced from their output by a stronger one.
    pub retractions: u64,
    /// Method executions, eager or from a plan.
    pub methods_executed: u64,
    /// Executions that poisoned their output.
    pub poisoned_outputs: u64,
    /// Cycles detected during propagation.
    pub cycles: u64,
    /// Required constraints that could not be enforced.
    pub unsatisfiable: u64,
    /// Plans built.
    pub plans_built: u64,
    /// Plan steps executed.
    pub plan_steps_executed: u64,
}
