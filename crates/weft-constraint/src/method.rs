//! The [`Method`] type and its actions.
//!
//! A method computes one output variable from zero or more input
//! variables. Methods are stateless between invocations apart from the
//! constant captured by an edit. They never touch solver state: the
//! engine gathers input values, calls [`Method::run`], and stores the
//! [`Outcome`].

use std::fmt;
use std::sync::Arc;

use weft_core::{FormulaError, VarId, VarList};

/// User computation: input values in declaration order to a new output value.
pub type ComputeFn<T> = dyn Fn(&[&T]) -> Result<T, FormulaError> + Send + Sync;

/// Observer callback: receives input values, produces nothing.
pub type ObserveFn<T> = dyn Fn(&[&T]) + Send + Sync;

/// What a method does when executed.
pub enum Action<T> {
    /// Assign a captured constant.
    Edit(T),
    /// Leave the output unchanged.
    Stay,
    /// Compute the output from the inputs.
    Compute(Arc<ComputeFn<T>>),
    /// Hand the inputs to a callback; the output is left unchanged.
    Observe(Arc<ObserveFn<T>>),
}

impl<T: Clone> Clone for Action<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Edit(v) => Self::Edit(v.clone()),
            Self::Stay => Self::Stay,
            Self::Compute(f) => Self::Compute(Arc::clone(f)),
            Self::Observe(f) => Self::Observe(Arc::clone(f)),
        }
    }
}

impl<T> fmt::Debug for Action<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Edit(_) => f.write_str("Edit"),
            Self::Stay => f.write_str("Stay"),
            Self::Compute(_) => f.write_str("Compute"),
            Self::Observe(_) => f.write_str("Observe"),
        }
    }
}

/// Result of running a method.
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome<T> {
    /// Store this value in the output.
    Assign(T),
    /// Leave the output as it is.
    Keep,
    /// Poison the output with this cause.
    Fail(FormulaError),
}

/// One candidate way of enforcing a constraint.
///
/// # Contract
///
/// - The output never appears among the inputs.
/// - `run()` receives exactly one value per input, in declaration order.
/// - Compute and observe closures should be deterministic unless the
///   owning constraint is volatile.
#[derive(Clone, Debug)]
pub struct Method<T> {
    output: VarId,
    inputs: VarList,
    action: Action<T>,
}

impl<T> Method<T> {
    /// A method that assigns `value` to `output`.
    pub fn edit(output: VarId, value: T) -> Self {
        Self {
            output,
            inputs: VarList::new(),
            action: Action::Edit(value),
        }
    }

    /// A method that leaves `output` unchanged.
    pub fn stay(output: VarId) -> Self {
        Self {
            output,
            inputs: VarList::new(),
            action: Action::Stay,
        }
    }

    /// A method computing `output` from `inputs` with `f`.
    pub fn compute<F>(output: VarId, inputs: &[VarId], f: F) -> Self
    where
        F: Fn(&[&T]) -> Result<T, FormulaError> + Send + Sync + 'static,
    {
        Self {
            output,
            inputs: inputs.iter().copied().collect(),
            action: Action::Compute(Arc::new(f)),
        }
    }

    /// A method passing `inputs` to `f` whenever it runs.
    pub fn observe<F>(output: VarId, inputs: &[VarId], f: F) -> Self
    where
        F: Fn(&[&T]) + Send + Sync + 'static,
    {
        Self {
            output,
            inputs: inputs.iter().copied().collect(),
            action: Action::Observe(Arc::new(f)),
        }
    }

    /// The variable this method writes.
    pub fn output(&self) -> VarId {
        self.output
    }

    /// The variables this method reads, in declaration order.
    pub fn inputs(&self) -> &[VarId] {
        &self.inputs
    }

    /// The action performed on execution.
    pub fn action(&self) -> &Action<T> {
        &self.action
    }
}

impl<T: Clone> Method<T> {
    /// Execute with the given input values.
    pub fn run(&self, values: &[&T]) -> Outcome<T> {
        match &self.action {
            Action::Edit(value) => Outcome::Assign(value.clone()),
            Action::Stay => Outcome::Keep,
            Action::Compute(f) => {
                if values.len() != self.inputs.len() {
                    return Outcome::Fail(FormulaError::Arity {
                        expected: self.inputs.len(),
                        found: values.len(),
                    });
                }
                match f(values) {
                    Ok(v) => Outcome::Assign(v),
                    Err(cause) => Outcome::Fail(cause),
                }
            }
            Action::Observe(f) => {
                f(values);
                Outcome::Keep
            }
        }
    }

    /// A copy with every variable passed through `map`.
    pub fn substitute(&self, map: impl Fn(VarId) -> VarId) -> Self {
        Self {
            output: map(self.output),
            inputs: self.inputs.iter().map(|&v| map(v)).collect(),
            action: self.action.clone(),
        }
    }
}
