//! Constraint construction and validation.
//!
//! [`ConstraintBuilder`] accumulates methods and checks each one as it
//! is registered. [`ConstraintBuilder::build`] runs the whole-relation
//! checks and freezes the result into a [`ConstraintDef`].
//!
//! Checks performed:
//!
//! 1. No variable is declared as output twice.
//! 2. No method reads its own output, and no method lists an input twice.
//! 3. A pass-through (a formula without a computation) has at most one input.
//! 4. The constraint declares at least one method.
//! 5. In a multi-method constraint, every method covers the whole
//!    variable set: each method's inputs are exactly the other
//!    variables of the relation.

use std::collections::HashMap;
use std::error::Error;
use std::fmt;

use indexmap::IndexSet;

use weft_core::{FormulaError, Strength, VarId, VarList};

use crate::method::Method;

// ── Errors ─────────────────────────────────────────────────────────

/// Malformed constraint declarations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BuildError {
    /// No methods were declared.
    EmptyConstraint,
    /// The same variable was declared as output of two methods.
    DuplicateOutput {
        /// The contested variable.
        output: VarId,
    },
    /// A method lists its own output among its inputs.
    InputIsOutput {
        /// The offending method's output.
        output: VarId,
    },
    /// A method lists the same input twice.
    DuplicateInput {
        /// The offending method's output.
        output: VarId,
        /// The repeated input.
        input: VarId,
    },
    /// A method's input count does not fit its computation.
    ArityMismatch {
        /// The offending method's output.
        output: VarId,
        /// Largest input count the computation accepts.
        expected: usize,
        /// Input count declared.
        found: usize,
    },
    /// A method of a multi-method constraint does not mention a
    /// variable of the relation.
    DisconnectedFormula {
        /// The offending method's output.
        output: VarId,
        /// A relation variable the method neither reads nor writes.
        missing: VarId,
    },
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyConstraint => write!(f, "constraint declares no formulas"),
            Self::DuplicateOutput { output } => {
                write!(f, "variable {output} declared as output more than once")
            }
            Self::InputIsOutput { output } => {
                write!(f, "formula for {output} reads its own output")
            }
            Self::DuplicateInput { output, input } => {
                write!(f, "formula for {output} lists input {input} twice")
            }
            Self::ArityMismatch {
                output,
                expected,
                found,
            } => {
                write!(
                    f,
                    "formula for {output} accepts at most {expected} inputs, {found} given"
                )
            }
            Self::DisconnectedFormula { output, missing } => {
                write!(
                    f,
                    "formula for {output} does not involve {missing}; \
                     every formula must relate all variables of the constraint"
                )
            }
        }
    }
}

impl Error for BuildError {}

// ── ConstraintDef ──────────────────────────────────────────────────

/// A validated, immutable constraint declaration.
///
/// Produced by [`ConstraintBuilder::build`]. The variable set is the
/// ordered union of every method's output and inputs, in declaration
/// order.
#[derive(Clone, Debug)]
pub struct ConstraintDef<T> {
    variables: VarList,
    strength: Strength,
    volatile: bool,
    label: Option<String>,
    methods: Vec<Method<T>>,
}

impl<T> ConstraintDef<T> {
    /// All variables of the relation.
    pub fn variables(&self) -> &[VarId] {
        &self.variables
    }

    /// Declared strength.
    pub fn strength(&self) -> Strength {
        self.strength
    }

    /// Whether the output may change from causes outside the graph.
    pub fn is_volatile(&self) -> bool {
        self.volatile
    }

    /// Diagnostic label, if one was given.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Candidate methods in declaration order.
    pub fn methods(&self) -> &[Method<T>] {
        &self.methods
    }

    /// The candidate method at `index`.
    pub fn method(&self, index: usize) -> Option<&Method<T>> {
        self.methods.get(index)
    }
}

impl<T: Clone + 'static> ConstraintDef<T> {
    /// A copy with variables replaced according to `map`.
    ///
    /// Variables absent from `map` are kept. The copy is validated
    /// again, since merging two variables can make a method read its
    /// own output.
    pub fn substitute(&self, map: &HashMap<VarId, VarId>) -> Result<Self, BuildError> {
        let mut builder = ConstraintBuilder::new(self.strength);
        builder.volatile = self.volatile;
        builder.label = self.label.clone();
        for method in &self.methods {
            builder.push(method.substitute(|v| map.get(&v).copied().unwrap_or(v)))?;
        }
        builder.build()
    }
}

// ── Builder ────────────────────────────────────────────────────────

/// Accumulates methods into a constraint.
///
/// Registration methods validate eagerly and return the builder for
/// chaining with `?`. Fixed-arity formulas take their inputs as an
/// array, so the closure's arity is checked at compile time.
pub struct ConstraintBuilder<T> {
    strength: Strength,
    volatile: bool,
    label: Option<String>,
    methods: Vec<Method<T>>,
}

impl<T: Clone + 'static> ConstraintBuilder<T> {
    /// An empty, non-volatile builder.
    pub fn new(strength: Strength) -> Self {
        Self {
            strength,
            volatile: false,
            label: None,
            methods: Vec::new(),
        }
    }

    /// Declared strength.
    pub fn strength(&self) -> Strength {
        self.strength
    }

    /// Whether the constraint has been marked volatile.
    pub fn is_volatile(&self) -> bool {
        self.volatile
    }

    /// Number of methods registered so far.
    pub fn len(&self) -> usize {
        self.methods.len()
    }

    /// Whether no methods have been registered.
    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    /// Mark the constraint volatile: its output depends on state outside
    /// the graph and is only refreshed by an explicit recompute.
    pub fn volatile(&mut self) -> &mut Self {
        self.volatile = true;
        self
    }

    /// Attach a diagnostic label.
    pub fn label(&mut self, label: impl Into<String>) -> &mut Self {
        self.label = Some(label.into());
        self
    }

    /// Register `output = f(inputs)`.
    pub fn formula<const N: usize, F>(
        &mut self,
        output: VarId,
        inputs: [VarId; N],
        f: F,
    ) -> Result<&mut Self, BuildError>
    where
        F: Fn([&T; N]) -> T + Send + Sync + 'static,
    {
        self.try_formula(output, inputs, move |args| Ok(f(args)))
    }

    /// Register `output = f(inputs)` where `f` may fail.
    ///
    /// A failure poisons `output` until it is next computed or written.
    pub fn try_formula<const N: usize, F>(
        &mut self,
        output: VarId,
        inputs: [VarId; N],
        f: F,
    ) -> Result<&mut Self, BuildError>
    where
        F: Fn([&T; N]) -> Result<T, FormulaError> + Send + Sync + 'static,
    {
        self.push(Method::compute(output, &inputs, move |values: &[&T]| {
            let args: [&T; N] = values.try_into().map_err(|_| FormulaError::Arity {
                expected: N,
                found: values.len(),
            })?;
            f(args)
        }))
    }

    /// Register a formula and mark the constraint volatile.
    pub fn volatile_formula<const N: usize, F>(
        &mut self,
        output: VarId,
        inputs: [VarId; N],
        f: F,
    ) -> Result<&mut Self, BuildError>
    where
        F: Fn([&T; N]) -> T + Send + Sync + 'static,
    {
        self.volatile();
        self.formula(output, inputs, f)
    }

    /// Register a formula over a runtime-sized input list.
    pub fn formula_dyn<F>(
        &mut self,
        output: VarId,
        inputs: &[VarId],
        f: F,
    ) -> Result<&mut Self, BuildError>
    where
        F: Fn(&[&T]) -> Result<T, FormulaError> + Send + Sync + 'static,
    {
        self.push(Method::compute(output, inputs, f))
    }

    /// Register a formula without a computation.
    ///
    /// With no inputs the output stays as it is; with one input the
    /// input's value is copied. More inputs are rejected because there
    /// is no way to pick which one to copy.
    pub fn pass_through(
        &mut self,
        output: VarId,
        inputs: &[VarId],
    ) -> Result<&mut Self, BuildError> {
        match inputs {
            [] => self.stay(output),
            [input] => self.formula(output, [*input], |[v]| v.clone()),
            _ => Err(BuildError::ArityMismatch {
                output,
                expected: 1,
                found: inputs.len(),
            }),
        }
    }

    /// Register a method that leaves `output` unchanged.
    pub fn stay(&mut self, output: VarId) -> Result<&mut Self, BuildError> {
        self.push(Method::stay(output))
    }

    /// Register a method that assigns `value` to `output`.
    pub fn constant(&mut self, output: VarId, value: T) -> Result<&mut Self, BuildError> {
        self.push(Method::edit(output, value))
    }

    /// Register an observer: `f` receives the values of `inputs` every
    /// time the method runs, and `output` is left untouched.
    pub fn observer<F>(
        &mut self,
        output: VarId,
        inputs: &[VarId],
        f: F,
    ) -> Result<&mut Self, BuildError>
    where
        F: Fn(&[&T]) + Send + Sync + 'static,
    {
        self.push(Method::observe(output, inputs, f))
    }

    /// Register a prepared method.
    pub fn push(&mut self, method: Method<T>) -> Result<&mut Self, BuildError> {
        let output = method.output();
        if self.methods.iter().any(|m| m.output() == output) {
            return Err(BuildError::DuplicateOutput { output });
        }
        let mut seen = IndexSet::with_capacity(method.inputs().len());
        for &input in method.inputs() {
            if input == output {
                return Err(BuildError::InputIsOutput { output });
            }
            if !seen.insert(input) {
                return Err(BuildError::DuplicateInput { output, input });
            }
        }
        self.methods.push(method);
        Ok(self)
    }

    /// Validate the whole relation and freeze it.
    pub fn build(self) -> Result<ConstraintDef<T>, BuildError> {
        if self.methods.is_empty() {
            return Err(BuildError::EmptyConstraint);
        }

        let mut variables: IndexSet<VarId> = IndexSet::new();
        for method in &self.methods {
            variables.insert(method.output());
            variables.extend(method.inputs().iter().copied());
        }

        if self.methods.len() > 1 {
            for method in &self.methods {
                let covered = method.inputs().len() + 1;
                if covered == variables.len() {
                    continue;
                }
                let missing = variables
                    .iter()
                    .copied()
                    .find(|&v| v != method.output() && !method.inputs().contains(&v));
                if let Some(missing) = missing {
                    return Err(BuildError::DisconnectedFormula {
                        output: method.output(),
                        missing,
                    });
                }
            }
        }

        Ok(ConstraintDef {
            variables: variables.into_iter().collect(),
            strength: self.strength,
            volatile: self.volatile,
            label: self.label,
            methods: self.methods,
        })
    }
}

impl<T: Clone + 'static> Default for ConstraintBuilder<T> {
    fn default() -> Self {
        Self::new(Strength::default())
    }
}

impl<T> fmt::Debug for ConstraintBuilder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstraintBuilder")
            .field("strength", &self.strength)
            .field("volatile", &self.volatile)
            .field("label", &self.label)
            .field("methods", &self.methods.len())
            .finish()
    }
}
