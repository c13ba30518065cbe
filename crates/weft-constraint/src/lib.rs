//! Constraint methods and builder validation for the Weft solver.
//!
//! A constraint is a set of candidate [`Method`]s over a fixed set of
//! variables. The solver picks one method at a time to enforce the
//! constraint; the others are alternative ways of computing the same
//! relation. [`ConstraintBuilder`] accumulates methods, rejects
//! malformed relations at registration time, and produces an
//! immutable [`ConstraintDef`].
//!
//! # Examples
//!
//! A two-way relation `a = b + 1`:
//!
//! ```
//! use weft_constraint::ConstraintBuilder;
//! use weft_core::{Strength, VarId};
//!
//! let (a, b) = (VarId::new(0, 0), VarId::new(1, 0));
//!
//! let mut builder = ConstraintBuilder::<i64>::new(Strength::Strong);
//! builder.formula(a, [b], |[b]| b + 1).unwrap();
//! builder.formula(b, [a], |[a]| a - 1).unwrap();
//! let def = builder.build().unwrap();
//!
//! assert_eq!(def.methods().len(), 2);
//! assert_eq!(def.variables(), &[a, b]);
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod builder;
pub mod method;

pub use builder::{BuildError, ConstraintBuilder, ConstraintDef};
pub use method::{Action, ComputeFn, Method, ObserveFn, Outcome};
