//! Core types for the Weft constraint solver.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the vocabulary shared across the Weft workspace: variable and
//! constraint identifiers, traversal marks, constraint strengths, the
//! per-variable value cell, and the formula error type.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod id;
pub mod strength;
pub mod value;

pub use error::FormulaError;
pub use id::{ConstraintId, GraphGeneration, Mark, VarId, VarList};
pub use strength::Strength;
pub use value::VarValue;
