//! Reusable constraint graph fixtures.
//!
//! - [`one_way_chain`]: each variable copies its predecessor.
//! - [`two_way_chain`]: neighbouring variables copy each other in
//!   whichever direction the solver picks.
//! - [`projection`]: `dst = src * scale + offset`, solvable for either
//!   end, with the scale and offset held by required stays.

use weft_core::{ConstraintId, FormulaError, Strength, VarId};
use weft_engine::{SolveError, Solver};

/// A chain of equalities.
pub struct Chain {
    /// Variables from head to tail.
    pub vars: Vec<VarId>,
    /// `links[i]` relates `vars[i]` and `vars[i + 1]`.
    pub links: Vec<ConstraintId>,
}

impl Chain {
    pub fn first(&self) -> VarId {
        self.vars[0]
    }

    pub fn last(&self) -> VarId {
        self.vars[self.vars.len() - 1]
    }

    pub fn middle(&self) -> VarId {
        self.vars[self.vars.len() / 2]
    }

    /// Current values, head to tail.
    pub fn values(&self, solver: &Solver<i64>) -> Result<Vec<i64>, SolveError> {
        self.vars.iter().map(|&v| solver.value(v)).collect()
    }
}

/// `len` variables valued `init`, each later one computed from the one
/// before by a strong one-way constraint.
///
/// `len` must be at least 1.
pub fn one_way_chain(solver: &mut Solver<i64>, len: usize, init: i64) -> Result<Chain, SolveError> {
    let vars = solver.variables(std::iter::repeat(init).take(len))?;
    let mut links = Vec::with_capacity(len.saturating_sub(1));
    for pair in vars.windows(2) {
        let (prev, curr) = (pair[0], pair[1]);
        links.push(solver.constrain(Strength::Strong, |c| {
            c.formula(curr, [prev], |[p]| *p)?;
            Ok(())
        })?);
    }
    Ok(Chain { vars, links })
}

/// Like [`one_way_chain`], but every link can also copy backwards.
pub fn two_way_chain(solver: &mut Solver<i64>, len: usize, init: i64) -> Result<Chain, SolveError> {
    let vars = solver.variables(std::iter::repeat(init).take(len))?;
    let mut links = Vec::with_capacity(len.saturating_sub(1));
    for pair in vars.windows(2) {
        let (prev, curr) = (pair[0], pair[1]);
        links.push(solver.constrain(Strength::Strong, |c| {
            c.formula(curr, [prev], |[p]| *p)?;
            c.formula(prev, [curr], |[n]| *n)?;
            Ok(())
        })?);
    }
    Ok(Chain { vars, links })
}

/// A linear projection between two variables.
pub struct Projection {
    pub src: VarId,
    pub scale: VarId,
    pub offset: VarId,
    pub dst: VarId,
    pub constraint: ConstraintId,
}

/// Build `dst = src * scale + offset` at `strength`.
///
/// Solving for `src` divides by `scale`; a zero scale poisons `src`.
pub fn projection(
    solver: &mut Solver<i64>,
    src: i64,
    scale: i64,
    offset: i64,
    strength: Strength,
) -> Result<Projection, SolveError> {
    let [src, scale, offset, dst] = solver.variable_array([src, scale, offset, 0])?;
    solver.stay(scale, Strength::Required)?;
    solver.stay(offset, Strength::Required)?;
    let constraint = solver.constrain(strength, |c| {
        c.formula(dst, [src, scale, offset], |[s, k, o]| s * k + o)?;
        c.try_formula(src, [dst, scale, offset], |[d, k, o]| {
            if *k == 0 {
                return Err(FormulaError::new("zero scale"));
            }
            Ok((d - o) / k)
        })?;
        Ok(())
    })?;
    Ok(Projection {
        src,
        scale,
        offset,
        dst,
        constraint,
    })
}
