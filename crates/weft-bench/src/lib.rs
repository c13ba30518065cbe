//! Benchmark workloads for the Weft constraint solver.
//!
//! Provides pre-built solvers for benchmarking:
//!
//! - [`chain_profile`]: two-way chain anchored by a weak stay on its tail
//! - [`volatile_chain_profile`]: one-way chain fed by an external source
//! - [`projection_profile`]: independent `dst = src * scale + offset` pairs

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use weft_core::Strength;
use weft_engine::{SolveError, Solver};
use weft_test_utils::{one_way_chain, projection, two_way_chain, Chain, Projection};

/// A solver holding one chain.
pub struct ChainProfile {
    pub solver: Solver<i64>,
    pub chain: Chain,
}

/// Two-way chain of `len` variables with a weak stay on the last one.
///
/// Writing the head propagates through every link.
pub fn chain_profile(len: usize) -> Result<ChainProfile, SolveError> {
    let mut solver = Solver::new();
    let chain = two_way_chain(&mut solver, len, 0)?;
    solver.stay(chain.last(), Strength::Weak)?;
    Ok(ChainProfile { solver, chain })
}

/// A one-way chain whose head reads an external cell.
pub struct VolatileChainProfile {
    pub solver: Solver<i64>,
    pub chain: Chain,
    /// The cell read by the head's volatile constraint.
    pub source: Arc<AtomicI64>,
}

impl VolatileChainProfile {
    /// Store a new value in the external cell.
    pub fn feed(&self, value: i64) {
        self.source.store(value, Ordering::Relaxed);
    }
}

/// One-way chain of `len` variables whose head is volatile.
pub fn volatile_chain_profile(len: usize) -> Result<VolatileChainProfile, SolveError> {
    let mut solver = Solver::new();
    let chain = one_way_chain(&mut solver, len, 0)?;
    let source = Arc::new(AtomicI64::new(0));
    let feed = Arc::clone(&source);
    let head = chain.first();
    solver.constrain(Strength::Strong, move |c| {
        c.volatile_formula(head, [], move |[]| feed.load(Ordering::Relaxed))?;
        Ok(())
    })?;
    Ok(VolatileChainProfile {
        solver,
        chain,
        source,
    })
}

/// A solver holding independent projections.
pub struct ProjectionProfile {
    pub solver: Solver<i64>,
    pub projections: Vec<Projection>,
}

/// `n` projections `dst = src * 10 + 1000`, each `src` held by a weak stay.
pub fn projection_profile(n: usize) -> Result<ProjectionProfile, SolveError> {
    let mut solver = Solver::new();
    let mut projections = Vec::with_capacity(n);
    for i in 0..n {
        let p = projection(&mut solver, i as i64, 10, 1000, Strength::Required)?;
        solver.stay(p.src, Strength::Weak)?;
        projections.push(p);
    }
    Ok(ProjectionProfile {
        solver,
        projections,
    })
}
