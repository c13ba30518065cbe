//! Property tests: random edits on a two-way chain.
//!
//! After every operation the graph must be consistent: each variable
//! has at most one determiner, determiners enforce exactly that
//! variable, walk strengths never exceed the determiner's strength, and
//! every enforced link holds.

use proptest::prelude::*;

use weft_core::{ConstraintId, Strength};
use weft_engine::{SolveError, Solver};
use weft_test_utils::{two_way_chain, Chain};

const LEN: usize = 6;

#[derive(Clone, Debug)]
enum Op {
    Write(usize, i64),
    Stay(usize, Strength),
    DropStay(usize),
    ToggleLink(usize),
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0..LEN, -100i64..100).prop_map(|(i, v)| Op::Write(i, v)),
        2 => (0..LEN, prop_oneof![Just(Strength::Weak), Just(Strength::Medium)])
            .prop_map(|(i, s)| Op::Stay(i, s)),
        1 => (0..LEN).prop_map(Op::DropStay),
        1 => (0..LEN - 1).prop_map(Op::ToggleLink),
    ]
}

fn check(solver: &Solver<i64>, chain: &Chain, extra: &[ConstraintId]) -> Result<(), TestCaseError> {
    for &v in &chain.vars {
        if let Some(c) = solver.determined_by(v).unwrap() {
            prop_assert_eq!(solver.enforcing_output(c).unwrap(), Some(v));
            prop_assert!(solver.is_enabled(c).unwrap());
            prop_assert!(solver.walk_strength(v).unwrap() <= solver.strength(c).unwrap());
        } else {
            prop_assert_eq!(solver.walk_strength(v).unwrap(), Strength::Weakest);
        }
    }
    for (i, &link) in chain.links.iter().enumerate() {
        if solver.is_enforcing(link).unwrap() {
            prop_assert!(solver.is_enabled(link).unwrap());
            prop_assert_eq!(
                solver.value(chain.vars[i]).unwrap(),
                solver.value(chain.vars[i + 1]).unwrap()
            );
        }
    }
    for &c in extra {
        if let Some(out) = solver.enforcing_output(c).unwrap() {
            prop_assert_eq!(solver.determined_by(out).unwrap(), Some(c));
        }
    }
    Ok(())
}

proptest! {
    #[test]
    fn random_edits_keep_graph_consistent(ops in prop::collection::vec(arb_op(), 1..40)) {
        let mut solver = Solver::<i64>::new();
        let chain = two_way_chain(&mut solver, LEN, 0).unwrap();
        let mut stays: Vec<Option<ConstraintId>> = vec![None; LEN];

        for op in ops {
            match op {
                Op::Write(i, value) => solver.write(chain.vars[i], value).unwrap(),
                Op::Stay(i, strength) => {
                    if stays[i].is_none() {
                        stays[i] = Some(solver.stay(chain.vars[i], strength).unwrap());
                    }
                }
                Op::DropStay(i) => {
                    if let Some(c) = stays[i].take() {
                        solver.remove_constraint(c).unwrap();
                    }
                }
                Op::ToggleLink(i) => {
                    let link = chain.links[i];
                    if solver.is_enabled(link).unwrap() {
                        solver.disable(link).unwrap();
                    } else {
                        solver.enable(link).unwrap();
                    }
                }
            }
            let extra: Vec<_> = stays.iter().flatten().copied().collect();
            check(&solver, &chain, &extra)?;
        }
    }

    #[test]
    fn writes_to_unconstrained_variables_stick(values in prop::collection::vec(any::<i64>(), 1..20)) {
        let mut solver = Solver::<i64>::new();
        let v = solver.unassigned_variable().unwrap();
        for value in values {
            solver.write(v, value).unwrap();
            prop_assert_eq!(solver.value(v).unwrap(), value);
        }
        prop_assert_eq!(solver.metrics().edits, 0);
    }

    #[test]
    fn head_write_reaches_every_link(value in -1000i64..1000, len in 2usize..24) {
        let mut solver = Solver::<i64>::new();
        let chain = two_way_chain(&mut solver, len, 0).unwrap();
        solver.write(chain.first(), value).unwrap();
        let values = chain.values(&solver).map_err(|e: SolveError| TestCaseError::fail(e.to_string()))?;
        prop_assert!(values.iter().all(|&v| v == value));
    }
}
