//! Integration test: volatile constraints and plans.
//!
//! Volatile constraints read state outside the graph, so enabling them
//! computes nothing. Plans replay them, and everything downstream, on
//! request, and refuse to run once the graph has changed.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use weft_core::Strength;
use weft_engine::{PlanSeed, SolveError, Solver};
use weft_test_utils::CallCounter;

fn feed(initial: i64) -> (Arc<AtomicI64>, Arc<AtomicI64>) {
    let cell = Arc::new(AtomicI64::new(initial));
    (Arc::clone(&cell), cell)
}

// ── Plans ─────────────────────────────────────────────────────────

#[test]
fn plan_replays_volatile_sources() {
    let (a_src, a_feed) = feed(1);
    let (b_src, b_feed) = feed(11);
    let mut s = Solver::<i64>::new();
    let [a, b] = s.variable_array([8, 5]).unwrap();
    s.constrain(Strength::Strong, move |c| {
        c.volatile_formula(a, [], move |[]| a_feed.load(Ordering::SeqCst))?;
        Ok(())
    })
    .unwrap();
    let b_constraint = s
        .constrain(Strength::Strong, move |c| {
            c.volatile_formula(b, [], move |[]| b_feed.load(Ordering::SeqCst))?;
            Ok(())
        })
        .unwrap();
    assert_eq!(s.value(a).unwrap(), 8);
    assert_eq!(s.value(b).unwrap(), 5);

    a_src.store(2, Ordering::SeqCst);
    b_src.store(12, Ordering::SeqCst);
    let plan = s
        .plan([PlanSeed::from(a), PlanSeed::from(b_constraint)])
        .unwrap();
    assert_eq!(plan.len(), 2);
    assert_eq!(s.value(a).unwrap(), 8);
    assert_eq!(s.value(b).unwrap(), 5);

    s.execute(&plan).unwrap();
    assert_eq!(s.value(a).unwrap(), 2);
    assert_eq!(s.value(b).unwrap(), 12);
}

#[test]
fn plan_waits_for_every_volatile_input() {
    let (x_src, x_feed) = feed(1);
    let (y_src, y_feed) = feed(2);
    let mut s = Solver::<i64>::new();
    let [x, y, sum] = s.variable_array([0, 0, 0]).unwrap();
    let sx = s
        .constrain(Strength::Strong, move |c| {
            c.volatile_formula(x, [], move |[]| x_feed.load(Ordering::SeqCst))?;
            Ok(())
        })
        .unwrap();
    let sy = s
        .constrain(Strength::Strong, move |c| {
            c.volatile_formula(y, [], move |[]| y_feed.load(Ordering::SeqCst))?;
            Ok(())
        })
        .unwrap();
    let add = s
        .constrain(Strength::Strong, |c| {
            c.formula(sum, [x, y], |[x, y]| x + y)?;
            Ok(())
        })
        .unwrap();

    let plan = s.plan([sx, sy]).unwrap();
    let order: Vec<_> = plan.steps().iter().map(|step| step.constraint).collect();
    assert_eq!(order, vec![sx, sy, add]);

    s.execute(&plan).unwrap();
    assert_eq!(s.value(sum).unwrap(), 3);

    x_src.store(10, Ordering::SeqCst);
    y_src.store(20, Ordering::SeqCst);
    s.execute(&plan).unwrap();
    assert_eq!(s.value(sum).unwrap(), 30);
}

#[test]
fn plan_from_one_source_skips_unready_consumers() {
    let (_x_src, x_feed) = feed(1);
    let (_y_src, y_feed) = feed(2);
    let mut s = Solver::<i64>::new();
    let [x, y, sum] = s.variable_array([0, 0, 0]).unwrap();
    let sx = s
        .constrain(Strength::Strong, move |c| {
            c.volatile_formula(x, [], move |[]| x_feed.load(Ordering::SeqCst))?;
            Ok(())
        })
        .unwrap();
    s.constrain(Strength::Strong, move |c| {
        c.volatile_formula(y, [], move |[]| y_feed.load(Ordering::SeqCst))?;
        Ok(())
    })
    .unwrap();
    s.constrain(Strength::Strong, |c| {
        c.formula(sum, [x, y], |[x, y]| x + y)?;
        Ok(())
    })
    .unwrap();

    // `y` is neither constant nor planned, so the sum cannot run.
    let plan = s.plan([sx]).unwrap();
    assert_eq!(plan.len(), 1);
}

#[test]
fn recompute_refreshes_downstream_values() {
    let (src, source) = feed(4);
    let calls = CallCounter::new();
    let hits = calls.clone();
    let mut s = Solver::<i64>::new();
    let [raw, scaled] = s.variable_array([0, 0]).unwrap();
    s.constrain(Strength::Strong, move |c| {
        c.volatile_formula(raw, [], move |[]| source.load(Ordering::SeqCst))?;
        Ok(())
    })
    .unwrap();
    s.constrain(Strength::Strong, move |c| {
        c.formula(scaled, [raw], move |[r]| {
            hits.hit();
            r * 100
        })?;
        Ok(())
    })
    .unwrap();
    assert_eq!(calls.count(), 0);

    s.recompute(raw).unwrap();
    assert_eq!(s.value(scaled).unwrap(), 400);
    assert_eq!(calls.count(), 1);

    src.store(5, Ordering::SeqCst);
    s.recompute(scaled).unwrap();
    assert_eq!(s.value(scaled).unwrap(), 400, "scaled has no volatile constraint");
    s.recompute(raw).unwrap();
    assert_eq!(s.value(scaled).unwrap(), 500);
}

#[test]
fn recompute_constraint_ignores_non_volatile() {
    let mut s = Solver::<i64>::new();
    let v = s.variable(1).unwrap();
    let c = s.edit(v, 2, Strength::Medium).unwrap();
    let before = s.metrics().methods_executed;
    s.recompute_constraint(c).unwrap();
    assert_eq!(s.metrics().methods_executed, before);
}

// ── Invalidation ──────────────────────────────────────────────────

#[test]
fn plan_is_invalidated_by_enable_and_disable() {
    let (_src, source) = feed(1);
    let mut s = Solver::<i64>::new();
    let [v, w] = s.variable_array([0, 0]).unwrap();
    s.constrain(Strength::Strong, move |c| {
        c.volatile_formula(v, [], move |[]| source.load(Ordering::SeqCst))?;
        Ok(())
    })
    .unwrap();
    let plan = s.plan([v]).unwrap();
    let built = plan.generation();

    let stay = s.stay(w, Strength::Weak).unwrap();
    assert_eq!(
        s.execute(&plan),
        Err(SolveError::PlanInvalidated {
            built,
            current: s.generation(),
        })
    );

    let plan = s.plan([v]).unwrap();
    s.disable(stay).unwrap();
    assert!(matches!(
        s.execute(&plan),
        Err(SolveError::PlanInvalidated { .. })
    ));

    let plan = s.plan([v]).unwrap();
    s.execute(&plan).unwrap();
    assert_eq!(s.value(v).unwrap(), 1);
}

#[test]
fn writes_to_volatile_inputs_keep_plans_valid() {
    let mut s = Solver::<i64>::new();
    let [input, out] = s.variable_array([1, 0]).unwrap();
    // Every constraint on `input` is volatile, so writes bypass the
    // graph and only a plan refreshes `out`.
    s.constrain(Strength::Strong, |c| {
        c.formula(out, [input], |[i]| i * 3)?.volatile();
        Ok(())
    })
    .unwrap();

    let plan = s.plan([input]).unwrap();
    for value in [2, 7, 11] {
        s.write(input, value).unwrap();
        s.execute(&plan).unwrap();
        assert_eq!(s.value(out).unwrap(), value * 3);
    }
    assert_eq!(s.metrics().direct_writes, 3);
}

#[test]
fn edit_writes_invalidate_plans() {
    let mut s = Solver::<i64>::new();
    let [input, out] = s.variable_array([1, 0]).unwrap();
    s.constrain(Strength::Strong, |c| {
        c.formula(out, [input], |[i]| i * 3)?;
        Ok(())
    })
    .unwrap();
    let plan = s.plan([input]).unwrap();
    s.write(input, 4).unwrap();
    assert_eq!(s.value(out).unwrap(), 12);
    assert!(matches!(
        s.execute(&plan),
        Err(SolveError::PlanInvalidated { .. })
    ));
}
