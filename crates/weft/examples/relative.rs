//! One-way relative positioning, driven headlessly.
//!
//! Two input handles `a` and `b` are dragged around. The outputs follow:
//! `c` sits on `a`, and `d` keeps the offset between the inputs
//! relative to `a`. Every output change is printed by an observer.
//!
//! Run with `RUST_LOG=weft_engine=debug` to watch the solver work.

use weft::prelude::*;

fn main() -> Result<(), SolveError> {
    env_logger::init();

    let mut solver = Solver::<i64>::new();
    let [a, b] = solver.variable_array([40, 50])?;
    let delta = solver.variable(10)?;
    let [c, d] = solver.variable_array([40, 50])?;

    solver.constrain(Strength::Required, |k| {
        k.formula(delta, [a, b], |[a, b]| b - a)?;
        Ok(())
    })?;
    solver.constrain(Strength::Required, |k| {
        k.pass_through(c, &[a])?;
        Ok(())
    })?;
    solver.constrain(Strength::Required, |k| {
        k.formula(d, [a, delta], |[a, delta]| a + delta)?;
        Ok(())
    })?;

    for (name, output) in [("c", c), ("d", d)] {
        solver.observe(&[output], move |values| {
            println!("  handle {name} moved to {}", values[0]);
        })?;
    }

    let drags = [(a, "a", 10), (b, "b", 90), (a, "a", 75), (b, "b", 20)];
    for (input, name, value) in drags {
        println!("drag {name} to {value}");
        solver.write(input, value)?;
    }

    println!(
        "final: a={} b={} c={} d={}",
        solver.value(a)?,
        solver.value(b)?,
        solver.value(c)?,
        solver.value(d)?
    );
    log::info!("{:?}", solver.metrics());
    Ok(())
}
