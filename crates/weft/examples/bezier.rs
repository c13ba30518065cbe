//! A cubic Bézier curve whose control points are dragged headlessly.
//!
//! One observer watches all four control points and samples the curve;
//! one observer per control point reports where its handle moved.

use weft::prelude::*;

type Point = (f64, f64);

/// Evaluate the curve at `t` by repeated interpolation.
fn sample(points: &[&Point], t: f64) -> Point {
    let mut level: Vec<Point> = points.iter().map(|&&p| p).collect();
    while level.len() > 1 {
        level = level
            .windows(2)
            .map(|w| {
                (
                    w[0].0 + (w[1].0 - w[0].0) * t,
                    w[0].1 + (w[1].1 - w[0].1) * t,
                )
            })
            .collect();
    }
    level[0]
}

fn main() -> Result<(), SolveError> {
    env_logger::init();

    let mut solver = Solver::<Point>::new();
    let knots =
        solver.variable_array([(10.0, 50.0), (20.0, 40.0), (30.0, 60.0), (40.0, 50.0)])?;

    solver.observe(&knots, |points| {
        let samples: Vec<String> = [0.0, 0.25, 0.5, 0.75, 1.0]
            .iter()
            .map(|&t| {
                let (x, y) = sample(points, t);
                format!("({x:.1}, {y:.1})")
            })
            .collect();
        println!("  curve: {}", samples.join(" "));
    })?;
    for (i, &knot) in knots.iter().enumerate() {
        solver.observe(&[knot], move |p| {
            println!("  knot {i} at ({:.1}, {:.1})", p[0].0, p[0].1);
        })?;
    }

    let drags = [(1, (20.0, 10.0)), (2, (30.0, 90.0)), (3, (60.0, 50.0))];
    for (i, to) in drags {
        println!("drag knot {i} to ({:.1}, {:.1})", to.0, to.1);
        solver.write(knots[i], to)?;
    }
    Ok(())
}
