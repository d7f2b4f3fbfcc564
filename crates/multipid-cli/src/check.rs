//! Built-in verification harness for `multipid check`.
//!
//! Exercises the controller with literal fixed vectors and compares the
//! results with hand-computed values.

use multipid_core::{DynPidController, PidController};

/// Outcome of one named check.
#[derive(Debug, Clone)]
pub struct CheckOutcome {
    pub name: &'static str,
    pub passed: bool,
    pub detail: String,
}

/// Run every built-in check in order.
pub fn run_all() -> Vec<CheckOutcome> {
    vec![
        construction(),
        reference_step(),
        runtime_sized_reference_step(),
        proportional_only(),
    ]
}

fn construction() -> CheckOutcome {
    let single = PidController::<f32, 1>::new([1.0], [2.0], [3.0]);
    let five = PidController::<f32, 5>::uniform(1.0, 2.0, 3.0);
    let passed = single.dimension() == 1 && five.dimension() == 5;
    CheckOutcome {
        name: "construction",
        passed,
        detail: format!("dimensions {} and {}", single.dimension(), five.dimension()),
    }
}

const PROCESS_VALUE: [f32; 5] = [1.0, 2.0, 3.0, 4.0, 5.0];
const SET_POINT: [f32; 5] = [5.0, 4.0, 3.0, 2.0, 1.0];
const EXPECTED: [f32; 5] = [24.0, 12.0, 0.0, -12.0, -24.0];

fn reference_step() -> CheckOutcome {
    let mut pid = PidController::<f32, 5>::uniform(1.0, 2.0, 3.0);
    match pid.update(1.0, &PROCESS_VALUE, &SET_POINT) {
        Ok(output) => CheckOutcome {
            name: "reference step",
            passed: output == EXPECTED,
            detail: format!("expected {:?}, got {:?}", EXPECTED, output),
        },
        Err(e) => CheckOutcome {
            name: "reference step",
            passed: false,
            detail: e.to_string(),
        },
    }
}

fn runtime_sized_reference_step() -> CheckOutcome {
    let mut pid = DynPidController::<f32>::uniform(5, 1.0, 2.0, 3.0);
    match pid.update(1.0, &PROCESS_VALUE, &SET_POINT) {
        Ok(output) => CheckOutcome {
            name: "runtime-sized reference step",
            passed: output.as_slice() == EXPECTED.as_slice(),
            detail: format!("expected {:?}, got {:?}", EXPECTED, output),
        },
        Err(e) => CheckOutcome {
            name: "runtime-sized reference step",
            passed: false,
            detail: e.to_string(),
        },
    }
}

/// With `ki = kd = 0` every output is `kp` applied to the current error,
/// whatever happened on earlier steps.
fn proportional_only() -> CheckOutcome {
    let mut pid = PidController::<f32, 5>::new([1.0, -2.0, 0.5, 4.0, 0.0], [0.0; 5], [0.0; 5]);
    let mut mismatches = Vec::new();
    for round in 0..3 {
        let offset = round as f32;
        let process_value = PROCESS_VALUE.map(|v| v + offset);
        let error: [f32; 5] = std::array::from_fn(|i| SET_POINT[i] - process_value[i]);
        let expected = pid.kp().apply(&error);
        match pid.update(0.5, &process_value, &SET_POINT) {
            Ok(output) if output == expected => {}
            Ok(output) => mismatches.push(format!("round {}: expected {:?}, got {:?}", round, expected, output)),
            Err(e) => mismatches.push(format!("round {}: {}", round, e)),
        }
    }
    CheckOutcome {
        name: "proportional only",
        passed: mismatches.is_empty(),
        detail: mismatches.join("; "),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_builtin_check_passes() {
        let outcomes = run_all();
        assert_eq!(outcomes.len(), 4);
        for o in outcomes {
            assert!(o.passed, "{} failed: {}", o.name, o.detail);
        }
    }
}
