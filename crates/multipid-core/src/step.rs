//! The discrete PID state transition shared by every controller form.
//!
//! For each variable `i`, with the previous state `integral[i]` and
//! `previous_error[i]`:
//!
//! ```text
//! error      = set_point - process_value
//! integral'  = integral + error * dt
//! derivative = (error - previous_error) / dt
//! output     = kp * error + ki * integral' + kd * derivative
//! ```
//!
//! The routine only writes into caller-supplied buffers; committing the new
//! state is left to the controller so a rejected step leaves it untouched.

use multipid_types::PidError;
use num_traits::Float;

/// Per-variable gains borrowed from a controller.
pub(crate) struct GainSlices<'a, T> {
    pub kp: &'a [T],
    pub ki: &'a [T],
    pub kd: &'a [T],
}

/// Scratch buffers receiving the result of one step.
pub(crate) struct StepBuffers<'a, T> {
    pub integral: &'a mut [T],
    pub error: &'a mut [T],
    pub output: &'a mut [T],
}

/// Compute one step. All slices must share the same length.
pub(crate) fn compute<T: Float>(
    gains: &GainSlices<'_, T>,
    integral: &[T],
    previous_error: &[T],
    dt: T,
    process_value: &[T],
    set_point: &[T],
    out: StepBuffers<'_, T>,
) {
    for i in 0..process_value.len() {
        let error = set_point[i] - process_value[i];
        let next_integral = integral[i] + error * dt;
        let derivative = (error - previous_error[i]) / dt;

        out.error[i] = error;
        out.integral[i] = next_integral;
        out.output[i] = gains.kp[i] * error + gains.ki[i] * next_integral + gains.kd[i] * derivative;
    }
}

/// `dt` must be finite and strictly positive.
pub(crate) fn check_dt<T: Float>(dt: T) -> Result<(), PidError> {
    if dt.is_finite() && dt > T::zero() {
        Ok(())
    } else {
        Err(PidError::InvalidArgument(format!(
            "dt must be finite and positive, got {}",
            dt.to_f64().unwrap_or(f64::NAN)
        )))
    }
}

pub(crate) fn check_len(argument: &str, expected: usize, actual: usize) -> Result<(), PidError> {
    if expected == actual {
        Ok(())
    } else {
        Err(PidError::DimensionMismatch {
            argument: argument.to_string(),
            expected,
            actual,
        })
    }
}

/// Reject the first non-finite component of `values`.
pub(crate) fn check_finite<T: Float>(quantity: &str, values: &[T]) -> Result<(), PidError> {
    match values.iter().position(|v| !v.is_finite()) {
        None => Ok(()),
        Some(index) => Err(PidError::NumericOverflow {
            quantity: quantity.to_string(),
            index,
        }),
    }
}
