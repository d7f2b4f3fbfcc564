//! Multi-variable PID (Proportional–Integral–Derivative) controller with a
//! compile-time dimension.
//!
//! The controller drives `N` independent variables toward their set-points.
//! Each variable has its own proportional, integral and derivative gain; the
//! gains are fixed at construction.  The caller supplies the elapsed time,
//! the measured process values and the set-points on every cycle and applies
//! the returned manipulated variable to its actuators.
//!
//! # Example
//!
//! ```rust
//! use multipid_core::PidController;
//!
//! // Same gains for all five variables.
//! let mut pid = PidController::<f32, 5>::uniform(1.0, 2.0, 3.0);
//!
//! let output = pid
//!     .update(1.0, &[1.0, 2.0, 3.0, 4.0, 5.0], &[5.0, 4.0, 3.0, 2.0, 1.0])
//!     .unwrap();
//! assert_eq!(output, [24.0, 12.0, 0.0, -12.0, -24.0]);
//! ```

use multipid_types::PidError;
use num_traits::Float;
use tracing::{debug, trace, warn};

use crate::gain::DiagonalGain;
use crate::step::{self, GainSlices, StepBuffers};

/// A PID controller for `N` independent variables of numeric type `T`.
///
/// Elapsed time is expressed in the same numeric type as the variables.
/// `integral` and `previous_error` start at zero and advance on every
/// successful [`PidController::update`]; call [`PidController::reset`] to
/// return to the freshly constructed state.
#[derive(Debug, Clone)]
pub struct PidController<T, const N: usize> {
    kp: DiagonalGain<T, N>,
    ki: DiagonalGain<T, N>,
    kd: DiagonalGain<T, N>,
    integral: [T; N],
    previous_error: [T; N],
}

impl<T: Float, const N: usize> PidController<T, N> {
    /// Create a controller from per-variable gain vectors.
    ///
    /// Gains are not validated; zero or negative values are accepted.
    pub fn new(kp: [T; N], ki: [T; N], kd: [T; N]) -> Self {
        Self::from_gains(kp.into(), ki.into(), kd.into())
    }

    /// Create a PI controller (derivative gain zero for every variable).
    pub fn pi(kp: [T; N], ki: [T; N]) -> Self {
        Self::from_gains(kp.into(), ki.into(), DiagonalGain::zero())
    }

    /// Create a controller whose gains are identical for every variable.
    pub fn uniform(kp: T, ki: T, kd: T) -> Self {
        Self::from_gains(
            DiagonalGain::uniform(kp),
            DiagonalGain::uniform(ki),
            DiagonalGain::uniform(kd),
        )
    }

    /// [`PidController::uniform`] with a zero derivative gain.
    pub fn uniform_pi(kp: T, ki: T) -> Self {
        Self::uniform(kp, ki, T::zero())
    }

    pub fn from_gains(
        kp: DiagonalGain<T, N>,
        ki: DiagonalGain<T, N>,
        kd: DiagonalGain<T, N>,
    ) -> Self {
        debug!(dimension = N, "constructed fixed-size PID controller");
        Self {
            kp,
            ki,
            kd,
            integral: [T::zero(); N],
            previous_error: [T::zero(); N],
        }
    }

    /// Number of controlled variables.
    pub fn dimension(&self) -> usize {
        N
    }

    pub fn kp(&self) -> &DiagonalGain<T, N> {
        &self.kp
    }

    pub fn ki(&self) -> &DiagonalGain<T, N> {
        &self.ki
    }

    pub fn kd(&self) -> &DiagonalGain<T, N> {
        &self.kd
    }

    /// Accumulated error (sum of `error * dt` over all committed steps).
    pub fn integral(&self) -> &[T; N] {
        &self.integral
    }

    /// Error observed on the most recent committed step.
    pub fn previous_error(&self) -> &[T; N] {
        &self.previous_error
    }

    /// Compute the next manipulated variable.
    ///
    /// - `dt` – elapsed time since the previous call (must be finite and > 0).
    /// - `process_value` – current measured values.
    /// - `set_point` – values the variables should reach.
    ///
    /// # Errors
    ///
    /// - [`PidError::InvalidArgument`] – `dt` is zero, negative or non-finite.
    /// - [`PidError::NumericOverflow`] – an input is non-finite, or the new
    ///   integral or output would be.
    ///
    /// On error the internal state is left exactly as it was.
    pub fn update(
        &mut self,
        dt: T,
        process_value: &[T; N],
        set_point: &[T; N],
    ) -> Result<[T; N], PidError> {
        let result = self.try_update(dt, process_value, set_point);
        if let Err(ref e) = result {
            warn!(error = %e, dimension = N, "PID step rejected; state unchanged");
        }
        result
    }

    fn try_update(
        &mut self,
        dt: T,
        process_value: &[T; N],
        set_point: &[T; N],
    ) -> Result<[T; N], PidError> {
        step::check_dt(dt)?;
        step::check_finite("process_value", process_value)?;
        step::check_finite("set_point", set_point)?;

        let (integral, error, output) = self.compute(dt, process_value, set_point);
        step::check_finite("integral", &integral)?;
        step::check_finite("output", &output)?;

        self.integral = integral;
        self.previous_error = error;
        Ok(output)
    }

    /// Compute the next manipulated variable without any validation.
    ///
    /// A zero `dt` or non-finite input propagates into the returned output
    /// and into the stored state, corrupting every later output until
    /// [`PidController::reset`] is called.
    pub fn update_unchecked(&mut self, dt: T, process_value: &[T; N], set_point: &[T; N]) -> [T; N] {
        let (integral, error, output) = self.compute(dt, process_value, set_point);
        self.integral = integral;
        self.previous_error = error;
        output
    }

    /// Zero the accumulated integral and the previous error.
    pub fn reset(&mut self) {
        debug!(dimension = N, "PID controller reset");
        self.integral = [T::zero(); N];
        self.previous_error = [T::zero(); N];
    }

    fn compute(&self, dt: T, process_value: &[T; N], set_point: &[T; N]) -> ([T; N], [T; N], [T; N]) {
        let mut integral = [T::zero(); N];
        let mut error = [T::zero(); N];
        let mut output = [T::zero(); N];
        step::compute(
            &GainSlices {
                kp: self.kp.diagonal(),
                ki: self.ki.diagonal(),
                kd: self.kd.diagonal(),
            },
            &self.integral,
            &self.previous_error,
            dt,
            process_value,
            set_point,
            StepBuffers {
                integral: &mut integral,
                error: &mut error,
                output: &mut output,
            },
        );
        trace!(dimension = N, dt = ?dt.to_f64(), "PID step computed");
        (integral, error, output)
    }
}
