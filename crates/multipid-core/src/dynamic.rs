//! PID controller whose dimension is chosen at runtime.
//!
//! [`DynPidController`] behaves exactly like
//! [`PidController`][crate::PidController] but stores its gains and state in
//! `Vec`s, so the number of variables can come from configuration.  Every
//! call checks that the supplied vectors match the configured dimension and
//! fails with [`PidError::DimensionMismatch`] before touching any state.
//!
//! # Example
//!
//! ```rust
//! use multipid_core::DynPidController;
//! use multipid_types::ControllerConfig;
//!
//! let cfg = ControllerConfig::uniform(2, 1.0, 0.0, 0.0);
//! let mut pid = DynPidController::from_config(&cfg).unwrap();
//!
//! let output = pid.update(0.1, &[0.0, 1.0], &[1.0, 1.0]).unwrap();
//! assert_eq!(output, vec![1.0, 0.0]);
//!
//! // Wrong number of components.
//! assert!(pid.update(0.1, &[0.0], &[1.0]).is_err());
//! ```

use multipid_types::{ControllerConfig, PidError};
use num_traits::Float;
use tracing::{debug, trace, warn};

use crate::step::{self, GainSlices, StepBuffers};

/// A PID controller over a runtime-sized set of independent variables.
#[derive(Debug, Clone)]
pub struct DynPidController<T> {
    kp: Vec<T>,
    ki: Vec<T>,
    kd: Vec<T>,
    integral: Vec<T>,
    previous_error: Vec<T>,
}

impl<T: Float> DynPidController<T> {
    /// Create a controller from per-variable gain vectors.
    ///
    /// The dimension is taken from `kp`.
    ///
    /// # Errors
    ///
    /// Returns [`PidError::DimensionMismatch`] if `ki` or `kd` has a different
    /// length than `kp`.
    pub fn new(kp: Vec<T>, ki: Vec<T>, kd: Vec<T>) -> Result<Self, PidError> {
        step::check_len("ki", kp.len(), ki.len())?;
        step::check_len("kd", kp.len(), kd.len())?;
        let dimension = kp.len();
        debug!(dimension, "constructed runtime-sized PID controller");
        Ok(Self {
            kp,
            ki,
            kd,
            integral: vec![T::zero(); dimension],
            previous_error: vec![T::zero(); dimension],
        })
    }

    /// Create a PI controller (derivative gain zero for every variable).
    pub fn pi(kp: Vec<T>, ki: Vec<T>) -> Result<Self, PidError> {
        let kd = vec![T::zero(); kp.len()];
        Self::new(kp, ki, kd)
    }

    /// Create a controller with identical gains for all `dimension` variables.
    pub fn uniform(dimension: usize, kp: T, ki: T, kd: T) -> Self {
        debug!(dimension, "constructed runtime-sized PID controller");
        Self {
            kp: vec![kp; dimension],
            ki: vec![ki; dimension],
            kd: vec![kd; dimension],
            integral: vec![T::zero(); dimension],
            previous_error: vec![T::zero(); dimension],
        }
    }

    /// [`DynPidController::uniform`] with a zero derivative gain.
    pub fn uniform_pi(dimension: usize, kp: T, ki: T) -> Self {
        Self::uniform(dimension, kp, ki, T::zero())
    }

    pub fn dimension(&self) -> usize {
        self.kp.len()
    }

    pub fn kp(&self) -> &[T] {
        &self.kp
    }

    pub fn ki(&self) -> &[T] {
        &self.ki
    }

    pub fn kd(&self) -> &[T] {
        &self.kd
    }

    pub fn integral(&self) -> &[T] {
        &self.integral
    }

    pub fn previous_error(&self) -> &[T] {
        &self.previous_error
    }

    /// Compute the next manipulated variable.
    ///
    /// # Errors
    ///
    /// - [`PidError::InvalidArgument`] – `dt` is zero, negative or non-finite.
    /// - [`PidError::DimensionMismatch`] – an input has the wrong length.
    /// - [`PidError::NumericOverflow`] – an input is non-finite, or the new
    ///   integral or output would be.
    ///
    /// On error the internal state is left exactly as it was.
    pub fn update(&mut self, dt: T, process_value: &[T], set_point: &[T]) -> Result<Vec<T>, PidError> {
        let result = self.try_update(dt, process_value, set_point);
        if let Err(ref e) = result {
            warn!(error = %e, dimension = self.dimension(), "PID step rejected; state unchanged");
        }
        result
    }

    fn try_update(&mut self, dt: T, process_value: &[T], set_point: &[T]) -> Result<Vec<T>, PidError> {
        step::check_dt(dt)?;
        self.check_dimensions(process_value, set_point)?;
        step::check_finite("process_value", process_value)?;
        step::check_finite("set_point", set_point)?;

        let (integral, error, output) = self.compute(dt, process_value, set_point);
        step::check_finite("integral", &integral)?;
        step::check_finite("output", &output)?;

        self.integral = integral;
        self.previous_error = error;
        Ok(output)
    }

    /// Compute the next manipulated variable without numeric validation.
    ///
    /// Vector lengths are still checked; a zero `dt` or non-finite input
    /// propagates into the output and the stored state.
    pub fn update_unchecked(
        &mut self,
        dt: T,
        process_value: &[T],
        set_point: &[T],
    ) -> Result<Vec<T>, PidError> {
        self.check_dimensions(process_value, set_point)?;
        let (integral, error, output) = self.compute(dt, process_value, set_point);
        self.integral = integral;
        self.previous_error = error;
        Ok(output)
    }

    /// Zero the accumulated integral and the previous error.
    pub fn reset(&mut self) {
        debug!(dimension = self.dimension(), "PID controller reset");
        self.integral.iter_mut().for_each(|v| *v = T::zero());
        self.previous_error.iter_mut().for_each(|v| *v = T::zero());
    }

    fn check_dimensions(&self, process_value: &[T], set_point: &[T]) -> Result<(), PidError> {
        step::check_len("process_value", self.dimension(), process_value.len())?;
        step::check_len("set_point", self.dimension(), set_point.len())
    }

    fn compute(&self, dt: T, process_value: &[T], set_point: &[T]) -> (Vec<T>, Vec<T>, Vec<T>) {
        let n = self.dimension();
        let mut integral = vec![T::zero(); n];
        let mut error = vec![T::zero(); n];
        let mut output = vec![T::zero(); n];
        step::compute(
            &GainSlices {
                kp: &self.kp,
                ki: &self.ki,
                kd: &self.kd,
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
        trace!(dimension = n, dt = ?dt.to_f64(), "PID step computed");
        (integral, error, output)
    }
}

impl DynPidController<f64> {
    /// Build a controller from a serialisable [`ControllerConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`PidError::DimensionMismatch`] if a per-variable gain list does
    /// not match `cfg.dimension`.
    pub fn from_config(cfg: &ControllerConfig) -> Result<Self, PidError> {
        let gains = cfg.expand()?;
        Self::new(gains.kp, gains.ki, gains.kd)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pid::PidController;
    use multipid_types::GainValue;

    #[test]
    fn reference_scenario_matches_fixed_form() {
        let pv = [1.0_f32, 2.0, 3.0, 4.0, 5.0];
        let sp = [5.0_f32, 4.0, 3.0, 2.0, 1.0];

        let mut dynamic = DynPidController::<f32>::uniform(5, 1.0, 2.0, 3.0);
        let mut fixed = PidController::<f32, 5>::uniform(1.0, 2.0, 3.0);

        let a = dynamic.update(1.0, &pv, &sp).unwrap();
        let b = fixed.update(1.0, &pv, &sp).unwrap();
        assert_eq!(a, vec![24.0, 12.0, 0.0, -12.0, -24.0]);
        assert_eq!(a.as_slice(), b.as_slice());
    }

    #[test]
    fn mismatched_gain_lengths_are_rejected() {
        let err = DynPidController::new(vec![1.0, 1.0], vec![1.0], vec![0.0, 0.0]).unwrap_err();
        assert_eq!(
            err,
            PidError::DimensionMismatch {
                argument: "ki".to_string(),
                expected: 2,
                actual: 1,
            }
        );
    }

    #[test]
    fn dimension_mismatch_leaves_state_untouched() {
        let mut pid = DynPidController::uniform(3, 1.0, 1.0, 1.0);
        pid.update(0.1, &[0.0; 3], &[1.0; 3]).unwrap();
        let before = pid.clone();

        let err = pid.update(0.1, &[0.0; 2], &[1.0; 3]).unwrap_err();
        assert!(matches!(err, PidError::DimensionMismatch { expected: 3, actual: 2, .. }));
        let err = pid.update_unchecked(0.1, &[0.0; 3], &[1.0; 4]).unwrap_err();
        assert!(matches!(err, PidError::DimensionMismatch { expected: 3, actual: 4, .. }));

        assert_eq!(pid.integral(), before.integral());
        assert_eq!(pid.previous_error(), before.previous_error());
    }

    #[test]
    fn pi_constructor_zeroes_derivative_gain() {
        let pid = DynPidController::pi(vec![1.0, 2.0], vec![0.5, 0.5]).unwrap();
        assert_eq!(pid.kd(), &[0.0, 0.0]);
        assert_eq!(pid.dimension(), 2);
    }

    #[test]
    fn from_config_expands_mixed_gains() {
        let cfg = ControllerConfig {
            dimension: 3,
            kp: GainValue::PerVariable(vec![1.0, 2.0, 3.0]),
            ki: GainValue::Uniform(0.5),
            kd: GainValue::default(),
        };
        let pid = DynPidController::from_config(&cfg).unwrap();
        assert_eq!(pid.kp(), &[1.0, 2.0, 3.0]);
        assert_eq!(pid.ki(), &[0.5, 0.5, 0.5]);
        assert_eq!(pid.kd(), &[0.0, 0.0, 0.0]);
    }

    #[test]
    fn from_config_rejects_wrong_gain_length() {
        let cfg = ControllerConfig {
            dimension: 2,
            kp: GainValue::Uniform(1.0),
            ki: GainValue::Uniform(1.0),
            kd: GainValue::PerVariable(vec![1.0, 2.0, 3.0]),
        };
        assert!(matches!(
            DynPidController::from_config(&cfg),
            Err(PidError::DimensionMismatch { expected: 2, actual: 3, .. })
        ));
    }

    #[test]
    fn integral_accumulates_and_reset_clears() {
        let mut pid = DynPidController::uniform_pi(1, 0.0, 1.0);
        for _ in 0..4 {
            pid.update(0.25, &[0.0], &[1.0]).unwrap();
        }
        assert!((pid.integral()[0] - 1.0).abs() < 1e-12);

        pid.reset();
        assert_eq!(pid.integral(), &[0.0]);
        assert_eq!(pid.previous_error(), &[0.0]);
    }

    #[test]
    fn overflowing_integral_is_rejected() {
        let mut pid = DynPidController::uniform(1, 1.0, 1.0, 0.0);
        pid.update(0.5, &[0.0], &[1.0]).unwrap();
        let before = pid.clone();

        let err = pid.update(1.0, &[-f64::MAX], &[f64::MAX]).unwrap_err();
        assert_eq!(
            err,
            PidError::NumericOverflow {
                quantity: "integral".to_string(),
                index: 0,
            }
        );
        assert_eq!(pid.integral(), before.integral());
        assert_eq!(pid.previous_error(), before.previous_error());
    }

    #[test]
    fn negative_dt_is_invalid_argument() {
        let mut pid = DynPidController::uniform(1, 1.0, 1.0, 1.0);
        assert!(matches!(
            pid.update(-0.01, &[0.0], &[1.0]),
            Err(PidError::InvalidArgument(_))
        ));
    }
}
