//! Closed-loop simulation harness.
//!
//! Drives a [`DynPidController`] against a simulated [`Plant`] at a fixed
//! sampling period: measure, compute the manipulated variable, apply it,
//! repeat.

use std::sync::atomic::{AtomicBool, Ordering};

use multipid_core::DynPidController;
use tracing::{debug, debug_span, field, info, info_span};

use crate::config::SimulationConfig;

/// A controlled system as seen by the control loop.
pub trait Plant {
    fn dimension(&self) -> usize;

    /// Current process value of every variable.
    fn measure(&self) -> &[f64];

    /// Apply the manipulated variable `input` for `dt` seconds.
    fn apply(&mut self, input: &[f64], dt: f64);
}

/// Independent first-order lags, one per variable:
/// `x += (u - x) * dt / time_constant` (explicit Euler).
#[derive(Debug, Clone)]
pub struct FirstOrderPlant {
    state: Vec<f64>,
    time_constant: f64,
}

impl FirstOrderPlant {
    pub fn new(initial: Vec<f64>, time_constant: f64) -> Self {
        Self {
            state: initial,
            time_constant,
        }
    }
}

impl Plant for FirstOrderPlant {
    fn dimension(&self) -> usize {
        self.state.len()
    }

    fn measure(&self) -> &[f64] {
        &self.state
    }

    fn apply(&mut self, input: &[f64], dt: f64) {
        for (x, u) in self.state.iter_mut().zip(input) {
            *x += (u - *x) * dt / self.time_constant;
        }
    }
}

/// Result of a simulation run.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationSummary {
    pub steps_run: usize,
    pub final_value: Vec<f64>,
    pub final_error: Vec<f64>,
    pub last_output: Vec<f64>,
    /// `true` when the run stopped early because `shutdown` was raised.
    pub interrupted: bool,
}

impl SimulationSummary {
    /// Largest absolute tracking error at the end of the run.
    pub fn max_abs_error(&self) -> f64 {
        self.final_error.iter().fold(0.0_f64, |acc, e| acc.max(e.abs()))
    }
}

/// Run `cfg.steps` control cycles of `plant` under a controller built from
/// `cfg.controller`.  Checks `shutdown` before every cycle.
///
/// The run is traced as a `simulation` span with one `control_cycle` child
/// span per cycle.
pub fn run<P: Plant>(
    cfg: &SimulationConfig,
    plant: &mut P,
    shutdown: &AtomicBool,
) -> Result<SimulationSummary, String> {
    cfg.validate()?;
    let mut controller = DynPidController::from_config(&cfg.controller).map_err(|e| e.to_string())?;
    if plant.dimension() != controller.dimension() {
        return Err(format!(
            "plant has {} variables but the controller has {}",
            plant.dimension(),
            controller.dimension()
        ));
    }

    let span = info_span!(
        "simulation",
        dimension = controller.dimension(),
        steps = cfg.steps,
        dt = cfg.dt,
        steps_run = field::Empty,
        max_abs_error = field::Empty,
    );
    let _run = span.enter();
    info!("starting closed-loop simulation");

    let mut last_output = vec![0.0; controller.dimension()];
    let mut steps_run = 0;
    let mut interrupted = false;

    for step in 0..cfg.steps {
        if shutdown.load(Ordering::SeqCst) {
            interrupted = true;
            break;
        }
        let _cycle = debug_span!("control_cycle", step).entered();
        let output = controller
            .update(cfg.dt, plant.measure(), &cfg.set_point)
            .map_err(|e| format!("step {}: {}", step, e))?;
        plant.apply(&output, cfg.dt);
        debug!(process_value = ?plant.measure(), output = ?output, "control cycle");
        last_output = output;
        steps_run += 1;
    }

    let final_value = plant.measure().to_vec();
    let final_error = cfg
        .set_point
        .iter()
        .zip(&final_value)
        .map(|(sp, pv)| sp - pv)
        .collect();

    let summary = SimulationSummary {
        steps_run,
        final_value,
        final_error,
        last_output,
        interrupted,
    };
    span.record("steps_run", steps_run);
    span.record("max_abs_error", summary.max_abs_error());
    info!(interrupted, "simulation finished");
    Ok(summary)
}
