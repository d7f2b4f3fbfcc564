//! `multipid-core` – multi-variable PID control.
//!
//! Computes a manipulated variable for a fixed number of independent process
//! variables on every control cycle, using per-variable proportional,
//! integral and derivative gains.
//!
//! # Modules
//!
//! - [`pid`] – [`PidController`][pid::PidController]: dimension and numeric
//!   type fixed at compile time (`[T; N]` vectors).
//! - [`dynamic`] – [`DynPidController`][dynamic::DynPidController]: dimension
//!   fixed at construction from runtime data, with length checks on every
//!   call.
//! - [`gain`] – [`DiagonalGain`][gain::DiagonalGain]: per-variable gains with
//!   no cross-variable coupling.
//!
//! Both controllers share the same step routine, so for identical gains and
//! inputs they produce bit-identical outputs.
//!
//! A controller instance is owned by a single control loop; it holds no
//! locks and performs no I/O.

pub mod dynamic;
pub mod gain;
pub mod pid;
mod step;

pub use dynamic::DynPidController;
pub use gain::DiagonalGain;
pub use multipid_types::{ControllerConfig, GainValue, PidError};
pub use pid::PidController;
