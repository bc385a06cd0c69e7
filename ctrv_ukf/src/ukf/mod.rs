//! Unscented Kalman filter over the augmented CTRV state.
//!
//! [`UkfEngine`] holds the sigma point machinery and exposes the predict and
//! correct stages separately. [`CtrvTracker`] sequences them per measurement
//! and owns the track lifecycle.

pub mod engine;
pub mod error;
pub mod tracker;

pub use crate::sigma_points::UTWeights;

pub use engine::{Correction, MeasurementPrediction, Prediction, UkfEngine};
pub use error::UkfError;
pub use tracker::{CtrvTracker, StepOutcome};
