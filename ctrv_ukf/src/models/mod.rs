//! Process and measurement models plugged into the UKF engine.

use nalgebra::{SMatrix, SVector};

use crate::state::{AugmentedVector, NoiseCovariance, StateVector};
use crate::ukf::error::UkfError;

pub mod ctrv;
pub mod position;
pub mod range_bearing;

pub use ctrv::CtrvModel;
pub use position::PositionModel;
pub use range_bearing::RangeBearingRateModel;

/// Nonlinear motion model driven by the augmented state.
pub trait ProcessModel {
    /// Propagate one augmented sigma point (state + noise sample) by `dt`
    /// seconds.
    fn predict(&self, x: &AugmentedVector, dt: f64) -> StateVector;

    /// Deviation `x − mean`, wrapping angular components.
    fn residual(&self, x: &StateVector, mean: &StateVector) -> StateVector;

    /// Covariance of the noise sources appended to the augmented state.
    fn noise_covariance(&self) -> NoiseCovariance;
}

/// A measurement model for the tracked state and a `Z`-dimensional
/// measurement.
pub trait MeasurementModel<const Z: usize> {
    /// Project a state into measurement space.
    fn measure(&self, x: &StateVector) -> Result<SVector<f64, Z>, UkfError>;

    /// Compute the residual `z_meas − z_pred`, wrapping angles where the
    /// measurement has them.
    fn residual(&self, z_pred: &SVector<f64, Z>, z_meas: &SVector<f64, Z>) -> SVector<f64, Z>;

    /// Additive sensor noise covariance.
    fn noise_covariance(&self) -> SMatrix<f64, Z, Z>;
}
