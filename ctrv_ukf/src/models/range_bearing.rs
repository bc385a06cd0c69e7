//! Range, bearing and range-rate sensor located at the origin.

use nalgebra::{Matrix3, Vector3};

use super::MeasurementModel;
use crate::math::normalize_angle;
use crate::state::{StateVector, PX, PY, SPEED, YAW};
use crate::ukf::error::UkfError;

/// Dimension of a range/bearing/rate measurement.
pub const RANGE_BEARING_DIM: usize = 3;

/// Index of the bearing component in a range/bearing/rate measurement.
pub const BEARING: usize = 1;

/// Polar projection of the state: `[ρ, φ, ρ̇]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RangeBearingRateModel {
    pub std_range: f64,
    pub std_bearing: f64,
    pub std_range_rate: f64,
    /// Ranges below this are treated as degenerate geometry.
    pub min_range: f64,
}

impl RangeBearingRateModel {
    pub fn new(std_range: f64, std_bearing: f64, std_range_rate: f64, min_range: f64) -> Self {
        Self {
            std_range,
            std_bearing,
            std_range_rate,
            min_range,
        }
    }
}

impl MeasurementModel<RANGE_BEARING_DIM> for RangeBearingRateModel {
    fn measure(&self, x: &StateVector) -> Result<Vector3<f64>, UkfError> {
        let (px, py, v, yaw) = (x[PX], x[PY], x[SPEED], x[YAW]);

        let range = px.hypot(py);
        // `!(a >= b)` also rejects NaN.
        if !(range >= self.min_range) {
            return Err(UkfError::DegenerateMeasurementGeometry { range });
        }

        let (vx, vy) = (v * yaw.cos(), v * yaw.sin());
        Ok(Vector3::new(
            range,
            py.atan2(px),
            (px * vx + py * vy) / range,
        ))
    }

    fn residual(&self, z_pred: &Vector3<f64>, z_meas: &Vector3<f64>) -> Vector3<f64> {
        let mut diff = z_meas - z_pred;
        diff[BEARING] = normalize_angle(diff[BEARING]);
        diff
    }

    fn noise_covariance(&self) -> Matrix3<f64> {
        Matrix3::from_diagonal(&Vector3::new(
            self.std_range * self.std_range,
            self.std_bearing * self.std_bearing,
            self.std_range_rate * self.std_range_rate,
        ))
    }
}
