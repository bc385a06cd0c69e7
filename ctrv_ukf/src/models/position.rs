//! Position-only sensor (x, y).

use nalgebra::{Matrix2, Vector2};

use super::MeasurementModel;
use crate::state::{StateVector, PX, PY};
use crate::ukf::error::UkfError;

/// Dimension of a position measurement.
pub const POSITION_DIM: usize = 2;

/// Linear projection of the state onto its position components.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PositionModel {
    pub std_x: f64,
    pub std_y: f64,
}

impl PositionModel {
    pub fn new(std_x: f64, std_y: f64) -> Self {
        Self { std_x, std_y }
    }
}

impl MeasurementModel<POSITION_DIM> for PositionModel {
    fn measure(&self, x: &StateVector) -> Result<Vector2<f64>, UkfError> {
        Ok(Vector2::new(x[PX], x[PY]))
    }

    fn residual(&self, z_pred: &Vector2<f64>, z_meas: &Vector2<f64>) -> Vector2<f64> {
        z_meas - z_pred
    }

    fn noise_covariance(&self) -> Matrix2<f64> {
        Matrix2::new(self.std_x * self.std_x, 0.0, 0.0, self.std_y * self.std_y)
    }
}
