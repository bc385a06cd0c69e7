//! Constant turn rate and velocity motion model.

use nalgebra::Matrix2;

use super::ProcessModel;
use crate::math::normalize_angle;
use crate::state::{
    AugmentedVector, NoiseCovariance, StateVector, NU_ACCEL, NU_YAW_ACCEL, PX, PY, SPEED, YAW,
    YAW_RATE,
};

/// Below this turn rate magnitude (rad/s) the straight-line branch is used.
pub const YAW_RATE_THRESHOLD: f64 = 0.001;

/// CTRV process with piecewise-constant longitudinal and yaw acceleration
/// noise.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CtrvModel {
    /// Longitudinal acceleration noise standard deviation (m/s²).
    pub std_accel: f64,
    /// Yaw acceleration noise standard deviation (rad/s²).
    pub std_yaw_accel: f64,
}

impl CtrvModel {
    pub fn new(std_accel: f64, std_yaw_accel: f64) -> Self {
        Self {
            std_accel,
            std_yaw_accel,
        }
    }
}

impl ProcessModel for CtrvModel {
    fn predict(&self, x: &AugmentedVector, dt: f64) -> StateVector {
        let (px, py, v, yaw, yaw_rate) = (x[PX], x[PY], x[SPEED], x[YAW], x[YAW_RATE]);
        let (nu_a, nu_yawdd) = (x[NU_ACCEL], x[NU_YAW_ACCEL]);

        let (mut px_p, mut py_p) = if yaw_rate.abs() > YAW_RATE_THRESHOLD {
            let yaw_end = yaw + yaw_rate * dt;
            (
                px + v / yaw_rate * (yaw_end.sin() - yaw.sin()),
                py + v / yaw_rate * (yaw.cos() - yaw_end.cos()),
            )
        } else {
            (px + v * dt * yaw.cos(), py + v * dt * yaw.sin())
        };

        let half_dt2 = 0.5 * dt * dt;
        px_p += half_dt2 * nu_a * yaw.cos();
        py_p += half_dt2 * nu_a * yaw.sin();

        StateVector::new(
            px_p,
            py_p,
            v + nu_a * dt,
            yaw + yaw_rate * dt + half_dt2 * nu_yawdd,
            yaw_rate + nu_yawdd * dt,
        )
    }

    fn residual(&self, x: &StateVector, mean: &StateVector) -> StateVector {
        state_residual(x, mean)
    }

    fn noise_covariance(&self) -> NoiseCovariance {
        Matrix2::new(
            self.std_accel * self.std_accel,
            0.0,
            0.0,
            self.std_yaw_accel * self.std_yaw_accel,
        )
    }
}

/// `x − mean` with the heading component wrapped into (-π, π].
pub fn state_residual(x: &StateVector, mean: &StateVector) -> StateVector {
    let mut diff = x - mean;
    diff[YAW] = normalize_angle(diff[YAW]);
    diff
}
