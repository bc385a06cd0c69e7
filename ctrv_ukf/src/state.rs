//! Dimensions, state layout and the per-track state container.

use nalgebra::{SMatrix, SVector};

/// Dimension of the tracked state `[px, py, v, yaw, yaw_rate]`.
pub const N_X: usize = 5;
/// Number of process noise sources appended in the augmented state.
pub const N_NOISE: usize = 2;
/// Dimension of the augmented state.
pub const N_AUG: usize = N_X + N_NOISE;
/// Number of sigma points, 2 × N_AUG + 1.
pub const N_SIGMA: usize = 2 * N_AUG + 1;

/// Index of the x position.
pub const PX: usize = 0;
/// Index of the y position.
pub const PY: usize = 1;
/// Index of the speed magnitude.
pub const SPEED: usize = 2;
/// Index of the heading angle.
pub const YAW: usize = 3;
/// Index of the heading rate.
pub const YAW_RATE: usize = 4;
/// Index of the longitudinal acceleration noise in the augmented state.
pub const NU_ACCEL: usize = 5;
/// Index of the yaw acceleration noise in the augmented state.
pub const NU_YAW_ACCEL: usize = 6;

pub type StateVector = SVector<f64, N_X>;
pub type StateCovariance = SMatrix<f64, N_X, N_X>;
pub type AugmentedVector = SVector<f64, N_AUG>;
pub type AugmentedCovariance = SMatrix<f64, N_AUG, N_AUG>;
pub type AugmentedSigmas = SMatrix<f64, N_AUG, N_SIGMA>;
pub type StateSigmas = SMatrix<f64, N_X, N_SIGMA>;
pub type NoiseCovariance = SMatrix<f64, N_NOISE, N_NOISE>;

/// Mean and covariance of a Gaussian belief over `D` dimensions.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Moments<const D: usize> {
    pub mean: SVector<f64, D>,
    pub covariance: SMatrix<f64, D, D>,
}

impl<const D: usize> Moments<D> {
    pub fn new(mean: SVector<f64, D>, covariance: SMatrix<f64, D, D>) -> Self {
        Self { mean, covariance }
    }

    /// Sum of the marginal variances.
    pub fn trace(&self) -> f64 {
        self.covariance.trace()
    }
}

impl Moments<N_X> {
    /// Build the augmented moments used for sigma point generation: the state
    /// block is copied, the noise entries of the mean are zero and the noise
    /// block of the covariance is `noise`.
    pub fn augment(&self, noise: &NoiseCovariance) -> Moments<N_AUG> {
        let mut mean = AugmentedVector::zeros();
        mean.fixed_rows_mut::<N_X>(0).copy_from(&self.mean);

        let mut covariance = AugmentedCovariance::zeros();
        covariance
            .fixed_view_mut::<N_X, N_X>(0, 0)
            .copy_from(&self.covariance);
        covariance
            .fixed_view_mut::<N_NOISE, N_NOISE>(N_X, N_X)
            .copy_from(noise);

        Moments { mean, covariance }
    }
}

/// Lifecycle of a single track.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum TrackState {
    /// No measurement accepted yet.
    #[default]
    Uninitialized,
    /// Holding an estimate valid at `last_timestamp`.
    Tracking {
        estimate: Moments<N_X>,
        last_timestamp: i64,
    },
}

impl TrackState {
    pub fn estimate(&self) -> Option<&Moments<N_X>> {
        match self {
            TrackState::Uninitialized => None,
            TrackState::Tracking { estimate, .. } => Some(estimate),
        }
    }

    pub fn last_timestamp(&self) -> Option<i64> {
        match self {
            TrackState::Uninitialized => None,
            TrackState::Tracking { last_timestamp, .. } => Some(*last_timestamp),
        }
    }
}
