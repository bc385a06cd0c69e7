use nalgebra::{SMatrix, SVector};

use super::weights::UTWeights;
use crate::state::Moments;

/// Linear weighted sum of the sigma point columns.
pub fn weighted_mean<const D: usize, const S: usize>(
    sigma_pts: &SMatrix<f64, D, S>,
    weights: &SVector<f64, S>,
) -> SVector<f64, D> {
    let mut mean = SVector::<f64, D>::zeros();
    for i in 0..S {
        mean.axpy(weights[i], &sigma_pts.column(i), 1.0);
    }
    mean
}

/// Recombine sigma points into a mean and covariance.
///
/// `residual(point, mean)` returns the deviation of a point from the mean and
/// is where angular components get wrapped.
pub fn unscented_transform<const D: usize, const S: usize, F>(
    sigma_pts: &SMatrix<f64, D, S>,
    weights: &UTWeights<S>,
    residual: F,
) -> Moments<D>
where
    F: Fn(&SVector<f64, D>, &SVector<f64, D>) -> SVector<f64, D>,
{
    let mean = weighted_mean(sigma_pts, &weights.w_mean);

    let mut covariance = SMatrix::<f64, D, D>::zeros();
    for i in 0..S {
        let deviation = residual(&sigma_pts.column(i).into_owned(), &mean);
        covariance.gemm(weights.w_covar[i], &deviation, &deviation.transpose(), 1.0);
    }

    Moments { mean, covariance }
}
