use nalgebra::{Cholesky, Const};

use crate::state::{AugmentedCovariance, AugmentedSigmas, AugmentedVector, N_AUG};
use crate::ukf::error::UkfError;

/// Symmetric sigma point generator over the augmented state.
///
/// Produces the mean followed by `mean ± √(λ + n_aug) · Lᵢ` for every column
/// `Lᵢ` of the lower Cholesky factor. λ is the configured spread; by default it
/// is derived from the base state dimension even though the points live in the
/// augmented space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AugmentedSigmaPoints {
    /// Spread parameter λ.
    pub spread: f64,
    /// Diagonal jitter added on a second factorization attempt.
    pub regularization: f64,
}

impl AugmentedSigmaPoints {
    pub fn new(spread: f64, regularization: f64) -> Self {
        Self {
            spread,
            regularization,
        }
    }

    /// Scale applied to the square-root columns, `√(λ + n_aug)`.
    pub fn scale(&self) -> f64 {
        (self.spread + N_AUG as f64).sqrt()
    }

    /// Generate sigma points from a mean and an already factorized covariance.
    pub fn generate(
        &self,
        mean: &AugmentedVector,
        sqrt_cov: &Cholesky<f64, Const<N_AUG>>,
    ) -> AugmentedSigmas {
        let scaled_sqrt = sqrt_cov.l() * self.scale();

        let mut sigma_pts = AugmentedSigmas::zeros();
        sigma_pts.set_column(0, mean);

        for i in 0..N_AUG {
            let col = scaled_sqrt.column(i);
            sigma_pts.column_mut(i + 1).copy_from(&(mean + col));
            sigma_pts.column_mut(i + 1 + N_AUG).copy_from(&(mean - col));
        }

        sigma_pts
    }

    /// Factorize `cov` and generate sigma points from it.
    pub fn generate_from_covariance(
        &self,
        mean: &AugmentedVector,
        cov: &AugmentedCovariance,
    ) -> Result<AugmentedSigmas, UkfError> {
        let sqrt_cov = self.factorize(cov)?;
        Ok(self.generate(mean, &sqrt_cov))
    }

    /// Lower Cholesky factor of `cov`, retrying once with `regularization · I`
    /// added to the diagonal.
    pub fn factorize(
        &self,
        cov: &AugmentedCovariance,
    ) -> Result<Cholesky<f64, Const<N_AUG>>, UkfError> {
        match Cholesky::new(*cov) {
            Some(ch) => Ok(ch),
            None => {
                tracing::trace!(
                    regularization = self.regularization,
                    "augmented covariance not positive definite, regularizing"
                );
                let regularized = cov + AugmentedCovariance::identity() * self.regularization;
                Cholesky::new(regularized).ok_or(UkfError::CovarianceNotPositiveDefinite)
            }
        }
    }
}
