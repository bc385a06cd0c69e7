//! Unscented transform weights shared by the sigma point generator and filters.

use nalgebra::SVector;

/// Holds the mean and covariance recombination weights for `S = 2n + 1`
/// sigma points.
///
/// With the single spread parameter λ both vectors are identical:
/// `w₀ = λ / (λ + n)` and `wᵢ = 1 / (2 (λ + n))`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UTWeights<const S: usize> {
    /// Mean recombination weights.
    pub w_mean: SVector<f64, S>,
    /// Covariance recombination weights.
    pub w_covar: SVector<f64, S>,
}

impl<const S: usize> UTWeights<S> {
    /// Dimension `n` of the space the `S` sigma points span.
    pub const fn dimension() -> usize {
        (S - 1) / 2
    }

    /// Construct UT weights from the spread parameter λ.
    ///
    /// The caller guarantees `λ + n > 0`; see `FilterConfig::validate`.
    pub fn from_spread(spread: f64) -> Self {
        let n_lambda = Self::dimension() as f64 + spread;
        let inv = 0.5 / n_lambda;

        let mut w_mean = SVector::<f64, S>::from_element(inv);
        w_mean[0] = spread / n_lambda;

        Self {
            w_mean,
            w_covar: w_mean,
        }
    }

    /// Number of sigma points.
    pub fn len(&self) -> usize {
        S
    }

    pub fn is_empty(&self) -> bool {
        S == 0
    }
}

#[cfg(test)]
mod tests {
    use super::UTWeights;
    use crate::state::N_SIGMA;
    use approx::assert_abs_diff_eq;

    const EPS: f64 = 1e-12;

    macro_rules! test_spread {
        ($name:ident, $spread:expr) => {
            #[test]
            fn $name() {
                let spread: f64 = $spread;
                let w = UTWeights::<N_SIGMA>::from_spread(spread);
                let n = UTWeights::<N_SIGMA>::dimension() as f64;

                let sum: f64 = w.w_mean.iter().sum();
                assert_abs_diff_eq!(sum, 1.0, epsilon = EPS);
                assert_abs_diff_eq!(w.w_mean[0], spread / (spread + n), epsilon = EPS);
                for i in 1..N_SIGMA {
                    assert_abs_diff_eq!(w.w_mean[i], 1.0 / (2.0 * (n + spread)), epsilon = EPS);
                }
                assert_eq!(w.w_mean, w.w_covar);
            }
        };
    }

    test_spread!(spread_three_minus_state_dim, -2.0);
    test_spread!(spread_three_minus_augmented_dim, -4.0);
    test_spread!(spread_zero, 0.0);
    test_spread!(spread_positive, 1.5);
    test_spread!(spread_near_lower_bound, -6.9);

    #[test]
    fn default_spread_gives_negative_center_weight() {
        let w = UTWeights::<N_SIGMA>::from_spread(-2.0);
        assert_abs_diff_eq!(w.w_mean[0], -0.4, epsilon = EPS);
        assert_abs_diff_eq!(w.w_mean[14], 0.1, epsilon = EPS);
        assert_eq!(w.len(), 15);
    }
}
