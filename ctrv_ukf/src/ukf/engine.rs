use nalgebra::{Cholesky, Const, SMatrix, SVector};

use super::error::UkfError;
use crate::math::normalize_angle;
use crate::models::{MeasurementModel, ProcessModel};
use crate::sigma_points::{unscented_transform, AugmentedSigmaPoints, UTWeights};
use crate::state::{Moments, StateSigmas, N_SIGMA, N_X, YAW};

/// Output of the prediction step.
///
/// The propagated sigma points are kept next to the recombined moments because
/// the correction needs both the state-space and measurement-space points.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Prediction {
    pub moments: Moments<N_X>,
    pub sigma_points: StateSigmas,
}

/// Predicted measurement statistics for one sensor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MeasurementPrediction<const Z: usize> {
    /// Mean and covariance `S`, sensor noise included.
    pub moments: Moments<Z>,
    pub sigma_points: SMatrix<f64, Z, N_SIGMA>,
}

/// Output of the correction step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Correction<const Z: usize> {
    pub moments: Moments<N_X>,
    pub innovation: SVector<f64, Z>,
    /// Normalized innovation squared, `yᵀ S⁻¹ y`.
    pub nis: f64,
}

/// Core UKF math: augmented prediction and sensor-specific correction.
///
/// Every call works on values it owns, so one engine can serve any number of
/// cycles without carrying buffers between them.
#[derive(Clone, Debug)]
pub struct UkfEngine<P> {
    pub(crate) weights: UTWeights<N_SIGMA>,
    pub(crate) sigma_generator: AugmentedSigmaPoints,
    pub(crate) process: P,
    pub(crate) max_condition: f64,
}

impl<P: ProcessModel> UkfEngine<P> {
    pub fn new(process: P, spread: f64, regularization: f64, max_condition: f64) -> Self {
        Self {
            weights: UTWeights::from_spread(spread),
            sigma_generator: AugmentedSigmaPoints::new(spread, regularization),
            process,
            max_condition,
        }
    }

    pub fn weights(&self) -> &UTWeights<N_SIGMA> {
        &self.weights
    }

    pub fn process(&self) -> &P {
        &self.process
    }

    /// Propagate `prior` by `dt` seconds through the process model.
    pub fn predict(&self, prior: &Moments<N_X>, dt: f64) -> Result<Prediction, UkfError> {
        let augmented = prior.augment(&self.process.noise_covariance());
        let aug_sigmas = self
            .sigma_generator
            .generate_from_covariance(&augmented.mean, &augmented.covariance)?;

        let mut sigma_points = StateSigmas::zeros();
        for i in 0..N_SIGMA {
            let point = aug_sigmas.column(i).into_owned();
            sigma_points.set_column(i, &self.process.predict(&point, dt));
        }

        let mut moments = unscented_transform(&sigma_points, &self.weights, |x, mean| {
            self.process.residual(x, mean)
        });
        moments.mean[YAW] = normalize_angle(moments.mean[YAW]);

        Ok(Prediction {
            moments,
            sigma_points,
        })
    }

    /// Map the predicted sigma points into measurement space and recombine
    /// them, adding the sensor noise.
    pub fn predict_measurement<M, const Z: usize>(
        &self,
        prediction: &Prediction,
        model: &M,
    ) -> Result<MeasurementPrediction<Z>, UkfError>
    where
        M: MeasurementModel<Z>,
    {
        let mut sigma_points = SMatrix::<f64, Z, N_SIGMA>::zeros();
        for i in 0..N_SIGMA {
            let z = model.measure(&prediction.sigma_points.column(i).into_owned())?;
            sigma_points.set_column(i, &z);
        }

        let mut moments =
            unscented_transform(&sigma_points, &self.weights, |z, mean| model.residual(mean, z));
        moments.covariance += model.noise_covariance();

        Ok(MeasurementPrediction {
            moments,
            sigma_points,
        })
    }

    /// Fuse `z` into the prediction.
    pub fn correct<M, const Z: usize>(
        &self,
        prediction: &Prediction,
        predicted_z: &MeasurementPrediction<Z>,
        model: &M,
        z: &SVector<f64, Z>,
    ) -> Result<Correction<Z>, UkfError>
    where
        M: MeasurementModel<Z>,
    {
        let s = &predicted_z.moments.covariance;
        let s_cholesky = self.factorize_innovation(s)?;

        let mut cross = SMatrix::<f64, N_X, Z>::zeros();
        for i in 0..N_SIGMA {
            let x_dev = self.process.residual(
                &prediction.sigma_points.column(i).into_owned(),
                &prediction.moments.mean,
            );
            let z_dev = model.residual(
                &predicted_z.moments.mean,
                &predicted_z.sigma_points.column(i).into_owned(),
            );
            cross.gemm(self.weights.w_covar[i], &x_dev, &z_dev.transpose(), 1.0);
        }

        // K = Tc S⁻¹, solved as S Kᵀ = Tcᵀ since S is symmetric.
        let gain = s_cholesky.solve(&cross.transpose()).transpose();

        let innovation = model.residual(&predicted_z.moments.mean, z);

        let mut mean = prediction.moments.mean + gain * innovation;
        mean[YAW] = normalize_angle(mean[YAW]);

        let covariance = prediction.moments.covariance - gain * s * gain.transpose();
        let covariance = (covariance + covariance.transpose()) * 0.5;

        let nis = innovation.dot(&s_cholesky.solve(&innovation));

        Ok(Correction {
            moments: Moments { mean, covariance },
            innovation,
            nis,
        })
    }

    /// `predict_measurement` followed by `correct`.
    pub fn update<M, const Z: usize>(
        &self,
        prediction: &Prediction,
        model: &M,
        z: &SVector<f64, Z>,
    ) -> Result<Correction<Z>, UkfError>
    where
        M: MeasurementModel<Z>,
    {
        let predicted_z = self.predict_measurement(prediction, model)?;
        self.correct(prediction, &predicted_z, model, z)
    }

    /// Cholesky factor of the innovation covariance, rejecting matrices whose
    /// condition estimate `(max Lᵢᵢ / min Lᵢᵢ)²` exceeds `max_condition`.
    fn factorize_innovation<const Z: usize>(
        &self,
        s: &SMatrix<f64, Z, Z>,
    ) -> Result<Cholesky<f64, Const<Z>>, UkfError> {
        let cholesky = Cholesky::new(*s).ok_or(UkfError::SingularInnovationCovariance {
            condition: f64::INFINITY,
        })?;

        let l = cholesky.l_dirty();
        let (mut lo, mut hi) = (f64::INFINITY, 0.0_f64);
        for i in 0..Z {
            lo = lo.min(l[(i, i)]);
            hi = hi.max(l[(i, i)]);
        }
        let condition = (hi / lo).powi(2);
        if !(condition <= self.max_condition) {
            return Err(UkfError::SingularInnovationCovariance { condition });
        }

        Ok(cholesky)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CtrvModel, PositionModel, RangeBearingRateModel};
    use crate::state::{StateCovariance, StateVector, PX, PY};
    use approx::assert_abs_diff_eq;
    use core::f64::consts::{PI, TAU};
    use nalgebra::{Matrix2, Vector2, Vector3, Vector5};

    fn engine(std_accel: f64, std_yaw_accel: f64) -> UkfEngine<CtrvModel> {
        UkfEngine::new(CtrvModel::new(std_accel, std_yaw_accel), -2.0, 1e-6, 1e12)
    }

    fn prior() -> Moments<N_X> {
        Moments::new(
            Vector5::new(3.0, 4.0, 2.0, 0.5, 0.1),
            StateCovariance::from_diagonal(&Vector5::new(0.2, 0.3, 1.0, 0.4, 0.05)),
        )
    }

    #[test]
    fn zero_dt_without_noise_keeps_mean() {
        let prior = prior();
        let prediction = engine(0.0, 0.0).predict(&prior, 0.0).unwrap();
        assert_abs_diff_eq!(prediction.moments.mean, prior.mean, epsilon = 1e-10);
        assert_abs_diff_eq!(
            prediction.moments.covariance,
            prior.covariance,
            epsilon = 1e-5
        );
    }

    #[test]
    fn prediction_moves_along_heading() {
        let prior = Moments::new(
            Vector5::new(0.0, 0.0, 5.0, 0.0, 0.0),
            StateCovariance::from_diagonal(&Vector5::new(0.1, 0.1, 0.1, 0.01, 0.01)),
        );
        let prediction = engine(0.5, 0.5).predict(&prior, 1.0).unwrap();
        assert!((prediction.moments.mean[PX] - 5.0).abs() < 0.1);
        assert!(prediction.moments.mean[PY].abs() < 0.1);
        // Uncertainty grows with time.
        assert!(prediction.moments.covariance[(PX, PX)] > prior.covariance[(PX, PX)]);
    }

    #[test]
    fn indefinite_prior_fails_prediction() {
        let mut prior = prior();
        prior.covariance[(2, 2)] = -5.0;
        let result = engine(0.5, 0.5).predict(&prior, 0.1);
        assert_eq!(result.unwrap_err(), UkfError::CovarianceNotPositiveDefinite);
    }

    #[test]
    fn matching_measurement_keeps_mean_and_shrinks_covariance() {
        let engine = engine(0.5, 0.725);
        let prediction = engine.predict(&prior(), 0.1).unwrap();

        let position = PositionModel::new(0.15, 0.15);
        let z_pos = engine.predict_measurement(&prediction, &position).unwrap();
        let corrected = engine
            .correct(&prediction, &z_pos, &position, &z_pos.moments.mean)
            .unwrap();
        assert_abs_diff_eq!(
            corrected.moments.mean,
            prediction.moments.mean,
            epsilon = 1e-12
        );
        assert!(corrected.moments.trace() <= prediction.moments.trace());
        assert_abs_diff_eq!(corrected.nis, 0.0, epsilon = 1e-12);

        let radar = RangeBearingRateModel::new(0.3, 0.03, 0.3, 1e-4);
        let z_rbr = engine.predict_measurement(&prediction, &radar).unwrap();
        let corrected = engine
            .correct(&prediction, &z_rbr, &radar, &z_rbr.moments.mean)
            .unwrap();
        assert_abs_diff_eq!(
            corrected.moments.mean,
            prediction.moments.mean,
            epsilon = 1e-12
        );
        assert!(corrected.moments.trace() <= prediction.moments.trace());
    }

    #[test]
    fn heading_near_pi_stays_wrapped_through_matching_update() {
        let engine = engine(0.5, 0.725);
        let prior = Moments::new(
            Vector5::new(3.0, 4.0, 2.0, 3.1, 1.0),
            StateCovariance::from_diagonal(&Vector5::new(0.2, 0.3, 1.0, 0.05, 0.05)),
        );
        let prediction = engine.predict(&prior, 0.1).unwrap();
        let yaw = prediction.moments.mean[YAW];
        assert!(yaw > -PI && yaw <= PI, "yaw = {yaw}");
        assert_abs_diff_eq!(yaw, 3.2 - TAU, epsilon = 0.05);

        let position = PositionModel::new(0.15, 0.15);
        let z_pos = engine.predict_measurement(&prediction, &position).unwrap();
        let corrected = engine
            .correct(&prediction, &z_pos, &position, &z_pos.moments.mean)
            .unwrap();
        assert_abs_diff_eq!(
            corrected.moments.mean,
            prediction.moments.mean,
            epsilon = 1e-12
        );

        let radar = RangeBearingRateModel::new(0.3, 0.03, 0.3, 1e-4);
        let z_rbr = engine.predict_measurement(&prediction, &radar).unwrap();
        let corrected = engine
            .correct(&prediction, &z_rbr, &radar, &z_rbr.moments.mean)
            .unwrap();
        assert_abs_diff_eq!(
            corrected.moments.mean,
            prediction.moments.mean,
            epsilon = 1e-12
        );
    }

    #[test]
    fn position_update_pulls_towards_measurement() {
        let engine = engine(0.5, 0.725);
        let prediction = engine.predict(&prior(), 0.1).unwrap();
        let predicted_xy = Vector2::new(prediction.moments.mean[PX], prediction.moments.mean[PY]);
        let z = predicted_xy + Vector2::new(0.5, -0.5);

        let corrected = engine
            .update(&prediction, &PositionModel::new(0.15, 0.15), &z)
            .unwrap();
        assert!(corrected.moments.mean[PX] > predicted_xy[0]);
        assert!(corrected.moments.mean[PX] < z[0]);
        assert!(corrected.moments.mean[PY] < predicted_xy[1]);
        assert!(corrected.moments.mean[PY] > z[1]);
        assert!(corrected.nis > 0.0);
        assert_abs_diff_eq!(corrected.innovation, Vector2::new(0.5, -0.5), epsilon = 1e-9);
    }

    #[test]
    fn corrected_covariance_is_symmetric() {
        let engine = engine(0.5, 0.725);
        let prediction = engine.predict(&prior(), 0.2).unwrap();
        let radar = RangeBearingRateModel::new(0.3, 0.03, 0.3, 1e-4);
        let corrected = engine
            .update(&prediction, &radar, &Vector3::new(5.1, 0.9, 1.5))
            .unwrap();
        let p = corrected.moments.covariance;
        assert_abs_diff_eq!(p, p.transpose(), epsilon = 0.0);
    }

    #[test]
    fn degenerate_geometry_is_reported() {
        let engine = engine(0.5, 0.725);
        let at_origin = Moments::new(
            StateVector::zeros(),
            StateCovariance::from_diagonal_element(1e-12),
        );
        let prediction = engine.predict(&at_origin, 0.0).unwrap();
        let radar = RangeBearingRateModel::new(0.3, 0.03, 0.3, 1e-4);
        let result = engine.update(&prediction, &radar, &Vector3::new(1.0, 0.0, 0.0));
        assert!(matches!(
            result,
            Err(UkfError::DegenerateMeasurementGeometry { .. })
        ));
    }

    #[test]
    fn singular_innovation_is_reported() {
        // Zero sensor noise and a degenerate prediction leave S singular.
        let engine = engine(0.0, 0.0);
        let prediction = Prediction {
            moments: Moments::new(StateVector::zeros(), StateCovariance::zeros()),
            sigma_points: StateSigmas::zeros(),
        };
        let result = engine.update(
            &prediction,
            &PositionModel::new(0.0, 0.0),
            &Vector2::new(1.0, 1.0),
        );
        assert!(matches!(
            result,
            Err(UkfError::SingularInnovationCovariance { .. })
        ));
    }

    #[test]
    fn ill_conditioned_innovation_is_reported() {
        let engine = engine(0.5, 0.725);
        let predicted_z = MeasurementPrediction {
            moments: Moments::new(Vector2::zeros(), Matrix2::new(1.0, 0.0, 0.0, 1e-14)),
            sigma_points: SMatrix::<f64, 2, N_SIGMA>::zeros(),
        };
        let prediction = Prediction {
            moments: prior(),
            sigma_points: StateSigmas::zeros(),
        };
        let result = engine.correct(
            &prediction,
            &predicted_z,
            &PositionModel::new(0.15, 0.15),
            &Vector2::new(0.1, 0.1),
        );
        assert!(matches!(
            result,
            Err(UkfError::SingularInnovationCovariance { condition }) if condition > 1e12
        ));
    }
}
