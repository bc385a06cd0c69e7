//! Error types for UKF operations.
//!
//! Every variant is recoverable: the tracker applies the matching policy and
//! stays usable for the next measurement.

/// Errors that can occur while processing a single measurement.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum UkfError {
    /// The augmented covariance could not be square-rooted, even after
    /// regularization. The prediction is aborted and the prior kept.
    #[error("augmented covariance is not positive definite")]
    CovarianceNotPositiveDefinite,
    /// The predicted measurement covariance is singular or too ill-conditioned
    /// to invert. The correction is skipped and the prediction kept.
    #[error("innovation covariance is singular or ill-conditioned (condition {condition:e})")]
    SingularInnovationCovariance { condition: f64 },
    /// A sigma point lies too close to the sensor origin for range, bearing
    /// and range rate to be defined.
    #[error("range {range:e} is too close to the sensor origin for a range/bearing/rate update")]
    DegenerateMeasurementGeometry { range: f64 },
    /// The measurement is older than the last processed one.
    #[error("timestamp {timestamp} precedes last processed timestamp {last}")]
    NonMonotonicTimestamp { timestamp: i64, last: i64 },
}

impl UkfError {
    /// Whether the tracker advanced to the measurement time despite the error,
    /// keeping the prediction as its estimate.
    pub fn keeps_prediction(&self) -> bool {
        matches!(
            self,
            UkfError::SingularInnovationCovariance { .. }
                | UkfError::DegenerateMeasurementGeometry { .. }
        )
    }
}
