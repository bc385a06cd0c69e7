use nalgebra::{Vector2, Vector3};
use tracing::{debug, error, info, trace, warn};

use super::engine::{Prediction, UkfEngine};
use super::error::UkfError;
use crate::config::{ConfigError, FilterConfig};
use crate::diagnostics::NisMonitor;
use crate::measurement::{Measurement, Reading};
use crate::models::{CtrvModel, PositionModel, RangeBearingRateModel};
use crate::sigma_points::UTWeights;
use crate::state::{Moments, StateCovariance, StateVector, TrackState, N_SIGMA, N_X};

/// What a processed measurement did to the track.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StepOutcome {
    /// The measurement started the track.
    Initialized,
    /// Predict and correct both succeeded.
    Updated { nis: f64 },
    /// The sensor is disabled and the track already exists; nothing changed.
    Skipped,
}

/// Single-target UKF tracker with a CTRV motion model, fusing position and
/// range/bearing/rate measurements.
///
/// The tracker is exclusively owned by its caller: measurements go in one at a
/// time, in non-decreasing timestamp order.
#[derive(Clone, Debug)]
pub struct CtrvTracker {
    config: FilterConfig,
    engine: UkfEngine<CtrvModel>,
    position_model: PositionModel,
    range_bearing_model: RangeBearingRateModel,
    state: TrackState,
    nis: NisMonitor,
}

impl CtrvTracker {
    pub fn new(config: FilterConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        if !config.use_position && !config.use_range_bearing {
            warn!("all sensors disabled, the track can be initialized but never updated");
        }

        let engine = UkfEngine::new(
            config.process_model(),
            config.spread,
            config.regularization,
            config.max_condition,
        );

        Ok(Self {
            position_model: config.position_model(),
            range_bearing_model: config.range_bearing_model(),
            engine,
            config,
            state: TrackState::Uninitialized,
            nis: NisMonitor::default(),
        })
    }

    /// Run one initialize or predict/correct cycle.
    ///
    /// On error the track stays usable: a failed prediction or an out-of-order
    /// timestamp leaves it untouched, a failed correction leaves the
    /// prediction in place.
    pub fn process_measurement(
        &mut self,
        measurement: &Measurement,
    ) -> Result<StepOutcome, UkfError> {
        let sensor = measurement.sensor();
        let (prior, last_timestamp) = match &self.state {
            TrackState::Uninitialized => {
                self.initialize(measurement);
                return Ok(StepOutcome::Initialized);
            }
            TrackState::Tracking {
                estimate,
                last_timestamp,
            } => (*estimate, *last_timestamp),
        };

        // Disabled sensors may start a track but never update it.
        if !self.config.is_enabled(sensor) {
            trace!(%sensor, timestamp = measurement.timestamp, "sensor disabled, skipping");
            return Ok(StepOutcome::Skipped);
        }

        if measurement.timestamp < last_timestamp {
            let err = UkfError::NonMonotonicTimestamp {
                timestamp: measurement.timestamp,
                last: last_timestamp,
            };
            error!(%sensor, error = %err, "rejecting out-of-order measurement");
            return Err(err);
        }

        let dt = self.elapsed_seconds(last_timestamp, measurement.timestamp);
        let prediction = self.engine.predict(&prior, dt).map_err(|err| {
            warn!(%sensor, dt, error = %err, "prediction aborted, keeping prior state");
            err
        })?;

        match self.correct(&prediction, &measurement.reading) {
            Ok((estimate, nis)) => {
                self.nis.record(sensor, nis);
                self.state = TrackState::Tracking {
                    estimate,
                    last_timestamp: measurement.timestamp,
                };
                debug!(%sensor, dt, nis, "measurement fused");
                Ok(StepOutcome::Updated { nis })
            }
            Err(err) => {
                warn!(%sensor, dt, error = %err, "correction skipped, keeping prediction");
                self.state = TrackState::Tracking {
                    estimate: prediction.moments,
                    last_timestamp: measurement.timestamp,
                };
                Err(err)
            }
        }
    }

    /// Predict the current estimate forward to `timestamp` without touching the
    /// track. `Ok(None)` while uninitialized.
    pub fn predict_at(&self, timestamp: i64) -> Result<Option<Moments<N_X>>, UkfError> {
        let TrackState::Tracking {
            estimate,
            last_timestamp,
        } = &self.state
        else {
            return Ok(None);
        };

        if timestamp < *last_timestamp {
            return Err(UkfError::NonMonotonicTimestamp {
                timestamp,
                last: *last_timestamp,
            });
        }

        let dt = self.elapsed_seconds(*last_timestamp, timestamp);
        Ok(Some(self.engine.predict(estimate, dt)?.moments))
    }

    /// Drop the track and the NIS history.
    pub fn reset(&mut self) {
        info!("track reset");
        self.state = TrackState::Uninitialized;
        self.nis = NisMonitor::default();
    }

    pub fn is_initialized(&self) -> bool {
        matches!(self.state, TrackState::Tracking { .. })
    }

    pub fn track_state(&self) -> &TrackState {
        &self.state
    }

    pub fn estimate(&self) -> Option<&Moments<N_X>> {
        self.state.estimate()
    }

    /// Current state mean `[px, py, v, yaw, yaw_rate]`.
    pub fn state(&self) -> Option<&StateVector> {
        self.estimate().map(|e| &e.mean)
    }

    pub fn covariance(&self) -> Option<&StateCovariance> {
        self.estimate().map(|e| &e.covariance)
    }

    pub fn last_timestamp(&self) -> Option<i64> {
        self.state.last_timestamp()
    }

    /// NIS of the last position correction (0.0 before the first one).
    pub fn nis_position(&self) -> f64 {
        self.nis.position.last()
    }

    /// NIS of the last range/bearing/rate correction (0.0 before the first one).
    pub fn nis_range_bearing(&self) -> f64 {
        self.nis.range_bearing.last()
    }

    pub fn diagnostics(&self) -> &NisMonitor {
        &self.nis
    }

    pub fn weights(&self) -> &UTWeights<N_SIGMA> {
        self.engine.weights()
    }

    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    fn initialize(&mut self, measurement: &Measurement) {
        let mean = measurement.reading.initial_state();
        info!(
            sensor = %measurement.sensor(),
            timestamp = measurement.timestamp,
            px = mean[0],
            py = mean[1],
            "track initialized"
        );
        self.state = TrackState::Tracking {
            estimate: Moments::new(mean, self.config.initial_covariance),
            last_timestamp: measurement.timestamp,
        };
    }

    fn correct(
        &self,
        prediction: &Prediction,
        reading: &Reading,
    ) -> Result<(Moments<N_X>, f64), UkfError> {
        match *reading {
            Reading::Position { x, y } => {
                let z = Vector2::new(x, y);
                let c = self.engine.update(prediction, &self.position_model, &z)?;
                Ok((c.moments, c.nis))
            }
            Reading::RangeBearingRate {
                range,
                bearing,
                range_rate,
            } => {
                let z = Vector3::new(range, bearing, range_rate);
                let model = &self.range_bearing_model;
                let c = self.engine.update(prediction, model, &z)?;
                Ok((c.moments, c.nis))
            }
        }
    }

    /// Seconds from `from` to `to`; callers have already checked `from <= to`.
    fn elapsed_seconds(&self, from: i64, to: i64) -> f64 {
        to.abs_diff(from) as f64 / self.config.ticks_per_second
    }
}
