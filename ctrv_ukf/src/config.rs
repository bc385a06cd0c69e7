//! Filter configuration supplied at construction.

use nalgebra::Vector5;

use crate::measurement::SensorKind;
use crate::models::{CtrvModel, PositionModel, RangeBearingRateModel};
use crate::state::{StateCovariance, N_AUG, N_X};

/// Noise standard deviations for the process and both sensors.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NoiseConfig {
    /// Longitudinal acceleration (m/s²).
    pub std_accel: f64,
    /// Yaw acceleration (rad/s²).
    pub std_yaw_accel: f64,
    /// Position sensor, x axis (m).
    pub std_position_x: f64,
    /// Position sensor, y axis (m).
    pub std_position_y: f64,
    /// Range (m).
    pub std_range: f64,
    /// Bearing (rad).
    pub std_bearing: f64,
    /// Range rate (m/s).
    pub std_range_rate: f64,
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            std_accel: 0.5,
            std_yaw_accel: 0.725,
            std_position_x: 0.15,
            std_position_y: 0.15,
            std_range: 0.3,
            std_bearing: 0.03,
            std_range_rate: 0.3,
        }
    }
}

impl NoiseConfig {
    fn entries(&self) -> [(&'static str, f64); 7] {
        [
            ("std_accel", self.std_accel),
            ("std_yaw_accel", self.std_yaw_accel),
            ("std_position_x", self.std_position_x),
            ("std_position_y", self.std_position_y),
            ("std_range", self.std_range),
            ("std_bearing", self.std_bearing),
            ("std_range_rate", self.std_range_rate),
        ]
    }
}

/// Complete tracker configuration.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FilterConfig {
    pub noise: NoiseConfig,
    /// Fuse position measurements. Either sensor may initialize the track.
    pub use_position: bool,
    /// Fuse range/bearing/rate measurements.
    pub use_range_bearing: bool,
    /// Covariance assigned when the track is initialized.
    pub initial_covariance: StateCovariance,
    /// Sigma point spread λ.
    pub spread: f64,
    /// Diagonal jitter for the second Cholesky attempt on the augmented
    /// covariance.
    pub regularization: f64,
    /// Largest accepted condition estimate of the innovation covariance.
    pub max_condition: f64,
    /// Smallest range accepted by the range/bearing/rate model.
    pub min_range: f64,
    /// Timestamp ticks per second (1e6 for microseconds).
    pub ticks_per_second: f64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            noise: NoiseConfig::default(),
            use_position: true,
            use_range_bearing: true,
            initial_covariance: StateCovariance::from_diagonal(&Vector5::new(
                0.6, 0.6, 6.0, 7.5, 0.0,
            )),
            spread: 3.0 - N_X as f64,
            regularization: 1e-6,
            max_condition: 1e12,
            min_range: 1e-4,
            ticks_per_second: 1e6,
        }
    }
}

/// Errors returned when a configuration cannot drive a filter.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("spread {spread} gives a non-positive sigma point scale")]
    NonPositiveScale { spread: f64 },
    #[error("noise parameter {name} must be finite and non-negative, got {value}")]
    InvalidNoise { name: &'static str, value: f64 },
    #[error("initial covariance must be finite and symmetric with a non-negative diagonal")]
    InvalidInitialCovariance,
    #[error("{name} must be finite and positive, got {value}")]
    NonPositiveParameter { name: &'static str, value: f64 },
    #[error("regularization must be finite and non-negative, got {0}")]
    InvalidRegularization(f64),
}

impl FilterConfig {
    pub fn with_noise(mut self, noise: NoiseConfig) -> Self {
        self.noise = noise;
        self
    }

    pub fn with_sensors(mut self, use_position: bool, use_range_bearing: bool) -> Self {
        self.use_position = use_position;
        self.use_range_bearing = use_range_bearing;
        self
    }

    pub fn with_initial_covariance(mut self, covariance: StateCovariance) -> Self {
        self.initial_covariance = covariance;
        self
    }

    pub fn with_spread(mut self, spread: f64) -> Self {
        self.spread = spread;
        self
    }

    pub fn with_regularization(mut self, regularization: f64) -> Self {
        self.regularization = regularization;
        self
    }

    pub fn with_max_condition(mut self, max_condition: f64) -> Self {
        self.max_condition = max_condition;
        self
    }

    pub fn with_min_range(mut self, min_range: f64) -> Self {
        self.min_range = min_range;
        self
    }

    pub fn with_ticks_per_second(mut self, ticks_per_second: f64) -> Self {
        self.ticks_per_second = ticks_per_second;
        self
    }

    /// Whether measurements from `sensor` are processed.
    pub fn is_enabled(&self, sensor: SensorKind) -> bool {
        match sensor {
            SensorKind::Position => self.use_position,
            SensorKind::RangeBearingRate => self.use_range_bearing,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.spread + N_AUG as f64 > 0.0) {
            return Err(ConfigError::NonPositiveScale {
                spread: self.spread,
            });
        }

        for (name, value) in self.noise.entries() {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidNoise { name, value });
            }
        }

        let p = &self.initial_covariance;
        let symmetric = (p - p.transpose()).amax() <= 1e-12 * p.amax().max(1.0);
        let diagonal_ok = (0..N_X).all(|i| p[(i, i)] >= 0.0);
        if !p.iter().all(|v| v.is_finite()) || !symmetric || !diagonal_ok {
            return Err(ConfigError::InvalidInitialCovariance);
        }

        if !self.regularization.is_finite() || self.regularization < 0.0 {
            return Err(ConfigError::InvalidRegularization(self.regularization));
        }

        for (name, value) in [
            ("max_condition", self.max_condition),
            ("min_range", self.min_range),
            ("ticks_per_second", self.ticks_per_second),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::NonPositiveParameter { name, value });
            }
        }

        Ok(())
    }

    pub fn process_model(&self) -> CtrvModel {
        CtrvModel::new(self.noise.std_accel, self.noise.std_yaw_accel)
    }

    pub fn position_model(&self) -> PositionModel {
        PositionModel::new(self.noise.std_position_x, self.noise.std_position_y)
    }

    pub fn range_bearing_model(&self) -> RangeBearingRateModel {
        RangeBearingRateModel::new(
            self.noise.std_range,
            self.noise.std_bearing,
            self.noise.std_range_rate,
            self.min_range,
        )
    }
}
