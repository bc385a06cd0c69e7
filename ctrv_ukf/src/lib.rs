//! Single target tracking with an unscented Kalman filter
//!
//! The target follows a constant turn rate and velocity (CTRV) model with state
//! `[px, py, v, yaw, yaw_rate]`. Two sensors are fused: a Cartesian position
//! sensor and a range/bearing/range-rate sensor. Each correction reports its
//! normalized innovation squared for consistency monitoring.
//!
//! ```
//! use ctrv_ukf::{CtrvTracker, FilterConfig, Measurement, StepOutcome};
//!
//! let mut tracker = CtrvTracker::new(FilterConfig::default()).unwrap();
//! tracker
//!     .process_measurement(&Measurement::position(0, 1.0, 2.0))
//!     .unwrap();
//! let outcome = tracker
//!     .process_measurement(&Measurement::range_bearing_rate(100_000, 2.3, 1.1, 0.4))
//!     .unwrap();
//! assert!(matches!(outcome, StepOutcome::Updated { .. }));
//! ```

pub mod config;
pub mod diagnostics;
pub mod math;
pub mod measurement;
pub mod models;
pub mod sigma_points;
pub mod state;
pub mod ukf;

pub use config::{ConfigError, FilterConfig, NoiseConfig};
pub use diagnostics::{NisMonitor, NisStatistics};
pub use measurement::{Measurement, Reading, SensorKind};
pub use models::{CtrvModel, MeasurementModel, PositionModel, ProcessModel, RangeBearingRateModel};
pub use state::{Moments, StateCovariance, StateVector, TrackState};
pub use ukf::{CtrvTracker, StepOutcome, UkfEngine, UkfError};
