//! Timestamped sensor readings consumed by the tracker.

use core::fmt;

use crate::state::StateVector;

/// Which sensor produced a measurement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SensorKind {
    Position,
    RangeBearingRate,
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SensorKind::Position => f.write_str("position"),
            SensorKind::RangeBearingRate => f.write_str("range_bearing_rate"),
        }
    }
}

/// Raw sensor values.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Reading {
    /// Cartesian position (m).
    Position { x: f64, y: f64 },
    /// Range (m), bearing (rad, counter-clockwise from +x) and range rate (m/s).
    RangeBearingRate {
        range: f64,
        bearing: f64,
        range_rate: f64,
    },
}

impl Reading {
    pub fn sensor(&self) -> SensorKind {
        match self {
            Reading::Position { .. } => SensorKind::Position,
            Reading::RangeBearingRate { .. } => SensorKind::RangeBearingRate,
        }
    }

    /// State implied by this reading alone: its position, with speed, heading
    /// and heading rate at zero.
    pub fn initial_state(&self) -> StateVector {
        let (px, py) = match *self {
            Reading::Position { x, y } => (x, y),
            Reading::RangeBearingRate { range, bearing, .. } => {
                (range * bearing.cos(), range * bearing.sin())
            }
        };
        StateVector::new(px, py, 0.0, 0.0, 0.0)
    }
}

/// A reading with the time it was taken.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Measurement {
    /// Integer clock, microseconds unless configured otherwise.
    pub timestamp: i64,
    pub reading: Reading,
}

impl Measurement {
    pub fn position(timestamp: i64, x: f64, y: f64) -> Self {
        Self {
            timestamp,
            reading: Reading::Position { x, y },
        }
    }

    pub fn range_bearing_rate(timestamp: i64, range: f64, bearing: f64, range_rate: f64) -> Self {
        Self {
            timestamp,
            reading: Reading::RangeBearingRate {
                range,
                bearing,
                range_rate,
            },
        }
    }

    pub fn sensor(&self) -> SensorKind {
        self.reading.sensor()
    }
}
