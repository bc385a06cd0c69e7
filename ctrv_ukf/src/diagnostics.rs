//! Normalized innovation squared bookkeeping.
//!
//! For a consistent filter the NIS of an `m`-dimensional measurement follows a
//! χ² distribution with `m` degrees of freedom, so its running mean should sit
//! near `m` and about 5 % of samples should exceed the 95 % quantile. These
//! numbers are exposed for monitoring only and never feed back into the filter.

use crate::measurement::SensorKind;

/// 95 % quantile of χ² with 2 degrees of freedom.
pub const CHI2_95_DF2: f64 = 5.991;
/// 95 % quantile of χ² with 3 degrees of freedom.
pub const CHI2_95_DF3: f64 = 7.815;

/// Running NIS statistics for one sensor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NisStatistics {
    dof: usize,
    threshold: f64,
    last: f64,
    count: u64,
    sum: f64,
    above_threshold: u64,
}

impl NisStatistics {
    pub fn new(dof: usize, threshold: f64) -> Self {
        Self {
            dof,
            threshold,
            last: 0.0,
            count: 0,
            sum: 0.0,
            above_threshold: 0,
        }
    }

    pub fn record(&mut self, nis: f64) {
        self.last = nis;
        self.count += 1;
        self.sum += nis;
        if nis > self.threshold {
            self.above_threshold += 1;
        }
    }

    /// Measurement dimension, the expected mean NIS.
    pub fn dof(&self) -> usize {
        self.dof
    }

    /// Most recent NIS, 0.0 before the first correction.
    pub fn last(&self) -> f64 {
        self.last
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }

    /// Share of samples above the 95 % χ² quantile.
    pub fn fraction_above_95(&self) -> Option<f64> {
        (self.count > 0).then(|| self.above_threshold as f64 / self.count as f64)
    }
}

/// NIS statistics for both sensors.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NisMonitor {
    pub position: NisStatistics,
    pub range_bearing: NisStatistics,
}

impl Default for NisMonitor {
    fn default() -> Self {
        Self {
            position: NisStatistics::new(2, CHI2_95_DF2),
            range_bearing: NisStatistics::new(3, CHI2_95_DF3),
        }
    }
}

impl NisMonitor {
    pub fn record(&mut self, sensor: SensorKind, nis: f64) {
        self.sensor_mut(sensor).record(nis);
    }

    pub fn sensor(&self, sensor: SensorKind) -> &NisStatistics {
        match sensor {
            SensorKind::Position => &self.position,
            SensorKind::RangeBearingRate => &self.range_bearing,
        }
    }

    fn sensor_mut(&mut self, sensor: SensorKind) -> &mut NisStatistics {
        match sensor {
            SensorKind::Position => &mut self.position,
            SensorKind::RangeBearingRate => &mut self.range_bearing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_statistics() {
        let monitor = NisMonitor::default();
        assert_eq!(monitor.position.last(), 0.0);
        assert_eq!(monitor.position.mean(), None);
        assert_eq!(monitor.range_bearing.fraction_above_95(), None);
        assert_eq!(monitor.range_bearing.dof(), 3);
    }

    #[test]
    fn records_per_sensor() {
        let mut monitor = NisMonitor::default();
        monitor.record(SensorKind::Position, 1.0);
        monitor.record(SensorKind::Position, 7.0);
        monitor.record(SensorKind::RangeBearingRate, 2.5);

        let pos = monitor.sensor(SensorKind::Position);
        assert_eq!(pos.count(), 2);
        assert_eq!(pos.last(), 7.0);
        assert_eq!(pos.mean(), Some(4.0));
        assert_eq!(pos.fraction_above_95(), Some(0.5));

        let rbr = monitor.sensor(SensorKind::RangeBearingRate);
        assert_eq!(rbr.count(), 1);
        assert_eq!(rbr.fraction_above_95(), Some(0.0));
    }
}
