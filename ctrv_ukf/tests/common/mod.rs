//! Ground truth and noisy measurement generation shared by the integration
//! tests.

#![allow(dead_code)]

use ctrv_ukf::models::{MeasurementModel, ProcessModel};
use ctrv_ukf::state::{AugmentedVector, StateVector, PX, PY};
use ctrv_ukf::{CtrvModel, Measurement, NoiseConfig, RangeBearingRateModel};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

pub const TICKS_PER_STEP: i64 = 50_000;

/// A target moving under the CTRV model with sampled acceleration noise,
/// observed alternately by the two sensors.
pub struct Simulation {
    pub truth: StateVector,
    pub timestamp: i64,
    noise: NoiseConfig,
    process: CtrvModel,
    range_bearing: RangeBearingRateModel,
    rng: StdRng,
    step: u64,
}

impl Simulation {
    pub fn new(seed: u64, truth: StateVector, noise: NoiseConfig) -> Self {
        Self {
            truth,
            timestamp: 0,
            process: CtrvModel::new(noise.std_accel, noise.std_yaw_accel),
            range_bearing: RangeBearingRateModel::new(
                noise.std_range,
                noise.std_bearing,
                noise.std_range_rate,
                1e-4,
            ),
            noise,
            rng: StdRng::seed_from_u64(seed),
            step: 0,
        }
    }

    fn sample(&mut self, std: f64) -> f64 {
        Normal::new(0.0, std).unwrap().sample(&mut self.rng)
    }

    /// Advance the truth by one step and return the next measurement.
    pub fn next(&mut self) -> Measurement {
        if self.step > 0 {
            let mut aug = AugmentedVector::zeros();
            aug.fixed_rows_mut::<5>(0).copy_from(&self.truth);
            aug[5] = self.sample(self.noise.std_accel);
            aug[6] = self.sample(self.noise.std_yaw_accel);
            self.truth = self
                .process
                .predict(&aug, TICKS_PER_STEP as f64 / 1e6);
            self.timestamp += TICKS_PER_STEP;
        }
        self.step += 1;

        if self.step % 2 == 1 {
            let x = self.truth[PX] + self.sample(self.noise.std_position_x);
            let y = self.truth[PY] + self.sample(self.noise.std_position_y);
            Measurement::position(self.timestamp, x, y)
        } else {
            let z = self.range_bearing.measure(&self.truth).unwrap();
            let range = z[0] + self.sample(self.noise.std_range);
            let bearing = z[1] + self.sample(self.noise.std_bearing);
            let range_rate = z[2] + self.sample(self.noise.std_range_rate);
            Measurement::range_bearing_rate(self.timestamp, range, bearing, range_rate)
        }
    }
}
