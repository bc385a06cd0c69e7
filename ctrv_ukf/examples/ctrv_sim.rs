//! Simulate a CTRV target observed by a position sensor and a
//! range/bearing/rate sensor, track it and report accuracy and NIS
//! consistency.
//!
//! ```text
//! cargo run --example ctrv_sim -- --steps 500 --seed 7 --verbose
//! ```

use clap::Parser;
use ctrv_ukf::diagnostics::NisStatistics;
use ctrv_ukf::models::ProcessModel;
use ctrv_ukf::state::{AugmentedVector, PX, PY, SPEED, YAW, YAW_RATE};
use ctrv_ukf::{
    CtrvModel, CtrvTracker, FilterConfig, Measurement, MeasurementModel, NoiseConfig,
    RangeBearingRateModel, StateVector, StepOutcome,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use tracing::{info, warn};

/// CTRV tracking simulation
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Number of measurements to generate
    #[arg(long, default_value_t = 500)]
    steps: usize,

    /// Time between measurements in milliseconds
    #[arg(long, default_value_t = 50)]
    interval_ms: i64,

    /// RNG seed
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Drop position measurements
    #[arg(long, default_value_t = false)]
    no_position: bool,

    /// Drop range/bearing/rate measurements
    #[arg(long, default_value_t = false)]
    no_range_bearing: bool,

    /// Print an estimate every N steps, 0 to disable
    #[arg(long, default_value_t = 50)]
    print_every: usize,

    /// Verbose logging (DEBUG level)
    #[arg(long, short, default_value_t = false)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let subscriber = tracing_subscriber::fmt()
        .with_target(false)
        .with_thread_ids(false)
        .with_level(true);

    if verbose {
        subscriber.with_max_level(tracing::Level::DEBUG).init();
        info!("Verbose logging enabled (DEBUG level)");
    } else {
        subscriber.with_max_level(tracing::Level::INFO).init();
    }
}

struct Sensors {
    noise: NoiseConfig,
    radar: RangeBearingRateModel,
    rng: StdRng,
}

impl Sensors {
    fn gaussian(&mut self, std: f64) -> f64 {
        Normal::new(0.0, std)
            .map(|n| n.sample(&mut self.rng))
            .unwrap_or(0.0)
    }

    fn observe(&mut self, truth: &StateVector, ts: i64, position: bool) -> Option<Measurement> {
        if position {
            let x = truth[PX] + self.gaussian(self.noise.std_position_x);
            let y = truth[PY] + self.gaussian(self.noise.std_position_y);
            return Some(Measurement::position(ts, x, y));
        }

        let z = self.radar.measure(truth).ok()?;
        Some(Measurement::range_bearing_rate(
            ts,
            z[0] + self.gaussian(self.noise.std_range),
            z[1] + self.gaussian(self.noise.std_bearing),
            z[2] + self.gaussian(self.noise.std_range_rate),
        ))
    }
}

fn summarize(name: &str, stats: &NisStatistics) {
    match (stats.mean(), stats.fraction_above_95()) {
        (Some(mean), Some(above)) => info!(
            "{name}: {} updates, mean NIS {mean:.3} (expected {}), {:.1}% above 95% bound",
            stats.count(),
            stats.dof(),
            100.0 * above
        ),
        _ => info!("{name}: no updates"),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_logging(args.verbose);

    let noise = NoiseConfig {
        std_accel: 0.3,
        std_yaw_accel: 0.3,
        ..NoiseConfig::default()
    };
    let config = FilterConfig::default()
        .with_noise(noise)
        .with_sensors(!args.no_position, !args.no_range_bearing)
        .with_ticks_per_second(1e3);
    let mut tracker = CtrvTracker::new(config)?;

    let truth_model = CtrvModel::new(noise.std_accel, noise.std_yaw_accel);
    let radar = RangeBearingRateModel::new(
        noise.std_range,
        noise.std_bearing,
        noise.std_range_rate,
        1e-4,
    );
    let mut sensors = Sensors {
        noise,
        radar,
        rng: StdRng::seed_from_u64(args.seed),
    };

    let dt = args.interval_ms as f64 / 1e3;
    let mut truth = StateVector::new(25.0, 10.0, 3.0, 0.4, 0.05);
    let mut squared_error = [0.0; 4];
    let mut scored = 0usize;

    for step in 0..args.steps {
        if step > 0 {
            let mut aug = AugmentedVector::zeros();
            aug.fixed_rows_mut::<5>(0).copy_from(&truth);
            aug[5] = sensors.gaussian(noise.std_accel);
            aug[6] = sensors.gaussian(noise.std_yaw_accel);
            truth = truth_model.predict(&aug, dt);
        }

        let timestamp = step as i64 * args.interval_ms;
        let Some(measurement) = sensors.observe(&truth, timestamp, step % 2 == 0) else {
            warn!(step, "target at sensor origin, no range/bearing reading");
            continue;
        };

        let report = args.print_every > 0 && step % args.print_every == 0;
        match tracker.process_measurement(&measurement) {
            Ok(StepOutcome::Updated { nis }) if report => {
                if let Some(x) = tracker.state() {
                    info!(
                        step,
                        sensor = %measurement.sensor(),
                        nis,
                        "px {:.2} py {:.2} v {:.2} yaw {:.2} yaw_rate {:.3}",
                        x[PX],
                        x[PY],
                        x[SPEED],
                        x[YAW],
                        x[YAW_RATE]
                    );
                }
            }
            Ok(_) => {}
            Err(err) => warn!(step, error = %err, "measurement not fused"),
        }

        if let Some(x) = tracker.state() {
            let speed_error = x[SPEED] - truth[SPEED];
            let yaw_error = ctrv_ukf::math::normalize_angle(x[YAW] - truth[YAW]);
            for (acc, e) in squared_error.iter_mut().zip([
                x[PX] - truth[PX],
                x[PY] - truth[PY],
                speed_error,
                yaw_error,
            ]) {
                *acc += e * e;
            }
            scored += 1;
        }
    }

    if scored == 0 {
        warn!("no estimates produced");
        return Ok(());
    }

    let rmse = squared_error.map(|s| (s / scored as f64).sqrt());
    info!(
        "RMSE px {:.3} py {:.3} v {:.3} yaw {:.3}",
        rmse[0], rmse[1], rmse[2], rmse[3]
    );
    let nis = tracker.diagnostics();
    summarize("position", &nis.position);
    summarize("range/bearing/rate", &nis.range_bearing);

    Ok(())
}
