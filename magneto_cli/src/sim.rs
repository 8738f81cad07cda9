//! `simulate`: a synthetic magnetometer driven through the sampler thread.

use crate::replay::run_params;
use crate::report::{observation_line, summary_line};
use magneto_config::Config;
use magneto_core::{RunMode, RunSummary};
use magneto_traits::{Magnetometer, SensorError};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Set to make every simulated read fail with a timeout.
pub const FAIL_ENV: &str = "MAGNETO_SIM_FAIL";

/// Background field in µT.
const BASE: [f32; 3] = [20.0, 5.0, -40.0];
/// Magnet orbit period and peak contribution.
const ORBIT_S: f32 = 4.0;
const ORBIT_UT: f32 = 30.0;
/// A short z-axis spike every `SPIKE_EVERY_S`, lasting two samples.
const SPIKE_EVERY_S: f32 = 3.0;
const SPIKE_UT: f32 = 60.0;
const NOISE_UT: f32 = 0.3;

/// Magnet circling the sensor with a varying radius, periodic spikes and
/// a little noise. Deterministic for a given seed.
pub struct SimMagnetometer {
    rate_hz: u32,
    index: u64,
    rng: u64,
    fail: bool,
}

impl SimMagnetometer {
    pub fn new(rate_hz: u32, seed: u64) -> Self {
        Self {
            rate_hz: rate_hz.max(1),
            index: 0,
            rng: seed.max(1),
            fail: false,
        }
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    // xorshift64
    fn noise(&mut self) -> f32 {
        let mut x = self.rng;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.rng = x;
        #[allow(clippy::cast_precision_loss)]
        let unit = (x >> 40) as f32 / (1u64 << 24) as f32;
        (unit * 2.0 - 1.0) * NOISE_UT
    }

    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    pub fn next_sample(&mut self) -> [f32; 3] {
        let i = self.index;
        self.index += 1;
        let t = i as f32 / self.rate_hz as f32;

        let theta = std::f32::consts::TAU * t / ORBIT_S;
        // Radius breathes at half the orbit rate.
        let strength = ORBIT_UT * (0.6 + 0.4 * (theta / 2.0).cos());
        let spike_period = (SPIKE_EVERY_S * self.rate_hz as f32).max(1.0) as u64;
        let spike = if i % spike_period < 2 { SPIKE_UT } else { 0.0 };

        [
            BASE[0] + strength * theta.cos() + self.noise(),
            BASE[1] + strength * theta.sin() + self.noise(),
            BASE[2] + spike + self.noise(),
        ]
    }
}

impl Magnetometer for SimMagnetometer {
    fn read(&mut self, timeout: Duration) -> Result<[f32; 3], SensorError> {
        if self.fail {
            std::thread::sleep(timeout);
            return Err(Box::new(std::io::Error::new(
                std::io::ErrorKind::TimedOut,
                "simulated sensor timeout",
            )));
        }
        Ok(self.next_sample())
    }
}

pub fn run_simulate(
    cfg: &Config,
    samples: Option<u64>,
    shutdown: &Arc<AtomicBool>,
    json_mode: bool,
) -> eyre::Result<RunSummary> {
    let mut params = run_params(cfg, samples)?;
    params.mode = RunMode::Sampler;

    let mut sensor = SimMagnetometer::new(cfg.sampling.rate_hz, 0x9E37_79B9_7F4A_7C15);
    if std::env::var_os(FAIL_ENV).is_some() {
        tracing::warn!("{FAIL_ENV} set: simulated reads will time out");
        sensor = sensor.failing();
    }

    let flag = shutdown.clone();
    if let Err(e) = ctrlc::set_handler(move || flag.store(true, Ordering::Relaxed)) {
        tracing::warn!(error = %e, "could not install Ctrl-C handler");
    }

    let summary = magneto_core::runner::run(sensor, &params, shutdown, |obs| {
        if let Some(line) = observation_line(obs, json_mode) {
            println!("{line}");
        }
    })?;
    println!("{}", summary_line(&summary, json_mode));
    Ok(summary)
}
