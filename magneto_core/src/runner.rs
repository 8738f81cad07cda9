use crate::config::{RecognizerCfg, SamplingCfg, ScriptStep, Timeouts};
use crate::driver::{DynDriver, Observation};
use crate::error::{MagnetoError, Result as CoreResult};
use crate::replay::is_end_of_stream;
use crate::sample::Sample;
use crate::sampler::Sampler;
use crate::sensor_error::map_sensor_error;
use crossbeam_channel::RecvTimeoutError;
use magneto_traits::Magnetometer;
use magneto_traits::clock::{Clock, MonotonicClock};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// How samples are pulled from the sensor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RunMode {
    /// Read inside the loop with `Magnetometer::read(timeout)`.
    #[default]
    Direct,
    /// Read on a background thread paced at the sampling rate.
    Sampler,
}

/// Everything a run needs besides the sensor.
#[derive(Debug, Clone, Default)]
pub struct RunParams {
    pub recognizer: RecognizerCfg,
    pub sampling: SamplingCfg,
    pub timeouts: Timeouts,
    pub mode: RunMode,
    /// Commands fired after the sample with index `at`, in order.
    pub script: Vec<ScriptStep>,
    /// Stop after this many samples.
    pub max_samples: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The sensor reported the end of a finite stream.
    EndOfStream,
    SampleLimit,
    Shutdown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub recognizer: &'static str,
    pub samples: u64,
    /// Observations carrying a discrete event (match, tap, flip).
    pub detections: u64,
    pub commands_applied: u64,
    /// Commands that failed recoverably (full store, missing reference).
    pub commands_rejected: u64,
    pub ready: bool,
    pub stop: StopReason,
}

/// Stall watchdog threshold: four sensor timeouts, but never shorter than
/// two sampling periods so one missed sample doesn't trip it.
#[inline]
fn compute_stall_threshold_ms(sensor_timeout_ms: u64, period_ms: u64) -> u64 {
    sensor_timeout_ms
        .saturating_mul(4)
        .max(period_ms.saturating_mul(2))
        .max(1)
}

/// Drive `sensor` through the configured recognizer until the stream ends,
/// the sample limit is reached or `shutdown` is raised.
pub fn run<M, F>(
    sensor: M,
    params: &RunParams,
    shutdown: &AtomicBool,
    on_observation: F,
) -> CoreResult<RunSummary>
where
    M: Magnetometer + Send + 'static,
    F: FnMut(&Observation),
{
    run_with_clock(sensor, params, MonotonicClock::new(), shutdown, on_observation)
}

/// [`run`] with an injected clock for the sampler pacing and stall watchdog.
pub fn run_with_clock<M, C, F>(
    sensor: M,
    params: &RunParams,
    clock: C,
    shutdown: &AtomicBool,
    on_observation: F,
) -> CoreResult<RunSummary>
where
    M: Magnetometer + Send + 'static,
    C: Clock + Clone + Send + Sync + 'static,
    F: FnMut(&Observation),
{
    let driver = crate::DriverBuilder::new()
        .with_recognizer(params.recognizer.clone())
        .build()?;
    let mut session = Session::new(driver, params, on_observation);
    tracing::info!(
        recognizer = session.summary.recognizer,
        mode = ?params.mode,
        rate_hz = params.sampling.rate_hz,
        "run start"
    );

    let stop = match params.mode {
        RunMode::Direct => run_direct(sensor, params, shutdown, &mut session)?,
        RunMode::Sampler => run_with_sampler(sensor, params, clock, shutdown, &mut session)?,
    };
    let summary = session.finish(stop);
    tracing::info!(
        samples = summary.samples,
        detections = summary.detections,
        ready = summary.ready,
        stop = ?summary.stop,
        "run complete"
    );
    Ok(summary)
}

fn run_direct<M, F>(
    mut sensor: M,
    params: &RunParams,
    shutdown: &AtomicBool,
    session: &mut Session<'_, F>,
) -> CoreResult<StopReason>
where
    M: Magnetometer,
    F: FnMut(&Observation),
{
    let timeout = Duration::from_millis(params.timeouts.sensor_ms);
    loop {
        if let Some(stop) = session.should_stop(shutdown) {
            return Ok(stop);
        }
        match sensor.read(timeout) {
            Ok(v) => session.step(Sample::from(v))?,
            Err(e) if is_end_of_stream(&*e) => return Ok(StopReason::EndOfStream),
            Err(e) => {
                let err = map_sensor_error(&*e);
                tracing::error!(error = %err, "sensor read failed");
                return Err(crate::error::Report::new(err));
            }
        }
    }
}

fn run_with_sampler<M, C, F>(
    sensor: M,
    params: &RunParams,
    clock: C,
    shutdown: &AtomicBool,
    session: &mut Session<'_, F>,
) -> CoreResult<StopReason>
where
    M: Magnetometer + Send + 'static,
    C: Clock + Clone + Send + Sync + 'static,
    F: FnMut(&Observation),
{
    let hz = params.sampling.rate_hz;
    let period_ms = crate::util::period_ms(hz);
    let stall_threshold_ms = compute_stall_threshold_ms(params.timeouts.sensor_ms, period_ms);
    let sampler = Sampler::spawn(
        sensor,
        hz,
        Duration::from_millis(params.timeouts.sensor_ms),
        clock.clone(),
    );
    let wait = Duration::from_millis(period_ms);

    loop {
        if let Some(stop) = session.should_stop(shutdown) {
            return Ok(stop);
        }
        match sampler.recv_timeout(wait) {
            Ok(s) => session.step(s)?,
            Err(RecvTimeoutError::Timeout) => {
                let stalled_ms = sampler.stalled_for(clock.ms_since(sampler.epoch()));
                if stalled_ms > stall_threshold_ms {
                    tracing::error!(
                        stalled_ms,
                        read_errors = sampler.read_errors(),
                        "sensor stalled"
                    );
                    return Err(crate::error::Report::new(MagnetoError::Timeout));
                }
            }
            Err(RecvTimeoutError::Disconnected) => return Ok(StopReason::EndOfStream),
        }
    }
}

/// Per-run state shared by both sampling modes.
struct Session<'p, F> {
    driver: DynDriver,
    script: &'p [ScriptStep],
    next_step: usize,
    max_samples: Option<u64>,
    on_observation: F,
    summary: RunSummary,
}

impl<'p, F: FnMut(&Observation)> Session<'p, F> {
    fn new(driver: DynDriver, params: &'p RunParams, on_observation: F) -> Self {
        let recognizer = driver.recognizer().name();
        Self {
            driver,
            script: &params.script,
            next_step: 0,
            max_samples: params.max_samples,
            on_observation,
            summary: RunSummary {
                recognizer,
                samples: 0,
                detections: 0,
                commands_applied: 0,
                commands_rejected: 0,
                ready: false,
                stop: StopReason::EndOfStream,
            },
        }
    }

    fn should_stop(&self, shutdown: &AtomicBool) -> Option<StopReason> {
        if shutdown.load(Ordering::Relaxed) {
            return Some(StopReason::Shutdown);
        }
        match self.max_samples {
            Some(max) if self.summary.samples >= max => Some(StopReason::SampleLimit),
            _ => None,
        }
    }

    fn step(&mut self, sample: Sample) -> CoreResult<()> {
        let obs = self.driver.observe(sample);
        self.summary.samples += 1;
        if obs.outcome.is_detection() {
            self.summary.detections += 1;
        }
        (self.on_observation)(&obs);
        self.apply_due(obs.index)
    }

    /// Fire script steps scheduled at `index`. Recoverable calibration
    /// failures are counted; a command the recognizer does not understand
    /// aborts the run.
    fn apply_due(&mut self, index: u64) -> CoreResult<()> {
        while let Some(step) = self.script.get(self.next_step) {
            if step.at > index {
                break;
            }
            self.next_step += 1;
            match self.driver.command(step.command) {
                Ok(_) => self.summary.commands_applied += 1,
                Err(e @ MagnetoError::UnsupportedCommand { .. }) => {
                    return Err(crate::error::Report::new(e));
                }
                Err(_) => self.summary.commands_rejected += 1,
            }
        }
        Ok(())
    }

    fn finish(mut self, stop: StopReason) -> RunSummary {
        self.summary.ready = self.driver.is_ready();
        self.summary.stop = stop;
        self.summary
    }
}
