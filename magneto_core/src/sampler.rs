//! Background sensor sampling.
//!
//! Spawns a thread that owns the `Magnetometer` and forwards every sample,
//! in order, over a bounded channel. A full channel blocks the sensor thread
//! (backpressure) instead of dropping samples, since the filter and the edge
//! detectors depend on seeing the whole stream. The last-ok timestamp feeds
//! the runner's stall watchdog.
//!
//! Each `Sampler` owns exactly one thread, shut down and joined on drop.
use crossbeam_channel as xch;
use magneto_traits::Magnetometer;
use magneto_traits::clock::Clock;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use crate::replay::is_end_of_stream;
use crate::sample::Sample;

/// Samples buffered between the sensor thread and the consumer.
pub const CHANNEL_CAPACITY: usize = 64;

pub struct Sampler {
    rx: xch::Receiver<Sample>,
    last_ok: Arc<AtomicU64>,
    read_errors: Arc<AtomicU64>,
    epoch: Instant,
    shutdown: Arc<AtomicBool>,
    join_handle: Option<std::thread::JoinHandle<()>>,
}

impl Sampler {
    /// Start sampling `sensor` at `hz`. A finite sensor that reports end of
    /// stream closes the channel once its samples are consumed.
    pub fn spawn<M, C>(mut sensor: M, hz: u32, timeout: Duration, clock: C) -> Self
    where
        M: Magnetometer + Send + 'static,
        C: Clock + Send + Sync + 'static,
    {
        let (tx, rx) = xch::bounded(CHANNEL_CAPACITY);
        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_clone = shutdown.clone();
        let last_ok = Arc::new(AtomicU64::new(0));
        let last_ok_clone = last_ok.clone();
        let read_errors = Arc::new(AtomicU64::new(0));
        let read_errors_clone = read_errors.clone();
        let period = Duration::from_micros(crate::util::period_us(hz));
        // Wake up at least every period while blocked on a full channel.
        let send_wait = period.max(Duration::from_millis(5));
        let epoch = clock.now();

        let join_handle = std::thread::spawn(move || {
            'outer: loop {
                if shutdown_clone.load(Ordering::Relaxed) {
                    tracing::debug!("sampler thread received shutdown signal");
                    break;
                }

                match sensor.read(timeout) {
                    Ok(v) => {
                        let mut pending = Sample::from(v);
                        loop {
                            match tx.send_timeout(pending, send_wait) {
                                Ok(()) => break,
                                Err(xch::SendTimeoutError::Timeout(s)) => {
                                    if shutdown_clone.load(Ordering::Relaxed) {
                                        break 'outer;
                                    }
                                    pending = s;
                                }
                                Err(xch::SendTimeoutError::Disconnected(_)) => {
                                    tracing::debug!("sampler consumer disconnected, exiting thread");
                                    break 'outer;
                                }
                            }
                        }
                        last_ok_clone.store(clock.ms_since(epoch), Ordering::Relaxed);
                    }
                    Err(e) if is_end_of_stream(&*e) => {
                        tracing::debug!("sensor stream ended");
                        break;
                    }
                    Err(e) => {
                        // The consumer's watchdog decides when this becomes fatal.
                        read_errors_clone.fetch_add(1, Ordering::Relaxed);
                        tracing::trace!(error = %e, "sensor read failed");
                    }
                }

                if shutdown_clone.load(Ordering::Relaxed) {
                    break;
                }
                clock.sleep(period);
            }
            tracing::trace!("sampler thread exiting cleanly");
        });

        Self {
            rx,
            last_ok,
            read_errors,
            epoch,
            shutdown,
            join_handle: Some(join_handle),
        }
    }

    /// Next sample in delivery order, waiting up to `timeout`.
    /// `Disconnected` means the sensor thread is done and the buffer is empty.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<Sample, xch::RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }

    /// Every buffered sample, oldest first, without blocking.
    pub fn drain(&self) -> impl Iterator<Item = Sample> + '_ {
        self.rx.try_iter()
    }

    /// Epoch that `stalled_for` measures against.
    pub fn epoch(&self) -> Instant {
        self.epoch
    }

    /// Milliseconds since the last successful read, given `now_ms` on the
    /// sampler's clock relative to [`Sampler::epoch`].
    pub fn stalled_for(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.last_ok.load(Ordering::Relaxed))
    }

    /// Failed reads so far, end of stream excluded.
    pub fn read_errors(&self) -> u64 {
        self.read_errors.load(Ordering::Relaxed)
    }
}

impl Drop for Sampler {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);

        // The thread exits between reads at once, or after the in-flight
        // read returns (bounded by the sensor timeout).
        if let Some(handle) = self.join_handle.take() {
            match handle.join() {
                Ok(()) => {
                    tracing::trace!("sampler thread joined");
                }
                Err(e) => {
                    tracing::warn!(?e, "sampler thread panicked during shutdown");
                }
            }
        }
    }
}
