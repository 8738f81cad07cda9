//! Windowed moving-average filter (low-pass) and its residual (high-pass).
//!
//! One ring buffer per axis, all three sharing a single oldest-slot index so
//! they advance in lock-step. The first sample is replicated into every slot,
//! so the average is valid from sample 1 and there is no warm-up bias toward
//! zero. Running sums are kept in `f64` over the raw `f32` values, which keeps
//! them exact for realistic field magnitudes no matter how long the stream.

use crate::metrics::round2;
use crate::sample::{Reading, Sample};

/// Number of samples averaged per axis.
pub const WINDOW: usize = 10;

#[derive(Debug, Clone)]
pub struct WindowFilter {
    ring: [[f32; WINDOW]; 3],
    sum: [f64; 3],
    oldest: usize,
    primed: bool,
}

impl Default for WindowFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl WindowFilter {
    pub fn new() -> Self {
        Self {
            ring: [[0.0; WINDOW]; 3],
            sum: [0.0; 3],
            oldest: 0,
            primed: false,
        }
    }

    /// Push one raw sample and return the rounded low-pass and high-pass
    /// vectors for it. The returned `Reading` is a copy; later updates never
    /// touch it.
    #[allow(clippy::cast_precision_loss)]
    pub fn update(&mut self, raw: Sample) -> Reading {
        let axes = raw.axes();
        if self.primed {
            for (axis, &v) in axes.iter().enumerate() {
                let slot = &mut self.ring[axis][self.oldest];
                self.sum[axis] += f64::from(v) - f64::from(*slot);
                *slot = v;
            }
            // Index moves only after all three axes took the new value.
            self.oldest = (self.oldest + 1) % WINDOW;
        } else {
            for (axis, &v) in axes.iter().enumerate() {
                self.ring[axis] = [v; WINDOW];
                self.sum[axis] = f64::from(v) * WINDOW as f64;
            }
            self.primed = true;
        }

        let avg = self.average();
        Reading {
            low_pass: Sample::new(round2(avg[0]), round2(avg[1]), round2(avg[2])),
            high_pass: Sample::new(
                round2(f64::from(axes[0]) - avg[0]),
                round2(f64::from(axes[1]) - avg[1]),
                round2(f64::from(axes[2]) - avg[2]),
            ),
        }
    }

    /// Full-precision per-axis moving average (zero before the first sample).
    #[allow(clippy::cast_precision_loss)]
    pub fn average(&self) -> [f64; 3] {
        self.sum.map(|s| s / WINDOW as f64)
    }

    /// Rounded moving average; what consumers should read.
    pub fn low_pass(&self) -> Sample {
        let avg = self.average();
        Sample::new(round2(avg[0]), round2(avg[1]), round2(avg[2]))
    }

    /// Whether at least one sample has been seen.
    pub fn is_primed(&self) -> bool {
        self.primed
    }
}
