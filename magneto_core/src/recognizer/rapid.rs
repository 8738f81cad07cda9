//! Two-threshold hysteresis counter for quick magnet movements.

use super::{Command, CommandAck, Outcome, Recognizer, unsupported};
use crate::error::MagnetoError;
use crate::sample::Reading;

const NAME: &str = "rapid_changes";

/// Counts excursions of the high-pass norm.
///
/// A tap is counted when the magnitude exceeds `high` while not armed; the
/// detector is then armed until the magnitude drops below `low`, and further
/// spikes are ignored meanwhile. Values between the thresholds change nothing.
/// `high > low` is the caller's responsibility.
#[derive(Debug, Clone)]
pub struct RapidChanges {
    low: f32,
    high: f32,
    ready: bool,
    armed: bool,
    count: u32,
}

impl Default for RapidChanges {
    fn default() -> Self {
        Self::new()
    }
}

impl RapidChanges {
    pub fn new() -> Self {
        Self {
            low: 0.0,
            high: 0.0,
            ready: false,
            armed: false,
            count: 0,
        }
    }

    /// Preconfigured thresholds; ready immediately.
    pub fn with_thresholds(low: f32, high: f32) -> Self {
        let mut r = Self::new();
        r.low = low;
        r.high = high;
        r.ready = true;
        r
    }

    pub fn set_low_threshold(&mut self, low: f32) {
        self.low = low;
    }

    pub fn set_high_threshold(&mut self, high: f32) {
        self.high = high;
    }

    pub fn end_init(&mut self) {
        if self.high <= self.low {
            tracing::warn!(
                low = self.low,
                high = self.high,
                "high threshold not above low; hysteresis band is empty"
            );
        }
        self.ready = true;
        tracing::info!(low = self.low, high = self.high, "rapid-change thresholds set");
    }

    /// Zero both thresholds and stop detecting until the next `end_init`.
    /// Neither the counter nor the arm state is touched.
    pub fn clear_thresholds(&mut self) {
        self.low = 0.0;
        self.high = 0.0;
        self.ready = false;
    }

    pub fn clear_tap_counter(&mut self) {
        self.count = 0;
    }

    /// Feed one magnitude; true when it counted a tap.
    pub fn observe_magnitude(&mut self, magnitude: f32) -> bool {
        if !self.ready {
            return false;
        }
        if !self.armed && magnitude > self.high {
            self.armed = true;
            self.count = self.count.saturating_add(1);
            return true;
        }
        if self.armed && magnitude < self.low {
            self.armed = false;
        }
        false
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn thresholds(&self) -> (f32, f32) {
        (self.low, self.high)
    }
}

impl Recognizer for RapidChanges {
    fn name(&self) -> &'static str {
        NAME
    }

    fn is_ready(&self) -> bool {
        self.ready
    }

    fn observe(&mut self, reading: &Reading) -> Outcome {
        let magnitude = reading.high_pass.norm();
        let detected = self.observe_magnitude(magnitude);
        if detected {
            tracing::debug!(count = self.count, magnitude, "rapid change");
        }
        Outcome::RapidChange {
            detected,
            count: self.count,
            magnitude,
        }
    }

    fn apply(
        &mut self,
        command: Command,
        _reading: Option<&Reading>,
    ) -> Result<CommandAck, MagnetoError> {
        match command {
            Command::SetLowThreshold(v) => self.set_low_threshold(v),
            Command::SetHighThreshold(v) => self.set_high_threshold(v),
            Command::EndInit => self.end_init(),
            Command::ClearThresholds => self.clear_thresholds(),
            Command::ClearTapCounter => self.clear_tap_counter(),
            other => return Err(unsupported(NAME, other)),
        }
        Ok(CommandAck::Applied)
    }
}
