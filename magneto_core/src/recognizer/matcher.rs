//! Generic tolerance-band matcher over N calibration slots.
//!
//! The fingerprint type decides what is captured from a reading and how two
//! fingerprints are compared; storage, readiness and the first-match scan are
//! shared. Differences are rounded to 2 decimals before they meet the
//! threshold so band edges compare the same everywhere.

use std::fmt;

use super::{Command, CommandAck, Outcome, Recognizer, need_reading, unsupported};
use crate::error::MagnetoError;
use crate::metrics::round2;
use crate::sample::{Reading, Sample};
use crate::slots::SlotStore;

/// A calibration-time reference captured from a low-pass reading.
pub trait Fingerprint: Copy + fmt::Debug {
    /// Name of the recognizer built on this fingerprint.
    const NAME: &'static str;

    fn capture(low_pass: &Sample) -> Self;

    /// `current` falls inside the tolerance band around `self`.
    fn within(&self, current: &Self, threshold: f32) -> bool;
}

#[inline]
fn rounded_gap(a: f32, b: f32) -> f32 {
    round2((f64::from(a) - f64::from(b)).abs())
}

/// Field magnitude fingerprint; matches when `|current - stored| <= threshold`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Magnitude(pub f32);

impl Fingerprint for Magnitude {
    const NAME: &'static str = "identification";

    fn capture(low_pass: &Sample) -> Self {
        Self(low_pass.norm())
    }

    fn within(&self, current: &Self, threshold: f32) -> bool {
        rounded_gap(current.0, self.0) <= threshold
    }
}

/// Per-axis fingerprint; matches when every axis satisfies
/// `stored - threshold < current < stored + threshold`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldVector(pub Sample);

impl Fingerprint for FieldVector {
    const NAME: &'static str = "position";

    fn capture(low_pass: &Sample) -> Self {
        Self(*low_pass)
    }

    fn within(&self, current: &Self, threshold: f32) -> bool {
        self.0
            .axes()
            .iter()
            .zip(current.0.axes())
            .all(|(&s, c)| rounded_gap(c, s) < threshold)
    }
}

#[derive(Debug, Clone)]
pub struct SlotMatcher<F: Fingerprint> {
    slots: SlotStore<F>,
    threshold: f32,
    last_match: Option<usize>,
}

/// Which of N magnets is at the sensor, by field magnitude.
pub type Identification = SlotMatcher<Magnitude>;
/// Which of N stored magnet positions is occupied, by field vector.
pub type Position = SlotMatcher<FieldVector>;

impl<F: Fingerprint> SlotMatcher<F> {
    pub fn new(slots: usize, threshold: f32) -> Self {
        Self {
            slots: SlotStore::new(slots),
            threshold,
            last_match: None,
        }
    }

    /// Store the fingerprint of `reading` in the next free slot.
    pub fn store_current(&mut self, reading: &Reading) -> Result<usize, MagnetoError> {
        let fp = F::capture(&reading.low_pass);
        let idx = self.slots.store(fp)?;
        tracing::debug!(recognizer = F::NAME, slot = idx, fingerprint = ?fp, "fingerprint stored");
        if self.slots.is_complete() {
            tracing::info!(recognizer = F::NAME, slots = self.slots.capacity(), "calibration complete");
        }
        Ok(idx)
    }

    /// First slot whose band contains `reading`, or `None` when nothing
    /// matches or calibration is still running. The scan runs in storage
    /// order, so overlapping bands resolve to the lowest index.
    pub fn classify(&mut self, reading: &Reading) -> Option<usize> {
        let hit = self.find(&F::capture(&reading.low_pass));
        if hit.is_some() {
            self.last_match = hit;
        }
        hit
    }

    /// Side-effect free lookup of a fingerprint.
    pub fn find(&self, current: &F) -> Option<usize> {
        if !self.slots.is_complete() {
            return None;
        }
        self.slots
            .slots()
            .iter()
            .position(|stored| stored.within(current, self.threshold))
    }

    /// Takes effect on the next classification; stored slots are kept.
    pub fn set_threshold(&mut self, threshold: f32) {
        self.threshold = threshold;
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Slot of the most recent match; a miss leaves it unchanged.
    pub fn last_match(&self) -> Option<usize> {
        self.last_match
    }

    pub fn slots(&self) -> &SlotStore<F> {
        &self.slots
    }

    /// Forget all fingerprints and the last match.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.last_match = None;
    }
}

impl<F: Fingerprint> Recognizer for SlotMatcher<F> {
    fn name(&self) -> &'static str {
        F::NAME
    }

    fn is_ready(&self) -> bool {
        self.slots.is_complete()
    }

    fn observe(&mut self, reading: &Reading) -> Outcome {
        let slot = self.classify(reading);
        tracing::trace!(recognizer = F::NAME, ?slot, "classified");
        Outcome::Match { slot }
    }

    fn apply(
        &mut self,
        command: Command,
        reading: Option<&Reading>,
    ) -> Result<CommandAck, MagnetoError> {
        match command {
            Command::Store => self
                .store_current(need_reading(reading)?)
                .map(CommandAck::Stored),
            Command::SetThreshold(t) => {
                self.set_threshold(t);
                Ok(CommandAck::Applied)
            }
            Command::ClearCalibration => {
                self.clear();
                Ok(CommandAck::Applied)
            }
            other => Err(unsupported(F::NAME, other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(x: f32, y: f32, z: f32) -> Reading {
        Reading {
            low_pass: Sample::new(x, y, z),
            high_pass: Sample::ZERO,
        }
    }

    #[test]
    fn magnitude_band_is_inclusive() {
        let stored = Magnitude(50.0);
        assert!(stored.within(&Magnitude(51.83), 1.83));
        assert!(stored.within(&Magnitude(48.17), 1.83));
        assert!(!stored.within(&Magnitude(51.84), 1.83));
    }

    #[test]
    fn vector_band_is_exclusive() {
        let stored = FieldVector(Sample::new(10.0, 20.0, 30.0));
        assert!(stored.within(&FieldVector(Sample::new(11.99, 18.01, 30.0)), 2.0));
        assert!(!stored.within(&FieldVector(Sample::new(12.0, 20.0, 30.0)), 2.0));
        assert!(!stored.within(&FieldVector(Sample::new(10.0, 20.0, 27.5)), 2.0));
    }

    #[test]
    fn not_ready_classifies_nothing() {
        let mut m = Identification::new(2, 5.0);
        m.store_current(&at(3.0, 4.0, 0.0)).unwrap();
        assert!(!m.is_ready());
        assert_eq!(m.classify(&at(3.0, 4.0, 0.0)), None);
    }

    #[test]
    fn miss_keeps_last_match() {
        let mut m = Identification::new(1, 0.5);
        m.store_current(&at(3.0, 4.0, 0.0)).unwrap();
        assert_eq!(m.classify(&at(3.0, 4.0, 0.0)), Some(0));
        assert_eq!(m.classify(&at(30.0, 40.0, 0.0)), None);
        assert_eq!(m.last_match(), Some(0));
    }

    #[test]
    fn threshold_change_applies_without_recalibration() {
        let mut m = Identification::new(1, 0.1);
        m.store_current(&at(0.0, 0.0, 10.0)).unwrap();
        assert_eq!(m.classify(&at(0.0, 0.0, 11.0)), None);
        m.set_threshold(1.0);
        assert_eq!(m.classify(&at(0.0, 0.0, 11.0)), Some(0));
    }

    #[test]
    fn unsupported_commands_are_rejected() {
        let mut m = Position::new(1, 1.0);
        let err = m.apply(Command::SetNear, None).unwrap_err();
        assert_eq!(
            err,
            MagnetoError::UnsupportedCommand {
                recognizer: "position",
                command: "set_near"
            }
        );
        assert_eq!(m.apply(Command::Store, None), Err(MagnetoError::NoReading));
    }
}
