//! Position of a magnet moving along a line between two calibrated endpoints.

use super::{Command, CommandAck, Outcome, Recognizer, need_reading, unsupported};
use crate::error::MagnetoError;
use crate::sample::Reading;
use crate::slots::SlotStore;

const NAME: &str = "linear_motion";

/// Maps the field magnitude onto `|(n - a) / (b - a)|` where `a` and `b` are
/// the magnitudes stored at the two endpoints.
///
/// The result is not clamped: a magnet past either endpoint reports values
/// above 1. Equal endpoints make the ratio non-finite; see
/// [`LinearMotion::is_degenerate`].
#[derive(Debug, Clone)]
pub struct LinearMotion {
    endpoints: SlotStore<f32>,
}

impl Default for LinearMotion {
    fn default() -> Self {
        Self::new()
    }
}

impl LinearMotion {
    pub fn new() -> Self {
        Self {
            endpoints: SlotStore::new(2),
        }
    }

    /// Store the current magnitude as the next endpoint (A then B).
    pub fn store_current(&mut self, reading: &Reading) -> Result<usize, MagnetoError> {
        let idx = self.endpoints.store(reading.low_pass.norm())?;
        if self.is_degenerate() {
            tracing::warn!(
                endpoint = ?self.endpoints.get(0),
                "linear endpoints have equal magnitude; positions will be non-finite"
            );
        }
        Ok(idx)
    }

    pub fn position(&self, reading: &Reading) -> Option<f32> {
        match self.endpoints.slots() {
            &[a, b] => Some(((reading.low_pass.norm() - a) / (b - a)).abs()),
            _ => None,
        }
    }

    /// Both endpoints are stored with the same magnitude.
    pub fn is_degenerate(&self) -> bool {
        matches!(self.endpoints.slots(), &[a, b] if a == b)
    }

    pub fn endpoints(&self) -> &[f32] {
        self.endpoints.slots()
    }

    pub fn clear(&mut self) {
        self.endpoints.clear();
    }
}

impl Recognizer for LinearMotion {
    fn name(&self) -> &'static str {
        NAME
    }

    fn is_ready(&self) -> bool {
        self.endpoints.is_complete()
    }

    fn observe(&mut self, reading: &Reading) -> Outcome {
        Outcome::Position {
            position: self.position(reading),
        }
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
            Command::ClearCalibration => {
                self.clear();
                Ok(CommandAck::Applied)
            }
            other => Err(unsupported(NAME, other)),
        }
    }
}
