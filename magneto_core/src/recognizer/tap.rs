//! Azimuth sign-flip ("virtual tap") detector.

use super::{Command, CommandAck, Outcome, Recognizer, need_reading, unsupported};
use crate::error::MagnetoError;
use crate::sample::Reading;

const NAME: &str = "virtual_tap";

/// Reports a tap whenever the integer part of the azimuth changes sign
/// relative to the stored reference, then adopts the new azimuth as the
/// reference. Truncation toward zero means azimuths in (-1, 1) count as
/// non-negative.
#[derive(Debug, Clone, Default)]
pub struct VirtualTap {
    reference: Option<f32>,
}

impl VirtualTap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture the current azimuth as the reference and start detecting.
    pub fn init(&mut self, reading: &Reading) {
        let azimuth = reading.low_pass.azimuth();
        self.reference = Some(azimuth);
        tracing::debug!(azimuth, "tap reference set");
    }

    pub fn tap_detected(&mut self, reading: &Reading) -> bool {
        self.observe_azimuth(reading.low_pass.azimuth())
    }

    #[allow(clippy::cast_possible_truncation)]
    pub fn observe_azimuth(&mut self, azimuth: f32) -> bool {
        let Some(stored) = self.reference else {
            return false;
        };
        if ((stored as i32) ^ (azimuth as i32)) < 0 {
            self.reference = Some(azimuth);
            true
        } else {
            false
        }
    }

    pub fn reference(&self) -> Option<f32> {
        self.reference
    }
}

impl Recognizer for VirtualTap {
    fn name(&self) -> &'static str {
        NAME
    }

    fn is_ready(&self) -> bool {
        self.reference.is_some()
    }

    fn observe(&mut self, reading: &Reading) -> Outcome {
        Outcome::Flip {
            detected: self.tap_detected(reading),
        }
    }

    fn apply(
        &mut self,
        command: Command,
        reading: Option<&Reading>,
    ) -> Result<CommandAck, MagnetoError> {
        match command {
            Command::Init => {
                self.init(need_reading(reading)?);
                Ok(CommandAck::Applied)
            }
            other => Err(unsupported(NAME, other)),
        }
    }
}
