//! Distance and angle of a magnet circling the sensor.

use super::{Command, CommandAck, Outcome, Recognizer, need_reading, unsupported};
use crate::error::MagnetoError;
use crate::sample::Reading;

const NAME: &str = "radial_position";

/// Two references captured independently: `near` with the magnet touching
/// the sensor and `far` at its furthest point. After [`end_init`] the norm is
/// clamped into the reference range and mapped so that near is 0 and far
/// is 1. The angle needs no calibration.
///
/// [`end_init`]: RadialPosition::end_init
#[derive(Debug, Clone, Default)]
pub struct RadialPosition {
    near: Option<f32>,
    far: Option<f32>,
    ready: bool,
}

impl RadialPosition {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces any earlier near reference; the distance map follows at once.
    pub fn set_near(&mut self, reading: &Reading) {
        self.near = Some(reading.low_pass.norm());
        tracing::debug!(near = ?self.near, "radial near reference set");
    }

    pub fn set_far(&mut self, reading: &Reading) {
        self.far = Some(reading.low_pass.norm());
        tracing::debug!(far = ?self.far, "radial far reference set");
    }

    /// Finish calibration; both references must be present.
    pub fn end_init(&mut self) -> Result<(), MagnetoError> {
        if self.near.is_none() {
            return Err(MagnetoError::MissingReference("near"));
        }
        if self.far.is_none() {
            return Err(MagnetoError::MissingReference("far"));
        }
        if self.is_degenerate() {
            tracing::warn!(near = ?self.near, "radial references are equal; distance will be NaN");
        }
        self.ready = true;
        tracing::info!(near = ?self.near, far = ?self.far, "radial calibration complete");
        Ok(())
    }

    /// Near and far references hold the same magnitude.
    pub fn is_degenerate(&self) -> bool {
        matches!((self.near, self.far), (Some(n), Some(f)) if n == f)
    }

    /// `(clamp(n) - near) / (far - near)`, `None` until [`end_init`].
    ///
    /// [`end_init`]: RadialPosition::end_init
    pub fn distance(&self, reading: &Reading) -> Option<f32> {
        if !self.ready {
            return None;
        }
        let (near, far) = (self.near?, self.far?);
        let (lo, hi) = if near <= far { (near, far) } else { (far, near) };
        // Plain comparisons: NaN references fall through to a NaN result.
        let n = reading.low_pass.norm();
        let clamped = if n > hi {
            hi
        } else if n < lo {
            lo
        } else {
            n
        };
        Some((clamped - near) / (far - near))
    }

    /// Negated azimuth of the low-pass field, in [-180, 180).
    pub fn angle(reading: &Reading) -> f32 {
        let a = -reading.low_pass.azimuth();
        // normalise -0.0
        if a == 0.0 { 0.0 } else { a }
    }

    pub fn references(&self) -> (Option<f32>, Option<f32>) {
        (self.near, self.far)
    }
}

impl Recognizer for RadialPosition {
    fn name(&self) -> &'static str {
        NAME
    }

    fn is_ready(&self) -> bool {
        self.ready
    }

    fn observe(&mut self, reading: &Reading) -> Outcome {
        Outcome::Radial {
            distance: self.distance(reading),
            angle: Self::angle(reading),
        }
    }

    fn apply(
        &mut self,
        command: Command,
        reading: Option<&Reading>,
    ) -> Result<CommandAck, MagnetoError> {
        match command {
            Command::SetNear => self.set_near(need_reading(reading)?),
            Command::SetFar => self.set_far(need_reading(reading)?),
            Command::EndInit => self.end_init()?,
            other => return Err(unsupported(NAME, other)),
        }
        Ok(CommandAck::Applied)
    }
}
