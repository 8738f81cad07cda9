//! Calibrate-then-classify recognizers.
//!
//! All recognizers consume the filtered [`Reading`] of each sample and share
//! one lifecycle: created unready, calibrated through [`Command`]s acting on
//! the current reading, then classifying every observation until dropped.
//! Before they are ready they report "no result" rather than failing.
//!
//! - [`SlotMatcher`]: first-match tolerance band over N stored fingerprints
//!   ([`Identification`] by magnitude, [`Position`] per axis).
//! - [`LinearMotion`]: two-endpoint interpolation.
//! - [`RadialPosition`]: near/far range map plus azimuth.
//! - [`RapidChanges`]: two-threshold hysteresis counter on the high-pass norm.
//! - [`VirtualTap`]: azimuth sign-flip detector.

pub mod linear;
pub mod matcher;
pub mod radial;
pub mod rapid;
pub mod tap;

pub use linear::LinearMotion;
pub use matcher::{FieldVector, Fingerprint, Identification, Magnitude, Position, SlotMatcher};
pub use radial::RadialPosition;
pub use rapid::RapidChanges;
pub use tap::VirtualTap;

use crate::error::MagnetoError;
use crate::sample::Reading;

/// Calibration commands a host can issue between observations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// Capture the current reading into the next calibration slot.
    Store,
    /// Capture the current norm as the "magnet touching the sensor" reference.
    SetNear,
    /// Capture the current norm as the "magnet far away" reference.
    SetFar,
    /// Finish an explicit initialisation step.
    EndInit,
    /// Capture the current azimuth as the sign reference.
    Init,
    SetThreshold(f32),
    SetLowThreshold(f32),
    SetHighThreshold(f32),
    ClearThresholds,
    ClearTapCounter,
    /// Forget every stored fingerprint.
    ClearCalibration,
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Store => "store",
            Self::SetNear => "set_near",
            Self::SetFar => "set_far",
            Self::EndInit => "end_init",
            Self::Init => "init",
            Self::SetThreshold(_) => "set_threshold",
            Self::SetLowThreshold(_) => "set_low_threshold",
            Self::SetHighThreshold(_) => "set_high_threshold",
            Self::ClearThresholds => "clear_thresholds",
            Self::ClearTapCounter => "clear_tap_counter",
            Self::ClearCalibration => "clear_calibration",
        }
    }
}

/// Result of a successfully applied [`Command`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandAck {
    /// A fingerprint went into this slot.
    Stored(usize),
    Applied,
}

/// Classification result for one observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Outcome {
    /// Slot whose fingerprint matched, first match wins.
    Match { slot: Option<usize> },
    /// Normalized position between the two calibrated endpoints, unclamped.
    Position { position: Option<f32> },
    /// Distance in [0, 1] once calibrated, angle in degrees always.
    Radial { distance: Option<f32>, angle: f32 },
    /// Whether this observation advanced the tap counter.
    RapidChange {
        detected: bool,
        count: u32,
        magnitude: f32,
    },
    /// Whether the azimuth sign flipped on this observation.
    Flip { detected: bool },
}

impl Outcome {
    /// A discrete event happened on this observation.
    pub fn is_detection(&self) -> bool {
        match self {
            Self::Match { slot } => slot.is_some(),
            Self::RapidChange { detected, .. } | Self::Flip { detected } => *detected,
            Self::Position { .. } | Self::Radial { .. } => false,
        }
    }

    /// The outcome carries something worth reporting: a detection or a
    /// continuous value.
    pub fn has_value(&self) -> bool {
        match self {
            Self::Position { position } => position.is_some(),
            Self::Radial { .. } => true,
            _ => self.is_detection(),
        }
    }
}

/// Shared shape of every recognizer.
pub trait Recognizer {
    /// Stable lowercase name used in logs and errors.
    fn name(&self) -> &'static str;

    /// Calibration is complete and observations classify.
    fn is_ready(&self) -> bool;

    /// Classify one filtered reading.
    fn observe(&mut self, reading: &Reading) -> Outcome;

    /// Apply a calibration command. `reading` is the latest filtered reading,
    /// needed by commands that capture a reference.
    fn apply(
        &mut self,
        command: Command,
        reading: Option<&Reading>,
    ) -> Result<CommandAck, MagnetoError>;
}

/// Boxed recognizer chosen at runtime.
pub type DynRecognizer = Box<dyn Recognizer + Send>;

impl<R: Recognizer + ?Sized> Recognizer for Box<R> {
    fn name(&self) -> &'static str {
        (**self).name()
    }
    fn is_ready(&self) -> bool {
        (**self).is_ready()
    }
    fn observe(&mut self, reading: &Reading) -> Outcome {
        (**self).observe(reading)
    }
    fn apply(
        &mut self,
        command: Command,
        reading: Option<&Reading>,
    ) -> Result<CommandAck, MagnetoError> {
        (**self).apply(command, reading)
    }
}

/// Reject a command the recognizer has no use for.
pub(crate) fn unsupported(recognizer: &'static str, command: Command) -> MagnetoError {
    MagnetoError::UnsupportedCommand {
        recognizer,
        command: command.name(),
    }
}

/// Commands that capture a reference need a reading to capture from.
pub(crate) fn need_reading(reading: Option<&Reading>) -> Result<&Reading, MagnetoError> {
    reading.ok_or(MagnetoError::NoReading)
}
