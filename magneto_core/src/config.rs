//! Runtime configuration types for the recognition core.
//!
//! These are what the builder and runner consume. They are separate from the
//! TOML-deserialized config in `magneto_config`; see `conversions`.

use crate::recognizer::Command;

/// Slots used by an identification matcher when nothing else is configured.
pub const DEFAULT_IDENTIFICATION_SLOTS: usize = 3;
/// Magnitude band half-width (µT) for identification.
pub const DEFAULT_IDENTIFICATION_THRESHOLD: f32 = 1.83;

/// Which recognizer to build, with its construction-time parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum RecognizerCfg {
    Identification { slots: usize, threshold: f32 },
    Position { slots: usize, threshold: f32 },
    LinearMotion,
    RadialPosition,
    /// Optional `(low, high)` pair; when present the detector starts ready.
    RapidChanges { thresholds: Option<(f32, f32)> },
    VirtualTap,
}

impl Default for RecognizerCfg {
    fn default() -> Self {
        Self::Identification {
            slots: DEFAULT_IDENTIFICATION_SLOTS,
            threshold: DEFAULT_IDENTIFICATION_THRESHOLD,
        }
    }
}

impl RecognizerCfg {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Identification { .. } => "identification",
            Self::Position { .. } => "position",
            Self::LinearMotion => "linear_motion",
            Self::RadialPosition => "radial_position",
            Self::RapidChanges { .. } => "rapid_changes",
            Self::VirtualTap => "virtual_tap",
        }
    }
}

/// Sensor pacing.
#[derive(Debug, Clone)]
pub struct SamplingCfg {
    /// Nominal sample rate; sets the sampler period.
    pub rate_hz: u32,
}

impl Default for SamplingCfg {
    fn default() -> Self {
        Self { rate_hz: 50 }
    }
}

/// Timeouts and watchdogs.
#[derive(Debug, Clone)]
pub struct Timeouts {
    /// Max sensor wait per read (ms).
    pub sensor_ms: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self { sensor_ms: 100 }
    }
}

/// A calibration command fired right after sample `at` (0-based) is observed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScriptStep {
    pub at: u64,
    pub command: Command,
}
