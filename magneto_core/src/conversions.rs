//! Bridges from `magneto_config` types to core types.
//!
//! The TOML layer keeps optional fields flat; here they become the typed
//! shapes the builder and runner need. Conversions that can fail return
//! `BuildError::InvalidConfig` wrapped in an `eyre::Report`.

use crate::config::{RecognizerCfg, SamplingCfg, ScriptStep, Timeouts};
use crate::error::BuildError;
use crate::recognizer::Command;
use crate::runner::RunMode;
use magneto_config::{RecognizerKind, ScriptCommand};

fn invalid(msg: &'static str) -> eyre::Report {
    eyre::Report::new(BuildError::InvalidConfig(msg))
}

// ── RecognizerCfg ────────────────────────────────────────────────────────────

impl TryFrom<&magneto_config::RecognizerCfg> for RecognizerCfg {
    type Error = eyre::Report;

    fn try_from(c: &magneto_config::RecognizerCfg) -> Result<Self, Self::Error> {
        let slotted = || -> Result<(usize, f32), eyre::Report> {
            let slots = c.slots.ok_or_else(|| invalid("slots is required"))?;
            let threshold = c.threshold.ok_or_else(|| invalid("threshold is required"))?;
            Ok((slots, threshold))
        };
        Ok(match c.kind {
            RecognizerKind::Identification => {
                let (slots, threshold) = slotted()?;
                Self::Identification { slots, threshold }
            }
            RecognizerKind::Position => {
                let (slots, threshold) = slotted()?;
                Self::Position { slots, threshold }
            }
            RecognizerKind::LinearMotion => Self::LinearMotion,
            RecognizerKind::RadialPosition => Self::RadialPosition,
            RecognizerKind::RapidChanges => Self::RapidChanges {
                thresholds: match (c.low_threshold, c.high_threshold) {
                    (Some(lo), Some(hi)) => Some((lo, hi)),
                    (None, None) => None,
                    _ => return Err(invalid("low_threshold and high_threshold go together")),
                },
            },
            RecognizerKind::VirtualTap => Self::VirtualTap,
        })
    }
}

// ── SamplingCfg / Timeouts ───────────────────────────────────────────────────

impl From<&magneto_config::SamplingCfg> for SamplingCfg {
    fn from(c: &magneto_config::SamplingCfg) -> Self {
        Self { rate_hz: c.rate_hz }
    }
}

impl From<&magneto_config::SamplingCfg> for Timeouts {
    fn from(c: &magneto_config::SamplingCfg) -> Self {
        Self {
            sensor_ms: c.sensor_timeout_ms,
        }
    }
}

// ── RunMode ──────────────────────────────────────────────────────────────────

impl From<magneto_config::RunMode> for RunMode {
    fn from(m: magneto_config::RunMode) -> Self {
        match m {
            magneto_config::RunMode::Direct => Self::Direct,
            magneto_config::RunMode::Sampler => Self::Sampler,
        }
    }
}

// ── ScriptStep ───────────────────────────────────────────────────────────────

impl TryFrom<&magneto_config::ScriptStep> for ScriptStep {
    type Error = eyre::Report;

    fn try_from(s: &magneto_config::ScriptStep) -> Result<Self, Self::Error> {
        let value = || s.value.ok_or_else(|| invalid("script command needs a value"));
        let command = match s.command {
            ScriptCommand::Store => Command::Store,
            ScriptCommand::SetNear => Command::SetNear,
            ScriptCommand::SetFar => Command::SetFar,
            ScriptCommand::EndInit => Command::EndInit,
            ScriptCommand::Init => Command::Init,
            ScriptCommand::SetThreshold => Command::SetThreshold(value()?),
            ScriptCommand::SetLowThreshold => Command::SetLowThreshold(value()?),
            ScriptCommand::SetHighThreshold => Command::SetHighThreshold(value()?),
            ScriptCommand::ClearThresholds => Command::ClearThresholds,
            ScriptCommand::ClearTapCounter => Command::ClearTapCounter,
            ScriptCommand::ClearCalibration => Command::ClearCalibration,
        };
        Ok(Self { at: s.at, command })
    }
}

/// Convert a whole script, preserving order.
pub fn script_from_config(
    steps: &[magneto_config::ScriptStep],
) -> crate::Result<Vec<ScriptStep>> {
    steps.iter().map(ScriptStep::try_from).collect()
}
