//! Type-state builder for `DynDriver` and the validated recognizer factory.
//!
//! The builder enforces at compile time that a recognizer is chosen before
//! `build()` is available. `try_build()` is always available for dynamic checks.

use std::marker::PhantomData;

use magneto_config::MAX_SLOTS;

use crate::config::RecognizerCfg;
use crate::driver::{DynDriver, StreamDriver};
use crate::error::{BuildError, Result};
use crate::recognizer::{
    DynRecognizer, Identification, LinearMotion, Position, RadialPosition, RapidChanges,
    Recognizer, VirtualTap,
};

// ── Type-state markers ───────────────────────────────────────────────────────

pub struct Missing;
pub struct Set;

enum Source {
    Cfg(RecognizerCfg),
    Custom(DynRecognizer),
}

/// Builder for `DynDriver`. Configuration is validated on `build()`.
pub struct DriverBuilder<R> {
    source: Option<Source>,
    _r: PhantomData<R>,
}

impl Default for DriverBuilder<Missing> {
    fn default() -> Self {
        Self {
            source: None,
            _r: PhantomData,
        }
    }
}

impl DriverBuilder<Missing> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build one of the stock recognizers from its configuration.
    pub fn with_recognizer(self, cfg: RecognizerCfg) -> DriverBuilder<Set> {
        DriverBuilder {
            source: Some(Source::Cfg(cfg)),
            _r: PhantomData,
        }
    }

    /// Drive a caller-provided recognizer; no configuration checks apply.
    pub fn with_custom(self, recognizer: impl Recognizer + Send + 'static) -> DriverBuilder<Set> {
        DriverBuilder {
            source: Some(Source::Custom(Box::new(recognizer))),
            _r: PhantomData,
        }
    }
}

impl<R> DriverBuilder<R> {
    /// Fallible build available in any type-state.
    pub fn try_build(self) -> Result<DynDriver> {
        let recognizer = match self.source {
            None => return Err(eyre::Report::new(BuildError::MissingRecognizer)),
            Some(Source::Cfg(cfg)) => build_recognizer(&cfg)?,
            Some(Source::Custom(r)) => r,
        };
        tracing::info!(recognizer = recognizer.name(), "driver built");
        Ok(StreamDriver::new(recognizer))
    }
}

impl DriverBuilder<Set> {
    /// Validate and build. Only available once a recognizer is chosen.
    pub fn build(self) -> Result<DynDriver> {
        self.try_build()
    }
}

fn check_threshold(v: f32, msg: &'static str) -> Result<()> {
    if !v.is_finite() || v.is_sign_negative() {
        return Err(eyre::Report::new(BuildError::InvalidConfig(msg)));
    }
    Ok(())
}

fn check_slots(slots: usize) -> Result<()> {
    if !(1..=MAX_SLOTS).contains(&slots) {
        return Err(eyre::Report::new(BuildError::InvalidConfig(
            "slots must be in 1..=20",
        )));
    }
    Ok(())
}

/// Validate construction-time parameters of a stock recognizer.
pub fn validate(cfg: &RecognizerCfg) -> Result<()> {
    match *cfg {
        RecognizerCfg::Identification { slots, threshold }
        | RecognizerCfg::Position { slots, threshold } => {
            check_slots(slots)?;
            check_threshold(threshold, "threshold must be finite and >= 0")?;
        }
        RecognizerCfg::RapidChanges {
            thresholds: Some((low, high)),
        } => {
            if !low.is_finite() || !high.is_finite() {
                return Err(eyre::Report::new(BuildError::InvalidConfig(
                    "rapid-change thresholds must be finite",
                )));
            }
            if high <= low {
                tracing::warn!(low, high, "high threshold not above low; hysteresis band is empty");
            }
        }
        RecognizerCfg::LinearMotion
        | RecognizerCfg::RadialPosition
        | RecognizerCfg::RapidChanges { thresholds: None }
        | RecognizerCfg::VirtualTap => {}
    }
    Ok(())
}

/// Validate `cfg` and box the recognizer it describes.
pub fn build_recognizer(cfg: &RecognizerCfg) -> Result<DynRecognizer> {
    validate(cfg)?;
    Ok(match *cfg {
        RecognizerCfg::Identification { slots, threshold } => {
            Box::new(Identification::new(slots, threshold))
        }
        RecognizerCfg::Position { slots, threshold } => Box::new(Position::new(slots, threshold)),
        RecognizerCfg::LinearMotion => Box::new(LinearMotion::new()),
        RecognizerCfg::RadialPosition => Box::new(RadialPosition::new()),
        RecognizerCfg::RapidChanges { thresholds } => Box::new(match thresholds {
            Some((low, high)) => RapidChanges::with_thresholds(low, high),
            None => RapidChanges::new(),
        }),
        RecognizerCfg::VirtualTap => Box::new(VirtualTap::new()),
    })
}

/// Generic, statically-dispatched driver over a concrete recognizer.
pub fn build_driver<R: Recognizer>(recognizer: R) -> StreamDriver<R> {
    StreamDriver::new(recognizer)
}
