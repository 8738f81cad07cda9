//! Stream adapter: raw samples in, observations out, in sample order.
//!
//! A `StreamDriver` owns one `WindowFilter` and one recognizer. It is the
//! single writer for both; hosts delivering samples from several threads
//! must serialize calls themselves (see `sampler`).

use crate::error::MagnetoError;
use crate::filter::WindowFilter;
use crate::recognizer::{Command, CommandAck, DynRecognizer, Outcome, Recognizer};
use crate::sample::{Reading, Sample};
use std::fmt;

/// Everything produced for one raw sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    /// 0-based position of the sample in the stream.
    pub index: u64,
    pub reading: Reading,
    pub outcome: Outcome,
    /// Recognizer readiness after this observation.
    pub ready: bool,
}

pub struct StreamDriver<R> {
    filter: WindowFilter,
    recognizer: R,
    last: Option<Reading>,
    seen: u64,
}

// Boxed recognizers are not `Debug`; show what identifies the driver instead.
impl<R: Recognizer> fmt::Debug for StreamDriver<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamDriver")
            .field("recognizer", &self.recognizer.name())
            .field("ready", &self.recognizer.is_ready())
            .field("last", &self.last)
            .field("seen", &self.seen)
            .finish_non_exhaustive()
    }
}

/// Driver over a recognizer chosen at runtime.
pub type DynDriver = StreamDriver<DynRecognizer>;

impl<R: Recognizer> StreamDriver<R> {
    pub fn new(recognizer: R) -> Self {
        Self {
            filter: WindowFilter::new(),
            recognizer,
            last: None,
            seen: 0,
        }
    }

    /// Filter one raw sample and classify it.
    pub fn observe(&mut self, raw: Sample) -> Observation {
        let reading = self.filter.update(raw);
        let outcome = self.recognizer.observe(&reading);
        let obs = Observation {
            index: self.seen,
            reading,
            outcome,
            ready: self.recognizer.is_ready(),
        };
        self.last = Some(reading);
        self.seen += 1;
        obs
    }

    /// Lazily observe a sequence of samples. Observations are produced as
    /// the iterator is advanced; dropping it early leaves the driver at the
    /// last consumed sample.
    pub fn observe_all<I>(&mut self, samples: I) -> impl Iterator<Item = Observation>
    where
        I: IntoIterator<Item = Sample>,
    {
        samples.into_iter().map(move |s| self.observe(s))
    }

    /// Apply a calibration command against the most recent reading.
    pub fn command(&mut self, command: Command) -> Result<CommandAck, MagnetoError> {
        let res = self.recognizer.apply(command, self.last.as_ref());
        match &res {
            Ok(ack) => tracing::debug!(
                recognizer = self.recognizer.name(),
                command = command.name(),
                ?ack,
                sample = self.seen,
                "command applied"
            ),
            Err(e) => tracing::warn!(
                recognizer = self.recognizer.name(),
                command = command.name(),
                error = %e,
                "command rejected"
            ),
        }
        res
    }

    // ── Calibration shorthands ───────────────────────────────────────────────

    pub fn store_reference(&mut self) -> Result<CommandAck, MagnetoError> {
        self.command(Command::Store)
    }
    pub fn set_near(&mut self) -> Result<CommandAck, MagnetoError> {
        self.command(Command::SetNear)
    }
    pub fn set_far(&mut self) -> Result<CommandAck, MagnetoError> {
        self.command(Command::SetFar)
    }
    pub fn end_init(&mut self) -> Result<CommandAck, MagnetoError> {
        self.command(Command::EndInit)
    }
    pub fn init(&mut self) -> Result<CommandAck, MagnetoError> {
        self.command(Command::Init)
    }
    pub fn set_threshold(&mut self, v: f32) -> Result<CommandAck, MagnetoError> {
        self.command(Command::SetThreshold(v))
    }
    pub fn set_low_threshold(&mut self, v: f32) -> Result<CommandAck, MagnetoError> {
        self.command(Command::SetLowThreshold(v))
    }
    pub fn set_high_threshold(&mut self, v: f32) -> Result<CommandAck, MagnetoError> {
        self.command(Command::SetHighThreshold(v))
    }
    pub fn clear_thresholds(&mut self) -> Result<CommandAck, MagnetoError> {
        self.command(Command::ClearThresholds)
    }
    pub fn clear_tap_counter(&mut self) -> Result<CommandAck, MagnetoError> {
        self.command(Command::ClearTapCounter)
    }

    // ── Accessors ────────────────────────────────────────────────────────────

    pub fn is_ready(&self) -> bool {
        self.recognizer.is_ready()
    }

    pub fn last_reading(&self) -> Option<&Reading> {
        self.last.as_ref()
    }

    /// Samples observed so far.
    pub fn samples_seen(&self) -> u64 {
        self.seen
    }

    pub fn recognizer(&self) -> &R {
        &self.recognizer
    }

    pub fn recognizer_mut(&mut self) -> &mut R {
        &mut self.recognizer
    }

    pub fn into_recognizer(self) -> R {
        self.recognizer
    }
}
