#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Magnetometer signal conditioning and calibrated pattern recognition.
//!
//! The crate turns a noisy 3-axis field stream into a stabilized signal and
//! discrete events. It never touches sensor hardware; hosts hand samples in
//! directly or through the `magneto_traits::Magnetometer` seam.
//!
//! ## Architecture
//!
//! - **Filtering**: 10-sample moving average per axis with a high-pass
//!   residual (`filter`)
//! - **Metrics**: norm and azimuth rounded to hundredths (`metrics`)
//! - **Calibration**: fixed-capacity fingerprint slots (`slots`)
//! - **Recognition**: six calibrate-then-classify recognizers (`recognizer`)
//! - **Driving**: per-sample pipeline, builder and runner (`driver`,
//!   `builder`, `runner`, `sampler`)
//!
//! ## Rounding
//!
//! Every value a recognizer compares is rounded to 2 decimals, halves up.
//! Running sums stay unrounded in `f64` so long streams don't drift.

pub mod builder;
pub mod config;
pub mod conversions;
pub mod driver;
pub mod error;
pub mod filter;
pub mod metrics;
pub mod mocks;
pub mod recognizer;
pub mod replay;
pub mod runner;
pub mod sample;
pub mod sampler;
pub mod sensor_error;
pub mod slots;
pub mod util;

pub use builder::{DriverBuilder, build_driver, build_recognizer};
pub use config::{RecognizerCfg, SamplingCfg, ScriptStep, Timeouts};
pub use driver::{DynDriver, Observation, StreamDriver};
pub use error::{BuildError, MagnetoError, Result};
pub use filter::{WINDOW, WindowFilter};
pub use recognizer::{
    Command, CommandAck, DynRecognizer, FieldVector, Fingerprint, Identification, LinearMotion,
    Magnitude, Outcome, Position, RadialPosition, RapidChanges, Recognizer, SlotMatcher,
    VirtualTap,
};
pub use replay::ReplayMagnetometer;
pub use runner::{RunMode, RunParams, RunSummary, StopReason};
pub use sample::{Reading, Sample};
pub use slots::SlotStore;
