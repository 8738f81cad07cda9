#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schemas and sample-stream CSV handling for magneto.
//!
//! - `Config` and sub-structs are deserialized from TOML and validated.
//! - Recorded streams are loaded from CSV with a strict header, and filtered
//!   readings can be rendered back to CSV for export.
use serde::Deserialize;

/// Upper bound on calibration slots for the matching recognizers.
pub const MAX_SLOTS: usize = 20;

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RecognizerKind {
    Identification,
    Position,
    LinearMotion,
    RadialPosition,
    RapidChanges,
    VirtualTap,
}

impl RecognizerKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::Identification => "identification",
            Self::Position => "position",
            Self::LinearMotion => "linear_motion",
            Self::RadialPosition => "radial_position",
            Self::RapidChanges => "rapid_changes",
            Self::VirtualTap => "virtual_tap",
        }
    }

    fn uses_slots(self) -> bool {
        matches!(self, Self::Identification | Self::Position)
    }
}

#[derive(Debug, Deserialize)]
pub struct RecognizerCfg {
    pub kind: RecognizerKind,
    /// Number of calibration slots (identification/position only).
    pub slots: Option<usize>,
    /// Tolerance band half-width (identification/position only).
    pub threshold: Option<f32>,
    /// Re-arm level on the high-pass norm (rapid_changes only).
    pub low_threshold: Option<f32>,
    /// Trigger level on the high-pass norm (rapid_changes only).
    pub high_threshold: Option<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SamplingCfg {
    /// Nominal sensor rate; paces simulated and sampler-driven runs.
    pub rate_hz: u32,
    /// Max wait for one sample before the read is treated as a timeout.
    pub sensor_timeout_ms: u64,
}

impl Default for SamplingCfg {
    fn default() -> Self {
        Self {
            rate_hz: 50,
            sensor_timeout_ms: 100,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    #[default]
    Direct,
    Sampler,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct RunnerCfg {
    /// "direct" reads the sensor inside the loop, "sampler" on a background thread.
    pub mode: RunMode,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ScriptCommand {
    Store,
    SetNear,
    SetFar,
    EndInit,
    Init,
    SetThreshold,
    SetLowThreshold,
    SetHighThreshold,
    ClearThresholds,
    ClearTapCounter,
    ClearCalibration,
}

impl ScriptCommand {
    pub fn needs_value(self) -> bool {
        matches!(
            self,
            Self::SetThreshold | Self::SetLowThreshold | Self::SetHighThreshold
        )
    }
}

/// One calibration command, fired right after sample number `at` (0-based)
/// has been observed.
#[derive(Debug, Deserialize, Clone, Copy)]
pub struct ScriptStep {
    pub at: u64,
    pub command: ScriptCommand,
    pub value: Option<f32>,
}

#[derive(Debug, Deserialize)]
pub struct Config {
    pub recognizer: RecognizerCfg,
    #[serde(default)]
    pub sampling: SamplingCfg,
    #[serde(default)]
    pub runner: RunnerCfg,
    #[serde(default)]
    pub logging: Logging,
    /// Calibration commands replayed against the stream, in order.
    #[serde(default)]
    pub script: Vec<ScriptStep>,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

fn check_threshold(name: &str, v: f32) -> eyre::Result<()> {
    if !v.is_finite() || v < 0.0 {
        eyre::bail!("{name} must be finite and >= 0");
    }
    Ok(())
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        let r = &self.recognizer;
        let kind = r.kind.name();

        // Recognizer
        if r.kind.uses_slots() {
            match r.slots {
                None => eyre::bail!("recognizer.slots is required for {kind}"),
                Some(0) => eyre::bail!("recognizer.slots must be >= 1"),
                Some(n) if n > MAX_SLOTS => {
                    eyre::bail!("recognizer.slots must be <= {MAX_SLOTS}, got {n}")
                }
                Some(_) => {}
            }
            match r.threshold {
                None => eyre::bail!("recognizer.threshold is required for {kind}"),
                Some(t) => check_threshold("recognizer.threshold", t)?,
            }
        } else if r.slots.is_some() || r.threshold.is_some() {
            eyre::bail!("recognizer.slots/threshold only apply to identification and position");
        }

        if r.kind == RecognizerKind::RapidChanges {
            if let Some(lo) = r.low_threshold {
                check_threshold("recognizer.low_threshold", lo)?;
            }
            if let Some(hi) = r.high_threshold {
                check_threshold("recognizer.high_threshold", hi)?;
            }
            match (r.low_threshold, r.high_threshold) {
                (Some(lo), Some(hi)) if hi <= lo => {
                    eyre::bail!("recognizer.high_threshold must be > low_threshold")
                }
                (Some(_), None) | (None, Some(_)) => {
                    eyre::bail!("recognizer.low_threshold and high_threshold must be set together")
                }
                _ => {}
            }
        } else if r.low_threshold.is_some() || r.high_threshold.is_some() {
            eyre::bail!("recognizer.low_threshold/high_threshold only apply to rapid_changes");
        }

        // Sampling
        if self.sampling.rate_hz == 0 {
            eyre::bail!("sampling.rate_hz must be > 0");
        }
        if self.sampling.sensor_timeout_ms == 0 {
            eyre::bail!("sampling.sensor_timeout_ms must be >= 1");
        }

        // Logging
        if let Some(rot) = self.logging.rotation.as_deref()
            && !matches!(rot, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never|daily|hourly, got {rot}");
        }

        // Script
        let mut prev_at = 0u64;
        for (idx, step) in self.script.iter().enumerate() {
            if step.at < prev_at {
                eyre::bail!(
                    "script step {idx}: `at` must be non-decreasing ({} after {prev_at})",
                    step.at
                );
            }
            prev_at = step.at;
            match (step.command.needs_value(), step.value) {
                (true, None) => eyre::bail!("script step {idx}: {:?} requires a value", step.command),
                (true, Some(v)) => check_threshold(&format!("script step {idx} value"), v)?,
                (false, Some(_)) => {
                    eyre::bail!("script step {idx}: {:?} takes no value", step.command)
                }
                (false, None) => {}
            }
        }

        Ok(())
    }
}

/// One raw sample from a recorded stream.
///
/// Expected headers:
/// x,y,z
///
/// The readings-export layout `x,y,z,norm` is accepted too; `norm` is
/// recomputed downstream and ignored here.
#[derive(Debug, Deserialize, Clone, Copy)]
pub struct SampleRow {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    #[serde(default)]
    pub norm: Option<f32>,
}

impl SampleRow {
    pub fn axes(&self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }
}

pub fn load_samples_csv(path: &std::path::Path) -> eyre::Result<Vec<SampleRow>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| eyre::eyre!("open samples CSV {:?}: {}", path, e))?;

    // Enforce exact headers
    let headers = rdr
        .headers()
        .map_err(|e| eyre::eyre!("read CSV headers {:?}: {}", path, e))?
        .clone();
    let actual: Vec<&str> = headers.iter().collect();
    if actual != ["x", "y", "z"] && actual != ["x", "y", "z", "norm"] {
        eyre::bail!(
            "samples CSV must have headers 'x,y,z' or 'x,y,z,norm', got: {}",
            actual.join(",")
        );
    }

    let mut rows = Vec::new();
    for (idx, rec) in rdr.deserialize::<SampleRow>().enumerate() {
        match rec {
            Ok(row) => {
                if !(row.x.is_finite() && row.y.is_finite() && row.z.is_finite()) {
                    eyre::bail!("non-finite sample in CSV row {}", idx + 2);
                }
                rows.push(row);
            }
            Err(e) => {
                eyre::bail!("invalid CSV row {}: {}", idx + 2, e);
            }
        }
    }
    Ok(rows)
}

/// A filtered reading as written by the export command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReadingRow {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub norm: f32,
}

/// Render readings as `x,y,z,norm` CSV bytes.
pub fn readings_to_csv(rows: &[ReadingRow]) -> eyre::Result<Vec<u8>> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(["x", "y", "z", "norm"])?;
    for r in rows {
        wtr.write_record([
            r.x.to_string(),
            r.y.to_string(),
            r.z.to_string(),
            r.norm.to_string(),
        ])?;
    }
    wtr.into_inner()
        .map_err(|e| eyre::eyre!("flush readings CSV: {}", e.error()))
}
