//! `replay` and `export`: recorded streams through the core.

use crate::report::{observation_line, summary_line};
use eyre::WrapErr;
use magneto_config::{Config, ReadingRow, SampleRow};
use magneto_core::conversions::script_from_config;
use magneto_core::{
    RecognizerCfg, ReplayMagnetometer, RunParams, RunSummary, Sample, WindowFilter,
};
use std::path::Path;
use std::sync::atomic::AtomicBool;

/// Map the typed config onto core run parameters.
pub fn run_params(cfg: &Config, max_samples: Option<u64>) -> eyre::Result<RunParams> {
    Ok(RunParams {
        recognizer: RecognizerCfg::try_from(&cfg.recognizer)?,
        sampling: (&cfg.sampling).into(),
        timeouts: (&cfg.sampling).into(),
        mode: cfg.runner.mode.into(),
        script: script_from_config(&cfg.script)?,
        max_samples,
    })
}

pub fn load_samples(input: &Path) -> eyre::Result<Vec<SampleRow>> {
    let rows = magneto_config::load_samples_csv(input)
        .wrap_err_with(|| format!("load samples CSV {}", input.display()))?;
    tracing::info!(path = %input.display(), rows = rows.len(), "samples loaded");
    Ok(rows)
}

pub fn run_replay(
    cfg: &Config,
    input: &Path,
    max_samples: Option<u64>,
    shutdown: &AtomicBool,
    json_mode: bool,
) -> eyre::Result<RunSummary> {
    let params = run_params(cfg, max_samples)?;
    let rows = load_samples(input)?;
    let sensor = ReplayMagnetometer::from_rows(&rows);

    let summary = magneto_core::runner::run(sensor, &params, shutdown, |obs| {
        if let Some(line) = observation_line(obs, json_mode) {
            println!("{line}");
        }
    })?;
    println!("{}", summary_line(&summary, json_mode));
    Ok(summary)
}

/// Low-pass readings of `rows`, one per sample.
pub fn filtered_readings(rows: &[SampleRow]) -> Vec<ReadingRow> {
    let mut filter = WindowFilter::new();
    rows.iter()
        .map(|row| {
            let lp = filter.update(Sample::from(row.axes())).low_pass;
            ReadingRow {
                x: lp.x,
                y: lp.y,
                z: lp.z,
                norm: lp.norm(),
            }
        })
        .collect()
}

pub fn run_export(input: &Path, output: &Path, json_mode: bool) -> eyre::Result<usize> {
    let rows = load_samples(input)?;
    let readings = filtered_readings(&rows);
    let bytes = magneto_config::readings_to_csv(&readings)?;
    write_atomic(output, &bytes)
        .wrap_err_with(|| format!("write readings CSV {}", output.display()))?;
    tracing::info!(path = %output.display(), rows = readings.len(), "readings exported");

    if json_mode {
        println!(
            "{}",
            serde_json::json!({ "exported": readings.len(), "output": output.display().to_string() })
        );
    } else {
        println!("wrote {} readings to {}", readings.len(), output.display());
    }
    Ok(readings.len())
}

/// Replace `path` with `bytes` via a sibling temp file and a rename.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    use std::io::Write;
    let tmp = path.with_extension("new");
    {
        let mut f = std::fs::File::create(&tmp)?;
        f.write_all(bytes)?;
        f.sync_all()?;
    }
    std::fs::rename(tmp, path)
}
