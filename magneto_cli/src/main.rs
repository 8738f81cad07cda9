#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! `magneto`: replay, export, simulate and self-check over the recognizer core.

mod cli;
mod error_fmt;
mod replay;
mod report;
mod sim;

use clap::Parser;
use cli::{Cli, Commands, FILE_GUARD, JSON_MODE, json_mode};
use error_fmt::{exit_code_for_error, format_error_json, humanize};
use eyre::WrapErr;
use magneto_config::{Config, Logging};
use magneto_core::Recognizer;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);
    if let Err(e) = color_eyre::install() {
        eprintln!("warning: could not install error report handler: {e}");
    }

    let code = match run(cli) {
        Ok(()) => 0,
        Err(err) => {
            tracing::error!(error = %err, "command failed");
            if json_mode() {
                println!("{}", format_error_json(&err));
            } else {
                eprintln!("{}", humanize(&err));
            }
            exit_code_for_error(&err)
        }
    };
    std::process::exit(code);
}

fn run(cli: Cli) -> eyre::Result<()> {
    let cfg = load_config(&cli.config)?;
    init_tracing(cli.json, &cli.log_level, &cfg.logging)?;
    tracing::debug!(config = %cli.config.display(), "config loaded");

    let shutdown = Arc::new(AtomicBool::new(false));
    match cli.cmd {
        Commands::Replay { input, max_samples } => {
            replay::run_replay(&cfg, &input, max_samples, &shutdown, cli.json)?;
        }
        Commands::Export { input, output } => {
            replay::run_export(&input, &output, cli.json)?;
        }
        Commands::Simulate { samples } => {
            sim::run_simulate(&cfg, samples, &shutdown, cli.json)?;
        }
        Commands::SelfCheck => self_check(&cfg, cli.json)?,
    }
    Ok(())
}

fn load_config(path: &Path) -> eyre::Result<Config> {
    let text = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("read config {}", path.display()))?;
    let cfg = magneto_config::load_toml(&text)
        .wrap_err_with(|| format!("parse config {}", path.display()))?;
    cfg.validate().wrap_err("invalid configuration")?;
    Ok(cfg)
}

fn self_check(cfg: &Config, json: bool) -> eyre::Result<()> {
    let params = replay::run_params(cfg, None)?;
    let recognizer = magneto_core::build_recognizer(&params.recognizer)?;
    tracing::info!(
        recognizer = recognizer.name(),
        script_steps = params.script.len(),
        "self-check passed"
    );
    if json {
        println!(
            "{}",
            serde_json::json!({ "status": "ok", "recognizer": recognizer.name() })
        );
    } else {
        println!("ok");
    }
    Ok(())
}

/// Console layer (pretty or JSON, on stderr) plus an optional JSON-lines
/// file sink from `[logging]`. `RUST_LOG` overrides `--log-level`.
fn init_tracing(json: bool, level: &str, logging: &Logging) -> eyre::Result<()> {
    let console_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .wrap_err_with(|| format!("invalid log level {level:?}"))?;
    let console = if json {
        fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_filter(console_filter)
            .boxed()
    } else {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_filter(console_filter)
            .boxed()
    };

    let file = match logging.file.as_deref() {
        Some(path) => {
            let path = Path::new(path);
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let name = path
                .file_name()
                .ok_or_else(|| eyre::eyre!("logging.file has no file name: {}", path.display()))?;
            let appender = match logging.rotation.as_deref() {
                Some("daily") => tracing_appender::rolling::daily(dir, name),
                Some("hourly") => tracing_appender::rolling::hourly(dir, name),
                _ => tracing_appender::rolling::never(dir, name),
            };
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let _ = FILE_GUARD.set(guard);
            let file_level = logging.level.as_deref().unwrap_or("info");
            let file_filter = EnvFilter::try_new(file_level)
                .wrap_err_with(|| format!("invalid logging.level {file_level:?}"))?;
            Some(
                fmt::layer()
                    .json()
                    .with_ansi(false)
                    .with_writer(writer)
                    .with_filter(file_filter)
                    .boxed(),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(console)
        .with(file)
        .try_init()
        .map_err(|e| eyre::eyre!("init tracing: {e}"))
}
