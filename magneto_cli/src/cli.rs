//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "magneto", version, about = "Magnetometer recognizer CLI")]
pub struct Cli {
    /// Path to config TOML (typed)
    #[arg(long, value_name = "FILE", default_value = "etc/magneto.toml")]
    pub config: PathBuf,

    /// Log and print as JSON lines instead of pretty
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace)
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info")]
    pub log_level: String,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Feed a recorded sample stream through the configured recognizer
    Replay {
        /// Samples CSV with header `x,y,z`
        #[arg(long, value_name = "FILE")]
        input: PathBuf,
        /// Stop after this many samples
        #[arg(long, value_name = "N")]
        max_samples: Option<u64>,
    },
    /// Write the filtered (low-pass) readings of a recorded stream as CSV
    Export {
        /// Samples CSV with header `x,y,z`
        #[arg(long, value_name = "FILE")]
        input: PathBuf,
        /// Destination CSV (`x,y,z,norm`), replaced atomically
        #[arg(long, value_name = "FILE")]
        output: PathBuf,
    },
    /// Run the configured recognizer against a simulated magnetometer
    Simulate {
        /// Stop after this many samples (default: run until Ctrl-C)
        #[arg(long, value_name = "N")]
        samples: Option<u64>,
    },
    /// Validate the config and build the recognizer
    SelfCheck,
}

/// JSON output requested for this process.
pub fn json_mode() -> bool {
    JSON_MODE.get().copied().unwrap_or(false)
}
