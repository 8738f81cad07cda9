//! Human-readable error descriptions and structured JSON error formatting.

use magneto_core::{BuildError, MagnetoError};

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    // Typed matches first
    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::MissingRecognizer => {
                "What happened: No recognizer was configured for the stream driver.\nLikely causes: The builder was used without with_recognizer(...).\nHow to fix: Set [recognizer] kind in the config, or pass a recognizer to the builder.".to_string()
            }
            BuildError::InvalidConfig(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Missing or out-of-range values in the TOML.\nHow to fix: Edit the config file, then rerun `magneto self-check`."
            ),
        };
    }

    if let Some(me) = err.downcast_ref::<MagnetoError>() {
        return match me {
            MagnetoError::Timeout => "What happened: Magnetometer read timed out.\nLikely causes: The sensor stopped delivering samples, or the timeout is too low for the sampling rate.\nHow to fix: Check the sensor source and consider increasing sampling.sensor_timeout_ms in the config.".to_string(),
            MagnetoError::Sensor(msg) => format!(
                "What happened: The magnetometer reported an error ({msg}).\nLikely causes: The sensor source failed or returned malformed data.\nHow to fix: Check the sensor source, then rerun with --log-level=debug for details."
            ),
            MagnetoError::UnsupportedCommand { recognizer, command } => format!(
                "What happened: The script sent `{command}` to the {recognizer} recognizer, which does not support it.\nLikely causes: A [[script]] step written for a different recognizer kind.\nHow to fix: Remove the step or change recognizer.kind in the config."
            ),
            other => format!(
                "What happened: {other}.\nLikely causes: See logs.\nHow to fix: Re-run with --log-level=debug or set RUST_LOG for more detail."
            ),
        };
    }

    // String-based heuristics for errors coming from init or config
    let msg = err.to_string();
    let lower = chain_text(err).to_ascii_lowercase();

    if lower.contains("samples csv must have headers") {
        return "Invalid headers in samples CSV. Expected 'x,y,z' (or 'x,y,z,norm').".to_string();
    }

    if lower.contains("samples csv") || lower.contains("csv row") {
        return format!(
            "What happened: The samples CSV could not be read ({}).\nLikely causes: Wrong path, a non-numeric cell, or a truncated row.\nHow to fix: Check the file; every row needs finite x,y,z values.",
            chain_text(err)
        );
    }

    if lower.contains("read config") || lower.contains("parse config") {
        return format!(
            "What happened: The config file could not be loaded ({}).\nLikely causes: Wrong --config path or a TOML syntax error.\nHow to fix: Pass --config with a valid TOML file; see etc/magneto.toml for a sample.",
            chain_text(err)
        );
    }

    if lower.contains("invalid configuration") {
        return format!(
            "What happened: Configuration is invalid ({}).\nLikely causes: Out-of-range slots or thresholds, or options that do not apply to the chosen recognizer.\nHow to fix: Edit the TOML config and try again.",
            chain_text(err)
        );
    }

    // Generic fallback
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Every message of the chain, outermost first.
fn chain_text(err: &eyre::Report) -> String {
    err.chain()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(": ")
}

/// Stable exit codes per error kind; anything else returns 1.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    if let Some(me) = err.downcast_ref::<MagnetoError>() {
        return match me {
            MagnetoError::Timeout => 3,
            MagnetoError::Sensor(_) => 4,
            MagnetoError::UnsupportedCommand { .. } => 5,
            _ => 1,
        };
    }
    if err.downcast_ref::<BuildError>().is_some() {
        return 6;
    }
    1
}

/// Short stable name for the JSON `reason` field.
pub fn reason_name(err: &eyre::Report) -> &'static str {
    if let Some(me) = err.downcast_ref::<MagnetoError>() {
        return match me {
            MagnetoError::Timeout => "Timeout",
            MagnetoError::Sensor(_) => "Sensor",
            MagnetoError::UnsupportedCommand { .. } => "UnsupportedCommand",
            MagnetoError::SlotStoreFull { .. } => "SlotStoreFull",
            MagnetoError::MissingReference(_) => "MissingReference",
            MagnetoError::NoReading => "NoReading",
        };
    }
    if err.downcast_ref::<BuildError>().is_some() {
        return "InvalidConfig";
    }
    "Error"
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    use serde_json::json;
    json!({ "reason": reason_name(err), "message": humanize(err) }).to_string()
}
