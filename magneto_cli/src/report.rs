//! Rendering of observations and run summaries, as text lines or JSON objects.

use magneto_core::{Observation, Outcome, RunSummary, StopReason};
use serde_json::{Value, json};

pub fn stop_reason_name(r: StopReason) -> &'static str {
    match r {
        StopReason::EndOfStream => "end_of_stream",
        StopReason::SampleLimit => "sample_limit",
        StopReason::Shutdown => "shutdown",
    }
}

/// One line for an observation worth reporting, `None` otherwise.
pub fn observation_line(obs: &Observation, json_mode: bool) -> Option<String> {
    if !obs.outcome.has_value() {
        return None;
    }
    Some(if json_mode {
        observation_json(obs).to_string()
    } else {
        observation_text(obs)
    })
}

fn observation_text(obs: &Observation) -> String {
    let idx = obs.index;
    match obs.outcome {
        Outcome::Match { slot } => format!("#{idx} match slot={}", opt(slot)),
        Outcome::Position { position } => format!("#{idx} position={}", opt(position)),
        Outcome::Radial { distance, angle } => {
            format!("#{idx} radial distance={} angle={angle}", opt(distance))
        }
        Outcome::RapidChange {
            count, magnitude, ..
        } => format!("#{idx} rapid_change count={count} magnitude={magnitude}"),
        Outcome::Flip { .. } => format!("#{idx} tap"),
    }
}

fn opt<T: std::fmt::Display>(v: Option<T>) -> String {
    v.map_or_else(|| "-".to_string(), |v| v.to_string())
}

fn observation_json(obs: &Observation) -> Value {
    let lp = obs.reading.low_pass;
    let mut v = match obs.outcome {
        Outcome::Match { slot } => json!({ "event": "match", "slot": slot }),
        Outcome::Position { position } => json!({ "event": "position", "position": position }),
        Outcome::Radial { distance, angle } => {
            json!({ "event": "radial", "distance": distance, "angle": angle })
        }
        Outcome::RapidChange {
            count, magnitude, ..
        } => json!({ "event": "rapid_change", "count": count, "magnitude": magnitude }),
        Outcome::Flip { .. } => json!({ "event": "tap" }),
    };
    v["index"] = json!(obs.index);
    v["low_pass"] = json!([lp.x, lp.y, lp.z]);
    v["ready"] = json!(obs.ready);
    v
}

pub fn summary_line(s: &RunSummary, json_mode: bool) -> String {
    if json_mode {
        json!({
            "summary": {
                "recognizer": s.recognizer,
                "samples": s.samples,
                "detections": s.detections,
                "commands_applied": s.commands_applied,
                "commands_rejected": s.commands_rejected,
                "ready": s.ready,
                "stop": stop_reason_name(s.stop),
            }
        })
        .to_string()
    } else {
        format!(
            "{}: {} samples, {} detections, commands {} applied / {} rejected, ready={}, stop={}",
            s.recognizer,
            s.samples,
            s.detections,
            s.commands_applied,
            s.commands_rejected,
            s.ready,
            stop_reason_name(s.stop)
        )
    }
}
