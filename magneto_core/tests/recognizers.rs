use magneto_core::{
    Command, CommandAck, Identification, LinearMotion, MagnetoError, Outcome, Position,
    RadialPosition, RapidChanges, Reading, Recognizer, Sample, VirtualTap,
};
use rstest::rstest;

fn low(x: f32, y: f32, z: f32) -> Reading {
    Reading {
        low_pass: Sample::new(x, y, z),
        high_pass: Sample::ZERO,
    }
}

/// Reading whose low-pass field has the given azimuth (degrees).
fn heading(deg: f32) -> Reading {
    let r = deg.to_radians();
    low(50.0 * r.cos(), 50.0 * r.sin(), 0.0)
}

// ── Identification / Position ────────────────────────────────────────────────

#[rstest]
#[case::exact_first(50.0, Some(0))]
#[case::exact_second(52.0, Some(1))]
#[case::overlap_prefers_lower_index(51.0, Some(0))]
#[case::upper_edge_of_second(53.83, Some(1))]
#[case::outside_both(54.0, None)]
fn identification_first_match_wins(#[case] magnitude: f32, #[case] expected: Option<usize>) {
    let mut id = Identification::new(2, 1.83);
    assert_eq!(id.store_current(&low(0.0, 0.0, 50.0)), Ok(0));
    assert_eq!(id.store_current(&low(0.0, 0.0, 52.0)), Ok(1));
    assert!(id.is_ready());
    assert_eq!(id.classify(&low(0.0, 0.0, magnitude)), expected);
}

#[test]
fn identification_store_after_ready_reports_full() {
    let mut id = Identification::new(1, 1.0);
    id.apply(Command::Store, Some(&low(1.0, 0.0, 0.0))).unwrap();
    let err = id.apply(Command::Store, Some(&low(9.0, 0.0, 0.0))).unwrap_err();
    assert_eq!(err, MagnetoError::SlotStoreFull { capacity: 1 });
    assert_eq!(id.slots().slots().len(), 1);
}

#[test]
fn position_matches_per_axis_not_by_magnitude() {
    let mut pos = Position::new(2, 2.0);
    pos.store_current(&low(30.0, 0.0, 0.0)).unwrap();
    pos.store_current(&low(0.0, 30.0, 0.0)).unwrap();
    // same magnitude as both fingerprints, different direction
    assert_eq!(pos.classify(&low(0.0, 0.0, 30.0)), None);
    assert_eq!(pos.classify(&low(1.0, 29.0, 0.5)), Some(1));
    assert_eq!(pos.classify(&low(31.5, -1.5, 1.9)), Some(0));
    assert_eq!(pos.last_match(), Some(0));
}

#[rstest]
#[case::exact_first(10.0, Some(0))]
#[case::overlap_prefers_lower_index(11.0, Some(0))]
#[case::only_second_in_band(12.5, Some(1))]
#[case::band_edge_is_exclusive(13.0, None)]
fn position_first_match_wins(#[case] x: f32, #[case] expected: Option<usize>) {
    let mut pos = Position::new(2, 2.0);
    assert_eq!(pos.store_current(&low(10.0, 0.0, 0.0)), Ok(0));
    assert_eq!(pos.store_current(&low(11.0, 0.0, 0.0)), Ok(1));
    assert_eq!(pos.classify(&low(x, 0.0, 0.0)), expected);
    assert_eq!(pos.classify(&low(x, 1.5, -1.5)), expected);
}

#[test]
fn clear_calibration_returns_matcher_to_unready() {
    let mut id = Identification::new(1, 1.0);
    id.store_current(&low(0.0, 0.0, 5.0)).unwrap();
    assert_eq!(
        id.apply(Command::ClearCalibration, None),
        Ok(CommandAck::Applied)
    );
    assert!(!id.is_ready());
    assert_eq!(id.last_match(), None);
}

// ── LinearMotion ─────────────────────────────────────────────────────────────

#[rstest]
#[case(10.0, 40.0)]
#[case(75.5, 12.25)]
#[case(0.0, 3.0)]
fn linear_endpoints_map_to_zero_and_one(#[case] a: f32, #[case] b: f32) {
    let mut lin = LinearMotion::new();
    lin.store_current(&low(0.0, 0.0, a)).unwrap();
    assert!(!lin.is_ready());
    lin.store_current(&low(0.0, 0.0, b)).unwrap();
    assert_eq!(lin.position(&low(0.0, 0.0, a)), Some(0.0));
    assert_eq!(lin.position(&low(0.0, 0.0, b)), Some(1.0));
}

#[test]
fn linear_observe_before_calibration_has_no_position() {
    let mut lin = LinearMotion::new();
    assert_eq!(
        lin.observe(&low(1.0, 1.0, 1.0)),
        Outcome::Position { position: None }
    );
}

// ── RadialPosition ───────────────────────────────────────────────────────────

#[test]
fn radial_angle_needs_no_calibration_but_distance_does() {
    let mut rad = RadialPosition::new();
    match rad.observe(&heading(30.0)) {
        Outcome::Radial { distance, angle } => {
            assert_eq!(distance, None);
            assert_eq!(angle, -30.0);
        }
        other => panic!("unexpected outcome {other:?}"),
    }
}

#[test]
fn radial_references_can_be_set_in_any_order() {
    let mut rad = RadialPosition::new();
    rad.apply(Command::SetFar, Some(&low(10.0, 0.0, 0.0))).unwrap();
    rad.apply(Command::SetNear, Some(&low(90.0, 0.0, 0.0))).unwrap();
    assert!(!rad.is_ready(), "ready only after end_init");
    rad.apply(Command::EndInit, None).unwrap();
    assert_eq!(rad.distance(&low(30.0, 0.0, 0.0)), Some(0.75));
}

// ── RapidChanges ─────────────────────────────────────────────────────────────

#[rstest]
#[case(2.0, 10.0)]
#[case(0.0, 0.5)]
#[case(15.0, 40.0)]
fn rapid_changes_counts_two_taps(#[case] lo: f32, #[case] hi: f32) {
    let mut rc = RapidChanges::new();
    for cmd in [
        Command::SetLowThreshold(lo),
        Command::SetHighThreshold(hi),
        Command::EndInit,
    ] {
        rc.apply(cmd, None).unwrap();
    }
    let detected: Vec<bool> = [0.0, hi + 1.0, hi + 1.0, lo - 1.0, hi + 1.0]
        .into_iter()
        .map(|m| rc.observe_magnitude(m))
        .collect();
    assert_eq!(detected, [false, true, false, false, true]);
    assert_eq!(rc.count(), 2);
}

#[test]
fn rapid_changes_clears_are_orthogonal() {
    let mut rc = RapidChanges::with_thresholds(1.0, 5.0);
    rc.observe_magnitude(9.0);
    rc.apply(Command::ClearThresholds, None).unwrap();
    assert_eq!(rc.count(), 1, "clearing thresholds keeps the counter");
    assert!(!rc.is_ready());
    rc.apply(Command::ClearTapCounter, None).unwrap();
    assert_eq!(rc.count(), 0);
    assert_eq!(rc.thresholds(), (0.0, 0.0));
}

#[test]
fn rapid_changes_observes_high_pass_norm() {
    let mut rc = RapidChanges::with_thresholds(1.0, 5.0);
    let spike = Reading {
        low_pass: Sample::ZERO,
        high_pass: Sample::new(3.0, 4.0, 1.0),
    };
    match rc.observe(&spike) {
        Outcome::RapidChange {
            detected,
            count,
            magnitude,
        } => {
            assert!(detected);
            assert_eq!(count, 1);
            assert_eq!(magnitude, 5.1);
        }
        other => panic!("unexpected outcome {other:?}"),
    }
}

// ── VirtualTap ───────────────────────────────────────────────────────────────

#[test]
fn virtual_tap_flags_sign_changes_only() {
    let mut tap = VirtualTap::new();
    tap.apply(Command::Init, Some(&heading(10.0))).unwrap();
    let hits: Vec<usize> = [10.0, 10.0, -10.0, -10.0, 10.0]
        .into_iter()
        .enumerate()
        .filter_map(|(i, deg)| tap.tap_detected(&heading(deg)).then_some(i))
        .collect();
    assert_eq!(hits, [2, 4]);
}

#[test]
fn virtual_tap_is_silent_until_init() {
    let mut tap = VirtualTap::new();
    assert!(!tap.is_ready());
    assert_eq!(
        tap.observe(&heading(-90.0)),
        Outcome::Flip { detected: false }
    );
}

#[rstest]
#[case::tap_has_no_slots(Command::Store)]
#[case::tap_has_no_thresholds(Command::SetHighThreshold(3.0))]
fn virtual_tap_rejects_foreign_commands(#[case] cmd: Command) {
    let mut tap = VirtualTap::new();
    let err = tap.apply(cmd, Some(&heading(0.0))).unwrap_err();
    assert!(matches!(err, MagnetoError::UnsupportedCommand { recognizer: "virtual_tap", .. }));
}
