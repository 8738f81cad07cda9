use magneto_core::metrics::round2;
use magneto_core::{MagnetoError, Sample, SlotStore, WINDOW, WindowFilter};
use proptest::prelude::*;

// Sensor-range values with exactly two decimals, like rounded hardware output.
fn centi() -> impl Strategy<Value = f32> {
    (-500_000i32..500_000).prop_map(|c| c as f32 / 100.0)
}

fn sample() -> impl Strategy<Value = Sample> {
    (centi(), centi(), centi()).prop_map(|(x, y, z)| Sample::new(x, y, z))
}

proptest! {
    #[test]
    fn constant_stream_passes_through_from_first_sample(s in sample(), n in 1usize..40) {
        let mut f = WindowFilter::new();
        for _ in 0..n {
            let r = f.update(s);
            prop_assert_eq!(r.low_pass, s);
            prop_assert_eq!(r.high_pass.norm(), 0.0);
        }
    }

    #[test]
    fn average_tracks_mean_of_last_window(
        a in centi(),
        b in centi(),
        extra in 0usize..25,
    ) {
        let mut f = WindowFilter::new();
        let n = WINDOW + extra;
        let raw: Vec<f32> = (0..n).map(|i| if i % 2 == 0 { a } else { b }).collect();
        for &v in &raw {
            f.update(Sample::new(v, -v, 0.0));
        }
        let tail = &raw[n - WINDOW..];
        let mean = tail.iter().map(|&v| f64::from(v)).sum::<f64>() / WINDOW as f64;
        let avg = f.average();
        prop_assert!((avg[0] - mean).abs() < 1e-6, "avg {} mean {}", avg[0], mean);
        prop_assert!((avg[1] + mean).abs() < 1e-6);
    }

    #[test]
    fn high_plus_low_reconstructs_raw(stream in prop::collection::vec(sample(), 1..60)) {
        let mut f = WindowFilter::new();
        for s in stream {
            let r = f.update(s);
            for ((hp, lp), raw) in r.high_pass.axes().into_iter()
                .zip(r.low_pass.axes())
                .zip(s.axes())
            {
                let rebuilt = round2(f64::from(hp) + f64::from(lp));
                let expected = round2(f64::from(raw));
                prop_assert!(
                    (rebuilt - expected).abs() <= 0.011,
                    "hp {hp} + lp {lp} = {rebuilt}, raw {expected}"
                );
            }
        }
    }

    #[test]
    fn round2_is_idempotent(x in -10_000.0f64..10_000.0) {
        let once = round2(x);
        prop_assert_eq!(round2(f64::from(once)), once);
    }

    #[test]
    fn round2_is_idempotent_over_all_finite(
        x in prop::num::f64::NORMAL | prop::num::f64::SUBNORMAL | prop::num::f64::ZERO,
    ) {
        let once = round2(x);
        prop_assert_eq!(round2(f64::from(once)), once);
    }

    #[test]
    fn slot_store_rejects_overflow_without_mutation(
        capacity in 1usize..=20,
        values in prop::collection::vec(any::<i16>(), 0..40),
    ) {
        let mut store = SlotStore::new(capacity);
        for (i, &v) in values.iter().enumerate() {
            prop_assert_eq!(store.is_complete(), i >= capacity);
            let before = store.slots().to_vec();
            match store.store(v) {
                Ok(idx) => prop_assert_eq!(idx, i),
                Err(e) => {
                    prop_assert_eq!(e, MagnetoError::SlotStoreFull { capacity });
                    prop_assert_eq!(store.slots(), before.as_slice());
                }
            }
        }
        prop_assert_eq!(store.filled(), values.len().min(capacity));
    }
}

#[test]
fn round2_is_idempotent_at_extremes() {
    for x in [
        f64::MAX,
        f64::MIN,
        f64::MIN_POSITIVE,
        -f64::MIN_POSITIVE,
        1e300,
        -1e-300,
        f64::from(f32::MAX),
        f64::from(f32::MIN),
        16_777_217.005,
        0.005,
        -0.005,
    ] {
        let once = round2(x);
        assert_eq!(round2(f64::from(once)), once, "x = {x:e}");
    }
    assert_eq!(round2(f64::MAX), f32::INFINITY);
    assert_eq!(round2(1e-300), 0.0);
}
