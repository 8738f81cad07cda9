//! Sampler thread lifecycle: clean shutdown, no leaks, in-order delivery.

use magneto_core::Sample;
use magneto_core::mocks::{ConstantMagnetometer, NoopMagnetometer};
use magneto_core::replay::ReplayMagnetometer;
use magneto_core::sampler::{CHANNEL_CAPACITY, Sampler};
use magneto_traits::clock::MonotonicClock;
use magneto_traits::clock::test_clock::TestClock;
use std::time::Duration;

#[test]
fn sampler_thread_exits_on_drop() {
    let sampler = Sampler::spawn(
        NoopMagnetometer,
        10,
        Duration::from_millis(100),
        MonotonicClock::new(),
    );
    std::thread::sleep(Duration::from_millis(50));
    drop(sampler);
}

#[test]
fn multiple_samplers_dont_leak_threads() {
    let clock = MonotonicClock::new();
    for _ in 0..10 {
        let sampler = Sampler::spawn(NoopMagnetometer, 10, Duration::from_millis(50), clock);
        std::thread::sleep(Duration::from_millis(10));
        let _ = sampler.drain().count();
        drop(sampler);
    }
}

#[test]
fn delivers_every_sample_in_order() {
    let n = CHANNEL_CAPACITY * 3;
    let samples: Vec<Sample> = (0..n).map(|i| Sample::new(i as f32, 0.0, 0.0)).collect();
    let sampler = Sampler::spawn(
        ReplayMagnetometer::new(samples),
        1000,
        Duration::from_millis(10),
        TestClock::new(),
    );
    // let the producer hit the bounded channel before consuming
    std::thread::sleep(Duration::from_millis(50));
    let mut got = Vec::new();
    while let Ok(s) = sampler.recv_timeout(Duration::from_secs(2)) {
        got.push(s.x);
    }
    let expected: Vec<f32> = (0..n).map(|i| i as f32).collect();
    assert_eq!(got, expected);
}

#[test]
fn blocked_producer_shuts_down_promptly() {
    let sampler = Sampler::spawn(
        ConstantMagnetometer([1.0, 1.0, 1.0]),
        1000,
        Duration::from_millis(10),
        TestClock::new(),
    );
    // channel fills and the producer blocks on send
    std::thread::sleep(Duration::from_millis(50));
    let start = std::time::Instant::now();
    drop(sampler);
    let shutdown_time = start.elapsed();
    assert!(
        shutdown_time < Duration::from_millis(200),
        "Shutdown took {shutdown_time:?}, expected < 200ms"
    );
}

#[test]
fn read_errors_are_counted_and_stall_grows() {
    let clock = TestClock::new();
    let sampler = Sampler::spawn(NoopMagnetometer, 50, Duration::from_millis(10), clock.clone());
    std::thread::sleep(Duration::from_millis(30));
    assert!(sampler.read_errors() > 0);
    let now = magneto_traits::Clock::ms_since(&clock, sampler.epoch());
    assert_eq!(sampler.stalled_for(now), now);
}
