// Focused tests for period helpers.
use magneto_core::util::{period_ms, period_us};

#[test]
fn period_us_clamps_and_floors() {
    assert_eq!(period_us(1), 1_000_000);
    assert_eq!(period_us(50), 20_000);
    assert_eq!(period_us(1_000_000), 1);
    assert_eq!(period_us(u32::MAX), 1);
    // zero is treated as 1 Hz
    assert_eq!(period_us(0), 1_000_000);
}

#[test]
fn period_ms_minimum() {
    assert_eq!(period_ms(1), 1000);
    assert_eq!(period_ms(50), 20);
    assert_eq!(period_ms(1000), 1);
    assert_eq!(period_ms(10_000), 1);
    assert_eq!(period_ms(0), 1000);
}
