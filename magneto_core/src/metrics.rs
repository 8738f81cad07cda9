//! Derived metrics over 3-axis vectors.
//!
//! Every consumer-facing value is quantized to hundredths (2 decimals) so
//! tolerance-band comparisons behave the same on every platform. Internals
//! compute in `f64` and only the final value is narrowed to `f32`.

use crate::sample::Sample;

/// Round to 2 decimal places, halves rounded up (towards +inf).
///
/// Non-finite input is returned unchanged; finite input beyond `f32` range
/// saturates to infinity. The function is idempotent:
/// `round2(f64::from(round2(x))) == round2(x)` for every finite `x`.
#[inline]
#[allow(clippy::cast_possible_truncation)]
pub fn round2(x: f64) -> f32 {
    if !x.is_finite() {
        return x as f32;
    }
    (((x * 100.0) + 0.5).floor() / 100.0) as f32
}

/// Euclidean norm `sqrt(x² + y² + z²)`, rounded to 2 decimals.
#[inline]
pub fn norm(v: &Sample) -> f32 {
    let (x, y, z) = (f64::from(v.x), f64::from(v.y), f64::from(v.z));
    round2((x * x + y * y + z * z).sqrt())
}

/// Angle of the x-y projection, `atan2(y, x)` in degrees, rounded to 2
/// decimals. Range is (-180, 180]: the `-180` that `atan2` yields for
/// `y == -0.0, x < 0` is folded onto `180`.
#[inline]
pub fn azimuth(v: &Sample) -> f32 {
    let deg = round2(f64::from(v.y).atan2(f64::from(v.x)).to_degrees());
    if deg <= -180.0 { 180.0 } else { deg }
}
