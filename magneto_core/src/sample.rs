//! Sample and reading value types.

use crate::metrics;

/// One 3-axis magnetic field measurement (µT).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Sample {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Sample {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    #[inline]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub fn axes(&self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }

    /// Each axis rounded to 2 decimals.
    pub fn rounded(&self) -> Self {
        Self::new(
            metrics::round2(f64::from(self.x)),
            metrics::round2(f64::from(self.y)),
            metrics::round2(f64::from(self.z)),
        )
    }

    /// Rounded euclidean norm; see [`metrics::norm`].
    #[inline]
    pub fn norm(&self) -> f32 {
        metrics::norm(self)
    }

    /// Rounded azimuth in degrees; see [`metrics::azimuth`].
    #[inline]
    pub fn azimuth(&self) -> f32 {
        metrics::azimuth(self)
    }
}

impl From<[f32; 3]> for Sample {
    fn from(v: [f32; 3]) -> Self {
        Self::new(v[0], v[1], v[2])
    }
}

impl From<Sample> for [f32; 3] {
    fn from(s: Sample) -> Self {
        s.axes()
    }
}

/// Filter output for one raw sample. Both parts are rounded to 2 decimals
/// and owned by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Reading {
    /// Moving-average (smoothed) field.
    pub low_pass: Sample,
    /// Raw minus moving average.
    pub high_pass: Sample,
}
