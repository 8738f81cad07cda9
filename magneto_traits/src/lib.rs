//! Seam traits shared by the magneto crates.
//!
//! The core never talks to a sensor directly; hosts hand it samples, or wrap
//! their sensor in a [`Magnetometer`] so the runner and sampler can pull them.
pub mod clock;

pub use clock::{Clock, MonotonicClock};

/// Error type crossing the sensor seam.
pub type SensorError = Box<dyn std::error::Error + Send + Sync>;

/// A source of 3-axis magnetic field samples, in µT, ordered x, y, z.
pub trait Magnetometer {
    /// Block until the next sample is available or `timeout` expires.
    fn read(&mut self, timeout: std::time::Duration) -> Result<[f32; 3], SensorError>;
}

impl<M: Magnetometer + ?Sized> Magnetometer for Box<M> {
    fn read(&mut self, timeout: std::time::Duration) -> Result<[f32; 3], SensorError> {
        (**self).read(timeout)
    }
}
