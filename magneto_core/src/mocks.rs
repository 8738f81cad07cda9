//! Test and helper sensors for magneto_core.

use magneto_traits::{Magnetometer, SensorError};
use std::time::Duration;

/// A magnetometer that always errors on read; useful for watchdog and
/// shutdown tests.
pub struct NoopMagnetometer;

impl Magnetometer for NoopMagnetometer {
    fn read(&mut self, _timeout: Duration) -> Result<[f32; 3], SensorError> {
        Err(Box::new(std::io::Error::other("noop magnetometer")))
    }
}

/// Returns the same field forever.
#[derive(Debug, Clone, Copy)]
pub struct ConstantMagnetometer(pub [f32; 3]);

impl Magnetometer for ConstantMagnetometer {
    fn read(&mut self, _timeout: Duration) -> Result<[f32; 3], SensorError> {
        Ok(self.0)
    }
}
