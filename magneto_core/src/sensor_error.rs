//! Maps `Box<dyn Error>` from the `Magnetometer` seam to typed `MagnetoError`.

use crate::error::MagnetoError;

/// Map a sensor-boundary error to a typed `MagnetoError`.
///
/// `std::io::ErrorKind::TimedOut` is recognised by downcast; anything else
/// falls back to matching "timeout" in the message.
pub fn map_sensor_error(e: &(dyn std::error::Error + 'static)) -> MagnetoError {
    if e
        .downcast_ref::<std::io::Error>()
        .is_some_and(|io| io.kind() == std::io::ErrorKind::TimedOut)
    {
        return MagnetoError::Timeout;
    }

    let s = e.to_string();
    if s.to_lowercase().contains("timeout") {
        MagnetoError::Timeout
    } else {
        MagnetoError::Sensor(s)
    }
}
