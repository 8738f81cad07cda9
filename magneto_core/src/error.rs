use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum MagnetoError {
    #[error("no calibration slot available (capacity {capacity})")]
    SlotStoreFull { capacity: usize },
    #[error("calibration reference not set: {0}")]
    MissingReference(&'static str),
    #[error("{recognizer} recognizer does not support `{command}`")]
    UnsupportedCommand {
        recognizer: &'static str,
        command: &'static str,
    },
    #[error("no reading observed yet")]
    NoReading,
    #[error("timeout waiting for magnetometer")]
    Timeout,
    #[error("sensor error: {0}")]
    Sensor(String),
}

#[derive(Debug, Error, Clone)]
pub enum BuildError {
    #[error("missing recognizer")]
    MissingRecognizer,
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
