//! A `Magnetometer` over a recorded stream.

use magneto_traits::{Magnetometer, SensorError};
use std::collections::VecDeque;
use std::time::Duration;

use crate::sample::Sample;

/// Yields recorded samples in order, then reports end of stream
/// (`io::ErrorKind::UnexpectedEof`) on every further read.
#[derive(Debug, Clone, Default)]
pub struct ReplayMagnetometer {
    samples: VecDeque<Sample>,
}

impl ReplayMagnetometer {
    pub fn new(samples: impl IntoIterator<Item = Sample>) -> Self {
        Self {
            samples: samples.into_iter().collect(),
        }
    }

    pub fn from_rows(rows: &[magneto_config::SampleRow]) -> Self {
        Self::new(rows.iter().map(|r| Sample::from(r.axes())))
    }

    pub fn remaining(&self) -> usize {
        self.samples.len()
    }
}

impl Magnetometer for ReplayMagnetometer {
    fn read(&mut self, _timeout: Duration) -> Result<[f32; 3], SensorError> {
        self.samples.pop_front().map(Into::into).ok_or_else(|| {
            Box::new(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "end of recorded stream",
            )) as SensorError
        })
    }
}

/// Whether a sensor error marks the end of a finite stream.
pub fn is_end_of_stream(e: &(dyn std::error::Error + 'static)) -> bool {
    e.downcast_ref::<std::io::Error>()
        .is_some_and(|io| io.kind() == std::io::ErrorKind::UnexpectedEof)
}
