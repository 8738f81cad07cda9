//! Fixed-capacity, append-only store of calibration fingerprints.

use crate::error::MagnetoError;

/// Ordered calibration slots filled front to back.
///
/// Capacity is fixed at construction. Once every slot holds a fingerprint
/// the store is complete and further stores fail with
/// [`MagnetoError::SlotStoreFull`] without touching existing slots.
#[derive(Debug, Clone)]
pub struct SlotStore<F> {
    slots: Vec<F>,
    capacity: usize,
}

impl<F> SlotStore<F> {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a fingerprint, returning the slot index it was given.
    pub fn store(&mut self, fingerprint: F) -> Result<usize, MagnetoError> {
        if self.is_complete() {
            return Err(MagnetoError::SlotStoreFull {
                capacity: self.capacity,
            });
        }
        self.slots.push(fingerprint);
        Ok(self.slots.len() - 1)
    }

    /// True exactly when every slot has been filled.
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.slots.len() == self.capacity
    }

    /// Stored fingerprints in storage order.
    #[inline]
    pub fn slots(&self) -> &[F] {
        &self.slots
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&F> {
        self.slots.get(index)
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn filled(&self) -> usize {
        self.slots.len()
    }

    /// Index of the last filled slot, `None` while empty.
    #[inline]
    pub fn cursor(&self) -> Option<usize> {
        self.slots.len().checked_sub(1)
    }

    /// Drop every stored fingerprint; the only way back to an empty store.
    pub fn clear(&mut self) {
        self.slots.clear();
    }
}
