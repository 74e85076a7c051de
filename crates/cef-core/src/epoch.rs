//! Epoch source for filtered results

use cef_filter::Epoch;
use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonic epoch counter, one per session
#[derive(Debug, Default)]
pub struct EpochCounter {
    latest: AtomicU64,
}

impl EpochCounter {
    /// Counter starting at [`Epoch::ZERO`]
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Latest issued epoch
    #[inline]
    #[must_use]
    pub fn current(&self) -> Epoch {
        Epoch::new(self.latest.load(Ordering::Acquire))
    }

    /// Issue the next epoch
    #[inline]
    pub fn advance(&self) -> Epoch {
        Epoch::new(self.latest.fetch_add(1, Ordering::AcqRel) + 1)
    }

    /// Check whether `epoch` is still the latest issued
    #[inline]
    #[must_use]
    pub fn is_current(&self, epoch: Epoch) -> bool {
        self.current() == epoch
    }
}
