//! Single-flight guard: at most one holder of a permit at a time.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Clone, Default)]
pub struct SingleFlight {
    busy: Arc<AtomicBool>,
}

impl SingleFlight {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the permit, or `None` while another holder still has it.
    #[must_use]
    pub fn try_acquire(&self) -> Option<SingleFlightPermit> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| SingleFlightPermit { busy: Arc::clone(&self.busy) })
    }

    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// Released on drop, including when the owning future is dropped mid-await.
#[derive(Debug)]
pub struct SingleFlightPermit {
    busy: Arc<AtomicBool>,
}

impl Drop for SingleFlightPermit {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

#[cfg(test)]
#[path = "guard_test.rs"]
mod tests;
