/*!
 * Pending Custom Signals
 * Process-local flags handed from signal context to normal context
 */

use super::types::NUM_CUSTOM_PROCSIGNALS;
use std::sync::atomic::{AtomicBool, Ordering};

/// One flag per custom reason, private to the process
///
/// Set only from the signal handler, cleared only by the dispatcher.
/// A flag is true between the scanner observing its reason and the
/// dispatcher acting on it.
pub struct PendingFlags {
    flags: [AtomicBool; NUM_CUSTOM_PROCSIGNALS],
}

impl PendingFlags {
    pub const fn new() -> Self {
        Self {
            flags: [const { AtomicBool::new(false) }; NUM_CUSTOM_PROCSIGNALS],
        }
    }

    /// Record `index` as pending. Async-signal-safe.
    #[inline(always)]
    pub fn set(&self, index: usize) {
        if let Some(flag) = self.flags.get(index) {
            flag.store(true, Ordering::Release);
        }
    }

    /// Clear `index`, returning whether it was pending
    #[inline]
    pub fn take(&self, index: usize) -> bool {
        self.flags
            .get(index)
            .map(|flag| flag.swap(false, Ordering::AcqRel))
            .unwrap_or(false)
    }

    #[inline]
    pub fn is_set(&self, index: usize) -> bool {
        self.flags
            .get(index)
            .map(|flag| flag.load(Ordering::Acquire))
            .unwrap_or(false)
    }

    pub fn any(&self) -> bool {
        self.flags.iter().any(|flag| flag.load(Ordering::Acquire))
    }

    pub fn count(&self) -> usize {
        self.flags
            .iter()
            .filter(|flag| flag.load(Ordering::Acquire))
            .count()
    }
}

impl Default for PendingFlags {
    fn default() -> Self {
        Self::new()
    }
}
