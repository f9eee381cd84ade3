/*!
 * Lock-Free Signal Statistics
 * Atomic counters that are safe to bump from inside a signal handler
 */

use crate::signals::types::SignalStats;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Atomic signal statistics for lock-free updates
///
/// # Performance
/// - Cache-line aligned to prevent false sharing
/// - All operations use relaxed ordering; a snapshot is advisory
#[repr(C, align(64))]
pub struct AtomicSignalStats {
    handlers_registered: AtomicUsize,
    signals_received: AtomicU64,
    handlers_invoked: AtomicU64,
    dispatches_skipped: AtomicU64,
    dispatch_passes: AtomicU64,
}

impl AtomicSignalStats {
    #[inline]
    pub const fn new() -> Self {
        Self {
            handlers_registered: AtomicUsize::new(0),
            signals_received: AtomicU64::new(0),
            handlers_invoked: AtomicU64::new(0),
            dispatches_skipped: AtomicU64::new(0),
            dispatch_passes: AtomicU64::new(0),
        }
    }

    #[inline(always)]
    pub fn inc_handlers(&self) {
        self.handlers_registered.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment signals received
    ///
    /// # Performance
    /// Called from signal context for every observed custom reason
    #[inline(always)]
    pub fn inc_received(&self) {
        self.signals_received.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn inc_invoked(&self) {
        self.handlers_invoked.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn inc_skipped(&self) {
        self.dispatches_skipped.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn inc_passes(&self) {
        self.dispatch_passes.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot of current stats (no locks required)
    ///
    /// # Note
    /// Values may not be perfectly consistent with each other if a signal
    /// lands mid-snapshot, but each individual value is accurate.
    #[inline]
    pub fn snapshot(&self) -> SignalStats {
        SignalStats {
            handlers_registered: self.handlers_registered.load(Ordering::Relaxed),
            signals_received: self.signals_received.load(Ordering::Relaxed),
            handlers_invoked: self.handlers_invoked.load(Ordering::Relaxed),
            dispatches_skipped: self.dispatches_skipped.load(Ordering::Relaxed),
            dispatch_passes: self.dispatch_passes.load(Ordering::Relaxed),
        }
    }
}

impl Default for AtomicSignalStats {
    fn default() -> Self {
        Self::new()
    }
}
