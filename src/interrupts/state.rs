/*!
 * Interrupt State
 * Work-pending indicator and the hold/resume nesting counter
 */

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

/// Process-wide interrupt bookkeeping
///
/// `raise` is called from signal context. The holdoff counter is only
/// touched from normal context; it is atomic so the state can live in a
/// `static`, not because it is shared between processes.
pub struct InterruptState {
    pending: AtomicBool,
    holdoff: AtomicU32,
}

impl InterruptState {
    pub const fn new() -> Self {
        Self {
            pending: AtomicBool::new(false),
            holdoff: AtomicU32::new(0),
        }
    }

    /// Flag that interrupt work is outstanding. Async-signal-safe.
    #[inline(always)]
    pub fn raise(&self) {
        self.pending.store(true, Ordering::Release);
    }

    #[inline]
    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }

    /// Clear the indicator, returning whether it was set
    #[inline]
    pub fn take_pending(&self) -> bool {
        self.pending.swap(false, Ordering::AcqRel)
    }

    #[inline]
    pub fn holdoff_count(&self) -> u32 {
        self.holdoff.load(Ordering::Acquire)
    }

    /// True when interrupts may be processed right now
    #[inline]
    pub fn can_process(&self) -> bool {
        self.holdoff_count() == 0
    }

    /// Suspend interrupt processing until the returned hold is released
    #[must_use = "interrupts resume as soon as the hold is dropped"]
    pub fn hold(&self) -> InterruptHold<'_> {
        self.holdoff.fetch_add(1, Ordering::AcqRel);
        InterruptHold { state: self }
    }

    /// Decrement the holdoff count, returning true if it reached zero
    fn resume(&self) -> bool {
        let previous = self
            .holdoff
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |count| {
                Some(count.saturating_sub(1))
            })
            .unwrap_or(0);
        previous <= 1
    }
}

impl Default for InterruptState {
    fn default() -> Self {
        Self::new()
    }
}

/// RAII hold on interrupt processing
///
/// Dropping the hold resumes processing; [`InterruptHold::release`] does
/// the same and reports whether this was the outermost hold.
pub struct InterruptHold<'a> {
    state: &'a InterruptState,
}

impl InterruptHold<'_> {
    /// Resume interrupt processing
    ///
    /// Returns true when no other hold remains, meaning interrupts deferred
    /// while held may now be processed.
    pub fn release(self) -> bool {
        let outermost = self.state.resume();
        std::mem::forget(self);
        outermost
    }
}

impl Drop for InterruptHold<'_> {
    fn drop(&mut self) {
        self.state.resume();
    }
}
