/*!
 * Interrupt Processor
 * Normal-context entry point that drains signal-driven work
 */

use crate::signals::dispatcher::dispatch;
use crate::signals::state::{process_state, ProcSignalState};
use crate::signals::types::SignalResult;
use log::trace;

/// Generic interrupt-processing entry point
///
/// Call [`check_for_interrupts`](Self::check_for_interrupts) at points in
/// normal control flow where handling interrupts is safe. Never call it
/// from inside a signal handler.
#[derive(Clone, Copy)]
pub struct InterruptProcessor<'a> {
    state: &'a ProcSignalState,
}

impl InterruptProcessor<'static> {
    /// Processor bound to the calling process's global state
    pub fn for_process() -> Self {
        Self::new(process_state())
    }
}

impl<'a> InterruptProcessor<'a> {
    pub fn new(state: &'a ProcSignalState) -> Self {
        Self { state }
    }

    /// Process interrupts if any are pending
    ///
    /// Returns the number of handlers invoked.
    #[inline]
    pub fn check_for_interrupts(&self) -> SignalResult<usize> {
        if self.state.interrupts().is_pending() {
            self.process_interrupts()
        } else {
            Ok(0)
        }
    }

    /// Handle outstanding interrupt work
    ///
    /// While interrupts are held this returns immediately and leaves the
    /// pending indicator set, so the work runs once the outermost hold is
    /// released. Handler errors are propagated to the caller.
    pub fn process_interrupts(&self) -> SignalResult<usize> {
        let interrupts = self.state.interrupts();
        let mut invoked = 0;

        loop {
            if !interrupts.can_process() {
                trace!(
                    "Interrupt processing deferred, holdoff count {}",
                    interrupts.holdoff_count()
                );
                return Ok(invoked);
            }

            if !interrupts.take_pending() {
                return Ok(invoked);
            }

            let report = dispatch(self.state)?;
            invoked += report.invoked;

            // Interrupts that arrived during the held pass are handled here,
            // once the outermost hold is gone
            if !report.outermost {
                return Ok(invoked);
            }
        }
    }
}
