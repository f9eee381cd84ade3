/*!
 * Deferred Dispatcher
 * Invokes registered handlers for pending custom signals
 */

use super::state::ProcSignalState;
use super::types::{SignalResult, NUM_CUSTOM_PROCSIGNALS};
use log::{debug, trace, warn};

/// Outcome of one dispatch pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Handlers invoked during the pass
    pub invoked: usize,
    /// Pending flags dropped because no handler was bound
    pub skipped: usize,
    /// This pass held the outermost interrupt hold
    pub outermost: bool,
}

/// Run one dispatch pass over the pending custom flags
///
/// Not an extension entry point: extensions call
/// [`InterruptProcessor::check_for_interrupts`](crate::interrupts::InterruptProcessor::check_for_interrupts),
/// which drives this and re-runs it for work deferred during the pass.
///
/// Interrupt processing is held for the whole pass, so a handler that
/// checks for interrupts cannot re-enter the dispatcher. Flags are walked
/// in ascending reason order and each is cleared before its handler runs;
/// a redelivery during the handler sets it again for the next pass.
///
/// A handler error ends the pass and is returned as is. Flags not yet
/// reached stay set and the interrupt indicator is raised again for them,
/// so the next interrupt check picks them up. The hold is released on the
/// way out.
pub fn dispatch(state: &ProcSignalState) -> SignalResult<DispatchReport> {
    let hold = state.interrupts().hold();
    let mut report = DispatchReport::default();

    for index in 0..NUM_CUSTOM_PROCSIGNALS {
        if !state.pending().take(index) {
            continue;
        }

        match state.registry().handler(index) {
            Some(handler) => {
                trace!("Invoking custom signal handler {}", index + 1);
                state.stats().inc_invoked();
                report.invoked += 1;
                if let Err(err) = handler() {
                    if state.pending().any() {
                        state.interrupts().raise();
                    }
                    warn!("Custom signal handler {} failed: {}", index + 1, err);
                    return Err(err);
                }
            }
            None => {
                state.stats().inc_skipped();
                report.skipped += 1;
            }
        }
    }

    state.stats().inc_passes();
    report.outermost = hold.release();

    if report.invoked > 0 || report.skipped > 0 {
        debug!(
            "Custom signal dispatch: {} invoked, {} skipped",
            report.invoked, report.skipped
        );
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signals::types::SignalError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_empty_dispatch_is_noop() {
        let state = ProcSignalState::new();
        let report = dispatch(&state).unwrap();
        assert_eq!(report.invoked, 0);
        assert_eq!(report.skipped, 0);
        assert!(report.outermost);
        assert_eq!(state.interrupts().holdoff_count(), 0);
    }

    #[test]
    fn test_flag_without_handler_is_skipped() {
        let state = ProcSignalState::new();
        state.pending().set(5);
        let report = dispatch(&state).unwrap();
        assert_eq!(report.skipped, 1);
        assert!(!state.pending().is_set(5));
    }

    #[test]
    fn test_handler_error_propagates_and_releases_hold() {
        let state = ProcSignalState::new();
        let later = Arc::new(AtomicUsize::new(0));
        state.begin_preload();
        state.register(|| Err(SignalError::HandlerError("boom".into())));
        let counter = later.clone();
        state.register(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
        state.finish_preload();

        state.pending().set(0);
        state.pending().set(1);

        let err = dispatch(&state).unwrap_err();
        assert_eq!(err, SignalError::HandlerError("boom".into()));
        assert_eq!(state.interrupts().holdoff_count(), 0);
        assert!(!state.pending().is_set(0));
        assert!(state.pending().is_set(1));
        assert!(state.interrupts().is_pending());
        assert_eq!(later.load(Ordering::SeqCst), 0);

        // The remaining flag is picked up by the next pass
        assert_eq!(dispatch(&state).unwrap().invoked, 1);
        assert_eq!(later.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_last_handler_failure_leaves_indicator_clear() {
        let state = ProcSignalState::new();
        state.begin_preload();
        state.register(|| Err(SignalError::HandlerError("boom".into())));
        state.finish_preload();

        state.pending().set(0);
        assert!(dispatch(&state).is_err());
        assert!(!state.pending().any());
        assert!(!state.interrupts().is_pending());
    }
}
