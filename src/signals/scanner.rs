/*!
 * Signal-Context Scanner
 * Moves delivered custom reasons from the shared slot into local flags
 */

use super::state::ProcSignalState;
use super::traits::{Latch, PendingReasons};
use super::types::{ProcSignalReason, NUM_CUSTOM_PROCSIGNALS};

/// Record every custom reason delivered to `slot`
///
/// Runs inside the OS signal handler. For each custom reason in order it
/// test-and-clears the slot bit; a hit raises the interrupt indicator and
/// sets the process-local pending flag. The latch is set unconditionally
/// afterwards so a sleeping waiter re-checks its state.
///
/// Only atomic stores and the slot's own test-and-clear are performed:
/// no allocation, no locks, no logging. Returns how many reasons were
/// recorded.
pub fn check_and_set_custom_signal_interrupts<P, L>(
    state: &ProcSignalState,
    slot: &P,
    latch: &L,
) -> usize
where
    P: PendingReasons + ?Sized,
    L: Latch + ?Sized,
{
    let mut recorded = 0;

    for index in 0..NUM_CUSTOM_PROCSIGNALS {
        let Some(reason) = ProcSignalReason::custom(index) else {
            break;
        };

        if slot.test_and_clear(reason) {
            state.interrupts().raise();
            state.pending().set(index);
            state.stats().inc_received();
            recorded += 1;
        }
    }

    latch.set();
    recorded
}
