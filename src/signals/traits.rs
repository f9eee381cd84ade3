/*!
 * Signal Traits
 * Seams between the signalling core and the shared delivery substrate
 */

use super::types::{ProcSignalReason, SignalResult};
use crate::core::types::Pid;

/// Per-process pending-reason bitmask in shared memory
///
/// `test_and_clear` runs inside the OS signal handler and must stay
/// async-signal-safe: no allocation, no locks.
pub trait PendingReasons: Send + Sync {
    /// Atomically test and clear `reason`, returning whether it was set
    fn test_and_clear(&self, reason: ProcSignalReason) -> bool;

    /// Mark `reason` pending without raising any signal
    fn mark(&self, reason: ProcSignalReason);
}

/// Sender side of the substrate
pub trait ReasonDelivery: Send + Sync {
    /// Set `reason` in the target's slot and notify it
    fn send(&self, target: Pid, reason: ProcSignalReason) -> SignalResult<()>;
}

/// Blocking primitive woken after every signal scan
pub trait Latch: Send + Sync {
    /// Wake anyone waiting on the latch. Must be async-signal-safe.
    fn set(&self);
}
