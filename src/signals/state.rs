/*!
 * Process Signal State
 * Per-process registry, pending flags and interrupt bookkeeping
 */

use super::atomic_stats::AtomicSignalStats;
use super::pending::PendingFlags;
use super::registry::ReasonRegistry;
use super::types::{ProcSignalReason, SignalError, SignalResult, SignalStats};
use crate::interrupts::InterruptState;

/// Everything one process needs to receive custom signals
///
/// The OS invokes signal handlers with a fixed signature, so the live
/// instance is a `static` reached through [`process_state`]. Lifecycle:
/// the registry is written during preload, pending flags are set from
/// signal context and cleared by the dispatcher in normal context.
pub struct ProcSignalState {
    registry: ReasonRegistry,
    pending: PendingFlags,
    interrupts: InterruptState,
    stats: AtomicSignalStats,
}

static PROCESS_STATE: ProcSignalState = ProcSignalState::new();

/// State of the calling process
#[inline]
pub fn process_state() -> &'static ProcSignalState {
    &PROCESS_STATE
}

/// Register a custom signal handler for the calling process
///
/// See [`ProcSignalState::register`].
pub fn register_custom_procsignal_handler<F>(handler: F) -> ProcSignalReason
where
    F: Fn() -> SignalResult<()> + Send + Sync + 'static,
{
    PROCESS_STATE.register(handler)
}

impl ProcSignalState {
    pub const fn new() -> Self {
        Self {
            registry: ReasonRegistry::new(),
            pending: PendingFlags::new(),
            interrupts: InterruptState::new(),
            stats: AtomicSignalStats::new(),
        }
    }

    #[inline]
    pub fn registry(&self) -> &ReasonRegistry {
        &self.registry
    }

    #[inline]
    pub fn pending(&self) -> &PendingFlags {
        &self.pending
    }

    #[inline]
    pub fn interrupts(&self) -> &InterruptState {
        &self.interrupts
    }

    #[inline]
    pub fn stats(&self) -> &AtomicSignalStats {
        &self.stats
    }

    pub fn begin_preload(&self) {
        self.registry.begin_preload();
    }

    pub fn finish_preload(&self) {
        self.registry.finish_preload();
    }

    /// Bind `handler` to a free custom reason
    ///
    /// Returns [`ProcSignalReason::INVALID`] when all custom reasons are
    /// taken.
    ///
    /// # Panics
    /// Outside the preload phase.
    pub fn register<F>(&self, handler: F) -> ProcSignalReason
    where
        F: Fn() -> SignalResult<()> + Send + Sync + 'static,
    {
        let reason = self.registry.register(handler);
        if reason.is_valid() {
            self.stats.inc_handlers();
        }
        reason
    }

    /// Bind `handler` to a free custom reason, reporting every failure as an error
    pub fn try_register<F>(&self, handler: F) -> SignalResult<ProcSignalReason>
    where
        F: Fn() -> SignalResult<()> + Send + Sync + 'static,
    {
        let reason = self.registry.try_register(handler)?;
        self.stats.inc_handlers();
        Ok(reason)
    }

    /// Whether `reason` has been observed but not yet dispatched
    pub fn is_pending(&self, reason: ProcSignalReason) -> SignalResult<bool> {
        let index = reason
            .custom_index()
            .ok_or(SignalError::InvalidReason(reason.number()))?;
        Ok(self.pending.is_set(index))
    }

    pub fn stats_snapshot(&self) -> SignalStats {
        self.stats.snapshot()
    }
}

impl Default for ProcSignalState {
    fn default() -> Self {
        Self::new()
    }
}
