/*!
 * Signal Types
 * Process-signal reason space, handler type and result types
 */

use crate::core::types::Pid;
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Number of reasons reserved for extension modules
pub const NUM_CUSTOM_PROCSIGNALS: usize = 64;

/// Number of engine-defined reasons preceding the custom range
pub const NUM_ENGINE_PROCSIGNALS: usize = 12;

/// Size of the whole reason space
pub const NUM_PROCSIGNALS: usize = NUM_ENGINE_PROCSIGNALS + NUM_CUSTOM_PROCSIGNALS;

/// Signal operation result
pub type SignalResult<T> = Result<T, SignalError>;

/// Custom signal handler callback
///
/// Invoked from normal context by the dispatcher. A failing handler returns
/// `Err`, which propagates to whoever ran the interrupt entry point.
pub type HandlerFn = Arc<dyn Fn() -> SignalResult<()> + Send + Sync>;

/// Signal errors
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Diagnostic)]
pub enum SignalError {
    #[error("Cannot register custom signal outside the preload phase")]
    #[diagnostic(
        code(procsignal::registration_closed),
        help("Register custom signal handlers while shared preload libraries are loading.")
    )]
    RegistrationClosed,

    #[error("All {0} custom signal reasons are in use")]
    #[diagnostic(
        code(procsignal::reasons_exhausted),
        help("Disable the feature that needs the signal or unload another extension.")
    )]
    ReasonsExhausted(usize),

    #[error("Invalid signal reason: {0}")]
    #[diagnostic(code(procsignal::invalid_reason))]
    InvalidReason(u8),

    #[error("Process not found: {0}")]
    #[diagnostic(
        code(procsignal::process_not_found),
        help("The target process may have exited or never attached a signal slot.")
    )]
    ProcessNotFound(Pid),

    #[error("Invalid process ID: {0}")]
    #[diagnostic(
        code(procsignal::invalid_pid),
        help("Signal targets must be positive PIDs; 0 and values above i32::MAX address process groups.")
    )]
    InvalidPid(Pid),

    #[error("Handler error: {0}")]
    #[diagnostic(code(procsignal::handler_error))]
    HandlerError(String),

    #[error("Operation failed: {0}")]
    #[diagnostic(code(procsignal::operation_failed))]
    OperationFailed(String),
}

/// Identifier of a class of cross-process notification
///
/// Engine-defined reasons occupy the start of the space, the custom range
/// follows contiguously. `INVALID` never names a real reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProcSignalReason(u8);

impl ProcSignalReason {
    /// Sibling process caught up on shared invalidation messages
    pub const CATCHUP_INTERRUPT: Self = Self(0);
    /// Listen/notify event pending
    pub const NOTIFY_INTERRUPT: Self = Self(1);
    /// Message from a cooperating parallel worker
    pub const PARALLEL_MESSAGE: Self = Self(2);
    /// WAL sender should stop accepting new work
    pub const WALSND_INIT_STOPPING: Self = Self(3);
    /// Global barrier absorption requested
    pub const BARRIER: Self = Self(4);
    /// Dump memory context statistics to the log
    pub const LOG_MEMORY_CONTEXT: Self = Self(5);
    pub const RECOVERY_CONFLICT_DATABASE: Self = Self(6);
    pub const RECOVERY_CONFLICT_TABLESPACE: Self = Self(7);
    pub const RECOVERY_CONFLICT_LOCK: Self = Self(8);
    pub const RECOVERY_CONFLICT_SNAPSHOT: Self = Self(9);
    pub const RECOVERY_CONFLICT_BUFFERPIN: Self = Self(10);
    pub const RECOVERY_CONFLICT_STARTUP_DEADLOCK: Self = Self(11);

    /// First reason of the custom range
    pub const CUSTOM_FIRST: Self = Self(NUM_ENGINE_PROCSIGNALS as u8);
    /// Last reason of the custom range
    pub const CUSTOM_LAST: Self = Self((NUM_PROCSIGNALS - 1) as u8);

    /// "No reason available"
    pub const INVALID: Self = Self(u8::MAX);

    /// Custom reason at `index` within the custom range
    #[inline]
    pub const fn custom(index: usize) -> Option<Self> {
        if index < NUM_CUSTOM_PROCSIGNALS {
            Some(Self((NUM_ENGINE_PROCSIGNALS + index) as u8))
        } else {
            None
        }
    }

    /// Position within the custom range, if this is a custom reason
    #[inline]
    pub const fn custom_index(self) -> Option<usize> {
        if self.is_custom() {
            Some(self.0 as usize - NUM_ENGINE_PROCSIGNALS)
        } else {
            None
        }
    }

    #[inline]
    pub const fn is_custom(self) -> bool {
        self.0 >= Self::CUSTOM_FIRST.0 && self.0 <= Self::CUSTOM_LAST.0
    }

    /// True for every reason except the sentinel
    #[inline]
    pub const fn is_valid(self) -> bool {
        (self.0 as usize) < NUM_PROCSIGNALS
    }

    /// Position in the whole reason space
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Raw reason number
    #[inline]
    pub const fn number(self) -> u8 {
        self.0
    }

    /// All custom reasons in ascending order
    pub fn custom_reasons() -> impl Iterator<Item = Self> {
        (0..NUM_CUSTOM_PROCSIGNALS).filter_map(Self::custom)
    }

    /// Human-readable name
    pub fn name(self) -> &'static str {
        match self.0 {
            0 => "catchup_interrupt",
            1 => "notify_interrupt",
            2 => "parallel_message",
            3 => "walsnd_init_stopping",
            4 => "barrier",
            5 => "log_memory_context",
            6 => "recovery_conflict_database",
            7 => "recovery_conflict_tablespace",
            8 => "recovery_conflict_lock",
            9 => "recovery_conflict_snapshot",
            10 => "recovery_conflict_bufferpin",
            11 => "recovery_conflict_startup_deadlock",
            _ if self.is_custom() => "custom",
            _ => "invalid",
        }
    }
}

impl TryFrom<u8> for ProcSignalReason {
    type Error = SignalError;

    fn try_from(n: u8) -> SignalResult<Self> {
        let reason = Self(n);
        if reason.is_valid() {
            Ok(reason)
        } else {
            Err(SignalError::InvalidReason(n))
        }
    }
}

impl fmt::Display for ProcSignalReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.custom_index() {
            Some(index) => write!(f, "PROCSIG_CUSTOM_{}", index + 1),
            None => write!(f, "{}({})", self.name(), self.0),
        }
    }
}

/// Signal statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalStats {
    pub handlers_registered: usize,
    pub signals_received: u64,
    pub handlers_invoked: u64,
    pub dispatches_skipped: u64,
    pub dispatch_passes: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_custom_range_is_contiguous() {
        let reasons: Vec<_> = ProcSignalReason::custom_reasons().collect();
        assert_eq!(reasons.len(), NUM_CUSTOM_PROCSIGNALS);
        assert_eq!(reasons[0], ProcSignalReason::CUSTOM_FIRST);
        assert_eq!(reasons[63], ProcSignalReason::CUSTOM_LAST);
        for pair in reasons.windows(2) {
            assert_eq!(pair[0].number() + 1, pair[1].number());
        }
    }

    #[test]
    fn test_custom_index_round_trip() {
        assert_eq!(ProcSignalReason::custom(40).unwrap().custom_index(), Some(40));
        assert_eq!(ProcSignalReason::custom(64), None);
        assert_eq!(ProcSignalReason::BARRIER.custom_index(), None);
    }

    #[test]
    fn test_sentinel_is_not_a_reason() {
        assert!(!ProcSignalReason::INVALID.is_valid());
        assert!(!ProcSignalReason::INVALID.is_custom());
        assert!(ProcSignalReason::try_from(u8::MAX).is_err());
        assert!(ProcSignalReason::try_from(NUM_PROCSIGNALS as u8).is_err());
        assert_eq!(ProcSignalReason::try_from(4).unwrap(), ProcSignalReason::BARRIER);
    }

    #[test]
    fn test_display() {
        assert_eq!(ProcSignalReason::CUSTOM_FIRST.to_string(), "PROCSIG_CUSTOM_1");
        assert_eq!(ProcSignalReason::BARRIER.to_string(), "barrier(4)");
    }
}
