/*!
 * Process Signal Slots
 * Per-process pending-reason flags and the table that delivers them
 */

use crate::core::types::{is_valid_pid, os_pid, Pid};
use crate::signals::traits::{PendingReasons, ReasonDelivery};
use crate::signals::types::{ProcSignalReason, SignalError, SignalResult, NUM_PROCSIGNALS};
use ahash::RandomState;
use dashmap::DashMap;
use log::{debug, info, warn};
use nix::errno::Errno;
use nix::sys::signal::{kill, Signal};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

/// Slot owned by one process: its pid and a flag per reason
///
/// Senders set flags from any process; the owner test-and-clears them
/// from its signal handler.
#[repr(C, align(64))]
pub struct ProcSignalSlot {
    pid: AtomicU32,
    flags: [AtomicBool; NUM_PROCSIGNALS],
}

impl ProcSignalSlot {
    pub const fn new() -> Self {
        Self {
            pid: AtomicU32::new(0),
            flags: [const { AtomicBool::new(false) }; NUM_PROCSIGNALS],
        }
    }

    /// Owning pid, 0 when the slot is free
    #[inline]
    pub fn pid(&self) -> Pid {
        self.pid.load(Ordering::Acquire)
    }

    /// Claim the slot for `pid`, discarding flags left by a previous owner
    fn claim(&self, pid: Pid) {
        for flag in &self.flags {
            flag.store(false, Ordering::Relaxed);
        }
        self.pid.store(pid, Ordering::Release);
    }

    fn release(&self) {
        self.pid.store(0, Ordering::Release);
    }

    /// Whether `reason` is set, without consuming it
    pub fn is_set(&self, reason: ProcSignalReason) -> bool {
        self.flags
            .get(reason.index())
            .map(|flag| flag.load(Ordering::Acquire))
            .unwrap_or(false)
    }
}

impl Default for ProcSignalSlot {
    fn default() -> Self {
        Self::new()
    }
}

impl PendingReasons for ProcSignalSlot {
    #[inline]
    fn test_and_clear(&self, reason: ProcSignalReason) -> bool {
        match self.flags.get(reason.index()) {
            Some(flag) => flag.swap(false, Ordering::AcqRel),
            None => false,
        }
    }

    #[inline]
    fn mark(&self, reason: ProcSignalReason) {
        if let Some(flag) = self.flags.get(reason.index()) {
            flag.store(true, Ordering::Release);
        }
    }
}

/// How a sender notifies the target after setting its flag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notify {
    /// Raise the given OS signal on the target process
    Kill(Signal),
    /// Only set the flag; the caller arranges for the target to scan
    FlagOnly,
}

/// Table of process signal slots, keyed by pid
#[derive(Clone)]
pub struct ProcSignalSlots {
    slots: Arc<DashMap<Pid, Arc<ProcSignalSlot>, RandomState>>,
    notify: Notify,
}

impl ProcSignalSlots {
    pub fn new(notify: Notify) -> Self {
        info!("Process signal slots initialized ({:?})", notify);
        Self {
            slots: Arc::new(DashMap::with_hasher(RandomState::new())),
            notify,
        }
    }

    pub fn notify(&self) -> Notify {
        self.notify
    }

    /// Attach a slot for `pid`, clearing any stale flags
    ///
    /// Fails with `InvalidPid` for 0, which marks a free slot, and for pids
    /// that do not name a single process.
    pub fn attach(&self, pid: Pid) -> SignalResult<Arc<ProcSignalSlot>> {
        if !is_valid_pid(pid) {
            return Err(SignalError::InvalidPid(pid));
        }

        let slot = self
            .slots
            .entry(pid)
            .or_insert_with(|| Arc::new(ProcSignalSlot::new()))
            .value()
            .clone();
        slot.claim(pid);
        debug!("Attached process signal slot for PID {}", pid);
        Ok(slot)
    }

    /// Detach the slot for `pid`; later sends to it fail
    pub fn detach(&self, pid: Pid) -> bool {
        match self.slots.remove(&pid) {
            Some((_, slot)) => {
                slot.release();
                debug!("Detached process signal slot for PID {}", pid);
                true
            }
            None => false,
        }
    }

    pub fn slot(&self, pid: Pid) -> Option<Arc<ProcSignalSlot>> {
        self.slots.get(&pid).map(|entry| entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl ReasonDelivery for ProcSignalSlots {
    fn send(&self, target: Pid, reason: ProcSignalReason) -> SignalResult<()> {
        if !reason.is_valid() {
            return Err(SignalError::InvalidReason(reason.number()));
        }
        let os_target = os_pid(target).ok_or(SignalError::InvalidPid(target))?;

        let slot = self.slot(target).ok_or(SignalError::ProcessNotFound(target))?;
        if slot.pid() != target {
            return Err(SignalError::ProcessNotFound(target));
        }

        slot.mark(reason);

        match self.notify {
            Notify::FlagOnly => Ok(()),
            Notify::Kill(signal) => kill(os_target, signal).map_err(|errno| match errno {
                Errno::ESRCH => {
                    warn!("Signal target PID {} has exited", target);
                    SignalError::ProcessNotFound(target)
                }
                other => SignalError::OperationFailed(format!(
                    "kill({}, {}) failed: {}",
                    target, signal, other
                )),
            }),
        }
    }
}
