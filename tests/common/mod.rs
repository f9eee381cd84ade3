/*!
 * Shared helpers for process-signal integration tests
 */

#![allow(dead_code)]

use custom_procsignal::signals::{check_and_set_custom_signal_interrupts, Latch};
use custom_procsignal::{
    Notify, ProcSignalReason, ProcSignalSlot, ProcSignalSlots, ProcSignalState, ReasonDelivery,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Latch that counts wakeups
#[derive(Default)]
pub struct CountingLatch(AtomicUsize);

impl CountingLatch {
    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

impl Latch for CountingLatch {
    fn set(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

/// A process with its own state, slot and latch; delivery is simulated
/// by running the scanner directly instead of through an OS signal
pub struct TestProcess {
    pub pid: u32,
    pub state: &'static ProcSignalState,
    pub slots: ProcSignalSlots,
    pub slot: Arc<ProcSignalSlot>,
    pub latch: CountingLatch,
}

impl TestProcess {
    pub fn new(pid: u32) -> Self {
        let slots = ProcSignalSlots::new(Notify::FlagOnly);
        let slot = slots.attach(pid).unwrap();
        Self {
            pid,
            state: Box::leak(Box::new(ProcSignalState::new())),
            slots,
            slot,
            latch: CountingLatch::default(),
        }
    }

    /// Set the reason's bit without running the handler-side scan
    pub fn send(&self, reason: ProcSignalReason) {
        self.slots.send(self.pid, reason).unwrap();
    }

    /// Run the signal-context scan, as the OS handler would
    pub fn signal(&self) -> usize {
        check_and_set_custom_signal_interrupts(self.state, self.slot.as_ref(), &self.latch)
    }

    /// Send and immediately take the signal
    pub fn deliver(&self, reason: ProcSignalReason) -> usize {
        self.send(reason);
        self.signal()
    }
}

/// Ordered record of handler invocations
#[derive(Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    pub fn push(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}
