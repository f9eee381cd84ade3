/*!
 * OS Signal Glue
 * Installs the process-signal handler and binds it to the process's slot
 */

use super::scanner::check_and_set_custom_signal_interrupts;
use super::state::process_state;
use super::types::{SignalError, SignalResult};
use crate::ipc::latch::ProcessLatch;
use crate::ipc::slots::ProcSignalSlot;
use crate::signals::traits::Latch;
use log::{info, warn};
use nix::errno::Errno;
use nix::libc::c_int;
use nix::sys::signal::{sigaction, SaFlags, SigAction, SigHandler, SigSet, Signal};
use std::ptr;
use std::sync::atomic::{AtomicPtr, Ordering};
use std::sync::Arc;

static MY_SLOT: AtomicPtr<ProcSignalSlot> = AtomicPtr::new(ptr::null_mut());
static MY_LATCH: ProcessLatch = ProcessLatch::new();

/// Latch set by the handler after every scan
#[inline]
pub fn process_latch() -> &'static ProcessLatch {
    &MY_LATCH
}

/// Make `slot` the slot scanned by this process's signal handler
///
/// Attached slots are never freed: the handler may be reading one at any
/// moment, so a replaced slot is leaked rather than dropped.
pub fn attach_process_slot(slot: Arc<ProcSignalSlot>) {
    let pid = slot.pid();
    let raw = Arc::into_raw(slot) as *mut ProcSignalSlot;
    let previous = MY_SLOT.swap(raw, Ordering::AcqRel);
    if !previous.is_null() {
        warn!("Replaced attached process signal slot");
    }
    info!("Process signal slot attached for PID {}", pid);
}

/// Whether a slot is attached for this process
pub fn has_process_slot() -> bool {
    !MY_SLOT.load(Ordering::Acquire).is_null()
}

/// Install the process-signal handler for `signal`
///
/// Also creates the process latch so the handler can wake sleepers.
pub fn install_handler(signal: Signal) -> SignalResult<()> {
    MY_LATCH.init()?;

    let action = SigAction::new(
        SigHandler::Handler(handle_procsignal),
        SaFlags::SA_RESTART,
        SigSet::empty(),
    );

    // SAFETY: handle_procsignal only performs async-signal-safe operations
    unsafe { sigaction(signal, &action) }.map_err(|errno| {
        SignalError::OperationFailed(format!("sigaction({}) failed: {}", signal, errno))
    })?;

    info!("Process signal handler installed on {}", signal);
    Ok(())
}

extern "C" fn handle_procsignal(_signo: c_int) {
    let saved_errno = Errno::last_raw();

    let slot = MY_SLOT.load(Ordering::Acquire);
    if slot.is_null() {
        MY_LATCH.set();
    } else {
        // SAFETY: attached slots are never freed
        let slot = unsafe { &*slot };
        check_and_set_custom_signal_interrupts(process_state(), slot, &MY_LATCH);
    }

    Errno::set_raw(saved_errno);
}
