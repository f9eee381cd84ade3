/*!
 * OS Signal Path Tests
 * Real signal delivery through the installed handler and process globals
 */

use custom_procsignal::core::current_pid;
use custom_procsignal::signals::{
    attach_process_slot, has_process_slot, install_handler, process_latch,
};
use custom_procsignal::{
    process_state, register_custom_procsignal_handler, InterruptProcessor, Notify,
    PendingReasons, ProcSignalReason, ProcSignalSlots, ReasonDelivery, SignalError,
};
use nix::sys::signal::{raise, Signal};
use serial_test::serial;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::OnceLock;
use std::time::Duration;

static CALLS: AtomicUsize = AtomicUsize::new(0);

struct Harness {
    reason: ProcSignalReason,
    slots: ProcSignalSlots,
}

/// Registers once for the whole test binary; the global registry is
/// write-once per process
fn harness() -> &'static Harness {
    static HARNESS: OnceLock<Harness> = OnceLock::new();
    HARNESS.get_or_init(|| {
        let state = process_state();
        state.begin_preload();
        let reason = register_custom_procsignal_handler(|| {
            CALLS.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
        state.finish_preload();

        let slots = ProcSignalSlots::new(Notify::Kill(Signal::SIGUSR1));
        attach_process_slot(slots.attach(current_pid()).unwrap());
        install_handler(Signal::SIGUSR1).unwrap();

        Harness { reason, slots }
    })
}

#[test]
#[serial]
fn test_raised_signal_reaches_handler() {
    let harness = harness();
    assert!(has_process_slot());
    assert!(harness.reason.is_custom());

    let before = CALLS.load(Ordering::SeqCst);
    process_latch().reset();

    harness
        .slots
        .slot(current_pid())
        .unwrap()
        .mark(harness.reason);
    // Thread-directed: the handler runs before raise returns
    raise(Signal::SIGUSR1).unwrap();

    assert!(process_latch().is_set());
    assert!(process_state().is_pending(harness.reason).unwrap());

    let invoked = InterruptProcessor::for_process()
        .check_for_interrupts()
        .unwrap();
    assert_eq!(invoked, 1);
    assert_eq!(CALLS.load(Ordering::SeqCst), before + 1);
    assert!(!process_state().is_pending(harness.reason).unwrap());
}

#[test]
#[serial]
fn test_signal_without_custom_reason_only_wakes() {
    let harness = harness();
    let before = CALLS.load(Ordering::SeqCst);
    process_latch().reset();

    raise(Signal::SIGUSR1).unwrap();

    assert!(process_latch().is_set());
    assert_eq!(
        InterruptProcessor::for_process()
            .check_for_interrupts()
            .unwrap(),
        0
    );
    assert_eq!(CALLS.load(Ordering::SeqCst), before);
    assert!(!process_state().is_pending(harness.reason).unwrap());
}

#[test]
#[serial]
fn test_send_raises_signal_and_wakes_latch() {
    let harness = harness();
    let before = CALLS.load(Ordering::SeqCst);
    let latch = process_latch();
    latch.reset();

    // Process-directed: may land on any thread, so wait on the latch
    harness.slots.send(current_pid(), harness.reason).unwrap();
    assert!(latch.wait(Duration::from_secs(5)).unwrap());

    let invoked = InterruptProcessor::for_process()
        .check_for_interrupts()
        .unwrap();
    assert_eq!(invoked, 1);
    assert_eq!(CALLS.load(Ordering::SeqCst), before + 1);
}

#[test]
#[serial]
fn test_send_to_unattached_process_fails() {
    let harness = harness();
    let stranger = current_pid().wrapping_add(1_000_000);
    assert_eq!(
        harness.slots.send(stranger, harness.reason),
        Err(SignalError::ProcessNotFound(stranger))
    );
}
