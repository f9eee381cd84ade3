/*!
 * Custom Process Signals - Demo Entry Point
 *
 * Walks one process through the full lifecycle:
 * - Registering extension handlers during the preload window
 * - Attaching a signal slot and installing the OS handler
 * - Sending custom reasons to itself
 * - Draining them through the interrupt entry point
 */

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

use custom_procsignal::core::current_pid;
use custom_procsignal::signals::{attach_process_slot, install_handler, process_latch};
use custom_procsignal::{
    init_tracing, process_state, register_custom_procsignal_handler, EngineError,
    InterruptProcessor, Notify, ProcSignalConfig, ProcSignalSlots, ReasonDelivery,
};

fn main() -> miette::Result<()> {
    let config = ProcSignalConfig::from_env()?;
    init_tracing(config.trace_json);

    let pid = current_pid();
    info!(pid, "Custom process signal demo starting");

    // Preload window: extensions claim their reasons here
    let state = process_state();
    state.begin_preload();

    let reloads = Arc::new(AtomicUsize::new(0));
    let reload_count = reloads.clone();
    let reload = register_custom_procsignal_handler(move || {
        let n = reload_count.fetch_add(1, Ordering::SeqCst) + 1;
        info!(count = n, "Configuration reload requested");
        Ok(())
    });

    let flush = register_custom_procsignal_handler(|| {
        info!("Statistics flush requested");
        Ok(())
    });

    state.finish_preload();

    if !reload.is_valid() || !flush.is_valid() {
        warn!("No custom signal reasons left; nothing to demonstrate");
        return Ok(());
    }
    info!(%reload, %flush, "Custom signal reasons registered");

    let slots = ProcSignalSlots::new(Notify::Kill(config.notify_signal));
    attach_process_slot(slots.attach(pid)?);
    install_handler(config.notify_signal)?;

    // Sending the same reason twice before dispatch coalesces into one call
    slots.send(pid, reload)?;
    slots.send(pid, flush)?;
    slots.send(pid, reload)?;

    let latch = process_latch();
    let processor = InterruptProcessor::for_process();
    let expected = 2;
    let mut invoked = 0;

    loop {
        latch.reset();

        let span = custom_procsignal::monitoring::span_interrupts(pid);
        let _entered = span.enter();
        invoked += processor.check_for_interrupts()?;
        span.record("invoked", invoked);

        if invoked >= expected {
            break;
        }
        if !latch.wait(config.latch_timeout)? {
            warn!(invoked, "Timed out waiting for custom signals");
            break;
        }
    }

    info!(
        reloads = reloads.load(Ordering::SeqCst),
        invoked, "Custom signals handled"
    );

    let stats = serde_json::to_string_pretty(&state.stats_snapshot()).map_err(EngineError::from)?;
    println!("{}", stats);

    Ok(())
}
