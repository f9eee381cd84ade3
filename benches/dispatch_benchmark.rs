/*!
 * Custom Signal Benchmarks
 *
 * Cost of the signal-context scan and of a dispatch pass
 */

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use custom_procsignal::signals::check_and_set_custom_signal_interrupts;
use custom_procsignal::signals::dispatcher::dispatch;
use custom_procsignal::{
    Latch, Notify, PendingReasons, ProcSignalReason, ProcSignalSlots, ProcSignalState,
    SignalResult, NUM_CUSTOM_PROCSIGNALS,
};

struct NoopLatch;

impl Latch for NoopLatch {
    fn set(&self) {}
}

fn noop() -> SignalResult<()> {
    Ok(())
}

fn registered_state() -> ProcSignalState {
    let state = ProcSignalState::new();
    state.begin_preload();
    for _ in 0..NUM_CUSTOM_PROCSIGNALS {
        state.register(noop);
    }
    state.finish_preload();
    state
}

fn bench_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("signal_context_scan");
    let state = registered_state();
    let slots = ProcSignalSlots::new(Notify::FlagOnly);
    let slot = slots.attach(1).unwrap();

    for pending in [0usize, 1, 8, NUM_CUSTOM_PROCSIGNALS] {
        group.bench_with_input(BenchmarkId::from_parameter(pending), &pending, |b, &pending| {
            b.iter(|| {
                for reason in ProcSignalReason::custom_reasons().take(pending) {
                    slot.mark(reason);
                }
                black_box(check_and_set_custom_signal_interrupts(
                    &state,
                    slot.as_ref(),
                    &NoopLatch,
                ))
            });
        });
    }

    group.finish();
}

fn bench_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("dispatch_pass");
    let state = registered_state();

    for pending in [0usize, 1, 8, NUM_CUSTOM_PROCSIGNALS] {
        group.bench_with_input(BenchmarkId::from_parameter(pending), &pending, |b, &pending| {
            b.iter(|| {
                for index in 0..pending {
                    state.pending().set(index);
                }
                black_box(dispatch(&state).ok())
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_scan, bench_dispatch);
criterion_main!(benches);
