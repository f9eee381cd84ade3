/*!
 * Custom Process Signals
 * Extension-defined signal reasons layered on per-process shared slots
 */

pub mod core;
pub mod interrupts;
pub mod ipc;
pub mod monitoring;
pub mod signals;

// Re-exports
pub use crate::core::{ConfigError, EngineError, EngineResult, Pid, ProcSignalConfig};
pub use interrupts::{InterruptHold, InterruptProcessor, InterruptState};
pub use ipc::{Notify, ProcSignalSlot, ProcSignalSlots, ProcessLatch};
pub use monitoring::init_tracing;
pub use signals::{
    process_state, register_custom_procsignal_handler, DispatchReport, HandlerFn, Latch,
    PendingReasons, ProcSignalReason, ProcSignalState, ReasonDelivery, SignalError, SignalResult,
    SignalStats, NUM_CUSTOM_PROCSIGNALS,
};
