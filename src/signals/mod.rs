/*!
 * Signals Module
 * Extension-defined process signals: registration, delivery and dispatch
 */

mod atomic_stats;
pub mod dispatcher;
pub mod os;
mod pending;
pub mod registry;
pub mod scanner;
pub mod state;
pub mod traits;
pub mod types;

// Re-export public API
pub use atomic_stats::AtomicSignalStats;
pub use dispatcher::DispatchReport;
pub use os::{attach_process_slot, has_process_slot, install_handler, process_latch};
pub use pending::PendingFlags;
pub use registry::{ReasonRegistry, RegistryPhase};
pub use scanner::check_and_set_custom_signal_interrupts;
pub use state::{process_state, register_custom_procsignal_handler, ProcSignalState};
pub use traits::*;
pub use types::{
    HandlerFn, ProcSignalReason, SignalError, SignalResult, SignalStats, NUM_CUSTOM_PROCSIGNALS,
    NUM_ENGINE_PROCSIGNALS, NUM_PROCSIGNALS,
};
