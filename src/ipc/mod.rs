/*!
 * IPC Module
 * Shared delivery substrate for process signals
 */

pub mod latch;
pub mod slots;

// Re-export for convenience
pub use latch::ProcessLatch;
pub use slots::{Notify, ProcSignalSlot, ProcSignalSlots};
