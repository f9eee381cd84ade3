/*!
 * Interrupts Module
 * Deferred interrupt processing for signal-driven work
 */

mod processor;
mod state;

pub use processor::InterruptProcessor;
pub use state::{InterruptHold, InterruptState};
