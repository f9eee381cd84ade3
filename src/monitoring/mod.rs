/*!
 * Monitoring
 * Structured logging for the signalling layer
 */

mod tracer;

pub use tracer::{init_tracing, span_interrupts};
