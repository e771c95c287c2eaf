//! Printers that deliver call stack dumps.
//!
//! When [`CallStackTracer::dump`](crate::CallStackTracer::dump) is called,
//! the tracer hands the calling thread's [`CallStackTrace`] to the configured
//! [`CallStackPrinter`]. The built-in printers all assemble the complete dump
//! with a [formatter](crate::formatter) first and then emit it in one piece:
//!
//! - [`ConsolePrinter`] writes to standard output or standard error.
//! - [`BufferPrinter`] appends to a shared in-memory buffer.
//! - [`TracingPrinter`] emits one [`tracing`] event per dump.
//!
//! ```
//! use calltrace::{
//!     CallStackTracer, CallTrace, ScopedCallTraceNotifier,
//!     printer::{BufferPrinter, CallStackPrinter},
//! };
//!
//! let buffer = BufferPrinter::new();
//! let tracer = CallStackTracer::get();
//!
//! let trace = CallTrace::without_arguments("fn main()");
//! let _scope = ScopedCallTraceNotifier::new(&trace);
//! tracer.dump_with(&buffer);
//!
//! assert!(buffer.contents().contains("-->fn main()"));
//! ```

mod buffer;
mod console;
mod tracing_printer;

use core::fmt;

pub use self::{
    buffer::BufferPrinter,
    console::{ConsolePrinter, ConsoleStream},
    tracing_printer::TracingPrinter,
};
use crate::{CallStackTrace, formatter::CallStackFormatter};

/// Delivers the dump of a call stack somewhere.
///
/// Printers are shared between threads, so they must be `Send + Sync`. A
/// printer may be called concurrently from several threads, each dumping its
/// own stack.
pub trait CallStackPrinter: 'static + Send + Sync {
    /// Prints `stack`.
    ///
    /// Printing must not fail the caller: problems are logged or ignored.
    fn print_trace(&self, stack: &CallStackTrace);
}

impl<F> CallStackPrinter for F
where
    F: Fn(&CallStackTrace) + 'static + Send + Sync,
{
    fn print_trace(&self, stack: &CallStackTrace) {
        self(stack)
    }
}

/// Runs `formatter` over `stack`, returning `None` if the formatter failed.
fn render(formatter: &dyn CallStackFormatter, stack: &CallStackTrace) -> Option<String> {
    let mut out = String::new();
    match formatter.format_stack(&mut out, stack) {
        Ok(()) => Some(out),
        Err(fmt::Error) => {
            tracing::warn!(
                thread = stack.thread_id(),
                "call stack formatter returned an error, dump skipped"
            );
            None
        }
    }
}
