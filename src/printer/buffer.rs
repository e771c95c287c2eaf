use core::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::{CallStackPrinter, render};
use crate::{
    CallStackTrace,
    formatter::{CallStackFormatter, PlainTextFormatter},
};

/// Appends dumps to an in-memory buffer.
///
/// Clones share the same buffer, so one clone can be installed in the tracer
/// while another is kept to read what was printed.
///
/// # Examples
///
/// ```
/// use calltrace::{CallStackTracer, CallTrace, printer::BufferPrinter};
///
/// let tracer = CallStackTracer::new();
/// let buffer = BufferPrinter::new();
/// tracer.set_printer(buffer.clone());
///
/// tracer.add_trace(&CallTrace::without_arguments("fn step()"));
/// tracer.dump();
/// tracer.remove_last_trace();
///
/// assert!(buffer.take().contains("-->fn step()"));
/// assert_eq!(buffer.contents(), "");
/// ```
#[derive(Clone)]
pub struct BufferPrinter<F = PlainTextFormatter> {
    buffer: Arc<Mutex<String>>,
    formatter: F,
}

impl BufferPrinter {
    /// A printer writing plain text into a new, empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::with_formatter(PlainTextFormatter::DEFAULT)
    }
}

impl Default for BufferPrinter {
    fn default() -> Self {
        Self::new()
    }
}

impl<F> BufferPrinter<F> {
    /// A printer writing into a new, empty buffer with `formatter`.
    #[must_use]
    pub fn with_formatter(formatter: F) -> Self {
        Self {
            buffer: Arc::new(Mutex::new(String::new())),
            formatter,
        }
    }

    /// A copy of everything printed so far.
    #[must_use]
    pub fn contents(&self) -> String {
        self.lock().clone()
    }

    /// Returns everything printed so far and empties the buffer.
    #[must_use]
    pub fn take(&self) -> String {
        core::mem::take(&mut *self.lock())
    }

    fn lock(&self) -> MutexGuard<'_, String> {
        self.buffer.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<F> CallStackPrinter for BufferPrinter<F>
where
    F: CallStackFormatter,
{
    fn print_trace(&self, stack: &CallStackTrace) {
        if let Some(text) = render(&self.formatter, stack) {
            self.lock().push_str(&text);
        }
    }
}

impl<F> fmt::Debug for BufferPrinter<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BufferPrinter")
            .field("len", &self.lock().len())
            .finish_non_exhaustive()
    }
}
