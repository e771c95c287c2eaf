use std::io::{self, Write};

use super::{CallStackPrinter, render};
use crate::{
    CallStackTrace,
    formatter::{CallStackFormatter, PlainTextFormatter},
};

/// The console stream a [`ConsolePrinter`] writes to.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ConsoleStream {
    /// Standard output.
    Stdout,
    /// Standard error.
    Stderr,
}

/// Prints dumps to standard output or standard error.
///
/// Each dump is written with a single `write_all` on the locked stream, so
/// dumps from different threads do not interleave. Write failures are logged
/// with [`tracing::warn!`] and otherwise ignored.
///
/// # Examples
///
/// ```
/// use calltrace::{
///     CallStackTracer,
///     formatter::PlainTextFormatter,
///     printer::ConsolePrinter,
/// };
///
/// let printer = ConsolePrinter::stderr().with_formatter(PlainTextFormatter {
///     indentation: "    ",
///     ..PlainTextFormatter::DEFAULT
/// });
/// let previous = CallStackTracer::new().set_printer(printer);
/// assert!(previous.is_none());
/// ```
#[derive(Copy, Clone, Debug)]
pub struct ConsolePrinter<F = PlainTextFormatter> {
    stream: ConsoleStream,
    formatter: F,
}

impl ConsolePrinter {
    /// A printer writing plain text to standard output.
    #[must_use]
    pub const fn stdout() -> Self {
        Self::new(ConsoleStream::Stdout)
    }

    /// A printer writing plain text to standard error.
    #[must_use]
    pub const fn stderr() -> Self {
        Self::new(ConsoleStream::Stderr)
    }

    /// A printer writing plain text to `stream`.
    #[must_use]
    pub const fn new(stream: ConsoleStream) -> Self {
        Self {
            stream,
            formatter: PlainTextFormatter::DEFAULT,
        }
    }
}

impl<F> ConsolePrinter<F> {
    /// Replaces the formatter.
    #[must_use]
    pub fn with_formatter<G>(self, formatter: G) -> ConsolePrinter<G>
    where
        G: CallStackFormatter,
    {
        ConsolePrinter {
            stream: self.stream,
            formatter,
        }
    }

    /// The stream this printer writes to.
    #[must_use]
    pub fn stream(&self) -> ConsoleStream {
        self.stream
    }

    fn write(&self, text: &str) -> io::Result<()> {
        match self.stream {
            ConsoleStream::Stdout => {
                let mut stdout = io::stdout().lock();
                stdout.write_all(text.as_bytes())?;
                stdout.flush()
            }
            ConsoleStream::Stderr => io::stderr().lock().write_all(text.as_bytes()),
        }
    }
}

impl<F> CallStackPrinter for ConsolePrinter<F>
where
    F: CallStackFormatter,
{
    fn print_trace(&self, stack: &CallStackTrace) {
        let Some(text) = render(&self.formatter, stack) else {
            return;
        };
        if let Err(error) = self.write(&text) {
            tracing::warn!(
                %error,
                stream = ?self.stream,
                thread = stack.thread_id(),
                "failed to write call stack trace"
            );
        }
    }
}
