use tracing::Level;

use super::{CallStackPrinter, render};
use crate::{
    CallStackTrace,
    formatter::{CallStackFormatter, PlainTextFormatter},
};

/// Emits every dump as one [`tracing`] event.
///
/// The formatted stack is the event's message; the thread label and the
/// stack depth are recorded as the `thread` and `depth` fields. Events use
/// the `calltrace` target.
///
/// # Examples
///
/// ```
/// use calltrace::{CallStackTracer, printer::TracingPrinter};
/// use tracing::Level;
///
/// CallStackTracer::new().set_printer(TracingPrinter::new(Level::DEBUG));
/// ```
#[derive(Copy, Clone, Debug)]
pub struct TracingPrinter<F = PlainTextFormatter> {
    level: Level,
    formatter: F,
}

impl TracingPrinter {
    /// A printer emitting plain-text dumps at `level`.
    #[must_use]
    pub const fn new(level: Level) -> Self {
        Self {
            level,
            formatter: PlainTextFormatter::DEFAULT,
        }
    }
}

impl Default for TracingPrinter {
    fn default() -> Self {
        Self::new(Level::INFO)
    }
}

impl<F> TracingPrinter<F> {
    /// Replaces the formatter.
    #[must_use]
    pub fn with_formatter<G>(self, formatter: G) -> TracingPrinter<G>
    where
        G: CallStackFormatter,
    {
        TracingPrinter {
            level: self.level,
            formatter,
        }
    }

    /// The level events are emitted at.
    #[must_use]
    pub fn level(&self) -> Level {
        self.level
    }
}

macro_rules! emit {
    ($level:expr, $stack:expr, $text:expr) => {
        tracing::event!(
            target: "calltrace",
            $level,
            thread = $stack.thread_id(),
            depth = $stack.len(),
            "{}",
            $text
        )
    };
}

impl<F> CallStackPrinter for TracingPrinter<F>
where
    F: CallStackFormatter,
{
    fn print_trace(&self, stack: &CallStackTrace) {
        let Some(text) = render(&self.formatter, stack) else {
            return;
        };
        let text = text.trim_end();
        if self.level == Level::ERROR {
            emit!(Level::ERROR, stack, text);
        } else if self.level == Level::WARN {
            emit!(Level::WARN, stack, text);
        } else if self.level == Level::INFO {
            emit!(Level::INFO, stack, text);
        } else if self.level == Level::DEBUG {
            emit!(Level::DEBUG, stack, text);
        } else {
            emit!(Level::TRACE, stack, text);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_level() {
        assert_eq!(TracingPrinter::default().level(), Level::INFO);
        assert_eq!(
            TracingPrinter::new(Level::TRACE)
                .with_formatter(PlainTextFormatter::DEFAULT)
                .level(),
            Level::TRACE
        );
    }
}
