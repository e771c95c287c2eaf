use core::{fmt, slice};

use crate::{
    CallTrace,
    formatter::{CallStackFormatter, PlainTextFormatter},
};

/// The active calls of one thread, outermost first.
///
/// The tracer keeps one of these per thread that currently has at least one
/// active call. [`CallStackTracer::current_trace`] hands out a copy, and
/// printers receive one for every dump.
///
/// [`CallStackTracer::current_trace`]: crate::CallStackTracer::current_trace
///
/// # Examples
///
/// ```
/// use calltrace::{CallStackTrace, CallTrace};
///
/// let mut stack = CallStackTrace::new("main");
/// stack.push(CallTrace::without_arguments("fn outer()"));
/// stack.push(CallTrace::without_arguments("fn inner()"));
///
/// assert_eq!(stack.len(), 2);
/// assert_eq!(stack.trace(0).signature(), "fn outer()");
/// assert_eq!(stack.pop().map(|t| t.signature()), Some("fn inner()"));
/// ```
#[derive(Clone, Debug)]
pub struct CallStackTrace {
    thread_id: String,
    traces: Vec<CallTrace>,
}

impl CallStackTrace {
    /// Creates an empty stack belonging to the thread labelled `thread_id`.
    #[must_use]
    pub fn new(thread_id: impl Into<String>) -> Self {
        Self {
            thread_id: thread_id.into(),
            traces: Vec::new(),
        }
    }

    /// Pushes a call on top of the stack.
    pub fn push(&mut self, trace: CallTrace) {
        self.traces.push(trace);
    }

    /// Removes the topmost call.
    ///
    /// The stack must not be empty. This is checked in debug builds; in
    /// release builds popping an empty stack does nothing and returns `None`.
    pub fn pop(&mut self) -> Option<CallTrace> {
        debug_assert!(!self.traces.is_empty(), "popped an empty call stack");
        self.traces.pop()
    }

    /// Returns the call at `index`, counting from the bottom of the stack.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.len()`.
    #[must_use]
    pub fn trace(&self, index: usize) -> &CallTrace {
        &self.traces[index]
    }

    /// The number of active calls.
    #[must_use]
    pub fn len(&self) -> usize {
        self.traces.len()
    }

    /// Returns `true` if there are no active calls.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.traces.is_empty()
    }

    /// The label of the thread this stack belongs to.
    #[must_use]
    pub fn thread_id(&self) -> &str {
        &self.thread_id
    }

    /// Iterates over the calls from the bottom of the stack to the top.
    pub fn iter(&self) -> slice::Iter<'_, CallTrace> {
        self.traces.iter()
    }

    /// Formats the stack with a specific formatter.
    ///
    /// The `Display` implementation of `CallStackTrace` uses
    /// [`PlainTextFormatter::DEFAULT`].
    ///
    /// # Examples
    ///
    /// ```
    /// use calltrace::{CallStackTrace, CallTrace, formatter::PlainTextFormatter};
    ///
    /// let mut stack = CallStackTrace::new("worker");
    /// stack.push(CallTrace::without_arguments("fn run()"));
    ///
    /// let compact = PlainTextFormatter {
    ///     stack_header_prefix: "[",
    ///     stack_header_suffix: "]\n",
    ///     stack_footer: "",
    ///     ..PlainTextFormatter::DEFAULT
    /// };
    /// assert_eq!(stack.format_with(&compact).to_string(), "[worker]\n-->fn run()\n");
    /// ```
    pub fn format_with<'a>(
        &'a self,
        formatter: &'a dyn CallStackFormatter,
    ) -> impl fmt::Display + fmt::Debug + 'a {
        FormattedStack {
            stack: self,
            formatter,
        }
    }
}

/// A stack paired with the formatter that renders it. `Debug` renders the
/// same text as `Display`.
struct FormattedStack<'a> {
    stack: &'a CallStackTrace,
    formatter: &'a dyn CallStackFormatter,
}

impl fmt::Display for FormattedStack<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_stack(self.stack, self.formatter, f)
    }
}

impl fmt::Debug for FormattedStack<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_stack(self.stack, self.formatter, f)
    }
}

fn write_stack(
    stack: &CallStackTrace,
    formatter: &dyn CallStackFormatter,
    f: &mut fmt::Formatter<'_>,
) -> fmt::Result {
    let mut out = String::new();
    formatter.format_stack(&mut out, stack)?;
    f.write_str(&out)
}

impl fmt::Display for CallStackTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_stack(self, &PlainTextFormatter::DEFAULT, f)
    }
}

impl<'a> IntoIterator for &'a CallStackTrace {
    type Item = &'a CallTrace;
    type IntoIter = slice::Iter<'a, CallTrace>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
