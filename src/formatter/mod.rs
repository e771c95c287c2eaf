//! Formatters that turn a [`CallStackTrace`] into text.
//!
//! A formatter does not print anything. It appends text to a `String` that a
//! [printer](crate::printer) provides, piece by piece:
//!
//! 1. the stack header,
//! 2. for every call, from the bottom of the stack to the top, a call header,
//!    a call body and a call footer, each given the zero-based depth of the
//!    call,
//! 3. the stack footer.
//!
//! [`CallStackFormatter::format_stack`] drives these steps; printers call it
//! once per dump.
//!
//! # Default Formatter
//!
//! [`PlainTextFormatter::DEFAULT`] produces output such as:
//!
//! ```text
//! Call stack trace for main (ThreadId(1))
//! -->fn load(path: &str, retries: u8)
//!   | -{0}str=config.toml
//!   | -{1}u8=3
//!   -->fn parse(input: &str)
//!     | -{0}str=[server]
//! End of call stack trace information.
//! ```
//!
//! # Custom Formatters
//!
//! ```
//! use core::fmt::{self, Write};
//!
//! use calltrace::{CallStackTrace, CallTrace, formatter::CallStackFormatter};
//!
//! struct OneLine;
//!
//! impl CallStackFormatter for OneLine {
//!     fn format_stack_header(&self, out: &mut String, stack: &CallStackTrace) -> fmt::Result {
//!         write!(out, "{}:", stack.thread_id())
//!     }
//!
//!     fn format_call_header(&self, out: &mut String, trace: &CallTrace, _depth: usize) -> fmt::Result {
//!         write!(out, " {}", trace.signature())
//!     }
//!
//!     fn format_call_body(&self, _out: &mut String, _trace: &CallTrace, _depth: usize) -> fmt::Result {
//!         Ok(())
//!     }
//!
//!     fn format_stack_footer(&self, out: &mut String, _stack: &CallStackTrace) -> fmt::Result {
//!         out.push('\n');
//!         Ok(())
//!     }
//! }
//!
//! let mut stack = CallStackTrace::new("main");
//! stack.push(CallTrace::without_arguments("a()"));
//! stack.push(CallTrace::without_arguments("b()"));
//! assert_eq!(stack.format_with(&OneLine).to_string(), "main: a() b()\n");
//! ```

mod plain_text;

use core::fmt;

pub use self::plain_text::PlainTextFormatter;
use crate::{CallStackTrace, CallTrace};

/// Generates the text of a call stack dump.
///
/// Implementations only append to `out`; they never modify the traces.
pub trait CallStackFormatter: 'static + Send + Sync {
    /// Appends the text that opens a dump of `stack`.
    fn format_stack_header(&self, out: &mut String, stack: &CallStackTrace) -> fmt::Result;

    /// Appends the first part of one call, usually its signature.
    fn format_call_header(&self, out: &mut String, trace: &CallTrace, depth: usize)
    -> fmt::Result;

    /// Appends the details of one call, usually its arguments.
    fn format_call_body(&self, out: &mut String, trace: &CallTrace, depth: usize) -> fmt::Result;

    /// Appends the text that closes one call. Nothing by default.
    fn format_call_footer(
        &self,
        out: &mut String,
        trace: &CallTrace,
        depth: usize,
    ) -> fmt::Result {
        let _ = (out, trace, depth);
        Ok(())
    }

    /// Appends the text that closes a dump of `stack`.
    fn format_stack_footer(&self, out: &mut String, stack: &CallStackTrace) -> fmt::Result;

    /// Appends a full dump of `stack`.
    ///
    /// The default implementation calls the other methods in order, walking
    /// the stack from the bottom to the top.
    fn format_stack(&self, out: &mut String, stack: &CallStackTrace) -> fmt::Result {
        self.format_stack_header(out, stack)?;
        for (depth, trace) in stack.iter().enumerate() {
            self.format_call_header(out, trace, depth)?;
            self.format_call_body(out, trace, depth)?;
            self.format_call_footer(out, trace, depth)?;
        }
        self.format_stack_footer(out, stack)
    }
}

#[cfg(test)]
mod tests {
    use core::fmt::Write;

    use super::*;

    /// Records the order in which the steps are called.
    struct StepRecorder;

    impl CallStackFormatter for StepRecorder {
        fn format_stack_header(&self, out: &mut String, stack: &CallStackTrace) -> fmt::Result {
            writeln!(out, "stack_header {}", stack.len())
        }

        fn format_call_header(
            &self,
            out: &mut String,
            trace: &CallTrace,
            depth: usize,
        ) -> fmt::Result {
            writeln!(out, "call_header {depth} {}", trace.signature())
        }

        fn format_call_body(&self, out: &mut String, _: &CallTrace, depth: usize) -> fmt::Result {
            writeln!(out, "call_body {depth}")
        }

        fn format_call_footer(&self, out: &mut String, _: &CallTrace, depth: usize) -> fmt::Result {
            writeln!(out, "call_footer {depth}")
        }

        fn format_stack_footer(&self, out: &mut String, _: &CallStackTrace) -> fmt::Result {
            writeln!(out, "stack_footer")
        }
    }

    #[test]
    fn test_steps_run_bottom_to_top() {
        let mut stack = CallStackTrace::new("t");
        stack.push(CallTrace::without_arguments("outer"));
        stack.push(CallTrace::without_arguments("inner"));

        let mut out = String::new();
        StepRecorder.format_stack(&mut out, &stack).unwrap();
        assert_eq!(
            out,
            "stack_header 2\n\
             call_header 0 outer\n\
             call_body 0\n\
             call_footer 0\n\
             call_header 1 inner\n\
             call_body 1\n\
             call_footer 1\n\
             stack_footer\n"
        );
    }

    #[test]
    fn test_empty_stack_has_header_and_footer() {
        let mut out = String::new();
        StepRecorder
            .format_stack(&mut out, &CallStackTrace::new("t"))
            .unwrap();
        assert_eq!(out, "stack_header 0\nstack_footer\n");
    }
}
