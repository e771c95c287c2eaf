//! The plain-text call stack formatter.

use core::fmt::{self, Write};

use super::CallStackFormatter;
use crate::{CallStackTrace, CallTrace};

/// A configurable plain-text [`CallStackFormatter`].
///
/// Every piece of fixed text is a public field, so variations can be built
/// from [`PlainTextFormatter::DEFAULT`] with struct update syntax.
///
/// For a call at depth `d` the output is:
///
/// ```text
/// {indentation × d}{call_prefix}{signature}{line_suffix}
/// {indentation × d}{argument_prefix}{this_label}{class}={state}{line_suffix}   (methods only)
/// {indentation × d}{argument_prefix}{index}{type}={value}{line_suffix}         (per argument)
/// ```
///
/// where the receiver and argument labels are wrapped in
/// `label_open`/`label_close`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PlainTextFormatter {
    /// Text before the thread label in the stack header.
    pub stack_header_prefix: &'static str,
    /// Text after the thread label in the stack header.
    pub stack_header_suffix: &'static str,
    /// Indentation added per level of call depth.
    pub indentation: &'static str,
    /// Text between the indentation and a call's signature.
    pub call_prefix: &'static str,
    /// Text between the indentation and an argument or receiver line.
    pub argument_prefix: &'static str,
    /// Opens the label of an argument or receiver line.
    pub label_open: &'static str,
    /// Closes the label of an argument or receiver line.
    pub label_close: &'static str,
    /// Label of the receiver line.
    pub this_label: &'static str,
    /// Stands in for the class of a receiver that only has a state.
    pub unknown_class: &'static str,
    /// Stands in for the state of a receiver that only has a class.
    pub missing_state: &'static str,
    /// Ends every line belonging to a call.
    pub line_suffix: &'static str,
    /// The stack footer.
    pub stack_footer: &'static str,
}

impl PlainTextFormatter {
    /// The default layout.
    ///
    /// ```
    /// use calltrace::{ArgumentTrace, CallStackTrace, CallTrace};
    ///
    /// let mut stack = CallStackTrace::new("ThreadId");
    /// stack.push(CallTrace::new("int function(int i)", [ArgumentTrace::from(5_i32)]));
    /// assert_eq!(
    ///     stack.to_string(),
    ///     "Call stack trace for ThreadId\n\
    ///      -->int function(int i)\n  | -{0}i32=5\n\
    ///      End of call stack trace information.\n"
    /// );
    /// ```
    pub const DEFAULT: Self = Self {
        stack_header_prefix: "Call stack trace for ",
        stack_header_suffix: "\n",
        indentation: "  ",
        call_prefix: "-->",
        argument_prefix: "  | -",
        label_open: "{",
        label_close: "}",
        this_label: "this",
        unknown_class: "<Unknown class>",
        missing_state: "<No state>",
        line_suffix: "\n",
        stack_footer: "End of call stack trace information.\n",
    };

    fn indent(&self, out: &mut String, depth: usize) {
        for _ in 0..depth {
            out.push_str(self.indentation);
        }
    }
}

impl Default for PlainTextFormatter {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl CallStackFormatter for PlainTextFormatter {
    fn format_stack_header(&self, out: &mut String, stack: &CallStackTrace) -> fmt::Result {
        write!(
            out,
            "{}{}{}",
            self.stack_header_prefix,
            stack.thread_id(),
            self.stack_header_suffix
        )
    }

    fn format_call_header(
        &self,
        out: &mut String,
        trace: &CallTrace,
        depth: usize,
    ) -> fmt::Result {
        self.indent(out, depth);
        write!(
            out,
            "{}{}{}",
            self.call_prefix,
            trace.signature(),
            self.line_suffix
        )
    }

    fn format_call_body(&self, out: &mut String, trace: &CallTrace, depth: usize) -> fmt::Result {
        if trace.class_name().is_some() || trace.object_state().is_some() {
            self.indent(out, depth);
            write!(
                out,
                "{}{}{}{}{}={}{}",
                self.argument_prefix,
                self.label_open,
                self.this_label,
                self.label_close,
                trace.class_name().unwrap_or(self.unknown_class),
                trace.object_state().unwrap_or(self.missing_state),
                self.line_suffix
            )?;
        }

        for (index, argument) in trace.arguments().iter().enumerate() {
            self.indent(out, depth);
            write!(
                out,
                "{}{}{index}{}{argument}{}",
                self.argument_prefix, self.label_open, self.label_close, self.line_suffix
            )?;
        }
        Ok(())
    }

    fn format_stack_footer(&self, out: &mut String, _stack: &CallStackTrace) -> fmt::Result {
        out.push_str(self.stack_footer);
        Ok(())
    }
}
