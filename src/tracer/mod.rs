//! The process-wide registry of active calls.
//!
//! [`CallStackTracer`] keeps one [`CallStackTrace`] per thread that currently
//! has at least one active call, and the printer used by
//! [`dump`](CallStackTracer::dump). The two are guarded by separate locks and
//! no operation ever holds both: pushing and popping calls happens on every
//! instrumented function entry and exit, while the printer is changed rarely
//! and only read when dumping.
//!
//! Each thread only ever modifies and dumps its own stack. Nothing outside the
//! tracer runs while one of its locks is held: log events are emitted and
//! printers are called only after the guard is dropped.
//!
//! # Per-thread lifecycle
//!
//! A thread without active calls has no stack at all. Its first
//! [`add_trace`](CallStackTracer::add_trace) creates one; the
//! [`remove_last_trace`](CallStackTracer::remove_last_trace) that empties it
//! removes it again.
//!
//! ```
//! use calltrace::{CallStackTracer, CallTrace};
//!
//! let tracer = CallStackTracer::new();
//! assert_eq!(tracer.depth(), 0);
//!
//! tracer.add_trace(&CallTrace::without_arguments("fn outer()"));
//! tracer.add_trace(&CallTrace::without_arguments("fn inner()"));
//! assert_eq!(tracer.depth(), 2);
//! assert_eq!(tracer.active_thread_count(), 1);
//!
//! tracer.remove_last_trace();
//! tracer.remove_last_trace();
//! assert!(tracer.current_trace().is_none());
//! assert_eq!(tracer.active_thread_count(), 0);
//! ```

mod tracer_lock;

use core::fmt;
use std::{
    sync::OnceLock,
    thread::{self, Thread, ThreadId},
};

use hashbrown::HashMap;
use rustc_hash::FxBuildHasher;
use triomphe::Arc;
use unsize::CoerceUnsize;

use self::tracer_lock::TracerLock;
use crate::{
    CallStackTrace, CallTrace,
    printer::{CallStackPrinter, ConsolePrinter, TracingPrinter},
};

/// A shared handle to a printer.
pub type SharedPrinter = Arc<dyn CallStackPrinter>;

type StackMap = HashMap<ThreadId, CallStackTrace, FxBuildHasher>;

static TRACER: CallStackTracer = CallStackTracer::new();

/// Records the active calls of every thread and dumps them on request.
///
/// Most code uses the process-wide instance returned by
/// [`CallStackTracer::get`], which is what [`ScopedCallTraceNotifier`] and
/// [`trace_scope!`] talk to. Separate instances can be created with
/// [`CallStackTracer::new`].
///
/// [`ScopedCallTraceNotifier`]: crate::ScopedCallTraceNotifier
/// [`trace_scope!`]: crate::trace_scope
pub struct CallStackTracer {
    stacks: TracerLock<StackMap>,
    printer: TracerLock<Option<SharedPrinter>>,
}

impl CallStackTracer {
    /// Creates a tracer with no active calls and no printer.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            stacks: TracerLock::new(HashMap::with_hasher(FxBuildHasher)),
            printer: TracerLock::new(None),
        }
    }

    /// The process-wide tracer.
    ///
    /// It exists for the whole life of the process and is never dropped.
    #[inline]
    #[must_use]
    pub fn get() -> &'static Self {
        &TRACER
    }

    /// Pushes `trace` on the calling thread's stack, creating the stack if the
    /// thread had no active calls.
    pub fn add_trace(&self, trace: &CallTrace) {
        let thread = thread::current();
        let trace = trace.clone();
        let created = {
            let mut guard = self.stacks.write();
            let mut created = false;
            guard
                .get()
                .entry(thread.id())
                .or_insert_with(|| {
                    created = true;
                    CallStackTrace::new(thread_label(&thread))
                })
                .push(trace);
            created
        };

        if created {
            tracing::trace!(thread = %thread_label(&thread), "call stack created");
        }
    }

    /// Pops the topmost call from the calling thread's stack, removing the
    /// stack once it is empty.
    ///
    /// Every call must match an earlier [`add_trace`](Self::add_trace) on the
    /// same thread. An unmatched call is a bug in the caller: it is logged,
    /// asserted against in debug builds and ignored otherwise.
    pub fn remove_last_trace(&self) {
        let id = thread::current().id();
        let outcome = {
            let mut guard = self.stacks.write();
            let stacks = guard.get();
            let emptied = stacks.get_mut(&id).map(|stack| {
                stack.pop();
                stack.is_empty()
            });
            if emptied == Some(true) {
                stacks.remove(&id);
            }
            emptied
        };

        match outcome {
            Some(true) => tracing::trace!(thread = ?id, "call stack removed"),
            Some(false) => {}
            None => {
                tracing::warn!(thread = ?id, "removed a call trace from a thread without one");
                debug_assert!(false, "removed a call trace from a thread without one");
            }
        }
    }

    /// Prints the calling thread's stack with the configured printer.
    ///
    /// Does nothing if no printer is configured or the thread has no active
    /// calls. The printer runs without any of the tracer's locks held.
    pub fn dump(&self) {
        if let Some(printer) = self.printer() {
            self.dump_with(&*printer);
        }
    }

    /// Prints the calling thread's stack with `printer`, ignoring the
    /// configured one.
    ///
    /// Does nothing if the thread has no active calls.
    pub fn dump_with(&self, printer: &dyn CallStackPrinter) {
        if let Some(stack) = self.current_trace() {
            printer.print_trace(&stack);
        }
    }

    /// A copy of the calling thread's stack, or `None` if it has no active
    /// calls.
    ///
    /// The copy is cheap: the argument snapshots are shared, not cloned.
    #[must_use]
    pub fn current_trace(&self) -> Option<CallStackTrace> {
        let id = thread::current().id();
        self.stacks.read().get().get(&id).cloned()
    }

    /// The number of active calls on the calling thread.
    #[must_use]
    pub fn depth(&self) -> usize {
        let id = thread::current().id();
        self.stacks
            .read()
            .get()
            .get(&id)
            .map_or(0, CallStackTrace::len)
    }

    /// The number of threads that currently have active calls.
    #[must_use]
    pub fn active_thread_count(&self) -> usize {
        self.stacks.read().get().len()
    }

    /// The configured printer, if any.
    #[must_use]
    pub fn printer(&self) -> Option<SharedPrinter> {
        self.printer.read().get().clone()
    }

    /// Configures `printer`, returning the one it replaces.
    pub fn set_printer(&self, printer: impl CallStackPrinter) -> Option<SharedPrinter> {
        self.set_shared_printer(Arc::new(printer).unsize(unsize::Coercion!(to dyn CallStackPrinter)))
    }

    /// Configures an already shared printer, returning the one it replaces.
    ///
    /// # Examples
    ///
    /// ```
    /// use calltrace::{CallStackTracer, printer::BufferPrinter};
    ///
    /// let tracer = CallStackTracer::new();
    /// tracer.set_printer(BufferPrinter::new());
    ///
    /// let shared = tracer.printer().expect("printer was just set");
    /// let other = CallStackTracer::new();
    /// assert!(other.set_shared_printer(shared).is_none());
    /// assert!(other.printer().is_some());
    /// ```
    pub fn set_shared_printer(&self, printer: SharedPrinter) -> Option<SharedPrinter> {
        let previous = self.printer.write().get().replace(printer);
        tracing::debug!(replaced = previous.is_some(), "call stack printer set");
        previous
    }

    /// Removes the configured printer, returning it.
    pub fn clear_printer(&self) -> Option<SharedPrinter> {
        let previous = self.printer.write().get().take();
        tracing::debug!(removed = previous.is_some(), "call stack printer cleared");
        previous
    }

    /// Configures `printer` unless a printer is already configured.
    ///
    /// If one is, the printer is handed back inside the error.
    ///
    /// See also [`set_printer`](Self::set_printer), which replaces any
    /// existing printer.
    ///
    /// # Examples
    ///
    /// ```
    /// use calltrace::{CallStackTracer, printer::ConsolePrinter};
    ///
    /// let tracer = CallStackTracer::new();
    /// tracer.install_printer(ConsolePrinter::stdout()).expect("no printer yet");
    ///
    /// let error = tracer.install_printer(ConsolePrinter::stderr()).unwrap_err();
    /// assert_eq!(error.to_string(), "a call stack printer is already installed");
    /// ```
    pub fn install_printer<P>(&self, printer: P) -> Result<(), PrinterAlreadyInstalledError<P>>
    where
        P: CallStackPrinter,
    {
        {
            let mut guard = self.printer.write();
            let slot = guard.get();
            if slot.is_some() {
                return Err(PrinterAlreadyInstalledError(printer));
            }
            *slot = Some(Arc::new(printer).unsize(unsize::Coercion!(to dyn CallStackPrinter)));
        }

        tracing::debug!("call stack printer installed");
        Ok(())
    }

    /// Installs the printer selected by the `CALLTRACE` environment variable,
    /// if it selects one and no printer is configured yet.
    ///
    /// Returns whether a printer was installed. The variable is read once per
    /// process.
    ///
    /// # Environment Variables
    ///
    /// `CALLTRACE` is a comma-separated, case-insensitive list. The first
    /// recognised entry wins:
    ///
    /// - `stdout` or `console`: [`ConsolePrinter::stdout`]
    /// - `stderr`: [`ConsolePrinter::stderr`]
    /// - `tracing`: [`TracingPrinter`] at the `INFO` level
    ///
    /// Anything else leaves the tracer without a printer.
    pub fn install_printer_from_env(&self) -> bool {
        self.install_env_printer(CalltraceEnvOptions::get().printer)
    }

    fn install_env_printer(&self, printer: Option<EnvPrinter>) -> bool {
        let installed = match printer {
            None => return false,
            Some(EnvPrinter::Stdout) => self.install_printer(ConsolePrinter::stdout()).is_ok(),
            Some(EnvPrinter::Stderr) => self.install_printer(ConsolePrinter::stderr()).is_ok(),
            Some(EnvPrinter::Tracing) => self.install_printer(TracingPrinter::default()).is_ok(),
        };
        if !installed {
            tracing::debug!("CALLTRACE ignored, a call stack printer is already installed");
        }
        installed
    }
}

impl Default for CallStackTracer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CallStackTracer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallStackTracer")
            .field("active_threads", &self.active_thread_count())
            .field("has_printer", &self.printer.read().get().is_some())
            .finish()
    }
}

/// Error returned by [`CallStackTracer::install_printer`] when a printer is
/// already configured. Contains the printer that was not installed.
pub struct PrinterAlreadyInstalledError<P>(pub P);

impl<P> fmt::Debug for PrinterAlreadyInstalledError<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrinterAlreadyInstalledError").finish()
    }
}

impl<P> fmt::Display for PrinterAlreadyInstalledError<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a call stack printer is already installed")
    }
}

impl<P> core::error::Error for PrinterAlreadyInstalledError<P> {}

/// Labels a thread by name and id, or by id alone for unnamed threads.
fn thread_label(thread: &Thread) -> String {
    match thread.name() {
        Some(name) => format!("{name} ({:?})", thread.id()),
        None => format!("{:?}", thread.id()),
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum EnvPrinter {
    Stdout,
    Stderr,
    Tracing,
}

impl EnvPrinter {
    fn parse(var: &str) -> Option<Self> {
        var.split(',').map(str::trim).find_map(|v| {
            if v.eq_ignore_ascii_case("stdout") || v.eq_ignore_ascii_case("console") {
                Some(Self::Stdout)
            } else if v.eq_ignore_ascii_case("stderr") {
                Some(Self::Stderr)
            } else if v.eq_ignore_ascii_case("tracing") {
                Some(Self::Tracing)
            } else {
                None
            }
        })
    }
}

#[derive(Debug)]
struct CalltraceEnvOptions {
    printer: Option<EnvPrinter>,
}

impl CalltraceEnvOptions {
    fn get() -> &'static Self {
        static CALLTRACE_FLAGS: OnceLock<CalltraceEnvOptions> = OnceLock::new();

        CALLTRACE_FLAGS.get_or_init(|| CalltraceEnvOptions {
            printer: std::env::var_os("CALLTRACE")
                .and_then(|var| EnvPrinter::parse(&var.to_string_lossy())),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static_assertions::assert_impl_all!(CallStackTracer: Send, Sync);
    static_assertions::assert_impl_all!(PrinterAlreadyInstalledError<()>: core::error::Error);

    #[test]
    fn test_get_is_a_single_instance() {
        assert!(core::ptr::eq(CallStackTracer::get(), CallStackTracer::get()));
    }

    #[test]
    fn test_env_printer_parsing() {
        assert_eq!(EnvPrinter::parse("stdout"), Some(EnvPrinter::Stdout));
        assert_eq!(EnvPrinter::parse("Console"), Some(EnvPrinter::Stdout));
        assert_eq!(EnvPrinter::parse("STDERR"), Some(EnvPrinter::Stderr));
        assert_eq!(EnvPrinter::parse("verbose, tracing"), Some(EnvPrinter::Tracing));
        assert_eq!(EnvPrinter::parse("tracing,stderr"), Some(EnvPrinter::Tracing));
        assert_eq!(EnvPrinter::parse(""), None);
        assert_eq!(EnvPrinter::parse("off"), None);
    }

    #[test]
    fn test_env_printer_installation() {
        for printer in [EnvPrinter::Stdout, EnvPrinter::Stderr, EnvPrinter::Tracing] {
            let tracer = CallStackTracer::new();
            assert!(tracer.install_env_printer(Some(printer)));
            assert!(tracer.printer().is_some());
            assert!(!tracer.install_env_printer(Some(printer)));
        }

        let tracer = CallStackTracer::new();
        assert!(!tracer.install_env_printer(None));
        assert!(tracer.printer().is_none());

        let tracer = CallStackTracer::new();
        let kept = tracer.set_printer(|_: &CallStackTrace| {});
        assert!(kept.is_none());
        let before = tracer.printer().unwrap();
        assert!(!tracer.install_env_printer(Some(EnvPrinter::Stdout)));
        assert!(Arc::ptr_eq(&before, &tracer.printer().unwrap()));
    }

    #[test]
    fn test_thread_labels() {
        let label = thread::Builder::new()
            .name(String::from("worker"))
            .spawn(|| thread_label(&thread::current()))
            .unwrap()
            .join()
            .unwrap();
        assert!(label.starts_with("worker (ThreadId("));

        let current = thread::current();
        if current.name().is_none() {
            assert!(thread_label(&current).starts_with("ThreadId("));
        }
    }

    #[test]
    fn test_stack_is_removed_when_emptied() {
        let tracer = CallStackTracer::new();
        tracer.add_trace(&CallTrace::without_arguments("f"));
        assert_eq!(tracer.active_thread_count(), 1);
        tracer.remove_last_trace();
        assert_eq!(tracer.active_thread_count(), 0);
        assert_eq!(tracer.depth(), 0);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "removed a call trace from a thread without one")]
    fn test_unbalanced_remove_asserts() {
        CallStackTracer::new().remove_last_trace();
    }

    #[test]
    fn test_dump_without_printer_is_a_no_op() {
        let tracer = CallStackTracer::new();
        tracer.add_trace(&CallTrace::without_arguments("f"));
        tracer.dump();
        tracer.remove_last_trace();
    }

    #[test]
    fn test_clear_printer() {
        let tracer = CallStackTracer::new();
        assert!(tracer.clear_printer().is_none());
        tracer.set_printer(|_: &CallStackTrace| {});
        assert!(tracer.clear_printer().is_some());
        assert!(tracer.printer().is_none());
    }

    #[test]
    fn test_debug_output() {
        let tracer = CallStackTracer::new();
        assert_eq!(
            format!("{tracer:?}"),
            "CallStackTracer { active_threads: 0, has_printer: false }"
        );
    }
}
