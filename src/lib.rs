#![deny(
    missing_docs,
    clippy::alloc_instead_of_core,
    clippy::std_instead_of_core,
    clippy::missing_safety_doc,
    clippy::undocumented_unsafe_blocks,
    rustdoc::invalid_rust_codeblocks,
    rustdoc::broken_intra_doc_links,
    missing_copy_implementations,
    unused_doc_comments
)]
// Extra checks on nightly
#![cfg_attr(nightly_extra_checks, feature(rustdoc_missing_doc_code_examples))]
#![cfg_attr(nightly_extra_checks, forbid(rustdoc::missing_doc_code_examples))]
// Make docs.rs generate better docs
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Per-thread call stack tracing with argument snapshots.
//!
//! ## Overview
//!
//! This crate keeps track of which instrumented functions are currently
//! running on each thread, together with a rendering of the arguments they
//! were called with. At any point a thread can ask for its own call stack to
//! be printed, for example right before reporting a failure.
//!
//! Recording is explicit: a function opts in by creating a
//! [`ScopedCallTraceNotifier`] (usually through [`trace_scope!`]) on entry.
//! The notifier pushes a [`CallTrace`] on the calling thread's stack and pops
//! it again when it goes out of scope.
//!
//! ## Quick Example
//!
//! ```
//! use calltrace::{CallStackTracer, printer::BufferPrinter, trace_scope};
//!
//! fn scale(value: i32, factor: f32) -> f32 {
//!     let _scope = trace_scope!("fn scale(value: i32, factor: f32)", value, factor);
//!     report();
//!     value as f32 * factor
//! }
//!
//! fn report() {
//!     let _scope = trace_scope!("fn report()");
//!     CallStackTracer::get().dump();
//! }
//!
//! let buffer = BufferPrinter::new();
//! CallStackTracer::get().set_printer(buffer.clone());
//!
//! scale(5, 1.0);
//!
//! let text = buffer.take();
//! assert!(text.contains("-->fn scale(value: i32, factor: f32)\n  | -{0}i32=5\n  | -{1}f32=1\n"));
//! assert!(text.contains("  -->fn report()\n"));
//! # CallStackTracer::get().clear_printer();
//! ```
//!
//! ## Core Concepts
//!
//! - An [`ArgumentTrace`] is a snapshot of one argument: its type name and
//!   its value, both already rendered to strings. How they are rendered is
//!   chosen at the call site with a handler from the [`handlers`] module.
//! - A [`CallTrace`] is one active call: the function's signature, its
//!   argument snapshots and, for methods, the receiver's class name and state.
//! - A [`CallStackTrace`] is the stack of active calls of one thread.
//! - The [`CallStackTracer`] holds the stacks of all threads and the printer
//!   used to dump them. A thread only ever sees its own stack.
//!
//! ## Printing
//!
//! Dumps go through a [`CallStackPrinter`](printer::CallStackPrinter), which
//! decides where the text ends up, and a
//! [`CallStackFormatter`](formatter::CallStackFormatter), which decides what
//! it looks like. Without a printer, [`CallStackTracer::dump`] does nothing.
//! The printer can also be selected at startup through the `CALLTRACE`
//! environment variable, see [`CallStackTracer::install_printer_from_env`].
//!
//! ## Run-time Type Identification
//!
//! Class names of method receivers come from the run-time type identification
//! in [`calltrace_rtti`], which is re-exported here. Types declared with
//! [`rtti_class!`] or [`rtti_interface!`] can be tested with [`RttiExt::is`]
//! and narrowed with [`RttiExt::cast`] along their declared bases.

#[macro_use]
mod macros;

pub mod formatter;
pub mod handlers;
pub mod prelude;
pub mod printer;

mod argument_trace;
mod call_stack_trace;
mod call_trace;
mod notifier;
mod tracer;
mod util;

pub use calltrace_rtti::{
    CastRequest, CastRequestMut, Rtti, RttiClass, RttiExt, Type, rtti_class, rtti_interface,
};

pub use self::{
    argument_trace::ArgumentTrace,
    call_stack_trace::CallStackTrace,
    call_trace::CallTrace,
    notifier::ScopedCallTraceNotifier,
    tracer::{CallStackTracer, PrinterAlreadyInstalledError, SharedPrinter},
};
