use core::{
    fmt,
    sync::atomic::{AtomicUsize, Ordering},
    time::Duration,
};
use std::{
    io,
    panic::{self, AssertUnwindSafe},
    sync::{Arc, Mutex, PoisonError, mpsc},
    thread,
};

use calltrace::{
    CallStackTrace, CallStackTracer, CallTrace,
    formatter::CallStackFormatter,
    printer::{BufferPrinter, TracingPrinter},
    trace_scope,
};
use tracing::Level;

// The global tracer has a single printer slot, so everything that changes it
// lives in one test.
#[test]
fn test_global_printer_lifecycle() {
    let tracer = CallStackTracer::get();
    assert!(tracer.printer().is_none());

    let first = BufferPrinter::new();
    let second = BufferPrinter::new();

    tracer.install_printer(first.clone()).unwrap();
    let rejected = tracer.install_printer(second.clone()).unwrap_err();
    assert_eq!(
        rejected.to_string(),
        "a call stack printer is already installed"
    );

    {
        let _scope = trace_scope!("fn lifecycle()");
        tracer.dump();
    }
    assert!(first.take().contains("-->fn lifecycle()\n"));
    assert_eq!(rejected.0.contents(), "");

    let previous = tracer.set_printer(second.clone());
    assert!(previous.is_some());

    {
        let _scope = trace_scope!("fn replaced()");
        tracer.dump();
    }
    assert_eq!(first.contents(), "");
    assert!(second.take().contains("-->fn replaced()\n"));

    // No active calls on this thread
    tracer.dump();
    assert_eq!(second.contents(), "");

    assert!(tracer.clear_printer().is_some());
    {
        let _scope = trace_scope!("fn unprinted()");
        tracer.dump();
    }
    assert_eq!(second.contents(), "");

    tracer.set_printer(first.clone());
    assert!(!tracer.install_printer_from_env());
    assert!(tracer.clear_printer().is_some());
}

/// Lists the signatures on one line.
#[derive(Clone)]
struct Signatures;

impl CallStackFormatter for Signatures {
    fn format_stack_header(&self, out: &mut String, _: &CallStackTrace) -> fmt::Result {
        out.push('[');
        Ok(())
    }

    fn format_call_header(&self, out: &mut String, trace: &CallTrace, depth: usize) -> fmt::Result {
        if depth > 0 {
            out.push_str(" > ");
        }
        out.push_str(trace.signature());
        Ok(())
    }

    fn format_call_body(&self, _: &mut String, _: &CallTrace, _: usize) -> fmt::Result {
        Ok(())
    }

    fn format_stack_footer(&self, out: &mut String, _: &CallStackTrace) -> fmt::Result {
        out.push_str("]\n");
        Ok(())
    }
}

#[test]
fn test_custom_formatter_and_closure_printer() {
    let tracer = CallStackTracer::new();
    let buffer = BufferPrinter::with_formatter(Signatures);
    tracer.set_printer(buffer.clone());

    tracer.add_trace(&CallTrace::without_arguments("main"));
    tracer.add_trace(&CallTrace::without_arguments("load"));
    tracer.dump();

    let seen = Arc::new(Mutex::new(Vec::new()));
    tracer.set_printer({
        let seen = Arc::clone(&seen);
        move |stack: &CallStackTrace| {
            seen.lock()
                .unwrap()
                .push((stack.len(), stack.thread_id().to_owned()));
        }
    });
    tracer.dump();

    tracer.remove_last_trace();
    tracer.remove_last_trace();
    tracer.dump();

    assert_eq!(buffer.take(), "[main > load]\n");
    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].0, 2);
}

#[derive(Clone, Default)]
struct CapturedOutput(Arc<Mutex<Vec<u8>>>);

impl CapturedOutput {
    fn text(&self) -> String {
        let bytes = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

impl io::Write for CapturedOutput {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn test_tracing_printer_emits_one_event() {
    let output = CapturedOutput::default();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(Level::TRACE)
        .with_writer({
            let output = output.clone();
            move || output.clone()
        })
        .finish();

    let tracer = CallStackTracer::new();
    tracing::subscriber::with_default(subscriber, || {
        tracer.set_printer(TracingPrinter::new(Level::WARN));
        tracer.add_trace(&CallTrace::without_arguments("fn traced()"));
        tracer.dump();
        tracer.remove_last_trace();
    });

    let text = output.text();
    assert!(text.contains("call stack printer set"));
    assert!(text.contains("call stack created"));
    let event = text
        .lines()
        .position(|line| line.contains("WARN") && line.contains("Call stack trace for"))
        .unwrap();
    assert!(text.lines().nth(event).unwrap().contains("calltrace"));
    assert!(text.contains("-->fn traced()"));
    assert!(text.contains("depth=1"));
    assert!(text.contains("call stack removed"));
}

static REENTERED: CallStackTracer = CallStackTracer::new();
static REENTERED_WRITES: AtomicUsize = AtomicUsize::new(0);

/// A log writer that queries the tracer whose events it is writing.
struct ReenteringWriter;

impl io::Write for ReenteringWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let _ = REENTERED.depth();
        let _ = REENTERED.printer();
        REENTERED_WRITES.fetch_add(1, Ordering::SeqCst);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn test_subscriber_can_query_the_tracer_while_logging() {
    let (done, finished) = mpsc::channel();
    thread::spawn(move || {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(Level::TRACE)
            .with_writer(|| ReenteringWriter)
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            REENTERED.add_trace(&CallTrace::without_arguments("fn outer()"));
            REENTERED.add_trace(&CallTrace::without_arguments("fn inner()"));
            REENTERED.install_printer(BufferPrinter::new()).unwrap();
            REENTERED.set_printer(BufferPrinter::new());
            REENTERED.remove_last_trace();
            REENTERED.remove_last_trace();
            REENTERED.clear_printer();
        });
        done.send(REENTERED.depth()).unwrap();
    });

    let depth = finished
        .recv_timeout(Duration::from_secs(30))
        .expect("tracer calls must return while the subscriber queries the tracer");
    assert_eq!(depth, 0);
    assert!(REENTERED_WRITES.load(Ordering::SeqCst) >= 5);
}

/// A log writer that always panics.
struct PanickingWriter;

impl io::Write for PanickingWriter {
    fn write(&mut self, _: &[u8]) -> io::Result<usize> {
        panic!("log writer failed");
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn test_panicking_subscriber_leaves_the_tracer_usable() {
    let tracer = CallStackTracer::new();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(Level::TRACE)
        .with_writer(|| PanickingWriter)
        .finish();

    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        tracing::subscriber::with_default(subscriber, || {
            tracer.add_trace(&CallTrace::without_arguments("fn logged()"));
        });
    }));
    assert!(result.is_err());

    assert_eq!(tracer.depth(), 1);
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        tracing::subscriber::with_default(
            tracing_subscriber::fmt()
                .with_max_level(Level::TRACE)
                .with_writer(|| PanickingWriter)
                .finish(),
            || tracer.install_printer(BufferPrinter::new()),
        )
    }));
    assert!(result.is_err());

    assert!(tracer.printer().is_some());
    tracer.remove_last_trace();
    assert_eq!(tracer.depth(), 0);
    assert_eq!(tracer.active_thread_count(), 0);
}
