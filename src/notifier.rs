use core::{fmt, marker::PhantomData};

use crate::{CallStackTracer, CallTrace};

/// Keeps a call on the calling thread's stack for as long as it lives.
///
/// Creating a notifier pushes the call on the process-wide
/// [`CallStackTracer`]; dropping it pops the call again. Because notifiers are
/// dropped in reverse order of creation, nested scopes keep the stack
/// balanced.
///
/// A notifier is bound to the thread that created it: it is neither `Send`
/// nor `Sync`, and it cannot be cloned.
///
/// # Examples
///
/// ```
/// use calltrace::{ArgumentTrace, CallStackTracer, CallTrace, ScopedCallTraceNotifier};
///
/// fn checksum(data: &[u8]) -> u32 {
///     let trace = CallTrace::new("fn checksum(data: &[u8])", [ArgumentTrace::from(data.len())]);
///     let _scope = ScopedCallTraceNotifier::new(&trace);
///
///     assert_eq!(CallStackTracer::get().depth(), 1);
///     data.iter().map(|&b| u32::from(b)).sum()
/// }
///
/// assert_eq!(checksum(&[1, 2, 3]), 6);
/// assert_eq!(CallStackTracer::get().depth(), 0);
/// ```
#[must_use = "the call is removed from the stack again as soon as the notifier is dropped"]
#[allow(
    missing_copy_implementations,
    reason = "every notifier pops exactly one call"
)]
pub struct ScopedCallTraceNotifier {
    _not_send: PhantomData<*const ()>,
}

impl ScopedCallTraceNotifier {
    /// Pushes `trace` on the calling thread's stack until the returned
    /// notifier is dropped.
    pub fn new(trace: &CallTrace) -> Self {
        CallStackTracer::get().add_trace(trace);
        Self {
            _not_send: PhantomData,
        }
    }
}

impl Drop for ScopedCallTraceNotifier {
    fn drop(&mut self) {
        CallStackTracer::get().remove_last_trace();
    }
}

impl fmt::Debug for ScopedCallTraceNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopedCallTraceNotifier").finish()
    }
}
