use core::fmt;
use std::sync::Arc;

use calltrace_rtti::Rtti;

use crate::ArgumentTrace;

/// A record of one function call: its signature, its argument snapshots and,
/// for methods, the receiver's class and state.
///
/// A `CallTrace` is read-only once built. The snapshots are shared, so cloning
/// a trace is cheap; the tracer keeps its own clone of every active trace.
///
/// # Examples
///
/// ```
/// use calltrace::{ArgumentTrace, CallTrace};
///
/// let trace = CallTrace::new(
///     "fn resize(width: u32, height: u32)",
///     [ArgumentTrace::from(640_u32), ArgumentTrace::from(480_u32)],
/// )
/// .with_class_name("Window");
///
/// assert_eq!(trace.argument_count(), 2);
/// assert_eq!(trace.arguments()[1].value(), "480");
/// assert_eq!(trace.class_name(), Some("Window"));
/// assert_eq!(trace.object_state(), None);
/// ```
#[derive(Clone)]
pub struct CallTrace {
    signature: &'static str,
    arguments: Arc<[ArgumentTrace]>,
    class_name: Option<&'static str>,
    object_state: Option<Arc<str>>,
}

impl CallTrace {
    /// Creates a trace of a call to `signature` with the given arguments, in
    /// declaration order.
    ///
    /// The signature must not be empty.
    #[must_use]
    pub fn new(
        signature: &'static str,
        arguments: impl IntoIterator<Item = ArgumentTrace>,
    ) -> Self {
        debug_assert!(!signature.is_empty(), "a call trace needs a signature");
        Self {
            signature,
            arguments: arguments.into_iter().collect(),
            class_name: None,
            object_state: None,
        }
    }

    /// Creates a trace of a call that takes no arguments.
    #[must_use]
    pub fn without_arguments(signature: &'static str) -> Self {
        Self::new(signature, core::iter::empty())
    }

    /// Creates a trace of a method call, capturing the receiver's class name
    /// and its current `Display` rendering.
    ///
    /// The state is rendered now, not when the trace is printed, since the
    /// receiver may be gone by then.
    ///
    /// # Examples
    ///
    /// ```
    /// use core::fmt;
    ///
    /// use calltrace::{ArgumentTrace, CallTrace, rtti_class};
    ///
    /// struct Counter {
    ///     hits: u32,
    /// }
    /// rtti_class!(Counter);
    ///
    /// impl fmt::Display for Counter {
    ///     fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    ///         write!(f, "hits={}", self.hits)
    ///     }
    /// }
    ///
    /// let counter = Counter { hits: 4 };
    /// let trace = CallTrace::for_object("fn hit(&mut self)", [], &counter);
    /// assert_eq!(trace.class_name(), Some("Counter"));
    /// assert_eq!(trace.object_state(), Some("hits=4"));
    /// ```
    #[must_use]
    pub fn for_object<O>(
        signature: &'static str,
        arguments: impl IntoIterator<Item = ArgumentTrace>,
        object: &O,
    ) -> Self
    where
        O: ?Sized + Rtti + fmt::Display,
    {
        Self::new(signature, arguments)
            .with_class_name(object.type_object().name())
            .with_object_state(object.to_string())
    }

    /// Sets the name of the class the traced method belongs to.
    #[must_use]
    pub fn with_class_name(mut self, class_name: &'static str) -> Self {
        self.class_name = Some(class_name);
        self
    }

    /// Sets the rendered state of the receiver of the traced method.
    #[must_use]
    pub fn with_object_state(mut self, object_state: impl Into<String>) -> Self {
        self.object_state = Some(Arc::from(object_state.into()));
        self
    }

    /// The signature of the traced function.
    #[must_use]
    pub fn signature(&self) -> &'static str {
        self.signature
    }

    /// The argument snapshots, in declaration order.
    #[must_use]
    pub fn arguments(&self) -> &[ArgumentTrace] {
        &self.arguments
    }

    /// The number of argument snapshots.
    #[must_use]
    pub fn argument_count(&self) -> usize {
        self.arguments.len()
    }

    /// The class of the receiver, for method calls.
    #[must_use]
    pub fn class_name(&self) -> Option<&'static str> {
        self.class_name
    }

    /// The state of the receiver when the call was made, for method calls.
    #[must_use]
    pub fn object_state(&self) -> Option<&str> {
        self.object_state.as_deref()
    }
}

impl fmt::Debug for CallTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("CallTrace");
        debug
            .field("signature", &self.signature)
            .field("arguments", &&*self.arguments);
        if let Some(class_name) = self.class_name {
            debug.field("class_name", &class_name);
        }
        if let Some(object_state) = &self.object_state {
            debug.field("object_state", &&**object_state);
        }
        debug.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static_assertions::assert_impl_all!(CallTrace: Send, Sync, Clone);

    #[test]
    fn test_clone_shares_arguments() {
        let trace = CallTrace::new("fn f(a: i32)", [ArgumentTrace::from(1_i32)]);
        let clone = trace.clone();
        assert!(core::ptr::eq(trace.arguments(), clone.arguments()));
        assert_eq!(clone.signature(), "fn f(a: i32)");
    }

    #[test]
    fn test_without_arguments() {
        let trace = CallTrace::without_arguments("fn f()");
        assert_eq!(trace.argument_count(), 0);
        assert!(trace.arguments().is_empty());
        assert_eq!(trace.class_name(), None);
    }

    #[test]
    fn test_object_state_only() {
        let trace = CallTrace::without_arguments("fn f(&self)").with_object_state("ready");
        assert_eq!(trace.class_name(), None);
        assert_eq!(trace.object_state(), Some("ready"));
    }

    #[test]
    fn test_debug_omits_missing_receiver() {
        let trace = CallTrace::without_arguments("fn f()");
        assert_eq!(
            format!("{trace:?}"),
            r#"CallTrace { signature: "fn f()", arguments: [] }"#
        );
    }
}
