/// Snapshots one function argument.
///
/// Invoked with a single expression, this is the same as
/// [`ArgumentTrace::from`] and accepts the primitive types, `&str`, `String`
/// and `&String`.
///
/// Invoked as `argument!(value => Handler)`, the value is borrowed and
/// rendered with the given handler, the same as
/// [`ArgumentTrace::new_custom`]. See the [`handlers`] module for the
/// built-in handlers.
///
/// [`ArgumentTrace::from`]: crate::ArgumentTrace
/// [`ArgumentTrace::new_custom`]: crate::ArgumentTrace::new_custom
/// [`handlers`]: crate::handlers
///
/// # Examples
///
/// ```
/// use calltrace::{argument, handlers};
///
/// let retries = 3_u8;
/// assert_eq!(argument!(retries).to_string(), "u8=3");
///
/// let path = String::from("/etc/hosts");
/// assert_eq!(argument!(&path).to_string(), "String=/etc/hosts");
///
/// let limit = Some(&retries);
/// let trace = argument!(limit => handlers::Pointer<handlers::Primitive>);
/// assert_eq!(trace.type_name(), "const u8*");
/// assert!(trace.value().starts_with("0x"));
/// ```
#[macro_export]
macro_rules! argument {
    ($value:expr => $handler:ty $(,)?) => {
        $crate::ArgumentTrace::new_custom::<$handler, _>(&$value)
    };
    ($value:expr $(,)?) => {
        $crate::ArgumentTrace::from($value)
    };
}

/// Records a call on the calling thread's stack until the end of the
/// enclosing scope.
///
/// The first argument is the signature of the function, followed by its
/// arguments in declaration order. Each argument is written the way
/// [`argument!`] takes it: either a plain expression, or `value => Handler`.
///
/// The macro evaluates to a [`ScopedCallTraceNotifier`], which must be bound
/// to a variable for the call to stay on the stack. Binding it to `_` drops it
/// immediately.
///
/// Methods can pass a reference to their receiver first, as `object: self`.
/// The receiver must implement [`Rtti`] and `Display`; its class name and its
/// current rendering are stored with the call.
///
/// [`ScopedCallTraceNotifier`]: crate::ScopedCallTraceNotifier
/// [`Rtti`]: crate::Rtti
///
/// # Examples
///
/// ```
/// use calltrace::{CallStackTracer, handlers, trace_scope};
///
/// struct Buffer(Vec<u8>);
///
/// fn fill(buffer: &mut Buffer, byte: u8, count: usize) {
///     let _scope = trace_scope!(
///         "fn fill(buffer: &mut Buffer, byte: u8, count: usize)",
///         &*buffer => handlers::Pointer<handlers::Opaque>,
///         byte,
///         count,
///     );
///
///     let stack = CallStackTracer::get().current_trace().unwrap();
///     let call = stack.trace(stack.len() - 1);
///     assert_eq!(call.argument_count(), 3);
///     assert_eq!(call.arguments()[1].to_string(), "u8=0");
///
///     buffer.0.resize(count, byte);
/// }
///
/// let mut buffer = Buffer(Vec::new());
/// fill(&mut buffer, 0, 16);
/// assert_eq!(buffer.0.len(), 16);
/// assert_eq!(CallStackTracer::get().depth(), 0);
/// ```
#[macro_export]
macro_rules! trace_scope {
    (object: $object:expr, $signature:literal $(, $value:expr $(=> $handler:ty)?)* $(,)?) => {
        $crate::ScopedCallTraceNotifier::new(&$crate::CallTrace::for_object(
            $signature,
            $crate::__arguments!($($value $(=> $handler)?),*),
            &*$object,
        ))
    };
    ($signature:literal $(, $value:expr $(=> $handler:ty)?)* $(,)?) => {
        $crate::ScopedCallTraceNotifier::new(&$crate::CallTrace::new(
            $signature,
            $crate::__arguments!($($value $(=> $handler)?),*),
        ))
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __arguments {
    ($($value:expr $(=> $handler:ty)?),*) => {{
        let arguments: ::std::vec::Vec<$crate::ArgumentTrace> =
            ::std::vec![$($crate::argument!($value $(=> $handler)?)),*];
        arguments
    }};
}

#[cfg(test)]
mod tests {
    use core::fmt;

    use crate::{CallStackTracer, handlers, rtti_class};

    struct Gauge {
        level: u8,
    }
    rtti_class!(Gauge);

    impl fmt::Display for Gauge {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "level={}", self.level)
        }
    }

    impl Gauge {
        fn raise(&mut self, by: u8) {
            let _scope = trace_scope!(object: self, "fn raise(&mut self, by: u8)", by);
            let stack = CallStackTracer::get().current_trace().unwrap();
            let call = stack.trace(stack.len() - 1);
            assert_eq!(call.class_name(), Some("Gauge"));
            assert_eq!(call.object_state(), Some("level=1"));
            assert_eq!(call.arguments()[0].to_string(), "u8=2");
            self.level += by;
        }
    }

    #[test]
    fn test_argument_forms() {
        assert_eq!(argument!(7_i64).to_string(), "i64=7");
        assert_eq!(argument!("name",).to_string(), "str=name");
        assert_eq!(argument!(true).to_string(), "bool=true");
        let value = 'x';
        assert_eq!(argument!(value => handlers::Display).value(), "x");
    }

    #[test]
    fn test_trace_scope_without_arguments() {
        let before = CallStackTracer::get().depth();
        {
            let _scope = trace_scope!("fn idle()");
            let stack = CallStackTracer::get().current_trace().unwrap();
            assert_eq!(stack.trace(stack.len() - 1).argument_count(), 0);
            assert_eq!(CallStackTracer::get().depth(), before + 1);
        }
        assert_eq!(CallStackTracer::get().depth(), before);
    }

    #[test]
    fn test_trace_scope_for_method() {
        let mut gauge = Gauge { level: 1 };
        gauge.raise(2);
        assert_eq!(gauge.level, 3);
    }
}
