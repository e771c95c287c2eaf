use core::fmt;

/// Runs a handler-style formatting function and collects its output.
pub(crate) fn render<State>(
    state: State,
    format_fn: impl for<'a, 'b> Fn(State, &'a mut fmt::Formatter<'b>) -> fmt::Result,
) -> String
where
    State: Copy,
{
    struct Rendered<State, F> {
        state: State,
        format_fn: F,
    }

    impl<State, F> fmt::Display for Rendered<State, F>
    where
        State: Copy,
        F: for<'a, 'b> Fn(State, &'a mut fmt::Formatter<'b>) -> fmt::Result,
    {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            (self.format_fn)(self.state, f)
        }
    }

    Rendered { state, format_fn }.to_string()
}
