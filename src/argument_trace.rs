use core::fmt;

use crate::{
    handlers::{self, ArgumentHandler, PrimitiveArgument},
    util::render,
};

/// A snapshot of one function argument: the name of its type and a rendering
/// of its value.
///
/// Both strings are produced when the snapshot is created and never change
/// afterwards, so a snapshot stays valid after the argument itself is gone.
///
/// # Examples
///
/// ```
/// use calltrace::{ArgumentTrace, handlers};
///
/// let count = ArgumentTrace::new(&5_i32);
/// assert_eq!(count.type_name(), "i32");
/// assert_eq!(count.value(), "5");
/// assert_eq!(count.to_string(), "i32=5");
///
/// let name = ArgumentTrace::from("config.toml");
/// assert_eq!(name.to_string(), "str=config.toml");
///
/// struct Handle(u32);
/// let handle = ArgumentTrace::new_custom::<handlers::Opaque, _>(&Handle(1));
/// assert_eq!(handle.type_name(), "<Unknown type (size: 4)>");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ArgumentTrace {
    type_name: String,
    value: String,
}

impl ArgumentTrace {
    /// Snapshots a primitive argument with the [`Primitive`] handler.
    ///
    /// [`Primitive`]: handlers::Primitive
    #[must_use]
    pub fn new<A>(argument: &A) -> Self
    where
        A: ?Sized + PrimitiveArgument,
    {
        Self::new_custom::<handlers::Primitive, A>(argument)
    }

    /// Snapshots an argument, rendering it with the handler `H`.
    ///
    /// See the [`handlers`] module for the built-in handlers.
    #[must_use]
    pub fn new_custom<H, A>(argument: &A) -> Self
    where
        A: ?Sized,
        H: ArgumentHandler<A>,
    {
        Self {
            type_name: render((), |(), f| H::type_name(f)),
            value: render(argument, |argument, f| H::value(argument, f)),
        }
    }

    /// Creates a snapshot from already rendered parts.
    #[must_use]
    pub fn from_parts(type_name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            value: value.into(),
        }
    }

    /// The name of the argument's type.
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// The rendering of the argument's value.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl fmt::Display for ArgumentTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.type_name, self.value)
    }
}

macro_rules! impl_from_primitive {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for ArgumentTrace {
                fn from(argument: $ty) -> Self {
                    Self::new(&argument)
                }
            }
        )*
    };
}

impl_from_primitive!(
    i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, bool, char, String,
);

impl From<&str> for ArgumentTrace {
    fn from(argument: &str) -> Self {
        Self::new(argument)
    }
}

impl From<&String> for ArgumentTrace {
    fn from(argument: &String) -> Self {
        Self::new(argument)
    }
}
