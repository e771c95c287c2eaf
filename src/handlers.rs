//! Handlers that control how function arguments are rendered in a call trace.
//!
//! An [`ArgumentTrace`](crate::ArgumentTrace) is a pair of strings: the name
//! of the argument's type and a rendering of its value. A handler decides how
//! both strings are produced. The handler is always chosen explicitly at the
//! call site, using [`ArgumentTrace::new_custom`]:
//!
//! ```
//! use calltrace::{ArgumentTrace, handlers};
//!
//! struct Token(u64);
//!
//! let token = Token(7);
//! let trace = ArgumentTrace::new_custom::<handlers::Opaque, _>(&token);
//! assert_eq!(trace.type_name(), "<Unknown type (size: 8)>");
//! assert!(trace.value().starts_with("<Unknown type at 0x"));
//! ```
//!
//! Nothing is detected automatically: a type that gains a `Display`
//! implementation keeps being rendered the same way until its call sites ask
//! for a different handler.
//!
//! # Built-in Handlers
//!
//! | handler          | requires               | type name                  | value                      |
//! |------------------|------------------------|----------------------------|----------------------------|
//! | [`Primitive`]    | [`PrimitiveArgument`]  | fixed mnemonic             | `Display`                  |
//! | [`Opaque`]       | nothing                | `<Unknown type (size: N)>` | `<Unknown type at 0xADDR>` |
//! | [`Named`]        | [`RttiClass`]          | the type token's name      | `<Unknown type at 0xADDR>` |
//! | [`Display`]      | `Display`              | `<Unknown type (size: N)>` | `Display`                  |
//! | [`Described`]    | `RttiClass + Display`  | the type token's name      | `Display`                  |
//! | [`VoidPointer`]  | `*const c_void`, `*mut c_void` | `const void*` / `void*` | the address         |
//!
//! # Pointers
//!
//! [`Pointer`] and [`PointerToPointer`] wrap one of the value handlers above
//! and render references (`&T`, `&mut T`) and nullable references
//! (`Option<&T>`, `Option<&mut T>`). The type name gets one `*` per level and
//! a single leading `const ` if any level is a shared reference. The value is
//! the address of each level followed by a space, then the pointee; a `None`
//! at any level renders as `<Null>` and stops there.
//!
//! ```
//! use calltrace::{ArgumentTrace, handlers};
//!
//! let value = 5_i32;
//! let reference = &value;
//! let trace =
//!     ArgumentTrace::new_custom::<handlers::PointerToPointer<handlers::Primitive>, _>(&&reference);
//! assert_eq!(trace.type_name(), "const i32**");
//! assert!(trace.value().ends_with(" 5"));
//!
//! let missing: Option<&i32> = None;
//! let trace = ArgumentTrace::new_custom::<handlers::Pointer<handlers::Primitive>, _>(&missing);
//! assert_eq!(trace.value(), "<Null>");
//! ```
//!
//! At most two levels are followed. The wrapped handler must be a
//! [`ValueHandler`], so `Pointer<Pointer<_>>` does not compile.
//!
//! [`ArgumentTrace::new_custom`]: crate::ArgumentTrace::new_custom

use core::{ffi::c_void, fmt, marker::PhantomData};

use calltrace_rtti::RttiClass;

/// Trait for rendering an argument of type `A`.
///
/// Implementations are zero-sized marker types; they are never instantiated,
/// only named as type parameters.
///
/// # Examples
///
/// ```
/// use core::fmt;
///
/// use calltrace::{ArgumentTrace, handlers::ArgumentHandler};
///
/// struct Celsius(f32);
///
/// struct Temperature;
///
/// impl ArgumentHandler<Celsius> for Temperature {
///     fn type_name(f: &mut fmt::Formatter<'_>) -> fmt::Result {
///         f.write_str("Celsius")
///     }
///
///     fn value(argument: &Celsius, f: &mut fmt::Formatter<'_>) -> fmt::Result {
///         write!(f, "{}C", argument.0)
///     }
/// }
///
/// let trace = ArgumentTrace::new_custom::<Temperature, _>(&Celsius(21.5));
/// assert_eq!(trace.to_string(), "Celsius=21.5C");
/// ```
pub trait ArgumentHandler<A: ?Sized>: 'static {
    /// Writes the name of the argument type.
    ///
    /// This does not depend on a value, so pointer handlers can name the
    /// pointee of a null pointer.
    fn type_name(f: &mut fmt::Formatter<'_>) -> fmt::Result;

    /// Writes the rendering of `argument`.
    fn value(argument: &A, f: &mut fmt::Formatter<'_>) -> fmt::Result;
}

/// Marker for handlers that render a value directly, without following a
/// reference.
///
/// Only value handlers can be wrapped by [`Pointer`] and
/// [`PointerToPointer`], which caps pointer rendering at two levels.
pub trait ValueHandler: 'static {}

/// Types rendered by the [`Primitive`] handler.
///
/// Implemented for the integer and floating point types, `bool`, `char`,
/// `str` and `String`.
pub trait PrimitiveArgument: fmt::Display {
    /// The short type name used in traces, such as `i32` or `f64`.
    const MNEMONIC: &'static str;
}

macro_rules! impl_primitive_argument {
    ($($ty:ty => $mnemonic:literal),* $(,)?) => {
        $(
            impl PrimitiveArgument for $ty {
                const MNEMONIC: &'static str = $mnemonic;
            }
        )*
    };
}

impl_primitive_argument!(
    i8 => "i8",
    i16 => "i16",
    i32 => "i32",
    i64 => "i64",
    i128 => "i128",
    isize => "isize",
    u8 => "u8",
    u16 => "u16",
    u32 => "u32",
    u64 => "u64",
    u128 => "u128",
    usize => "usize",
    f32 => "f32",
    f64 => "f64",
    bool => "bool",
    char => "char",
    str => "str",
    String => "String",
);

/// Handler for numbers, booleans, characters and strings.
///
/// The type name is the fixed mnemonic of [`PrimitiveArgument`], the value is
/// the `Display` rendering: decimal integers, shortest round-trip floats
/// (`1.0` renders as `1`), `true`/`false`, and strings verbatim.
///
/// # Examples
///
/// ```
/// use calltrace::{ArgumentTrace, handlers};
///
/// let trace = ArgumentTrace::new_custom::<handlers::Primitive, _>(&1.0_f32);
/// assert_eq!(trace.to_string(), "f32=1");
/// ```
#[derive(Copy, Clone)]
pub struct Primitive;

impl ValueHandler for Primitive {}

impl<A> ArgumentHandler<A> for Primitive
where
    A: ?Sized + PrimitiveArgument,
{
    fn type_name(f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(A::MNEMONIC)
    }

    fn value(argument: &A, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(argument, f)
    }
}

/// Handler for any sized type, revealing nothing but its size and address.
#[derive(Copy, Clone)]
pub struct Opaque;

impl ValueHandler for Opaque {}

impl<A> ArgumentHandler<A> for Opaque {
    fn type_name(f: &mut fmt::Formatter<'_>) -> fmt::Result {
        unknown_type_name::<A>(f)
    }

    fn value(argument: &A, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        unknown_value(argument, f)
    }
}

/// Handler for types declared with [`rtti_class!`] or [`rtti_interface!`]
/// that have no text rendering.
///
/// The type name comes from the type's token; the value is the address.
///
/// [`rtti_class!`]: crate::rtti_class
/// [`rtti_interface!`]: crate::rtti_interface
#[derive(Copy, Clone)]
pub struct Named;

impl ValueHandler for Named {}

impl<A> ArgumentHandler<A> for Named
where
    A: ?Sized + RttiClass,
{
    fn type_name(f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(A::type_class().name())
    }

    fn value(argument: &A, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        unknown_value(argument, f)
    }
}

/// Handler for types that render themselves with `Display` but have no
/// type token.
#[derive(Copy, Clone)]
pub struct Display;

impl ValueHandler for Display {}

impl<A> ArgumentHandler<A> for Display
where
    A: fmt::Display,
{
    fn type_name(f: &mut fmt::Formatter<'_>) -> fmt::Result {
        unknown_type_name::<A>(f)
    }

    fn value(argument: &A, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(argument, f)
    }
}

/// Handler for types with both a type token and a `Display` rendering.
///
/// # Examples
///
/// ```
/// use core::fmt;
///
/// use calltrace::{ArgumentTrace, handlers, rtti_class};
///
/// struct Account {
///     id: u32,
/// }
/// rtti_class!(Account);
///
/// impl fmt::Display for Account {
///     fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
///         write!(f, "account #{}", self.id)
///     }
/// }
///
/// let trace = ArgumentTrace::new_custom::<handlers::Described, _>(&Account { id: 3 });
/// assert_eq!(trace.to_string(), "Account=account #3");
/// ```
#[derive(Copy, Clone)]
pub struct Described;

impl ValueHandler for Described {}

impl<A> ArgumentHandler<A> for Described
where
    A: ?Sized + RttiClass + fmt::Display,
{
    fn type_name(f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(A::type_class().name())
    }

    fn value(argument: &A, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(argument, f)
    }
}

/// Handler for untyped raw pointers.
///
/// The pointer is never dereferenced: the value is its address, or `<Null>`.
#[derive(Copy, Clone)]
pub struct VoidPointer;

impl ArgumentHandler<*const c_void> for VoidPointer {
    fn type_name(f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("const void*")
    }

    fn value(argument: &*const c_void, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if argument.is_null() {
            f.write_str(NULL)
        } else {
            write!(f, "{:p}", *argument)
        }
    }
}

impl ArgumentHandler<*mut c_void> for VoidPointer {
    fn type_name(f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("void*")
    }

    fn value(argument: &*mut c_void, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if argument.is_null() {
            f.write_str(NULL)
        } else {
            write!(f, "{:p}", *argument)
        }
    }
}

/// A reference-like argument that the pointer handlers can follow.
///
/// Implemented for `&T` and `Option<&T>` (const) and for `&mut T` and
/// `Option<&mut T>` (mutable). `None` plays the role of a null pointer.
pub trait ArgumentPointer {
    /// The type pointed to.
    type Pointee: ?Sized;

    /// Whether the pointee is reached through a shared reference.
    const IS_CONST: bool;

    /// The pointee, or `None` for a null pointer.
    fn pointee(&self) -> Option<&Self::Pointee>;
}

impl<T: ?Sized> ArgumentPointer for &T {
    type Pointee = T;

    const IS_CONST: bool = true;

    fn pointee(&self) -> Option<&T> {
        Some(*self)
    }
}

impl<T: ?Sized> ArgumentPointer for &mut T {
    type Pointee = T;

    const IS_CONST: bool = false;

    fn pointee(&self) -> Option<&T> {
        Some(&**self)
    }
}

impl<T: ?Sized> ArgumentPointer for Option<&T> {
    type Pointee = T;

    const IS_CONST: bool = true;

    fn pointee(&self) -> Option<&T> {
        *self
    }
}

impl<T: ?Sized> ArgumentPointer for Option<&mut T> {
    type Pointee = T;

    const IS_CONST: bool = false;

    fn pointee(&self) -> Option<&T> {
        self.as_deref()
    }
}

/// Handler for a pointer to a value, rendered by the value handler `H`.
///
/// # Examples
///
/// ```
/// use calltrace::{ArgumentTrace, handlers};
///
/// let mut count = 3_u8;
/// let trace = ArgumentTrace::new_custom::<handlers::Pointer<handlers::Primitive>, _>(&&mut count);
/// assert_eq!(trace.type_name(), "u8*");
/// assert!(trace.value().starts_with("0x"));
/// assert!(trace.value().ends_with(" 3"));
/// ```
pub struct Pointer<H>(PhantomData<H>);

impl<H> Clone for Pointer<H> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<H> Copy for Pointer<H> {}

impl<P, H> ArgumentHandler<P> for Pointer<H>
where
    P: ArgumentPointer,
    H: ValueHandler + ArgumentHandler<P::Pointee>,
{
    fn type_name(f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if P::IS_CONST {
            f.write_str("const ")?;
        }
        H::type_name(f)?;
        f.write_str("*")
    }

    fn value(argument: &P, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        pointer_value(argument, f, H::value)
    }
}

/// Handler for a pointer to a pointer to a value, rendered by the value
/// handler `H`.
pub struct PointerToPointer<H>(PhantomData<H>);

impl<H> Clone for PointerToPointer<H> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<H> Copy for PointerToPointer<H> {}

impl<P, H> ArgumentHandler<P> for PointerToPointer<H>
where
    P: ArgumentPointer,
    P::Pointee: ArgumentPointer,
    H: ValueHandler + ArgumentHandler<<P::Pointee as ArgumentPointer>::Pointee>,
{
    fn type_name(f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if P::IS_CONST || <P::Pointee as ArgumentPointer>::IS_CONST {
            f.write_str("const ")?;
        }
        H::type_name(f)?;
        f.write_str("**")
    }

    fn value(argument: &P, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        pointer_value(argument, f, |inner: &P::Pointee, f| {
            pointer_value(inner, f, H::value)
        })
    }
}

const NULL: &str = "<Null>";

fn pointer_value<P>(
    pointer: &P,
    f: &mut fmt::Formatter<'_>,
    pointee_value: impl FnOnce(&P::Pointee, &mut fmt::Formatter<'_>) -> fmt::Result,
) -> fmt::Result
where
    P: ?Sized + ArgumentPointer,
{
    match pointer.pointee() {
        None => f.write_str(NULL),
        Some(pointee) => {
            write!(f, "{:p} ", pointee)?;
            pointee_value(pointee, f)
        }
    }
}

fn unknown_type_name<A>(f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "<Unknown type (size: {})>", size_of::<A>())
}

fn unknown_value<A: ?Sized>(argument: &A, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "<Unknown type at {:p}>", argument)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ArgumentTrace;

    struct Blob {
        _bytes: [u8; 24],
    }

    #[test]
    fn test_primitive_mnemonics() {
        assert_eq!(ArgumentTrace::new(&-3_i8).to_string(), "i8=-3");
        assert_eq!(ArgumentTrace::new(&40_000_u16).to_string(), "u16=40000");
        assert_eq!(ArgumentTrace::new(&5_i32).to_string(), "i32=5");
        assert_eq!(ArgumentTrace::new(&u64::MAX).to_string(), "u64=18446744073709551615");
        assert_eq!(ArgumentTrace::new(&1.0_f32).to_string(), "f32=1");
        assert_eq!(ArgumentTrace::new(&0.1_f64).to_string(), "f64=0.1");
        assert_eq!(ArgumentTrace::new(&true).to_string(), "bool=true");
        assert_eq!(ArgumentTrace::new(&'x').to_string(), "char=x");
        assert_eq!(ArgumentTrace::new("a b").to_string(), "str=a b");
        assert_eq!(
            ArgumentTrace::new(&String::from("owned")).to_string(),
            "String=owned"
        );
    }

    #[test]
    fn test_opaque_fallback() {
        let blob = Blob { _bytes: [0; 24] };
        let trace = ArgumentTrace::new_custom::<Opaque, _>(&blob);
        assert_eq!(trace.type_name(), "<Unknown type (size: 24)>");
        assert_eq!(trace.value(), format!("<Unknown type at {:p}>", &blob));
    }

    #[test]
    fn test_display_keeps_unknown_type_name() {
        let trace = ArgumentTrace::new_custom::<Display, _>(&core::net::Ipv4Addr::LOCALHOST);
        assert_eq!(trace.type_name(), "<Unknown type (size: 4)>");
        assert_eq!(trace.value(), "127.0.0.1");
    }

    #[test]
    fn test_pointer_const_marker() {
        let mut value = 9_i64;
        assert_eq!(
            ArgumentTrace::new_custom::<Pointer<Primitive>, _>(&&value).type_name(),
            "const i64*"
        );
        assert_eq!(
            ArgumentTrace::new_custom::<Pointer<Primitive>, _>(&&mut value).type_name(),
            "i64*"
        );

        let mut inner = &mut value;
        assert_eq!(
            ArgumentTrace::new_custom::<PointerToPointer<Primitive>, _>(&&mut inner).type_name(),
            "i64**"
        );
        let shared_inner: &i64 = &9;
        assert_eq!(
            ArgumentTrace::new_custom::<PointerToPointer<Primitive>, _>(&&mut &*shared_inner)
                .type_name(),
            "const i64**"
        );
    }

    #[test]
    fn test_pointer_value_has_address_and_pointee() {
        let value = 5_i32;
        let trace = ArgumentTrace::new_custom::<Pointer<Primitive>, _>(&&value);
        assert_eq!(trace.value(), format!("{:p} 5", &value));
    }

    #[test]
    fn test_inner_null_stops_after_outer_address() {
        let inner: Option<&i32> = None;
        let trace = ArgumentTrace::new_custom::<PointerToPointer<Primitive>, _>(&&inner);
        assert_eq!(trace.type_name(), "const i32**");
        assert_eq!(trace.value(), format!("{:p} <Null>", &inner));
    }

    #[test]
    fn test_void_pointers() {
        let value = 1_u32;
        let address: *const c_void = (&raw const value).cast();
        let trace = ArgumentTrace::new_custom::<VoidPointer, _>(&address);
        assert_eq!(trace.type_name(), "const void*");
        assert_eq!(trace.value(), format!("{address:p}"));

        let null: *mut c_void = core::ptr::null_mut();
        let trace = ArgumentTrace::new_custom::<VoidPointer, _>(&null);
        assert_eq!(trace.type_name(), "void*");
        assert_eq!(trace.value(), "<Null>");
    }
}
