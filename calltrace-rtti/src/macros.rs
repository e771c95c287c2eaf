//! Declaration macros for participating types.

/// Declares a struct or enum as a participant in run-time type
/// identification.
///
/// The declaration lists the type's direct bases, in the order they should be
/// searched. A base is either:
///
/// - an interface the type implements, written `dyn Trait` (the trait must
///   itself be declared with [`rtti_interface!`]), or
/// - a participating type embedded as a field, written `field: Type`.
///
/// Casting to a field base returns a reference to that field, in the same way
/// that casting to a base class in a language with inheritance returns the
/// base subobject.
///
/// # Examples
///
/// ```
/// use calltrace_rtti::{Rtti, RttiExt, rtti_class, rtti_interface};
///
/// trait Engine: Rtti {}
/// rtti_interface!(dyn Engine);
///
/// trait Wheels: Rtti {}
/// rtti_interface!(dyn Wheels);
///
/// struct Chassis {
///     serial: u32,
/// }
/// rtti_class!(Chassis);
///
/// struct Car {
///     chassis: Chassis,
/// }
/// rtti_class!(Car: dyn Engine, dyn Wheels, chassis: Chassis);
/// impl Engine for Car {}
/// impl Wheels for Car {}
///
/// let mut car = Car {
///     chassis: Chassis { serial: 7 },
/// };
/// assert!(car.is::<dyn Wheels>());
/// assert_eq!(car.cast::<Chassis>().map(|c| c.serial), Some(7));
///
/// if let Some(chassis) = car.cast_mut::<Chassis>() {
///     chassis.serial = 8;
/// }
/// assert_eq!(car.chassis.serial, 8);
/// ```
///
/// Only non-generic types are supported.
#[macro_export]
macro_rules! rtti_class {
    ($class:ident $(,)?) => {
        $crate::__rtti_impl_class!($class []);
    };
    ($class:ident : $($bases:tt)+) => {
        $crate::__rtti_class_bases!($class [] $($bases)+);
    };
}

/// Declares a trait-object type as a participant in run-time type
/// identification.
///
/// The trait must have [`Rtti`](crate::Rtti) as a supertrait. Bases are other
/// declared interfaces that are supertraits of this one; they are searched in
/// the order given.
///
/// # Examples
///
/// ```
/// use calltrace_rtti::{Rtti, RttiExt, rtti_class, rtti_interface};
///
/// trait Reader: Rtti {}
/// rtti_interface!(dyn Reader);
///
/// trait Writer: Rtti {}
/// rtti_interface!(dyn Writer);
///
/// trait Stream: Reader + Writer {}
/// rtti_interface!(dyn Stream: dyn Reader, dyn Writer);
///
/// struct Socket;
/// rtti_class!(Socket: dyn Stream);
/// impl Reader for Socket {}
/// impl Writer for Socket {}
/// impl Stream for Socket {}
///
/// let stream: &dyn Stream = &Socket;
/// assert!(stream.is::<dyn Writer>());
/// assert!(stream.cast::<dyn Reader>().is_some());
/// ```
#[macro_export]
macro_rules! rtti_interface {
    (dyn $interface:ident $(: $(dyn $base:path),+ $(,)?)?) => {
        impl $crate::RttiClass for dyn $interface {
            fn type_class() -> &'static $crate::Type {
                static TYPE: $crate::Type = $crate::Type::new(::core::stringify!($interface));
                &TYPE
            }

            fn class_is(target: &$crate::Type) -> bool {
                target.is(<Self as $crate::RttiClass>::type_class())
                    $($(|| <dyn $base as $crate::RttiClass>::class_is(target))+)?
            }

            #[allow(clippy::needless_return)]
            fn class_cast<'a>(this: &'a Self, request: &mut $crate::CastRequest<'a>) {
                if request.target().is(<Self as $crate::RttiClass>::type_class()) {
                    request.provide(this);
                    return;
                }
                $($(
                    if <dyn $base as $crate::RttiClass>::class_is(request.target()) {
                        <dyn $base as $crate::RttiClass>::class_cast(this, request);
                        return;
                    }
                )+)?
            }

            #[allow(clippy::needless_return)]
            fn class_cast_mut<'a>(this: &'a mut Self, request: &mut $crate::CastRequestMut<'a>) {
                if request.target().is(<Self as $crate::RttiClass>::type_class()) {
                    request.provide(this);
                    return;
                }
                $($(
                    if <dyn $base as $crate::RttiClass>::class_is(request.target()) {
                        <dyn $base as $crate::RttiClass>::class_cast_mut(this, request);
                        return;
                    }
                )+)?
            }
        }
    };
}

/// Normalizes the base list of [`rtti_class!`] into `{ Type; projection }`
/// entries.
#[doc(hidden)]
#[macro_export]
macro_rules! __rtti_class_bases {
    ($class:ident [$($done:tt)*] $field:ident : $base:ty $(, $($rest:tt)*)?) => {
        $crate::__rtti_class_bases!($class [$($done)* { $base; field $field }] $($($rest)*)?);
    };
    ($class:ident [$($done:tt)*] $base:ty $(, $($rest:tt)*)?) => {
        $crate::__rtti_class_bases!($class [$($done)* { $base; coerce }] $($($rest)*)?);
    };
    ($class:ident [$($done:tt)*]) => {
        $crate::__rtti_impl_class!($class [$($done)*]);
    };
}

/// Reaches a base from `this`, by unsizing coercion or by field projection.
#[doc(hidden)]
#[macro_export]
macro_rules! __rtti_project {
    ($this:ident, coerce) => {
        $this
    };
    ($this:ident, field $field:ident) => {
        &$this.$field
    };
}

/// Mutable counterpart of `__rtti_project!`.
#[doc(hidden)]
#[macro_export]
macro_rules! __rtti_project_mut {
    ($this:ident, coerce) => {
        $this
    };
    ($this:ident, field $field:ident) => {
        &mut $this.$field
    };
}

/// Generates the [`RttiClass`](crate::RttiClass) and [`Rtti`](crate::Rtti)
/// implementations for a class.
#[doc(hidden)]
#[macro_export]
macro_rules! __rtti_impl_class {
    ($class:ident [$({ $base:ty; $($projection:tt)+ })*]) => {
        impl $crate::RttiClass for $class {
            fn type_class() -> &'static $crate::Type {
                static TYPE: $crate::Type = $crate::Type::new(::core::stringify!($class));
                &TYPE
            }

            fn class_is(target: &$crate::Type) -> bool {
                target.is(<Self as $crate::RttiClass>::type_class())
                    $(|| <$base as $crate::RttiClass>::class_is(target))*
            }

            #[allow(clippy::needless_return)]
            fn class_cast<'a>(this: &'a Self, request: &mut $crate::CastRequest<'a>) {
                if request.target().is(<Self as $crate::RttiClass>::type_class()) {
                    request.provide(this);
                    return;
                }
                $(
                    if <$base as $crate::RttiClass>::class_is(request.target()) {
                        <$base as $crate::RttiClass>::class_cast(
                            $crate::__rtti_project!(this, $($projection)+),
                            request,
                        );
                        return;
                    }
                )*
            }

            #[allow(clippy::needless_return)]
            fn class_cast_mut<'a>(this: &'a mut Self, request: &mut $crate::CastRequestMut<'a>) {
                if request.target().is(<Self as $crate::RttiClass>::type_class()) {
                    request.provide(this);
                    return;
                }
                $(
                    if <$base as $crate::RttiClass>::class_is(request.target()) {
                        <$base as $crate::RttiClass>::class_cast_mut(
                            $crate::__rtti_project_mut!(this, $($projection)+),
                            request,
                        );
                        return;
                    }
                )*
            }
        }

        impl $crate::Rtti for $class {
            #[inline]
            fn type_object(&self) -> &'static $crate::Type {
                <Self as $crate::RttiClass>::type_class()
            }

            #[inline]
            fn override_is(&self, target: &$crate::Type) -> bool {
                <Self as $crate::RttiClass>::class_is(target)
            }

            #[inline]
            fn override_as<'a>(&'a self, request: &mut $crate::CastRequest<'a>) {
                <Self as $crate::RttiClass>::class_cast(self, request)
            }

            #[inline]
            fn override_as_mut<'a>(&'a mut self, request: &mut $crate::CastRequestMut<'a>) {
                <Self as $crate::RttiClass>::class_cast_mut(self, request)
            }
        }
    };
}
