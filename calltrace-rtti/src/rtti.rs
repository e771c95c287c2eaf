//! The static and dynamic halves of the type-identity contract.

use crate::{CastRequest, CastRequestMut, Type};

/// The static side of type identity: what a type knows about itself without
/// an instance.
///
/// Implemented by [`rtti_class!`](crate::rtti_class) for structs and enums,
/// and by [`rtti_interface!`](crate::rtti_interface) for trait-object types
/// such as `dyn Shape`. Every type that can appear as the `T` in
/// [`RttiExt::is`] or [`RttiExt::cast`] implements this trait.
///
/// Implementing it by hand is possible but rarely useful. A hand-written
/// implementation must keep [`class_is`](RttiClass::class_is) and
/// [`class_cast`](RttiClass::class_cast) in agreement, or `is` and `cast` will
/// disagree. It cannot cause a cast to produce a reference of the wrong type.
pub trait RttiClass: 'static {
    /// The token of this type. Always the same reference.
    fn type_class() -> &'static Type;

    /// Returns `true` if `target` is this type or one of its declared bases,
    /// transitively.
    fn class_is(target: &Type) -> bool;

    /// Routes `request` to the part of `this` that has the requested type.
    ///
    /// Called only with requests for which
    /// [`class_is`](RttiClass::class_is) holds.
    fn class_cast<'a>(this: &'a Self, request: &mut CastRequest<'a>);

    /// The mutable counterpart of [`class_cast`](RttiClass::class_cast).
    fn class_cast_mut<'a>(this: &'a mut Self, request: &mut CastRequestMut<'a>);
}

/// The dynamic side of type identity, dispatched through trait objects.
///
/// Interfaces declare `Rtti` as a supertrait so that a `&dyn Interface` can
/// answer questions about the concrete type behind it. The `override_*`
/// methods are the building blocks of [`RttiExt`]; call those instead.
pub trait Rtti: 'static {
    /// The token of the concrete type of this value.
    fn type_object(&self) -> &'static Type;

    /// Returns `true` if the concrete type of this value is `target` or
    /// derives from it.
    #[doc(hidden)]
    fn override_is(&self, target: &Type) -> bool;

    /// Answers a shared-reference cast starting from the concrete type.
    #[doc(hidden)]
    fn override_as<'a>(&'a self, request: &mut CastRequest<'a>);

    /// Answers a mutable-reference cast starting from the concrete type.
    #[doc(hidden)]
    fn override_as_mut<'a>(&'a mut self, request: &mut CastRequestMut<'a>);
}

/// Type testing and checked casts for every [`Rtti`] value, including trait
/// objects.
///
/// # Examples
///
/// ```
/// use calltrace_rtti::{Rtti, RttiExt, rtti_class, rtti_interface};
///
/// trait Named: Rtti {}
/// rtti_interface!(dyn Named);
///
/// struct Plain;
/// rtti_class!(Plain);
///
/// struct Labelled(&'static str);
/// rtti_class!(Labelled: dyn Named);
/// impl Named for Labelled {}
///
/// let value: &dyn Named = &Labelled("x");
/// assert!(value.is::<Labelled>());
/// assert!(!value.is::<Plain>());
/// assert_eq!(value.cast::<Labelled>().map(|l| l.0), Some("x"));
/// assert!(value.cast::<Plain>().is_none());
/// ```
pub trait RttiExt: Rtti {
    /// Returns `true` if this value is a `T`, or derives from `T`.
    #[inline]
    fn is<T>(&self) -> bool
    where
        T: ?Sized + RttiClass,
    {
        self.override_is(T::type_class())
    }

    /// Views this value as a `T`, if it is one.
    ///
    /// Returns `Some` exactly when [`is::<T>()`](RttiExt::is) is true.
    fn cast<T>(&self) -> Option<&T>
    where
        T: ?Sized + RttiClass,
    {
        let mut slot: Option<&T> = None;
        {
            // SAFETY: `slot` outlives `request`, which is dropped at the end of
            // this block, and `slot` is not touched until then.
            let mut request = unsafe { CastRequest::new::<T>(T::type_class(), &mut slot) };
            self.override_as(&mut request);
        }
        slot
    }

    /// Views this value as a mutable `T`, if it is one.
    ///
    /// Returns `Some` exactly when [`is::<T>()`](RttiExt::is) is true.
    fn cast_mut<T>(&mut self) -> Option<&mut T>
    where
        T: ?Sized + RttiClass,
    {
        let mut slot: Option<&mut T> = None;
        {
            // SAFETY: `slot` outlives `request`, which is dropped at the end of
            // this block, and `slot` is not touched until then.
            let mut request = unsafe { CastRequestMut::new::<T>(T::type_class(), &mut slot) };
            self.override_as_mut(&mut request);
        }
        slot
    }
}

impl<R> RttiExt for R where R: ?Sized + Rtti {}

#[cfg(test)]
mod tests {
    use super::*;

    trait Speaker: Rtti {
        fn speak(&self) -> &'static str;
    }
    crate::rtti_interface!(dyn Speaker);

    struct Dog;
    crate::rtti_class!(Dog: dyn Speaker);

    impl Speaker for Dog {
        fn speak(&self) -> &'static str {
            "woof"
        }
    }

    struct Stone;
    crate::rtti_class!(Stone);

    static_assertions::assert_obj_safe!(Rtti);

    #[test]
    fn test_dynamic_type_through_interface() {
        let dog = Dog;
        let speaker: &dyn Speaker = &dog;
        assert_eq!(speaker.type_object(), Dog::type_class());
        assert_eq!(speaker.type_object().name(), "Dog");
        assert_eq!(<dyn Speaker>::type_class().name(), "Speaker");
    }

    #[test]
    fn test_is_and_cast() {
        let mut dog = Dog;
        assert!(dog.is::<Dog>());
        assert!(dog.is::<dyn Speaker>());
        assert!(!dog.is::<Stone>());
        assert_eq!(dog.cast::<dyn Speaker>().map(|s| s.speak()), Some("woof"));
        assert!(dog.cast::<Stone>().is_none());
        assert!(dog.cast_mut::<dyn Speaker>().is_some());

        let stone = Stone;
        assert!(!stone.is::<dyn Speaker>());
        assert!(stone.cast::<dyn Speaker>().is_none());
    }

    #[test]
    fn test_request_rejects_mismatched_types() {
        let mut slot: Option<&u32> = None;
        let value = 7_u64;
        let narrow = 3_u32;
        {
            // SAFETY: `slot` outlives the request and is not touched meanwhile.
            let mut request = unsafe { CastRequest::new::<u32>(Dog::type_class(), &mut slot) };
            assert!(!request.provide(&value));
            assert!(!request.is_fulfilled());
            assert!(request.provide(&narrow));
            assert!(!request.provide(&narrow));
        }
        assert_eq!(slot, Some(&3));
    }
}
