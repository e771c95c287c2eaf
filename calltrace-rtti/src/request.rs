//! Typed slots that a cast walks through the type graph.
//!
//! A cast to `T` creates a request holding an empty `Option<&T>` (or
//! `Option<&mut T>`) slot together with the [`TypeId`] of `T`. The generated
//! [`RttiClass`](crate::RttiClass) code routes the request to the part of the
//! object that *is* a `T`, which then offers itself with
//! [`CastRequest::provide`].
//!
//! # Safety Invariant
//!
//! The slot pointer is type-erased. It is only ever written through
//! `provide::<U>`, and only after checking that `TypeId::of::<U>()` equals the
//! `TypeId` recorded when the request was created. Token bookkeeping (which can
//! be wrong if someone implements [`RttiClass`](crate::RttiClass) by hand)
//! never influences what gets written, so a confused type graph can at worst
//! produce `None`, never a reference of the wrong type.
//!
//! Both request types are invariant in `'a`: a request for references living
//! for `'a` can never be used to store a shorter-lived reference.

use core::{any::TypeId, fmt, marker::PhantomData, ptr::NonNull};

use crate::Type;

/// A pending shared-reference cast.
///
/// Generated code receives this in [`RttiClass::class_cast`] and
/// [`Rtti::override_as`]; user code normally never sees one.
///
/// [`RttiClass::class_cast`]: crate::RttiClass::class_cast
/// [`Rtti::override_as`]: crate::Rtti::override_as
#[allow(
    missing_copy_implementations,
    reason = "a request is a unique handle on its slot"
)]
pub struct CastRequest<'a> {
    /// The token of the requested type.
    target: &'static Type,
    /// The `TypeId` of the requested type.
    target_id: TypeId,
    /// Pointer to the `Option<&'a T>` slot owned by the caller of the cast.
    ///
    /// # Safety
    ///
    /// 1. The pointer points to a live, initialized `Option<&'a T>` for the
    ///    entire lifetime of the request.
    /// 2. `TypeId::of::<T>() == target_id`.
    /// 3. Nothing else accesses the slot while the request exists.
    slot: NonNull<()>,
    /// Whether the slot has been filled.
    fulfilled: bool,
    /// Makes the request invariant in `'a`.
    _marker: PhantomData<&'a mut &'a ()>,
}

impl<'a> CastRequest<'a> {
    /// Creates a request that will store its answer in `slot`.
    ///
    /// # Safety
    ///
    /// The caller must ensure that `slot` outlives the returned request and is
    /// not accessed in any other way until the request has been dropped.
    pub(crate) unsafe fn new<T>(target: &'static Type, slot: &mut Option<&'a T>) -> Self
    where
        T: ?Sized + 'static,
    {
        Self {
            target,
            target_id: TypeId::of::<T>(),
            slot: NonNull::from(slot).cast::<()>(),
            fulfilled: false,
            _marker: PhantomData,
        }
    }

    /// The token of the type being requested.
    #[inline]
    #[must_use]
    pub fn target(&self) -> &'static Type {
        self.target
    }

    /// Returns `true` once a value has been provided.
    #[inline]
    #[must_use]
    pub fn is_fulfilled(&self) -> bool {
        self.fulfilled
    }

    /// Offers `value` as the answer to this request.
    ///
    /// The value is accepted only if `T` is exactly the requested type and the
    /// request has not been fulfilled yet. Returns whether it was accepted.
    pub fn provide<T>(&mut self, value: &'a T) -> bool
    where
        T: ?Sized + 'static,
    {
        if self.fulfilled || TypeId::of::<T>() != self.target_id {
            return false;
        }

        let slot = self.slot.cast::<Option<&'a T>>();

        // SAFETY:
        // - By the invariants on `self.slot`, it points to a live `Option<&'a U>`
        //   where `TypeId::of::<U>() == self.target_id`.
        // - We just checked `TypeId::of::<T>() == self.target_id`, so `U == T`
        //   (both are `'static`, so the `TypeId` comparison is exact).
        // - Nothing else accesses the slot while the request exists, and
        //   `&mut self` guarantees this is the only write in progress.
        unsafe {
            slot.as_ptr().write(Some(value));
        }
        self.fulfilled = true;
        true
    }
}

impl fmt::Debug for CastRequest<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CastRequest")
            .field("target", &self.target)
            .field("fulfilled", &self.fulfilled)
            .finish()
    }
}

/// A pending mutable-reference cast.
///
/// The mutable counterpart of [`CastRequest`], used by
/// [`RttiExt::cast_mut`](crate::RttiExt::cast_mut).
#[allow(
    missing_copy_implementations,
    reason = "a request is a unique handle on its slot"
)]
pub struct CastRequestMut<'a> {
    /// The token of the requested type.
    target: &'static Type,
    /// The `TypeId` of the requested type.
    target_id: TypeId,
    /// Pointer to the `Option<&'a mut T>` slot owned by the caller of the
    /// cast.
    ///
    /// # Safety
    ///
    /// Same invariants as [`CastRequest::slot`], with `Option<&'a mut T>` in
    /// place of `Option<&'a T>`.
    slot: NonNull<()>,
    /// Whether the slot has been filled.
    fulfilled: bool,
    /// Makes the request invariant in `'a`.
    _marker: PhantomData<&'a mut &'a ()>,
}

impl<'a> CastRequestMut<'a> {
    /// Creates a request that will store its answer in `slot`.
    ///
    /// # Safety
    ///
    /// The caller must ensure that `slot` outlives the returned request and is
    /// not accessed in any other way until the request has been dropped.
    pub(crate) unsafe fn new<T>(target: &'static Type, slot: &mut Option<&'a mut T>) -> Self
    where
        T: ?Sized + 'static,
    {
        Self {
            target,
            target_id: TypeId::of::<T>(),
            slot: NonNull::from(slot).cast::<()>(),
            fulfilled: false,
            _marker: PhantomData,
        }
    }

    /// The token of the type being requested.
    #[inline]
    #[must_use]
    pub fn target(&self) -> &'static Type {
        self.target
    }

    /// Returns `true` once a value has been provided.
    #[inline]
    #[must_use]
    pub fn is_fulfilled(&self) -> bool {
        self.fulfilled
    }

    /// Offers `value` as the answer to this request.
    ///
    /// The value is accepted only if `T` is exactly the requested type and the
    /// request has not been fulfilled yet. Returns whether it was accepted.
    pub fn provide<T>(&mut self, value: &'a mut T) -> bool
    where
        T: ?Sized + 'static,
    {
        if self.fulfilled || TypeId::of::<T>() != self.target_id {
            return false;
        }

        let slot = self.slot.cast::<Option<&'a mut T>>();

        // SAFETY:
        // - By the invariants on `self.slot`, it points to a live
        //   `Option<&'a mut U>` where `TypeId::of::<U>() == self.target_id`.
        // - We just checked `TypeId::of::<T>() == self.target_id`, so `U == T`.
        // - Nothing else accesses the slot while the request exists.
        // - The slot held `None` before (the request was not fulfilled), so
        //   overwriting it without dropping leaks nothing.
        unsafe {
            slot.as_ptr().write(Some(value));
        }
        self.fulfilled = true;
        true
    }
}

impl fmt::Debug for CastRequestMut<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CastRequestMut")
            .field("target", &self.target)
            .field("fulfilled", &self.fulfilled)
            .finish()
    }
}
