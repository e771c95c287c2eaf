//! The [`Type`] token.

use core::{
    fmt,
    hash::{Hash, Hasher},
};

/// A process-unique token identifying one participating type.
///
/// Exactly one `Type` exists per type declared with [`rtti_class!`] or
/// [`rtti_interface!`]. It lives in a `static` created by the declaration, so
/// it is never destroyed and every call to
/// [`RttiClass::type_class`](crate::RttiClass::type_class) hands out the same
/// reference.
///
/// Identity is by address: two tokens are equal only if they are the same
/// token. Two distinct types that happen to share a name in different modules
/// have distinct tokens.
///
/// `Type` is deliberately neither `Copy` nor `Clone`; a copy would have a
/// different address and would not compare equal to anything.
///
/// [`rtti_class!`]: crate::rtti_class
/// [`rtti_interface!`]: crate::rtti_interface
#[allow(
    missing_copy_implementations,
    reason = "identity is the address of the static token"
)]
pub struct Type {
    /// The name of the type as written in its declaration.
    name: &'static str,
}

impl Type {
    /// Creates a token with the given name.
    ///
    /// This is meant to be called in the initializer of a `static`, which is
    /// what the declaration macros do. A token created anywhere else (for
    /// example in a `const`) is a distinct token that no declared type will
    /// ever report.
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self { name }
    }

    /// The name of the type.
    #[inline]
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Returns `true` if `self` and `other` are the same token.
    #[inline]
    #[must_use]
    pub fn is(&self, other: &Type) -> bool {
        core::ptr::eq(self, other)
    }
}

impl PartialEq for Type {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.is(other)
    }
}

impl Eq for Type {}

impl Hash for Type {
    fn hash<H: Hasher>(&self, state: &mut H) {
        core::ptr::hash(self, state);
    }
}

impl fmt::Debug for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Type").field(&self.name).finish()
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

#[cfg(test)]
mod tests {
    extern crate alloc;

    use super::*;

    static FIRST: Type = Type::new("Same");
    static SECOND: Type = Type::new("Same");

    #[test]
    fn test_identity_is_by_address() {
        assert_eq!(FIRST, FIRST);
        assert_ne!(FIRST, SECOND);
        assert_eq!(FIRST.name(), SECOND.name());
        assert!(FIRST.is(&FIRST));
        assert!(!FIRST.is(&SECOND));
    }

    #[test]
    fn test_formatting() {
        assert_eq!(alloc::format!("{FIRST}"), "Same");
        assert_eq!(alloc::format!("{FIRST:?}"), "Type(\"Same\")");
    }
}
