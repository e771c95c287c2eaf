#![no_std]
#![forbid(
    missing_docs,
    clippy::alloc_instead_of_core,
    clippy::std_instead_of_alloc,
    clippy::std_instead_of_core,
    clippy::missing_safety_doc,
    clippy::missing_docs_in_private_items,
    clippy::undocumented_unsafe_blocks,
    clippy::multiple_unsafe_ops_per_block,
    rustdoc::invalid_rust_codeblocks,
    rustdoc::broken_intra_doc_links,
    unused_doc_comments
)]
#![deny(missing_copy_implementations)]
#![allow(rustdoc::private_intra_doc_links)]
//! Run-time type identification for `calltrace`.
//!
//! # Overview
//!
//! This crate gives every participating type a unique, process-lifetime
//! [`Type`] token, and lets values be tested ([`RttiExt::is`]) and narrowed
//! ([`RttiExt::cast`], [`RttiExt::cast_mut`]) along a type graph that is
//! declared at compile time. It does not rely on `dyn Any`: the graph can
//! contain trait objects with several supertraits and structs that embed their
//! "base classes" as fields, and a value can be cast to any of them.
//!
//! # Declaring participants
//!
//! Interfaces are traits with [`Rtti`] as a supertrait, declared through their
//! trait-object type. Classes are structs or enums. Each declaration lists only
//! the direct bases; the generated code does the rest.
//!
//! ```
//! use calltrace_rtti::{Rtti, RttiExt, rtti_class, rtti_interface};
//!
//! trait Shape: Rtti {
//!     fn area(&self) -> f64;
//! }
//! rtti_interface!(dyn Shape);
//!
//! struct Origin {
//!     x: f64,
//!     y: f64,
//! }
//! rtti_class!(Origin);
//!
//! struct Circle {
//!     origin: Origin,
//!     radius: f64,
//! }
//! rtti_class!(Circle: dyn Shape, origin: Origin);
//!
//! impl Shape for Circle {
//!     fn area(&self) -> f64 {
//!         core::f64::consts::PI * self.radius * self.radius
//!     }
//! }
//!
//! let circle = Circle {
//!     origin: Origin { x: 1.0, y: 2.0 },
//!     radius: 1.0,
//! };
//! let shape: &dyn Shape = &circle;
//!
//! assert!(shape.is::<Circle>());
//! assert_eq!(shape.type_object().name(), "Circle");
//! assert_eq!(shape.cast::<Origin>().map(|o| o.y), Some(2.0));
//! assert!(circle.cast::<dyn Shape>().is_some());
//! ```
//!
//! # Semantics
//!
//! - `value.is::<T>()` is true iff `T` is the value's own type or, recursively,
//!   one of its declared bases. Bases are tried in declaration order.
//! - `value.cast::<T>()` returns `Some` iff `value.is::<T>()` is true. The
//!   returned reference is the value itself (for interface bases and for the
//!   type itself) or the embedded field (for struct bases).
//! - An interface view keeps the dynamic type: `type_object()` on a
//!   `&dyn Shape` reports `Circle`, and the view can be cast back to
//!   `Circle`.
//! - A field view does not. Casting `Circle` to its `origin: Origin` base
//!   yields a plain `&Origin` whose `type_object()` is `Origin`. Nothing links
//!   the field back to its container, so it cannot be cast back to `Circle`.
//! - Type tokens compare by address, never by name.
//!
//! Only non-generic types can participate: the token lives in a `static`, and
//! a `static` inside a generic impl would be shared by all instantiations.

mod macros;
mod request;
mod rtti;
mod type_token;

pub use request::{CastRequest, CastRequestMut};
pub use rtti::{Rtti, RttiClass, RttiExt};
pub use type_token::Type;
