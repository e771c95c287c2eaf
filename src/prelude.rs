//! Commonly used items for convenient importing.
//!
//! ```rust
//! use calltrace::prelude::*;
//!
//! fn parse(input: &str, radix: u32) -> Option<u64> {
//!     let _scope = trace_scope!("fn parse(input: &str, radix: u32)", input, radix);
//!     u64::from_str_radix(input, radix).ok()
//! }
//!
//! assert_eq!(parse("ff", 16), Some(255));
//! ```
//!
//! # What's Included
//!
//! - **[`trace_scope!`]** and **[`argument!`]**: Macros for instrumenting
//!   functions
//! - **[`CallStackTracer`]**: The registry of active calls
//! - **[`CallTrace`]** and **[`ArgumentTrace`]**: The recorded data
//! - **[`handlers`]**: Built-in argument handlers
//! - **[`Rtti`]**, **[`RttiExt`]** and **[`RttiClass`]** together with
//!   **[`rtti_class!`]** and **[`rtti_interface!`]**: Run-time type
//!   identification

pub use crate::{
    ArgumentTrace, CallStackTracer, CallTrace, Rtti, RttiClass, RttiExt, argument, handlers,
    rtti_class, rtti_interface, trace_scope,
};
