#![allow(unreachable_pub)]

//! # Macros
//!
//! Procedural macros shared by the `TripGate` crates.
//!
//! The only macro exported today is [`trip_error`], which turns a plain enum into the
//! error type every crate in the workspace uses: `thiserror` display strings, a
//! `.context(..)` extension trait and `From` conversions for wrapped sources.
//!
//! ## Usage
//! ```toml
//! [dependencies]
//! trip-derive.workspace = true
//! thiserror.workspace = true
//! ```

mod error;

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

/// Attribute macro for declaring a crate's error enum.
///
/// # Generated items
///
/// * `#[derive(Debug, thiserror::Error)]`, unless the enum already derives them.
/// * A `<Name>Ext<T>` trait with `context(..)` implemented for `Result<T, Name>`, which
///   fills the `context` field of the variant in flight.
/// * For every variant holding a `source` (or a field marked `#[source]`/`#[from]`):
///   `From<Source> for Name` and `<Name>Ext<T>` for `Result<T, Source>`, so `?` and
///   `.context(..)` both work on upstream results.
/// * `From<&'static str>` and `From<String>` when an `Internal { message, context }`
///   variant exists.
/// * A private `format_context` helper rendering ` (context)` or nothing, for use in
///   `#[error(..)]` strings.
///
/// # Requirements
///
/// Variants must use named fields. A variant with a source must also carry
/// `context: Option<Cow<'static, str>>`.
///
/// # Example
///
/// ```rust,ignore
/// use std::borrow::Cow;
///
/// #[trip_derive::trip_error]
/// pub enum StoreError {
///     #[error("I/O failure{}: {source}", format_context(.context))]
///     Io { source: std::io::Error, context: Option<Cow<'static, str>> },
///
///     #[error("Internal store error{}: {message}", format_context(.context))]
///     Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
/// }
///
/// fn load(path: &str) -> Result<String, StoreError> {
///     std::fs::read_to_string(path).context("Reading counter file")
/// }
/// ```
#[proc_macro_attribute]
pub fn trip_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    error::expand(input).into()
}
