#![allow(unreachable_pub)]
#![allow(clippy::needless_pass_by_value)]

//! # Macros
//!
//! Procedural macros shared by the Sigil workspace.
//!
//! ## Usage
//! Library crates declare their error enums with [`macro@sigil_error`]:
//! ```toml
//! [dependencies]
//! sigil-derive.workspace = true
//! thiserror.workspace = true
//! ```

mod macros;

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

/// Attribute macro for defining domain-specific error enums.
///
/// # Features
///
/// * **Derives**: Adds `#[derive(Debug, thiserror::Error)]`; do not derive them yourself.
/// * **Kind Discriminant**: Generates a fieldless `<ErrorName>Kind` enum mirroring every
///   variant and a `kind()` accessor, so callers can classify failures (and adapters can
///   preserve the category) without destructuring.
/// * **Context Support**: Generates a companion `<ErrorName>Ext` trait that adds `.context()`
///   to any `Result` that can be converted into this error type.
/// * **Standard Conversions**: Implements `From<T>` for variants containing a `source` field,
///   enabling the `?` operator for upstream errors.
/// * **Internal Fallback**: Provides `From<&'static str>` and `From<String>` if an `Internal`
///   variant is present.
///
/// # Requirements
///
/// 1. The macro must be applied to an **enum** with at least one variant.
/// 2. Variants that support context must include a `context: Option<Cow<'static, str>>` field.
/// 3. Variants wrapping external errors name the field `source` and must also carry a
///    `context` field.
/// 4. Tuple or unit variants are rejected.
///
/// # Example
///
/// ```rust,ignore
/// use sigil_derive::sigil_error;
/// use std::borrow::Cow;
///
/// #[sigil_error]
/// pub enum StoreError {
///     #[error("IO error{}: {source}", format_context(.context))]
///     Io { source: std::io::Error, context: Option<Cow<'static, str>> },
///
///     #[error("Internal fault{}: {message}", format_context(.context))]
///     Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
/// }
///
/// fn read(path: &str) -> Result<Vec<u8>, StoreError> {
///     std::fs::read(path).context("Reading license file")
/// }
///
/// assert_eq!(StoreError::from("boom").kind(), StoreErrorKind::Internal);
/// ```
#[proc_macro_attribute]
pub fn sigil_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    macros::error::expand_derive(input).into()
}
