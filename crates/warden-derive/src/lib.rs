//! `#[derive(View)]`: generates the `warden::view::View` impl for a struct
//! whose fields are declared in terms of `WriteSeq<T>`, `ReadSeq<T>`,
//! `ReadScalar<T>`, or another `#[derive(View)]` type.
//!
//! Struct attribute: `#[view(root = SourceType)]` names the type this view
//! binds against. Field attributes: `#[view(source = "OtherName")]` renames
//! the root field a slot resolves to; `#[view(mapping)]` marks a
//! `WriteSeq`/`ReadSeq` slot as bound into a `HashMap<String, Vec<T>>` field,
//! keyed at runtime by the view's `Params`. At most one mapping field is
//! supported per view.

mod codegen;
mod parse;

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

#[proc_macro_derive(View, attributes(view))]
pub fn derive_view(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match codegen::expand(input) {
        Ok(tokens) => tokens.into(),
        Err(error) => error.to_compile_error().into(),
    }
}
