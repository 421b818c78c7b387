use syn::spanned::Spanned;
use syn::{Attribute, Error, Ident, LitStr, Result, Type};

/// The struct-level `#[view(root = Type)]` attribute: names the root (or
/// enclosing composite) this view binds against.
pub fn parse_root_type(attrs: &[Attribute]) -> Result<Type> {
    let mut root = None;

    for attr in attrs {
        if !attr.path().is_ident("view") {
            continue;
        }

        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("root") {
                let value = meta.value()?;
                root = Some(value.parse::<Type>()?);
                return Ok(());
            }

            Err(meta.error("unrecognized `view` struct attribute, expected `root`"))
        })?;
    }

    root.ok_or_else(|| {
        let span = attrs.first().map_or_else(proc_macro2::Span::call_site, |a| a.span());

        Error::new(
            span,
            "views must declare their source with #[view(root = YourRootType)]",
        )
    })
}

/// The per-field `#[view(source = "...")]` / `#[view(mapping)]` attributes.
#[derive(Default)]
pub struct FieldAttrs {
    pub source: Option<Ident>,
    pub mapping: bool,
}

pub fn parse_field_attrs(attrs: &[Attribute]) -> Result<FieldAttrs> {
    let mut parsed = FieldAttrs::default();

    for attr in attrs {
        if !attr.path().is_ident("view") {
            continue;
        }

        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("source") {
                let value = meta.value()?;
                let lit: LitStr = value.parse()?;
                parsed.source = Some(Ident::new(&lit.value(), lit.span()));
                return Ok(());
            }

            if meta.path.is_ident("mapping") {
                parsed.mapping = true;
                return Ok(());
            }

            Err(meta.error("unrecognized `view` field attribute, expected `source` or `mapping`"))
        })?;
    }

    Ok(parsed)
}
