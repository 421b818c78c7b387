use proc_macro2::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Error, Fields, Ident, LitStr, Result, Type};

use crate::parse::{parse_field_attrs, parse_root_type};

/// What a view slot binds to, inferred from its declared Rust type. The
/// wrapper types are the three leaf shapes the runtime understands
/// (`WriteSeq`/`ReadSeq`/`ReadScalar`); anything else is treated as a nested
/// view type recursed into per Shape Walker rule 5.
enum SlotKind {
    WriteSeq,
    ReadSeq,
    ReadScalar,
    Nested(Type),
}

struct FieldPlan {
    field_ident: Ident,
    source_ident: Ident,
    source_lit: LitStr,
    kind: SlotKind,
    mapping: bool,
}

fn slot_kind(ty: &Type) -> SlotKind {
    if let Type::Path(type_path) = ty {
        if let Some(segment) = type_path.path.segments.last() {
            match segment.ident.to_string().as_str() {
                "WriteSeq" => return SlotKind::WriteSeq,
                "ReadSeq" => return SlotKind::ReadSeq,
                "ReadScalar" => return SlotKind::ReadScalar,
                _ => {}
            }
        }
    }

    SlotKind::Nested(ty.clone())
}

pub fn expand(input: DeriveInput) -> Result<TokenStream> {
    let struct_ident = input.ident.clone();

    let data = match &input.data {
        Data::Struct(data) => data,
        _ => {
            return Err(Error::new_spanned(
                &input,
                "View can only be derived for structs (the view descriptor must be an \
                 addressable composite)",
            ))
        }
    };

    let fields = match &data.fields {
        Fields::Named(fields) => &fields.named,
        _ => {
            return Err(Error::new_spanned(
                &data.fields,
                "View requires named fields (tuple and unit structs are not addressable \
                 composites)",
            ))
        }
    };

    let root_ty = parse_root_type(&input.attrs)?;

    let mut plans = Vec::with_capacity(fields.len());
    let mut mapping_seen = false;

    for field in fields {
        let field_ident = field
            .ident
            .clone()
            .expect("Fields::Named guarantees every field has an identifier");

        let attrs = parse_field_attrs(&field.attrs)?;
        let source_ident = attrs.source.unwrap_or_else(|| field_ident.clone());
        let source_lit = LitStr::new(&source_ident.to_string(), field_ident.span());
        let kind = slot_kind(&field.ty);

        if attrs.mapping {
            if mapping_seen {
                return Err(Error::new_spanned(
                    field,
                    "at most one #[view(mapping)] field is supported per view; nest a second \
                     mapping-bound view inside its own command instead",
                ));
            }

            if matches!(kind, SlotKind::Nested(_) | SlotKind::ReadScalar) {
                return Err(Error::new_spanned(
                    field,
                    "a #[view(mapping)] field must be a WriteSeq<T> or ReadSeq<T> slot",
                ));
            }

            mapping_seen = true;
        }

        plans.push(FieldPlan {
            field_ident,
            source_ident,
            source_lit,
            kind,
            mapping: attrs.mapping,
        });
    }

    let params_ty: Type = if mapping_seen {
        syn::parse_quote!(::std::string::String)
    } else {
        syn::parse_quote!(())
    };

    let permission_stmts = plans.iter().map(permission_stmt);
    let bind_stmts = plans.iter().map(bind_stmt);
    let field_inits = plans.iter().map(|plan| {
        let field_ident = &plan.field_ident;
        quote! { #field_ident }
    });

    let expanded = quote! {
        impl ::warden::view::View for #struct_ident {
            type Source = #root_ty;
            type Params = #params_ty;

            fn permission_template() -> ::warden::PermissionSet {
                let mut __set = ::warden::PermissionSet::new();
                #(#permission_stmts)*
                __set
            }

            #[allow(unused_variables)]
            fn bind(
                source: &mut Self::Source,
                params: Self::Params,
            ) -> ::warden::WardenResult<::warden::view::BindPlan<Self>> {
                let mut __deferred: ::std::vec::Vec<::warden::view::DeferredApplyOp> =
                    ::std::vec::Vec::new();

                #(#bind_stmts)*

                let __view = #struct_ident {
                    #(#field_inits,)*
                };

                ::std::result::Result::Ok(::warden::view::BindPlan::new(__view, __deferred))
            }
        }
    };

    Ok(expanded)
}

fn permission_stmt(plan: &FieldPlan) -> TokenStream {
    let source_lit = &plan.source_lit;

    match &plan.kind {
        SlotKind::WriteSeq => quote! {
            __set.insert(::warden::Path::root().child(#source_lit), ::warden::PermissionIntent::Write);
        },
        SlotKind::ReadSeq | SlotKind::ReadScalar => quote! {
            __set.insert(::warden::Path::root().child(#source_lit), ::warden::PermissionIntent::Read);
        },
        SlotKind::Nested(nested_ty) => quote! {
            __set.insert_nested(
                #source_lit,
                &<#nested_ty as ::warden::view::View>::permission_template(),
            );
        },
    }
}

fn bind_stmt(plan: &FieldPlan) -> TokenStream {
    let field_ident = &plan.field_ident;
    let source_ident = &plan.source_ident;

    match &plan.kind {
        SlotKind::WriteSeq if plan.mapping => quote! {
            let (#field_ident, __deferred_op) = ::warden::view::bind_mapping_write_seq(
                &mut source.#source_ident,
                ::std::clone::Clone::clone(&params),
            );

            if let ::std::option::Option::Some(__op) = __deferred_op {
                __deferred.push(__op);
            }
        },
        SlotKind::WriteSeq => quote! {
            let #field_ident = ::warden::view::bind_write_seq(&mut source.#source_ident);
        },
        SlotKind::ReadSeq if plan.mapping => quote! {
            let #field_ident = ::warden::view::bind_mapping_read_seq(&source.#source_ident, &params);
        },
        SlotKind::ReadSeq => quote! {
            let #field_ident = ::warden::view::bind_read_seq(&source.#source_ident);
        },
        SlotKind::ReadScalar => quote! {
            let #field_ident = ::warden::view::bind_read_scalar(&source.#source_ident);
        },
        SlotKind::Nested(nested_ty) => quote! {
            let __nested_plan = <#nested_ty as ::warden::view::View>::bind(
                &mut source.#source_ident,
                ::std::default::Default::default(),
            )?;
            __deferred.extend(__nested_plan.deferred);
            let #field_ident = __nested_plan.view;
        },
    }
}
