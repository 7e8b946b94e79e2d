//! # Edgewise Derive Macros
//!
//! `#[derive(Fields)]` implements `edgewise::Fields`: a static table of the
//! struct's `pub` fields with their directives, plus indexed accessors.
//!
//! Directives are read from `#[edge("name,flags")]`. Without one, the
//! serialization directive is derived from `#[serde(rename = "...")]`,
//! `#[serde(skip)]` (as `-`), `#[serde(flatten)]` (as `,inline`) and
//! `#[serde(skip_serializing_if = "...")]` (as `,omitempty`).
//!
//! Fields that are neither inline nor skipped are dispatched on their type:
//! record types (`edgewise::Fields`) become nested fields, everything else
//! is a scalar.
//!
//! Compatible with `syn 2.0`.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::ext::IdentExt;
use syn::{parse_macro_input, Attribute, Data, DeriveInput, LitStr, Visibility};

#[proc_macro_derive(Fields, attributes(edge))]
pub fn derive_fields(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;
    let type_name = name.unraw().to_string();
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let named = match &input.data {
        Data::Struct(ds) => match &ds.fields {
            syn::Fields::Named(named) => Some(named),
            _ => None,
        },
        _ => None,
    };

    // No named fields: report the type as not walkable.
    let Some(named) = named else {
        return quote! {
            impl #impl_generics ::edgewise::Fields for #name #ty_generics #where_clause {
                fn type_name(&self) -> &'static str {
                    #type_name
                }

                fn field_infos(&self) -> ::core::option::Option<&'static [::edgewise::FieldInfo]> {
                    ::core::option::Option::None
                }

                fn field_value(&self, _index: usize) -> ::core::option::Option<::edgewise::FieldValue<'_>> {
                    ::core::option::Option::None
                }

                fn field_slot(&mut self, _index: usize) -> ::core::option::Option<::edgewise::FieldSlot<'_>> {
                    ::core::option::Option::None
                }
            }
        }
        .into();
    };

    let mut fields = Vec::new();
    for field in &named.named {
        if !matches!(field.vis, Visibility::Public(_)) {
            continue;
        }
        let Some(ident) = field.ident.clone() else {
            continue;
        };
        let directives = match parse_directives(&field.attrs) {
            Ok(d) => d,
            Err(e) => return e.to_compile_error().into(),
        };
        fields.push(ExportedField {
            ident,
            ty: field.ty.clone(),
            directives,
        });
    }

    let infos = fields.iter().map(|f| {
        let field_name = f.ident.unraw().to_string();
        let directive = option_tokens(f.directives.explicit.as_deref());
        let serde_directive = option_tokens(f.directives.serialization().as_deref());
        quote! {
            ::edgewise::FieldInfo {
                name: #field_name,
                directive: #directive,
                serde_directive: #serde_directive,
            }
        }
    });

    let values = fields.iter().enumerate().map(|(index, f)| {
        let ident = &f.ident;
        let ty = &f.ty;
        let access = match f.directives.kind() {
            FieldKind::Plain => quote! {{
                use ::edgewise::walker::{NestedAccess as _, ScalarAccess as _};
                (&&::edgewise::walker::FieldKind::<#ty>::new()).value(&self.#ident)
            }},
            FieldKind::Inline => quote! { ::edgewise::FieldValue::Composite(&self.#ident) },
            FieldKind::Skipped => quote! { ::edgewise::FieldValue::Skipped },
        };
        quote! { #index => ::core::option::Option::Some(#access), }
    });

    let slots = fields.iter().enumerate().map(|(index, f)| {
        let ident = &f.ident;
        let ty = &f.ty;
        let access = match f.directives.kind() {
            FieldKind::Plain => quote! {{
                use ::edgewise::walker::{NestedAccess as _, ScalarAccess as _};
                (&&::edgewise::walker::FieldKind::<#ty>::new()).slot(&mut self.#ident)
            }},
            FieldKind::Inline => quote! { ::edgewise::FieldSlot::Composite(&mut self.#ident) },
            FieldKind::Skipped => quote! { ::edgewise::FieldSlot::Skipped },
        };
        quote! { #index => ::core::option::Option::Some(#access), }
    });

    let expanded = quote! {
        impl #impl_generics ::edgewise::Fields for #name #ty_generics #where_clause {
            fn type_name(&self) -> &'static str {
                #type_name
            }

            fn field_infos(&self) -> ::core::option::Option<&'static [::edgewise::FieldInfo]> {
                const FIELDS: &[::edgewise::FieldInfo] = &[#(#infos),*];
                ::core::option::Option::Some(FIELDS)
            }

            #[allow(unused_variables)]
            fn field_value(&self, index: usize) -> ::core::option::Option<::edgewise::FieldValue<'_>> {
                match index {
                    #(#values)*
                    _ => ::core::option::Option::None,
                }
            }

            #[allow(unused_variables)]
            fn field_slot(&mut self, index: usize) -> ::core::option::Option<::edgewise::FieldSlot<'_>> {
                match index {
                    #(#slots)*
                    _ => ::core::option::Option::None,
                }
            }
        }
    };

    TokenStream::from(expanded)
}

struct ExportedField {
    ident: syn::Ident,
    ty: syn::Type,
    directives: Directives,
}

enum FieldKind {
    /// Scalar or nested record, decided by the field type
    Plain,
    Inline,
    Skipped,
}

#[derive(Default)]
struct Directives {
    explicit: Option<String>,
    rename: Option<String>,
    skip: bool,
    flatten: bool,
    omit_empty: bool,
}

impl Directives {
    /// Directive string implied by the serde attributes, if any
    fn serialization(&self) -> Option<String> {
        if self.skip {
            return Some("-".to_string());
        }
        if self.rename.is_none() && !self.flatten && !self.omit_empty {
            return None;
        }
        let mut directive = self.rename.clone().unwrap_or_default();
        if self.flatten {
            directive.push_str(",inline");
        }
        if self.omit_empty {
            directive.push_str(",omitempty");
        }
        Some(directive)
    }

    /// Mirrors the runtime resolution order so accessors match the options
    /// the walker will see.
    fn kind(&self) -> FieldKind {
        let effective = self
            .explicit
            .clone()
            .filter(|d| !d.is_empty())
            .or_else(|| self.serialization().filter(|d| !d.is_empty()));
        let Some(effective) = effective else {
            return FieldKind::Plain;
        };

        let mut segments = effective.split(',');
        if segments.next().map(str::trim) == Some("-") {
            return FieldKind::Skipped;
        }
        if segments.any(|flag| flag.trim() == "inline") {
            FieldKind::Inline
        } else {
            FieldKind::Plain
        }
    }
}

fn option_tokens(value: Option<&str>) -> TokenStream2 {
    match value {
        Some(s) => quote! { ::core::option::Option::Some(#s) },
        None => quote! { ::core::option::Option::None },
    }
}

/// Collects `#[edge("...")]` and the serde attributes that name or skip a field.
fn parse_directives(attrs: &[Attribute]) -> syn::Result<Directives> {
    let mut directives = Directives::default();

    for attr in attrs {
        if attr.path().is_ident("edge") {
            let lit: LitStr = attr.parse_args()?;
            directives.explicit = Some(lit.value());
        } else if attr.path().is_ident("serde") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("rename") {
                    if meta.input.peek(syn::Token![=]) {
                        let s: LitStr = meta.value()?.parse()?;
                        directives.rename = Some(s.value());
                    } else {
                        meta.parse_nested_meta(|inner| {
                            let s: LitStr = inner.value()?.parse()?;
                            if inner.path.is_ident("serialize") {
                                directives.rename = Some(s.value());
                            }
                            Ok(())
                        })?;
                    }
                    return Ok(());
                }

                if meta.path.is_ident("skip") || meta.path.is_ident("skip_serializing") {
                    directives.skip = true;
                } else if meta.path.is_ident("flatten") {
                    directives.flatten = true;
                } else if meta.path.is_ident("skip_serializing_if") {
                    directives.omit_empty = true;
                }

                // Consume whatever else serde accepts: `key = value` or `key(...)`
                if meta.input.peek(syn::Token![=]) {
                    let _: syn::Expr = meta.value()?.parse()?;
                } else if meta.input.peek(syn::token::Paren) {
                    let content;
                    syn::parenthesized!(content in meta.input);
                    let _: TokenStream2 = content.parse()?;
                }
                Ok(())
            })?;
        }
    }

    Ok(directives)
}
